//! Window synthesizer.
//!
//! Picks the recommended observation interval out of a quality curve. Runs
//! of samples at or above the quality threshold become [`QualityPeriod`]s;
//! the period with the largest `average_score × duration` wins. When nothing
//! clears the threshold, the best sub-range of the whole curve is used
//! instead.

use chrono::{DateTime, Utc};

use crate::config::WindowSettings;
use crate::models::time::{hours_between, minutes_between};
use crate::models::{OptimalWindow, QualityLabel, QualityPeriod, VisibilitySample};

/// Consecutive samples more than this many sampling steps apart do not
/// form one run.
pub const GAP_TOLERANCE_STEPS: f64 = 1.5;
/// Minimum durations tried by the fallback search, hours.
pub const FALLBACK_MIN_DURATIONS_HOURS: [f64; 3] = [0.25, 0.5, 1.0];

pub const NO_CURVE_DESCRIPTION: &str = "No visibility data for this night";

/// Contiguous sub-range of the curve, by inclusive sample index.
#[derive(Debug, Clone, Copy)]
struct Span {
    first: usize,
    last: usize,
    average: f64,
    duration: f64,
}

impl Span {
    fn weight(&self) -> f64 {
        self.average * self.duration
    }
}

/// Recommended window for a quality curve sampled at most
/// `sample_spacing_minutes` apart.
pub fn find_optimal_window(
    curve: &[VisibilitySample],
    settings: &WindowSettings,
    sample_spacing_minutes: f64,
) -> OptimalWindow {
    if curve.is_empty() {
        return OptimalWindow::empty(NO_CURVE_DESCRIPTION);
    }

    let periods = find_quality_periods(curve, settings, sample_spacing_minutes);
    let spans = threshold_spans(curve, settings, sample_spacing_minutes);

    let chosen = spans
        .iter()
        .copied()
        .fold(None::<Span>, |best, span| match best {
            Some(b) if b.weight() >= span.weight() => best,
            _ => Some(span),
        });

    let (span, fallback) = match chosen {
        Some(span) => (span, false),
        None => (fallback_span(curve), true),
    };

    let slice = &curve[span.first..=span.last];
    let start = slice[0].time;
    let end = slice[slice.len() - 1].time;
    let best_time = slice
        .iter()
        .fold(None::<&VisibilitySample>, |best, s| match best {
            Some(b) if b.score >= s.score => best,
            _ => Some(s),
        })
        .map(|s| s.time);

    let label = QualityLabel::from_score(span.average);
    let description = if fallback {
        format!(
            "No period reaches the quality threshold; best available is {} to {} UTC ({:.1} h, {}, average score {:.2})",
            clock(start),
            clock(end),
            span.duration,
            label,
            span.average
        )
    } else {
        format!(
            "{} window from {} to {} UTC ({:.1} h, average score {:.2})",
            capitalize(label.as_str()),
            clock(start),
            clock(end),
            span.duration,
            span.average
        )
    };

    OptimalWindow {
        start_time: Some(start),
        end_time: Some(end),
        duration: span.duration,
        average_score: span.average,
        best_time,
        quality_periods: periods,
        description,
    }
}

/// Maximal runs at or above the threshold, at least `min_period_minutes`
/// long, split where samples were skipped (consecutive samples more than
/// [`GAP_TOLERANCE_STEPS`] × `sample_spacing_minutes` apart).
pub fn find_quality_periods(
    curve: &[VisibilitySample],
    settings: &WindowSettings,
    sample_spacing_minutes: f64,
) -> Vec<QualityPeriod> {
    threshold_spans(curve, settings, sample_spacing_minutes)
        .into_iter()
        .map(|span| QualityPeriod {
            start: curve[span.first].time,
            end: curve[span.last].time,
            duration: span.duration,
            average_score: span.average,
            quality: QualityLabel::from_score(span.average),
        })
        .collect()
}

fn threshold_spans(
    curve: &[VisibilitySample],
    settings: &WindowSettings,
    sample_spacing_minutes: f64,
) -> Vec<Span> {
    let max_gap = sample_spacing_minutes * GAP_TOLERANCE_STEPS;
    let mut spans = Vec::new();
    let mut run_start: Option<usize> = None;

    for i in 0..curve.len() {
        let above = curve[i].score >= settings.quality_threshold;
        let gap = i > 0 && minutes_between(curve[i - 1].time, curve[i].time) > max_gap;

        if let Some(first) = run_start {
            if !above || gap {
                spans.push(make_span(curve, first, i - 1));
                run_start = None;
            }
        }
        if above && run_start.is_none() {
            run_start = Some(i);
        }
    }
    if let Some(first) = run_start {
        spans.push(make_span(curve, first, curve.len() - 1));
    }

    let min_hours = settings.min_period_minutes / 60.0;
    spans.retain(|span| span.duration >= min_hours && span.duration > 0.0);
    spans
}

fn make_span(curve: &[VisibilitySample], first: usize, last: usize) -> Span {
    let slice = &curve[first..=last];
    let average = slice.iter().map(|s| s.score).sum::<f64>() / slice.len() as f64;
    Span {
        first,
        last,
        average,
        duration: hours_between(curve[first].time, curve[last].time),
    }
}

/// Best sub-range when no run clears the threshold: for each fallback
/// minimum duration, the highest-average range at least that long; then the
/// candidate with the largest weight. The whole curve when it is shorter
/// than every minimum.
fn fallback_span(curve: &[VisibilitySample]) -> Span {
    let mut prefix = Vec::with_capacity(curve.len() + 1);
    prefix.push(0.0);
    for sample in curve {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + sample.score);
    }

    let mut best: Option<Span> = None;
    for min_hours in FALLBACK_MIN_DURATIONS_HOURS {
        let mut candidate: Option<Span> = None;
        for first in 0..curve.len() {
            for last in first + 1..curve.len() {
                let duration = hours_between(curve[first].time, curve[last].time);
                if duration < min_hours {
                    continue;
                }
                let average = (prefix[last + 1] - prefix[first]) / (last - first + 1) as f64;
                if candidate.map_or(true, |c| average > c.average) {
                    candidate = Some(Span {
                        first,
                        last,
                        average,
                        duration,
                    });
                }
            }
        }
        if let Some(c) = candidate {
            if best.map_or(true, |b| c.weight() > b.weight()) {
                best = Some(c);
            }
        }
    }

    best.unwrap_or_else(|| make_span(curve, 0, curve.len() - 1))
}

fn clock(time: DateTime<Utc>) -> String {
    time.format("%H:%M").to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::add_minutes;
    use chrono::TimeZone;

    fn curve(scores: &[f64], step_minutes: f64) -> Vec<VisibilitySample> {
        let start = Utc.with_ymd_and_hms(2024, 7, 16, 4, 0, 0).unwrap();
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| VisibilitySample {
                time: add_minutes(start, i as f64 * step_minutes),
                score,
                altitude_gc: 30.0,
                moon_altitude: -5.0,
                moon_angle: 90.0,
            })
            .collect()
    }

    #[test]
    fn test_empty_curve() {
        let window = find_optimal_window(&[], &WindowSettings::default(), 8.0);
        assert!(!window.is_viable());
        assert_eq!(window.description, NO_CURVE_DESCRIPTION);
    }

    #[test]
    fn test_picks_largest_weighted_period() {
        // 30 min at 0.9, a dip, then 60 min at 0.6.
        let mut scores = vec![0.9; 4];
        scores.push(0.1);
        scores.extend(vec![0.6; 7]);
        let c = curve(&scores, 10.0);
        let window = find_optimal_window(&c, &WindowSettings::default(), 10.0);

        assert_eq!(window.quality_periods.len(), 2);
        assert_eq!(window.start_time, Some(c[5].time));
        assert_eq!(window.end_time, Some(c[11].time));
        assert!((window.duration - 1.0).abs() < 1e-9);
        assert!((window.average_score - 0.6).abs() < 1e-9);
        assert!(window.description.starts_with("Good window"));
    }

    #[test]
    fn test_short_runs_are_discarded() {
        // A single 10 minute run above threshold is below the 15 minute minimum.
        let c = curve(&[0.1, 0.9, 0.9, 0.1, 0.1], 10.0);
        let periods = find_quality_periods(&c, &WindowSettings::default(), 10.0);
        assert!(periods.is_empty());
    }

    #[test]
    fn test_gap_splits_runs() {
        let mut c = curve(&[0.9; 6], 8.0);
        for sample in c.iter_mut().skip(3) {
            sample.time = add_minutes(sample.time, 30.0);
        }
        let periods = find_quality_periods(&c, &WindowSettings::default(), 8.0);
        assert_eq!(periods.len(), 2);
        assert!(periods.iter().all(|p| p.quality == QualityLabel::Excellent));
    }

    #[test]
    fn test_coarse_sampling_keeps_one_run() {
        // 12 minute steps are regular spacing, not skipped samples.
        let c = curve(&[0.9; 20], 12.0);
        let periods = find_quality_periods(&c, &WindowSettings::default(), 12.0);
        assert_eq!(periods.len(), 1);
        assert!((periods[0].duration - 3.8).abs() < 1e-9);

        // One missing sample still splits the run.
        let mut c = curve(&[0.9; 20], 12.0);
        c.remove(10);
        let periods = find_quality_periods(&c, &WindowSettings::default(), 12.0);
        assert_eq!(periods.len(), 2);
    }

    #[test]
    fn test_fallback_when_nothing_clears_threshold() {
        let c = curve(&[0.1, 0.2, 0.3, 0.35, 0.3, 0.1, 0.05], 10.0);
        let window = find_optimal_window(&c, &WindowSettings::default(), 10.0);
        assert!(window.quality_periods.is_empty());
        assert!(window.is_viable());
        assert!(window.duration >= 0.25);
        assert!(window.description.starts_with("No period reaches"));
        assert_eq!(window.best_time, Some(c[3].time));
    }

    #[test]
    fn test_fallback_uses_whole_short_curve() {
        let c = curve(&[0.1, 0.2], 5.0);
        let window = find_optimal_window(&c, &WindowSettings::default(), 5.0);
        assert_eq!(window.start_time, Some(c[0].time));
        assert_eq!(window.end_time, Some(c[1].time));
        assert_eq!(window.best_time, Some(c[1].time));
    }
}
