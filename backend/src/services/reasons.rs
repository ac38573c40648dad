//! Human-readable reasons for a non-zero rating.
//!
//! Each rating bucket has an ordered list of rules. The first rule whose
//! predicate holds supplies the reason, and every list ends with a
//! catch-all. Moon-driven rules come before length-driven ones.

/// What the scorer knew when it settled on a rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReasonContext {
    /// Mean Moon illumination over the scored samples
    pub illumination: f64,
    /// Moon above the horizon for at least one scored sample
    pub moon_up: bool,
    /// Length of the night ∩ core-visible window, minutes
    pub window_minutes: f64,
    /// Final window-adjusted score
    pub score: f64,
}

pub struct ReasonRule {
    pub name: &'static str,
    pub applies: fn(&ReasonContext) -> bool,
    pub render: fn(&ReasonContext) -> String,
}

const BRIGHT_MOON: f64 = 0.6;
const NOTICEABLE_MOON: f64 = 0.25;

fn bright_moon_up(ctx: &ReasonContext) -> bool {
    ctx.moon_up && ctx.illumination > BRIGHT_MOON
}

fn moon_up_and_lit(ctx: &ReasonContext) -> bool {
    ctx.moon_up && ctx.illumination >= NOTICEABLE_MOON
}

fn under_two_hours(ctx: &ReasonContext) -> bool {
    ctx.window_minutes < 120.0
}

fn under_ninety_minutes(ctx: &ReasonContext) -> bool {
    ctx.window_minutes < 90.0
}

fn under_an_hour(ctx: &ReasonContext) -> bool {
    ctx.window_minutes < 60.0
}

fn always(_: &ReasonContext) -> bool {
    true
}

fn percent_lit(ctx: &ReasonContext) -> u32 {
    (ctx.illumination.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// `45 min` below two hours, `2.5 h` above.
pub fn format_duration(minutes: f64) -> String {
    if minutes < 120.0 {
        format!("{} min", minutes.max(0.0).round() as u32)
    } else {
        format!("{:.1} h", minutes / 60.0)
    }
}

static EXCELLENT: [ReasonRule; 3] = [
    ReasonRule {
        name: "excellent_despite_moon",
        applies: moon_up_and_lit,
        render: |ctx| {
            format!(
                "Excellent: Moon is up ({}% lit) but well away from the core",
                percent_lit(ctx)
            )
        },
    },
    ReasonRule {
        name: "excellent_short",
        applies: under_two_hours,
        render: |ctx| {
            format!(
                "Excellent conditions, but only {} of core visibility",
                format_duration(ctx.window_minutes)
            )
        },
    },
    ReasonRule {
        name: "excellent",
        applies: always,
        render: |ctx| {
            format!(
                "Excellent: dark skies with {} of core visibility",
                format_duration(ctx.window_minutes)
            )
        },
    },
];

static GOOD: [ReasonRule; 3] = [
    ReasonRule {
        name: "good_some_moonlight",
        applies: moon_up_and_lit,
        render: |ctx| {
            format!(
                "Good: some moonlight ({}% lit) during the window",
                percent_lit(ctx)
            )
        },
    },
    ReasonRule {
        name: "good_short",
        applies: under_ninety_minutes,
        render: |ctx| {
            format!(
                "Good conditions over a short {} window",
                format_duration(ctx.window_minutes)
            )
        },
    },
    ReasonRule {
        name: "good",
        applies: always,
        render: |ctx| format!("Good conditions for {}", format_duration(ctx.window_minutes)),
    },
];

static FAIR: [ReasonRule; 4] = [
    ReasonRule {
        name: "fair_bright_moon",
        applies: bright_moon_up,
        render: |ctx| {
            format!(
                "Fair: bright Moon ({}% lit) washes out the core",
                percent_lit(ctx)
            )
        },
    },
    ReasonRule {
        name: "fair_moonlight",
        applies: moon_up_and_lit,
        render: |ctx| {
            format!(
                "Fair: Moon ({}% lit) close to the core",
                percent_lit(ctx)
            )
        },
    },
    ReasonRule {
        name: "fair_brief",
        applies: under_an_hour,
        render: |ctx| format!("Fair: brief {} window", format_duration(ctx.window_minutes)),
    },
    ReasonRule {
        name: "fair",
        applies: always,
        render: |ctx| format!("Fair conditions for {}", format_duration(ctx.window_minutes)),
    },
];

static POOR: [ReasonRule; 4] = [
    ReasonRule {
        name: "poor_bright_moon",
        applies: bright_moon_up,
        render: |ctx| {
            format!(
                "Poor: bright Moon ({}% lit) dominates the sky",
                percent_lit(ctx)
            )
        },
    },
    ReasonRule {
        name: "poor_moonlight",
        applies: moon_up_and_lit,
        render: |ctx| {
            format!(
                "Poor: moonlight ({}% lit) interferes with the core",
                percent_lit(ctx)
            )
        },
    },
    ReasonRule {
        name: "poor_brief",
        applies: under_an_hour,
        render: |ctx| {
            format!(
                "Poor: only {} with the core above the horizon",
                format_duration(ctx.window_minutes)
            )
        },
    },
    ReasonRule {
        name: "poor",
        applies: always,
        render: |_| "Poor conditions".to_string(),
    },
];

/// Rule list for a rating bucket; empty for 0, which only early exits produce.
pub fn rules_for(rating: u8) -> &'static [ReasonRule] {
    match rating {
        4 => &EXCELLENT,
        3 => &GOOD,
        2 => &FAIR,
        1 => &POOR,
        _ => &[],
    }
}

/// Reason text for `rating` given `ctx`.
pub fn select_reason(rating: u8, ctx: &ReasonContext) -> String {
    rules_for(rating)
        .iter()
        .find(|rule| (rule.applies)(ctx))
        .map(|rule| {
            log::trace!("reason rule '{}' selected for rating {}", rule.name, rating);
            (rule.render)(ctx)
        })
        .unwrap_or_else(|| "Not observable".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(illumination: f64, moon_up: bool, window_minutes: f64) -> ReasonContext {
        ReasonContext {
            illumination,
            moon_up,
            window_minutes,
            score: 0.5,
        }
    }

    #[test]
    fn test_every_bucket_ends_with_catch_all() {
        for rating in 1..=4 {
            let rules = rules_for(rating);
            assert!(!rules.is_empty());
            let last = rules.last().unwrap();
            assert!((last.applies)(&ctx(0.0, false, 600.0)));
        }
        assert!(rules_for(0).is_empty());
    }

    #[test]
    fn test_moon_rules_take_precedence_over_length() {
        let reason = select_reason(2, &ctx(0.9, true, 40.0));
        assert_eq!(reason, "Fair: bright Moon (90% lit) washes out the core");

        let reason = select_reason(2, &ctx(0.1, false, 40.0));
        assert_eq!(reason, "Fair: brief 40 min window");
    }

    #[test]
    fn test_moon_below_horizon_is_ignored() {
        let reason = select_reason(4, &ctx(0.95, false, 300.0));
        assert_eq!(reason, "Excellent: dark skies with 5.0 h of core visibility");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45.4), "45 min");
        assert_eq!(format_duration(150.0), "2.5 h");
    }

    #[test]
    fn test_rating_zero_falls_back() {
        assert_eq!(select_reason(0, &ctx(0.0, false, 0.0)), "Not observable");
    }
}
