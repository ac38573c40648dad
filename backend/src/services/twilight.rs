//! Astronomical night boundaries.
//!
//! Dusk is the Sun descending through -18° after local noon of the date; dawn
//! is the Sun climbing through -18° on the following local day. Either may be
//! missing at high latitudes around the summer solstice.

use chrono::NaiveDate;
use log::warn;

use crate::ephemeris::EphemerisAdapter;
use crate::models::time::{add_hours, hours_between};
use crate::models::{Location, NightWindow};

/// Night search runs from local noon of the date to local midnight ending
/// the following day.
pub const NIGHT_SEARCH_HOURS: f64 = 36.0;

/// Dusk of `date` and dawn of `date + 1` at `location`.
pub fn locate_night(
    ephemeris: &dyn EphemerisAdapter,
    date: NaiveDate,
    location: &Location,
) -> NightWindow {
    let search_start = location.local_noon(date);
    let search_end = add_hours(search_start, NIGHT_SEARCH_HOURS);
    let nights = match ephemeris.astronomical_nights(location, search_start, search_end) {
        Ok(nights) => nights,
        Err(e) => {
            warn!("Astronomical night search failed for {}: {}", date, e);
            return NightWindow::new(None, None);
        }
    };

    // Interval ends pinned to the search bounds are not crossings.
    let dusk_limit = add_hours(search_start, 24.0);
    let dusk = nights
        .iter()
        .map(|&(start, _)| start)
        .find(|&start| start > search_start && start <= dusk_limit);

    let next_midnight = add_hours(search_start, 12.0);
    let dawn = nights
        .iter()
        .map(|&(_, end)| end)
        .find(|&end| end > next_midnight && end < search_end);

    NightWindow::new(dusk, dawn)
}

/// Hours between dusk and dawn, wrapped by a day when not positive.
///
/// `None` when either boundary is missing.
pub fn calculate_dark_duration(window: &NightWindow) -> Option<f64> {
    let (start, end) = window.bounds()?;
    let hours = hours_between(start, end);
    Some(if hours <= 0.0 { hours + 24.0 } else { hours })
}
