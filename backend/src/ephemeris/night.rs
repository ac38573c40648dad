//! Astronomical night periods.
//!
//! Periods when the Sun's centre is more than 18° below the horizon, found
//! with the siderust solar altitude search.

use chrono::{DateTime, Utc};
use qtty::{Degrees, Meter, Quantity};
use siderust::astro::ModifiedJulianDate as SiderustMJD;
use siderust::calculus::solar::altitude_periods::{find_night_periods, twilight};
use siderust::coordinates::centers::ObserverSite;
use siderust::time::Period as SiderustPeriod;

use crate::models::{Location, ModifiedJulianDate};

/// Astronomical night intervals overlapping `[start, end]`, clipped to it.
///
/// Empty when the Sun never gets below -18° in the search window.
pub fn compute_astronomical_nights(
    location: &Location,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let site = ObserverSite::new(
        Degrees::new(location.lng),
        Degrees::new(location.lat),
        Quantity::<Meter>::new(location.elevation()),
    );

    let start_mjd = SiderustMJD::new(ModifiedJulianDate::from_datetime(start).value());
    let stop_mjd = SiderustMJD::new(ModifiedJulianDate::from_datetime(end).value());
    let search_period = SiderustPeriod::new(start_mjd, stop_mjd);

    find_night_periods(site, search_period, twilight::ASTRONOMICAL)
        .unwrap_or_default()
        .into_iter()
        .map(|p| {
            (
                ModifiedJulianDate::from(p.start.value()).to_datetime(),
                ModifiedJulianDate::from(p.end.value()).to_datetime(),
            )
        })
        .collect()
}
