//! Low-precision lunar theory.
//!
//! The largest periodic terms of Meeus, *Astronomical Algorithms*, Ch. 47
//! (Tables 47.A/47.B), about 0.3° in position. The Sun only enters through
//! its ecliptic longitude, for the phase.

use super::{normalize_degrees, Equatorial};

/// Mean Earth-Sun distance, km.
const AU_KM: f64 = 149_597_870.7;

/// Geocentric position of the Moon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonCoordinates {
    /// Ecliptic longitude, degrees
    pub longitude: f64,
    /// Ecliptic latitude, degrees
    pub latitude: f64,
    pub distance_km: f64,
    pub equatorial: Equatorial,
}

/// Phase in [0, 1) (0 new, 0.5 full) and illuminated fraction.
pub fn phase_and_fraction(t: f64) -> (f64, f64) {
    let moon = moon_coordinates(t);
    let sun_longitude = sun_longitude(t);

    let d_lon = (moon.longitude - sun_longitude).to_radians();
    let elongation = (moon.latitude.to_radians().cos() * d_lon.cos())
        .clamp(-1.0, 1.0)
        .acos();
    let phase_angle =
        (AU_KM * elongation.sin()).atan2(moon.distance_km - AU_KM * elongation.cos());

    let fraction = (1.0 + phase_angle.cos()) / 2.0;
    let phase = normalize_degrees(moon.longitude - sun_longitude) / 360.0;
    (phase, fraction)
}

/// Apparent ecliptic longitude of the Sun, degrees (Meeus Ch. 25, low accuracy).
fn sun_longitude(t: f64) -> f64 {
    let l0 = 280.46646 + t * (36000.76983 + t * 0.0003032);
    let m = (357.52911 + t * (35999.05029 - t * 0.0001537)).to_radians();
    let center = m.sin() * (1.914602 - t * (0.004817 + t * 0.000014))
        + (2.0 * m).sin() * (0.019993 - t * 0.000101)
        + (3.0 * m).sin() * 0.000289;
    normalize_degrees(l0 + center)
}

fn ecliptic_to_equatorial(longitude: f64, latitude: f64, obliquity: f64) -> Equatorial {
    let (lon, lat, eps) = (
        longitude.to_radians(),
        latitude.to_radians(),
        obliquity.to_radians(),
    );
    let ra = (lon.sin() * eps.cos() - lat.tan() * eps.sin()).atan2(lon.cos());
    let dec = (lat.sin() * eps.cos() + lat.cos() * eps.sin() * lon.sin())
        .clamp(-1.0, 1.0)
        .asin();
    Equatorial::new(normalize_degrees(ra.to_degrees()), dec.to_degrees())
}

fn obliquity(t: f64) -> f64 {
    let mean = 23.0
        + (26.0 + (21.448 - t * (46.815 + t * (0.00059 - t * 0.001813))) / 60.0) / 60.0;
    mean + 0.00256 * (125.04 - 1934.136 * t).to_radians().cos()
}

// (D, M, M', F, Σl [1e-6 deg], Σr [1e-3 km])
const LONGITUDE_DISTANCE_TERMS: [(f64, f64, f64, f64, f64, f64); 20] = [
    (0.0, 0.0, 1.0, 0.0, 6_288_774.0, -20_905_355.0),
    (2.0, 0.0, -1.0, 0.0, 1_274_027.0, -3_699_111.0),
    (2.0, 0.0, 0.0, 0.0, 658_314.0, -2_955_968.0),
    (0.0, 0.0, 2.0, 0.0, 213_618.0, -569_925.0),
    (0.0, 1.0, 0.0, 0.0, -185_116.0, 48_888.0),
    (0.0, 0.0, 0.0, 2.0, -114_332.0, -3_149.0),
    (2.0, 0.0, -2.0, 0.0, 58_793.0, 246_158.0),
    (2.0, -1.0, -1.0, 0.0, 57_066.0, -152_138.0),
    (2.0, 0.0, 1.0, 0.0, 53_322.0, -170_733.0),
    (2.0, -1.0, 0.0, 0.0, 45_758.0, -204_586.0),
    (0.0, 1.0, -1.0, 0.0, -40_923.0, -129_620.0),
    (1.0, 0.0, 0.0, 0.0, -34_720.0, 108_743.0),
    (0.0, 1.0, 1.0, 0.0, -30_383.0, 104_755.0),
    (2.0, 0.0, 0.0, -2.0, 15_327.0, 10_321.0),
    (0.0, 0.0, 1.0, 2.0, -12_528.0, 0.0),
    (0.0, 0.0, 1.0, -2.0, 10_980.0, 79_661.0),
    (4.0, 0.0, -1.0, 0.0, 10_675.0, -34_782.0),
    (0.0, 0.0, 3.0, 0.0, 10_034.0, -23_210.0),
    (4.0, 0.0, -2.0, 0.0, 8_548.0, -21_636.0),
    (2.0, 1.0, -1.0, 0.0, -7_888.0, 24_208.0),
];

// (D, M, M', F, Σb [1e-6 deg])
const LATITUDE_TERMS: [(f64, f64, f64, f64, f64); 20] = [
    (0.0, 0.0, 0.0, 1.0, 5_128_122.0),
    (0.0, 0.0, 1.0, 1.0, 280_602.0),
    (0.0, 0.0, 1.0, -1.0, 277_693.0),
    (2.0, 0.0, 0.0, -1.0, 173_237.0),
    (2.0, 0.0, -1.0, 1.0, 55_413.0),
    (2.0, 0.0, -1.0, -1.0, 46_271.0),
    (2.0, 0.0, 0.0, 1.0, 32_573.0),
    (0.0, 0.0, 2.0, 1.0, 17_198.0),
    (2.0, 0.0, 1.0, -1.0, 9_266.0),
    (0.0, 0.0, 2.0, -1.0, 8_822.0),
    (2.0, -1.0, 0.0, -1.0, 8_216.0),
    (2.0, 0.0, -2.0, -1.0, 4_324.0),
    (2.0, 0.0, 1.0, 1.0, 4_200.0),
    (2.0, 1.0, 0.0, -1.0, -3_359.0),
    (2.0, -1.0, -1.0, 1.0, 2_463.0),
    (2.0, -1.0, 0.0, 1.0, 2_211.0),
    (2.0, -1.0, -1.0, -1.0, 2_065.0),
    (0.0, 1.0, -1.0, -1.0, -1_870.0),
    (4.0, 0.0, -1.0, -1.0, 1_828.0),
    (0.0, 1.0, 0.0, 1.0, -1_794.0),
];

/// Geocentric Moon at `t` Julian centuries from J2000.0.
pub fn moon_coordinates(t: f64) -> MoonCoordinates {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let lp = normalize_degrees(
        218.3164477 + 481_267.881_234_21 * t - 0.0015786 * t2 + t3 / 538_841.0
            - t4 / 65_194_000.0,
    );
    let d = normalize_degrees(
        297.8501921 + 445_267.111_403_4 * t - 0.0018819 * t2 + t3 / 545_868.0
            - t4 / 113_065_000.0,
    );
    let m = normalize_degrees(
        357.5291092 + 35_999.050_290_9 * t - 0.0001536 * t2 + t3 / 24_490_000.0,
    );
    let mp = normalize_degrees(
        134.9633964 + 477_198.867_505_5 * t + 0.0087414 * t2 + t3 / 69_699.0
            - t4 / 14_712_000.0,
    );
    let f = normalize_degrees(
        93.2720950 + 483_202.017_523_3 * t - 0.0036539 * t2 - t3 / 3_526_000.0
            + t4 / 863_310_000.0,
    );

    // Eccentricity correction for terms involving the Sun's anomaly.
    let e = 1.0 - 0.002516 * t - 0.0000074 * t2;
    let e_factor = |tm: f64| match tm.abs() as i32 {
        1 => e,
        2 => e * e,
        _ => 1.0,
    };

    let (mut sum_l, mut sum_r) = (0.0_f64, 0.0_f64);
    for &(td, tm, tmp, tf, cl, cr) in &LONGITUDE_DISTANCE_TERMS {
        let arg = (td * d + tm * m + tmp * mp + tf * f).to_radians();
        sum_l += cl * e_factor(tm) * arg.sin();
        sum_r += cr * e_factor(tm) * arg.cos();
    }
    let mut sum_b = 0.0_f64;
    for &(td, tm, tmp, tf, cb) in &LATITUDE_TERMS {
        let arg = (td * d + tm * m + tmp * mp + tf * f).to_radians();
        sum_b += cb * e_factor(tm) * arg.sin();
    }

    let a1 = normalize_degrees(119.75 + 131.849 * t).to_radians();
    let a2 = normalize_degrees(53.09 + 479_264.290 * t).to_radians();
    let a3 = normalize_degrees(313.45 + 481_266.484 * t).to_radians();
    let (lp_r, f_r, mp_r) = (lp.to_radians(), f.to_radians(), mp.to_radians());

    sum_l += 3958.0 * a1.sin() + 1962.0 * (lp_r - f_r).sin() + 318.0 * a2.sin();
    sum_b += -2235.0 * lp_r.sin() + 382.0 * a3.sin() + 175.0 * (a1 - f_r).sin()
        + 175.0 * (a1 + f_r).sin()
        + 127.0 * (lp_r - mp_r).sin()
        - 115.0 * (lp_r + mp_r).sin();

    let longitude = normalize_degrees(lp + sum_l / 1_000_000.0);
    let latitude = sum_b / 1_000_000.0;

    MoonCoordinates {
        longitude,
        latitude,
        distance_km: 385_000.56 + sum_r / 1000.0,
        equatorial: ecliptic_to_equatorial(longitude, latitude, obliquity(t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModifiedJulianDate;
    use chrono::{TimeZone, Utc};

    fn centuries(y: i32, m: u32, d: u32, h: u32) -> f64 {
        let instant = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        ModifiedJulianDate::from_datetime(instant).julian_centuries()
    }

    #[test]
    fn test_meeus_example_47a() {
        // 1992 April 12, 0h TD
        let moon = moon_coordinates(centuries(1992, 4, 12, 0));
        assert!((moon.longitude - 133.17).abs() < 0.5, "lon {}", moon.longitude);
        assert!((moon.latitude - (-3.23)).abs() < 0.5, "lat {}", moon.latitude);
        assert!((moon.distance_km - 368_409.0).abs() < 2000.0);
    }

    #[test]
    fn test_sun_longitude_at_june_solstice() {
        let lon = sun_longitude(centuries(2024, 6, 20, 21));
        assert!((lon - 90.0).abs() < 0.1, "lon {}", lon);
    }

    #[test]
    fn test_phase_at_full_and_new_moon() {
        // Full moon 2025-01-13 22:27 UTC, new moon 2025-01-29 12:36 UTC
        let (phase, fraction) = phase_and_fraction(centuries(2025, 1, 13, 22));
        assert!(fraction > 0.98, "full {}", fraction);
        assert!((phase - 0.5).abs() < 0.03);

        let (phase, fraction) = phase_and_fraction(centuries(2025, 1, 29, 12));
        assert!(fraction < 0.02, "new {}", fraction);
        assert!(phase < 0.03 || phase > 0.97);
    }
}
