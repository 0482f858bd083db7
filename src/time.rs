//! # TLE epoch handling and sidereal time
//!
//! A TLE carries its epoch as a two-digit year and a 1-based fractional
//! day-of-year. This module reconstructs that instant as a
//! [`hifitime::Epoch`], exposes it as a Julian date, and provides the
//! IAU-1982 Greenwich mean sidereal time polynomial the deep-space
//! initialization needs.
//!
//! Conventions
//! -----------------
//! * Two-digit years below 57 map to 20YY, the rest to 19YY (the element-set
//!   era convention, valid 1957–2056).
//! * The day-of-year → month/day split uses the simple `year % 4` leap rule,
//!   which is exact inside that era.

use hifitime::{Epoch, TimeScale};

use crate::constants::{DPI, JulianDate, RADEG, Radian};

/// Days in each month, non-leap year.
const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Reconstruct a TLE epoch from its packed form.
///
/// Arguments
/// -----------------
/// * `two_digit_year`: the `YY` field of line 1.
/// * `day_of_year`: 1-based fractional day of the year; the fraction carries
///   the time of day.
///
/// Return
/// ----------
/// * The reconstructed instant, or `None` when the day count is outside
///   [1, 367) or the resulting calendar date cannot be represented.
pub fn epoch_from_tle(two_digit_year: u32, day_of_year: f64) -> Option<Epoch> {
    if !(1.0..367.0).contains(&day_of_year) {
        return None;
    }
    let year = two_digit_year as i32 + if two_digit_year < 57 { 2000 } else { 1900 };
    let leap = year % 4 == 0;

    let mut remaining = day_of_year.trunc() as u32;
    let mut month = 1;
    for (index, length) in MONTH_LENGTHS.iter().enumerate() {
        let length = if index == 1 && leap { length + 1 } else { *length };
        if remaining <= length {
            break;
        }
        remaining -= length;
        month += 1;
    }
    if month > 12 {
        return None;
    }

    let fraction = day_of_year.fract();
    let hour = (fraction * 24.0).trunc();
    let minute = ((fraction * 24.0 - hour) * 60.0).trunc();
    let second = ((fraction * 24.0 - hour) * 60.0 - minute) * 60.0;
    let nanos = (((second - second.trunc()) * 1e9).round() as u32).min(999_999_999);

    Epoch::maybe_from_gregorian(
        year,
        month as u8,
        remaining as u8,
        hour as u8,
        minute as u8,
        second.trunc() as u8,
        nanos,
        TimeScale::UTC,
    )
    .ok()
}

/// Julian date (UTC days) of an epoch.
pub fn julian_date(epoch: &Epoch) -> JulianDate {
    epoch.to_jde_utc_days()
}

/// Greenwich mean sidereal time at `jd_ut1`, IAU-1982 polynomial, in [0, 2π).
pub fn gstime(jd_ut1: JulianDate) -> Radian {
    let tut1 = (jd_ut1 - 2_451_545.0) / 36_525.0;
    let seconds = -6.2e-6 * tut1 * tut1 * tut1
        + 0.093104 * tut1 * tut1
        + (876_600.0 * 3600.0 + 8_640_184.812866) * tut1
        + 67_310.54841;
    // 360°/86400 s: divide by 240 to go from seconds of time to degrees
    (seconds * RADEG / 240.0).rem_euclid(DPI)
}
