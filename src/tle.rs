//! # Two-Line Element decoder
//!
//! Utilities to parse **NORAD/CelesTrak two-line element sets** into a
//! validated [`Tle`] record usable by the propagator initializer.
//!
//! ## Overview
//! -----------------
//! This module provides:
//! - A small error type [`TleParseError`] describing TLE decoding failures.
//! - The [`Tle`] record itself, immutable after construction, with angles in
//!   **degrees** (the surface format) and the epoch as a [`hifitime::Epoch`].
//! - [`Tle::from_lines`] for the canonical name + two-line input, and
//!   [`Tle::from_text`] for a two- or three-line text block.
//!
//! ## Format
//! -----------------
//! Each line is exactly **69 ASCII characters**, fixed-column. Three fields
//! use the TLE packed scientific notation `±DDDDD±E`: the mantissa carries an
//! **implicit leading decimal point** and the trailing signed digit is a
//! base-10 exponent, so `" 81062-5"` decodes to `0.81062 × 10⁻⁵`. The
//! eccentricity field stores seven mantissa digits with the same implicit
//! leading decimal (divide by 10⁷). Misreading these fields by a factor of
//! 10⁵ silently corrupts every downstream number; the regression tests below
//! pin the decoding.
//!
//! ## Checksums
//! -----------------
//! The trailing modulo-10 checksum digit of each line is ignored: the
//! reference implementations do not enforce it and distributed element sets
//! with wrong checksums exist. The decoder never reads column 68.

use std::ops::Range;

use hifitime::Epoch;
use thiserror::Error;

use crate::brouwer_errors::BrouwerError;
use crate::constants::{Degree, JD_1950, JulianDate};
use crate::time::{epoch_from_tle, julian_date};

/// Line-level decoding errors for two-line element sets.
///
/// Variants
/// -----------------
/// * `BadLineLength` – The given line is not 69 ASCII characters.
/// * `BadLinePrefix` – The line does not start with its line number.
/// * `CatalogMismatch` – Lines 1 and 2 name different satellites.
/// * `BadNumeric` – A numeric field failed to parse; payload names the field.
/// * `BadEpoch` – The epoch year/day cannot be reconstructed.
#[derive(Error, Debug, PartialEq)]
pub enum TleParseError {
    #[error("line {0} is not 69 characters long")]
    BadLineLength(u8),
    #[error("line {0} does not begin with its line number")]
    BadLinePrefix(u8),
    #[error("catalog numbers differ between line 1 and line 2")]
    CatalogMismatch,
    #[error("field `{0}` failed numeric parsing")]
    BadNumeric(&'static str),
    #[error("epoch year or day of year out of range")]
    BadEpoch,
}

/// A decoded two-line element set, immutable after construction.
///
/// Units are those of the surface format: angles in **degrees**, mean motion
/// in **revolutions/day** (Kozai convention), `bstar` dimensionless. The
/// initializer converts to radians and radians/minute.
#[derive(Debug, Clone, PartialEq)]
pub struct Tle {
    pub name: Option<String>,
    pub catalog_number: u32,
    pub classification: char,
    pub international_designator: String,
    pub epoch: Epoch,
    pub epoch_julian_date: JulianDate,
    /// First time derivative of mean motion over two, rev/day².
    pub mean_motion_dot_over_2: f64,
    /// Second derivative over six, rev/day³ (packed-exponent field).
    pub mean_motion_ddot_over_6: f64,
    /// Drag-like ballistic coefficient, dimensionless (packed-exponent field).
    pub bstar: f64,
    pub element_set_number: u32,
    pub inclination: Degree,
    pub raan: Degree,
    pub eccentricity: f64,
    pub argument_of_perigee: Degree,
    pub mean_anomaly: Degree,
    /// Kozai mean motion, rev/day.
    pub mean_motion: f64,
    pub revolution_number: u32,
}

impl Tle {
    /// Decode a TLE from an optional name line and the two element lines.
    ///
    /// Arguments
    /// -----------------
    /// * `name` – free-form satellite label, or `None`.
    /// * `line1`, `line2` – the two 69-character element lines.
    ///
    /// Return
    /// ----------
    /// * The validated record, or a [`BrouwerError::TleParse`] naming the
    ///   offending line or field.
    pub fn from_lines(name: Option<&str>, line1: &str, line2: &str) -> Result<Tle, BrouwerError> {
        check_line(line1, 1, '1')?;
        check_line(line2, 2, '2')?;

        let catalog_number = parse_u32(line1, 2..7, "catalog_number")?;
        if catalog_number != parse_u32(line2, 2..7, "catalog_number")? {
            return Err(TleParseError::CatalogMismatch.into());
        }

        let epoch_year = parse_u32(line1, 18..20, "epoch_year")?;
        let epoch_day = parse_f64(line1, 20..32, "epoch_day")?;
        let epoch =
            epoch_from_tle(epoch_year, epoch_day).ok_or(TleParseError::BadEpoch)?;

        let mean_motion = parse_f64(line2, 52..63, "mean_motion")?;
        if mean_motion <= 0.0 {
            return Err(TleParseError::BadNumeric("mean_motion").into());
        }

        Ok(Tle {
            name: name.map(str::trim).filter(|n| !n.is_empty()).map(String::from),
            catalog_number,
            classification: line1.as_bytes()[7] as char,
            international_designator: field(line1, 9..17).to_string(),
            epoch_julian_date: julian_date(&epoch),
            epoch,
            mean_motion_dot_over_2: parse_f64(line1, 33..43, "mean_motion_dot")?,
            mean_motion_ddot_over_6: parse_packed(line1, 44..52, "mean_motion_ddot")?,
            bstar: parse_packed(line1, 53..61, "bstar")?,
            element_set_number: parse_u32(line1, 64..68, "element_set_number")?,
            inclination: parse_f64(line2, 8..16, "inclination")?,
            raan: parse_f64(line2, 17..25, "raan")?,
            eccentricity: parse_u32(line2, 26..33, "eccentricity")? as f64 / 1.0e7,
            argument_of_perigee: parse_f64(line2, 34..42, "argument_of_perigee")?,
            mean_anomaly: parse_f64(line2, 43..51, "mean_anomaly")?,
            mean_motion,
            revolution_number: parse_u32(line2, 63..68, "revolution_number")?,
        })
    }

    /// Decode a TLE from a two- or three-line text block (line 0 is the name).
    pub fn from_text(text: &str) -> Result<Tle, BrouwerError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        match lines.as_slice() {
            [line1, line2] => Tle::from_lines(None, line1, line2),
            [name, line1, line2] => Tle::from_lines(Some(name), line1, line2),
            _ => Err(TleParseError::BadLineLength(1).into()),
        }
    }

    /// Epoch expressed as days since 1950 January 0.0 (deep-space time origin).
    pub fn days_since_1950(&self) -> f64 {
        self.epoch_julian_date - JD_1950
    }
}

fn check_line(line: &str, which: u8, prefix: char) -> Result<(), TleParseError> {
    if !line.is_ascii() || line.len() != 69 {
        return Err(TleParseError::BadLineLength(which));
    }
    if !line.starts_with(prefix) {
        return Err(TleParseError::BadLinePrefix(which));
    }
    Ok(())
}

/// Fixed-column substring, whitespace-trimmed. Columns are 0-based bytes.
fn field(line: &str, range: Range<usize>) -> &str {
    line[range].trim()
}

fn parse_f64(line: &str, range: Range<usize>, name: &'static str) -> Result<f64, TleParseError> {
    field(line, range)
        .parse()
        .map_err(|_| TleParseError::BadNumeric(name))
}

/// Unsigned integer field; an all-blank field decodes to zero (historical
/// element sets leave the element-set and revolution counters blank).
fn parse_u32(line: &str, range: Range<usize>, name: &'static str) -> Result<u32, TleParseError> {
    let raw = field(line, range);
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(|_| TleParseError::BadNumeric(name))
}

/// Decode the packed `±DDDDD±E` scientific field: implicit leading decimal
/// point before the mantissa digits, single signed exponent digit. The sign
/// is recognized only at position 0; an all-blank field is zero.
fn parse_packed(line: &str, range: Range<usize>, name: &'static str) -> Result<f64, TleParseError> {
    let raw = &line[range];
    if raw.trim().is_empty() {
        return Ok(0.0);
    }
    let sign = if raw.as_bytes()[0] == b'-' { -1.0 } else { 1.0 };
    let digits = raw[1..6].trim();
    let mantissa: f64 = if digits.is_empty() {
        0.0
    } else {
        format!("0.{digits}")
            .parse()
            .map_err(|_| TleParseError::BadNumeric(name))?
    };
    let exponent: i32 = raw[6..8]
        .trim()
        .parse()
        .map_err(|_| TleParseError::BadNumeric(name))?;
    Ok(sign * mantissa * 10f64.powi(exponent))
}

#[cfg(test)]
mod tle_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    const LINE1_06251: &str =
        "1 06251U 62025E   06176.82412014  .00008885  00000-0  12808-3 0  3985";
    const LINE2_06251: &str =
        "2 06251  58.0579  54.0425 0030035 139.1568 221.1854 15.56387291  6774";

    #[test]
    fn test_decode_round_trip() {
        let tle = Tle::from_lines(Some("DELTA 1 DEB"), LINE1_06251, LINE2_06251).unwrap();
        assert_eq!(tle.name.as_deref(), Some("DELTA 1 DEB"));
        assert_eq!(tle.catalog_number, 6251);
        assert_eq!(tle.classification, 'U');
        assert_eq!(tle.international_designator, "62025E");
        assert_eq!(tle.element_set_number, 398);
        assert_eq!(tle.revolution_number, 677);
        // Numeric fields reproduced to at least 9 significant digits.
        assert_eq!(tle.mean_motion_dot_over_2, 0.00008885);
        assert_eq!(tle.mean_motion_ddot_over_6, 0.0);
        assert_abs_diff_eq!(tle.bstar, 0.12808e-3, epsilon = 1e-15);
        assert_eq!(tle.inclination, 58.0579);
        assert_eq!(tle.raan, 54.0425);
        assert_eq!(tle.eccentricity, 0.0030035);
        assert_eq!(tle.argument_of_perigee, 139.1568);
        assert_eq!(tle.mean_anomaly, 221.1854);
        assert_eq!(tle.mean_motion, 15.56387291);
        let (year, month, day, ..) = tle.epoch.to_gregorian_utc();
        assert_eq!((year, month, day), (2006, 6, 25));
    }

    #[test]
    fn test_packed_mantissa_regression() {
        // A decoder missing the implicit decimal point yields 0.81062·10⁵
        // instead of 0.81062·10⁻⁵; this pins the correct scaling.
        let decode = |raw: &str| parse_packed(raw, 0..8, "bstar").unwrap();
        assert_abs_diff_eq!(decode(" 81062-5"), 0.81062e-5, epsilon = 1e-18);
        assert_abs_diff_eq!(decode("-11606-4"), -0.11606e-4, epsilon = 1e-17);
        assert_eq!(decode(" 00000-0"), 0.0);
        assert_eq!(decode(" 00000+0"), 0.0);
        assert_eq!(decode("        "), 0.0);
        assert_abs_diff_eq!(decode(" 13844-3"), 0.13844e-3, epsilon = 1e-16);
    }

    #[test]
    fn test_blank_optional_fields() {
        // Satellite 11801 leaves the designator and counters blank.
        let line1 = "1 11801U          80230.29629788  .01431103  00000-0  14311-1       8";
        let line2 = "2 11801  46.7916 230.4354 7318036  47.4722  10.4117  2.28537848    13";
        let tle = Tle::from_lines(None, line1, line2).unwrap();
        assert_eq!(tle.international_designator, "");
        assert_eq!(tle.element_set_number, 0);
        assert_eq!(tle.revolution_number, 1);
        assert_eq!(tle.eccentricity, 0.7318036);
        assert_abs_diff_eq!(tle.bstar, 0.14311e-1, epsilon = 1e-12);
    }

    #[test]
    fn test_from_text_three_lines() {
        let text = format!("ECHO 1 DEB\n{LINE1_06251}\n{LINE2_06251}\n");
        let tle = Tle::from_text(&text).unwrap();
        assert_eq!(tle.name.as_deref(), Some("ECHO 1 DEB"));
        assert_eq!(tle.catalog_number, 6251);
    }

    #[test]
    fn test_bad_line_length() {
        let err = Tle::from_lines(None, &LINE1_06251[..68], LINE2_06251).unwrap_err();
        assert_eq!(
            err,
            BrouwerError::TleParse(TleParseError::BadLineLength(1))
        );
    }

    #[test]
    fn test_bad_line_prefix() {
        let swapped = format!("3{}", &LINE2_06251[1..]);
        let err = Tle::from_lines(None, LINE1_06251, &swapped).unwrap_err();
        assert_eq!(
            err,
            BrouwerError::TleParse(TleParseError::BadLinePrefix(2))
        );
    }

    #[test]
    fn test_catalog_mismatch() {
        let other = format!("2 06252{}", &LINE2_06251[7..]);
        let err = Tle::from_lines(None, LINE1_06251, &other).unwrap_err();
        assert_eq!(err, BrouwerError::TleParse(TleParseError::CatalogMismatch));
    }

    #[test]
    fn test_bad_numeric_field() {
        let broken = format!("{}xx.0425{}", &LINE2_06251[..17], &LINE2_06251[24..]);
        assert_eq!(broken.len(), 69);
        let err = Tle::from_lines(None, LINE1_06251, &broken).unwrap_err();
        assert_eq!(
            err,
            BrouwerError::TleParse(TleParseError::BadNumeric("raan"))
        );
    }

    #[test]
    fn test_bad_epoch_day() {
        let broken = format!("{}99399.82412014{}", &LINE1_06251[..18], &LINE1_06251[32..]);
        assert_eq!(broken.len(), 69);
        let err = Tle::from_lines(None, LINE1_06251, &broken).unwrap_err();
        assert_eq!(err, BrouwerError::TleParse(TleParseError::BadEpoch));
    }
}
