use thiserror::Error;

use crate::tle::TleParseError;

#[derive(Error, Debug, PartialEq)]
pub enum BrouwerError {
    #[error("TLE decoding error: {0}")]
    TleParse(#[from] TleParseError),

    #[error("eccentricity {0} outside the valid range [0, 1)")]
    BadEccentricity(f64),

    #[error("satellite decayed: {0}")]
    Decayed(String),
}
