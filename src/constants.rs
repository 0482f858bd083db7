// Shared numeric constants and unit aliases for the propagator.

pub const DPI: f64 = 2. * std::f64::consts::PI;
pub const RADEG: f64 = std::f64::consts::PI / 180.0; // Degrees -> radians conversion factor

pub const MINUTES_PER_DAY: f64 = 1440.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Exponent used to recover a semi-major axis from a mean motion (Kepler's third law).
pub const X2O3: f64 = 2.0 / 3.0;

/// Earth rotation rate with respect to the mean equinox, rad/min (IAU-1982).
pub const EARTH_ROTATION: f64 = 4.375_269_088_011_299_66e-3;

/// Julian date of 1950 January 0.0, origin of the deep-space day count.
pub const JD_1950: f64 = 2_433_281.5;

// type def
pub type Degree = f64;
pub type Radian = f64;
pub type Kilometer = f64;
pub type KilometerPerSecond = f64;
/// Time offset from the element-set epoch, in minutes.
pub type Minute = f64;
/// Julian date in UTC days
pub type JulianDate = f64;
