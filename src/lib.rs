pub mod brouwer_errors;
pub mod constants;
pub mod gravity;
mod kepler;
pub mod propagator;
pub mod time;
pub mod tle;

pub use brouwer_errors::BrouwerError;
pub use gravity::GravityModel;
pub use propagator::{Propagator, ResonanceKind, ResonanceState, SatelliteState};
pub use tle::{Tle, TleParseError};
