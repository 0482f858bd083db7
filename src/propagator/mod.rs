//! # SGP4/SDP4 propagator
//!
//! Builds an immutable propagator state from a decoded [`Tle`] and produces
//! TEME position/velocity at any signed offset in minutes from the epoch.
//!
//! ## Overview
//! -----------------
//! The propagator is a tagged variant over the two analytic regimes:
//! - [`Propagator::NearEarth`] – orbital period below 225 minutes; pure SGP4.
//! - [`Propagator::DeepSpace`] – period ≥ 225 minutes; SGP4 secular terms plus
//!   the lunisolar and geopotential-resonance extension (SDP4).
//!
//! ## Hidden state
//! -----------------
//! The only mutable piece of the whole model is the deep-space resonance
//! integrator's `(xli, xni, atime)` triple, kept in a separate
//! [`ResonanceState`] companion rather than inside the propagator.
//! [`Propagator::propagate`] starts every call from a fresh companion, so it
//! is a pure function of Δt; callers advancing monotonically can hold a
//! [`ResonanceState`] and use [`Propagator::propagate_with_cache`] to avoid
//! re-integrating from the epoch. The integrator restarts itself whenever the
//! requested offset reverses direction or moves back toward the epoch.
//!
//! ## Units
//! -----------------
//! Positions in **km**, velocities in **km/s**, both in the TEME frame of the
//! element-set epoch. Offsets in **minutes**.

pub(crate) mod deep_space;
pub(crate) mod init;
pub(crate) mod near_earth;

use nalgebra::Vector3;

use crate::brouwer_errors::BrouwerError;
use crate::constants::Minute;
use crate::gravity::GravityModel;
use crate::tle::Tle;

pub use deep_space::DeepSpaceModel;
pub use init::NearEarthModel;

/// A TEME state vector produced by the propagator.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteState {
    /// Position, km, TEME.
    pub position: Vector3<f64>,
    /// Velocity, km/s, TEME.
    pub velocity: Vector3<f64>,
    /// The offset that produced this state.
    pub minutes_since_epoch: Minute,
}

/// Geopotential resonance class of a deep-space orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResonanceKind {
    None,
    /// 12-hour orbits (tesseral resonance, high eccentricity).
    SemiSynchronous,
    /// 24-hour orbits.
    Synchronous,
}

/// Mutable companion of a deep-space propagator: the resonance integrator
/// cache. One per logical propagation sequence; never shared across
/// concurrent consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResonanceState {
    pub(crate) atime: Minute,
    pub(crate) xli: f64,
    pub(crate) xni: f64,
}

/// An immutable satellite propagator, built once from a TLE.
#[derive(Debug, Clone)]
pub enum Propagator {
    NearEarth(NearEarthModel),
    DeepSpace {
        common: NearEarthModel,
        deep: DeepSpaceModel,
    },
}

impl Propagator {
    /// Build a propagator from a decoded element set.
    ///
    /// Recovers the Brouwer mean elements from the Kozai mean motion,
    /// precomputes every drag and secular coefficient, and selects the
    /// near-earth or deep-space regime. Fails with
    /// [`BrouwerError::BadEccentricity`] or [`BrouwerError::Decayed`] when the
    /// elements do not describe an orbiting satellite.
    pub fn new(tle: &Tle, gravity: &GravityModel) -> Result<Propagator, BrouwerError> {
        init::build(tle, gravity)
    }

    pub fn is_deep_space(&self) -> bool {
        matches!(self, Propagator::DeepSpace { .. })
    }

    pub fn resonance(&self) -> ResonanceKind {
        match self {
            Propagator::NearEarth(_) => ResonanceKind::None,
            Propagator::DeepSpace { deep, .. } => deep.resonance,
        }
    }

    /// A fresh resonance integrator cache for this satellite.
    pub fn resonance_state(&self) -> ResonanceState {
        match self {
            Propagator::NearEarth(_) => ResonanceState {
                atime: 0.0,
                xli: 0.0,
                xni: 0.0,
            },
            Propagator::DeepSpace { common, deep } => ResonanceState {
                atime: 0.0,
                xli: deep.xlamo,
                xni: common.no_unkozai,
            },
        }
    }

    /// TEME state at `minutes_since_epoch` (signed).
    ///
    /// Pure: repeated calls with the same offset return identical results.
    /// Deep-space resonance is integrated from the epoch on every call; for
    /// long monotone sampling sequences prefer
    /// [`Propagator::propagate_with_cache`].
    pub fn propagate(&self, minutes_since_epoch: Minute) -> Result<SatelliteState, BrouwerError> {
        let mut cache = self.resonance_state();
        self.propagate_with_cache(&mut cache, minutes_since_epoch)
    }

    /// TEME state at `minutes_since_epoch`, reusing `cache` across calls.
    ///
    /// The cache is only consulted by resonant deep-space orbits. Successive
    /// calls that advance away from the epoch in one direction resume the
    /// integrator from its last step; a direction reversal (or a target
    /// closer to the epoch than the cached time) resets it.
    pub fn propagate_with_cache(
        &self,
        cache: &mut ResonanceState,
        minutes_since_epoch: Minute,
    ) -> Result<SatelliteState, BrouwerError> {
        match self {
            Propagator::NearEarth(model) => near_earth::propagate(model, minutes_since_epoch),
            Propagator::DeepSpace { common, deep } => {
                deep_space::propagate(common, deep, cache, minutes_since_epoch)
            }
        }
    }
}
