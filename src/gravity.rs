//! # Earth gravity models
//!
//! Frozen constant tables consumed by the propagator initializer. SGP4 is
//! defined against **WGS-72**; substituting WGS-84 constants produces
//! km-scale disagreements with the published reference ephemerides, so
//! [`GravityModel::wgs72`] is the model every verification test uses. The
//! other two sets are provided for compatibility with historical element
//! sets and with implementations that predate the recomputed `xke`.

/// A set of geopotential constants, plus the derived quantities SGP4 needs.
///
/// Units
/// -----------------
/// * `earth_radius_km`: equatorial radius, km
/// * `mu`: geocentric gravitational parameter, km³/s²
/// * `xke`: reciprocal of the time unit, `60/√(Rₑ³/μ)` (min⁻¹ scale factor)
/// * `tumin`: time unit in minutes, `1/xke`
/// * `j2`, `j3`, `j4`: unnormalized zonal harmonics, dimensionless
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityModel {
    pub earth_radius_km: f64,
    pub mu: f64,
    pub xke: f64,
    pub tumin: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j3_over_j2: f64,
}

impl GravityModel {
    /// WGS-72, the SGP4 reference model.
    pub fn wgs72() -> Self {
        let earth_radius_km: f64 = 6378.135;
        let mu: f64 = 398600.8;
        let xke = 60.0 / (earth_radius_km * earth_radius_km * earth_radius_km / mu).sqrt();
        let j2 = 0.001082616;
        let j3 = -0.00000253881;
        let j4 = -0.00000165597;
        GravityModel {
            earth_radius_km,
            mu,
            xke,
            tumin: 1.0 / xke,
            j2,
            j3,
            j4,
            j3_over_j2: j3 / j2,
        }
    }

    /// WGS-72 with the historical low-precision `xke` (Spacetrack Report #3 era).
    pub fn wgs72_old() -> Self {
        let xke = 0.0743669161;
        let j2 = 0.001082616;
        let j3 = -0.00000253881;
        let j4 = -0.00000165597;
        GravityModel {
            earth_radius_km: 6378.135,
            mu: 398600.79964,
            xke,
            tumin: 1.0 / xke,
            j2,
            j3,
            j4,
            j3_over_j2: j3 / j2,
        }
    }

    /// WGS-84. Not the SGP4 reference; provided for experimentation only.
    pub fn wgs84() -> Self {
        let earth_radius_km: f64 = 6378.137;
        let mu: f64 = 398600.5;
        let xke = 60.0 / (earth_radius_km * earth_radius_km * earth_radius_km / mu).sqrt();
        let j2 = 0.00108262998905;
        let j3 = -0.00000253215306;
        let j4 = -0.00000161098761;
        GravityModel {
            earth_radius_km,
            mu,
            xke,
            tumin: 1.0 / xke,
            j2,
            j3,
            j4,
            j3_over_j2: j3 / j2,
        }
    }

    /// Base of the atmospheric drag shell, in earth radii (78 km altitude).
    pub(crate) fn drag_shell(&self) -> f64 {
        78.0 / self.earth_radius_km + 1.0
    }

    /// `((120 − 78)/Rₑ)⁴`, the drag integral constant for the unclamped shell.
    pub(crate) fn qoms2t(&self) -> f64 {
        ((120.0 - 78.0) / self.earth_radius_km).powi(4)
    }
}
