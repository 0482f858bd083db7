//! # Propagator initialization
//!
//! Converts a decoded element set into the immutable coefficient block the
//! propagation step consumes: recovery of the Brouwer (unperturbed) mean
//! motion from the Kozai (observed) one, the atmospheric-drag coefficient
//! ladder `c1…c5` / `d2…d4`, the J2/J4 secular rates, and the J3 long-period
//! constants. Orbits with a period of 225 minutes or more additionally get
//! the deep-space block and are tagged as such.

use crate::brouwer_errors::BrouwerError;
use crate::constants::{DPI, MINUTES_PER_DAY, RADEG, Radian, X2O3};
use crate::gravity::GravityModel;
use crate::propagator::deep_space::DeepSpaceModel;
use crate::propagator::near_earth::ShapeCoeffs;
use crate::propagator::Propagator;
use crate::time::gstime;
use crate::tle::Tle;

/// Minimum survivable perigee altitude at epoch, km.
const PERIGEE_FLOOR_KM: f64 = 90.0;

/// The near-earth coefficient block, shared by both regimes.
///
/// All angles are radians, all rates radians/minute, lengths earth radii
/// unless suffixed otherwise. Immutable once built.
#[derive(Debug, Clone)]
pub struct NearEarthModel {
    pub(crate) gravity: GravityModel,

    // Mean elements at epoch
    pub(crate) bstar: f64,
    pub(crate) ecco: f64,
    pub(crate) inclo: Radian,
    pub(crate) nodeo: Radian,
    pub(crate) argpo: Radian,
    pub(crate) mo: Radian,
    pub(crate) no_kozai: f64,
    /// Brouwer mean motion recovered from the Kozai value, rad/min.
    pub(crate) no_unkozai: f64,

    /// Perigee below 220 km: the drag series is truncated to linear terms.
    pub(crate) is_simplified: bool,

    // J2/J3 shape coefficients
    pub(crate) con41: f64,
    pub(crate) x1mth2: f64,
    pub(crate) x7thm1: f64,
    pub(crate) aycof: f64,
    pub(crate) xlcof: f64,

    // Drag
    pub(crate) cc1: f64,
    pub(crate) cc4: f64,
    pub(crate) cc5: f64,
    pub(crate) d2: f64,
    pub(crate) d3: f64,
    pub(crate) d4: f64,
    pub(crate) t2cof: f64,
    pub(crate) t3cof: f64,
    pub(crate) t4cof: f64,
    pub(crate) t5cof: f64,
    pub(crate) eta: f64,
    pub(crate) delmo: f64,
    pub(crate) sinmao: f64,
    pub(crate) omgcof: f64,
    pub(crate) xmcof: f64,

    // Secular rates, rad/min
    pub(crate) mdot: f64,
    pub(crate) argpdot: f64,
    pub(crate) nodedot: f64,
    pub(crate) nodecf: f64,
}

impl NearEarthModel {
    /// Kozai mean motion as published in the element set, rad/min.
    pub fn kozai_mean_motion(&self) -> f64 {
        self.no_kozai
    }

    /// Brouwer mean motion the propagator integrates, rad/min.
    pub fn brouwer_mean_motion(&self) -> f64 {
        self.no_unkozai
    }

    pub(crate) fn shape(&self) -> ShapeCoeffs {
        ShapeCoeffs {
            con41: self.con41,
            x1mth2: self.x1mth2,
            x7thm1: self.x7thm1,
            aycof: self.aycof,
            xlcof: self.xlcof,
        }
    }
}

/// Outputs of the Kozai → Brouwer recovery, reused by the deep-space block.
pub(crate) struct Recovered {
    pub(crate) no_unkozai: f64,
    pub(crate) ao: f64,
    pub(crate) cosio: f64,
    pub(crate) cosio2: f64,
    pub(crate) sinio: f64,
    pub(crate) con41: f64,
    pub(crate) con42: f64,
    pub(crate) eccsq: f64,
    pub(crate) omeosq: f64,
    pub(crate) rteosq: f64,
    pub(crate) posq: f64,
    pub(crate) rp: f64,
    pub(crate) gsto: Radian,
}

/// Deflate the Kozai mean motion to the Brouwer value and derive the
/// quantities every later computation reuses.
fn recover_brouwer(
    gravity: &GravityModel,
    ecco: f64,
    inclo: f64,
    no_kozai: f64,
    epoch_jd: f64,
) -> Recovered {
    let eccsq = ecco * ecco;
    let omeosq = 1.0 - eccsq;
    let rteosq = omeosq.sqrt();
    let cosio = inclo.cos();
    let cosio2 = cosio * cosio;

    let ak = (gravity.xke / no_kozai).powf(X2O3);
    let d1 = 0.75 * gravity.j2 * (3.0 * cosio2 - 1.0) / (rteosq * omeosq);
    let mut del = d1 / (ak * ak);
    let adel = ak * (1.0 - del * del - del * (1.0 / 3.0 + 134.0 * del * del / 81.0));
    del = d1 / (adel * adel);
    let no_unkozai = no_kozai / (1.0 + del);

    let ao = (gravity.xke / no_unkozai).powf(X2O3);
    let po = ao * omeosq;
    let con42 = 1.0 - 5.0 * cosio2;

    Recovered {
        no_unkozai,
        ao,
        cosio,
        cosio2,
        sinio: inclo.sin(),
        con41: -con42 - cosio2 - cosio2,
        con42,
        eccsq,
        omeosq,
        rteosq,
        posq: po * po,
        rp: ao * (1.0 - ecco),
        gsto: gstime(epoch_jd),
    }
}

/// J3 long-period coefficient, guarded against the 1 + cos i division for
/// retrograde equatorial orbits (cos i ≈ −1).
pub(crate) fn lyddane_xlcof(j3_over_j2: f64, sinio: f64, cosio: f64) -> f64 {
    let denom = if (cosio + 1.0).abs() > 1.5e-12 {
        1.0 + cosio
    } else {
        1.5e-12
    };
    -0.25 * j3_over_j2 * sinio * (3.0 + 5.0 * cosio) / denom
}

/// Build the full propagator state from a decoded element set.
pub(crate) fn build(tle: &Tle, gravity: &GravityModel) -> Result<Propagator, BrouwerError> {
    let ecco = tle.eccentricity;
    if !(0.0..1.0).contains(&ecco) {
        return Err(BrouwerError::BadEccentricity(ecco));
    }

    let no_kozai = tle.mean_motion * DPI / MINUTES_PER_DAY;
    let bstar = tle.bstar;
    let inclo = tle.inclination * RADEG;
    let nodeo = tle.raan * RADEG;
    let argpo = tle.argument_of_perigee * RADEG;
    let mo = tle.mean_anomaly * RADEG;

    let rec = recover_brouwer(gravity, ecco, inclo, no_kozai, tle.epoch_julian_date);

    let perigee_km = (rec.rp - 1.0) * gravity.earth_radius_km;
    if perigee_km < PERIGEE_FLOOR_KM {
        return Err(BrouwerError::Decayed(format!(
            "perigee altitude {perigee_km:.1} km at epoch is below {PERIGEE_FLOOR_KM} km"
        )));
    }

    let is_deep_space = DPI / rec.no_unkozai >= 225.0;
    let is_simplified =
        is_deep_space || rec.rp < 220.0 / gravity.earth_radius_km + 1.0;

    // Atmospheric shell: clamp s below a 156 km perigee, and recompute the
    // (q0 − s)⁴ constant accordingly.
    let mut sfour = gravity.drag_shell();
    let mut qzms24 = gravity.qoms2t();
    if perigee_km < 156.0 {
        sfour = if perigee_km < 98.0 {
            20.0
        } else {
            perigee_km - 78.0
        };
        qzms24 = ((120.0 - sfour) / gravity.earth_radius_km).powi(4);
        sfour = sfour / gravity.earth_radius_km + 1.0;
    }

    let pinvsq = 1.0 / rec.posq;
    let tsi = 1.0 / (rec.ao - sfour);
    let eta = rec.ao * ecco * tsi;
    let etasq = eta * eta;
    let eeta = ecco * eta;
    let psisq = (1.0 - etasq).abs();
    let coef = qzms24 * tsi.powi(4);
    let coef1 = coef / psisq.powf(3.5);

    let cc2 = coef1
        * rec.no_unkozai
        * (rec.ao * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
            + 0.375 * gravity.j2 * tsi / psisq
                * rec.con41
                * (8.0 + 3.0 * etasq * (8.0 + etasq)));
    let cc1 = bstar * cc2;
    let cc3 = if ecco > 1.0e-4 {
        -2.0 * coef * tsi * gravity.j3_over_j2 * rec.no_unkozai * rec.sinio / ecco
    } else {
        0.0
    };
    let x1mth2 = 1.0 - rec.cosio2;
    let cc4 = 2.0
        * rec.no_unkozai
        * coef1
        * rec.ao
        * rec.omeosq
        * (eta * (2.0 + 0.5 * etasq) + ecco * (0.5 + 2.0 * etasq)
            - gravity.j2 * tsi / (rec.ao * psisq)
                * (-3.0 * rec.con41 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                    + 0.75
                        * x1mth2
                        * (2.0 * etasq - eeta * (1.0 + etasq))
                        * (2.0 * argpo).cos()));
    let cc5 =
        2.0 * coef1 * rec.ao * rec.omeosq * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

    let cosio4 = rec.cosio2 * rec.cosio2;
    let temp1 = 1.5 * gravity.j2 * pinvsq * rec.no_unkozai;
    let temp2 = 0.5 * temp1 * gravity.j2 * pinvsq;
    let temp3 = -0.46875 * gravity.j4 * pinvsq * pinvsq * rec.no_unkozai;
    let mdot = rec.no_unkozai
        + 0.5 * temp1 * rec.rteosq * rec.con41
        + 0.0625 * temp2 * rec.rteosq * (13.0 - 78.0 * rec.cosio2 + 137.0 * cosio4);
    let argpdot = -0.5 * temp1 * rec.con42
        + 0.0625 * temp2 * (7.0 - 114.0 * rec.cosio2 + 395.0 * cosio4)
        + temp3 * (3.0 - 36.0 * rec.cosio2 + 49.0 * cosio4);
    let xhdot1 = -temp1 * rec.cosio;
    let nodedot = xhdot1
        + (0.5 * temp2 * (4.0 - 19.0 * rec.cosio2) + 2.0 * temp3 * (3.0 - 7.0 * rec.cosio2))
            * rec.cosio;
    let xpidot = argpdot + nodedot;

    let omgcof = bstar * cc3 * argpo.cos();
    let xmcof = if ecco > 1.0e-4 {
        -X2O3 * coef * bstar / eeta
    } else {
        0.0
    };
    let nodecf = 3.5 * rec.omeosq * xhdot1 * cc1;
    let t2cof = 1.5 * cc1;
    let xlcof = lyddane_xlcof(gravity.j3_over_j2, rec.sinio, rec.cosio);
    let aycof = -0.5 * gravity.j3_over_j2 * rec.sinio;
    let delmo = (1.0 + eta * mo.cos()).powi(3);
    let sinmao = mo.sin();
    let x7thm1 = 7.0 * rec.cosio2 - 1.0;

    // Higher-order drag terms, dropped for low perigees and for deep space.
    let (mut d2, mut d3, mut d4) = (0.0, 0.0, 0.0);
    let (mut t3cof, mut t4cof, mut t5cof) = (0.0, 0.0, 0.0);
    if !is_simplified {
        let cc1sq = cc1 * cc1;
        d2 = 4.0 * rec.ao * tsi * cc1sq;
        let temp = d2 * tsi * cc1 / 3.0;
        d3 = (17.0 * rec.ao + sfour) * temp;
        d4 = 0.5 * temp * rec.ao * tsi * (221.0 * rec.ao + 31.0 * sfour) * cc1;
        t3cof = d2 + 2.0 * cc1sq;
        t4cof = 0.25 * (3.0 * d3 + cc1 * (12.0 * d2 + 10.0 * cc1sq));
        t5cof = 0.2
            * (3.0 * d4 + 12.0 * cc1 * d3 + 6.0 * d2 * d2 + 15.0 * cc1sq * (2.0 * d2 + cc1sq));
    }

    let common = NearEarthModel {
        gravity: *gravity,
        bstar,
        ecco,
        inclo,
        nodeo,
        argpo,
        mo,
        no_kozai,
        no_unkozai: rec.no_unkozai,
        is_simplified,
        con41: rec.con41,
        x1mth2,
        x7thm1,
        aycof,
        xlcof,
        cc1,
        cc4,
        cc5,
        d2,
        d3,
        d4,
        t2cof,
        t3cof,
        t4cof,
        t5cof,
        eta,
        delmo,
        sinmao,
        omgcof,
        xmcof,
        mdot,
        argpdot,
        nodedot,
        nodecf,
    };

    let propagator = if is_deep_space {
        let deep = DeepSpaceModel::new(&common, &rec, tle.days_since_1950(), xpidot);
        Propagator::DeepSpace { common, deep }
    } else {
        Propagator::NearEarth(common)
    };

    // Prime at the epoch so pathological elements fail at construction.
    propagator.propagate(0.0)?;
    Ok(propagator)
}

#[cfg(test)]
mod init_test {
    use super::*;
    use crate::tle::Tle;
    use approx::assert_abs_diff_eq;

    fn model_06251() -> NearEarthModel {
        let tle = Tle::from_lines(
            None,
            "1 06251U 62025E   06176.82412014  .00008885  00000-0  12808-3 0  3985",
            "2 06251  58.0579  54.0425 0030035 139.1568 221.1854 15.56387291  6774",
        )
        .unwrap();
        match Propagator::new(&tle, &GravityModel::wgs72()).unwrap() {
            Propagator::NearEarth(model) => model,
            Propagator::DeepSpace { .. } => panic!("06251 is a near-earth orbit"),
        }
    }

    #[test]
    fn test_brouwer_recovery_direction() {
        // The Kozai deflation shrinks the mean motion for prograde LEO.
        let model = model_06251();
        assert!(model.no_unkozai < model.no_kozai);
        assert_abs_diff_eq!(model.no_kozai, 0.06791021, epsilon = 1e-7);
        // δ is a J2-sized correction, well below a part in a thousand.
        assert!((model.no_kozai - model.no_unkozai) / model.no_kozai < 1e-3);
    }

    #[test]
    fn test_shape_coefficients_are_consistent() {
        let model = model_06251();
        let cosio2 = (1.0 - model.x1mth2).max(0.0);
        assert_abs_diff_eq!(model.con41, 3.0 * cosio2 - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(model.x7thm1, 7.0 * cosio2 - 1.0, epsilon = 1e-12);
        assert!(model.t2cof == 1.5 * model.cc1);
        assert!(!model.is_simplified);
        assert!(model.d2 != 0.0 && model.t5cof != 0.0);
    }

    #[test]
    fn test_near_circular_drops_eccentricity_terms() {
        // e = 0.0000884 < 1e-4 forces c3-derived and xmcof terms to zero.
        let tle = Tle::from_lines(
            None,
            "1 28057U 03049A   06177.78615833  .00000060  00000-0  35940-4 0  1836",
            "2 28057  98.4283 247.6961 0000884  88.1964 271.9322 14.35478080140550",
        )
        .unwrap();
        match Propagator::new(&tle, &GravityModel::wgs72()).unwrap() {
            Propagator::NearEarth(model) => {
                assert_eq!(model.omgcof, 0.0);
                assert_eq!(model.xmcof, 0.0);
            }
            Propagator::DeepSpace { .. } => panic!("28057 is a near-earth orbit"),
        }
    }

    #[test]
    fn test_retrograde_equatorial_guard() {
        // cos i = −1 exactly: the xlcof denominator guard must engage.
        let xlcof = lyddane_xlcof(-0.002345, 0.0, -1.0);
        assert!(xlcof.is_finite());
        let tle = Tle::from_lines(
            None,
            "1 06251U 62025E   06176.82412014  .00008885  00000-0  12808-3 0  3985",
            "2 06251 180.0000  54.0425 0030035 139.1568 221.1854 15.56387291  6774",
        )
        .unwrap();
        let propagator = Propagator::new(&tle, &GravityModel::wgs72()).unwrap();
        let state = propagator.propagate(0.0).unwrap();
        assert!(state.position.norm().is_finite());
    }

    #[test]
    fn test_bad_eccentricity_is_reported_by_the_builder() {
        let tle = Tle::from_lines(
            None,
            "1 06251U 62025E   06176.82412014  .00008885  00000-0  12808-3 0  3985",
            "2 06251  58.0579  54.0425 9999999 139.1568 221.1854 15.56387291  6774",
        )
        .unwrap();
        // Survives decoding (the packed field cannot encode e ≥ 1) but an
        // extreme eccentricity drives the perigee under the decay floor.
        match Propagator::new(&tle, &GravityModel::wgs72()) {
            Err(BrouwerError::Decayed(_)) => {}
            other => panic!("expected decay at build time, got {other:?}"),
        }
    }
}
