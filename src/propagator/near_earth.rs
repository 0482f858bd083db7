//! # Near-earth propagation step (SGP4)
//!
//! Secular gravity/drag advance followed by the regime-independent tail:
//! Lyddane long-period terms, the modified Kepler solve, short-period J2
//! corrections and the rotation into TEME Cartesian coordinates. The tail
//! ([`osculating_state`]) is shared with the deep-space branch, which feeds
//! it lunisolar-perturbed elements and re-derived shape coefficients.

use nalgebra::Vector3;

use crate::brouwer_errors::BrouwerError;
use crate::constants::{Minute, X2O3};
use crate::gravity::GravityModel;
use crate::kepler::{principal_angle, solve_lyddane_kepler};
use crate::propagator::init::NearEarthModel;
use crate::propagator::SatelliteState;

/// Inclination-dependent coefficients of the long- and short-period
/// corrections. Constant for a near-earth orbit; recomputed from the
/// perturbed inclination on every deep-space call.
pub(crate) struct ShapeCoeffs {
    pub(crate) con41: f64,
    pub(crate) x1mth2: f64,
    pub(crate) x7thm1: f64,
    pub(crate) aycof: f64,
    pub(crate) xlcof: f64,
}

pub(crate) fn propagate(
    model: &NearEarthModel,
    tsince: Minute,
) -> Result<SatelliteState, BrouwerError> {
    let gravity = &model.gravity;

    // Secular gravity and atmospheric drag.
    let xmdf = model.mo + model.mdot * tsince;
    let argpdf = model.argpo + model.argpdot * tsince;
    let nodedf = model.nodeo + model.nodedot * tsince;
    let t2 = tsince * tsince;
    let nodem = nodedf + model.nodecf * t2;
    let mut argpm = argpdf;
    let mut mm = xmdf;
    let mut tempa = 1.0 - model.cc1 * tsince;
    let mut tempe = model.bstar * model.cc4 * tsince;
    let mut templ = model.t2cof * t2;

    if !model.is_simplified {
        let delomg = model.omgcof * tsince;
        let delmtemp = 1.0 + model.eta * xmdf.cos();
        let delm = model.xmcof * (delmtemp * delmtemp * delmtemp - model.delmo);
        let temp = delomg + delm;
        mm = xmdf + temp;
        argpm = argpdf - temp;
        let t3 = t2 * tsince;
        let t4 = t3 * tsince;
        tempa -= model.d2 * t2 + model.d3 * t3 + model.d4 * t4;
        tempe += model.bstar * model.cc5 * (mm.sin() - model.sinmao);
        templ += model.t3cof * t3 + t4 * (model.t4cof + tsince * model.t5cof);
    }

    let am = (gravity.xke / model.no_unkozai).powf(X2O3) * tempa * tempa;
    let nm = gravity.xke / am.powf(1.5);
    if am < 0.95 {
        return Err(BrouwerError::Decayed(format!(
            "drag drove the semi-major axis to {am:.4} earth radii"
        )));
    }
    let mut em = model.ecco - tempe;
    if em >= 1.0 || em < -0.001 {
        return Err(BrouwerError::Decayed(format!(
            "drag drove the mean eccentricity to {em}"
        )));
    }
    if em < 1.0e-6 {
        em = 1.0e-6;
    }
    mm += model.no_unkozai * templ;
    let xlm = mm + argpm + nodem;
    let nodem = principal_angle(nodem);
    let argpm = principal_angle(argpm);
    let xlm = principal_angle(xlm);
    let mm = principal_angle(xlm - argpm - nodem);

    osculating_state(
        gravity,
        &model.shape(),
        nm,
        am,
        em,
        model.inclo,
        nodem,
        argpm,
        mm,
        tsince,
    )
}

/// Long-period terms, Kepler solve, short-period corrections and the TEME
/// Cartesian assembly, from post-secular mean elements.
///
/// The `sin u`/`cos u` forms below suffer known numerical cancellation for
/// some geometries but must stay exactly as written: rearranging through
/// `tan(u/2)` ignores the Lyddane terms already folded into the axial
/// components and silently shifts the quadrant.
#[allow(clippy::too_many_arguments)]
pub(crate) fn osculating_state(
    gravity: &GravityModel,
    shape: &ShapeCoeffs,
    nm: f64,
    am: f64,
    ep: f64,
    xincp: f64,
    nodep: f64,
    argpp: f64,
    mp: f64,
    tsince: Minute,
) -> Result<SatelliteState, BrouwerError> {
    let sinip = xincp.sin();
    let cosip = xincp.cos();

    // Lyddane axial components and modified mean longitude.
    let axnl = ep * argpp.cos();
    let temp = 1.0 / (am * (1.0 - ep * ep));
    let aynl = ep * argpp.sin() + temp * shape.aycof;
    let xl = mp + argpp + nodep + temp * shape.xlcof * axnl;

    let u = principal_angle(xl - nodep);
    let (_eo1, sineo1, coseo1) = solve_lyddane_kepler(u, axnl, aynl);

    // Short-period preliminary quantities.
    let ecose = axnl * coseo1 + aynl * sineo1;
    let esine = axnl * sineo1 - aynl * coseo1;
    let el2 = axnl * axnl + aynl * aynl;
    let pl = am * (1.0 - el2);
    if pl < 0.0 {
        return Err(BrouwerError::Decayed(format!(
            "semi-latus rectum {pl} is negative"
        )));
    }

    let rl = am * (1.0 - ecose);
    let rdotl = am.sqrt() * esine / rl;
    let rvdotl = pl.sqrt() / rl;
    let betal = (1.0 - el2).sqrt();
    let temp = esine / (1.0 + betal);
    let sinu = am / rl * (sineo1 - aynl - axnl * temp);
    let cosu = am / rl * (coseo1 - axnl + aynl * temp);
    let mut su = sinu.atan2(cosu);
    let sin2u = (cosu + cosu) * sinu;
    let cos2u = 1.0 - 2.0 * sinu * sinu;

    // Short-period J2 corrections.
    let temp = 1.0 / pl;
    let temp1 = 0.5 * gravity.j2 * temp;
    let temp2 = temp1 * temp;
    let mrt =
        rl * (1.0 - 1.5 * temp2 * betal * shape.con41) + 0.5 * temp1 * shape.x1mth2 * cos2u;
    su -= 0.25 * temp2 * shape.x7thm1 * sin2u;
    let xnode = nodep + 1.5 * temp2 * cosip * sin2u;
    let xinc = xincp + 1.5 * temp2 * cosip * sinip * cos2u;
    let mvt = rdotl - nm * temp1 * shape.x1mth2 * sin2u / gravity.xke;
    let rvdot = rvdotl + nm * temp1 * (shape.x1mth2 * cos2u + 1.5 * shape.con41) / gravity.xke;

    if mrt < 1.0 {
        return Err(BrouwerError::Decayed(format!(
            "radius {:.1} km is inside the earth",
            mrt * gravity.earth_radius_km
        )));
    }

    // Orientation basis and Cartesian assembly.
    let sinsu = su.sin();
    let cossu = su.cos();
    let snod = xnode.sin();
    let cnod = xnode.cos();
    let sini = xinc.sin();
    let cosi = xinc.cos();
    let xmx = -snod * cosi;
    let xmy = cnod * cosi;
    let ux = xmx * sinsu + cnod * cossu;
    let uy = xmy * sinsu + snod * cossu;
    let uz = sini * sinsu;
    let vx = xmx * cossu - cnod * sinsu;
    let vy = xmy * cossu - snod * sinsu;
    let vz = sini * cossu;

    let mr = mrt * gravity.earth_radius_km;
    let vkmpersec = gravity.earth_radius_km * gravity.xke / 60.0;

    Ok(SatelliteState {
        position: Vector3::new(mr * ux, mr * uy, mr * uz),
        velocity: Vector3::new(
            (mvt * ux + rvdot * vx) * vkmpersec,
            (mvt * uy + rvdot * vy) * vkmpersec,
            (mvt * uz + rvdot * vz) * vkmpersec,
        ),
        minutes_since_epoch: tsince,
    })
}
