//! # Deep-space extension (SDP4)
//!
//! Orbits with a period of 225 minutes or more pick up perturbations the
//! near-earth model ignores: secular and long-period periodic contributions
//! from lunar and solar gravity, and for 12-hour / 24-hour orbits the
//! near-secular drift driven by tesseral harmonics of the geopotential
//! (resonance). This module holds the epoch-time initialization of all those
//! coefficient tables and the two per-call stages that consume them.
//!
//! ## Resonance integration
//! -----------------
//! The resonant mean longitude obeys `dxli/dt = xni`, `dxni/dt` = a sum of
//! sines of integer combinations of `xli` and the slowly drifting argument of
//! perigee. It is integrated in fixed 720-minute steps with one final partial
//! step, from the `(xli, xni, atime)` cache handed in by the caller. The
//! integrator restarts from the epoch values whenever the target time is on
//! the other side of the epoch from the cache, or closer to the epoch than
//! the cached time.

use std::f64::consts::PI;

use crate::brouwer_errors::BrouwerError;
use crate::constants::{DPI, EARTH_ROTATION, Minute, X2O3};
use crate::kepler::principal_angle;
use crate::propagator::init::{lyddane_xlcof, NearEarthModel, Recovered};
use crate::propagator::near_earth::{osculating_state, ShapeCoeffs};
use crate::propagator::{ResonanceKind, ResonanceState, SatelliteState};

// Lunisolar mean motions (rad/min) and eccentricities.
const ZNS: f64 = 1.19459e-5;
const ZES: f64 = 0.01675;
const ZNL: f64 = 1.5835218e-4;
const ZEL: f64 = 0.05490;

// Solar/lunar perturbation amplitudes and the fixed solar orientation.
const C1SS: f64 = 2.9864797e-6;
const C1L: f64 = 4.7968065e-7;
const ZSINIS: f64 = 0.39785416;
const ZCOSIS: f64 = 0.91744867;
const ZCOSGS: f64 = 0.1945905;
const ZSINGS: f64 = -0.98088458;

// Resonance phase constants (rad).
const FASX2: f64 = 0.13130908;
const FASX4: f64 = 2.8843198;
const FASX6: f64 = 0.37448087;
const G22: f64 = 5.7686396;
const G32: f64 = 0.95240898;
const G44: f64 = 1.8014998;
const G52: f64 = 1.0508330;
const G54: f64 = 4.4108898;
const Q22: f64 = 1.7891679e-6;
const Q31: f64 = 2.1460748e-6;
const Q33: f64 = 2.2123015e-7;
const ROOT22: f64 = 1.7891679e-6;
const ROOT32: f64 = 3.7393792e-7;
const ROOT44: f64 = 7.3636953e-9;
const ROOT52: f64 = 1.1428639e-7;
const ROOT54: f64 = 2.1765803e-9;

/// Fixed integrator step, minutes, and the matching `step²/2`.
const STEP: f64 = 720.0;
const STEP2: f64 = 259200.0;

/// Immutable deep-space coefficient block.
#[derive(Debug, Clone)]
pub struct DeepSpaceModel {
    /// Greenwich sidereal time at the element-set epoch.
    pub(crate) gsto: f64,

    // Lunisolar secular rates, per minute.
    pub(crate) dedt: f64,
    pub(crate) didt: f64,
    pub(crate) dmdt: f64,
    pub(crate) domdt: f64,
    pub(crate) dnodt: f64,

    // Solar long-period periodic coefficients.
    pub(crate) se2: f64,
    pub(crate) se3: f64,
    pub(crate) si2: f64,
    pub(crate) si3: f64,
    pub(crate) sl2: f64,
    pub(crate) sl3: f64,
    pub(crate) sl4: f64,
    pub(crate) sgh2: f64,
    pub(crate) sgh3: f64,
    pub(crate) sgh4: f64,
    pub(crate) sh2: f64,
    pub(crate) sh3: f64,
    pub(crate) zmos: f64,

    // Lunar long-period periodic coefficients.
    pub(crate) ee2: f64,
    pub(crate) e3: f64,
    pub(crate) xi2: f64,
    pub(crate) xi3: f64,
    pub(crate) xl2: f64,
    pub(crate) xl3: f64,
    pub(crate) xl4: f64,
    pub(crate) xgh2: f64,
    pub(crate) xgh3: f64,
    pub(crate) xgh4: f64,
    pub(crate) xh2: f64,
    pub(crate) xh3: f64,
    pub(crate) zmol: f64,

    // Geopotential resonance.
    pub(crate) resonance: ResonanceKind,
    pub(crate) d2201: f64,
    pub(crate) d2211: f64,
    pub(crate) d3210: f64,
    pub(crate) d3222: f64,
    pub(crate) d4410: f64,
    pub(crate) d4422: f64,
    pub(crate) d5220: f64,
    pub(crate) d5232: f64,
    pub(crate) d5421: f64,
    pub(crate) d5433: f64,
    pub(crate) del1: f64,
    pub(crate) del2: f64,
    pub(crate) del3: f64,
    pub(crate) xfact: f64,
    pub(crate) xlamo: f64,
}

/// One pass of the lunisolar geometry reduction: the same trigonometric
/// machinery evaluated once with the solar orientation and once with the
/// lunar one.
struct LunisolarPass {
    s1: f64,
    s2: f64,
    s3: f64,
    s4: f64,
    s5: f64,
    z1: f64,
    z2: f64,
    z3: f64,
    z11: f64,
    z12: f64,
    z13: f64,
    z21: f64,
    z22: f64,
    z23: f64,
    z31: f64,
    z32: f64,
    z33: f64,
    /// `2·s1·s6` and `2·s1·s7` feed the eccentricity coefficients directly.
    e2: f64,
    e3: f64,
}

#[allow(clippy::too_many_arguments)]
fn lunisolar_pass(
    cc: f64,
    zcosg: f64,
    zsing: f64,
    zcosi: f64,
    zsini: f64,
    zcosh: f64,
    zsinh: f64,
    cosim: f64,
    sinim: f64,
    cosomm: f64,
    sinomm: f64,
    emsq: f64,
    betasq: f64,
    rtemsq: f64,
    em: f64,
    xnoi: f64,
) -> LunisolarPass {
    let a1 = zcosg * zcosh + zsing * zcosi * zsinh;
    let a3 = -zsing * zcosh + zcosg * zcosi * zsinh;
    let a7 = -zcosg * zsinh + zsing * zcosi * zcosh;
    let a8 = zsing * zsini;
    let a9 = zsing * zsinh + zcosg * zcosi * zcosh;
    let a10 = zcosg * zsini;
    let a2 = cosim * a7 + sinim * a8;
    let a4 = cosim * a9 + sinim * a10;
    let a5 = -sinim * a7 + cosim * a8;
    let a6 = -sinim * a9 + cosim * a10;

    let x1 = a1 * cosomm + a2 * sinomm;
    let x2 = a3 * cosomm + a4 * sinomm;
    let x3 = -a1 * sinomm + a2 * cosomm;
    let x4 = -a3 * sinomm + a4 * cosomm;
    let x5 = a5 * sinomm;
    let x6 = a6 * sinomm;
    let x7 = a5 * cosomm;
    let x8 = a6 * cosomm;

    let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
    let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
    let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
    let mut z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * emsq;
    let mut z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * emsq;
    let mut z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * emsq;
    let z11 = -6.0 * a1 * a5 + emsq * (-24.0 * x1 * x7 - 6.0 * x3 * x5);
    let z12 = -6.0 * (a1 * a6 + a3 * a5)
        + emsq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5));
    let z13 = -6.0 * a3 * a6 + emsq * (-24.0 * x2 * x8 - 6.0 * x4 * x6);
    let z21 = 6.0 * a2 * a5 + emsq * (24.0 * x1 * x5 - 6.0 * x3 * x7);
    let z22 = 6.0 * (a4 * a5 + a2 * a6)
        + emsq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8));
    let z23 = 6.0 * a4 * a6 + emsq * (24.0 * x2 * x6 - 6.0 * x4 * x8);
    z1 = z1 + z1 + betasq * z31;
    z2 = z2 + z2 + betasq * z32;
    z3 = z3 + z3 + betasq * z33;
    let s3 = cc * xnoi;
    let s2 = -0.5 * s3 / rtemsq;
    let s4 = s3 * rtemsq;
    let s1 = -15.0 * em * s4;
    let s5 = x1 * x3 + x2 * x4;
    let s6 = x2 * x3 + x1 * x4;
    let s7 = x2 * x4 - x1 * x3;

    LunisolarPass {
        s1,
        s2,
        s3,
        s4,
        s5,
        z1,
        z2,
        z3,
        z11,
        z12,
        z13,
        z21,
        z22,
        z23,
        z31,
        z32,
        z33,
        e2: 2.0 * s1 * s6,
        e3: 2.0 * s1 * s7,
    }
}

impl DeepSpaceModel {
    /// Epoch-time initialization of the lunisolar and resonance tables.
    ///
    /// Arguments
    /// -----------------
    /// * `ne` – the already-built near-earth coefficient block.
    /// * `rec` – Kozai→Brouwer recovery outputs (trigonometrics, β², GST).
    /// * `epoch_1950` – epoch as days since 1950 January 0.0.
    /// * `xpidot` – `ω̇ + Ω̇`, the secular perigee-plus-node rate.
    pub(crate) fn new(
        ne: &NearEarthModel,
        rec: &Recovered,
        epoch_1950: f64,
        xpidot: f64,
    ) -> DeepSpaceModel {
        let em = ne.ecco;
        let emsq = rec.eccsq;
        let sinim = rec.sinio;
        let cosim = rec.cosio;
        let inclm = ne.inclo;
        let nm = ne.no_unkozai;
        let snodm = ne.nodeo.sin();
        let cnodm = ne.nodeo.cos();
        let sinomm = ne.argpo.sin();
        let cosomm = ne.argpo.cos();
        let betasq = 1.0 - emsq;
        let rtemsq = betasq.sqrt();
        let xnoi = 1.0 / nm;

        // Lunar orientation at epoch.
        let day = epoch_1950 + 18261.5;
        let xnodce = principal_angle(4.5236020 - 9.2422029e-4 * day);
        let stem = xnodce.sin();
        let ctem = xnodce.cos();
        let zcosil = 0.91375164 - 0.03568096 * ctem;
        let zsinil = (1.0 - zcosil * zcosil).sqrt();
        let zsinhl = 0.089683511 * stem / zsinil;
        let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
        let gam = 5.8351514 + 0.0019443680 * day;
        let mut zx = 0.39785416 * stem / zsinil;
        let zy = zcoshl * ctem + 0.91744867 * zsinhl * stem;
        zx = gam + zx.atan2(zy) - xnodce;
        let zcosgl = zx.cos();
        let zsingl = zx.sin();

        let sun = lunisolar_pass(
            C1SS, ZCOSGS, ZSINGS, ZCOSIS, ZSINIS, cnodm, snodm, cosim, sinim, cosomm, sinomm,
            emsq, betasq, rtemsq, em, xnoi,
        );
        let moon = lunisolar_pass(
            C1L,
            zcosgl,
            zsingl,
            zcosil,
            zsinil,
            zcoshl * cnodm + zsinhl * snodm,
            snodm * zcoshl - cnodm * zsinhl,
            cosim,
            sinim,
            cosomm,
            sinomm,
            emsq,
            betasq,
            rtemsq,
            em,
            xnoi,
        );

        let zmol = principal_angle(4.7199672 + 0.22997150 * day - gam);
        let zmos = principal_angle(6.2565837 + 0.017201977 * day);

        // Lunisolar secular rates; the node rate degenerates at i ≈ 0 or π.
        let near_polar_axis =
            inclm < 5.2359877e-2 || inclm > PI - 5.2359877e-2;
        let ses = sun.s1 * ZNS * sun.s5;
        let sis = sun.s2 * ZNS * (sun.z11 + sun.z13);
        let sls = -ZNS * sun.s3 * (sun.z1 + sun.z3 - 14.0 - 6.0 * emsq);
        let sghs = sun.s4 * ZNS * (sun.z31 + sun.z33 - 6.0);
        let mut shs = -ZNS * sun.s2 * (sun.z21 + sun.z23);
        if near_polar_axis {
            shs = 0.0;
        }
        if sinim != 0.0 {
            shs /= sinim;
        }
        let sgs = sghs - cosim * shs;

        let dedt = ses + moon.s1 * ZNL * moon.s5;
        let didt = sis + moon.s2 * ZNL * (moon.z11 + moon.z13);
        let dmdt = sls - ZNL * moon.s3 * (moon.z1 + moon.z3 - 14.0 - 6.0 * emsq);
        let sghl = moon.s4 * ZNL * (moon.z31 + moon.z33 - 6.0);
        let mut shll = -ZNL * moon.s2 * (moon.z21 + moon.z23);
        if near_polar_axis {
            shll = 0.0;
        }
        let mut domdt = sgs + sghl;
        let mut dnodt = shs;
        if sinim != 0.0 {
            domdt -= cosim / sinim * shll;
            dnodt += shll / sinim;
        }

        // Resonance classification and coefficient tables.
        let resonance = if nm > 0.0034906585 && nm < 0.0052359877 {
            ResonanceKind::Synchronous
        } else if (8.26e-3..=9.24e-3).contains(&nm) && em >= 0.5 {
            ResonanceKind::SemiSynchronous
        } else {
            ResonanceKind::None
        };

        let mut model = DeepSpaceModel {
            gsto: rec.gsto,
            dedt,
            didt,
            dmdt,
            domdt,
            dnodt,
            se2: sun.e2,
            se3: sun.e3,
            si2: 2.0 * sun.s2 * sun.z12,
            si3: 2.0 * sun.s2 * (sun.z13 - sun.z11),
            sl2: -2.0 * sun.s3 * sun.z2,
            sl3: -2.0 * sun.s3 * (sun.z3 - sun.z1),
            sl4: -2.0 * sun.s3 * (-21.0 - 9.0 * emsq) * ZES,
            sgh2: 2.0 * sun.s4 * sun.z32,
            sgh3: 2.0 * sun.s4 * (sun.z33 - sun.z31),
            sgh4: -18.0 * sun.s4 * ZES,
            sh2: -2.0 * sun.s2 * sun.z22,
            sh3: -2.0 * sun.s2 * (sun.z23 - sun.z21),
            zmos,
            ee2: moon.e2,
            e3: moon.e3,
            xi2: 2.0 * moon.s2 * moon.z12,
            xi3: 2.0 * moon.s2 * (moon.z13 - moon.z11),
            xl2: -2.0 * moon.s3 * moon.z2,
            xl3: -2.0 * moon.s3 * (moon.z3 - moon.z1),
            xl4: -2.0 * moon.s3 * (-21.0 - 9.0 * emsq) * ZEL,
            xgh2: 2.0 * moon.s4 * moon.z32,
            xgh3: 2.0 * moon.s4 * (moon.z33 - moon.z31),
            xgh4: -18.0 * moon.s4 * ZEL,
            xh2: -2.0 * moon.s2 * moon.z22,
            xh3: -2.0 * moon.s2 * (moon.z23 - moon.z21),
            zmol,
            resonance,
            d2201: 0.0,
            d2211: 0.0,
            d3210: 0.0,
            d3222: 0.0,
            d4410: 0.0,
            d4422: 0.0,
            d5220: 0.0,
            d5232: 0.0,
            d5421: 0.0,
            d5433: 0.0,
            del1: 0.0,
            del2: 0.0,
            del3: 0.0,
            xfact: 0.0,
            xlamo: 0.0,
        };

        let theta = principal_angle(rec.gsto);
        let aonv = (nm / ne.gravity.xke).powf(X2O3);

        match resonance {
            ResonanceKind::SemiSynchronous => {
                let cosisq = cosim * cosim;
                let eoc = em * emsq;
                let g201 = -0.306 - (em - 0.64) * 0.440;
                let (g211, g310, g322, g410, g422, g520);
                if em <= 0.65 {
                    g211 = 3.616 - 13.2470 * em + 16.2900 * emsq;
                    g310 = -19.302 + 117.3900 * em - 228.4190 * emsq + 156.5910 * eoc;
                    g322 = -18.9068 + 109.7927 * em - 214.6334 * emsq + 146.5816 * eoc;
                    g410 = -41.122 + 242.6940 * em - 471.0940 * emsq + 313.9530 * eoc;
                    g422 = -146.407 + 841.8800 * em - 1629.014 * emsq + 1083.4350 * eoc;
                    g520 = -532.114 + 3017.977 * em - 5740.032 * emsq + 3708.2760 * eoc;
                } else {
                    g211 = -72.099 + 331.819 * em - 508.738 * emsq + 266.724 * eoc;
                    g310 = -346.844 + 1582.851 * em - 2415.925 * emsq + 1246.113 * eoc;
                    g322 = -342.585 + 1554.908 * em - 2366.899 * emsq + 1215.972 * eoc;
                    g410 = -1052.797 + 4758.686 * em - 7193.992 * emsq + 3651.957 * eoc;
                    g422 = -3581.690 + 16178.110 * em - 24462.770 * emsq + 12422.520 * eoc;
                    g520 = if em > 0.715 {
                        -5149.66 + 29936.92 * em - 54087.36 * emsq + 31324.56 * eoc
                    } else {
                        1464.74 - 4664.75 * em + 3763.64 * emsq
                    };
                }
                let (g533, g521, g532);
                if em < 0.7 {
                    g533 = -919.22770 + 4988.61 * em - 9064.77 * emsq + 5542.21 * eoc;
                    g521 = -822.71072 + 4568.6173 * em - 8491.4146 * emsq + 5337.524 * eoc;
                    g532 = -853.66600 + 4690.25 * em - 8624.77 * emsq + 5341.4 * eoc;
                } else {
                    g533 = -37995.78 + 161616.52 * em - 229838.2 * emsq + 109377.94 * eoc;
                    g521 = -51752.104 + 218913.95 * em - 309468.16 * emsq + 146349.42 * eoc;
                    g532 = -40023.88 + 170470.89 * em - 242699.48 * emsq + 115605.82 * eoc;
                }

                let sini2 = sinim * sinim;
                let f220 = 0.75 * (1.0 + 2.0 * cosim + cosisq);
                let f221 = 1.5 * sini2;
                let f321 = 1.875 * sinim * (1.0 - 2.0 * cosim - 3.0 * cosisq);
                let f322 = -1.875 * sinim * (1.0 + 2.0 * cosim - 3.0 * cosisq);
                let f441 = 35.0 * sini2 * f220;
                let f442 = 39.375 * sini2 * sini2;
                let f522 = 9.84375
                    * sinim
                    * (sini2 * (1.0 - 2.0 * cosim - 5.0 * cosisq)
                        + 1.0 / 3.0 * (-2.0 + 4.0 * cosim + 6.0 * cosisq));
                let f523 = sinim
                    * (4.92187512 * sini2 * (-2.0 - 4.0 * cosim + 10.0 * cosisq)
                        + 6.56250012 * (1.0 + 2.0 * cosim - 3.0 * cosisq));
                let f542 = 29.53125
                    * sinim
                    * (2.0 - 8.0 * cosim + cosisq * (-12.0 + 8.0 * cosim + 10.0 * cosisq));
                let f543 = 29.53125
                    * sinim
                    * (-2.0 - 8.0 * cosim + cosisq * (12.0 + 8.0 * cosim - 10.0 * cosisq));

                let xno2 = nm * nm;
                let ainv2 = aonv * aonv;
                let mut temp1 = 3.0 * xno2 * ainv2;
                let mut temp = temp1 * ROOT22;
                model.d2201 = temp * f220 * g201;
                model.d2211 = temp * f221 * g211;
                temp1 *= aonv;
                temp = temp1 * ROOT32;
                model.d3210 = temp * f321 * g310;
                model.d3222 = temp * f322 * g322;
                temp1 *= aonv;
                temp = 2.0 * temp1 * ROOT44;
                model.d4410 = temp * f441 * g410;
                model.d4422 = temp * f442 * g422;
                temp1 *= aonv;
                temp = temp1 * ROOT52;
                model.d5220 = temp * f522 * g520;
                model.d5232 = temp * f523 * g532;
                temp = 2.0 * temp1 * ROOT54;
                model.d5421 = temp * f542 * g521;
                model.d5433 = temp * f543 * g533;
                model.xlamo = principal_angle(ne.mo + 2.0 * ne.nodeo - 2.0 * theta);
                model.xfact =
                    ne.mdot + dmdt + 2.0 * (ne.nodedot + dnodt - EARTH_ROTATION) - nm;
            }
            ResonanceKind::Synchronous => {
                let g200 = 1.0 + emsq * (-2.5 + 0.8125 * emsq);
                let g310 = 1.0 + 2.0 * emsq;
                let g300 = 1.0 + emsq * (-6.0 + 6.60937 * emsq);
                let f220 = 0.75 * (1.0 + cosim) * (1.0 + cosim);
                let f311 =
                    0.9375 * sinim * sinim * (1.0 + 3.0 * cosim) - 0.75 * (1.0 + cosim);
                let mut f330 = 1.0 + cosim;
                f330 = 1.875 * f330 * f330 * f330;
                model.del1 = 3.0 * nm * nm * aonv * aonv;
                model.del2 = 2.0 * model.del1 * f220 * g200 * Q22;
                model.del3 = 3.0 * model.del1 * f330 * g300 * Q33 * aonv;
                model.del1 = model.del1 * f311 * g310 * Q31 * aonv;
                model.xlamo = principal_angle(ne.mo + ne.nodeo + ne.argpo - theta);
                model.xfact =
                    ne.mdot + xpidot - EARTH_ROTATION + dmdt + domdt + dnodt - nm;
            }
            ResonanceKind::None => {}
        }

        model
    }

    /// Long-period lunisolar periodics at offset `t`, applied to the
    /// post-secular elements (Vallado's `dpper`, improved operation mode).
    fn apply_periodics(
        &self,
        t: Minute,
        mut ep: f64,
        mut inclp: f64,
        mut nodep: f64,
        mut argpp: f64,
        mut mp: f64,
    ) -> (f64, f64, f64, f64, f64) {
        // Solar terms.
        let mut zm = self.zmos + ZNS * t;
        let mut zf = zm + 2.0 * ZES * zm.sin();
        let mut sinzf = zf.sin();
        let mut f2 = 0.5 * sinzf * sinzf - 0.25;
        let mut f3 = -0.5 * sinzf * zf.cos();
        let ses = self.se2 * f2 + self.se3 * f3;
        let sis = self.si2 * f2 + self.si3 * f3;
        let sls = self.sl2 * f2 + self.sl3 * f3 + self.sl4 * sinzf;
        let sghs = self.sgh2 * f2 + self.sgh3 * f3 + self.sgh4 * sinzf;
        let shs = self.sh2 * f2 + self.sh3 * f3;

        // Lunar terms.
        zm = self.zmol + ZNL * t;
        zf = zm + 2.0 * ZEL * zm.sin();
        sinzf = zf.sin();
        f2 = 0.5 * sinzf * sinzf - 0.25;
        f3 = -0.5 * sinzf * zf.cos();
        let sel = self.ee2 * f2 + self.e3 * f3;
        let sil = self.xi2 * f2 + self.xi3 * f3;
        let sll = self.xl2 * f2 + self.xl3 * f3 + self.xl4 * sinzf;
        let sghl = self.xgh2 * f2 + self.xgh3 * f3 + self.xgh4 * sinzf;
        let shll = self.xh2 * f2 + self.xh3 * f3;

        let pe = ses + sel;
        let pinc = sis + sil;
        let pl = sls + sll;
        let pgh = sghs + sghl;
        let ph = shs + shll;

        inclp += pinc;
        ep += pe;
        let sinip = inclp.sin();
        let cosip = inclp.cos();

        if inclp >= 0.2 {
            // Apply directly.
            let ph = ph / sinip;
            argpp += pgh - cosip * ph;
            nodep += ph;
            mp += pl;
        } else {
            // Lyddane modification near-singular inclinations; the node is
            // recovered from its sine/cosine projections.
            let sinop = nodep.sin();
            let cosop = nodep.cos();
            let mut alfdp = sinip * sinop;
            let mut betdp = sinip * cosop;
            let dalf = ph * cosop + pinc * cosip * sinop;
            let dbet = -ph * sinop + pinc * cosip * cosop;
            alfdp += dalf;
            betdp += dbet;
            nodep = principal_angle(nodep);
            let mut xls = mp + argpp + cosip * nodep;
            xls += pl + pgh - pinc * nodep * sinip;
            let xnoh = nodep;
            nodep = alfdp.atan2(betdp);
            if (xnoh - nodep).abs() > PI {
                if nodep < xnoh {
                    nodep += DPI;
                } else {
                    nodep -= DPI;
                }
            }
            mp += pl;
            argpp = xls - mp - cosip * nodep;
        }

        (ep, inclp, nodep, argpp, mp)
    }

    /// Resonance disturbing-function derivatives at integrator state
    /// `(xli, atime)`: returns `(dn/dt, raw d²n/dt²)`; the caller scales the
    /// second by `dL/dt`.
    fn resonance_dots(&self, ne: &NearEarthModel, xli: f64, atime: Minute) -> (f64, f64) {
        match self.resonance {
            ResonanceKind::SemiSynchronous => {
                let xomi = ne.argpo + ne.argpdot * atime;
                let x2omi = xomi + xomi;
                let x2li = xli + xli;
                let xndt = self.d2201 * (x2omi + xli - G22).sin()
                    + self.d2211 * (xli - G22).sin()
                    + self.d3210 * (xomi + xli - G32).sin()
                    + self.d3222 * (-xomi + xli - G32).sin()
                    + self.d4410 * (x2omi + x2li - G44).sin()
                    + self.d4422 * (x2li - G44).sin()
                    + self.d5220 * (xomi + xli - G52).sin()
                    + self.d5232 * (-xomi + xli - G52).sin()
                    + self.d5421 * (xomi + x2li - G54).sin()
                    + self.d5433 * (-xomi + x2li - G54).sin();
                let xnddt = self.d2201 * (x2omi + xli - G22).cos()
                    + self.d2211 * (xli - G22).cos()
                    + self.d3210 * (xomi + xli - G32).cos()
                    + self.d3222 * (-xomi + xli - G32).cos()
                    + self.d5220 * (xomi + xli - G52).cos()
                    + self.d5232 * (-xomi + xli - G52).cos()
                    + 2.0
                        * (self.d4410 * (x2omi + x2li - G44).cos()
                            + self.d4422 * (x2li - G44).cos()
                            + self.d5421 * (xomi + x2li - G54).cos()
                            + self.d5433 * (-xomi + x2li - G54).cos());
                (xndt, xnddt)
            }
            _ => {
                let xndt = self.del1 * (xli - FASX2).sin()
                    + self.del2 * (2.0 * (xli - FASX4)).sin()
                    + self.del3 * (3.0 * (xli - FASX6)).sin();
                let xnddt = self.del1 * (xli - FASX2).cos()
                    + 2.0 * self.del2 * (2.0 * (xli - FASX4)).cos()
                    + 3.0 * self.del3 * (3.0 * (xli - FASX6)).cos();
                (xndt, xnddt)
            }
        }
    }

    /// Deep-space secular contributions at offset `t` (Vallado's `dspace`):
    /// lunisolar secular drift plus, for resonant orbits, the stepped
    /// integration of the resonant mean longitude.
    #[allow(clippy::too_many_arguments)]
    fn secular(
        &self,
        ne: &NearEarthModel,
        cache: &mut ResonanceState,
        t: Minute,
        em: f64,
        argpm: f64,
        inclm: f64,
        mm: f64,
        nodem: f64,
    ) -> (f64, f64, f64, f64, f64, f64) {
        let em = em + self.dedt * t;
        let inclm = inclm + self.didt * t;
        let argpm = argpm + self.domdt * t;
        let nodem = nodem + self.dnodt * t;
        let mut mm = mm + self.dmdt * t;
        let mut nm = ne.no_unkozai;

        if self.resonance != ResonanceKind::None {
            // Restart from the epoch when the cache is on the wrong side of
            // the target, or the target moved back toward the epoch.
            if cache.atime == 0.0 || t * cache.atime <= 0.0 || t.abs() < cache.atime.abs() {
                cache.atime = 0.0;
                cache.xni = ne.no_unkozai;
                cache.xli = self.xlamo;
            }

            let delt = if t > 0.0 { STEP } else { -STEP };
            let (xndt, xnddt, xldot, ft) = loop {
                let (xndt, raw_ddot) = self.resonance_dots(ne, cache.xli, cache.atime);
                let xldot = cache.xni + self.xfact;
                let xnddt = raw_ddot * xldot;
                if (t - cache.atime).abs() >= STEP {
                    cache.xli += xldot * delt + xndt * STEP2;
                    cache.xni += xndt * delt + xnddt * STEP2;
                    cache.atime += delt;
                } else {
                    break (xndt, xnddt, xldot, t - cache.atime);
                }
            };

            nm = cache.xni + xndt * ft + xnddt * ft * ft * 0.5;
            let xl = cache.xli + xldot * ft + xndt * ft * ft * 0.5;
            let theta = principal_angle(self.gsto + t * EARTH_ROTATION);
            mm = match self.resonance {
                ResonanceKind::Synchronous => xl - nodem - argpm + theta,
                _ => xl - 2.0 * nodem + 2.0 * theta,
            };
        }

        (em, argpm, inclm, mm, nodem, nm)
    }
}

/// Full deep-space propagation: SGP4 secular terms, `dspace`, `dpper`, then
/// the shared osculating-state tail with shape coefficients re-derived from
/// the perturbed inclination.
pub(crate) fn propagate(
    common: &NearEarthModel,
    deep: &DeepSpaceModel,
    cache: &mut ResonanceState,
    tsince: Minute,
) -> Result<SatelliteState, BrouwerError> {
    let gravity = &common.gravity;

    // Secular gravity and drag; deep-space orbits always use the truncated
    // drag series.
    let xmdf = common.mo + common.mdot * tsince;
    let argpdf = common.argpo + common.argpdot * tsince;
    let nodedf = common.nodeo + common.nodedot * tsince;
    let t2 = tsince * tsince;
    let nodem = nodedf + common.nodecf * t2;
    let tempa = 1.0 - common.cc1 * tsince;
    let tempe = common.bstar * common.cc4 * tsince;
    let templ = common.t2cof * t2;

    let (em, argpm, inclm, mm, nodem, nm) = deep.secular(
        common,
        cache,
        tsince,
        common.ecco,
        argpdf,
        common.inclo,
        xmdf,
        nodem,
    );

    if nm <= 0.0 {
        return Err(BrouwerError::Decayed(format!(
            "resonance integration drove the mean motion to {nm}"
        )));
    }
    let am = (gravity.xke / nm).powf(X2O3) * tempa * tempa;
    let nm = gravity.xke / am.powf(1.5);
    if am < 0.95 {
        return Err(BrouwerError::Decayed(format!(
            "drag drove the semi-major axis to {am:.4} earth radii"
        )));
    }
    let mut em = em - tempe;
    if em >= 1.0 || em < -0.001 {
        return Err(BrouwerError::Decayed(format!(
            "drag drove the mean eccentricity to {em}"
        )));
    }
    if em < 1.0e-6 {
        em = 1.0e-6;
    }
    let mut mm = mm + common.no_unkozai * templ;
    let xlm = mm + argpm + nodem;
    let nodem = principal_angle(nodem);
    let argpm = principal_angle(argpm);
    let xlm = principal_angle(xlm);
    mm = principal_angle(xlm - argpm - nodem);

    // Lunisolar long-period periodics on the perturbed elements.
    let (ep, mut xincp, mut nodep, mut argpp, mp) =
        deep.apply_periodics(tsince, em, inclm, nodem, argpm, mm);
    if xincp < 0.0 {
        xincp = -xincp;
        nodep += PI;
        argpp -= PI;
    }
    if !(0.0..=1.0).contains(&ep) {
        return Err(BrouwerError::Decayed(format!(
            "lunisolar periodics drove the eccentricity to {ep}"
        )));
    }

    // Shape coefficients follow the perturbed inclination.
    let cosip = xincp.cos();
    let sinip = xincp.sin();
    let cosisq = cosip * cosip;
    let shape = ShapeCoeffs {
        con41: 3.0 * cosisq - 1.0,
        x1mth2: 1.0 - cosisq,
        x7thm1: 7.0 * cosisq - 1.0,
        aycof: -0.5 * gravity.j3_over_j2 * sinip,
        xlcof: lyddane_xlcof(gravity.j3_over_j2, sinip, cosip),
    };

    osculating_state(gravity, &shape, nm, am, ep, xincp, nodep, argpp, mp, tsince)
}
