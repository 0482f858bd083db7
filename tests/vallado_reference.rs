//! End-to-end scenarios against the published AIAA 2006-6753 reference
//! ephemerides (WGS-72). Position tolerances are the maximum the reference
//! data allows, not the expected error of a faithful implementation.

use approx::assert_abs_diff_eq;
use brouwer::{GravityModel, Propagator, ResonanceKind, Tle};

struct Expected {
    t: f64,
    position: [f64; 3],
    velocity: Option<[f64; 3]>,
}

fn propagator(line1: &str, line2: &str) -> Propagator {
    let tle = Tle::from_lines(None, line1, line2).unwrap();
    Propagator::new(&tle, &GravityModel::wgs72()).unwrap()
}

fn assert_states(propagator: &Propagator, expected: &[Expected], pos_tol: f64, vel_tol: f64) {
    for case in expected {
        let state = propagator.propagate(case.t).unwrap();
        for axis in 0..3 {
            assert_abs_diff_eq!(state.position[axis], case.position[axis], epsilon = pos_tol);
        }
        if let Some(velocity) = case.velocity {
            for axis in 0..3 {
                assert_abs_diff_eq!(state.velocity[axis], velocity[axis], epsilon = vel_tol);
            }
        }
    }
}

#[test]
fn satellite_00005_highly_elliptical() {
    let propagator = propagator(
        "1 00005U 58002B   00179.78495062  .00000023  00000-0  28098-4 0  4753",
        "2 00005  34.2682 348.7242 1859667 331.7664  19.3264 10.82419157413667",
    );
    assert!(!propagator.is_deep_space());
    assert_states(
        &propagator,
        &[Expected {
            t: 0.0,
            position: [7022.46529266, -1400.08296755, 0.03995155],
            velocity: Some([1.893841015, 6.405893759, 4.534807250]),
        }],
        1e-3,
        1e-6,
    );
}

#[test]
fn satellite_06251_leo_with_drag() {
    let propagator = propagator(
        "1 06251U 62025E   06176.82412014  .00008885  00000-0  12808-3 0  3985",
        "2 06251  58.0579  54.0425 0030035 139.1568 221.1854 15.56387291  6774",
    );
    assert_states(
        &propagator,
        &[
            Expected {
                t: 0.0,
                position: [3988.31022699, 5498.96657235, 0.90055879],
                velocity: None,
            },
            Expected {
                t: 120.0,
                position: [-3935.69800083, 409.10980837, 5471.33577327],
                velocity: None,
            },
        ],
        1e-3,
        1e-6,
    );
}

#[test]
fn satellite_88888_spacetrack_report_3() {
    let propagator = propagator(
        "1 88888U          80275.98708465  .00073094  13844-3  66816-4 0    87",
        "2 88888  72.8435 115.9689 0086731  52.6988 110.5714 16.05824518  1058",
    );
    assert_states(
        &propagator,
        &[Expected {
            t: 0.0,
            position: [2328.96975262, -5995.22051338, 1719.97297192],
            velocity: Some([2.91207230, -0.98341546, -7.09081703]),
        }],
        1e-3,
        1e-6,
    );
}

#[test]
fn satellite_11801_deep_space_elliptical() {
    // Period ≈ 630 min: deep space, but outside both resonance windows.
    let propagator = propagator(
        "1 11801U          80230.29629788  .01431103  00000-0  14311-1       8",
        "2 11801  46.7916 230.4354 7318036  47.4722  10.4117  2.28537848    13",
    );
    assert!(propagator.is_deep_space());
    assert_eq!(propagator.resonance(), ResonanceKind::None);
    // Epoch state near perigee (both historical code lineages agree here to
    // better than a kilometre).
    assert_states(
        &propagator,
        &[Expected {
            t: 0.0,
            position: [7473.37066650, 428.95261765, 5828.74786377],
            velocity: Some([5.10715130, 6.44468284, -0.18613096]),
        }],
        2.0,
        1e-2,
    );
    let radius = propagator.propagate(0.0).unwrap().position.norm();
    assert_abs_diff_eq!(radius, 9487.3, epsilon = 3.0);
}

#[test]
fn satellite_06251_long_horizon_stability() {
    let propagator = propagator(
        "1 06251U 62025E   06176.82412014  .00008885  00000-0  12808-3 0  3985",
        "2 06251  58.0579  54.0425 0030035 139.1568 221.1854 15.56387291  6774",
    );
    let mut t = 0.0;
    while t <= 2880.0 {
        let state = propagator.propagate(t).unwrap();
        let radius = state.position.norm();
        assert!(radius.is_finite());
        assert!(
            (6371.0..8000.0).contains(&radius),
            "radius {radius} km at t = {t} min"
        );
        t += 360.0;
    }
}

#[test]
fn propagation_is_pure() {
    let propagator = propagator(
        "1 06251U 62025E   06176.82412014  .00008885  00000-0  12808-3 0  3985",
        "2 06251  58.0579  54.0425 0030035 139.1568 221.1854 15.56387291  6774",
    );
    let first = propagator.propagate(973.5).unwrap();
    let second = propagator.propagate(973.5).unwrap();
    assert_eq!(first.position, second.position);
    assert_eq!(first.velocity, second.velocity);
}

#[test]
fn near_circular_orbit_stays_stable() {
    // e = 0.0000884: the e < 1e-4 branches must keep propagation finite.
    let propagator = propagator(
        "1 28057U 03049A   06177.78615833  .00000060  00000-0  35940-4 0  1836",
        "2 28057  98.4283 247.6961 0000884  88.1964 271.9322 14.35478080140550",
    );
    for t in [0.0, 360.0, 720.0, 1440.0] {
        let radius = propagator.propagate(t).unwrap().position.norm();
        assert!((7000.0..7400.0).contains(&radius), "radius {radius} km");
    }
}

#[test]
fn high_drag_low_perigee_survives() {
    // Perigee 127 km with a large ndot: the clamped atmospheric shell path.
    let propagator = propagator(
        "1 28350U 04020A   06167.21788666  .16154492  76267-5  18678-3 0  8894",
        "2 28350  64.9977 345.6130 0024870 260.7578  99.9590 16.47856722116490",
    );
    for t in [0.0, 120.0, 240.0] {
        let radius = propagator.propagate(t).unwrap().position.norm();
        assert!((6430.0..6620.0).contains(&radius), "radius {radius} km");
    }
}

#[test]
fn geosynchronous_orbit_selects_synchronous_resonance() {
    let propagator = propagator(
        "1 00001U 00001A   06001.00000000  .00000000  00000-0  00000-0 0    10",
        "2 00001   0.0500  45.0000 0001000   0.0000   0.0000  1.00270000    10",
    );
    assert!(propagator.is_deep_space());
    assert_eq!(propagator.resonance(), ResonanceKind::Synchronous);
    for t in [0.0, 360.0, 720.0, 1440.0, 4320.0] {
        let state = propagator.propagate(t).unwrap();
        let radius = state.position.norm();
        assert!(radius.is_finite());
        assert!(
            (41_000.0..43_500.0).contains(&radius),
            "radius {radius} km at t = {t} min"
        );
    }
}

#[test]
fn resonance_cache_matches_fresh_integration() {
    let propagator = propagator(
        "1 00001U 00001A   06001.00000000  .00000000  00000-0  00000-0 0    10",
        "2 00001   0.0500  45.0000 0001000   0.0000   0.0000  1.00270000    10",
    );
    let mut cache = propagator.resonance_state();
    for t in [0.0, 720.0, 1440.0, 2160.0] {
        let cached = propagator.propagate_with_cache(&mut cache, t).unwrap();
        let fresh = propagator.propagate(t).unwrap();
        for axis in 0..3 {
            assert_abs_diff_eq!(cached.position[axis], fresh.position[axis], epsilon = 1e-9);
            assert_abs_diff_eq!(cached.velocity[axis], fresh.velocity[axis], epsilon = 1e-12);
        }
    }
    // Direction reversal resets the integrator rather than corrupting it.
    let backwards = propagator.propagate_with_cache(&mut cache, -720.0).unwrap();
    let fresh = propagator.propagate(-720.0).unwrap();
    for axis in 0..3 {
        assert_abs_diff_eq!(
            backwards.position[axis],
            fresh.position[axis],
            epsilon = 1e-9
        );
    }
}
