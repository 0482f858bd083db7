use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use brouwer::{GravityModel, Propagator, Tle};

fn leo_propagator() -> Propagator {
    let tle = Tle::from_lines(
        None,
        "1 06251U 62025E   06176.82412014  .00008885  00000-0  12808-3 0  3985",
        "2 06251  58.0579  54.0425 0030035 139.1568 221.1854 15.56387291  6774",
    )
    .unwrap();
    Propagator::new(&tle, &GravityModel::wgs72()).unwrap()
}

fn deep_space_propagator() -> Propagator {
    let tle = Tle::from_lines(
        None,
        "1 11801U          80230.29629788  .01431103  00000-0  14311-1       8",
        "2 11801  46.7916 230.4354 7318036  47.4722  10.4117  2.28537848    13",
    )
    .unwrap();
    Propagator::new(&tle, &GravityModel::wgs72()).unwrap()
}

fn bench_near_earth(c: &mut Criterion) {
    let propagator = leo_propagator();
    let mut rng = StdRng::seed_from_u64(0xb5);
    c.bench_function("sgp4_near_earth_step", |b| {
        b.iter(|| {
            let t = rng.random::<f64>() * 2880.0;
            black_box(propagator.propagate(black_box(t)).unwrap())
        })
    });
}

fn bench_deep_space(c: &mut Criterion) {
    let propagator = deep_space_propagator();
    let mut rng = StdRng::seed_from_u64(0xd5);
    c.bench_function("sdp4_deep_space_step", |b| {
        b.iter(|| {
            let t = rng.random::<f64>() * 2880.0;
            black_box(propagator.propagate(black_box(t)).unwrap())
        })
    });
}

criterion_group!(benches, bench_near_earth, bench_deep_space);
criterion_main!(benches);
