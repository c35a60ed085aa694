#[macro_use]
extern crate criterion;
extern crate fractile;
extern crate num;

use criterion::Criterion;
use fractile::kernel;
use fractile::params::{Algorithm, RenderParams};
use num::Complex;

fn params(algorithm: Algorithm) -> RenderParams {
    RenderParams {
        frac_x: -0.5,
        frac_y: 0.0,
        scale: 1.0 / 500.0,
        iterations: 200,
        infinity: 1e100,
        power: 2,
        algorithm,
        x_centre: -640,
        y_centre: -540,
    }
}

fn bench_mandelbrot(c: &mut Criterion) {
    let p = params(Algorithm::Mandelbrot);
    c.bench_function("mandelbrot 64x64", move |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for y in 500..564 {
                for x in 600..664 {
                    acc += kernel::escape_time(x, y, &p);
                }
            }
            acc
        })
    });
}

fn bench_julia(c: &mut Criterion) {
    let seed = Complex::new(-0.8, 0.156);
    let p = params(Algorithm::Julia(seed));
    c.bench_function("julia 64x64", move |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for y in 500..564 {
                for x in 600..664 {
                    acc += kernel::julia(x, y, seed, &p);
                }
            }
            acc
        })
    });
}

criterion_group!(benches, bench_mandelbrot, bench_julia);
criterion_main!(benches);
