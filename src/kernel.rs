//! The escape-time evaluators.
//!
//! Each function maps a pixel coordinate to a normalized divergence
//! value: the number of iterations the orbit survived before either
//! component of `z` exceeded the infinity bound, divided by the
//! iteration cap.  A point whose orbit never escapes scores 1.0; a
//! point that escapes immediately scores `1/iterations`.
//!
//! The escape test is deliberately the cheap component-wise one
//! (`z.im > infinity || z.re > infinity`), not the usual
//! `norm_sqr() > bound²` radius test.  Images rendered with the two
//! tests differ near the boundary, and the component-wise test is the
//! one the palette was tuned against, so it stays.

use num::Complex;
use params::{Algorithm, RenderParams};

/// Evaluates whichever algorithm the parameters select at one pixel.
pub fn escape_time(x: usize, y: usize, params: &RenderParams) -> f64 {
    match params.algorithm {
        Algorithm::Mandelbrot => mandelbrot(x, y, params),
        Algorithm::Tricorn => tricorn(x, y, params),
        Algorithm::Julia(seed) => julia(x, y, seed, params),
    }
}

#[inline]
fn diverged(z: Complex<f64>, infinity: f64) -> bool {
    z.im > infinity || z.re > infinity
}

/// `z^power` by repeated multiplication.  Only ever called with
/// power >= 2, which the parameter clamps guarantee.
fn raise(z: Complex<f64>, power: u32) -> Complex<f64> {
    let zz = z;
    let mut out = z;
    for _ in 1..power {
        out = out * zz;
    }
    out
}

/// The Mandelbrot iteration `z ← z^p + c`, `z0 = 0`, with `c` mapped
/// from the pixel.
pub fn mandelbrot(x: usize, y: usize, params: &RenderParams) -> f64 {
    let c = params.map_point(x, y);
    let mut z = Complex::new(0.0, 0.0);
    let mut i = 0;

    match params.power {
        2 => {
            while i < params.iterations {
                z = z * z + c;
                i += 1;
                if diverged(z, params.infinity) {
                    break;
                }
            }
        }
        p => {
            while i < params.iterations {
                z = raise(z, p) + c;
                i += 1;
                if diverged(z, params.infinity) {
                    break;
                }
            }
        }
    }

    f64::from(i) / f64::from(params.iterations)
}

/// The tricorn iteration: like the Mandelbrot, but the power is
/// conjugated before `c` is added, mirroring the set about the real
/// axis into its three-cornered shape.
pub fn tricorn(x: usize, y: usize, params: &RenderParams) -> f64 {
    let c = params.map_point(x, y);
    let mut z = Complex::new(0.0, 0.0);
    let mut i = 0;

    match params.power {
        2 => {
            while i < params.iterations {
                z = (z * z).conj() + c;
                i += 1;
                if diverged(z, params.infinity) {
                    break;
                }
            }
        }
        p => {
            while i < params.iterations {
                z = raise(z, p).conj() + c;
                i += 1;
                if diverged(z, params.infinity) {
                    break;
                }
            }
        }
    }

    f64::from(i) / f64::from(params.iterations)
}

/// The Julia iteration `z ← z^p + c`: the seed `c` is fixed for the
/// whole image and the pixel supplies the starting point instead.
/// Powers 2 through 4 are spelled out as plain products; higher
/// powers fall back to repeated multiplication.
pub fn julia(x: usize, y: usize, seed: Complex<f64>, params: &RenderParams) -> f64 {
    let mut z = params.map_point(x, y);
    let c = seed;
    let mut i = 0;

    while i < params.iterations {
        z = match params.power {
            2 => z * z + c,
            3 => z * z * z + c,
            4 => z * z * z * z + c,
            p => raise(z, p) + c,
        };
        i += 1;
        if diverged(z, params.infinity) {
            break;
        }
    }

    f64::from(i) / f64::from(params.iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(algorithm: Algorithm) -> RenderParams {
        RenderParams {
            frac_x: 0.0,
            frac_y: 0.0,
            scale: 1.0,
            iterations: 200,
            infinity: 1e100,
            power: 2,
            algorithm,
            x_centre: 0,
            y_centre: 0,
        }
    }

    #[test]
    fn origin_never_escapes() {
        // c = 0: the orbit sits at 0 forever, so the full iteration
        // budget is spent and the value saturates at 1.0.
        let p = params(Algorithm::Mandelbrot);
        assert_eq!(mandelbrot(0, 0, &p), 1.0);
    }

    #[test]
    fn immediate_escape_scores_one_iteration() {
        // c = 2 + 0i with a bound below 2: the very first step lands
        // on c itself, which already exceeds the bound.
        let mut p = params(Algorithm::Mandelbrot);
        p.frac_x = 2.0;
        p.infinity = 1.5;
        assert_eq!(mandelbrot(0, 0, &p), 1.0 / 200.0);
    }

    #[test]
    fn escape_test_is_signed() {
        // c = -4: the orbit walks the negative real axis (−4, 12, …);
        // it blows up through the *positive* side on the next step,
        // not the moment its magnitude passes the bound.
        let mut p = params(Algorithm::Mandelbrot);
        p.frac_x = -4.0;
        p.infinity = 3.0;
        assert_eq!(mandelbrot(0, 0, &p), 2.0 / 200.0);
    }

    #[test]
    fn tricorn_origin_never_escapes() {
        let p = params(Algorithm::Tricorn);
        assert_eq!(tricorn(0, 0, &p), 1.0);
    }

    #[test]
    fn tricorn_conjugates_the_orbit() {
        // c = 0 - 2i, bound 1.5:
        //   z1 = conj(0)       + c = -2i      (bounded: im < 1.5)
        //   z2 = conj(-4)      + c = -4 - 2i  (bounded)
        //   z3 = conj(12 + 16i) + c = 12 - 18i (re > 1.5, escaped)
        let mut p = params(Algorithm::Tricorn);
        p.frac_y = -2.0;
        p.infinity = 1.5;
        assert_eq!(tricorn(0, 0, &p), 3.0 / 200.0);
    }

    #[test]
    fn julia_uses_pixel_as_orbit_start() {
        // Seed 0, z0 = 2: first squaring gives 4, over the bound.
        let mut p = params(Algorithm::Julia(Complex::new(0.0, 0.0)));
        p.frac_x = 2.0;
        p.infinity = 3.0;
        assert_eq!(julia(0, 0, Complex::new(0.0, 0.0), &p), 1.0 / 200.0);
    }

    #[test]
    fn julia_bounded_seed_never_escapes() {
        // z0 = 0.5, c = 0: the orbit decays towards zero.
        let mut p = params(Algorithm::Julia(Complex::new(0.0, 0.0)));
        p.frac_x = 0.5;
        assert_eq!(julia(0, 0, Complex::new(0.0, 0.0), &p), 1.0);
    }

    #[test]
    fn high_powers_use_repeated_multiplication() {
        // Power 5, z0 = 1.1, c = 0, bound 10:
        //   z1 = 1.1^5  ≈ 1.61  (bounded)
        //   z2 = z1^5   ≈ 10.83 (escaped)
        let mut p = params(Algorithm::Julia(Complex::new(0.0, 0.0)));
        p.power = 5;
        p.frac_x = 1.1;
        p.infinity = 10.0;
        assert_eq!(julia(0, 0, Complex::new(0.0, 0.0), &p), 2.0 / 200.0);
    }

    #[test]
    fn special_cased_powers_agree_with_the_general_form() {
        // The power-3 and power-4 fast paths must compute the same
        // orbit as raise().
        for &(power, x0) in &[(3, 1.3), (4, 1.2)] {
            let seed = Complex::new(0.1, 0.05);
            let mut p = params(Algorithm::Julia(seed));
            p.power = power;
            p.frac_x = x0;
            p.infinity = 50.0;
            let fast = julia(0, 0, seed, &p);

            let mut z = Complex::new(x0, 0.0);
            let mut i = 0;
            while i < p.iterations {
                z = raise(z, power) + seed;
                i += 1;
                if diverged(z, p.infinity) {
                    break;
                }
            }
            let general = f64::from(i) / f64::from(p.iterations);
            assert_eq!(fast, general);
        }
    }
}
