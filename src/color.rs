//! Maps normalized divergence values onto RGB.
//!
//! Two palettes: a six-segment rainbow ramp and a plain grayscale.
//! Each comes in a second, "phased" form used once a render has
//! finished, where an animation phase is folded into the value before
//! mapping so the palette rotates over the still image.  The phased
//! rainbow is not just the plain ramp shifted; it has its own segment
//! assignments chosen so the rotation wraps without a seam.

use canvas::Canvas;

/// An 8-bit RGB triple.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Maps a divergence value in [0, 1] to a color.
///
/// `phase` is ignored unless `phased` is set.
pub fn value_to_color(value: f64, mono: bool, phased: bool, phase: f64) -> Rgb {
    if !phased {
        if mono {
            let v = ((1.0 - value) * 255.0) as u8;
            return Rgb(v, v, v);
        }

        let mut value = value * 6.0;
        if value < 1.0 {
            Rgb((255.0 * value) as u8, 0, 255)
        } else if value < 2.0 {
            value -= 1.0;
            Rgb(1, (255.0 * value) as u8, (255.0 * (1.0 - value)) as u8)
        } else if value < 3.0 {
            value -= 2.0;
            Rgb((255.0 * (1.0 - value)) as u8, 255, 0)
        } else if value < 4.0 {
            value -= 3.0;
            Rgb(0, 255, (255.0 * value) as u8)
        } else if value < 5.0 {
            value -= 4.0;
            Rgb(0, (255.0 * (1.0 - value)) as u8, 255)
        } else {
            value -= 5.0;
            Rgb(0, 0, (255.0 * (1.0 - value)) as u8)
        }
    } else {
        let mut value = value + phase;
        if value >= 1.0 {
            value -= 1.0;
        }

        if mono {
            // Triangle wave, so the pulse brightens and dims instead
            // of snapping back to black at the wrap point.
            let v = ((value * 2.0 - 1.0).abs() * 255.0) as u8;
            return Rgb(v, v, v);
        }

        let mut value = value * 6.0;
        if value < 1.0 {
            Rgb(255, 0, (value * 255.0) as u8)
        } else if value < 2.0 {
            value -= 1.0;
            Rgb(((1.0 - value) * 255.0) as u8, 0, 255)
        } else if value < 3.0 {
            value -= 2.0;
            Rgb(0, (value * 255.0) as u8, 255)
        } else if value < 4.0 {
            value -= 3.0;
            Rgb(0, 255, ((1.0 - value) * 255.0) as u8)
        } else if value < 5.0 {
            value -= 4.0;
            Rgb((value * 255.0) as u8, 255, 0)
        } else {
            value -= 5.0;
            Rgb(255, ((1.0 - value) * 255.0) as u8, 0)
        }
    }
}

/// Flattens a whole canvas to row-major RGB triples, ready for a
/// presenter to hand to a display surface or an image encoder.
pub fn canvas_rgb(canvas: &Canvas, mono: bool, phased: bool, phase: f64) -> Vec<u8> {
    let mut data = Vec::with_capacity(canvas.len() * 3);
    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            let Rgb(r, g, b) = value_to_color(canvas.value(x, y), mono, phased, phase);
            data.push(r);
            data.push(g);
            data.push(b);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_zero_is_blue() {
        assert_eq!(value_to_color(0.0, false, false, 0.0), Rgb(0, 0, 255));
    }

    #[test]
    fn ramp_top_fades_to_black() {
        // 31/32 is exact in binary, so 6 * value = 5.8125 exactly:
        // deep in the last segment, nearly black.
        assert_eq!(value_to_color(0.96875, false, false, 0.0), Rgb(0, 0, 47));
        // Exactly 1.0 (a never-escaping point) lands on black.
        assert_eq!(value_to_color(1.0, false, false, 0.0), Rgb(0, 0, 0));
    }

    #[test]
    fn ramp_walks_all_six_segments() {
        // Probe values are exact binary fractions, so every product
        // below is exact and the truncating casts are deterministic.
        assert_eq!(value_to_color(0.125, false, false, 0.0), Rgb(191, 0, 255));
        assert_eq!(value_to_color(0.25, false, false, 0.0), Rgb(1, 127, 127));
        assert_eq!(value_to_color(0.375, false, false, 0.0), Rgb(191, 255, 0));
        assert_eq!(value_to_color(0.5, false, false, 0.0), Rgb(0, 255, 0));
        assert_eq!(value_to_color(0.75, false, false, 0.0), Rgb(0, 127, 255));
        assert_eq!(value_to_color(0.875, false, false, 0.0), Rgb(0, 0, 191));
    }

    #[test]
    fn mono_is_inverted_grayscale() {
        assert_eq!(value_to_color(0.0, true, false, 0.0), Rgb(255, 255, 255));
        assert_eq!(value_to_color(1.0, true, false, 0.0), Rgb(0, 0, 0));
        assert_eq!(value_to_color(0.25, true, false, 0.0), Rgb(191, 191, 191));
    }

    #[test]
    fn phased_ramp_uses_rotated_segments() {
        // Phase 0, value 0: the rotated ramp starts at red, not blue.
        assert_eq!(value_to_color(0.0, false, true, 0.0), Rgb(255, 0, 0));
        // Phase folds into the value modulo 1.
        assert_eq!(
            value_to_color(0.75, false, true, 0.25),
            value_to_color(0.0, false, true, 0.0)
        );
        // Rotated segment assignments (exact binary probes again).
        assert_eq!(value_to_color(0.25, false, true, 0.0), Rgb(127, 0, 255));
        assert_eq!(value_to_color(0.5, false, true, 0.0), Rgb(0, 255, 255));
        assert_eq!(value_to_color(0.625, false, true, 0.0), Rgb(0, 255, 63));
    }

    #[test]
    fn phased_mono_is_a_triangle_wave() {
        assert_eq!(value_to_color(0.0, true, true, 0.0), Rgb(255, 255, 255));
        assert_eq!(value_to_color(0.5, true, true, 0.0), Rgb(0, 0, 0));
        // Symmetric about the midpoint.
        assert_eq!(
            value_to_color(0.25, true, true, 0.0),
            value_to_color(0.75, true, true, 0.0)
        );
        // The phase shifts the wave.
        assert_eq!(value_to_color(0.25, true, true, 0.25), Rgb(0, 0, 0));
    }
}
