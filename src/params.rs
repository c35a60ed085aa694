//! Render parameters and the knobs that shape a run.
//!
//! Everything here is decided once, before the first worker starts,
//! and never mutated afterwards.  The clamping helpers live here too:
//! the core assumes in-range values everywhere else, so the frontend
//! is expected to pass its raw configuration through these before
//! constructing a [`RenderConfig`](struct.RenderConfig.html).

use num::Complex;
use std::cmp;
use std::path::PathBuf;

/// Which escape-time iteration a render uses.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Algorithm {
    /// The classic `z ← z^p + c` with `c` taken from the pixel.
    Mandelbrot,
    /// Like the Mandelbrot, but conjugating after the power.
    Tricorn,
    /// `z ← z^p + c` with a fixed seed `c` and `z0` from the pixel.
    Julia(Complex<f64>),
}

/// The immutable numeric inputs to the escape-time kernel.
///
/// `x_centre`/`y_centre` shift the pixel grid so that an interesting
/// region of the plane lands on it; they come from the segment table
/// (see [`segment_centre`](fn.segment_centre.html)) rather than being
/// set directly.
#[derive(Copy, Clone, Debug)]
pub struct RenderParams {
    /// Real offset added after scaling, i.e. the view's x coordinate.
    pub frac_x: f64,
    /// Imaginary offset added after scaling, the view's y coordinate.
    pub frac_y: f64,
    /// Reciprocal of the zoom factor.
    pub scale: f64,
    /// Iteration cap; orbits still bounded after this many steps are
    /// treated as members of the set.
    pub iterations: u32,
    /// The divergence bound.  An orbit has escaped as soon as either
    /// component of `z` exceeds this.
    pub infinity: f64,
    /// Exponent of the iteration, 2 for the standard sets.
    pub power: u32,
    /// Which fractal to iterate.
    pub algorithm: Algorithm,
    /// Horizontal pixel-grid shift, from the segment table.
    pub x_centre: i64,
    /// Vertical pixel-grid shift, from the segment table.
    pub y_centre: i64,
}

impl RenderParams {
    /// Maps a pixel coordinate to its point on the complex plane.
    pub fn map_point(&self, x: usize, y: usize) -> Complex<f64> {
        Complex::new(
            (x as i64 + self.x_centre) as f64 * self.scale + self.frac_x,
            (y as i64 + self.y_centre) as f64 * self.scale + self.frac_y,
        )
    }
}

/// How the canvas is carved up among workers.
#[derive(Copy, Clone, Debug)]
pub struct Scheduling {
    /// Number of parallel workers.  Each worker owns the horizontal
    /// bands whose stripe index is congruent to its id.
    pub threads: usize,
    /// Starting block edge, a power of two.  Also the height of the
    /// stripes that define band ownership.
    pub start_size: usize,
    /// Maximum kernel evaluations a worker performs per round.
    pub batch: usize,
}

/// The complete configuration of one render, as assembled by the CLI.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Canvas width in pixels.
    pub width: usize,
    /// Canvas height in pixels.
    pub height: usize,
    /// Worker partitioning and batch bounds.
    pub sched: Scheduling,
    /// Kernel inputs.
    pub params: RenderParams,
    /// Render in grayscale rather than the rainbow ramp.
    pub mono: bool,
    /// Cycle the palette over the finished image.
    pub phaser: bool,
    /// Where to save the finished render; `None` disables saving.
    pub output: Option<PathBuf>,
    /// Stop as soon as the render (and save) completes instead of
    /// sticking around to animate.
    pub exit_when_done: bool,
}

/// Coerces an out-of-range segment selector to the default view.
pub fn clamp_segment(segment: i64) -> u8 {
    if segment >= 0 && segment <= 6 {
        segment as u8
    } else {
        0
    }
}

/// The pixel-grid shift for a view segment.
///
/// Segment 0 centres the canvas on the origin.  Segments 1 through 6
/// tile a virtual canvas twice as wide and twice as tall: three views
/// across the top half, three across the bottom, so a full six-panel
/// render covers the plane around the origin.
pub fn segment_centre(segment: u8, width: usize, height: usize) -> (i64, i64) {
    let w = width as i64;
    let h = height as i64;
    match segment {
        1 => (-3 * w / 2, -h),
        2 => (-w / 2, -h),
        3 => (w / 2, -h),
        4 => (-3 * w / 2, 0),
        5 => (-w / 2, 0),
        6 => (w / 2, 0),
        _ => (-w / 2, -h / 2),
    }
}

/// Clamps a batch size to something the scheduler can make progress
/// with: at least one evaluation, at most the whole canvas.
pub fn clamp_batch(batch: usize, width: usize, height: usize) -> usize {
    cmp::max(1, cmp::min(batch, width * height))
}

/// Powers below 2 degenerate; clamp them to the standard iteration.
pub fn clamp_power(power: u32) -> u32 {
    cmp::max(2, power)
}

/// Converts a zoom factor to the kernel's scale, coercing a zoom of
/// zero to 1 rather than dividing by it.
pub fn scale_for_zoom(zoom: f64) -> f64 {
    if zoom == 0.0 {
        1.0
    } else {
        1.0 / zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_selector_is_clamped() {
        assert_eq!(clamp_segment(-1), 0);
        assert_eq!(clamp_segment(7), 0);
        assert_eq!(clamp_segment(3), 3);
        assert_eq!(clamp_segment(0), 0);
    }

    #[test]
    fn segment_table_matches_reference_views() {
        assert_eq!(segment_centre(0, 1280, 1080), (-640, -540));
        assert_eq!(segment_centre(1, 1280, 1080), (-1920, -1080));
        assert_eq!(segment_centre(2, 1280, 1080), (-640, -1080));
        assert_eq!(segment_centre(3, 1280, 1080), (640, -1080));
        assert_eq!(segment_centre(4, 1280, 1080), (-1920, 0));
        assert_eq!(segment_centre(5, 1280, 1080), (-640, 0));
        assert_eq!(segment_centre(6, 1280, 1080), (640, 0));
    }

    #[test]
    fn batch_is_clamped_to_canvas() {
        assert_eq!(clamp_batch(0, 100, 100), 1);
        assert_eq!(clamp_batch(20480, 100, 100), 10000);
        assert_eq!(clamp_batch(500, 100, 100), 500);
    }

    #[test]
    fn power_is_clamped() {
        assert_eq!(clamp_power(0), 2);
        assert_eq!(clamp_power(1), 2);
        assert_eq!(clamp_power(5), 5);
    }

    #[test]
    fn zero_zoom_is_coerced() {
        assert_eq!(scale_for_zoom(0.0), 1.0);
        assert_eq!(scale_for_zoom(500.0), 1.0 / 500.0);
    }

    #[test]
    fn map_point_applies_centre_then_scale_then_offset() {
        let params = RenderParams {
            frac_x: -0.5,
            frac_y: 0.0,
            scale: 0.01,
            iterations: 200,
            infinity: 1e100,
            power: 2,
            algorithm: Algorithm::Mandelbrot,
            x_centre: -640,
            y_centre: -540,
        };
        let c = params.map_point(640, 540);
        assert_eq!(c, Complex::new(-0.5, 0.0));
        let c = params.map_point(740, 540);
        assert_eq!(c, Complex::new(-0.5 + 1.0, 0.0));
    }
}
