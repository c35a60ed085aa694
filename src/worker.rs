//! The progressive refinement worker.
//!
//! Each worker owns the horizontal stripes of the canvas whose index
//! (counted in `start_size`-row stripes) is congruent to the worker's
//! id modulo the thread count.  Within those stripes it walks block
//! origins in raster order, evaluates the kernel once per origin it
//! has not seen before, and stamps the result across the whole block.
//! When a pass over the canvas completes, the block size halves and
//! the walk restarts at the finer resolution; the processed flags
//! keep coarser origins from ever being recomputed.  At block size 1
//! the worker is exhausted and contributes no further work.
//!
//! Stamped blocks at coarser levels are partially overwritten by the
//! finer passes that follow, except at each block's origin pixel,
//! which keeps its first value forever.  The finished image is an
//! exact per-pixel render everywhere except at those surviving
//! origins, an accepted approximation of the refinement scheme.
//!
//! A worker never runs more than `batch` evaluations in one call.
//! The cursor and block size live in the [`WorkerState`] and carry
//! over, so the next call picks up exactly where the previous one
//! stopped.  Walking positions that fail the band test or are
//! already processed does not count against the batch; only fresh
//! kernel evaluations do.
//!
//! [`WorkerState`]: struct.WorkerState.html

use canvas::Canvas;
use kernel;
use params::{RenderParams, Scheduling};

/// The persistent cursor of one worker.
///
/// Owned by the worker thread while a batch runs, and handed back to
/// the orchestrator with the completion signal.  Nobody else touches
/// it in between.
#[derive(Clone, Debug)]
pub struct WorkerState {
    core: usize,
    block_size: usize,
    x: usize,
    y: usize,
    finished: bool,
}

impl WorkerState {
    /// A fresh cursor for worker `core`, positioned at the first row
    /// of its first stripe at the coarsest block size.
    pub fn new(core: usize, start_size: usize) -> WorkerState {
        WorkerState {
            core,
            block_size: start_size,
            x: 0,
            y: core * start_size,
            finished: false,
        }
    }

    /// The worker id this cursor belongs to.
    pub fn core(&self) -> usize {
        self.core
    }

    /// True once the worker has walked its band at block size 1.
    /// A finished worker performs no further work, ever.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Runs at most `sched.batch` kernel evaluations, stamping each
    /// result into the canvas, then returns the number performed.
    /// Returns early (possibly with zero evaluations) only when the
    /// band is exhausted at block size 1.
    pub fn run_batch(
        &mut self,
        canvas: &Canvas,
        params: &RenderParams,
        sched: &Scheduling,
    ) -> usize {
        let mut evaluated = 0;

        while evaluated < sched.batch {
            if self.y < canvas.height() {
                if (self.y / sched.start_size) % sched.threads == self.core
                    && !canvas.is_processed(self.x, self.y)
                {
                    let m = kernel::escape_time(self.x, self.y, params);
                    evaluated += 1;
                    canvas.stamp(self.x, self.y, self.block_size, m);
                    canvas.mark_processed(self.x, self.y);
                }

                self.x += self.block_size;
                if self.x >= canvas.width() {
                    self.x = 0;
                    self.y += self.block_size;
                }
            } else if self.block_size == 1 {
                self.finished = true;
                break;
            } else {
                // Pass complete: halve the block and re-walk the band
                // at the finer resolution.  The flags make the
                // re-walk skip everything the coarser passes already
                // evaluated.
                self.block_size /= 2;
                self.x = 0;
                self.y = self.core * self.block_size;
            }
        }

        evaluated
    }
}
