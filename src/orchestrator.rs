//! Drives rounds of workers and feeds the frontend.
//!
//! A round spawns one thread per unfinished worker, each of which
//! runs a single bounded batch and sends its cursor back over a
//! channel.  The orchestrator's loop never blocks on the workers: it
//! drains the completion channel with a non-blocking receive, and
//! only when every worker of the round has reported does it present
//! the canvas and start the next round.  That ordering is the whole
//! concurrency story: a present always happens after the last write
//! of its round and before the first write of the next, because no
//! round-n+1 thread exists until round n has fully drained.
//!
//! Once every worker is exhausted the orchestrator saves the image
//! (if asked to) and either returns or stays in the loop presenting
//! phase-cycled frames of the finished render.

use canvas::Canvas;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use failure::Error;
use params::{RenderConfig, RenderParams, Scheduling};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use worker::WorkerState;

/// One full palette rotation of the completed-render animation, in
/// seconds.
const PHASE_CYCLE_SECS: f64 = 10.0;

/// What the frontend's poll wants the orchestrator to do next.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    /// Keep rendering.
    Continue,
    /// Schedule no further rounds and return as soon as the round in
    /// flight has drained.
    Stop,
}

/// How a run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every worker exhausted its band; the image is complete.
    Completed,
    /// The frontend asked to stop before the render finished.
    Stopped,
}

/// The collaborator surface: everything the renderer needs from the
/// outside world.
///
/// `present` receives the full current canvas once per completed
/// round, and again on every animation tick once the render is done.
/// `persist` is called exactly once, at completion, when an output is
/// configured; an error from it is fatal to the run.  `poll` is the
/// frontend's chance to pump its own event source and request a stop.
pub trait Frontend {
    /// Shows the current canvas.  `phase` is only meaningful when
    /// `phased` is set.
    fn present(&mut self, canvas: &Canvas, phased: bool, phase: f64);

    /// Saves the finished canvas.  Failures abort the run; there is
    /// no retry.
    fn persist(&mut self, canvas: &Canvas) -> Result<(), Error>;

    /// Called once per loop tick, between rounds.  Must not block.
    fn poll(&mut self) -> Control;
}

/// Owns the canvas and the worker cursors, and runs the round loop.
pub struct Orchestrator {
    canvas: Arc<Canvas>,
    params: RenderParams,
    sched: Scheduling,
    phaser: bool,
    persist: bool,
    exit_when_done: bool,
    /// Parked cursors; a slot is `None` while its worker is out
    /// running a batch.
    workers: Vec<Option<WorkerState>>,
    /// Workers spawned in the current round.
    active: usize,
    /// Of those, how many have not yet reported.
    pending: usize,
    tx: Sender<WorkerState>,
    rx: Receiver<WorkerState>,
    render_started: Instant,
    round_started: Instant,
    completed_at: Option<Instant>,
    stopping: bool,
}

impl Orchestrator {
    /// Sets up a renderer for the given configuration.  Nothing runs
    /// until [`run`](#method.run).
    pub fn new(config: &RenderConfig) -> Orchestrator {
        // Capacity 1, matching the handoff the workers expect: a
        // worker blocks in send until the orchestrator drains it,
        // which it always does before starting the next round.
        let (tx, rx) = channel::bounded(1);
        let workers = (0..config.sched.threads)
            .map(|core| Some(WorkerState::new(core, config.sched.start_size)))
            .collect();
        Orchestrator {
            canvas: Arc::new(Canvas::new(config.width, config.height)),
            params: config.params,
            sched: config.sched,
            phaser: config.phaser,
            persist: config.output.is_some(),
            exit_when_done: config.exit_when_done,
            workers,
            active: 0,
            pending: 0,
            tx,
            rx,
            render_started: Instant::now(),
            round_started: Instant::now(),
            completed_at: None,
            stopping: false,
        }
    }

    /// The canvas this orchestrator renders into.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Runs the render to completion (or to a requested stop),
    /// presenting after every round.
    ///
    /// If phase cycling is configured and immediate exit is not, the
    /// loop keeps presenting animated frames after completion until
    /// the frontend's poll asks it to stop.
    pub fn run<F: Frontend>(&mut self, frontend: &mut F) -> Result<Outcome, Error> {
        self.render_started = Instant::now();
        frontend.present(&self.canvas, false, 0.0);
        self.spawn_round();

        loop {
            let progressed = self.drain_completions();

            if self.active > 0 && self.pending == 0 {
                self.finish_round(frontend)?;
            }

            if self.completed_at.is_some() {
                if !self.phaser || self.exit_when_done || self.stopping {
                    return Ok(Outcome::Completed);
                }
                frontend.present(&self.canvas, true, self.phase());
            } else if self.stopping && self.active == 0 && self.pending == 0 {
                return Ok(Outcome::Stopped);
            }

            if let Control::Stop = frontend.poll() {
                self.stopping = true;
                if self.completed_at.is_some() {
                    return Ok(Outcome::Completed);
                }
            }

            if !progressed {
                thread::sleep(Duration::from_millis(1));
            }
        }
    }

    /// Spawns a thread for every unfinished worker, moving its cursor
    /// into the thread.  The cursor comes back on the channel when
    /// the batch is done.
    fn spawn_round(&mut self) {
        self.round_started = Instant::now();
        self.active = 0;

        for slot in self.workers.iter_mut() {
            let state = match slot.take() {
                Some(state) => state,
                None => continue,
            };
            if state.is_finished() {
                *slot = Some(state);
                continue;
            }

            debug!("starting worker {}", state.core());
            self.active += 1;

            let tx = self.tx.clone();
            let canvas = Arc::clone(&self.canvas);
            let params = self.params;
            let sched = self.sched;
            let mut state = state;
            thread::spawn(move || {
                let evaluated = state.run_batch(&canvas, &params, &sched);
                debug!("worker {} evaluated {} blocks", state.core(), evaluated);
                // The receiver only disappears when the run has been
                // abandoned, in which case the cursor is dead anyway.
                let _ = tx.send(state);
            });
        }

        self.pending = self.active;
    }

    /// Non-blocking sweep of the completion channel.  Returns whether
    /// anything arrived.
    fn drain_completions(&mut self) -> bool {
        let mut progressed = false;
        loop {
            match self.rx.try_recv() {
                Ok(state) => {
                    debug!("worker {} done", state.core());
                    if state.is_finished() {
                        info!("worker {} exhausted its band", state.core());
                    }
                    self.pending -= 1;
                    let core = state.core();
                    self.workers[core] = Some(state);
                    progressed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        progressed
    }

    /// Every worker of the round has reported: present, then either
    /// restart the unfinished workers or wrap up the render.
    fn finish_round<F: Frontend>(&mut self, frontend: &mut F) -> Result<(), Error> {
        self.active = 0;

        info!(
            "round complete in {:.3}s ({} of {} cells)",
            self.round_started.elapsed().as_secs_f64(),
            self.canvas.processed_cells(),
            self.canvas.len(),
        );

        let scene_started = Instant::now();
        frontend.present(&self.canvas, false, 0.0);
        debug!(
            "scene presented in {:.3}s",
            scene_started.elapsed().as_secs_f64()
        );

        let all_finished = self
            .workers
            .iter()
            .all(|slot| slot.as_ref().map_or(false, WorkerState::is_finished));

        if all_finished {
            let total = self.render_started.elapsed();
            self.completed_at = Some(Instant::now());
            if self.persist {
                frontend.persist(&self.canvas)?;
            }
            info!("render completed in {:.3}s", total.as_secs_f64());
        } else if !self.stopping {
            self.spawn_round();
        }

        Ok(())
    }

    /// Animation phase in [0, 1), derived from the time since the
    /// render completed.
    fn phase(&self) -> f64 {
        match self.completed_at {
            Some(at) => (at.elapsed().as_secs_f64() / PHASE_CYCLE_SECS).fract(),
            None => 0.0,
        }
    }
}
