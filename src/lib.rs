#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Progressive tiled fractal renderer
//!
//! Fractile computes escape-time fractals (the Mandelbrot set, the
//! tricorn, and Julia sets) over a fixed pixel grid, refining the
//! image from coarse blocks down to individual pixels so that a
//! recognizable picture appears almost immediately and sharpens as
//! the render proceeds.
//!
//! The canvas is divided into horizontal bands, one band per worker.
//! Each worker walks its band stamping square blocks with a single
//! escape-time evaluation, halving the block size on every pass and
//! skipping any block origin it has already evaluated.  Workers run
//! in bounded batches; after every batch the orchestrator presents
//! the current canvas to whatever frontend is attached, so the
//! picture refines on screen round by round.
//!
//! The crate deliberately knows nothing about windows, OpenGL, or
//! file formats.  A frontend supplies presentation and persistence
//! through the [`Frontend`](orchestrator/trait.Frontend.html) trait;
//! the shipped binary uses a console frontend that logs progress and
//! saves a PNG at the end.

extern crate crossbeam;
extern crate failure;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;

pub mod canvas;
pub mod color;
pub mod kernel;
pub mod orchestrator;
pub mod params;
pub mod worker;

pub use canvas::Canvas;
pub use color::Rgb;
pub use orchestrator::{Control, Frontend, Orchestrator, Outcome};
pub use params::{Algorithm, RenderConfig, RenderParams, Scheduling};
pub use worker::WorkerState;
