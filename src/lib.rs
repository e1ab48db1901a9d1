//! chartbench - benchmark orchestration engine for charting libraries.
//!
//! Runs ordered groups of synthetic test cases against a pluggable
//! rendering adapter, drives a frame-synchronized update loop, derives
//! FPS/latency metrics from lifecycle checkpoints, enforces hang and
//! low-FPS circuit breakers, and persists finished results to a keyed
//! JSON store.
//!
//! The core is single-threaded and cooperative: the host paint signal
//! ([`adapter::FrameSync`]) is the engine's only suspension point, so no
//! two cases and no two frames ever overlap.

#![forbid(unsafe_code)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

pub mod adapter;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod error;
pub mod frame_loop;
pub mod policy;
pub mod record;
pub mod report;
pub mod sequencer;
pub mod sim;
pub mod store;
pub mod system;

pub use error::{Error, Result};
