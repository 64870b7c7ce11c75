//! sathdock-core — Config completion and progress relaying for docking runs.
//!
//! This crate wraps external molecular-docking binaries (AutoDock Vina and
//! the VirtualFlow variants). It does no docking itself:
//! 1. Completing a `key = value` docking configuration file, deriving the
//!    search-box geometry from `prepare_gpf.py` output when missing
//! 2. Launching the docking binary and relaying its output, with a
//!    heuristic progress stream emitted as newline-delimited JSON

pub mod completer;
pub mod config;
pub mod error;
pub mod gpf;
pub mod progress;
pub mod runner;

pub use error::{Result, SathdockError};
