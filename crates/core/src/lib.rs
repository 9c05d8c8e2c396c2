//! Scene generation domain core.
//!
//! Everything here is transport-agnostic: the descriptor record format,
//! task correlation over the batch directory tree, result-to-scene
//! mapping, naming rules, CSV input parsing, and the submission retry
//! policy. HTTP lives in `scenegen-client` and `scenegen-api`.

pub mod batch;
pub mod config;
pub mod correlator;
pub mod descriptor;
pub mod error;
pub mod input;
pub mod locks;
pub mod mapping;
pub mod naming;
pub mod retry;
pub mod types;
