//! `scenegen-worker` library crate.
//!
//! Re-exports the submission loop and its configuration for integration
//! testing. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod submitter;
