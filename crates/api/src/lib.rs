//! Scene generation callback server library.
//!
//! Exposes configuration, state, error handling, callback reconciliation and
//! routes so integration tests and the binary entrypoint share them.

pub mod config;
pub mod error;
pub mod reconcile;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
