//! HTTP side of scene generation.
//!
//! Wraps the remote generation API (request submission), defines the
//! callback wire format, and materializes delivered images onto disk using
//! [`reqwest`].

pub mod api;
pub mod fetch;
pub mod messages;
