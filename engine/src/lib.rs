//! Link station coverage library.
//!
//! Exposes the plane model, best-station evaluation, input/output protocol,
//! configuration and session modules for use by integration tests and the
//! binary entry point.

pub mod config;
pub mod eval;
pub mod model;
pub mod protocol;
pub mod scenario;
pub mod session;
