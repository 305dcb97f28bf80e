//! HTTP API for the matchday tournament roster engine.
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so integration tests can build the router against an in-memory
//! store.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod logging;
pub mod metrics;
