//! Common test utilities for the GE Kitchen integration
//!
//! Fixtures for simulated appliances, a recording host and helpers to build
//! a coordinator over the in-memory client.

#![allow(dead_code)]

mod fixtures;
mod host;

pub use fixtures::*;
pub use host::*;
