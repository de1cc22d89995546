//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod pipeline;

pub use pipeline::*;
