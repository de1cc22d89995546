//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum routes and DTOs for the pipeline API
//! - `memory` - In-memory stores for tests and local runs
//! - `postgres` - sqlx-backed stores
//! - `survey` - Survey analysis normalization

pub mod http;
pub mod memory;
pub mod postgres;
pub mod survey;
