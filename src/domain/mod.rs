//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `pipeline` - Step catalog, progress rows, advancement and reconciliation rules
//! - `survey` - Discovery survey responses and analysis normalization
//! - `workflow` - Workflows synthesized from an analyzed survey

pub mod foundation;
pub mod pipeline;
pub mod survey;
pub mod workflow;
