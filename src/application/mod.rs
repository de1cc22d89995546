//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers change pipeline progress; query handlers only read it.

pub mod handlers;
pub mod hooks;

pub use handlers::*;
pub use hooks::{HookFailure, HookRegistry, WorkflowGenerationHook};
