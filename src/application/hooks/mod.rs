//! Step completion hooks.

mod registry;
mod workflow_generation;

pub use registry::{HookFailure, HookRegistry};
pub use workflow_generation::WorkflowGenerationHook;
