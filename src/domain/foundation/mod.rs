//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the onboarding pipeline domain.

mod errors;
mod ids;
mod progress_status;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    ClientId, NodeId, PipelineGroupId, ProgressId, StepId, SurveyResponseId, UserId, WorkflowId,
};
pub use progress_status::ProgressStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
