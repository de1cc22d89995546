//! Step completion hook port.
//!
//! Hooks let side effects (such as workflow generation) react to a step being
//! completed without the pipeline engine knowing about them. They are
//! registered per [`StepKind`](crate::domain::pipeline::StepKind).

use async_trait::async_trait;

use crate::domain::foundation::{ClientId, DomainError, PipelineGroupId, Timestamp, UserId};
use crate::domain::pipeline::PipelineStep;

/// Context handed to hooks after a step was completed.
#[derive(Debug, Clone)]
pub struct StepCompletion {
    pub user_id: UserId,
    pub client_id: ClientId,
    pub pipeline_group_id: PipelineGroupId,
    pub step: PipelineStep,
    pub completed_at: Timestamp,
}

/// Side effect triggered by the completion of a step.
#[async_trait]
pub trait StepCompletionHook: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// React to the completion. An error aborts the remaining pipeline work
    /// for this request; the completed step itself stays completed.
    async fn on_step_completed(&self, completion: &StepCompletion) -> Result<(), DomainError>;
}
