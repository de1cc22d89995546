//! AdvancePipelineHandler - Command handler that moves a pipeline group to its
//! next step.
//!
//! The current step is completed and the next one started in a single store
//! transition. When the current step is terminal it is completed and nothing
//! new is started.

use std::sync::Arc;

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, PipelineGroupId, Timestamp, UserId,
};
use crate::domain::pipeline::{plan_advance, AdvancePlan, PipelineProgress};
use crate::ports::{ProgressRepository, StepCatalogReader};

#[derive(Debug, Clone)]
pub struct AdvancePipelineCommand {
    pub user_id: UserId,
    pub client_id: ClientId,
    pub pipeline_group_id: PipelineGroupId,
}

/// What an advance did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Advanced {
        completed: Option<PipelineProgress>,
        started: PipelineProgress,
    },
    /// The terminal step was completed; the group is finished.
    FinalStepCompleted { completed: PipelineProgress },
}

impl AdvanceOutcome {
    pub fn completed_final_step(&self) -> bool {
        matches!(self, AdvanceOutcome::FinalStepCompleted { .. })
    }

    pub fn started(&self) -> Option<&PipelineProgress> {
        match self {
            AdvanceOutcome::Advanced { started, .. } => Some(started),
            AdvanceOutcome::FinalStepCompleted { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AdvancePipelineError {
    /// No next step can be computed.
    Exhausted(String),
    /// Another request advanced the group first.
    Conflict(String),
    Domain(DomainError),
}

impl std::fmt::Display for AdvancePipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvancePipelineError::Exhausted(msg) => write!(f, "{}", msg),
            AdvancePipelineError::Conflict(msg) => write!(f, "Concurrent modification: {}", msg),
            AdvancePipelineError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AdvancePipelineError {}

impl From<DomainError> for AdvancePipelineError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PipelineExhausted => AdvancePipelineError::Exhausted(err.message),
            ErrorCode::ConcurrentModification => AdvancePipelineError::Conflict(err.message),
            _ => AdvancePipelineError::Domain(err),
        }
    }
}

pub struct AdvancePipelineHandler {
    catalog: Arc<dyn StepCatalogReader>,
    progress: Arc<dyn ProgressRepository>,
}

impl AdvancePipelineHandler {
    pub fn new(catalog: Arc<dyn StepCatalogReader>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { catalog, progress }
    }

    pub async fn handle(
        &self,
        cmd: AdvancePipelineCommand,
    ) -> Result<AdvanceOutcome, AdvancePipelineError> {
        let catalog = self.catalog.load_catalog().await?;
        let rows = self.progress.find_by_group(&cmd.pipeline_group_id).await?;

        let plan = plan_advance(&catalog, &rows)?;
        let is_final = matches!(plan, AdvancePlan::CompleteFinal { .. });
        let transition = plan.into_transition(
            cmd.user_id,
            cmd.client_id,
            cmd.pipeline_group_id,
            Timestamp::now(),
        );

        let applied = self.progress.apply_transition(&transition).await?;

        let outcome = match (is_final, applied.completed, applied.started) {
            (true, Some(completed), _) => AdvanceOutcome::FinalStepCompleted { completed },
            (false, completed, Some(started)) => AdvanceOutcome::Advanced { completed, started },
            _ => {
                return Err(AdvancePipelineError::Domain(DomainError::new(
                    ErrorCode::InternalError,
                    "Progress store did not apply the requested transition",
                )))
            }
        };

        match &outcome {
            AdvanceOutcome::Advanced { started, .. } => tracing::info!(
                pipeline_group_id = %cmd.pipeline_group_id,
                step_id = %started.step_id,
                "Pipeline group advanced"
            ),
            AdvanceOutcome::FinalStepCompleted { completed } => tracing::info!(
                pipeline_group_id = %cmd.pipeline_group_id,
                step_id = %completed.step_id,
                "Pipeline group completed its final step"
            ),
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryProgressRepository, InMemoryStepCatalog};
    use crate::domain::foundation::{ProgressId, ProgressStatus, StepId};
    use crate::domain::pipeline::{NewProgress, PipelineStep, StepKind};

    fn command(group: PipelineGroupId) -> AdvancePipelineCommand {
        AdvancePipelineCommand {
            user_id: UserId::new(),
            client_id: ClientId::new(),
            pipeline_group_id: group,
        }
    }

    fn handler(progress: Arc<InMemoryProgressRepository>) -> AdvancePipelineHandler {
        AdvancePipelineHandler::new(Arc::new(InMemoryStepCatalog::default()), progress)
    }

    #[tokio::test]
    async fn empty_group_starts_first_step() {
        let progress = Arc::new(InMemoryProgressRepository::new());
        let group = PipelineGroupId::new();

        let outcome = handler(progress.clone()).handle(command(group)).await.unwrap();

        let started = outcome.started().unwrap();
        assert_eq!(started.step_id, StepId::new(1));
        assert_eq!(started.status, ProgressStatus::InProgress);
        assert_eq!(progress.find_by_group(&group).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn completes_current_and_starts_next() {
        let progress = Arc::new(InMemoryProgressRepository::new());
        let group = PipelineGroupId::new();
        let handler = handler(progress.clone());
        handler.handle(command(group)).await.unwrap();
        handler.handle(command(group)).await.unwrap();

        let outcome = handler.handle(command(group)).await.unwrap();

        match outcome {
            AdvanceOutcome::Advanced { completed, started } => {
                let completed = completed.unwrap();
                assert_eq!(completed.step_id, StepId::new(2));
                assert_eq!(completed.status, ProgressStatus::Completed);
                assert!(completed.completed_at.is_some());
                assert_eq!(started.step_id, StepId::new(3));
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let rows = progress.find_by_group(&group).await.unwrap();
        assert_eq!(rows.iter().filter(|r| r.status.is_in_progress()).count(), 1);
    }

    #[tokio::test]
    async fn terminal_step_completes_without_insert() {
        let group = PipelineGroupId::new();
        let user = UserId::new();
        let client = ClientId::new();
        let progress = Arc::new(InMemoryProgressRepository::with_rows(vec![NewProgress::started(
            user,
            client,
            group,
            StepId::new(8),
            Timestamp::from_unix_secs(1),
        )
        .into_progress(ProgressId::new(1))]));

        let outcome = handler(progress.clone()).handle(command(group)).await.unwrap();

        assert!(outcome.completed_final_step());
        let rows = progress.find_by_group(&group).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ProgressStatus::Completed);
    }

    #[tokio::test]
    async fn exhausted_group_writes_nothing() {
        let catalog = InMemoryStepCatalog::new(vec![
            PipelineStep::standard(1, "Intro", 1),
            PipelineStep::standard(2, "Wrap-up", 2),
        ]);
        let progress = Arc::new(InMemoryProgressRepository::new());
        let group = PipelineGroupId::new();
        let handler = AdvancePipelineHandler::new(Arc::new(catalog), progress.clone());
        handler.handle(command(group)).await.unwrap();
        handler.handle(command(group)).await.unwrap();

        let err = handler.handle(command(group)).await.unwrap_err();

        match err {
            AdvancePipelineError::Exhausted(msg) => {
                assert_eq!(msg, "All steps are already in progress or completed")
            }
            other => panic!("unexpected error {:?}", other),
        }
        let rows = progress.find_by_group(&group).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].status.is_in_progress());
    }

    #[tokio::test]
    async fn next_step_follows_step_order_not_id() {
        let catalog = InMemoryStepCatalog::new(vec![
            PipelineStep::standard(10, "First", 1),
            PipelineStep::standard(3, "Second", 2),
            PipelineStep::new(11, "Build", 3, StepKind::FactoryBuild),
        ]);
        let progress = Arc::new(InMemoryProgressRepository::new());
        let group = PipelineGroupId::new();
        let handler = AdvancePipelineHandler::new(Arc::new(catalog), progress);

        handler.handle(command(group)).await.unwrap();
        let outcome = handler.handle(command(group)).await.unwrap();

        assert_eq!(outcome.started().unwrap().step_id, StepId::new(3));
    }

    #[tokio::test]
    async fn factory_build_is_not_started_by_advancing() {
        let group = PipelineGroupId::new();
        let progress = Arc::new(InMemoryProgressRepository::with_rows(vec![NewProgress::started(
            UserId::new(),
            ClientId::new(),
            group,
            StepId::new(7),
            Timestamp::from_unix_secs(1),
        )
        .into_progress(ProgressId::new(1))]));

        let err = handler(progress.clone()).handle(command(group)).await.unwrap_err();

        match err {
            AdvancePipelineError::Domain(e) => {
                assert_eq!(e.code, ErrorCode::AutomaticStep);
                assert_eq!(e.details.get("step_id").map(String::as_str), Some("8"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        let rows = progress.find_by_group(&group).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].status.is_in_progress());
    }
}
