//! StartPipelineGroupHandler - Command handler that opens a new pipeline group
//! for a client (a restart). Earlier groups are left untouched.

use std::sync::Arc;

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, PipelineGroupId, Timestamp, UserId,
};
use crate::domain::pipeline::{NewProgress, PipelineProgress, ProgressTransition};
use crate::ports::{ProgressRepository, StepCatalogReader};

#[derive(Debug, Clone)]
pub struct StartPipelineGroupCommand {
    pub user_id: UserId,
    pub client_id: ClientId,
}

#[derive(Debug, Clone)]
pub struct StartPipelineGroupResult {
    pub pipeline_group_id: PipelineGroupId,
    /// Row for the first catalog step, `in-progress`.
    pub started: PipelineProgress,
}

#[derive(Debug, Clone)]
pub enum StartPipelineGroupError {
    /// The client still has a step in progress in this group.
    ClientHasActiveGroup(PipelineGroupId),
    EmptyCatalog,
    Domain(DomainError),
}

impl std::fmt::Display for StartPipelineGroupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartPipelineGroupError::ClientHasActiveGroup(id) => {
                write!(f, "Client already has an active pipeline group: {}", id)
            }
            StartPipelineGroupError::EmptyCatalog => write!(f, "The pipeline catalog has no steps"),
            StartPipelineGroupError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for StartPipelineGroupError {}

impl From<DomainError> for StartPipelineGroupError {
    fn from(err: DomainError) -> Self {
        StartPipelineGroupError::Domain(err)
    }
}

pub struct StartPipelineGroupHandler {
    catalog: Arc<dyn StepCatalogReader>,
    progress: Arc<dyn ProgressRepository>,
}

impl StartPipelineGroupHandler {
    pub fn new(catalog: Arc<dyn StepCatalogReader>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { catalog, progress }
    }

    pub async fn handle(
        &self,
        cmd: StartPipelineGroupCommand,
    ) -> Result<StartPipelineGroupResult, StartPipelineGroupError> {
        let rows = self.progress.find_by_client(&cmd.client_id).await?;
        if let Some(active) = rows.iter().find(|r| r.status.is_in_progress()) {
            return Err(StartPipelineGroupError::ClientHasActiveGroup(
                active.pipeline_group_id,
            ));
        }

        let catalog = self.catalog.load_catalog().await?;
        let first = catalog.first().ok_or(StartPipelineGroupError::EmptyCatalog)?;

        let pipeline_group_id = PipelineGroupId::new();
        let now = Timestamp::now();
        let transition = ProgressTransition {
            complete: None,
            start: Some(NewProgress::started(
                cmd.user_id,
                cmd.client_id,
                pipeline_group_id,
                first.id,
                now,
            )),
            at: now,
        };

        let started = self
            .progress
            .apply_transition(&transition)
            .await?
            .started
            .ok_or_else(|| {
                DomainError::new(ErrorCode::InternalError, "Progress store did not insert the first step")
            })?;

        tracing::info!(
            client_id = %cmd.client_id,
            pipeline_group_id = %pipeline_group_id,
            "Started new pipeline group"
        );

        Ok(StartPipelineGroupResult {
            pipeline_group_id,
            started,
        })
    }
}
