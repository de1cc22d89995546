//! GetClientPipelineHandler - Query handler for the reconciled pipeline view
//! of a client across all of its pipeline groups.

use std::sync::Arc;

use crate::domain::foundation::{ClientId, DomainError, PipelineGroupId};
use crate::domain::pipeline::{build_client_view, ClientPipelineView};
use crate::ports::{ProgressRepository, StepCatalogReader};

#[derive(Debug, Clone)]
pub struct GetClientPipelineQuery {
    pub client_id: ClientId,
    /// Group to display regardless of activity, e.g. right after a restart.
    pub forced_group_id: Option<PipelineGroupId>,
}

#[derive(Debug, Clone)]
pub enum GetClientPipelineError {
    /// The forced group has no rows for this client.
    GroupNotFound(PipelineGroupId),
    Domain(DomainError),
}

impl std::fmt::Display for GetClientPipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetClientPipelineError::GroupNotFound(id) => {
                write!(f, "Pipeline group not found: {}", id)
            }
            GetClientPipelineError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for GetClientPipelineError {}

impl From<DomainError> for GetClientPipelineError {
    fn from(err: DomainError) -> Self {
        GetClientPipelineError::Domain(err)
    }
}

pub struct GetClientPipelineHandler {
    catalog: Arc<dyn StepCatalogReader>,
    progress: Arc<dyn ProgressRepository>,
}

impl GetClientPipelineHandler {
    pub fn new(catalog: Arc<dyn StepCatalogReader>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { catalog, progress }
    }

    pub async fn handle(
        &self,
        query: GetClientPipelineQuery,
    ) -> Result<ClientPipelineView, GetClientPipelineError> {
        let catalog = self.catalog.load_catalog().await?;
        let rows = self.progress.find_by_client(&query.client_id).await?;

        if let Some(forced) = query.forced_group_id {
            if !rows.iter().any(|r| r.pipeline_group_id == forced) {
                return Err(GetClientPipelineError::GroupNotFound(forced));
            }
        }

        Ok(build_client_view(&catalog, &rows, query.forced_group_id))
    }
}
