//! GetPipelineDataHandler - Query handler for the projected pipeline of one owner.

use std::sync::Arc;

use crate::domain::foundation::{ClientId, DomainError, UserId, ValidationError};
use crate::domain::pipeline::{project_pipeline, ProjectedStep};
use crate::ports::{ProgressRepository, StepCatalogReader};

/// Whose progress rows to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKey {
    User(UserId),
    Client(ClientId),
}

impl OwnerKey {
    /// Builds the key from raw query values. The user id wins when both are set.
    ///
    /// # Errors
    ///
    /// `EmptyField` when neither value is present, `InvalidFormat` when the
    /// chosen value is not a UUID.
    pub fn from_query(user_id: Option<&str>, client_id: Option<&str>) -> Result<Self, ValidationError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        if let Some(user) = present(user_id) {
            return Ok(OwnerKey::User(UserId::parse_required(Some(user))?));
        }
        if let Some(client) = present(client_id) {
            return Ok(OwnerKey::Client(ClientId::parse_required(Some(client))?));
        }
        Err(ValidationError::empty_field("owner"))
    }
}

#[derive(Debug, Clone)]
pub struct GetPipelineDataQuery {
    pub owner: OwnerKey,
}

pub type GetPipelineDataResult = Vec<ProjectedStep>;

#[derive(Debug, Clone)]
pub enum GetPipelineDataError {
    Domain(DomainError),
}

impl std::fmt::Display for GetPipelineDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetPipelineDataError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for GetPipelineDataError {}

impl From<DomainError> for GetPipelineDataError {
    fn from(err: DomainError) -> Self {
        GetPipelineDataError::Domain(err)
    }
}

/// Left-joins the step catalog with an owner's progress rows.
pub struct GetPipelineDataHandler {
    catalog: Arc<dyn StepCatalogReader>,
    progress: Arc<dyn ProgressRepository>,
}

impl GetPipelineDataHandler {
    pub fn new(catalog: Arc<dyn StepCatalogReader>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { catalog, progress }
    }

    pub async fn handle(
        &self,
        query: GetPipelineDataQuery,
    ) -> Result<GetPipelineDataResult, GetPipelineDataError> {
        let catalog = self.catalog.load_catalog().await?;
        let rows = match query.owner {
            OwnerKey::User(user_id) => self.progress.find_by_user(&user_id).await?,
            OwnerKey::Client(client_id) => self.progress.find_by_client(&client_id).await?,
        };
        Ok(project_pipeline(&catalog, &rows))
    }
}
