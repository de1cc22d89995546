//! Survey response reader port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PipelineGroupId};
use crate::domain::survey::SurveyResponse;

/// Reader port for stored discovery survey responses.
#[async_trait]
pub trait SurveyResponseReader: Send + Sync {
    /// The most recent survey response attached to a pipeline group.
    ///
    /// Returns `None` if the group has no survey response.
    async fn find_by_group(
        &self,
        group_id: &PipelineGroupId,
    ) -> Result<Option<SurveyResponse>, DomainError>;
}
