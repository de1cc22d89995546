//! In-memory survey response reader.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, PipelineGroupId};
use crate::domain::survey::SurveyResponse;
use crate::ports::SurveyResponseReader;

/// Survey responses held in memory.
#[derive(Default)]
pub struct InMemorySurveyResponseReader {
    responses: Mutex<Vec<SurveyResponse>>,
}

impl InMemorySurveyResponseReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a response, as the survey tooling would.
    pub fn insert(&self, response: SurveyResponse) -> Result<(), DomainError> {
        self.responses
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Survey store lock poisoned"))?
            .push(response);
        Ok(())
    }
}

#[async_trait]
impl SurveyResponseReader for InMemorySurveyResponseReader {
    async fn find_by_group(
        &self,
        group_id: &PipelineGroupId,
    ) -> Result<Option<SurveyResponse>, DomainError> {
        let responses = self
            .responses
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Survey store lock poisoned"))?;
        Ok(responses
            .iter()
            .filter(|r| &r.pipeline_group_id == group_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }
}
