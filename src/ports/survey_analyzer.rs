//! Survey analyzer port.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::DomainError;
use crate::domain::survey::AnalyzedSurvey;

/// Turns a stored analysis blob into a typed analysis result.
#[async_trait]
pub trait SurveyAnalyzer: Send + Sync {
    /// # Errors
    ///
    /// - `SurveyAnalysisFailed` when the blob cannot be interpreted
    async fn analyze(&self, raw: &JsonValue) -> Result<AnalyzedSurvey, DomainError>;
}
