//! Survey analyzer adapter.
//!
//! `NormalizingSurveyAnalyzer` re-normalizes the analysis blob stored by the
//! survey tooling; it does not call any external service.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::survey::{analyze_survey, AnalyzedSurvey};
use crate::ports::SurveyAnalyzer;

#[derive(Debug, Clone, Default)]
pub struct NormalizingSurveyAnalyzer;

impl NormalizingSurveyAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SurveyAnalyzer for NormalizingSurveyAnalyzer {
    async fn analyze(&self, raw: &JsonValue) -> Result<AnalyzedSurvey, DomainError> {
        analyze_survey(raw).map_err(|e| {
            DomainError::new(ErrorCode::SurveyAnalysisFailed, e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn maps_invalid_analysis_to_analysis_failure() {
        let err = NormalizingSurveyAnalyzer::new()
            .analyze(&json!({"workflows": []}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SurveyAnalysisFailed);
    }

    #[tokio::test]
    async fn analyzes_valid_blob() {
        let analysis = NormalizingSurveyAnalyzer::new()
            .analyze(&json!({"workflows": [{"name": "Invoice sync"}]}))
            .await
            .unwrap();
        assert_eq!(analysis.workflows[0].name, "Invoice sync");
    }
}
