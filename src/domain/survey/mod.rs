//! Survey module - discovery survey responses and their analysis.

mod analysis;

pub use analysis::{analyze_survey, AnalyzedSurvey, WorkflowRecommendation};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{ClientId, PipelineGroupId, SurveyResponseId, Timestamp, UserId};

/// A client's discovery survey answers, tied to one pipeline group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: SurveyResponseId,
    pub client_id: ClientId,
    pub user_id: UserId,
    pub pipeline_group_id: PipelineGroupId,
    /// Analysis blob written by the survey tooling; absent until analyzed.
    pub analyzed_survey_response: Option<JsonValue>,
    pub created_at: Timestamp,
}
