//! Request and response DTOs for the pipeline endpoints.
//!
//! Field names are camelCase to match the dashboard UI. Ids arrive as raw
//! strings so that missing or malformed values become 400 responses with a
//! field-specific message instead of a generic deserialization rejection.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ProgressStatus};
use crate::domain::pipeline::{
    ClientPipelineView, DisplaySource, DisplayStep, GroupSummary, PipelineProgress,
    PipelineStep, ProjectedStep, StepKind,
};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkCompletedRequest {
    pub user_id: Option<String>,
    pub pipeline_group_id: Option<String>,
    pub step_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceRequest {
    pub user_id: Option<String>,
    pub client_id: Option<String>,
    pub pipeline_group_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGroupRequest {
    pub user_id: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDataParams {
    pub user_id: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPipelineParams {
    pub forced_group_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkCompletedResponse {
    pub success: bool,
    pub restarted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_group_id: Option<String>,
    pub completed_final_step: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceResponse {
    pub completed_final_step: bool,
    pub completed: Option<ProgressResponse>,
    pub started: Option<ProgressResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGroupResponse {
    pub pipeline_group_id: String,
    pub started: ProgressResponse,
}

/// One progress row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub id: i64,
    pub user_id: String,
    pub client_id: String,
    pub step_id: i32,
    pub pipeline_group_id: String,
    pub status: ProgressStatus,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub updated_at: String,
}

impl From<&PipelineProgress> for ProgressResponse {
    fn from(row: &PipelineProgress) -> Self {
        Self {
            id: row.id.value(),
            user_id: row.user_id.to_string(),
            client_id: row.client_id.to_string(),
            step_id: row.step_id.value(),
            pipeline_group_id: row.pipeline_group_id.to_string(),
            status: row.status,
            created_at: row.created_at.to_rfc3339(),
            completed_at: row.completed_at.map(|t| t.to_rfc3339()),
            updated_at: row.updated_at.to_rfc3339(),
        }
    }
}

/// Catalog step with its effective status, as returned by `/api/pipeline/data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedStepResponse {
    pub id: i32,
    pub step_name: String,
    pub step_order: i32,
    pub kind: StepKind,
    pub status: ProgressStatus,
    pub progress: Option<ProgressResponse>,
}

impl From<&ProjectedStep> for ProjectedStepResponse {
    fn from(projected: &ProjectedStep) -> Self {
        let PipelineStep {
            id,
            step_name,
            step_order,
            kind,
        } = &projected.step;
        Self {
            id: id.value(),
            step_name: step_name.clone(),
            step_order: *step_order,
            kind: *kind,
            status: projected.status(),
            progress: projected.progress.as_ref().map(ProgressResponse::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayStepResponse {
    pub id: i32,
    pub step_name: String,
    pub step_order: i32,
    pub kind: StepKind,
    pub status: ProgressStatus,
    pub source: DisplaySource,
    pub progress: Option<ProgressResponse>,
}

impl From<&DisplayStep> for DisplayStepResponse {
    fn from(display: &DisplayStep) -> Self {
        Self {
            id: display.step.id.value(),
            step_name: display.step.step_name.clone(),
            step_order: display.step.step_order,
            kind: display.step.kind,
            status: display.status,
            source: display.source,
            progress: display.progress.as_ref().map(ProgressResponse::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummaryResponse {
    pub pipeline_group_id: String,
    pub row_count: usize,
    pub started_at: String,
    pub latest_activity: String,
    pub has_in_progress: bool,
    pub finished: bool,
}

impl From<&GroupSummary> for GroupSummaryResponse {
    fn from(group: &GroupSummary) -> Self {
        Self {
            pipeline_group_id: group.pipeline_group_id.to_string(),
            row_count: group.row_count,
            started_at: group.started_at.to_rfc3339(),
            latest_activity: group.latest_activity.to_rfc3339(),
            has_in_progress: group.has_in_progress,
            finished: group.finished,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPipelineResponse {
    pub active_group_id: Option<String>,
    pub groups: Vec<GroupSummaryResponse>,
    pub steps: Vec<DisplayStepResponse>,
}

impl From<&ClientPipelineView> for ClientPipelineResponse {
    fn from(view: &ClientPipelineView) -> Self {
        Self {
            active_group_id: view.active_group_id.map(|id| id.to_string()),
            groups: view.groups.iter().map(GroupSummaryResponse::from).collect(),
            steps: view.steps.iter().map(DisplayStepResponse::from).collect(),
        }
    }
}

/// Error body. `error` carries the human-readable message and `code` the
/// domain error code, e.g. `PIPELINE_EXHAUSTED`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_message(mut self, error: impl Into<String>) -> Self {
        self.error = error.into();
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let details = self
            .details
            .get_or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        if let serde_json::Value::Object(map) = details {
            map.insert(key.into(), value.into());
        }
        self
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        err.details.iter().fold(
            Self::new(err.code.to_string(), err.message.clone()),
            |response, (key, value)| response.with_detail(key.clone(), value.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ClientId, PipelineGroupId, ProgressId, StepId, Timestamp, UserId};
    use crate::domain::pipeline::NewProgress;

    #[test]
    fn mark_completed_request_accepts_camel_case() {
        let json = r#"{"userId": "u", "pipelineGroupId": "g", "stepId": 7}"#;
        let req: MarkCompletedRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.step_id, Some(7));
        assert_eq!(req.pipeline_group_id.as_deref(), Some("g"));
    }

    #[test]
    fn mark_completed_response_omits_missing_group() {
        let response = MarkCompletedResponse {
            success: true,
            restarted: false,
            new_group_id: None,
            completed_final_step: false,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("newGroupId").is_none());
        assert_eq!(json["completedFinalStep"], false);
    }

    #[test]
    fn progress_response_uses_wire_status() {
        let row = NewProgress::started(
            UserId::new(),
            ClientId::new(),
            PipelineGroupId::new(),
            StepId::new(3),
            Timestamp::from_unix_secs(0),
        )
        .into_progress(ProgressId::new(9));
        let json = serde_json::to_value(ProgressResponse::from(&row)).unwrap();
        assert_eq!(json["status"], "in-progress");
        assert_eq!(json["stepId"], 3);
        assert!(json["completedAt"].is_null());
    }

    #[test]
    fn error_response_carries_domain_code_and_details() {
        let err = DomainError::new(
            crate::domain::foundation::ErrorCode::AutomaticStep,
            "Step 'Build' is completed by the system",
        )
        .with_detail("step_id", "8");

        let json = serde_json::to_value(ErrorResponse::from(&err)).unwrap();

        assert_eq!(json["code"], "AUTOMATIC_STEP");
        assert_eq!(json["error"], "Step 'Build' is completed by the system");
        assert_eq!(json["details"]["step_id"], "8");
    }

    #[test]
    fn error_response_without_details_omits_them() {
        let json = serde_json::to_value(ErrorResponse::new("STEP_NOT_FOUND", "Current step not found")).unwrap();
        assert!(json.get("details").is_none());
    }
}
