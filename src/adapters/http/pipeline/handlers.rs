//! HTTP handlers for pipeline endpoints.
//!
//! These handlers connect Axum routes to the pipeline command/query handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::pipeline::{
    AdvanceOutcome, AdvancePipelineCommand, AdvancePipelineError, AdvancePipelineHandler,
    GetClientPipelineError, GetClientPipelineHandler, GetClientPipelineQuery,
    GetPipelineDataError, GetPipelineDataHandler, GetPipelineDataQuery, MarkStepCompletedCommand,
    MarkStepCompletedError, MarkStepCompletedHandler, OwnerKey, PipelineSettings,
    StartPipelineGroupCommand,
    StartPipelineGroupError, StartPipelineGroupHandler,
};
use crate::application::hooks::HookRegistry;
use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, PipelineGroupId, StepId, UserId, ValidationError,
};
use crate::ports::{ProgressRepository, StepCatalogReader};

use super::dto::{
    AdvanceRequest, AdvanceResponse, ClientPipelineParams, ClientPipelineResponse, ErrorResponse,
    MarkCompletedRequest, MarkCompletedResponse, PipelineDataParams, ProgressResponse,
    ProjectedStepResponse, StartGroupRequest, StartGroupResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the pipeline routes.
#[derive(Clone)]
pub struct PipelineAppState {
    pub catalog: Arc<dyn StepCatalogReader>,
    pub progress: Arc<dyn ProgressRepository>,
    pub hooks: HookRegistry,
    pub settings: PipelineSettings,
}

impl PipelineAppState {
    pub fn get_pipeline_data_handler(&self) -> GetPipelineDataHandler {
        GetPipelineDataHandler::new(self.catalog.clone(), self.progress.clone())
    }

    pub fn advance_pipeline_handler(&self) -> AdvancePipelineHandler {
        AdvancePipelineHandler::new(self.catalog.clone(), self.progress.clone())
    }

    pub fn mark_step_completed_handler(&self) -> MarkStepCompletedHandler {
        MarkStepCompletedHandler::new(
            self.catalog.clone(),
            self.progress.clone(),
            self.hooks.clone(),
            self.settings,
        )
    }

    pub fn start_pipeline_group_handler(&self) -> StartPipelineGroupHandler {
        StartPipelineGroupHandler::new(self.catalog.clone(), self.progress.clone())
    }

    pub fn get_client_pipeline_handler(&self) -> GetClientPipelineHandler {
        GetClientPipelineHandler::new(self.catalog.clone(), self.progress.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/pipeline/mark-completed
pub async fn mark_completed(
    State(state): State<PipelineAppState>,
    Json(request): Json<MarkCompletedRequest>,
) -> Result<impl IntoResponse, PipelineApiError> {
    let cmd = MarkStepCompletedCommand {
        user_id: UserId::parse_required(request.user_id.as_deref())?,
        pipeline_group_id: PipelineGroupId::parse_required(request.pipeline_group_id.as_deref())?,
        step_id: request
            .step_id
            .map(StepId::new)
            .ok_or_else(|| ValidationError::empty_field("stepId"))?,
    };

    let result = state.mark_step_completed_handler().handle(cmd).await?;

    Ok(Json(MarkCompletedResponse {
        success: true,
        restarted: result.restarted(),
        new_group_id: result.new_group_id.map(|id| id.to_string()),
        completed_final_step: result.completed_final_step,
    }))
}

/// POST /api/pipeline/advance
pub async fn advance(
    State(state): State<PipelineAppState>,
    Json(request): Json<AdvanceRequest>,
) -> Result<impl IntoResponse, PipelineApiError> {
    let cmd = AdvancePipelineCommand {
        user_id: UserId::parse_required(request.user_id.as_deref())?,
        client_id: ClientId::parse_required(request.client_id.as_deref())?,
        pipeline_group_id: PipelineGroupId::parse_required(request.pipeline_group_id.as_deref())?,
    };

    let outcome = state.advance_pipeline_handler().handle(cmd).await?;

    let response = match &outcome {
        AdvanceOutcome::Advanced { completed, started } => AdvanceResponse {
            completed_final_step: false,
            completed: completed.as_ref().map(ProgressResponse::from),
            started: Some(ProgressResponse::from(started)),
        },
        AdvanceOutcome::FinalStepCompleted { completed } => AdvanceResponse {
            completed_final_step: true,
            completed: Some(ProgressResponse::from(completed)),
            started: None,
        },
    };

    Ok(Json(response))
}

/// POST /api/pipeline/groups - Start a new pipeline group for a client
pub async fn start_group(
    State(state): State<PipelineAppState>,
    Json(request): Json<StartGroupRequest>,
) -> Result<impl IntoResponse, PipelineApiError> {
    let cmd = StartPipelineGroupCommand {
        user_id: UserId::parse_required(request.user_id.as_deref())?,
        client_id: ClientId::parse_required(request.client_id.as_deref())?,
    };

    let result = state.start_pipeline_group_handler().handle(cmd).await?;

    let response = StartGroupResponse {
        pipeline_group_id: result.pipeline_group_id.to_string(),
        started: ProgressResponse::from(&result.started),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/pipeline/data?userId=…|clientId=…
pub async fn pipeline_data(
    State(state): State<PipelineAppState>,
    Query(params): Query<PipelineDataParams>,
) -> Result<impl IntoResponse, PipelineApiError> {
    let owner = OwnerKey::from_query(params.user_id.as_deref(), params.client_id.as_deref())?;

    let steps = state
        .get_pipeline_data_handler()
        .handle(GetPipelineDataQuery { owner })
        .await?;

    let response: Vec<ProjectedStepResponse> = steps.iter().map(ProjectedStepResponse::from).collect();
    Ok(Json(response))
}

/// GET /api/pipeline/clients/:client_id?forcedGroupId=…
pub async fn client_pipeline(
    State(state): State<PipelineAppState>,
    Path(client_id): Path<String>,
    Query(params): Query<ClientPipelineParams>,
) -> Result<impl IntoResponse, PipelineApiError> {
    let client_id = ClientId::parse_required(Some(&client_id))?;
    let forced_group_id = match params.forced_group_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(PipelineGroupId::parse_required(Some(raw))?),
        _ => None,
    };

    let view = state
        .get_client_pipeline_handler()
        .handle(GetClientPipelineQuery {
            client_id,
            forced_group_id,
        })
        .await?;

    Ok(Json(ClientPipelineResponse::from(&view)))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
///
/// The variant picks the status; the body keeps the domain error code.
#[derive(Debug)]
pub enum PipelineApiError {
    BadRequest(ErrorResponse),
    NotFound(ErrorResponse),
    Conflict(ErrorResponse),
    Internal(ErrorResponse),
}

impl PipelineApiError {
    fn status(&self) -> StatusCode {
        match self {
            PipelineApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PipelineApiError::NotFound(_) => StatusCode::NOT_FOUND,
            PipelineApiError::Conflict(_) => StatusCode::CONFLICT,
            PipelineApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> &ErrorResponse {
        match self {
            PipelineApiError::BadRequest(body)
            | PipelineApiError::NotFound(body)
            | PipelineApiError::Conflict(body)
            | PipelineApiError::Internal(body) => body,
        }
    }
}

impl From<ValidationError> for PipelineApiError {
    fn from(err: ValidationError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<DomainError> for PipelineApiError {
    fn from(err: DomainError) -> Self {
        let body = ErrorResponse::from(&err);
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::InvalidFormat => {
                PipelineApiError::BadRequest(body)
            }
            code if code.is_not_found() => PipelineApiError::NotFound(body),
            code if code.is_conflict() => PipelineApiError::Conflict(body),
            _ => PipelineApiError::Internal(body),
        }
    }
}

impl From<GetPipelineDataError> for PipelineApiError {
    fn from(err: GetPipelineDataError) -> Self {
        match err {
            GetPipelineDataError::Domain(e) => e.into(),
        }
    }
}

impl From<AdvancePipelineError> for PipelineApiError {
    fn from(err: AdvancePipelineError) -> Self {
        match err {
            AdvancePipelineError::Exhausted(msg) => {
                DomainError::new(ErrorCode::PipelineExhausted, msg).into()
            }
            AdvancePipelineError::Conflict(_) => {
                DomainError::new(ErrorCode::ConcurrentModification, err.to_string()).into()
            }
            AdvancePipelineError::Domain(e) => e.into(),
        }
    }
}

impl From<MarkStepCompletedError> for PipelineApiError {
    fn from(err: MarkStepCompletedError) -> Self {
        match err {
            MarkStepCompletedError::StepNotFound(id) => {
                DomainError::new(ErrorCode::StepNotFound, err.to_string())
                    .with_detail("step_id", id.to_string())
                    .into()
            }
            MarkStepCompletedError::AlreadyCompleted(id) => {
                DomainError::new(ErrorCode::StepAlreadyCompleted, err.to_string())
                    .with_detail("step_id", id.to_string())
                    .into()
            }
            // The step stays completed; the side effect failed.
            MarkStepCompletedError::Hook(failure) => PipelineApiError::Internal(
                ErrorResponse::from(&failure.error)
                    .with_detail("hook", failure.hook)
                    .with_message(failure.to_string()),
            ),
            MarkStepCompletedError::Advance(e) => e.into(),
            MarkStepCompletedError::Domain(e) => e.into(),
        }
    }
}

impl From<StartPipelineGroupError> for PipelineApiError {
    fn from(err: StartPipelineGroupError) -> Self {
        match err {
            StartPipelineGroupError::ClientHasActiveGroup(group_id) => {
                DomainError::new(ErrorCode::ConcurrentModification, err.to_string())
                    .with_detail("pipeline_group_id", group_id.to_string())
                    .into()
            }
            StartPipelineGroupError::EmptyCatalog => {
                DomainError::new(ErrorCode::InternalError, err.to_string()).into()
            }
            StartPipelineGroupError::Domain(e) => e.into(),
        }
    }
}

impl From<GetClientPipelineError> for PipelineApiError {
    fn from(err: GetClientPipelineError) -> Self {
        match err {
            GetClientPipelineError::GroupNotFound(group_id) => {
                DomainError::new(ErrorCode::GroupNotFound, err.to_string())
                    .with_detail("pipeline_group_id", group_id.to_string())
                    .into()
            }
            GetClientPipelineError::Domain(e) => e.into(),
        }
    }
}

impl IntoResponse for PipelineApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match self {
            PipelineApiError::Internal(body) => {
                tracing::error!(code = %body.code, error = %body.error, "Pipeline request failed");
                body
            }
            PipelineApiError::BadRequest(body)
            | PipelineApiError::NotFound(body)
            | PipelineApiError::Conflict(body) => body,
        };

        (status, Json(body)).into_response()
    }
}
