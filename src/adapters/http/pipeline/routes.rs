//! Route configuration for pipeline endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    advance, client_pipeline, health, mark_completed, pipeline_data, start_group,
    PipelineAppState,
};

/// Creates the pipeline router with all endpoints.
///
/// Routes:
/// - `POST /api/pipeline/mark-completed` - Operator marks a step completed
/// - `POST /api/pipeline/advance` - Advance a group to its next step
/// - `POST /api/pipeline/groups` - Start a new pipeline group (restart)
/// - `GET /api/pipeline/data` - Projected steps for a user or client
/// - `GET /api/pipeline/clients/:client_id` - Reconciled view across groups
/// - `GET /health` - Liveness check
pub fn pipeline_router() -> Router<PipelineAppState> {
    Router::new()
        .route("/api/pipeline/mark-completed", post(mark_completed))
        .route("/api/pipeline/advance", post(advance))
        .route("/api/pipeline/groups", post(start_group))
        .route("/api/pipeline/data", get(pipeline_data))
        .route("/api/pipeline/clients/:client_id", get(client_pipeline))
        .route("/health", get(health))
}
