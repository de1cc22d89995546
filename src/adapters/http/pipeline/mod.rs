//! HTTP adapter for the onboarding pipeline.

mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use handlers::{PipelineApiError, PipelineAppState};
pub use routes::pipeline_router;
