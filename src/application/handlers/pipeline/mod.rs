//! Pipeline command and query handlers.

// Command handlers
mod advance_pipeline;
mod mark_step_completed;
mod start_pipeline_group;

// Query handlers
mod get_client_pipeline;
mod get_pipeline_data;

pub use advance_pipeline::{
    AdvanceOutcome, AdvancePipelineCommand, AdvancePipelineError, AdvancePipelineHandler,
};
pub use get_client_pipeline::{
    GetClientPipelineError, GetClientPipelineHandler, GetClientPipelineQuery,
};
pub use get_pipeline_data::{
    GetPipelineDataError, GetPipelineDataHandler, GetPipelineDataQuery, GetPipelineDataResult,
    OwnerKey,
};
pub use mark_step_completed::{
    MarkStepCompletedCommand, MarkStepCompletedError, MarkStepCompletedHandler,
    MarkStepCompletedResult, PipelineSettings, DEFAULT_CLAIM_LEASE_SECS,
};
pub use start_pipeline_group::{
    StartPipelineGroupCommand, StartPipelineGroupError, StartPipelineGroupHandler,
    StartPipelineGroupResult,
};
