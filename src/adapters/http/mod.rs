//! HTTP adapters - REST API implementations.

pub mod pipeline;

pub use pipeline::{pipeline_router, PipelineAppState};
