//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Pipeline Ports
//!
//! - `StepCatalogReader` - Static step catalog
//! - `ProgressRepository` - Per-group progress rows with atomic transitions
//! - `StepCompletionHook` - Side effects keyed by step kind
//!
//! ## Collaborator Ports
//!
//! - `SurveyResponseReader` - Stored discovery survey responses
//! - `SurveyAnalyzer` - Analysis normalization
//! - `WorkflowStore` - Generated workflow persistence

mod progress_repository;
mod step_catalog_reader;
mod step_completion_hook;
mod survey_analyzer;
mod survey_response_reader;
mod workflow_store;

pub use progress_repository::{AppliedTransition, ProgressRepository};
pub use step_catalog_reader::StepCatalogReader;
pub use step_completion_hook::{StepCompletion, StepCompletionHook};
pub use survey_analyzer::SurveyAnalyzer;
pub use survey_response_reader::SurveyResponseReader;
pub use workflow_store::WorkflowStore;
