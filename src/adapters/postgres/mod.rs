//! PostgreSQL adapters - Database implementations for the pipeline ports.
//!
//! - `PostgresStepCatalogReader` - Seeded step catalog
//! - `PostgresProgressRepository` - Progress rows with transactional transitions
//! - `PostgresSurveyResponseReader` - Stored survey responses
//! - `PostgresWorkflowStore` - Generated workflows and nodes

mod columns;
mod progress_repository;
mod step_catalog_reader;
mod survey_response_reader;
mod workflow_store;

pub use progress_repository::PostgresProgressRepository;
pub use step_catalog_reader::PostgresStepCatalogReader;
pub use survey_response_reader::PostgresSurveyResponseReader;
pub use workflow_store::PostgresWorkflowStore;
