//! In-memory adapters.
//!
//! Used for local development (`database.in_memory = true`) and tests. State
//! lives for the lifetime of the process.

mod catalog;
mod progress;
mod survey;
mod workflow;

pub use catalog::{InMemoryStepCatalog, DEFAULT_STEPS};
pub use progress::InMemoryProgressRepository;
pub use survey::InMemorySurveyResponseReader;
pub use workflow::InMemoryWorkflowStore;
