//! Workflow store port.

use async_trait::async_trait;

use crate::domain::foundation::{ClientId, DomainError};
use crate::domain::workflow::{GeneratedWorkflow, Workflow};

/// Persistence port for generated workflows and their nodes.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Persist workflows and nodes as one unit; either all are stored or none.
    async fn save_generated(&self, workflows: &[GeneratedWorkflow]) -> Result<(), DomainError>;

    /// Workflows of a client, newest first.
    async fn find_by_client(&self, client_id: &ClientId) -> Result<Vec<Workflow>, DomainError>;
}
