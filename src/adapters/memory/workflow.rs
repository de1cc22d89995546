//! In-memory workflow store.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::foundation::{ClientId, DomainError, ErrorCode};
use crate::domain::workflow::{GeneratedWorkflow, Workflow};
use crate::ports::WorkflowStore;

/// Generated workflows held in memory.
#[derive(Default)]
pub struct InMemoryWorkflowStore {
    workflows: Mutex<Vec<GeneratedWorkflow>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored workflows across all clients.
    pub fn count(&self) -> usize {
        self.lock().map(|w| w.len()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<GeneratedWorkflow>>, DomainError> {
        self.workflows
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Workflow store lock poisoned"))
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn save_generated(&self, workflows: &[GeneratedWorkflow]) -> Result<(), DomainError> {
        self.lock()?.extend_from_slice(workflows);
        Ok(())
    }

    async fn find_by_client(&self, client_id: &ClientId) -> Result<Vec<Workflow>, DomainError> {
        let mut found: Vec<Workflow> = self
            .lock()?
            .iter()
            .filter(|g| &g.workflow.client_id == client_id)
            .map(|g| g.workflow.clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}
