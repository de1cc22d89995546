//! Progress repository port.
//!
//! Defines the contract for reading and writing pipeline progress rows.
//!
//! # Consistency
//!
//! Implementations must guarantee that a pipeline group never holds more than
//! one `in-progress` row, and never more than one row per step. `apply_transition`
//! is the only way a group advances and is applied as a single atomic unit
//! guarded by the expected status of the row being completed, so two
//! concurrent advances of the same group cannot both succeed. Starting a row
//! therefore doubles as a claim: of two requests inserting the same step,
//! exactly one gets the row.

use async_trait::async_trait;

use crate::domain::foundation::{
    ClientId, DomainError, PipelineGroupId, ProgressId, StepId, Timestamp, UserId,
};
use crate::domain::pipeline::{PipelineProgress, ProgressTransition};

/// Rows touched by an applied transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTransition {
    pub completed: Option<PipelineProgress>,
    pub started: Option<PipelineProgress>,
}

/// Repository port for pipeline progress rows.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// All rows of one pipeline group, ordered by creation.
    async fn find_by_group(
        &self,
        group_id: &PipelineGroupId,
    ) -> Result<Vec<PipelineProgress>, DomainError>;

    /// All rows of one client across every group, ordered by creation.
    async fn find_by_client(&self, client_id: &ClientId)
        -> Result<Vec<PipelineProgress>, DomainError>;

    /// All rows written on behalf of one operator, ordered by creation.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<PipelineProgress>, DomainError>;

    /// Complete the expected current row and/or insert the next row atomically.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if the row to complete is no longer
    ///   `in-progress`, or the insert would create a second `in-progress`
    ///   row in the group or a second row for the same step
    /// - `DatabaseError` on persistence failure (nothing is written)
    async fn apply_transition(
        &self,
        transition: &ProgressTransition,
    ) -> Result<AppliedTransition, DomainError>;

    /// Mark the group's row for `step_id` completed.
    ///
    /// The update only applies to a row that is not completed yet.
    ///
    /// # Errors
    ///
    /// - `ProgressNotFound` if the group has no row for the step
    /// - `StepAlreadyCompleted` if the row was already completed
    async fn complete_step(
        &self,
        group_id: &PipelineGroupId,
        step_id: StepId,
        at: Timestamp,
    ) -> Result<PipelineProgress, DomainError>;

    /// Delete a row that is still `in-progress`, releasing a claim taken
    /// with `apply_transition`.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if the row is gone or no longer in progress
    async fn discard_in_progress(&self, id: ProgressId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ProgressRepository) {}
    }
}
