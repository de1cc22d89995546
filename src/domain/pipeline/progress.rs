//! PipelineProgress entity - one step's status within one pipeline group.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ClientId, PipelineGroupId, ProgressId, ProgressStatus, StateMachine, StepId, Timestamp,
    UserId, ValidationError,
};

/// A persisted progress row.
///
/// Rows are never deleted; a restart opens a new `pipeline_group_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineProgress {
    pub id: ProgressId,
    pub user_id: UserId,
    pub client_id: ClientId,
    pub step_id: StepId,
    pub pipeline_group_id: PipelineGroupId,
    pub status: ProgressStatus,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl PipelineProgress {
    /// Marks the row completed at the given time.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the row is already completed.
    pub fn complete(&mut self, at: Timestamp) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(ProgressStatus::Completed)?;
        self.completed_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Ordering used whenever "the most recent row" is needed.
    pub fn recency_key(&self) -> (Timestamp, ProgressId) {
        (self.created_at, self.id)
    }
}

/// A progress row that has not been assigned an id by the store yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgress {
    pub user_id: UserId,
    pub client_id: ClientId,
    pub step_id: StepId,
    pub pipeline_group_id: PipelineGroupId,
    pub status: ProgressStatus,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl NewProgress {
    /// Row for a step the group has just advanced into.
    pub fn started(
        user_id: UserId,
        client_id: ClientId,
        pipeline_group_id: PipelineGroupId,
        step_id: StepId,
        at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            client_id,
            step_id,
            pipeline_group_id,
            status: ProgressStatus::InProgress,
            created_at: at,
            completed_at: None,
        }
    }

    /// Materializes the row once the store has assigned an id.
    pub fn into_progress(self, id: ProgressId) -> PipelineProgress {
        PipelineProgress {
            id,
            user_id: self.user_id,
            client_id: self.client_id,
            step_id: self.step_id,
            pipeline_group_id: self.pipeline_group_id,
            status: self.status,
            created_at: self.created_at,
            completed_at: self.completed_at,
            updated_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_row() -> PipelineProgress {
        NewProgress::started(
            UserId::new(),
            ClientId::new(),
            PipelineGroupId::new(),
            StepId::new(2),
            Timestamp::from_unix_secs(100),
        )
        .into_progress(ProgressId::new(1))
    }

    #[test]
    fn started_row_is_in_progress_without_completion() {
        let row = started_row();
        assert_eq!(row.status, ProgressStatus::InProgress);
        assert!(row.completed_at.is_none());
        assert_eq!(row.updated_at, row.created_at);
    }

    #[test]
    fn complete_sets_timestamps() {
        let mut row = started_row();
        let at = Timestamp::from_unix_secs(200);
        row.complete(at).unwrap();

        assert_eq!(row.status, ProgressStatus::Completed);
        assert_eq!(row.completed_at, Some(at));
        assert_eq!(row.updated_at, at);
    }

    #[test]
    fn complete_twice_is_rejected() {
        let mut row = started_row();
        row.complete(Timestamp::from_unix_secs(200)).unwrap();
        assert!(row.complete(Timestamp::from_unix_secs(300)).is_err());
        assert_eq!(row.completed_at, Some(Timestamp::from_unix_secs(200)));
    }
}
