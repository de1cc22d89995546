//! In-memory progress repository.
//!
//! Suitable for development and tests. Every operation holds the store lock
//! for its whole duration, which gives the same atomicity the PostgreSQL
//! adapter gets from transactions.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, PipelineGroupId, ProgressId, StepId, Timestamp, UserId,
};
use crate::domain::pipeline::{NewProgress, PipelineProgress, ProgressTransition};
use crate::ports::{AppliedTransition, ProgressRepository};

#[derive(Default)]
struct Store {
    rows: Vec<PipelineProgress>,
    next_id: i64,
}

impl Store {
    fn insert(&mut self, row: NewProgress) -> PipelineProgress {
        self.next_id += 1;
        let row = row.into_progress(ProgressId::new(self.next_id));
        self.rows.push(row.clone());
        row
    }

    fn group_has_in_progress(&self, group_id: &PipelineGroupId) -> bool {
        self.rows
            .iter()
            .any(|r| &r.pipeline_group_id == group_id && r.status.is_in_progress())
    }

    fn group_has_step(&self, group_id: &PipelineGroupId, step_id: StepId) -> bool {
        self.rows
            .iter()
            .any(|r| &r.pipeline_group_id == group_id && r.step_id == step_id)
    }
}

/// Progress rows held in memory.
#[derive(Default)]
pub struct InMemoryProgressRepository {
    store: Mutex<Store>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds rows as-is, e.g. history from earlier cycles.
    pub fn with_rows(rows: Vec<PipelineProgress>) -> Self {
        let next_id = rows.iter().map(|r| r.id.value()).max().unwrap_or(0);
        Self {
            store: Mutex::new(Store { rows, next_id }),
        }
    }

    /// Snapshot of every stored row.
    pub fn rows(&self) -> Vec<PipelineProgress> {
        self.lock().map(|s| s.rows.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, DomainError> {
        self.store
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Progress store lock poisoned"))
    }

    fn select<F>(&self, predicate: F) -> Result<Vec<PipelineProgress>, DomainError>
    where
        F: Fn(&PipelineProgress) -> bool,
    {
        let store = self.lock()?;
        let mut rows: Vec<_> = store.rows.iter().filter(|r| predicate(r)).cloned().collect();
        rows.sort_by_key(|r| r.recency_key());
        Ok(rows)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn find_by_group(
        &self,
        group_id: &PipelineGroupId,
    ) -> Result<Vec<PipelineProgress>, DomainError> {
        self.select(|r| &r.pipeline_group_id == group_id)
    }

    async fn find_by_client(
        &self,
        client_id: &ClientId,
    ) -> Result<Vec<PipelineProgress>, DomainError> {
        self.select(|r| &r.client_id == client_id)
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<PipelineProgress>, DomainError> {
        self.select(|r| &r.user_id == user_id)
    }

    async fn apply_transition(
        &self,
        transition: &ProgressTransition,
    ) -> Result<AppliedTransition, DomainError> {
        let mut store = self.lock()?;

        // Validate everything before mutating so a rejected transition writes nothing.
        let complete_idx = match transition.complete {
            Some(id) => {
                let idx = store
                    .rows
                    .iter()
                    .position(|r| r.id == id && r.status.is_in_progress())
                    .ok_or_else(|| {
                        DomainError::new(
                            ErrorCode::ConcurrentModification,
                            format!("Progress row {} is no longer in progress", id),
                        )
                    })?;
                Some(idx)
            }
            None => None,
        };

        if let Some(start) = &transition.start {
            let completing_same_group = complete_idx
                .map(|idx| store.rows[idx].pipeline_group_id == start.pipeline_group_id)
                .unwrap_or(false);
            if start.status.is_in_progress()
                && !completing_same_group
                && store.group_has_in_progress(&start.pipeline_group_id)
            {
                return Err(DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!(
                        "Pipeline group {} already has a step in progress",
                        start.pipeline_group_id
                    ),
                ));
            }
            if store.group_has_step(&start.pipeline_group_id, start.step_id) {
                return Err(DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!(
                        "Pipeline group {} already has a row for step {}",
                        start.pipeline_group_id, start.step_id
                    ),
                ));
            }
        }

        let completed = match complete_idx {
            Some(idx) => {
                let row = &mut store.rows[idx];
                row.complete(transition.at).map_err(|e| {
                    DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                })?;
                Some(row.clone())
            }
            None => None,
        };

        let started = transition.start.clone().map(|row| store.insert(row));

        Ok(AppliedTransition { completed, started })
    }

    async fn complete_step(
        &self,
        group_id: &PipelineGroupId,
        step_id: StepId,
        at: Timestamp,
    ) -> Result<PipelineProgress, DomainError> {
        let mut store = self.lock()?;

        let matching: Vec<usize> = store
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| &r.pipeline_group_id == group_id && r.step_id == step_id)
            .map(|(idx, _)| idx)
            .collect();

        if matching.is_empty() {
            return Err(DomainError::new(
                ErrorCode::ProgressNotFound,
                format!("No progress for step {} in group {}", step_id, group_id),
            ));
        }

        let open = matching
            .into_iter()
            .find(|idx| !store.rows[*idx].status.is_completed())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::StepAlreadyCompleted,
                    format!("Step {} is already completed", step_id),
                )
            })?;

        let row = &mut store.rows[open];
        row.complete(at)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        Ok(row.clone())
    }

    async fn discard_in_progress(&self, id: ProgressId) -> Result<(), DomainError> {
        let mut store = self.lock()?;
        let idx = store
            .rows
            .iter()
            .position(|r| r.id == id && r.status.is_in_progress())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!("Progress row {} is no longer in progress", id),
                )
            })?;
        store.rows.remove(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ProgressStatus;

    fn started(group: PipelineGroupId, step: i32) -> NewProgress {
        NewProgress::started(
            UserId::new(),
            ClientId::new(),
            group,
            StepId::new(step),
            Timestamp::from_unix_secs(step as i64),
        )
    }

    fn start_only(row: NewProgress) -> ProgressTransition {
        ProgressTransition {
            complete: None,
            start: Some(row),
            at: Timestamp::from_unix_secs(1),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let repo = InMemoryProgressRepository::new();
        let g1 = PipelineGroupId::new();
        let g2 = PipelineGroupId::new();

        let a = repo.apply_transition(&start_only(started(g1, 1))).await.unwrap();
        let b = repo.apply_transition(&start_only(started(g2, 1))).await.unwrap();

        assert!(a.started.unwrap().id < b.started.unwrap().id);
    }

    #[tokio::test]
    async fn completes_and_starts_in_one_step() {
        let repo = InMemoryProgressRepository::new();
        let group = PipelineGroupId::new();
        let first = repo
            .apply_transition(&start_only(started(group, 1)))
            .await
            .unwrap()
            .started
            .unwrap();

        let applied = repo
            .apply_transition(&ProgressTransition {
                complete: Some(first.id),
                start: Some(started(group, 2)),
                at: Timestamp::from_unix_secs(10),
            })
            .await
            .unwrap();

        let completed = applied.completed.unwrap();
        assert_eq!(completed.status, ProgressStatus::Completed);
        assert_eq!(completed.completed_at, Some(Timestamp::from_unix_secs(10)));
        assert_eq!(applied.started.unwrap().status, ProgressStatus::InProgress);
    }

    #[tokio::test]
    async fn stale_transition_is_rejected_without_writes() {
        let repo = InMemoryProgressRepository::new();
        let group = PipelineGroupId::new();
        let first = repo
            .apply_transition(&start_only(started(group, 1)))
            .await
            .unwrap()
            .started
            .unwrap();

        let transition = ProgressTransition {
            complete: Some(first.id),
            start: Some(started(group, 2)),
            at: Timestamp::from_unix_secs(10),
        };
        repo.apply_transition(&transition).await.unwrap();

        // Replaying the same transition (a double submit) must fail.
        let err = repo.apply_transition(&transition).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrentModification);
        assert_eq!(repo.rows().len(), 2);
    }

    #[tokio::test]
    async fn second_in_progress_row_is_rejected() {
        let repo = InMemoryProgressRepository::new();
        let group = PipelineGroupId::new();
        repo.apply_transition(&start_only(started(group, 1))).await.unwrap();

        let err = repo
            .apply_transition(&start_only(started(group, 2)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrentModification);
    }

    #[tokio::test]
    async fn complete_step_distinguishes_missing_and_completed() {
        let repo = InMemoryProgressRepository::new();
        let group = PipelineGroupId::new();
        repo.apply_transition(&start_only(started(group, 1))).await.unwrap();

        let missing = repo
            .complete_step(&group, StepId::new(5), Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::ProgressNotFound);

        repo.complete_step(&group, StepId::new(1), Timestamp::now())
            .await
            .unwrap();
        let again = repo
            .complete_step(&group, StepId::new(1), Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(again.code, ErrorCode::StepAlreadyCompleted);
    }

    #[tokio::test]
    async fn second_row_for_same_step_is_rejected() {
        let repo = InMemoryProgressRepository::new();
        let group = PipelineGroupId::new();
        let first = repo
            .apply_transition(&start_only(started(group, 1)))
            .await
            .unwrap()
            .started
            .unwrap();
        repo.complete_step(&group, StepId::new(1), Timestamp::now())
            .await
            .unwrap();

        // Nothing is in progress, but step 1 already has its row.
        let err = repo
            .apply_transition(&start_only(started(group, 1)))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ConcurrentModification);
        assert_eq!(repo.rows().len(), 1);
        assert_eq!(repo.rows()[0].id, first.id);
    }

    #[tokio::test]
    async fn discard_removes_only_in_progress_rows() {
        let repo = InMemoryProgressRepository::new();
        let group = PipelineGroupId::new();
        let claim = repo
            .apply_transition(&start_only(started(group, 2)))
            .await
            .unwrap()
            .started
            .unwrap();

        repo.discard_in_progress(claim.id).await.unwrap();
        assert!(repo.rows().is_empty());

        let err = repo.discard_in_progress(claim.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrentModification);
    }

    #[tokio::test]
    async fn completed_row_cannot_be_discarded() {
        let repo = InMemoryProgressRepository::new();
        let group = PipelineGroupId::new();
        let row = repo
            .apply_transition(&start_only(started(group, 1)))
            .await
            .unwrap()
            .started
            .unwrap();
        repo.complete_step(&group, StepId::new(1), Timestamp::now())
            .await
            .unwrap();

        let err = repo.discard_in_progress(row.id).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ConcurrentModification);
        assert_eq!(repo.rows().len(), 1);
    }

    #[tokio::test]
    async fn find_by_group_is_ordered_by_creation() {
        let group = PipelineGroupId::new();
        let repo = InMemoryProgressRepository::with_rows(vec![
            started(group, 2).into_progress(ProgressId::new(1)),
            started(group, 1).into_progress(ProgressId::new(2)),
        ]);

        let rows = repo.find_by_group(&group).await.unwrap();
        assert_eq!(rows[0].step_id, StepId::new(1));
        assert_eq!(rows[1].step_id, StepId::new(2));
    }
}
