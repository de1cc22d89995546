//! PostgreSQL implementation of ProgressRepository.
//!
//! Transitions run in a single transaction. The row being completed is
//! guarded by `status = 'in-progress'`. The partial unique index
//! `pipeline_progress_one_in_progress` rejects a second in-progress row per
//! group and `pipeline_progress_one_row_per_step` a second row for a step.
//! Every one of these failures surfaces as `ConcurrentModification`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::columns::{column, is_unique_violation, parse_column};
use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, PipelineGroupId, ProgressId, ProgressStatus, StepId,
    Timestamp, UserId,
};
use crate::domain::pipeline::{NewProgress, PipelineProgress, ProgressTransition};
use crate::ports::{AppliedTransition, ProgressRepository};

const COLUMNS: &str = "id, user_id, client_id, step_id, pipeline_group_id, status, \
                       created_at, completed_at, updated_at";

/// PostgreSQL implementation of ProgressRepository.
#[derive(Clone)]
pub struct PostgresProgressRepository {
    pool: PgPool,
}

impl PostgresProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_where(
        &self,
        filter: &str,
        value: Uuid,
    ) -> Result<Vec<PipelineProgress>, DomainError> {
        let sql = format!(
            "SELECT {} FROM pipeline_progress WHERE {} = $1 ORDER BY created_at, id",
            COLUMNS, filter
        );
        let rows = sqlx::query(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("Could not fetch pipeline progress", e))?;
        rows.iter().map(row_to_progress).collect()
    }
}

#[async_trait]
impl ProgressRepository for PostgresProgressRepository {
    async fn find_by_group(
        &self,
        group_id: &PipelineGroupId,
    ) -> Result<Vec<PipelineProgress>, DomainError> {
        self.select_where("pipeline_group_id", *group_id.as_uuid()).await
    }

    async fn find_by_client(
        &self,
        client_id: &ClientId,
    ) -> Result<Vec<PipelineProgress>, DomainError> {
        self.select_where("client_id", *client_id.as_uuid()).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<PipelineProgress>, DomainError> {
        self.select_where("user_id", *user_id.as_uuid()).await
    }

    async fn apply_transition(
        &self,
        transition: &ProgressTransition,
    ) -> Result<AppliedTransition, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        let completed = match transition.complete {
            Some(id) => Some(complete_in_progress(&mut tx, id, transition.at).await?),
            None => None,
        };

        let started = match &transition.start {
            Some(row) => Some(
                insert_row(&mut tx, row, "Could not create next pipeline step").await?,
            ),
            None => None,
        };

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(AppliedTransition { completed, started })
    }

    async fn complete_step(
        &self,
        group_id: &PipelineGroupId,
        step_id: StepId,
        at: Timestamp,
    ) -> Result<PipelineProgress, DomainError> {
        let sql = format!(
            r#"
            UPDATE pipeline_progress
            SET status = 'completed', completed_at = $3, updated_at = $3
            WHERE id = (
                SELECT id FROM pipeline_progress
                WHERE pipeline_group_id = $1 AND step_id = $2 AND status <> 'completed'
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            AND status <> 'completed'
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(group_id.as_uuid())
            .bind(step_id.value())
            .bind(at.as_datetime())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Could not mark step as completed", e))?;

        if let Some(row) = row {
            return row_to_progress(&row);
        }

        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM pipeline_progress
                WHERE pipeline_group_id = $1 AND step_id = $2
            )
            "#,
        )
        .bind(group_id.as_uuid())
        .bind(step_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Could not fetch pipeline progress", e))?;

        if exists {
            Err(DomainError::new(
                ErrorCode::StepAlreadyCompleted,
                format!("Step {} is already completed", step_id),
            ))
        } else {
            Err(DomainError::new(
                ErrorCode::ProgressNotFound,
                format!("No progress for step {} in group {}", step_id, group_id),
            ))
        }
    }

    async fn discard_in_progress(&self, id: ProgressId) -> Result<(), DomainError> {
        let result = sqlx::query(
            "DELETE FROM pipeline_progress WHERE id = $1 AND status = 'in-progress'",
        )
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Could not release pipeline step", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                format!("Progress row {} is no longer in progress", id),
            ));
        }
        Ok(())
    }
}

async fn complete_in_progress(
    tx: &mut Transaction<'_, Postgres>,
    id: ProgressId,
    at: Timestamp,
) -> Result<PipelineProgress, DomainError> {
    let sql = format!(
        r#"
        UPDATE pipeline_progress
        SET status = 'completed', completed_at = $2, updated_at = $2
        WHERE id = $1 AND status = 'in-progress'
        RETURNING {}
        "#,
        COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(id.value())
        .bind(at.as_datetime())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DomainError::database("Could not mark current step as completed", e))?;

    match row {
        Some(row) => row_to_progress(&row),
        None => Err(DomainError::new(
            ErrorCode::ConcurrentModification,
            format!("Progress row {} is no longer in progress", id),
        )),
    }
}

async fn insert_row(
    tx: &mut Transaction<'_, Postgres>,
    row: &NewProgress,
    operation: &str,
) -> Result<PipelineProgress, DomainError> {
    let sql = format!(
        r#"
        INSERT INTO pipeline_progress (
            user_id, client_id, step_id, pipeline_group_id, status,
            created_at, completed_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $6)
        RETURNING {}
        "#,
        COLUMNS
    );
    let inserted = sqlx::query(&sql)
        .bind(row.user_id.as_uuid())
        .bind(row.client_id.as_uuid())
        .bind(row.step_id.value())
        .bind(row.pipeline_group_id.as_uuid())
        .bind(row.status.as_str())
        .bind(row.created_at.as_datetime())
        .bind(row.completed_at.map(|t| *t.as_datetime()))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!(
                        "Pipeline group {} already has a step in progress or a row for step {}",
                        row.pipeline_group_id, row.step_id
                    ),
                )
            } else {
                DomainError::database(operation, e)
            }
        })?;
    row_to_progress(&inserted)
}

fn row_to_progress(row: &PgRow) -> Result<PipelineProgress, DomainError> {
    let status: String = column(row, "status")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    let completed_at: Option<DateTime<Utc>> = column(row, "completed_at")?;
    let updated_at: DateTime<Utc> = column(row, "updated_at")?;

    Ok(PipelineProgress {
        id: ProgressId::new(column(row, "id")?),
        user_id: UserId::from_uuid(column(row, "user_id")?),
        client_id: ClientId::from_uuid(column(row, "client_id")?),
        step_id: StepId::new(column(row, "step_id")?),
        pipeline_group_id: PipelineGroupId::from_uuid(column(row, "pipeline_group_id")?),
        status: parse_column::<ProgressStatus>(&status, "status")?,
        created_at: Timestamp::from_datetime(created_at),
        completed_at: completed_at.map(Timestamp::from_datetime),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
