//! PostgreSQL implementation of StepCatalogReader.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::columns::{column, parse_column};
use crate::domain::foundation::{DomainError, StepId};
use crate::domain::pipeline::{PipelineStep, StepCatalog, StepKind};
use crate::ports::StepCatalogReader;

/// Reads the seeded `pipeline_steps` table.
#[derive(Clone)]
pub struct PostgresStepCatalogReader {
    pool: PgPool,
}

impl PostgresStepCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StepCatalogReader for PostgresStepCatalogReader {
    async fn load_catalog(&self) -> Result<StepCatalog, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, step_name, step_order, kind
            FROM pipeline_steps
            ORDER BY step_order, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Could not fetch pipeline steps", e))?;

        let steps = rows.iter().map(row_to_step).collect::<Result<Vec<_>, _>>()?;
        Ok(StepCatalog::new(steps))
    }
}

fn row_to_step(row: &PgRow) -> Result<PipelineStep, DomainError> {
    let kind: String = column(row, "kind")?;
    Ok(PipelineStep {
        id: StepId::new(column(row, "id")?),
        step_name: column(row, "step_name")?,
        step_order: column(row, "step_order")?,
        kind: parse_column::<StepKind>(&kind, "kind")?,
    })
}
