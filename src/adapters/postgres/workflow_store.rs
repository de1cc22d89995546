//! PostgreSQL implementation of WorkflowStore.
//!
//! Workflows keep their graph as JSONB; nodes are also written to their own
//! table. Everything generated for one request is stored in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::columns::column;
use crate::domain::foundation::{ClientId, DomainError, Timestamp, UserId, WorkflowId};
use crate::domain::workflow::{GeneratedWorkflow, Workflow};
use crate::ports::WorkflowStore;

#[derive(Clone)]
pub struct PostgresWorkflowStore {
    pool: PgPool,
}

impl PostgresWorkflowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStore for PostgresWorkflowStore {
    async fn save_generated(&self, workflows: &[GeneratedWorkflow]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        for generated in workflows {
            let wf = &generated.workflow;
            sqlx::query(
                r#"
                INSERT INTO workflows (id, client_id, user_id, name, description, graph, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(wf.id.as_uuid())
            .bind(wf.client_id.as_uuid())
            .bind(wf.user_id.as_uuid())
            .bind(&wf.name)
            .bind(&wf.description)
            .bind(&wf.graph)
            .bind(wf.created_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Could not create workflow", e))?;

            for node in &generated.nodes {
                sqlx::query(
                    r#"
                    INSERT INTO nodes (id, workflow_id, name, node_type, position)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(node.id.as_uuid())
                .bind(node.workflow_id.as_uuid())
                .bind(&node.name)
                .bind(node.node_type.as_str())
                .bind(node.position)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::database("Could not create workflow node", e))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;
        Ok(())
    }

    async fn find_by_client(&self, client_id: &ClientId) -> Result<Vec<Workflow>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, user_id, name, description, graph, created_at
            FROM workflows
            WHERE client_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Could not fetch workflows", e))?;

        rows.iter()
            .map(|row| {
                let graph: JsonValue = column(row, "graph")?;
                let created_at: DateTime<Utc> = column(row, "created_at")?;
                Ok(Workflow {
                    id: WorkflowId::from_uuid(column(row, "id")?),
                    client_id: ClientId::from_uuid(column(row, "client_id")?),
                    user_id: UserId::from_uuid(column(row, "user_id")?),
                    name: column(row, "name")?,
                    description: column(row, "description")?,
                    graph,
                    created_at: Timestamp::from_datetime(created_at),
                })
            })
            .collect()
    }
}
