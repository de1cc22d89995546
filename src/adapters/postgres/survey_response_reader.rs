//! PostgreSQL implementation of SurveyResponseReader.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::columns::column;
use crate::domain::foundation::{
    ClientId, DomainError, PipelineGroupId, SurveyResponseId, Timestamp, UserId,
};
use crate::domain::survey::SurveyResponse;
use crate::ports::SurveyResponseReader;

#[derive(Clone)]
pub struct PostgresSurveyResponseReader {
    pool: PgPool,
}

impl PostgresSurveyResponseReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurveyResponseReader for PostgresSurveyResponseReader {
    async fn find_by_group(
        &self,
        group_id: &PipelineGroupId,
    ) -> Result<Option<SurveyResponse>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, client_id, user_id, pipeline_group_id,
                   analyzed_survey_response, created_at
            FROM survey_responses
            WHERE pipeline_group_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(group_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Could not fetch survey response", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let analyzed: Option<JsonValue> = column(&row, "analyzed_survey_response")?;
        let created_at: DateTime<Utc> = column(&row, "created_at")?;

        Ok(Some(SurveyResponse {
            id: SurveyResponseId::from_uuid(column(&row, "id")?),
            client_id: ClientId::from_uuid(column(&row, "client_id")?),
            user_id: UserId::from_uuid(column(&row, "user_id")?),
            pipeline_group_id: PipelineGroupId::from_uuid(column(&row, "pipeline_group_id")?),
            analyzed_survey_response: analyzed,
            created_at: Timestamp::from_datetime(created_at),
        }))
    }
}
