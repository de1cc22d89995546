//! WorkflowGenerationHook - regenerates a client's workflows from the
//! analyzed discovery survey when the survey-analysis step is completed.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::workflow::synthesize_workflows;
use crate::ports::{
    StepCompletion, StepCompletionHook, SurveyAnalyzer, SurveyResponseReader, WorkflowStore,
};

pub struct WorkflowGenerationHook {
    surveys: Arc<dyn SurveyResponseReader>,
    analyzer: Arc<dyn SurveyAnalyzer>,
    workflows: Arc<dyn WorkflowStore>,
}

impl WorkflowGenerationHook {
    pub fn new(
        surveys: Arc<dyn SurveyResponseReader>,
        analyzer: Arc<dyn SurveyAnalyzer>,
        workflows: Arc<dyn WorkflowStore>,
    ) -> Self {
        Self {
            surveys,
            analyzer,
            workflows,
        }
    }
}

#[async_trait]
impl StepCompletionHook for WorkflowGenerationHook {
    fn name(&self) -> &'static str {
        "workflow_generation"
    }

    async fn on_step_completed(&self, completion: &StepCompletion) -> Result<(), DomainError> {
        let response = self
            .surveys
            .find_by_group(&completion.pipeline_group_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::SurveyResponseNotFound,
                    format!(
                        "No survey response for pipeline group {}",
                        completion.pipeline_group_id
                    ),
                )
            })?;

        let raw = response.analyzed_survey_response.ok_or_else(|| {
            DomainError::new(
                ErrorCode::SurveyAnalysisFailed,
                format!("Survey response {} has not been analyzed", response.id),
            )
        })?;

        let analysis = self.analyzer.analyze(&raw).await?;
        let generated = synthesize_workflows(
            completion.client_id,
            completion.user_id,
            &analysis,
            completion.completed_at,
        );

        self.workflows.save_generated(&generated).await.map_err(|e| {
            DomainError::new(
                ErrorCode::WorkflowGenerationFailed,
                format!("Could not save generated workflows: {}", e.message),
            )
        })?;

        tracing::info!(
            client_id = %completion.client_id,
            pipeline_group_id = %completion.pipeline_group_id,
            workflows = generated.len(),
            "Generated workflows from survey analysis"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemorySurveyResponseReader, InMemoryWorkflowStore};
    use crate::adapters::survey::NormalizingSurveyAnalyzer;
    use crate::domain::foundation::{
        ClientId, PipelineGroupId, SurveyResponseId, Timestamp, UserId,
    };
    use crate::domain::pipeline::{PipelineStep, StepKind};
    use crate::domain::survey::SurveyResponse;
    use crate::domain::workflow::{GeneratedWorkflow, Workflow};
    use serde_json::{json, Value as JsonValue};

    struct FailingWorkflowStore;

    #[async_trait]
    impl WorkflowStore for FailingWorkflowStore {
        async fn save_generated(&self, _: &[GeneratedWorkflow]) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "disk full"))
        }

        async fn find_by_client(&self, _: &ClientId) -> Result<Vec<Workflow>, DomainError> {
            Ok(vec![])
        }
    }

    fn completion(group: PipelineGroupId, client: ClientId) -> StepCompletion {
        StepCompletion {
            user_id: UserId::new(),
            client_id: client,
            pipeline_group_id: group,
            step: PipelineStep::new(7, "Discovery: Survey Analysis", 7, StepKind::SurveyAnalysis),
            completed_at: Timestamp::now(),
        }
    }

    fn surveys_with(group: PipelineGroupId, analyzed: Option<JsonValue>) -> Arc<InMemorySurveyResponseReader> {
        let surveys = Arc::new(InMemorySurveyResponseReader::new());
        surveys
            .insert(SurveyResponse {
                id: SurveyResponseId::new(),
                client_id: ClientId::new(),
                user_id: UserId::new(),
                pipeline_group_id: group,
                analyzed_survey_response: analyzed,
                created_at: Timestamp::now(),
            })
            .unwrap();
        surveys
    }

    #[tokio::test]
    async fn persists_workflows_for_client() {
        let group = PipelineGroupId::new();
        let client = ClientId::new();
        let store = Arc::new(InMemoryWorkflowStore::new());
        let hook = WorkflowGenerationHook::new(
            surveys_with(
                group,
                Some(json!({"workflows": [{"name": "Invoice sync"}, {"name": "Lead routing"}]})),
            ),
            Arc::new(NormalizingSurveyAnalyzer::new()),
            store.clone(),
        );

        hook.on_step_completed(&completion(group, client)).await.unwrap();

        assert_eq!(store.find_by_client(&client).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_survey_response_fails() {
        let hook = WorkflowGenerationHook::new(
            Arc::new(InMemorySurveyResponseReader::new()),
            Arc::new(NormalizingSurveyAnalyzer::new()),
            Arc::new(InMemoryWorkflowStore::new()),
        );

        let err = hook
            .on_step_completed(&completion(PipelineGroupId::new(), ClientId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SurveyResponseNotFound);
    }

    #[tokio::test]
    async fn unanalyzed_survey_fails() {
        let group = PipelineGroupId::new();
        let hook = WorkflowGenerationHook::new(
            surveys_with(group, None),
            Arc::new(NormalizingSurveyAnalyzer::new()),
            Arc::new(InMemoryWorkflowStore::new()),
        );

        let err = hook
            .on_step_completed(&completion(group, ClientId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SurveyAnalysisFailed);
    }

    #[tokio::test]
    async fn store_failure_is_reported_as_generation_failure() {
        let group = PipelineGroupId::new();
        let hook = WorkflowGenerationHook::new(
            surveys_with(group, Some(json!({"workflows": [{"name": "A"}]}))),
            Arc::new(NormalizingSurveyAnalyzer::new()),
            Arc::new(FailingWorkflowStore),
        );

        let err = hook
            .on_step_completed(&completion(group, ClientId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::WorkflowGenerationFailed);
        assert!(err.message.contains("disk full"));
    }
}
