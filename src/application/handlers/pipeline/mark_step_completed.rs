//! MarkStepCompletedHandler - Command handler for operator-driven completion of
//! a step.
//!
//! Completing a step claims its successor by inserting the successor's row
//! `in-progress` before any hook runs. The store allows one in-progress row
//! and one row per step in a group, so of two concurrent requests only one
//! gets the claim and runs the hooks. A failed hook releases the claim, which
//! lets the operator retry. An automatic successor (factory build) is then
//! completed by the system; when it is terminal the group is finished and,
//! with auto restart on, a new group is opened for the client.

use std::sync::Arc;

use crate::application::hooks::{HookFailure, HookRegistry};
use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, PipelineGroupId, StepId, Timestamp, UserId,
};
use crate::domain::pipeline::{
    automatic_step_error, current_step, NewProgress, PipelineProgress, PipelineStep,
    ProgressTransition, StepCatalog,
};
use crate::ports::{ProgressRepository, StepCatalogReader, StepCompletion};

use super::advance_pipeline::{
    AdvanceOutcome, AdvancePipelineCommand, AdvancePipelineError, AdvancePipelineHandler,
};
use super::start_pipeline_group::{StartPipelineGroupCommand, StartPipelineGroupHandler};

/// Claims older than this are treated as left behind by a crashed request.
pub const DEFAULT_CLAIM_LEASE_SECS: i64 = 15 * 60;

#[derive(Debug, Clone)]
pub struct MarkStepCompletedCommand {
    pub user_id: UserId,
    pub pipeline_group_id: PipelineGroupId,
    pub step_id: StepId,
}

/// Behavior switches for step completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Open a new group once a group completes its terminal step.
    pub auto_restart: bool,
    /// Age after which an unfinished claim on an automatic step may be
    /// released by a retry.
    pub claim_lease_secs: i64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            auto_restart: true,
            claim_lease_secs: DEFAULT_CLAIM_LEASE_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkStepCompletedResult {
    pub completed: PipelineProgress,
    /// Row the group is now working on, if any.
    pub started: Option<PipelineProgress>,
    /// True when the group reached its terminal step.
    pub completed_final_step: bool,
    /// Group opened by auto restart.
    pub new_group_id: Option<PipelineGroupId>,
}

impl MarkStepCompletedResult {
    pub fn restarted(&self) -> bool {
        self.new_group_id.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum MarkStepCompletedError {
    /// The group has no row for the step.
    StepNotFound(StepId),
    /// The step was already completed and the group has moved on, or another
    /// request is completing it right now.
    AlreadyCompleted(StepId),
    /// A completion hook failed. The step itself stays completed.
    Hook(HookFailure),
    Advance(AdvancePipelineError),
    Domain(DomainError),
}

impl std::fmt::Display for MarkStepCompletedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkStepCompletedError::StepNotFound(_) => write!(f, "Current step not found"),
            MarkStepCompletedError::AlreadyCompleted(id) => {
                write!(f, "Step {} is already completed", id)
            }
            MarkStepCompletedError::Hook(failure) => write!(f, "{}", failure),
            MarkStepCompletedError::Advance(err) => write!(f, "{}", err),
            MarkStepCompletedError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for MarkStepCompletedError {}

impl From<DomainError> for MarkStepCompletedError {
    fn from(err: DomainError) -> Self {
        MarkStepCompletedError::Domain(err)
    }
}

impl From<AdvancePipelineError> for MarkStepCompletedError {
    fn from(err: AdvancePipelineError) -> Self {
        MarkStepCompletedError::Advance(err)
    }
}

impl From<HookFailure> for MarkStepCompletedError {
    fn from(failure: HookFailure) -> Self {
        MarkStepCompletedError::Hook(failure)
    }
}

pub struct MarkStepCompletedHandler {
    catalog: Arc<dyn StepCatalogReader>,
    progress: Arc<dyn ProgressRepository>,
    hooks: HookRegistry,
    advance: AdvancePipelineHandler,
    restart: StartPipelineGroupHandler,
    settings: PipelineSettings,
}

impl MarkStepCompletedHandler {
    pub fn new(
        catalog: Arc<dyn StepCatalogReader>,
        progress: Arc<dyn ProgressRepository>,
        hooks: HookRegistry,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            advance: AdvancePipelineHandler::new(catalog.clone(), progress.clone()),
            restart: StartPipelineGroupHandler::new(catalog.clone(), progress.clone()),
            catalog,
            progress,
            hooks,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: MarkStepCompletedCommand,
    ) -> Result<MarkStepCompletedResult, MarkStepCompletedError> {
        let catalog = self.catalog.load_catalog().await?;
        let rows = self.progress.find_by_group(&cmd.pipeline_group_id).await?;

        let row = rows
            .iter()
            .filter(|r| r.step_id == cmd.step_id)
            .max_by_key(|r| r.recency_key())
            .ok_or(MarkStepCompletedError::StepNotFound(cmd.step_id))?;

        let step = catalog.get(cmd.step_id).cloned().ok_or_else(|| {
            DomainError::new(
                ErrorCode::StepNotFound,
                format!("Step {} is not in the pipeline catalog", cmd.step_id),
            )
        })?;
        if step.kind.is_automatic() {
            return Err(automatic_step_error(&catalog, &step).into());
        }

        let now = Timestamp::now();
        let completed = if row.status.is_completed() {
            self.resume(&cmd, &catalog, &rows, row, now).await?
        } else {
            self.progress
                .complete_step(&cmd.pipeline_group_id, cmd.step_id, now)
                .await
                .map_err(|e| match e.code {
                    ErrorCode::StepAlreadyCompleted => {
                        MarkStepCompletedError::AlreadyCompleted(cmd.step_id)
                    }
                    _ => MarkStepCompletedError::Domain(e),
                })?
        };
        let client_id = completed.client_id;

        let next = catalog.next_after(step.id).cloned();
        let claim = match &next {
            Some(next) => Some(self.claim(&cmd, client_id, next, now).await?),
            None => None,
        };

        let completion = StepCompletion {
            user_id: cmd.user_id,
            client_id,
            pipeline_group_id: cmd.pipeline_group_id,
            step: step.clone(),
            completed_at: completed.completed_at.unwrap_or(now),
        };
        if let Err(failure) = self.hooks.run(&completion).await {
            if let Some(claim) = &claim {
                self.release(claim).await;
            }
            return Err(failure.into());
        }

        let (started, finished) = match (next, claim) {
            (Some(next), Some(claim)) if next.kind.is_automatic() => {
                self.complete_automatic(&cmd, client_id, &next, &claim).await?
            }
            (_, Some(claim)) => (Some(claim), false),
            // Last step of the catalog without being terminal.
            (_, None) => {
                let outcome = self.advance_group(&cmd, client_id).await?;
                (outcome.started().cloned(), outcome.completed_final_step())
            }
        };

        let new_group_id = if finished && self.settings.auto_restart {
            self.restart_group(&cmd, client_id).await
        } else {
            None
        };

        Ok(MarkStepCompletedResult {
            completed,
            started,
            completed_final_step: finished,
            new_group_id,
        })
    }

    /// Decides whether an already completed step may run its follow-up again.
    ///
    /// That is the case after a failed hook: nothing is in progress and the
    /// group is not finished. A claim on the automatic successor that outlived
    /// its lease is released first.
    async fn resume(
        &self,
        cmd: &MarkStepCompletedCommand,
        catalog: &StepCatalog,
        rows: &[PipelineProgress],
        row: &PipelineProgress,
        now: Timestamp,
    ) -> Result<PipelineProgress, MarkStepCompletedError> {
        let already = MarkStepCompletedError::AlreadyCompleted(cmd.step_id);

        match current_step(rows)? {
            None if !is_finished(catalog, rows) => {}
            Some(current) if self.is_stale_claim(catalog, cmd.step_id, current, now) => {
                tracing::warn!(
                    pipeline_group_id = %cmd.pipeline_group_id,
                    step_id = %current.step_id,
                    claimed_at = %current.created_at.to_rfc3339(),
                    "Releasing stale claim on automatic step"
                );
                self.progress
                    .discard_in_progress(current.id)
                    .await
                    .map_err(|_| already.clone())?;
            }
            _ => return Err(already),
        }

        tracing::info!(
            pipeline_group_id = %cmd.pipeline_group_id,
            step_id = %cmd.step_id,
            "Step already completed with nothing in progress, resuming"
        );
        Ok(row.clone())
    }

    fn is_stale_claim(
        &self,
        catalog: &StepCatalog,
        step_id: StepId,
        current: &PipelineProgress,
        now: Timestamp,
    ) -> bool {
        let claims_successor = catalog
            .next_after(step_id)
            .map(|next| next.id == current.step_id && next.kind.is_automatic())
            .unwrap_or(false);
        claims_successor
            && now.is_after(&current.created_at.plus_secs(self.settings.claim_lease_secs))
    }

    /// Starts the successor's row. Losing the race means another request owns
    /// the follow-up work for this step.
    async fn claim(
        &self,
        cmd: &MarkStepCompletedCommand,
        client_id: ClientId,
        next: &PipelineStep,
        at: Timestamp,
    ) -> Result<PipelineProgress, MarkStepCompletedError> {
        let transition = ProgressTransition {
            complete: None,
            start: Some(NewProgress::started(
                cmd.user_id,
                client_id,
                cmd.pipeline_group_id,
                next.id,
                at,
            )),
            at,
        };

        let applied = self
            .progress
            .apply_transition(&transition)
            .await
            .map_err(|e| match e.code {
                ErrorCode::ConcurrentModification => {
                    MarkStepCompletedError::AlreadyCompleted(cmd.step_id)
                }
                _ => MarkStepCompletedError::Domain(e),
            })?;

        applied.started.ok_or_else(|| {
            MarkStepCompletedError::Domain(DomainError::new(
                ErrorCode::InternalError,
                "Progress store did not start the claimed step",
            ))
        })
    }

    async fn release(&self, claim: &PipelineProgress) {
        if let Err(err) = self.progress.discard_in_progress(claim.id).await {
            tracing::warn!(
                pipeline_group_id = %claim.pipeline_group_id,
                step_id = %claim.step_id,
                error = %err,
                "Could not release claim after hook failure"
            );
        }
    }

    /// Completes the claimed automatic step. Returns the started row and
    /// whether the group is finished.
    async fn complete_automatic(
        &self,
        cmd: &MarkStepCompletedCommand,
        client_id: ClientId,
        next: &PipelineStep,
        claim: &PipelineProgress,
    ) -> Result<(Option<PipelineProgress>, bool), MarkStepCompletedError> {
        if !next.kind.is_terminal() {
            let outcome = self.advance_group(cmd, client_id).await?;
            return Ok((outcome.started().cloned(), outcome.completed_final_step()));
        }

        self.progress
            .apply_transition(&ProgressTransition {
                complete: Some(claim.id),
                start: None,
                at: Timestamp::now(),
            })
            .await?;
        tracing::info!(
            pipeline_group_id = %cmd.pipeline_group_id,
            step_id = %next.id,
            "Automatic step completed, pipeline group finished"
        );
        Ok((None, true))
    }

    async fn advance_group(
        &self,
        cmd: &MarkStepCompletedCommand,
        client_id: ClientId,
    ) -> Result<AdvanceOutcome, AdvancePipelineError> {
        self.advance
            .handle(AdvancePipelineCommand {
                user_id: cmd.user_id,
                client_id,
                pipeline_group_id: cmd.pipeline_group_id,
            })
            .await
    }

    /// Opens a new group after a finished one. A failure here does not undo the
    /// completion, so it is logged and reported as "no restart".
    async fn restart_group(
        &self,
        cmd: &MarkStepCompletedCommand,
        client_id: ClientId,
    ) -> Option<PipelineGroupId> {
        match self
            .restart
            .handle(StartPipelineGroupCommand {
                user_id: cmd.user_id,
                client_id,
            })
            .await
        {
            Ok(result) => Some(result.pipeline_group_id),
            Err(err) => {
                tracing::warn!(
                    client_id = %client_id,
                    finished_group_id = %cmd.pipeline_group_id,
                    error = %err,
                    "Could not restart pipeline"
                );
                None
            }
        }
    }
}

/// True when the group has a completed terminal step.
fn is_finished(catalog: &StepCatalog, rows: &[PipelineProgress]) -> bool {
    rows.iter().any(|r| {
        r.status.is_completed()
            && catalog
                .get(r.step_id)
                .map(|s| s.kind.is_terminal())
                .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryProgressRepository, InMemoryStepCatalog, InMemorySurveyResponseReader,
        InMemoryWorkflowStore,
    };
    use crate::adapters::survey::NormalizingSurveyAnalyzer;
    use crate::application::hooks::WorkflowGenerationHook;
    use crate::domain::foundation::{ProgressId, ProgressStatus, SurveyResponseId};
    use crate::domain::pipeline::StepKind;
    use crate::domain::survey::SurveyResponse;
    use crate::ports::{StepCompletionHook, WorkflowStore};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps a hook and counts its invocations.
    struct Counted<H> {
        inner: H,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl<H: StepCompletionHook> StepCompletionHook for Counted<H> {
        fn name(&self) -> &'static str {
            self.inner.name()
        }

        async fn on_step_completed(&self, completion: &StepCompletion) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.on_step_completed(completion).await
        }
    }

    /// Gives other tasks a chance to run before the wrapped hook.
    struct Yielding<H>(Arc<H>);

    #[async_trait]
    impl<H: StepCompletionHook> StepCompletionHook for Yielding<H> {
        fn name(&self) -> &'static str {
            self.0.name()
        }

        async fn on_step_completed(&self, completion: &StepCompletion) -> Result<(), DomainError> {
            tokio::task::yield_now().await;
            self.0.on_step_completed(completion).await
        }
    }

    struct Fixture {
        progress: Arc<InMemoryProgressRepository>,
        surveys: Arc<InMemorySurveyResponseReader>,
        workflows: Arc<InMemoryWorkflowStore>,
        hook: Arc<Counted<WorkflowGenerationHook>>,
        user: UserId,
        client: ClientId,
        group: PipelineGroupId,
    }

    impl Fixture {
        /// Group with steps 1..current completed and `current` in progress.
        fn at_step(current: i32) -> Self {
            let user = UserId::new();
            let client = ClientId::new();
            let group = PipelineGroupId::new();
            let rows = (1..=current)
                .map(|step| {
                    let mut row = NewProgress::started(
                        user,
                        client,
                        group,
                        StepId::new(step),
                        Timestamp::from_unix_secs(step as i64 * 60),
                    )
                    .into_progress(ProgressId::new(step as i64));
                    if step < current {
                        row.complete(Timestamp::from_unix_secs(step as i64 * 60 + 30))
                            .unwrap();
                    }
                    row
                })
                .collect();

            let progress = Arc::new(InMemoryProgressRepository::with_rows(rows));
            let surveys = Arc::new(InMemorySurveyResponseReader::new());
            let workflows = Arc::new(InMemoryWorkflowStore::new());
            let hook = Arc::new(Counted {
                inner: WorkflowGenerationHook::new(
                    surveys.clone(),
                    Arc::new(NormalizingSurveyAnalyzer::new()),
                    workflows.clone(),
                ),
                calls: AtomicUsize::new(0),
            });

            Self {
                progress,
                surveys,
                workflows,
                hook,
                user,
                client,
                group,
            }
        }

        fn with_survey(self) -> Self {
            self.surveys
                .insert(SurveyResponse {
                    id: SurveyResponseId::new(),
                    client_id: self.client,
                    user_id: self.user,
                    pipeline_group_id: self.group,
                    analyzed_survey_response: Some(json!({
                        "summary": "Manual invoicing",
                        "workflows": [{"name": "Invoice sync", "steps": ["Fetch", "Post"]}]
                    })),
                    created_at: Timestamp::now(),
                })
                .unwrap();
            self
        }

        fn handler(&self, auto_restart: bool) -> MarkStepCompletedHandler {
            self.handler_with(PipelineSettings {
                auto_restart,
                ..PipelineSettings::default()
            })
        }

        fn handler_with(&self, settings: PipelineSettings) -> MarkStepCompletedHandler {
            let hook = Arc::new(Yielding(self.hook.clone()));
            let hooks = HookRegistry::new().register(StepKind::SurveyAnalysis, hook);
            MarkStepCompletedHandler::new(
                Arc::new(InMemoryStepCatalog::default()),
                self.progress.clone(),
                hooks,
                settings,
            )
        }

        fn command(&self, step: i32) -> MarkStepCompletedCommand {
            MarkStepCompletedCommand {
                user_id: self.user,
                pipeline_group_id: self.group,
                step_id: StepId::new(step),
            }
        }

        async fn rows(&self) -> Vec<PipelineProgress> {
            self.progress.find_by_group(&self.group).await.unwrap()
        }
    }

    #[tokio::test]
    async fn standard_step_completes_and_advances() {
        let fx = Fixture::at_step(2);

        let result = fx.handler(false).handle(fx.command(2)).await.unwrap();

        assert_eq!(result.completed.status, ProgressStatus::Completed);
        assert!(result.completed.completed_at.is_some());
        assert_eq!(result.started.as_ref().unwrap().step_id, StepId::new(3));
        assert!(!result.completed_final_step);
        assert!(!result.restarted());
        assert_eq!(fx.hook.calls.load(Ordering::SeqCst), 0);

        let rows = fx.rows().await;
        assert_eq!(rows.iter().filter(|r| r.status.is_in_progress()).count(), 1);
    }

    #[tokio::test]
    async fn survey_analysis_generates_workflows_and_finishes_group() {
        let fx = Fixture::at_step(7).with_survey();

        let result = fx.handler(false).handle(fx.command(7)).await.unwrap();

        assert!(result.completed_final_step);
        assert!(result.started.is_none());
        assert_eq!(fx.hook.calls.load(Ordering::SeqCst), 1);
        assert!(!fx.workflows.find_by_client(&fx.client).await.unwrap().is_empty());

        let rows = fx.rows().await;
        let build = rows.iter().find(|r| r.step_id == StepId::new(8)).unwrap();
        assert_eq!(build.status, ProgressStatus::Completed);
        assert!(build.completed_at.is_some());
        assert!(rows.iter().all(|r| !r.status.is_in_progress()));
    }

    #[tokio::test]
    async fn finished_group_restarts_when_enabled() {
        let fx = Fixture::at_step(7).with_survey();

        let result = fx.handler(true).handle(fx.command(7)).await.unwrap();

        let new_group = result.new_group_id.unwrap();
        assert_ne!(new_group, fx.group);
        let new_rows = fx.progress.find_by_group(&new_group).await.unwrap();
        assert_eq!(new_rows.len(), 1);
        assert_eq!(new_rows[0].step_id, StepId::new(1));
        assert!(new_rows[0].status.is_in_progress());
    }

    #[tokio::test]
    async fn hook_failure_keeps_completion_and_can_be_retried() {
        let fx = Fixture::at_step(7);
        let handler = fx.handler(false);

        let err = handler.handle(fx.command(7)).await.unwrap_err();
        match err {
            MarkStepCompletedError::Hook(failure) => {
                assert_eq!(failure.error.code, ErrorCode::SurveyResponseNotFound)
            }
            other => panic!("unexpected error {:?}", other),
        }
        let rows = fx.rows().await;
        assert_eq!(rows.len(), 7);
        assert!(rows.iter().all(|r| r.status.is_completed()));

        // Survey arrives, operator clicks again.
        let fx = fx.with_survey();
        let result = handler.handle(fx.command(7)).await.unwrap();
        assert!(result.completed_final_step);
        assert_eq!(fx.hook.calls.load(Ordering::SeqCst), 2);
        assert_eq!(fx.rows().await.len(), 8);
    }

    #[tokio::test]
    async fn double_submit_is_rejected() {
        let fx = Fixture::at_step(3);
        let handler = fx.handler(false);
        handler.handle(fx.command(3)).await.unwrap();

        let err = handler.handle(fx.command(3)).await.unwrap_err();

        assert!(matches!(err, MarkStepCompletedError::AlreadyCompleted(id) if id == StepId::new(3)));
        assert_eq!(fx.rows().await.len(), 4);
    }

    #[tokio::test]
    async fn finished_group_cannot_be_resumed() {
        let fx = Fixture::at_step(7).with_survey();
        let handler = fx.handler(false);
        handler.handle(fx.command(7)).await.unwrap();

        let err = handler.handle(fx.command(7)).await.unwrap_err();

        assert!(matches!(err, MarkStepCompletedError::AlreadyCompleted(_)));
        assert_eq!(fx.hook.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_row_reports_current_step_not_found() {
        let fx = Fixture::at_step(2);

        let err = fx.handler(false).handle(fx.command(5)).await.unwrap_err();

        assert!(matches!(err, MarkStepCompletedError::StepNotFound(_)));
        assert_eq!(err.to_string(), "Current step not found");
    }

    #[tokio::test]
    async fn automatic_step_cannot_be_marked_by_operator() {
        let fx = Fixture::at_step(8);

        let err = fx.handler(false).handle(fx.command(8)).await.unwrap_err();

        match err {
            MarkStepCompletedError::Domain(e) => {
                assert_eq!(e.code, ErrorCode::AutomaticStep);
                assert_eq!(e.details.get("complete_step_id").map(String::as_str), Some("7"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        let rows = fx.rows().await;
        assert!(rows.iter().any(|r| r.step_id == StepId::new(8) && r.status.is_in_progress()));
    }

    #[tokio::test]
    async fn concurrent_completions_run_hooks_once() {
        let fx = Fixture::at_step(7).with_survey();
        let handler = fx.handler(false);

        let (first, second) = tokio::join!(
            handler.handle(fx.command(7)),
            handler.handle(fx.command(7))
        );

        let (ok, err) = match (first, second) {
            (Ok(ok), Err(err)) | (Err(err), Ok(ok)) => (ok, err),
            other => panic!("expected one success and one refusal, got {:?}", other),
        };
        assert!(ok.completed_final_step);
        assert!(matches!(err, MarkStepCompletedError::AlreadyCompleted(id) if id == StepId::new(7)));
        assert_eq!(fx.hook.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.workflows.find_by_client(&fx.client).await.unwrap().len(), 1);

        let rows = fx.rows().await;
        assert_eq!(rows.iter().filter(|r| r.step_id == StepId::new(8)).count(), 1);
    }

    #[tokio::test]
    async fn fresh_claim_on_factory_build_blocks_resume() {
        // Step 7 completed, step 8 claimed by a request that is still running.
        let fx = Fixture::at_step(8).with_survey();
        let handler = fx.handler_with(PipelineSettings {
            auto_restart: false,
            claim_lease_secs: 100 * 365 * 24 * 60 * 60,
        });

        let err = handler.handle(fx.command(7)).await.unwrap_err();

        assert!(matches!(err, MarkStepCompletedError::AlreadyCompleted(_)));
        assert_eq!(fx.hook.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.rows().await.len(), 8);
    }

    #[tokio::test]
    async fn stale_claim_on_factory_build_is_released() {
        // The claim on step 8 dates from 1970, well past the lease.
        let fx = Fixture::at_step(8).with_survey();

        let result = fx.handler(false).handle(fx.command(7)).await.unwrap();

        assert!(result.completed_final_step);
        assert_eq!(fx.hook.calls.load(Ordering::SeqCst), 1);
        let rows = fx.rows().await;
        let builds: Vec<_> = rows.iter().filter(|r| r.step_id == StepId::new(8)).collect();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].status, ProgressStatus::Completed);
    }

    #[test]
    fn default_settings_restart_with_a_fifteen_minute_lease() {
        let settings = PipelineSettings::default();
        assert!(settings.auto_restart);
        assert_eq!(settings.claim_lease_secs, 900);
    }
}
