//! Advancement planning - decides how a pipeline group moves to its next step.
//!
//! Planning is pure: it looks at the catalog and the group's rows and returns
//! an [`AdvancePlan`]. Persisting the plan is the job of the progress store,
//! which applies the resulting [`ProgressTransition`] atomically.

use std::collections::HashSet;

use super::catalog::StepCatalog;
use super::progress::{NewProgress, PipelineProgress};
use super::step::PipelineStep;
use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, PipelineGroupId, ProgressId, StepId, Timestamp, UserId,
};

/// Message used when no further step can be computed.
pub const EXHAUSTED_MESSAGE: &str = "All steps are already in progress or completed";

/// What advancing a group will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvancePlan {
    /// The in-progress step is terminal: complete it and start nothing.
    CompleteFinal { current: PipelineProgress },
    /// Complete the current step (if any) and start `next`.
    Advance {
        current: Option<PipelineProgress>,
        next: PipelineStep,
    },
}

impl AdvancePlan {
    /// Converts the plan into a store transition stamped with `at`.
    pub fn into_transition(
        self,
        user_id: UserId,
        client_id: ClientId,
        pipeline_group_id: PipelineGroupId,
        at: Timestamp,
    ) -> ProgressTransition {
        match self {
            AdvancePlan::CompleteFinal { current } => ProgressTransition {
                complete: Some(current.id),
                start: None,
                at,
            },
            AdvancePlan::Advance { current, next } => ProgressTransition {
                complete: current.map(|c| c.id),
                start: Some(NewProgress::started(
                    user_id,
                    client_id,
                    pipeline_group_id,
                    next.id,
                    at,
                )),
                at,
            },
        }
    }
}

/// Atomic unit of work for the progress store.
///
/// `complete` names a row that must still be `in-progress` when the
/// transition is applied; if it is not, the whole transition is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTransition {
    pub complete: Option<ProgressId>,
    pub start: Option<NewProgress>,
    pub at: Timestamp,
}

/// Returns the group's in-progress row, if any.
///
/// # Errors
///
/// `ConcurrentModification` if more than one row is in progress.
pub fn current_step(rows: &[PipelineProgress]) -> Result<Option<&PipelineProgress>, DomainError> {
    let mut active = rows.iter().filter(|r| r.status.is_in_progress());
    let current = active.next();
    if active.next().is_some() {
        return Err(DomainError::new(
            ErrorCode::ConcurrentModification,
            "Pipeline group has more than one step in progress",
        ));
    }
    Ok(current)
}

/// Plans the next transition for one pipeline group.
///
/// # Errors
///
/// - `PipelineExhausted` when no next step can be determined
/// - `StepNotFound` when the in-progress row references an unknown step
/// - `ConcurrentModification` when the group has several in-progress rows
/// - `AutomaticStep` when the next step is one the system completes; such a
///   step is only entered by completing the step before it
pub fn plan_advance(
    catalog: &StepCatalog,
    rows: &[PipelineProgress],
) -> Result<AdvancePlan, DomainError> {
    let current = current_step(rows)?;

    let next = match current {
        Some(current) => {
            let step = catalog.get(current.step_id).ok_or_else(|| {
                DomainError::new(
                    ErrorCode::StepNotFound,
                    format!("Step {} is not in the pipeline catalog", current.step_id),
                )
            })?;
            if step.kind.is_terminal() {
                return Ok(AdvancePlan::CompleteFinal {
                    current: current.clone(),
                });
            }
            catalog.next_after(current.step_id)
        }
        None => {
            let represented: HashSet<StepId> = rows.iter().map(|r| r.step_id).collect();
            catalog.first_unrepresented(&represented)
        }
    };

    let next = next.ok_or_else(|| DomainError::new(ErrorCode::PipelineExhausted, EXHAUSTED_MESSAGE))?;
    if next.kind.is_automatic() {
        return Err(automatic_step_error(catalog, next));
    }

    Ok(AdvancePlan::Advance {
        current: current.cloned(),
        next: next.clone(),
    })
}

/// Refusal for operator actions on a step the system completes, naming the
/// step the operator should complete instead.
pub fn automatic_step_error(catalog: &StepCatalog, step: &PipelineStep) -> DomainError {
    let Some(prev) = catalog.previous_before(step.id) else {
        return DomainError::new(
            ErrorCode::AutomaticStep,
            format!("Step '{}' is completed by the system", step.step_name),
        )
        .with_detail("step_id", step.id.to_string());
    };

    DomainError::new(
        ErrorCode::AutomaticStep,
        format!(
            "Step '{}' is completed by the system once '{}' is marked completed",
            step.step_name, prev.step_name
        ),
    )
    .with_detail("step_id", step.id.to_string())
    .with_detail("complete_step_id", prev.id.to_string())
}
