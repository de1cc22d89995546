//! Client pipeline reconciliation.
//!
//! A client accumulates several pipeline groups over time (one per restart).
//! These functions decide which group is shown and how steps from older
//! groups fill in the gaps, independent of any rendering code.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::catalog::StepCatalog;
use super::progress::PipelineProgress;
use super::projection::latest_by_step;
use super::step::{PipelineStep, StepKind};
use crate::domain::foundation::{PipelineGroupId, ProgressStatus, Timestamp};

/// Chooses the group whose steps should be displayed.
///
/// Precedence:
/// 1. `forced`, e.g. the group created by a restart a moment ago
/// 2. the group holding an in-progress row (the most recent one if several)
/// 3. the group whose most recent row is the newest
pub fn select_active_group(
    rows: &[PipelineProgress],
    forced: Option<PipelineGroupId>,
) -> Option<PipelineGroupId> {
    if forced.is_some() {
        return forced;
    }

    let in_progress = rows
        .iter()
        .filter(|r| r.status.is_in_progress())
        .max_by_key(|r| r.recency_key());
    if let Some(row) = in_progress {
        return Some(row.pipeline_group_id);
    }

    rows.iter()
        .max_by_key(|r| r.recency_key())
        .map(|r| r.pipeline_group_id)
}

/// Where a displayed step's status came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySource {
    ActiveGroup,
    History,
    Placeholder,
}

/// One step as the client pipeline view shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayStep {
    #[serde(flatten)]
    pub step: PipelineStep,
    pub status: ProgressStatus,
    pub source: DisplaySource,
    pub progress: Option<PipelineProgress>,
}

/// Merges the active group with the client's history, one entry per catalog step.
pub fn reconcile_display(
    catalog: &StepCatalog,
    rows: &[PipelineProgress],
    active: Option<PipelineGroupId>,
) -> Vec<DisplayStep> {
    let in_active = latest_by_step(
        rows.iter()
            .filter(|r| Some(r.pipeline_group_id) == active),
    );
    let anywhere = latest_by_step(rows);

    catalog
        .steps()
        .iter()
        .map(|step| {
            let (progress, source) = match (in_active.get(&step.id), anywhere.get(&step.id)) {
                (Some(row), _) => (Some((*row).clone()), DisplaySource::ActiveGroup),
                (None, Some(row)) => (Some((*row).clone()), DisplaySource::History),
                (None, None) => (None, DisplaySource::Placeholder),
            };
            let stored = progress
                .as_ref()
                .map(|p| p.status)
                .unwrap_or(ProgressStatus::Pending);

            DisplayStep {
                step: step.clone(),
                status: display_status(step, stored),
                source,
                progress,
            }
        })
        .collect()
}

/// The initial survey is shown as active until it is completed.
fn display_status(step: &PipelineStep, stored: ProgressStatus) -> ProgressStatus {
    if step.kind == StepKind::InitialSurvey && !stored.is_completed() {
        ProgressStatus::InProgress
    } else {
        stored
    }
}

/// Summary of one pipeline group of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub pipeline_group_id: PipelineGroupId,
    pub row_count: usize,
    pub started_at: Timestamp,
    pub latest_activity: Timestamp,
    pub has_in_progress: bool,
    pub finished: bool,
}

/// Everything the client pipeline screen needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPipelineView {
    pub active_group_id: Option<PipelineGroupId>,
    pub groups: Vec<GroupSummary>,
    pub steps: Vec<DisplayStep>,
}

/// Per-group summaries, most recently active first.
pub fn summarize_groups(catalog: &StepCatalog, rows: &[PipelineProgress]) -> Vec<GroupSummary> {
    let mut by_group: BTreeMap<PipelineGroupId, Vec<&PipelineProgress>> = BTreeMap::new();
    for row in rows {
        by_group.entry(row.pipeline_group_id).or_default().push(row);
    }

    let terminal: HashMap<_, _> = catalog
        .steps()
        .iter()
        .map(|s| (s.id, s.kind.is_terminal()))
        .collect();

    let mut groups: Vec<GroupSummary> = by_group
        .into_iter()
        .filter_map(|(group_id, group_rows)| {
            let started_at = group_rows.iter().map(|r| r.created_at).min()?;
            let latest_activity = group_rows.iter().map(|r| r.updated_at.max(r.created_at)).max()?;
            Some(GroupSummary {
                pipeline_group_id: group_id,
                row_count: group_rows.len(),
                started_at,
                latest_activity,
                has_in_progress: group_rows.iter().any(|r| r.status.is_in_progress()),
                finished: group_rows.iter().any(|r| {
                    r.status.is_completed() && terminal.get(&r.step_id).copied().unwrap_or(false)
                }),
            })
        })
        .collect();

    groups.sort_by(|a, b| b.latest_activity.cmp(&a.latest_activity));
    groups
}

/// Builds the full client view.
pub fn build_client_view(
    catalog: &StepCatalog,
    rows: &[PipelineProgress],
    forced: Option<PipelineGroupId>,
) -> ClientPipelineView {
    let active_group_id = select_active_group(rows, forced);
    ClientPipelineView {
        active_group_id,
        groups: summarize_groups(catalog, rows),
        steps: reconcile_display(catalog, rows, active_group_id),
    }
}
