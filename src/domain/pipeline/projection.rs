//! Read-model projection of pipeline progress onto the step catalog.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::catalog::StepCatalog;
use super::progress::PipelineProgress;
use super::step::PipelineStep;
use crate::domain::foundation::{ProgressStatus, StepId};

/// One catalog step joined with its progress row, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedStep {
    #[serde(flatten)]
    pub step: PipelineStep,
    pub progress: Option<PipelineProgress>,
}

impl ProjectedStep {
    /// Effective status; steps without a row are implicitly pending.
    pub fn status(&self) -> ProgressStatus {
        self.progress
            .as_ref()
            .map(|p| p.status)
            .unwrap_or(ProgressStatus::Pending)
    }
}

/// Most recent row per step id.
pub(crate) fn latest_by_step<'a, I>(rows: I) -> HashMap<StepId, &'a PipelineProgress>
where
    I: IntoIterator<Item = &'a PipelineProgress>,
{
    let mut latest: HashMap<StepId, &PipelineProgress> = HashMap::new();
    for row in rows {
        latest
            .entry(row.step_id)
            .and_modify(|existing| {
                if row.recency_key() > existing.recency_key() {
                    *existing = row;
                }
            })
            .or_insert(row);
    }
    latest
}

/// Left-joins the catalog with progress rows.
///
/// Always returns exactly one entry per catalog step, in catalog order.
/// Rows for steps that are not in the catalog are ignored.
pub fn project_pipeline(catalog: &StepCatalog, rows: &[PipelineProgress]) -> Vec<ProjectedStep> {
    let latest = latest_by_step(rows);
    catalog
        .steps()
        .iter()
        .map(|step| ProjectedStep {
            step: step.clone(),
            progress: latest.get(&step.id).map(|row| (*row).clone()),
        })
        .collect()
}
