//! StepCatalog value object - the ordered, read-only list of pipeline steps.
//!
//! Sequencing is driven by `step_order`. Step ids are only used for lookup,
//! so gaps or reordering in id allocation never change which step comes next.

use std::collections::HashSet;

use super::step::PipelineStep;
use crate::domain::foundation::StepId;

/// Ordered step catalog.
#[derive(Debug, Clone, Default)]
pub struct StepCatalog {
    steps: Vec<PipelineStep>,
}

impl StepCatalog {
    /// Builds a catalog, sorting by `step_order` (ties broken by id).
    pub fn new(mut steps: Vec<PipelineStep>) -> Self {
        steps.sort_by_key(|s| (s.step_order, s.id));
        Self { steps }
    }

    /// Steps in sequence order.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, id: StepId) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn first(&self) -> Option<&PipelineStep> {
        self.steps.first()
    }

    /// The step with the smallest `step_order` strictly greater than the given step's.
    ///
    /// Returns `None` for the last step or an id that is not in the catalog.
    pub fn next_after(&self, id: StepId) -> Option<&PipelineStep> {
        let current = self.get(id)?;
        self.steps.iter().find(|s| {
            s.step_order > current.step_order
                || (s.step_order == current.step_order && s.id > current.id)
        })
    }

    /// First step (in sequence order) whose id is not in `represented`.
    pub fn first_unrepresented(&self, represented: &HashSet<StepId>) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| !represented.contains(&s.id))
    }

    /// The step that `next_after` maps onto the given one.
    pub fn previous_before(&self, id: StepId) -> Option<&PipelineStep> {
        let position = self.steps.iter().position(|s| s.id == id)?;
        position.checked_sub(1).map(|prev| &self.steps[prev])
    }
}
