//! Pipeline module - onboarding step catalog and per-client progress rules.
//!
//! A client moves through an ordered catalog of steps. Each onboarding run is a
//! pipeline group; inside a group at most one step is in progress. Everything
//! here is pure: loading and persisting rows happens through the ports.

mod advancement;
mod catalog;
mod progress;
mod projection;
mod reconciliation;
mod step;

pub use advancement::{
    automatic_step_error, current_step, plan_advance, AdvancePlan, ProgressTransition,
    EXHAUSTED_MESSAGE,
};
pub use catalog::StepCatalog;
pub use progress::{NewProgress, PipelineProgress};
pub use projection::{project_pipeline, ProjectedStep};
pub use reconciliation::{
    build_client_view, reconcile_display, select_active_group, summarize_groups,
    ClientPipelineView, DisplaySource, DisplayStep, GroupSummary,
};
pub use step::{PipelineStep, StepKind};
