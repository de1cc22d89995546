//! Pipeline step catalog entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StepId, ValidationError};

/// Role a catalog step plays in the onboarding flow.
///
/// Special behavior is keyed on the kind, never on the step id, so the
/// catalog can be reordered or renumbered freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    #[default]
    Standard,
    /// Client fills in the discovery survey; shown as active until completed.
    InitialSurvey,
    /// Operator reviews the analyzed survey; completion generates workflows.
    SurveyAnalysis,
    /// Workflow synthesis. Completed by the system and ends the group.
    FactoryBuild,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Standard => "standard",
            StepKind::InitialSurvey => "initial_survey",
            StepKind::SurveyAnalysis => "survey_analysis",
            StepKind::FactoryBuild => "factory_build",
        }
    }

    /// Completing a step of this kind finishes the pipeline group.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepKind::FactoryBuild)
    }

    /// Steps of this kind are completed by the system, not by an operator.
    pub fn is_automatic(&self) -> bool {
        matches!(self, StepKind::FactoryBuild)
    }
}

impl FromStr for StepKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(StepKind::Standard),
            "initial_survey" => Ok(StepKind::InitialSurvey),
            "survey_analysis" => Ok(StepKind::SurveyAnalysis),
            "factory_build" => Ok(StepKind::FactoryBuild),
            other => Err(ValidationError::invalid_format(
                "kind",
                format!("unknown step kind '{}'", other),
            )),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named stage of the static onboarding catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub id: StepId,
    pub step_name: String,
    pub step_order: i32,
    #[serde(default)]
    pub kind: StepKind,
}

impl PipelineStep {
    pub fn new(id: i32, step_name: impl Into<String>, step_order: i32, kind: StepKind) -> Self {
        Self {
            id: StepId::new(id),
            step_name: step_name.into(),
            step_order,
            kind,
        }
    }

    /// Shorthand for a step without special behavior.
    pub fn standard(id: i32, step_name: impl Into<String>, step_order: i32) -> Self {
        Self::new(id, step_name, step_order, StepKind::Standard)
    }
}
