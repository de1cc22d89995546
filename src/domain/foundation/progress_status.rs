//! ProgressStatus enum for pipeline progress rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{StateMachine, ValidationError};

/// Status of one step within one pipeline group.
///
/// Wire and column values are `pending`, `in-progress` and `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Column/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Pending => "pending",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Completed => "completed",
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, ProgressStatus::InProgress)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ProgressStatus::Completed)
    }
}

impl StateMachine for ProgressStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ProgressStatus::*;
        matches!(
            (self, target),
            (Pending, InProgress) | (Pending, Completed) | (InProgress, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ProgressStatus::*;
        match self {
            Pending => vec![InProgress, Completed],
            InProgress => vec![Completed],
            Completed => vec![],
        }
    }
}

impl FromStr for ProgressStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProgressStatus::Pending),
            "in-progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown progress status '{}'", other),
            )),
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
