//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier with the usual constructors.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parses an identifier supplied by a caller.
            ///
            /// Missing or blank input is an empty-field error; anything that is
            /// not a UUID is an invalid-format error.
            pub fn parse_required(raw: Option<&str>) -> Result<Self, ValidationError> {
                let raw = raw.map(str::trim).unwrap_or_default();
                if raw.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                raw.parse()
                    .map_err(|_| ValidationError::invalid_format($field, "expected a UUID"))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Operator (dashboard user) who owns clients and their pipelines.
    UserId,
    "user_id"
);

uuid_id!(
    /// Client being onboarded.
    ClientId,
    "client_id"
);

uuid_id!(
    /// One onboarding cycle; shared by every progress row of that cycle.
    PipelineGroupId,
    "pipeline_group_id"
);

uuid_id!(
    /// Persisted workflow generated for a client.
    WorkflowId,
    "workflow_id"
);

uuid_id!(
    /// Node inside a generated workflow graph.
    NodeId,
    "node_id"
);

uuid_id!(
    /// Stored survey response.
    SurveyResponseId,
    "survey_response_id"
);

/// Identifier of a step in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(i32);

impl StepId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a progress row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressId(i64);

impl ProgressId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProgressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_round_trips_through_string() {
        let id = ClientId::new();
        let parsed: ClientId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn group_ids_are_unique() {
        assert_ne!(PipelineGroupId::new(), PipelineGroupId::new());
    }

    #[test]
    fn parse_required_rejects_missing_value() {
        let err = UserId::parse_required(None).unwrap_err();
        assert_eq!(err.to_string(), "Field 'user_id' cannot be empty");
    }

    #[test]
    fn parse_required_rejects_blank_value() {
        assert!(matches!(
            ClientId::parse_required(Some("   ")),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn parse_required_rejects_non_uuid() {
        assert!(matches!(
            PipelineGroupId::parse_required(Some("group-1")),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn parse_required_accepts_padded_uuid() {
        let id = UserId::new();
        let parsed = UserId::parse_required(Some(&format!(" {} ", id))).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn step_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&StepId::new(7)).unwrap(), "7");
    }
}
