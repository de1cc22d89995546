//! Re-normalization of a stored survey analysis.
//!
//! Analyses are stored as JSON blobs written by several generations of the
//! survey tooling, so field names and encodings vary. `analyze_survey` folds
//! all known shapes into one typed [`AnalyzedSurvey`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::ValidationError;

const FIELD: &str = "analyzed_survey_response";

/// Typed result of a survey analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedSurvey {
    pub summary: String,
    pub workflows: Vec<WorkflowRecommendation>,
}

/// One automation the analysis recommends building for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecommendation {
    pub name: String,
    pub description: String,
    pub estimated_hours_saved: f64,
    pub steps: Vec<String>,
}

/// Normalizes a stored analysis blob.
///
/// Accepts an object or a JSON-encoded string holding an object. The list of
/// recommendations may be named `workflows`, `recommended_workflows` or
/// `recommendedWorkflows`. Unnamed entries are dropped, names are de-duplicated
/// case-insensitively and negative hour estimates clamp to zero.
///
/// # Errors
///
/// Returns `InvalidFormat` when the blob is not an object or yields no
/// workflow recommendation.
pub fn analyze_survey(raw: &Value) -> Result<AnalyzedSurvey, ValidationError> {
    let decoded;
    let value = match raw {
        Value::String(encoded) => {
            decoded = serde_json::from_str::<Value>(encoded)
                .map_err(|e| ValidationError::invalid_format(FIELD, e.to_string()))?;
            &decoded
        }
        other => other,
    };

    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::invalid_format(FIELD, "expected a JSON object"))?;

    let summary = text(object, &["summary", "overview"]);

    let entries = ["workflows", "recommended_workflows", "recommendedWorkflows"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let workflows: Vec<WorkflowRecommendation> = entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(recommendation)
        .filter(|w| seen.insert(w.name.to_lowercase()))
        .collect();

    if workflows.is_empty() {
        return Err(ValidationError::invalid_format(
            FIELD,
            "analysis contains no workflow recommendations",
        ));
    }

    Ok(AnalyzedSurvey { summary, workflows })
}

fn recommendation(entry: &Map<String, Value>) -> Option<WorkflowRecommendation> {
    let name = text(entry, &["name", "title"]);
    if name.is_empty() {
        return None;
    }

    let estimated_hours_saved = ["estimated_hours_saved", "estimatedHoursSaved", "hours_saved"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_f64))
        .unwrap_or(0.0)
        .max(0.0);

    let steps = entry
        .get("steps")
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .filter_map(|step| match step {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Object(o) => Some(text(o, &["name", "title"])),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Some(WorkflowRecommendation {
        name,
        description: text(entry, &["description"]),
        estimated_hours_saved,
        steps,
    })
}

/// First non-blank string among the given keys, trimmed.
fn text(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}
