//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field } => field,
            ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidFormat,

    // Not found errors
    StepNotFound,
    ProgressNotFound,
    GroupNotFound,
    SurveyResponseNotFound,

    // State errors
    InvalidStateTransition,
    PipelineExhausted,
    StepAlreadyCompleted,
    ConcurrentModification,
    AutomaticStep,

    // Collaborator errors
    SurveyAnalysisFailed,
    WorkflowGenerationFailed,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// Returns true for codes that mean "the referenced thing does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ErrorCode::StepNotFound
                | ErrorCode::ProgressNotFound
                | ErrorCode::GroupNotFound
                | ErrorCode::SurveyResponseNotFound
        )
    }

    /// Returns true for codes caused by the pipeline's current state.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidStateTransition
                | ErrorCode::PipelineExhausted
                | ErrorCode::StepAlreadyCompleted
                | ErrorCode::ConcurrentModification
                | ErrorCode::AutomaticStep
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::StepNotFound => "STEP_NOT_FOUND",
            ErrorCode::ProgressNotFound => "PROGRESS_NOT_FOUND",
            ErrorCode::GroupNotFound => "GROUP_NOT_FOUND",
            ErrorCode::SurveyResponseNotFound => "SURVEY_RESPONSE_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::PipelineExhausted => "PIPELINE_EXHAUSTED",
            ErrorCode::StepAlreadyCompleted => "STEP_ALREADY_COMPLETED",
            ErrorCode::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorCode::AutomaticStep => "AUTOMATIC_STEP",
            ErrorCode::SurveyAnalysisFailed => "SURVEY_ANALYSIS_FAILED",
            ErrorCode::WorkflowGenerationFailed => "WORKFLOW_GENERATION_FAILED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Wraps a store failure, prefixing the message with the failing operation.
    pub fn database(operation: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("{}: {}", operation, err))
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::validation(field, err.to_string())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
