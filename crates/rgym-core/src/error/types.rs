//! Core error type

use thiserror::Error;

/// Result type alias for rgym operations
pub type GymResult<T> = Result<T, GymError>;

/// Main error type for rgym
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GymError {
    /// Evaluation configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Dataset lookup or generation errors
    #[error("Dataset error: {dataset}: {message}")]
    Dataset { dataset: String, message: String },

    /// Dataset parameters failed to deserialize or validate
    #[error("Invalid parameters for dataset '{dataset}': {message}")]
    InvalidParams { dataset: String, message: String },

    /// Curriculum attribute errors
    #[error("Curriculum error: {curriculum}: {message}")]
    Curriculum { curriculum: String, message: String },

    /// Model inference errors
    #[error("Model error: {message}")]
    Model {
        message: String,
        status_code: Option<u16>,
        retryable: bool,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io { message: String },

    /// JSON/YAML (de)serialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        resource_type: Option<String>,
    },

    /// Generic error
    #[error("Error: {message}")]
    Other { message: String },
}

impl GymError {
    /// Short machine-readable code for the error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            GymError::Config { .. } => "CONFIG",
            GymError::Dataset { .. } => "DATASET",
            GymError::InvalidParams { .. } => "INVALID_PARAMS",
            GymError::Curriculum { .. } => "CURRICULUM",
            GymError::Model { .. } => "MODEL",
            GymError::Io { .. } => "IO",
            GymError::Serialization { .. } => "SERIALIZATION",
            GymError::NotFound { .. } => "NOT_FOUND",
            GymError::Other { .. } => "OTHER",
        }
    }

    /// Whether retrying the failed operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, GymError::Model { retryable: true, .. })
    }

    /// Context attached to a configuration error, if any
    pub fn context(&self) -> Option<&str> {
        match self {
            GymError::Config { context, .. } => context.as_deref(),
            _ => None,
        }
    }
}
