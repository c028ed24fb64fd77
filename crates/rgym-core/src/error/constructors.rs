//! Constructor methods for GymError

use super::types::GymError;

impl GymError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with the config path it applies to
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new dataset error
    pub fn dataset(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dataset {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Create an invalid parameters error
    pub fn invalid_params(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Create a new curriculum error
    pub fn curriculum(curriculum: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Curriculum {
            curriculum: curriculum.into(),
            message: message.into(),
        }
    }

    /// Create a non-retryable model error
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
            status_code: None,
            retryable: false,
        }
    }

    /// Create a model error carrying an HTTP status
    pub fn model_with_status(message: impl Into<String>, status_code: u16, retryable: bool) -> Self {
        Self::Model {
            message: message.into(),
            status_code: Some(status_code),
            retryable,
        }
    }

    /// Create a retryable model error (network failures, timeouts)
    pub fn model_transient(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
            status_code: None,
            retryable: true,
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
        }
    }

    /// Create a not found error with resource type
    pub fn not_found_resource(message: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: Some(resource_type.into()),
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}
