//! From trait implementations for GymError conversions

use super::types::GymError;

impl From<std::io::Error> for GymError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for GymError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string())
    }
}

impl From<serde_yaml::Error> for GymError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization(error.to_string())
    }
}
