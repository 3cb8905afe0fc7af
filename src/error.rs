//! Error types and handling for the temperature predictor

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the temperature predictor
#[derive(Error, Debug)]
pub enum PredictorError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The model artifact could not be read or is malformed
    #[error("Model artifact {}: {message}", path.display())]
    ModelArtifact { path: PathBuf, message: String },

    /// City name outside the metadata table
    #[error("Unknown city '{name}'")]
    UnknownCity { name: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Assembled features do not match what the model was trained on
    #[error("Feature schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// The model failed while producing a prediction
    #[error("Inference error: {message}")]
    Inference { message: String },
}

impl PredictorError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new model artifact error
    pub fn model_artifact<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::ModelArtifact {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unknown_city<S: Into<String>>(name: S) -> Self {
        Self::UnknownCity { name: name.into() }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn schema_mismatch<S: Into<String>>(message: S) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    pub fn inference<S: Into<String>>(message: S) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Errors that must stop the process before any input is accepted.
    #[must_use]
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            PredictorError::Config { .. } | PredictorError::ModelArtifact { .. }
        )
    }

    /// One-line message for the person running the program
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PredictorError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            PredictorError::ModelArtifact { path, .. } => format!(
                "The prediction model could not be loaded from {}.",
                path.display()
            ),
            other => other.to_string(),
        }
    }
}
