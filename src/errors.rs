//! Error types for rapid_analyzer
//!
//! This module defines the top-level error type returned by the analyzer
//! entry points. Validation and stage-level failures carry their own
//! structured records (see [`crate::pipeline::errors`]) and are wrapped here.

use thiserror::Error;

use crate::pipeline::errors::StageError;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Main error type for rapid_analyzer
#[derive(Error, Debug, Clone)]
pub enum AnalyzerError {
    /// The requested invocation is incompatible with the instantiated stages
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A stage resource could not be read or parsed at construction time
    #[error("Failed to load {stage} resource '{path}': {message}")]
    ResourceLoad {
        stage: String,
        path: String,
        message: String,
    },

    /// The stage loader has no implementation for a configured stage
    #[error("Unsupported stage: {stage} (no implementation available for '{path}')")]
    UnsupportedStage { stage: String, path: String },

    /// A stage failed while processing a call
    #[error(transparent)]
    Stage(#[from] StageError),

    /// The call was cancelled between two ladder steps
    #[error("Analysis cancelled before stage '{stage}'")]
    Cancelled { stage: String },

    /// Reading or writing a byte stream failed
    #[error("I/O error: {message}")]
    Io { message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl AnalyzerError {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a resource load error
    pub fn resource_load(
        stage: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ResourceLoad {
            stage: stage.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported stage error
    pub fn unsupported_stage(stage: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnsupportedStage {
            stage: stage.into(),
            path: path.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error refused a call because of its configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }

    /// Check if this error was raised while constructing an analyzer
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::ResourceLoad { .. } | Self::UnsupportedStage { .. }
        )
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
