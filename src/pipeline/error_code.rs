//! Stable error codes for configuration diagnostics and stage failures.
//!
//! Codes serialize as snake_case strings so that tooling can match on them
//! without depending on message wording.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A requested stage was never instantiated.
    MissingStage,
    /// A level that needs a stage is reached but no implementation is selected.
    StageDeactivated,
    /// The requested input level is not below the output level.
    NoProgress,
    /// A switch is set but the output level never reaches its stage.
    LevelTooLow,
    /// A switch depends on another switch that is turned off.
    MissingPrerequisite,
    /// A resource file could not be read or parsed.
    ResourceLoad,
    /// A stage reported a failure while processing.
    StageFailed,
    /// Processing stopped on request.
    Cancelled,
    /// A configuration value cannot be parsed.
    InvalidValue,
    /// A configuration field is not recognized.
    UnknownField,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingStage => "missing_stage",
            ErrorCode::StageDeactivated => "stage_deactivated",
            ErrorCode::NoProgress => "no_progress",
            ErrorCode::LevelTooLow => "level_too_low",
            ErrorCode::MissingPrerequisite => "missing_prerequisite",
            ErrorCode::ResourceLoad => "resource_load",
            ErrorCode::StageFailed => "stage_failed",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::UnknownField => "unknown_field",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for code in [
            ErrorCode::MissingStage,
            ErrorCode::StageDeactivated,
            ErrorCode::NoProgress,
            ErrorCode::LevelTooLow,
            ErrorCode::MissingPrerequisite,
            ErrorCode::ResourceLoad,
            ErrorCode::StageFailed,
            ErrorCode::Cancelled,
            ErrorCode::InvalidValue,
            ErrorCode::UnknownField,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code));
        }
    }
}
