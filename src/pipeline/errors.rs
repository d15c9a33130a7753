//! Structured diagnostics for configuration checks and stage failures.
//!
//! - [`ConfigDiagnostic`]: a problem found when checking an invocation
//!   against the instantiated stages (missing stage, level too low, ...)
//! - [`StageError`]: a failure reported by a stage while processing a call
//!
//! Both carry a stable [`ErrorCode`] for programmatic matching, a
//! human-readable `message` and an optional `hint`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error_code::ErrorCode;

// ─── Configuration diagnostics ──────────────────────────────────────────────

/// A configuration problem, located by a JSON pointer into the invocation
/// record.
///
/// # Display format
///
/// ```text
/// [missing_stage] /tagger: HMM tagger requested but no HMM model loaded
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("[{code}] {path}: {message}")]
pub struct ConfigDiagnostic {
    pub code: ErrorCode,

    /// Examples: `"/tagger"`, `"/output_level"`, `""` (root).
    pub path: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ConfigDiagnostic {
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a hint suggesting how to fix the problem.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ─── Stage failures ─────────────────────────────────────────────────────────

/// A failure raised by one stage during a call. Fatal to that call.
///
/// # JSON format
///
/// ```json
/// {
///   "code": "stage_failed",
///   "stage": "tagger",
///   "message": "word without analyses at position 3"
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("[{code}] {stage}: {message}")]
pub struct StageError {
    pub code: ErrorCode,

    /// Stage name (see the `STAGE_*` constants in [`super::observer`]).
    pub stage: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl StageError {
    pub fn new(code: ErrorCode, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            stage: stage.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Shorthand for a [`ErrorCode::StageFailed`] error.
    pub fn failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StageFailed, stage, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_diagnostic_display() {
        let err = ConfigDiagnostic::new(
            ErrorCode::MissingStage,
            "/tagger",
            "HMM tagger requested but no HMM model loaded",
        );
        assert_eq!(
            err.to_string(),
            "[missing_stage] /tagger: HMM tagger requested but no HMM model loaded"
        );
    }

    #[test]
    fn test_config_diagnostic_json_skips_empty_hint() {
        let err = ConfigDiagnostic::new(ErrorCode::NoProgress, "/input_level", "nothing to do");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "no_progress");
        assert!(json.get("hint").is_none());

        let err = err.with_hint("lower input_level");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["hint"], "lower input_level");
    }

    #[test]
    fn test_stage_error_roundtrip() {
        let err = StageError::failed("dep_treeler", "unknown label").with_hint("retrain");
        let json = serde_json::to_string(&err).unwrap();
        let back: StageError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
        assert_eq!(back.code, ErrorCode::StageFailed);
    }
}
