//! Worker service configuration.

use serde::{Deserialize, Serialize};

use crate::errors::{AnalyzerError, Result};
use crate::types::{AnalysisLevel, RequestedOutput};

pub const DEFAULT_MAX_WORKERS: usize = 5;
pub const DEFAULT_QUEUE_SIZE: usize = 32;

/// How a worker groups incoming lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Every line is a chunk of one continuous stream; sentences are sent
    /// back as soon as they close.
    #[default]
    Corpus,
    /// Lines accumulate into a document, analyzed as a whole on
    /// `FLUSH_BUFFER` or end of input.
    #[serde(alias = "doc")]
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Workers active at the same time.
    pub max_workers: usize,
    /// Accepted connections waiting for a worker.
    pub queue_size: usize,
    /// Close every pending sentence at the end of each line.
    pub always_flush: bool,
    /// In document mode, split the document into paragraphs at blank lines.
    pub paragraphs: bool,
    pub mode: InputMode,
    /// Language identification, or the level analyses are produced at.
    pub output: RequestedOutput,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            queue_size: DEFAULT_QUEUE_SIZE,
            always_flush: false,
            paragraphs: false,
            mode: InputMode::Corpus,
            output: RequestedOutput::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(AnalyzerError::invalid_config(
                "max_workers must be at least 1",
            ));
        }
        if self.queue_size == 0 {
            return Err(AnalyzerError::invalid_config("queue_size must be at least 1"));
        }
        Ok(())
    }

    /// Document-level outputs need the whole document, so they switch the
    /// input mode to [`InputMode::Document`].
    pub fn effective_mode(&self) -> InputMode {
        match self.output {
            RequestedOutput::Level(level) if level >= AnalysisLevel::Coref => InputMode::Document,
            _ => self.mode,
        }
    }
}
