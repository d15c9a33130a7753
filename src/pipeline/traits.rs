//! Stage trait definitions.
//!
//! Each trait is one stage boundary the analyzer drives. Stage handles are
//! held as `Arc<dyn Trait>` so that loaded models are shared read-only
//! between analyzer instances (see [`super::runner::Analyzer::fork`]); every
//! trait is therefore `Send + Sync` and takes `&self`.
//!
//! # Contract
//!
//! - Stages only enrich: they add analyses, trees or annotations and never
//!   remove words a previous stage produced (retokenizing taggers replace a
//!   word by its sub-words, which is still an enrichment of the reading).
//! - Stages keep no reference to the units they are given.

use std::fmt;

use super::config::MorphoOptions;
use super::errors::StageError;
use crate::types::{Document, Sentence, Word};

/// Result type returned by stages.
pub type StageResult = std::result::Result<(), StageError>;

// ============================================================================
// Tokenizer
// ============================================================================

/// Splits raw text into words.
///
/// `offset` is the character position of `text` within the whole input; the
/// tokenizer writes spans relative to it and advances it by the number of
/// characters consumed, including trailing whitespace.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str, offset: &mut usize) -> Vec<Word>;
}

// ============================================================================
// Splitter
// ============================================================================

/// Handle to a long-lived segmentation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Result of one [`Splitter::split`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOutcome {
    /// Completed sentences, in order.
    pub sentences: Vec<Sentence>,
    /// How many leading words of the input went into `sentences`. The caller
    /// keeps the rest pending and passes them again on the next call.
    pub consumed: usize,
}

/// Groups words into sentences. Boundary state that spans calls (open
/// brackets, words since the last boundary) lives in a session.
pub trait Splitter: Send + Sync {
    fn open_session(&self) -> SessionId;

    fn close_session(&self, session: SessionId);

    /// Split `words`. With `flush`, every word is consumed and the trailing
    /// partial sentence is closed.
    fn split(&self, session: SessionId, words: &[Word], flush: bool) -> SplitOutcome;
}

// ============================================================================
// Sentence stages
// ============================================================================

/// A stage that annotates sentences in place.
pub trait SentenceStage: Send + Sync {
    fn name(&self) -> &str;

    fn analyze(&self, sentences: &mut [&mut Sentence]) -> StageResult;
}

/// Morphological analysis with per-call sub-module switches.
pub trait MorphAnalyzer: Send + Sync {
    fn analyze(&self, sentences: &mut [&mut Sentence], options: &MorphoOptions) -> StageResult;
}

/// How the sense annotator is asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenseRequest {
    /// Rank senses for the selected reading only.
    pub disambiguate: bool,
    /// Duplicate readings that carry several senses.
    pub duplicate: bool,
}

impl SenseRequest {
    /// Every candidate sense of every reading, no ranking.
    pub const ALL_SENSES: SenseRequest = SenseRequest {
        disambiguate: false,
        duplicate: false,
    };
}

/// Attaches word senses to readings.
pub trait SenseAnnotator: Send + Sync {
    fn annotate(&self, sentences: &mut [&mut Sentence], request: SenseRequest) -> StageResult;

    /// Whether this instance was configured to duplicate analyses per sense.
    fn duplicates_analyses(&self) -> bool {
        false
    }
}

/// Rule-based dependency parser, built over a constituency parse. Also
/// completes partial chart-parser trees into full trees.
pub trait TreeCompleter: SentenceStage {
    fn complete_parse_tree(&self, sentences: &mut [&mut Sentence]) -> StageResult;
}

// ============================================================================
// Document stages
// ============================================================================

/// A stage that needs the whole document (coreference, semantic graph).
pub trait DocumentStage: Send + Sync {
    fn name(&self) -> &str;

    fn analyze_document(&self, document: &mut Document) -> StageResult;
}

// ============================================================================
// Language identification
// ============================================================================

pub trait LanguageIdentifier: Send + Sync {
    /// Best language code for `text`, or `"none"` when undecidable.
    fn identify(&self, text: &str) -> String;
}
