//! Unicode-aware tokenization
//!
//! UAX #29 word-boundary segmentation with punctuation kept as separate
//! tokens, whitespace dropped and an optional abbreviation list whose
//! entries keep their trailing period. Spans are character offsets.

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::{AnalyzerError, Result};
use crate::pipeline::traits;
use crate::types::Word;

const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd",
    "co", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Tokenizer resource file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TokenizerFile {
    abbreviations: Vec<String>,
}

/// A Unicode-aware tokenizer following UAX #29
#[derive(Debug, Clone)]
pub struct Tokenizer {
    abbreviations: FxHashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Tokenizer with the built-in English abbreviation list.
    pub fn new() -> Self {
        Self::with_abbreviations(DEFAULT_ABBREVIATIONS.iter().copied())
    }

    pub fn with_abbreviations<'a>(abbrevs: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            abbreviations: abbrevs.into_iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    /// Load from a JSON resource: `{ "abbreviations": ["mr", "dr", ...] }`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AnalyzerError::resource_load("tokenizer", path.display().to_string(), e.to_string())
        })?;
        let file: TokenizerFile = serde_json::from_str(&text).map_err(|e| {
            AnalyzerError::resource_load("tokenizer", path.display().to_string(), e.to_string())
        })?;
        Ok(Self::with_abbreviations(
            file.abbreviations.iter().map(String::as_str),
        ))
    }

    pub fn is_abbreviation(&self, form: &str) -> bool {
        self.abbreviations.contains(&form.to_lowercase())
    }

    /// Tokenize `text` whose first character sits at `offset`.
    pub fn tokenize_at(&self, text: &str, offset: usize) -> Vec<Word> {
        let mut words: Vec<Word> = Vec::new();
        let mut pos = offset;
        let mut segments = text.split_word_bounds().peekable();

        while let Some(segment) = segments.next() {
            let len = segment.chars().count();
            let start = pos;
            pos += len;

            if segment.chars().all(char::is_whitespace) {
                continue;
            }

            let mut form = segment.to_string();
            let mut end = pos;
            if segments.peek() == Some(&".") && self.is_abbreviation(segment) {
                segments.next();
                form.push('.');
                end += 1;
                pos += 1;
            }
            words.push(Word::new(form, start, end));
        }

        words
    }
}

impl traits::Tokenizer for Tokenizer {
    fn tokenize(&self, text: &str, offset: &mut usize) -> Vec<Word> {
        let words = self.tokenize_at(text, *offset);
        *offset += text.chars().count();
        words
    }
}
