//! Function-word language identification.
//!
//! Scores a text against per-language closed-class word lists and returns
//! the language with the most hits. Ties and texts with no hits at all
//! yield `"none"`.

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::{AnalyzerError, Result};
use crate::pipeline::traits::LanguageIdentifier;

/// Returned when no language can be told apart.
pub const UNKNOWN_LANGUAGE: &str = "none";

const BUILTIN_LISTS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "of", "to", "is", "in", "that", "it", "was", "for", "with", "this",
            "are", "be", "have", "not", "you", "he", "she", "they",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "de", "que", "y", "en", "es", "un", "una", "por", "con",
            "para", "del", "se", "no", "su", "pero", "muy",
        ],
    ),
    (
        "ca",
        &[
            "el", "la", "els", "les", "de", "que", "i", "en", "és", "un", "una", "per", "amb",
            "del", "es", "no", "seu", "però", "molt", "aquest",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "de", "des", "et", "est", "un", "une", "pour", "avec", "dans",
            "que", "qui", "pas", "ne", "sur", "au", "du", "très",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "nicht", "ein", "eine", "mit", "von", "zu", "den",
            "dem", "sie", "er", "es", "auf", "für", "auch", "sehr",
        ],
    ),
    (
        "it",
        &[
            "il", "lo", "gli", "di", "che", "e", "è", "un", "una", "per", "con", "non", "sono",
            "del", "della", "si", "ma", "molto", "questo", "anche",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "as", "de", "que", "e", "é", "um", "uma", "para", "com", "não", "do",
            "da", "em", "se", "mas", "muito", "isso", "são",
        ],
    ),
];

/// Identifier resource: `{ "languages": { "xx": ["word", ...] } }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct IdentFile {
    languages: FxHashMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct StopwordIdentifier {
    languages: Vec<(String, FxHashSet<String>)>,
}

impl Default for StopwordIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StopwordIdentifier {
    pub fn new() -> Self {
        Self {
            languages: BUILTIN_LISTS
                .iter()
                .map(|(code, words)| {
                    (
                        code.to_string(),
                        words.iter().map(|w| w.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let load_err =
            |e: String| AnalyzerError::resource_load("language_ident", path.display().to_string(), e);
        let text = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let file: IdentFile = serde_json::from_str(&text).map_err(|e| load_err(e.to_string()))?;
        let mut languages: Vec<(String, FxHashSet<String>)> = file
            .languages
            .into_iter()
            .map(|(code, words)| (code, words.iter().map(|w| w.to_lowercase()).collect()))
            .collect();
        // Deterministic tie handling regardless of map order.
        languages.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Self { languages })
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|(code, _)| code.as_str())
    }

    /// Hit count per language, in list order.
    pub fn scores(&self, text: &str) -> Vec<(&str, usize)> {
        let words: Vec<String> = text.unicode_words().map(str::to_lowercase).collect();
        self.languages
            .iter()
            .map(|(code, list)| {
                let hits = words.iter().filter(|w| list.contains(w.as_str())).count();
                (code.as_str(), hits)
            })
            .collect()
    }
}

impl LanguageIdentifier for StopwordIdentifier {
    fn identify(&self, text: &str) -> String {
        let scores = self.scores(text);
        let best = scores.iter().map(|(_, n)| *n).max().unwrap_or(0);
        if best == 0 {
            return UNKNOWN_LANGUAGE.to_string();
        }
        let mut winners = scores.iter().filter(|(_, n)| *n == best);
        match (winners.next(), winners.next()) {
            (Some((code, _)), None) => code.to_string(),
            _ => UNKNOWN_LANGUAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifies_common_languages() {
        let ident = StopwordIdentifier::new();
        assert_eq!(ident.identify("The cat is on the mat and it was happy."), "en");
        assert_eq!(ident.identify("Der Hund ist nicht mit dem Ball."), "de");
        assert_eq!(ident.identify("Les enfants sont dans le jardin avec le chat."), "fr");
    }

    #[test]
    fn test_no_hits_is_unknown() {
        let ident = StopwordIdentifier::new();
        assert_eq!(ident.identify(""), UNKNOWN_LANGUAGE);
        assert_eq!(ident.identify("12345 ?!"), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_tie_is_unknown() {
        // "de" and "que" are in the es, ca, fr and pt lists alike.
        assert_eq!(StopwordIdentifier::new().identify("de que"), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_resource_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ident.json");
        std::fs::write(&path, r#"{ "languages": { "eu": ["eta", "da", "ez"] } }"#).unwrap();
        let ident = StopwordIdentifier::from_path(&path).unwrap();
        assert_eq!(ident.languages().collect::<Vec<_>>(), vec!["eu"]);
        assert_eq!(ident.identify("Hau etxea da eta ez dago"), "eu");
    }
}
