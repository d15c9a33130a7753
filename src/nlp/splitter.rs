//! Session-based sentence splitter.
//!
//! Sentence enders are either *sure* (always close a sentence) or *unsure*
//! (close it only when the next word is capitalized or a known sentence
//! starter). Marker pairs such as brackets and quotes can suppress splitting
//! between them, optionally limited to a maximum number of words.
//!
//! A session remembers how far into the caller's pending words it already
//! scanned, so a buffer that grows across calls is never rescanned and an
//! unsure ender at the very end of the buffer waits for the next word.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::errors::{AnalyzerError, Result};
use crate::pipeline::traits::{SessionId, SplitOutcome, Splitter as SplitterStage};
use crate::types::{Sentence, Word};

/// Words between markers after which a warning is logged.
const VERY_LONG: usize = 1000;

/// Splitter resource file.
///
/// ```json
/// {
///   "allow_between_markers": false,
///   "max_words": 0,
///   "markers": [["(", ")"], ["\"", "\""]],
///   "enders": { ".": false, "?": true, "!": true },
///   "starters": ["¿", "¡"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplitterRules {
    /// Allow sentence boundaries inside marker pairs.
    pub allow_between_markers: bool,
    /// Stop suppressing splits after this many words between markers
    /// (0 = no limit).
    pub max_words: usize,
    pub markers: Vec<(String, String)>,
    /// Ender form to "sure" flag.
    pub enders: FxHashMap<String, bool>,
    pub starters: FxHashSet<String>,
}

impl Default for SplitterRules {
    fn default() -> Self {
        Self {
            allow_between_markers: true,
            max_words: 0,
            markers: vec![
                ("(".into(), ")".into()),
                ("[".into(), "]".into()),
                ("\"".into(), "\"".into()),
                ("«".into(), "»".into()),
            ],
            enders: [(".", false), ("?", true), ("!", true), ("...", false), ("…", false)]
                .into_iter()
                .map(|(f, sure)| (f.to_string(), sure))
                .collect(),
            starters: ["¿", "¡", "\"", "«", "("]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Role of a marker form: opening (positive) or closing (negative) code of
/// a pair. Pairs whose open and close forms coincide toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Open(usize),
    Close(usize),
    Toggle(usize),
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    /// Stack of open marker pairs.
    open_markers: Vec<usize>,
    no_split_count: usize,
    /// Words of the caller's pending buffer already scanned.
    scanned: usize,
}

impl SessionState {
    fn between_markers(&self) -> bool {
        !self.open_markers.is_empty()
    }

    fn reset_markers(&mut self) {
        self.open_markers.clear();
        self.no_split_count = 0;
    }
}

/// Rule-based sentence splitter with per-session state.
#[derive(Debug)]
pub struct Splitter {
    rules: SplitterRules,
    markers: FxHashMap<String, Marker>,
    sessions: Mutex<FxHashMap<u64, SessionState>>,
    next_session: AtomicU64,
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new(SplitterRules::default())
    }
}

impl Splitter {
    pub fn new(rules: SplitterRules) -> Self {
        let mut markers = FxHashMap::default();
        for (idx, (open, close)) in rules.markers.iter().enumerate() {
            if open == close {
                markers.insert(open.clone(), Marker::Toggle(idx));
            } else {
                markers.insert(open.clone(), Marker::Open(idx));
                markers.insert(close.clone(), Marker::Close(idx));
            }
        }
        Self {
            rules,
            markers,
            sessions: Mutex::new(FxHashMap::default()),
            next_session: AtomicU64::new(1),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let load_err =
            |e: String| AnalyzerError::resource_load("splitter", path.display().to_string(), e);
        let text = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let rules: SplitterRules =
            serde_json::from_str(&text).map_err(|e| load_err(e.to_string()))?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &SplitterRules {
        &self.rules
    }

    /// Number of sessions currently open.
    pub fn open_sessions(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Split a complete word list in a throwaway session.
    pub fn split_all(&self, words: &[Word]) -> Vec<Sentence> {
        let mut state = SessionState::default();
        self.scan(&mut state, words, true).sentences
    }

    /// Whether an unsure ender at `idx` closes a sentence, or `None` when
    /// there is no following word yet.
    fn unsure_ender_closes(&self, words: &[Word], idx: usize) -> Option<bool> {
        let next = words.get(idx + 1)?;
        Some(next.starts_uppercase() || self.rules.starters.contains(&next.form))
    }

    /// Returns `true` if the marker logic consumed the word (no split check).
    fn track_markers(&self, state: &mut SessionState, word: &Word) -> bool {
        let marker = self.markers.get(&word.form).copied();
        if self.rules.allow_between_markers {
            return false;
        }

        let closes_top = match (marker, state.open_markers.last()) {
            (Some(Marker::Close(p)), Some(&top)) | (Some(Marker::Toggle(p)), Some(&top)) => {
                p == top
            }
            _ => false,
        };
        if closes_top {
            state.open_markers.pop();
            if state.between_markers() {
                state.no_split_count += 1;
            } else {
                state.no_split_count = 0;
            }
            return true;
        }

        if let Some(Marker::Open(p)) | Some(Marker::Toggle(p)) = marker {
            state.open_markers.push(p);
            state.no_split_count += 1;
            return true;
        }

        if state.between_markers() {
            state.no_split_count += 1;
            if state.no_split_count == VERY_LONG {
                tracing::warn!(
                    form = %word.form,
                    offset = word.span.start,
                    "very long sentence between markers; probable marker mismatch"
                );
            }
            return self.rules.max_words == 0 || state.no_split_count <= self.rules.max_words;
        }
        false
    }

    fn scan(&self, state: &mut SessionState, words: &[Word], flush: bool) -> SplitOutcome {
        if state.scanned > words.len() {
            *state = SessionState::default();
        }

        let mut sentences = Vec::new();
        let mut sentence_start = 0;
        let mut resume = words.len();
        let mut idx = state.scanned;

        while idx < words.len() {
            let word = &words[idx];
            let sure = self.rules.enders.get(&word.form).copied();
            let before = sure.map(|_| state.clone());

            let mut boundary = false;
            if !self.track_markers(state, word) {
                if let Some(sure) = sure {
                    boundary = if sure {
                        true
                    } else {
                        match self.unsure_ender_closes(words, idx) {
                            Some(closes) => closes,
                            None if flush => true,
                            None => {
                                // Decide once the next word arrives.
                                if let Some(before) = before {
                                    *state = before;
                                }
                                resume = idx;
                                break;
                            }
                        }
                    };
                }
            }

            if boundary {
                sentences.push(Sentence::new(words[sentence_start..=idx].to_vec()));
                sentence_start = idx + 1;
                state.reset_markers();
            }
            idx += 1;
        }

        if flush && sentence_start < words.len() {
            sentences.push(Sentence::new(words[sentence_start..].to_vec()));
            sentence_start = words.len();
            resume = words.len();
            state.reset_markers();
        }

        state.scanned = resume - sentence_start;
        SplitOutcome {
            sentences,
            consumed: sentence_start,
        }
    }
}

impl SplitterStage for Splitter {
    fn open_session(&self) -> SessionId {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(id, SessionState::default());
        }
        tracing::debug!(session = id, "splitter session opened");
        SessionId(id)
    }

    fn close_session(&self, session: SessionId) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(&session.0);
        }
        tracing::debug!(session = session.0, "splitter session closed");
    }

    fn split(&self, session: SessionId, words: &[Word], flush: bool) -> SplitOutcome {
        let mut state = self
            .sessions
            .lock()
            .ok()
            .and_then(|mut s| s.remove(&session.0))
            .unwrap_or_default();
        let outcome = self.scan(&mut state, words, flush);
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(session.0, state);
        }
        outcome
    }
}
