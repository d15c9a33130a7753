//! Core types for rapid_analyzer
//!
//! This module defines the analysis ladder and the linguistic data model that
//! stages enrich in place: words with candidate analyses, sentences,
//! paragraphs and documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AnalyzerError;

// ============================================================================
// Analysis levels
// ============================================================================

/// Depth of analysis, totally ordered from raw text to semantic graph.
///
/// Language identification is not a rung of this ladder; see
/// [`RequestedOutput::Ident`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisLevel {
    #[default]
    Text,
    Token,
    Splitted,
    #[serde(rename = "morfo", alias = "morpho")]
    Morpho,
    Tagged,
    #[serde(rename = "sense", alias = "senses")]
    Senses,
    Shallow,
    Parsed,
    Dep,
    Srl,
    Coref,
    SemGraph,
}

impl AnalysisLevel {
    /// Every level in ladder order.
    pub const ALL: [AnalysisLevel; 12] = [
        AnalysisLevel::Text,
        AnalysisLevel::Token,
        AnalysisLevel::Splitted,
        AnalysisLevel::Morpho,
        AnalysisLevel::Tagged,
        AnalysisLevel::Senses,
        AnalysisLevel::Shallow,
        AnalysisLevel::Parsed,
        AnalysisLevel::Dep,
        AnalysisLevel::Srl,
        AnalysisLevel::Coref,
        AnalysisLevel::SemGraph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisLevel::Text => "text",
            AnalysisLevel::Token => "token",
            AnalysisLevel::Splitted => "splitted",
            AnalysisLevel::Morpho => "morfo",
            AnalysisLevel::Tagged => "tagged",
            AnalysisLevel::Senses => "sense",
            AnalysisLevel::Shallow => "shallow",
            AnalysisLevel::Parsed => "parsed",
            AnalysisLevel::Dep => "dep",
            AnalysisLevel::Srl => "srl",
            AnalysisLevel::Coref => "coref",
            AnalysisLevel::SemGraph => "semgraph",
        }
    }

    /// Levels whose results only exist on a whole [`Document`].
    pub fn is_document_level(&self) -> bool {
        *self >= AnalysisLevel::Coref
    }
}

impl fmt::Display for AnalysisLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisLevel {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_lowercase().as_str() {
            "text" => AnalysisLevel::Text,
            "token" => AnalysisLevel::Token,
            "splitted" => AnalysisLevel::Splitted,
            "morfo" | "morpho" => AnalysisLevel::Morpho,
            "tagged" => AnalysisLevel::Tagged,
            "sense" | "senses" => AnalysisLevel::Senses,
            "shallow" => AnalysisLevel::Shallow,
            "parsed" => AnalysisLevel::Parsed,
            "dep" => AnalysisLevel::Dep,
            "srl" => AnalysisLevel::Srl,
            "coref" => AnalysisLevel::Coref,
            "semgraph" => AnalysisLevel::SemGraph,
            "ident" => {
                return Err(AnalyzerError::invalid_config(
                    "'ident' is a separate mode, not an analysis level",
                ))
            }
            other => {
                return Err(AnalyzerError::invalid_config(format!(
                    "Unknown analysis level '{other}'"
                )))
            }
        };
        Ok(level)
    }
}

/// What a front end asks for: language identification or a ladder level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RequestedOutput {
    Ident,
    Level(AnalysisLevel),
}

impl Default for RequestedOutput {
    fn default() -> Self {
        RequestedOutput::Level(AnalysisLevel::Tagged)
    }
}

impl FromStr for RequestedOutput {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ident") {
            Ok(RequestedOutput::Ident)
        } else {
            s.parse().map(RequestedOutput::Level)
        }
    }
}

impl TryFrom<String> for RequestedOutput {
    type Error = AnalyzerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RequestedOutput> for String {
    fn from(value: RequestedOutput) -> Self {
        match value {
            RequestedOutput::Ident => "ident".to_string(),
            RequestedOutput::Level(level) => level.as_str().to_string(),
        }
    }
}

// ============================================================================
// Coarse part-of-speech categories
// ============================================================================

/// Coarse word categories produced by the built-in heuristic stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Preposition,
    Conjunction,
    Interjection,
    Numeral,
    Particle,
    Punctuation,
    Symbol,
    ProperNoun,
    Other,
}

impl PosTag {
    /// Penn-style tag string written into [`Analysis::tag`].
    pub fn as_str(&self) -> &'static str {
        match self {
            PosTag::Noun => "NN",
            PosTag::Verb => "VB",
            PosTag::Adjective => "JJ",
            PosTag::Adverb => "RB",
            PosTag::Pronoun => "PRP",
            PosTag::Determiner => "DT",
            PosTag::Preposition => "IN",
            PosTag::Conjunction => "CC",
            PosTag::Interjection => "UH",
            PosTag::Numeral => "CD",
            PosTag::Particle => "RP",
            PosTag::Punctuation => "Fp",
            PosTag::Symbol => "SYM",
            PosTag::ProperNoun => "NNP",
            PosTag::Other => "X",
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "NN" | "NNS" => PosTag::Noun,
            "VB" | "VBD" | "VBG" | "VBN" | "VBP" | "VBZ" => PosTag::Verb,
            "JJ" => PosTag::Adjective,
            "RB" => PosTag::Adverb,
            "PRP" => PosTag::Pronoun,
            "DT" => PosTag::Determiner,
            "IN" => PosTag::Preposition,
            "CC" => PosTag::Conjunction,
            "UH" => PosTag::Interjection,
            "CD" => PosTag::Numeral,
            "RP" => PosTag::Particle,
            "SYM" => PosTag::Symbol,
            "NNP" | "NP" => PosTag::ProperNoun,
            t if t.starts_with('F') => PosTag::Punctuation,
            _ => PosTag::Other,
        }
    }

    pub fn is_noun(&self) -> bool {
        matches!(self, PosTag::Noun | PosTag::ProperNoun)
    }
}

// ============================================================================
// Word & Analysis
// ============================================================================

/// Character span `[start, end)` in the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Shift the span right by `delta` characters.
    pub fn shifted(self, delta: usize) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

/// A word sense with its disambiguation score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    pub id: String,
    pub score: f64,
}

/// One candidate reading of a word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub lemma: String,
    pub tag: String,
    pub prob: f64,
    /// Set by the tagger on the reading(s) it keeps.
    #[serde(default)]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub senses: Vec<Sense>,
    /// Sub-words this reading splits the word into (contractions).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retokenization: Vec<Word>,
}

impl Analysis {
    pub fn new(lemma: impl Into<String>, tag: impl Into<String>, prob: f64) -> Self {
        Self {
            lemma: lemma.into(),
            tag: tag.into(),
            prob,
            selected: false,
            senses: Vec::new(),
            retokenization: Vec::new(),
        }
    }
}

/// A token with its candidate analyses and per-word annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub form: String,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analyses: Vec<Analysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ne_class: Option<String>,
}

impl Word {
    pub fn new(form: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            form: form.into(),
            span: Span::new(start, end),
            analyses: Vec::new(),
            phonetic: None,
            ne_class: None,
        }
    }

    pub fn lowercase(&self) -> String {
        self.form.to_lowercase()
    }

    pub fn add_analysis(&mut self, analysis: Analysis) {
        self.analyses.push(analysis);
    }

    /// First selected reading, if a tagger has run.
    pub fn selected(&self) -> Option<&Analysis> {
        self.analyses.iter().find(|a| a.selected)
    }

    /// Keep only reading `idx` selected.
    pub fn select(&mut self, idx: usize) {
        for (i, a) in self.analyses.iter_mut().enumerate() {
            a.selected = i == idx;
        }
    }

    /// Tag of the selected reading, falling back to the most probable one.
    pub fn tag(&self) -> Option<&str> {
        self.selected()
            .or_else(|| self.best_analysis())
            .map(|a| a.tag.as_str())
    }

    pub fn lemma(&self) -> Option<&str> {
        self.selected()
            .or_else(|| self.best_analysis())
            .map(|a| a.lemma.as_str())
    }

    fn best_analysis(&self) -> Option<&Analysis> {
        self.analyses
            .iter()
            .max_by(|a, b| a.prob.total_cmp(&b.prob))
    }

    pub fn starts_uppercase(&self) -> bool {
        self.form
            .chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false)
    }
}

// ============================================================================
// Sentence-level structures
// ============================================================================

/// Stable sentence identifier assigned from the analyzer's counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(pub u64);

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Constituency tree node; leaves point at word positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub label: String,
    #[serde(default)]
    pub head: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>, word: usize) -> Self {
        Self {
            label: label.into(),
            head: false,
            word: Some(word),
            children: Vec::new(),
        }
    }

    pub fn node(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            head: false,
            word: None,
            children,
        }
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            usize::from(self.word.is_some())
        } else {
            self.children.iter().map(TreeNode::leaf_count).sum()
        }
    }
}

/// Dependency arc from `word` to its `head` (None for the root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub word: usize,
    pub head: Option<usize>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub word: usize,
    pub role: String,
}

/// Predicate with its semantic-role arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub word: usize,
    pub sense: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SentenceId>,
    pub words: Vec<Word>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_tree: Option<TreeNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<Predicate>,
}

impl Sentence {
    pub fn new(words: Vec<Word>) -> Self {
        Self {
            words,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Span covering every word, or `None` for an empty sentence.
    pub fn span(&self) -> Option<Span> {
        let first = self.words.first()?;
        let last = self.words.last()?;
        Some(Span::new(first.span.start, last.span.end))
    }

    pub fn forms(&self) -> Vec<&str> {
        self.words.iter().map(|w| w.form.as_str()).collect()
    }
}

// ============================================================================
// Paragraph & Document
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub sentences: Vec<Sentence>,
}

impl Paragraph {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// A reference to a run of words inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub paragraph: usize,
    pub sentence: usize,
    pub start_word: usize,
    pub end_word: usize,
}

/// Mentions that refer to the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionGroup {
    pub id: String,
    pub mentions: Vec<Mention>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEntity {
    pub id: String,
    pub lemma: String,
    #[serde(default)]
    pub mentions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFrame {
    pub id: String,
    pub predicate: String,
    /// `(role, entity or frame id)`
    #[serde(default)]
    pub arguments: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SemanticGraph {
    pub entities: Vec<GraphEntity>,
    pub frames: Vec<GraphFrame>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mention_groups: Vec<MentionGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_graph: Option<SemanticGraph>,
}

impl Document {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            ..Default::default()
        }
    }

    /// True when no paragraph holds a sentence.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(Paragraph::is_empty)
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.paragraphs.iter().flat_map(|p| p.sentences.iter())
    }

    pub fn sentence_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.sentences.len()).sum()
    }

    pub fn word_count(&self) -> usize {
        self.sentences().map(Sentence::len).sum()
    }
}

// ============================================================================
// Units the ladder runs over
// ============================================================================

/// A container of sentences the analysis ladder can run over.
pub trait SentenceUnit {
    fn is_empty_unit(&self) -> bool;

    /// Every sentence, in reading order.
    fn sentences_mut(&mut self) -> Vec<&mut Sentence>;
}

impl SentenceUnit for Vec<Sentence> {
    fn is_empty_unit(&self) -> bool {
        self.is_empty()
    }

    fn sentences_mut(&mut self) -> Vec<&mut Sentence> {
        self.iter_mut().collect()
    }
}

impl SentenceUnit for Document {
    fn is_empty_unit(&self) -> bool {
        self.is_empty()
    }

    fn sentences_mut(&mut self) -> Vec<&mut Sentence> {
        self.paragraphs
            .iter_mut()
            .flat_map(|p| p.sentences.iter_mut())
            .collect()
    }
}
