//! Two-phase analyzer configuration.
//!
//! A [`CreationConfig`] fixes which stages exist for the lifetime of an
//! analyzer: every optional stage is either a resource path or nothing.
//! An [`InvokeConfig`] selects, per call, the input and output depth and the
//! alternative implementation to use where more than one is available.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "creation": {
//!     "lang": "en",
//!     "tokenizer_file": "builtin",
//!     "splitter_file": "$DATA/en/splitter.json",
//!     "morpho": { "dictionary_file": "builtin" },
//!     "tagger": { "hmm_file": "builtin" }
//!   },
//!   "invoke": { "output_level": "tagged", "tagger": "hmm" },
//!   "strict": false
//! }
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AnalyzerError, Result};
use crate::types::AnalysisLevel;

// ─── Algorithm choices ──────────────────────────────────────────────────────

macro_rules! choice_names {
    ($ty:ident { $($variant:ident => $name:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = AnalyzerError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_lowercase().as_str() {
                    $($name $(| $alias)* => Ok($ty::$variant),)+
                    other => Err(AnalyzerError::invalid_config(format!(
                        concat!("Unknown ", stringify!($ty), " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

/// Part-of-speech tagger implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggerChoice {
    #[serde(alias = "no")]
    None,
    #[default]
    Hmm,
    Relax,
}

choice_names!(TaggerChoice { None => "none" | "no", Hmm => "hmm", Relax => "relax" });

/// Dependency parser implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyChoice {
    #[default]
    #[serde(alias = "no")]
    None,
    /// Rule-based, built over the constituency parse.
    Txala,
    /// Statistical graph-based parser.
    Treeler,
    Lstm,
}

choice_names!(DependencyChoice {
    None => "none" | "no",
    Txala => "txala",
    Treeler => "treeler",
    Lstm => "lstm",
});

/// Semantic-role labeler implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SrlChoice {
    #[default]
    #[serde(alias = "no")]
    None,
    Treeler,
}

choice_names!(SrlChoice { None => "none" | "no", Treeler => "treeler" });

/// Word-sense annotation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WsdMode {
    #[default]
    #[serde(alias = "no")]
    None,
    /// Every candidate sense, unranked.
    All,
    /// Most frequent sense first.
    Mfs,
    /// Graph-based disambiguation after tagging.
    Ukb,
}

choice_names!(WsdMode { None => "none" | "no", All => "all", Mfs => "mfs", Ukb => "ukb" });

/// When the tagger must leave exactly one reading per word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceSelect {
    #[serde(alias = "no")]
    None,
    #[default]
    Tagger,
    Retok,
}

choice_names!(ForceSelect { None => "none" | "no", Tagger => "tagger", Retok => "retok" });

// ─── Stage kinds ────────────────────────────────────────────────────────────

/// Every stage an analyzer may instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    LanguageIdent,
    Tokenizer,
    Splitter,
    Morpho,
    Phonetics,
    Nec,
    Senses,
    Ukb,
    HmmTagger,
    RelaxTagger,
    ChartParser,
    Txala,
    Treeler,
    Lstm,
    SrlTreeler,
    Coref,
    SemGraph,
}

impl StageKind {
    pub const ALL: [StageKind; 17] = [
        StageKind::LanguageIdent,
        StageKind::Tokenizer,
        StageKind::Splitter,
        StageKind::Morpho,
        StageKind::Phonetics,
        StageKind::Nec,
        StageKind::Senses,
        StageKind::Ukb,
        StageKind::HmmTagger,
        StageKind::RelaxTagger,
        StageKind::ChartParser,
        StageKind::Txala,
        StageKind::Treeler,
        StageKind::Lstm,
        StageKind::SrlTreeler,
        StageKind::Coref,
        StageKind::SemGraph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::LanguageIdent => "language_ident",
            StageKind::Tokenizer => "tokenizer",
            StageKind::Splitter => "splitter",
            StageKind::Morpho => "morpho",
            StageKind::Phonetics => "phonetics",
            StageKind::Nec => "nec",
            StageKind::Senses => "senses",
            StageKind::Ukb => "ukb",
            StageKind::HmmTagger => "hmm_tagger",
            StageKind::RelaxTagger => "relax_tagger",
            StageKind::ChartParser => "chart_parser",
            StageKind::Txala => "dep_txala",
            StageKind::Treeler => "dep_treeler",
            StageKind::Lstm => "dep_lstm",
            StageKind::SrlTreeler => "srl_treeler",
            StageKind::Coref => "coref",
            StageKind::SemGraph => "semgraph",
        }
    }
}

/// Answers "was this stage instantiated?".
///
/// Implemented by [`CreationConfig`] (what will be built) and by
/// [`super::stages::StageSet`] (what was built), so that validation runs the
/// same way against either.
pub trait StagePresence {
    fn has(&self, kind: StageKind) -> bool;
}

// ─── Creation config ────────────────────────────────────────────────────────

/// Morphological analyzer resources and fixed options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphoResources {
    pub decimal: String,
    pub thousand: String,
    pub user_map_file: Option<String>,
    pub locutions_file: Option<String>,
    pub quantities_file: Option<String>,
    pub affix_file: Option<String>,
    pub probability_file: Option<String>,
    pub dictionary_file: Option<String>,
    pub np_data_file: Option<String>,
    pub punctuation_file: Option<String>,
    pub compound_file: Option<String>,
    /// Threshold for unknown-word tag guesses.
    pub probability_threshold: f64,
}

impl Default for MorphoResources {
    fn default() -> Self {
        Self {
            decimal: ".".to_string(),
            thousand: ",".to_string(),
            user_map_file: None,
            locutions_file: None,
            quantities_file: None,
            affix_file: None,
            probability_file: None,
            dictionary_file: None,
            np_data_file: None,
            punctuation_file: None,
            compound_file: None,
            probability_threshold: 0.001,
        }
    }
}

impl MorphoResources {
    fn files_mut(&mut self) -> [&mut Option<String>; 9] {
        [
            &mut self.user_map_file,
            &mut self.locutions_file,
            &mut self.quantities_file,
            &mut self.affix_file,
            &mut self.probability_file,
            &mut self.dictionary_file,
            &mut self.np_data_file,
            &mut self.punctuation_file,
            &mut self.compound_file,
        ]
    }

    /// Morphology exists as soon as any of its resources is configured.
    pub fn has_any_file(&self) -> bool {
        [
            &self.user_map_file,
            &self.locutions_file,
            &self.quantities_file,
            &self.affix_file,
            &self.probability_file,
            &self.dictionary_file,
            &self.np_data_file,
            &self.punctuation_file,
            &self.compound_file,
        ]
        .iter()
        .any(|f| f.is_some())
    }
}

/// Tagger models and their fixed options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerResources {
    pub hmm_file: Option<String>,
    pub relax_file: Option<String>,
    pub relax_max_iter: usize,
    pub relax_scale_factor: f64,
    pub relax_epsilon: f64,
    pub retokenize: bool,
    pub kbest: usize,
    pub force_select: ForceSelect,
}

impl Default for TaggerResources {
    fn default() -> Self {
        Self {
            hmm_file: None,
            relax_file: None,
            relax_max_iter: 500,
            relax_scale_factor: 67.0,
            relax_epsilon: 0.001,
            retokenize: true,
            kbest: 1,
            force_select: ForceSelect::Tagger,
        }
    }
}

/// What exists: one optional resource per stage. Immutable once an analyzer
/// is built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreationConfig {
    pub lang: String,
    pub ident_file: Option<String>,
    pub tokenizer_file: Option<String>,
    pub splitter_file: Option<String>,
    pub morpho: MorphoResources,
    pub phonetics_file: Option<String>,
    pub nec_file: Option<String>,
    pub sense_file: Option<String>,
    pub ukb_file: Option<String>,
    pub tagger: TaggerResources,
    pub grammar_file: Option<String>,
    pub txala_file: Option<String>,
    pub treeler_file: Option<String>,
    pub lstm_file: Option<String>,
    pub srl_file: Option<String>,
    pub coref_file: Option<String>,
    pub semgraph_file: Option<String>,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl Default for CreationConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            ident_file: None,
            tokenizer_file: None,
            splitter_file: None,
            morpho: MorphoResources::default(),
            phonetics_file: None,
            nec_file: None,
            sense_file: None,
            ukb_file: None,
            tagger: TaggerResources::default(),
            grammar_file: None,
            txala_file: None,
            treeler_file: None,
            lstm_file: None,
            srl_file: None,
            coref_file: None,
            semgraph_file: None,
            unknown_fields: HashMap::new(),
        }
    }
}

impl CreationConfig {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            ..Default::default()
        }
    }

    /// Configuration for the reference stages shipped with the crate:
    /// tokenizer, splitter, morphology and the HMM slot.
    pub fn builtin(lang: impl Into<String>) -> Self {
        let mut cfg = Self::new(lang);
        cfg.tokenizer_file = Some(super::stages::BUILTIN_RESOURCE.to_string());
        cfg.splitter_file = Some(super::stages::BUILTIN_RESOURCE.to_string());
        cfg.morpho.dictionary_file = Some(super::stages::BUILTIN_RESOURCE.to_string());
        cfg.tagger.hmm_file = Some(super::stages::BUILTIN_RESOURCE.to_string());
        cfg
    }

    /// Resource path configured for `kind`, if any.
    ///
    /// Morphology reports its dictionary (or first configured file); Txala
    /// reports its own file only when the grammar is configured too.
    pub fn resource(&self, kind: StageKind) -> Option<&str> {
        let path = match kind {
            StageKind::LanguageIdent => &self.ident_file,
            StageKind::Tokenizer => &self.tokenizer_file,
            StageKind::Splitter => &self.splitter_file,
            StageKind::Morpho => {
                return [
                    &self.morpho.dictionary_file,
                    &self.morpho.affix_file,
                    &self.morpho.probability_file,
                    &self.morpho.locutions_file,
                    &self.morpho.quantities_file,
                    &self.morpho.np_data_file,
                    &self.morpho.punctuation_file,
                    &self.morpho.compound_file,
                    &self.morpho.user_map_file,
                ]
                .into_iter()
                .find_map(|f| f.as_deref())
            }
            StageKind::Phonetics => &self.phonetics_file,
            StageKind::Nec => &self.nec_file,
            StageKind::Senses => &self.sense_file,
            StageKind::Ukb => &self.ukb_file,
            StageKind::HmmTagger => &self.tagger.hmm_file,
            StageKind::RelaxTagger => &self.tagger.relax_file,
            StageKind::ChartParser => &self.grammar_file,
            StageKind::Txala => {
                if self.grammar_file.is_none() {
                    return None;
                }
                &self.txala_file
            }
            StageKind::Treeler => &self.treeler_file,
            StageKind::Lstm => &self.lstm_file,
            StageKind::SrlTreeler => &self.srl_file,
            StageKind::Coref => &self.coref_file,
            StageKind::SemGraph => &self.semgraph_file,
        };
        path.as_deref()
    }

    fn single_files_mut(&mut self) -> [&mut Option<String>; 16] {
        [
            &mut self.ident_file,
            &mut self.tokenizer_file,
            &mut self.splitter_file,
            &mut self.phonetics_file,
            &mut self.nec_file,
            &mut self.sense_file,
            &mut self.ukb_file,
            &mut self.tagger.hmm_file,
            &mut self.tagger.relax_file,
            &mut self.grammar_file,
            &mut self.txala_file,
            &mut self.treeler_file,
            &mut self.lstm_file,
            &mut self.srl_file,
            &mut self.coref_file,
            &mut self.semgraph_file,
        ]
    }

    /// Expand `$VAR` and `${VAR}` in every resource path.
    pub fn expand_env(&mut self) {
        for file in self.single_files_mut() {
            if let Some(path) = file.as_mut() {
                *path = expand_env_vars(path);
            }
        }
        for file in self.morpho.files_mut() {
            if let Some(path) = file.as_mut() {
                *path = expand_env_vars(path);
            }
        }
    }

    /// Human-readable listing of every option.
    pub fn dump(&self) -> String {
        fn opt(v: &Option<String>) -> &str {
            v.as_deref().unwrap_or("")
        }
        let mut out = String::new();
        let _ = writeln!(out, "lang: {}", self.lang);
        let _ = writeln!(out, "ident_file: {}", opt(&self.ident_file));
        let _ = writeln!(out, "tokenizer_file: {}", opt(&self.tokenizer_file));
        let _ = writeln!(out, "splitter_file: {}", opt(&self.splitter_file));
        let m = &self.morpho;
        let _ = writeln!(out, "morpho.decimal: {}", m.decimal);
        let _ = writeln!(out, "morpho.thousand: {}", m.thousand);
        let _ = writeln!(out, "morpho.user_map_file: {}", opt(&m.user_map_file));
        let _ = writeln!(out, "morpho.locutions_file: {}", opt(&m.locutions_file));
        let _ = writeln!(out, "morpho.quantities_file: {}", opt(&m.quantities_file));
        let _ = writeln!(out, "morpho.affix_file: {}", opt(&m.affix_file));
        let _ = writeln!(out, "morpho.probability_file: {}", opt(&m.probability_file));
        let _ = writeln!(out, "morpho.dictionary_file: {}", opt(&m.dictionary_file));
        let _ = writeln!(out, "morpho.np_data_file: {}", opt(&m.np_data_file));
        let _ = writeln!(out, "morpho.punctuation_file: {}", opt(&m.punctuation_file));
        let _ = writeln!(out, "morpho.compound_file: {}", opt(&m.compound_file));
        let _ = writeln!(out, "morpho.probability_threshold: {}", m.probability_threshold);
        let _ = writeln!(out, "phonetics_file: {}", opt(&self.phonetics_file));
        let _ = writeln!(out, "nec_file: {}", opt(&self.nec_file));
        let _ = writeln!(out, "sense_file: {}", opt(&self.sense_file));
        let _ = writeln!(out, "ukb_file: {}", opt(&self.ukb_file));
        let t = &self.tagger;
        let _ = writeln!(out, "tagger.hmm_file: {}", opt(&t.hmm_file));
        let _ = writeln!(out, "tagger.relax_file: {}", opt(&t.relax_file));
        let _ = writeln!(out, "tagger.relax_max_iter: {}", t.relax_max_iter);
        let _ = writeln!(out, "tagger.relax_scale_factor: {}", t.relax_scale_factor);
        let _ = writeln!(out, "tagger.relax_epsilon: {}", t.relax_epsilon);
        let _ = writeln!(out, "tagger.retokenize: {}", t.retokenize);
        let _ = writeln!(out, "tagger.kbest: {}", t.kbest);
        let _ = writeln!(out, "tagger.force_select: {}", t.force_select);
        let _ = writeln!(out, "grammar_file: {}", opt(&self.grammar_file));
        let _ = writeln!(out, "txala_file: {}", opt(&self.txala_file));
        let _ = writeln!(out, "treeler_file: {}", opt(&self.treeler_file));
        let _ = writeln!(out, "lstm_file: {}", opt(&self.lstm_file));
        let _ = writeln!(out, "srl_file: {}", opt(&self.srl_file));
        let _ = writeln!(out, "coref_file: {}", opt(&self.coref_file));
        let _ = writeln!(out, "semgraph_file: {}", opt(&self.semgraph_file));
        out
    }
}

impl StagePresence for CreationConfig {
    fn has(&self, kind: StageKind) -> bool {
        self.resource(kind).is_some()
    }
}

/// Expand `$VAR` and `${VAR}` from the process environment. Unset variables
/// expand to the empty string; a lone `$` is kept.
pub fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            if !closed {
                out.push_str("${");
                out.push_str(&name);
                continue;
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
        }
        if name.is_empty() {
            out.push('$');
        } else {
            out.push_str(&std::env::var(&name).unwrap_or_default());
        }
    }
    out
}

// ─── Invoke config ──────────────────────────────────────────────────────────

/// Morphological sub-module switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphoOptions {
    pub user_map: bool,
    pub affix_analysis: bool,
    pub multiwords_detection: bool,
    pub numbers_detection: bool,
    pub punctuation_detection: bool,
    pub dates_detection: bool,
    pub quantities_detection: bool,
    pub dictionary_search: bool,
    pub probability_assignment: bool,
    pub compound_analysis: bool,
    pub ne_recognition: bool,
    pub retok_contractions: bool,
}

impl Default for MorphoOptions {
    fn default() -> Self {
        Self {
            user_map: false,
            affix_analysis: true,
            multiwords_detection: true,
            numbers_detection: true,
            punctuation_detection: true,
            dates_detection: true,
            quantities_detection: true,
            dictionary_search: true,
            probability_assignment: true,
            compound_analysis: true,
            ne_recognition: true,
            retok_contractions: true,
        }
    }
}

impl MorphoOptions {
    /// Every switch off.
    pub fn none() -> Self {
        Self {
            user_map: false,
            affix_analysis: false,
            multiwords_detection: false,
            numbers_detection: false,
            punctuation_detection: false,
            dates_detection: false,
            quantities_detection: false,
            dictionary_search: false,
            probability_assignment: false,
            compound_analysis: false,
            ne_recognition: false,
            retok_contractions: false,
        }
    }
}

/// What to use on a given call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokeConfig {
    pub input_level: AnalysisLevel,
    pub output_level: AnalysisLevel,
    pub morpho: MorphoOptions,
    pub phonetics: bool,
    pub nec: bool,
    pub wsd: WsdMode,
    pub tagger: TaggerChoice,
    pub dependency: DependencyChoice,
    pub srl: SrlChoice,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self {
            input_level: AnalysisLevel::Text,
            output_level: AnalysisLevel::Tagged,
            morpho: MorphoOptions::default(),
            phonetics: false,
            nec: false,
            wsd: WsdMode::None,
            tagger: TaggerChoice::Hmm,
            dependency: DependencyChoice::None,
            srl: SrlChoice::None,
            unknown_fields: HashMap::new(),
        }
    }
}

impl InvokeConfig {
    /// A configuration that does nothing: input and output both `Text`,
    /// every switch off. Valid against any set of stages.
    pub fn inactive() -> Self {
        Self {
            input_level: AnalysisLevel::Text,
            output_level: AnalysisLevel::Text,
            morpho: MorphoOptions::none(),
            tagger: TaggerChoice::None,
            ..Default::default()
        }
    }

    pub fn with_levels(mut self, input: AnalysisLevel, output: AnalysisLevel) -> Self {
        self.input_level = input;
        self.output_level = output;
        self
    }

    pub fn with_output(mut self, output: AnalysisLevel) -> Self {
        self.output_level = output;
        self
    }

    pub fn with_tagger(mut self, tagger: TaggerChoice) -> Self {
        self.tagger = tagger;
        self
    }

    pub fn with_dependency(mut self, dependency: DependencyChoice) -> Self {
        self.dependency = dependency;
        self
    }

    pub fn with_srl(mut self, srl: SrlChoice) -> Self {
        self.srl = srl;
        self
    }

    pub fn with_wsd(mut self, wsd: WsdMode) -> Self {
        self.wsd = wsd;
        self
    }

    pub fn with_nec(mut self, nec: bool) -> Self {
        self.nec = nec;
        self
    }

    pub fn with_phonetics(mut self, phonetics: bool) -> Self {
        self.phonetics = phonetics;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "input_level: {}", self.input_level);
        let _ = writeln!(out, "output_level: {}", self.output_level);
        let m = &self.morpho;
        for (name, value) in [
            ("user_map", m.user_map),
            ("affix_analysis", m.affix_analysis),
            ("multiwords_detection", m.multiwords_detection),
            ("numbers_detection", m.numbers_detection),
            ("punctuation_detection", m.punctuation_detection),
            ("dates_detection", m.dates_detection),
            ("quantities_detection", m.quantities_detection),
            ("dictionary_search", m.dictionary_search),
            ("probability_assignment", m.probability_assignment),
            ("compound_analysis", m.compound_analysis),
            ("ne_recognition", m.ne_recognition),
            ("retok_contractions", m.retok_contractions),
        ] {
            let _ = writeln!(out, "morpho.{name}: {value}");
        }
        let _ = writeln!(out, "phonetics: {}", self.phonetics);
        let _ = writeln!(out, "nec: {}", self.nec);
        let _ = writeln!(out, "wsd: {}", self.wsd);
        let _ = writeln!(out, "tagger: {}", self.tagger);
        let _ = writeln!(out, "dependency: {}", self.dependency);
        let _ = writeln!(out, "srl: {}", self.srl);
        out
    }
}

// ─── Combined config file ───────────────────────────────────────────────────

/// A complete configuration document: both phases plus strictness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub creation: CreationConfig,

    #[serde(default)]
    pub invoke: InvokeConfig,

    /// If `true`, unrecognized fields are errors; if `false`, warnings.
    #[serde(default)]
    pub strict: bool,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl AnalyzerConfig {
    /// Parse a JSON document and expand environment variables in paths.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut cfg: AnalyzerConfig = serde_json::from_str(json)?;
        cfg.creation.expand_env();
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AnalyzerError::io(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_json(&text)
    }

    /// Turn on NEC and UKB disambiguation when coreference or a semantic
    /// graph is requested and their models are configured. Returns one note
    /// per change.
    pub fn adjust_for_output(&mut self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.invoke.output_level >= AnalysisLevel::Coref {
            if !self.invoke.nec && self.creation.nec_file.is_some() {
                self.invoke.nec = true;
                notes.push(
                    "NEC activated since coreference or semantic graph was requested".to_string(),
                );
            }
            if self.invoke.wsd != WsdMode::Ukb && self.creation.sense_file.is_some() {
                self.invoke.wsd = WsdMode::Ukb;
                notes.push(
                    "UKB sense disambiguation activated since coreference or semantic graph \
                     was requested"
                        .to_string(),
                );
            }
        }
        notes
    }

    /// Drop resources this invocation can never use, so the analyzer does not
    /// load them.
    pub fn prune_unused(&mut self) {
        use AnalysisLevel as L;
        let inv = &self.invoke;
        let (input, output) = (inv.input_level, inv.output_level);
        let c = &mut self.creation;

        if input > L::Token || output < L::Token {
            c.tokenizer_file = None;
        }
        if input > L::Splitted || output < L::Splitted {
            c.splitter_file = None;
        }
        let tagging = input <= L::Tagged && output >= L::Tagged;
        if inv.tagger != TaggerChoice::Hmm || !tagging {
            c.tagger.hmm_file = None;
        }
        if inv.tagger != TaggerChoice::Relax || !tagging {
            c.tagger.relax_file = None;
        }
        if (input > L::Shallow || output < L::Shallow) && (input > L::Dep || output < L::Dep) {
            c.grammar_file = None;
        }
        if (inv.dependency != DependencyChoice::Txala && output < L::Coref)
            || input > L::Dep
            || output < L::Parsed
        {
            c.txala_file = None;
        }
        for (choice, file) in [
            (DependencyChoice::Treeler, &mut c.treeler_file),
            (DependencyChoice::Lstm, &mut c.lstm_file),
        ] {
            if (inv.dependency != choice && output < L::Coref) || input > L::Dep || output < L::Dep
            {
                *file = None;
            }
        }
        if (inv.srl != SrlChoice::Treeler && output < L::Coref) || input > L::Srl || output < L::Srl
        {
            c.srl_file = None;
        }
        if input >= L::Coref || output < L::Coref {
            c.coref_file = None;
        }
        if input >= L::SemGraph || output < L::SemGraph {
            c.semgraph_file = None;
        }
        if !inv.phonetics {
            c.phonetics_file = None;
        }
        if !inv.nec {
            c.nec_file = None;
        }
        if inv.wsd == WsdMode::None {
            c.sense_file = None;
        }
        if inv.wsd != WsdMode::Ukb {
            c.ukb_file = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_defaults() {
        let inv = InvokeConfig::default();
        assert_eq!(inv.input_level, AnalysisLevel::Text);
        assert_eq!(inv.output_level, AnalysisLevel::Tagged);
        assert_eq!(inv.tagger, TaggerChoice::Hmm);
        assert_eq!(inv.dependency, DependencyChoice::None);
        assert_eq!(inv.srl, SrlChoice::None);
        assert_eq!(inv.wsd, WsdMode::None);
        assert!(!inv.phonetics && !inv.nec);
        assert!(!inv.morpho.user_map);
        assert!(inv.morpho.ne_recognition && inv.morpho.retok_contractions);
    }

    #[test]
    fn test_inactive_does_nothing() {
        let inv = InvokeConfig::inactive();
        assert_eq!(inv.input_level, inv.output_level);
        assert_eq!(inv.tagger, TaggerChoice::None);
        assert_eq!(inv.morpho, MorphoOptions::none());
    }

    #[test]
    fn test_creation_defaults() {
        let c = CreationConfig::default();
        assert_eq!(c.morpho.probability_threshold, 0.001);
        assert_eq!(c.tagger.relax_max_iter, 500);
        assert_eq!(c.tagger.relax_scale_factor, 67.0);
        assert_eq!(c.tagger.kbest, 1);
        assert_eq!(c.tagger.force_select, ForceSelect::Tagger);
        for kind in StageKind::ALL {
            assert!(!c.has(kind), "{kind:?} should be absent");
        }
    }

    #[test]
    fn test_morpho_exists_with_any_file() {
        let mut c = CreationConfig::default();
        assert!(!c.has(StageKind::Morpho));
        c.morpho.punctuation_file = Some("punct.dat".into());
        assert!(c.has(StageKind::Morpho));
        assert_eq!(c.resource(StageKind::Morpho), Some("punct.dat"));
    }

    #[test]
    fn test_txala_requires_grammar() {
        let mut c = CreationConfig::default();
        c.txala_file = Some("dep.dat".into());
        assert!(!c.has(StageKind::Txala));
        c.grammar_file = Some("grammar.dat".into());
        assert!(c.has(StageKind::Txala));
    }

    #[test]
    fn test_choice_parsing() {
        assert_eq!("no".parse::<TaggerChoice>().unwrap(), TaggerChoice::None);
        assert_eq!("RELAX".parse::<TaggerChoice>().unwrap(), TaggerChoice::Relax);
        assert_eq!("none".parse::<WsdMode>().unwrap(), WsdMode::None);
        assert_eq!("ukb".parse::<WsdMode>().unwrap(), WsdMode::Ukb);
        assert_eq!(
            "lstm".parse::<DependencyChoice>().unwrap(),
            DependencyChoice::Lstm
        );
        assert_eq!("retok".parse::<ForceSelect>().unwrap(), ForceSelect::Retok);
        assert!("viterbi".parse::<TaggerChoice>().is_err());
    }

    #[test]
    fn test_json_config() {
        let json = r#"{
            "creation": {
                "lang": "es",
                "tokenizer_file": "tok.dat",
                "tagger": { "hmm_file": "tagger.dat", "kbest": 2 }
            },
            "invoke": { "output_level": "dep", "dependency": "treeler", "wsd": "no" },
            "strict": true
        }"#;
        let cfg = AnalyzerConfig::from_json(json).unwrap();
        assert_eq!(cfg.creation.lang, "es");
        assert_eq!(cfg.creation.tagger.kbest, 2);
        assert_eq!(cfg.creation.tagger.relax_max_iter, 500);
        assert_eq!(cfg.invoke.output_level, AnalysisLevel::Dep);
        assert_eq!(cfg.invoke.dependency, DependencyChoice::Treeler);
        assert_eq!(cfg.invoke.input_level, AnalysisLevel::Text);
        assert!(cfg.strict);
        assert!(cfg.unknown_fields.is_empty());
    }

    #[test]
    fn test_unknown_fields_captured() {
        let json = r#"{ "bogus": 1, "invoke": { "taggr": "hmm" } }"#;
        let cfg = AnalyzerConfig::from_json(json).unwrap();
        assert!(cfg.unknown_fields.contains_key("bogus"));
        assert!(cfg.invoke.unknown_fields.contains_key("taggr"));
    }

    #[test]
    fn test_env_expansion() {
        std::env::set_var("RAPID_ANALYZER_TEST_DATA", "/opt/data");
        assert_eq!(
            expand_env_vars("$RAPID_ANALYZER_TEST_DATA/en/tok.dat"),
            "/opt/data/en/tok.dat"
        );
        assert_eq!(
            expand_env_vars("${RAPID_ANALYZER_TEST_DATA}x"),
            "/opt/datax"
        );
        assert_eq!(expand_env_vars("cost$"), "cost$");
        assert_eq!(expand_env_vars("${open"), "${open");

        let mut c = CreationConfig::default();
        c.morpho.dictionary_file = Some("$RAPID_ANALYZER_TEST_DATA/dicc.src".into());
        c.splitter_file = Some("${RAPID_ANALYZER_TEST_DATA}/splitter.json".into());
        c.expand_env();
        assert_eq!(c.morpho.dictionary_file.as_deref(), Some("/opt/data/dicc.src"));
        assert_eq!(c.splitter_file.as_deref(), Some("/opt/data/splitter.json"));
    }

    #[test]
    fn test_adjust_for_coref_output() {
        let mut cfg = AnalyzerConfig::default();
        cfg.invoke.output_level = AnalysisLevel::Coref;
        cfg.creation.nec_file = Some("nec.dat".into());
        cfg.creation.sense_file = Some("senses.dat".into());
        let notes = cfg.adjust_for_output();
        assert_eq!(notes.len(), 2);
        assert!(cfg.invoke.nec);
        assert_eq!(cfg.invoke.wsd, WsdMode::Ukb);

        let mut cfg = AnalyzerConfig::default();
        cfg.creation.nec_file = Some("nec.dat".into());
        assert!(cfg.adjust_for_output().is_empty());
        assert!(!cfg.invoke.nec);
    }

    #[test]
    fn test_prune_unused() {
        let mut cfg = AnalyzerConfig {
            creation: CreationConfig::builtin("en"),
            ..Default::default()
        };
        cfg.creation.tagger.relax_file = Some("relax.dat".into());
        cfg.creation.coref_file = Some("coref.dat".into());
        cfg.creation.nec_file = Some("nec.dat".into());
        cfg.prune_unused();
        assert!(cfg.creation.tokenizer_file.is_some());
        assert!(cfg.creation.tagger.hmm_file.is_some());
        assert!(cfg.creation.tagger.relax_file.is_none());
        assert!(cfg.creation.coref_file.is_none());
        assert!(cfg.creation.nec_file.is_none());
    }

    #[test]
    fn test_dump_lists_options() {
        let dump = CreationConfig::builtin("en").dump();
        assert!(dump.contains("lang: en"));
        assert!(dump.contains("tagger.relax_max_iter: 500"));
        let dump = InvokeConfig::default().dump();
        assert!(dump.contains("output_level: tagged"));
        assert!(dump.contains("tagger: hmm"));
    }
}
