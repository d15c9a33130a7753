//! Analyzer: runs the stage ladder over sentences and documents.
//!
//! The [`Analyzer`] owns a [`StageSet`] built once from a
//! [`CreationConfig`], an active [`InvokeConfig`] and the
//! [`StreamingSession`] used by the incremental entry points. Every entry
//! point funnels into one generic ladder over [`SentenceUnit`], so sentence
//! lists and documents share all gating rules; documents additionally get
//! the coreference and semantic-graph steps.
//!
//! # Gating
//!
//! With `in`/`out` the input and output levels of the call:
//!
//! | Step | Runs when |
//! |------|-----------|
//! | morphology (+ all-senses, phonetics) | `in < Morpho <= out` |
//! | tagger (+ disambiguated senses, UKB, NEC) | `in < Tagged <= out` |
//! | chart parser | `in < Shallow`, `out` is `Shallow`/`Parsed`, or `out >= Dep` with Txala |
//! | parse-tree completion | `in < Parsed`, `out == Parsed`, or `out > Parsed` with Txala |
//! | dependencies | Treeler, else LSTM, else Txala; coref forces a statistical parser |
//! | SRL | `in < Srl`, coref requested and present, or `out >= Srl` with SRL selected |
//! | coreference (documents) | `in < Coref <= out` |
//! | semantic graph (documents) | `out >= SemGraph` |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{AnalyzerError, Result};
use crate::nlp::line_reader::SafeLineReader;
use crate::pipeline::config::{
    CreationConfig, DependencyChoice, InvokeConfig, SrlChoice, TaggerChoice, WsdMode,
};
use crate::pipeline::observer::{
    AnalysisObserver, NoopObserver, StageClock, StageReportBuilder, STAGE_CHART_PARSER,
    STAGE_COREF, STAGE_DEP_LSTM, STAGE_DEP_TREELER, STAGE_DEP_TXALA, STAGE_HMM_TAGGER,
    STAGE_MORPHO, STAGE_NEC, STAGE_PARSE_COMPLETION, STAGE_PHONETICS, STAGE_RELAX_TAGGER,
    STAGE_SEMGRAPH, STAGE_SENSES, STAGE_SPLIT, STAGE_SRL, STAGE_TOKENIZE, STAGE_UKB,
};
use crate::pipeline::stages::{BuiltinLoader, StageLoader, StageSet};
use crate::pipeline::streaming::StreamingSession;
use crate::pipeline::traits::{DocumentStage, SenseRequest, StageResult, Tokenizer};
use crate::pipeline::validation::{validate, Status, ValidationStatus};
use crate::types::{AnalysisLevel, Document, Paragraph, Sentence, SentenceUnit};

// ---------------------------------------------------------------------------
// Conditional tracing support
// ---------------------------------------------------------------------------

/// Enter a tracing span for a stage (when the `tracing-spans` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing-spans")]
        let _span = tracing::info_span!("analysis_stage", stage = $name).entered();
    };
}

const TEXT_INPUT_ONLY: &str = "'text' input format only accepts input analysis level 'text'";

// ============================================================================
// Analyzer
// ============================================================================

/// The pipeline orchestrator.
///
/// Whole-document and sentence-list calls take `&self` and keep no state
/// between calls. Incremental calls take `&mut self` and advance the
/// instance's streaming state.
pub struct Analyzer {
    creation: Arc<CreationConfig>,
    stages: StageSet,
    invoke: InvokeConfig,
    stream: StreamingSession,
    cancel: Option<Arc<AtomicBool>>,
}

impl Analyzer {
    /// Build the stages `creation` declares with the reference loader. The
    /// active invocation starts inactive (`Text` to `Text`); set one with
    /// [`Analyzer::set_invoke_config`].
    pub fn new(creation: CreationConfig) -> Result<Self> {
        Self::with_loader(creation, &BuiltinLoader)
    }

    pub fn with_loader(creation: CreationConfig, loader: &dyn StageLoader) -> Result<Self> {
        Self::with_invoke(creation, loader, InvokeConfig::inactive())
    }

    /// Build the stages and install `invoke` as the active configuration.
    /// Fails on any load error or if `invoke` does not validate.
    pub fn with_invoke(
        creation: CreationConfig,
        loader: &dyn StageLoader,
        invoke: InvokeConfig,
    ) -> Result<Self> {
        let stages = StageSet::load(&creation, loader)?;
        let stream = StreamingSession::new(stages.splitter.clone());
        let mut analyzer = Self {
            creation: Arc::new(creation),
            stages,
            invoke: InvokeConfig::inactive(),
            stream,
            cancel: None,
        };
        analyzer.set_invoke_config(invoke)?;
        Ok(analyzer)
    }

    /// A new analyzer sharing this one's loaded stages, with the same active
    /// invocation and fresh streaming state.
    pub fn fork(&self) -> Self {
        Self {
            creation: Arc::clone(&self.creation),
            stages: self.stages.clone(),
            invoke: self.invoke.clone(),
            stream: StreamingSession::new(self.stages.splitter.clone()),
            cancel: None,
        }
    }

    pub fn creation_config(&self) -> &CreationConfig {
        &self.creation
    }

    pub fn stages(&self) -> &StageSet {
        &self.stages
    }

    pub fn stream(&self) -> &StreamingSession {
        &self.stream
    }

    pub fn invoke_config(&self) -> &InvokeConfig {
        &self.invoke
    }

    /// Validate `cfg` against the loaded stages and make it the active
    /// configuration. An Error status refuses it and keeps the previous one;
    /// a Warning is logged and returned.
    pub fn set_invoke_config(&mut self, cfg: InvokeConfig) -> Result<ValidationStatus> {
        let status = self.check(&cfg)?;
        self.invoke = cfg;
        Ok(status)
    }

    /// Cooperative cancellation: once `flag` is set, calls fail with
    /// [`AnalyzerError::Cancelled`] at the next stage boundary.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    fn check(&self, cfg: &InvokeConfig) -> Result<ValidationStatus> {
        let status = validate(&self.stages, cfg);
        match status.status {
            Status::Error => return Err(AnalyzerError::invalid_config(status.description)),
            Status::Warning => warn!(
                input = %cfg.input_level,
                output = %cfg.output_level,
                "{}",
                status.description
            ),
            Status::Ok => {}
        }
        Ok(status)
    }

    /// The configuration for one call: the override after validation, or
    /// the active one.
    fn resolve<'a>(&'a self, cfg: Option<&'a InvokeConfig>) -> Result<&'a InvokeConfig> {
        match cfg {
            Some(cfg) => {
                self.check(cfg)?;
                Ok(cfg)
            }
            None => Ok(&self.invoke),
        }
    }

    fn ladder<'a>(&'a self, observer: &'a mut dyn AnalysisObserver) -> Ladder<'a> {
        Ladder {
            stages: &self.stages,
            observer,
            cancel: self.cancel.as_deref(),
        }
    }

    // ─── Already tokenized input ────────────────────────────────────────────

    /// Run the ladder over a sentence list. Coreference and the semantic
    /// graph never run here.
    pub fn analyze_sentences(
        &self,
        sentences: &mut Vec<Sentence>,
        cfg: Option<&InvokeConfig>,
    ) -> Result<()> {
        self.analyze_sentences_with_observer(sentences, cfg, &mut NoopObserver)
    }

    pub fn analyze_sentences_with_observer(
        &self,
        sentences: &mut Vec<Sentence>,
        cfg: Option<&InvokeConfig>,
        observer: &mut dyn AnalysisObserver,
    ) -> Result<()> {
        let cfg = self.resolve(cfg)?;
        self.ladder(observer).run(sentences, cfg)
    }

    /// Run the ladder over a document, then the document-only stages.
    pub fn analyze_document(&self, doc: &mut Document, cfg: Option<&InvokeConfig>) -> Result<()> {
        self.analyze_document_with_observer(doc, cfg, &mut NoopObserver)
    }

    pub fn analyze_document_with_observer(
        &self,
        doc: &mut Document,
        cfg: Option<&InvokeConfig>,
        observer: &mut dyn AnalysisObserver,
    ) -> Result<()> {
        let cfg = self.resolve(cfg)?;
        self.ladder(observer).run_document(doc, cfg)
    }

    // ─── Raw text ───────────────────────────────────────────────────────────

    /// Analyze a self-contained text. Uses its own segmentation session and
    /// counters; the streaming state is not touched.
    ///
    /// With `paragraphs`, blank lines separate paragraphs and paragraphs
    /// left empty are dropped; otherwise the text is one paragraph.
    pub fn analyze_text(
        &self,
        text: &str,
        paragraphs: bool,
        cfg: Option<&InvokeConfig>,
    ) -> Result<Document> {
        self.analyze_text_with_observer(text, paragraphs, cfg, &mut NoopObserver)
    }

    pub fn analyze_text_with_observer(
        &self,
        text: &str,
        paragraphs: bool,
        cfg: Option<&InvokeConfig>,
        observer: &mut dyn AnalysisObserver,
    ) -> Result<Document> {
        let cfg = self.resolve(cfg)?;
        ensure_text_input(cfg)?;
        if cfg.output_level < AnalysisLevel::Token {
            return Ok(Document::default());
        }
        let tokenizer = self.tokenizer()?;
        let split = cfg.output_level >= AnalysisLevel::Splitted;
        let mut stream =
            StreamingSession::new(if split { self.stages.splitter.clone() } else { None });
        let mut ladder = self.ladder(observer);
        let mut doc = Document::default();

        if paragraphs {
            let mut current: Vec<Sentence> = Vec::new();
            for line in SafeLineReader::from_text(text) {
                if line.is_blank() {
                    current.extend(ladder.close(&mut stream, split)?);
                    push_paragraph(&mut doc, std::mem::take(&mut current));
                    continue;
                }
                stream.advance_to(line.start);
                ladder.tokenize(&mut stream, tokenizer, &line.text)?;
                if split {
                    current.extend(ladder.split(&mut stream, false)?);
                }
            }
            current.extend(ladder.close(&mut stream, split)?);
            push_paragraph(&mut doc, current);
        } else {
            ladder.tokenize(&mut stream, tokenizer, text)?;
            let sentences = ladder.close(&mut stream, split)?;
            push_paragraph(&mut doc, sentences);
        }

        ladder.run_document(&mut doc, cfg)?;
        Ok(doc)
    }

    // ─── Streaming ──────────────────────────────────────────────────────────

    /// Feed one chunk of a stream. Returns the sentences the chunk closed,
    /// analyzed up to the output level; words of a sentence still open stay
    /// pending for the next call. With `flush`, everything pending closes.
    ///
    /// At output level `Token` nothing is split: every pending word comes
    /// back as one sentence.
    pub fn analyze_incremental(
        &mut self,
        text: &str,
        flush: bool,
        cfg: Option<&InvokeConfig>,
    ) -> Result<Vec<Sentence>> {
        self.analyze_incremental_with_observer(text, flush, cfg, &mut NoopObserver)
    }

    pub fn analyze_incremental_with_observer(
        &mut self,
        text: &str,
        flush: bool,
        cfg: Option<&InvokeConfig>,
        observer: &mut dyn AnalysisObserver,
    ) -> Result<Vec<Sentence>> {
        if let Some(cfg) = cfg {
            self.check(cfg)?;
        }
        let Self {
            stages,
            invoke,
            stream,
            cancel,
            ..
        } = self;
        let cfg = cfg.unwrap_or(&*invoke);
        ensure_text_input(cfg)?;
        if cfg.output_level < AnalysisLevel::Token {
            return Ok(Vec::new());
        }
        let tokenizer = stages.tokenizer.as_deref().ok_or_else(missing_tokenizer)?;
        let mut ladder = Ladder {
            stages: &*stages,
            observer,
            cancel: cancel.as_deref(),
        };

        ladder.tokenize(stream, tokenizer, text)?;
        let mut sentences = if cfg.output_level == AnalysisLevel::Token {
            stream.take_pending().into_iter().collect()
        } else {
            ladder.split(stream, flush)?
        };
        ladder.run(&mut sentences, cfg)?;
        Ok(sentences)
    }

    /// Close and return whatever is pending. Same as
    /// `analyze_incremental("", true, None)`.
    pub fn flush_pending(&mut self) -> Result<Vec<Sentence>> {
        self.analyze_incremental("", true, None)
    }

    /// Rewind the stream offset and sentence counter for a new, unrelated
    /// input. The segmentation session is kept.
    pub fn reset_stream(&mut self) {
        debug!(
            offset = self.stream.offset(),
            next_sentence_id = self.stream.next_sentence_id(),
            "resetting stream counters"
        );
        self.stream.reset();
    }

    // ─── Language identification ────────────────────────────────────────────

    /// Identify the language of `text`. Separate from the ladder.
    pub fn identify_language(&self, text: &str) -> Result<String> {
        let ident = self.stages.ident.as_deref().ok_or_else(|| {
            AnalyzerError::invalid_config(
                "Language identification requested, but it was not instantiated in config options.",
            )
        })?;
        Ok(ident.identify(text))
    }

    fn tokenizer(&self) -> Result<&dyn Tokenizer> {
        self.stages.tokenizer.as_deref().ok_or_else(missing_tokenizer)
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("lang", &self.creation.lang)
            .field("stages", &self.stages)
            .field("invoke", &self.invoke)
            .field("stream", &self.stream)
            .finish()
    }
}

fn ensure_text_input(cfg: &InvokeConfig) -> Result<()> {
    if cfg.input_level != AnalysisLevel::Text {
        return Err(AnalyzerError::invalid_config(TEXT_INPUT_ONLY));
    }
    Ok(())
}

fn missing_tokenizer() -> AnalyzerError {
    AnalyzerError::invalid_config("Tokenizer requested, but it was not instantiated in config options.")
}

fn push_paragraph(doc: &mut Document, sentences: Vec<Sentence>) {
    if !sentences.is_empty() {
        doc.paragraphs.push(Paragraph::new(sentences));
    }
}

// ============================================================================
// Ladder
// ============================================================================

/// One call's view of the stages, with its observer and cancel flag.
struct Ladder<'a> {
    stages: &'a StageSet,
    observer: &'a mut dyn AnalysisObserver,
    cancel: Option<&'a AtomicBool>,
}

impl Ladder<'_> {
    fn enter(&mut self, stage: &'static str) -> Result<StageClock> {
        if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Err(AnalyzerError::cancelled(stage));
        }
        debug!(stage, "running stage");
        self.observer.on_stage_start(stage);
        Ok(StageClock::start())
    }

    fn leave(&mut self, stage: &'static str, clock: StageClock, sentences: usize, words: usize) {
        let report = StageReportBuilder::new(clock.elapsed())
            .sentences(sentences)
            .words(words)
            .build();
        self.observer.on_stage_end(stage, &report);
    }

    fn sentence_stage(
        &mut self,
        stage: &'static str,
        sentences: &mut [&mut Sentence],
        f: impl FnOnce(&mut [&mut Sentence]) -> StageResult,
    ) -> Result<()> {
        trace_stage!(stage);
        let clock = self.enter(stage)?;
        f(sentences)?;
        let words = sentences.iter().map(|s| s.len()).sum();
        self.leave(stage, clock, sentences.len(), words);
        Ok(())
    }

    fn document_stage(
        &mut self,
        stage: &'static str,
        module: &dyn DocumentStage,
        doc: &mut Document,
    ) -> Result<()> {
        trace_stage!(stage);
        let clock = self.enter(stage)?;
        module.analyze_document(doc)?;
        self.leave(stage, clock, doc.sentence_count(), doc.word_count());
        Ok(())
    }

    fn tokenize(
        &mut self,
        stream: &mut StreamingSession,
        tokenizer: &dyn Tokenizer,
        text: &str,
    ) -> Result<()> {
        let clock = self.enter(STAGE_TOKENIZE)?;
        let before = stream.pending().len();
        stream.push_text(tokenizer, text);
        let added = stream.pending().len() - before;
        self.leave(STAGE_TOKENIZE, clock, 0, added);
        Ok(())
    }

    fn split(&mut self, stream: &mut StreamingSession, flush: bool) -> Result<Vec<Sentence>> {
        let clock = self.enter(STAGE_SPLIT)?;
        let sentences = stream.split(flush);
        let words = sentences.iter().map(Sentence::len).sum();
        self.leave(STAGE_SPLIT, clock, sentences.len(), words);
        Ok(sentences)
    }

    /// Close a whole-document paragraph: split with flush, or take every
    /// pending word as one sentence when not splitting.
    fn close(&mut self, stream: &mut StreamingSession, split: bool) -> Result<Vec<Sentence>> {
        if split {
            self.split(stream, true)
        } else {
            Ok(stream.take_pending().into_iter().collect())
        }
    }

    /// The ladder over a document, then coreference and the semantic graph.
    fn run_document(&mut self, doc: &mut Document, cfg: &InvokeConfig) -> Result<()> {
        use AnalysisLevel as L;

        self.run(doc, cfg)?;
        if doc.is_empty() {
            return Ok(());
        }
        let stages = self.stages;
        let (input, output) = (cfg.input_level, cfg.output_level);
        if let Some(coref) = &stages.coref {
            if input < L::Coref && output >= L::Coref {
                self.document_stage(STAGE_COREF, coref.as_ref(), doc)?;
            }
        }
        if let Some(semgraph) = &stages.semgraph {
            if output >= L::SemGraph {
                self.document_stage(STAGE_SEMGRAPH, semgraph.as_ref(), doc)?;
            }
        }
        Ok(())
    }

    /// The shared ladder. Steps run in a fixed order; each returns early
    /// once the output level is reached.
    fn run<U: SentenceUnit + ?Sized>(&mut self, unit: &mut U, cfg: &InvokeConfig) -> Result<()> {
        use AnalysisLevel as L;

        if unit.is_empty_unit() {
            return Ok(());
        }
        let mut sentences = unit.sentences_mut();
        let s: &mut [&mut Sentence] = &mut sentences;
        let stages = self.stages;
        let (input, output) = (cfg.input_level, cfg.output_level);
        let wsd = cfg.wsd != WsdMode::None;

        // Morphology
        if input < L::Morpho && output >= L::Morpho {
            if let Some(morpho) = &stages.morpho {
                self.sentence_stage(STAGE_MORPHO, s, |s| morpho.analyze(s, &cfg.morpho))?;
            }
            if wsd && output <= L::Morpho {
                if let Some(senses) = &stages.senses {
                    self.sentence_stage(STAGE_SENSES, s, |s| {
                        senses.annotate(s, SenseRequest::ALL_SENSES)
                    })?;
                }
            }
            if cfg.phonetics && output >= L::Splitted {
                if let Some(phonetics) = &stages.phonetics {
                    self.sentence_stage(STAGE_PHONETICS, s, |s| phonetics.analyze(s))?;
                }
            }
        }
        if output <= L::Morpho {
            return Ok(());
        }

        // Tagging
        if input < L::Tagged && output >= L::Tagged {
            let tagger = match cfg.tagger {
                TaggerChoice::Hmm => stages.hmm.as_ref().map(|t| (STAGE_HMM_TAGGER, t)),
                TaggerChoice::Relax => stages.relax.as_ref().map(|t| (STAGE_RELAX_TAGGER, t)),
                TaggerChoice::None => None,
            };
            if let Some((name, tagger)) = tagger {
                self.sentence_stage(name, s, |s| tagger.analyze(s))?;
            }
            if wsd {
                if let Some(senses) = &stages.senses {
                    if senses.duplicates_analyses() {
                        warn!("sense annotator duplicates analyses; disabled for disambiguated output");
                    }
                    let request = SenseRequest {
                        disambiguate: true,
                        duplicate: false,
                    };
                    self.sentence_stage(STAGE_SENSES, s, |s| senses.annotate(s, request))?;
                }
                if cfg.wsd == WsdMode::Ukb {
                    if let Some(ukb) = &stages.ukb {
                        self.sentence_stage(STAGE_UKB, s, |s| ukb.analyze(s))?;
                    }
                }
            }
            if cfg.nec {
                if let Some(nec) = &stages.nec {
                    self.sentence_stage(STAGE_NEC, s, |s| nec.analyze(s))?;
                }
            }
        }
        if output == L::Tagged {
            return Ok(());
        }

        let txala_selected = cfg.dependency == DependencyChoice::Txala;

        // Constituency parsing
        if let Some(parser) = &stages.chart_parser {
            if input < L::Shallow
                && (output == L::Shallow
                    || output == L::Parsed
                    || (output >= L::Dep && txala_selected))
            {
                self.sentence_stage(STAGE_CHART_PARSER, s, |s| parser.analyze(s))?;
            }
        }
        if output == L::Shallow {
            return Ok(());
        }

        // Parse-tree completion
        if let Some(txala) = &stages.txala {
            if input < L::Parsed
                && (output == L::Parsed || (output > L::Parsed && txala_selected))
            {
                self.sentence_stage(STAGE_PARSE_COMPLETION, s, |s| txala.complete_parse_tree(s))?;
            }
        }
        if output == L::Parsed {
            return Ok(());
        }

        self.dependencies(s, cfg)?;
        if output == L::Dep {
            return Ok(());
        }

        // Semantic roles
        if let Some(srl) = &stages.srl {
            let coref_implied = output >= L::Coref && stages.coref.is_some();
            let selected = output >= L::Srl && cfg.srl == SrlChoice::Treeler;
            if input < L::Srl && (coref_implied || selected) {
                self.sentence_stage(STAGE_SRL, s, |s| srl.analyze(s))?;
            }
        }
        Ok(())
    }

    /// Dependency parsing, first match wins: Treeler, then LSTM, then Txala.
    ///
    /// When coreference is requested and a resolver exists, a statistical
    /// parser runs even if Txala is the selected algorithm.
    fn dependencies(&mut self, s: &mut [&mut Sentence], cfg: &InvokeConfig) -> Result<()> {
        use AnalysisLevel as L;

        let stages = self.stages;
        let (input, output) = (cfg.input_level, cfg.output_level);
        if input >= L::Dep {
            return Ok(());
        }
        let coref_implied = output >= L::Coref && stages.coref.is_some();
        let wants = |choice: DependencyChoice| {
            coref_implied || (output >= L::Dep && cfg.dependency == choice)
        };

        if let (Some(treeler), true) = (&stages.treeler, wants(DependencyChoice::Treeler)) {
            self.sentence_stage(STAGE_DEP_TREELER, s, |s| treeler.analyze(s))
        } else if let (Some(lstm), true) = (&stages.lstm, wants(DependencyChoice::Lstm)) {
            self.sentence_stage(STAGE_DEP_LSTM, s, |s| lstm.analyze(s))
        } else if let (Some(txala), true) = (
            &stages.txala,
            output >= L::Dep && cfg.dependency == DependencyChoice::Txala,
        ) {
            self.sentence_stage(STAGE_DEP_TXALA, s, |s| txala.analyze(s))
        } else {
            Ok(())
        }
    }
}
