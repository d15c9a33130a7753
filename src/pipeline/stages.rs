//! Stage instances owned by an analyzer.
//!
//! A [`StageSet`] holds one optional handle per [`StageKind`]. It is built
//! once from a [`CreationConfig`] through a [`StageLoader`]: every stage whose
//! resource is configured is loaded, every other slot stays empty for the
//! lifetime of the set. Handles are `Arc`s so that forked analyzers share the
//! loaded models.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::config::{CreationConfig, StageKind, StagePresence};
use super::traits::{
    DocumentStage, LanguageIdentifier, MorphAnalyzer, SenseAnnotator, SentenceStage, Splitter,
    Tokenizer, TreeCompleter,
};
use crate::errors::{AnalyzerError, Result};
use crate::nlp::ident::StopwordIdentifier;
use crate::nlp::morpho::HeuristicMorpho;
use crate::nlp::splitter::Splitter as RuleSplitter;
use crate::nlp::tagger::BigramTagger;
use crate::nlp::tokenizer::Tokenizer as UnicodeTokenizer;

/// Resource value that selects a built-in stage without reading a file.
pub const BUILTIN_RESOURCE: &str = "builtin";

// ============================================================================
// StageLoader
// ============================================================================

/// Builds stage instances from configured resources.
///
/// Every method receives the configured path and the whole creation config
/// (some stages need fixed options stored next to their path). The defaults
/// report the stage as unsupported, so a loader only implements what it can
/// build and construction fails loudly for anything else.
pub trait StageLoader {
    fn language_ident(
        &self,
        path: &str,
        _cfg: &CreationConfig,
    ) -> Result<Arc<dyn LanguageIdentifier>> {
        Err(unsupported(StageKind::LanguageIdent, path))
    }

    fn tokenizer(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn Tokenizer>> {
        Err(unsupported(StageKind::Tokenizer, path))
    }

    fn splitter(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn Splitter>> {
        Err(unsupported(StageKind::Splitter, path))
    }

    fn morpho(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn MorphAnalyzer>> {
        Err(unsupported(StageKind::Morpho, path))
    }

    fn phonetics(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        Err(unsupported(StageKind::Phonetics, path))
    }

    fn nec(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        Err(unsupported(StageKind::Nec, path))
    }

    fn senses(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SenseAnnotator>> {
        Err(unsupported(StageKind::Senses, path))
    }

    fn ukb(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        Err(unsupported(StageKind::Ukb, path))
    }

    fn hmm_tagger(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        Err(unsupported(StageKind::HmmTagger, path))
    }

    fn relax_tagger(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        Err(unsupported(StageKind::RelaxTagger, path))
    }

    fn chart_parser(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        Err(unsupported(StageKind::ChartParser, path))
    }

    fn dep_txala(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn TreeCompleter>> {
        Err(unsupported(StageKind::Txala, path))
    }

    fn dep_treeler(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        Err(unsupported(StageKind::Treeler, path))
    }

    fn dep_lstm(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        Err(unsupported(StageKind::Lstm, path))
    }

    fn srl_treeler(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        Err(unsupported(StageKind::SrlTreeler, path))
    }

    fn coref(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn DocumentStage>> {
        Err(unsupported(StageKind::Coref, path))
    }

    fn semgraph(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn DocumentStage>> {
        Err(unsupported(StageKind::SemGraph, path))
    }
}

fn unsupported(kind: StageKind, path: &str) -> AnalyzerError {
    AnalyzerError::unsupported_stage(kind.as_str(), path)
}

/// Loader for the reference stages in [`crate::nlp`].
///
/// `"builtin"` selects the stage with its default rules; any other path is
/// read as that stage's JSON resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLoader;

impl StageLoader for BuiltinLoader {
    fn language_ident(
        &self,
        path: &str,
        _cfg: &CreationConfig,
    ) -> Result<Arc<dyn LanguageIdentifier>> {
        if path == BUILTIN_RESOURCE {
            return Ok(Arc::new(StopwordIdentifier::new()));
        }
        Ok(Arc::new(StopwordIdentifier::from_path(Path::new(path))?))
    }

    fn tokenizer(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn Tokenizer>> {
        if path == BUILTIN_RESOURCE {
            return Ok(Arc::new(UnicodeTokenizer::new()));
        }
        Ok(Arc::new(UnicodeTokenizer::from_path(Path::new(path))?))
    }

    fn splitter(&self, path: &str, _cfg: &CreationConfig) -> Result<Arc<dyn Splitter>> {
        if path == BUILTIN_RESOURCE {
            return Ok(Arc::new(RuleSplitter::default()));
        }
        Ok(Arc::new(RuleSplitter::from_path(Path::new(path))?))
    }

    fn morpho(&self, _path: &str, cfg: &CreationConfig) -> Result<Arc<dyn MorphAnalyzer>> {
        Ok(Arc::new(HeuristicMorpho::from_resources(&cfg.morpho)?))
    }

    fn hmm_tagger(&self, path: &str, cfg: &CreationConfig) -> Result<Arc<dyn SentenceStage>> {
        if path != BUILTIN_RESOURCE {
            return Err(unsupported(StageKind::HmmTagger, path));
        }
        Ok(Arc::new(BigramTagger::from_resources(&cfg.tagger)))
    }
}

// ============================================================================
// StageSet
// ============================================================================

/// The stage instances of one analyzer. Empty slots never get filled.
#[derive(Clone, Default)]
pub struct StageSet {
    pub ident: Option<Arc<dyn LanguageIdentifier>>,
    pub tokenizer: Option<Arc<dyn Tokenizer>>,
    pub splitter: Option<Arc<dyn Splitter>>,
    pub morpho: Option<Arc<dyn MorphAnalyzer>>,
    pub phonetics: Option<Arc<dyn SentenceStage>>,
    pub nec: Option<Arc<dyn SentenceStage>>,
    pub senses: Option<Arc<dyn SenseAnnotator>>,
    pub ukb: Option<Arc<dyn SentenceStage>>,
    pub hmm: Option<Arc<dyn SentenceStage>>,
    pub relax: Option<Arc<dyn SentenceStage>>,
    pub chart_parser: Option<Arc<dyn SentenceStage>>,
    pub txala: Option<Arc<dyn TreeCompleter>>,
    pub treeler: Option<Arc<dyn SentenceStage>>,
    pub lstm: Option<Arc<dyn SentenceStage>>,
    pub srl: Option<Arc<dyn SentenceStage>>,
    pub coref: Option<Arc<dyn DocumentStage>>,
    pub semgraph: Option<Arc<dyn DocumentStage>>,
}

impl StageSet {
    /// Load every stage `cfg` declares. The first load failure aborts.
    pub fn load(cfg: &CreationConfig, loader: &dyn StageLoader) -> Result<Self> {
        let mut set = StageSet::default();
        for kind in StageKind::ALL {
            let Some(path) = cfg.resource(kind) else {
                continue;
            };
            debug!(stage = kind.as_str(), path, "loading stage");
            match kind {
                StageKind::LanguageIdent => set.ident = Some(loader.language_ident(path, cfg)?),
                StageKind::Tokenizer => set.tokenizer = Some(loader.tokenizer(path, cfg)?),
                StageKind::Splitter => set.splitter = Some(loader.splitter(path, cfg)?),
                StageKind::Morpho => set.morpho = Some(loader.morpho(path, cfg)?),
                StageKind::Phonetics => set.phonetics = Some(loader.phonetics(path, cfg)?),
                StageKind::Nec => set.nec = Some(loader.nec(path, cfg)?),
                StageKind::Senses => set.senses = Some(loader.senses(path, cfg)?),
                StageKind::Ukb => set.ukb = Some(loader.ukb(path, cfg)?),
                StageKind::HmmTagger => set.hmm = Some(loader.hmm_tagger(path, cfg)?),
                StageKind::RelaxTagger => set.relax = Some(loader.relax_tagger(path, cfg)?),
                StageKind::ChartParser => set.chart_parser = Some(loader.chart_parser(path, cfg)?),
                StageKind::Txala => set.txala = Some(loader.dep_txala(path, cfg)?),
                StageKind::Treeler => set.treeler = Some(loader.dep_treeler(path, cfg)?),
                StageKind::Lstm => set.lstm = Some(loader.dep_lstm(path, cfg)?),
                StageKind::SrlTreeler => set.srl = Some(loader.srl_treeler(path, cfg)?),
                StageKind::Coref => set.coref = Some(loader.coref(path, cfg)?),
                StageKind::SemGraph => set.semgraph = Some(loader.semgraph(path, cfg)?),
            }
        }
        Ok(set)
    }

    /// Kinds with a loaded instance, in ladder order.
    pub fn present(&self) -> Vec<StageKind> {
        StageKind::ALL
            .into_iter()
            .filter(|kind| self.has(*kind))
            .collect()
    }
}

impl StagePresence for StageSet {
    fn has(&self, kind: StageKind) -> bool {
        match kind {
            StageKind::LanguageIdent => self.ident.is_some(),
            StageKind::Tokenizer => self.tokenizer.is_some(),
            StageKind::Splitter => self.splitter.is_some(),
            StageKind::Morpho => self.morpho.is_some(),
            StageKind::Phonetics => self.phonetics.is_some(),
            StageKind::Nec => self.nec.is_some(),
            StageKind::Senses => self.senses.is_some(),
            StageKind::Ukb => self.ukb.is_some(),
            StageKind::HmmTagger => self.hmm.is_some(),
            StageKind::RelaxTagger => self.relax.is_some(),
            StageKind::ChartParser => self.chart_parser.is_some(),
            StageKind::Txala => self.txala.is_some(),
            StageKind::Treeler => self.treeler.is_some(),
            StageKind::Lstm => self.lstm.is_some(),
            StageKind::SrlTreeler => self.srl.is_some(),
            StageKind::Coref => self.coref.is_some(),
            StageKind::SemGraph => self.semgraph.is_some(),
        }
    }
}

impl fmt::Debug for StageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.present().iter().map(StageKind::as_str).collect();
        f.debug_struct("StageSet").field("present", &names).finish()
    }
}
