//! Pipeline configuration, validation and execution.
//!
//! ## Submodules
//!
//! - [`config`]: creation-time and invocation-time options
//! - [`validation`]: consistency checks of an invocation against loaded stages
//! - [`traits`]: the stage seams the analyzer is generic over
//! - [`stages`]: loading stages from a creation config
//! - [`streaming`]: incremental tokenization and splitting state
//! - [`runner`]: the [`Analyzer`] and its stage ladder
//! - [`observer`]: timing and call-count hooks around every stage

pub mod config;
pub mod error_code;
pub mod errors;
pub mod observer;
pub mod runner;
pub mod stages;
pub mod streaming;
pub mod traits;
pub mod validation;

pub use config::{
    AnalyzerConfig, CreationConfig, DependencyChoice, ForceSelect, InvokeConfig, MorphoOptions,
    SrlChoice, StageKind, StagePresence, TaggerChoice, WsdMode,
};
pub use observer::{
    AnalysisObserver, NoopObserver, StageCallCounter, StageReport, StageTimingObserver,
};
pub use runner::Analyzer;
pub use stages::{BuiltinLoader, StageLoader, StageSet};
pub use streaming::StreamingSession;
pub use traits::{
    DocumentStage, LanguageIdentifier, MorphAnalyzer, SenseAnnotator, SenseRequest,
    SentenceStage, SplitOutcome, Splitter, Tokenizer, TreeCompleter,
};
pub use validation::{validate, Status, ValidationStatus};
