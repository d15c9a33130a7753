//! # rapid_analyzer
//!
//! An orchestrator for layered natural-language analysis.
//!
//! An [`Analyzer`] is built once from a [`CreationConfig`] naming the stages
//! to load (tokenizer, sentence splitter, morphology, taggers, parsers,
//! semantic role labeling, coreference, ...) and is then invoked with an
//! [`InvokeConfig`] selecting the input and output [`AnalysisLevel`]s and the
//! algorithm variants. The analyzer runs exactly the stages between the two
//! levels, in order, over plain text, sentence lists or whole documents, and
//! can also consume text incrementally across calls.
//!
//! The [`service`] module serves analyzers to concurrent clients over a
//! line protocol with a bounded worker pool.
//!
//! ## Example
//!
//! ```
//! use rapid_analyzer::{AnalysisLevel, Analyzer, BuiltinLoader, CreationConfig, InvokeConfig};
//!
//! let analyzer = Analyzer::with_invoke(
//!     CreationConfig::builtin("en"),
//!     &BuiltinLoader,
//!     InvokeConfig::default().with_output(AnalysisLevel::Tagged),
//! )
//! .unwrap();
//! let doc = analyzer.analyze_text("The cat sleeps. It dreams.", false, None).unwrap();
//! assert_eq!(doc.sentence_count(), 2);
//! ```

pub mod errors;
pub mod nlp;
pub mod pipeline;
pub mod service;
pub mod types;

pub use errors::{AnalyzerError, Result};
pub use types::{
    AnalysisLevel, Analysis, Document, Paragraph, PosTag, RequestedOutput, Sentence, SentenceId,
    Span, Word,
};

pub use pipeline::config::{CreationConfig, InvokeConfig};
pub use pipeline::error_code::ErrorCode;
pub use pipeline::errors::{ConfigDiagnostic, StageError};
pub use pipeline::observer::{AnalysisObserver, StageTimingObserver};
pub use pipeline::runner::Analyzer;
pub use pipeline::stages::{BuiltinLoader, StageLoader};
pub use pipeline::validation::{Status, ValidationStatus};
pub use service::{ServiceConfig, WorkerPool};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
