//! Built-in language processing stages.
//!
//! Lightweight, dependency-free implementations of the early analysis
//! stages, enough to run the pipeline end to end without external models:
//!
//! - [`tokenizer`]: Unicode word segmentation with character spans
//! - [`splitter`]: rule-based sentence boundaries over a word stream
//! - [`morpho`]: heuristic morphological readings
//! - [`tagger`]: bigram disambiguation of those readings
//! - [`ident`]: stopword-based language identification
//! - [`line_reader`]: line iteration that tracks character offsets

pub mod ident;
pub mod line_reader;
pub mod morpho;
pub mod splitter;
pub mod tagger;
pub mod tokenizer;
