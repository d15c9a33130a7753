//! Line protocol served to one client.
//!
//! Every input line is one message. Besides text, a client may send:
//!
//! - `FLUSH_BUFFER`: close whatever is pending. In corpus mode the pending
//!   sentences are sent and the stream counters are reset; in document mode
//!   the accumulated document is analyzed and sent.
//! - `RESET_STATS`: restart the throughput counters; answered with the ACK.
//! - `PRINT_STATS`: answered with the two-line [`ServerStats`] report.
//!
//! Results are written as one JSON line (a sentence array in corpus mode, a
//! document in document mode). When a message produces nothing to send, the
//! worker answers [`ACK`] so the client knows more input is expected.
//! In language identification mode each line is answered with a language
//! code and commands are not interpreted.

use std::io::{BufRead, Write};

use tracing::{debug, info};

use super::config::{InputMode, ServiceConfig};
use super::stats::ServerStats;
use crate::errors::Result;
use crate::pipeline::runner::Analyzer;
use crate::types::{Document, RequestedOutput, Sentence};

pub const ACK: &str = "FL-SERVER-READY";
pub const FLUSH_BUFFER: &str = "FLUSH_BUFFER";
pub const RESET_STATS: &str = "RESET_STATS";
pub const PRINT_STATS: &str = "PRINT_STATS";

/// Totals for one served connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub lines: usize,
    pub sentences: usize,
    pub words: usize,
}

/// Serves one client with its own analyzer.
#[derive(Debug)]
pub struct Worker {
    analyzer: Analyzer,
    output: RequestedOutput,
    mode: InputMode,
    always_flush: bool,
    paragraphs: bool,
    stats: ServerStats,
    report: WorkerReport,
}

impl Worker {
    /// Wrap `analyzer`, applying the requested output level to it.
    pub fn new(mut analyzer: Analyzer, config: &ServiceConfig) -> Result<Self> {
        apply_output(&mut analyzer, config.output)?;
        Ok(Self {
            analyzer,
            output: config.output,
            mode: config.effective_mode(),
            always_flush: config.always_flush,
            paragraphs: config.paragraphs,
            stats: ServerStats::new(),
            report: WorkerReport::default(),
        })
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    /// Serve until `input` ends.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<WorkerReport> {
        match (self.output, self.mode) {
            (RequestedOutput::Ident, _) => self.serve_ident(input, &mut output)?,
            (_, InputMode::Corpus) => self.serve_corpus(input, &mut output)?,
            (_, InputMode::Document) => self.serve_documents(input, &mut output)?,
        }
        output.flush()?;
        info!(
            lines = self.report.lines,
            sentences = self.report.sentences,
            "client ended"
        );
        Ok(self.report)
    }

    fn serve_ident<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            self.report.lines += 1;
            let lang = self.analyzer.identify_language(&line)?;
            writeln!(output, "{lang}")?;
        }
        Ok(())
    }

    fn serve_corpus<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            self.report.lines += 1;
            if self.stats_command(&line, output)? {
                continue;
            }
            if line == FLUSH_BUFFER {
                let sentences = self.analyzer.flush_pending()?;
                self.send_sentences(&sentences, output)?;
                self.analyzer.reset_stream();
                continue;
            }
            // The terminator counts towards the stream offset.
            let text = format!("{line}\n");
            let sentences = self
                .analyzer
                .analyze_incremental(&text, self.always_flush, None)?;
            self.send_sentences(&sentences, output)?;
        }
        let sentences = self.analyzer.flush_pending()?;
        if !sentences.is_empty() {
            self.send_sentences(&sentences, output)?;
        }
        Ok(())
    }

    fn serve_documents<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<()> {
        let mut lines = input.lines();
        let mut text = String::new();
        let mut served = false;
        loop {
            let mut flushed = false;
            for line in lines.by_ref() {
                let line = line?;
                self.report.lines += 1;
                if line == FLUSH_BUFFER {
                    flushed = true;
                    break;
                }
                if self.stats_command(&line, output)? {
                    continue;
                }
                send_ack(output)?;
                text.push_str(&line);
                text.push('\n');
            }
            if !flushed && served && text.is_empty() {
                return Ok(());
            }
            let doc = self.analyzer.analyze_text(&text, self.paragraphs, None)?;
            self.send_document(&doc, output)?;
            text.clear();
            served = true;
            if !flushed {
                return Ok(());
            }
        }
    }

    /// Handle `RESET_STATS` / `PRINT_STATS`. Returns whether `line` was one.
    fn stats_command<W: Write>(&mut self, line: &str, output: &mut W) -> Result<bool> {
        match line {
            RESET_STATS => {
                self.stats.reset();
                send_ack(output)?;
                Ok(true)
            }
            PRINT_STATS => {
                write!(output, "{}", self.stats.report())?;
                output.flush()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn send_sentences<W: Write>(&mut self, sentences: &[Sentence], output: &mut W) -> Result<()> {
        if sentences.is_empty() {
            return send_ack(output);
        }
        self.stats.update_sentences(sentences);
        self.report.sentences += sentences.len();
        self.report.words += sentences.iter().map(Sentence::len).sum::<usize>();
        debug!(sentences = sentences.len(), "sending sentences");
        writeln!(output, "{}", serde_json::to_string(sentences)?)?;
        output.flush()?;
        Ok(())
    }

    fn send_document<W: Write>(&mut self, doc: &Document, output: &mut W) -> Result<()> {
        if doc.is_empty() {
            return send_ack(output);
        }
        self.stats.update_document(doc);
        self.report.sentences += doc.sentence_count();
        self.report.words += doc.word_count();
        writeln!(output, "{}", serde_json::to_string(doc)?)?;
        output.flush()?;
        Ok(())
    }
}

fn send_ack<W: Write>(output: &mut W) -> Result<()> {
    writeln!(output, "{ACK}")?;
    output.flush()?;
    Ok(())
}

/// Make the analyzer's active output level match the requested one.
pub(crate) fn apply_output(analyzer: &mut Analyzer, output: RequestedOutput) -> Result<()> {
    if let RequestedOutput::Level(level) = output {
        if analyzer.invoke_config().output_level != level {
            let cfg = analyzer.invoke_config().clone().with_output(level);
            analyzer.set_invoke_config(cfg)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::config::{CreationConfig, InvokeConfig};
    use crate::pipeline::stages::BuiltinLoader;
    use crate::types::AnalysisLevel;

    fn worker(config: ServiceConfig) -> Worker {
        let analyzer = Analyzer::with_invoke(
            CreationConfig::builtin("en"),
            &BuiltinLoader,
            InvokeConfig::default(),
        )
        .unwrap();
        Worker::new(analyzer, &config).unwrap()
    }

    fn run(worker: &mut Worker, input: &str) -> Vec<String> {
        let mut out = Vec::new();
        worker.serve(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_corpus_mode_acks_until_sentence_closes() {
        let mut w = worker(ServiceConfig::default());
        let out = run(&mut w, "Hello world.\nBye now.\n");
        assert_eq!(out[0], ACK);
        let closed: Vec<Sentence> = serde_json::from_str(&out[1]).unwrap();
        assert_eq!(closed[0].forms(), vec!["Hello", "world", "."]);
        let rest: Vec<Sentence> = serde_json::from_str(&out[2]).unwrap();
        assert_eq!(rest[0].forms(), vec!["Bye", "now", "."]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_corpus_spans_follow_client_text() {
        let mut w = worker(ServiceConfig::default());
        let out = run(&mut w, "Hello world.\nBye now.\n");
        let first: Vec<Sentence> = serde_json::from_str(&out[1]).unwrap();
        assert_eq!(first[0].words[2].span.start, 11);
        let second: Vec<Sentence> = serde_json::from_str(&out[2]).unwrap();
        assert_eq!(second[0].words[0].span.start, 13);
        assert_eq!(second[0].words[2].span.end, 21);
        assert_eq!(w.analyzer().stream().offset(), 22);
    }

    #[test]
    fn test_flush_buffer_resets_stream() {
        let mut w = worker(ServiceConfig::default());
        let out = run(&mut w, "Hello there\nFLUSH_BUFFER\nAgain here\n");
        assert_eq!(out[0], ACK);
        let flushed: Vec<Sentence> = serde_json::from_str(&out[1]).unwrap();
        assert_eq!(flushed[0].id, Some(crate::types::SentenceId(1)));
        assert_eq!(out[2], ACK);
        let last: Vec<Sentence> = serde_json::from_str(&out[3]).unwrap();
        assert_eq!(last[0].id, Some(crate::types::SentenceId(1)));
        assert_eq!(last[0].words[0].span.start, 0);
    }

    #[test]
    fn test_flush_with_nothing_pending_acks() {
        let mut w = worker(ServiceConfig::default());
        assert_eq!(run(&mut w, "FLUSH_BUFFER\n"), vec![ACK.to_string()]);
    }

    #[test]
    fn test_stats_commands() {
        let mut w = worker(ServiceConfig {
            always_flush: true,
            ..Default::default()
        });
        let out = run(&mut w, "One two.\nPRINT_STATS\nRESET_STATS\nPRINT_STATS\n");
        assert!(out[1].starts_with("Words: 3, sentences: 1, cpuTime_total: "));
        assert!(out[2].starts_with("Words/sentence: 3, "));
        assert_eq!(out[3], ACK);
        assert!(out[4].starts_with("Words: 0, sentences: 0, "));
        assert_eq!(w.stats().words(), 0);
    }

    #[test]
    fn test_document_mode() {
        let mut w = worker(ServiceConfig {
            mode: InputMode::Document,
            paragraphs: true,
            ..Default::default()
        });
        let out = run(&mut w, "First one.\n\nSecond one.\nFLUSH_BUFFER\n");
        assert_eq!(&out[..3], &[ACK, ACK, ACK]);
        let doc: Document = serde_json::from_str(&out[3]).unwrap();
        assert_eq!(doc.paragraphs.len(), 2);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_document_mode_without_flush() {
        let mut w = worker(ServiceConfig {
            mode: InputMode::Document,
            ..Default::default()
        });
        let out = run(&mut w, "Just text.");
        let doc: Document = serde_json::from_str(&out[1]).unwrap();
        assert_eq!(doc.sentence_count(), 1);
    }

    #[test]
    fn test_ident_mode() {
        let mut creation = CreationConfig::builtin("en");
        creation.ident_file = Some(crate::pipeline::stages::BUILTIN_RESOURCE.to_string());
        let analyzer = Analyzer::new(creation).unwrap();
        let mut w = Worker::new(
            analyzer,
            &ServiceConfig {
                output: RequestedOutput::Ident,
                ..Default::default()
            },
        )
        .unwrap();
        let out = run(&mut w, "the cat and the dog\ndie Katze und der Hund\n");
        assert_eq!(out, vec!["en", "de"]);
    }

    #[test]
    fn test_requested_level_is_applied() {
        let w = worker(ServiceConfig {
            output: RequestedOutput::Level(AnalysisLevel::Morpho),
            ..Default::default()
        });
        assert_eq!(
            w.analyzer().invoke_config().output_level,
            AnalysisLevel::Morpho
        );
    }
}
