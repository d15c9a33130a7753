//! Per-connection throughput counters.

use std::time::{Duration, Instant};

use crate::types::{Document, Sentence};

/// Words and sentences sent back since the last reset.
#[derive(Debug, Clone)]
pub struct ServerStats {
    words: usize,
    sentences: usize,
    start: Instant,
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            words: 0,
            sentences: 0,
            start: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn update_sentences(&mut self, sentences: &[Sentence]) {
        self.sentences += sentences.len();
        self.words += sentences.iter().map(Sentence::len).sum::<usize>();
    }

    pub fn update_document(&mut self, doc: &Document) {
        for paragraph in &doc.paragraphs {
            self.update_sentences(&paragraph.sentences);
        }
    }

    pub fn words(&self) -> usize {
        self.words
    }

    pub fn sentences(&self) -> usize {
        self.sentences
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Two-line report answered to `PRINT_STATS`.
    pub fn report(&self) -> String {
        self.report_at(self.elapsed().as_secs_f64())
    }

    fn report_at(&self, secs: f64) -> String {
        let per_sentence = if self.sentences > 0 {
            self.words / self.sentences
        } else {
            0
        };
        let rate = |n: usize| if secs > 0.0 { n as f64 / secs } else { 0.0 };
        format!(
            "Words: {}, sentences: {}, cpuTime_total: {}\n\
             Words/sentence: {}, words/second: {}, sentences/second: {}\n",
            self.words,
            self.sentences,
            secs,
            per_sentence,
            rate(self.words),
            rate(self.sentences)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Word;

    fn sentence(n: usize) -> Sentence {
        Sentence::new((0..n).map(|i| Word::new("w", i, i + 1)).collect())
    }

    #[test]
    fn test_counts_and_reset() {
        let mut stats = ServerStats::new();
        stats.update_sentences(&[sentence(3), sentence(4)]);
        assert_eq!(stats.sentences(), 2);
        assert_eq!(stats.words(), 7);
        stats.reset();
        assert_eq!(stats.sentences(), 0);
        assert_eq!(stats.words(), 0);
    }

    #[test]
    fn test_report_format() {
        let mut stats = ServerStats::new();
        stats.update_sentences(&[sentence(3), sentence(4)]);
        assert_eq!(
            stats.report_at(2.0),
            "Words: 7, sentences: 2, cpuTime_total: 2\n\
             Words/sentence: 3, words/second: 3.5, sentences/second: 1\n"
        );
        assert_eq!(
            ServerStats::new().report_at(0.0),
            "Words: 0, sentences: 0, cpuTime_total: 0\n\
             Words/sentence: 0, words/second: 0, sentences/second: 0\n"
        );
    }
}
