//! Stage-boundary hooks for logging, profiling and tests.
//!
//! The analyzer calls [`AnalysisObserver::on_stage_start`] right before a
//! stage module is invoked and [`AnalysisObserver::on_stage_end`] right after
//! it returns, passing a [`StageReport`] with the elapsed time and the size
//! of the unit the stage saw. Stages that the ladder skips produce no
//! callbacks at all, so an observer doubles as an invocation log.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

// ─── Stage names ────────────────────────────────────────────────────────────

pub const STAGE_TOKENIZE: &str = "tokenize";
pub const STAGE_SPLIT: &str = "split";
pub const STAGE_MORPHO: &str = "morpho";
pub const STAGE_SENSES: &str = "senses";
pub const STAGE_PHONETICS: &str = "phonetics";
pub const STAGE_HMM_TAGGER: &str = "hmm_tagger";
pub const STAGE_RELAX_TAGGER: &str = "relax_tagger";
pub const STAGE_UKB: &str = "ukb";
pub const STAGE_NEC: &str = "nec";
pub const STAGE_CHART_PARSER: &str = "chart_parser";
pub const STAGE_PARSE_COMPLETION: &str = "parse_completion";
pub const STAGE_DEP_TXALA: &str = "dep_txala";
pub const STAGE_DEP_TREELER: &str = "dep_treeler";
pub const STAGE_DEP_LSTM: &str = "dep_lstm";
pub const STAGE_SRL: &str = "srl";
pub const STAGE_COREF: &str = "coref";
pub const STAGE_SEMGRAPH: &str = "semgraph";
pub const STAGE_IDENT: &str = "ident";

// ─── Reports ────────────────────────────────────────────────────────────────

/// Wall-clock timer for one stage invocation.
#[derive(Debug, Clone, Copy)]
pub struct StageClock(Instant);

impl StageClock {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// What happened during one stage invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    elapsed: Duration,
    sentences: Option<usize>,
    words: Option<usize>,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Default::default()
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_us(&self) -> u128 {
        self.elapsed.as_micros()
    }

    /// Sentences in the unit the stage processed, when known.
    pub fn sentences(&self) -> Option<usize> {
        self.sentences
    }

    /// Words in the unit the stage processed, when known.
    pub fn words(&self) -> Option<usize> {
        self.words
    }
}

#[derive(Debug, Clone)]
pub struct StageReportBuilder {
    report: StageReport,
}

impl StageReportBuilder {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            report: StageReport::new(elapsed),
        }
    }

    pub fn sentences(mut self, n: usize) -> Self {
        self.report.sentences = Some(n);
        self
    }

    pub fn words(mut self, n: usize) -> Self {
        self.report.words = Some(n);
        self
    }

    pub fn build(self) -> StageReport {
        self.report
    }
}

// ─── Observers ──────────────────────────────────────────────────────────────

/// Callbacks fired around every stage invocation.
///
/// Both methods default to no-ops, so implementors only override what they
/// need.
pub trait AnalysisObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AnalysisObserver for NoopObserver {}

/// Collects one report per stage invocation, in call order.
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    /// Stage names in the order they ran.
    pub fn stages(&self) -> Vec<&'static str> {
        self.reports.iter().map(|(name, _)| *name).collect()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed).sum()
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

impl AnalysisObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.reports.push((stage, report.clone()));
    }
}

/// Counts how many times each stage was entered.
#[derive(Debug, Clone, Default)]
pub struct StageCallCounter {
    counts: FxHashMap<&'static str, usize>,
}

impl StageCallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, stage: &str) -> usize {
        self.counts.get(stage).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

impl AnalysisObserver for StageCallCounter {
    fn on_stage_start(&mut self, stage: &'static str) {
        *self.counts.entry(stage).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_builder() {
        let report = StageReportBuilder::new(Duration::from_micros(42))
            .sentences(3)
            .words(17)
            .build();
        assert_eq!(report.elapsed_us(), 42);
        assert_eq!(report.sentences(), Some(3));
        assert_eq!(report.words(), Some(17));

        let bare = StageReport::new(Duration::ZERO);
        assert_eq!(bare.sentences(), None);
    }

    #[test]
    fn test_timing_observer_keeps_order() {
        let mut obs = StageTimingObserver::new();
        obs.on_stage_start(STAGE_MORPHO);
        obs.on_stage_end(STAGE_MORPHO, &StageReport::new(Duration::from_millis(2)));
        obs.on_stage_end(STAGE_HMM_TAGGER, &StageReport::new(Duration::from_millis(3)));
        assert_eq!(obs.stages(), vec![STAGE_MORPHO, STAGE_HMM_TAGGER]);
        assert_eq!(obs.total_elapsed(), Duration::from_millis(5));
        obs.clear();
        assert!(obs.reports().is_empty());
    }

    #[test]
    fn test_call_counter() {
        let mut counter = StageCallCounter::new();
        counter.on_stage_start(STAGE_DEP_TREELER);
        counter.on_stage_start(STAGE_DEP_TREELER);
        counter.on_stage_start(STAGE_SRL);
        assert_eq!(counter.count(STAGE_DEP_TREELER), 2);
        assert_eq!(counter.count(STAGE_DEP_TXALA), 0);
        assert_eq!(counter.total(), 3);
        counter.reset();
        assert_eq!(counter.total(), 0);
    }

    #[test]
    fn test_stage_clock_measures() {
        let clock = StageClock::start();
        assert!(clock.elapsed() <= Duration::from_secs(60));
    }
}
