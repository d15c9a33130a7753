//! Property-based tests using proptest

use proptest::prelude::*;
use rapid_analyzer::pipeline::config::{
    DependencyChoice, SrlChoice, StageKind, StagePresence, TaggerChoice, WsdMode,
};
use rapid_analyzer::pipeline::observer::StageCallCounter;
use rapid_analyzer::pipeline::validation::validate;
use rapid_analyzer::*;

/// Presence mask over [`StageKind::ALL`].
struct Mask(u32);

impl StagePresence for Mask {
    fn has(&self, kind: StageKind) -> bool {
        let idx = StageKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        self.0 & (1 << idx) != 0
    }
}

fn level() -> impl Strategy<Value = AnalysisLevel> {
    (0..AnalysisLevel::ALL.len()).prop_map(|i| AnalysisLevel::ALL[i])
}

fn invoke() -> impl Strategy<Value = InvokeConfig> {
    (
        level(),
        level(),
        prop_oneof![
            Just(TaggerChoice::None),
            Just(TaggerChoice::Hmm),
            Just(TaggerChoice::Relax)
        ],
        prop_oneof![
            Just(DependencyChoice::None),
            Just(DependencyChoice::Txala),
            Just(DependencyChoice::Treeler),
            Just(DependencyChoice::Lstm)
        ],
        prop_oneof![Just(SrlChoice::None), Just(SrlChoice::Treeler)],
        prop_oneof![
            Just(WsdMode::None),
            Just(WsdMode::All),
            Just(WsdMode::Mfs),
            Just(WsdMode::Ukb)
        ],
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(input, output, tagger, dep, srl, wsd, nec, phonetics)| {
            InvokeConfig::default()
                .with_levels(input, output)
                .with_tagger(tagger)
                .with_dependency(dep)
                .with_srl(srl)
                .with_wsd(wsd)
                .with_nec(nec)
                .with_phonetics(phonetics)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn test_input_past_output_is_never_ok(
        cfg in invoke(),
        mask in 0u32..(1 << 17)
    ) {
        let status = validate(&Mask(mask), &cfg);
        if cfg.input_level >= cfg.output_level {
            prop_assert!(!status.is_ok(), "{:?} -> {:?} validated OK", cfg.input_level, cfg.output_level);
        }
    }

    #[test]
    fn test_missing_tokenizer_is_an_error(
        cfg in invoke(),
        mask in 0u32..(1 << 17)
    ) {
        let without_tokenizer = mask & !(1 << 1);
        let cfg = InvokeConfig {
            input_level: AnalysisLevel::Text,
            ..cfg
        };
        let status = validate(&Mask(without_tokenizer), &cfg);
        if cfg.output_level >= AnalysisLevel::Token {
            prop_assert!(status.is_error());
            prop_assert!(status.description.starts_with("Tokenizer requested"));
        }
    }

    #[test]
    fn test_validation_is_deterministic(
        cfg in invoke(),
        mask in 0u32..(1 << 17)
    ) {
        prop_assert_eq!(validate(&Mask(mask), &cfg), validate(&Mask(mask), &cfg));
    }

    #[test]
    fn test_all_stages_present_only_deactivation_errors(cfg in invoke()) {
        let status = validate(&Mask((1 << 17) - 1), &cfg);
        if status.is_error() {
            prop_assert!(
                status.description.contains("deactivated"),
                "unexpected error with every stage: {}",
                status.description
            );
        }
    }

    #[test]
    fn test_streamed_words_keep_increasing_spans(
        chunks in prop::collection::vec("[A-Za-z]{1,8}( [a-z]{1,8}){0,4}[.?!]? ", 1..8)
    ) {
        let mut analyzer = Analyzer::with_invoke(
            CreationConfig::builtin("en"),
            &BuiltinLoader,
            InvokeConfig::default().with_output(AnalysisLevel::Splitted),
        ).unwrap();

        let mut sentences = Vec::new();
        for chunk in &chunks {
            sentences.extend(analyzer.analyze_incremental(chunk, false, None).unwrap());
        }
        sentences.extend(analyzer.flush_pending().unwrap());

        let total_chars: usize = chunks.iter().map(|c| c.chars().count()).sum();
        prop_assert_eq!(analyzer.stream().offset(), total_chars);

        let words: Vec<&Word> = sentences.iter().flat_map(|s| s.words.iter()).collect();
        prop_assert!(words.windows(2).all(|w| w[0].span.end <= w[1].span.start));
        let ids: Vec<u64> = sentences.iter().map(|s| s.id.unwrap().0).collect();
        prop_assert_eq!(ids, (1..=sentences.len() as u64).collect::<Vec<_>>());
    }

    #[test]
    fn test_equal_levels_run_no_stage(text in "[A-Z][a-z]{2,8}( [a-z]{2,8}){1,5}\\.") {
        let analyzer = Analyzer::with_invoke(
            CreationConfig::builtin("en"),
            &BuiltinLoader,
            InvokeConfig::default(),
        ).unwrap();
        let mut doc = analyzer.analyze_text(&text, false, None).unwrap();
        let before = doc.clone();

        let mut counter = StageCallCounter::new();
        let same = InvokeConfig::default().with_levels(AnalysisLevel::Tagged, AnalysisLevel::Tagged);
        analyzer.analyze_document_with_observer(&mut doc, Some(&same), &mut counter).unwrap();
        prop_assert_eq!(counter.total(), 0);
        prop_assert_eq!(doc, before);
    }
}
