//! Benchmarks for rapid_analyzer

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rapid_analyzer::pipeline::config::StageKind;
use rapid_analyzer::pipeline::traits::Tokenizer as _;
use rapid_analyzer::pipeline::validation::validate;
use rapid_analyzer::*;

/// Sample text for benchmarking
const SAMPLE_TEXT: &str = r#"
Machine learning is a subset of artificial intelligence that provides systems
the ability to automatically learn and improve from experience without being explicitly
programmed. Machine learning focuses on the development of computer programs that can
access data and use it to learn for themselves.

The process of learning begins with observations or data, such as examples, direct
experience, or instruction, in order to look for patterns in data. Dr. Smith said the
primary aim is to allow the computers to learn automatically without human intervention!

Deep learning is a subset of machine learning that uses artificial neural networks
with representation learning. Can the learning be supervised, semi-supervised or
unsupervised? It can.
"#;

const VOCABULARY: &[&str] = &[
    "the", "model", "reads", "a", "long", "document", "and", "every", "sentence", "is",
    "tagged", "quickly", "by", "two", "workers", "in", "parallel", "with", "small", "data",
];

/// Seeded random sentences, one per line.
fn random_lines(n: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            let len = rng.gen_range(4..16);
            let mut words: Vec<&str> = (0..len)
                .map(|_| *VOCABULARY.choose(&mut rng).unwrap_or(&"word"))
                .collect();
            words[0] = "The";
            format!("{}.", words.join(" "))
        })
        .collect()
}

fn analyzer(output: AnalysisLevel) -> Analyzer {
    Analyzer::with_invoke(
        CreationConfig::builtin("en"),
        &BuiltinLoader,
        InvokeConfig::default().with_output(output),
    )
    .unwrap()
}

fn benchmark_tokenization(c: &mut Criterion) {
    let tokenizer = nlp::tokenizer::Tokenizer::new();

    c.bench_function("tokenize_sample", |b| {
        b.iter(|| {
            let mut offset = 0;
            tokenizer.tokenize(black_box(SAMPLE_TEXT), &mut offset)
        })
    });

    let mut group = c.benchmark_group("tokenize_by_size");
    for size in [1, 5, 10, 20].iter() {
        let text = SAMPLE_TEXT.repeat(*size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| tokenizer.tokenize_at(black_box(text), 0))
        });
    }
    group.finish();
}

fn benchmark_analyze_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_text_by_level");
    for level in [
        AnalysisLevel::Token,
        AnalysisLevel::Splitted,
        AnalysisLevel::Morpho,
        AnalysisLevel::Tagged,
    ] {
        let analyzer = analyzer(level);
        group.throughput(Throughput::Bytes(SAMPLE_TEXT.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(level), &analyzer, |b, a| {
            b.iter(|| a.analyze_text(black_box(SAMPLE_TEXT), true, None).unwrap())
        });
    }
    group.finish();

    let tagged = analyzer(AnalysisLevel::Tagged);
    let mut group = c.benchmark_group("analyze_text_by_size");
    for size in [1, 5, 10, 20].iter() {
        let text = SAMPLE_TEXT.repeat(*size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| tagged.analyze_text(black_box(text), false, None).unwrap())
        });
    }
    group.finish();
}

fn benchmark_streaming(c: &mut Criterion) {
    let lines = random_lines(200);
    let template = analyzer(AnalysisLevel::Tagged);

    let mut group = c.benchmark_group("streaming");
    group.throughput(Throughput::Elements(lines.len() as u64));
    group.bench_function("incremental_lines", |b| {
        b.iter(|| {
            let mut a = template.fork();
            let mut n = 0;
            for line in &lines {
                n += a.analyze_incremental(black_box(line), false, None).unwrap().len();
            }
            n + a.flush_pending().unwrap().len()
        })
    });
    group.bench_function("always_flush", |b| {
        b.iter(|| {
            let mut a = template.fork();
            lines
                .iter()
                .map(|line| a.analyze_incremental(black_box(line), true, None).unwrap().len())
                .sum::<usize>()
        })
    });
    group.finish();
}

fn benchmark_validation(c: &mut Criterion) {
    let analyzer = analyzer(AnalysisLevel::Tagged);
    let configs: Vec<InvokeConfig> = AnalysisLevel::ALL
        .iter()
        .map(|out| InvokeConfig::default().with_output(*out))
        .collect();

    c.bench_function("validate_all_levels", |b| {
        b.iter(|| {
            configs
                .iter()
                .filter(|cfg| validate(analyzer.stages(), black_box(cfg)).is_ok())
                .count()
        })
    });

    c.bench_function("stage_presence", |b| {
        b.iter(|| analyzer.stages().present().len() <= StageKind::ALL.len())
    });
}

criterion_group!(
    benches,
    benchmark_tokenization,
    benchmark_analyze_text,
    benchmark_streaming,
    benchmark_validation,
);

criterion_main!(benches);
