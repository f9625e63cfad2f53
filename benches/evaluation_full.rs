use aste_eval::triplet_parsing::parse_label_file;
use aste_eval::{evaluate_predictions_conf, ErrorAnalysis, EvalConfig, LabelledSentence};
use criterion::{criterion_group, criterion_main, Criterion};
use pprof::criterion::{Output, PProfProfiler};

const ASPECTS: [&str; 5] = ["battery", "screen", "price", "keyboard", "service"];
const OPINIONS: [&str; 4] = ["great", "dim", "fair", "slow"];
const CODES: [(&str, &str); 3] = [("POS", "positive"), ("NEG", "negative"), ("NEU", "neutral")];

/// Builds `n_sentences` labelled sentences and the raw predictions of a model that gets roughly
/// two triplets out of three right and adds an extra triplet every fourth sentence.
fn build_dataset(n_sentences: usize) -> (Vec<LabelledSentence>, Vec<Option<String>>) {
    let mut label_file = String::new();
    let mut raw_predictions = Vec::with_capacity(n_sentences);
    for i in 0..n_sentences {
        let aspect = ASPECTS[i % ASPECTS.len()];
        let opinion = OPINIONS[i % OPINIONS.len()];
        let (code, sentiment) = CODES[i % CODES.len()];
        label_file.push_str(&format!(
            "The {} is really {}####[([1], [4], '{}')]\n",
            aspect, opinion, code
        ));
        let predicted_sentiment = match i % 3 {
            0 => CODES[(i + 1) % CODES.len()].1,
            _ => sentiment,
        };
        let mut raw = format!(
            "aspect: {}, opinion: {}, sentiment: {}",
            aspect, opinion, predicted_sentiment
        );
        if i % 4 == 0 {
            raw.push_str(" | aspect: delivery, opinion: late, sentiment: negative");
        }
        raw_predictions.push(Some(raw));
    }
    let labelled = parse_label_file(&label_file).unwrap();
    (labelled, raw_predictions)
}

fn benchmark_dataset(c: &mut Criterion, name: &str, n_sentences: usize) {
    let (labelled, raw_predictions) = build_dataset(n_sentences);
    c.bench_function(&format!("{}_dataset_metrics", name), |b| {
        b.iter(|| evaluate_predictions_conf(&labelled, &raw_predictions, EvalConfig::default()).unwrap())
    });
    let evaluation =
        evaluate_predictions_conf(&labelled, &raw_predictions, EvalConfig::default()).unwrap();
    c.bench_function(&format!("{}_dataset_analysis", name), |b| {
        b.iter(|| ErrorAnalysis::from_records(evaluation.error_predictions.clone()))
    });
}

fn benchmark_small_dataset(c: &mut Criterion) {
    benchmark_dataset(c, "small", 1_000)
}
fn benchmark_big_dataset(c: &mut Criterion) {
    benchmark_dataset(c, "big", 50_000)
}

criterion_group!(
    name=evaluation_benches;
    config = Criterion::default().sample_size(100).with_profiler(PProfProfiler::new(3000, Output::Flamegraph(None)));
    targets = benchmark_small_dataset,
    benchmark_big_dataset
);
criterion_main!(evaluation_benches);
