//! End-to-end tests: embedding file + corpus file → feature file + manifest.

use std::fs;
use std::path::{Path, PathBuf};

use conll_vectorizer::prelude::*;
use conll_vectorizer::read_records;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

const EMBEDDINGS: &str = "\
unknown 0.0 0.0
the 0.5 -0.5
eu 1.0 1.0
rejects 2.0 2.0
german 3.0 3.0
call 4.0 4.0
";

const TRAIN: &str = "\
EU NNP I-NP I-ORG
rejects VBZ I-VP O
German JJ I-NP I-MISC
call NN I-NP O

The DT I-NP O
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("glove.txt"), EMBEDDINGS).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn corpus(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn config(&self, corpus: &Path, output: &str, manifest: &str, context: usize) -> VectorizerConfig {
        VectorizerConfig::new(
            WindowConfig::new(context, 2),
            PathConfig::new(
                self.path("glove.txt"),
                corpus,
                self.path(output),
                self.path(manifest),
            ),
        )
    }
}

fn run(config: VectorizerConfig) -> VectorizeSummary {
    Vectorizer::from_config(config).unwrap().run().unwrap()
}

// ============================================================================
// Record stream
// ============================================================================

#[test]
fn test_one_record_per_token_line() {
    let fx = Fixture::new();
    let corpus = fx.corpus("train.txt", TRAIN);
    let summary = run(fx.config(&corpus, "out.txt", "meta.json", 2));

    assert_eq!(summary.stats.tokens, 5);
    assert_eq!(summary.stats.records, 5);
    assert_eq!(summary.stats.blank_lines, 1);

    let records = read_records(fx.path("out.txt"), OutputEncoding::Text, 10).unwrap();
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.len() == 10));

    // Text output: one line per record
    let text = fs::read_to_string(fx.path("out.txt")).unwrap();
    assert_eq!(text.lines().count(), 5);
}

#[test]
fn test_windows_span_blank_lines_and_pad_both_ends() {
    let fx = Fixture::new();
    let corpus = fx.corpus("train.txt", TRAIN);
    run(fx.config(&corpus, "out.txt", "meta.json", 1));

    let records = read_records(fx.path("out.txt"), OutputEncoding::Text, 6).unwrap();

    // EU: [pad, eu, rejects]
    assert_eq!(records[0].features, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
    // call: [german, call, the], the blank line does not break the window
    assert_eq!(records[3].features, vec![3.0, 3.0, 4.0, 4.0, 0.5, -0.5]);
    // The: [call, the, pad]
    assert_eq!(records[4].features, vec![4.0, 4.0, 0.5, -0.5, 0.0, 0.0]);
}

#[test]
fn test_zero_context_is_own_embedding() {
    let fx = Fixture::new();
    let corpus = fx.corpus("train.txt", TRAIN);
    run(fx.config(&corpus, "out.txt", "meta.json", 0));

    let records = read_records(fx.path("out.txt"), OutputEncoding::Text, 2).unwrap();
    let features: Vec<Vec<f64>> = records.into_iter().map(|r| r.features).collect();
    assert_eq!(
        features,
        vec![
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![3.0, 3.0],
            vec![4.0, 4.0],
            vec![0.5, -0.5],
        ]
    );
}

#[test]
fn test_text_and_binary_decode_identically() {
    let fx = Fixture::new();
    let corpus = fx.corpus("train.txt", TRAIN);

    run(fx.config(&corpus, "out.txt", "meta_text.json", 2));
    run(fx
        .config(&corpus, "out.bin", "meta_bin.json", 2)
        .with_encoding(OutputEncoding::Binary));

    let text = read_records(fx.path("out.txt"), OutputEncoding::Text, 10).unwrap();
    let binary = read_records(fx.path("out.bin"), OutputEncoding::Binary, 10).unwrap();
    assert_eq!(text.len(), binary.len());
    for (t, b) in text.iter().zip(&binary) {
        assert_eq!(t.label, b.label);
        for (x, y) in t.features.iter().zip(&b.features) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    // 4-byte label + 10 f32 values per record
    let size = fs::metadata(fx.path("out.bin")).unwrap().len();
    assert_eq!(size, 5 * (4 + 10 * 4));
}

// ============================================================================
// Manifest and label consistency
// ============================================================================

#[test]
fn test_manifest_contents() {
    let fx = Fixture::new();
    let corpus = fx.corpus("train.txt", TRAIN);
    run(fx.config(&corpus, "out.txt", "meta.json", 2));

    let manifest = Manifest::load(fx.path("meta.json")).unwrap();
    assert_eq!(manifest.embedding_dim, 2);
    assert_eq!(manifest.context, 5);
    assert_eq!(manifest.feature_dim, 10);
    assert_eq!(manifest.nlabels, 3);
    assert_eq!(manifest.n_records, Some(5));
    assert_eq!(manifest.encoding, Some(OutputEncoding::Text));
    assert_eq!(manifest.unknown_token.as_deref(), Some("unknown"));
    assert!(manifest.export_timestamp.is_some());
    assert_eq!(manifest.labels.get(&0).map(String::as_str), Some("O"));
    assert_eq!(manifest.labels.get(&1).map(String::as_str), Some("I-ORG"));
    assert_eq!(manifest.labels.get(&2).map(String::as_str), Some("I-MISC"));

    // Plain JSON consumers see the documented keys
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fx.path("meta.json")).unwrap()).unwrap();
    for key in ["embedding_dim", "context", "nlabels", "feature_dim", "labels"] {
        assert!(raw.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn test_eval_run_reuses_training_codes() {
    let fx = Fixture::new();
    let train = fx.corpus("train.txt", TRAIN);
    let train_summary = run(fx.config(&train, "train.out", "meta.json", 2));
    let train_labels = train_summary.manifest.labels.clone();

    // Labels in a different first-seen order plus one unseen label
    let testa = fx.corpus(
        "testa.txt",
        "call NN I-NP I-MISC\nthe DT I-NP I-PER\nEU NNP I-NP I-ORG\n",
    );
    let mut config = fx.config(&testa, "testa.out", "meta_testa.json", 2);
    config.paths = config.paths.with_prior_manifest(fx.path("meta.json"));
    let summary = run(config);

    assert_eq!(summary.labels_seeded, 3);
    assert_eq!(summary.labels_created, 1);
    for (code, label) in &train_labels {
        assert_eq!(summary.manifest.labels.get(code), Some(label));
    }
    assert_eq!(summary.manifest.labels.get(&3).map(String::as_str), Some("I-PER"));

    let records = read_records(fx.path("testa.out"), OutputEncoding::Text, 10).unwrap();
    let codes: Vec<u32> = records.iter().map(|r| r.label).collect();
    assert_eq!(codes, vec![2, 3, 1]);
}

#[test]
fn test_eval_run_may_overwrite_prior_manifest() {
    let fx = Fixture::new();
    let train = fx.corpus("train.txt", TRAIN);
    run(fx.config(&train, "train.out", "meta.json", 2));

    let testa = fx.corpus("testa.txt", "the DT I-NP B-LOC\n");
    let mut config = fx.config(&testa, "testa.out", "meta.json", 2);
    config.paths = config.paths.with_prior_manifest(fx.path("meta.json"));
    run(config);

    let manifest = Manifest::load(fx.path("meta.json")).unwrap();
    assert_eq!(manifest.nlabels, 4);
    assert_eq!(manifest.labels.get(&3).map(String::as_str), Some("B-LOC"));
}

#[test]
fn test_empty_corpus_still_writes_manifest() {
    let fx = Fixture::new();
    let corpus = fx.corpus("empty.txt", "\n\n");
    let summary = run(fx.config(&corpus, "out.txt", "meta.json", 2));

    assert_eq!(summary.stats.records, 0);
    assert_eq!(fs::metadata(fx.path("out.txt")).unwrap().len(), 0);

    let manifest = Manifest::load(fx.path("meta.json")).unwrap();
    assert_eq!(manifest.nlabels, 1);
    assert_eq!(manifest.feature_dim, 10);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_default_embedding_aborts_before_output() {
    let fx = Fixture::new();
    fs::write(fx.path("glove.txt"), "the 0.5 -0.5\n").unwrap();
    let corpus = fx.corpus("train.txt", TRAIN);

    let err = Vectorizer::from_config(fx.config(&corpus, "out.txt", "meta.json", 2))
        .err()
        .unwrap();
    assert!(matches!(err, VectorizerError::MissingDefaultEmbedding { .. }));
    assert!(!fx.path("out.txt").exists());
    assert!(!fx.path("meta.json").exists());
}

#[test]
fn test_malformed_embedding_row_names_line() {
    let fx = Fixture::new();
    fs::write(fx.path("glove.txt"), "unknown 0.0 0.0\nthe 0.5\n").unwrap();
    let corpus = fx.corpus("train.txt", TRAIN);

    match Vectorizer::from_config(fx.config(&corpus, "out.txt", "meta.json", 2)) {
        Err(VectorizerError::MalformedEmbeddingRow { line, expected, found, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        other => panic!("expected MalformedEmbeddingRow, got {:?}", other.err()),
    }
}

#[test]
fn test_malformed_corpus_line_leaves_no_manifest() {
    let fx = Fixture::new();
    let corpus = fx.corpus("bad.txt", "EU NNP I-NP I-ORG\nrejects VBZ\n");

    let err = Vectorizer::from_config(fx.config(&corpus, "out.txt", "meta.json", 2))
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, VectorizerError::MalformedCorpusLine { line: 2, .. }));
    assert!(!fx.path("meta.json").exists());
}

#[test]
fn test_invalid_config_is_rejected() {
    let fx = Fixture::new();
    let corpus = fx.corpus("train.txt", TRAIN);
    let config = fx.config(&corpus, "meta.json", "meta.json", 2);

    assert!(matches!(
        Vectorizer::from_config(config),
        Err(VectorizerError::Config(_))
    ));
}
