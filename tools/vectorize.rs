//! CoNLL Vectorization Tool
//!
//! Configuration-driven conversion of a tagged corpus into windowed
//! embedding features plus a JSON manifest.
//!
//! # Output
//!
//! - **Features**: `paths.output` - one record per token (text or binary)
//! - **Manifest**: `paths.manifest` - geometry and label mapping
//! - **NumPy** (optional): `paths.npy_dir/{features,labels}.npy`
//!
//! # Usage
//!
//! ```bash
//! # Vectorize the training split
//! cargo run --release --bin vectorize -- --config configs/train.toml
//!
//! # Vectorize a validation split with the training label numbering
//! # (config sets paths.prior_manifest to the training manifest)
//! cargo run --release --bin vectorize -- --config configs/testa.toml
//!
//! # Convert an existing feature file to NumPy
//! cargo run --release --bin vectorize -- --export-npy configs/train.toml --temporal
//!
//! # Generate sample config
//! cargo run --release --bin vectorize -- --generate-config configs/train.toml
//! ```

use conll_vectorizer::export::{Manifest, NpyExporter, NpyLayout};
use conll_vectorizer::{PathConfig, VectorizerConfig, Vectorizer, WindowConfig};

/// Main entry point for the vectorization tool
fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--config" => {
            if args.len() < 3 {
                eprintln!("Error: --config requires a path argument");
                std::process::exit(1);
            }
            run_from_config(&args[2]);
        }
        "--export-npy" => {
            if args.len() < 3 {
                eprintln!("Error: --export-npy requires a path argument");
                std::process::exit(1);
            }
            let layout = if args.iter().skip(3).any(|a| a == "--temporal") {
                NpyLayout::Temporal
            } else {
                NpyLayout::Flat
            };
            export_npy(&args[2], layout);
        }
        "--generate-config" => {
            if args.len() < 3 {
                eprintln!("Error: --generate-config requires a path argument");
                std::process::exit(1);
            }
            generate_sample_config(&args[2]);
        }
        "--help" | "-h" => {
            print_usage(&args[0]);
        }
        _ => {
            eprintln!("Unknown argument: {}", args[1]);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!(
        r#"
CoNLL Vectorization Tool

Usage:
    {program} --config <path.toml>                  Vectorize a corpus
    {program} --export-npy <path.toml> [--temporal] Export a finished run to NumPy
    {program} --generate-config <path>              Generate sample config file
    {program} --help                                Show this help

Set RUST_LOG=debug for per-label diagnostics.
"#
    );
}

/// Generate a sample configuration file
fn generate_sample_config(path: &str) {
    let sample_config = VectorizerConfig::new(
        WindowConfig::new(2, 50),
        PathConfig::new(
            "data/glove.6B.50d.txt",
            "data/eng.train.txt",
            "data/vectorized.txt",
            "data/meta.json",
        ),
    );

    match sample_config.save_toml(path) {
        Ok(()) => {
            println!("Generated sample config: {}", path);
            println!("\nEdit the following fields before running:");
            println!("  - paths.embeddings: GloVe-format embedding file");
            println!("  - paths.corpus: CoNLL corpus to vectorize");
            println!("  - window.embedding_dim: must match the embedding file");
            println!("  - paths.prior_manifest: set for validation/test splits");
        }
        Err(e) => {
            eprintln!("Error generating config: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(config_path: &str) -> VectorizerConfig {
    match VectorizerConfig::load_toml(config_path) {
        Ok(c) => {
            log::info!("Loaded configuration: {}", config_path);
            c
        }
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run vectorization from configuration file
fn run_from_config(config_path: &str) {
    let config = load_config(config_path);
    print_config_summary(&config);

    let mut vectorizer = match Vectorizer::from_config(config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Setup failed: {}", e);
            std::process::exit(1);
        }
    };

    match vectorizer.run() {
        Ok(summary) => {
            println!();
            println!("Vectorization Complete");
            println!("  Tokens:          {}", summary.stats.tokens);
            println!("  Records:         {}", summary.stats.records);
            println!("  Blank lines:     {}", summary.stats.blank_lines);
            println!(
                "  Out of vocab:    {} ({:.2}%)",
                summary.stats.oov_tokens,
                summary.stats.oov_rate() * 100.0
            );
            println!(
                "  Labels:          {} ({} seeded, {} new)",
                summary.manifest.nlabels, summary.labels_seeded, summary.labels_created
            );
            println!("  Feature dim:     {}", summary.manifest.feature_dim);
            if let Some(npy) = &summary.npy {
                println!("  NumPy features:  {:?}", npy.features_shape);
            }
            println!("  Total time:      {:?}", summary.elapsed);
        }
        Err(e) => {
            eprintln!("Vectorization failed: {}", e);
            eprintln!("Any partially written output file is invalid and should be discarded.");
            std::process::exit(1);
        }
    }
}

fn print_config_summary(config: &VectorizerConfig) {
    println!("Configuration Summary");
    println!("  Context:      {} (window {})", config.window.context, config.window.window_width());
    println!("  Embedding:    {} dims", config.window.embedding_dim);
    println!("  Feature dim:  {}", config.window.feature_dim());
    println!("  Encoding:     {}", config.encoding);
    println!("  Embeddings:   {}", config.paths.embeddings.display());
    println!("  Corpus:       {}", config.paths.corpus.display());
    println!("  Output:       {}", config.paths.output.display());
    println!("  Manifest:     {}", config.paths.manifest.display());
    if let Some(prior) = &config.paths.prior_manifest {
        println!("  Labels from:  {}", prior.display());
    }
    println!();
}

/// Convert the feature file of a finished run to NumPy arrays
fn export_npy(config_path: &str, layout: NpyLayout) {
    let config = load_config(config_path);

    let manifest = match Manifest::load(&config.paths.manifest) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to load manifest: {}", e);
            std::process::exit(1);
        }
    };

    let out_dir = config
        .paths
        .npy_dir
        .clone()
        .unwrap_or_else(|| config.paths.output.with_extension("npy.d"));

    match NpyExporter::new(&out_dir)
        .with_layout(layout)
        .export(&config.paths.output, &manifest, config.encoding)
    {
        Ok(result) => {
            println!("Exported {} records", result.n_records);
            println!("  Features: {} {:?}", result.features_path.display(), result.features_shape);
            println!("  Labels:   {}", result.labels_path.display());
        }
        Err(e) => {
            eprintln!("NumPy export failed: {}", e);
            std::process::exit(1);
        }
    }
}
