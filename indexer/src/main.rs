use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use study_search::catalog::load_materials;
use study_search::persist::{read_header, DEFAULT_INDEX_FILE};
use study_search::{needs_suggestions, SearchConfig, SearchEngine, SearchOptions};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect the study-material search index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the TF-IDF index from the material catalog
    Rebuild {
        /// Catalog path (JSON/JSONL file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Persist the index to disk after a successful build
        #[arg(long, default_value_t = false)]
        save: bool,
        /// Index file written with --save
        #[arg(long, env = "STUDY_SEARCH_INDEX", default_value = DEFAULT_INDEX_FILE)]
        output: PathBuf,
    },
    /// Print the header of a saved index
    Inspect {
        #[arg(long, env = "STUDY_SEARCH_INDEX", default_value = DEFAULT_INDEX_FILE)]
        index: PathBuf,
    },
    /// Run a query against a saved index
    Query {
        #[arg(long, env = "STUDY_SEARCH_INDEX", default_value = DEFAULT_INDEX_FILE)]
        index: PathBuf,
        /// Catalog the index was built from
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = SearchOptions::default().top_k)]
        top_k: usize,
        #[arg(long, default_value_t = SearchOptions::default().min_score)]
        min_score: f32,
        query: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rebuild { input, save, output } => rebuild(&input, save, &output),
        Commands::Inspect { index } => inspect(&index),
        Commands::Query { index, input, top_k, min_score, query } => {
            run_query(&index, &input, SearchOptions { top_k, min_score }, &query.join(" "))
        }
    }
}

fn rebuild(input: &Path, save: bool, output: &Path) -> Result<()> {
    println!("Rebuilding search index...");
    let materials = load_materials(input)?;
    println!("Found materials: {}", materials.len());
    if materials.is_empty() {
        bail!("no materials to index");
    }

    let engine = SearchEngine::new();
    let stats = engine.build_index(&materials).context("index build failed")?;
    println!("Index built");
    println!("  - documents: {}", stats.documents);
    println!("  - features: {}", stats.features);

    if save {
        engine.save_index(output).context("failed to save index")?;
        println!("Index saved to {}", output.display());
    }
    Ok(())
}

fn inspect(index: &Path) -> Result<()> {
    let header = read_header(index)?;
    println!("format version: {}", header.format_version);
    println!("created at: {}", header.created_at);
    println!("built: {}", header.built);
    println!("documents: {}", header.num_docs);
    println!("features: {}", header.num_features);
    Ok(())
}

fn run_query(index: &Path, input: &Path, opts: SearchOptions, query: &str) -> Result<()> {
    let materials = load_materials(input)?;
    let engine = SearchEngine::new();
    if let Err(e) = engine.load_index(index) {
        tracing::warn!(error = %e, "falling back to a fresh build");
        engine.build_index(&materials)?;
    }
    let results = engine.try_search(query, &materials, opts)?;
    for r in &results {
        let terms: Vec<&str> = r.matched_terms.iter().map(String::as_str).collect();
        println!("{:>8}  {:>6.2}  {}", r.material_id, r.score, terms.join(", "));
    }
    if needs_suggestions(results.len()) {
        let max = SearchConfig::default().max_suggestions;
        for s in engine.suggest(query, &materials, max) {
            println!("did you mean: {s}");
        }
    }
    Ok(())
}
