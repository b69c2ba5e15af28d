use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use policyrag_cli::{init_tracing, Runtime};
use policyrag_index::{DocumentExtractor, IndexBuilder};

#[derive(Parser)]
#[command(name = "policyrag-indexer", about = "Build the retention policy vector index", version)]
struct Args {
    /// Documents directory (default: paths.documents_dir)
    docs: Option<PathBuf>,

    /// Output directory for docs.index and docs_meta.json
    #[arg(long)]
    index_dir: Option<PathBuf>,

    /// Directory holding policyrag.toml
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Embedding model directory (config.json, tokenizer.json, weights)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Hide the embedding progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let runtime = Runtime::load(args.config_dir.as_deref())?;
    let docs_dir = runtime.documents_dir(args.docs);
    let index_dir = runtime.index_dir(args.index_dir);

    let chunker = runtime.settings.chunker()?;
    let embedder = runtime.embedder(args.model_dir)?;
    let extractor = DocumentExtractor::default();
    let report = IndexBuilder::new(chunker, embedder.as_ref(), &extractor)
        .with_progress(!args.no_progress)
        .build_and_persist(&docs_dir, &index_dir)
        .with_context(|| format!("building index from {}", docs_dir.display()))?;

    println!("Indexed {} documents ({} pages) into {} chunks", report.documents, report.pages, report.chunks);
    println!("Embedder: {} (dim {})", embedder.embedder_id(), report.dim);
    println!("Index written to {}", index_dir.display());
    Ok(())
}
