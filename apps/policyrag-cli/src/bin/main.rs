use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use policyrag_cli::{init_tracing, Runtime};
use policyrag_core::types::CustomerRecord;

const PREVIEW_CHARS: usize = 700;

#[derive(Parser)]
#[command(name = "policyrag", about = "Query retention policy documents", version)]
struct Cli {
    /// Directory holding policyrag.toml
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Index directory (default: paths.index_dir)
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Embedding model directory
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve the chunks closest to a question
    Ask {
        question: String,
        /// Number of chunks (default: retrieval.default_top_k)
        #[arg(long)]
        top_k: Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Policy recommendation for a risk tier (high, medium, low)
    Recommend { risk: String },

    /// Churn prediction for a customer record (JSON object file)
    Predict { customer: PathBuf },

    /// Prediction plus the recommendation for the predicted tier
    Advise { customer: PathBuf },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let runtime = Runtime::load(cli.config_dir.as_deref())?;
    let advisor = runtime.advisor(cli.index_dir, cli.model_dir)?;

    match cli.command {
        Command::Ask { question, top_k, json } => {
            let results = advisor.ask(&question, top_k.unwrap_or(advisor.default_top_k()))?;
            if json {
                return print_json(&results);
            }
            for (i, r) in results.iter().enumerate() {
                println!("[{}] Source: {} | Page: {} | Distance: {:.4}", i + 1, r.source, r.page, r.distance);
                println!("{}\n", r.text.chars().take(PREVIEW_CHARS).collect::<String>());
            }
        }
        Command::Recommend { risk } => print_json(&advisor.recommend_tier(&risk)?)?,
        Command::Predict { customer } => print_json(&advisor.predict(&read_customer(&customer)?)?)?,
        Command::Advise { customer } => print_json(&advisor.recommend_for_customer(&read_customer(&customer)?)?)?,
    }
    Ok(())
}

fn read_customer(path: &Path) -> Result<CustomerRecord> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON object", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
