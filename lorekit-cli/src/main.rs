//! `lorekit` — index text documents and query them with grounded answers.
//!
//! Remote embedding and generation are enabled when `OPENROUTER_API_KEY` is
//! set; otherwise the deterministic local fallbacks are used throughout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use lorekit_rag::{
    EmbeddingProvider, GenerationProvider, HashEmbedder, KbConfig, KnowledgeBase,
    OpenRouterConfig, OpenRouterEmbedder, OpenRouterGenerator,
};

#[derive(Parser)]
#[command(name = "lorekit", about = "Retrieval-augmented knowledge base", version)]
struct Cli {
    /// Directory holding the knowledge-base snapshot.
    #[arg(long, default_value = "./kb_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index a text file into the knowledge base.
    Index {
        /// Path of the file to index.
        file: PathBuf,
    },
    /// Ask the knowledge base a question.
    Query {
        /// The question to ask.
        question: Vec<String>,
    },
    /// Show document, chunk, and source statistics.
    Stats,
}

fn open_knowledge_base(data_dir: &Path) -> anyhow::Result<KnowledgeBase> {
    let config = KbConfig::builder()
        .snapshot_path(data_dir.join("index.json"))
        .build()
        .context("invalid knowledge-base configuration")?;

    let fallback = HashEmbedder::new(config.dimensions);

    let (embedder, generator): (Arc<dyn EmbeddingProvider>, Option<Arc<dyn GenerationProvider>>) =
        match std::env::var("OPENROUTER_API_KEY").ok().filter(|key| !key.is_empty()) {
            Some(api_key) => {
                debug!("remote embedding and generation enabled");
                let mut remote = OpenRouterConfig::new(api_key);
                if let Ok(base_url) = std::env::var("OPENROUTER_BASE_URL") {
                    remote = remote.with_base_url(base_url);
                }
                (
                    Arc::new(OpenRouterEmbedder::new(remote.clone(), fallback)?),
                    Some(Arc::new(OpenRouterGenerator::new(remote)?)),
                )
            }
            None => {
                debug!("no API key configured, using local fallbacks");
                (Arc::new(fallback), None)
            }
        };

    Ok(KnowledgeBase::open(config, embedder, generator)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let kb = open_knowledge_base(&cli.data_dir)?;

    match cli.command {
        Command::Index { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let doc_id =
                kb.index(file.display().to_string(), content, HashMap::new()).await?;
            println!("Indexed: {} (ID: {doc_id})", file.display());
        }
        Command::Query { question } => {
            let question = question.join(" ");
            let answer = kb.query(&question).await?;
            println!("{answer}");
        }
        Command::Stats => {
            let stats = kb.stats().await;
            println!("Documents: {}", stats.documents);
            println!("Chunks:    {}", stats.chunks);
            println!("Sources:   {}", stats.sources.join(", "));
        }
    }

    Ok(())
}
