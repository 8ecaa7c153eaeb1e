//! vrag: index local documents and ask grounded questions about them.
//!
//! ```bash
//! # Build an index from a directory of .txt/.md files
//! vrag index --docs ./corpus --store ./indexes
//!
//! # Ask one question against a persisted index
//! vrag ask --index ./indexes/<id> "Who founded the company, and when?"
//!
//! # Interactive session
//! vrag chat --index ./indexes/<id>
//! ```

mod render;
mod repl;
mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use vrag_core::{
    DocumentSource, InMemoryVectorIndex, LocalDirectorySource, RagPipeline, Session, VectorIndex,
};
use vrag_telemetry::LogFormat;

use crate::settings::{ConfigOverrides, ProviderSettings};

#[derive(Parser, Debug)]
#[command(name = "vrag", version, about = "Grounded question answering over local documents")]
struct Cli {
    /// JSON file with pipeline settings (missing fields use defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the first retrieved chunks without reranking
    #[arg(long, global = true)]
    no_rerank: bool,

    /// Number of reranked chunks kept per sub-question
    #[arg(long, global = true)]
    rerank_top_k: Option<usize>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk, embed and persist a directory of documents as a new index
    Index {
        /// Directory containing .txt and .md files
        #[arg(long)]
        docs: PathBuf,

        /// Directory under which the new index is written
        #[arg(long)]
        store: PathBuf,
    },

    /// Answer one question against a persisted index
    Ask {
        /// Directory of a persisted index
        #[arg(long)]
        index: PathBuf,

        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Interactive question answering over one session
    Chat {
        /// Directory of a persisted index
        #[arg(long)]
        index: PathBuf,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides { no_rerank: self.no_rerank, rerank_top_k: self.rerank_top_k }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Text };
    vrag_telemetry::init_with_format("vrag", format)?;

    let config = settings::load_config(cli.config.as_deref(), &cli.overrides())?;
    let pipeline = ProviderSettings::from_env().pipeline(config)?;

    match cli.command {
        Commands::Index { docs, store } => run_index(&pipeline, &docs, &store).await,
        Commands::Ask { index, question } => {
            let session = open_session(&index).await?;
            let turn = pipeline.answer(&session, &question.join(" ")).await?;
            print!("{}", render::turn(&turn, pipeline.config().rerank_top_k));
            Ok(())
        }
        Commands::Chat { index } => {
            let session = open_session(&index).await?;
            repl::run(&pipeline, &session).await
        }
    }
}

async fn run_index(pipeline: &RagPipeline, docs: &Path, store: &Path) -> Result<()> {
    let locator = docs.to_str().context("document directory is not valid UTF-8")?;
    let documents = LocalDirectorySource::new().list_documents(locator).await?;
    info!(documents = documents.len(), docs = %docs.display(), "loaded documents");

    let index = InMemoryVectorIndex::new();
    let report = pipeline.build_index(&documents, &index).await?;

    let location = store.join(uuid::Uuid::new_v4().to_string());
    index.persist(&location).await?;

    print!("{}", render::index_report(&report, &location));
    Ok(())
}

async fn open_session(location: &Path) -> Result<Session> {
    let index = InMemoryVectorIndex::load(location)
        .await
        .with_context(|| format!("failed to load index from '{}'", location.display()))?;
    let session = Session::new();
    let generation = session.install_index(Arc::new(index)).await;
    info!(session.id = %session.id(), generation, index = %location.display(), "session ready");
    Ok(session)
}
