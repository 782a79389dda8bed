//! medrag server entry point
//!
//! Modes:
//! - `serve` (default): JSON-RPC 2.0 over stdio
//! - `query <TEXT>`: print the nearest document(s) and exit
//! - `snapshot --out <FILE>`: index the corpus and write a snapshot

use clap::{Parser, Subcommand};
use medrag_retrieval::{DEFAULT_CACHE_CAPACITY, DEFAULT_CORPUS_DIR};
use medrag_server::{EmbedderKind, RetrievalBackend, RpcServer, ServerConfig, ServerResult};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medrag-server")]
#[command(about = "Semantic reference-document retrieval over a local corpus")]
#[command(version)]
struct Args {
    /// Folder with one plain-text document per file
    #[arg(long, short, global = true, default_value = DEFAULT_CORPUS_DIR)]
    corpus: PathBuf,

    /// Snapshot file to restore from (written after a fresh index)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Embedding backend
    #[arg(long, value_enum, global = true, default_value_t = EmbedderKind::default())]
    embedder: EmbedderKind,

    /// Directory for downloaded model files
    #[arg(long, global = true)]
    model_cache: Option<PathBuf>,

    /// Vector dimension for the hashing embedder
    #[arg(long, global = true, default_value_t = 384)]
    dimension: usize,

    /// Maximum number of cached query embeddings (fastembed only)
    #[arg(long, global = true, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve JSON-RPC requests on stdin/stdout
    Serve,
    /// Print the document(s) nearest to TEXT
    Query {
        text: String,
        /// Number of documents to print
        #[arg(short, long, default_value_t = 1)]
        k: usize,
    },
    /// Index the corpus and write a snapshot
    Snapshot {
        #[arg(long, short)]
        out: PathBuf,
    },
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            corpus_dir: self.corpus.clone(),
            snapshot: self.snapshot.clone(),
            embedder: self.embedder,
            model_cache: self.model_cache.clone(),
            dimension: self.dimension,
            cache_capacity: self.cache_capacity,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries protocol messages and query output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medrag_server=info,medrag_retrieval=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("medrag-server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> ServerResult<()> {
    let mut config = args.config();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!("Starting medrag JSON-RPC server");
            let backend = RetrievalBackend::start(config).await?;
            RpcServer::new(backend).serve_stdio().await?;
        }
        Command::Query { text, k } => {
            let backend = RetrievalBackend::start(config).await?;
            if k == 1 {
                println!("{}", backend.similar_document(text).await?);
            } else {
                for hit in backend.search(text, k).await? {
                    println!(
                        "[{}] {} (distance {:.4})\n{}\n",
                        hit.document.id, hit.document.name, hit.distance, hit.document.text
                    );
                }
            }
        }
        Command::Snapshot { out } => {
            // Always index from the corpus folder, never from an older snapshot
            config.snapshot = None;
            let backend = RetrievalBackend::start(config).await?;
            let engine = std::sync::Arc::clone(backend.engine());
            tokio::task::spawn_blocking(move || engine.snapshot().save(&out)).await??;
        }
    }

    Ok(())
}
