//! Server configuration

use clap::ValueEnum;
use medrag_retrieval::{DEFAULT_CACHE_CAPACITY, DEFAULT_CORPUS_DIR};
use std::path::PathBuf;

/// Which embedding backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// ONNX sentence-transformer via fastembed (all-MiniLM-L6-v2)
    #[cfg(feature = "fastembed")]
    Fastembed,
    /// Deterministic feature hashing, no model download
    Hashing,
}

impl Default for EmbedderKind {
    #[cfg(feature = "fastembed")]
    fn default() -> Self {
        Self::Fastembed
    }

    #[cfg(not(feature = "fastembed"))]
    fn default() -> Self {
        Self::Hashing
    }
}

/// Startup configuration, built from command-line arguments
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Folder with one plain-text document per file
    pub corpus_dir: PathBuf,
    /// Snapshot to restore from, and to write after a fresh index
    pub snapshot: Option<PathBuf>,
    pub embedder: EmbedderKind,
    /// fastembed model cache; resolved from the environment if unset
    pub model_cache: Option<PathBuf>,
    /// Output dimension for the hashing embedder
    pub dimension: usize,
    /// Query embeddings kept in the fastembed LRU cache
    pub cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from(DEFAULT_CORPUS_DIR),
            snapshot: None,
            embedder: EmbedderKind::default(),
            model_cache: None,
            dimension: 384,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
