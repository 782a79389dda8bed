//! medrag retrieval engine
//!
//! Dense-vector retrieval of the single most relevant document from a small
//! corpus for a free-text query.
//!
//! ## Features
//!
//! - **Pluggable embeddings** - fastembed (all-MiniLM-L6-v2) or a deterministic hashing embedder
//! - **Exact search** - flat squared-L2 index with stable, lowest-slot tie breaking
//! - **Aligned storage** - documents and vectors are only ever appended together
//! - **Snapshots** - bincode snapshots skip re-embedding on restart
//!
//! ## Example
//!
//! ```ignore
//! use medrag_retrieval::{FastEmbedProvider, RetrievalEngine};
//! use std::sync::Arc;
//!
//! let engine = RetrievalEngine::new(Arc::new(FastEmbedProvider::new()?))?;
//! engine.index_folder("medical_docs")?;
//!
//! let reference = engine.get_similar_document("I have a fever and cough")?;
//! ```

pub mod corpus;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod snapshot;

// Re-exports for convenience
pub use corpus::{load_corpus, DEFAULT_CORPUS_DIR};
pub use document::{Document, DocumentStore, SourceDocument};
#[cfg(feature = "fastembed")]
pub use embedding::{FastEmbedConfig, FastEmbedProvider};
pub use embedding::{
    CachedProvider, EmbeddingProvider, HashingConfig, HashingEmbedder, DEFAULT_CACHE_CAPACITY,
};
pub use engine::{RetrievalEngine, ScoredDocument};
pub use error::{Result, RetrievalError};
pub use index::{FlatIndex, Neighbor};
pub use snapshot::IndexSnapshot;
