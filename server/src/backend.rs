//! Retrieval backend
//!
//! Builds the engine at startup and runs every engine call on the blocking
//! thread pool, since embedding and search are CPU bound.

use medrag_retrieval::{
    EmbeddingProvider, HashingConfig, HashingEmbedder, IndexSnapshot, RetrievalEngine,
    ScoredDocument,
};
use std::sync::Arc;

use crate::config::{EmbedderKind, ServerConfig};
use crate::error::ServerResult;

/// Build the configured embedding provider
pub fn build_provider(config: &ServerConfig) -> ServerResult<Arc<dyn EmbeddingProvider>> {
    match config.embedder {
        #[cfg(feature = "fastembed")]
        EmbedderKind::Fastembed => {
            use crate::error::ServerError;
            use medrag_retrieval::{CachedProvider, FastEmbedConfig, FastEmbedProvider};

            let provider = FastEmbedProvider::with_config(FastEmbedConfig {
                cache_dir: config.model_cache.clone(),
                ..FastEmbedConfig::default()
            })
            .map_err(|e| ServerError::EmbedderUnavailable(e.to_string()))?;
            Ok(Arc::new(CachedProvider::with_capacity(
                provider,
                config.cache_capacity,
            )?))
        }
        EmbedderKind::Hashing => {
            let provider = HashingEmbedder::new(HashingConfig {
                dimension: config.dimension,
                ..HashingConfig::default()
            })?;
            Ok(Arc::new(provider))
        }
    }
}

/// Shared handle to a loaded engine
#[derive(Clone)]
pub struct RetrievalBackend {
    engine: Arc<RetrievalEngine>,
}

impl RetrievalBackend {
    pub fn new(engine: Arc<RetrievalEngine>) -> Self {
        Self { engine }
    }

    /// Build the provider and engine, then restore or index the corpus.
    ///
    /// Blocking; call from `spawn_blocking` or before the runtime starts serving.
    pub fn load(config: &ServerConfig) -> ServerResult<Self> {
        let provider = build_provider(config)?;
        let engine = RetrievalEngine::new(provider)?;

        if let Some(path) = config.snapshot.as_ref().filter(|p| p.exists()) {
            match IndexSnapshot::load(path).and_then(|snapshot| engine.restore(snapshot)) {
                Ok(()) => {
                    tracing::info!("Restored {} documents from {:?}", engine.len(), path);
                    return Ok(Self::new(Arc::new(engine)));
                }
                Err(e) => {
                    tracing::warn!("Snapshot {:?} unusable ({}), re-indexing corpus", path, e);
                }
            }
        }

        tracing::info!("Indexing corpus folder {:?}", config.corpus_dir);
        let count = engine.index_folder(&config.corpus_dir)?;
        tracing::info!("Indexed {} documents", count);

        if let Some(path) = &config.snapshot {
            if let Err(e) = engine.snapshot().save(path) {
                tracing::warn!("Failed to write snapshot {:?}: {}", path, e);
            }
        }

        Ok(Self::new(Arc::new(engine)))
    }

    /// `load` on the blocking pool
    pub async fn start(config: ServerConfig) -> ServerResult<Self> {
        tokio::task::spawn_blocking(move || Self::load(&config)).await?
    }

    /// Text of the nearest document
    pub async fn similar_document(&self, query: String) -> ServerResult<String> {
        let engine = Arc::clone(&self.engine);
        let text = tokio::task::spawn_blocking(move || engine.get_similar_document(&query)).await??;
        Ok(text)
    }

    /// Up to `k` nearest documents with distances
    pub async fn search(&self, query: String, k: usize) -> ServerResult<Vec<ScoredDocument>> {
        let engine = Arc::clone(&self.engine);
        let hits =
            tokio::task::spawn_blocking(move || engine.search_documents(&query, k)).await??;
        Ok(hits)
    }

    pub fn stats(&self) -> serde_json::Value {
        self.engine.stats()
    }

    pub fn engine(&self) -> &Arc<RetrievalEngine> {
        &self.engine
    }
}
