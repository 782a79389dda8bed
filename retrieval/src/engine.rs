//! Retrieval engine
//!
//! Owns the vector index, the document store and an embedding provider.
//! The index and the store are two parallel sequences: slot `i` in the index
//! is `documents[i]`. Every mutator below finishes all fallible work first and
//! then appends to both under one write lock, so they never differ in length.

use parking_lot::RwLock;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::corpus::load_corpus;
use crate::document::{Document, DocumentStore, SourceDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RetrievalError, Result};
use crate::index::{FlatIndex, Neighbor};
use crate::snapshot::IndexSnapshot;

/// A retrieved document with its squared L2 distance to the query
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub distance: f32,
}

struct EngineState {
    index: FlatIndex,
    documents: DocumentStore,
}

impl EngineState {
    fn empty(dimension: usize) -> Result<Self> {
        Ok(Self {
            index: FlatIndex::build(dimension)?,
            documents: DocumentStore::new(),
        })
    }

    fn scored(&self, neighbor: Neighbor) -> Result<ScoredDocument> {
        let document = self.documents.get(neighbor.slot).ok_or_else(|| {
            RetrievalError::internal(format!(
                "slot {} has a vector but no document ({} documents)",
                neighbor.slot,
                self.documents.len()
            ))
        })?;
        Ok(ScoredDocument {
            document: document.clone(),
            distance: neighbor.distance,
        })
    }
}

/// Semantic document retrieval over an in-memory corpus
pub struct RetrievalEngine {
    provider: Arc<dyn EmbeddingProvider>,
    state: RwLock<EngineState>,
}

impl RetrievalEngine {
    /// Create an empty engine sized to the provider's dimension
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let state = EngineState::empty(provider.dimension())?;
        log::info!(
            "RetrievalEngine ready ({}d, model {})",
            provider.dimension(),
            provider.model_id()
        );
        Ok(Self {
            provider,
            state: RwLock::new(state),
        })
    }

    /// Embed and append a corpus.
    ///
    /// The write lock is held for the whole load, so queries issued meanwhile
    /// wait for it to finish. Returns the number of documents added.
    pub fn index_documents(&self, corpus: Vec<SourceDocument>) -> Result<usize> {
        if corpus.is_empty() {
            return Err(RetrievalError::CorpusEmpty);
        }

        let mut state = self.state.write();

        let texts: Vec<&str> = corpus.iter().map(|d| d.text.as_str()).collect();
        let vectors = self.embed_batch(&texts)?;

        state.index.add(&vectors)?;
        let added = corpus.len();
        state.documents.extend(corpus);
        debug_assert_eq!(state.index.len(), state.documents.len());

        log::info!(
            "Indexed {} documents ({} total)",
            added,
            state.documents.len()
        );
        Ok(added)
    }

    /// Load every document in `folder` and index it
    pub fn index_folder(&self, folder: impl AsRef<Path>) -> Result<usize> {
        self.index_documents(load_corpus(folder)?)
    }

    /// Embed and append a single document, returning its slot
    pub fn add_document(&self, name: impl Into<String>, text: impl Into<String>) -> Result<usize> {
        let source = SourceDocument::new(name, text);

        let mut state = self.state.write();
        let vector = self.provider.embed_one(&source.text)?;
        state.index.add(&[vector])?;
        state.documents.extend(vec![source]);

        let slot = state.documents.len() - 1;
        log::debug!("Added document at slot {}", slot);
        Ok(slot)
    }

    /// Return the text of the document nearest to `query`.
    ///
    /// There is no relevance cutoff: the nearest document is returned however
    /// far away it is.
    pub fn get_similar_document(&self, query: &str) -> Result<String> {
        let mut hits = self.search_documents(query, 1)?;
        match hits.pop() {
            Some(hit) => Ok(hit.document.text),
            None => Err(RetrievalError::EmptyIndex),
        }
    }

    /// Return up to `k` documents ordered by ascending distance to `query`
    pub fn search_documents(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        if k == 0 {
            return Err(RetrievalError::invalid_argument("k must be at least 1"));
        }
        if self.state.read().index.is_empty() {
            return Err(RetrievalError::EmptyIndex);
        }

        let query_vector = self.provider.embed_one(query)?;

        let state = self.state.read();
        let neighbors = state.index.search(&query_vector, k)?;
        log::debug!(
            "Query ({} chars) matched {} documents",
            query.len(),
            neighbors.len()
        );

        neighbors.into_iter().map(|n| state.scored(n)).collect()
    }

    /// Replace the whole corpus.
    ///
    /// The new corpus is embedded into a fresh index first; the old state
    /// keeps serving queries until the swap and survives any error.
    pub fn rebuild(&self, corpus: Vec<SourceDocument>) -> Result<usize> {
        if corpus.is_empty() {
            return Err(RetrievalError::CorpusEmpty);
        }

        let texts: Vec<&str> = corpus.iter().map(|d| d.text.as_str()).collect();
        let vectors = self.embed_batch(&texts)?;

        let mut fresh = EngineState::empty(self.provider.dimension())?;
        fresh.index.add(&vectors)?;
        let count = corpus.len();
        fresh.documents.extend(corpus);

        *self.state.write() = fresh;
        log::info!("Rebuilt index with {} documents", count);
        Ok(count)
    }

    /// Copy the current index and documents into a snapshot
    pub fn snapshot(&self) -> IndexSnapshot {
        let state = self.state.read();
        IndexSnapshot::new(
            self.provider.model_id(),
            state.index.dimension(),
            state.index.vectors().map(<[f32]>::to_vec).collect(),
            state.documents.iter().cloned().collect(),
        )
    }

    /// Replace the current state with a snapshot taken with the same model
    pub fn restore(&self, snapshot: IndexSnapshot) -> Result<()> {
        snapshot.validate()?;
        if snapshot.model_id != self.provider.model_id() {
            return Err(RetrievalError::snapshot(format!(
                "snapshot was built with {}, engine uses {}",
                snapshot.model_id,
                self.provider.model_id()
            )));
        }
        if snapshot.dimension != self.provider.dimension() {
            return Err(RetrievalError::dimension_mismatch(
                self.provider.dimension(),
                snapshot.dimension,
            ));
        }

        let mut fresh = EngineState::empty(snapshot.dimension)?;
        fresh.index.add(&snapshot.vectors)?;
        fresh.documents = DocumentStore::from_documents(snapshot.documents);

        let count = fresh.documents.len();
        *self.state.write() = fresh;
        log::info!("Restored {} documents from snapshot", count);
        Ok(())
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.state.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a document by slot
    pub fn document(&self, slot: usize) -> Option<Document> {
        self.state.read().documents.get(slot).cloned()
    }

    /// All documents in slot order
    pub fn documents(&self) -> Vec<Document> {
        self.state.read().documents.iter().cloned().collect()
    }

    /// Vector dimension
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Get the embedding provider reference
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Get engine statistics
    pub fn stats(&self) -> serde_json::Value {
        let state = self.state.read();
        serde_json::json!({
            "documentCount": state.documents.len(),
            "vectorCount": state.index.len(),
            "dimension": state.index.dimension(),
            "model": self.provider.model_id(),
            "totalTextBytes": state.documents.text_bytes(),
        })
    }

    /// Embed a batch and check the provider honoured the batch contract
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.provider.embed(texts)?;
        if vectors.len() != texts.len() {
            return Err(RetrievalError::embedding(format!(
                "provider returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}
