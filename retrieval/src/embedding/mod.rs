//! Embedding providers
//!
//! Everything that turns text into fixed-length vectors implements
//! [`EmbeddingProvider`]: fastembed models, the hashing embedder, and the
//! caching wrapper around either.

mod cache;
mod discovery;
#[cfg(feature = "fastembed")]
mod fastembed;
mod hashing;

pub use cache::{CachedProvider, DEFAULT_CACHE_CAPACITY};
pub use discovery::resolve_model_cache_dir;
#[cfg(feature = "fastembed")]
pub use self::fastembed::{FastEmbedConfig, FastEmbedProvider};
pub use hashing::{HashingConfig, HashingEmbedder};

use crate::error::{RetrievalError, Result};

/// Deterministic text -> vector mapping
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts.
    ///
    /// Output is order preserving: `output[i]` is the vector for `texts[i]`.
    /// An empty batch yields an empty result.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    /// Stable identifier of the model, recorded in snapshots
    fn model_id(&self) -> &str;

    /// Embed a single text (a batch of one)
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text])?
            .pop()
            .ok_or_else(|| RetrievalError::embedding("provider returned no vector"))
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for std::sync::Arc<P> {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}
