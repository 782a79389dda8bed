//! Embedding cache
//!
//! Wraps any provider with a bounded LRU cache for repeated lookups. Query
//! text is free-form, so the cache evicts rather than grows with every
//! distinct query a long-running server sees.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

use super::EmbeddingProvider;
use crate::error::{RetrievalError, Result};

/// Entries kept by [`CachedProvider::new`]
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Provider wrapper with a bounded text -> vector cache
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedProvider<P> {
    /// Wrap `inner` with a cache of [`DEFAULT_CACHE_CAPACITY`] entries
    pub fn new(inner: P) -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::build(inner, capacity)
    }

    /// Wrap `inner` with a cache holding at most `capacity` entries
    pub fn with_capacity(inner: P, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            RetrievalError::config("embedding cache capacity must be greater than zero")
        })?;
        Ok(Self::build(inner, capacity))
    }

    fn build(inner: P, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get the wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.lock().len()
    }

    /// Maximum number of cached entries
    pub fn capacity(&self) -> usize {
        self.cache.lock().cap().get()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedProvider<P> {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        // Check cache for all texts; the lock is not held across the inner call
        let mut results: Vec<Option<Vec<f32>>> = {
            let mut cache = self.cache.lock();
            texts.iter().map(|text| cache.get(*text).cloned()).collect()
        };

        // Find uncached texts
        let uncached: Vec<(usize, &str)> = results
            .iter()
            .enumerate()
            .filter(|(_, cached)| cached.is_none())
            .map(|(i, _)| (i, texts[i]))
            .collect();

        if uncached.is_empty() {
            return Ok(results.into_iter().flatten().collect());
        }

        // Batch embed uncached texts
        let uncached_texts: Vec<&str> = uncached.iter().map(|(_, t)| *t).collect();
        let new_embeddings = self.inner.embed(&uncached_texts)?;
        if new_embeddings.len() != uncached_texts.len() {
            return Err(RetrievalError::embedding(format!(
                "provider returned {} vectors for {} texts",
                new_embeddings.len(),
                uncached_texts.len()
            )));
        }

        // Update cache and results
        let mut cache = self.cache.lock();
        for ((idx, text), emb) in uncached.iter().zip(new_embeddings) {
            cache.put(text.to_string(), emb.clone());
            results[*idx] = Some(emb);
        }

        Ok(results.into_iter().flatten().collect())
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        inner: HashingEmbedder,
        texts_seen: AtomicUsize,
    }

    impl EmbeddingProvider for CountingProvider {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            self.texts_seen.fetch_add(texts.len(), Ordering::SeqCst);
            self.inner.embed(texts)
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn model_id(&self) -> &str {
            self.inner.model_id()
        }
    }

    fn counting_inner() -> CountingProvider {
        CountingProvider {
            inner: HashingEmbedder::with_dimension(16).unwrap(),
            texts_seen: AtomicUsize::new(0),
        }
    }

    fn counting() -> CachedProvider<CountingProvider> {
        CachedProvider::new(counting_inner())
    }

    #[test]
    fn test_each_text_embedded_once() {
        let provider = counting();

        let first = provider.embed(&["fever", "cough"]).unwrap();
        let second = provider.embed(&["cough", "rash", "fever"]).unwrap();

        assert_eq!(provider.inner().texts_seen.load(Ordering::SeqCst), 3);
        assert_eq!(provider.cache_size(), 3);
        assert_eq!(second[0], first[1]);
        assert_eq!(second[2], first[0]);
    }

    #[test]
    fn test_clear_cache_forces_reembed() {
        let provider = counting();
        provider.embed_one("fever").unwrap();
        provider.clear_cache();
        provider.embed_one("fever").unwrap();
        assert_eq!(provider.inner().texts_seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_size_bounded_by_capacity() {
        let provider = CachedProvider::with_capacity(counting_inner(), 64).unwrap();

        for i in 0..10_000 {
            provider.embed_one(&format!("distinct query number {}", i)).unwrap();
        }

        assert_eq!(provider.capacity(), 64);
        assert!(provider.cache_size() <= 64);
        assert_eq!(provider.inner().texts_seen.load(Ordering::SeqCst), 10_000);
    }

    #[test]
    fn test_least_recently_used_entry_evicted() {
        let provider = CachedProvider::with_capacity(counting_inner(), 2).unwrap();

        provider.embed_one("fever").unwrap();
        provider.embed_one("cough").unwrap();
        // Touch "fever" so "cough" is the eviction candidate
        provider.embed_one("fever").unwrap();
        provider.embed_one("rash").unwrap();
        assert_eq!(provider.inner().texts_seen.load(Ordering::SeqCst), 3);

        provider.embed_one("fever").unwrap();
        assert_eq!(provider.inner().texts_seen.load(Ordering::SeqCst), 3);
        provider.embed_one("cough").unwrap();
        assert_eq!(provider.inner().texts_seen.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_batch_larger_than_capacity_returns_every_vector() {
        let provider = CachedProvider::with_capacity(counting_inner(), 2).unwrap();

        let vectors = provider.embed(&["fever", "cough", "rash", "nausea"]).unwrap();

        assert_eq!(vectors.len(), 4);
        assert_eq!(provider.cache_size(), 2);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = CachedProvider::with_capacity(counting_inner(), 0).err().unwrap();
        assert!(matches!(err, RetrievalError::Config(_)));
    }
}
