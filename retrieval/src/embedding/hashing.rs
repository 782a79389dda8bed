//! Feature-hashing bag-of-words embedder
//!
//! Deterministic across processes and platforms, needs no model files.
//! Each token is hashed with FNV-1a into one of `dimension` buckets with a
//! sign taken from the top hash bit; the result is L2 normalized so squared
//! L2 distance ranks like cosine similarity.

use super::EmbeddingProvider;
use crate::error::{RetrievalError, Result};

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Hashing embedder configuration
#[derive(Debug, Clone)]
pub struct HashingConfig {
    /// Output dimension (default: 384)
    pub dimension: usize,
    /// Tokens shorter than this many characters are ignored (default: 3)
    pub min_token_len: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            min_token_len: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    config: HashingConfig,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new(config: HashingConfig) -> Result<Self> {
        if config.dimension == 0 {
            return Err(RetrievalError::config(
                "hashing embedder dimension must be greater than zero",
            ));
        }
        let model_id = format!(
            "hashing-fnv1a/{}d/min{}",
            config.dimension, config.min_token_len
        );
        Ok(Self { config, model_id })
    }

    /// Embedder with the given dimension and default tokenization
    pub fn with_dimension(dimension: usize) -> Result<Self> {
        Self::new(HashingConfig {
            dimension,
            ..HashingConfig::default()
        })
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let dimension = self.config.dimension;
        let mut vector = vec![0.0_f32; dimension];

        for token in tokenize(text, self.config.min_token_len) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Lowercase alphanumeric tokens of at least `min_len` characters
fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() >= min_len)
        .map(String::from)
        .collect()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
