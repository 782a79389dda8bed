//! fastembed (ONNX Runtime) sentence embeddings
//!
//! Default model is all-MiniLM-L6-v2 (384 dimensions).

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use std::path::PathBuf;

use super::discovery::resolve_model_cache_dir;
use super::EmbeddingProvider;
use crate::error::{RetrievalError, Result};

/// fastembed configuration
#[derive(Debug, Clone)]
pub struct FastEmbedConfig {
    /// Model to load (default: AllMiniLML6V2)
    pub model: EmbeddingModel,
    /// Where model files are cached; resolved from the environment if unset
    pub cache_dir: Option<PathBuf>,
    /// Print a progress bar while downloading (default: false)
    pub show_download_progress: bool,
    /// Batch size for encoding (default: 256)
    pub batch_size: usize,
}

impl Default for FastEmbedConfig {
    fn default() -> Self {
        Self {
            model: EmbeddingModel::AllMiniLML6V2,
            cache_dir: None,
            show_download_progress: false,
            batch_size: 256,
        }
    }
}

/// fastembed model wrapper
pub struct FastEmbedProvider {
    model: Mutex<TextEmbedding>,
    config: FastEmbedConfig,
    dimension: usize,
    model_id: String,
}

impl FastEmbedProvider {
    /// Load the default model (all-MiniLM-L6-v2)
    pub fn new() -> Result<Self> {
        Self::with_config(FastEmbedConfig::default())
    }

    /// Load a model, downloading it into the cache directory on first use
    pub fn with_config(config: FastEmbedConfig) -> Result<Self> {
        let cache_dir = resolve_model_cache_dir(config.cache_dir.as_deref())?;
        std::fs::create_dir_all(&cache_dir)?;

        log::info!(
            "Loading fastembed model {:?} (cache: {})",
            config.model,
            cache_dir.display()
        );

        let options = InitOptions::new(config.model.clone())
            .with_cache_dir(cache_dir)
            .with_show_download_progress(config.show_download_progress);

        let model = TextEmbedding::try_new(options)
            .map_err(|e| RetrievalError::model(format!("Failed to load {:?}: {}", config.model, e)))?;

        // Get dimension by encoding test string
        let test_embed = model
            .embed(vec!["test"], None)
            .map_err(|e| RetrievalError::model(format!("Failed to encode test string: {}", e)))?;
        let dimension = test_embed.first().map(Vec::len).unwrap_or(0);
        if dimension == 0 {
            return Err(RetrievalError::model("model produced an empty test embedding"));
        }

        let model_id = format!("fastembed/{:?}", config.model);
        log::info!("Loaded {} ({}d, batch size {})", model_id, dimension, config.batch_size);

        Ok(Self {
            model: Mutex::new(model),
            config,
            dimension,
            model_id,
        })
    }

    /// Get configuration
    pub fn config(&self) -> &FastEmbedConfig {
        &self.config
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = self.model.lock();
        model
            .embed(texts.to_vec(), Some(self.config.batch_size))
            .map_err(|e| RetrievalError::embedding(format!("Failed to encode texts: {}", e)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
