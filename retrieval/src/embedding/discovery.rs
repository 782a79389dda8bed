//! Model cache discovery
//!
//! Decides where ONNX model files are downloaded to and loaded from.

use crate::error::{RetrievalError, Result};
use std::path::{Path, PathBuf};

/// Resolve the model cache directory with priority:
/// 1. Explicit path (CLI flag / config)
/// 2. MEDRAG_MODELS_PATH environment variable
/// 3. FASTEMBED_CACHE_DIR environment variable
/// 4. User home directory (~/.medrag/models)
pub fn resolve_model_cache_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        log::info!("Using configured model cache: {}", path.display());
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env_path("MEDRAG_MODELS_PATH") {
        log::info!("Using MEDRAG_MODELS_PATH: {}", path.display());
        return Ok(path);
    }

    if let Some(path) = env_path("FASTEMBED_CACHE_DIR") {
        log::info!("Using FASTEMBED_CACHE_DIR: {}", path.display());
        return Ok(path);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        let user_path = PathBuf::from(home).join(".medrag").join("models");
        log::info!("Using user model cache: {}", user_path.display());
        return Ok(user_path);
    }

    Err(RetrievalError::model(
        "No model cache directory available. Checked:\n\
         - --model-cache flag\n\
         - MEDRAG_MODELS_PATH environment variable\n\
         - FASTEMBED_CACHE_DIR environment variable\n\
         - HOME / USERPROFILE",
    ))
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let dir = Path::new("/opt/models");
        assert_eq!(resolve_model_cache_dir(Some(dir)).unwrap(), dir);
    }

    #[test]
    fn test_fallback_resolves_somewhere() {
        // Depends on the environment; either a path or a descriptive error
        match resolve_model_cache_dir(None) {
            Ok(path) => assert!(!path.as_os_str().is_empty()),
            Err(e) => assert!(e.to_string().contains("model cache")),
        }
    }
}
