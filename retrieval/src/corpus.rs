//! Corpus folder loading
//!
//! One plain-text file per document; the file name is the display label.

use std::path::Path;

use crate::document::SourceDocument;
use crate::error::{RetrievalError, Result};

/// Folder the server indexes when none is given
pub const DEFAULT_CORPUS_DIR: &str = "medical_docs";

/// Read every regular, non-hidden file directly inside `folder`.
///
/// Subdirectories are skipped. Documents come back sorted by file name so
/// slot assignment does not depend on directory iteration order.
pub fn load_corpus(folder: impl AsRef<Path>) -> Result<Vec<SourceDocument>> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(RetrievalError::invalid_path(format!(
            "corpus folder not found: {}",
            folder.display()
        )));
    }

    let mut documents = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        if name.starts_with('.') || !path.is_file() {
            log::debug!("Skipping corpus entry: {}", path.display());
            continue;
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))?;
        documents.push(SourceDocument { name, text });
    }

    documents.sort_by(|a, b| a.name.cmp(&b.name));

    log::info!(
        "Loaded {} documents from {}",
        documents.len(),
        folder.display()
    );
    Ok(documents)
}
