//! Index snapshots
//!
//! A snapshot is the vector array, the parallel document array and the
//! dimension, serialized with bincode. Restoring one skips re-embedding the
//! corpus on restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::{RetrievalError, Result};

/// Bumped whenever the serialized layout changes
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Serializable copy of an engine's index and document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub format_version: u32,
    /// Provider that produced the vectors
    pub model_id: String,
    pub dimension: usize,
    pub created_at: DateTime<Utc>,
    /// `vectors[i]` belongs to `documents[i]`
    pub vectors: Vec<Vec<f32>>,
    pub documents: Vec<Document>,
}

impl IndexSnapshot {
    pub fn new(
        model_id: impl Into<String>,
        dimension: usize,
        vectors: Vec<Vec<f32>>,
        documents: Vec<Document>,
    ) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            model_id: model_id.into(),
            dimension,
            created_at: Utc::now(),
            vectors,
            documents,
        }
    }

    /// Check the positional alignment and dimension invariants
    pub fn validate(&self) -> Result<()> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(RetrievalError::snapshot(format!(
                "unsupported format version {} (expected {})",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }
        if self.dimension == 0 {
            return Err(RetrievalError::snapshot("dimension is zero"));
        }
        if self.vectors.len() != self.documents.len() {
            return Err(RetrievalError::snapshot(format!(
                "{} vectors but {} documents",
                self.vectors.len(),
                self.documents.len()
            )));
        }
        if let Some((slot, v)) = self
            .vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != self.dimension)
        {
            return Err(RetrievalError::snapshot(format!(
                "vector {} has {} components, expected {}",
                slot,
                v.len(),
                self.dimension
            )));
        }
        if let Some((slot, doc)) = self
            .documents
            .iter()
            .enumerate()
            .find(|(slot, doc)| doc.id != *slot)
        {
            return Err(RetrievalError::snapshot(format!(
                "document {} stored at slot {}",
                doc.id, slot
            )));
        }
        Ok(())
    }

    /// Write the snapshot atomically (temp file + rename)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = temp_path(path)?;
        if let Err(e) = self.write_to(&tmp).and_then(|()| Ok(std::fs::rename(&tmp, path)?)) {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    log::warn!(
                        "Failed to remove temporary snapshot {}: {}",
                        tmp.display(),
                        cleanup
                    );
                }
            }
            return Err(e);
        }

        log::info!(
            "Saved snapshot of {} documents ({}d, {}) to {}",
            self.documents.len(),
            self.dimension,
            self.model_id,
            path.display()
        );
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Read and validate a snapshot
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        // Decoding from a slice bounds every length prefix by the bytes present
        let bytes = std::fs::read(path)?;
        let snapshot: Self = bincode::deserialize(&bytes).map_err(|e| {
            RetrievalError::snapshot(format!("failed to decode {}: {}", path.display(), e))
        })?;
        snapshot.validate()?;

        log::info!(
            "Loaded snapshot of {} documents ({}d, {}, created {})",
            snapshot.documents.len(),
            snapshot.dimension,
            snapshot.model_id,
            snapshot.created_at
        );
        Ok(snapshot)
    }
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| RetrievalError::invalid_path(format!("{}", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}
