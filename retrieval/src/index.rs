//! Exact nearest-neighbor index
//!
//! Flat (brute force) index over squared Euclidean distance. Vectors live in
//! one contiguous buffer; slot `i` occupies `data[i * dim..(i + 1) * dim]`.

use crate::error::{RetrievalError, Result};

/// A search hit: slot position and squared L2 distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub slot: usize,
    pub distance: f32,
}

/// Append-only flat L2 index
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimension` components
    pub fn build(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RetrievalError::config(
                "index dimension must be greater than zero",
            ));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// Append vectors in order.
    ///
    /// All vectors are checked before any is stored, so a failed call leaves
    /// the index untouched.
    pub fn add<V: AsRef<[f32]>>(&mut self, vectors: &[V]) -> Result<()> {
        self.check_dimensions(vectors)?;

        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector.as_ref());
        }
        Ok(())
    }

    /// Fail with `DimensionMismatch` on the first vector of the wrong length
    pub(crate) fn check_dimensions<V: AsRef<[f32]>>(&self, vectors: &[V]) -> Result<()> {
        match vectors
            .iter()
            .map(|v| v.as_ref().len())
            .find(|&len| len != self.dimension)
        {
            Some(actual) => Err(RetrievalError::dimension_mismatch(self.dimension, actual)),
            None => Ok(()),
        }
    }

    /// Return the `k` closest vectors by ascending squared L2 distance.
    ///
    /// Ties are broken by the lower slot. `k` larger than the index is clamped.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(RetrievalError::invalid_argument("k must be at least 1"));
        }
        if self.is_empty() {
            return Err(RetrievalError::EmptyIndex);
        }
        if query.len() != self.dimension {
            return Err(RetrievalError::dimension_mismatch(
                self.dimension,
                query.len(),
            ));
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(slot, vector)| Neighbor {
                slot,
                distance: squared_l2(query, vector),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.slot.cmp(&b.slot))
        });
        neighbors.truncate(k);

        log::debug!(
            "FlatIndex search: k={}, scanned {} vectors, best={:?}",
            k,
            self.len(),
            neighbors.first()
        );

        Ok(neighbors)
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Configured vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Borrow the vector stored at `slot`
    pub fn vector(&self, slot: usize) -> Option<&[f32]> {
        let start = slot.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Iterate over stored vectors in slot order
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }
}

/// Squared Euclidean distance (no square root)
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
