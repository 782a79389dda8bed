//! Document types and the append-only document store

use serde::{Deserialize, Serialize};

/// A corpus item before it has been assigned a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Source filename or logical label
    pub name: String,
    /// Full raw content
    pub text: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A stored corpus item
///
/// `id` is the slot position shared with the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: usize,
    /// For traceability only; never used in similarity
    pub name: String,
    pub text: String,
}

/// Append-only sequence of documents, positionally aligned with a `FlatIndex`.
///
/// Mutation is crate-private: only the engine appends, and only together
/// with the matching vectors.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append sources, assigning ids from the current length
    pub(crate) fn extend(&mut self, sources: Vec<SourceDocument>) {
        let start = self.documents.len();
        self.documents.extend(
            sources
                .into_iter()
                .enumerate()
                .map(|(offset, source)| Document {
                    id: start + offset,
                    name: source.name,
                    text: source.text,
                }),
        );
    }

    /// Rebuild a store from documents whose ids already match their positions
    pub(crate) fn from_documents(documents: Vec<Document>) -> Self {
        debug_assert!(documents.iter().enumerate().all(|(i, d)| d.id == i));
        Self { documents }
    }

    pub fn get(&self, slot: usize) -> Option<&Document> {
        self.documents.get(slot)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Total bytes of document text held
    pub fn text_bytes(&self) -> usize {
        self.documents.iter().map(|d| d.text.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_assigns_sequential_ids() {
        let mut store = DocumentStore::new();
        store.extend(vec![
            SourceDocument::new("a.txt", "alpha"),
            SourceDocument::new("b.txt", "beta"),
        ]);
        store.extend(vec![SourceDocument::new("c.txt", "gamma")]);

        let ids: Vec<usize> = store.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(store.get(2).unwrap().name, "c.txt");
        assert_eq!(store.text_bytes(), 5 + 4 + 5);
    }

    #[test]
    fn test_get_out_of_range() {
        let store = DocumentStore::new();
        assert!(store.get(0).is_none());
        assert!(store.is_empty());
    }
}
