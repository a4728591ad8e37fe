use crate::DocId;
use serde::{Deserialize, Serialize};

/// Immutable source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: DocId,
    name: String,
    content: String,
}

impl Document {
    pub fn new(id: DocId, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id, name: name.into(), content: content.into() }
    }

    pub fn id(&self) -> DocId { self.id }

    pub fn name(&self) -> &str { &self.name }

    pub fn content(&self) -> &str { &self.content }
}

/// Owns the documents of a collection and hands out dense ids from 1 in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStore {
    docs: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, name: impl Into<String>, content: impl Into<String>) -> DocId {
        let id = self.next_id();
        self.docs.push(Document::new(id, name, content));
        id
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        let idx = (id as usize).checked_sub(1)?;
        self.docs.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> { self.docs.iter() }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    fn next_id(&self) -> DocId {
        self.docs.len() as DocId + 1
    }

    /// Ids must run 1..=len in order; checked after deserialization.
    pub(crate) fn is_dense(&self) -> bool {
        self.docs.iter().enumerate().all(|(i, d)| d.id as usize == i + 1)
    }
}

impl<'a> IntoIterator for &'a DocumentStore {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_from_one() {
        let mut store = DocumentStore::new();
        assert_eq!(store.push("a.txt", "alpha"), 1);
        assert_eq!(store.push("b.txt", "beta"), 2);
        assert_eq!(store.get(2).map(Document::name), Some("b.txt"));
        assert!(store.get(0).is_none());
        assert!(store.get(3).is_none());
        assert!(store.is_dense());
    }
}
