use crate::error::{IrError, Result};
use crate::postings::PostingList;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

static EMPTY_POSTINGS: PostingList = PostingList::new();

/// Vocabulary entry with its aggregate statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    text: String,
    document_frequency: u32,
    collection_frequency: u64,
}

impl Term {
    fn new(text: &str) -> Self {
        Self { text: text.to_owned(), document_frequency: 0, collection_frequency: 0 }
    }

    pub fn text(&self) -> &str { &self.text }

    /// Number of documents containing the term.
    pub fn document_frequency(&self) -> u32 { self.document_frequency }

    /// Total number of occurrences across the collection.
    pub fn collection_frequency(&self) -> u64 { self.collection_frequency }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (df={}, cf={})",
            self.text, self.document_frequency, self.collection_frequency
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    term: Term,
    postings: PostingList,
}

/// Term text -> (term statistics, posting list).
///
/// Both halves live in one entry so a term exists exactly when its posting
/// list does, and enumeration is lexicographic by term text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    entries: BTreeMap<String, Entry>,
}

impl Dictionary {
    pub fn new() -> Self { Self::default() }

    /// Returns the term, creating it with an empty posting list if needed.
    pub fn add_term(&mut self, text: &str) -> &Term {
        &self.entry_mut(text).term
    }

    /// Record one occurrence of `text` in `doc_id`.
    pub fn add_posting(&mut self, text: &str, doc_id: DocId) {
        self.add_posting_with_frequency(text, doc_id, 1);
    }

    /// Record `frequency` occurrences of `text` in `doc_id`. Document
    /// frequency grows only the first time the document is seen for the term.
    pub fn add_posting_with_frequency(&mut self, text: &str, doc_id: DocId, frequency: u32) {
        let entry = self.entry_mut(text);
        if frequency == 0 {
            return;
        }
        if entry.postings.add_with_frequency(doc_id, frequency) {
            entry.term.document_frequency = entry.term.document_frequency.saturating_add(1);
        }
        let term = &mut entry.term;
        term.collection_frequency = term.collection_frequency.saturating_add(u64::from(frequency));
    }

    pub fn contains_term(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    pub fn term(&self, text: &str) -> Option<&Term> {
        self.entries.get(text).map(|e| &e.term)
    }

    /// Posting list for `text`; unknown terms get an empty list.
    pub fn posting_list(&self, text: &str) -> &PostingList {
        self.entries.get(text).map(|e| &e.postings).unwrap_or(&EMPTY_POSTINGS)
    }

    pub(crate) fn lookup(&self, text: &str) -> Option<(&Term, &PostingList)> {
        self.entries.get(text).map(|e| (&e.term, &e.postings))
    }

    /// Terms in lexicographic order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.entries.values().map(|e| &e.term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &PostingList)> {
        self.entries.values().map(|e| (&e.term, &e.postings))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// The `n` terms with the highest collection frequency, ties broken by
    /// term text.
    pub fn most_frequent(&self, n: usize) -> Vec<&Term> {
        let mut terms: Vec<&Term> = self.terms().collect();
        terms.sort_by(|a, b| {
            b.collection_frequency
                .cmp(&a.collection_frequency)
                .then_with(|| a.text.cmp(&b.text))
        });
        terms.truncate(n);
        terms
    }

    /// Verify the counters and posting-list invariants of every term.
    pub fn validate(&self) -> Result<()> {
        for (key, entry) in &self.entries {
            let Entry { term, postings } = entry;
            if term.text != *key {
                let msg = format!("term `{}` stored under key `{key}`", term.text);
                return Err(IrError::CorruptIndex(msg));
            }
            if !postings.is_well_formed() {
                let msg = format!("postings of `{key}` are not strictly ordered");
                return Err(IrError::CorruptIndex(msg));
            }
            if term.document_frequency as usize != postings.len() {
                return Err(IrError::CorruptIndex(format!(
                    "`{key}` has df={} but {} postings",
                    term.document_frequency,
                    postings.len()
                )));
            }
            if term.collection_frequency != postings.total_frequency() {
                return Err(IrError::CorruptIndex(format!(
                    "`{key}` has cf={} but postings sum to {}",
                    term.collection_frequency,
                    postings.total_frequency()
                )));
            }
        }
        Ok(())
    }

    fn entry_mut(&mut self, text: &str) -> &mut Entry {
        self.entries
            .entry(text.to_owned())
            .or_insert_with(|| Entry { term: Term::new(text), postings: PostingList::new() })
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (term, postings) in self.iter() {
            writeln!(f, "{term} -> {postings}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_term_is_idempotent() {
        let mut dict = Dictionary::new();
        dict.add_term("cat");
        dict.add_term("cat");
        assert_eq!(dict.len(), 1);
        assert!(dict.posting_list("cat").is_empty());
        assert_eq!(dict.term("cat").map(Term::document_frequency), Some(0));
    }

    #[test]
    fn counters_follow_postings() {
        let mut dict = Dictionary::new();
        dict.add_posting("cat", 2);
        dict.add_posting("cat", 2);
        dict.add_posting("cat", 1);
        dict.add_posting_with_frequency("cat", 7, 3);

        let term = dict.term("cat").unwrap();
        assert_eq!(term.document_frequency(), 3);
        assert_eq!(term.collection_frequency(), 6);
        let ids: Vec<DocId> = dict.posting_list("cat").doc_ids().collect();
        assert_eq!(ids, vec![1, 2, 7]);
        dict.validate().unwrap();
    }

    #[test]
    fn huge_frequencies_do_not_overflow() {
        let mut dict = Dictionary::new();
        dict.add_posting_with_frequency("cat", 1, u32::MAX);
        dict.add_posting_with_frequency("cat", 1, u32::MAX);

        let term = dict.term("cat").unwrap();
        assert_eq!(term.document_frequency(), 1);
        assert_eq!(term.collection_frequency(), 2 * u64::from(u32::MAX));
        assert_eq!(dict.posting_list("cat").find(1).map(|p| p.frequency), Some(u32::MAX));
    }

    #[test]
    fn unknown_term_yields_empty_list() {
        let dict = Dictionary::new();
        assert!(dict.posting_list("nope").is_empty());
        assert!(dict.term("nope").is_none());
        assert!(!dict.contains_term("nope"));
    }

    #[test]
    fn terms_enumerate_in_lexicographic_order() {
        let mut dict = Dictionary::new();
        for t in ["mat", "cat", "dog", "ant"] {
            dict.add_posting(t, 1);
        }
        let texts: Vec<&str> = dict.terms().map(Term::text).collect();
        assert_eq!(texts, vec!["ant", "cat", "dog", "mat"]);
    }

    #[test]
    fn most_frequent_orders_by_cf_then_text() {
        let mut dict = Dictionary::new();
        dict.add_posting_with_frequency("b", 1, 3);
        dict.add_posting_with_frequency("a", 1, 3);
        dict.add_posting_with_frequency("c", 2, 5);
        dict.add_posting("d", 2);
        let top: Vec<&str> = dict.most_frequent(3).into_iter().map(Term::text).collect();
        assert_eq!(top, vec!["c", "a", "b"]);
    }

    #[test]
    fn validate_rejects_tampered_counters() {
        let mut dict = Dictionary::new();
        dict.add_posting("cat", 1);
        if let Some(entry) = dict.entries.get_mut("cat") {
            entry.term.document_frequency = 4;
        }
        assert!(matches!(dict.validate(), Err(IrError::CorruptIndex(_))));
    }
}
