use crate::analyzer::Analyzer;
use crate::dictionary::Dictionary;
use crate::error::{IrError, Result};
use crate::store::Document;
use crate::DocId;
use std::collections::{HashMap, HashSet};

/// Outcome of a batch indexing pass.
#[derive(Debug, Default)]
pub struct IndexReport {
    pub indexed: usize,
    pub failed: usize,
    pub failures: Vec<(DocId, IrError)>,
}

/// Builds a [`Dictionary`] from documents: tokenize, filter, stem, count per
/// document, then commit one posting per distinct term.
#[derive(Debug, Default)]
pub struct Indexer {
    analyzer: Analyzer,
    dictionary: Dictionary,
    indexed: HashSet<DocId>,
}

impl Indexer {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer, dictionary: Dictionary::new(), indexed: HashSet::new() }
    }

    pub fn analyzer(&self) -> &Analyzer { &self.analyzer }

    pub fn dictionary(&self) -> &Dictionary { &self.dictionary }

    pub fn into_parts(self) -> (Dictionary, Analyzer) {
        (self.dictionary, self.analyzer)
    }

    /// Index one document and return the number of distinct terms it added
    /// postings for. Empty documents contribute nothing.
    pub fn index_document(&mut self, doc: &Document) -> Result<usize> {
        let doc_id = doc.id();
        if doc_id == 0 {
            return Err(IrError::InvalidDocumentId);
        }
        if self.indexed.contains(&doc_id) {
            return Err(IrError::DuplicateDocument(doc_id));
        }

        let mut tf_counts: HashMap<String, u32> = HashMap::new();
        for term in self.analyzer.analyze(doc.content()) {
            *tf_counts.entry(term).or_insert(0) += 1;
        }

        let distinct = tf_counts.len();
        for (term, tf) in tf_counts {
            self.dictionary.add_posting_with_frequency(&term, doc_id, tf);
        }
        self.indexed.insert(doc_id);
        tracing::debug!(doc_id, name = doc.name(), terms = distinct, "indexed document");
        Ok(distinct)
    }

    /// Index every document; a failing document is recorded in the report
    /// and the batch carries on.
    pub fn index_all<'a, I>(&mut self, docs: I) -> IndexReport
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut report = IndexReport::default();
        for doc in docs {
            match self.index_document(doc) {
                Ok(_) => report.indexed += 1,
                Err(err) => {
                    tracing::warn!(
                        doc_id = doc.id(),
                        name = doc.name(),
                        error = %err,
                        "skipping document"
                    );
                    report.failed += 1;
                    report.failures.push((doc.id(), err));
                }
            }
        }
        tracing::info!(
            indexed = report.indexed,
            failed = report.failed,
            terms = self.dictionary.len(),
            "indexing pass complete"
        );
        report
    }
}
