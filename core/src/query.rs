use crate::analyzer::Analyzer;
use crate::dictionary::{Dictionary, Term};
use crate::error::IrError;
use crate::postings::PostingList;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    And,
    Or,
}

impl FromStr for BooleanOp {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(BooleanOp::And),
            "or" => Ok(BooleanOp::Or),
            _ => Err(IrError::UnknownOperator(s.to_owned())),
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BooleanOp::And => "AND",
            BooleanOp::Or => "OR",
        })
    }
}

/// Raw query terms combined with one operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub op: BooleanOp,
    pub terms: Vec<String>,
}

impl Query {
    pub fn new<S: Into<String>>(op: BooleanOp, terms: impl IntoIterator<Item = S>) -> Self {
        Self { op, terms: terms.into_iter().map(Into::into).collect() }
    }

    /// Split free text into query terms with the document tokenizer.
    pub fn parse(op: BooleanOp, text: &str) -> Self {
        Self::new(op, tokenize(text))
    }
}

/// A query term that survived normalisation and exists in the dictionary.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTerm<'a> {
    pub term: &'a Term,
    pub postings: &'a PostingList,
}

/// Decides the order in which conjunctive terms are merged. The result set
/// never depends on it, only the amount of merge work does.
pub trait TermOrder {
    fn arrange(&self, terms: &mut [ResolvedTerm<'_>]);
}

/// Merge in the order the terms were written.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsWritten;

impl TermOrder for AsWritten {
    fn arrange(&self, _terms: &mut [ResolvedTerm<'_>]) {}
}

/// Merge the rarest terms first. Ties keep their written order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByDocumentFrequency;

impl TermOrder for ByDocumentFrequency {
    fn arrange(&self, terms: &mut [ResolvedTerm<'_>]) {
        terms.sort_by_key(|t| t.term.document_frequency());
    }
}

/// Evaluates boolean queries against a built dictionary, normalising terms
/// with the same analyzer used at indexing time.
pub struct QueryProcessor<'a, O = AsWritten> {
    dictionary: &'a Dictionary,
    analyzer: &'a Analyzer,
    order: O,
}

pub type OptimizedQueryProcessor<'a> = QueryProcessor<'a, ByDocumentFrequency>;

impl<'a> QueryProcessor<'a> {
    pub fn new(dictionary: &'a Dictionary, analyzer: &'a Analyzer) -> Self {
        Self { dictionary, analyzer, order: AsWritten }
    }
}

impl<'a> OptimizedQueryProcessor<'a> {
    pub fn optimized(dictionary: &'a Dictionary, analyzer: &'a Analyzer) -> Self {
        Self { dictionary, analyzer, order: ByDocumentFrequency }
    }
}

impl<'a, O: TermOrder> QueryProcessor<'a, O> {
    pub fn with_order<P: TermOrder>(self, order: P) -> QueryProcessor<'a, P> {
        QueryProcessor { dictionary: self.dictionary, analyzer: self.analyzer, order }
    }

    fn resolve(&self, raw: &str) -> Option<ResolvedTerm<'a>> {
        let text = self.analyzer.normalize(raw)?;
        let (term, postings) = self.dictionary.lookup(&text)?;
        Some(ResolvedTerm { term, postings })
    }

    /// Posting list of a single term; empty for stop words and unknown terms.
    pub fn process_term(&self, raw: &str) -> &'a PostingList {
        static EMPTY: PostingList = PostingList::new();
        self.resolve(raw).map(|t| t.postings).unwrap_or(&EMPTY)
    }

    /// AND of the terms. Terms that are filtered out or unknown are dropped
    /// rather than emptying the result; no usable term means no results.
    pub fn process_conjunctive<S: AsRef<str>>(&self, terms: &[S]) -> PostingList {
        let mut resolved: Vec<ResolvedTerm<'a>> =
            terms.iter().filter_map(|t| self.resolve(t.as_ref())).collect();
        self.order.arrange(&mut resolved);

        let mut rest = resolved.iter();
        let Some(first) = rest.next() else {
            return PostingList::new();
        };
        let mut result = first.postings.clone();
        for t in rest {
            if result.is_empty() {
                break;
            }
            result = result.intersect(t.postings);
        }
        result
    }

    /// OR of the terms; unknown and filtered terms contribute nothing.
    pub fn process_disjunctive<S: AsRef<str>>(&self, terms: &[S]) -> PostingList {
        terms
            .iter()
            .filter_map(|t| self.resolve(t.as_ref()))
            .fold(PostingList::new(), |acc, t| acc.union(t.postings))
    }

    pub fn process(&self, query: &Query) -> PostingList {
        match query.op {
            BooleanOp::And => self.process_conjunctive(&query.terms),
            BooleanOp::Or => self.process_disjunctive(&query.terms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::Indexer;
    use crate::stopwords::StopWords;
    use crate::store::DocumentStore;
    use crate::DocId;

    fn build() -> Indexer {
        let mut store = DocumentStore::new();
        store.push("doc1", "the cat sat on the mat");
        store.push("doc2", "cats and dogs run");
        store.push("doc3", "the dog ran");
        let mut idx = Indexer::new(Analyzer::new(Some(StopWords::parse("the\non\nand")), true));
        idx.index_all(&store);
        idx
    }

    fn ids(list: &PostingList) -> Vec<DocId> {
        list.doc_ids().collect()
    }

    #[test]
    fn parses_operators() {
        assert_eq!("AND".parse::<BooleanOp>().unwrap(), BooleanOp::And);
        assert_eq!(" or ".parse::<BooleanOp>().unwrap(), BooleanOp::Or);
        assert!(matches!("xor".parse::<BooleanOp>(), Err(IrError::UnknownOperator(_))));
    }

    #[test]
    fn single_term_lookup_normalises() {
        let idx = build();
        let qp = QueryProcessor::new(idx.dictionary(), idx.analyzer());
        assert_eq!(ids(qp.process_term("Cats")), vec![1, 2]);
        assert!(qp.process_term("the").is_empty());
        assert!(qp.process_term("zebra").is_empty());
    }

    #[test]
    fn conjunctive_drops_unknown_terms() {
        let idx = build();
        let qp = QueryProcessor::new(idx.dictionary(), idx.analyzer());
        assert_eq!(ids(&qp.process_conjunctive(&["cat", "mat"])), vec![1]);
        assert_eq!(ids(&qp.process_conjunctive(&["cat", "zebra"])), vec![1, 2]);
        assert!(qp.process_conjunctive(&["zebra"]).is_empty());
        assert!(qp.process_conjunctive::<&str>(&[]).is_empty());
        assert!(qp.process_conjunctive(&["mat", "ran"]).is_empty());
    }

    #[test]
    fn disjunctive_unions_frequencies() {
        let idx = build();
        let qp = QueryProcessor::new(idx.dictionary(), idx.analyzer());
        let result = qp.process_disjunctive(&["cat", "dog"]);
        let pairs: Vec<(DocId, u32)> = result.iter().map(|p| (p.doc_id, p.frequency)).collect();
        assert_eq!(pairs, vec![(1, 1), (2, 2), (3, 1)]);
        assert!(qp.process_disjunctive(&["zebra", "the"]).is_empty());
    }

    #[test]
    fn optimized_orders_by_document_frequency() {
        let idx = build();
        let plain = QueryProcessor::new(idx.dictionary(), idx.analyzer());
        let fast = OptimizedQueryProcessor::optimized(idx.dictionary(), idx.analyzer());
        let query = Query::parse(BooleanOp::And, "dog, cat; mat");
        assert_eq!(plain.process(&query), fast.process(&query));
        assert_eq!(ids(&fast.process(&query)), Vec::<DocId>::new());

        let query = Query::new(BooleanOp::And, ["dogs", "cats"]);
        assert_eq!(ids(&fast.process(&query)), vec![2]);
    }

    #[test]
    fn with_order_swaps_policy() {
        let idx = build();
        let qp = QueryProcessor::new(idx.dictionary(), idx.analyzer())
            .with_order(ByDocumentFrequency);
        assert_eq!(ids(&qp.process_conjunctive(&["cat", "mat"])), vec![1]);
    }
}
