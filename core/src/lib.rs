//! Boolean information-retrieval core: tokenizer, stop filter, Porter
//! stemmer, inverted index with sorted posting lists, and AND/OR query
//! evaluation over the built index.

pub mod analyzer;
pub mod dictionary;
pub mod error;
pub mod indexer;
pub mod persist;
pub mod postings;
pub mod query;
pub mod stemmer;
pub mod stopwords;
pub mod store;
pub mod tokenizer;

pub use analyzer::Analyzer;
pub use dictionary::{Dictionary, Term};
pub use error::{IrError, Result};
pub use indexer::{IndexReport, Indexer};
pub use postings::{Posting, PostingList};
pub use query::{BooleanOp, OptimizedQueryProcessor, Query, QueryProcessor};
pub use stopwords::StopWords;
pub use store::{Document, DocumentStore};

/// Dense document identifier, assigned from 1 in ingestion order.
pub type DocId = u32;
