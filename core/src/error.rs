use crate::DocId;

/// Errors surfaced by the core.
///
/// Data-shape conditions (unknown term, empty posting list, empty query)
/// are not errors: they resolve to empty results.
#[derive(thiserror::Error, Debug)]
pub enum IrError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode index data: {0}")]
    Decode(#[from] bincode::Error),

    #[error("invalid index metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// Document ids start at 1.
    #[error("document id 0 is not a valid id")]
    InvalidDocumentId,

    #[error("document {0} has already been indexed")]
    DuplicateDocument(DocId),

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error("unsupported index version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("unknown boolean operator `{0}` (expected AND or OR)")]
    UnknownOperator(String),
}

pub type Result<T, E = IrError> = std::result::Result<T, E>;
