use crate::DocId;
use thiserror::Error;

/// Errors reported by index mutation and query evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("document id {0} already exists")]
    DuplicateId(DocId),

    #[error("negative document id {0}")]
    NegativeId(DocId),

    /// Word contains a character in the control range 0..=31
    #[error("invalid symbol in word {0:?}")]
    InvalidToken(String),

    /// Bare `-` or a word starting with `--`
    #[error("invalid minus word {0:?}")]
    InvalidNegation(String),

    #[error("document {0} not found")]
    UnknownDocument(DocId),
}

pub type Result<T> = std::result::Result<T, IndexError>;
