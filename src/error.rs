//! Error Types
//!
//! Load-time (`ParseError`), query-time (`QueryError`) and caller misuse
//! (`Error::InvalidArgument`) failures.

use std::io;
use thiserror::Error;

/// Structural failure while reading the binary model format.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed header: {0}")]
    MalformedHeader(String),
    #[error("Header dimensions must be positive, got {vocabulary_length} x {vector_dimensionality}")]
    NonPositiveDimensions {
        vocabulary_length: i64,
        vector_dimensionality: i64,
    },
    #[error("Model too large: {vocabulary_length} x {vector_dimensionality}")]
    TooLarge {
        vocabulary_length: usize,
        vector_dimensionality: usize,
    },
    #[error("Record {index}: missing or truncated word")]
    TruncatedWord { index: usize },
    #[error("Record {index}: word is not valid UTF-8")]
    InvalidEncoding { index: usize },
    #[error("Record {index}: truncated vector")]
    TruncatedVector { index: usize },
    #[error("Record {index}: missing newline terminator")]
    MissingTerminator { index: usize },
    #[error("Record {index}: vector cannot be normalized")]
    DegenerateVector { index: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Semantic failure of a query against a valid model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Out of dictionary word: {0}")]
    UnknownTerm(String),
    #[error("Resolved index {index} is outside a vocabulary of {vocabulary_length}")]
    IndexOutOfRange {
        index: usize,
        vocabulary_length: usize,
    },
    #[error("Query vector cannot be normalized")]
    DegenerateQuery,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
