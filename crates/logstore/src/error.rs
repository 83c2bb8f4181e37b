//! Query Errors
//!
//! A malformed query string is a recoverable condition: the store turns it
//! into a zero-match result carrying this diagnostic.

use thiserror::Error;

/// A syntax error in a log query, with the character offset where it was found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot parse '{query}': {message} at position {position}")]
pub struct QueryError {
    pub query: String,
    pub position: usize,
    pub message: String,
}

impl QueryError {
    pub fn new(query: impl Into<String>, position: usize, message: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            position,
            message: message.into(),
        }
    }
}

/// Result type alias for query parsing
pub type QueryResult<T> = Result<T, QueryError>;
