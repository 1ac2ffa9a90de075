//! Error types for RelAlg
//!
//! This module defines all error types used throughout the query engine.

use thiserror::Error;

/// The main error type for RelAlg
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Lexer error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Lexer error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    // ========== Query Errors ==========
    #[error("Unsupported query format: {query} ({reason})")]
    UnsupportedQuery { query: String, reason: String },

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    // ========== Catalog Errors ==========
    #[error("Relation '{0}' not found")]
    RelationNotFound(String),

    #[error("Attribute '{0}' not found in relation '{1}'")]
    AttributeNotFound(String, String),

    #[error("Attribute '{0}' appears more than once in relation '{1}'")]
    DuplicateAttribute(String, String),

    // ========== Algebra Errors ==========
    #[error("Relations must have the same attributes to do {operation}: {left:?} vs {right:?}")]
    SchemaMismatch {
        operation: String,
        left: Vec<String>,
        right: Vec<String>,
    },

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for RelAlg operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RelationNotFound("Emp".to_string());
        assert_eq!(err.to_string(), "Relation 'Emp' not found");

        let err = Error::UnexpectedCharacter('@', 5);
        assert_eq!(
            err.to_string(),
            "Lexer error: unexpected character '@' at position 5"
        );
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = Error::SchemaMismatch {
            operation: "a union".to_string(),
            left: vec!["id".to_string()],
            right: vec!["name".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Relations must have the same attributes to do a union: [\"id\"] vs [\"name\"]"
        );
    }
}
