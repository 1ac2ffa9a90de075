//! Query Token definitions
//!
//! This module defines all tokens that can appear in a relational algebra query.

use std::fmt;

/// Query Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ========== Keywords ==========
    // Unary operators
    Select,
    Project,

    // Binary operators
    Join,
    Union,
    Intersection,
    Difference,

    // ========== Literals ==========
    /// Unquoted literal after a comparison, kept as written
    BareLiteral(String),
    /// String literal (single- or double-quoted)
    StringLiteral(String),
    /// Identifier (relation or attribute name)
    Identifier(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,

    // ========== Special ==========
    /// End of input
    Eof,
}

impl Token {
    /// Check if this token is a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Token::Eq | Token::Neq | Token::Lt | Token::Gt | Token::Lte | Token::Gte
        )
    }

    /// Convert a string to a keyword token (case-insensitive)
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s.to_lowercase().as_str() {
            "select" => Some(Token::Select),
            "project" => Some(Token::Project),
            "join" => Some(Token::Join),
            "union" => Some(Token::Union),
            "intersection" => Some(Token::Intersection),
            "difference" => Some(Token::Difference),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Select => write!(f, "select"),
            Token::Project => write!(f, "project"),
            Token::Join => write!(f, "join"),
            Token::Union => write!(f, "union"),
            Token::Intersection => write!(f, "intersection"),
            Token::Difference => write!(f, "difference"),
            Token::BareLiteral(s) => write!(f, "{}", s),
            Token::StringLiteral(s) => write!(f, "'{}'", s),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Eq => write!(f, "="),
            Token::Neq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Lte => write!(f, "<="),
            Token::Gte => write!(f, ">="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Token::from_keyword("select"), Some(Token::Select));
        assert_eq!(Token::from_keyword("UNION"), Some(Token::Union));
        assert_eq!(Token::from_keyword("Emp"), None);
    }

    #[test]
    fn test_classification() {
        assert!(Token::Gte.is_comparison());
        assert!(!Token::Comma.is_comparison());
    }
}
