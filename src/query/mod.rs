//! Query module
//!
//! This module contains the query lexer, parser, and expression tree.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{CompareOp, Condition, Expr, Literal, SetOperator};
pub use lexer::Lexer;
pub use parser::{parse_query, Parser};
pub use token::Token;
