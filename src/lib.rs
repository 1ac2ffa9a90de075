//! RelAlg - A tiny in-memory relational algebra query engine written in Rust
//!
//! This library provides:
//! - Relations and the relation catalog
//! - Query parsing (lexer, parser, expression tree)
//! - Query execution (condition evaluation, algebra operators, engine)
//! - Loading relations and queries from text, and rendering reports

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod loader;
pub mod query;
pub mod report;

pub use catalog::{Catalog, Relation};
pub use error::{Error, Result};
pub use executor::ExecutionEngine;
