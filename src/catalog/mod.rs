//! Catalog module
//!
//! This module contains the relation data model and the relation catalog.

pub mod catalog;
pub mod relation;

pub use catalog::Catalog;
pub use relation::{Relation, Tuple};
