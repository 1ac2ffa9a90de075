//! Query execution module
//!
//! This module contains the condition evaluator, the algebra operators,
//! and the execution engine that drives them.

pub mod condition;
pub mod executor;
pub mod operators;

pub use condition::{evaluate_condition, Value};
pub use executor::ExecutionEngine;
