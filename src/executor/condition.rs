//! Condition evaluation
//!
//! A condition compares one attribute of a tuple against a literal. Both
//! sides are coerced to numbers when they both parse as `f64`; otherwise
//! they are compared as text. Quoted literals are always text.

use std::cmp::Ordering;

use crate::catalog::Relation;
use crate::error::Result;
use crate::query::{CompareOp, Condition, Literal};

/// A value as seen by a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> Value<'a> {
    /// Compare two values of the same variant
    pub fn compare(&self, other: &Value<'_>) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Decide how the attribute value and the literal are compared
pub fn coerce<'a>(attribute_value: &'a str, literal: &'a Literal) -> (Value<'a>, Value<'a>) {
    match literal {
        Literal::Quoted(text) => (Value::Text(attribute_value), Value::Text(text.as_str())),
        Literal::Bare(text) => match (attribute_value.parse::<f64>(), text.parse::<f64>()) {
            (Ok(left), Ok(right)) => (Value::Number(left), Value::Number(right)),
            _ => (Value::Text(attribute_value), Value::Text(text.as_str())),
        },
    }
}

/// Apply a comparison operator to two values
pub fn apply(op: CompareOp, left: &Value<'_>, right: &Value<'_>) -> bool {
    let cmp = left.compare(right);
    match op {
        CompareOp::Eq => cmp == Some(Ordering::Equal),
        CompareOp::Neq => cmp != Some(Ordering::Equal),
        CompareOp::Lt => cmp == Some(Ordering::Less),
        CompareOp::Gt => cmp == Some(Ordering::Greater),
        CompareOp::Lte => matches!(cmp, Some(Ordering::Less) | Some(Ordering::Equal)),
        CompareOp::Gte => matches!(cmp, Some(Ordering::Greater) | Some(Ordering::Equal)),
    }
}

/// Evaluate `condition` against one tuple of `relation`
pub fn evaluate_condition(condition: &Condition, relation: &Relation, tuple: &[String]) -> Result<bool> {
    let attribute_value = relation.attribute_value(tuple, &condition.attribute)?;
    let (left, right) = coerce(attribute_value, &condition.literal);
    Ok(apply(condition.op, &left, &right))
}
