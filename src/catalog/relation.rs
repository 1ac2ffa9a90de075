//! Relation definitions for RelAlg
//!
//! A relation is a named, ordered attribute list plus the tuples stored
//! against it. Values are kept as opaque text.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// One row of a relation, positionally aligned to the attributes
pub type Tuple = Vec<String>;

/// A named relation (schema + tuples)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    /// Relation name
    name: String,
    /// Ordered attribute names
    attributes: Vec<String>,
    /// Tuples, each of length `attributes.len()`
    tuples: Vec<Tuple>,
    /// Attribute name to position mapping
    #[serde(skip)]
    attr_index: HashMap<String, usize>,
}

impl Relation {
    /// Create a new relation.
    ///
    /// Fails with `DuplicateAttribute` if an attribute name is repeated,
    /// since positional lookup by name would be ambiguous.
    pub fn new(name: impl Into<String>, attributes: Vec<String>, tuples: Vec<Tuple>) -> Result<Self> {
        let name = name.into();
        let mut attr_index = HashMap::with_capacity(attributes.len());

        for (position, attr) in attributes.iter().enumerate() {
            if attr_index.insert(attr.clone(), position).is_some() {
                return Err(Error::DuplicateAttribute(attr.clone(), name));
            }
        }

        debug_assert!(
            tuples.iter().all(|t| t.len() == attributes.len()),
            "tuple arity must match attribute count"
        );

        Ok(Self {
            name,
            attributes,
            tuples,
            attr_index,
        })
    }

    /// Build a relation from string slices (handy for tests and loaders)
    pub fn from_rows(name: &str, attributes: &[&str], rows: &[&[&str]]) -> Result<Self> {
        Self::new(
            name,
            attributes.iter().map(|a| a.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    /// Relation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the attribute list
    pub fn attribute_names(&self) -> &[String] {
        &self.attributes
    }

    /// Borrow the tuple list
    pub fn rows(&self) -> &[Tuple] {
        &self.tuples
    }

    /// A copy of the ordered attribute list
    pub fn attributes(&self) -> Vec<String> {
        self.attributes.clone()
    }

    /// A copy of the tuple list
    pub fn tuples(&self) -> Vec<Tuple> {
        self.tuples.clone()
    }

    /// Number of tuples
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Whether the relation holds no tuples
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Position of an attribute, if present
    pub fn attribute_index(&self, attribute: &str) -> Option<usize> {
        self.attr_index.get(attribute).copied()
    }

    /// Value of `attribute` within `tuple`
    pub fn attribute_value<'t>(&self, tuple: &'t [String], attribute: &str) -> Result<&'t str> {
        let position = self
            .attribute_index(attribute)
            .ok_or_else(|| Error::AttributeNotFound(attribute.to_string(), self.name.clone()))?;

        tuple
            .get(position)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::Internal(format!(
                    "tuple of arity {} has no position {} in relation '{}'",
                    tuple.len(),
                    position,
                    self.name
                ))
            })
    }

    /// Same relation under a different name
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} = {{{}}}", self.name, self.attributes.join(", "))?;
        for row in &self.tuples {
            let values: Vec<String> = row.iter().map(|v| format!("\"{}\"", v)).collect();
            writeln!(f, "  {}", values.join(", "))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp() -> Relation {
        Relation::from_rows("Emp", &["id", "dept"], &[&["1", "A"], &["2", "B"]]).unwrap()
    }

    #[test]
    fn test_attribute_value() {
        let rel = emp();
        let row = &rel.rows()[1];

        assert_eq!(rel.attribute_value(row, "dept").unwrap(), "B");
        assert!(matches!(
            rel.attribute_value(row, "salary"),
            Err(Error::AttributeNotFound(attr, name)) if attr == "salary" && name == "Emp"
        ));
    }

    #[test]
    fn test_copies_do_not_alias() {
        let rel = emp();

        let mut attrs = rel.attributes();
        attrs.push("extra".to_string());
        let mut tuples = rel.tuples();
        tuples[0][0] = "99".to_string();

        assert_eq!(rel.attribute_names(), &["id".to_string(), "dept".to_string()]);
        assert_eq!(rel.rows()[0][0], "1");
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let result = Relation::from_rows("Bad", &["id", "id"], &[]);
        assert!(matches!(result, Err(Error::DuplicateAttribute(attr, _)) if attr == "id"));
    }

    #[test]
    fn test_display() {
        let rendered = emp().to_string();
        assert_eq!(rendered, "Emp = {id, dept}\n  \"1\", \"A\"\n  \"2\", \"B\"\n}");
    }

    #[test]
    fn test_renamed_keeps_lookup() {
        let rel = emp().renamed("temp_0");
        assert_eq!(rel.name(), "temp_0");
        assert_eq!(rel.attribute_index("dept"), Some(1));
    }
}
