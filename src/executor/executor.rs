//! Query Executor for RelAlg
//!
//! This module walks an expression tree against the catalog. Nested operands
//! are evaluated first and materialized as temporary relations, the operator
//! runs over catalog names, and the temporaries are removed again before the
//! call returns.

use std::sync::Arc;
use tracing::debug;

use super::operators;
use crate::catalog::{Catalog, Relation};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::query::{parse_query, Condition, Expr, SetOperator};

/// An operand after evaluation: either a relation already in the catalog or
/// the result of a nested expression that still has to be registered.
enum Operand {
    Base(String),
    Nested(Relation),
}

/// Temporaries registered by one operator call
struct Temporaries<'a> {
    catalog: &'a Catalog,
    names: Vec<String>,
}

impl<'a> Temporaries<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            names: Vec::new(),
        }
    }

    /// Catalog name for `operand`, registering nested results under a fresh name
    fn bind(&mut self, operand: Operand, prefix: &str) -> String {
        match operand {
            Operand::Base(name) => name,
            Operand::Nested(relation) => {
                let name = self.catalog.temporary_name(prefix);
                debug!(temporary = %name, rows = relation.len(), "registering temporary relation");
                self.catalog.add(relation.renamed(name.clone()));
                self.names.push(name.clone());
                name
            }
        }
    }
}

impl Drop for Temporaries<'_> {
    fn drop(&mut self) {
        for name in self.names.drain(..) {
            debug!(temporary = %name, "releasing temporary relation");
            self.catalog.remove(&name);
        }
    }
}

/// Execution Engine
pub struct ExecutionEngine {
    /// Relation catalog
    catalog: Arc<Catalog>,
    /// Engine settings
    config: EngineConfig,
}

impl ExecutionEngine {
    /// Create a new execution engine
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    /// Create a new execution engine with explicit settings
    pub fn with_config(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// The catalog this engine evaluates against
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Register base relations before any query runs
    pub fn load(&self, relations: impl IntoIterator<Item = Relation>) {
        self.catalog.load(relations);
    }

    /// Parse and evaluate one query string
    pub fn evaluate(&self, query: &str) -> Result<Relation> {
        let expr = parse_query(query.trim())?;
        debug!(query = query.trim(), %expr, "evaluating query");
        self.execute(&expr)
    }

    /// Evaluate an expression tree
    pub fn execute(&self, expr: &Expr) -> Result<Relation> {
        match expr {
            Expr::Relation(name) => Ok(self.catalog.get(name)?.as_ref().clone()),
            Expr::Select { condition, input } => {
                let operand = self.operand(input)?;
                let mut temps = Temporaries::new(&self.catalog);
                let name = temps.bind(operand, &self.config.temp_prefix);
                self.selection(&name, condition)
            }
            Expr::Project { attributes, input } => {
                let operand = self.operand(input)?;
                let mut temps = Temporaries::new(&self.catalog);
                let name = temps.bind(operand, &self.config.temp_prefix);
                self.projection(&name, attributes)
            }
            Expr::Binary { op, left, right } => {
                let left = self.operand(left)?;
                let right = self.operand(right)?;

                let mut temps = Temporaries::new(&self.catalog);
                let left = temps.bind(left, &self.config.temp_prefix);
                let right = temps.bind(right, &self.config.temp_prefix);

                match op {
                    SetOperator::Join => self.join(&left, &right),
                    SetOperator::Union => self.union(&left, &right),
                    SetOperator::Intersection => self.intersection(&left, &right),
                    SetOperator::Difference => self.difference(&left, &right),
                }
            }
        }
    }

    /// Evaluate nested operands; bare relation names are left for the catalog
    fn operand(&self, expr: &Expr) -> Result<Operand> {
        match expr {
            Expr::Relation(name) => Ok(Operand::Base(name.clone())),
            nested => self.execute(nested).map(Operand::Nested),
        }
    }

    // ========== Operators over catalog names ==========

    /// Selection over a registered relation
    pub fn selection(&self, name: &str, condition: &Condition) -> Result<Relation> {
        let relation = self.catalog.get(name)?;
        operators::selection(&relation, condition)
    }

    /// Projection over a registered relation
    pub fn projection(&self, name: &str, attributes: &[String]) -> Result<Relation> {
        let relation = self.catalog.get(name)?;
        operators::projection(&relation, attributes)
    }

    /// Natural join (or cartesian product) of two registered relations
    pub fn join(&self, left: &str, right: &str) -> Result<Relation> {
        let (left, right) = self.pair(left, right)?;
        operators::natural_join(&left, &right)
    }

    /// Union of two registered relations
    pub fn union(&self, left: &str, right: &str) -> Result<Relation> {
        let (left, right) = self.pair(left, right)?;
        operators::union(&left, &right)
    }

    /// Intersection of two registered relations
    pub fn intersection(&self, left: &str, right: &str) -> Result<Relation> {
        let (left, right) = self.pair(left, right)?;
        operators::intersection(&left, &right)
    }

    /// Difference of two registered relations
    pub fn difference(&self, left: &str, right: &str) -> Result<Relation> {
        let (left, right) = self.pair(left, right)?;
        operators::difference(&left, &right)
    }

    fn pair(&self, left: &str, right: &str) -> Result<(Arc<Relation>, Arc<Relation>)> {
        Ok((self.catalog.get(left)?, self.catalog.get(right)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn create_test_engine() -> ExecutionEngine {
        let engine = ExecutionEngine::new(Arc::new(Catalog::new()));
        engine.load(vec![
            Relation::from_rows(
                "Emp",
                &["id", "dept"],
                &[&["1", "A"], &["2", "B"], &["3", "A"]],
            )
            .unwrap(),
            Relation::from_rows("Dept", &["dept", "loc"], &[&["A", "NY"], &["B", "LA"]]).unwrap(),
            Relation::from_rows("Former", &["id", "dept"], &[&["3", "A"], &["4", "C"]]).unwrap(),
        ]);
        engine
    }

    fn rows(rel: &Relation) -> Vec<Vec<&str>> {
        let mut rows: Vec<Vec<&str>> = rel
            .rows()
            .iter()
            .map(|row| row.iter().map(String::as_str).collect())
            .collect();
        rows.sort();
        rows
    }

    #[test]
    fn test_select_base_relation() {
        let engine = create_test_engine();
        let result = engine.evaluate("select dept=\"A\" (Emp)").unwrap();

        assert_eq!(result.name(), "Emp");
        assert_eq!(rows(&result), vec![vec!["1", "A"], vec!["3", "A"]]);
    }

    #[test]
    fn test_project_base_relation() {
        let engine = create_test_engine();
        let result = engine.evaluate("project id (Emp)").unwrap();

        assert_eq!(result.attribute_names(), &["id"]);
        assert_eq!(rows(&result), vec![vec!["1"], vec!["2"], vec!["3"]]);
    }

    #[test]
    fn test_join() {
        let engine = create_test_engine();
        let result = engine.evaluate("Emp join Dept").unwrap();

        assert_eq!(result.attribute_names(), &["id", "dept", "loc"]);
        assert_eq!(
            rows(&result),
            vec![vec!["1", "A", "NY"], vec!["2", "B", "LA"], vec!["3", "A", "NY"]]
        );
    }

    #[test]
    fn test_select_over_join_cleans_up() {
        let engine = create_test_engine();
        let result = engine.evaluate("select dept=\"A\" (Emp join Dept)").unwrap();

        assert_eq!(rows(&result), vec![vec!["1", "A", "NY"], vec!["3", "A", "NY"]]);
        assert_eq!(engine.catalog().len(), 3);
    }

    #[test]
    fn test_deeply_nested() {
        let engine = create_test_engine();
        let result = engine
            .evaluate("project loc ((select id > 1 (Emp union Former)) join (Dept))")
            .unwrap();

        assert_eq!(rows(&result), vec![vec!["LA"], vec!["NY"]]);
        assert_eq!(
            engine.catalog().list_relations(),
            vec!["Emp".to_string(), "Dept".to_string(), "Former".to_string()]
        );
    }

    #[test]
    fn test_both_operands_nested() {
        let engine = create_test_engine();
        let result = engine
            .evaluate("(select dept = A (Emp)) difference (select id = 1 (Emp))")
            .unwrap();

        assert_eq!(rows(&result), vec![vec!["3", "A"]]);
        assert_eq!(engine.catalog().len(), 3);
    }

    #[test]
    fn test_set_operators() {
        let engine = create_test_engine();

        let union = engine.evaluate("Emp union Former").unwrap();
        assert_eq!(union.len(), 4);

        let common = engine.evaluate("Emp intersection Former").unwrap();
        assert_eq!(rows(&common), vec![vec!["3", "A"]]);

        let diff = engine.evaluate("Emp difference Former").unwrap();
        assert_eq!(rows(&diff), vec![vec!["1", "A"], vec!["2", "B"]]);
    }

    #[test]
    fn test_unknown_relation() {
        let engine = create_test_engine();

        let result = engine.evaluate("select id=1 (Foo)");
        assert!(matches!(result, Err(Error::RelationNotFound(name)) if name == "Foo"));

        let result = engine.evaluate("Foo");
        assert!(matches!(result, Err(Error::RelationNotFound(_))));
    }

    #[test]
    fn test_missing_parentheses() {
        let engine = create_test_engine();
        let result = engine.evaluate("select id=1 Emp");
        assert!(matches!(result, Err(Error::UnsupportedQuery { .. })));
    }

    #[test]
    fn test_failure_releases_temporaries() {
        let engine = create_test_engine();

        // Left operand succeeds, operator fails on schema mismatch
        let result = engine.evaluate("(select id = 1 (Emp)) union (Emp join Dept)");
        assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
        assert_eq!(engine.catalog().len(), 3);

        // Nested attribute error
        let result = engine.evaluate("project salary (Emp join Dept)");
        assert!(matches!(result, Err(Error::AttributeNotFound(..))));
        assert_eq!(engine.catalog().len(), 3);
    }

    #[test]
    fn test_temporary_names_not_reused() {
        let catalog = Arc::new(Catalog::new());
        let engine = ExecutionEngine::with_config(catalog.clone(), EngineConfig::new().temp_prefix("t"));
        engine.load(vec![Relation::from_rows("R", &["a"], &[&["1"]]).unwrap()]);

        let first = engine.evaluate("select a = 1 (R union R)").unwrap();
        let second = engine.evaluate("select a = 1 (R union R)").unwrap();

        assert_eq!(first.name(), "t_0");
        assert_eq!(second.name(), "t_1");
    }
}
