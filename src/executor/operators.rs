//! Relational algebra operators
//!
//! Every operator reads its inputs and builds a fresh relation; inputs are
//! never modified.

use indexmap::IndexSet;
use std::collections::HashSet;
use tracing::trace;

use super::condition::evaluate_condition;
use crate::catalog::{Relation, Tuple};
use crate::error::{Error, Result};
use crate::query::Condition;

/// Keep the tuples satisfying `condition`. The result keeps the input's name.
pub fn selection(relation: &Relation, condition: &Condition) -> Result<Relation> {
    let mut rows = Vec::new();

    for row in relation.rows() {
        if evaluate_condition(condition, relation, row)? {
            rows.push(row.clone());
        }
    }

    trace!(
        relation = relation.name(),
        %condition,
        input_rows = relation.len(),
        output_rows = rows.len(),
        "selection"
    );
    Relation::new(relation.name(), relation.attributes(), rows)
}

/// Restrict every tuple to `attributes`, in the order given. Duplicate
/// tuples are kept.
pub fn projection(relation: &Relation, attributes: &[String]) -> Result<Relation> {
    let indices = attributes
        .iter()
        .map(|attr| {
            relation
                .attribute_index(attr)
                .ok_or_else(|| Error::AttributeNotFound(attr.clone(), relation.name().to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let rows: Vec<Tuple> = relation
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();

    trace!(relation = relation.name(), ?attributes, rows = rows.len(), "projection");
    Relation::new(
        format!("project_{}({})", attributes.join(","), relation.name()),
        attributes.to_vec(),
        rows,
    )
}

/// Natural join on every attribute name the two relations share. Falls
/// back to a cartesian product when they share none.
pub fn natural_join(left: &Relation, right: &Relation) -> Result<Relation> {
    // (left position, right position) of each shared attribute
    let common: Vec<(usize, usize)> = left
        .attribute_names()
        .iter()
        .enumerate()
        .filter_map(|(i, attr)| right.attribute_index(attr).map(|j| (i, j)))
        .collect();

    if common.is_empty() {
        return cartesian_product(left, right);
    }

    let shared: HashSet<usize> = common.iter().map(|&(_, j)| j).collect();
    let right_only: Vec<usize> = (0..right.attribute_names().len())
        .filter(|j| !shared.contains(j))
        .collect();

    let mut attributes = left.attributes();
    attributes.extend(right_only.iter().map(|&j| right.attribute_names()[j].clone()));

    let mut rows = Vec::new();
    for l_row in left.rows() {
        for r_row in right.rows() {
            if common.iter().all(|&(i, j)| l_row[i] == r_row[j]) {
                let mut joined = l_row.clone();
                joined.extend(right_only.iter().map(|&j| r_row[j].clone()));
                rows.push(joined);
            }
        }
    }

    trace!(
        left = left.name(),
        right = right.name(),
        shared = common.len(),
        rows = rows.len(),
        "natural join"
    );
    Relation::new(
        format!("{}_join_{}", left.name(), right.name()),
        attributes,
        rows,
    )
}

/// Every pairing of a left tuple with a right tuple. Right attributes are
/// suffixed with `_<right name>`; a suffixed name that is already taken
/// gets a further `_2`, `_3`, ... until it is unique.
pub fn cartesian_product(left: &Relation, right: &Relation) -> Result<Relation> {
    let mut attributes = left.attributes();
    for attr in right.attribute_names() {
        let base = format!("{}_{}", attr, right.name());
        let mut name = base.clone();
        let mut n = 2;
        while attributes.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        attributes.push(name);
    }

    let mut rows = Vec::with_capacity(left.len() * right.len());
    for l_row in left.rows() {
        for r_row in right.rows() {
            let mut joined = l_row.clone();
            joined.extend(r_row.iter().cloned());
            rows.push(joined);
        }
    }

    trace!(left = left.name(), right = right.name(), rows = rows.len(), "cartesian product");
    Relation::new(
        format!("{}_cartesian_{}", left.name(), right.name()),
        attributes,
        rows,
    )
}

/// All tuples of both relations, duplicates removed, first occurrence kept
pub fn union(left: &Relation, right: &Relation) -> Result<Relation> {
    ensure_same_schema("a union", left, right)?;

    let unique: IndexSet<&Tuple> = left.rows().iter().chain(right.rows()).collect();
    let rows: Vec<Tuple> = unique.into_iter().cloned().collect();

    trace!(left = left.name(), right = right.name(), rows = rows.len(), "union");
    Relation::new(
        format!("{}_union_{}", left.name(), right.name()),
        left.attributes(),
        rows,
    )
}

/// Left tuples that also occur in `right`, in left order
pub fn intersection(left: &Relation, right: &Relation) -> Result<Relation> {
    ensure_same_schema("an intersection", left, right)?;

    let right_rows: HashSet<&Tuple> = right.rows().iter().collect();
    let rows: Vec<Tuple> = left
        .rows()
        .iter()
        .filter(|row| right_rows.contains(row))
        .cloned()
        .collect();

    trace!(left = left.name(), right = right.name(), rows = rows.len(), "intersection");
    Relation::new(
        format!("{}_intersection_{}", left.name(), right.name()),
        left.attributes(),
        rows,
    )
}

/// Left tuples that do not occur in `right`, in left order
pub fn difference(left: &Relation, right: &Relation) -> Result<Relation> {
    ensure_same_schema("a difference", left, right)?;

    let right_rows: HashSet<&Tuple> = right.rows().iter().collect();
    let rows: Vec<Tuple> = left
        .rows()
        .iter()
        .filter(|row| !right_rows.contains(row))
        .cloned()
        .collect();

    trace!(left = left.name(), right = right.name(), rows = rows.len(), "difference");
    Relation::new(
        format!("{}_difference_{}", left.name(), right.name()),
        left.attributes(),
        rows,
    )
}

fn ensure_same_schema(operation: &str, left: &Relation, right: &Relation) -> Result<()> {
    if left.attribute_names() != right.attribute_names() {
        return Err(Error::SchemaMismatch {
            operation: operation.to_string(),
            left: left.attributes(),
            right: right.attributes(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp() -> Relation {
        Relation::from_rows(
            "Emp",
            &["id", "dept"],
            &[&["1", "A"], &["2", "B"], &["3", "A"]],
        )
        .unwrap()
    }

    fn dept() -> Relation {
        Relation::from_rows("Dept", &["dept", "loc"], &[&["A", "NY"], &["B", "LA"]]).unwrap()
    }

    fn rows(rel: &Relation) -> Vec<Vec<&str>> {
        rel.rows()
            .iter()
            .map(|row| row.iter().map(String::as_str).collect())
            .collect()
    }

    fn sorted(mut rows: Vec<Vec<&str>>) -> Vec<Vec<&str>> {
        rows.sort();
        rows
    }

    #[test]
    fn test_selection() {
        let condition: Condition = "dept=\"A\"".parse().unwrap();
        let result = selection(&emp(), &condition).unwrap();

        assert_eq!(result.name(), "Emp");
        assert_eq!(result.attribute_names(), emp().attribute_names());
        assert_eq!(rows(&result), vec![vec!["1", "A"], vec!["3", "A"]]);
    }

    #[test]
    fn test_projection_keeps_duplicates() {
        let result = projection(&emp(), &["dept".to_string()]).unwrap();

        assert_eq!(result.name(), "project_dept(Emp)");
        assert_eq!(rows(&result), vec![vec!["A"], vec!["B"], vec!["A"]]);
    }

    #[test]
    fn test_projection_reorders() {
        let result = projection(&emp(), &["dept".to_string(), "id".to_string()]).unwrap();
        assert_eq!(rows(&result)[0], vec!["A", "1"]);
    }

    #[test]
    fn test_projection_identity() {
        let rel = emp();
        let result = projection(&rel, &rel.attributes()).unwrap();
        assert_eq!(result.rows(), rel.rows());
        assert_eq!(result.attribute_names(), rel.attribute_names());
    }

    #[test]
    fn test_projection_missing_attribute() {
        let result = projection(&emp(), &["salary".to_string()]);
        assert!(matches!(result, Err(Error::AttributeNotFound(attr, rel)) if attr == "salary" && rel == "Emp"));
    }

    #[test]
    fn test_natural_join() {
        let result = natural_join(&emp(), &dept()).unwrap();

        assert_eq!(result.attribute_names(), &["id", "dept", "loc"]);
        assert_eq!(
            sorted(rows(&result)),
            vec![vec!["1", "A", "NY"], vec!["2", "B", "LA"], vec!["3", "A", "NY"]]
        );
    }

    #[test]
    fn test_natural_join_is_commutative_on_rows() {
        let forward = natural_join(&emp(), &dept()).unwrap();
        let backward = natural_join(&dept(), &emp()).unwrap();

        // Reorder backward (dept, loc, id) into (id, dept, loc)
        let reordered: Vec<Vec<&str>> = rows(&backward)
            .into_iter()
            .map(|r| vec![r[2], r[0], r[1]])
            .collect();
        assert_eq!(sorted(rows(&forward)), sorted(reordered));
    }

    #[test]
    fn test_join_compares_raw_text() {
        let left = Relation::from_rows("L", &["k"], &[&["1"], &["1.0"]]).unwrap();
        let right = Relation::from_rows("R", &["k", "v"], &[&["1", "x"]]).unwrap();

        let result = natural_join(&left, &right).unwrap();
        assert_eq!(rows(&result), vec![vec!["1", "x"]]);
    }

    #[test]
    fn test_cartesian_product() {
        let colors = Relation::from_rows("Color", &["color"], &[&["red"], &["blue"]]).unwrap();
        let result = natural_join(&emp(), &colors).unwrap();

        assert_eq!(result.name(), "Emp_cartesian_Color");
        assert_eq!(result.attribute_names(), &["id", "dept", "color_Color"]);
        assert_eq!(result.len(), emp().len() * colors.len());
        assert_eq!(rows(&result)[1], vec!["1", "A", "blue"]);
    }

    #[test]
    fn test_cartesian_product_suffix_clash() {
        let left = Relation::from_rows("R", &["x", "y_S"], &[&["1", "a"], &["2", "b"]]).unwrap();
        let right = Relation::from_rows("S", &["y"], &[&["p"], &["q"], &["r"]]).unwrap();

        let result = natural_join(&left, &right).unwrap();

        assert_eq!(result.attribute_names(), &["x", "y_S", "y_S_2"]);
        assert_eq!(result.len(), left.len() * right.len());
        assert_eq!(rows(&result)[5], vec!["2", "b", "r"]);
    }

    #[test]
    fn test_union_removes_duplicates_in_order() {
        let other = Relation::from_rows("Other", &["id", "dept"], &[&["3", "A"], &["4", "C"]]).unwrap();
        let result = union(&emp(), &other).unwrap();

        assert_eq!(
            rows(&result),
            vec![vec!["1", "A"], vec!["2", "B"], vec!["3", "A"], vec!["4", "C"]]
        );
    }

    #[test]
    fn test_union_with_self() {
        let rel = emp();
        let result = union(&rel, &rel).unwrap();
        assert_eq!(result.rows(), rel.rows());
    }

    #[test]
    fn test_schema_mismatch() {
        assert!(matches!(union(&emp(), &dept()), Err(Error::SchemaMismatch { .. })));
        assert!(matches!(intersection(&emp(), &dept()), Err(Error::SchemaMismatch { .. })));
        assert!(matches!(difference(&emp(), &dept()), Err(Error::SchemaMismatch { .. })));

        // Same names in a different order still mismatch
        let swapped = Relation::from_rows("Swapped", &["dept", "id"], &[]).unwrap();
        assert!(matches!(union(&emp(), &swapped), Err(Error::SchemaMismatch { .. })));
    }

    #[test]
    fn test_intersection_and_difference() {
        let other = Relation::from_rows(
            "Other",
            &["id", "dept"],
            &[&["3", "A"], &["1", "A"], &["9", "Z"]],
        )
        .unwrap();

        let common = intersection(&emp(), &other).unwrap();
        assert_eq!(rows(&common), vec![vec!["1", "A"], vec!["3", "A"]]);

        let reverse = intersection(&other, &emp()).unwrap();
        assert_eq!(sorted(rows(&reverse)), sorted(rows(&common)));

        let diff = difference(&emp(), &other).unwrap();
        assert_eq!(rows(&diff), vec![vec!["2", "B"]]);

        let rebuilt = union(&diff, &common).unwrap();
        assert_eq!(sorted(rows(&rebuilt)), sorted(rows(&emp())));

        let back = difference(&other, &emp()).unwrap();
        assert!(rows(&back).iter().all(|row| !rows(&diff).contains(row)));
    }

    #[test]
    fn test_inputs_untouched() {
        let rel = emp();
        let before = rel.clone();
        let _ = union(&rel, &rel).unwrap();
        let _ = projection(&rel, &["id".to_string()]).unwrap();
        assert_eq!(rel, before);
    }
}
