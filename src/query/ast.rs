//! Relational Algebra Expression Tree
//!
//! This module defines the typed expression tree produced by the parser.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A relational algebra expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `select <condition> (<input>)`
    Select {
        condition: Condition,
        input: Box<Expr>,
    },
    /// `project <attr, ...> (<input>)`
    Project {
        attributes: Vec<String>,
        input: Box<Expr>,
    },
    /// `<left> join|union|intersection|difference <right>`
    Binary {
        op: SetOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A relation registered in the catalog
    Relation(String),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Select { condition, input } => write!(f, "select {} ({})", condition, input),
            Expr::Project { attributes, input } => {
                write!(f, "project {} ({})", attributes.join(","), input)
            }
            Expr::Binary { op, left, right } => {
                fmt_operand(left, f)?;
                write!(f, " {} ", op)?;
                fmt_operand(right, f)
            }
            Expr::Relation(name) => write!(f, "{}", name),
        }
    }
}

fn fmt_operand(expr: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expr::Binary { .. } => write!(f, "({})", expr),
        _ => write!(f, "{}", expr),
    }
}

/// Binary algebra operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Join,
    Union,
    Intersection,
    Difference,
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetOperator::Join => write!(f, "join"),
            SetOperator::Union => write!(f, "union"),
            SetOperator::Intersection => write!(f, "intersection"),
            SetOperator::Difference => write!(f, "difference"),
        }
    }
}

/// A single comparison predicate: `<attribute> <op> <literal>`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Attribute on the left-hand side
    pub attribute: String,
    /// Comparison operator
    pub op: CompareOp,
    /// Literal on the right-hand side
    pub literal: Literal,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.attribute, self.op, self.literal)
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl CompareOp {
    /// Operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Lte => "<=",
            CompareOp::Gte => ">=",
        }
    }
}

impl FromStr for CompareOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(CompareOp::Eq),
            "!=" | "<>" => Ok(CompareOp::Neq),
            "<" => Ok(CompareOp::Lt),
            ">" => Ok(CompareOp::Gt),
            "<=" => Ok(CompareOp::Lte),
            ">=" => Ok(CompareOp::Gte),
            other => Err(Error::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand side literal of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted text; always compared as text
    Quoted(String),
    /// Unquoted text, kept as written; compared numerically when possible
    Bare(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Quoted(s) => write!(f, "\"{}\"", s),
            Literal::Bare(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_op_from_str() {
        assert_eq!("<=".parse::<CompareOp>().unwrap(), CompareOp::Lte);
        assert_eq!("<>".parse::<CompareOp>().unwrap(), CompareOp::Neq);
        assert!(matches!(
            "=~".parse::<CompareOp>(),
            Err(Error::UnsupportedOperator(op)) if op == "=~"
        ));
    }

    #[test]
    fn test_expr_display() {
        let expr = Expr::Select {
            condition: Condition {
                attribute: "dept".to_string(),
                op: CompareOp::Eq,
                literal: Literal::Quoted("A".to_string()),
            },
            input: Box::new(Expr::Binary {
                op: SetOperator::Join,
                left: Box::new(Expr::Relation("Emp".to_string())),
                right: Box::new(Expr::Relation("Dept".to_string())),
            }),
        };

        assert_eq!(expr.to_string(), "select dept=\"A\" (Emp join Dept)");
    }
}
