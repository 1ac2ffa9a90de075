//! Query Parser
//!
//! This module parses query tokens into an expression tree.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr         := union ("join" union)*
//! union        := intersection ("union" intersection)*
//! intersection := difference ("intersection" difference)*
//! difference   := unary ("difference" unary)*
//! unary        := "select" condition "(" expr ")"
//!               | "project" ident ("," ident)* "(" expr ")"
//!               | "(" expr ")"
//!               | ident
//! condition    := ident cmp_op (string | bare)
//! ```
//!
//! `bare` is the raw text after the operator up to the `(` that opens the
//! operand, trimmed.

use std::str::FromStr;

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::error::{Error, Result};

static EOF: Token = Token::Eof;

/// Query Parser
pub struct Parser {
    source: String,
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a query string
    pub fn new(query: &str) -> Result<Self> {
        let mut lexer = Lexer::new(query);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            source: query.trim().to_string(),
            tokens,
            position: 0,
        })
    }

    /// Parse the whole input as a single expression
    pub fn parse(&mut self) -> Result<Expr> {
        if self.is_at_end() {
            return Err(self.unsupported("empty query".to_string()));
        }

        let expr = self.parse_expr()?;

        if !self.is_at_end() {
            return Err(self.unsupported(format!(
                "unexpected '{}' after complete expression",
                self.current()
            )));
        }

        Ok(expr)
    }

    /// Parse the whole input as a single condition
    pub fn parse_condition_only(&mut self) -> Result<Condition> {
        let condition = self.parse_condition()?;

        if !self.is_at_end() {
            return Err(Error::InvalidCondition(format!(
                "unexpected '{}' after condition '{}'",
                self.current(),
                self.source
            )));
        }

        Ok(condition)
    }

    // ========== Binary operators ==========

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_binary(0)
    }

    /// Left-associative chain of the operator at `level`
    fn parse_binary(&mut self, level: usize) -> Result<Expr> {
        static LEVELS: [(Token, SetOperator); 4] = [
            (Token::Join, SetOperator::Join),
            (Token::Union, SetOperator::Union),
            (Token::Intersection, SetOperator::Intersection),
            (Token::Difference, SetOperator::Difference),
        ];

        let Some((token, op)) = LEVELS.get(level) else {
            return self.parse_unary();
        };

        let mut left = self.parse_binary(level + 1)?;

        while self.check(token) {
            self.advance();
            let right = self.parse_binary(level + 1)?;
            left = Expr::Binary {
                op: *op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    // ========== Unary operators and operands ==========

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.current().clone() {
            Token::Select => {
                self.advance();
                let condition = self.parse_condition()?;
                let input = self.parse_parenthesized("select condition")?;
                Ok(Expr::Select {
                    condition,
                    input: Box::new(input),
                })
            }
            Token::Project => {
                self.advance();
                let attributes = self.parse_identifier_list()?;
                let input = self.parse_parenthesized("project attribute list")?;
                Ok(Expr::Project {
                    attributes,
                    input: Box::new(input),
                })
            }
            Token::LParen => self.parse_parenthesized("'('"),
            Token::Identifier(name) => {
                self.advance();
                Ok(Expr::Relation(name))
            }
            other => Err(self.unsupported(format!(
                "expected select, project, '(' or a relation name, found '{}'",
                other
            ))),
        }
    }

    /// `"(" expr ")"`, where `after` names what precedes the parenthesis
    fn parse_parenthesized(&mut self, after: &str) -> Result<Expr> {
        if !self.check(&Token::LParen) {
            return Err(self.unsupported(format!(
                "expected '(' after {}, found '{}'",
                after,
                self.current()
            )));
        }
        self.advance();

        let expr = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        Ok(expr)
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        loop {
            match self.current().clone() {
                Token::Identifier(name) => {
                    self.advance();
                    names.push(name);
                }
                other => {
                    return Err(self.unsupported(format!(
                        "expected attribute name, found '{}'",
                        other
                    )))
                }
            }

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance(); // consume comma
        }

        Ok(names)
    }

    // ========== Conditions ==========

    fn parse_condition(&mut self) -> Result<Condition> {
        let attribute = match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                name
            }
            other => {
                return Err(Error::InvalidCondition(format!(
                    "expected attribute name, found '{}'",
                    other
                )))
            }
        };

        let op = match self.current() {
            Token::Eq => CompareOp::Eq,
            Token::Neq => CompareOp::Neq,
            Token::Lt => CompareOp::Lt,
            Token::Gt => CompareOp::Gt,
            Token::Lte => CompareOp::Lte,
            Token::Gte => CompareOp::Gte,
            other => {
                return Err(Error::InvalidCondition(format!(
                    "no comparison operator after '{}', found '{}'",
                    attribute, other
                )))
            }
        };
        self.advance();

        let literal = match self.current().clone() {
            Token::StringLiteral(text) => Literal::Quoted(text),
            Token::BareLiteral(text) => Literal::Bare(text),
            other => {
                return Err(Error::InvalidCondition(format!(
                    "missing literal after '{}{}', found '{}'",
                    attribute, op, other
                )))
            }
        };
        self.advance();

        Ok(Condition {
            attribute,
            op,
            literal,
        })
    }

    // ========== Helper Methods ==========

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&EOF)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        self.current() == token
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unsupported(format!(
                "expected '{}', found '{}'",
                token,
                self.current()
            )))
        }
    }

    fn unsupported(&self, reason: String) -> Error {
        Error::UnsupportedQuery {
            query: self.source.clone(),
            reason,
        }
    }
}

/// Parse a query string into an expression tree
pub fn parse_query(query: &str) -> Result<Expr> {
    Parser::new(query)?.parse()
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Parser::new(s)?.parse_condition_only()
    }
}
