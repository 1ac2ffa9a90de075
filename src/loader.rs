//! Input loader for RelAlg
//!
//! Reads relation definitions and queries from the block-structured text
//! format:
//!
//! ```text
//! // comment
//! Emp(id, dept) = {
//!   1, "A"
//!   2, "B"
//! }
//! Query: select dept="A" (Emp)
//! ```

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, map},
    multi::separated_list1,
    sequence::{delimited, tuple},
    IResult,
};
use std::path::Path;
use tracing::{debug, warn};

use crate::catalog::{Relation, Tuple};
use crate::error::Result;
use crate::query::lexer::is_name_char;

/// Prefix marking a query line
const QUERY_PREFIX: &str = "Query:";

/// Relations and queries read from one input
#[derive(Debug, Default)]
pub struct LoadedInput {
    /// Base relations, in definition order
    pub relations: Vec<Relation>,
    /// Query strings, in definition order
    pub queries: Vec<String>,
}

/// A relation block that has been opened but not closed yet
struct OpenBlock {
    name: String,
    attributes: Vec<String>,
    tuples: Vec<Tuple>,
    line: usize,
}

/// Load relations and queries from a file
pub fn load_file(path: impl AsRef<Path>) -> Result<LoadedInput> {
    let text = std::fs::read_to_string(path.as_ref())?;
    debug!(path = %path.as_ref().display(), bytes = text.len(), "loading input file");
    load_str(&text)
}

/// Load relations and queries from text
pub fn load_str(text: &str) -> Result<LoadedInput> {
    let mut input = LoadedInput::default();
    let mut current: Option<OpenBlock> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if let Some(query) = line.strip_prefix(QUERY_PREFIX) {
            input.queries.push(query.trim().to_string());
            continue;
        }

        if line == "}" {
            match current.take() {
                Some(block) => close_block(block, &mut input.relations),
                None => warn!(line = line_no, "closing brace outside a relation block"),
            }
            continue;
        }

        if let Ok((_, (name, attributes))) = relation_header(line) {
            if let Some(open) = current.take() {
                warn!(
                    line = line_no,
                    relation = %open.name,
                    "relation block opened before the previous one was closed; dropping it"
                );
            }
            current = Some(OpenBlock {
                name: name.to_string(),
                attributes: attributes.into_iter().map(str::to_string).collect(),
                tuples: Vec::new(),
                line: line_no,
            });
            continue;
        }

        let Some(block) = current.as_mut() else {
            warn!(line = line_no, text = line, "ignoring unrecognized line");
            continue;
        };

        match tuple_values(line) {
            Ok((_, values)) if values.len() == block.attributes.len() => {
                block.tuples.push(values.into_iter().map(str::to_string).collect());
            }
            Ok((_, values)) => warn!(
                line = line_no,
                relation = %block.name,
                expected = block.attributes.len(),
                found = values.len(),
                "skipping tuple with wrong number of values"
            ),
            Err(_) => warn!(line = line_no, relation = %block.name, "skipping malformed tuple"),
        }
    }

    if let Some(block) = current {
        warn!(
            line = block.line,
            relation = %block.name,
            "relation block never closed; dropping it"
        );
    }

    debug!(
        relations = input.relations.len(),
        queries = input.queries.len(),
        "input loaded"
    );
    Ok(input)
}

fn close_block(block: OpenBlock, relations: &mut Vec<Relation>) {
    match Relation::new(block.name, block.attributes, block.tuples) {
        Ok(relation) => relations.push(relation),
        Err(e) => warn!(line = block.line, error = %e, "skipping invalid relation"),
    }
}

// ========== Line grammars ==========

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(space0, inner, space0)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(is_name_char)(input)
}

/// `Name(attr, ...) = {`
fn relation_header(input: &str) -> IResult<&str, (&str, Vec<&str>)> {
    map(
        all_consuming(tuple((
            ws(identifier),
            delimited(char('('), separated_list1(char(','), ws(identifier)), char(')')),
            ws(char('=')),
            ws(char('{')),
        ))),
        |(name, attributes, _, _)| (name, attributes),
    )(input)
}

fn double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c: char| c != '"'), char('"'))(input)
}

fn single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_while(|c: char| c != '\''), char('\''))(input)
}

fn bare(input: &str) -> IResult<&str, &str> {
    map(take_while(|c: char| c != ','), str::trim)(input)
}

/// `v1, "v2", 'v3'`
fn tuple_values(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(separated_list1(
        char(','),
        ws(alt((double_quoted, single_quoted, bare))),
    ))(input)
}
