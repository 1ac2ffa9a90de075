//! Query reports for RelAlg
//!
//! Runs a batch of queries, capturing each query's result or error, and
//! renders the collected outcomes as text or JSON.

use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::Relation;
use crate::config::ReportFormat;
use crate::error::Result;
use crate::executor::ExecutionEngine;

/// Result of running one query
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// The query produced a relation
    Success { query: String, relation: Relation },
    /// The query failed; `message` is the error text
    Failure { query: String, message: String },
}

impl QueryOutcome {
    /// The query text this outcome belongs to
    pub fn query(&self) -> &str {
        match self {
            QueryOutcome::Success { query, .. } | QueryOutcome::Failure { query, .. } => query,
        }
    }

    /// Check if the query succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success { .. })
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Success { relation, .. } => write!(f, "{}", relation),
            QueryOutcome::Failure { query, message } => {
                write!(f, "Error running query '{}': {}.", query, message)
            }
        }
    }
}

/// Outcomes of a batch of queries, in query order
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    outcomes: Vec<QueryOutcome>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome
    pub fn push(&mut self, outcome: QueryOutcome) {
        self.outcomes.push(outcome);
    }

    /// All outcomes
    pub fn outcomes(&self) -> &[QueryOutcome] {
        &self.outcomes
    }

    /// Number of failed queries
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    /// Render as text: each outcome followed by a blank line
    pub fn to_text(&self) -> String {
        self.outcomes
            .iter()
            .map(|outcome| format!("{}\n\n", outcome))
            .collect()
    }

    /// Render as a JSON array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render in the given format
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => self.to_json(),
        }
    }

    /// Write the rendered report to `path`
    pub fn write_to(&self, path: impl AsRef<Path>, format: ReportFormat) -> Result<()> {
        let rendered = self.render(format)?;
        let mut file = std::fs::File::create(path.as_ref())?;
        file.write_all(rendered.as_bytes())?;
        info!(path = %path.as_ref().display(), outcomes = self.outcomes.len(), "report written");
        Ok(())
    }
}

/// Evaluate one query, capturing its error instead of propagating it
pub fn run_query(engine: &ExecutionEngine, query: &str) -> QueryOutcome {
    match engine.evaluate(query) {
        Ok(relation) => QueryOutcome::Success {
            query: query.to_string(),
            relation,
        },
        Err(e) => {
            debug!(query, error = %e, "query failed");
            QueryOutcome::Failure {
                query: query.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// Evaluate every query in order; one failure never stops the batch
pub fn run_queries<S: AsRef<str>>(engine: &ExecutionEngine, queries: &[S]) -> Report {
    let mut report = Report::new();
    for query in queries {
        report.push(run_query(engine, query.as_ref()));
    }
    report
}
