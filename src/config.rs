//! Configuration for RelAlg
//!
//! Engine settings and batch-run settings, both with builder-style setters.

use std::path::{Path, PathBuf};

/// Default prefix for temporary relation names
pub const DEFAULT_TEMP_PREFIX: &str = "temp";

/// Default input file for batch runs
pub const DEFAULT_INPUT: &str = "input.txt";

/// Default report file for batch runs
pub const DEFAULT_OUTPUT: &str = "output.txt";

/// Execution engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Prefix for generated temporary relation names
    pub temp_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the temporary relation name prefix
    pub fn temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }
}

/// Report rendering format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Relation renderings and error lines, blank-line separated
    #[default]
    Text,
    /// JSON array of outcomes
    Json,
}

/// Batch run configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// File holding relation definitions and queries
    pub input: PathBuf,
    /// File the report is written to
    pub output: PathBuf,
    /// Report format
    pub format: ReportFormat,
    /// Engine settings
    pub engine: EngineConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: ReportFormat::Text,
            engine: EngineConfig::default(),
        }
    }
}

impl RunConfig {
    /// Create a new run config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input file
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.input = path.as_ref().to_path_buf();
        self
    }

    /// Set the report file
    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = path.as_ref().to_path_buf();
        self
    }

    /// Set the report format
    pub fn format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the engine settings
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}
