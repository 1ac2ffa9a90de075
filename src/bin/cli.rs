//! RelAlg - CLI
//!
//! Batch mode reads relations and queries from an input file and writes a
//! report. `-c` evaluates a single query and `--repl` starts an interactive
//! session.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relalg::config::{EngineConfig, ReportFormat, RunConfig};
use relalg::loader;
use relalg::report::{self, QueryOutcome};
use relalg::{Catalog, ExecutionEngine, Relation};

/// Relational algebra query engine
#[derive(Parser, Debug)]
#[command(name = "relalg", version, about = "Evaluate relational algebra queries")]
struct Args {
    /// File with relation definitions and queries
    #[arg(short, long, default_value = "input.txt", env = "RELALG_INPUT")]
    input: PathBuf,

    /// File the report is written to
    #[arg(short, long, default_value = "output.txt", env = "RELALG_OUTPUT")]
    output: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text", env = "RELALG_FORMAT")]
    format: FormatArg,

    /// Evaluate a single query against the input relations and exit
    #[arg(short, long, value_name = "QUERY")]
    command: Option<String>,

    /// Start an interactive session
    #[arg(long)]
    repl: bool,

    /// Prefix for temporary relation names
    #[arg(long, default_value = "temp", env = "RELALG_TEMP_PREFIX")]
    temp_prefix: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Report format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Relation listings and error lines
    Text,
    /// JSON array of outcomes
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// Print welcome banner
fn print_banner() {
    println!(
        r#"
 ___     _   _   _
| _ \___| | /_\ | |__ _
|   / -_) |/ _ \| / _` |
|_|_\___|_/_/ \_\_\__, |
                  |___/

 A tiny relational algebra engine in Rust
 Type '.help' for help, '.quit' to exit
"#
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .quit              Exit
  .relations         List all relations
  .schema <name>     Show a relation's attributes
  .load <file>       Load relations from a file and run its queries
  .clear             Clear screen

Queries:
  select <attr> <op> <value> (<expr>)
  project <attr>, ... (<expr>)
  <expr> join|union|intersection|difference <expr>
  <relation>

Examples:
  select dept = "A" (Emp)
  project id (Emp join Dept)
"#
    );
}

/// Format a relation as a table
fn format_results(relation: &Relation) -> String {
    let columns = relation.attribute_names();
    let rows = relation.rows();

    // Calculate column widths
    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();

    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(value.len());
            }
        }
    }

    let mut output = String::new();

    // Header separator
    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    // Header
    output.push_str(&format!("{}\n", relation.name()));
    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:^width$} ", c, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    output.push_str(&format!("|{}|\n", header));
    output.push_str(&separator);

    // Rows
    for row in rows {
        let row_str: String = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!(" {:>width$} ", v, width = *w))
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", row_str));
    }

    if !rows.is_empty() {
        output.push_str(&separator);
    }

    output.push_str(&format!("{} tuple(s) returned\n", rows.len()));

    output
}

/// Evaluate a query and print the result; returns whether it succeeded
fn execute_query(query: &str, engine: &ExecutionEngine) -> bool {
    match report::run_query(engine, query) {
        QueryOutcome::Success { relation, .. } => {
            print!("{}", format_results(&relation));
            true
        }
        QueryOutcome::Failure { message, .. } => {
            eprintln!("Error: {}", message);
            false
        }
    }
}

/// Relations and queries loaded into the engine from one file
struct Loaded {
    relations: usize,
    queries: Vec<String>,
}

/// Load a file into the engine's catalog
fn load_into(engine: &ExecutionEngine, path: &Path) -> Result<Loaded> {
    let input = loader::load_file(path)
        .with_context(|| format!("ERROR - {} not found or unreadable", path.display()))?;
    let relations = input.relations.len();
    engine.load(input.relations);
    Ok(Loaded {
        relations,
        queries: input.queries,
    })
}

/// Handle special dot commands; returns false when the session should end
fn handle_special_command(cmd: &str, engine: &ExecutionEngine) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let catalog = engine.catalog();

    match parts.first().copied() {
        Some(".help") => print_help(),
        Some(".quit") | Some(".exit") => {
            println!("Goodbye!");
            return false;
        }
        Some(".relations") => {
            let relations = catalog.list_relations();
            if relations.is_empty() {
                println!("No relations found.");
            } else {
                println!("Relations:");
                for name in relations {
                    println!("  {}", name);
                }
            }
        }
        Some(".schema") => {
            let names = match parts.get(1) {
                Some(name) => vec![name.to_string()],
                None => catalog.list_relations(),
            };
            for name in names {
                match catalog.get_relation_info(&name) {
                    Ok(info) => println!("{}", info),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
        Some(".load") => match parts.get(1) {
            Some(path) => match load_into(engine, Path::new(path)) {
                Ok(input) => {
                    println!(
                        "Loaded {} relations and {} queries from {}",
                        input.relations,
                        input.queries.len(),
                        path
                    );
                    for query in &input.queries {
                        println!("> {}", query);
                        execute_query(query, engine);
                    }
                }
                Err(e) => eprintln!("{:#}", e),
            },
            None => eprintln!("Usage: .load <file>"),
        },
        Some(".clear") => {
            // Clear screen (ANSI escape code)
            print!("\x1B[2J\x1B[1;1H");
            let _ = io::stdout().flush();
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Type '.help' for available commands.");
        }
        None => {}
    }

    true
}

/// Main REPL loop
fn run_repl(engine: &ExecutionEngine) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    print_banner();

    loop {
        match editor.readline("relalg> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);

                if trimmed.starts_with('.') {
                    if !handle_special_command(trimmed, engine) {
                        break;
                    }
                } else {
                    execute_query(trimmed, engine);
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Load the input, run every query and write the report
fn run_batch(engine: &ExecutionEngine, config: &RunConfig) -> Result<()> {
    let input = load_into(engine, &config.input)?;
    println!(
        "Program has parsed {} relations and {} queries.",
        input.relations,
        input.queries.len()
    );

    let report = report::run_queries(engine, &input.queries);
    info!(
        queries = report.outcomes().len(),
        failures = report.failures(),
        "batch finished"
    );

    report
        .write_to(&config.output, config.format)
        .with_context(|| format!("ERROR - could not write {}", config.output.display()))?;

    println!(
        "SUCCESSFUL - {} has been filled with results.",
        config.output.display()
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "relalg=debug" } else { "relalg=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = RunConfig::new()
        .input(&args.input)
        .output(&args.output)
        .format(args.format.into())
        .engine(EngineConfig::new().temp_prefix(args.temp_prefix.clone()));

    let engine = ExecutionEngine::with_config(Arc::new(Catalog::new()), config.engine.clone());

    if let Some(query) = &args.command {
        load_into(&engine, &config.input)?;
        if !execute_query(query, &engine) {
            return Ok(ExitCode::FAILURE);
        }
    } else if args.repl {
        if config.input.exists() {
            load_into(&engine, &config.input)?;
        }
        run_repl(&engine)?;
    } else {
        run_batch(&engine, &config)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
