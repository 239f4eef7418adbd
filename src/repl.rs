//! REPL (Read-Eval-Print Loop) for grepql
//!
//! Each input line is either a query, run against the current input, or a
//! `:`-prefixed meta-command.

use std::io;
use std::path::{Path, PathBuf};

use crate::compile::CompiledQuery;
use crate::error::QueryError;
use crate::eval::{Evaluator, Outcome};
use crate::source;

/// REPL state: the input every query runs against
#[derive(Debug, Default)]
pub struct ReplState {
    /// `None` reads stdin
    pub input: Option<PathBuf>,
}

impl ReplState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(path: impl Into<PathBuf>) -> Self {
        Self {
            input: Some(path.into()),
        }
    }

    pub fn input_name(&self) -> String {
        match &self.input {
            Some(path) => path.display().to_string(),
            None => "<stdin>".to_string(),
        }
    }

    /// Classify a line of input
    pub fn process_line(&self, line: &str) -> InputResult {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            InputResult::Empty
        } else if trimmed.starts_with(':') {
            InputResult::MetaCommand(MetaCommand::parse(trimmed))
        } else {
            InputResult::Query(trimmed.to_string())
        }
    }

    /// Set the input file; `-` switches back to stdin
    pub fn set_input(&mut self, path: &Path) {
        self.input = if path == Path::new("-") {
            None
        } else {
            Some(path.to_path_buf())
        };
    }

    /// Compile a query and run it against a freshly opened input
    pub fn execute(&self, query: &str) -> Result<Outcome, ExecuteError> {
        let compiled = crate::compile_str(query)?;
        self.execute_compiled(&compiled)
    }

    pub fn execute_compiled(&self, compiled: &CompiledQuery) -> Result<Outcome, ExecuteError> {
        let reader = source::open(self.input.as_deref())?;
        Ok(Evaluator::new(compiled).try_run(source::lines(reader))?)
    }
}

/// Failure while executing a REPL query
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("cannot read input: {0}")]
    Io(#[from] io::Error),
}

/// Result of processing a line of input
#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    MetaCommand(MetaCommand),
    Query(String),
    Empty,
}

/// Meta-commands supported by the REPL
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Help,
    Quit,
    /// `:file <path>` - set the input (`-` for stdin)
    File(PathBuf),
    /// `:explain <query>` - show the compiled predicate without running it
    Explain(String),
    Unknown(String),
}

impl MetaCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim_start_matches(':').trim();
        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        match cmd {
            "help" | "h" | "?" => MetaCommand::Help,
            "quit" | "q" | "exit" => MetaCommand::Quit,
            "file" | "f" | "input" => {
                if rest.is_empty() {
                    MetaCommand::Unknown(":file requires a path (or - for stdin)".to_string())
                } else {
                    MetaCommand::File(PathBuf::from(rest))
                }
            }
            "explain" | "e" => {
                if rest.is_empty() {
                    MetaCommand::Unknown(":explain requires a query".to_string())
                } else {
                    MetaCommand::Explain(rest.to_string())
                }
            }
            other => MetaCommand::Unknown(format!("Unknown command: :{}", other)),
        }
    }
}
