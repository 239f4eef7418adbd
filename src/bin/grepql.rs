//! grepql - find, count and extract text with a readable query language
//!
//! Usage: grepql [OPTIONS] [QUERY] [FILE]
//!
//! Without a QUERY an interactive prompt is started. Commands:
//!   :help            - Show help
//!   :quit            - Exit
//!   :file <path>     - Set the input file (- for stdin)
//!   :explain <query> - Show the compiled predicate

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tracing_subscriber::EnvFilter;

use grepql::error::report;
use grepql::repl::{ExecuteError, InputResult, MetaCommand, ReplState};
use grepql::Outcome;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = "grepql> ";

/// Find, count and extract text with a readable query language
#[derive(Debug, Parser)]
#[command(name = "grepql", version, about)]
struct Cli {
    /// Query, e.g. 'FIND LINES THAT CONTAINS "error" IGNORE CASE'
    query: Option<String>,

    /// Input file; stdin when absent or `-`
    file: Option<PathBuf>,

    /// Print the parsed query and compiled predicate instead of running it
    #[arg(short, long)]
    explain: bool,

    /// Start the interactive prompt (default when no query is given)
    #[arg(short, long)]
    interactive: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// History file for the interactive prompt
    #[arg(long, env = "GREPQL_HISTORY")]
    history: Option<PathBuf>,
}

/// What to do once the command line is parsed
#[derive(Debug, PartialEq, Eq)]
enum Mode<'a> {
    /// Run one query and exit
    Once(&'a str),
    /// Start the prompt, running `initial` first when given
    Interactive { initial: Option<&'a str> },
}

impl Cli {
    fn mode(&self) -> Mode<'_> {
        match self.query.as_deref() {
            Some(query) if !self.interactive => Mode::Once(query),
            initial => Mode::Interactive { initial },
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.mode() {
        Mode::Once(query) => run_once(query, &cli),
        Mode::Interactive { initial } => {
            let mut state = match &cli.file {
                Some(path) => ReplState::with_input(path),
                None => ReplState::new(),
            };
            run_repl(&mut state, initial, cli.history.clone().or_else(history_path))
        }
    }
}

/// Run a single query from the command line.
///
/// Exit codes: 0 something matched, 1 nothing matched or input unreadable,
/// 2 the query is invalid.
fn run_once(query: &str, cli: &Cli) -> ExitCode {
    let mut state = ReplState::new();
    if let Some(path) = &cli.file {
        state.set_input(path);
    }

    let compiled = match grepql::compile_str(query) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprint!("{}", report(query, &e));
            return ExitCode::from(2);
        }
    };

    if cli.explain {
        println!("{}", grepql::pretty_print(&compiled.query));
        println!("{}", compiled);
        return ExitCode::SUCCESS;
    }

    match state.execute_compiled(&compiled) {
        Ok(outcome) => {
            print_outcome(&outcome);
            if outcome.is_empty() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(ExecuteError::Query(e)) => {
            eprint!("{}", report(query, &e));
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {} ({})", e, state.input_name());
            ExitCode::from(1)
        }
    }
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Matches(items) | Outcome::Extractions(items) => {
            for item in items {
                println!("{}", item);
            }
        }
        Outcome::Count(n) => println!("{}", n),
    }
}

fn run_repl(
    state: &mut ReplState,
    initial: Option<&str>,
    history_path: Option<PathBuf>,
) -> ExitCode {
    println!("grepql v{} - reading from {}", VERSION, state.input_name());
    println!("Type :help for help, :quit to exit\n");

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), DefaultHistory> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: failed to create editor: {}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    if let Some(query) = initial {
        println!("{}{}", PROMPT, query);
        let _ = rl.add_history_entry(query);
        handle_query(state, query);
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => match state.process_line(&line) {
                InputResult::MetaCommand(cmd) => {
                    if !handle_command(state, cmd) {
                        break;
                    }
                }
                InputResult::Query(query) => handle_query(state, &query),
                InputResult::Empty => {}
            },
            Err(ReadlineError::Interrupted) => {
                println!("Use :quit or Ctrl-D to exit");
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }
    ExitCode::SUCCESS
}

/// Handle a meta-command. Returns false if we should exit.
fn handle_command(state: &mut ReplState, cmd: MetaCommand) -> bool {
    match cmd {
        MetaCommand::Help => print_help(),
        MetaCommand::Quit => {
            println!("Goodbye!");
            return false;
        }
        MetaCommand::File(path) => {
            state.set_input(&path);
            println!("Reading from {}", state.input_name());
        }
        MetaCommand::Explain(query) => match grepql::compile_str(&query) {
            Ok(compiled) => {
                println!("{}", grepql::pretty_print(&compiled.query));
                println!("{}", compiled);
            }
            Err(e) => eprint!("{}", report(&query, &e)),
        },
        MetaCommand::Unknown(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!("Type :help for available commands");
        }
    }
    true
}

fn handle_query(state: &ReplState, query: &str) {
    match state.execute(query) {
        Ok(outcome) => {
            print_outcome(&outcome);
            if let Outcome::Matches(items) | Outcome::Extractions(items) = &outcome {
                println!("({} result{})", items.len(), if items.len() == 1 { "" } else { "s" });
            }
        }
        Err(ExecuteError::Query(e)) => eprint!("{}", report(query, &e)),
        Err(e) => eprintln!("Error: {} ({})", e, state.input_name()),
    }
}

fn print_help() {
    println!("grepql commands:");
    println!();
    println!("  :help              Show this help");
    println!("  :quit              Exit");
    println!("  :file <path>       Read input from <path> (- for stdin)");
    println!("  :explain <query>   Show the compiled predicate without running it");
    println!();
    println!("Queries:");
    println!("  FIND|COUNT [LINES|WORDS] THAT <condition> [FROM LINES|WORDS] [modifiers]");
    println!("  EXTRACT REGEX \"(pattern)\" [FROM LINES|WORDS] THAT <condition> [modifiers]");
    println!();
    println!("Conditions (joined left to right with AND / OR, excluded with BUT NOT / EXCEPT):");
    println!("  STARTS WITH \"x\"   ENDS WITH \"x\"   CONTAINS \"x\"   REGEX \"p\"");
    println!("  AT LEAST n TIMES \"x\"   AT MOST n TIMES \"x\"");
    println!("  EXACTLY n TIMES \"x\"    BETWEEN lo AND hi TIMES \"x\"");
    println!();
    println!("Modifiers: IGNORE CASE, MULTILINE, DOTALL, WHOLE WORD");
}

/// Default history file, under the platform config directory
fn history_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("grepql").join("history"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("grepql").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_query_runs_once() {
        let cli = cli(&["FIND LINES", "data.txt"]);
        assert_eq!(cli.mode(), Mode::Once("FIND LINES"));
        assert_eq!(cli.file, Some(PathBuf::from("data.txt")));
    }

    #[test]
    fn test_no_query_is_interactive() {
        assert_eq!(cli(&[]).mode(), Mode::Interactive { initial: None });
    }

    #[test]
    fn test_interactive_keeps_query() {
        let cli = cli(&["-i", "COUNT LINES"]);
        assert_eq!(
            cli.mode(),
            Mode::Interactive {
                initial: Some("COUNT LINES")
            }
        );
    }

    #[test]
    fn test_history_path_is_namespaced() {
        if let Some(path) = history_path() {
            assert!(path.ends_with("grepql/history"));
        }
    }
}
