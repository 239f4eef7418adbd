//! grepql: a small query language for searching text
//!
//! A query such as `FIND LINES THAT STARTS WITH "abc" AND ENDS WITH "xyz" IGNORE CASE`
//! is tokenized, parsed into a condition tree, compiled into a boolean
//! combination of regex tests, and evaluated unit by unit over lines or words.

pub mod ast;
pub mod compile;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod repl;
pub mod source;

pub use ast::*;
pub use compile::{CompiledQuery, Predicate, compile_query};
pub use error::{ErrorKind, QueryError};
pub use eval::{Evaluator, Outcome};
pub use lexer::lexer;
pub use parser::parser;
pub use pretty::pretty_print;

use chumsky::Parser as _;
use lexer::Token;

/// Tokenize a raw query into tokens with character spans
pub fn tokenize(input: &str) -> Result<Vec<(Token, lexer::Span)>, QueryError> {
    lexer::lexer()
        .parse(input)
        .map_err(error::from_lexer_errors)
}

/// Parse a token sequence into a query
pub fn parse_tokens(tokens: Vec<(Token, lexer::Span)>, len: usize) -> Result<Query, QueryError> {
    let (first, first_span) = match tokens.first() {
        Some(first) => first.clone(),
        None => {
            return Err(QueryError::Syntax {
                span: Span::new(0, len),
                message: "empty query".to_string(),
            });
        }
    };
    if let Some(message) = parser::describe_unknown_command(&first) {
        return Err(QueryError::Syntax {
            span: first_span.into(),
            message,
        });
    }

    parser::parser()
        .parse(chumsky::Stream::from_iter(len..len + 1, tokens.into_iter()))
        .map_err(error::from_parser_errors)
}

/// Parse a query string
pub fn parse(input: &str) -> Result<Query, QueryError> {
    let tokens = tokenize(input)?;
    let query = parse_tokens(tokens, input.chars().count())?;
    tracing::debug!(query = %pretty_print(&query), "parsed query");
    Ok(query)
}

/// Parse and compile a query string
pub fn compile_str(input: &str) -> Result<CompiledQuery, QueryError> {
    compile_query(parse(input)?)
}

/// Run a query string over in-memory lines
pub fn run<I, S>(input: &str, lines: I) -> Result<Outcome, QueryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let compiled = compile_str(input)?;
    Ok(Evaluator::new(&compiled).run(lines))
}
