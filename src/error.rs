//! Error types and formatting for grepql
//!
//! Every failure is terminal for the current query and carries the span of
//! the offending text. Reports are rendered with ariadne.

use ariadne::{Color, Label, Report, ReportKind, Source};
use chumsky::error::{Simple, SimpleReason};
use thiserror::Error;

use crate::ast::Span;
use crate::lexer::Token;

/// Kind of a [`QueryError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Syntax,
    Pattern,
}

/// A query that could not be tokenized, parsed or compiled
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Unterminated quote or invalid character
    #[error("lexical error at {span}: {message}")]
    Lex { span: Span, message: String },

    /// Grammar violation
    #[error("syntax error at {span}: {message}")]
    Syntax { span: Span, message: String },

    /// A REGEX operand or capture pattern the regex engine rejects
    #[error("pattern error at {span}: {message}")]
    Pattern { span: Span, message: String },
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Lex { .. } => ErrorKind::Lex,
            QueryError::Syntax { .. } => ErrorKind::Syntax,
            QueryError::Pattern { .. } => ErrorKind::Pattern,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            QueryError::Lex { span, .. }
            | QueryError::Syntax { span, .. }
            | QueryError::Pattern { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            QueryError::Lex { message, .. }
            | QueryError::Syntax { message, .. }
            | QueryError::Pattern { message, .. } => message,
        }
    }

    fn title(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Lex => "Lexical error",
            ErrorKind::Syntax => "Syntax error",
            ErrorKind::Pattern => "Pattern error",
        }
    }
}

/// Convert the first lexer error into a [`QueryError`]
pub fn from_lexer_errors(errors: Vec<Simple<char>>) -> QueryError {
    match errors.into_iter().next() {
        Some(error) => QueryError::Lex {
            span: error.span().into(),
            message: format_lexer_error(&error),
        },
        None => QueryError::Lex {
            span: Span::new(0, 0),
            message: "unknown lexical error".to_string(),
        },
    }
}

/// Convert the first parser error into a [`QueryError`]
pub fn from_parser_errors(errors: Vec<Simple<Token>>) -> QueryError {
    match errors.into_iter().next() {
        Some(error) => QueryError::Syntax {
            span: error.span().into(),
            message: format_parser_error(&error),
        },
        None => QueryError::Syntax {
            span: Span::new(0, 0),
            message: "unknown syntax error".to_string(),
        },
    }
}

/// Format a single lexer error into a readable message
fn format_lexer_error(error: &Simple<char>) -> String {
    if let SimpleReason::Custom(msg) = error.reason() {
        return msg.clone();
    }

    match error.found() {
        Some(c) => format!("invalid character '{}'", c),
        None => "unexpected end of query".to_string(),
    }
}

/// Format a single parser error into a readable message
fn format_parser_error(error: &Simple<Token>) -> String {
    if let SimpleReason::Custom(msg) = error.reason() {
        return msg.clone();
    }

    let found = error
        .found()
        .map(|t| format!("'{}'", t))
        .unwrap_or_else(|| "end of query".to_string());

    let mut expected: Vec<String> = error
        .expected()
        .filter_map(|opt| opt.as_ref())
        .map(|t| format!("'{}'", t))
        .collect();
    expected.sort();
    expected.dedup();

    if !expected.is_empty() {
        format!("unexpected {}, expected one of: {}", found, expected.join(", "))
    } else if let Some(label) = error.label() {
        format!("unexpected {}, expected {}", found, label)
    } else {
        format!("unexpected {}", found)
    }
}

/// Render an error against the query text it came from
pub fn report(source: &str, error: &QueryError) -> String {
    let len = source.chars().count();
    let span = error.span();
    let start = span.start.min(len);
    let end = span.end.clamp(start, len);

    let mut output = Vec::new();
    let written = Report::build(ReportKind::Error, (), start)
        .with_message(error.title())
        .with_label(
            Label::new(start..end)
                .with_message(error.message())
                .with_color(Color::Red),
        )
        .finish()
        .write(Source::from(source), &mut output);

    match written.map(|_| String::from_utf8(output)) {
        Ok(Ok(text)) => text,
        _ => format!("{}\n", error),
    }
}
