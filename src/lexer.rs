//! Lexer for grepql
//!
//! Tokenizes a raw query into keywords, quoted literals, numbers and bare words.

use chumsky::prelude::*;
use std::ops::Range;

/// Reserved words of the query language
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    Find,
    Count,
    Extract,
    Lines,
    Words,
    That,
    Starts,
    With,
    Ends,
    Contains,
    Regex,
    At,
    Least,
    Most,
    Exactly,
    Between,
    Times,
    And,
    Or,
    But,
    Not,
    Except,
    Ignore,
    Case,
    Multiline,
    Dotall,
    Whole,
    Word,
    From,
}

/// Fixed keyword table. Singular spellings map onto the canonical keyword.
const KEYWORDS: &[(&str, Keyword)] = &[
    ("FIND", Keyword::Find),
    ("COUNT", Keyword::Count),
    ("EXTRACT", Keyword::Extract),
    ("LINES", Keyword::Lines),
    ("WORDS", Keyword::Words),
    ("THAT", Keyword::That),
    ("STARTS", Keyword::Starts),
    ("START", Keyword::Starts),
    ("WITH", Keyword::With),
    ("ENDS", Keyword::Ends),
    ("END", Keyword::Ends),
    ("CONTAINS", Keyword::Contains),
    ("CONTAIN", Keyword::Contains),
    ("REGEX", Keyword::Regex),
    ("AT", Keyword::At),
    ("LEAST", Keyword::Least),
    ("MOST", Keyword::Most),
    ("EXACTLY", Keyword::Exactly),
    ("BETWEEN", Keyword::Between),
    ("TIMES", Keyword::Times),
    ("TIME", Keyword::Times),
    ("AND", Keyword::And),
    ("OR", Keyword::Or),
    ("BUT", Keyword::But),
    ("NOT", Keyword::Not),
    ("EXCEPT", Keyword::Except),
    ("IGNORE", Keyword::Ignore),
    ("CASE", Keyword::Case),
    ("MULTILINE", Keyword::Multiline),
    ("DOTALL", Keyword::Dotall),
    ("WHOLE", Keyword::Whole),
    ("WORD", Keyword::Word),
    ("FROM", Keyword::From),
];

impl Keyword {
    /// Case-insensitive lookup
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(text, _)| text.eq_ignore_ascii_case(word))
            .map(|&(_, kw)| kw)
    }

    /// Canonical spelling
    pub fn as_str(&self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, kw)| kw == self)
            .map(|&(text, _)| text)
            .unwrap_or("?")
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token types for grepql
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Keyword(Keyword),
    /// Quoted literal, with `\"` unescaped
    Str(String),
    /// Integer literal, kept as text until the parser checks its range
    Number(String),
    /// A bare word that is not a keyword
    Word(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Keyword(kw) => write!(f, "{}", kw),
            Token::Str(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Token::Number(n) => write!(f, "{}", n),
            Token::Word(w) => write!(f, "{}", w),
        }
    }
}

/// Type alias for spans
pub type Span = Range<usize>;

/// Create a lexer for grepql
pub fn lexer() -> impl Parser<char, Vec<(Token, Span)>, Error = Simple<char>> {
    let word = text::ident().map(|s: String| match Keyword::lookup(&s) {
        Some(kw) => Token::Keyword(kw),
        None => Token::Word(s),
    });

    // Leading zeros are allowed; a number running straight into a word
    // (`2TIMES`) is rejected.
    let number = filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .then(
            filter(|c: &char| c.is_alphanumeric() || *c == '_')
                .repeated()
                .collect::<String>(),
        )
        .try_map(|(digits, rest), span| {
            if rest.is_empty() {
                Ok(Token::Number(digits))
            } else {
                Err(Simple::custom(
                    span,
                    format!("missing space after number in '{}{}'", digits, rest),
                ))
            }
        });

    // `\"` is an escaped quote; any other backslash sequence is kept as-is
    // so regex escapes like `\d` reach the pattern compiler untouched.
    let string_char = just('\\')
        .ignore_then(just('"'))
        .map(|c| vec![c])
        .or(just('\\').then(any()).map(|(a, b)| vec![a, b]))
        .or(none_of("\\\"").map(|c| vec![c]));

    let string = just('"')
        .ignore_then(string_char.repeated().flatten())
        .then(just('"').or_not())
        .try_map(|(chars, close), span| match close {
            Some(_) => Ok(Token::Str(chars.into_iter().collect())),
            None => Err(Simple::custom(span, "unterminated quote")),
        });

    choice((string, number, word))
        .map_with_span(|tok, span| (tok, span))
        .padded()
        .repeated()
        .then_ignore(end())
}

// Unit tests live in tests/unit_parsing.rs
