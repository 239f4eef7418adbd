//! Parser for grepql
//!
//! Parses token streams into a [`Query`].
//!
//! ```text
//! query     := ("FIND" | "COUNT") [target] ["THAT" condition] tail
//!            | "EXTRACT" ["REGEX"] STRING ["FROM" target] ["THAT" condition] tail
//! tail      := modifier* ["FROM" target] modifier*
//! condition := exclusion (("AND" | "OR") exclusion)*
//! exclusion := atomic (("BUT" "NOT" | "EXCEPT") atomic)*
//! ```

use chumsky::prelude::*;

use crate::ast::*;
use crate::lexer::{Keyword, Span as TokenSpan, Token};

/// Create a parser for a complete query
pub fn parser() -> impl Parser<Token, Query, Error = Simple<Token>> + Clone {
    choice((search_query(), extract_query())).then_ignore(end())
}

fn to_span(span: TokenSpan) -> Span {
    Span::new(span.start, span.end)
}

// ============================================================================
// Helpers
// ============================================================================

fn kw(k: Keyword) -> impl Parser<Token, Token, Error = Simple<Token>> + Clone {
    just(Token::Keyword(k))
}

/// A quoted literal; atomic operands must be non-empty
fn literal() -> impl Parser<Token, Spanned<String>, Error = Simple<Token>> + Clone {
    select! { Token::Str(s) => s }
        .labelled("quoted literal")
        .try_map(|s, span: TokenSpan| {
            if s.is_empty() {
                Err(Simple::custom(span, "empty literal is not allowed"))
            } else {
                Ok(Spanned::new(s, to_span(span)))
            }
        })
}

fn number() -> impl Parser<Token, u64, Error = Simple<Token>> + Clone {
    select! { Token::Number(n) => n }
        .labelled("number")
        .try_map(|n, span: TokenSpan| {
            n.parse::<u64>()
                .map_err(|_| Simple::custom(span, format!("number out of range: {}", n)))
        })
}

fn target() -> impl Parser<Token, Target, Error = Simple<Token>> + Clone {
    choice((
        kw(Keyword::Lines).to(Target::Lines),
        kw(Keyword::Words).to(Target::Words),
    ))
    .labelled("LINES or WORDS")
}

fn modifier() -> impl Parser<Token, Modifier, Error = Simple<Token>> + Clone {
    choice((
        kw(Keyword::Ignore)
            .then(kw(Keyword::Case))
            .to(Modifier::IgnoreCase),
        kw(Keyword::Multiline).to(Modifier::Multiline),
        kw(Keyword::Dotall).to(Modifier::Dotall),
        kw(Keyword::Whole)
            .then(kw(Keyword::Word))
            .to(Modifier::WholeWord),
    ))
}

// ============================================================================
// Conditions
// ============================================================================

fn atomic() -> impl Parser<Token, Condition, Error = Simple<Token>> + Clone {
    let simple = |op: AtomicOp| {
        move |lit: Spanned<String>| Atomic {
            op,
            operand: lit.node,
            span: lit.span,
        }
    };

    let starts = kw(Keyword::Starts)
        .ignore_then(kw(Keyword::With))
        .ignore_then(literal())
        .map(simple(AtomicOp::StartsWith));
    let ends = kw(Keyword::Ends)
        .ignore_then(kw(Keyword::With))
        .ignore_then(literal())
        .map(simple(AtomicOp::EndsWith));
    let contains = kw(Keyword::Contains)
        .ignore_then(literal())
        .map(simple(AtomicOp::Contains));
    let regex = kw(Keyword::Regex)
        .ignore_then(literal())
        .map(simple(AtomicOp::Regex));

    // `<n> TIMES "lit"`
    let counted = |bound: BoxedParser<'static, Token, u64, Simple<Token>>,
                   op: fn(u64) -> AtomicOp| {
        bound
            .then_ignore(kw(Keyword::Times))
            .then(literal())
            .map(move |(n, lit)| Atomic {
                op: op(n),
                operand: lit.node,
                span: lit.span,
            })
    };

    let at_least = counted(
        kw(Keyword::At)
            .ignore_then(kw(Keyword::Least))
            .ignore_then(number())
            .boxed(),
        AtomicOp::AtLeast,
    );
    let at_most = counted(
        kw(Keyword::At)
            .ignore_then(kw(Keyword::Most))
            .ignore_then(number())
            .boxed(),
        AtomicOp::AtMost,
    );
    let exactly = counted(
        kw(Keyword::Exactly).ignore_then(number()).boxed(),
        AtomicOp::Exactly,
    );

    let between = kw(Keyword::Between)
        .ignore_then(number())
        .then_ignore(kw(Keyword::And))
        .then(number())
        .then_ignore(kw(Keyword::Times))
        .then(literal())
        .try_map(|((low, high), lit), span: TokenSpan| {
            if low > high {
                Err(Simple::custom(
                    span,
                    format!("BETWEEN bounds are reversed: {} is greater than {}", low, high),
                ))
            } else {
                Ok(Atomic {
                    op: AtomicOp::Between(low, high),
                    operand: lit.node,
                    span: lit.span,
                })
            }
        });

    choice((
        starts, ends, contains, regex, at_least, at_most, exactly, between,
    ))
    .map(Condition::Atomic)
    .labelled("condition")
}

fn condition() -> impl Parser<Token, Condition, Error = Simple<Token>> + Clone {
    let exclusion_op = kw(Keyword::But)
        .then(kw(Keyword::Not))
        .ignored()
        .or(kw(Keyword::Except).ignored());

    let exclusion = atomic()
        .then(exclusion_op.ignore_then(atomic()).repeated())
        .foldl(Condition::exclude);

    let combinator = choice((
        kw(Keyword::And).to(Combinator::And),
        kw(Keyword::Or).to(Combinator::Or),
    ));

    // Flat left fold: AND and OR share one precedence level.
    exclusion
        .clone()
        .then(combinator.then(exclusion).repeated())
        .foldl(|left, (op, right)| Condition::combine(op, left, right))
}

// ============================================================================
// Queries
// ============================================================================

/// Modifiers with an optional `FROM` target between them
fn tail() -> impl Parser<Token, (Option<Target>, Modifiers), Error = Simple<Token>> + Clone {
    modifier()
        .repeated()
        .then(kw(Keyword::From).ignore_then(target()).or_not())
        .then(modifier().repeated())
        .map(|((before, from), after)| {
            (from, before.into_iter().chain(after).collect::<Modifiers>())
        })
}

fn that_clause() -> impl Parser<Token, Option<Condition>, Error = Simple<Token>> + Clone {
    kw(Keyword::That).ignore_then(condition()).or_not()
}

fn search_query() -> impl Parser<Token, Query, Error = Simple<Token>> + Clone {
    let command = choice((
        kw(Keyword::Find).to(Command::Find),
        kw(Keyword::Count).to(Command::Count),
    ));

    command
        .then(target().or_not())
        .then(that_clause())
        .then(tail())
        .map(|(((command, lead), condition), (from, modifiers))| Query {
            command,
            target: from.or(lead).unwrap_or_default(),
            condition,
            modifiers,
        })
}

fn extract_query() -> impl Parser<Token, Query, Error = Simple<Token>> + Clone {
    let capture = kw(Keyword::Regex).or_not().ignore_then(
        select! { Token::Str(s) => s }
            .map_with_span(|s, span: TokenSpan| Spanned::new(s, to_span(span))),
    );

    // Span of the token following EXTRACT, for a missing capture pattern
    let next_span = any()
        .map_with_span(|_: Token, span: TokenSpan| span)
        .rewind()
        .or_not();

    kw(Keyword::Extract)
        .map_with_span(|_, span: TokenSpan| span)
        .then(next_span)
        .then(capture.or_not())
        .then(kw(Keyword::From).ignore_then(target()).or_not())
        .then(that_clause())
        .then(tail())
        .try_map(
            |(((((keyword, next), capture), lead), condition), (from, modifiers)), _| {
                let capture = match capture {
                    Some(capture) => capture,
                    None => {
                        let at = next.unwrap_or(keyword.end..keyword.end);
                        return Err(Simple::custom(at, "EXTRACT requires a capture pattern"));
                    }
                };
                if capture.node.is_empty() {
                    let at: TokenSpan = capture.span.into();
                    return Err(Simple::custom(at, "capture pattern is empty"));
                }
                Ok(Query {
                    command: Command::Extract(capture),
                    target: from.or(lead).unwrap_or_default(),
                    condition,
                    modifiers,
                })
            },
        )
}

/// Positional error for an input that does not start with a command
pub(crate) fn describe_unknown_command(token: &Token) -> Option<String> {
    match token {
        Token::Keyword(Keyword::Find | Keyword::Count | Keyword::Extract) => None,
        other => Some(format!(
            "unknown command '{}', expected FIND, COUNT or EXTRACT",
            other
        )),
    }
}

// Unit tests live in tests/unit_parsing.rs
