//! Compile condition trees into regex predicates
//!
//! Each atomic condition becomes one [`Matcher`]: a regex built with the
//! query's flags, plus optional occurrence bounds for the counted operators.
//! Combinators and exclusions stay as a boolean tree over those matchers, so
//! no lookaround support is needed from the regex engine.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::ast::{Atomic, AtomicOp, Combinator, Condition, Modifiers, Query, Span, Spanned};
use crate::error::QueryError;

/// How many non-overlapping occurrences a matcher requires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occurrences {
    /// At least one, tested with a plain search
    Any,
    /// Inclusive range; `max = None` is unbounded
    Range { min: u64, max: Option<u64> },
}

impl Occurrences {
    fn contains(&self, count: u64) -> bool {
        match *self {
            Occurrences::Any => count >= 1,
            Occurrences::Range { min, max } => count >= min && max.map_or(true, |m| count <= m),
        }
    }
}

/// A single compiled regex test
#[derive(Clone, Debug)]
pub struct Matcher {
    regex: Regex,
    occurrences: Occurrences,
}

impl Matcher {
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn occurrences(&self) -> Occurrences {
        self.occurrences
    }

    pub fn is_match(&self, unit: &str) -> bool {
        match self.occurrences {
            Occurrences::Any => self.regex.is_match(unit),
            Occurrences::Range { max, .. } => {
                // Stop counting once the upper bound is exceeded.
                let limit = max
                    .and_then(|m| usize::try_from(m).ok())
                    .map_or(usize::MAX, |m| m.saturating_add(1));
                let count = self.regex.find_iter(unit).take(limit).count() as u64;
                self.occurrences.contains(count)
            }
        }
    }
}

/// A boolean combination of regex tests
#[derive(Clone, Debug)]
pub enum Predicate {
    /// No condition: every unit satisfies it
    Always,
    Test(Matcher),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    /// `base AND NOT excluded`
    AndNot(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn is_match(&self, unit: &str) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Test(m) => m.is_match(unit),
            Predicate::And(l, r) => l.is_match(unit) && r.is_match(unit),
            Predicate::Or(l, r) => l.is_match(unit) || r.is_match(unit),
            Predicate::AndNot(base, excluded) => base.is_match(unit) && !excluded.is_match(unit),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => write!(f, "TRUE"),
            Predicate::Test(m) => match m.occurrences {
                Occurrences::Any => write!(f, "/{}/", m.pattern()),
                Occurrences::Range { min, max: Some(max) } => {
                    write!(f, "/{}/{{{},{}}}", m.pattern(), min, max)
                }
                Occurrences::Range { min, max: None } => write!(f, "/{}/{{{},}}", m.pattern(), min),
            },
            Predicate::And(l, r) => write!(f, "({} AND {})", l, r),
            Predicate::Or(l, r) => write!(f, "({} OR {})", l, r),
            Predicate::AndNot(l, r) => write!(f, "({} AND NOT {})", l, r),
        }
    }
}

/// A query ready for evaluation
#[derive(Clone, Debug)]
pub struct CompiledQuery {
    pub query: Query,
    pub predicate: Predicate,
    /// Present for EXTRACT; has at least one capture group
    pub capture: Option<Regex>,
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "command:   {}", self.query.command.keyword())?;
        writeln!(f, "target:    {}", self.query.target)?;
        let flags: Vec<String> = self.query.modifiers.iter().map(|m| m.to_string()).collect();
        if flags.is_empty() {
            writeln!(f, "modifiers: none")?;
        } else {
            writeln!(f, "modifiers: {}", flags.join(", "))?;
        }
        write!(f, "predicate: {}", self.predicate)?;
        if let Some(capture) = &self.capture {
            write!(f, "\ncapture:   /{}/", capture.as_str())?;
        }
        Ok(())
    }
}

/// Regex source for an atomic condition, before flags are applied
pub fn fragment(atomic: &Atomic, modifiers: &Modifiers) -> String {
    if !atomic.op.is_literal() {
        return atomic.operand.clone();
    }

    let escaped = regex::escape(&atomic.operand);
    let body = if modifiers.whole_word {
        format!(r"\b(?:{})\b", escaped)
    } else {
        escaped
    };

    match atomic.op {
        AtomicOp::StartsWith => format!("^{}", body),
        AtomicOp::EndsWith => format!("{}$", body),
        _ => body,
    }
}

fn build_regex(pattern: &str, modifiers: &Modifiers, span: Span) -> Result<Regex, QueryError> {
    RegexBuilder::new(pattern)
        .case_insensitive(modifiers.ignore_case)
        .multi_line(modifiers.multiline)
        .dot_matches_new_line(modifiers.dotall)
        .build()
        .map_err(|e| QueryError::Pattern {
            span,
            message: e.to_string(),
        })
}

/// Compile one atomic condition
pub fn compile_atomic(atomic: &Atomic, modifiers: &Modifiers) -> Result<Matcher, QueryError> {
    let pattern = fragment(atomic, modifiers);
    let regex = build_regex(&pattern, modifiers, atomic.span)?;
    let occurrences = match atomic.op.bounds() {
        Some((min, max)) => Occurrences::Range { min, max },
        None => Occurrences::Any,
    };
    tracing::debug!(pattern = %pattern, ?occurrences, "compiled condition");
    Ok(Matcher { regex, occurrences })
}

/// Compile a condition tree into a predicate
pub fn compile(condition: &Condition, modifiers: &Modifiers) -> Result<Predicate, QueryError> {
    Ok(match condition {
        Condition::Atomic(atomic) => Predicate::Test(compile_atomic(atomic, modifiers)?),
        Condition::Combine { op, left, right } => {
            let left = Box::new(compile(left, modifiers)?);
            let right = Box::new(compile(right, modifiers)?);
            match op {
                Combinator::And => Predicate::And(left, right),
                Combinator::Or => Predicate::Or(left, right),
            }
        }
        Condition::Exclude { base, excluded } => Predicate::AndNot(
            Box::new(compile(base, modifiers)?),
            Box::new(compile(excluded, modifiers)?),
        ),
    })
}

/// Compile the EXTRACT capture pattern
pub fn compile_capture(pattern: &Spanned<String>, modifiers: &Modifiers) -> Result<Regex, QueryError> {
    let regex = build_regex(&pattern.node, modifiers, pattern.span)?;
    if regex.captures_len() < 2 {
        return Err(QueryError::Pattern {
            span: pattern.span,
            message: "capture pattern has no capture group".to_string(),
        });
    }
    Ok(regex)
}

/// Compile a whole query
pub fn compile_query(query: Query) -> Result<CompiledQuery, QueryError> {
    let predicate = match &query.condition {
        Some(condition) => compile(condition, &query.modifiers)?,
        None => Predicate::Always,
    };
    let capture = query
        .capture()
        .map(|pattern| compile_capture(pattern, &query.modifiers))
        .transpose()?;
    Ok(CompiledQuery {
        query,
        predicate,
        capture,
    })
}
