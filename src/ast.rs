//! Abstract Syntax Tree for grepql queries
//!
//! A query is a command (FIND, COUNT, EXTRACT), a unit target (LINES, WORDS),
//! an optional condition tree, and a set of modifiers.

use std::fmt;

/// A span in the query text, for error reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A node with source location
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// What the query does with satisfying units
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `FIND` - emit every satisfying unit
    Find,
    /// `COUNT` - emit the number of satisfying units
    Count,
    /// `EXTRACT REGEX "p"` - emit the first capture group of `p` per satisfying unit
    Extract(Spanned<String>),
}

impl Command {
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Find => "FIND",
            Command::Count => "COUNT",
            Command::Extract(_) => "EXTRACT",
        }
    }
}

/// The span of text a condition is evaluated against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Target {
    #[default]
    Lines,
    Words,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Lines => write!(f, "LINES"),
            Target::Words => write!(f, "WORDS"),
        }
    }
}

/// Query-wide flags altering how patterns are compiled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ignore_case: bool,
    pub multiline: bool,
    pub dotall: bool,
    pub whole_word: bool,
}

impl Modifiers {
    /// Turn on a single flag. Repeating a flag is a no-op.
    pub fn set(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::IgnoreCase => self.ignore_case = true,
            Modifier::Multiline => self.multiline = true,
            Modifier::Dotall => self.dotall = true,
            Modifier::WholeWord => self.whole_word = true,
        }
    }

    /// Active flags, in canonical order
    pub fn iter(&self) -> impl Iterator<Item = Modifier> {
        [
            (self.ignore_case, Modifier::IgnoreCase),
            (self.multiline, Modifier::Multiline),
            (self.dotall, Modifier::Dotall),
            (self.whole_word, Modifier::WholeWord),
        ]
        .into_iter()
        .filter_map(|(on, m)| on.then_some(m))
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut modifiers = Modifiers::default();
        for m in iter {
            modifiers.set(m);
        }
        modifiers
    }
}

/// A single modifier phrase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    IgnoreCase,
    Multiline,
    Dotall,
    WholeWord,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::IgnoreCase => write!(f, "IGNORE CASE"),
            Modifier::Multiline => write!(f, "MULTILINE"),
            Modifier::Dotall => write!(f, "DOTALL"),
            Modifier::WholeWord => write!(f, "WHOLE WORD"),
        }
    }
}

/// Operator of an atomic condition. Counted operators carry their bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtomicOp {
    StartsWith,
    EndsWith,
    Contains,
    Regex,
    AtLeast(u64),
    AtMost(u64),
    Exactly(u64),
    /// Inclusive; parser guarantees `low <= high`
    Between(u64, u64),
}

impl AtomicOp {
    /// Whether the operand is a literal (escaped, subject to WHOLE WORD)
    pub fn is_literal(&self) -> bool {
        !matches!(self, AtomicOp::Regex)
    }

    /// Occurrence bounds `(min, max)` for counted operators
    pub fn bounds(&self) -> Option<(u64, Option<u64>)> {
        match *self {
            AtomicOp::AtLeast(n) => Some((n, None)),
            AtomicOp::AtMost(n) => Some((0, Some(n))),
            AtomicOp::Exactly(n) => Some((n, Some(n))),
            AtomicOp::Between(lo, hi) => Some((lo, Some(hi))),
            _ => None,
        }
    }
}

/// A single non-decomposable match rule, e.g. `STARTS WITH "x"`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Atomic {
    pub op: AtomicOp,
    /// Never empty
    pub operand: String,
    /// Location of the operand literal
    pub span: Span,
}

/// AND / OR
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combinator {
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => write!(f, "AND"),
            Combinator::Or => write!(f, "OR"),
        }
    }
}

/// Boolean condition tree
///
/// Combinators fold strictly left to right with no precedence between AND
/// and OR: `a AND b OR c` is `(a AND b) OR c`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Atomic(Atomic),
    Combine {
        op: Combinator,
        left: Box<Condition>,
        right: Box<Condition>,
    },
    /// `base BUT NOT excluded` / `base EXCEPT excluded`, i.e. `base AND NOT excluded`
    Exclude {
        base: Box<Condition>,
        excluded: Box<Condition>,
    },
}

impl Condition {
    pub fn combine(op: Combinator, left: Condition, right: Condition) -> Self {
        Condition::Combine {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn exclude(base: Condition, excluded: Condition) -> Self {
        Condition::Exclude {
            base: Box::new(base),
            excluded: Box::new(excluded),
        }
    }

    /// Atomic leaves in left-to-right order
    pub fn atoms(&self) -> Vec<&Atomic> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        match self {
            Condition::Atomic(a) => out.push(a),
            Condition::Combine { left, right, .. } => {
                left.collect_atoms(out);
                right.collect_atoms(out);
            }
            Condition::Exclude { base, excluded } => {
                base.collect_atoms(out);
                excluded.collect_atoms(out);
            }
        }
    }
}

/// A fully parsed query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub command: Command,
    /// Resolved unit type (a trailing `FROM` clause has already been applied)
    pub target: Target,
    /// `None` matches every unit
    pub condition: Option<Condition>,
    pub modifiers: Modifiers,
}

impl Query {
    /// The EXTRACT capture pattern, if any
    pub fn capture(&self) -> Option<&Spanned<String>> {
        match &self.command {
            Command::Extract(pattern) => Some(pattern),
            _ => None,
        }
    }
}
