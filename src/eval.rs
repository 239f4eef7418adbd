//! Evaluate compiled queries against a stream of lines
//!
//! Lines are consumed one at a time; only the accumulated result is kept.

use std::convert::Infallible;

use crate::ast::{Command, Target};
use crate::compile::CompiledQuery;

/// Result of running a query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Satisfying units, in input order
    Matches(Vec<String>),
    /// Number of satisfying units
    Count(usize),
    /// First capture group per satisfying unit, in input order
    Extractions(Vec<String>),
}

impl Outcome {
    /// Empty result for a command
    pub fn empty(command: &Command) -> Self {
        match command {
            Command::Find => Outcome::Matches(Vec::new()),
            Command::Count => Outcome::Count(0),
            Command::Extract(_) => Outcome::Extractions(Vec::new()),
        }
    }

    /// Number of items, or the count itself for COUNT
    pub fn len(&self) -> usize {
        match self {
            Outcome::Matches(items) | Outcome::Extractions(items) => items.len(),
            Outcome::Count(n) => *n,
        }
    }

    /// True when nothing matched (empty list or zero count)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Applies a compiled query unit by unit
pub struct Evaluator<'q> {
    compiled: &'q CompiledQuery,
}

impl<'q> Evaluator<'q> {
    pub fn new(compiled: &'q CompiledQuery) -> Self {
        Self { compiled }
    }

    /// Whether a single unit satisfies the condition
    pub fn accepts(&self, unit: &str) -> bool {
        self.compiled.predicate.is_match(unit)
    }

    /// First capture group of the capture pattern, if the unit yields one
    pub fn extract(&self, unit: &str) -> Option<String> {
        let capture = self.compiled.capture.as_ref()?;
        capture
            .captures(unit)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Run over infallible lines
    pub fn run<I, S>(&self, lines: I) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.try_run(lines.into_iter().map(Ok::<S, Infallible>)) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }

    /// Run over fallible lines, e.g. from a reader. The first line error
    /// aborts the run and is returned unchanged.
    pub fn try_run<I, S, E>(&self, lines: I) -> Result<Outcome, E>
    where
        I: IntoIterator<Item = Result<S, E>>,
        S: AsRef<str>,
    {
        let mut outcome = Outcome::empty(&self.compiled.query.command);
        let target = self.compiled.query.target;

        for line in lines {
            let line = line?;
            let line = line.as_ref();
            match target {
                Target::Lines => self.visit(line, &mut outcome),
                Target::Words => {
                    for word in line.split_whitespace() {
                        self.visit(word, &mut outcome);
                    }
                }
            }
        }

        tracing::debug!(results = outcome.len(), "query finished");
        Ok(outcome)
    }

    fn visit(&self, unit: &str, outcome: &mut Outcome) {
        let accepted = self.accepts(unit);
        tracing::trace!(unit, accepted, "evaluated unit");
        if !accepted {
            return;
        }
        match outcome {
            Outcome::Matches(items) => items.push(unit.to_string()),
            Outcome::Count(n) => *n += 1,
            Outcome::Extractions(items) => items.extend(self.extract(unit)),
        }
    }
}
