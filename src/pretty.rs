//! Pretty-printer for grepql queries
//!
//! Renders a [`Query`] back to canonical query text for round-trip testing
//! and for echoing what was understood.

use crate::ast::*;

/// A pretty-printer accumulating space-separated words
#[derive(Default)]
pub struct Pretty {
    output: String,
}

impl Pretty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn word(&mut self, s: &str) {
        if !self.output.is_empty() {
            self.output.push(' ');
        }
        self.output.push_str(s);
    }

    fn literal(&mut self, s: &str) {
        self.word(&quote(s));
    }

    pub fn query(&mut self, query: &Query) {
        self.word(query.command.keyword());
        match &query.command {
            Command::Find | Command::Count => self.word(&query.target.to_string()),
            Command::Extract(pattern) => {
                self.word("REGEX");
                self.literal(&pattern.node);
                self.word("FROM");
                self.word(&query.target.to_string());
            }
        }
        if let Some(condition) = &query.condition {
            self.word("THAT");
            self.condition(condition);
        }
        for modifier in query.modifiers.iter() {
            self.word(&modifier.to_string());
        }
    }

    pub fn condition(&mut self, condition: &Condition) {
        match condition {
            Condition::Atomic(atomic) => self.atomic(atomic),
            Condition::Combine { op, left, right } => {
                self.condition(left);
                self.word(&op.to_string());
                self.condition(right);
            }
            Condition::Exclude { base, excluded } => {
                self.condition(base);
                self.word("BUT NOT");
                self.condition(excluded);
            }
        }
    }

    fn atomic(&mut self, atomic: &Atomic) {
        let prefix = match atomic.op {
            AtomicOp::StartsWith => "STARTS WITH".to_string(),
            AtomicOp::EndsWith => "ENDS WITH".to_string(),
            AtomicOp::Contains => "CONTAINS".to_string(),
            AtomicOp::Regex => "REGEX".to_string(),
            AtomicOp::AtLeast(n) => format!("AT LEAST {} TIMES", n),
            AtomicOp::AtMost(n) => format!("AT MOST {} TIMES", n),
            AtomicOp::Exactly(n) => format!("EXACTLY {} TIMES", n),
            AtomicOp::Between(lo, hi) => format!("BETWEEN {} AND {} TIMES", lo, hi),
        };
        self.word(&prefix);
        self.literal(&atomic.operand);
    }
}

/// Quote a literal, escaping embedded double quotes
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

/// Pretty-print a query to canonical text
pub fn pretty_print(query: &Query) -> String {
    let mut p = Pretty::new();
    p.query(query);
    p.finish()
}

/// Pretty-print a condition tree
pub fn pretty_condition(condition: &Condition) -> String {
    let mut p = Pretty::new();
    p.condition(condition);
    p.finish()
}
