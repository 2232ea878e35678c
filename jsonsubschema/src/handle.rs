//! Lazy references to sub-schemas.
//!
//! Array and object atoms never hold normalized children. They hold a
//! `SchemaHandle` naming where the child lives (or how it was combined), and
//! the engine normalizes it on demand. Handles double as the structural
//! identity of the memo table, which is what lets recursive schemas terminate.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaHandle {
    /// Accepts every value (`true`, `{}`).
    Accept,
    /// Accepts nothing (`false`).
    Reject,
    /// A schema object inside a registered document, addressed by JSON pointer.
    Node { doc: usize, pointer: String },
    /// Conjunction. Always flattened, sorted, deduplicated, at least two members.
    AllOf(Vec<SchemaHandle>),
    /// Negation. Never wraps `Accept`, `Reject` or another `Not`.
    Not(Box<SchemaHandle>),
}

impl SchemaHandle {
    /// Handle for the value found at `pointer` in document `doc`.
    ///
    /// Boolean and empty-object schemas collapse to `Accept` / `Reject` so
    /// that equal sub-schemas share a memo key.
    pub fn at(doc: usize, pointer: String, value: &Value) -> Self {
        match value {
            Value::Bool(true) => SchemaHandle::Accept,
            Value::Bool(false) => SchemaHandle::Reject,
            Value::Object(map) if map.is_empty() => SchemaHandle::Accept,
            _ => SchemaHandle::Node { doc, pointer },
        }
    }

    /// Conjunction of two handles with the usual simplifications.
    #[must_use]
    pub fn all_of(self, other: SchemaHandle) -> SchemaHandle {
        let mut members = Vec::new();
        for handle in [self, other] {
            match handle {
                SchemaHandle::Accept => {}
                SchemaHandle::Reject => return SchemaHandle::Reject,
                SchemaHandle::AllOf(inner) => members.extend(inner),
                other => members.push(other),
            }
        }
        members.sort();
        members.dedup();
        match members.len() {
            0 => SchemaHandle::Accept,
            1 => members.pop().unwrap_or(SchemaHandle::Accept),
            _ => SchemaHandle::AllOf(members),
        }
    }

    #[must_use]
    pub fn negate(self) -> SchemaHandle {
        match self {
            SchemaHandle::Accept => SchemaHandle::Reject,
            SchemaHandle::Reject => SchemaHandle::Accept,
            SchemaHandle::Not(inner) => *inner,
            other => SchemaHandle::Not(Box::new(other)),
        }
    }

    #[must_use]
    pub fn is_accept(&self) -> bool {
        matches!(self, SchemaHandle::Accept)
    }
}

/// Appends one reference token to a JSON pointer, escaping `~` and `/`.
pub fn child_pointer(base: &str, token: &str) -> String {
    let escaped = token.replace('~', "~0").replace('/', "~1");
    format!("{base}/{escaped}")
}

impl fmt::Display for SchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaHandle::Accept => write!(f, "true"),
            SchemaHandle::Reject => write!(f, "false"),
            SchemaHandle::Node { doc, pointer } => write!(f, "doc{doc}#{pointer}"),
            SchemaHandle::AllOf(members) => {
                write!(f, "allOf(")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{m}")?;
                }
                write!(f, ")")
            }
            SchemaHandle::Not(inner) => write!(f, "not({inner})"),
        }
    }
}
