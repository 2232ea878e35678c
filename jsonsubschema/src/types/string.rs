//! Decision procedure for `string`.
//!
//! Length bounds and literal sets are decided exactly. Patterns and formats
//! are compared syntactically: an atom implies a pattern only if it carries
//! that same pattern, and a pattern-constrained atom is assumed satisfiable.
//! Both approximations can only turn a true containment into `false`.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::atom::TypeAtom;
use crate::engine::Engine;
use crate::error::SubschemaError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringAtom {
    pub min_length: u64,
    pub max_length: Option<u64>,
    pub patterns: BTreeSet<String>,
    pub formats: BTreeSet<String>,
    /// Finite set of admitted strings, from `enum`.
    pub literals: Option<BTreeSet<String>>,
    /// Strings removed from the set, from a negated `enum`.
    pub excluded: BTreeSet<String>,
}

fn char_len(s: &str) -> u64 {
    u64::try_from(s.chars().count()).unwrap_or(u64::MAX)
}

/// Patterns every string satisfies.
fn is_trivial_pattern(pattern: &str) -> bool {
    matches!(pattern, "" | ".*" | "^.*" | ".*$" | "^.*$")
}

impl StringAtom {
    pub fn literal(value: String) -> Self {
        StringAtom {
            literals: Some(BTreeSet::from([value])),
            ..Self::universal()
        }
    }

    pub fn from_keywords(map: &Map<String, Value>) -> Self {
        let mut atom = Self::universal();
        if let Some(n) = map.get("minLength").and_then(Value::as_u64) {
            atom.min_length = n;
        }
        if let Some(n) = map.get("maxLength").and_then(Value::as_u64) {
            atom.max_length = Some(n);
        }
        if let Some(Value::String(p)) = map.get("pattern")
            && !is_trivial_pattern(p)
        {
            atom.patterns.insert(p.clone());
        }
        if let Some(Value::String(f)) = map.get("format") {
            atom.formats.insert(f.clone());
        }
        atom
    }

    fn length_ok(&self, s: &str) -> bool {
        let n = char_len(s);
        n >= self.min_length && self.max_length.is_none_or(|max| n <= max)
    }

    /// Membership ignoring `format`, which is never evaluated.
    fn matches_syntax(&self, s: &str, cx: &mut Engine) -> Result<bool, SubschemaError> {
        if !self.length_ok(s) || self.excluded.contains(s) {
            return Ok(false);
        }
        if let Some(literals) = &self.literals
            && !literals.contains(s)
        {
            return Ok(false);
        }
        for pattern in &self.patterns {
            if !cx.regex(pattern)?.is_match(s) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Literals (or the lone empty string) this atom actually admits, when
    /// the atom is finite.
    fn finite_members(&self, cx: &mut Engine) -> Result<Option<Vec<String>>, SubschemaError> {
        let candidates: Vec<String> = match (&self.literals, self.max_length) {
            (Some(literals), _) => literals.iter().cloned().collect(),
            (None, Some(0)) => vec![String::new()],
            (None, _) => return Ok(None),
        };
        let mut members = Vec::new();
        for s in candidates {
            if self.matches_syntax(&s, cx)? {
                members.push(s);
            }
        }
        Ok(Some(members))
    }
}

impl TypeAtom for StringAtom {
    const TYPE_NAME: &'static str = "string";

    fn universal() -> Self {
        StringAtom {
            min_length: 0,
            max_length: None,
            patterns: BTreeSet::new(),
            formats: BTreeSet::new(),
            literals: None,
            excluded: BTreeSet::new(),
        }
    }

    fn intersect(&self, other: &Self, _cx: &mut Engine) -> Result<Option<Self>, SubschemaError> {
        let min_length = self.min_length.max(other.min_length);
        let max_length = match (self.max_length, other.max_length) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if max_length.is_some_and(|max| min_length > max) {
            return Ok(None);
        }
        let literals = match (&self.literals, &other.literals) {
            (Some(a), Some(b)) => Some(a.intersection(b).cloned().collect()),
            (Some(a), None) | (None, Some(a)) => Some(a.clone()),
            (None, None) => None,
        };
        let mut atom = StringAtom {
            min_length,
            max_length,
            patterns: self.patterns.union(&other.patterns).cloned().collect(),
            formats: self.formats.union(&other.formats).cloned().collect(),
            literals,
            excluded: self.excluded.union(&other.excluded).cloned().collect(),
        };
        if let Some(mut literals) = atom.literals.take() {
            literals.retain(|s| atom.length_ok(s) && !atom.excluded.contains(s));
            if literals.is_empty() {
                return Ok(None);
            }
            atom.literals = Some(literals);
        }
        Ok(Some(atom))
    }

    fn complement(&self, cx: &mut Engine) -> Result<Vec<Self>, SubschemaError> {
        if self.literals.is_some() {
            if !self.formats.is_empty() {
                return Err(SubschemaError::unsupported(
                    "negation of a string enum constrained by format",
                ));
            }
            let members = self.finite_members(cx)?.unwrap_or_default();
            return Ok(vec![StringAtom {
                excluded: members.into_iter().collect(),
                ..Self::universal()
            }]);
        }
        if !self.patterns.is_empty() || !self.formats.is_empty() {
            return Err(SubschemaError::unsupported(
                "negation of a string pattern or format",
            ));
        }

        let mut pieces = Vec::new();
        if self.min_length > 0 {
            pieces.push(StringAtom {
                max_length: Some(self.min_length - 1),
                ..Self::universal()
            });
        }
        if let Some(above) = self.max_length.and_then(|max| max.checked_add(1)) {
            pieces.push(StringAtom {
                min_length: above,
                ..Self::universal()
            });
        }
        for s in &self.excluded {
            pieces.push(StringAtom::literal(s.clone()));
        }
        Ok(pieces)
    }

    fn is_empty(&self, cx: &mut Engine) -> Result<bool, SubschemaError> {
        if self.max_length.is_some_and(|max| self.min_length > max) {
            return Ok(true);
        }
        Ok(self
            .finite_members(cx)?
            .is_some_and(|members| members.is_empty()))
    }

    fn is_subtype(&self, other: &Self, cx: &mut Engine) -> Result<bool, SubschemaError> {
        if let Some(members) = self.finite_members(cx)? {
            if members.is_empty() {
                return Ok(true);
            }
            for s in &members {
                if !other.matches_syntax(s, cx)? {
                    return Ok(false);
                }
            }
            return Ok(other.formats.is_subset(&self.formats));
        }
        if self.is_empty(cx)? {
            return Ok(true);
        }
        if other.literals.is_some() {
            return Ok(false);
        }

        let lengths_ok = other.min_length <= self.min_length
            && match (other.max_length, self.max_length) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(o), Some(s)) => s <= o,
            };
        if !lengths_ok
            || !other.patterns.is_subset(&self.patterns)
            || !other.formats.is_subset(&self.formats)
        {
            return Ok(false);
        }
        for s in &other.excluded {
            if self.matches_syntax(s, cx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
