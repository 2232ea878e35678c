//! The subsumption engine.
//!
//! One `Engine` serves one check. It owns the registered documents, the
//! normalization cache, the compiled patterns and the memo of decided
//! `(lhs, rhs)` pairs. Recursion through array items and object properties
//! re-enters `is_sub`, which is where cycles are cut.

use regex::Regex;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::atom::{TypeAtom, atom_in_union};
use crate::config::CheckerConfig;
use crate::error::SubschemaError;
use crate::handle::SchemaHandle;
use crate::normalizer;
use crate::union::SchemaUnion;

type HandlePair = (SchemaHandle, SchemaHandle);

pub struct Engine {
    config: CheckerConfig,
    docs: Vec<Rc<Value>>,
    normalized: HashMap<SchemaHandle, Rc<SchemaUnion>>,
    /// Handles whose normalization is on the stack.
    normalizing: Vec<SchemaHandle>,
    memo: HashMap<HandlePair, bool>,
    in_progress: HashSet<HandlePair>,
    regexes: HashMap<String, Regex>,
    depth: usize,
    /// Number of times an in-progress pair was assumed to hold.
    assumptions: u64,
}

impl Engine {
    pub fn new(config: &CheckerConfig) -> Self {
        Engine {
            config: config.clone(),
            docs: Vec::new(),
            normalized: HashMap::new(),
            normalizing: Vec::new(),
            memo: HashMap::new(),
            in_progress: HashSet::new(),
            regexes: HashMap::new(),
            depth: 0,
            assumptions: 0,
        }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Registers a root document and returns the handle of its root schema.
    pub fn add_document(&mut self, document: Value) -> SchemaHandle {
        let doc = self.docs.len();
        let handle = SchemaHandle::at(doc, String::new(), &document);
        self.docs.push(Rc::new(document));
        handle
    }

    pub fn document(&self, doc: usize) -> Result<Rc<Value>, SubschemaError> {
        self.docs
            .get(doc)
            .cloned()
            .ok_or_else(|| SubschemaError::malformed(format!("unknown document {doc}")))
    }

    /// Normal form of the schema behind `handle`, cached per engine.
    pub fn normalize(&mut self, handle: &SchemaHandle) -> Result<Rc<SchemaUnion>, SubschemaError> {
        if let Some(union) = self.normalized.get(handle) {
            return Ok(Rc::clone(union));
        }
        if self.normalizing.contains(handle) {
            return Err(SubschemaError::unsupported(format!(
                "reference cycle through {handle} is not guarded by an array or object"
            )));
        }

        self.normalizing.push(handle.clone());
        let result = self.normalize_uncached(handle);
        self.normalizing.pop();

        let union = Rc::new(result?);
        tracing::trace!("normalized {}: {:?}", handle, union);
        self.normalized.insert(handle.clone(), Rc::clone(&union));
        Ok(union)
    }

    fn normalize_uncached(&mut self, handle: &SchemaHandle) -> Result<SchemaUnion, SubschemaError> {
        match handle {
            SchemaHandle::Accept => Ok(SchemaUnion::universal()),
            SchemaHandle::Reject => Ok(SchemaUnion::empty()),
            SchemaHandle::Node { doc, pointer } => {
                let document = self.document(*doc)?;
                let value = document.pointer(pointer).ok_or_else(|| {
                    SubschemaError::malformed(format!("no schema at '#{pointer}'"))
                })?;
                normalizer::normalize_value(self, *doc, pointer, value)
            }
            SchemaHandle::AllOf(members) => {
                let mut acc = SchemaUnion::universal();
                for member in members {
                    let union = self.normalize(member)?;
                    acc = acc.intersect(&union, self)?;
                }
                Ok(acc)
            }
            SchemaHandle::Not(inner) => {
                let union = self.normalize(inner)?;
                union.complement(self)
            }
        }
    }

    /// Whether every value accepted by `lhs` is accepted by `rhs`.
    pub fn is_sub(&mut self, lhs: &SchemaHandle, rhs: &SchemaHandle) -> Result<bool, SubschemaError> {
        if lhs == rhs || rhs.is_accept() || *lhs == SchemaHandle::Reject {
            return Ok(true);
        }
        let key = (lhs.clone(), rhs.clone());
        if let Some(&known) = self.memo.get(&key) {
            return Ok(known);
        }
        if self.in_progress.contains(&key) {
            tracing::debug!("cycle on ({}, {}), assuming containment", lhs, rhs);
            self.assumptions += 1;
            return Ok(true);
        }
        if self.depth >= self.config.max_depth {
            return Err(SubschemaError::unsupported(format!(
                "recursion deeper than {} levels",
                self.config.max_depth
            )));
        }

        let assumptions_before = self.assumptions;
        self.in_progress.insert(key.clone());
        self.depth += 1;
        let result = self.decide(lhs, rhs);
        self.depth -= 1;
        self.in_progress.remove(&key);

        let verdict = result?;
        // A `true` that leaned on an assumption is only valid inside the
        // cycle that made it.
        if !verdict || self.assumptions == assumptions_before {
            self.memo.insert(key, verdict);
        }
        tracing::trace!("{} <: {} = {}", lhs, rhs, verdict);
        Ok(verdict)
    }

    /// Whether `handle` accepts no value at all.
    pub fn is_empty_schema(&mut self, handle: &SchemaHandle) -> Result<bool, SubschemaError> {
        self.is_sub(handle, &SchemaHandle::Reject)
    }

    fn decide(&mut self, lhs: &SchemaHandle, rhs: &SchemaHandle) -> Result<bool, SubschemaError> {
        let a = self.normalize(lhs)?;
        let b = self.normalize(rhs)?;
        self.union_contained(&a, &b)
    }

    fn union_contained(&mut self, a: &SchemaUnion, b: &SchemaUnion) -> Result<bool, SubschemaError> {
        Ok(self.slot_contained(&a.null, &b.null)?
            && self.slot_contained(&a.boolean, &b.boolean)?
            && self.slot_contained(&a.number, &b.number)?
            && self.slot_contained(&a.string, &b.string)?
            && self.slot_contained(&a.array, &b.array)?
            && self.slot_contained(&a.object, &b.object)?)
    }

    fn slot_contained<A: TypeAtom>(&mut self, atoms: &[A], members: &[A]) -> Result<bool, SubschemaError> {
        for atom in atoms {
            if !atom_in_union(atom, members, self)? {
                tracing::trace!("{} atom not contained: {:?}", A::TYPE_NAME, atom);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Compiled `pattern`, cached. Patterns the `regex` crate cannot compile
    /// are unsupported rather than malformed: draft 04 uses ECMA 262 syntax.
    pub fn regex(&mut self, pattern: &str) -> Result<&Regex, SubschemaError> {
        match self.regexes.entry(pattern.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let compiled = Regex::new(pattern).map_err(|e| {
                    SubschemaError::unsupported(format!("pattern '{pattern}': {e}"))
                })?;
                Ok(entry.insert(compiled))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> Engine {
        Engine::new(&CheckerConfig::default())
    }

    #[test]
    fn test_quick_answers() {
        let mut cx = engine();
        let h = cx.add_document(json!({"type": "string"}));
        assert!(cx.is_sub(&h, &h).unwrap());
        assert!(cx.is_sub(&h, &SchemaHandle::Accept).unwrap());
        assert!(cx.is_sub(&SchemaHandle::Reject, &h).unwrap());
        assert!(!cx.is_sub(&SchemaHandle::Accept, &h).unwrap());
    }

    #[test]
    fn test_self_requiring_schema_is_empty() {
        let mut cx = engine();
        let h = cx.add_document(json!({
            "type": "object",
            "required": ["next"],
            "properties": {"next": {"$ref": "#"}}
        }));
        assert!(cx.is_empty_schema(&h).unwrap());
    }

    #[test]
    fn test_optional_recursion_is_inhabited() {
        let mut cx = engine();
        let h = cx.add_document(json!({
            "type": "object",
            "properties": {"next": {"$ref": "#"}}
        }));
        assert!(!cx.is_empty_schema(&h).unwrap());
    }

    #[test]
    fn test_unguarded_reference_cycle_is_unsupported() {
        let mut cx = engine();
        let h = cx.add_document(json!({"allOf": [{"$ref": "#"}]}));
        let err = cx.is_empty_schema(&h).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_depth_bound() {
        let config = CheckerConfig {
            max_depth: 1,
            ..CheckerConfig::default()
        };
        let mut cx = Engine::new(&config);
        let a = cx.add_document(json!({"type": "array", "items": {"type": "integer"}}));
        let b = cx.add_document(json!({"type": "array", "items": {"type": "number"}}));
        assert!(cx.is_sub(&a, &b).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_bad_pattern_is_unsupported() {
        let mut cx = engine();
        assert!(cx.regex("(?<=a)b").unwrap_err().is_unsupported());
        assert!(cx.regex("^a+$").unwrap().is_match("aaa"));
    }
}
