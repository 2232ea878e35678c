//! Decision procedure for `array`.
//!
//! Item schemas stay as handles and are compared through the engine, which
//! is where recursion (and its memo) lives. Negating an item schema produces
//! a "contains" obligation: some item must satisfy the negated schema.

use serde_json::{Map, Value};

use crate::atom::TypeAtom;
use crate::engine::Engine;
use crate::error::SubschemaError;
use crate::handle::{SchemaHandle, child_pointer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayAtom {
    pub min_items: u64,
    pub max_items: Option<u64>,
    pub unique_items: bool,
    /// Positional item schemas (`items` given as an array).
    pub prefix: Vec<SchemaHandle>,
    /// Schema for every item past the prefix.
    pub rest: SchemaHandle,
    /// Each entry must be satisfied by at least one item.
    pub contains: Vec<SchemaHandle>,
}

fn position(i: usize) -> u64 {
    u64::try_from(i).unwrap_or(u64::MAX)
}

impl ArrayAtom {
    pub fn from_keywords(map: &Map<String, Value>, doc: usize, pointer: &str) -> Self {
        let mut atom = Self::universal();
        match map.get("items") {
            Some(Value::Array(items)) => {
                let base = child_pointer(pointer, "items");
                atom.prefix = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| SchemaHandle::at(doc, child_pointer(&base, &i.to_string()), v))
                    .collect();
                if let Some(additional) = map.get("additionalItems") {
                    atom.rest = SchemaHandle::at(
                        doc,
                        child_pointer(pointer, "additionalItems"),
                        additional,
                    );
                }
            }
            Some(items) => {
                atom.rest = SchemaHandle::at(doc, child_pointer(pointer, "items"), items);
            }
            None => {}
        }
        if let Some(n) = map.get("minItems").and_then(Value::as_u64) {
            atom.min_items = n;
        }
        if let Some(n) = map.get("maxItems").and_then(Value::as_u64) {
            atom.max_items = Some(n);
        }
        atom.unique_items = map.get("uniqueItems") == Some(&Value::Bool(true));
        atom.trim();
        atom
    }

    /// Schema governing the item at index `i`.
    pub fn item(&self, i: usize) -> &SchemaHandle {
        self.prefix.get(i).unwrap_or(&self.rest)
    }

    /// Drops trailing prefix entries that say nothing beyond `rest`.
    fn trim(&mut self) {
        while self.prefix.last() == Some(&self.rest) {
            self.prefix.pop();
        }
        self.contains.sort();
        self.contains.dedup();
    }

    /// Upper bound on achievable lengths: `max_items`, further limited by the
    /// first position whose item schema is unsatisfiable.
    fn reachable_max(&self, cx: &mut Engine) -> Result<Option<u64>, SubschemaError> {
        let mut cap = self.max_items;
        for i in 0..=self.prefix.len() {
            if cap.is_some_and(|c| position(i) >= c) {
                break;
            }
            if cx.is_empty_schema(self.item(i))? {
                cap = Some(position(i));
                break;
            }
        }
        Ok(cap)
    }
}

impl TypeAtom for ArrayAtom {
    const TYPE_NAME: &'static str = "array";

    fn universal() -> Self {
        ArrayAtom {
            min_items: 0,
            max_items: None,
            unique_items: false,
            prefix: Vec::new(),
            rest: SchemaHandle::Accept,
            contains: Vec::new(),
        }
    }

    fn intersect(&self, other: &Self, _cx: &mut Engine) -> Result<Option<Self>, SubschemaError> {
        let min_items = self.min_items.max(other.min_items);
        let max_items = match (self.max_items, other.max_items) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if max_items.is_some_and(|max| min_items > max) {
            return Ok(None);
        }
        let len = self.prefix.len().max(other.prefix.len());
        let prefix: Vec<SchemaHandle> = (0..len)
            .map(|i| self.item(i).clone().all_of(other.item(i).clone()))
            .collect();
        let rest = self.rest.clone().all_of(other.rest.clone());

        // A rejected position that every array must reach kills the atom.
        let required_reject = (0..=prefix.len())
            .take_while(|&i| position(i) < min_items)
            .any(|i| *prefix.get(i).unwrap_or(&rest) == SchemaHandle::Reject);
        if required_reject {
            return Ok(None);
        }

        let mut atom = ArrayAtom {
            min_items,
            max_items,
            unique_items: self.unique_items || other.unique_items,
            prefix,
            rest,
            contains: self
                .contains
                .iter()
                .chain(&other.contains)
                .cloned()
                .collect(),
        };
        atom.trim();
        Ok(Some(atom))
    }

    fn complement(&self, _cx: &mut Engine) -> Result<Vec<Self>, SubschemaError> {
        if self.unique_items {
            return Err(SubschemaError::unsupported("negation of uniqueItems"));
        }
        if !self.rest.is_accept() && !self.prefix.is_empty() {
            return Err(SubschemaError::unsupported(
                "negation of additionalItems after a tuple prefix",
            ));
        }

        let mut pieces = Vec::new();
        if self.min_items > 0 {
            pieces.push(ArrayAtom {
                max_items: Some(self.min_items - 1),
                ..Self::universal()
            });
        }
        if let Some(above) = self.max_items.and_then(|max| max.checked_add(1)) {
            pieces.push(ArrayAtom {
                min_items: above,
                ..Self::universal()
            });
        }
        for (i, handle) in self.prefix.iter().enumerate() {
            if handle.is_accept() {
                continue;
            }
            let mut prefix = vec![SchemaHandle::Accept; i];
            prefix.push(handle.clone().negate());
            let mut piece = ArrayAtom {
                min_items: position(i) + 1,
                prefix,
                ..Self::universal()
            };
            piece.trim();
            pieces.push(piece);
        }
        if !self.rest.is_accept() {
            pieces.push(ArrayAtom {
                contains: vec![self.rest.clone().negate()],
                ..Self::universal()
            });
        }
        for obligation in &self.contains {
            pieces.push(ArrayAtom {
                rest: obligation.clone().negate(),
                ..Self::universal()
            });
        }
        Ok(pieces)
    }

    fn is_empty(&self, cx: &mut Engine) -> Result<bool, SubschemaError> {
        if self.max_items.is_some_and(|max| self.min_items > max) {
            return Ok(true);
        }
        let cap = self.reachable_max(cx)?;
        if cap.is_some_and(|c| self.min_items > c) {
            return Ok(true);
        }
        for obligation in &self.contains {
            let mut satisfiable = false;
            for i in 0..=self.prefix.len() {
                if cap.is_some_and(|c| position(i) >= c) {
                    break;
                }
                let slot = self.item(i).clone().all_of(obligation.clone());
                if !cx.is_empty_schema(&slot)? {
                    satisfiable = true;
                    break;
                }
            }
            if !satisfiable {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_subtype(&self, other: &Self, cx: &mut Engine) -> Result<bool, SubschemaError> {
        if self.is_empty(cx)? {
            return Ok(true);
        }
        let cap = self.reachable_max(cx)?;
        let lengths_ok = other.min_items <= self.min_items
            && match other.max_items {
                None => true,
                Some(max) => cap.is_some_and(|c| c <= max),
            };
        if !lengths_ok {
            return Ok(false);
        }
        if other.unique_items && !self.unique_items && !cap.is_some_and(|c| c <= 1) {
            return Ok(false);
        }

        let len = self.prefix.len().max(other.prefix.len());
        for i in 0..=len {
            if cap.is_some_and(|c| position(i) >= c) {
                break;
            }
            if !cx.is_sub(self.item(i), other.item(i))? {
                return Ok(false);
            }
        }

        for obligation in &other.contains {
            let mut discharged = false;
            for own in &self.contains {
                if cx.is_sub(own, obligation)? {
                    discharged = true;
                    break;
                }
            }
            if !discharged {
                for i in 0..=self.prefix.len() {
                    if position(i) >= self.min_items {
                        break;
                    }
                    if cx.is_sub(self.item(i), obligation)? {
                        discharged = true;
                        break;
                    }
                }
            }
            if !discharged {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
