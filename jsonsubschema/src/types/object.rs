//! Decision procedure for `object`.
//!
//! `properties` holds the *effective* schema of each declared name: the
//! declared schema already conjoined with every matching `patternProperties`
//! entry. A declared name is therefore governed by `properties` alone, an
//! undeclared name by the patterns it matches, or by `additional` if none.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::atom::TypeAtom;
use crate::engine::Engine;
use crate::error::SubschemaError;
use crate::handle::{SchemaHandle, child_pointer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectAtom {
    pub min_properties: u64,
    pub max_properties: Option<u64>,
    pub required: BTreeSet<String>,
    pub properties: BTreeMap<String, SchemaHandle>,
    pub pattern_properties: BTreeMap<String, SchemaHandle>,
    pub additional: SchemaHandle,
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

impl ObjectAtom {
    pub fn from_keywords(
        map: &Map<String, Value>,
        doc: usize,
        pointer: &str,
        cx: &mut Engine,
    ) -> Result<Self, SubschemaError> {
        if let Some(Value::Object(deps)) = map.get("dependencies")
            && !deps.is_empty()
        {
            return Err(SubschemaError::unsupported("dependencies"));
        }

        let mut atom = Self::universal();
        if let Some(Value::Object(patterns)) = map.get("patternProperties") {
            let base = child_pointer(pointer, "patternProperties");
            for (pattern, schema) in patterns {
                cx.regex(pattern)?;
                atom.pattern_properties.insert(
                    pattern.clone(),
                    SchemaHandle::at(doc, child_pointer(&base, pattern), schema),
                );
            }
        }
        if let Some(Value::Object(props)) = map.get("properties") {
            let base = child_pointer(pointer, "properties");
            for (name, schema) in props {
                let mut handle = SchemaHandle::at(doc, child_pointer(&base, name), schema);
                for (pattern, pattern_schema) in &atom.pattern_properties {
                    if cx.regex(pattern)?.is_match(name) {
                        handle = handle.all_of(pattern_schema.clone());
                    }
                }
                atom.properties.insert(name.clone(), handle);
            }
        }
        if let Some(additional) = map.get("additionalProperties") {
            atom.additional =
                SchemaHandle::at(doc, child_pointer(pointer, "additionalProperties"), additional);
        }
        if let Some(Value::Array(names)) = map.get("required") {
            atom.required = names
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect();
        }
        if let Some(n) = map.get("minProperties").and_then(Value::as_u64) {
            atom.min_properties = n;
        }
        if let Some(n) = map.get("maxProperties").and_then(Value::as_u64) {
            atom.max_properties = Some(n);
        }
        Ok(atom)
    }

    /// Effective schema for the property `name`.
    pub fn schema_for(&self, name: &str, cx: &mut Engine) -> Result<SchemaHandle, SubschemaError> {
        if let Some(handle) = self.properties.get(name) {
            return Ok(handle.clone());
        }
        let mut matched: Option<SchemaHandle> = None;
        for (pattern, handle) in &self.pattern_properties {
            if cx.regex(pattern)?.is_match(name) {
                matched = Some(match matched {
                    Some(acc) => acc.all_of(handle.clone()),
                    None => handle.clone(),
                });
            }
        }
        Ok(matched.unwrap_or_else(|| self.additional.clone()))
    }

    /// Upper bound on the number of properties: `max_properties`, further
    /// limited to the satisfiable declared names when nothing beyond them is
    /// admitted.
    fn reachable_max(&self, cx: &mut Engine) -> Result<Option<u64>, SubschemaError> {
        if !cx.is_empty_schema(&self.additional)? {
            return Ok(self.max_properties);
        }
        for handle in self.pattern_properties.values() {
            if !cx.is_empty_schema(handle)? {
                return Ok(self.max_properties);
            }
        }
        let mut available = 0u64;
        for handle in self.properties.values() {
            if !cx.is_empty_schema(handle)? {
                available += 1;
            }
        }
        Ok(Some(
            self.max_properties
                .map_or(available, |max| max.min(available)),
        ))
    }

    /// Containment for names declared on neither side: pattern schemas
    /// against pattern schemas, the rest against `additionalProperties`.
    fn undeclared_within(&self, other: &ObjectAtom, cx: &mut Engine) -> Result<bool, SubschemaError> {
        for (pattern, theirs) in &other.pattern_properties {
            if let Some(own) = self.pattern_properties.get(pattern) {
                if !cx.is_sub(own, theirs)? {
                    return Ok(false);
                }
                continue;
            }
            if !cx.is_sub(&self.additional, theirs)? {
                return Ok(false);
            }
            for own in self.pattern_properties.values() {
                if !cx.is_sub(own, theirs)? {
                    return Ok(false);
                }
            }
        }
        if !cx.is_sub(&self.additional, &other.additional)? {
            return Ok(false);
        }
        for (pattern, own) in &self.pattern_properties {
            if !other.pattern_properties.contains_key(pattern)
                && !cx.is_sub(own, &other.additional)?
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Pattern map of the conjunction, for names declared on neither side.
    fn merge_patterns(
        &self,
        other: &ObjectAtom,
    ) -> Result<BTreeMap<String, SchemaHandle>, SubschemaError> {
        let same_keys = self
            .pattern_properties
            .keys()
            .eq(other.pattern_properties.keys());
        if same_keys {
            return Ok(self
                .pattern_properties
                .iter()
                .zip(other.pattern_properties.values())
                .map(|((k, a), b)| (k.clone(), a.clone().all_of(b.clone())))
                .collect());
        }
        if other.pattern_properties.is_empty() {
            return Ok(self
                .pattern_properties
                .iter()
                .map(|(k, a)| (k.clone(), a.clone().all_of(other.additional.clone())))
                .collect());
        }
        if self.pattern_properties.is_empty() {
            return other.merge_patterns(self);
        }
        Err(SubschemaError::unsupported(
            "conjunction of differing patternProperties",
        ))
    }
}

impl TypeAtom for ObjectAtom {
    const TYPE_NAME: &'static str = "object";

    fn universal() -> Self {
        ObjectAtom {
            min_properties: 0,
            max_properties: None,
            required: BTreeSet::new(),
            properties: BTreeMap::new(),
            pattern_properties: BTreeMap::new(),
            additional: SchemaHandle::Accept,
        }
    }

    fn intersect(&self, other: &Self, cx: &mut Engine) -> Result<Option<Self>, SubschemaError> {
        let min_properties = self.min_properties.max(other.min_properties);
        let max_properties = match (self.max_properties, other.max_properties) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if max_properties.is_some_and(|max| min_properties > max) {
            return Ok(None);
        }

        let names: BTreeSet<&String> = self
            .properties
            .keys()
            .chain(other.properties.keys())
            .collect();
        let mut properties = BTreeMap::new();
        for name in names {
            let combined = self
                .schema_for(name, cx)?
                .all_of(other.schema_for(name, cx)?);
            properties.insert(name.clone(), combined);
        }

        let atom = ObjectAtom {
            min_properties,
            max_properties,
            required: self.required.union(&other.required).cloned().collect(),
            properties,
            pattern_properties: self.merge_patterns(other)?,
            additional: self.additional.clone().all_of(other.additional.clone()),
        };
        for name in &atom.required {
            if atom.schema_for(name, cx)? == SchemaHandle::Reject {
                return Ok(None);
            }
        }
        Ok(Some(atom))
    }

    fn complement(&self, _cx: &mut Engine) -> Result<Vec<Self>, SubschemaError> {
        if !self.pattern_properties.is_empty() || !self.additional.is_accept() {
            return Err(SubschemaError::unsupported(
                "negation of patternProperties or additionalProperties",
            ));
        }

        let mut pieces = Vec::new();
        if self.min_properties > 0 {
            pieces.push(ObjectAtom {
                max_properties: Some(self.min_properties - 1),
                ..Self::universal()
            });
        }
        if let Some(above) = self.max_properties.and_then(|max| max.checked_add(1)) {
            pieces.push(ObjectAtom {
                min_properties: above,
                ..Self::universal()
            });
        }
        // A required name may be missing.
        for name in &self.required {
            pieces.push(ObjectAtom {
                properties: BTreeMap::from([(name.clone(), SchemaHandle::Reject)]),
                ..Self::universal()
            });
        }
        // A declared name may be present with a value outside its schema.
        for (name, handle) in &self.properties {
            if handle.is_accept() {
                continue;
            }
            pieces.push(ObjectAtom {
                required: BTreeSet::from([name.clone()]),
                properties: BTreeMap::from([(name.clone(), handle.clone().negate())]),
                ..Self::universal()
            });
        }
        Ok(pieces)
    }

    fn is_empty(&self, cx: &mut Engine) -> Result<bool, SubschemaError> {
        if self
            .max_properties
            .is_some_and(|max| self.min_properties > max || count(self.required.len()) > max)
        {
            return Ok(true);
        }
        for name in &self.required {
            let handle = self.schema_for(name, cx)?;
            if cx.is_empty_schema(&handle)? {
                return Ok(true);
            }
        }
        if self.min_properties > count(self.required.len())
            && self
                .reachable_max(cx)?
                .is_some_and(|max| self.min_properties > max)
        {
            return Ok(true);
        }
        Ok(false)
    }

    fn is_subtype(&self, other: &Self, cx: &mut Engine) -> Result<bool, SubschemaError> {
        if self.is_empty(cx)? {
            return Ok(true);
        }
        let own_min = self.min_properties.max(count(self.required.len()));
        if other.min_properties > own_min {
            return Ok(false);
        }
        let own_max = self.reachable_max(cx)?;
        if let Some(max) = other.max_properties
            && own_max.is_none_or(|own| own > max)
        {
            return Ok(false);
        }
        if !other.required.is_subset(&self.required) {
            return Ok(false);
        }
        // Only the empty object is left; no property schema applies to it.
        if own_max == Some(0) {
            return Ok(true);
        }

        let names: BTreeSet<&String> = self
            .properties
            .keys()
            .chain(other.properties.keys())
            .collect();
        for name in names {
            let own = self.schema_for(name, cx)?;
            let theirs = other.schema_for(name, cx)?;
            if !cx.is_sub(&own, &theirs)? {
                return Ok(false);
            }
        }

        self.undeclared_within(other, cx)
    }
}
