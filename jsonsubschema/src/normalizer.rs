//! Raw schema to normal form.
//!
//! A schema object is read in two passes. `build` turns its keywords and
//! combinators into a `CompositeNode` tree whose leaves are already
//! type-partitioned unions; `fold` collapses the tree into one `SchemaUnion`.
//! Sub-schemas under array and object keywords are not visited here: the
//! atoms keep handles to them.

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use crate::atom::TypeAtom;
use crate::engine::Engine;
use crate::error::SubschemaError;
use crate::handle::{SchemaHandle, child_pointer};
use crate::rational::parse_number;
use crate::types::{ArrayAtom, BooleanAtom, NullAtom, NumericAtom, ObjectAtom, StringAtom};
use crate::union::SchemaUnion;

#[derive(Debug, Clone)]
pub enum CompositeNode {
    Leaf(SchemaUnion),
    And(Vec<CompositeNode>),
    Or(Vec<CompositeNode>),
    OneOf(Vec<CompositeNode>),
    Not(Box<CompositeNode>),
}

/// Normal form of `value`, found at `pointer` in document `doc`.
pub fn normalize_value(
    cx: &mut Engine,
    doc: usize,
    pointer: &str,
    value: &Value,
) -> Result<SchemaUnion, SubschemaError> {
    let node = build(cx, doc, pointer, value)?;
    fold(node, cx)
}

pub fn build(
    cx: &mut Engine,
    doc: usize,
    pointer: &str,
    value: &Value,
) -> Result<CompositeNode, SubschemaError> {
    let map = match value {
        Value::Bool(true) => return Ok(CompositeNode::Leaf(SchemaUnion::universal())),
        Value::Bool(false) => return Ok(CompositeNode::Leaf(SchemaUnion::empty())),
        Value::Object(map) => map,
        other => {
            return Err(SubschemaError::malformed(format!(
                "schema at '#{pointer}' must be an object, got {other}"
            )));
        }
    };

    if let Some(reference) = map.get("$ref") {
        return resolve_ref(cx, doc, reference).map(CompositeNode::Leaf);
    }

    let mut parts = vec![CompositeNode::Leaf(leaf(cx, doc, pointer, map)?)];
    if let Some(members) = map.get("allOf") {
        parts.push(CompositeNode::And(children(cx, doc, pointer, "allOf", members)?));
    }
    if let Some(members) = map.get("anyOf") {
        parts.push(CompositeNode::Or(children(cx, doc, pointer, "anyOf", members)?));
    }
    if let Some(members) = map.get("oneOf") {
        parts.push(CompositeNode::OneOf(children(cx, doc, pointer, "oneOf", members)?));
    }
    if let Some(negated) = map.get("not") {
        let child = build(cx, doc, &child_pointer(pointer, "not"), negated)?;
        parts.push(CompositeNode::Not(Box::new(child)));
    }

    if parts.len() == 1 {
        Ok(parts.remove(0))
    } else {
        Ok(CompositeNode::And(parts))
    }
}

fn children(
    cx: &mut Engine,
    doc: usize,
    pointer: &str,
    keyword: &str,
    members: &Value,
) -> Result<Vec<CompositeNode>, SubschemaError> {
    let Value::Array(members) = members else {
        return Err(SubschemaError::malformed(format!(
            "'{keyword}' at '#{pointer}' must be an array"
        )));
    };
    let base = child_pointer(pointer, keyword);
    members
        .iter()
        .enumerate()
        .map(|(i, member)| build(cx, doc, &child_pointer(&base, &i.to_string()), member))
        .collect()
}

/// Local references only. Sibling keywords of `$ref` are ignored.
fn resolve_ref(cx: &mut Engine, doc: usize, reference: &Value) -> Result<SchemaUnion, SubschemaError> {
    let Some(reference) = reference.as_str() else {
        return Err(SubschemaError::malformed("'$ref' must be a string"));
    };
    let Some(fragment) = reference.strip_prefix('#') else {
        return Err(SubschemaError::unsupported(format!(
            "remote reference '{reference}'"
        )));
    };
    // The fragment is URI-encoded; the pointer underneath is not.
    let pointer = percent_decode_str(fragment).decode_utf8().map_err(|e| {
        SubschemaError::malformed(format!("reference '{reference}' is not UTF-8: {e}"))
    })?;
    let document = cx.document(doc)?;
    let target = document.pointer(&pointer).ok_or_else(|| {
        SubschemaError::malformed(format!("unresolvable reference '{reference}'"))
    })?;
    let handle = SchemaHandle::at(doc, pointer.into_owned(), target);
    tracing::debug!("resolving {} to {}", reference, handle);
    let union = cx.normalize(&handle)?;
    Ok((*union).clone())
}

/// The keyword constraints of one schema object, without combinators.
fn leaf(
    cx: &mut Engine,
    doc: usize,
    pointer: &str,
    map: &Map<String, Value>,
) -> Result<SchemaUnion, SubschemaError> {
    let keywords = SchemaUnion {
        null: vec![NullAtom::universal()],
        boolean: vec![BooleanAtom::universal()],
        number: vec![NumericAtom::from_keywords(map)?],
        string: vec![StringAtom::from_keywords(map)],
        array: vec![ArrayAtom::from_keywords(map, doc, pointer)],
        object: vec![ObjectAtom::from_keywords(map, doc, pointer, cx)?],
    };
    let mut union = match map.get("type") {
        Some(types) => type_union(types, cx.config().max_atoms)?,
        None => SchemaUnion::universal(),
    };
    union = union.intersect(&keywords, cx)?;
    if let Some(values) = map.get("enum") {
        union = union.intersect(&enum_union(values)?, cx)?;
    }
    Ok(union)
}

fn type_union(types: &Value, max_atoms: usize) -> Result<SchemaUnion, SubschemaError> {
    let names: Vec<&str> = match types {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        other => {
            return Err(SubschemaError::malformed(format!(
                "'type' must be a string or an array, got {other}"
            )));
        }
    };
    let mut union = SchemaUnion::empty();
    for name in names {
        let single = SchemaUnion::of_type(name)
            .ok_or_else(|| SubschemaError::malformed(format!("unknown type '{name}'")))?;
        // `number` absorbs `integer` here.
        union = union.union(single, max_atoms)?;
    }
    Ok(union)
}

fn enum_union(values: &Value) -> Result<SchemaUnion, SubschemaError> {
    let Value::Array(values) = values else {
        return Err(SubschemaError::malformed("'enum' must be an array"));
    };
    let mut union = SchemaUnion::empty();
    let mut strings = std::collections::BTreeSet::new();
    for value in values {
        match value {
            Value::Null => union.null = vec![NullAtom],
            Value::Bool(b) => {
                let atom = BooleanAtom::only(*b);
                if !union.boolean.contains(&atom) {
                    union.boolean.push(atom);
                }
            }
            Value::Number(n) => {
                let atom = NumericAtom::point(parse_number(n)?);
                if !union.number.contains(&atom) {
                    union.number.push(atom);
                }
            }
            Value::String(s) => {
                strings.insert(s.clone());
            }
            Value::Array(_) | Value::Object(_) => {
                return Err(SubschemaError::unsupported(
                    "enum members that are arrays or objects",
                ));
            }
        }
    }
    if !strings.is_empty() {
        union.string.push(StringAtom {
            literals: Some(strings),
            ..StringAtom::universal()
        });
    }
    Ok(union)
}

/// Collapses a composite tree into its normal form.
pub fn fold(node: CompositeNode, cx: &mut Engine) -> Result<SchemaUnion, SubschemaError> {
    match node {
        CompositeNode::Leaf(union) => Ok(union),
        CompositeNode::And(children) => {
            let mut acc = SchemaUnion::universal();
            for child in children {
                let union = fold(child, cx)?;
                acc = acc.intersect(&union, cx)?;
            }
            Ok(acc)
        }
        CompositeNode::Or(children) => {
            let mut acc = SchemaUnion::empty();
            for child in children {
                let union = fold(child, cx)?;
                acc = acc.union(union, cx.config().max_atoms)?;
            }
            Ok(acc)
        }
        CompositeNode::OneOf(children) => {
            let branches = children
                .into_iter()
                .map(|child| fold(child, cx))
                .collect::<Result<Vec<_>, _>>()?;
            exclusive_union(branches, cx)
        }
        CompositeNode::Not(child) => fold(*child, cx)?.complement(cx),
    }
}

/// `oneOf`: exactly one branch holds. Pairwise disjoint branches reduce to a
/// plain union; otherwise each branch is conjoined with the negation of all
/// the others.
fn exclusive_union(branches: Vec<SchemaUnion>, cx: &mut Engine) -> Result<SchemaUnion, SubschemaError> {
    let max_atoms = cx.config().max_atoms;
    let mut disjoint = true;
    'pairs: for (i, a) in branches.iter().enumerate() {
        for b in &branches[i + 1..] {
            if !a.intersect(b, cx)?.is_trivially_empty() {
                disjoint = false;
                break 'pairs;
            }
        }
    }
    if disjoint {
        return branches
            .into_iter()
            .try_fold(SchemaUnion::empty(), |acc, branch| acc.union(branch, max_atoms));
    }

    tracing::debug!("oneOf branches overlap, expanding exclusive form");
    let negated = branches
        .iter()
        .map(|branch| branch.complement(cx))
        .collect::<Result<Vec<_>, _>>()?;
    let mut result = SchemaUnion::empty();
    for (i, branch) in branches.iter().enumerate() {
        let mut only = branch.clone();
        for (j, other) in negated.iter().enumerate() {
            if i != j {
                only = only.intersect(other, cx)?;
            }
        }
        result = result.union(only, max_atoms)?;
    }
    Ok(result)
}
