//! The normal form: a union of atoms per JSON type.

use crate::atom::TypeAtom;
use crate::engine::Engine;
use crate::error::SubschemaError;
use crate::types::{ArrayAtom, BooleanAtom, NullAtom, NumericAtom, ObjectAtom, StringAtom};

/// A schema in disjunctive normal form, partitioned by type.
///
/// A value is accepted when it belongs to some atom of its type's slot. An
/// empty slot rejects the type entirely. `integer` and `number` share the
/// `number` slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaUnion {
    pub null: Vec<NullAtom>,
    pub boolean: Vec<BooleanAtom>,
    pub number: Vec<NumericAtom>,
    pub string: Vec<StringAtom>,
    pub array: Vec<ArrayAtom>,
    pub object: Vec<ObjectAtom>,
}

impl SchemaUnion {
    /// Rejects everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Accepts everything.
    pub fn universal() -> Self {
        SchemaUnion {
            null: vec![NullAtom::universal()],
            boolean: vec![BooleanAtom::universal()],
            number: vec![NumericAtom::universal()],
            string: vec![StringAtom::universal()],
            array: vec![ArrayAtom::universal()],
            object: vec![ObjectAtom::universal()],
        }
    }

    /// All values of one draft-04 type name. `None` for an unknown name.
    pub fn of_type(name: &str) -> Option<Self> {
        let mut union = Self::empty();
        match name {
            "null" => union.null.push(NullAtom::universal()),
            "boolean" => union.boolean.push(BooleanAtom::universal()),
            "integer" => union.number.push(NumericAtom::integer()),
            "number" => union.number.push(NumericAtom::universal()),
            "string" => union.string.push(StringAtom::universal()),
            "array" => union.array.push(ArrayAtom::universal()),
            "object" => union.object.push(ObjectAtom::universal()),
            _ => return None,
        }
        Some(union)
    }

    /// Empty without looking inside any atom.
    pub fn is_trivially_empty(&self) -> bool {
        self.null.is_empty()
            && self.boolean.is_empty()
            && self.number.is_empty()
            && self.string.is_empty()
            && self.array.is_empty()
            && self.object.is_empty()
    }

    /// Disjunction. Fails when a slot grows past `max_atoms`.
    pub fn union(self, other: SchemaUnion, max_atoms: usize) -> Result<Self, SubschemaError> {
        Ok(SchemaUnion {
            null: bounded(concat(self.null, other.null), max_atoms)?,
            boolean: bounded(concat(self.boolean, other.boolean), max_atoms)?,
            number: bounded(concat(self.number, other.number), max_atoms)?,
            string: bounded(concat(self.string, other.string), max_atoms)?,
            array: bounded(concat(self.array, other.array), max_atoms)?,
            object: bounded(concat(self.object, other.object), max_atoms)?,
        })
    }

    /// Conjunction: per slot, the pairwise intersections of both sides.
    pub fn intersect(&self, other: &SchemaUnion, cx: &mut Engine) -> Result<Self, SubschemaError> {
        Ok(SchemaUnion {
            null: cross(&self.null, &other.null, cx)?,
            boolean: cross(&self.boolean, &other.boolean, cx)?,
            number: cross(&self.number, &other.number, cx)?,
            string: cross(&self.string, &other.string, cx)?,
            array: cross(&self.array, &other.array, cx)?,
            object: cross(&self.object, &other.object, cx)?,
        })
    }

    /// Negation, slot by slot. The complement of `a1 | ... | an` within a
    /// type is the intersection of the complements of each `ai`.
    pub fn complement(&self, cx: &mut Engine) -> Result<Self, SubschemaError> {
        Ok(SchemaUnion {
            null: complement_slot(&self.null, cx)?,
            boolean: complement_slot(&self.boolean, cx)?,
            number: complement_slot(&self.number, cx)?,
            string: complement_slot(&self.string, cx)?,
            array: complement_slot(&self.array, cx)?,
            object: complement_slot(&self.object, cx)?,
        })
    }
}

fn bounded<A: TypeAtom>(atoms: Vec<A>, max_atoms: usize) -> Result<Vec<A>, SubschemaError> {
    if atoms.len() > max_atoms {
        return Err(SubschemaError::unsupported(format!(
            "{} slot exceeds {max_atoms} atoms",
            A::TYPE_NAME
        )));
    }
    Ok(atoms)
}

/// Appends `right` to `left`, skipping duplicates. A universal atom absorbs
/// the whole slot.
fn concat<A: TypeAtom>(mut left: Vec<A>, right: Vec<A>) -> Vec<A> {
    let universal = A::universal();
    if left.contains(&universal) || right.contains(&universal) {
        return vec![universal];
    }
    for atom in right {
        if !left.contains(&atom) {
            left.push(atom);
        }
    }
    left
}

fn cross<A: TypeAtom>(left: &[A], right: &[A], cx: &mut Engine) -> Result<Vec<A>, SubschemaError> {
    let mut out: Vec<A> = Vec::new();
    for a in left {
        for b in right {
            if let Some(atom) = a.intersect(b, cx)?
                && !out.contains(&atom)
            {
                out.push(atom);
            }
        }
    }
    bounded(out, cx.config().max_atoms)
}

fn complement_slot<A: TypeAtom>(atoms: &[A], cx: &mut Engine) -> Result<Vec<A>, SubschemaError> {
    let mut acc = vec![A::universal()];
    for atom in atoms {
        let pieces = atom.complement(cx)?;
        acc = cross(&acc, &pieces, cx)?;
        if acc.is_empty() {
            break;
        }
    }
    Ok(acc)
}
