//! The contract every per-type decision procedure implements, and the
//! atom-in-union containment test built on top of it.

use std::fmt;

use crate::engine::Engine;
use crate::error::SubschemaError;

/// A conjunctive constraint set over exactly one JSON primitive type.
pub trait TypeAtom: Clone + PartialEq + fmt::Debug + Sized {
    const TYPE_NAME: &'static str;

    /// The atom accepting every value of its type.
    fn universal() -> Self;

    /// Conjunction of two atoms. `None` when the result is empty by
    /// construction; `Some` does not promise non-emptiness.
    fn intersect(&self, other: &Self, cx: &mut Engine) -> Result<Option<Self>, SubschemaError>;

    /// Atoms whose union is exactly the complement of `self` within its type.
    fn complement(&self, cx: &mut Engine) -> Result<Vec<Self>, SubschemaError>;

    fn is_empty(&self, cx: &mut Engine) -> Result<bool, SubschemaError>;

    /// Sound containment: `true` only if every value of `self` is in `other`.
    fn is_subtype(&self, other: &Self, cx: &mut Engine) -> Result<bool, SubschemaError>;
}

/// Whether `atom` lies inside the union of `members`.
///
/// Tries single-member containment first, then subtracts members one at a
/// time and checks that nothing but empty atoms remains. A member whose
/// complement cannot be represented only takes part through single-member
/// containment; if a remainder then escapes, the answer is unknown and is
/// reported as `UnsupportedConstruct`.
pub fn atom_in_union<A: TypeAtom>(
    atom: &A,
    members: &[A],
    cx: &mut Engine,
) -> Result<bool, SubschemaError> {
    if atom.is_empty(cx)? {
        return Ok(true);
    }
    for member in members {
        if atom.is_subtype(member, cx)? {
            return Ok(true);
        }
    }
    if members.len() < 2 {
        return Ok(false);
    }

    let mut rest = vec![atom.clone()];
    let mut skipped = false;
    for member in members {
        let pieces = match member.complement(cx) {
            Ok(pieces) => pieces,
            Err(e) if e.is_unsupported() => {
                tracing::trace!("{} member not subtractable: {}", A::TYPE_NAME, e);
                skipped = true;
                continue;
            }
            Err(e) => return Err(e),
        };
        let (next, partial) = subtract(rest, &pieces, cx)?;
        rest = next;
        skipped |= partial;
        if rest.is_empty() {
            return Ok(true);
        }
        if rest.len() > cx.config().max_atoms {
            return Err(SubschemaError::unsupported(format!(
                "{} union difference exceeds {} atoms",
                A::TYPE_NAME,
                cx.config().max_atoms
            )));
        }
    }

    for remainder in &rest {
        let mut inside = false;
        for member in members {
            if remainder.is_subtype(member, cx)? {
                inside = true;
                break;
            }
        }
        if !inside {
            tracing::trace!("{} remainder escapes union: {:?}", A::TYPE_NAME, remainder);
            if skipped {
                return Err(SubschemaError::unsupported(format!(
                    "{} union containment needs a complement that cannot be represented",
                    A::TYPE_NAME
                )));
            }
            return Ok(false);
        }
    }
    Ok(true)
}

/// Intersects every remaining atom with the complement pieces of one member.
/// The flag is set when some remainder had to be kept whole because an
/// intersection could not be represented.
fn subtract<A: TypeAtom>(
    rest: Vec<A>,
    pieces: &[A],
    cx: &mut Engine,
) -> Result<(Vec<A>, bool), SubschemaError> {
    let mut next = Vec::new();
    let mut partial = false;
    for remainder in rest {
        let mut split = Vec::new();
        let mut whole = false;
        for piece in pieces {
            match remainder.intersect(piece, cx) {
                Ok(Some(part)) => {
                    if !part.is_empty(cx)? {
                        split.push(part);
                    }
                }
                Ok(None) => {}
                Err(e) if e.is_unsupported() => {
                    whole = true;
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        if whole {
            partial = true;
            next.push(remainder);
        } else {
            next.extend(split);
        }
    }
    Ok((next, partial))
}
