//! Single-valued and two-valued types.

use crate::atom::TypeAtom;
use crate::engine::Engine;
use crate::error::SubschemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullAtom;

impl TypeAtom for NullAtom {
    const TYPE_NAME: &'static str = "null";

    fn universal() -> Self {
        NullAtom
    }

    fn intersect(&self, _other: &Self, _cx: &mut Engine) -> Result<Option<Self>, SubschemaError> {
        Ok(Some(NullAtom))
    }

    fn complement(&self, _cx: &mut Engine) -> Result<Vec<Self>, SubschemaError> {
        Ok(Vec::new())
    }

    fn is_empty(&self, _cx: &mut Engine) -> Result<bool, SubschemaError> {
        Ok(false)
    }

    fn is_subtype(&self, _other: &Self, _cx: &mut Engine) -> Result<bool, SubschemaError> {
        Ok(true)
    }
}

/// `value: None` accepts both booleans; `Some(v)` only `v` (from `enum`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanAtom {
    pub value: Option<bool>,
}

impl BooleanAtom {
    pub fn only(value: bool) -> Self {
        BooleanAtom { value: Some(value) }
    }
}

impl TypeAtom for BooleanAtom {
    const TYPE_NAME: &'static str = "boolean";

    fn universal() -> Self {
        BooleanAtom { value: None }
    }

    fn intersect(&self, other: &Self, _cx: &mut Engine) -> Result<Option<Self>, SubschemaError> {
        Ok(match (self.value, other.value) {
            (None, v) | (v, None) => Some(BooleanAtom { value: v }),
            (Some(a), Some(b)) if a == b => Some(*self),
            _ => None,
        })
    }

    fn complement(&self, _cx: &mut Engine) -> Result<Vec<Self>, SubschemaError> {
        Ok(match self.value {
            None => Vec::new(),
            Some(v) => vec![BooleanAtom::only(!v)],
        })
    }

    fn is_empty(&self, _cx: &mut Engine) -> Result<bool, SubschemaError> {
        Ok(false)
    }

    fn is_subtype(&self, other: &Self, _cx: &mut Engine) -> Result<bool, SubschemaError> {
        Ok(other.value.is_none() || self.value == other.value)
    }
}
