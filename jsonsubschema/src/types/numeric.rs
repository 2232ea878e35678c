//! Decision procedure for `integer` and `number`.
//!
//! Both types share one atom: an interval, an optional lattice
//! `{ residue + k * modulus }` the value must sit on, and lattices it must
//! avoid. `integer` is the lattice `(1, 0)`, `multipleOf: m` is `(m, 0)`, so
//! integer is a refinement of number rather than a separate slot, and
//! `{type: number, multipleOf: 1}` is the same atom as `{type: integer}`.

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde_json::{Map, Value};

use crate::atom::TypeAtom;
use crate::engine::Engine;
use crate::error::SubschemaError;
use crate::rational::{
    common_denominator, lcm, mod_floor, mod_inverse, parse_number, scale_to_integer, to_count,
};
use num_integer::Integer;

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// A real interval. `None` bounds are infinite; infinite sides are never open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    pub lower: Option<BigRational>,
    pub lower_open: bool,
    pub upper: Option<BigRational>,
    pub upper_open: bool,
}

impl Interval {
    pub fn universal() -> Self {
        Interval {
            lower: None,
            lower_open: false,
            upper: None,
            upper_open: false,
        }
    }

    pub fn point(value: BigRational) -> Self {
        Interval {
            lower: Some(value.clone()),
            lower_open: false,
            upper: Some(value),
            upper_open: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(l), Some(u)) => l > u || (l == u && (self.lower_open || self.upper_open)),
            _ => false,
        }
    }

    /// The only member of a closed degenerate interval.
    pub fn single_point(&self) -> Option<&BigRational> {
        match (&self.lower, &self.upper) {
            (Some(l), Some(u)) if l == u && !self.lower_open && !self.upper_open => Some(l),
            _ => None,
        }
    }

    pub fn contains(&self, x: &BigRational) -> bool {
        let above = match &self.lower {
            None => true,
            Some(l) if self.lower_open => x > l,
            Some(l) => x >= l,
        };
        let below = match &self.upper {
            None => true,
            Some(u) if self.upper_open => x < u,
            Some(u) => x <= u,
        };
        above && below
    }

    #[must_use]
    pub fn intersect(&self, other: &Interval) -> Interval {
        let (lower, lower_open) = match (&self.lower, &other.lower) {
            (None, _) => (other.lower.clone(), other.lower_open),
            (_, None) => (self.lower.clone(), self.lower_open),
            (Some(a), Some(b)) if a > b => (self.lower.clone(), self.lower_open),
            (Some(a), Some(b)) if b > a => (other.lower.clone(), other.lower_open),
            (Some(_), Some(_)) => (self.lower.clone(), self.lower_open || other.lower_open),
        };
        let (upper, upper_open) = match (&self.upper, &other.upper) {
            (None, _) => (other.upper.clone(), other.upper_open),
            (_, None) => (self.upper.clone(), self.upper_open),
            (Some(a), Some(b)) if a < b => (self.upper.clone(), self.upper_open),
            (Some(a), Some(b)) if b < a => (other.upper.clone(), other.upper_open),
            (Some(_), Some(_)) => (self.upper.clone(), self.upper_open || other.upper_open),
        };
        Interval {
            lower,
            lower_open,
            upper,
            upper_open,
        }
    }

    /// Bound-by-bound containment. A closed bound is never inside an open
    /// bound at the same value.
    pub fn is_subset_of(&self, other: &Interval) -> bool {
        if self.is_empty() {
            return true;
        }
        let lower_ok = match (&other.lower, &self.lower) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(o), Some(s)) => o < s || (o == s && (!other.lower_open || self.lower_open)),
        };
        let upper_ok = match (&other.upper, &self.upper) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(o), Some(s)) => o > s || (o == s && (!other.upper_open || self.upper_open)),
        };
        lower_ok && upper_ok
    }

    /// At most two intervals covering the reals outside `self`.
    pub fn complement(&self) -> Vec<Interval> {
        if self.is_empty() {
            return vec![Interval::universal()];
        }
        let mut pieces = Vec::new();
        if let Some(l) = &self.lower {
            pieces.push(Interval {
                lower: None,
                lower_open: false,
                upper: Some(l.clone()),
                upper_open: !self.lower_open,
            });
        }
        if let Some(u) = &self.upper {
            pieces.push(Interval {
                lower: Some(u.clone()),
                lower_open: !self.upper_open,
                upper: None,
                upper_open: false,
            });
        }
        pieces
    }
}

// ---------------------------------------------------------------------------
// Modulus
// ---------------------------------------------------------------------------

/// The lattice `{ residue + k * modulus | k integer }`, `modulus > 0`,
/// `residue` in `[0, modulus)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Modulus {
    pub modulus: BigRational,
    pub residue: BigRational,
}

impl Modulus {
    pub fn new(modulus: BigRational, residue: BigRational) -> Self {
        let residue = mod_floor(&residue, &modulus);
        Modulus { modulus, residue }
    }

    pub fn multiple_of(modulus: BigRational) -> Self {
        Modulus {
            modulus,
            residue: BigRational::zero(),
        }
    }

    pub fn integer() -> Self {
        Self::multiple_of(BigRational::one())
    }

    pub fn contains(&self, x: &BigRational) -> bool {
        ((x - &self.residue) / &self.modulus).is_integer()
    }

    /// Every lattice point is an integer.
    pub fn is_integral(&self) -> bool {
        self.modulus.is_integer() && self.residue.is_integer()
    }

    /// `self` is a sub-lattice of `other`: `other.modulus` divides
    /// `self.modulus` and the residues agree modulo `other.modulus`.
    pub fn refines(&self, other: &Modulus) -> bool {
        (&self.modulus / &other.modulus).is_integer() && other.contains(&self.residue)
    }

    /// Chinese-remainder merge. `None` when no value satisfies both.
    pub fn intersect(&self, other: &Modulus) -> Option<Modulus> {
        let scale = common_denominator([
            &self.modulus,
            &self.residue,
            &other.modulus,
            &other.residue,
        ]);
        let m1 = scale_to_integer(&self.modulus, &scale);
        let r1 = scale_to_integer(&self.residue, &scale);
        let m2 = scale_to_integer(&other.modulus, &scale);
        let r2 = scale_to_integer(&other.residue, &scale);

        let g = m1.gcd(&m2);
        let diff = &r2 - &r1;
        if !diff.mod_floor(&g).is_zero() {
            return None;
        }
        let m2_reduced = &m2 / &g;
        let inverse = mod_inverse(&(&m1 / &g), &m2_reduced)?;
        let t = ((&diff / &g) * inverse).mod_floor(&m2_reduced);
        let combined = &m1 / &g * &m2;
        let x = (&r1 + &m1 * t).mod_floor(&combined);
        Some(Modulus::new(
            BigRational::new(combined, scale.clone()),
            BigRational::new(x, scale),
        ))
    }
}

// ---------------------------------------------------------------------------
// NumericAtom
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericAtom {
    pub interval: Interval,
    pub modulus: Option<Modulus>,
    /// Lattices removed from the set. Only produced by negation.
    pub excluded: Vec<Modulus>,
}

impl NumericAtom {
    pub fn integer() -> Self {
        NumericAtom {
            interval: Interval::universal(),
            modulus: Some(Modulus::integer()),
            excluded: Vec::new(),
        }
    }

    pub fn point(value: BigRational) -> Self {
        NumericAtom {
            interval: Interval::point(value),
            modulus: None,
            excluded: Vec::new(),
        }
    }

    /// Whether the atom only admits integers.
    pub fn is_integer(&self) -> bool {
        self.modulus.as_ref().is_some_and(Modulus::is_integral)
            || self
                .interval
                .single_point()
                .is_some_and(BigRational::is_integer)
    }

    /// Reads `minimum`, `maximum`, the draft-04 boolean exclusivity flags and
    /// `multipleOf`.
    pub fn from_keywords(map: &Map<String, Value>) -> Result<Self, SubschemaError> {
        let mut interval = Interval::universal();
        if let Some(Value::Number(n)) = map.get("minimum") {
            interval.lower = Some(parse_number(n)?);
            interval.lower_open = map.get("exclusiveMinimum") == Some(&Value::Bool(true));
        }
        if let Some(Value::Number(n)) = map.get("maximum") {
            interval.upper = Some(parse_number(n)?);
            interval.upper_open = map.get("exclusiveMaximum") == Some(&Value::Bool(true));
        }
        let modulus = match map.get("multipleOf") {
            Some(Value::Number(n)) => {
                let m = parse_number(n)?;
                if !m.is_positive() {
                    return Err(SubschemaError::malformed(format!(
                        "multipleOf must be greater than 0, got {n}"
                    )));
                }
                Some(Modulus::multiple_of(m))
            }
            _ => None,
        };
        Ok(NumericAtom {
            interval,
            modulus,
            excluded: Vec::new(),
        })
    }

    /// Builds an atom, dropping excluded lattices that cannot meet the
    /// modulus. `None` if the interval is empty or the modulus lattice is
    /// wholly excluded.
    fn assemble(
        interval: Interval,
        modulus: Option<Modulus>,
        mut excluded: Vec<Modulus>,
    ) -> Option<Self> {
        if interval.is_empty() {
            return None;
        }
        if let Some(m) = &modulus {
            excluded.retain(|e| m.intersect(e).is_some());
            if excluded.iter().any(|e| m.refines(e)) {
                return None;
            }
        }
        excluded.sort();
        excluded.dedup();
        Some(NumericAtom {
            interval,
            modulus,
            excluded,
        })
    }

    /// Scans one full period of `lattice` inside the interval for a point
    /// that no excluded lattice covers.
    fn has_lattice_point(&self, lattice: &Modulus, max_classes: u64) -> Result<bool, SubschemaError> {
        // On an unbounded side every residue class recurs, so one excluded
        // lattice leaves a point unless it swallows the whole lattice.
        if self.interval.lower.is_none() || self.interval.upper.is_none() {
            match self.excluded.as_slice() {
                [] => return Ok(true),
                [only] => return Ok(!lattice.refines(only)),
                _ => {}
            }
        }
        let period = self
            .excluded
            .iter()
            .fold(lattice.modulus.clone(), |acc, e| lcm(&acc, &e.modulus));
        let classes = to_count(&(&period / &lattice.modulus)).unwrap_or(u64::MAX);
        if classes > max_classes {
            return Err(SubschemaError::unsupported(format!(
                "numeric witness search needs {classes} residue classes (limit {max_classes})"
            )));
        }

        let step = &lattice.modulus;
        let (mut x, ascending) = match (&self.interval.lower, &self.interval.upper) {
            (Some(l), _) => {
                let k = ((l - &lattice.residue) / step).ceil();
                let mut x = &lattice.residue + k * step;
                if self.interval.lower_open && &x == l {
                    x += step;
                }
                (x, true)
            }
            (None, Some(u)) => {
                let k = ((u - &lattice.residue) / step).floor();
                let mut x = &lattice.residue + k * step;
                if self.interval.upper_open && &x == u {
                    x -= step;
                }
                (x, false)
            }
            (None, None) => (lattice.residue.clone(), true),
        };

        for _ in 0..classes {
            if !self.interval.contains(&x) {
                return Ok(false);
            }
            if !self.excluded.iter().any(|e| e.contains(&x)) {
                return Ok(true);
            }
            if ascending {
                x += step;
            } else {
                x -= step;
            }
        }
        Ok(false)
    }

    /// The bound and divisibility rules: interval containment, and for a
    /// divisibility constraint on `other`, a modulus on `self` that it divides
    /// with a matching residue.
    fn is_within(&self, other: &NumericAtom) -> bool {
        if !self.interval.is_subset_of(&other.interval) {
            return false;
        }
        let lattice_ok = match (&self.modulus, &other.modulus) {
            (_, None) => true,
            (_, Some(b)) if *b == Modulus::integer() => self.is_integer(),
            (Some(a), Some(b)) => a.refines(b),
            (None, Some(b)) => self
                .interval
                .single_point()
                .is_some_and(|p| b.contains(p)),
        };
        let excluded_ok = other.excluded.iter().all(|e| {
            self.excluded.contains(e)
                || self
                    .modulus
                    .as_ref()
                    .is_some_and(|m| m.intersect(e).is_none())
        });
        lattice_ok && excluded_ok
    }
}

impl TypeAtom for NumericAtom {
    const TYPE_NAME: &'static str = "number";

    fn universal() -> Self {
        NumericAtom {
            interval: Interval::universal(),
            modulus: None,
            excluded: Vec::new(),
        }
    }

    fn intersect(&self, other: &Self, _cx: &mut Engine) -> Result<Option<Self>, SubschemaError> {
        let interval = self.interval.intersect(&other.interval);
        let modulus = match (&self.modulus, &other.modulus) {
            (Some(a), Some(b)) => match a.intersect(b) {
                Some(m) => Some(m),
                None => return Ok(None),
            },
            (Some(m), None) | (None, Some(m)) => Some(m.clone()),
            (None, None) => None,
        };
        let excluded = self
            .excluded
            .iter()
            .chain(&other.excluded)
            .cloned()
            .collect();
        Ok(Self::assemble(interval, modulus, excluded))
    }

    fn complement(&self, _cx: &mut Engine) -> Result<Vec<Self>, SubschemaError> {
        let mut pieces: Vec<NumericAtom> = self
            .interval
            .complement()
            .into_iter()
            .map(|interval| NumericAtom {
                interval,
                modulus: None,
                excluded: Vec::new(),
            })
            .collect();
        if let Some(m) = &self.modulus {
            pieces.push(NumericAtom {
                interval: self.interval.clone(),
                modulus: None,
                excluded: vec![m.clone()],
            });
        }
        for e in &self.excluded {
            let lattice = match &self.modulus {
                Some(m) => m.intersect(e),
                None => Some(e.clone()),
            };
            if let Some(lattice) = lattice {
                pieces.push(NumericAtom {
                    interval: self.interval.clone(),
                    modulus: Some(lattice),
                    excluded: Vec::new(),
                });
            }
        }
        Ok(pieces)
    }

    fn is_empty(&self, cx: &mut Engine) -> Result<bool, SubschemaError> {
        if self.interval.is_empty() {
            return Ok(true);
        }
        match &self.modulus {
            None => Ok(self
                .interval
                .single_point()
                .is_some_and(|p| self.excluded.iter().any(|e| e.contains(p)))),
            Some(lattice) => Ok(!self.has_lattice_point(lattice, cx.config().max_residue_classes)?),
        }
    }

    fn is_subtype(&self, other: &Self, cx: &mut Engine) -> Result<bool, SubschemaError> {
        if self.is_empty(cx)? || self.is_within(other) {
            return Ok(true);
        }
        // Exact fallback: nothing of `self` survives in the complement of `other`.
        for piece in other.complement(cx)? {
            if let Some(part) = self.intersect(&piece, cx)?
                && !part.is_empty(cx)?
            {
                tracing::trace!("numeric witness outside container in {:?}", part);
                return Ok(false);
            }
        }
        Ok(true)
    }
}
