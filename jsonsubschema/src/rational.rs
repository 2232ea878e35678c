//! Exact arithmetic on JSON numeric literals.
//!
//! Every bound and `multipleOf` literal is converted once, at the JSON
//! boundary, from its decimal text into a `BigRational`. Nothing downstream
//! touches floating point.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde_json::Number;

use crate::error::SubschemaError;

/// Converts a JSON number into the exact rational its decimal text denotes.
///
/// `0.1` becomes `1/10`, not the nearest binary double.
pub fn parse_number(number: &Number) -> Result<BigRational, SubschemaError> {
    let text = number.to_string();
    parse_decimal(&text)
        .ok_or_else(|| SubschemaError::malformed(format!("'{text}' is not a finite decimal")))
}

fn parse_decimal(text: &str) -> Option<BigRational> {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(idx) => (&text[..idx], text[idx + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    let (negative, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part
        .chars()
        .chain(frac_part.chars())
        .all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let mut numer: BigInt = format!("{int_part}{frac_part}").parse().ok()?;
    if negative {
        numer = -numer;
    }
    let scale = exponent.checked_sub(i64::try_from(frac_part.len()).ok()?)?;
    let factor = BigInt::from(10u8).pow(u32::try_from(scale.unsigned_abs()).ok()?);
    if scale >= 0 {
        Some(BigRational::from_integer(numer * factor))
    } else {
        Some(BigRational::new(numer, factor))
    }
}

/// `x mod m` into `[0, m)` for a positive rational `m`.
pub fn mod_floor(x: &BigRational, m: &BigRational) -> BigRational {
    x - m * (x / m).floor()
}

/// Least positive rational that is an integer multiple of both `a` and `b`.
///
/// For reduced positive fractions `p/q` and `r/s` this is `lcm(p, r) / gcd(q, s)`.
pub fn lcm(a: &BigRational, b: &BigRational) -> BigRational {
    BigRational::new(
        a.numer().lcm(b.numer()),
        a.denom().gcd(b.denom()),
    )
}

/// Common denominator that turns every given rational into an integer.
pub fn common_denominator<'a>(values: impl IntoIterator<Item = &'a BigRational>) -> BigInt {
    values
        .into_iter()
        .fold(BigInt::one(), |acc, v| acc.lcm(v.denom()))
}

/// Scales `value` by an integer factor known to clear its denominator.
pub fn scale_to_integer(value: &BigRational, factor: &BigInt) -> BigInt {
    (value * BigRational::from_integer(factor.clone())).to_integer()
}

/// Multiplicative inverse of `a` modulo `m` (`m > 0`), if it exists.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    if m.is_one() {
        return Some(BigInt::zero());
    }
    let (mut old_r, mut r) = (a.mod_floor(m), m.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let q = old_r.div_floor(&r);
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }
    if old_r.is_one() {
        Some(old_s.mod_floor(m))
    } else {
        None
    }
}

/// Non-negative integral rational as `u64`, if it fits.
pub fn to_count(value: &BigRational) -> Option<u64> {
    if value.is_integer() && !value.is_negative() {
        value.to_integer().to_u64()
    } else {
        None
    }
}
