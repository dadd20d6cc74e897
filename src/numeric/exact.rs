//! Exact Filtration Coordinates
//!
//! Grade coordinates and arrangement geometry are computed over exact
//! rationals. Floating point enters the pipeline in exactly two places:
//! query inputs (converted exactly, since every `f64` is a rational) and
//! the final reported barcode endpoints. Everything in between compares
//! and combines values without rounding, so degenerate intersections are
//! decided correctly instead of by epsilon.
//!
//! [`ExactValue`] is a rational with a distinguished `inf` sentinel. The
//! sentinel compares greater than every finite value and is idempotent
//! under addition with itself; it marks unbounded barcode deaths and
//! pushes that leave a slice line entirely.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// An exact scalar: a rational number or the `inf` sentinel.
///
/// The derived ordering is total, with `Infinity` above every finite
/// value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExactValue {
    Finite(BigRational),
    Infinity,
}

/// The positive-infinity sentinel.
pub const INFTY: ExactValue = ExactValue::Infinity;

/// Failure to parse a textual exact value.
#[derive(Debug, Error)]
#[error("could not parse '{0}' as an exact value")]
pub struct ParseExactError(String);

impl ExactValue {
    pub fn zero() -> Self {
        ExactValue::Finite(BigRational::zero())
    }

    pub fn one() -> Self {
        ExactValue::from_int(1)
    }

    pub fn from_int(n: i64) -> Self {
        ExactValue::Finite(BigRational::from_integer(BigInt::from(n)))
    }

    /// `n / d` as an exact value. `d` must be nonzero.
    pub fn ratio(n: i64, d: i64) -> Self {
        ExactValue::Finite(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }

    /// Exact conversion from a float. Every finite `f64` is a dyadic
    /// rational, so no precision is lost. `+inf` maps to the sentinel;
    /// NaN and `-inf` are rejected.
    pub fn from_float(f: f64) -> Option<Self> {
        if f == f64::INFINITY {
            return Some(ExactValue::Infinity);
        }
        BigRational::from_float(f).map(ExactValue::Finite)
    }

    /// Nearest-float conversion, for final barcode reporting only.
    pub fn to_f64(&self) -> f64 {
        match self {
            ExactValue::Finite(r) => r.to_f64().unwrap_or_else(|| {
                if r.is_negative() {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }),
            ExactValue::Infinity => f64::INFINITY,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, ExactValue::Finite(_))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, ExactValue::Infinity)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, ExactValue::Finite(r) if r.is_zero())
    }

    pub fn as_ratio(&self) -> Option<&BigRational> {
        match self {
            ExactValue::Finite(r) => Some(r),
            ExactValue::Infinity => None,
        }
    }

    pub fn abs(&self) -> Self {
        match self {
            ExactValue::Finite(r) => ExactValue::Finite(r.abs()),
            ExactValue::Infinity => ExactValue::Infinity,
        }
    }
}

impl Add for ExactValue {
    type Output = ExactValue;

    fn add(self, rhs: ExactValue) -> ExactValue {
        match (self, rhs) {
            (ExactValue::Finite(a), ExactValue::Finite(b)) => ExactValue::Finite(a + b),
            _ => ExactValue::Infinity,
        }
    }
}

impl Sub for ExactValue {
    type Output = ExactValue;

    fn sub(self, rhs: ExactValue) -> ExactValue {
        match (self, rhs) {
            (ExactValue::Finite(a), ExactValue::Finite(b)) => ExactValue::Finite(a - b),
            _ => ExactValue::Infinity,
        }
    }
}

impl Mul for ExactValue {
    type Output = ExactValue;

    fn mul(self, rhs: ExactValue) -> ExactValue {
        match (self, rhs) {
            (ExactValue::Finite(a), ExactValue::Finite(b)) => ExactValue::Finite(a * b),
            _ => ExactValue::Infinity,
        }
    }
}

impl Div for ExactValue {
    type Output = ExactValue;

    /// Finite division; the divisor must be a nonzero finite value.
    /// `inf / x = inf` and `x / inf = 0`.
    fn div(self, rhs: ExactValue) -> ExactValue {
        match (self, rhs) {
            (ExactValue::Infinity, _) => ExactValue::Infinity,
            (ExactValue::Finite(_), ExactValue::Infinity) => ExactValue::zero(),
            (ExactValue::Finite(a), ExactValue::Finite(b)) => ExactValue::Finite(a / b),
        }
    }
}

impl Neg for ExactValue {
    type Output = ExactValue;

    fn neg(self) -> ExactValue {
        match self {
            ExactValue::Finite(r) => ExactValue::Finite(-r),
            ExactValue::Infinity => ExactValue::Infinity,
        }
    }
}

macro_rules! ref_binop {
    ($trait:ident, $method:ident) => {
        impl<'a, 'b> $trait<&'b ExactValue> for &'a ExactValue {
            type Output = ExactValue;

            fn $method(self, rhs: &'b ExactValue) -> ExactValue {
                $trait::$method(self.clone(), rhs.clone())
            }
        }
    };
}

ref_binop!(Add, add);
ref_binop!(Sub, sub);
ref_binop!(Mul, mul);
ref_binop!(Div, div);

impl fmt::Display for ExactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExactValue::Finite(r) if r.is_integer() => write!(f, "{}", r.numer()),
            ExactValue::Finite(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            ExactValue::Infinity => write!(f, "inf"),
        }
    }
}

impl FromStr for ExactValue {
    type Err = ParseExactError;

    /// Parses `inf`, integers, exact decimals (`-0.25`), and fractions
    /// of integers (`7/2`), matching the reference tool's input grammar.
    fn from_str(s: &str) -> Result<Self, ParseExactError> {
        let s = s.trim();
        if s == "inf" || s == "infinity" {
            return Ok(ExactValue::Infinity);
        }
        if let Some((n, d)) = s.split_once('/') {
            let numer: BigInt = n.trim().parse().map_err(|_| ParseExactError(s.into()))?;
            let denom: BigInt = d.trim().parse().map_err(|_| ParseExactError(s.into()))?;
            if denom.is_zero() {
                return Err(ParseExactError(s.into()));
            }
            return Ok(ExactValue::Finite(BigRational::new(numer, denom)));
        }
        parse_decimal(s).ok_or_else(|| ParseExactError(s.into()))
    }
}

fn parse_decimal(s: &str) -> Option<ExactValue> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((a, b)) => (a, b),
        None => (body, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let digits_only = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if !digits_only(int_part) || !digits_only(frac_part) {
        return None;
    }

    let denom = num_traits::pow(BigInt::from(10), frac_part.len());
    let mut numer: BigInt = if int_part.is_empty() {
        BigInt::zero()
    } else {
        int_part.parse().ok()?
    };
    numer *= &denom;
    if !frac_part.is_empty() {
        numer += frac_part.parse::<BigInt>().ok()?;
    }
    if negative {
        numer = -numer;
    }
    Some(ExactValue::Finite(BigRational::new(numer, denom)))
}
