//! Exact numbers for symbolic computation.
//!
//! This crate provides [`Numeric`], the number type consumed by the canonical
//! normal-form engine. A [`Numeric`] is always one of:
//!
//! - an arbitrary-precision [`Integer`],
//! - an arbitrary-precision [`Rational`] that is **not** an integer (a
//!   rational with denominator 1 is stored as an [`Integer`] instead),
//! - an arbitrary-precision [`Float`] with [`PRECISION`] bits.
//!
//! Integers and rationals are exact; floats are carried through arithmetic
//! unchanged, so any operation involving a float produces a float. This crate
//! **must never** produce non-normal [`Float`]s (such as `NaN` or
//! `Infinity`)! Operations that would do so report inexactness instead (see
//! [`Numeric::checked_pow`]). Report any bugs that cause this to happen.
//!
//! The interesting operation here is [`Numeric::checked_pow`], the exact
//! exponentiation primitive: it either produces an exact numeric result, or
//! returns `None` to signal that the power is not expressible as a number in
//! this tower (for example `2^(1/2)`), in which case the caller keeps the
//! power in symbolic form.

pub mod consts;

use rug::{ops::Pow, Assign, Complete, Float, Integer, Rational};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

/// The number of bits of precision used for [`Float`] values.
pub const PRECISION: u32 = 1 << 9;

/// Creates an [`Integer`]-valued [`Numeric`] with the given value.
pub fn int<T>(n: T) -> Numeric
where
    Integer: From<T>,
{
    Numeric::Integer(Integer::from(n))
}

/// Creates a [`Numeric`] with the value `n / d`.
///
/// The result is reduced to lowest terms and collapses to an integer when the
/// reduced denominator is 1.
pub fn rational<T, U>(n: T, d: U) -> Numeric
where
    Integer: From<T> + From<U>,
{
    Numeric::from(Rational::from((Integer::from(n), Integer::from(d))))
}

/// Creates a [`Float`]-valued [`Numeric`] with the given value and
/// [`PRECISION`] bits.
pub fn float<T>(n: T) -> Numeric
where
    Float: Assign<T>,
{
    Numeric::Float(Float::with_val(PRECISION, n))
}

/// Computes the binomial coefficient `C(n, k)` exactly.
///
/// The value is built up multiplicatively, one factor at a time; every
/// intermediate division is exact.
pub fn binomial(n: u32, k: u32) -> Integer {
    if k > n {
        return Integer::new();
    }

    let k = k.min(n - k);
    let mut result = Integer::from(1);
    for i in 0..k {
        result *= n - i;
        result /= i + 1;
    }
    result
}

/// An exact number: an integer, a non-integral rational, or a float.
///
/// See the [module-level documentation](self) for the variant invariants.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Numeric {
    /// An arbitrary-precision integer.
    Integer(Integer),

    /// An arbitrary-precision rational in lowest terms with denominator > 1.
    Rational(Rational),

    /// An arbitrary-precision float with [`PRECISION`] bits.
    Float(Float),
}

impl Numeric {
    /// The number 0.
    pub fn zero() -> Self {
        Self::Integer(Integer::new())
    }

    /// The number 1.
    pub fn one() -> Self {
        Self::Integer(Integer::from(1))
    }

    /// Returns true if the number is 0 (of any variant).
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Integer(i) => i.is_zero(),
            Self::Rational(r) => r.cmp0() == Ordering::Equal,
            Self::Float(f) => f.is_zero(),
        }
    }

    /// Returns true if the number is 1 (of any variant).
    pub fn is_one(&self) -> bool {
        match self {
            Self::Integer(i) => *i == 1,
            Self::Rational(_) => false,
            Self::Float(f) => *f == 1,
        }
    }

    /// Returns true if the number is -1 (of any variant).
    pub fn is_minus_one(&self) -> bool {
        match self {
            Self::Integer(i) => *i == -1,
            Self::Rational(_) => false,
            Self::Float(f) => *f == -1,
        }
    }

    /// Returns true if the number is an exact integer.
    ///
    /// Integral floats such as `2.0` are *not* exact integers.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }

    /// Returns true if the number is exact (an integer or a rational).
    pub fn is_rational(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Rational(_))
    }

    /// Returns true if the number is real. The tower has no complex arm, so
    /// this is true for every value.
    pub fn is_real(&self) -> bool {
        true
    }

    /// Returns true if the number is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.sign() == Ordering::Less
    }

    /// Returns true if the number is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.sign() == Ordering::Greater
    }

    /// Returns the sign of the number as an [`Ordering`] against zero.
    pub fn sign(&self) -> Ordering {
        match self {
            Self::Integer(i) => i.cmp0(),
            Self::Rational(r) => r.cmp0(),
            // floats are never NaN, so the comparison always succeeds
            Self::Float(f) => f.cmp0().unwrap(),
        }
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Numeric {
        if self.is_negative() {
            -self
        } else {
            self.clone()
        }
    }

    /// If the number is an [`Integer`], returns a reference to it.
    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Self::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// If the number is an integer that fits in a `u32`, returns it.
    pub fn to_u32(&self) -> Option<u32> {
        self.as_integer().and_then(Integer::to_u32)
    }

    /// Splits the number into an integer quotient `q` (rounded toward
    /// negative infinity) and a fractional remainder `r` with `0 <= r < 1`,
    /// such that `self == q + r`.
    ///
    /// Returns `None` for floats, which have no exact decomposition.
    pub fn floor_split(&self) -> Option<(Numeric, Numeric)> {
        match self {
            Self::Integer(i) => Some((Self::Integer(i.clone()), Numeric::zero())),
            Self::Rational(r) => {
                let (q, rem) = r.numer().div_rem_floor_ref(r.denom()).complete();
                let frac = Numeric::from(Rational::from((rem, r.denom().clone())));
                Some((Self::Integer(q), frac))
            },
            Self::Float(_) => None,
        }
    }

    /// Computes `self ^ exponent` exactly.
    ///
    /// Returns `None` if the result is not expressible in this tower: both
    /// operands are rational but the power is irrational (`2^(1/2)`), the
    /// result would not be real (a negative base under an even root), or the
    /// exponent magnitude exceeds the supported range. If either operand is a
    /// float, the power is computed in float arithmetic and always returned
    /// unless it would be non-normal.
    pub fn checked_pow(&self, exponent: &Numeric) -> Option<Numeric> {
        if matches!(self, Self::Float(_)) || matches!(exponent, Self::Float(_)) {
            let b = self.to_float();
            let e = exponent.to_float();
            if b.is_sign_negative() && !e.is_integer() {
                // the real power does not exist
                return None;
            }
            let r = Float::with_val(PRECISION, (&b).pow(&e));
            return r.is_finite().then(|| Self::Float(r));
        }

        match exponent {
            Self::Integer(e) => self.pow_int(e),
            Self::Rational(e) => self.pow_rational(e),
            Self::Float(_) => unreachable!("float exponents are handled above"),
        }
    }

    /// `self ^ e` for an integer exponent. `None` if `|e|` does not fit in a
    /// `u32`, or when inverting zero.
    fn pow_int(&self, e: &Integer) -> Option<Numeric> {
        let mag = Integer::from(e.abs_ref()).to_u32()?;
        let invert = e.cmp0() == Ordering::Less;

        let (num, den) = match self {
            Self::Integer(i) => (i.pow(mag).complete(), Integer::from(1)),
            Self::Rational(r) => (r.numer().pow(mag).complete(), r.denom().pow(mag).complete()),
            Self::Float(_) => unreachable!("float bases are handled by checked_pow"),
        };

        if invert {
            if num.is_zero() {
                return None;
            }
            Some(Numeric::from(Rational::from((den, num))))
        } else if den == 1 {
            Some(Self::Integer(num))
        } else {
            Some(Numeric::from(Rational::from((num, den))))
        }
    }

    /// `self ^ (n/m)` for a non-integral rational exponent. The result exists
    /// exactly iff `self^n` has an exact `m`-th root.
    fn pow_rational(&self, e: &Rational) -> Option<Numeric> {
        let m = e.denom().to_u32()?;

        let (num, den) = match self.pow_int(e.numer())? {
            Self::Integer(i) => (i, Integer::from(1)),
            Self::Rational(r) => r.into_numer_denom(),
            Self::Float(_) => unreachable!("pow_int never produces a float"),
        };

        let num_root = exact_root(&num, m)?;
        let den_root = exact_root(&den, m)?;
        if den_root == 1 {
            Some(Self::Integer(num_root))
        } else {
            Some(Numeric::from(Rational::from((num_root, den_root))))
        }
    }

    /// Converts the number to a [`Float`] with [`PRECISION`] bits.
    pub fn to_float(&self) -> Float {
        match self {
            Self::Integer(i) => Float::with_val(PRECISION, i),
            Self::Rational(r) => Float::with_val(PRECISION, r),
            Self::Float(f) => f.clone(),
        }
    }

    /// Compares the numeric values, ignoring the variant.
    fn value_cmp(&self, other: &Numeric) -> Ordering {
        use Numeric::*;

        // floats are never NaN, so every partial comparison below succeeds
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Integer(a), Rational(b)) => a.partial_cmp(b).unwrap(),
            (Rational(a), Integer(b)) => a.partial_cmp(b).unwrap(),
            (Rational(a), Rational(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap(),
            (Float(a), Integer(b)) => a.partial_cmp(b).unwrap(),
            (Integer(a), Float(b)) => b.partial_cmp(a).unwrap().reverse(),
            (Float(a), Rational(b)) => a.partial_cmp(b).unwrap(),
            (Rational(a), Float(b)) => b.partial_cmp(a).unwrap().reverse(),
        }
    }

    /// Tie-break rank so that equal-valued numbers of different variants
    /// (such as `2` and `2.0`) still have a total order.
    fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) => 0,
            Self::Rational(_) => 1,
            Self::Float(_) => 2,
        }
    }
}

/// Returns the exact `m`-th root of `x`, or `None` if `x` is not a perfect
/// `m`-th power (or is negative with `m` even).
fn exact_root(x: &Integer, m: u32) -> Option<Integer> {
    if x.cmp0() == Ordering::Less && m % 2 == 0 {
        return None;
    }
    let root = x.clone().root(m);
    if (&root).pow(m).complete() == *x {
        Some(root)
    } else {
        None
    }
}

impl From<Integer> for Numeric {
    fn from(i: Integer) -> Self {
        Self::Integer(i)
    }
}

impl From<Rational> for Numeric {
    fn from(r: Rational) -> Self {
        if *r.denom() == 1 {
            Self::Integer(r.into_numer_denom().0)
        } else {
            Self::Rational(r)
        }
    }
}

impl From<Float> for Numeric {
    fn from(f: Float) -> Self {
        Self::Float(f)
    }
}

impl From<i64> for Numeric {
    fn from(n: i64) -> Self {
        Self::Integer(Integer::from(n))
    }
}

impl From<i32> for Numeric {
    fn from(n: i32) -> Self {
        Self::Integer(Integer::from(n))
    }
}

impl From<u32> for Numeric {
    fn from(n: u32) -> Self {
        Self::Integer(Integer::from(n))
    }
}

impl Add for &Numeric {
    type Output = Numeric;

    fn add(self, rhs: Self) -> Numeric {
        use Numeric::*;

        match (self, rhs) {
            (Integer(a), Integer(b)) => Integer((a + b).complete()),
            (Integer(a), Rational(b)) | (Rational(b), Integer(a)) => {
                Numeric::from((b + a).complete())
            },
            (Rational(a), Rational(b)) => Numeric::from((a + b).complete()),
            (Float(a), Float(b)) => Float(rug::Float::with_val(PRECISION, a + b)),
            (Float(a), Integer(b)) | (Integer(b), Float(a)) => {
                Float(rug::Float::with_val(PRECISION, a + b))
            },
            (Float(a), Rational(b)) | (Rational(b), Float(a)) => {
                Float(rug::Float::with_val(PRECISION, a + b))
            },
        }
    }
}

impl Mul for &Numeric {
    type Output = Numeric;

    fn mul(self, rhs: Self) -> Numeric {
        use Numeric::*;

        match (self, rhs) {
            (Integer(a), Integer(b)) => Integer((a * b).complete()),
            (Integer(a), Rational(b)) | (Rational(b), Integer(a)) => {
                Numeric::from((b * a).complete())
            },
            (Rational(a), Rational(b)) => Numeric::from((a * b).complete()),
            (Float(a), Float(b)) => Float(rug::Float::with_val(PRECISION, a * b)),
            (Float(a), Integer(b)) | (Integer(b), Float(a)) => {
                Float(rug::Float::with_val(PRECISION, a * b))
            },
            (Float(a), Rational(b)) | (Rational(b), Float(a)) => {
                Float(rug::Float::with_val(PRECISION, a * b))
            },
        }
    }
}

impl Neg for &Numeric {
    type Output = Numeric;

    fn neg(self) -> Numeric {
        match self {
            Numeric::Integer(i) => Numeric::Integer((-i).complete()),
            Numeric::Rational(r) => Numeric::Rational((-r).complete()),
            Numeric::Float(f) => Numeric::Float(Float::with_val(PRECISION, -f)),
        }
    }
}

impl Sub for &Numeric {
    type Output = Numeric;

    fn sub(self, rhs: Self) -> Numeric {
        self + &(-rhs)
    }
}

impl Add for Numeric {
    type Output = Numeric;

    fn add(self, rhs: Self) -> Numeric {
        &self + &rhs
    }
}

impl Mul for Numeric {
    type Output = Numeric;

    fn mul(self, rhs: Self) -> Numeric {
        &self * &rhs
    }
}

impl Neg for Numeric {
    type Output = Numeric;

    fn neg(self) -> Numeric {
        -&self
    }
}

impl Sub for Numeric {
    type Output = Numeric;

    fn sub(self, rhs: Self) -> Numeric {
        &self - &rhs
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Numeric {}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order: by numeric value first, then by variant rank, so that
/// equal-valued numbers of different variants (`2` vs `2.0`) compare unequal
/// but still consistently.
impl Ord for Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value_cmp(other)
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

/// [`Hash`] is implemented manually to allow hashing [`Numeric::Float`]s.
/// Floats are hashed through their sign, exponent and significand, which
/// agrees with equality because all floats carry [`PRECISION`] bits.
impl Hash for Numeric {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Integer(i) => {
                0u8.hash(state);
                i.hash(state);
            },
            Self::Rational(r) => {
                1u8.hash(state);
                r.numer().hash(state);
                r.denom().hash(state);
            },
            Self::Float(f) => {
                2u8.hash(state);
                f.is_sign_negative().hash(state);
                f.get_exp().hash(state);
                if let Some(significand) = f.get_significand() {
                    significand.hash(state);
                }
            },
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Rational(r) => write!(f, "{}", r),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn rational_collapses_to_integer() {
        assert_eq!(rational(4, 2), int(2));
        assert_eq!(rational(-6, 3), int(-2));
        assert!(rational(1, 2).is_rational());
        assert!(!rational(1, 2).is_integer());
    }

    #[test]
    fn arithmetic_is_exact() {
        assert_eq!(&rational(1, 3) + &rational(1, 6), rational(1, 2));
        assert_eq!(&rational(2, 3) * &rational(3, 2), int(1));
        assert_eq!(-&rational(1, 2), rational(-1, 2));
        assert_eq!(&int(5) - &int(7), int(-2));
    }

    #[test]
    fn float_contagion() {
        let sum = &int(1) + &float(0.5);
        assert!(matches!(sum, Numeric::Float(_)));
        assert_eq!(sum, float(1.5));
    }

    #[test]
    fn ordering_by_value_then_variant() {
        assert!(int(1) < int(2));
        assert!(rational(1, 2) < int(1));
        assert!(int(-3) < rational(-1, 2));
        // equal value, different variants: integer sorts first
        assert!(int(2) < float(2.0));
        assert_ne!(int(2), float(2.0));
    }

    #[test]
    fn exact_integer_powers() {
        assert_eq!(int(2).checked_pow(&int(10)), Some(int(1024)));
        assert_eq!(int(2).checked_pow(&int(-2)), Some(rational(1, 4)));
        assert_eq!(rational(2, 3).checked_pow(&int(-1)), Some(rational(3, 2)));
        assert_eq!(int(-3).checked_pow(&int(3)), Some(int(-27)));
    }

    #[test]
    fn exact_rational_powers() {
        // 8^(2/3) = 4
        assert_eq!(int(8).checked_pow(&rational(2, 3)), Some(int(4)));
        // (-8)^(1/3) = -2
        assert_eq!(int(-8).checked_pow(&rational(1, 3)), Some(int(-2)));
        // (4/9)^(1/2) = 2/3
        assert_eq!(rational(4, 9).checked_pow(&rational(1, 2)), Some(rational(2, 3)));
    }

    #[test]
    fn irrational_powers_are_signalled() {
        assert_eq!(int(2).checked_pow(&rational(1, 2)), None);
        // no real result for an even root of a negative number
        assert_eq!(int(-4).checked_pow(&rational(1, 2)), None);
    }

    #[test]
    fn float_powers_always_produce_floats() {
        let r = float(2.0).checked_pow(&rational(1, 2)).unwrap();
        assert!(matches!(r, Numeric::Float(_)));
        // a float power that would be complex is signalled instead
        assert_eq!(float(-2.0).checked_pow(&rational(1, 2)), None);
    }

    #[test]
    fn floor_split_rounds_toward_negative_infinity() {
        assert_eq!(rational(7, 3).floor_split(), Some((int(2), rational(1, 3))));
        assert_eq!(rational(-1, 2).floor_split(), Some((int(-1), rational(1, 2))));
        assert_eq!(int(5).floor_split(), Some((int(5), int(0))));
        assert_eq!(float(1.5).floor_split(), None);
    }

    #[test]
    fn binomial_coefficients() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(10, 0), 1);
        assert_eq!(binomial(10, 10), 1);
        assert_eq!(binomial(3, 5), 0);
        assert_eq!(binomial(50, 25), "126410606437752".parse::<Integer>().unwrap());
    }
}
