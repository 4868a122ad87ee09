//! The expression handle.
//!
//! An [`Expr`] is an immutable, reference-counted, structurally shared node
//! in an expression tree. Cloning is cheap (a pointer copy), and a node is
//! never mutated once it is wrapped in a handle: construction builds fresh
//! storage, normalizes it, and only then publishes it. That discipline makes
//! sharing a node from many parents safe, and turns "is this the same
//! object" ([`Expr::ptr_eq`]) into a free equality fast path.
//!
//! Every constructor normalizes, so every [`Expr`] you can observe is in
//! canonical form: sums and products are flat, sorted and duplicate-free
//! (see [`PairSeq`]), and powers have had the rewrite rules applied (see
//! [`crate::power`]). Because of this, normalizing is a pure function of the
//! operands' mathematical value: however a sum or product is associated and
//! ordered at the call site, the same canonical object comes back.
//!
//! ```
//! use cas_canon::{Expr, Symbol};
//!
//! let x = Expr::from(Symbol::new("x"));
//! let y = Expr::from(Symbol::new("y"));
//!
//! let a = (x.clone() + y.clone()) + x.clone();
//! let b = Expr::sum(vec![y, Expr::int(2) * x]);
//! assert_eq!(a, b);
//! assert_eq!(a.to_string(), "2*x + y");
//! ```

use crate::error::EvalError;
use crate::ncprod;
use crate::order;
use crate::pairseq::{PairSeq, SeqKind};
use crate::power::{self, Power};
use crate::symbol::Symbol;
use cas_num::Numeric;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

pub(crate) const PREC_ADD: u8 = 1;
pub(crate) const PREC_MUL: u8 = 2;
pub(crate) const PREC_POW: u8 = 3;
pub(crate) const PREC_ATOM: u8 = 4;

/// An immutable, shared handle to a canonical expression node.
///
/// See the [module-level documentation](self).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr(Rc<ExprKind>);

/// The node behind an [`Expr`] handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    /// An exact number.
    Num(Numeric),

    /// A symbolic variable.
    Sym(Symbol),

    /// A canonical sum or product of term pairs.
    Seq(PairSeq),

    /// An expression raised to a power.
    Pow(Power),

    /// A non-commutative product; factors keep their order.
    NcProd(Vec<Expr>),
}

impl Expr {
    pub(crate) fn from_kind(kind: ExprKind) -> Self {
        Self(Rc::new(kind))
    }

    /// The node this handle points at.
    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// Returns true if both handles point at the same node. Two handles that
    /// are not pointer-equal may still be structurally equal.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Creates a numeric expression.
    pub fn num(n: impl Into<Numeric>) -> Self {
        Self::from_kind(ExprKind::Num(n.into()))
    }

    /// Creates an integer expression.
    pub fn int(n: i64) -> Self {
        Self::num(Numeric::from(n))
    }

    /// Creates a rational expression with the value `n / d`.
    pub fn rational(n: i64, d: i64) -> Self {
        Self::num(cas_num::rational(n, d))
    }

    /// Normalizes a sum of the given addends. An empty list yields 0.
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        PairSeq::normalize(SeqKind::Add, terms.into_iter().collect())
    }

    /// Normalizes a product of the given factors. An empty list yields 1.
    pub fn product(factors: impl IntoIterator<Item = Expr>) -> Self {
        PairSeq::normalize(SeqKind::Mul, factors.into_iter().collect())
    }

    /// Evaluates `basis ^ exponent` into canonical form.
    ///
    /// # Errors
    ///
    /// [`EvalError::DivisionByZero`] when zero is raised to a negative real
    /// numeric exponent, and [`EvalError::RecursionLimitExceeded`] when the
    /// rewrite recursion exceeds [`crate::MAX_RECURSION_DEPTH`].
    pub fn pow(basis: Expr, exponent: Expr) -> Result<Expr, EvalError> {
        power::eval(basis, exponent, 0)
    }

    /// The square root of this expression: `self ^ (1/2)`.
    pub fn sqrt(self) -> Result<Expr, EvalError> {
        Self::pow(self, Expr::rational(1, 2))
    }

    /// Divides this expression by `rhs`, as `self * rhs^-1`.
    pub fn div(self, rhs: Expr) -> Result<Expr, EvalError> {
        Ok(self * Self::pow(rhs, Expr::int(-1))?)
    }

    /// Normalizes a non-commutative product of the given factors.
    pub fn ncproduct(factors: impl IntoIterator<Item = Expr>) -> Self {
        ncprod::normalize(factors.into_iter().collect())
    }

    /// Expands the expression: integer powers of sums are multiplied out
    /// (quadratic shortcut, general multinomial) and products distribute
    /// over their sum factors. Expansion recurses into sub-expressions first
    /// and is idempotent.
    ///
    /// # Errors
    ///
    /// The same conditions as [`Expr::pow`].
    pub fn expand(&self) -> Result<Expr, EvalError> {
        power::expand(self, 0)
    }

    /// If the expression is a number, returns a reference to it.
    pub fn as_numeric(&self) -> Option<&Numeric> {
        match self.kind() {
            ExprKind::Num(n) => Some(n),
            _ => None,
        }
    }

    /// If the expression is a symbol, returns a reference to it.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.kind() {
            ExprKind::Sym(s) => Some(s),
            _ => None,
        }
    }

    /// Writes `self`, parenthesized if its precedence is below `min_prec`.
    pub(crate) fn fmt_at(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            write!(f, "(")?;
            fmt::Display::fmt(self, f)?;
            write!(f, ")")
        } else {
            fmt::Display::fmt(self, f)
        }
    }

    fn precedence(&self) -> u8 {
        match self.kind() {
            ExprKind::Num(n) => {
                if n.is_negative() || !n.is_integer() {
                    PREC_ADD
                } else {
                    PREC_ATOM
                }
            },
            ExprKind::Sym(_) => PREC_ATOM,
            ExprKind::Seq(s) => match s.kind() {
                SeqKind::Add => PREC_ADD,
                SeqKind::Mul => PREC_MUL,
            },
            ExprKind::Pow(_) => PREC_POW,
            ExprKind::NcProd(_) => PREC_MUL,
        }
    }
}

impl From<Symbol> for Expr {
    fn from(sym: Symbol) -> Self {
        Self::from_kind(ExprKind::Sym(sym))
    }
}

impl From<Numeric> for Expr {
    fn from(n: Numeric) -> Self {
        Self::num(n)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Self::int(n)
    }
}

/// Adds two expressions, producing the canonical sum. Already-canonical
/// sums are merged instead of re-normalized.
impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Self) -> Expr {
        PairSeq::combine2(SeqKind::Add, &self, &rhs)
    }
}

/// Multiplies two expressions, producing the canonical product.
impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Self) -> Expr {
        PairSeq::combine2(SeqKind::Mul, &self, &rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::int(-1) * self
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Self) -> Expr {
        self + (-rhs)
    }
}

/// Structural equality, with a pointer-equality fast path.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Eq for Expr {}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The canonical total order (see [`crate::order`]).
impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        order::cmp_expr(self, other)
    }
}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Num(n) => write!(f, "{}", n),
            ExprKind::Sym(s) => write!(f, "{}", s),
            ExprKind::Seq(s) => write!(f, "{}", s),
            ExprKind::Pow(p) => {
                p.basis().fmt_at(f, PREC_POW + 1)?;
                write!(f, "^")?;
                p.exponent().fmt_at(f, PREC_POW + 1)
            },
            ExprKind::NcProd(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    factor.fmt_at(f, PREC_MUL + 1)?;
                }
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn operators_normalize() {
        let x = Expr::from(Symbol::new("x"));
        assert_eq!(x.clone() + x.clone(), Expr::int(2) * x.clone());
        assert_eq!(x.clone() - x.clone(), Expr::int(0));
        assert_eq!(x.clone() * x.clone(), Expr::pow(x, Expr::int(2)).unwrap());
    }

    #[test]
    fn division_is_a_negative_power() {
        let x = Expr::from(Symbol::new("x"));
        let e = x.clone().div(Expr::int(2)).unwrap();
        assert_eq!(e, Expr::rational(1, 2) * x);

        assert_eq!(
            Expr::int(1).div(Expr::int(0)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn sqrt_helper() {
        assert_eq!(Expr::int(9).sqrt().unwrap(), Expr::int(3));
    }

    #[test]
    fn display_wraps_by_precedence() {
        let x = Expr::from(Symbol::new("x"));
        let y = Expr::from(Symbol::new("y"));

        let sum_squared = Expr::pow(x.clone() + y.clone(), Expr::int(2)).unwrap();
        assert_eq!(sum_squared.to_string(), "(x + y)^2");

        let surd = Expr::pow(Expr::int(2), Expr::rational(1, 2)).unwrap();
        assert_eq!(surd.to_string(), "2^(1/2)");

        let neg = -x;
        assert_eq!(neg.to_string(), "-x");
    }

    #[test]
    fn hashing_agrees_with_equality() {
        use std::collections::HashMap;

        let x = Expr::from(Symbol::new("x"));
        let a = x.clone() + Expr::int(1);
        let b = Expr::int(1) + x;

        let mut map = HashMap::new();
        map.insert(a, "first");
        assert_eq!(map.get(&b), Some(&"first"));
    }
}
