//! Canonical normal forms for symbolic sums, products and powers.
//!
//! This crate is the normal-form engine of a computer-algebra kernel. It
//! maintains exact, canonical representations of symbolic expressions and
//! implements the rewrite rules that collapse, combine and expand them while
//! preserving mathematical equivalence.
//!
//! # Representation
//!
//! Expressions are trees of [`Expr`] handles: immutable, reference-counted,
//! structurally shared nodes. Sums and products are not binary trees but
//! flat, sorted sequences of `(rest, coeff)` pairs with one residual numeric
//! constant — see [`PairSeq`]. Handling a list of pairs is much faster than
//! handling a list of products or powers, and keeping the list sorted in a
//! canonical order makes structural comparison of two expressions a cheap
//! lexicographic walk.
//!
//! Every constructor normalizes, so structurally different inputs denoting
//! the same sum or product come back as the same canonical object:
//!
//! ```
//! use cas_canon::{Expr, Symbol};
//!
//! let x = Expr::from(Symbol::new("x"));
//! let y = Expr::from(Symbol::new("y"));
//!
//! // x + 2x + y = 3x + y, however it is associated
//! let e = x.clone() + Expr::int(2) * x.clone() + y.clone();
//! assert_eq!(e, Expr::sum(vec![y, x.clone(), x.clone(), x]));
//! assert_eq!(e.to_string(), "3*x + y");
//! ```
//!
//! # Exponentiation
//!
//! [`Expr::pow`] runs the power rewrite rules: trivial bases and exponents
//! collapse, exact numeric powers are computed through
//! [`cas_num::Numeric::checked_pow`], integer exponents distribute over
//! products, and nested powers collapse when that is mathematically sound.
//! `0^x` with a negative real `x` is a [`DivisionByZero`](EvalError) error,
//! and the rewrite recursion is bounded by [`MAX_RECURSION_DEPTH`].
//!
//! ```
//! use cas_canon::Expr;
//!
//! // 8^(2/3) has an exact value
//! assert_eq!(Expr::pow(Expr::int(8), Expr::rational(2, 3)).unwrap(), Expr::int(4));
//!
//! // 2^(1/2) does not; it stays symbolic
//! let surd = Expr::pow(Expr::int(2), Expr::rational(1, 2)).unwrap();
//! assert_eq!(surd.to_string(), "2^(1/2)");
//! ```
//!
//! # Expansion
//!
//! [`Expr::expand`] multiplies out integer powers of sums (with a direct
//! quadratic shortcut and general multinomial enumeration) and distributes
//! products over sums:
//!
//! ```
//! use cas_canon::{Expr, Symbol};
//!
//! let x = Expr::from(Symbol::new("x"));
//! let e = Expr::pow(x + Expr::int(1), Expr::int(2)).unwrap();
//! assert_eq!(e.expand().unwrap().to_string(), "2*x + x^2 + 1");
//! ```

pub mod error;
pub mod expr;
pub mod ncprod;
pub mod order;
pub mod pair;
pub mod pairseq;
pub mod power;
pub mod symbol;

pub use error::EvalError;
pub use expr::{Expr, ExprKind};
pub use pair::Pair;
pub use pairseq::{PairSeq, SeqKind};
pub use power::{Power, MAX_RECURSION_DEPTH};
pub use symbol::Symbol;

pub use cas_num::{self as num, Numeric};
