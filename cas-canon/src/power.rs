//! Symbolic exponentiation: the `basis ^ exponent` rewrite engine and
//! integer-power expansion.
//!
//! Evaluation applies a fixed rule list (first match wins) and reaches a
//! fixed point in one application, because each rule may assume the earlier
//! ones have already fired:
//!
//! 1. `x^0 = 1` (including `0^0`)
//! 2. `x^1 = x`
//! 3. `0^x = 0`, unless `x` is a negative real number (division by zero)
//! 4. `1^x = 1`
//! 5. `c1^c2` for numeric `c1`, `c2`: the exact power when it exists;
//!    otherwise the rational exponent `n/m` is split into its floor `q` and
//!    remainder `r/m`, giving `c1^q * c1^(r/m)` with `0 <= r/m < 1`
//! 6. `(x^c1)^c2 -> x^(c1*c2)` when `c2` is an integer or `|c1| < 1`
//!    (collapsing is unsound otherwise: `(x^2)^(1/2) != x` in general)
//! 7. `(x*y*z)^n -> x^n*y^n*z^n` for integer `n`
//! 8. `(c*x*y)^e -> x^e*y^e * c^e` for numeric non-integer `e`, pulling the
//!    numeric residual (and separately its sign) out of the product
//! 9. anything else holds in its raw form
//!
//! Expansion is a separate operation ([`Expr::expand`]) that multiplies out
//! integer powers of sums (quadratic special case, general multinomial) and
//! distributes products over sums. It recurses into sub-expressions first
//! and is idempotent.

use crate::error::EvalError;
use crate::expr::{Expr, ExprKind};
use crate::pair::Pair;
use crate::pairseq::{PairSeq, SeqKind};
use cas_num::{binomial, consts, Numeric};
use rug::Integer;

/// The recursion bound threaded through evaluation and expansion, so that
/// pathologically nested input fails deterministically instead of
/// overflowing the call stack.
pub const MAX_RECURSION_DEPTH: usize = 1024;

/// An expression raised to a power.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Power {
    pub(crate) basis: Expr,
    pub(crate) exponent: Expr,
}

impl Power {
    /// The basis of the power.
    pub fn basis(&self) -> &Expr {
        &self.basis
    }

    /// The exponent of the power.
    pub fn exponent(&self) -> &Expr {
        &self.exponent
    }

    /// Wraps `basis ^ exponent` without running the rewrite rules. Callers
    /// must guarantee the node is already in canonical form.
    pub(crate) fn hold(basis: Expr, exponent: Expr) -> Expr {
        debug_assert!(
            !exponent
                .as_numeric()
                .map(|n| n.is_zero() || n.is_one())
                .unwrap_or(false),
            "trivial exponents are eliminated by evaluation"
        );
        Expr::from_kind(ExprKind::Pow(Power { basis, exponent }))
    }
}

/// Evaluates `basis ^ exponent` into canonical form. Both operands are
/// themselves already canonical.
pub(crate) fn eval(basis: Expr, exponent: Expr, depth: usize) -> Result<Expr, EvalError> {
    if depth >= MAX_RECURSION_DEPTH {
        return Err(EvalError::RecursionLimitExceeded);
    }

    let num_basis = basis.as_numeric().cloned();
    let num_exponent = exponent.as_numeric().cloned();

    // x^0 = 1, which also settles 0^0 by convention
    if num_exponent.as_ref().map(|n| n.is_zero()).unwrap_or(false) {
        return Ok(Expr::num(Numeric::one()));
    }

    // x^1 = x
    if num_exponent.as_ref().map(|n| n.is_one()).unwrap_or(false) {
        return Ok(basis);
    }

    // 0^x = 0, unless x is a negative real number
    if num_basis.as_ref().map(|n| n.is_zero()).unwrap_or(false) {
        if let Some(e) = &num_exponent {
            if e.is_real() && e.is_negative() {
                return Err(EvalError::DivisionByZero);
            }
        }
        return Ok(Expr::num(Numeric::zero()));
    }

    // 1^x = 1
    if num_basis.as_ref().map(|n| n.is_one()).unwrap_or(false) {
        return Ok(Expr::num(Numeric::one()));
    }

    // c1^c2 for numeric c1, c2
    if let (Some(nb), Some(ne)) = (&num_basis, &num_exponent) {
        if let Some(value) = nb.checked_pow(ne) {
            return Ok(Expr::num(value));
        }
        // both operands are rational but the power is irrational: peel the
        // integer part q off the exponent, leaving basis^(r/m) with
        // 0 <= r/m < 1
        if nb.is_rational() && ne.is_rational() && !ne.is_integer() {
            if let Some((q, frac)) = ne.floor_split() {
                if q.is_zero() {
                    // the exponent is already in the reduced range; the
                    // node is terminal in its raw form
                    log::trace!("{}^{} stays symbolic", nb, ne);
                    return Ok(Power::hold(basis, exponent));
                }
                if let Some(scale) = nb.checked_pow(&q) {
                    return Ok(PairSeq::from_pairs(
                        SeqKind::Mul,
                        vec![Pair::new(basis, frac)],
                        scale,
                    ));
                }
            }
        }
        // not exactly computable (for instance an exponent beyond the
        // machine range): keep the node raw
        return Ok(Power::hold(basis, exponent));
    }

    if let Some(ne) = &num_exponent {
        // (x^c1)^c2 -> x^(c1*c2) when c2 is an integer or |c1| < 1
        if let ExprKind::Pow(sub) = basis.kind() {
            if let Some(c1) = sub.exponent().as_numeric() {
                debug_assert!(!c1.is_one(), "an evaluated power cannot have exponent 1");
                if ne.is_integer() || c1.abs() < *consts::ONE {
                    let sub_basis = sub.basis().clone();
                    let collapsed = c1 * ne;
                    return eval(sub_basis, Expr::num(collapsed), depth + 1);
                }
            }
        }

        if let ExprKind::Seq(s) = basis.kind() {
            if s.kind() == SeqKind::Mul {
                // (x*y*z)^n -> x^n*y^n*z^n for integer n
                if ne.is_integer() {
                    return pow_of_product(s, ne, depth);
                }

                // fractional exponent: extract the numeric residual so the
                // sign/magnitude ambiguity sits in an explicit numeric
                // factor, (c*x)^e -> x^e * c^e with the sign separated
                let c = s.residual().clone();
                if !c.is_one() && c.is_real() {
                    if c.is_positive() {
                        let stripped = s.with_residual(Numeric::one());
                        let rest = eval(stripped, exponent.clone(), depth + 1)?;
                        let scale = eval(Expr::num(c), exponent.clone(), depth + 1)?;
                        return Ok(rest * scale);
                    }
                    if !c.is_minus_one() {
                        let stripped = s.with_residual(consts::MINUS_ONE.clone());
                        let rest = eval(stripped, exponent.clone(), depth + 1)?;
                        let scale = eval(Expr::num(c.abs()), exponent.clone(), depth + 1)?;
                        return Ok(rest * scale);
                    }
                }
            }
        }
    }

    Ok(Power::hold(basis, exponent))
}

/// `(x*y*z)^n` for integer `n`: every stored exponent is multiplied by `n`
/// and the residual is raised to `n`. Numeric rests re-enter the full rule
/// set so results such as `2^(3/2)` are renormalized.
fn pow_of_product(s: &PairSeq, n: &Numeric, depth: usize) -> Result<Expr, EvalError> {
    debug_assert!(n.is_integer());
    if n.is_zero() {
        return Ok(Expr::num(Numeric::one()));
    }

    let mut pairs = Vec::with_capacity(s.pairs().len());
    let mut extra = Vec::new();
    for pair in s.pairs() {
        if pair.rest.as_numeric().is_some() {
            let scaled = &pair.coeff * n;
            extra.push(eval(pair.rest.clone(), Expr::num(scaled), depth + 1)?);
        } else {
            pairs.push(Pair::new(pair.rest.clone(), &pair.coeff * n));
        }
    }

    let residual = match s.residual().checked_pow(n) {
        Some(value) => value,
        None => {
            extra.push(eval(
                Expr::num(s.residual().clone()),
                Expr::num(n.clone()),
                depth + 1,
            )?);
            Numeric::one()
        },
    };

    let product = PairSeq::from_pairs(SeqKind::Mul, pairs, residual);
    if extra.is_empty() {
        Ok(product)
    } else {
        extra.push(product);
        Ok(Expr::product(extra))
    }
}

/// Recursively expands an expression: integer powers of sums are multiplied
/// out and products distribute over their sum factors. Unchanged
/// sub-expressions are returned pointer-identical, which makes repeated
/// expansion a cheap no-op.
pub(crate) fn expand(e: &Expr, depth: usize) -> Result<Expr, EvalError> {
    if depth >= MAX_RECURSION_DEPTH {
        return Err(EvalError::RecursionLimitExceeded);
    }

    match e.kind() {
        ExprKind::Num(_) | ExprKind::Sym(_) => Ok(e.clone()),
        ExprKind::Seq(s) => match s.kind() {
            SeqKind::Add => expand_sum(e, s, depth),
            SeqKind::Mul => expand_product(e, s, depth),
        },
        ExprKind::Pow(p) => expand_power(e, p, depth),
        ExprKind::NcProd(factors) => {
            let mut changed = false;
            let mut out = Vec::with_capacity(factors.len());
            for factor in factors {
                let expanded = expand(factor, depth + 1)?;
                changed |= !expanded.ptr_eq(factor);
                out.push(expanded);
            }
            if changed {
                Ok(Expr::ncproduct(out))
            } else {
                Ok(e.clone())
            }
        },
    }
}

fn expand_sum(e: &Expr, s: &PairSeq, depth: usize) -> Result<Expr, EvalError> {
    let mut changed = false;
    let mut pairs = Vec::with_capacity(s.pairs().len());
    for pair in s.pairs() {
        let rest = expand(&pair.rest, depth + 1)?;
        changed |= !rest.ptr_eq(&pair.rest);
        pairs.push(Pair::new(rest, pair.coeff.clone()));
    }

    if !changed {
        return Ok(e.clone());
    }
    Ok(PairSeq::from_pairs(SeqKind::Add, pairs, s.residual().clone()))
}

fn expand_product(e: &Expr, s: &PairSeq, depth: usize) -> Result<Expr, EvalError> {
    let mut changed = false;
    let mut sums: Vec<Expr> = Vec::new();
    let mut others: Vec<Expr> = Vec::new();

    for pair in s.pairs() {
        let rest = expand(&pair.rest, depth + 1)?;
        changed |= !rest.ptr_eq(&pair.rest);

        if as_sum_seq(&rest).is_some() && pair.coeff.is_one() {
            sums.push(rest);
            continue;
        }
        if let Some(n) = pair.coeff.to_u32() {
            // a positive integer power of a sum multiplies out first
            if let Some(inner) = as_sum_seq(&rest) {
                sums.push(expand_sum_power(inner, n, depth)?);
                changed = true;
                continue;
            }
        }
        others.push(PairSeq::recombine(
            SeqKind::Mul,
            &Pair::new(rest, pair.coeff.clone()),
        ));
    }

    if sums.is_empty() {
        if !changed {
            return Ok(e.clone());
        }
        others.push(Expr::num(s.residual().clone()));
        return Ok(Expr::product(others));
    }

    // distribute: fold the non-sum part into the first sum, then each
    // further sum into the accumulated result
    others.push(Expr::num(s.residual().clone()));
    let mut acc = Expr::product(others);
    for sum in &sums {
        acc = distribute(&acc, sum);
    }
    Ok(acc)
}

/// Cross-multiplies two expressions term by term, treating non-sums as
/// single-term sums. The result is a canonical sum of the pairwise products.
fn distribute(a: &Expr, b: &Expr) -> Expr {
    let a_terms = sum_terms(a);
    let b_terms = sum_terms(b);
    let mut out = Vec::with_capacity(a_terms.len() * b_terms.len());
    for x in &a_terms {
        for y in &b_terms {
            out.push(x.clone() * y.clone());
        }
    }
    Expr::sum(out)
}

/// The addends of `e`: recombined pairs plus the residual for a sum, or the
/// expression itself otherwise.
fn sum_terms(e: &Expr) -> Vec<Expr> {
    match as_sum_seq(e) {
        Some(s) => {
            let mut terms: Vec<Expr> = s
                .pairs()
                .iter()
                .map(|p| PairSeq::recombine(SeqKind::Add, p))
                .collect();
            if !s.residual().is_zero() {
                terms.push(Expr::num(s.residual().clone()));
            }
            terms
        },
        None => vec![e.clone()],
    }
}

fn as_sum_seq(e: &Expr) -> Option<&PairSeq> {
    match e.kind() {
        ExprKind::Seq(s) if s.kind() == SeqKind::Add => Some(s),
        _ => None,
    }
}

fn expand_power(e: &Expr, p: &Power, depth: usize) -> Result<Expr, EvalError> {
    let basis = expand(p.basis(), depth + 1)?;

    if let Some(ne) = p.exponent().as_numeric() {
        if ne.is_integer() {
            match basis.kind() {
                ExprKind::Seq(s) if s.kind() == SeqKind::Add => {
                    if let Some(n) = ne.to_u32() {
                        return expand_sum_power(s, n, depth);
                    }
                },
                ExprKind::Seq(s) if s.kind() == SeqKind::Mul => {
                    return pow_of_product(s, ne, depth);
                },
                _ => {},
            }
        }
    }

    if basis.ptr_eq(p.basis()) {
        Ok(e.clone())
    } else {
        eval(basis, p.exponent().clone(), depth + 1)
    }
}

/// Expands `(sum)^n` for `n >= 2`.
fn expand_sum_power(s: &PairSeq, n: u32, depth: usize) -> Result<Expr, EvalError> {
    debug_assert!(s.kind() == SeqKind::Add && n >= 2);

    if n == 2 {
        return expand_sum_squared(s, depth);
    }

    // the terms of the sum, counting the residual as a term when present
    let mut terms: Vec<Expr> = s
        .pairs()
        .iter()
        .map(|p| PairSeq::recombine(SeqKind::Add, p))
        .collect();
    if !s.residual().is_zero() {
        terms.push(Expr::num(s.residual().clone()));
    }
    let m = terms.len();
    debug_assert!(m >= 2, "a canonical sum has at least two addends");

    // enumerate the compositions of n into m non-negative parts with an
    // odometer over the first m-1 shares; the last share is what remains.
    // k_cum[l] tracks the running partial sums so the multinomial
    // coefficient can be built from binomials incrementally.
    let mut out: Vec<Expr> = Vec::new();
    let mut k = vec![0u32; m - 1];
    let mut k_cum = vec![0u32; m - 1];
    let mut upper = vec![n; m - 1];

    loop {
        let mut ops: Vec<Expr> = Vec::with_capacity(m + 1);
        for l in 0..m - 1 {
            if k[l] > 0 {
                ops.push(raised_term(&terms[l], k[l], depth)?);
            }
        }
        let last_share = n - k_cum[m - 2];
        if last_share > 0 {
            ops.push(raised_term(&terms[m - 1], last_share, depth)?);
        }

        let mut f: Integer = binomial(n, k[0]);
        for l in 1..m - 1 {
            f *= binomial(n - k_cum[l - 1], k[l]);
        }
        ops.push(Expr::num(Numeric::from(f)));
        out.push(Expr::product(ops));

        // advance the odometer
        let mut pos = m - 1;
        loop {
            if pos == 0 {
                break;
            }
            let idx = pos - 1;
            k[idx] += 1;
            if k[idx] <= upper[idx] {
                break;
            }
            k[idx] = 0;
            pos -= 1;
        }
        if pos == 0 {
            break;
        }

        // recompute the partial sums and limits to the right of the bump
        let idx = pos - 1;
        k_cum[idx] = if idx == 0 { k[0] } else { k_cum[idx - 1] + k[idx] };
        for i in idx + 1..m - 1 {
            k_cum[i] = k_cum[i - 1] + k[i];
        }
        for i in idx + 1..m - 1 {
            upper[i] = n - k_cum[i - 1];
        }
    }

    Ok(Expr::sum(out))
}

/// One summand raised to its share of the exponent.
fn raised_term(term: &Expr, share: u32, depth: usize) -> Result<Expr, EvalError> {
    if share == 1 {
        return Ok(term.clone());
    }
    if let ExprKind::Seq(s) = term.kind() {
        if s.kind() == SeqKind::Mul {
            return pow_of_product(s, &Numeric::from(share), depth);
        }
    }
    eval(term.clone(), Expr::num(Numeric::from(share)), depth + 1)
}

/// The quadratic special case `(sum)^2`, built directly over the pair
/// sequence: squares of every term, cross terms `2*ci*cj*ri*rj`, and the
/// residual's cross terms and square. Avoids the general multinomial
/// machinery for the most common exponent.
fn expand_sum_squared(s: &PairSeq, depth: usize) -> Result<Expr, EvalError> {
    let pairs = s.pairs();
    let mut out: Vec<Pair> =
        Vec::with_capacity(pairs.len() * (pairs.len() + 1) / 2 + pairs.len() + 1);

    for (i, p) in pairs.iter().enumerate() {
        let squared = if let ExprKind::Seq(m) = p.rest.kind() {
            debug_assert!(m.kind() == SeqKind::Mul, "sum rests are never sums");
            pow_of_product(m, &consts::TWO, depth)?
        } else {
            eval(p.rest.clone(), Expr::num(consts::TWO.clone()), depth + 1)?
        };
        out.push(Pair::new(squared, &p.coeff * &p.coeff));

        for q in &pairs[i + 1..] {
            let rest = p.rest.clone() * q.rest.clone();
            let coeff = &(&*consts::TWO * &p.coeff) * &q.coeff;
            out.push(PairSeq::split_with_coeff(SeqKind::Add, &rest, &coeff));
        }
    }

    let oc = s.residual();
    if !oc.is_zero() {
        let twice = &*consts::TWO * oc;
        for p in pairs {
            out.push(Pair::new(p.rest.clone(), &p.coeff * &twice));
        }
        out.push(Pair::new(Expr::num(oc * oc), Numeric::one()));
    }

    Ok(PairSeq::from_pairs(SeqKind::Add, out, Numeric::zero()))
}

#[cfg(test)]
mod tests {
    use crate::symbol::Symbol;
    use pretty_assertions::assert_eq;
    use super::*;

    fn xy() -> (Expr, Expr) {
        (Expr::from(Symbol::new("x")), Expr::from(Symbol::new("y")))
    }

    #[test]
    fn trivial_exponents() {
        let (x, _) = xy();
        assert_eq!(Expr::pow(x.clone(), Expr::int(0)).unwrap(), Expr::int(1));
        assert_eq!(Expr::pow(x.clone(), Expr::int(1)).unwrap(), x);
        assert_eq!(Expr::pow(Expr::int(0), Expr::int(0)).unwrap(), Expr::int(1));
    }

    #[test]
    fn zero_basis() {
        let (x, _) = xy();
        assert_eq!(Expr::pow(Expr::int(0), Expr::int(3)).unwrap(), Expr::int(0));
        assert_eq!(Expr::pow(Expr::int(0), x).unwrap(), Expr::int(0));
        assert_eq!(
            Expr::pow(Expr::int(0), Expr::int(-1)),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(
            Expr::pow(Expr::int(0), Expr::rational(-1, 2)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn one_basis() {
        let (x, _) = xy();
        assert_eq!(Expr::pow(Expr::int(1), x).unwrap(), Expr::int(1));
    }

    #[test]
    fn exact_numeric_powers() {
        assert_eq!(Expr::pow(Expr::int(2), Expr::int(10)).unwrap(), Expr::int(1024));
        assert_eq!(Expr::pow(Expr::int(8), Expr::rational(2, 3)).unwrap(), Expr::int(4));
        assert_eq!(
            Expr::pow(Expr::int(4), Expr::rational(-1, 2)).unwrap(),
            Expr::rational(1, 2)
        );
    }

    #[test]
    fn irrational_powers_stay_symbolic() {
        let sqrt2 = Expr::pow(Expr::int(2), Expr::rational(1, 2)).unwrap();
        let ExprKind::Pow(p) = sqrt2.kind() else {
            panic!("expected a held power, got {:?}", sqrt2);
        };
        assert_eq!(p.basis(), &Expr::int(2));
        assert_eq!(p.exponent(), &Expr::rational(1, 2));
    }

    #[test]
    fn irrational_powers_reduce_their_exponent_range() {
        // 2^(3/2) = 2 * 2^(1/2)
        let e = Expr::pow(Expr::int(2), Expr::rational(3, 2)).unwrap();
        let sqrt2 = Expr::pow(Expr::int(2), Expr::rational(1, 2)).unwrap();
        assert_eq!(e, Expr::int(2) * sqrt2);

        // 2^(-1/2) = 1/2 * 2^(1/2)
        let e = Expr::pow(Expr::int(2), Expr::rational(-1, 2)).unwrap();
        let sqrt2 = Expr::pow(Expr::int(2), Expr::rational(1, 2)).unwrap();
        assert_eq!(e, Expr::rational(1, 2) * sqrt2);
    }

    #[test]
    fn nested_powers_collapse_when_sound() {
        let (x, _) = xy();
        // (x^2)^3 = x^6: integer outer exponent
        let x2 = Expr::pow(x.clone(), Expr::int(2)).unwrap();
        assert_eq!(
            Expr::pow(x2, Expr::int(3)).unwrap(),
            Expr::pow(x.clone(), Expr::int(6)).unwrap()
        );

        // (x^(1/2))^(1/3) = x^(1/6): inner exponent magnitude below 1
        let xr = Expr::pow(x.clone(), Expr::rational(1, 2)).unwrap();
        assert_eq!(
            Expr::pow(xr, Expr::rational(1, 3)).unwrap(),
            Expr::pow(x.clone(), Expr::rational(1, 6)).unwrap()
        );

        // (x^2)^(1/2) must NOT collapse to x
        let x2 = Expr::pow(x.clone(), Expr::int(2)).unwrap();
        let e = Expr::pow(x2.clone(), Expr::rational(1, 2)).unwrap();
        let ExprKind::Pow(p) = e.kind() else {
            panic!("expected a held power, got {:?}", e);
        };
        assert_eq!(p.basis(), &x2);
    }

    #[test]
    fn integer_exponents_distribute_over_products() {
        let (x, y) = xy();
        let e = Expr::pow(x.clone() * y.clone(), Expr::int(3)).unwrap();
        let expected = Expr::pow(x, Expr::int(3)).unwrap() * Expr::pow(y, Expr::int(3)).unwrap();
        assert_eq!(e, expected);
    }

    #[test]
    fn fractional_exponents_extract_the_numeric_factor() {
        let (x, _) = xy();
        // (4*x)^(1/2) = 2 * x^(1/2)
        let e = Expr::pow(Expr::int(4) * x.clone(), Expr::rational(1, 2)).unwrap();
        let expected = Expr::int(2) * Expr::pow(x.clone(), Expr::rational(1, 2)).unwrap();
        assert_eq!(e, expected);

        // (-4*x)^(1/2) = 2 * (-x)^(1/2)
        let e = Expr::pow(Expr::int(-4) * x.clone(), Expr::rational(1, 2)).unwrap();
        let expected =
            Expr::int(2) * Expr::pow(-x.clone(), Expr::rational(1, 2)).unwrap();
        assert_eq!(e, expected);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let (x, y) = xy();
        let e = Expr::pow(x.clone() + y.clone(), Expr::int(2)).unwrap();
        let ExprKind::Pow(p) = e.kind() else {
            panic!("expected a held power, got {:?}", e);
        };
        let again = Expr::pow(p.basis().clone(), p.exponent().clone()).unwrap();
        assert_eq!(e, again);
    }

    #[test]
    fn deep_nesting_hits_the_recursion_limit() {
        let (x, _) = xy();
        // ((…(x + 1)^2 + 1)^2 + 1)^2 …: every level holds, so expansion has
        // to descend through all of them and trips the depth bound
        let mut e = x;
        for _ in 0..MAX_RECURSION_DEPTH {
            e = Expr::pow(e + Expr::int(1), Expr::int(2)).unwrap();
        }
        assert_eq!(e.expand(), Err(EvalError::RecursionLimitExceeded));
    }

    #[test]
    fn quadratic_expansion() {
        let (x, y) = xy();
        let e = Expr::pow(x.clone() + y.clone(), Expr::int(2))
            .unwrap()
            .expand()
            .unwrap();
        let expected = Expr::sum(vec![
            Expr::pow(x.clone(), Expr::int(2)).unwrap(),
            Expr::int(2) * x.clone() * y.clone(),
            Expr::pow(y.clone(), Expr::int(2)).unwrap(),
        ]);
        assert_eq!(e, expected);
    }

    #[test]
    fn quadratic_expansion_with_residual() {
        let (x, _) = xy();
        // (x + 1)^2 = x^2 + 2x + 1
        let e = Expr::pow(x.clone() + Expr::int(1), Expr::int(2))
            .unwrap()
            .expand()
            .unwrap();
        let expected = Expr::sum(vec![
            Expr::pow(x.clone(), Expr::int(2)).unwrap(),
            Expr::int(2) * x.clone(),
            Expr::int(1),
        ]);
        assert_eq!(e, expected);
    }

    #[test]
    fn cubic_expansion() {
        let (x, y) = xy();
        // (x + y)^3 = x^3 + 3x^2y + 3xy^2 + y^3
        let e = Expr::pow(x.clone() + y.clone(), Expr::int(3))
            .unwrap()
            .expand()
            .unwrap();
        let expected = Expr::sum(vec![
            Expr::pow(x.clone(), Expr::int(3)).unwrap(),
            Expr::int(3) * Expr::pow(x.clone(), Expr::int(2)).unwrap() * y.clone(),
            Expr::int(3) * x.clone() * Expr::pow(y.clone(), Expr::int(2)).unwrap(),
            Expr::pow(y.clone(), Expr::int(3)).unwrap(),
        ]);
        assert_eq!(e, expected);
    }

    #[test]
    fn multinomial_term_count() {
        // (a + b + c)^n has C(n+2, 2) terms
        let a = Expr::from(Symbol::new("a"));
        let b = Expr::from(Symbol::new("b"));
        let c = Expr::from(Symbol::new("c"));
        let sum = a + b + c;

        for n in [2u32, 3, 4, 5, 7] {
            let expanded = Expr::pow(sum.clone(), Expr::int(n as i64))
                .unwrap()
                .expand()
                .unwrap();
            let ExprKind::Seq(s) = expanded.kind() else {
                panic!("expected a sum, got {:?}", expanded);
            };
            let expected = binomial(n + 2, 2).to_usize().unwrap();
            assert_eq!(s.pairs().len(), expected);
        }
    }

    #[test]
    fn products_distribute_over_sums_on_expand() {
        let (x, y) = xy();
        // (x + y) * (x - y) = x^2 - y^2
        let e = ((x.clone() + y.clone()) * (x.clone() - y.clone()))
            .expand()
            .unwrap();
        let expected = Expr::pow(x.clone(), Expr::int(2)).unwrap()
            - Expr::pow(y.clone(), Expr::int(2)).unwrap();
        assert_eq!(e, expected);
    }

    #[test]
    fn expansion_is_idempotent() {
        let (x, y) = xy();
        let e = Expr::pow(x.clone() + y.clone(), Expr::int(4))
            .unwrap()
            .expand()
            .unwrap();
        let again = e.expand().unwrap();
        assert!(e.ptr_eq(&again), "expanding an expanded sum must be a no-op");
    }

    #[test]
    fn expansion_recurses_into_subexpressions() {
        let (x, y) = xy();
        // ((x+y)^2) * x expands fully in one call
        let e = (Expr::pow(x.clone() + y.clone(), Expr::int(2)).unwrap() * x.clone())
            .expand()
            .unwrap();
        let expected = Expr::sum(vec![
            Expr::pow(x.clone(), Expr::int(3)).unwrap(),
            Expr::int(2) * Expr::pow(x.clone(), Expr::int(2)).unwrap() * y.clone(),
            x.clone() * Expr::pow(y.clone(), Expr::int(2)).unwrap(),
        ]);
        assert_eq!(e, expected);
    }
}
