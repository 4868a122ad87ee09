//! The canonical total order over expressions.
//!
//! Every expression compares against every other expression, which is what
//! keeps pair sequences sorted and makes structural comparison of two
//! canonical forms a cheap lexicographic walk. The order has no mathematical
//! meaning; it only needs to be total, cheap, and stable for the lifetime of
//! the process (symbols compare by creation serial).

use crate::expr::{Expr, ExprKind};
use crate::pairseq::PairSeq;
use std::cmp::Ordering;

/// Compares two expressions in canonical order.
pub(crate) fn cmp_expr(a: &Expr, b: &Expr) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }

    let (ka, kb) = (a.kind(), b.kind());
    rank(ka).cmp(&rank(kb)).then_with(|| cmp_same_rank(ka, kb))
}

/// Groups expressions by kind. Numbers sort first so that the numeric pairs
/// of a product cluster at the front of its sequence.
fn rank(kind: &ExprKind) -> u8 {
    match kind {
        ExprKind::Num(_) => 0,
        ExprKind::Sym(_) => 1,
        ExprKind::Pow(_) => 2,
        ExprKind::Seq(s) => match s.kind() {
            crate::pairseq::SeqKind::Mul => 3,
            crate::pairseq::SeqKind::Add => 4,
        },
        ExprKind::NcProd(_) => 5,
    }
}

fn cmp_same_rank(a: &ExprKind, b: &ExprKind) -> Ordering {
    match (a, b) {
        (ExprKind::Num(x), ExprKind::Num(y)) => x.cmp(y),
        (ExprKind::Sym(x), ExprKind::Sym(y)) => x.cmp(y),
        (ExprKind::Pow(x), ExprKind::Pow(y)) => cmp_expr(x.basis(), y.basis())
            .then_with(|| cmp_expr(x.exponent(), y.exponent())),
        (ExprKind::Seq(x), ExprKind::Seq(y)) => cmp_seq(x, y),
        (ExprKind::NcProd(x), ExprKind::NcProd(y)) => {
            x.len().cmp(&y.len()).then_with(|| {
                for (l, r) in x.iter().zip(y) {
                    let ord = cmp_expr(l, r);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            })
        },
        _ => unreachable!("expressions of different kinds share a rank"),
    }
}

/// Sequences compare by length, then pairwise, then by residual: the cheap
/// discriminators come first so unequal sequences bail out early.
fn cmp_seq(a: &PairSeq, b: &PairSeq) -> Ordering {
    debug_assert!(a.kind() == b.kind(), "sequence kinds differ within a rank");

    a.pairs().len().cmp(&b.pairs().len()).then_with(|| {
        for (l, r) in a.pairs().iter().zip(b.pairs()) {
            let ord = cmp_expr(&l.rest, &r.rest).then_with(|| l.coeff.cmp(&r.coeff));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.residual().cmp(b.residual())
    })
}

#[cfg(test)]
mod tests {
    use crate::symbol::Symbol;
    use super::*;

    #[test]
    fn numbers_sort_before_symbols_before_compounds() {
        let x = Expr::from(Symbol::new("x"));
        let two = Expr::int(2);
        let pow = Expr::pow(x.clone(), Expr::int(2)).unwrap();

        assert!(two < x);
        assert!(x < pow);
    }

    #[test]
    fn symbols_sort_by_serial() {
        let a = Expr::from(Symbol::new("a"));
        let b = Expr::from(Symbol::new("b"));
        assert!(a < b);
    }

    #[test]
    fn order_is_consistent_with_equality() {
        let x = Expr::from(Symbol::new("x"));
        let e1 = x.clone() + Expr::int(1);
        let e2 = Expr::int(1) + x;
        assert_eq!(e1.cmp(&e2), Ordering::Equal);
        assert_eq!(e1, e2);
    }
}
