//! Non-commutative products.
//!
//! A much lighter sibling of the canonical product: factors are flattened
//! and associated but **never** reordered, so `a*b` and `b*a` stay distinct.
//! Commutative numeric factors are pulled out front as a scalar multiplier,
//! since scalars commute with everything.

use crate::expr::{Expr, ExprKind};
use cas_num::Numeric;

/// Normalizes a list of non-commutative factors.
pub(crate) fn normalize(operands: Vec<Expr>) -> Expr {
    let mut factors: Vec<Expr> = Vec::with_capacity(operands.len());
    let mut scalar = Numeric::one();

    for op in operands {
        if let ExprKind::Num(n) = op.kind() {
            if n.is_zero() {
                return Expr::num(Numeric::zero());
            }
            scalar = &scalar * n;
            continue;
        }
        if let ExprKind::NcProd(inner) = op.kind() {
            factors.extend_from_slice(inner);
            continue;
        }
        factors.push(op);
    }

    let core = match factors.len() {
        0 => return Expr::num(scalar),
        1 => factors.remove(0),
        _ => Expr::from_kind(ExprKind::NcProd(factors)),
    };

    if scalar.is_one() {
        core
    } else {
        Expr::product(vec![Expr::num(scalar), core])
    }
}

#[cfg(test)]
mod tests {
    use crate::pairseq::SeqKind;
    use crate::symbol::Symbol;
    use pretty_assertions::assert_eq;
    use super::*;

    fn ab() -> (Expr, Expr) {
        (Expr::from(Symbol::new("a")), Expr::from(Symbol::new("b")))
    }

    #[test]
    fn factor_order_is_preserved() {
        let (a, b) = ab();
        let ab = Expr::ncproduct(vec![a.clone(), b.clone()]);
        let ba = Expr::ncproduct(vec![b, a]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn nested_products_flatten() {
        let (a, b) = ab();
        let c = Expr::from(Symbol::new("c"));
        let inner = Expr::ncproduct(vec![b.clone(), c.clone()]);
        let e = Expr::ncproduct(vec![a.clone(), inner]);
        assert_eq!(e, Expr::ncproduct(vec![a, b, c]));
    }

    #[test]
    fn numeric_factors_move_out_front() {
        let (a, b) = ab();
        let e = Expr::ncproduct(vec![a.clone(), Expr::int(3), b.clone()]);

        let ExprKind::Seq(s) = e.kind() else {
            panic!("expected a scalar multiple, got {:?}", e);
        };
        assert_eq!(s.kind(), SeqKind::Mul);
        assert_eq!(s.residual(), &cas_num::int(3));
    }

    #[test]
    fn zero_and_singletons_collapse() {
        let (a, b) = ab();
        assert_eq!(Expr::ncproduct(vec![a.clone(), Expr::int(0), b]), Expr::int(0));
        assert_eq!(Expr::ncproduct(vec![a.clone()]), a);
        assert_eq!(Expr::ncproduct(vec![]), Expr::int(1));
    }
}
