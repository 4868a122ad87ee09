//! The canonical pair-sequence engine behind sums and products.
//!
//! A [`PairSeq`] owns a flat, sorted, duplicate-free sequence of [`Pair`]s
//! plus one residual numeric value: the additive constant of a sum, or the
//! multiplicative constant of a product. The same machinery serves both
//! semantics; [`SeqKind`] selects the split, combine and recombine rules.
//!
//! Normalization always runs to completion before a sequence is published
//! behind an [`Expr`] handle, so every sequence reachable from outside this
//! module satisfies the invariants:
//!
//! 1. **flat** — no pair's `rest` is itself a sequence of the same kind;
//! 2. **sorted** — pairs are in canonical order;
//! 3. **duplicate-free** — no two pairs share an equal `rest`;
//! 4. no pair carries an identity coefficient (a zero multiplier or a zero
//!    exponent);
//! 5. numeric `rest`s are absorbed into the residual whenever their
//!    contribution is exactly computable.
//!
//! Combination is sort-and-merge: operands are split into pairs, the pairs
//! are sorted with the stable standard sort, and a single linear pass
//! combines equal rests. Merging two already-canonical sequences skips the
//! sort and uses a stable two-pointer merge instead. A hash-table strategy
//! could combine in O(n) average time, but it loses the ordering that makes
//! structural comparison cheap and adds bookkeeping on every copy, so it is
//! deliberately not offered.

use crate::expr::{Expr, ExprKind};
use crate::pair::Pair;
use crate::power::Power;
use cas_num::Numeric;
use std::cmp::Ordering;
use std::fmt;

/// Selects sum or product semantics for a [`PairSeq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeqKind {
    /// A sum: pairs denote `rest * coeff`, the residual is added.
    Add,

    /// A product: pairs denote `rest ^ coeff`, the residual is multiplied.
    Mul,
}

impl SeqKind {
    /// The identity value of the residual: 0 for sums, 1 for products.
    pub fn identity(&self) -> Numeric {
        match self {
            Self::Add => Numeric::zero(),
            Self::Mul => Numeric::one(),
        }
    }

    /// Folds a number into a running residual.
    fn absorb(&self, residual: &mut Numeric, n: &Numeric) {
        *residual = match self {
            Self::Add => &*residual + n,
            Self::Mul => &*residual * n,
        };
    }
}

/// A canonical sum or product. See the [module-level documentation](self).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairSeq {
    pub(crate) kind: SeqKind,
    pub(crate) seq: Vec<Pair>,
    pub(crate) coeff: Numeric,
}

impl PairSeq {
    /// Whether this sequence is a sum or a product.
    pub fn kind(&self) -> SeqKind {
        self.kind
    }

    /// The pairs, in canonical order.
    pub fn pairs(&self) -> &[Pair] {
        &self.seq
    }

    /// The residual numeric value: the additive constant of a sum, or the
    /// multiplicative constant of a product.
    pub fn residual(&self) -> &Numeric {
        &self.coeff
    }

    /// Checks the ordering invariants. Diagnostics only; normalization never
    /// consults this to skip work.
    pub fn is_canonical(&self) -> bool {
        self.seq.windows(2).all(|w| w[0].rest < w[1].rest)
            && self.seq.iter().all(|p| !p.coeff.is_zero())
    }

    /// Normalizes a list of operands into a canonical sum or product.
    pub(crate) fn normalize(kind: SeqKind, operands: Vec<Expr>) -> Expr {
        log::trace!("normalizing {} operand(s) into a {:?} sequence", operands.len(), kind);

        let mut seq = Vec::with_capacity(operands.len());
        let mut coeff = kind.identity();
        for op in &operands {
            Self::flatten_operand(kind, op, &mut seq, &mut coeff);
        }
        Self::finish(kind, seq, coeff)
    }

    /// The internal fast path: builds a sequence from caller-constructed
    /// pairs and a residual. The invariants are re-established, so callers
    /// may pass pairs that still need splitting or inlining.
    pub(crate) fn from_pairs(kind: SeqKind, pairs: Vec<Pair>, coeff: Numeric) -> Expr {
        let mut seq = Vec::with_capacity(pairs.len());
        let mut coeff = coeff;
        for pair in pairs {
            Self::flatten_pair(kind, pair, &mut seq, &mut coeff);
        }
        Self::finish(kind, seq, coeff)
    }

    /// Binary entry point used by the `+` and `*` operators. When an operand
    /// is already a canonical sequence of the right kind, its pairs are
    /// merged instead of re-sorted.
    pub(crate) fn combine2(kind: SeqKind, lhs: &Expr, rhs: &Expr) -> Expr {
        match (lhs.kind(), rhs.kind()) {
            (ExprKind::Seq(a), ExprKind::Seq(b)) if a.kind == kind && b.kind == kind => {
                Self::merge_seqs(kind, a, b)
            },
            (ExprKind::Seq(a), _) if a.kind == kind => Self::merge_with(kind, a, rhs),
            (_, ExprKind::Seq(b)) if b.kind == kind => Self::merge_with(kind, b, lhs),
            _ => Self::normalize(kind, vec![lhs.clone(), rhs.clone()]),
        }
    }

    /// Decomposes an operand into a pair by the variant's split rule.
    ///
    /// For sums, a product with a numeric residual `c != 1` splits into
    /// `(product / c, c)`, so `3*x` becomes `(x, 3)`. For products, a power
    /// with a numeric exponent splits into `(basis, exponent)`. Anything else
    /// becomes `(operand, 1)`.
    pub(crate) fn split(kind: SeqKind, e: &Expr) -> Pair {
        match kind {
            SeqKind::Add => {
                if let ExprKind::Seq(s) = e.kind() {
                    if s.kind == SeqKind::Mul && !s.coeff.is_one() {
                        return Pair::new(s.with_residual(Numeric::one()), s.coeff.clone());
                    }
                }
                Pair::new(e.clone(), Numeric::one())
            },
            SeqKind::Mul => {
                if let ExprKind::Pow(p) = e.kind() {
                    if let Some(n) = p.exponent().as_numeric() {
                        return Pair::new(p.basis().clone(), n.clone());
                    }
                }
                Pair::new(e.clone(), Numeric::one())
            },
        }
    }

    /// Splits `e` and multiplies the resulting coefficient by `c`.
    pub(crate) fn split_with_coeff(kind: SeqKind, e: &Expr, c: &Numeric) -> Pair {
        let mut pair = Self::split(kind, e);
        pair.coeff = &pair.coeff * c;
        pair
    }

    /// Rebuilds this sequence with a different residual, re-checking the
    /// degenerate cases (used when a numeric factor is pulled out of a
    /// product).
    pub(crate) fn with_residual(&self, coeff: Numeric) -> Expr {
        Self::publish(self.kind, self.seq.clone(), coeff)
    }

    /// Turns a pair back into a standalone expression: `rest * coeff` for
    /// sums, `rest ^ coeff` for products.
    pub(crate) fn recombine(kind: SeqKind, pair: &Pair) -> Expr {
        if pair.coeff.is_one() {
            return pair.rest.clone();
        }
        match kind {
            SeqKind::Add => Self::normalize(
                SeqKind::Mul,
                vec![pair.rest.clone(), Expr::num(pair.coeff.clone())],
            ),
            SeqKind::Mul => Power::hold(pair.rest.clone(), Expr::num(pair.coeff.clone())),
        }
    }

    /// Flattens one operand into the sequence being built: same-kind
    /// sequences are inlined, numbers fold into the residual, everything
    /// else is split into a pair.
    fn flatten_operand(kind: SeqKind, op: &Expr, seq: &mut Vec<Pair>, coeff: &mut Numeric) {
        if let ExprKind::Num(n) = op.kind() {
            kind.absorb(coeff, n);
            return;
        }
        if let ExprKind::Seq(s) = op.kind() {
            if s.kind == kind {
                seq.extend_from_slice(&s.seq);
                kind.absorb(coeff, &s.coeff);
                return;
            }
        }
        seq.push(Self::split(kind, op));
    }

    /// Flattens one caller-built pair, re-establishing the pair invariants
    /// that the fast path may have bent.
    fn flatten_pair(kind: SeqKind, pair: Pair, seq: &mut Vec<Pair>, coeff: &mut Numeric) {
        if pair.coeff.is_zero() {
            return;
        }

        match kind {
            SeqKind::Add => {
                if let ExprKind::Num(n) = pair.rest.kind() {
                    *coeff = &*coeff + &(n * &pair.coeff);
                    return;
                }
                if let ExprKind::Seq(s) = pair.rest.kind() {
                    // an inner sum inlines with the coefficient distributed
                    // linearly over its pairs
                    if s.kind == SeqKind::Add {
                        for q in &s.seq {
                            seq.push(Pair::new(q.rest.clone(), &q.coeff * &pair.coeff));
                        }
                        *coeff = &*coeff + &(&s.coeff * &pair.coeff);
                        return;
                    }
                    // a product rest must not carry a residual of its own
                    if s.kind == SeqKind::Mul && !s.coeff.is_one() {
                        seq.push(Pair::new(
                            s.with_residual(Numeric::one()),
                            &s.coeff * &pair.coeff,
                        ));
                        return;
                    }
                }
                seq.push(pair);
            },
            SeqKind::Mul => {
                if let ExprKind::Seq(s) = pair.rest.kind() {
                    // an inner product inlines only under a unit exponent
                    if s.kind == SeqKind::Mul && pair.coeff.is_one() {
                        seq.extend_from_slice(&s.seq);
                        *coeff = &*coeff * &s.coeff;
                        return;
                    }
                }
                if let ExprKind::Pow(p) = pair.rest.kind() {
                    if pair.coeff.is_one() {
                        if let Some(n) = p.exponent().as_numeric() {
                            seq.push(Pair::new(p.basis().clone(), n.clone()));
                            return;
                        }
                    }
                }
                seq.push(pair);
            },
        }
    }

    /// Sorts and combines a freshly assembled sequence, then publishes it.
    fn finish(kind: SeqKind, mut seq: Vec<Pair>, coeff: Numeric) -> Expr {
        seq.sort();
        Self::finish_presorted(kind, seq, coeff)
    }

    /// Like [`finish`](Self::finish) for a sequence that is already sorted.
    fn finish_presorted(kind: SeqKind, seq: Vec<Pair>, mut coeff: Numeric) -> Expr {
        let seq = Self::combine_sorted(kind, seq, &mut coeff);

        // combining exponents can leave a product pair with a unit exponent
        // (e.g. (x*y)^(1/2) * (x*y)^(1/2)), whose pairs must now be inlined
        // to restore flatness; the fast path re-runs the full pipeline
        if kind == SeqKind::Mul
            && seq.iter().any(|p| {
                p.coeff.is_one()
                    && matches!(p.rest.kind(), ExprKind::Seq(s) if s.kind == SeqKind::Mul)
            })
        {
            return Self::from_pairs(kind, seq, coeff);
        }

        Self::publish(kind, seq, coeff)
    }

    /// The compaction pass: one stable linear scan over the sorted sequence
    /// that combines adjacent equal rests, drops entries whose combined
    /// coefficient vanished, and absorbs numeric rests into the residual.
    fn combine_sorted(kind: SeqKind, seq: Vec<Pair>, coeff: &mut Numeric) -> Vec<Pair> {
        let mut merged: Vec<Pair> = Vec::with_capacity(seq.len());
        for pair in seq {
            if let Some(last) = merged.last_mut() {
                if last.rest == pair.rest {
                    let combined = &last.coeff + &pair.coeff;
                    last.coeff = combined;
                    continue;
                }
            }
            merged.push(pair);
        }

        let mut out = Vec::with_capacity(merged.len());
        for pair in merged {
            Self::settle_pair(kind, pair, &mut out, coeff);
        }
        out
    }

    /// Settles one combined pair: drops it if the coefficient is the
    /// identity, folds numeric rests into the residual when their power or
    /// multiple is exact, and reduces a numeric rest's rational exponent
    /// into `[0, 1)` by peeling the exactly computable part off into the
    /// residual (so `2^(3/2)` and `2 * 2^(1/2)` normalize identically).
    fn settle_pair(kind: SeqKind, pair: Pair, out: &mut Vec<Pair>, coeff: &mut Numeric) {
        if pair.coeff.is_zero() {
            return;
        }

        let n = match pair.rest.kind() {
            ExprKind::Num(n) => n.clone(),
            _ => {
                out.push(pair);
                return;
            },
        };

        match kind {
            SeqKind::Add => {
                *coeff = &*coeff + &(&n * &pair.coeff);
            },
            SeqKind::Mul => {
                if let Some(value) = n.checked_pow(&pair.coeff) {
                    *coeff = &*coeff * &value;
                    return;
                }
                if n.is_rational() && pair.coeff.is_rational() && !pair.coeff.is_integer() {
                    if let Some((q, frac)) = pair.coeff.floor_split() {
                        if !q.is_zero() {
                            if let Some(scale) = n.checked_pow(&q) {
                                *coeff = &*coeff * &scale;
                                out.push(Pair::new(pair.rest, frac));
                                return;
                            }
                        }
                    }
                }
                out.push(pair);
            },
        }
    }

    /// Recognizes the degenerate results and wraps everything else in an
    /// [`Expr`] handle, after which the sequence is immutable.
    fn publish(kind: SeqKind, seq: Vec<Pair>, coeff: Numeric) -> Expr {
        if kind == SeqKind::Mul && coeff.is_zero() {
            // a zero factor annihilates the whole product
            return Expr::num(Numeric::zero());
        }
        if seq.is_empty() {
            return Expr::num(coeff);
        }
        if seq.len() == 1 {
            if coeff == kind.identity() {
                return Self::recombine(kind, &seq[0]);
            }
            // a numeric multiple of a sum distributes over its terms, so
            // `3*(x+y)` and `3*x + 3*y` share one canonical form
            if kind == SeqKind::Mul && seq[0].coeff.is_one() {
                if let ExprKind::Seq(inner) = seq[0].rest.kind() {
                    if inner.kind == SeqKind::Add {
                        let pairs = inner
                            .seq
                            .iter()
                            .map(|p| Pair::new(p.rest.clone(), &p.coeff * &coeff))
                            .collect();
                        let residual = &inner.coeff * &coeff;
                        return Self::from_pairs(SeqKind::Add, pairs, residual);
                    }
                }
            }
        }

        let seq = PairSeq { kind, seq, coeff };
        debug_assert!(seq.is_canonical());
        Expr::from_kind(ExprKind::Seq(seq))
    }

    /// Merges two canonical same-kind sequences with a stable two-pointer
    /// merge: O(n + m), no resort.
    fn merge_seqs(kind: SeqKind, a: &PairSeq, b: &PairSeq) -> Expr {
        let mut seq = Vec::with_capacity(a.seq.len() + b.seq.len());
        let (mut i, mut j) = (0, 0);
        while i < a.seq.len() && j < b.seq.len() {
            match a.seq[i].rest.cmp(&b.seq[j].rest) {
                Ordering::Less => {
                    seq.push(a.seq[i].clone());
                    i += 1;
                },
                Ordering::Greater => {
                    seq.push(b.seq[j].clone());
                    j += 1;
                },
                Ordering::Equal => {
                    seq.push(Pair::new(
                        a.seq[i].rest.clone(),
                        &a.seq[i].coeff + &b.seq[j].coeff,
                    ));
                    i += 1;
                    j += 1;
                },
            }
        }
        seq.extend_from_slice(&a.seq[i..]);
        seq.extend_from_slice(&b.seq[j..]);

        let mut coeff = a.coeff.clone();
        kind.absorb(&mut coeff, &b.coeff);
        Self::finish_presorted(kind, seq, coeff)
    }

    /// Merges one operand into a canonical sequence: numbers fold into the
    /// residual, everything else is split and inserted by binary search.
    fn merge_with(kind: SeqKind, s: &PairSeq, e: &Expr) -> Expr {
        if let ExprKind::Num(n) = e.kind() {
            let mut coeff = s.coeff.clone();
            kind.absorb(&mut coeff, n);
            return Self::publish(kind, s.seq.clone(), coeff);
        }

        let pair = Self::split(kind, e);
        let mut seq = s.seq.clone();
        match seq.binary_search_by(|q| q.rest.cmp(&pair.rest)) {
            Ok(idx) => {
                let combined = &seq[idx].coeff + &pair.coeff;
                seq[idx].coeff = combined;
            },
            Err(idx) => seq.insert(idx, pair),
        }
        Self::finish_presorted(kind, seq, s.coeff.clone())
    }
}

impl fmt::Display for PairSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SeqKind::Add => {
                for (i, pair) in self.seq.iter().enumerate() {
                    let negative = pair.coeff.is_negative();
                    if i == 0 {
                        if negative {
                            write!(f, "-")?;
                        }
                    } else if negative {
                        write!(f, " - ")?;
                    } else {
                        write!(f, " + ")?;
                    }

                    let magnitude = pair.coeff.abs();
                    if magnitude.is_one() {
                        pair.rest.fmt_at(f, crate::expr::PREC_MUL)?;
                    } else {
                        write!(f, "{}*", magnitude)?;
                        pair.rest.fmt_at(f, crate::expr::PREC_MUL)?;
                    }
                }

                if !self.coeff.is_zero() {
                    if self.coeff.is_negative() {
                        write!(f, " - {}", self.coeff.abs())?;
                    } else {
                        write!(f, " + {}", self.coeff)?;
                    }
                }
                Ok(())
            },
            SeqKind::Mul => {
                if self.coeff.is_minus_one() {
                    write!(f, "-")?;
                } else if !self.coeff.is_one() {
                    write!(f, "{}*", self.coeff)?;
                }

                for (i, pair) in self.seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    if pair.coeff.is_one() {
                        pair.rest.fmt_at(f, crate::expr::PREC_MUL + 1)?;
                    } else {
                        pair.rest.fmt_at(f, crate::expr::PREC_POW + 1)?;
                        write!(f, "^")?;
                        if pair.coeff.is_integer() && !pair.coeff.is_negative() {
                            write!(f, "{}", pair.coeff)?;
                        } else {
                            write!(f, "({})", pair.coeff)?;
                        }
                    }
                }
                Ok(())
            },
        }
    }
}
