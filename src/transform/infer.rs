//! Sign inference.
//!
//! `false` means "not provable", never "negative": the predicate only gates
//! rewrites that are unsound on negative input.

use crate::core::{Constant, Domain, Expr, ExprKind, ISymKind, Relation, SymbolTable};

/// Best-effort proof that `expr >= 0`
pub fn is_non_negative(expr: &Expr, isyms: &SymbolTable) -> bool {
    match expr.kind() {
        ExprKind::Rational(r) => r.is_non_negative(),
        ExprKind::SpecialConstant(c) => {
            matches!(c, Constant::E | Constant::Pi | Constant::Infinity)
        }
        ExprKind::Symbol(suid) => {
            let Some(isym) = isyms.get(*suid) else {
                return false;
            };
            match &isym.kind {
                ISymKind::NodeReplacement { replaced } => is_non_negative(replaced, isyms),
                _ => match isym.domain() {
                    Some(Domain::RealWhere(cond)) => bounded_below_by_non_negative(cond, expr, isyms),
                    _ => false,
                },
            }
        }
        ExprKind::Mul { subs, .. } => subs.iter().all(|s| is_non_negative(s, isyms)),
        ExprKind::Fraction { num, den } => {
            is_non_negative(num, isyms) && is_non_negative(den, isyms)
        }
        ExprKind::Pow { base, .. } => is_non_negative(base, isyms),
        _ => false,
    }
}

/// `cond` reads `symbol > r` or `symbol >= r` with `r` provably non-negative
fn bounded_below_by_non_negative(cond: &Expr, symbol: &Expr, isyms: &SymbolTable) -> bool {
    let ExprKind::Compare { first, rest } = cond.kind() else {
        return false;
    };
    let (ExprKind::Symbol(own), ExprKind::Symbol(bound)) = (symbol.kind(), first.kind()) else {
        return false;
    };
    match rest.as_slice() {
        [(Relation::Greater | Relation::GreaterEq, rhs)] => {
            own == bound && is_non_negative(rhs, isyms)
        }
        _ => false,
    }
}
