//! Equation manipulation: isolate a subterm, move a term or factor across `=`.

use std::sync::Arc;

use crate::core::queries::path_to;
use crate::core::{Expr, ExprKind, FunctionName};
use crate::error::{CasError, CasResult, ensure};

use super::base::{product, with_subs};
use super::{Arity, Transformation, index_of_uid, transform};

const SOLVE: &str = "solve";
const MOVE_TERM: &str = "move_term";
const MOVE_FACTOR: &str = "move_factor";

fn expect_equal<'a>(expr: &'a Expr, name: &'static str) -> CasResult<(&'a Arc<Expr>, &'a Arc<Expr>)> {
    match &expr.kind {
        ExprKind::Equal { left, right } => Ok((left, right)),
        _ => Err(CasError::invalid(name, "expected an equation")),
    }
}

fn sum(terms: Vec<Arc<Expr>>) -> Expr {
    match terms.len() {
        1 => (*terms[0]).clone(),
        _ => Expr::add(terms),
    }
}

/// Isolate `target` on the left-hand side.
///
/// Walks from the left root down to `target`, moving each enclosing
/// operator to the right-hand side as its inverse.
pub fn solve(expr: &Expr, target: &Expr) -> CasResult<Expr> {
    let (left, right) = expect_equal(expr, SOLVE)?;
    let path = path_to(left, target.uid())
        .ok_or_else(|| CasError::invalid(SOLVE, "target is not on the left-hand side"))?;

    let mut rhs = Arc::clone(right);
    for pair in path.windows(2) {
        let (node, child) = (pair[0], pair[1]);
        let inverted = match &node.kind {
            ExprKind::Mul { subs, .. } | ExprKind::Add(subs) => {
                let rest: Vec<Arc<Expr>> = subs
                    .iter()
                    .filter(|s| s.uid() != child.uid())
                    .cloned()
                    .collect();
                ensure!(!rest.is_empty(), SOLVE, "operator has no other operands");
                if node.is_mul() {
                    Expr::fraction(rhs, product(rest))
                } else {
                    let negated = Expr::mul([Arc::new(Expr::neg_one()), Arc::new(sum(rest))]);
                    Expr::add([rhs, Arc::new(negated)])
                }
            }
            ExprKind::SpecialFunction { name, .. } => {
                let inverse = match name {
                    FunctionName::Sin => FunctionName::Arcsin,
                    FunctionName::Cos => FunctionName::Arccos,
                    other => {
                        return Err(CasError::invalid(
                            SOLVE,
                            format!("{} has no registered inverse", other.name()),
                        ));
                    }
                };
                Expr::function(inverse, rhs)
            }
            ExprKind::Pow { base, exp } => {
                ensure!(
                    base.uid() == child.uid(),
                    SOLVE,
                    "cannot solve for a term inside an exponent"
                );
                Expr::pow(rhs, Expr::inverse(Arc::clone(exp)))
            }
            ExprKind::Fraction { num, den } => {
                if num.uid() == child.uid() {
                    Expr::mul([rhs, Arc::clone(den)])
                } else {
                    Expr::mul([Arc::new(Expr::inverse(rhs)), Arc::clone(num)])
                }
            }
            _ => {
                return Err(CasError::invalid(
                    SOLVE,
                    format!("cannot invert a {} node", node.node_kind().name()),
                ));
            }
        };
        rhs = Arc::new(inverted);
    }

    let isolated = path.last().map_or_else(|| (**left).clone(), |n| (*n).clone());
    Ok(Expr::equal_at(expr.uid(), isolated, rhs))
}

/// Operands of `side` other than the one carrying `moved`'s uid, if `side`
/// is of the wanted kind and holds it
fn without_operand(side: &Expr, moved: &Expr, want_add: bool) -> Option<Vec<Arc<Expr>>> {
    let subs = match (&side.kind, want_add) {
        (ExprKind::Add(subs), true) | (ExprKind::Mul { subs, .. }, false) => subs,
        _ => return None,
    };
    let idx = index_of_uid(subs, moved.uid())?;
    let mut rest = subs.clone();
    rest.remove(idx);
    Some(rest)
}

/// Move a whole side, or one term of a sum side, to the other side
pub fn move_term(expr: &Expr, moved: &Expr) -> CasResult<Expr> {
    let (left, right) = expect_equal(expr, MOVE_TERM)?;
    let uid = expr.uid();
    if left.uid() == moved.uid() {
        return Ok(Expr::equal_at(uid, Expr::zero(), Expr::minus(Arc::clone(right), Arc::clone(left))));
    }
    if right.uid() == moved.uid() {
        return Ok(Expr::equal_at(uid, Expr::minus(Arc::clone(left), Arc::clone(right)), Expr::zero()));
    }
    let remaining = |side: &Expr, rest: Vec<Arc<Expr>>| match rest.len() {
        0 => Expr::zero(),
        _ => with_subs(side, rest),
    };
    if let Some(rest) = without_operand(left, moved, true) {
        return Ok(Expr::equal_at(
            uid,
            remaining(&**left, rest),
            Expr::minus(Arc::clone(right), moved.clone()),
        ));
    }
    if let Some(rest) = without_operand(right, moved, true) {
        return Ok(Expr::equal_at(
            uid,
            Expr::minus(Arc::clone(left), moved.clone()),
            remaining(&**right, rest),
        ));
    }
    Err(CasError::invalid(MOVE_TERM, "term is not a side or a summand of a side"))
}

/// Move a whole side, or one factor of a product side, to the other side
pub fn move_factor(expr: &Expr, moved: &Expr) -> CasResult<Expr> {
    let (left, right) = expect_equal(expr, MOVE_FACTOR)?;
    let uid = expr.uid();
    if left.uid() == moved.uid() {
        return Ok(Expr::equal_at(uid, Expr::one(), Expr::fraction(Arc::clone(right), Arc::clone(left))));
    }
    if right.uid() == moved.uid() {
        return Ok(Expr::equal_at(uid, Expr::fraction(Arc::clone(left), Arc::clone(right)), Expr::one()));
    }
    let remaining = |side: &Expr, rest: Vec<Arc<Expr>>| match rest.len() {
        0 => Expr::one(),
        _ => with_subs(side, rest),
    };
    if let Some(rest) = without_operand(left, moved, false) {
        return Ok(Expr::equal_at(
            uid,
            remaining(&**left, rest),
            Expr::fraction(Arc::clone(right), moved.clone()),
        ));
    }
    if let Some(rest) = without_operand(right, moved, false) {
        return Ok(Expr::equal_at(
            uid,
            Expr::fraction(Arc::clone(left), moved.clone()),
            remaining(&**right, rest),
        ));
    }
    Err(CasError::invalid(MOVE_FACTOR, "factor is not a side or a factor of a side"))
}

transform!(Solve, SOLVE, Equal, Arity::Fixed(1), |econ, args| {
    Ok(econ.with_expr(solve(&econ.expr, &args[0])?))
});

transform!(MoveTerm, MOVE_TERM, Equal, Arity::Fixed(1), |econ, args| {
    Ok(econ.with_expr(move_term(&econ.expr, &args[0])?))
});

transform!(MoveFactor, MOVE_FACTOR, Equal, Arity::Fixed(1), |econ, args| {
    Ok(econ.with_expr(move_factor(&econ.expr, &args[0])?))
});

pub(crate) fn transforms() -> Vec<Arc<dyn Transformation>> {
    vec![Arc::new(Solve), Arc::new(MoveTerm), Arc::new(MoveFactor)]
}
