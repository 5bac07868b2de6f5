//! Squared norms and conjugate products.

use std::sync::Arc;

use crate::core::edits::clone_expr;
use crate::core::queries::st_eq;
use crate::core::{Expr, ExprKind, Rational};
use crate::error::{CasError, CasResult, ensure};

use super::{Arity, Transformation, transform};

const TO_MUL: &str = "to_mul";
const TO_SQUARE: &str = "to_square";

/// `‖x‖² -> conj(x)·x`
pub fn to_mul(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Pow { base, exp } = &expr.kind else {
        return Err(CasError::invalid(TO_MUL, "expected a power"));
    };
    ensure!(
        exp.as_rational() == Some(&Rational::integer(2)),
        TO_MUL,
        "exponent is not 2"
    );
    let ExprKind::Norm(sub) = &base.kind else {
        return Err(CasError::invalid(TO_MUL, "base is not a norm"));
    };
    Ok(Expr::mul_at(
        expr.uid(),
        [Expr::conjugate(clone_expr(sub)), clone_expr(sub)],
    ))
}

/// `conj(x)·x -> ‖x‖²`
pub fn to_square(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Mul { subs, .. } = &expr.kind else {
        return Err(CasError::invalid(TO_SQUARE, "expected a product"));
    };
    let [conj, x] = subs.as_slice() else {
        return Err(CasError::invalid(TO_SQUARE, "expected exactly two factors"));
    };
    let ExprKind::ComplexConjugate(sub) = &conj.kind else {
        return Err(CasError::invalid(TO_SQUARE, "first factor is not a conjugate"));
    };
    ensure!(st_eq(sub, x), TO_SQUARE, "factors are not conjugates of each other");
    Ok(Expr::pow_at(
        expr.uid(),
        Expr::norm(Arc::clone(sub)),
        Expr::integer(2),
    ))
}

transform!(ToMul, TO_MUL, Norm, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(to_mul(&econ.expr)?))
});

transform!(ToSquare, TO_SQUARE, Norm, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(to_square(&econ.expr)?))
});

pub(crate) fn transforms() -> Vec<Arc<dyn Transformation>> {
    vec![Arc::new(ToMul), Arc::new(ToSquare)]
}
