//! Linear systems: between a group of equations and `A·v = b` matrix form.

use std::sync::Arc;

use crate::core::edits::{clone_expr, coeff_of};
use crate::core::{Expr, ExprKind};
use crate::error::{CasError, CasResult, ensure};

use super::{Arity, Transformation, transform};

const TO_GROUP: &str = "to_group";
const TO_MATRIX: &str = "to_matrix";

fn column(expr: &Expr) -> Option<Vec<&Arc<Expr>>> {
    let rows = expr.rows()?;
    rows.iter()
        .map(|row| match row.as_slice() {
            [entry] => Some(entry),
            _ => None,
        })
        .collect()
}

/// `[l1; l2; ...] = [r1; r2; ...]` -> `{l1 = r1, l2 = r2, ...}`
pub fn to_group(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Equal { left, right } = &expr.kind else {
        return Err(CasError::invalid(TO_GROUP, "expected an equation"));
    };
    let (Some(lhs), Some(rhs)) = (column(left), column(right)) else {
        return Err(CasError::invalid(TO_GROUP, "both sides must be column vectors"));
    };
    ensure!(lhs.len() == rhs.len(), TO_GROUP, "column vectors differ in length");
    Ok(Expr::group(
        lhs.into_iter()
            .zip(rhs)
            .map(|(l, r)| Expr::equal(Arc::clone(l), Arc::clone(r))),
    ))
}

/// `{Σ a_ij·v_j = b_i}` -> `A · [v] = [b]`, reading each coefficient off the
/// sum terms of the left-hand sides
pub fn to_matrix(expr: &Expr, vars: &[Expr]) -> CasResult<Expr> {
    let ExprKind::Group(equations) = &expr.kind else {
        return Err(CasError::invalid(TO_MATRIX, "expected a group of equations"));
    };
    ensure!(
        vars.len() == equations.len(),
        TO_MATRIX,
        "{} unknowns selected for {} equations",
        vars.len(),
        equations.len()
    );

    let mut coeffs = Vec::with_capacity(equations.len());
    let mut rhs = Vec::with_capacity(equations.len());
    for eq in equations {
        let ExprKind::Equal { left, right } = &eq.kind else {
            return Err(CasError::invalid(TO_MATRIX, "every member must be an equation"));
        };
        let ExprKind::Add(terms) = &left.kind else {
            return Err(CasError::invalid(TO_MATRIX, "left-hand side must be a sum"));
        };
        let row: Vec<Arc<Expr>> = vars
            .iter()
            .map(|var| {
                Arc::new(Expr::add(
                    terms.iter().map(|term| clone_expr(&coeff_of(term, var))),
                ))
            })
            .collect();
        coeffs.push(row);
        rhs.push(vec![Arc::clone(right)]);
    }

    let vector = vars.iter().map(|v| vec![clone_expr(v)]);
    Ok(Expr::equal(
        Expr::mul([Expr::matrix(coeffs), Expr::matrix(vector)]),
        Expr::matrix(rhs),
    ))
}

transform!(ToGroup, TO_GROUP, Linear, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(to_group(&econ.expr)?))
});

transform!(ToMatrix, TO_MATRIX, Linear, Arity::Variadic, |econ, args| {
    Ok(econ.with_expr(to_matrix(&econ.expr, args)?))
});

pub(crate) fn transforms() -> Vec<Arc<dyn Transformation>> {
    vec![Arc::new(ToGroup), Arc::new(ToMatrix)]
}
