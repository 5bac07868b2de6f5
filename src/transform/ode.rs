//! Constant-coefficient second-order homogeneous linear ODEs.

use std::sync::Arc;

use crate::core::edits::{clone_expr, replace_symbol_node};
use crate::core::{Econ, Expr, ExprKind, ISym, ISymKind, Suid, SymbolTable};
use crate::error::{CasError, CasResult, ensure};

use super::base::product;
use super::{Arity, Transformation, transform};

const SOLVE: &str = "solve";
const APPLY_BOUNDARY: &str = "apply_boundary";

/// The single variable of a one-argument function symbol
fn sole_variable(isyms: &SymbolTable, function: Suid, name: &'static str) -> CasResult<Suid> {
    match &isyms.resolve(function)?.kind {
        ISymKind::Function { vars, .. } => match vars.as_slice() {
            [x] => Ok(*x),
            _ => Err(CasError::invalid(name, "function must take exactly one variable")),
        },
        _ => Err(CasError::invalid(name, "expected a function symbol")),
    }
}

/// `c2 · y'' = c · y` -> `y = C1·e^(λx) + C2·e^(-λx)` with `λ = √(c / c2)`
pub fn solve(econ: &Econ) -> CasResult<Econ> {
    let ExprKind::Equal { left, right } = &econ.expr.kind else {
        return Err(CasError::invalid(SOLVE, "expected an equation"));
    };
    let (ExprKind::Mul { subs: lhs, .. }, ExprKind::Mul { subs: rhs, .. }) = (&left.kind, &right.kind)
    else {
        return Err(CasError::invalid(SOLVE, "both sides must be products"));
    };
    let (Some((derivative, lhs_coeff)), Some((y, rhs_coeff))) = (lhs.split_last(), rhs.split_last())
    else {
        return Err(CasError::invalid(SOLVE, "empty product"));
    };
    let ExprKind::Derivative { func, order, .. } = &derivative.kind else {
        return Err(CasError::invalid(SOLVE, "left-hand side must end in a derivative"));
    };
    ensure!(*order == 2, SOLVE, "derivative must be of second order");
    let (ExprKind::Symbol(f), ExprKind::Symbol(g)) = (&func.kind, &y.kind) else {
        return Err(CasError::invalid(SOLVE, "expected the unknown function on both sides"));
    };
    ensure!(f == g, SOLVE, "both sides must refer to the same function");
    let x = sole_variable(&econ.isyms, *f, SOLVE)?;
    ensure!(
        matches!(econ.isyms.resolve(x)?.kind, ISymKind::Variable { .. }),
        SOLVE,
        "independent variable must be a variable"
    );

    let c2 = product(lhs_coeff.to_vec());
    let mut c0 = vec![Arc::new(Expr::neg_one())];
    c0.extend(rhs_coeff.iter().cloned());
    let lambda = Expr::sqrt(Expr::mul([
        Expr::neg_one(),
        Expr::fraction(Expr::mul(c0), c2),
    ]));

    let a = ISym::new("C_{1}", ISymKind::GeneratedConstant);
    let b = ISym::new("C_{2}", ISymKind::GeneratedConstant);
    let growing = Expr::mul([
        a.to_expr(),
        Expr::pow(Expr::e(), Expr::mul([clone_expr(&lambda), Expr::symbol(x)])),
    ]);
    let decaying = Expr::mul([
        b.to_expr(),
        Expr::pow(
            Expr::e(),
            Expr::mul([Expr::neg_one(), lambda, Expr::symbol(x)]),
        ),
    ]);

    let mut isyms = econ.isyms.clone();
    isyms.push(a);
    isyms.push(b);
    Ok(Econ::new(
        Expr::equal(Expr::symbol(*f), Expr::add([growing, decaying])),
        isyms,
    ))
}

/// `{y = g(x), y = {v0 if x = x0, v1 if x = x1}}` -> `{g(x0) = v0, g(x1) = v1}`
pub fn apply_boundary(econ: &Econ) -> CasResult<Econ> {
    let ExprKind::Group(members) = &econ.expr.kind else {
        return Err(CasError::invalid(APPLY_BOUNDARY, "expected a group"));
    };
    let [general, conditions] = members.as_slice() else {
        return Err(CasError::invalid(
            APPLY_BOUNDARY,
            "expected a general solution and a boundary condition",
        ));
    };
    let (
        ExprKind::Equal { left: fn_sym, right: solution },
        ExprKind::Equal { right: cases, .. },
    ) = (&general.kind, &conditions.kind)
    else {
        return Err(CasError::invalid(APPLY_BOUNDARY, "both members must be equations"));
    };
    let ExprKind::Symbol(f) = fn_sym.kind else {
        return Err(CasError::invalid(APPLY_BOUNDARY, "general solution must define a function"));
    };
    let x = sole_variable(&econ.isyms, f, APPLY_BOUNDARY)?;
    let ExprKind::Cases(branches) = &cases.kind else {
        return Err(CasError::invalid(APPLY_BOUNDARY, "boundary condition must be a cases node"));
    };
    ensure!(branches.len() == 2, APPLY_BOUNDARY, "expected two boundary values");

    let equations = branches
        .iter()
        .map(|branch| {
            let ExprKind::Equal { right: at, .. } = &branch.cond.kind else {
                return Err(CasError::invalid(APPLY_BOUNDARY, "conditions must be equations"));
            };
            let substituted = replace_symbol_node(solution, x, || clone_expr(at));
            Ok(Expr::equal(clone_expr(&substituted), Arc::clone(&branch.expr)))
        })
        .collect::<CasResult<Vec<_>>>()?;
    Ok(econ.with_expr(Expr::group(equations)))
}

transform!(Solve, SOLVE, Ode, Arity::NONE, |econ, _args| { solve(econ) });

transform!(ApplyBoundary, APPLY_BOUNDARY, Ode, Arity::NONE, |econ, _args| {
    apply_boundary(econ)
});

pub(crate) fn transforms() -> Vec<Arc<dyn Transformation>> {
    vec![Arc::new(Solve), Arc::new(ApplyBoundary)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::queries::{find_all_of_kind, validate_econ};
    use crate::core::NodeKind;

    fn oscillator() -> (Econ, Suid, Suid) {
        let mut isyms = SymbolTable::new();
        let x = isyms.push(ISym::real("x"));
        let y = isyms.push(ISym::function("y", vec![x]));
        // 1 · y'' = -4 · y
        let eq = Expr::equal(
            Expr::mul([
                Expr::one(),
                Expr::derivative(Expr::symbol(y), Expr::symbol(x), 2),
            ]),
            Expr::mul([Expr::integer(-4), Expr::symbol(y)]),
        );
        (Econ::new(eq, isyms), x, y)
    }

    #[test]
    fn test_solve_generates_two_constants() {
        let (econ, _, y) = oscillator();
        let out = solve(&econ).unwrap();
        assert_eq!(out.isyms.len(), econ.isyms.len() + 2);
        validate_econ(&out).unwrap();
        let ExprKind::Equal { left, right } = out.expr.kind() else {
            panic!("expected an equation");
        };
        assert!(left.is_symbol(y));
        assert_eq!(find_all_of_kind(right, NodeKind::Pow).len(), 4);
    }

    #[test]
    fn test_solve_rejects_first_order() {
        let (econ, x, y) = oscillator();
        let first_order = Expr::equal(
            Expr::mul([Expr::derivative(Expr::symbol(y), Expr::symbol(x), 1)]),
            Expr::mul([Expr::symbol(y)]),
        );
        let err = solve(&econ.with_expr(first_order)).unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_boundary_substitutes_both_points() {
        let (econ, x, y) = oscillator();
        let general = Expr::equal(
            Expr::symbol(y),
            Expr::mul([Expr::integer(3), Expr::symbol(x)]),
        );
        let at = |v: i64| Expr::equal(Expr::symbol(x), Expr::integer(v));
        let cond = Expr::equal(
            Expr::symbol(y),
            Expr::cases([(Expr::integer(0), at(0)), (Expr::integer(6), at(2))]),
        );
        let out = apply_boundary(&econ.with_expr(Expr::group([general, cond]))).unwrap();
        validate_econ(&out).unwrap();
        let members = out.expr.subs().unwrap();
        assert_eq!(members.len(), 2);
        assert!(find_all_of_kind(&out.expr, NodeKind::Symbol).is_empty());
    }
}
