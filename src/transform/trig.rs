//! Trigonometric identities: Euler's formula, parity of sin/cos and exact
//! values at zero.

use std::sync::Arc;

use crate::core::edits::clone_expr;
use crate::core::queries::st_eq;
use crate::core::{Constant, Econ, Expr, ExprKind, FunctionName, ISym, ISymKind, Rational};
use crate::error::{CasError, CasResult, ensure};

use super::base::product;
use super::{Arity, Transformation, transform};

const EULER: &str = "euler";
const EULER_CONTRACT: &str = "euler_contract";
const SIGN: &str = "sign";
const EVALUATE: &str = "evaluate";

/// `e^(i·θ) -> cos θ + i·sin θ`, `e^(-1·i·θ) -> cos θ + (-1)·i·sin θ`
pub fn euler(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Pow { base, exp } = &expr.kind else {
        return Err(CasError::invalid(EULER, "expected a power"));
    };
    ensure!(base.is_constant(Constant::E), EULER, "base is not e");
    let ExprKind::Mul { subs, .. } = &exp.kind else {
        return Err(CasError::invalid(EULER, "exponent is not a product"));
    };

    let (negated, theta) = match subs.as_slice() {
        [i, rest @ ..] if i.is_constant(Constant::I) && !rest.is_empty() => (false, rest),
        [m, i, rest @ ..] if m.is_neg_one() && i.is_constant(Constant::I) && !rest.is_empty() => {
            (true, rest)
        }
        _ => return Err(CasError::invalid(EULER, "exponent is not i·θ or -1·i·θ")),
    };
    let theta = product(theta.to_vec());
    let cos = Expr::function(FunctionName::Cos, clone_expr(&theta));
    let sin = Expr::function(FunctionName::Sin, theta);
    let mut imaginary = Vec::with_capacity(3);
    if negated {
        imaginary.push(Expr::neg_one());
    }
    imaginary.push(Expr::i());
    imaginary.push(sin);
    Ok(Expr::add([cos, Expr::mul(imaginary)]))
}

/// The inverse of [`euler`]: `cos θ + i·sin θ -> e^(i·θ)`
pub fn euler_contract(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Add(subs) = &expr.kind else {
        return Err(CasError::invalid(EULER_CONTRACT, "expected a sum"));
    };
    let [cos, imaginary] = subs.as_slice() else {
        return Err(CasError::invalid(EULER_CONTRACT, "expected two terms"));
    };
    let ExprKind::SpecialFunction { name: FunctionName::Cos, arg: theta } = &cos.kind else {
        return Err(CasError::invalid(EULER_CONTRACT, "first term is not a cosine"));
    };
    let ExprKind::Mul { subs: factors, .. } = &imaginary.kind else {
        return Err(CasError::invalid(EULER_CONTRACT, "second term is not a product"));
    };
    let (negated, sin) = match factors.as_slice() {
        [i, sin] if i.is_constant(Constant::I) => (false, sin),
        [m, i, sin] if m.is_neg_one() && i.is_constant(Constant::I) => (true, sin),
        _ => return Err(CasError::invalid(EULER_CONTRACT, "second term is not ±i·sin θ")),
    };
    let ExprKind::SpecialFunction { name: FunctionName::Sin, arg: sin_arg } = &sin.kind else {
        return Err(CasError::invalid(EULER_CONTRACT, "second term is not ±i·sin θ"));
    };
    ensure!(st_eq(theta, sin_arg), EULER_CONTRACT, "sine and cosine arguments differ");

    let mut exp = Vec::new();
    if negated {
        exp.push(Arc::new(Expr::neg_one()));
    }
    exp.push(Arc::new(Expr::i()));
    match &theta.kind {
        ExprKind::Mul { subs, .. } => exp.extend(subs.iter().cloned()),
        _ => exp.push(Arc::clone(theta)),
    }
    Ok(Expr::pow(Expr::e(), Expr::mul(exp)))
}

/// `sin(-1·θ) -> (-1)·sin θ`, `cos(-1·θ) -> cos θ`
pub fn sign(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::SpecialFunction { name, arg } = &expr.kind else {
        return Err(CasError::invalid(SIGN, "expected a function application"));
    };
    let ExprKind::Mul { subs, .. } = &arg.kind else {
        return Err(CasError::invalid(SIGN, "argument is not a product"));
    };
    let Some((first, rest)) = subs.split_first() else {
        return Err(CasError::invalid(SIGN, "empty product"));
    };
    ensure!(first.is_neg_one(), SIGN, "argument has no -1 factor");
    let theta = product(rest.to_vec());
    match name {
        FunctionName::Sin => Ok(Expr::mul([
            Expr::neg_one(),
            Expr::function(FunctionName::Sin, theta),
        ])),
        FunctionName::Cos => Ok(Expr::function_at(expr.uid(), FunctionName::Cos, theta)),
        other => Err(CasError::invalid(
            SIGN,
            format!("no parity rule for {}", other.name()),
        )),
    }
}

/// Exact values at zero; `arcsin 0` becomes the sequence `{n·π}` over a
/// fresh context index `n`
pub fn evaluate(econ: &Econ) -> CasResult<Econ> {
    let expr = &econ.expr;
    let ExprKind::SpecialFunction { name, arg } = &expr.kind else {
        return Err(CasError::invalid(EVALUATE, "expected a function application"));
    };
    ensure!(arg.is_zero(), EVALUATE, "argument is not 0");
    let at_root = |value: Rational| Ok(econ.with_expr(Expr::rational_at(expr.uid(), value)));
    match name {
        FunctionName::Sin | FunctionName::Tan => at_root(Rational::zero()),
        FunctionName::Cos => at_root(Rational::one()),
        FunctionName::Arcsin => {
            let n = ISym::new("n", ISymKind::Context);
            let elem = Expr::mul([n.to_expr(), Expr::pi()]);
            let seq = Expr::sequence_at(expr.uid(), elem, n.suid);
            let mut isyms = econ.isyms.clone();
            isyms.push(n);
            Ok(Econ::new(seq, isyms))
        }
        other => Err(CasError::invalid(
            EVALUATE,
            format!("no exact value of {} at 0", other.name()),
        )),
    }
}

transform!(Euler, EULER, Trig, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(euler(&econ.expr)?))
});

transform!(EulerContract, EULER_CONTRACT, Trig, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(euler_contract(&econ.expr)?))
});

transform!(Sign, SIGN, Trig, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(sign(&econ.expr)?))
});

transform!(Evaluate, EVALUATE, Trig, Arity::NONE, |econ, _args| { evaluate(econ) });

pub(crate) fn transforms() -> Vec<Arc<dyn Transformation>> {
    vec![
        Arc::new(Euler),
        Arc::new(EulerContract),
        Arc::new(Sign),
        Arc::new(Evaluate),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SymbolTable;

    #[test]
    fn test_euler_round_trip() {
        let mut isyms = SymbolTable::new();
        let x = isyms.push(ISym::real("x"));
        let pow = Expr::pow(Expr::e(), Expr::mul([Expr::i(), Expr::symbol(x)]));
        let expanded = euler(&pow).unwrap();
        let expected = Expr::add([
            Expr::function(FunctionName::Cos, Expr::symbol(x)),
            Expr::mul([Expr::i(), Expr::function(FunctionName::Sin, Expr::symbol(x))]),
        ]);
        assert!(st_eq(&expanded, &expected));
        assert!(st_eq(&euler_contract(&expanded).unwrap(), &pow));
    }

    #[test]
    fn test_euler_needs_imaginary_exponent() {
        let pow = Expr::pow(Expr::e(), Expr::mul([Expr::integer(2), Expr::pi()]));
        assert!(euler(&pow).unwrap_err().is_invalid_operation());
    }

    #[test]
    fn test_sign_rules() {
        let theta = Expr::mul([Expr::neg_one(), Expr::pi()]);
        let sin = sign(&Expr::function(FunctionName::Sin, theta.clone())).unwrap();
        assert!(st_eq(
            &sin,
            &Expr::mul([Expr::neg_one(), Expr::function(FunctionName::Sin, Expr::pi())])
        ));
        let cos = sign(&Expr::function(FunctionName::Cos, theta)).unwrap();
        assert!(st_eq(&cos, &Expr::function(FunctionName::Cos, Expr::pi())));
    }

    #[test]
    fn test_arcsin_zero_is_a_sequence() {
        let expr = Expr::function(FunctionName::Arcsin, Expr::zero());
        let out = evaluate(&Econ::bare(expr.clone())).unwrap();
        assert_eq!(out.expr.uid(), expr.uid());
        let ExprKind::InfiniteSequence { index, .. } = out.expr.kind() else {
            panic!("expected a sequence");
        };
        let n = out.isyms.resolve(*index).unwrap();
        assert!(matches!(n.kind, ISymKind::Context));
    }

    #[test]
    fn test_sin_zero() {
        let expr = Expr::function(FunctionName::Sin, Expr::zero());
        let out = evaluate(&Econ::bare(expr.clone())).unwrap();
        assert!(out.expr.is_zero());
        assert_eq!(out.expr.uid(), expr.uid());
    }
}
