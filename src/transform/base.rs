//! Base rewrites: rational folding, like-term merging, fraction
//! normalization, trivial zero/one rules and symbol substitution.

use std::sync::Arc;

use crate::core::edits::{clone_expr, replace_node};
use crate::core::queries::{contains_uid, find_same_nodes};
use crate::core::{Econ, Expr, ExprKind, ISym, ISymKind, Rational, SymbolTable};
use crate::error::{CasError, CasResult, ensure};

use super::infer::is_non_negative;
use super::{Arity, StEqMap, Transformation, transform};

pub(crate) const REDUCE_RATIONAL: &str = "reduce_rational";
pub(crate) const FOLD_RATIONALS_IN_MUL: &str = "fold_rationals_in_mul";
pub(crate) const FOLD_RATIONALS_IN_ADD: &str = "fold_rationals_in_add";
pub(crate) const MERGE_LIKE_TERMS: &str = "merge_like_terms";
pub(crate) const DROP_UNIT_DENOMINATOR: &str = "drop_unit_denominator";
pub(crate) const EVALUATE_RATIONAL_FRACTION: &str = "evaluate_rational_fraction";
pub(crate) const FLATTEN_FRACTION: &str = "flatten_fraction";
pub(crate) const EXTRACT_NEGATIVE_SQRT: &str = "extract_negative_sqrt";
pub(crate) const ZERO_PRODUCT: &str = "zero_product";
pub(crate) const ZERO_EXPONENT: &str = "zero_exponent";
pub(crate) const FLIP_INVERSE: &str = "flip_inverse";
pub(crate) const MERGE_CONSECUTIVE_POWERS: &str = "merge_consecutive_powers";

/// Same node kind and uid with new subs; a Mul keeps its display flag
pub(crate) fn with_subs(expr: &Expr, subs: Vec<Arc<Expr>>) -> Expr {
    let kind = match &expr.kind {
        ExprKind::Mul {
            display_operator, ..
        } => ExprKind::Mul {
            subs,
            display_operator: *display_operator,
        },
        ExprKind::Group(_) => ExprKind::Group(subs),
        ExprKind::LogicOp { op, .. } => ExprKind::LogicOp { op: *op, subs },
        _ => ExprKind::Add(subs),
    };
    expr.with_kind(kind)
}

/// Fresh product of `factors`; a single factor is returned bare, none gives 1
pub(crate) fn product(factors: Vec<Arc<Expr>>) -> Expr {
    match factors.len() {
        0 => Expr::one(),
        1 => (*factors[0]).clone(),
        _ => Expr::mul(factors),
    }
}

fn mul_subs<'a>(expr: &'a Expr, name: &'static str) -> CasResult<&'a [Arc<Expr>]> {
    match &expr.kind {
        ExprKind::Mul { subs, .. } => Ok(subs),
        _ => Err(CasError::invalid(name, "expected a product")),
    }
}

fn add_subs<'a>(expr: &'a Expr, name: &'static str) -> CasResult<&'a [Arc<Expr>]> {
    match &expr.kind {
        ExprKind::Add(subs) => Ok(subs),
        _ => Err(CasError::invalid(name, "expected a sum")),
    }
}

// =============================================================================
// RATIONALS
// =============================================================================

pub fn reduce_rational(expr: &Expr) -> CasResult<Expr> {
    match expr.as_rational() {
        Some(r) => Ok(Expr::rational_at(expr.uid(), r.canonical())),
        None => Err(CasError::invalid(REDUCE_RATIONAL, "expected a rational number")),
    }
}

/// Fold the rational factors of a product into one leading coefficient
pub fn fold_rationals_in_mul(expr: &Expr) -> CasResult<Expr> {
    let subs = mul_subs(expr, FOLD_RATIONALS_IN_MUL)?;
    let (coeff, mut rest) = fold_rationals(subs, Rational::one(), Rational::mul);
    if rest.is_empty() {
        return Ok(Expr::rational_at(expr.uid(), coeff));
    }
    if !coeff.is_one() {
        rest.insert(0, Arc::new(Expr::from_rational(coeff)));
    }
    Ok(match rest.len() {
        1 => (*rest[0]).clone(),
        _ => with_subs(expr, rest),
    })
}

/// Fold the rational terms of a sum into one leading constant
pub fn fold_rationals_in_add(expr: &Expr) -> CasResult<Expr> {
    let subs = add_subs(expr, FOLD_RATIONALS_IN_ADD)?;
    let (sum, mut rest) = fold_rationals(subs, Rational::zero(), Rational::add);
    if rest.is_empty() {
        return Ok(Expr::rational_at(expr.uid(), sum));
    }
    if !sum.is_zero() {
        rest.insert(0, Arc::new(Expr::from_rational(sum)));
    }
    Ok(match rest.len() {
        1 => (*rest[0]).clone(),
        _ => with_subs(expr, rest),
    })
}

fn fold_rationals(
    subs: &[Arc<Expr>],
    init: Rational,
    op: fn(&Rational, &Rational) -> Rational,
) -> (Rational, Vec<Arc<Expr>>) {
    let mut acc = init;
    let mut rest = Vec::new();
    for sub in subs {
        match sub.as_rational() {
            Some(r) => acc = op(&acc, r),
            None => rest.push(Arc::clone(sub)),
        }
    }
    (acc, rest)
}

/// Split a term into its non-numeric part and rational coefficient
fn term_and_coeff(sub: &Expr) -> (Expr, Rational) {
    if let ExprKind::Mul { subs, .. } = &sub.kind
        && let Some(c) = subs.first().and_then(|s| s.as_rational())
    {
        return (product(subs[1..].to_vec()), c.clone());
    }
    (sub.clone(), Rational::one())
}

/// Merge structurally equal terms of a sum by adding their coefficients
pub fn merge_like_terms(expr: &Expr) -> CasResult<Expr> {
    let subs = add_subs(expr, MERGE_LIKE_TERMS)?;
    let mut terms: StEqMap<Rational> = StEqMap::default();
    for sub in subs {
        let (term, coeff) = term_and_coeff(sub);
        match terms.get_mut(&term) {
            Some(c) => *c = c.add(&coeff),
            None => terms.insert(term, coeff),
        }
    }
    let new_subs = terms
        .into_entries()
        .into_iter()
        .map(|(term, coeff)| {
            if coeff.is_one() {
                return Arc::new(term);
            }
            let mut factors = vec![Arc::new(Expr::from_rational(coeff))];
            match &term.kind {
                ExprKind::Mul { subs, .. } => factors.extend(subs.iter().cloned()),
                _ => factors.push(Arc::new(term)),
            }
            Arc::new(Expr::mul(factors))
        })
        .collect();
    Ok(with_subs(expr, new_subs))
}

// =============================================================================
// FRACTIONS
// =============================================================================

/// `x/1 -> x`, `x/(-1) -> (-1)·x`
pub fn drop_unit_denominator(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Fraction { num, den } = &expr.kind else {
        return Err(CasError::invalid(DROP_UNIT_DENOMINATOR, "expected a fraction"));
    };
    if den.is_one() {
        Ok((**num).clone())
    } else if den.is_neg_one() {
        Ok(Expr::mul([Arc::new(Expr::neg_one()), Arc::clone(num)]))
    } else {
        Err(CasError::invalid(DROP_UNIT_DENOMINATOR, "denominator is not 1 or -1"))
    }
}

/// Evaluate a fraction of two rationals
pub fn evaluate_rational_fraction(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Fraction { num, den } = &expr.kind else {
        return Err(CasError::invalid(EVALUATE_RATIONAL_FRACTION, "expected a fraction"));
    };
    if num.is_zero() {
        return Ok(Expr::zero());
    }
    let (Some(n), Some(d)) = (num.as_rational(), den.as_rational()) else {
        return Err(CasError::invalid(
            EVALUATE_RATIONAL_FRACTION,
            "numerator and denominator must be rational",
        ));
    };
    ensure!(!d.is_zero(), EVALUATE_RATIONAL_FRACTION, "division by zero");
    Ok(Expr::rational_at(expr.uid(), n.mul(&d.inverse())))
}

/// Collapse nested fractions into one numerator over one denominator and
/// cancel their rational coefficients
pub fn flatten_fraction(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Fraction { num, den } = &expr.kind else {
        return Err(CasError::invalid(FLATTEN_FRACTION, "expected a fraction"));
    };
    let num = match num.kind {
        ExprKind::Fraction { .. } => Arc::new(flatten_fraction(num)?),
        _ => Arc::clone(num),
    };
    let den = match den.kind {
        ExprKind::Fraction { .. } => Arc::new(flatten_fraction(den)?),
        _ => Arc::clone(den),
    };

    let mut num_factors = Vec::new();
    let mut den_factors = Vec::new();
    match &num.kind {
        ExprKind::Fraction { num: n, den: d } => {
            num_factors.push(Arc::clone(n));
            den_factors.push(Arc::clone(d));
        }
        _ => num_factors.push(Arc::clone(&num)),
    }
    match &den.kind {
        ExprKind::Fraction { num: n, den: d } => {
            num_factors.push(Arc::clone(d));
            den_factors.push(Arc::clone(n));
        }
        _ => den_factors.push(Arc::clone(&den)),
    }

    let mut new_num = fold_rationals_in_mul(&Expr::mul(num_factors))?;
    let mut new_den = fold_rationals_in_mul(&Expr::mul(den_factors))?;

    if let (ExprKind::Mul { subs: ns, .. }, ExprKind::Mul { subs: ds, .. }) =
        (&new_num.kind, &new_den.kind)
        && let (Some(nc), Some(dc)) = (ns[0].as_rational(), ds[0].as_rational())
    {
        let c = nc.mul(&dc.inverse());
        let mut factors = Vec::with_capacity(ns.len());
        if !c.is_one() || ns.len() == 1 {
            factors.push(Arc::new(Expr::from_rational(c)));
        }
        factors.extend(ns[1..].iter().cloned());
        let rest_den = ds[1..].to_vec();
        new_num = match factors.len() {
            1 => (*factors[0]).clone(),
            _ => Expr::mul_at(new_num.uid(), factors),
        };
        new_den = match rest_den.len() {
            0 => Expr::one(),
            1 => (*rest_den[0]).clone(),
            _ => Expr::mul_at(new_den.uid(), rest_den),
        };
    }

    Ok(Expr::fraction_at(expr.uid(), new_num, new_den).with_paren(expr.paren()))
}

// =============================================================================
// POWERS AND PRODUCTS
// =============================================================================

/// `√(-c·rest) -> i·√(c·rest)` for positive `c`, when `rest` is provably non-negative
pub fn extract_negative_sqrt(expr: &Expr, isyms: &SymbolTable) -> CasResult<Expr> {
    let ExprKind::Pow { base, exp } = &expr.kind else {
        return Err(CasError::invalid(EXTRACT_NEGATIVE_SQRT, "expected a power"));
    };
    ensure!(exp.is_half(), EXTRACT_NEGATIVE_SQRT, "exponent is not 1/2");
    match &base.kind {
        ExprKind::Rational(r) => {
            ensure!(r.is_negative(), EXTRACT_NEGATIVE_SQRT, "radicand is not negative");
            let positive = Expr::from_rational(r.neg());
            Ok(Expr::mul([Expr::i(), Expr::sqrt(positive)]))
        }
        ExprKind::Mul { subs, .. } => {
            let c = subs.first().and_then(|s| s.as_rational()).ok_or_else(|| {
                CasError::invalid(EXTRACT_NEGATIVE_SQRT, "product has no leading coefficient")
            })?;
            ensure!(c.is_negative(), EXTRACT_NEGATIVE_SQRT, "coefficient is not negative");
            ensure!(
                subs[1..].iter().all(|s| is_non_negative(s, isyms)),
                EXTRACT_NEGATIVE_SQRT,
                "remaining factors are not provably non-negative"
            );
            let mut factors = vec![Arc::new(Expr::from_rational(c.neg()))];
            factors.extend(subs[1..].iter().cloned());
            Ok(Expr::mul([Expr::i(), Expr::sqrt(Expr::mul(factors))]))
        }
        _ => Err(CasError::invalid(
            EXTRACT_NEGATIVE_SQRT,
            "radicand must be a rational or a product",
        )),
    }
}

pub fn zero_product(expr: &Expr) -> CasResult<Expr> {
    let subs = mul_subs(expr, ZERO_PRODUCT)?;
    ensure!(subs.iter().any(|s| s.is_zero()), ZERO_PRODUCT, "no zero factor");
    Ok(Expr::zero())
}

pub fn zero_exponent(expr: &Expr) -> CasResult<Expr> {
    match &expr.kind {
        ExprKind::Pow { exp, .. } if exp.is_zero() => Ok(Expr::rational_at(expr.uid(), Rational::one())),
        _ => Err(CasError::invalid(ZERO_EXPONENT, "expected a power with exponent 0")),
    }
}

/// `(p/q)^-1 -> q/p`, `(a/b)^-1 -> b/a`
pub fn flip_inverse(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Pow { base, exp } = &expr.kind else {
        return Err(CasError::invalid(FLIP_INVERSE, "expected a power"));
    };
    ensure!(exp.is_neg_one(), FLIP_INVERSE, "exponent is not -1");
    match &base.kind {
        ExprKind::Rational(r) if r.is_zero() => {
            Err(CasError::invalid(FLIP_INVERSE, "division by zero"))
        }
        ExprKind::Rational(r) => Ok(Expr::rational_at(
            expr.uid(),
            Rational::new(r.q.clone(), r.p.clone()),
        )),
        ExprKind::Fraction { num, den } => Ok(Expr::fraction_at(
            expr.uid(),
            Arc::clone(den),
            Arc::clone(num),
        )),
        _ => Err(CasError::invalid(FLIP_INVERSE, "base is not a rational or a fraction")),
    }
}

/// `x^a · x^b -> x^(a + b)` for adjacent factors with the same base
pub fn merge_consecutive_powers(expr: &Expr) -> CasResult<Expr> {
    let subs = mul_subs(expr, MERGE_CONSECUTIVE_POWERS)?;
    let mut new_subs = Vec::with_capacity(subs.len());
    let mut run: Option<(Arc<Expr>, Vec<Arc<Expr>>)> = None;

    let flush = |run: &mut Option<(Arc<Expr>, Vec<Arc<Expr>>)>, out: &mut Vec<Arc<Expr>>| {
        if let Some((base, mut exps)) = run.take() {
            let exp = if exps.len() > 1 {
                Arc::new(Expr::add(exps))
            } else {
                exps.remove(0)
            };
            out.push(Arc::new(Expr::pow(base, exp)));
        }
    };

    for sub in subs {
        match &sub.kind {
            ExprKind::Pow { base, exp } => {
                let same_base = matches!(&run, Some((prev, _)) if **prev == **base);
                match &mut run {
                    Some((_, exps)) if same_base => exps.push(Arc::clone(exp)),
                    _ => {
                        flush(&mut run, &mut new_subs);
                        run = Some((Arc::clone(base), vec![Arc::clone(exp)]));
                    }
                }
            }
            _ => {
                flush(&mut run, &mut new_subs);
                new_subs.push(Arc::clone(sub));
            }
        }
    }
    flush(&mut run, &mut new_subs);
    Ok(with_subs(expr, new_subs))
}

// =============================================================================
// SUBSTITUTION
// =============================================================================

/// `Group[f, l1 = r1, ...]`: replace every subtree of `f` equal to `li` by a copy of `ri`
pub fn replace(econ: &Econ) -> CasResult<Econ> {
    const NAME: &str = "replace";
    let ExprKind::Group(subs) = &econ.expr.kind else {
        return Err(CasError::invalid(NAME, "expected a group"));
    };
    ensure!(subs.len() > 1, NAME, "nothing to substitute");
    let mut f = (*subs[0]).clone();
    for rule in &subs[1..] {
        let ExprKind::Equal { left, right } = &rule.kind else {
            return Err(CasError::invalid(NAME, "substitutions must be equations"));
        };
        let targets: Vec<_> = find_same_nodes(&f, left).iter().map(|n| n.uid()).collect();
        for uid in targets {
            f = replace_node(&f, uid, &clone_expr(right));
        }
    }
    Ok(econ.with_expr(f))
}

/// A generated replacement symbol back to the subtree it stands for
pub fn restore_replacement(econ: &Econ) -> CasResult<Econ> {
    const NAME: &str = "restore_replacement";
    let ExprKind::Symbol(suid) = econ.expr.kind else {
        return Err(CasError::invalid(NAME, "expected a symbol"));
    };
    match &econ.isyms.resolve(suid)?.kind {
        ISymKind::NodeReplacement { replaced } => Ok(econ.with_expr(clone_expr(replaced))),
        _ => Err(CasError::invalid(NAME, "symbol does not stand for a subtree")),
    }
}

/// Replace `node` and every subtree equal to it by a new symbol `u`
pub fn replace_with_symbol(econ: &Econ, node: &Expr) -> CasResult<Econ> {
    const NAME: &str = "replace_with_symbol";
    ensure!(
        contains_uid(&econ.expr, node.uid()),
        NAME,
        "selected node is not in the expression"
    );
    let isym = ISym::new(
        "u",
        ISymKind::NodeReplacement {
            replaced: Arc::new(node.clone()),
        },
    );
    let mut expr = replace_node(&econ.expr, node.uid(), &isym.to_expr());
    let same: Vec<_> = find_same_nodes(&expr, node).iter().map(|n| n.uid()).collect();
    for uid in same {
        expr = replace_node(&expr, uid, &isym.to_expr());
    }
    let mut isyms = econ.isyms.clone();
    isyms.push(isym);
    Ok(Econ::new(expr, isyms))
}

// =============================================================================
// REGISTRATION
// =============================================================================

transform!(ReduceRational, REDUCE_RATIONAL, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(reduce_rational(&econ.expr)?))
});

transform!(FoldRationalsInMul, FOLD_RATIONALS_IN_MUL, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(fold_rationals_in_mul(&econ.expr)?))
});

transform!(FoldRationalsInAdd, FOLD_RATIONALS_IN_ADD, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(fold_rationals_in_add(&econ.expr)?))
});

transform!(MergeLikeTerms, MERGE_LIKE_TERMS, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(merge_like_terms(&econ.expr)?))
});

transform!(DropUnitDenominator, DROP_UNIT_DENOMINATOR, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(drop_unit_denominator(&econ.expr)?))
});

transform!(EvaluateRationalFraction, EVALUATE_RATIONAL_FRACTION, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(evaluate_rational_fraction(&econ.expr)?))
});

transform!(FlattenFraction, FLATTEN_FRACTION, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(flatten_fraction(&econ.expr)?))
});

transform!(ExtractNegativeSqrt, EXTRACT_NEGATIVE_SQRT, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(extract_negative_sqrt(&econ.expr, &econ.isyms)?))
});

transform!(ZeroProduct, ZERO_PRODUCT, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(zero_product(&econ.expr)?))
});

transform!(ZeroExponent, ZERO_EXPONENT, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(zero_exponent(&econ.expr)?))
});

transform!(FlipInverse, FLIP_INVERSE, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(flip_inverse(&econ.expr)?))
});

transform!(MergeConsecutivePowers, MERGE_CONSECUTIVE_POWERS, Base, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(merge_consecutive_powers(&econ.expr)?))
});

transform!(SimplifyRule, "simplify", Base, Arity::NONE, |econ, _args| {
    super::simplify::simplify(econ)
});

transform!(Replace, "replace", Base, Arity::NONE, |econ, _args| { replace(econ) });

transform!(RestoreReplacement, "restore_replacement", Base, Arity::NONE, |econ, _args| {
    restore_replacement(econ)
});

transform!(ReplaceWithSymbol, "replace_with_symbol", Base, Arity::Fixed(1), |econ, args| {
    replace_with_symbol(econ, &args[0])
});

transform!(CopyInto, "copy", Base, Arity::Fixed(1), |econ, args| {
    ensure!(
        matches!(econ.expr.kind, ExprKind::PlaceHolder),
        "copy",
        "target is not a placeholder"
    );
    Ok(econ.with_expr(clone_expr(&args[0])))
});

pub(crate) fn transforms() -> Vec<Arc<dyn Transformation>> {
    vec![
        Arc::new(ReduceRational),
        Arc::new(FoldRationalsInMul),
        Arc::new(FoldRationalsInAdd),
        Arc::new(MergeLikeTerms),
        Arc::new(DropUnitDenominator),
        Arc::new(EvaluateRationalFraction),
        Arc::new(FlattenFraction),
        Arc::new(ExtractNegativeSqrt),
        Arc::new(ZeroProduct),
        Arc::new(ZeroExponent),
        Arc::new(FlipInverse),
        Arc::new(MergeConsecutivePowers),
        Arc::new(SimplifyRule),
        Arc::new(Replace),
        Arc::new(RestoreReplacement),
        Arc::new(ReplaceWithSymbol),
        Arc::new(CopyInto),
    ]
}
