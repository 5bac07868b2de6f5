//! Arithmetic restructuring: flattening, distribution, factoring and
//! reordering of sums and products.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::core::edits::clone_expr;
use crate::core::queries::st_eq;
use crate::core::{Expr, ExprKind, Paren};
use crate::error::{CasError, CasResult, ensure};

use super::base::{product, with_subs};
use super::{Arity, Transformation, index_of_uid, transform};

pub(crate) const FLATTEN: &str = "flatten";
const DISTRIBUTE: &str = "distribute";
const COMBINE: &str = "combine";
const AS_FRACTION: &str = "as_fraction";
const EXTRACT: &str = "extract";
const SPLIT: &str = "split";
const COMMUTE: &str = "commute";
const TO_END: &str = "to_end";

fn expect_mul<'a>(expr: &'a Expr, name: &'static str) -> CasResult<&'a [Arc<Expr>]> {
    match &expr.kind {
        ExprKind::Mul { subs, .. } => Ok(subs),
        _ => Err(CasError::invalid(name, "expected a product")),
    }
}

// =============================================================================
// FLATTEN / DISTRIBUTE
// =============================================================================

/// Splice nested sums into a sum and nested products into a product.
/// A single remaining operand is returned bare.
pub fn flatten(expr: &Expr) -> CasResult<Expr> {
    let (subs, is_add) = match &expr.kind {
        ExprKind::Add(subs) => (subs, true),
        ExprKind::Mul { subs, .. } => (subs, false),
        _ => return Err(CasError::invalid(FLATTEN, "expected a sum or a product")),
    };
    let mut out = Vec::with_capacity(subs.len());
    collect_operands(subs, is_add, &mut out);
    Ok(match out.len() {
        1 => (*out[0]).clone(),
        _ => with_subs(expr, out),
    })
}

fn collect_operands(subs: &[Arc<Expr>], is_add: bool, out: &mut Vec<Arc<Expr>>) {
    for sub in subs {
        match (&sub.kind, is_add) {
            (ExprKind::Add(inner), true) | (ExprKind::Mul { subs: inner, .. }, false) => {
                collect_operands(inner, is_add, out)
            }
            _ => out.push(Arc::clone(sub)),
        }
    }
}

/// `a·(b + c)·d -> a·b·d + a·c·d`, `(a/b)^n -> a^n / b^n`, `(a·b)^n -> a^n · b^n`
pub fn distribute(expr: &Expr) -> CasResult<Expr> {
    match &expr.kind {
        ExprKind::Mul { subs, .. } => {
            let idx = subs
                .iter()
                .position(|s| s.is_add())
                .ok_or_else(|| CasError::invalid(DISTRIBUTE, "product has no sum operand"))?;
            let Some(terms) = subs[idx].subs() else {
                return Err(CasError::invalid(DISTRIBUTE, "product has no sum operand"));
            };
            let (left, right) = (&subs[..idx], &subs[idx + 1..]);
            let new_terms = terms.iter().map(|term| {
                let factors: Vec<Arc<Expr>> = left
                    .iter()
                    .map(|f| Arc::new(clone_expr(f)))
                    .chain(std::iter::once(Arc::clone(term)))
                    .chain(right.iter().map(|f| Arc::new(clone_expr(f))))
                    .collect();
                Expr::mul(factors)
            });
            Ok(Expr::add_at(expr.uid(), new_terms))
        }
        ExprKind::Pow { base, exp } => match &base.kind {
            ExprKind::Fraction { num, den } => Ok(Expr::fraction_at(
                expr.uid(),
                Expr::pow(Arc::clone(num), Arc::clone(exp)),
                Expr::pow(Arc::clone(den), clone_expr(exp)),
            )),
            ExprKind::Mul { subs, .. } => {
                let pows = subs.iter().enumerate().map(|(i, sub)| {
                    let exp = match i {
                        0 => Arc::clone(exp),
                        _ => Arc::new(clone_expr(exp)),
                    };
                    Expr::pow(Arc::clone(sub), exp)
                });
                Ok(Expr::mul_at(expr.uid(), pows))
            }
            _ => Err(CasError::invalid(DISTRIBUTE, "base is not a fraction or a product")),
        },
        _ => Err(CasError::invalid(DISTRIBUTE, "expected a product or a power")),
    }
}

// =============================================================================
// FACTORING
// =============================================================================

/// Pull the longest common leading (else trailing) factor run out of a sum of products
pub fn combine(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Add(terms) = &expr.kind else {
        return Err(CasError::invalid(COMBINE, "expected a sum"));
    };
    let products: Vec<&[Arc<Expr>]> = terms
        .iter()
        .map(|t| expect_mul(t, COMBINE))
        .collect::<CasResult<_>>()?;
    let Some(&first) = products.first() else {
        return Err(CasError::invalid(COMBINE, "empty sum"));
    };

    let prefix = products.iter().fold(first.len(), |n, p| {
        first
            .iter()
            .zip(p.iter())
            .take(n)
            .take_while(|(a, b)| st_eq(a, b))
            .count()
    });
    let suffix = products.iter().fold(first.len(), |n, p| {
        first
            .iter()
            .rev()
            .zip(p.iter().rev())
            .take(n)
            .take_while(|(a, b)| st_eq(a, b))
            .count()
    });

    let rest = |p: &[Arc<Expr>]| Arc::new(product(p.to_vec()));
    if prefix > 0 {
        let rests = products.iter().map(|p| rest(&p[prefix..]));
        Ok(Expr::mul([
            Arc::new(product(first[..prefix].to_vec())),
            Arc::new(Expr::add(rests)),
        ]))
    } else if suffix > 0 {
        let rests = products.iter().map(|p| rest(&p[..p.len() - suffix]));
        Ok(Expr::mul([
            Arc::new(Expr::add(rests)),
            Arc::new(product(first[first.len() - suffix..].to_vec())),
        ]))
    } else {
        Err(CasError::invalid(COMBINE, "terms share no leading or trailing factor"))
    }
}

/// `a · (b/c) · d -> (1·a·b·d) / (1·c)`
pub fn as_fraction(expr: &Expr) -> CasResult<Expr> {
    let subs = expect_mul(expr, AS_FRACTION)?;
    let mut num = vec![Arc::new(Expr::one())];
    let mut den = vec![Arc::new(Expr::one())];
    for sub in subs {
        match &sub.kind {
            ExprKind::Fraction { num: n, den: d } => {
                num.push(Arc::clone(n));
                den.push(Arc::clone(d));
            }
            _ => num.push(Arc::clone(sub)),
        }
    }
    Ok(Expr::fraction_at(expr.uid(), Expr::mul(num), Expr::mul(den)))
}

/// Factor `factors` out of every term of a sum; terms lacking a factor get
/// it in a denominator
pub fn extract(expr: &Expr, factors: &[Expr]) -> CasResult<Expr> {
    ensure!(!factors.is_empty(), EXTRACT, "no factors selected");
    let mut seen = FxHashSet::default();
    ensure!(
        factors.iter().all(|f| seen.insert(f.uid())),
        EXTRACT,
        "a factor was selected twice"
    );
    let ExprKind::Add(terms) = &expr.kind else {
        return Err(CasError::invalid(EXTRACT, "expected a sum"));
    };

    let quotients = terms.iter().map(|term| {
        let mut num: Vec<Arc<Expr>> = match &term.kind {
            ExprKind::Mul { subs, .. } => subs.clone(),
            _ => vec![Arc::clone(term)],
        };
        let mut den = Vec::new();
        for factor in factors {
            match num.iter().position(|n| st_eq(n, factor)) {
                Some(i) => {
                    num.remove(i);
                }
                None => den.push(Arc::new(clone_expr(factor))),
            }
        }
        match (num.is_empty(), den.is_empty()) {
            (true, true) => Expr::one(),
            (true, false) => Expr::fraction(Expr::one(), product(den)),
            (false, true) => product(num),
            (false, false) => Expr::fraction(product(num), product(den)),
        }
    });

    let pulled: Vec<Arc<Expr>> = factors.iter().map(|f| Arc::new(clone_expr(f))).collect();
    Ok(Expr::mul_at(
        expr.uid(),
        [Arc::new(product(pulled)), Arc::new(Expr::add(quotients))],
    ))
}

// =============================================================================
// REORDERING
// =============================================================================

/// Group a contiguous run of product operands into a parenthesized sub-product
pub fn split(expr: &Expr, selected: &[Expr]) -> CasResult<Expr> {
    ensure!(selected.len() > 1, SPLIT, "select at least two operands");
    let subs = expect_mul(expr, SPLIT)?;
    let mut indices = selected
        .iter()
        .map(|s| {
            index_of_uid(subs, s.uid())
                .ok_or_else(|| CasError::invalid(SPLIT, "operand is not in the product"))
        })
        .collect::<CasResult<Vec<_>>>()?;
    indices.sort_unstable();
    let start = indices[0];
    ensure!(
        indices.iter().enumerate().all(|(k, &i)| i == start + k),
        SPLIT,
        "operands are not contiguous"
    );
    let end = start + indices.len();

    let mid = Expr::mul(subs[start..end].to_vec()).with_paren(Paren::On);
    let mut new_subs = subs[..start].to_vec();
    new_subs.push(Arc::new(mid));
    new_subs.extend(subs[end..].iter().cloned());
    Ok(with_subs(expr, new_subs))
}

/// Swap two adjacent product operands
pub fn commute(expr: &Expr, a: &Expr, b: &Expr) -> CasResult<Expr> {
    let subs = expect_mul(expr, COMMUTE)?;
    let (Some(ai), Some(bi)) = (index_of_uid(subs, a.uid()), index_of_uid(subs, b.uid())) else {
        return Err(CasError::invalid(COMMUTE, "operand is not in the product"));
    };
    ensure!(ai.abs_diff(bi) == 1, COMMUTE, "operands are not adjacent");
    let mut new_subs = subs.to_vec();
    new_subs.swap(ai, bi);
    Ok(with_subs(expr, new_subs))
}

pub fn to_end(expr: &Expr, target: &Expr) -> CasResult<Expr> {
    let subs = expect_mul(expr, TO_END)?;
    let idx = index_of_uid(subs, target.uid())
        .ok_or_else(|| CasError::invalid(TO_END, "operand is not in the product"))?;
    let mut new_subs = subs.to_vec();
    let moved = new_subs.remove(idx);
    new_subs.push(moved);
    Ok(with_subs(expr, new_subs))
}

// =============================================================================
// REGISTRATION
// =============================================================================

transform!(Flatten, FLATTEN, Arith, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(flatten(&econ.expr)?))
});

transform!(Distribute, DISTRIBUTE, Arith, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(distribute(&econ.expr)?))
});

transform!(Combine, COMBINE, Arith, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(combine(&econ.expr)?))
});

transform!(AsFraction, AS_FRACTION, Arith, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(as_fraction(&econ.expr)?))
});

transform!(Extract, EXTRACT, Arith, Arity::Variadic, |econ, args| {
    Ok(econ.with_expr(extract(&econ.expr, args)?))
});

transform!(Split, SPLIT, Arith, Arity::Variadic, |econ, args| {
    Ok(econ.with_expr(split(&econ.expr, args)?))
});

transform!(Commute, COMMUTE, Arith, Arity::Fixed(2), |econ, args| {
    Ok(econ.with_expr(commute(&econ.expr, &args[0], &args[1])?))
});

transform!(ToEnd, TO_END, Arith, Arity::Fixed(1), |econ, args| {
    Ok(econ.with_expr(to_end(&econ.expr, &args[0])?))
});

pub(crate) fn transforms() -> Vec<Arc<dyn Transformation>> {
    vec![
        Arc::new(Flatten),
        Arc::new(Distribute),
        Arc::new(Combine),
        Arc::new(AsFraction),
        Arc::new(Extract),
        Arc::new(Split),
        Arc::new(Commute),
        Arc::new(ToEnd),
    ]
}
