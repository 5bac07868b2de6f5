//! Bounded fixed-point simplifier.
//!
//! One pass rebuilds the tree bottom-up and runs, per node kind, the base
//! and arithmetic rules that apply to it. A rule whose precondition fails
//! leaves its node unchanged. The loop stops at the first pass that is a
//! structural no-op, or after `max_passes`.

use std::sync::Arc;

use tracing::trace;

use crate::DEFAULT_MAX_PASSES;
use crate::core::queries::st_eq;
use crate::core::{Econ, Expr, ExprKind, SymbolTable};
use crate::error::CasResult;

use super::arith::flatten;
use super::base::{
    drop_unit_denominator, evaluate_rational_fraction, extract_negative_sqrt, flatten_fraction,
    flip_inverse, fold_rationals_in_add, fold_rationals_in_mul, merge_consecutive_powers,
    merge_like_terms, reduce_rational, zero_exponent, zero_product,
};
use super::or_keep;

/// Simplify with [`DEFAULT_MAX_PASSES`]
pub fn simplify(econ: &Econ) -> CasResult<Econ> {
    simplify_with(econ, DEFAULT_MAX_PASSES)
}

pub fn simplify_with(econ: &Econ, max_passes: usize) -> CasResult<Econ> {
    let mut current = econ.clone();
    for pass in 0..max_passes {
        let next = simplify_once(&current)?;
        let stable = st_eq(&current.expr, &next.expr);
        trace!(pass, stable, "simplify pass");
        if stable {
            return Ok(current);
        }
        current = next;
    }
    Ok(current)
}

/// A single bottom-up pass
pub fn simplify_once(econ: &Econ) -> CasResult<Econ> {
    Ok(econ.with_expr(reduce(&econ.expr, &econ.isyms)?))
}

fn reduce(node: &Expr, isyms: &SymbolTable) -> CasResult<Expr> {
    match &node.kind {
        ExprKind::Mul { .. } => {
            let node = flatten(&reduce_children(node, isyms)?)?;
            let node = or_keep(&node, fold_rationals_in_mul(&node))?;
            let node = or_keep(&node, zero_product(&node))?;
            or_keep(&node, merge_consecutive_powers(&node))
        }
        ExprKind::Add(_) => {
            let node = flatten(&reduce_children(node, isyms)?)?;
            let node = or_keep(&node, fold_rationals_in_add(&node))?;
            or_keep(&node, merge_like_terms(&node))
        }
        ExprKind::Fraction { .. } => {
            let node = flatten_fraction(&reduce_children(node, isyms)?)?;
            let node = or_keep(&node, drop_unit_denominator(&node))?;
            or_keep(&node, evaluate_rational_fraction(&node))
        }
        ExprKind::Rational(_) => reduce_rational(node),
        ExprKind::Pow { .. } => {
            let node = or_keep(node, extract_negative_sqrt(node, isyms))?;
            let node = or_keep(&node, zero_exponent(&node))?;
            let node = or_keep(&node, flip_inverse(&node))?;
            match node.kind {
                ExprKind::Pow { .. } => reduce_children(&node, isyms),
                _ => Ok(node),
            }
        }
        _ => reduce_children(node, isyms),
    }
}

/// Same node with every child reduced; uid and flags are kept
fn reduce_children(node: &Expr, isyms: &SymbolTable) -> CasResult<Expr> {
    let mut failure = None;
    let kind = node.map_children(|child| match reduce(child, isyms) {
        Ok(reduced) => Arc::new(reduced),
        Err(err) => {
            failure.get_or_insert(err);
            Arc::clone(child)
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(node.with_kind(kind)),
    }
}
