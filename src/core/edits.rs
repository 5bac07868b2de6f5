//! Identity-aware tree edits.
//!
//! - [`replace_node`] copies only the path from the root to the target; every
//!   other subtree is shared and keeps its uids.
//! - [`clone_expr`] mints a fresh uid on every node, for duplicating a
//!   subtree into a second position.

use std::sync::Arc;

use super::expr::{Expr, ExprKind, Uid, next_uid};
use super::queries::st_eq;
use super::symbol::Suid;

/// Copy-on-write rewrite.
///
/// `f` is tried on each node top-down; a node it replaces is not descended
/// into. Returns `None` when nothing changed.
fn rewrite_node<F>(node: &Expr, f: &mut F) -> Option<Expr>
where
    F: FnMut(&Expr) -> Option<Expr>,
{
    if let Some(new) = f(node) {
        return Some(new);
    }
    let mut changed = false;
    let kind = node.map_children(|child| match rewrite_node(child, &mut *f) {
        Some(new) => {
            changed = true;
            Arc::new(new)
        }
        None => Arc::clone(child),
    });
    changed.then(|| node.with_kind(kind))
}

/// Apply [`rewrite_node`] and fall back to the unchanged tree
pub fn rewrite<F>(expr: &Expr, mut f: F) -> Expr
where
    F: FnMut(&Expr) -> Option<Expr>,
{
    rewrite_node(expr, &mut f).unwrap_or_else(|| expr.clone())
}

/// Replace every node carrying `uid` by `by`.
///
/// Ancestors of the target are rebuilt with their own uids; nodes off the
/// path are shared untouched. `by` keeps whatever uid it already has.
pub fn replace_node(expr: &Expr, uid: Uid, by: &Expr) -> Expr {
    rewrite(expr, |node| (node.uid == uid).then(|| by.clone()))
}

/// Post-order rebuild: children first, then `f` on the rebuilt node.
/// Uids and parenthesis overrides are kept unless `f` changes them.
pub fn edit_tree<F>(expr: &Expr, f: &mut F) -> Expr
where
    F: FnMut(Expr) -> Expr,
{
    let kind = expr.map_children(|child| Arc::new(edit_tree(child, &mut *f)));
    f(expr.with_kind(kind))
}

/// Deep copy with a fresh uid on every node
pub fn clone_expr(expr: &Expr) -> Expr {
    let kind = expr.map_children(|child| Arc::new(clone_expr(child)));
    Expr {
        uid: next_uid(),
        paren: expr.paren,
        kind,
    }
}

/// Same node under a new uid
pub fn change_uid(expr: &Expr, uid: Uid) -> Expr {
    expr.with_uid(uid)
}

/// Replace every Symbol node of `suid` by a node produced by `by`
pub fn replace_symbol_node<F>(expr: &Expr, suid: Suid, mut by: F) -> Expr
where
    F: FnMut() -> Expr,
{
    rewrite(expr, |node| match node.kind {
        ExprKind::Symbol(s) if s == suid => Some(by()),
        _ => None,
    })
}

/// Coefficient of `of` in `expr`.
///
/// `expr` itself gives 1, a product containing `of` gives the product of the
/// other factors, anything else gives 0.
pub fn coeff_of(expr: &Expr, of: &Expr) -> Expr {
    if st_eq(expr, of) {
        return Expr::one();
    }
    if let ExprKind::Mul { subs, .. } = &expr.kind {
        let rest: Vec<_> = subs.iter().filter(|s| !st_eq(s, of)).cloned().collect();
        if rest.is_empty() {
            return Expr::one();
        }
        if rest.len() < subs.len() {
            return Expr::mul(rest);
        }
    }
    Expr::zero()
}
