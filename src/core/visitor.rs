//! Expression visitor pattern for tree traversal
//!
//! Child order is fixed per variant (see [`Expr::children`]): n-ary subs
//! left to right, matrices row-major, numerator before denominator. Queries
//! and selection indices depend on this order.

use rustc_hash::FxHashSet;

use super::expr::Expr;
use super::symbol::Suid;

/// Trait for visiting expression nodes
///
/// `enter` runs before the children (return false to skip them), `leave`
/// runs after them.
///
/// # Example
/// ```ignore
/// use texcas::{Expr, ExprVisitor, walk_expr};
///
/// struct Leaves(usize);
///
/// impl ExprVisitor for Leaves {
///     fn enter(&mut self, node: &Expr) -> bool {
///         if node.children().is_empty() { self.0 += 1; }
///         true
///     }
/// }
/// ```
pub trait ExprVisitor {
    fn enter(&mut self, _node: &Expr) -> bool {
        true
    }

    fn leave(&mut self, _node: &Expr) {}
}

/// Walk an expression tree with a visitor
pub fn walk_expr<V: ExprVisitor>(expr: &Expr, visitor: &mut V) {
    if visitor.enter(expr) {
        for child in expr.children() {
            walk_expr(child, visitor);
        }
    }
    visitor.leave(expr);
}

/// Closure-based walk with pre- and post-order callbacks
pub fn traverse<'a, B, A>(expr: &'a Expr, before: &mut B, after: &mut A)
where
    B: FnMut(&'a Expr),
    A: FnMut(&'a Expr),
{
    before(expr);
    for child in expr.children() {
        traverse(child, before, after);
    }
    after(expr);
}

/// Pre-order walk
pub fn for_each_node<'a, F: FnMut(&'a Expr)>(expr: &'a Expr, f: &mut F) {
    traverse(expr, f, &mut |_| {});
}

/// A simple visitor that counts nodes
#[derive(Default)]
pub struct NodeCounter {
    pub count: usize,
}

impl ExprVisitor for NodeCounter {
    fn enter(&mut self, _node: &Expr) -> bool {
        self.count += 1;
        true
    }
}

/// Collects every symbol id referenced by Symbol nodes or sequence indices
#[derive(Default)]
pub struct SymbolCollector {
    pub suids: FxHashSet<Suid>,
}

impl ExprVisitor for SymbolCollector {
    fn enter(&mut self, node: &Expr) -> bool {
        match node.kind() {
            crate::core::ExprKind::Symbol(suid) => {
                self.suids.insert(*suid);
            }
            crate::core::ExprKind::InfiniteSequence { index, .. } => {
                self.suids.insert(*index);
            }
            _ => {}
        }
        true
    }
}

pub fn count_nodes(expr: &Expr) -> usize {
    let mut counter = NodeCounter::default();
    walk_expr(expr, &mut counter);
    counter.count
}
