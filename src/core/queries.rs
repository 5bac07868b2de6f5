//! Tree queries: lookup by uid or variant, depth/height indexing,
//! structural equality and tree validation.

use rustc_hash::FxHashSet;

use super::expr::{Expr, ExprKind, NodeKind, Uid};
use super::symbol::Econ;
use super::visitor::{SymbolCollector, for_each_node, walk_expr};
use crate::error::{CasResult, TreeError};

pub fn find_by_uid(expr: &Expr, uid: Uid) -> Option<&Expr> {
    if expr.uid == uid {
        return Some(expr);
    }
    expr.children()
        .into_iter()
        .find_map(|child| find_by_uid(child, uid))
}

pub fn contains_uid(expr: &Expr, uid: Uid) -> bool {
    find_by_uid(expr, uid).is_some()
}

/// Nodes from the root down to the node carrying `uid`, both ends included
pub fn path_to(expr: &Expr, uid: Uid) -> Option<Vec<&Expr>> {
    if expr.uid == uid {
        return Some(vec![expr]);
    }
    expr.children().into_iter().find_map(|child| {
        let mut path = path_to(child, uid)?;
        path.insert(0, expr);
        Some(path)
    })
}

/// Nodes satisfying `pred`, pre-order
pub fn filter_nodes<'a, P>(expr: &'a Expr, pred: P) -> Vec<&'a Expr>
where
    P: Fn(&Expr) -> bool,
{
    fn go<'a, P: Fn(&Expr) -> bool>(node: &'a Expr, pred: &P, found: &mut Vec<&'a Expr>) {
        if pred(node) {
            found.push(node);
        }
        for child in node.children() {
            go(child, pred, found);
        }
    }
    let mut found = Vec::new();
    go(expr, &pred, &mut found);
    found
}

/// Every node of the given variant, pre-order
pub fn find_all_of_kind(expr: &Expr, kind: NodeKind) -> Vec<&Expr> {
    filter_nodes(expr, |node| node.node_kind() == kind)
}

/// Length of the longest root-to-leaf path, counting the root as 1
pub fn max_depth(expr: &Expr) -> usize {
    1 + expr
        .children()
        .into_iter()
        .map(|child| max_depth(child))
        .max()
        .unwrap_or(0)
}

/// Nodes at `depth` below the root, pre-order. The root itself is depth 0.
pub fn find_all_at_depth(expr: &Expr, depth: usize) -> Vec<&Expr> {
    fn go<'a>(node: &'a Expr, current: usize, depth: usize, found: &mut Vec<&'a Expr>) {
        if current == depth {
            found.push(node);
            return;
        }
        for child in node.children() {
            go(child, current + 1, depth, found);
        }
    }
    let mut found = Vec::new();
    go(expr, 0, depth, &mut found);
    found
}

/// Nodes whose height is `height` (leaves are height 0), post-order.
///
/// Each round re-traverses the tree and treats nodes found in earlier
/// rounds as absent; a node with no remaining children is at the current
/// height.
pub fn find_all_at_height(expr: &Expr, height: usize) -> Vec<&Expr> {
    struct Round<'a, 's> {
        excluded: &'s FxHashSet<Uid>,
        collect: bool,
        current_depth: usize,
        branch_depth: usize,
        hits: Vec<&'a Expr>,
    }

    fn visit<'a>(node: &'a Expr, round: &mut Round<'a, '_>) {
        let live = !round.excluded.contains(&node.uid);
        if live {
            round.branch_depth = round.current_depth;
            round.current_depth += 1;
        }
        for child in node.children() {
            visit(child, round);
        }
        if live {
            round.current_depth -= 1;
            if round.branch_depth == round.current_depth {
                round.hits.push(node);
            }
        }
    }

    let mut excluded: FxHashSet<Uid> = FxHashSet::default();
    for level in 0..=height {
        let mut round = Round {
            excluded: &excluded,
            collect: level == height,
            current_depth: 0,
            branch_depth: 0,
            hits: Vec::new(),
        };
        visit(expr, &mut round);
        if round.collect {
            return round.hits;
        }
        let hits: Vec<Uid> = round.hits.iter().map(|n| n.uid).collect();
        excluded.extend(hits);
    }
    Vec::new()
}

/// Subtrees of `expr` structurally equal to `like`, other than `like` itself
pub fn find_same_nodes<'a>(expr: &'a Expr, like: &Expr) -> Vec<&'a Expr> {
    find_all_at_height(expr, max_depth(like) - 1)
        .into_iter()
        .filter(|node| node.uid != like.uid && st_eq(node, like))
        .collect()
}

// =============================================================================
// STRUCTURAL EQUALITY
// =============================================================================

/// Pre-order list of every node
pub fn flatten_pre_order(expr: &Expr) -> Vec<&Expr> {
    filter_nodes(expr, |_| true)
}

/// Variant tag plus leaf value; everything else about a node is ignored
fn same_node(a: &Expr, b: &Expr) -> bool {
    match (&a.kind, &b.kind) {
        (ExprKind::Symbol(x), ExprKind::Symbol(y)) => x == y,
        (ExprKind::Rational(x), ExprKind::Rational(y)) => x.p == y.p && x.q == y.q,
        (ExprKind::SpecialConstant(x), ExprKind::SpecialConstant(y)) => x == y,
        (ExprKind::SpecialFunction { name: x, .. }, ExprKind::SpecialFunction { name: y, .. }) => {
            x == y
        }
        _ => a.node_kind() == b.node_kind(),
    }
}

/// Structural equality over the pre-order flattening of both trees.
///
/// Rationals compare by their raw `(p, q)`; uid, parenthesis override and
/// the Mul display flag never matter.
pub fn st_eq(a: &Expr, b: &Expr) -> bool {
    let left = flatten_pre_order(a);
    let right = flatten_pre_order(b);
    left.len() == right.len() && left.iter().zip(&right).all(|(x, y)| same_node(x, y))
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Check uid uniqueness, non-empty sub lists and rectangular matrices
pub fn validate_tree(expr: &Expr) -> Result<(), TreeError> {
    let mut seen = FxHashSet::default();
    let mut error = None;
    for_each_node(expr, &mut |node: &Expr| {
        if error.is_some() {
            return;
        }
        if !seen.insert(node.uid) {
            error = Some(TreeError::DuplicateUid(node.uid));
            return;
        }
        error = check_node(node).err();
    });
    error.map_or(Ok(()), Err)
}

fn check_node(node: &Expr) -> Result<(), TreeError> {
    let empty = |len: usize| {
        if len == 0 {
            Err(TreeError::EmptySubs {
                kind: node.node_kind().name(),
                uid: node.uid,
            })
        } else {
            Ok(())
        }
    };
    match &node.kind {
        ExprKind::Add(subs)
        | ExprKind::Mul { subs, .. }
        | ExprKind::Group(subs)
        | ExprKind::LogicOp { subs, .. } => empty(subs.len()),
        ExprKind::Cases(cases) => empty(cases.len()),
        ExprKind::Matrix(rows) => {
            let width = rows.first().map_or(0, Vec::len);
            if width == 0 {
                return Err(TreeError::EmptyMatrix(node.uid));
            }
            match rows.iter().position(|row| row.len() != width) {
                Some(row) => Err(TreeError::RaggedMatrix {
                    uid: node.uid,
                    row,
                    expected: width,
                    found: rows[row].len(),
                }),
                None => Ok(()),
            }
        }
        _ => Ok(()),
    }
}

/// [`validate_tree`] plus resolution of every symbol reference
pub fn validate_econ(econ: &Econ) -> CasResult<()> {
    validate_tree(&econ.expr)?;
    let mut dangling = None;
    for_each_node(&econ.expr, &mut |node: &Expr| {
        if dangling.is_none()
            && let ExprKind::Symbol(suid) = node.kind
            && !econ.isyms.contains(suid)
        {
            dangling = Some(TreeError::DanglingSymbol {
                uid: node.uid,
                suid,
            });
        }
    });
    match dangling {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Symbol ids referenced anywhere in the tree
pub fn referenced_symbols(expr: &Expr) -> FxHashSet<super::symbol::Suid> {
    let mut collector = SymbolCollector::default();
    walk_expr(expr, &mut collector);
    collector.suids
}
