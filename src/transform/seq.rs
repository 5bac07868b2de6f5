//! Infinite sequences.

use std::sync::Arc;

use crate::core::edits::replace_node;
use crate::core::queries::contains_uid;
use crate::core::{Expr, ExprKind};
use crate::error::{CasError, CasResult, ensure};

use super::{Arity, Transformation, transform};

const EXPAND: &str = "expand";

/// Replace the selected sequence by its element and let the whole
/// expression range over the same index instead
pub fn expand(expr: &Expr, seq: &Expr) -> CasResult<Expr> {
    let ExprKind::InfiniteSequence { elem, index } = &seq.kind else {
        return Err(CasError::invalid(EXPAND, "selected node is not a sequence"));
    };
    ensure!(
        contains_uid(expr, seq.uid()),
        EXPAND,
        "selected sequence is not in the expression"
    );
    let inner = replace_node(expr, seq.uid(), elem);
    Ok(Expr::sequence(inner, *index))
}

transform!(Expand, EXPAND, Seq, Arity::Fixed(1), |econ, args| {
    Ok(econ.with_expr(expand(&econ.expr, &args[0])?))
});

pub(crate) fn transforms() -> Vec<Arc<dyn Transformation>> {
    vec![Arc::new(Expand)]
}
