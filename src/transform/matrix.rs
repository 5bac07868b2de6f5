//! Matrix algebra: determinant by Laplace expansion, inverse by adjugate,
//! matrix products and moving a matrix factor across `=`.

use std::sync::Arc;

use crate::core::edits::clone_expr;
use crate::core::queries::st_eq;
use crate::core::{Econ, Expr, ExprKind, FunctionName};
use crate::error::{CasError, CasResult, ensure};

use super::base::with_subs;
use super::simplify::simplify;
use super::{Arity, Transformation, transform};

const INVERSE: &str = "inverse";
const DETERMINANT: &str = "determinant";
const MOVE_OVER_EQUAL: &str = "move_over_equal";
const MULTIPLY: &str = "multiply";
const TRANSPOSE: &str = "transpose";

type Rows = [Vec<Arc<Expr>>];

fn sign(k: usize) -> Expr {
    Expr::integer(if k % 2 == 0 { 1 } else { -1 })
}

fn expect_square<'a>(expr: &'a Expr, name: &'static str) -> CasResult<&'a Rows> {
    match &expr.kind {
        ExprKind::Matrix(rows) if expr.is_square_matrix() && !rows.is_empty() => Ok(rows),
        ExprKind::Matrix(_) => Err(CasError::invalid(name, "matrix is not square")),
        _ => Err(CasError::invalid(name, "expected a matrix")),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Rows must all have the same length
pub fn transpose(rows: &Rows) -> CasResult<Expr> {
    let width = rows.first().map_or(0, Vec::len);
    ensure!(
        width > 0 && rows.iter().all(|row| row.len() == width),
        TRANSPOSE,
        "matrix is not rectangular"
    );
    Ok(Expr::matrix(
        (0..width).map(|j| rows.iter().map(|row| Arc::clone(&row[j])).collect::<Vec<_>>()),
    ))
}

/// Rows without row `i` and column `j`
pub fn submatrix(rows: &Rows, i: usize, j: usize) -> Vec<Vec<Arc<Expr>>> {
    rows.iter()
        .enumerate()
        .filter(|&(r, _)| r != i)
        .map(|(_, row)| {
            row.iter()
                .enumerate()
                .filter(|&(c, _)| c != j)
                .map(|(_, e)| Arc::clone(e))
                .collect()
        })
        .collect()
}

/// `(-1)^(i+j) · det(minor(i, j))`
pub fn cofactor(rows: &Rows, i: usize, j: usize) -> CasResult<Expr> {
    Ok(Expr::mul([sign(i + j), determinant_of(&submatrix(rows, i, j))?]))
}

pub fn adjugate(rows: &Rows) -> CasResult<Expr> {
    let n = rows.len();
    ensure!(
        n > 0 && rows.iter().all(|row| row.len() == n),
        INVERSE,
        "matrix is not square"
    );
    if n == 1 {
        return Ok(Expr::matrix([[Expr::one()]]));
    }
    let cofactors = (0..n)
        .map(|i| (0..n).map(|j| cofactor(rows, i, j).map(Arc::new)).collect())
        .collect::<CasResult<Vec<Vec<_>>>>()?;
    transpose(&cofactors)
}

/// Signed Laplace expansion along the first row.
///
/// The result shares no uid with the input.
pub fn determinant_of(rows: &Rows) -> CasResult<Expr> {
    let n = rows.len();
    ensure!(
        n > 0 && rows.iter().all(|row| row.len() == n),
        DETERMINANT,
        "matrix is not square"
    );
    let det = match n {
        1 => (*rows[0][0]).clone(),
        2 => {
            let (a, b) = (&rows[0][0], &rows[0][1]);
            let (c, d) = (&rows[1][0], &rows[1][1]);
            Expr::add([
                Expr::mul([Arc::clone(a), Arc::clone(d)]),
                Expr::mul([Arc::new(Expr::neg_one()), Arc::clone(b), Arc::clone(c)]),
            ])
        }
        _ => {
            let terms = (0..n)
                .map(|j| {
                    let minor = determinant_of(&submatrix(rows, 0, j))?;
                    Ok(Expr::mul([
                        Arc::new(sign(j)),
                        Arc::clone(&rows[0][j]),
                        Arc::new(minor),
                    ]))
                })
                .collect::<CasResult<Vec<_>>>()?;
            Expr::add(terms)
        }
    };
    Ok(clone_expr(&det))
}

// =============================================================================
// TRANSFORMATIONS
// =============================================================================

/// `M^-1 -> (1 / det M) · adj M`
pub fn inverse(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::Pow { base, exp } = &expr.kind else {
        return Err(CasError::invalid(INVERSE, "expected a power"));
    };
    ensure!(exp.is_neg_one(), INVERSE, "exponent is not -1");
    let rows = expect_square(base, INVERSE)?;
    let det = determinant_of(rows)?;
    let reduced = simplify(&Econ::bare(clone_expr(&det)))?;
    ensure!(!reduced.expr.is_zero(), INVERSE, "matrix is singular");
    Ok(Expr::mul_at(
        expr.uid(),
        [Expr::fraction(Expr::one(), det), adjugate(rows)?],
    ))
}

/// `det(M)` evaluated by Laplace expansion
pub fn determinant(expr: &Expr) -> CasResult<Expr> {
    let ExprKind::SpecialFunction { name, arg } = &expr.kind else {
        return Err(CasError::invalid(DETERMINANT, "expected det(...)"));
    };
    ensure!(*name == FunctionName::Det, DETERMINANT, "expected det(...)");
    determinant_of(expect_square(arg, DETERMINANT)?)
}

/// Multiply both sides by the inverse of a square matrix standing alone on
/// a side, or at either end of a product side
pub fn move_over_equal(expr: &Expr, moved: &Expr) -> CasResult<Expr> {
    expect_square(moved, MOVE_OVER_EQUAL)?;
    let ExprKind::Equal { left, right } = &expr.kind else {
        return Err(CasError::invalid(MOVE_OVER_EQUAL, "expected an equation"));
    };
    let uid = expr.uid();
    let inv = |m: &Arc<Expr>| Arc::new(Expr::inverse(Arc::clone(m)));
    let remaining = |side: &Expr, rest: Vec<Arc<Expr>>| match rest.len() {
        0 => Expr::one(),
        _ => with_subs(side, rest),
    };

    if st_eq(left, moved) {
        return Ok(Expr::equal_at(uid, Expr::one(), Expr::mul([inv(left), Arc::clone(right)])));
    }
    if st_eq(right, moved) {
        return Ok(Expr::equal_at(uid, Expr::mul([inv(right), Arc::clone(left)]), Expr::one()));
    }
    for (side, other, on_left) in [(left, right, true), (right, left, false)] {
        let ExprKind::Mul { subs, .. } = &side.kind else {
            continue;
        };
        let (Some(head), Some(tail)) = (subs.first(), subs.last()) else {
            continue;
        };
        let (rest, moved_other) = if st_eq(head, moved) {
            (subs[1..].to_vec(), Expr::mul([inv(head), Arc::clone(other)]))
        } else if st_eq(tail, moved) {
            (subs[..subs.len() - 1].to_vec(), Expr::mul([Arc::clone(other), inv(tail)]))
        } else {
            continue;
        };
        let kept = remaining(&**side, rest);
        return Ok(if on_left {
            Expr::equal_at(uid, kept, moved_other)
        } else {
            Expr::equal_at(uid, moved_other, kept)
        });
    }
    Err(CasError::invalid(
        MOVE_OVER_EQUAL,
        "matrix is not a side or an outer factor of a side",
    ))
}

/// Multiply two operands of a product, at least one a matrix.
///
/// Two matrices must be adjacent and conformable; a scalar is multiplied
/// into every entry of the matrix, which keeps its position.
pub fn multiply(expr: &Expr, a: &Expr, b: &Expr) -> CasResult<Expr> {
    let ExprKind::Mul { subs, .. } = &expr.kind else {
        return Err(CasError::invalid(MULTIPLY, "expected a product"));
    };
    let find = |x: &Expr| {
        subs.iter()
            .position(|s| st_eq(s, x))
            .ok_or_else(|| CasError::invalid(MULTIPLY, "operand is not in the product"))
    };
    let (ai, bi) = (find(a)?, find(b)?);
    ensure!(ai != bi, MULTIPLY, "operands must be distinct");

    let rebuild = |new_subs: Vec<Arc<Expr>>| match new_subs.len() {
        1 => (*new_subs[0]).clone(),
        _ => with_subs(expr, new_subs),
    };

    match (subs[ai].rows(), subs[bi].rows()) {
        (Some(l), Some(r)) => {
            ensure!(ai.abs_diff(bi) == 1, MULTIPLY, "matrices are not adjacent");
            let (li, left, right) = if ai < bi { (ai, l, r) } else { (bi, r, l) };
            let n = left.first().map_or(0, Vec::len);
            ensure!(
                n == right.len(),
                MULTIPLY,
                "a {}x{n} matrix cannot multiply a {}x{} matrix",
                left.len(),
                right.len(),
                right.first().map_or(0, Vec::len)
            );
            let p = right.first().map_or(0, Vec::len);
            let entries = left.iter().map(|row| {
                (0..p)
                    .map(|j| {
                        let terms = (0..n).map(|k| {
                            clone_expr(&Expr::mul([Arc::clone(&row[k]), Arc::clone(&right[k][j])]))
                        });
                        Arc::new(Expr::add(terms))
                    })
                    .collect::<Vec<_>>()
            });
            let mut new_subs = subs[..li].to_vec();
            new_subs.push(Arc::new(Expr::matrix(entries)));
            new_subs.extend(subs[li + 2..].iter().cloned());
            Ok(rebuild(new_subs))
        }
        (mat_a, mat_b) => {
            let (mi, si) = match (mat_a, mat_b) {
                (None, Some(_)) => (bi, ai),
                (Some(_), None) => (ai, bi),
                _ => return Err(CasError::invalid(MULTIPLY, "neither operand is a matrix")),
            };
            let scalar = &subs[si];
            let Some(rows) = subs[mi].rows() else {
                return Err(CasError::invalid(MULTIPLY, "neither operand is a matrix"));
            };
            let scaled = rows.iter().map(|row| {
                row.iter()
                    .map(|entry| Arc::new(Expr::mul([Arc::new(clone_expr(scalar)), Arc::clone(entry)])))
                    .collect::<Vec<_>>()
            });
            let scaled = Arc::new(Expr::matrix_at(subs[mi].uid(), scaled));
            let new_subs = subs
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != si)
                .map(|(i, s)| if i == mi { Arc::clone(&scaled) } else { Arc::clone(s) })
                .collect();
            Ok(rebuild(new_subs))
        }
    }
}

transform!(Inverse, INVERSE, Matrix, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(inverse(&econ.expr)?))
});

transform!(Determinant, DETERMINANT, Matrix, Arity::NONE, |econ, _args| {
    Ok(econ.with_expr(determinant(&econ.expr)?))
});

transform!(MoveOverEqual, MOVE_OVER_EQUAL, Matrix, Arity::Fixed(1), |econ, args| {
    Ok(econ.with_expr(move_over_equal(&econ.expr, &args[0])?))
});

transform!(Multiply, MULTIPLY, Matrix, Arity::Fixed(2), |econ, args| {
    Ok(econ.with_expr(multiply(&econ.expr, &args[0], &args[1])?))
});

pub(crate) fn transforms() -> Vec<Arc<dyn Transformation>> {
    vec![
        Arc::new(Inverse),
        Arc::new(Determinant),
        Arc::new(MoveOverEqual),
        Arc::new(Multiply),
    ]
}
