//! Property-based tests
//!
//! Uses quickcheck for:
//! - Structural equality laws
//! - Identity preservation of copies and edits
//! - Rational canonical form
//! - Simplifier fixed points

use num_bigint::BigInt;
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use crate::core::edits::{clone_expr, replace_node};
use crate::core::queries::{flatten_pre_order, st_eq, validate_econ};
use crate::transform::simplify::{simplify, simplify_once};
use crate::{Econ, Expr, ISym, Rational, Suid, SymbolTable};

// ============================================================
// PART 1: EXPRESSION GENERATORS
// ============================================================

fn table() -> (SymbolTable, [Suid; 3]) {
    let mut isyms = SymbolTable::new();
    let x = isyms.push(ISym::real("x"));
    let y = isyms.push(ISym::real("y"));
    let z = isyms.push(ISym::real("z"));
    (isyms, [x, y, z])
}

fn gen_leaf(g: &mut Gen, vars: &[Suid; 3]) -> Expr {
    match u8::arbitrary(g) % 5 {
        0 | 1 => Expr::integer(i8::arbitrary(g) % 10),
        2 => {
            let q = (u8::arbitrary(g) % 6) as i64 + 1;
            Expr::rational(i8::arbitrary(g) % 10, q)
        }
        _ => Expr::symbol(vars[usize::arbitrary(g) % vars.len()]),
    }
}

/// Sums, products, fractions and small positive integer powers
fn gen_expr(g: &mut Gen, vars: &[Suid; 3], depth: usize) -> Expr {
    if depth == 0 {
        return gen_leaf(g, vars);
    }
    match u8::arbitrary(g) % 8 {
        0 | 1 => {
            let n = usize::arbitrary(g) % 3 + 2;
            Expr::add((0..n).map(|_| gen_expr(g, vars, depth - 1)).collect::<Vec<_>>())
        }
        2 | 3 => {
            let n = usize::arbitrary(g) % 3 + 2;
            Expr::mul((0..n).map(|_| gen_expr(g, vars, depth - 1)).collect::<Vec<_>>())
        }
        4 => {
            let base = gen_expr(g, vars, depth - 1);
            Expr::pow(base, Expr::integer(u8::arbitrary(g) % 3 + 1))
        }
        5 => {
            let num = gen_expr(g, vars, depth - 1);
            let den = Expr::symbol(vars[usize::arbitrary(g) % vars.len()]);
            Expr::fraction(num, den)
        }
        _ => gen_leaf(g, vars),
    }
}

/// A generated tree over the shared symbol table
#[derive(Clone, Debug)]
struct SmallExpr(Expr);

impl Arbitrary for SmallExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        let (_, vars) = TABLE.with(|t| t.clone());
        let depth = g.size().min(3);
        SmallExpr(gen_expr(g, &vars, depth))
    }
}

thread_local! {
    static TABLE: (SymbolTable, [Suid; 3]) = table();
}

fn econ_of(expr: Expr) -> Econ {
    let (isyms, _) = TABLE.with(|t| t.clone());
    Econ::new(expr, isyms)
}

// ============================================================
// PART 2: STRUCTURAL EQUALITY
// ============================================================

#[cfg(test)]
mod equality_properties {
    use super::*;

    #[test]
    fn prop_st_eq_is_reflexive_and_symmetric() {
        fn prop(a: SmallExpr, b: SmallExpr) -> TestResult {
            let (a, b) = (a.0, b.0);
            if !st_eq(&a, &a) {
                return TestResult::failed();
            }
            TestResult::from_bool(st_eq(&a, &b) == st_eq(&b, &a))
        }
        QuickCheck::new()
            .tests(300)
            .quickcheck(prop as fn(SmallExpr, SmallExpr) -> TestResult);
    }

    #[test]
    fn prop_clone_is_equal_with_fresh_uids() {
        fn prop(a: SmallExpr) -> TestResult {
            let copy = clone_expr(&a.0);
            if !st_eq(&a.0, &copy) {
                return TestResult::failed();
            }
            let original: Vec<_> = flatten_pre_order(&a.0).iter().map(|n| n.uid()).collect();
            TestResult::from_bool(
                flatten_pre_order(&copy)
                    .iter()
                    .all(|n| !original.contains(&n.uid())),
            )
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop as fn(SmallExpr) -> TestResult);
    }

    #[test]
    fn prop_generated_trees_are_valid() {
        fn prop(a: SmallExpr) -> TestResult {
            TestResult::from_bool(validate_econ(&econ_of(a.0)).is_ok())
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop as fn(SmallExpr) -> TestResult);
    }

    #[test]
    fn prop_replace_node_only_touches_the_path() {
        fn prop(a: SmallExpr, pick: usize) -> TestResult {
            let nodes = flatten_pre_order(&a.0);
            let target = nodes[pick % nodes.len()];
            if target.uid() == a.0.uid() {
                return TestResult::discard();
            }
            let by = Expr::placeholder();
            let out = replace_node(&a.0, target.uid(), &by);
            let after: Vec<_> = flatten_pre_order(&out).iter().map(|n| n.uid()).collect();
            // Root keeps its uid, the target's subtree is gone, the new node is in
            let gone = flatten_pre_order(target).iter().all(|n| !after.contains(&n.uid()));
            TestResult::from_bool(out.uid() == a.0.uid() && after.contains(&by.uid()) && gone)
        }
        QuickCheck::new()
            .tests(200)
            .quickcheck(prop as fn(SmallExpr, usize) -> TestResult);
    }
}

// ============================================================
// PART 3: RATIONALS
// ============================================================

#[cfg(test)]
mod rational_properties {
    use super::*;

    #[test]
    fn prop_canonical_is_idempotent() {
        fn prop(p: i32, q: i32) -> TestResult {
            if q == 0 {
                return TestResult::discard();
            }
            let c = Rational::new(p, q).canonical();
            let twice = c.canonical();
            TestResult::from_bool(
                c.p == twice.p && c.q == twice.q && c.q > BigInt::from(0) && c.is_canonical(),
            )
        }
        QuickCheck::new()
            .tests(500)
            .quickcheck(prop as fn(i32, i32) -> TestResult);
    }

    #[test]
    fn prop_canonical_preserves_value() {
        fn prop(p: i16, q: i16, k: i8) -> TestResult {
            if q == 0 || k == 0 {
                return TestResult::discard();
            }
            let (p, q, k) = (i64::from(p), i64::from(q), i64::from(k));
            let scaled = Rational::new(p * k, q * k).canonical();
            TestResult::from_bool(scaled == Rational::new(p, q))
        }
        QuickCheck::new()
            .tests(500)
            .quickcheck(prop as fn(i16, i16, i8) -> TestResult);
    }
}

// ============================================================
// PART 4: SIMPLIFIER
// ============================================================

#[cfg(test)]
mod simplify_properties {
    use super::*;

    /// A converged result is a fixed point of one more pass
    #[test]
    fn prop_simplify_is_idempotent() {
        fn prop(a: SmallExpr) -> TestResult {
            let Ok(once) = simplify(&econ_of(a.0)) else {
                return TestResult::discard();
            };
            let Ok(again) = simplify_once(&once) else {
                return TestResult::failed();
            };
            if !st_eq(&once.expr, &again.expr) {
                // The pass budget ran out before a fixed point
                return TestResult::discard();
            }
            match simplify(&once) {
                Ok(twice) => TestResult::from_bool(st_eq(&once.expr, &twice.expr)),
                Err(_) => TestResult::failed(),
            }
        }
        QuickCheck::new()
            .tests(150)
            .quickcheck(prop as fn(SmallExpr) -> TestResult);
    }

    #[test]
    fn prop_simplify_keeps_symbols() {
        fn prop(a: SmallExpr) -> TestResult {
            let econ = econ_of(a.0);
            match simplify(&econ) {
                Ok(out) => TestResult::from_bool(out.isyms.len() == econ.isyms.len()),
                Err(_) => TestResult::discard(),
            }
        }
        QuickCheck::new()
            .tests(100)
            .quickcheck(prop as fn(SmallExpr) -> TestResult);
    }
}
