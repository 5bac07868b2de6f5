//! Simplifier and layout benchmarks
//!
//! Sums of N like terms with rational coefficients, and the layout of a
//! dense matrix of fractions.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use texcas::transform::{self, TransformGroup};
use texcas::{CasResult, Econ, Expr, FunctionName, ISym, Simplify, SymbolTable};

// =============================================================================
// Generators
// =============================================================================

/// `Σ (i/(i+1))·x_(i mod 5)` over `n` terms
fn like_terms(n: usize) -> Econ {
    let mut isyms = SymbolTable::new();
    let vars: Vec<_> = (0..5)
        .map(|i| isyms.push(ISym::real(format!("x_{{{i}}}"))))
        .collect();
    let terms = (1..=n).map(|i| {
        let i = i as i64;
        Expr::mul([
            Expr::rational(i, i + 1),
            Expr::symbol(vars[(i as usize) % vars.len()]),
        ])
    });
    Econ::new(Expr::add(terms), isyms)
}

/// An `n×n` matrix with `1/(i+j+1)` entries
fn hilbert(n: usize) -> Econ {
    let rows = (0..n).map(|i| {
        (0..n)
            .map(|j| Expr::fraction(Expr::one(), Expr::integer((i + j + 1) as i64)))
            .collect::<Vec<_>>()
    });
    Econ::bare(Expr::matrix(rows))
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify");
    for n in [10, 100, 300] {
        let econ = like_terms(n);
        group.bench_with_input(BenchmarkId::new("like_terms", n), &econ, |b, econ| {
            b.iter(|| Simplify::new().simplify(black_box(econ)))
        });
    }

    let det = Econ::bare(Expr::function(FunctionName::Det, hilbert(4).expr));
    group.bench_function("determinant_4x4", |b| {
        b.iter(|| -> CasResult<Econ> {
            let expanded =
                transform::apply(TransformGroup::Matrix, "determinant", black_box(&det), &[])?;
            Simplify::new().simplify(&expanded)
        })
    });
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for n in [2, 5, 10] {
        let econ = hilbert(n);
        group.bench_with_input(BenchmarkId::new("hilbert", n), &econ, |b, econ| {
            b.iter(|| texcas::build(black_box(econ)))
        });
    }
    let sum = like_terms(100);
    group.bench_function("latex_like_terms_100", |b| {
        b.iter(|| texcas::to_latex(black_box(&sum)))
    });
    group.finish();
}

criterion_group!(benches, bench_simplify, bench_layout);
criterion_main!(benches);
