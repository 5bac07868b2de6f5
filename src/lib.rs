//! Symbolic expression trees with TeX-style layout
//!
//! An immutable, uid-addressed expression model, a registry of named
//! structural rewrites over `(expression, symbol table)` pairs, and a box
//! layout engine that follows the TeXbook's appendix G rules.
//!
//! # Features
//! - Persistent expression trees: every node has a stable uid, and edits copy
//!   only the path to the edited node
//! - Exact rational arithmetic over big integers
//! - Named transformations grouped by domain (arithmetic, equations,
//!   matrices, linear systems, ODEs, trigonometry, norms, sequences)
//! - A bounded fixed-point simplifier
//! - Box layout with a node→box map for hit-testing, and LaTeX export
//!
//! # Usage Examples
//!
//! ## Simplifying
//! ```ignore
//! use texcas::{Econ, Expr, ISym, Simplify, SymbolTable};
//!
//! let mut isyms = SymbolTable::new();
//! let x = isyms.push(ISym::real("x"));
//! let sum = Expr::add([
//!     Expr::mul([Expr::integer(2), Expr::symbol(x)]),
//!     Expr::mul([Expr::integer(3), Expr::symbol(x)]),
//! ]);
//! let out = Simplify::new().simplify(&Econ::new(sum, isyms))?;
//! assert_eq!(texcas::to_latex(&out)?, "5{x}");
//! ```
//!
//! ## Running a named transformation
//! ```ignore
//! use texcas::transform::{self, TransformGroup};
//!
//! let det = transform::apply(TransformGroup::Matrix, "determinant", &econ, &[])?;
//! ```
//!
//! ## Layout
//! ```ignore
//! let layout = texcas::build(&econ)?;
//! let radical = layout.box_of(econ.expr.uid()).unwrap();
//! ```

mod builder;
pub mod core;
mod display;
mod error;
pub mod tex;
pub mod transform;

#[cfg(test)]
mod tests;

// Re-export key types for easier usage
pub use builder::Simplify;
pub use crate::core::{
    Case, Constant, Domain, Econ, Expr, ExprKind, FunctionName, ISym, ISymKind, LogicOperator,
    NodeKind, Paren, Rational, Relation, Suid, SymbolTable, Uid,
};
pub use display::to_latex;
pub use error::{CasError, CasResult, TreeError};
pub use tex::{Layout, MathStyle, build, build_with_style};
pub use transform::{Arity, TransformGroup, Transformation, registry};

/// Default bound on simplifier passes
pub const DEFAULT_MAX_PASSES: usize = 10;
