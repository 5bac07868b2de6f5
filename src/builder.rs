//! Builder pattern API for simplification
//!
//! Provides a fluent interface for configuring and running the fixed-point
//! simplifier.
//!
//! # Example
//! ```ignore
//! use texcas::{Econ, Expr, Simplify};
//!
//! let econ = Econ::bare(Expr::fraction(Expr::one(), Expr::one()));
//! let simplified = Simplify::new().max_passes(4).simplify(&econ)?;
//! assert!(simplified.expr.is_one());
//! ```

use crate::core::{Econ, Expr};
use crate::error::CasResult;
use crate::transform::simplify::simplify_with;
use crate::DEFAULT_MAX_PASSES;

/// Builder for simplification operations
#[derive(Clone, Debug)]
pub struct Simplify {
    max_passes: usize,
}

impl Default for Simplify {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl Simplify {
    /// Create a new simplification builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on bottom-up passes before giving up on a fixed point
    pub fn max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// Simplify an expression together with its symbol table
    pub fn simplify(&self, econ: &Econ) -> CasResult<Econ> {
        simplify_with(econ, self.max_passes)
    }

    /// Simplify a bare expression with an empty symbol table
    pub fn simplify_expr(&self, expr: &Expr) -> CasResult<Expr> {
        self.simplify(&Econ::bare(expr.clone())).map(|econ| econ.expr)
    }
}
