//! Core types for symbolic mathematics
//!
//! This module contains the fundamental types:
//! - `Expr` / `ExprKind` - Expression tree with uid identity
//! - `Rational` - Exact rational numbers and integer helpers
//! - `ISym` / `SymbolTable` / `Econ` - Symbol system
//! - Queries, structural equality and validation
//! - Identity-preserving edits
//! - Visitor pattern for tree traversal

pub mod edits;
pub(crate) mod expr;
pub mod queries;
pub mod rational;
pub(crate) mod symbol;
pub mod visitor;

pub use expr::{
    Case, Constant, Expr, ExprKind, FunctionName, LogicOperator, NodeKind, Paren, Relation, Uid,
    next_uid,
};
pub use rational::Rational;
pub use symbol::{Domain, Econ, ISym, ISymKind, Suid, SymbolTable, next_suid};
