//! Expression tree.
//!
//! This module defines:
//! - `Expr` - an immutable node carrying its [`Uid`] and parenthesis override
//! - `ExprKind` - the closed set of node variants
//! - `NodeKind` - a payload-free tag used for fast variant filtering
//!
//! # Identity
//!
//! Every node gets a process-unique [`Uid`] when it is created. The uid is the
//! only key used to locate or replace a node, and it never takes part in
//! equality: `==` on [`Expr`] is structural (see [`crate::core::queries::st_eq`]).
//!
//! Children are shared through `Arc`, so rebuilding the path to a node
//! leaves every other subtree (and its uids) untouched.

mod constructors;

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use num_bigint::BigInt;
use num_traits::Signed;

use super::rational::Rational;
use super::symbol::Suid;

// =============================================================================
// NODE IDENTITY
// =============================================================================

static UID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(u64);

impl Uid {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub fn next_uid() -> Uid {
    Uid(UID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Parenthesis override
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Paren {
    /// Let the layout decide
    #[default]
    Auto,
    Off,
    On,
}

// =============================================================================
// VALUE ENUMS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    I,
    E,
    Pi,
    Infinity,
}

impl Constant {
    pub fn name(self) -> &'static str {
        match self {
            Constant::I => "i",
            Constant::E => "e",
            Constant::Pi => "pi",
            Constant::Infinity => "infty",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionName {
    Sin,
    Arcsin,
    Cos,
    Arccos,
    Tan,
    Det,
    Ln,
}

impl FunctionName {
    pub fn name(self) -> &'static str {
        match self {
            FunctionName::Sin => "sin",
            FunctionName::Arcsin => "arcsin",
            FunctionName::Cos => "cos",
            FunctionName::Arccos => "arccos",
            FunctionName::Tan => "tan",
            FunctionName::Det => "det",
            FunctionName::Ln => "ln",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicOperator {
    And,
    Or,
}

impl LogicOperator {
    pub fn latex(self) -> &'static str {
        match self {
            LogicOperator::And => "\\land",
            LogicOperator::Or => "\\lor",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Less,
    Greater,
    LessEq,
    GreaterEq,
}

impl Relation {
    pub fn latex(self) -> &'static str {
        match self {
            Relation::Less => "<",
            Relation::Greater => ">",
            Relation::LessEq => "\\le",
            Relation::GreaterEq => "\\ge",
        }
    }
}

// =============================================================================
// EXPRESSION
// =============================================================================

/// A branch of a `Cases` node
#[derive(Clone, Debug)]
pub struct Case {
    pub expr: Arc<Expr>,
    pub cond: Arc<Expr>,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    /// Empty slot to be filled in later
    PlaceHolder,
    Symbol(Suid),
    Rational(Rational),
    SpecialConstant(Constant),
    SpecialFunction {
        name: FunctionName,
        arg: Arc<Expr>,
    },
    Add(Vec<Arc<Expr>>),
    Mul {
        subs: Vec<Arc<Expr>>,
        /// Render with an explicit `×`
        display_operator: bool,
    },
    Pow {
        base: Arc<Expr>,
        exp: Arc<Expr>,
    },
    Fraction {
        num: Arc<Expr>,
        den: Arc<Expr>,
    },
    Derivative {
        func: Arc<Expr>,
        indep: Arc<Expr>,
        order: u32,
    },
    DefinedBy {
        left: Arc<Expr>,
        right: Arc<Expr>,
    },
    Cases(Vec<Case>),
    Equal {
        left: Arc<Expr>,
        right: Arc<Expr>,
    },
    Group(Vec<Arc<Expr>>),
    LogicOp {
        op: LogicOperator,
        subs: Vec<Arc<Expr>>,
    },
    Compare {
        first: Arc<Expr>,
        rest: Vec<(Relation, Arc<Expr>)>,
    },
    /// Row-major
    Matrix(Vec<Vec<Arc<Expr>>>),
    Norm(Arc<Expr>),
    ComplexConjugate(Arc<Expr>),
    Integral {
        integrand: Arc<Expr>,
        var: Arc<Expr>,
    },
    InfiniteSequence {
        elem: Arc<Expr>,
        index: Suid,
    },
}

/// Variant tag without payload
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NodeKind {
    PlaceHolder,
    Symbol,
    Rational,
    SpecialConstant,
    SpecialFunction,
    Add,
    Mul,
    Pow,
    Fraction,
    Derivative,
    DefinedBy,
    Cases,
    Equal,
    Group,
    LogicOp,
    Compare,
    Matrix,
    Norm,
    ComplexConjugate,
    Integral,
    InfiniteSequence,
}

impl NodeKind {
    #[inline]
    pub fn of(expr: &Expr) -> Self {
        match &expr.kind {
            ExprKind::PlaceHolder => NodeKind::PlaceHolder,
            ExprKind::Symbol(_) => NodeKind::Symbol,
            ExprKind::Rational(_) => NodeKind::Rational,
            ExprKind::SpecialConstant(_) => NodeKind::SpecialConstant,
            ExprKind::SpecialFunction { .. } => NodeKind::SpecialFunction,
            ExprKind::Add(_) => NodeKind::Add,
            ExprKind::Mul { .. } => NodeKind::Mul,
            ExprKind::Pow { .. } => NodeKind::Pow,
            ExprKind::Fraction { .. } => NodeKind::Fraction,
            ExprKind::Derivative { .. } => NodeKind::Derivative,
            ExprKind::DefinedBy { .. } => NodeKind::DefinedBy,
            ExprKind::Cases(_) => NodeKind::Cases,
            ExprKind::Equal { .. } => NodeKind::Equal,
            ExprKind::Group(_) => NodeKind::Group,
            ExprKind::LogicOp { .. } => NodeKind::LogicOp,
            ExprKind::Compare { .. } => NodeKind::Compare,
            ExprKind::Matrix(_) => NodeKind::Matrix,
            ExprKind::Norm(_) => NodeKind::Norm,
            ExprKind::ComplexConjugate(_) => NodeKind::ComplexConjugate,
            ExprKind::Integral { .. } => NodeKind::Integral,
            ExprKind::InfiniteSequence { .. } => NodeKind::InfiniteSequence,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::PlaceHolder => "PlaceHolder",
            NodeKind::Symbol => "Symbol",
            NodeKind::Rational => "Rational",
            NodeKind::SpecialConstant => "SpecialConstant",
            NodeKind::SpecialFunction => "SpecialFunction",
            NodeKind::Add => "Add",
            NodeKind::Mul => "Mul",
            NodeKind::Pow => "Pow",
            NodeKind::Fraction => "Fraction",
            NodeKind::Derivative => "Derivative",
            NodeKind::DefinedBy => "DefinedBy",
            NodeKind::Cases => "Cases",
            NodeKind::Equal => "Equal",
            NodeKind::Group => "Group",
            NodeKind::LogicOp => "LogicOp",
            NodeKind::Compare => "Compare",
            NodeKind::Matrix => "Matrix",
            NodeKind::Norm => "Norm",
            NodeKind::ComplexConjugate => "ComplexConjugate",
            NodeKind::Integral => "Integral",
            NodeKind::InfiniteSequence => "InfiniteSequence",
        }
    }
}

/// Expression node
#[derive(Clone, Debug)]
pub struct Expr {
    pub(crate) uid: Uid,
    pub(crate) paren: Paren,
    pub(crate) kind: ExprKind,
}

impl Deref for Expr {
    type Target = ExprKind;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

impl Expr {
    #[inline]
    pub fn uid(&self) -> Uid {
        self.uid
    }

    #[inline]
    pub fn paren(&self) -> Paren {
        self.paren
    }

    #[inline]
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    #[inline]
    pub fn node_kind(&self) -> NodeKind {
        NodeKind::of(self)
    }

    pub fn into_kind(self) -> ExprKind {
        self.kind
    }

    /// Same node with another uid
    pub fn with_uid(&self, uid: Uid) -> Expr {
        Expr {
            uid,
            paren: self.paren,
            kind: self.kind.clone(),
        }
    }

    pub fn with_paren(&self, paren: Paren) -> Expr {
        Expr {
            uid: self.uid,
            paren,
            kind: self.kind.clone(),
        }
    }

    /// Same uid and override, new payload
    pub fn with_kind(&self, kind: ExprKind) -> Expr {
        Expr {
            uid: self.uid,
            paren: self.paren,
            kind,
        }
    }

    // -------------------------------------------------------------------------
    // Predicates
    // -------------------------------------------------------------------------

    pub fn as_rational(&self) -> Option<&Rational> {
        match &self.kind {
            ExprKind::Rational(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_rational(&self) -> bool {
        matches!(self.kind, ExprKind::Rational(_))
    }

    /// Rational with `q == 1`
    pub fn is_integer(&self) -> bool {
        self.as_rational().is_some_and(|r| num_traits::One::is_one(&r.q))
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        self.as_rational()
            .filter(|r| num_traits::One::is_one(&r.q))
            .map(|r| &r.p)
    }

    pub fn is_zero(&self) -> bool {
        self.as_rational().is_some_and(Rational::is_zero)
    }

    pub fn is_one(&self) -> bool {
        self.as_rational().is_some_and(Rational::is_one)
    }

    pub fn is_neg_one(&self) -> bool {
        self.as_rational()
            .is_some_and(|r| r.p.abs() == r.q.abs() && r.is_negative())
    }

    /// Exactly 1/2 in value
    pub fn is_half(&self) -> bool {
        self.as_rational()
            .is_some_and(|r| *r == Rational::new(1, 2))
    }

    /// `Pow(_, -1)`
    pub fn is_inverse(&self) -> bool {
        matches!(&self.kind, ExprKind::Pow { exp, .. } if exp.is_neg_one())
    }

    /// `Pow(_, 1/2)`
    pub fn is_sqrt(&self) -> bool {
        matches!(&self.kind, ExprKind::Pow { exp, .. } if exp.is_half())
    }

    pub fn is_constant(&self, c: Constant) -> bool {
        matches!(self.kind, ExprKind::SpecialConstant(k) if k == c)
    }

    pub fn is_function(&self, name: FunctionName) -> bool {
        matches!(&self.kind, ExprKind::SpecialFunction { name: n, .. } if *n == name)
    }

    pub fn is_symbol(&self, suid: Suid) -> bool {
        matches!(self.kind, ExprKind::Symbol(s) if s == suid)
    }

    pub fn is_add(&self) -> bool {
        matches!(self.kind, ExprKind::Add(_))
    }

    pub fn is_mul(&self) -> bool {
        matches!(self.kind, ExprKind::Mul { .. })
    }

    /// Subs of an Add, Mul, Group or LogicOp
    pub fn subs(&self) -> Option<&[Arc<Expr>]> {
        match &self.kind {
            ExprKind::Add(subs)
            | ExprKind::Mul { subs, .. }
            | ExprKind::Group(subs)
            | ExprKind::LogicOp { subs, .. } => Some(subs),
            _ => None,
        }
    }

    /// Rows of a matrix
    pub fn rows(&self) -> Option<&[Vec<Arc<Expr>>]> {
        match &self.kind {
            ExprKind::Matrix(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn is_square_matrix(&self) -> bool {
        self.rows()
            .is_some_and(|rows| rows.iter().all(|row| row.len() == rows.len()))
    }

    /// Direct children in traversal order
    pub fn children(&self) -> Vec<&Arc<Expr>> {
        match &self.kind {
            ExprKind::PlaceHolder
            | ExprKind::Symbol(_)
            | ExprKind::Rational(_)
            | ExprKind::SpecialConstant(_) => Vec::new(),
            ExprKind::SpecialFunction { arg, .. } => vec![arg],
            ExprKind::Add(subs)
            | ExprKind::Mul { subs, .. }
            | ExprKind::Group(subs)
            | ExprKind::LogicOp { subs, .. } => subs.iter().collect(),
            ExprKind::Pow { base, exp } => vec![base, exp],
            ExprKind::Fraction { num, den } => vec![num, den],
            ExprKind::Derivative { func, indep, .. } => vec![func, indep],
            ExprKind::DefinedBy { left, right } | ExprKind::Equal { left, right } => {
                vec![left, right]
            }
            ExprKind::Cases(cases) => cases.iter().flat_map(|c| [&c.expr, &c.cond]).collect(),
            ExprKind::Compare { first, rest } => std::iter::once(first)
                .chain(rest.iter().map(|(_, e)| e))
                .collect(),
            ExprKind::Matrix(rows) => rows.iter().flatten().collect(),
            ExprKind::Norm(sub) | ExprKind::ComplexConjugate(sub) => vec![sub],
            ExprKind::Integral { integrand, var } => vec![integrand, var],
            ExprKind::InfiniteSequence { elem, .. } => vec![elem],
        }
    }

    /// Rebuild the payload with every child passed through `f`, in traversal order
    pub fn map_children<F>(&self, mut f: F) -> ExprKind
    where
        F: FnMut(&Arc<Expr>) -> Arc<Expr>,
    {
        match &self.kind {
            ExprKind::PlaceHolder
            | ExprKind::Symbol(_)
            | ExprKind::Rational(_)
            | ExprKind::SpecialConstant(_) => self.kind.clone(),
            ExprKind::SpecialFunction { name, arg } => ExprKind::SpecialFunction {
                name: *name,
                arg: f(arg),
            },
            ExprKind::Add(subs) => ExprKind::Add(map_subs(subs, &mut f)),
            ExprKind::Mul {
                subs,
                display_operator,
            } => ExprKind::Mul {
                subs: map_subs(subs, &mut f),
                display_operator: *display_operator,
            },
            ExprKind::Group(subs) => ExprKind::Group(map_subs(subs, &mut f)),
            ExprKind::LogicOp { op, subs } => ExprKind::LogicOp {
                op: *op,
                subs: map_subs(subs, &mut f),
            },
            ExprKind::Pow { base, exp } => {
                let base = f(base);
                ExprKind::Pow { base, exp: f(exp) }
            }
            ExprKind::Fraction { num, den } => {
                let num = f(num);
                ExprKind::Fraction { num, den: f(den) }
            }
            ExprKind::Derivative { func, indep, order } => {
                let func = f(func);
                ExprKind::Derivative {
                    func,
                    indep: f(indep),
                    order: *order,
                }
            }
            ExprKind::DefinedBy { left, right } => {
                let left = f(left);
                ExprKind::DefinedBy {
                    left,
                    right: f(right),
                }
            }
            ExprKind::Equal { left, right } => {
                let left = f(left);
                ExprKind::Equal {
                    left,
                    right: f(right),
                }
            }
            ExprKind::Cases(cases) => ExprKind::Cases(
                cases
                    .iter()
                    .map(|c| {
                        let expr = f(&c.expr);
                        Case {
                            expr,
                            cond: f(&c.cond),
                        }
                    })
                    .collect(),
            ),
            ExprKind::Compare { first, rest } => {
                let first = f(first);
                ExprKind::Compare {
                    first,
                    rest: rest.iter().map(|(op, e)| (*op, f(e))).collect(),
                }
            }
            ExprKind::Matrix(rows) => {
                ExprKind::Matrix(rows.iter().map(|row| map_subs(row, &mut f)).collect())
            }
            ExprKind::Norm(sub) => ExprKind::Norm(f(sub)),
            ExprKind::ComplexConjugate(sub) => ExprKind::ComplexConjugate(f(sub)),
            ExprKind::Integral { integrand, var } => {
                let integrand = f(integrand);
                ExprKind::Integral {
                    integrand,
                    var: f(var),
                }
            }
            ExprKind::InfiniteSequence { elem, index } => ExprKind::InfiniteSequence {
                elem: f(elem),
                index: *index,
            },
        }
    }
}

fn map_subs<F>(subs: &[Arc<Expr>], f: &mut F) -> Vec<Arc<Expr>>
where
    F: FnMut(&Arc<Expr>) -> Arc<Expr>,
{
    subs.iter().map(|s| f(s)).collect()
}

impl PartialEq for Expr {
    /// Structural equality; uid and parenthesis override are ignored
    fn eq(&self, other: &Self) -> bool {
        super::queries::st_eq(self, other)
    }
}
