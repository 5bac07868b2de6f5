//! Named transformation registry.
//!
//! A transformation is a pure rewrite `(Econ, extra args) -> Econ`, grouped
//! by domain and addressable by `(group, name)`. Each declares how many extra
//! arguments it expects. The extra arguments are usually nodes selected in
//! the tree and are matched by uid or structurally, depending on the rule.
//!
//! Three call shapes share one implementation:
//! - [`Transformation::apply`] propagates failures
//! - [`Transformation::apply_or_keep`] returns the input unchanged on an
//!   invalid operation (used when composing rules inside `simplify`)
//! - [`Transformation::apply_expr`] runs on a bare expression with an empty
//!   symbol table

use std::fmt;
use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::queries::{contains_uid, st_eq};
use crate::core::{Econ, Expr};
use crate::error::{CasError, CasResult};

pub mod arith;
pub mod base;
pub mod equal;
pub mod infer;
pub mod linear;
pub mod matrix;
pub mod norm;
pub mod ode;
pub mod seq;
pub mod simplify;
pub mod trig;

/// Domain group of a transformation
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TransformGroup {
    Base,
    Arith,
    Equal,
    Matrix,
    Linear,
    Ode,
    Trig,
    Norm,
    Seq,
}

impl TransformGroup {
    pub const ALL: [TransformGroup; 9] = [
        TransformGroup::Base,
        TransformGroup::Arith,
        TransformGroup::Equal,
        TransformGroup::Matrix,
        TransformGroup::Linear,
        TransformGroup::Ode,
        TransformGroup::Trig,
        TransformGroup::Norm,
        TransformGroup::Seq,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TransformGroup::Base => "base",
            TransformGroup::Arith => "arith",
            TransformGroup::Equal => "equal",
            TransformGroup::Matrix => "matrix",
            TransformGroup::Linear => "linear",
            TransformGroup::Ode => "ode",
            TransformGroup::Trig => "trig",
            TransformGroup::Norm => "norm",
            TransformGroup::Seq => "seq",
        }
    }
}

/// Number of extra arguments a transformation takes
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Arity {
    Fixed(usize),
    /// Any number, collected until the caller confirms
    Variadic,
}

impl Arity {
    pub const NONE: Arity = Arity::Fixed(0);

    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => n == count,
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{n}"),
            Arity::Variadic => write!(f, "any number of"),
        }
    }
}

/// Core trait for all transformations
pub trait Transformation: Send + Sync {
    fn name(&self) -> &'static str;
    fn group(&self) -> TransformGroup;

    fn arity(&self) -> Arity {
        Arity::NONE
    }

    /// The rewrite itself; preconditions are checked here
    fn transform(&self, econ: &Econ, args: &[Expr]) -> CasResult<Econ>;

    /// Run the rewrite, propagating failures.
    ///
    /// A root with a new uid takes over the original root uid unless that
    /// uid is still present somewhere in the result.
    fn apply(&self, econ: &Econ, args: &[Expr]) -> CasResult<Econ> {
        if !self.arity().accepts(args.len()) {
            return Err(CasError::ArityMismatch {
                transform: self.name(),
                expected: self.arity().to_string(),
                found: args.len(),
            });
        }
        let mut out = self.transform(econ, args)?;
        let root = econ.expr.uid();
        if out.expr.uid() != root && !contains_uid(&out.expr, root) {
            out.expr = out.expr.with_uid(root);
        }
        Ok(out)
    }

    /// Run the rewrite; an invalid operation leaves the input unchanged
    fn apply_or_keep(&self, econ: &Econ, args: &[Expr]) -> CasResult<Econ> {
        match self.apply(econ, args) {
            Err(err) if err.is_invalid_operation() => {
                debug!(transform = self.name(), %err, "rule not applicable");
                Ok(econ.clone())
            }
            other => other,
        }
    }

    /// Run on a bare expression with an empty symbol table
    fn apply_expr(&self, expr: &Expr, args: &[Expr]) -> CasResult<Expr> {
        self.apply(&Econ::bare(expr.clone()), args).map(|econ| econ.expr)
    }
}

/// Define a unit struct implementing [`Transformation`]
macro_rules! transform {
    ($struct:ident, $name:expr, $group:ident, $arity:expr, |$econ:ident, $args:ident| $body:block) => {
        pub struct $struct;

        impl $crate::transform::Transformation for $struct {
            fn name(&self) -> &'static str {
                $name
            }

            fn group(&self) -> $crate::transform::TransformGroup {
                $crate::transform::TransformGroup::$group
            }

            fn arity(&self) -> $crate::transform::Arity {
                $arity
            }

            fn transform(
                &self,
                $econ: &$crate::core::Econ,
                $args: &[$crate::core::Expr],
            ) -> $crate::error::CasResult<$crate::core::Econ> {
                $body
            }
        }
    };
}

pub(crate) use transform;

/// Keep the input when `result` is an invalid operation
pub(crate) fn or_keep(expr: &Expr, result: CasResult<Expr>) -> CasResult<Expr> {
    match result {
        Err(err) if err.is_invalid_operation() => Ok(expr.clone()),
        other => other,
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Registry of every transformation, indexed by `(group, name)`
pub struct TransformRegistry {
    transforms: Vec<Arc<dyn Transformation>>,
    index: FxHashMap<(TransformGroup, &'static str), usize>,
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn load_all(&mut self) {
        for t in base::transforms()
            .into_iter()
            .chain(arith::transforms())
            .chain(equal::transforms())
            .chain(matrix::transforms())
            .chain(linear::transforms())
            .chain(ode::transforms())
            .chain(trig::transforms())
            .chain(norm::transforms())
            .chain(seq::transforms())
        {
            self.register(t);
        }
    }

    /// Add a transformation; a later one with the same key replaces the earlier
    pub fn register(&mut self, t: Arc<dyn Transformation>) {
        let key = (t.group(), t.name());
        match self.index.get(&key) {
            Some(&i) => self.transforms[i] = t,
            None => {
                self.index.insert(key, self.transforms.len());
                self.transforms.push(t);
            }
        }
    }

    pub fn get(&self, group: TransformGroup, name: &str) -> Option<&dyn Transformation> {
        self.index
            .get(&(group, name))
            .map(|&i| self.transforms[i].as_ref())
    }

    pub fn lookup(&self, group: TransformGroup, name: &str) -> CasResult<&dyn Transformation> {
        self.get(group, name).ok_or_else(|| {
            CasError::invalid("registry", format!("no transformation {}/{name}", group.name()))
        })
    }

    /// Transformations of one group, in registration order
    pub fn by_group(&self, group: TransformGroup) -> impl Iterator<Item = &dyn Transformation> {
        self.transforms
            .iter()
            .map(|t| t.as_ref())
            .filter(move |t| t.group() == group)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Transformation> {
        self.transforms.iter().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// Global registry, built once
pub fn registry() -> &'static TransformRegistry {
    static REGISTRY: OnceLock<TransformRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = TransformRegistry::new();
        registry.load_all();
        registry
    })
}

/// Look up and run a transformation by `(group, name)`
pub fn apply(group: TransformGroup, name: &str, econ: &Econ, args: &[Expr]) -> CasResult<Econ> {
    registry().lookup(group, name)?.apply(econ, args)
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Association list keyed by structural equality
#[derive(Clone, Debug)]
pub(crate) struct StEqMap<V> {
    entries: Vec<(Expr, V)>,
}

impl<V> Default for StEqMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> StEqMap<V> {
    pub fn position(&self, key: &Expr) -> Option<usize> {
        self.entries.iter().position(|(k, _)| st_eq(k, key))
    }

    pub fn get_mut(&mut self, key: &Expr) -> Option<&mut V> {
        let i = self.position(key)?;
        Some(&mut self.entries[i].1)
    }

    /// Insert, keeping the first key's position on a structural match
    pub fn insert(&mut self, key: Expr, value: V) {
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn into_entries(self) -> Vec<(Expr, V)> {
        self.entries
    }
}

/// Position of the direct child with `uid`
pub(crate) fn index_of_uid(subs: &[Arc<Expr>], uid: crate::core::Uid) -> Option<usize> {
    subs.iter().position(|s| s.uid() == uid)
}
