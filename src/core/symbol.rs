//! Symbol table.
//!
//! Symbol nodes carry only a [`Suid`]; names, domains and every other piece
//! of symbol information live in an ordered [`SymbolTable`] travelling with
//! the expression as an [`Econ`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::expr::Expr;
use crate::error::{CasError, CasResult};

static SUID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Symbol identity, unique per process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Suid(u64);

impl Suid {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Suid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

pub fn next_suid() -> Suid {
    Suid(SUID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Set a symbol ranges over
#[derive(Clone, Debug)]
pub enum Domain {
    Integer,
    Real,
    /// Real numbers restricted by a condition (usually a `Compare` on the symbol)
    RealWhere(Arc<Expr>),
}

#[derive(Clone, Debug)]
pub enum ISymKind {
    Variable { domain: Domain },
    Constant { domain: Domain },
    IndeterminateConstant { domain: Domain },
    Function { vars: Vec<Suid>, show_variables: bool },
    GeneratedConstant,
    /// Stands for the subtree it replaced
    NodeReplacement { replaced: Arc<Expr> },
    /// Bound index of a sequence
    Context,
}

/// Symbol table entry
#[derive(Clone, Debug)]
pub struct ISym {
    pub suid: Suid,
    pub name: String,
    pub kind: ISymKind,
}

impl ISym {
    pub fn new(name: impl Into<String>, kind: ISymKind) -> Self {
        ISym {
            suid: next_suid(),
            name: name.into(),
            kind,
        }
    }

    pub fn variable(name: impl Into<String>, domain: Domain) -> Self {
        ISym::new(name, ISymKind::Variable { domain })
    }

    pub fn real(name: impl Into<String>) -> Self {
        ISym::variable(name, Domain::Real)
    }

    pub fn constant(name: impl Into<String>, domain: Domain) -> Self {
        ISym::new(name, ISymKind::Constant { domain })
    }

    pub fn function(name: impl Into<String>, vars: Vec<Suid>) -> Self {
        ISym::new(
            name,
            ISymKind::Function {
                vars,
                show_variables: false,
            },
        )
    }

    pub fn domain(&self) -> Option<&Domain> {
        match &self.kind {
            ISymKind::Variable { domain }
            | ISymKind::Constant { domain }
            | ISymKind::IndeterminateConstant { domain } => Some(domain),
            _ => None,
        }
    }

    /// Fresh symbol node pointing at this entry
    pub fn to_expr(&self) -> Expr {
        Expr::symbol(self.suid)
    }
}

/// Ordered list of symbol entries
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: Vec<ISym>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, suid: Suid) -> Option<&ISym> {
        self.entries.iter().find(|s| s.suid == suid)
    }

    pub fn resolve(&self, suid: Suid) -> CasResult<&ISym> {
        self.get(suid).ok_or(CasError::UnresolvedSymbol(suid))
    }

    pub fn contains(&self, suid: Suid) -> bool {
        self.get(suid).is_some()
    }

    pub fn push(&mut self, isym: ISym) -> Suid {
        let suid = isym.suid;
        self.entries.push(isym);
        suid
    }

    /// Replace the entry with the same suid in place, or append
    pub fn upsert(&mut self, isym: ISym) {
        match self.entries.iter_mut().find(|s| s.suid == isym.suid) {
            Some(slot) => *slot = isym,
            None => self.entries.push(isym),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ISym> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ISym> for SymbolTable {
    fn from_iter<T: IntoIterator<Item = ISym>>(iter: T) -> Self {
        SymbolTable {
            entries: iter.into_iter().collect(),
        }
    }
}

/// An expression together with its symbol table
#[derive(Clone, Debug)]
pub struct Econ {
    pub expr: Expr,
    pub isyms: SymbolTable,
}

impl Econ {
    pub fn new(expr: Expr, isyms: SymbolTable) -> Self {
        Econ { expr, isyms }
    }

    /// Expression with an empty symbol table
    pub fn bare(expr: Expr) -> Self {
        Econ::new(expr, SymbolTable::new())
    }

    pub fn with_expr(&self, expr: Expr) -> Self {
        Econ::new(expr, self.isyms.clone())
    }
}
