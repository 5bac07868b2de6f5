use thiserror::Error;

use crate::core::{Suid, Uid};

/// Structural invariant violations reported by the tree validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("uid {0} occurs more than once")]
    DuplicateUid(Uid),
    #[error("{kind} node {uid} has no sub-expressions")]
    EmptySubs { kind: &'static str, uid: Uid },
    #[error("matrix {0} has no rows or no columns")]
    EmptyMatrix(Uid),
    #[error("matrix {uid} row {row} has {found} entries, expected {expected}")]
    RaggedMatrix {
        uid: Uid,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("symbol node {uid} refers to unknown symbol {suid}")]
    DanglingSymbol { uid: Uid, suid: Suid },
}

/// Errors produced by transformations, validation and lowering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CasError {
    /// A transformation precondition failed
    #[error("{transform}: {reason}")]
    InvalidOperation {
        transform: &'static str,
        reason: String,
    },

    #[error("invalid tree: {0}")]
    InvalidTree(#[from] TreeError),

    #[error("{transform} takes {expected} extra argument(s), got {found}")]
    ArityMismatch {
        transform: &'static str,
        expected: String,
        found: usize,
    },

    #[error("symbol {0} is not in the symbol table")]
    UnresolvedSymbol(Suid),

    #[error("no metrics for glyph '{glyph}' in font {font}")]
    MissingGlyph { glyph: String, font: &'static str },
}

impl CasError {
    /// Create an InvalidOperation for the named transformation
    pub fn invalid(transform: &'static str, reason: impl Into<String>) -> Self {
        CasError::InvalidOperation {
            transform,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, CasError::InvalidOperation { .. })
    }
}

pub type CasResult<T> = Result<T, CasError>;

/// Bail out of a transformation with an InvalidOperation when `cond` is false
macro_rules! ensure {
    ($cond:expr, $transform:expr, $($msg:tt)+) => {
        if !$cond {
            return Err($crate::error::CasError::invalid($transform, format!($($msg)+)));
        }
    };
}

pub(crate) use ensure;
