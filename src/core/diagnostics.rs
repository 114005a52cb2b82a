//! Typed error surface plus source-location tracking.
//!
//! Abstraps threads an `Option<LocationInfo>` through `OperationBuilder`
//! and renders it with `yansi` in `Display` impls; we keep that shape and
//! layer a `thiserror` enum underneath so callers can match on error
//! *category* (Dispatch / Interpreter / Lowering / Verification / Codegen)
//! instead of parsing `anyhow` message strings.

use std::fmt;
use yansi::Paint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationInfo {
    Unknown,
    FileLineCol(String, usize, usize),
    NameFileLineCol(String, String, usize, usize),
    InlinedFrom(Vec<LocationInfo>),
}

impl fmt::Display for LocationInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LocationInfo::Unknown => write!(f, "{}", Paint::magenta("<unknown>").dimmed()),
            LocationInfo::FileLineCol(file, line, col) => write!(
                f,
                "{}",
                Paint::magenta(format!("<{} @ {}:{}>", file, line, col)).dimmed()
            ),
            LocationInfo::NameFileLineCol(name, file, line, col) => write!(
                f,
                "{}",
                Paint::magenta(format!("<{} @ {} {}:{}>", name, file, line, col)).dimmed()
            ),
            LocationInfo::InlinedFrom(chain) => {
                for (i, loc) in chain.iter().enumerate() {
                    if i > 0 {
                        write!(f, " inlined from ")?;
                    }
                    write!(f, "{}", loc)?;
                }
                Ok(())
            }
        }
    }
}

/// The typed error categories the kernel can raise.
///
/// `RewriteResult::exceeded_max_iter` is *not* a variant here: exceeding a
/// fixpoint's `max_iter` is a non-fatal signal
/// carried on the result struct, not an error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("no implementation registered for `{statement}` under signature {signature:?}")]
    Dispatch {
        statement: String,
        signature: Vec<String>,
    },

    #[error("interpreter fuel exhausted after {steps} statement evaluations")]
    FuelExhausted { steps: u64 },

    #[error("call depth {depth} exceeds configured maximum {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("interpreter is already executing a call (re-entrant `call` rejected)")]
    Reentrant,

    #[error("block `{block}` terminator names a successor that does not exist")]
    MissingSuccessor { block: String },

    #[error("block `{block}` has no terminator and its region requires one")]
    NonTerminatedBlock { block: String },

    #[error("lowering does not support this construct: {0}")]
    UnsupportedConstruct(String),

    #[error("lowering could not resolve global `{0}`")]
    UnknownGlobal(String),

    #[error("statement `{statement}` expects {expected} arguments, got {found}")]
    ArityMismatch {
        statement: String,
        expected: usize,
        found: usize,
    },

    #[error("verification failed: {0}")]
    Verification(String),

    #[error("codegen failed: {0}")]
    Codegen(String),
}

pub type Result<T> = anyhow::Result<T>;
