//! SSA values and uses.
//!
//! Abstraps represents every SSA reference with a single flat `Var(usize)`
//! newtype and never tracks def-use edges at all (nothing in `core::ir`
//! records who uses a `Var`). Real def-use symmetry matters for dead-code
//! elimination and use-count queries, so this module generalizes `Var` into a typed handle that
//! distinguishes block arguments from statement results, and adds the
//! `Use` side-table abstraps's IR does not have.

use std::fmt;

use super::ident::BlockId;

/// A statement identity, unique within the [`RegionData`](super::ir::RegionData)
/// that owns it. Never reused once issued, so it remains a valid arena key
/// even after the statement it named has been deleted (deletion is checked
/// for separately via `RegionData::stmts.contains_key`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StmtId(pub(crate) usize);

impl fmt::Display for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A use-def reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SSAValue {
    /// Owned by exactly one block; `index` matches its position in that
    /// block's argument list.
    BlockArgument { block: BlockId, index: usize },
    /// Owned by exactly one statement; `index` matches its position in that
    /// statement's result list.
    Result { stmt: StmtId, index: usize },
}

impl fmt::Display for SSAValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SSAValue::BlockArgument { block, index } => write!(f, "%{}.arg{}", block, index),
            SSAValue::Result { stmt, index } => write!(f, "%{}.{}", stmt, index),
        }
    }
}

/// A `(user statement, operand index)` pair, maintained bidirectionally with
/// the defining [`SSAValue`]'s use-set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Use {
    pub user: StmtId,
    pub operand: usize,
}

impl Use {
    pub fn new(user: StmtId, operand: usize) -> Self {
        Use { user, operand }
    }
}
