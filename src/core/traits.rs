//! Declarative trait markers attached to statement *kinds*.
//!
//! Abstraps models this with a fully dynamic `Box<dyn IntrinsicTrait>`
//! list plus `downcast_rs`-based `check_trait`/`get_trait`/`has_trait`
//! helpers on `Operation`. This kernel instead takes the bitset route:
//! traits are a closed, tagged enum
//! rather than open trait objects, which keeps dispatch and verification
//! allocation-free. Structured accessors
//! (`CallableStmtInterface.get_callable_region`, `SymbolOpInterface.get_sym_name`)
//! are still expressed as real traits on `StatementKind`, queried via
//! `downcast_rs`, exactly as abstraps queries `IntrinsicTrait` impls.

use downcast_rs::Downcast;

use crate::core::ir::{RegionData, StatementView};

/// A marker attached to a statement *kind*.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trait {
    Pure,
    MaybePure,
    ConstantLike,
    IsTerminator,
    NoTerminator,
    IsolatedFromAbove,
    SSACFGRegion,
    CallableStmtInterface,
    SymbolOpInterface,
    FromPythonCall,
    FromPythonWith,
    /// `HasParent(kind_name)` — this statement may only appear nested
    /// (directly or transitively) inside a statement whose `StatementKind`
    /// reports `kind_name()` equal to the given name.
    HasParent(&'static str),
}

/// A statement kind bearing [`Trait::CallableStmtInterface`] must implement
/// this to expose its callable body.
pub trait CallableStmtInterface: Downcast {
    /// Index of the region (within the owning statement's `regions`) that
    /// constitutes the callable body.
    fn callable_region_index(&self) -> usize {
        0
    }
    fn arg_names(&self) -> &[String];
}
downcast_rs::impl_downcast!(CallableStmtInterface);

/// A statement kind bearing [`Trait::SymbolOpInterface`] must implement this
/// to expose the symbol name it defines.
pub trait SymbolOpInterface: Downcast {
    fn sym_name<'a>(&self, stmt: &'a StatementView) -> anyhow::Result<&'a str>;
}
downcast_rs::impl_downcast!(SymbolOpInterface);

/// Verify the structural/trait-level invariants a single statement must
/// satisfy, independent of its kind-specific `StatementKind::verify` hook:
/// terminator placement and parent-chain membership.
pub fn verify_traits(
    stmt: &StatementView,
    is_last_in_block: bool,
    region_requires_terminator: bool,
    ancestor_kind_names: &[&str],
) -> anyhow::Result<()> {
    let traits = stmt.kind.traits();
    let is_terminator = traits.contains(&Trait::IsTerminator);
    if is_terminator && !is_last_in_block {
        anyhow::bail!(
            "`{}` carries IsTerminator but is not the last statement of its block",
            stmt.kind.name()
        );
    }
    if is_last_in_block && region_requires_terminator && !is_terminator {
        anyhow::bail!(
            "block ends in `{}`, which is not a terminator, but its region requires one",
            stmt.kind.name()
        );
    }
    for tr in traits {
        if let Trait::HasParent(expected) = tr {
            if !ancestor_kind_names.contains(expected) {
                anyhow::bail!(
                    "`{}` requires an ancestor of kind `{}`, found none in {:?}",
                    stmt.kind.name(),
                    expected,
                    ancestor_kind_names
                );
            }
        }
    }
    Ok(())
}

/// Whether a region should skip the terminator-discipline check.
pub fn region_is_no_terminator(region: &RegionData) -> bool {
    region.no_terminator
}
