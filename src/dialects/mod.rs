//! Demonstration dialects. Each is a thin set of
//! [`StatementKind`](crate::core::ir::StatementKind) implementations plus a
//! `Dialect` builder wiring them into the interpretation/constprop/typeinfer
//! registries; none of them is meant to be a production instruction set —
//! they exist to exercise every kernel module end to end.

#[cfg(feature = "arith")]
pub mod arith;

#[cfg(feature = "func")]
pub mod func;

#[cfg(feature = "cf")]
pub mod cf;

use crate::core::dialect::Dialect;

/// Assemble the `arith` dialect's declaration (statement kinds only; the
/// interpretation/constprop/typeinfer tables are registered by the analysis
/// modules that own those concerns, via [`Dialect::interp`]).
#[cfg(feature = "arith")]
pub fn arith_dialect() -> Dialect {
    Dialect::new("arith")
}

#[cfg(feature = "func")]
pub fn func_dialect() -> Dialect {
    Dialect::new("func")
}

#[cfg(feature = "cf")]
pub fn cf_dialect() -> Dialect {
    Dialect::new("cf")
}
