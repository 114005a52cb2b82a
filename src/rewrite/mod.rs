//! Rewriting: the [`RewriteRule`] trait, its control combinators (`Walk`,
//! `Fixpoint`, `Chain`), and the canonical passes built on top of them.

pub mod passes;
pub mod rule;

pub use passes::{
    call2invoke, call_graph_pass, cfg_compactify, inline_call_site, wrap_const, CommonSubexpressionElimination,
    ConstHint, ConstantFold, DeadCodeElimination, GlobalValueElimination, CONST_HINT_KEY,
};
pub use rule::{Chain, Fixpoint, RewriteResult, RewriteRule, Walk};
