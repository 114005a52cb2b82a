//! The rewrite rule trait and its control combinators.
//!
//! Grounded in abstraps's `core::pass::Pass` hook shape (one optional
//! method per granularity of the IR, each reporting whether it changed
//! anything), generalized into a monotone [`RewriteResult`] so
//! [`Fixpoint`] has a principled halting condition to iterate
//! on instead of a bare boolean.

use crate::core::ident::BlockId;
use crate::core::ir::RegionData;
use crate::core::value::StmtId;

/// The outcome of running one rewrite pass over some scope of the IR
///. `join` is the least upper bound two
/// sequential or nested runs combine under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewriteResult {
    pub has_done_something: bool,
    pub terminated: bool,
    pub exceeded_max_iter: bool,
}

impl RewriteResult {
    pub fn unchanged() -> RewriteResult {
        RewriteResult::default()
    }

    pub fn changed() -> RewriteResult {
        RewriteResult { has_done_something: true,..RewriteResult::default() }
    }

    pub fn join(self, other: RewriteResult) -> RewriteResult {
        RewriteResult {
            has_done_something: self.has_done_something || other.has_done_something,
            terminated: self.terminated || other.terminated,
            exceeded_max_iter: self.exceeded_max_iter || other.exceeded_max_iter,
        }
    }
}

/// A single rewrite rule. Every hook defaults
/// to a no-op so a rule that only cares about, say, individual statements
/// (`ConstantFold`) doesn't have to stub out the block/region hooks.
pub trait RewriteRule {
    fn rewrite_region(&self, _region: &mut RegionData) -> anyhow::Result<RewriteResult> {
        Ok(RewriteResult::unchanged())
    }

    fn rewrite_block(&self, _region: &mut RegionData, _block: BlockId) -> anyhow::Result<RewriteResult> {
        Ok(RewriteResult::unchanged())
    }

    fn rewrite_statement(&self, _region: &mut RegionData, _stmt: StmtId) -> anyhow::Result<RewriteResult> {
        Ok(RewriteResult::unchanged())
    }

    /// One full pass of this rule over `region`: the region hook, then every
    /// block's hook, then every live statement's hook.
    fn walk_once(&self, region: &mut RegionData) -> anyhow::Result<RewriteResult> {
        let mut result = self.rewrite_region(region)?;
        let blocks: Vec<BlockId> = region.block_order().to_vec();
        for block in blocks {
            if region.block(block).is_none() {
                continue; // a prior hook in this same pass may have removed it
            }
            result = result.join(self.rewrite_block(region, block)?);
            let stmts: Vec<StmtId> = region.statements_in(block).to_vec();
            for stmt in stmts {
                if region.stmt(stmt).is_none() {
                    continue; // likewise for statements deleted mid-pass
                }
                result = result.join(self.rewrite_statement(region, stmt)?);
            }
        }
        Ok(result)
    }
}

/// Run `rule` exactly once over `region`.
pub struct Walk<R>(pub R);

impl<R: RewriteRule> Walk<R> {
    pub fn run(&self, region: &mut RegionData) -> anyhow::Result<RewriteResult> {
        self.0.walk_once(region)
    }
}

/// Run `rule` repeatedly until it reports no further progress or `max_iter`
/// passes have run, whichever comes first.
pub struct Fixpoint<R> {
    pub rule: R,
    pub max_iter: usize,
}

impl<R: RewriteRule> Fixpoint<R> {
    pub fn new(rule: R, max_iter: usize) -> Fixpoint<R> {
        Fixpoint { rule, max_iter }
    }

    pub fn run(&self, region: &mut RegionData) -> anyhow::Result<RewriteResult> {
        let mut total = RewriteResult::unchanged();
        for i in 0..self.max_iter {
            let step = self.rule.walk_once(region)?;
            total = total.join(step);
            if !step.has_done_something {
                total.terminated = true;
                return Ok(total);
            }
            if i + 1 == self.max_iter {
                total.exceeded_max_iter = true;
            }
        }
        Ok(total)
    }
}

/// Run a fixed sequence of rules, each to its own single pass, in order.
pub struct Chain(pub Vec<Box<dyn Fn(&mut RegionData) -> anyhow::Result<RewriteResult>>>);

impl Chain {
    pub fn run(&self, region: &mut RegionData) -> anyhow::Result<RewriteResult> {
        let mut total = RewriteResult::unchanged();
        for step in &self.0 {
            total = total.join(step(region)?);
        }
        Ok(total)
    }
}
