//! Unconditional and conditional control transfer.
//!
//! Grounded in abstraps's `dialects::builtin::intrinsics::{Branch,
//! ConditionalBranch}` — both terminators, both carrying their target
//! block(s) in `StatementData::successors` rather than as attributes, so the
//! generic `RegionData::successors_of` walk (used by `analysis::cfg`) never
//! has to know which dialect it is looking at.

use crate::core::ir::{StatementKind, StatementView};
use crate::core::traits::Trait;

/// `cf.br` — unconditional jump to its sole successor.
#[derive(Debug, Clone, Copy)]
pub struct Branch;

impl StatementKind for Branch {
    fn dialect(&self) -> &'static str {
        "cf"
    }
    fn name(&self) -> &'static str {
        "br"
    }
    fn traits(&self) -> &'static [Trait] {
        &[Trait::IsTerminator]
    }
    fn verify(&self, stmt: &StatementView) -> anyhow::Result<()> {
        if stmt.data.successors.len() != 1 {
            anyhow::bail!("cf.br must have exactly one successor");
        }
        Ok(())
    }
}

/// `cf.cond_br` — branches to `successors[0]` if its sole (boolean) operand
/// is true, else `successors[1]`.
#[derive(Debug, Clone, Copy)]
pub struct ConditionalBranch;

impl StatementKind for ConditionalBranch {
    fn dialect(&self) -> &'static str {
        "cf"
    }
    fn name(&self) -> &'static str {
        "cond_br"
    }
    fn traits(&self) -> &'static [Trait] {
        &[Trait::IsTerminator]
    }
    fn verify(&self, stmt: &StatementView) -> anyhow::Result<()> {
        if stmt.data.args.len() != 1 {
            anyhow::bail!("cf.cond_br takes exactly one condition operand");
        }
        if stmt.data.successors.len() != 2 {
            anyhow::bail!("cf.cond_br must have exactly two successors");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ir::RegionData;

    #[test]
    fn cond_br_requires_two_successors() {
        let mut r = RegionData::new();
        let entry = r.append_block(vec![]);
        let then_blk = r.append_block(vec![]);
        let else_blk = r.append_block(vec![]);
        let cond = r.block_arg(entry, 0);
        assert!(cond.is_none());
        let (c, cr) = r
        .construct(
            entry,
            Box::new(crate::dialects::arith::Constant),
            vec![],
            vec![crate::core::attribute::TypeAttribute::class("bool")],
            crate::dialects::arith::Constant::attrs(1),
            vec![],
            vec![],
        )
        .unwrap();
        let _ = c;
        let (id, _) = r
        .construct(entry, Box::new(ConditionalBranch), vec![cr[0]], vec![], Default::default(), vec![then_blk, else_blk], vec![])
        .unwrap();
        let stmt = r.stmt(id).unwrap();
        assert_eq!(stmt.successors.len(), 2);
    }
}
