//! Stack-discipline IR construction, consumed by lowering front-ends.
//!
//! Grounded in abstraps's `OperationBuilder`, whose `cursor: (usize,
//! usize)` tracks "current region, current block" as the builder descends
//! into nested regions; this module keeps that cursor-stack shape
//! (`push_frame`/`pop_frame`) but targets the arena-backed `RegionData` of
//! `core::ir` instead of abstraps's recursive `Region` enum.

use std::any::Any;
use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::core::attribute::{Attribute, TypeAttribute};
use crate::core::ident::BlockId;
use crate::core::ir::{RegionData, StatementKind};
use crate::core::value::{SSAValue, StmtId};

/// One entry in the builder's cursor stack: a region under construction
/// plus which of its blocks statements are currently being appended to.
struct Frame {
    region: RegionData,
    current_block: BlockId,
}

/// What `lookup_global` can resolve a host identifier to.
pub enum GlobalBinding {
    Method(String),
    StatementCtor(&'static str),
    Host(Box<dyn Any>),
}

/// Stack-discipline frame-scoped IR construction.
#[derive(Default)]
pub struct IrBuilder {
    stack: Vec<Frame>,
    globals: HashMap<String, GlobalBinding>,
}

impl IrBuilder {
    pub fn new() -> Self {
        IrBuilder { stack: Vec::new(), globals: HashMap::new() }
    }

    pub fn register_global(&mut self, name: &str, binding: GlobalBinding) {
        self.globals.insert(name.to_string(), binding);
    }

    pub fn lookup_global(&self, name: &str) -> Option<&GlobalBinding> {
        self.globals.get(name)
    }

    /// Begin building a new region: push a frame with one entry block whose
    /// arguments are `entry_args`.
    pub fn push_frame(&mut self, entry_args: Vec<TypeAttribute>, no_terminator: bool) -> BlockId {
        let mut region = if no_terminator { RegionData::with_no_terminator() } else { RegionData::new() };
        let entry = region.append_block(entry_args);
        self.stack.push(Frame { region, current_block: entry });
        entry
    }

    /// Finish building the innermost region and return it, restoring the
    /// enclosing frame's cursor.
    pub fn pop_frame(&mut self) -> Result<RegionData> {
        self.stack.pop().map(|f| f.region).ok_or_else(|| anyhow::anyhow!("pop_frame: no active frame"))
    }

    fn top(&mut self) -> Result<&mut Frame> {
        self.stack.last_mut().ok_or_else(|| anyhow::anyhow!("no active builder frame"))
    }

    /// Start a new block within the current region and make it the
    /// insertion point.
    pub fn append_block(&mut self, args: Vec<TypeAttribute>) -> Result<BlockId> {
        let frame = self.top()?;
        let id = frame.region.append_block(args);
        frame.current_block = id;
        Ok(id)
    }

    pub fn set_insertion_block(&mut self, block: BlockId) -> Result<()> {
        let frame = self.top()?;
        if frame.region.block(block).is_none() {
            bail!("set_insertion_block: block {} is not in the current region", block);
        }
        frame.current_block = block;
        Ok(())
    }

    pub fn current_block(&self) -> Result<BlockId> {
        self.stack.last().map(|f| f.current_block).ok_or_else(|| anyhow::anyhow!("no active builder frame"))
    }

    pub fn block_arg(&self, index: usize) -> Result<SSAValue> {
        let frame = self.stack.last().ok_or_else(|| anyhow::anyhow!("no active builder frame"))?;
        frame
        .region
        .block_arg(frame.current_block, index)
        .ok_or_else(|| anyhow::anyhow!("block has no argument {}", index))
    }

    /// Append a statement to the current block.
    #[allow(clippy::too_many_arguments)]
    pub fn append_stmt(
        &mut self,
        kind: Box<dyn StatementKind>,
        args: Vec<SSAValue>,
        result_types: Vec<TypeAttribute>,
        attributes: HashMap<String, Box<dyn Attribute>>,
        successors: Vec<BlockId>,
        regions: Vec<RegionData>,
    ) -> Result<(StmtId, Vec<SSAValue>)> {
        let frame = self.top()?;
        let block = frame.current_block;
        frame.region.construct(block, kind, args, result_types, attributes, successors, regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialects::arith::Constant;

    #[test]
    fn builder_stack_discipline() {
        let mut b = IrBuilder::new();
        b.push_frame(vec![], false);
        let (_id, results) = b
        .append_stmt(Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(7), vec![], vec![])
        .unwrap();
        assert_eq!(results.len(), 1);
        let region = b.pop_frame().unwrap();
        assert_eq!(region.block_order().len(), 1);
    }
}
