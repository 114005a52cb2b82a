//! The generic forward dataflow driver, parameterized by a
//! [`Lattice`]. `const_prop`, `typeinfer`, and `joint` all instantiate this
//! with their own lattice and dispatch table rather than duplicating the
//! worklist/join machinery.
//!
//! Grounded in abstraps's `core::absint::Interpreter<L>`/
//! `LatticeInterpreterPass`, which performs a single straight-line pass with
//! no successor worklist at all; this module adds a worklist-over-
//! `Successor(block, args)` loop, matching the shape
//! of [`crate::analysis::interp::Interpreter`]'s concrete driver so the two
//! engines read as siblings.

use std::collections::{HashMap, VecDeque};

use anyhow::bail;

use crate::analysis::interp::Program;
use crate::core::dialect::{DialectGroup, Registry};
use crate::core::diagnostics::KernelError;
use crate::core::ident::BlockId;
use crate::core::ir::{RegionData, StatementView};
use crate::core::lattice::Lattice;
use crate::core::value::SSAValue;
use crate::dialects::func::{Call, Invoke};

/// What evaluating one statement produces under abstract interpretation
///: a join into the statement's results, a
/// worklist push, or a join into the region's return lattice.
pub enum AbstractOutcome<L> {
    Values(Vec<L>),
    Successor(BlockId, Vec<L>),
    /// A statement (typically a conditional branch) that may transfer
    /// control to more than one successor under the lattice's precision —
    /// every target is pushed, so an analysis that cannot resolve the
    /// condition still covers every reachable block.
    Successors(Vec<(BlockId, Vec<L>)>),
    Return(L),
}

pub type AbstractFn<L> = dyn Fn(&StatementView, &[L]) -> anyhow::Result<AbstractOutcome<L>> + Send + Sync;

/// The `Sized` handle every `"absint"`/`"constprop"`/`"typeinfer"`-keyed
/// registration is boxed to before registering, so one [`Registry`] can
/// `downcast` every entry back from `Arc<dyn Any>` uniformly (see
/// [`crate::analysis::interp::BoxedConcreteFn`] for the same pattern on the
/// concrete side).
pub type BoxedAbstractFn<L> = Box<AbstractFn<L>>;

/// The result of running a forward analysis over one region.
pub struct ForwardResult<L> {
    pub values: HashMap<SSAValue, L>,
    pub return_value: L,
}

/// A generic forward dataflow driver over an SSA-CFG region.
pub struct ForwardDriver<L: Lattice> {
    registry: Registry<BoxedAbstractFn<L>>,
    pub max_depth: usize,
    /// Call-stack depth bound for [`ForwardDriver::run_in_program`]'s
    /// recursion into callee regions — distinct from `max_depth`, which
    /// bounds per-block worklist revisits within a single region.
    pub max_call_depth: usize,
}

impl<L: Lattice + 'static> ForwardDriver<L> {
    pub fn new(group: &DialectGroup, keys: &[&str]) -> ForwardDriver<L> {
        ForwardDriver { registry: group.build_registry(keys), max_depth: 64, max_call_depth: 64 }
    }

    /// `run_ssacfg_region`: seed the worklist with
    /// `Successor(entry, entry_args)`, join block arguments on each visit,
    /// iterate statements joining into a per-value map, and join every
    /// `Return` into the accumulated return lattice. `func.call`/
    /// `func.invoke` fold to the registry's own (typically `Unknown`/`Any`)
    /// fallback, since there is no [`Program`] here to resolve a callee
    /// against — use [`ForwardDriver::run_in_program`] for interprocedural
    /// resolution.
    pub fn run(&self, region: &RegionData, entry_args: Vec<L>) -> anyhow::Result<ForwardResult<L>> {
        self.run_inner(None, region, entry_args, 0)
    }

    /// Like [`ForwardDriver::run`], but `func.call`/`func.invoke` resolve
    /// their callee in `program` and recursively run this same analysis on
    /// the callee's region, narrowed to the call site's argument lattice
    /// elements, rather than falling back to the registry's generic
    /// handler. Recursion is bounded by `max_call_depth`.
    pub fn run_in_program(&self, program: &Program, region: &RegionData, entry_args: Vec<L>) -> anyhow::Result<ForwardResult<L>> {
        self.run_inner(Some(program), region, entry_args, 0)
    }

    fn run_inner(&self, program: Option<&Program>, region: &RegionData, entry_args: Vec<L>, depth: usize) -> anyhow::Result<ForwardResult<L>> {
        if depth > self.max_call_depth {
            bail!(KernelError::DepthExceeded { depth, max: self.max_call_depth });
        }
        let entry = region.entry().ok_or_else(|| anyhow::anyhow!("region has no entry block"))?;
        let mut values: HashMap<SSAValue, L> = HashMap::new();
        let mut return_value = L::bottom();
        let mut worklist: VecDeque<(BlockId, Vec<L>)> = VecDeque::new();
        worklist.push_back((entry, entry_args));
        // A block can be revisited as more incoming lattice elements join in;
        // `visited` bounds the work to the (finite, by the Lattice contract)
        // ascending chain per value instead of looping forever.
        let mut visit_counts: HashMap<BlockId, usize> = HashMap::new();

        while let Some((block, incoming)) = worklist.pop_front() {
            let count = visit_counts.entry(block).or_insert(0);
            *count += 1;
            if *count > self.max_depth {
                bail!("forward analysis did not converge on block {} within {} visits", block, self.max_depth);
            }
            for (i, v) in incoming.into_iter().enumerate() {
                let key = SSAValue::BlockArgument { block, index: i };
                let joined = values.get(&key).map(|prev| prev.join(&v)).unwrap_or(v);
                values.insert(key, joined);
            }

            for id in region.statements_in(block) {
                let data = region.stmt(*id).unwrap();
                let arg_values: Vec<L> = data.args.iter().map(|a| values.get(a).cloned().unwrap_or_else(L::bottom)).collect();
                let view = StatementView { id: *id, kind: data.kind.as_ref(), data };

                let is_call = data.kind.downcast_ref::<Call>().is_some();
                let is_invoke = data.kind.downcast_ref::<Invoke>().is_some();
                let outcome = if let (Some(program), true) = (program, is_call || is_invoke) {
                    let callee_name = if is_call { Call::callee(&view)? } else { Invoke::callee(&view)? };
                    let callee = program.get(callee_name)?;
                    let callee_result = self.run_inner(Some(program), &callee.region, arg_values, depth + 1)?;
                    if data.result_types.is_empty() {
                        AbstractOutcome::Values(vec![])
                    } else {
                        AbstractOutcome::Values(vec![callee_result.return_value])
                    }
                } else {
                    let type_id = data.kind.as_any().type_id();
                    match self.registry.resolve_class_only(type_id) {
                        Some(f) => f(&view, &arg_values)?,
                        None => AbstractOutcome::Values(data.result_types.iter().map(|_| L::top()).collect()),
                    }
                };
                match outcome {
                    AbstractOutcome::Values(ls) => {
                        for (index, l) in ls.into_iter().enumerate() {
                            let key = SSAValue::Result { stmt: *id, index };
                            let joined = values.get(&key).map(|prev| prev.join(&l)).unwrap_or(l);
                            values.insert(key, joined);
                        }
                    }
                    AbstractOutcome::Successor(target, args) => {
                        worklist.push_back((target, args));
                    }
                    AbstractOutcome::Successors(targets) => {
                        for (target, args) in targets {
                            worklist.push_back((target, args));
                        }
                    }
                    AbstractOutcome::Return(l) => {
                        return_value = return_value.join(&l);
                    }
                }
            }
        }

        Ok(ForwardResult { values, return_value })
    }
}
