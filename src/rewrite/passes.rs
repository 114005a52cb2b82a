//! Canonical rewrite passes, each a [`RewriteRule`] (or, for
//! the ones that need program-level context a single statement hook cannot
//! express, a plain function over a [`RegionData`]/[`Program`]).
//!
//! Grounded in abstraps's `transforms::` module set (`dce.rs`, `cse.rs`,
//! `constant_fold.rs`, `inline.rs`), each rewritten against this kernel's
//! arena-based `RegionData` rather than abstraps's linked-list block
//! representation. [`wrap_const`] has no direct abstraps counterpart; it is
//! this kernel's own bridge from `analysis::const_prop`'s per-value results
//! back onto the SSA value hint map the data model (`RegionData::set_hint`/
//! `hint`) otherwise has no producer for.

use std::collections::HashMap;
use std::fmt;

use crate::core::attribute::Attribute;
use crate::core::ident::BlockId;
use crate::core::ir::RegionData;
use crate::core::lattice::Lattice;
use crate::core::traits::Trait;
use crate::core::value::StmtId;

use crate::analysis::callgraph::CallGraph;
use crate::analysis::cfg::{unreachable_blocks, Cfg};
use crate::analysis::const_prop::ConstLattice;
use crate::analysis::forward::ForwardResult;
use crate::analysis::interp::{two_ints, Program};
use crate::dialects::arith::{Addi, Cmpi, Constant, Muli, Subi};
use crate::dialects::cf::{Branch, ConditionalBranch};
use crate::dialects::func::{Call, Invoke};
use crate::rewrite::rule::{RewriteResult, RewriteRule};

/// Delete any statement with no live uses, so long as deleting it cannot be
/// observed: `Pure` or `ConstantLike` statements only.
pub struct DeadCodeElimination;

impl RewriteRule for DeadCodeElimination {
    fn rewrite_statement(&self, region: &mut RegionData, stmt: StmtId) -> anyhow::Result<RewriteResult> {
        let data = match region.stmt(stmt) {
            Some(d) => d,
            None => return Ok(RewriteResult::unchanged()),
        };
        let removable = data.has_trait(Trait::Pure) || data.has_trait(Trait::ConstantLike);
        if !removable {
            return Ok(RewriteResult::unchanged());
        }
        let results = data.results(stmt);
        if results.iter().any(|r| region.use_count(*r) > 0) {
            return Ok(RewriteResult::unchanged());
        }
        region.delete_statement(stmt)?;
        Ok(RewriteResult::changed())
    }
}

/// Structural equality for CSE/GVE purposes: same kind, same operands (in
/// order), same attribute set.
fn same_operation(a: &crate::core::ir::StatementData, b: &crate::core::ir::StatementData) -> bool {
    if a.kind.as_any().type_id() != b.kind.as_any().type_id() {
        return false;
    }
    if a.args != b.args || a.result_types != b.result_types {
        return false;
    }
    if a.attributes.len() != b.attributes.len() {
        return false;
    }
    a.attributes.iter().all(|(k, v)| b.attributes.get(k).map(|bv| v.structural_eq(bv.as_ref())).unwrap_or(false))
}

/// Common subexpression elimination, scoped to one block at a time: within a block, the first occurrence of a `Pure` operation
/// survives and every later structurally-equal one is replaced by it.
pub struct CommonSubexpressionElimination;

impl RewriteRule for CommonSubexpressionElimination {
    fn rewrite_block(&self, region: &mut RegionData, block: BlockId) -> anyhow::Result<RewriteResult> {
        dedup_in(region, region.statements_in(block).to_vec())
    }
}

/// Global value elimination: the same dedup rule as CSE, but over every
/// statement in the region regardless of block.
pub struct GlobalValueElimination;

impl RewriteRule for GlobalValueElimination {
    fn rewrite_region(&self, region: &mut RegionData) -> anyhow::Result<RewriteResult> {
        let mut all = Vec::new();
        for block in region.block_order().to_vec() {
            all.extend(region.statements_in(block).to_vec());
        }
        dedup_in(region, all)
    }
}

fn dedup_in(region: &mut RegionData, candidates: Vec<StmtId>) -> anyhow::Result<RewriteResult> {
    let mut seen: Vec<StmtId> = Vec::new();
    let mut changed = false;
    for stmt in candidates {
        let data = match region.stmt(stmt) {
            Some(d) => d,
            None => continue,
        };
        if !data.has_trait(Trait::Pure) && !data.has_trait(Trait::ConstantLike) {
            continue;
        }
        let mut replacement = None;
        for prior in &seen {
            let prior_data = region.stmt(*prior).unwrap();
            if same_operation(region.stmt(stmt).unwrap(), prior_data) {
                replacement = Some(*prior);
                break;
            }
        }
        match replacement {
            Some(prior) => {
                region.replace_statement(stmt, prior)?;
                changed = true;
            }
            None => seen.push(stmt),
        }
    }
    Ok(if changed { RewriteResult::changed() } else { RewriteResult::unchanged() })
}

/// Fold a `Pure` arithmetic statement whose every operand is itself defined
/// by an `arith.constant` into a single new `arith.constant` carrying the
/// computed value. Only the demonstration
/// `arith` dialect's binary ops and `cmpi` are foldable here; an unknown
/// `Pure` statement is left alone. Also lowers a `cf.cond_br` whose condition
/// traces back to a known `arith.constant` boolean into the unconditional
/// `cf.br` its value statically selects.
pub struct ConstantFold;

impl ConstantFold {
    /// If `stmt` is a `cf.cond_br` whose condition operand is defined by an
    /// `arith.constant` boolean, replace it with an unconditional `cf.br` to
    /// the statically-selected successor. Returns `None` when `stmt` isn't a
    /// foldable conditional branch, leaving [`ConstantFold::rewrite_statement`]
    /// to fall through to the arithmetic-folding path below.
    fn fold_conditional_branch(region: &mut RegionData, stmt: StmtId) -> anyhow::Result<Option<RewriteResult>> {
        let plan = {
            let data = match region.stmt(stmt) {
                Some(d) => d,
                None => return Ok(None),
            };
            if data.kind.downcast_ref::<ConditionalBranch>().is_none() {
                return Ok(None);
            }
            let block = match data.parent {
                Some(b) => b,
                None => return Ok(None),
            };
            let cond = match data.args.first() {
                Some(c) => *c,
                None => return Ok(None),
            };
            let defining = match cond {
                crate::core::value::SSAValue::Result { stmt, index } if index == 0 => stmt,
                _ => return Ok(None),
            };
            let def = match region.stmt(defining) {
                Some(d) if d.kind.downcast_ref::<Constant>().is_some() => d,
                _ => return Ok(None),
            };
            let view = crate::core::ir::StatementView { id: defining, kind: def.kind.as_ref(), data: def };
            let cond_value = match Constant::value(&view)? {
                crate::core::attribute::Literal::Bool(b) => *b,
                _ => return Ok(None),
            };
            let target = if cond_value { data.successors[0] } else { data.successors[1] };
            (block, target)
        };
        let (block, target) = plan;
        let (new_id, _) = region.construct(block, Box::new(Branch), vec![], vec![], HashMap::new(), vec![target], vec![])?;
        region.move_before(new_id, stmt)?;
        region.replace_statement(stmt, new_id)?;
        Ok(Some(RewriteResult::changed()))
    }
}

impl RewriteRule for ConstantFold {
    fn rewrite_statement(&self, region: &mut RegionData, stmt: StmtId) -> anyhow::Result<RewriteResult> {
        if let Some(result) = Self::fold_conditional_branch(region, stmt)? {
            return Ok(result);
        }
        // Everything this rule needs is gathered as owned data up front, so
        // no borrow of `region` survives into the mutation phase below.
        let plan = {
            let data = match region.stmt(stmt) {
                Some(d) => d,
                None => return Ok(RewriteResult::unchanged()),
            };
            let is_foldable = data.kind.downcast_ref::<Addi>().is_some()
            || data.kind.downcast_ref::<Subi>().is_some()
            || data.kind.downcast_ref::<Muli>().is_some()
            || data.kind.downcast_ref::<Cmpi>().is_some();
            if !is_foldable {
                return Ok(RewriteResult::unchanged());
            }
            let block = match data.parent {
                Some(b) => b,
                None => return Ok(RewriteResult::unchanged()),
            };
            let mut operands = Vec::with_capacity(data.args.len());
            for a in &data.args {
                let defining = match a {
                    crate::core::value::SSAValue::Result { stmt, index } if *index == 0 => *stmt,
                    _ => return Ok(RewriteResult::unchanged()),
                };
                let def = match region.stmt(defining) {
                    Some(d) if d.kind.downcast_ref::<Constant>().is_some() => d,
                    _ => return Ok(RewriteResult::unchanged()),
                };
                let view = crate::core::ir::StatementView { id: defining, kind: def.kind.as_ref(), data: def };
                operands.push(Constant::value(&view)?.clone());
            }

            let view = crate::core::ir::StatementView { id: stmt, kind: data.kind.as_ref(), data };
            let folded = if data.kind.downcast_ref::<Cmpi>().is_some() {
                let (a, b) = two_ints(&operands)?;
                crate::core::attribute::Literal::Bool(Cmpi::predicate(&view)?.apply(a, b))
            } else {
                let (a, b) = two_ints(&operands)?;
                let v = if data.kind.downcast_ref::<Addi>().is_some() {
                    a + b
                } else if data.kind.downcast_ref::<Subi>().is_some() {
                    a - b
                } else {
                    a * b
                };
                crate::core::attribute::Literal::Int(v)
            };
            (block, data.result_types[0].clone(), folded)
        };
        let (block, result_type, folded) = plan;

        let (new_id, _) = region.construct(block, Box::new(Constant), vec![], vec![result_type], Constant::attrs_for(folded), vec![], vec![])?;
        region.move_before(new_id, stmt)?;
        region.replace_statement(stmt, new_id)?;
        Ok(RewriteResult::changed())
    }
}

/// The per-value hint `WrapConst` stores under [`CONST_HINT_KEY`], so a
/// later pass or a pretty-printer can read back a value's folded constant
/// (if any) via `RegionData::hint` without re-running the analysis.
#[derive(Debug, Clone)]
pub struct ConstHint(pub ConstLattice);

impl fmt::Display for ConstHint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.0 {
            ConstLattice::Bottom => write!(f, "const(bottom)"),
            ConstLattice::Value(v) => write!(f, "const({})", v),
            ConstLattice::Unknown => write!(f, "const(unknown)"),
        }
    }
}

impl Attribute for ConstHint {
    fn structural_eq(&self, other: &dyn Attribute) -> bool {
        other.downcast_ref::<ConstHint>().map(|o| o.0 == self.0).unwrap_or(false)
    }
}

pub const CONST_HINT_KEY: &str = "const";

/// `WrapConst`: lift a completed constant-propagation run's per-value
/// results into the region's own SSA value hint map. A value's prior hint
/// under [`CONST_HINT_KEY`] (if any, from an earlier `WrapConst` run) is
/// joined with the analysis's own result under `ConstLattice::join` rather
/// than overwritten, so re-running `WrapConst` after a rewrite that only
/// narrows the analysis further never loses information a previous run
/// already established. Takes the `ForwardResult` directly rather than
/// re-running the analysis itself, since the caller (typically right after
/// `const_prop::const_prop_dialects`-driven `ForwardDriver::run`) already
/// has it.
pub fn wrap_const(region: &mut RegionData, result: &ForwardResult<ConstLattice>) -> RewriteResult {
    let mut changed = false;
    for (value, lattice) in &result.values {
        let prior = region.hint(*value, CONST_HINT_KEY).and_then(|h| h.downcast_ref::<ConstHint>()).map(|h| h.0.clone());
        let joined = match &prior {
            Some(p) => p.join(lattice),
            None => lattice.clone(),
        };
        if prior.as_ref() != Some(&joined) {
            region.set_hint(*value, CONST_HINT_KEY, Box::new(ConstHint(joined)));
            changed = true;
        }
    }
    if changed { RewriteResult::changed() } else { RewriteResult::unchanged() }
}

/// Promote a `func.call` to `func.invoke` once its callee is known to exist
/// in `program`: a plain function over a
/// region rather than a `RewriteRule`, since it needs the program's symbol
/// table, not just the region being rewritten.
pub fn call2invoke(region: &mut RegionData, program: &Program) -> anyhow::Result<RewriteResult> {
    let mut result = RewriteResult::unchanged();
    let mut calls = Vec::new();
    region.walk(|id, data| {
            if data.kind.downcast_ref::<Call>().is_some() {
                calls.push(id);
            }
        });
    for id in calls {
        let data = region.stmt(id).unwrap();
        let block = match data.parent {
            Some(b) => b,
            None => continue,
        };
        let view = crate::core::ir::StatementView { id, kind: data.kind.as_ref(), data };
        let callee = Call::callee(&view)?.to_string();
        if program.get(&callee).is_err() {
            continue;
        }
        let (new_id, _) = region.construct(block, Box::new(Invoke), data.args.clone(), data.result_types.clone(), Invoke::attrs(&callee), vec![], vec![])?;
        region.move_before(new_id, id)?;
        region.replace_statement(id, new_id)?;
        result = result.join(RewriteResult::changed());
    }
    Ok(result)
}

/// Drop unreachable blocks, splice a block into its sole predecessor when
/// that predecessor exits via an unconditional `cf.br` to it and has no
/// other successors, and collapse a branch whose target is an empty block
/// (no statements besides its own terminator) that itself ends in an
/// unconditional `cf.br` — the target is skipped entirely and the original
/// branch is redirected straight to its eventual destination. Block-argument
/// renaming across the splice is left undone when the target block declares
/// any arguments — `cf.br` in this kernel never carries operands beyond the
/// condition (see `dialects::cf`), so every splice candidate this pass
/// actually meets has zero block arguments in practice.
pub fn cfg_compactify(region: &mut RegionData) -> anyhow::Result<RewriteResult> {
    let mut result = RewriteResult::unchanged();
    loop {
        let cfg = Cfg::build(region);
        let dead = unreachable_blocks(&cfg);
        if !dead.is_empty() {
            for block in dead {
                // Iterate to a fixed point so cross-references among the
                // dead block's own statements don't block deletion order.
                loop {
                    let mut progress = false;
                    for s in region.statements_in(block).to_vec() {
                        let live = region.stmt(s).unwrap().results(s).iter().any(|r| region.use_count(*r) > 0);
                        if !live {
                            region.delete_statement(s)?;
                            progress = true;
                        }
                    }
                    if !progress {
                        break;
                    }
                }
                region.remove_block(block).ok();
            }
            result = result.join(RewriteResult::changed());
            continue;
        }

        let splice_target = cfg.blocks().find(|b| {
                let preds = cfg.predecessors_of(*b);
                if preds.len() != 1 {
                    return false;
                }
                let pred = preds[0];
                let succs = cfg.successors_of(pred);
                succs.len() == 1
                && succs[0] == *b
                && region
                .terminator_of(pred)
                .map(|t| region.stmt(t).unwrap().kind.downcast_ref::<Branch>().is_some())
                .unwrap_or(false)
            });

        if let Some(block) = splice_target.filter(|b| region.block(*b).map(|bd| bd.args.is_empty()).unwrap_or(false)) {
            let pred = cfg.predecessors_of(block)[0];
            let br = region.terminator_of(pred).unwrap();
            region.delete_statement(br)?;
            for stmt in region.statements_in(block).to_vec() {
                region.move_to_block(stmt, pred)?;
            }
            region.remove_block(block)?;
            result = result.join(RewriteResult::changed());
            continue;
        }

        // Rule 3: a branch whose target is an empty pass-through block that
        // itself terminates in an unconditional branch collapses to a
        // direct branch to that block's own target, as long as doing so
        // actually changes something (guards against a degenerate two-block
        // cycle of empty blocks looping forever).
        let collapse = cfg.blocks().find_map(|b| {
            let term = region.terminator_of(b)?;
            if region.stmt(term)?.kind.downcast_ref::<Branch>().is_none() {
                return None;
            }
            let target = region.stmt(term)?.successors[0];
            if target == b || region.statements_in(target).len() != 1 {
                return None;
            }
            let target_term = region.terminator_of(target)?;
            if region.stmt(target_term)?.kind.downcast_ref::<Branch>().is_none() {
                return None;
            }
            let final_target = region.stmt(target_term)?.successors[0];
            if final_target == target {
                return None;
            }
            Some((term, final_target))
        });

        match collapse {
            Some((term, final_target)) => {
                region.stmt_mut(term).unwrap().successors = vec![final_target];
                result = result.join(RewriteResult::changed());
            }
            None => break,
        }
    }
    Ok(result)
}

/// A whole-program pass built on [`CallGraph`]:
/// runs `call2invoke` on every method's region, then reports which methods
/// are (transitively) recursive, information `Inline` consults before
/// attempting to inline a call (inlining a recursive call site would not
/// terminate).
pub fn call_graph_pass(program: &mut Program) -> anyhow::Result<(RewriteResult, CallGraph)> {
    let graph = CallGraph::build(program);
    let mut result = RewriteResult::unchanged();
    let symbols: Vec<String> = program.methods.keys().cloned().collect();
    for symbol in symbols {
        // Swap the region out so `call2invoke` can borrow `program`
        // immutably (for the callee-existence check) while also rewriting
        // this method's own body.
        let mut region = std::mem::take(&mut program.methods.get_mut(&symbol).unwrap().region);
        let step = call2invoke(&mut region, program)?;
        program.methods.get_mut(&symbol).unwrap().region = region;
        result = result.join(step);
    }
    Ok((result, graph))
}

/// Inline a single `func.invoke` call site whose callee is a straight-line
/// method (one block, no branches) — the common case `const_prop`/CSE feed
/// it after `Call2Invoke` has resolved the callee.
/// Multi-block callees are left uninlined rather than attempting a general
/// CFG splice here (see `cfg_compactify` for the block-merging machinery
/// this kernel does support).
pub fn inline_call_site(region: &mut RegionData, call_site: StmtId, callee_region: &RegionData, callee_arg_names: &[String]) -> anyhow::Result<RewriteResult> {
    let call_data = match region.stmt(call_site) {
        Some(d) if d.kind.downcast_ref::<Invoke>().is_some() => d,
        _ => return Ok(RewriteResult::unchanged()),
    };
    let block = match call_data.parent {
        Some(b) => b,
        None => return Ok(RewriteResult::unchanged()),
    };
    let entry = match callee_region.entry() {
        Some(e) => e,
        None => return Ok(RewriteResult::unchanged()),
    };
    if callee_region.block_order().len() != 1 {
        return Ok(RewriteResult::unchanged());
    }
    let args = call_data.args.clone();
    let result_types = call_data.result_types.clone();
    if args.len() != callee_arg_names.len() {
        anyhow::bail!("inline_call_site: arity mismatch between call site and callee");
    }

    let mut substitution: HashMap<crate::core::value::SSAValue, crate::core::value::SSAValue> = HashMap::new();
    for (i, actual) in args.iter().enumerate() {
        substitution.insert(crate::core::value::SSAValue::BlockArgument { block: entry, index: i }, *actual);
    }

    let mut returned = None;
    for stmt in callee_region.statements_in(entry) {
        let data = callee_region.stmt(*stmt).unwrap();
        if data.kind.traits().contains(&Trait::IsTerminator) {
            // `func.return`'s sole operand becomes the call site's result.
            if let Some(a) = data.args.first() {
                returned = Some(*substitution.get(a).unwrap_or(a));
            }
            break;
        }
        let rewritten_args: Vec<_> = data.args.iter().map(|a| *substitution.get(a).unwrap_or(a)).collect();
        let (new_id, new_results) = region.construct(
            block,
            dyn_clone_kind(data),
            rewritten_args,
            data.result_types.clone(),
            clone_attrs(data),
            vec![],
            vec![],
        )?;
        region.move_before(new_id, call_site)?;
        for (i, orig_result) in data.results(*stmt).iter().enumerate() {
            substitution.insert(*orig_result, new_results[i]);
        }
    }

    if let Some(v) = returned {
        if !result_types.is_empty() {
            region.replace_value(crate::core::value::SSAValue::Result { stmt: call_site, index: 0 }, v)?;
        }
    }
    region.delete_statement(call_site)?;
    Ok(RewriteResult::changed())
}

/// `arith.constant`/`func` statement kinds are all `Copy` unit structs in
/// this kernel's demonstration dialects, so re-emitting them during inlining
/// only needs to know *which* kind, not clone arbitrary state; a dialect
/// with stateful kinds would need a real `Clone`-through-`dyn` story here.
fn dyn_clone_kind(data: &crate::core::ir::StatementData) -> Box<dyn crate::core::ir::StatementKind> {
    if data.kind.downcast_ref::<Constant>().is_some() {
        Box::new(Constant)
    } else if data.kind.downcast_ref::<Addi>().is_some() {
        Box::new(Addi)
    } else if data.kind.downcast_ref::<Subi>().is_some() {
        Box::new(Subi)
    } else if data.kind.downcast_ref::<Muli>().is_some() {
        Box::new(Muli)
    } else if data.kind.downcast_ref::<Cmpi>().is_some() {
        Box::new(Cmpi)
    } else {
        // Reached only if a future dialect's statement makes it into an
        // inlined body without a clone arm here; fail loudly rather than
        // silently dropping the statement.
        panic!("inline_call_site: no clone rule for statement kind `{}`", data.kind)
    }
}

fn clone_attrs(data: &crate::core::ir::StatementData) -> HashMap<String, Box<dyn crate::core::attribute::Attribute>> {
    let mut out = HashMap::new();
    if let Some(lit) = data.get_attr("value").and_then(|a| a.downcast_ref::<crate::core::attribute::LiteralAttr>()) {
        out.insert("value".to_string(), Box::new(crate::core::attribute::LiteralAttr(lit.0.clone())) as Box<dyn crate::core::attribute::Attribute>);
    }
    if let Some(p) = data.get_attr("predicate").and_then(|a| a.downcast_ref::<crate::dialects::arith::Predicate>()) {
        out.insert("predicate".to_string(), Box::new(*p) as Box<dyn crate::core::attribute::Attribute>);
    }
    out
}
