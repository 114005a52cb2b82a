//! The call graph: `Invoke`-edges between methods, used by
//! `CallGraphPass` to decide inlining order and detect recursion.
//!
//! Grounded in abstraps's absence of any call-graph concept at all
//! (`abstraps` has no multi-method program, only single `Region`s); this
//! module is built from scratch in the kernel's own idiom, walking each
//! method's region with `RegionData::walk` the same way `analysis::cfg`
//! walks a region's blocks.

use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::interp::Program;
use crate::dialects::func::{Call, Invoke};

/// Resolved `func.call`/`func.invoke` edges across every method in a
/// program. `Call` edges are included alongside `Invoke` edges.
pub struct CallGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl CallGraph {
    /// Build the call graph for every method currently defined in `program`.
    pub fn build(program: &Program) -> CallGraph {
        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (symbol, method) in &program.methods {
            let callees = edges.entry(symbol.clone()).or_default();
            method.region.walk(|_id, data| {
                    let is_call_like = data.kind.downcast_ref::<Call>().is_some() || data.kind.downcast_ref::<Invoke>().is_some();
                    if !is_call_like {
                        return;
                    }
                    if let Some(sym) = data.get_attr("callee").and_then(|a| a.downcast_ref::<crate::core::attribute::SymbolAttr>()) {
                        callees.insert(sym.0.clone());
                    }
                });
        }
        CallGraph { edges }
    }

    pub fn get_nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(|s| s.as_str())
    }

    pub fn get_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().flat_map(|(from, tos)| tos.iter().map(move |to| (from.as_str(), to.as_str())))
    }

    pub fn get_neighbors(&self, symbol: &str) -> impl Iterator<Item = &str> {
        self.edges.get(symbol).into_iter().flat_map(|s| s.iter().map(|s| s.as_str()))
    }

    /// Whether `symbol` is (transitively) recursive: reachable from itself.
    pub fn is_recursive(&self, symbol: &str) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&str> = self.get_neighbors(symbol).collect();
        while let Some(n) = stack.pop() {
            if n == symbol {
                return true;
            }
            if seen.insert(n) {
                stack.extend(self.get_neighbors(n));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::TypeAttribute;
    use crate::core::dialect::DialectGroup;
    use crate::core::ir::RegionData;
    use crate::core::method::Method;
    use crate::dialects::func::{Call, Return};

    fn leaf_calling(callee: &str) -> Method {
        let mut r = RegionData::new();
        let b = r.append_block(vec![]);
        let (_c, _) = r.construct(b, Box::new(Call), vec![], vec![], Call::attrs(callee), vec![], vec![]).unwrap();
        r.construct(b, Box::new(Return), vec![], vec![], Default::default(), vec![], vec![]).unwrap();
        Method::new("caller", vec![], vec![TypeAttribute::Any], DialectGroup::new(vec![]), r)
    }

    #[test]
    fn records_call_edges() {
        let mut program = Program::new();
        program.define(leaf_calling("callee"));
        let graph = CallGraph::build(&program);
        assert_eq!(graph.get_neighbors("caller").collect::<Vec<_>>(), vec!["callee"]);
    }

    #[test]
    fn direct_self_call_is_recursive() {
        let mut program = Program::new();
        program.define(leaf_calling("caller"));
        let graph = CallGraph::build(&program);
        assert!(graph.is_recursive("caller"));
    }
}
