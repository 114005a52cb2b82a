//! Dialects, dialect groups, and the registry they materialize.
//!
//! Abstraps has no equivalent of this module at all — it
//! dispatches purely by Rust's own trait system (`op.get_intrinsic()
//!.query_ref::<dyn LatticeSemantics<L>>()`), which only supports one
//! implementation per statement kind and cannot express per-argument-type
//! overloads or multiple named interpretation "keys" (`"main"` vs
//! `"typeinfer"` vs `"constprop"`) for the same statement kind.
//! This module is the kernel's own addition, built in abstraps's idiom
//! (type-erased trait objects + `downcast_rs`-style recovery, `Arc` sharing,
//! `HashMap` tables) to support that directly.

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::core::attribute::TypeAttribute;
use crate::core::ir::StatementKind;

/// An interpretation-dispatch key: either a statement class alone, or a
/// `(class, argument-type tuple)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub class: TypeId,
    pub argtypes: Option<Vec<String>>,
}

impl Signature {
    pub fn class_only<K: StatementKind>() -> Signature {
        Signature { class: TypeId::of::<K>(), argtypes: None }
    }

    pub fn typed<K: StatementKind>(argtypes: Vec<TypeAttribute>) -> Signature {
        Signature {
            class: TypeId::of::<K>(),
            argtypes: Some(argtypes.iter().map(|t| format!("{}", t)).collect()),
        }
    }

    fn from_live(class: TypeId, argtypes: &[TypeAttribute]) -> Signature {
        Signature {
            class,
            argtypes: Some(argtypes.iter().map(|t| format!("{}", t)).collect()),
        }
    }

    fn class_fallback(class: TypeId) -> Signature {
        Signature { class, argtypes: None }
    }
}

/// One named table of `Signature -> Arc<dyn Any>` entries (the `dyn Any`
/// always actually holds an `Arc<F>` for whatever function type `F` the
/// table's key convention expects — see [`DialectGroup::build_registry`]).
#[derive(Default)]
pub struct Table {
    entries: HashMap<Signature, Arc<dyn Any + Send + Sync>>,
}

impl Table {
    pub fn insert<F: Send + Sync + 'static>(&mut self, sig: Signature, f: Arc<F>) {
        self.entries.insert(sig, f as Arc<dyn Any + Send + Sync>);
    }
}

/// A named collection of statement kinds, attribute kinds, and per-key
/// interpretation/lowering tables.
#[derive(Default)]
pub struct Dialect {
    pub name: &'static str,
    interp: HashMap<&'static str, Table>,
    lowering: HashMap<&'static str, HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Dialect {
    pub fn new(name: &'static str) -> Dialect {
        Dialect { name, interp: HashMap::new(), lowering: HashMap::new() }
    }

    /// Register an implementation of function type `F` under interpretation
    /// key `key` for the given signature.
    pub fn interp<F: Send + Sync + 'static>(mut self, key: &'static str, sig: Signature, f: F) -> Self {
        self.interp.entry(key).or_default().insert(sig, Arc::new(f));
        self
    }

    /// Register a lowering handler (from an AST node name) under key `key`.
    /// A lowering handler for a given AST node name must appear exactly once
    /// across the selected tables (duplicates fail) —
    /// enforced at `build_lowering`, not here, since the duplicate check is
    /// a property of the *selected* key set, not of one dialect in
    /// isolation.
    pub fn lowering<F: Send + Sync + 'static>(mut self, key: &'static str, node: &str, f: F) -> Self {
        self.lowering.entry(key).or_default().insert(node.to_string(), Arc::new(f));
        self
    }
}

/// An ordered set of dialects. Two groups with
/// the same dialect *set* (by name) compare equal; composition (`union`,
/// `discard`) produces new groups.
#[derive(Clone)]
pub struct DialectGroup {
    dialects: Vec<Arc<Dialect>>,
}

impl DialectGroup {
    pub fn new(dialects: Vec<Dialect>) -> DialectGroup {
        DialectGroup { dialects: dialects.into_iter().map(Arc::new).collect() }
    }

    pub fn dialects(&self) -> &[Arc<Dialect>] {
        &self.dialects
    }

    pub fn names(&self) -> BTreeSet<&'static str> {
        self.dialects.iter().map(|d| d.name).collect()
    }

    pub fn union(&self, other: &DialectGroup) -> DialectGroup {
        let have: BTreeSet<&'static str> = self.names();
        let mut dialects = self.dialects.clone();
        for d in &other.dialects {
            if !have.contains(d.name) {
                dialects.push(d.clone());
            }
        }
        DialectGroup { dialects }
    }

    pub fn discard(&self, name: &str) -> DialectGroup {
        DialectGroup { dialects: self.dialects.iter().filter(|d| d.name != name).cloned().collect() }
    }

    /// Materialize a registry for function type `F` under interpretation
    /// key preference list `keys`: walk dialects in
    /// declaration order; for each, pick the first table among `keys` that
    /// exists on that dialect; merge its entries, first write across
    /// dialects wins.
    pub fn build_registry<F: Send + Sync + 'static>(&self, keys: &[&str]) -> Registry<F> {
        let mut out: HashMap<Signature, Arc<F>> = HashMap::new();
        for dialect in &self.dialects {
            for key in keys {
                if let Some(table) = dialect.interp.get(key) {
                    for (sig, boxed) in table.entries.iter() {
                        if !out.contains_key(sig) {
                            if let Ok(f) = boxed.clone().downcast::<F>() {
                                out.insert(sig.clone(), f);
                            }
                        }
                    }
                    break;
                }
            }
        }
        Registry { entries: out }
    }

    /// Materialize a lowering table for AST-node dispatch: same per-dialect key priority, but a given node name may be
    /// registered at most once across all selected tables.
    pub fn build_lowering<F: Send + Sync + 'static>(&self, keys: &[&str]) -> Result<HashMap<String, Arc<F>>> {
        let mut out: HashMap<String, Arc<F>> = HashMap::new();
        for dialect in &self.dialects {
            for key in keys {
                if let Some(table) = dialect.lowering.get(key) {
                    for (node, boxed) in table.iter() {
                        if out.contains_key(node) {
                            bail!("lowering handler for `{}` is registered more than once", node);
                        }
                        if let Ok(f) = boxed.clone().downcast::<F>() {
                            out.insert(node.clone(), f);
                        }
                    }
                    break;
                }
            }
        }
        Ok(out)
    }
}

impl PartialEq for DialectGroup {
    fn eq(&self, other: &Self) -> bool {
        self.names() == other.names()
    }
}
impl Eq for DialectGroup {}

impl fmt::Debug for DialectGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectGroup").field("names", &self.names()).finish()
    }
}

/// A materialized `signature -> implementation` map for one interpretation
/// key preference list.
pub struct Registry<F> {
    entries: HashMap<Signature, Arc<F>>,
}

impl<F> Registry<F> {
    /// Dispatch algorithm: compute
    /// `(class(stmt), tuple(arg.type))`; if present, use it; else fall back
    /// to `(class(stmt),)`; else `None` (caller invokes `eval_fallback`).
    pub fn resolve(&self, class: TypeId, argtypes: &[TypeAttribute]) -> Option<&Arc<F>> {
        self.entries
        .get(&Signature::from_live(class, argtypes))
        .or_else(|| self.entries.get(&Signature::class_fallback(class)))
    }

    pub fn resolve_class_only(&self, class: TypeId) -> Option<&Arc<F>> {
        self.entries.get(&Signature::class_fallback(class))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialects::arith::Addi;

    #[test]
    fn dialect_group_equality_is_by_name_set() {
        let a = DialectGroup::new(vec![Dialect::new("arith"), Dialect::new("func")]);
        let b = DialectGroup::new(vec![Dialect::new("func"), Dialect::new("arith")]);
        assert_eq!(a, b);
    }

    #[test]
    fn first_dialect_wins_on_key_collision() {
        let d1 = Dialect::new("first").interp("main", Signature::class_only::<Addi>(), 1i32);
        let d2 = Dialect::new("second").interp("main", Signature::class_only::<Addi>(), 2i32);
        let group = DialectGroup::new(vec![d1, d2]);
        let reg: Registry<i32> = group.build_registry(&["main"]);
        assert_eq!(**reg.resolve_class_only(TypeId::of::<Addi>()).unwrap(), 1);
    }
}
