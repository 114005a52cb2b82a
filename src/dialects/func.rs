//! Functions, calls, and control return.
//!
//! Grounded in abstraps's `dialects::builtin::intrinsics::{Func, Call,
//! Return}` — a statement that owns a callable region plus a symbol
//! attribute, and the two ways of reaching it (`Call`, resolved by name at
//! interpretation time; `Invoke`, resolved to a concrete callee ahead of
//! time by the `Call2Invoke` rewrite pass).

use std::collections::HashMap;

use crate::core::attribute::{Attribute, SymbolAttr};
use crate::core::ir::{StatementKind, StatementView};
use crate::core::traits::{CallableStmtInterface, SymbolOpInterface, Trait};

/// `func.func` — a statement that owns a callable region and publishes a
/// symbol name other statements can `call`/`invoke` by.
#[derive(Debug, Clone)]
pub struct Func {
    pub arg_names: Vec<String>,
}

const FUNC_TRAITS: &[Trait] = &[
    Trait::IsolatedFromAbove,
    Trait::SSACFGRegion,
    Trait::CallableStmtInterface,
    Trait::SymbolOpInterface,
];

impl Func {
    pub fn new(arg_names: Vec<String>) -> Func {
        Func { arg_names }
    }

    pub fn attrs(sym_name: &str) -> HashMap<String, Box<dyn Attribute>> {
        let mut m: HashMap<String, Box<dyn Attribute>> = HashMap::new();
        m.insert("sym_name".to_string(), Box::new(SymbolAttr(sym_name.to_string())));
        m
    }
}

impl CallableStmtInterface for Func {
    fn arg_names(&self) -> &[String] {
        &self.arg_names
    }
}

impl SymbolOpInterface for Func {
    fn sym_name<'a>(&self, stmt: &'a StatementView) -> anyhow::Result<&'a str> {
        stmt.data
        .get_attr("sym_name")
        .and_then(|a| a.downcast_ref::<SymbolAttr>())
        .map(|s| s.0.as_str())
        .ok_or_else(|| anyhow::anyhow!("func.func missing `sym_name` attribute"))
    }
}

impl StatementKind for Func {
    fn dialect(&self) -> &'static str {
        "func"
    }
    fn name(&self) -> &'static str {
        "func"
    }
    fn traits(&self) -> &'static [Trait] {
        FUNC_TRAITS
    }
    fn verify(&self, stmt: &StatementView) -> anyhow::Result<()> {
        if stmt.data.regions.len() != 1 {
            anyhow::bail!("func.func must own exactly one region");
        }
        self.sym_name(stmt)?;
        Ok(())
    }
    fn as_callable(&self) -> Option<&dyn CallableStmtInterface> {
        Some(self)
    }
    fn as_symbol(&self) -> Option<&dyn SymbolOpInterface> {
        Some(self)
    }
}

/// `func.return` — terminates a callable region's block with its result
/// values.
#[derive(Debug, Clone, Copy)]
pub struct Return;

impl StatementKind for Return {
    fn dialect(&self) -> &'static str {
        "func"
    }
    fn name(&self) -> &'static str {
        "return"
    }
    fn traits(&self) -> &'static [Trait] {
        &[Trait::IsTerminator]
    }
    fn verify(&self, stmt: &StatementView) -> anyhow::Result<()> {
        if !stmt.data.result_types.is_empty() {
            anyhow::bail!("func.return produces no results");
        }
        Ok(())
    }
}

/// `func.call` — calls a callee resolved by symbol name at interpretation
/// time.
#[derive(Debug, Clone, Copy)]
pub struct Call;

impl Call {
    pub fn attrs(callee: &str) -> HashMap<String, Box<dyn Attribute>> {
        let mut m: HashMap<String, Box<dyn Attribute>> = HashMap::new();
        m.insert("callee".to_string(), Box::new(SymbolAttr(callee.to_string())));
        m
    }

    pub fn callee<'a>(stmt: &'a StatementView<'a>) -> anyhow::Result<&'a str> {
        stmt.data
        .get_attr("callee")
        .and_then(|a| a.downcast_ref::<SymbolAttr>())
        .map(|s| s.0.as_str())
        .ok_or_else(|| anyhow::anyhow!("func.call missing `callee` attribute"))
    }
}

impl StatementKind for Call {
    fn dialect(&self) -> &'static str {
        "func"
    }
    fn name(&self) -> &'static str {
        "call"
    }
    fn traits(&self) -> &'static [Trait] {
        &[Trait::MaybePure]
    }
    fn verify(&self, stmt: &StatementView) -> anyhow::Result<()> {
        Call::callee(stmt)?;
        Ok(())
    }
}

/// `func.invoke` — a `call` whose callee has already been resolved to a
/// concrete, known method, letting analyses
/// skip symbol lookup.
#[derive(Debug, Clone, Copy)]
pub struct Invoke;

impl Invoke {
    pub fn attrs(callee: &str) -> HashMap<String, Box<dyn Attribute>> {
        Call::attrs(callee)
    }

    pub fn callee<'a>(stmt: &'a StatementView<'a>) -> anyhow::Result<&'a str> {
        Call::callee(stmt)
    }
}

impl StatementKind for Invoke {
    fn dialect(&self) -> &'static str {
        "func"
    }
    fn name(&self) -> &'static str {
        "invoke"
    }
    fn traits(&self) -> &'static [Trait] {
        &[Trait::MaybePure]
    }
    fn verify(&self, stmt: &StatementView) -> anyhow::Result<()> {
        Invoke::callee(stmt)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::TypeAttribute;
    use crate::core::ir::RegionData;

    #[test]
    fn func_exposes_its_symbol_and_args() {
        let mut outer = RegionData::new();
        let entry = outer.append_block(vec![]);
        let mut body = RegionData::new();
        body.append_block(vec![TypeAttribute::class("int")]);
        let (id, _) = outer
        .construct(entry, Box::new(Func::new(vec!["x".to_string()])), vec![], vec![], Func::attrs("identity"), vec![], vec![body])
        .unwrap();
        let stmt = outer.stmt(id).unwrap();
        let view = StatementView { id, kind: stmt.kind.as_ref(), data: stmt };
        let sym_kind = stmt.kind.as_symbol().unwrap();
        assert_eq!(sym_kind.sym_name(&view).unwrap(), "identity");
        let callable = stmt.kind.as_callable().unwrap();
        assert_eq!(callable.arg_names(), &["x".to_string()]);
    }

    #[test]
    fn call_carries_its_callee() {
        let mut r = RegionData::new();
        let b = r.append_block(vec![]);
        let (id, _) = r.construct(b, Box::new(Call), vec![], vec![], Call::attrs("identity"), vec![], vec![]).unwrap();
        let stmt = r.stmt(id).unwrap();
        let view = StatementView { id, kind: stmt.kind.as_ref(), data: stmt };
        assert_eq!(Call::callee(&view).unwrap(), "identity");
    }
}
