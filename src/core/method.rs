//! Methods: named, dialect-scoped callables.
//!
//! Abstraps has no `Method` concept — `Func`/`Module` are just
//! `Operation`s with a `symbol`/`linkage` attribute pair, and nothing in
//! `abstraps` ties a callable to the `DialectGroup` it should be
//! interpreted/analyzed under. This module is grounded in abstraps's
//! `Func` intrinsic (`dialects::builtin::intrinsics::Func`, "owns a region,
//! carries a symbol attribute") generalized into the first-class entity
//! that `Interpreter::call` and `<Analysis>::run`
//! actually take.

use std::fmt;

use crate::core::attribute::{Literal, TypeAttribute};
use crate::core::dialect::DialectGroup;
use crate::core::ir::RegionData;

/// A named, dialect-scoped callable.
pub struct Method {
    pub symbol: String,
    pub arg_names: Vec<String>,
    pub arg_types: Vec<TypeAttribute>,
    pub group: DialectGroup,
    /// The callable body — in the full statement-owns-region model this
    /// would be reached via `CallableStmtInterface::callable_region_index`
    /// on a top-level `Func` statement; `Method` owns it directly since it
    /// *is* the unit of compilation the interpreter/analyses operate on
    /// (mirrors the split in the original `kirin` between a `Func`/`Lambda`
    /// statement you can pass around as a value and the `ir.Method` you
    /// actually call).
    pub region: RegionData,
    /// Captured closure fields, resolved to literal attributes at closure-creation time.
    pub captured: Vec<Literal>,
    pub return_type: Option<TypeAttribute>,
    /// Set once inference has visited this method, so recursive calls
    /// return the (possibly still-unresolved) `return_type` instead of
    /// diverging.
    pub inferred: bool,
    pub verified: bool,
}

impl Method {
    pub fn new(symbol: impl Into<String>, arg_names: Vec<String>, arg_types: Vec<TypeAttribute>, group: DialectGroup, region: RegionData) -> Method {
        Method {
            symbol: symbol.into(),
            arg_names,
            arg_types,
            group,
            region,
            captured: Vec::new(),
            return_type: None,
            inferred: false,
            verified: false,
        }
    }

    pub fn arity(&self) -> usize {
        self.arg_names.len()
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Method")
        .field("symbol", &self.symbol)
        .field("arg_names", &self.arg_names)
        .field("return_type", &self.return_type)
        .field("inferred", &self.inferred)
        .finish()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.symbol)?;
        for (i, name) in self.arg_names.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
            if let Some(t) = self.arg_types.get(i) {
                write!(f, ": {}", t)?;
            }
        }
        write!(f, ")")?;
        if let Some(rt) = &self.return_type {
            write!(f, " -> {}", rt)?;
        }
        Ok(())
    }
}
