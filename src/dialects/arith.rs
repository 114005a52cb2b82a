//! Integer arithmetic.
//!
//! Grounded in abstraps's `dialects::arith::intrinsics` (`Addi`/`Andi`/
//! `Cmpi`, each a unit struct implementing `Intrinsic`) and
//! `dialects::base::intrinsics::Constant`. Kept deliberately small —
//! enough statement kinds to drive constant folding, type inference, and
//! the concrete interpreter end to end, not a full ISA.

use std::collections::HashMap;
use std::fmt;

use crate::core::attribute::{Attribute, Literal, LiteralAttr};
use crate::core::ir::{StatementKind, StatementView};
use crate::core::traits::Trait;

const PURE: &[Trait] = &[Trait::Pure];
const CONSTANT_LIKE: &[Trait] = &[Trait::Pure, Trait::ConstantLike];

/// `arith.constant` — materializes a host literal.
#[derive(Debug, Clone, Copy)]
pub struct Constant;

impl Constant {
    /// Build the `{"value":...}` attribute map an `arith.constant` carries.
    pub fn attrs(value: i64) -> HashMap<String, Box<dyn Attribute>> {
        let mut m: HashMap<String, Box<dyn Attribute>> = HashMap::new();
        m.insert("value".to_string(), Box::new(LiteralAttr(Literal::Int(value))));
        m
    }

    pub fn attrs_for(value: Literal) -> HashMap<String, Box<dyn Attribute>> {
        let mut m: HashMap<String, Box<dyn Attribute>> = HashMap::new();
        m.insert("value".to_string(), Box::new(LiteralAttr(value)));
        m
    }

    /// Recover the literal an `arith.constant` statement carries.
    pub fn value<'a>(view: &'a StatementView<'a>) -> anyhow::Result<&'a Literal> {
        view.data
        .get_attr("value")
        .and_then(|a| a.downcast_ref::<LiteralAttr>())
        .map(|l| &l.0)
        .ok_or_else(|| anyhow::anyhow!("arith.constant missing `value` attribute"))
    }
}

impl StatementKind for Constant {
    fn dialect(&self) -> &'static str {
        "arith"
    }
    fn name(&self) -> &'static str {
        "constant"
    }
    fn traits(&self) -> &'static [Trait] {
        CONSTANT_LIKE
    }
    fn verify(&self, stmt: &StatementView) -> anyhow::Result<()> {
        if !stmt.data.args.is_empty() {
            anyhow::bail!("arith.constant takes no operands");
        }
        if stmt.data.result_types.len() != 1 {
            anyhow::bail!("arith.constant must produce exactly one result");
        }
        Constant::value(stmt)?;
        Ok(())
    }
}

/// Shared shape for the binary integer arithmetic ops: two operands, one
/// result, pure.
fn verify_binary(stmt: &StatementView, op: &str) -> anyhow::Result<()> {
    if stmt.data.args.len() != 2 {
        anyhow::bail!("arith.{} takes exactly two operands", op);
    }
    if stmt.data.result_types.len() != 1 {
        anyhow::bail!("arith.{} must produce exactly one result", op);
    }
    Ok(())
}

macro_rules! binary_op {
    ($Kind:ident, $name:literal, $commutative:expr) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $Kind;

        impl $Kind {
            pub const COMMUTATIVE: bool = $commutative;
        }

        impl StatementKind for $Kind {
            fn dialect(&self) -> &'static str {
                "arith"
            }
            fn name(&self) -> &'static str {
                $name
            }
            fn traits(&self) -> &'static [Trait] {
                PURE
            }
            fn verify(&self, stmt: &StatementView) -> anyhow::Result<()> {
                verify_binary(stmt, $name)
            }
        }
    };
}

binary_op!(Addi, "addi", true);
binary_op!(Subi, "subi", false);
binary_op!(Muli, "muli", true);

/// `arith.cmpi` — integer comparison, parametrized by a predicate attribute.
#[derive(Debug, Clone, Copy)]
pub struct Cmpi;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Predicate {
    pub fn apply(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            Predicate::Eq => lhs == rhs,
            Predicate::Ne => lhs != rhs,
            Predicate::Lt => lhs < rhs,
            Predicate::Le => lhs <= rhs,
            Predicate::Gt => lhs > rhs,
            Predicate::Ge => lhs >= rhs,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Predicate::Eq => "eq",
            Predicate::Ne => "ne",
            Predicate::Lt => "lt",
            Predicate::Le => "le",
            Predicate::Gt => "gt",
            Predicate::Ge => "ge",
        }
    }

    pub fn from_str(s: &str) -> Option<Predicate> {
        Some(match s {
                "eq" => Predicate::Eq,
                "ne" => Predicate::Ne,
                "lt" => Predicate::Lt,
                "le" => Predicate::Le,
                "gt" => Predicate::Gt,
                "ge" => Predicate::Ge,
                _ => return None,
            })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Attribute for Predicate {
    fn structural_eq(&self, other: &dyn Attribute) -> bool {
        other.downcast_ref::<Predicate>().map(|o| o == self).unwrap_or(false)
    }
}
impl Cmpi {
    pub fn attrs(predicate: Predicate) -> HashMap<String, Box<dyn Attribute>> {
        let mut m: HashMap<String, Box<dyn Attribute>> = HashMap::new();
        m.insert("predicate".to_string(), Box::new(predicate));
        m
    }

    pub fn predicate(view: &StatementView) -> anyhow::Result<Predicate> {
        view.data
        .get_attr("predicate")
        .and_then(|a| a.downcast_ref::<Predicate>())
        .copied()
        .ok_or_else(|| anyhow::anyhow!("arith.cmpi missing `predicate` attribute"))
    }
}

impl StatementKind for Cmpi {
    fn dialect(&self) -> &'static str {
        "arith"
    }
    fn name(&self) -> &'static str {
        "cmpi"
    }
    fn traits(&self) -> &'static [Trait] {
        PURE
    }
    fn verify(&self, stmt: &StatementView) -> anyhow::Result<()> {
        verify_binary(stmt, "cmpi")?;
        Cmpi::predicate(stmt)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::TypeAttribute;
    use crate::core::ir::RegionData;

    #[test]
    fn constant_carries_its_literal() {
        let mut r = RegionData::new();
        let b = r.append_block(vec![]);
        let (id, _results) = r
        .construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(5), vec![], vec![])
        .unwrap();
        let stmt = r.stmt(id).unwrap();
        let view = StatementView { id, kind: stmt.kind.as_ref(), data: stmt };
        assert_eq!(Constant::value(&view).unwrap(), &Literal::Int(5));
    }

    #[test]
    fn cmpi_predicate_round_trips() {
        let mut r = RegionData::new();
        let b = r.append_block(vec![]);
        let (c1, c1r) = r
        .construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![])
        .unwrap();
        let _ = c1;
        let (c2, c2r) = r
        .construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(2), vec![], vec![])
        .unwrap();
        let _ = c2;
        let (id, _r) = r
        .construct(
            b,
            Box::new(Cmpi),
            vec![c1r[0], c2r[0]],
            vec![TypeAttribute::class("bool")],
            Cmpi::attrs(Predicate::Lt),
            vec![],
            vec![],
        )
        .unwrap();
        let stmt = r.stmt(id).unwrap();
        let view = StatementView { id, kind: stmt.kind.as_ref(), data: stmt };
        assert_eq!(Cmpi::predicate(&view).unwrap(), Predicate::Lt);
    }
}
