//! Joint analysis: running type inference and constant
//! propagation together so each value carries both a type and, where it
//! folds, a known literal — without paying for two full worklist passes over
//! a disjoint `Product` registry (which would require every dialect to
//! register one combined handler per statement instead of reusing
//! `const_prop`/`typeinfer`'s independent ones).
//!
//! Grounded in `core::lattice::Product`, generalized here to compose two
//! already-complete [`ForwardDriver`] runs rather than drive a single
//! `Product<TypeAttribute, ConstLattice>`-typed registry: the two component
//! analyses dispatch on different statement sets in practice (`cf.cond_br`'s
//! constant-propagation rule can resolve to one successor; its type rule
//! always visits both), so keeping them as separate drivers avoids forcing
//! one dialect's handler to know about the other lattice's precision.

use std::collections::HashMap;

use crate::core::attribute::TypeAttribute;
use crate::core::dialect::DialectGroup;
use crate::core::ir::RegionData;
use crate::core::value::SSAValue;

use crate::analysis::const_prop::{const_prop_dialects, ConstLattice, CONST_PROP_KEY};
use crate::analysis::forward::ForwardDriver;
use crate::analysis::typeinfer::{type_infer_dialects, TYPE_INFER_KEY};

/// Per-value result of the joint analysis: a type and, where constant
/// propagation resolved one, a known literal.
pub struct JointResult {
    pub types: HashMap<SSAValue, TypeAttribute>,
    pub consts: HashMap<SSAValue, ConstLattice>,
    pub return_type: TypeAttribute,
    pub return_const: ConstLattice,
}

/// Run both component analyses over `region` and zip their results.
/// `group` supplies the dialects' *structural* registrations (arg names,
/// symbol tables,...); this function layers its own `typeinfer`/`constprop`
/// tables on top rather than requiring the caller to have registered them.
pub fn run(group: &DialectGroup, region: &RegionData, entry_types: Vec<TypeAttribute>, entry_consts: Vec<ConstLattice>) -> anyhow::Result<JointResult> {
    let type_group = DialectGroup::new(type_infer_dialects()).union(group);
    let const_group = DialectGroup::new(const_prop_dialects()).union(group);

    let type_driver: ForwardDriver<TypeAttribute> = ForwardDriver::new(&type_group, &[TYPE_INFER_KEY]);
    let const_driver: ForwardDriver<ConstLattice> = ForwardDriver::new(&const_group, &[CONST_PROP_KEY]);

    let types = type_driver.run(region, entry_types)?;
    let consts = const_driver.run(region, entry_consts)?;

    Ok(JointResult {
            types: types.values,
            consts: consts.values,
            return_type: types.return_value,
            return_const: consts.return_value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::Literal;
    use crate::dialects::arith::{Addi, Constant};
    use crate::dialects::func::Return;
    use std::collections::HashMap as Map;

    #[test]
    fn carries_both_type_and_folded_value() {
        let mut r = RegionData::new();
        let entry = r.append_block(vec![]);
        let (_c1, c1r) = r
        .construct(entry, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(2), vec![], vec![])
        .unwrap();
        let (_c2, c2r) = r
        .construct(entry, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(3), vec![], vec![])
        .unwrap();
        let (_s, sr) = r
        .construct(entry, Box::new(Addi), vec![c1r[0], c2r[0]], vec![TypeAttribute::class("int")], Map::new(), vec![], vec![])
        .unwrap();
        r.construct(entry, Box::new(Return), vec![sr[0]], vec![], Map::new(), vec![], vec![]).unwrap();

        let group = DialectGroup::new(vec![]);
        let result = run(&group, &r, vec![], vec![]).unwrap();
        assert_eq!(result.return_type, TypeAttribute::class("int"));
        assert_eq!(result.return_const, ConstLattice::Value(Literal::Int(5)));
    }
}
