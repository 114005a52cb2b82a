use std::collections::HashMap;

use strata_ir::attribute::{Literal, TypeAttribute};
use strata_ir::dialect::DialectGroup;
use strata_ir::ir::RegionData;

use strata_ir::analysis::const_prop::{const_prop_dialects, ConstLattice, CONST_PROP_KEY};
use strata_ir::analysis::forward::ForwardDriver;
use strata_ir::analysis::joint;
use strata_ir::dialects::arith::{Addi, Cmpi, Constant, Muli, Predicate};
use strata_ir::dialects::cf::ConditionalBranch;
use strata_ir::dialects::func::Return;

fn const_group() -> DialectGroup {
    DialectGroup::new(const_prop_dialects())
}

#[test]
fn const_prop_folds_a_multiplication_of_two_constants() {
    let mut r = RegionData::new();
    let b = r.append_block(vec![]);
    let (_c1, c1r) = r.construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(6), vec![], vec![]).unwrap();
    let (_c2, c2r) = r.construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(7), vec![], vec![]).unwrap();
    let (_m, mr) = r.construct(b, Box::new(Muli), vec![c1r[0], c2r[0]], vec![TypeAttribute::class("int")], HashMap::new(), vec![], vec![]).unwrap();
    r.construct(b, Box::new(Return), vec![mr[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let driver: ForwardDriver<ConstLattice> = ForwardDriver::new(&const_group(), &[CONST_PROP_KEY]);
    let result = driver.run(&r, vec![]).unwrap();
    assert_eq!(result.return_value, ConstLattice::Value(Literal::Int(42)));
}

#[test]
fn const_prop_cannot_resolve_a_call_and_falls_back_to_unknown() {
    use strata_ir::dialects::func::Call;
    let mut r = RegionData::new();
    let b = r.append_block(vec![]);
    let (_c, cr) = r.construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![]).unwrap();
    let (_call, callr) = r.construct(b, Box::new(Call), vec![cr[0]], vec![TypeAttribute::class("int")], Call::attrs("other"), vec![], vec![]).unwrap();
    r.construct(b, Box::new(Return), vec![callr[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let driver: ForwardDriver<ConstLattice> = ForwardDriver::new(&const_group(), &[CONST_PROP_KEY]);
    let result = driver.run(&r, vec![]).unwrap();
    assert_eq!(result.return_value, ConstLattice::Unknown);
}

#[test]
fn joint_analysis_carries_both_the_inferred_type_and_the_folded_value() {
    // f() = (2 < 3) has a known bool type and a known true value.
    let mut r = RegionData::new();
    let b = r.append_block(vec![]);
    let (_c1, c1r) = r.construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(2), vec![], vec![]).unwrap();
    let (_c2, c2r) = r.construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(3), vec![], vec![]).unwrap();
    let (_cmp, cmpr) = r
        .construct(b, Box::new(Cmpi), vec![c1r[0], c2r[0]], vec![TypeAttribute::class("bool")], Cmpi::attrs(Predicate::Lt), vec![], vec![])
        .unwrap();
    r.construct(b, Box::new(Return), vec![cmpr[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let group = DialectGroup::new(vec![]);
    let result = joint::run(&group, &r, vec![], vec![]).unwrap();
    assert_eq!(result.return_type, TypeAttribute::class("bool"));
    assert_eq!(result.return_const, ConstLattice::Value(Literal::Bool(true)));
}

#[test]
fn joint_analysis_widens_an_unresolved_branch_but_still_types_each_arm() {
    let mut r = RegionData::new();
    let entry = r.append_block(vec![TypeAttribute::class("bool")]);
    let cond = r.block_arg(entry, 0).unwrap();
    let then_blk = r.append_block(vec![]);
    let else_blk = r.append_block(vec![]);
    r.construct(entry, Box::new(ConditionalBranch), vec![cond], vec![], HashMap::new(), vec![then_blk, else_blk], vec![]).unwrap();

    let (_c1, c1r) = r.construct(then_blk, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![]).unwrap();
    r.construct(then_blk, Box::new(Return), vec![c1r[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let (_c2, c2r) =
        r.construct(else_blk, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(2), vec![], vec![]).unwrap();
    r.construct(else_blk, Box::new(Return), vec![c2r[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let group = DialectGroup::new(vec![]);
    let result = joint::run(&group, &r, vec![TypeAttribute::class("bool")], vec![ConstLattice::Unknown]).unwrap();
    assert_eq!(result.return_type, TypeAttribute::class("int"));
    assert_eq!(result.return_const, ConstLattice::Unknown);
}

#[test]
fn addi_of_two_constants_folds_under_const_prop_alone() {
    let mut r = RegionData::new();
    let b = r.append_block(vec![]);
    let (_c1, c1r) = r.construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(10), vec![], vec![]).unwrap();
    let (_c2, c2r) = r.construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(32), vec![], vec![]).unwrap();
    let (_add, addr) = r.construct(b, Box::new(Addi), vec![c1r[0], c2r[0]], vec![TypeAttribute::class("int")], HashMap::new(), vec![], vec![]).unwrap();
    r.construct(b, Box::new(Return), vec![addr[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let driver: ForwardDriver<ConstLattice> = ForwardDriver::new(&const_group(), &[CONST_PROP_KEY]);
    let result = driver.run(&r, vec![]).unwrap();
    assert_eq!(result.return_value, ConstLattice::Value(Literal::Int(42)));
}
