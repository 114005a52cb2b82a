use strata_ir::attribute::TypeAttribute;
use strata_ir::dialect::DialectGroup;
use strata_ir::ir::RegionData;
use strata_ir::method::Method;

use strata_ir::analysis::typeinfer::{infer, type_infer_dialects};
use strata_ir::dialects::arith::{Addi, Constant};
use strata_ir::dialects::cf::{Branch, ConditionalBranch};
use strata_ir::dialects::func::Return;
use std::collections::HashMap;

fn group() -> DialectGroup {
    DialectGroup::new(type_infer_dialects())
}

#[test]
fn straight_line_addition_infers_to_int() {
    let mut r = RegionData::new();
    let entry = r.append_block(vec![TypeAttribute::class("int")]);
    let x = r.block_arg(entry, 0).unwrap();
    let (_c, cr) = r.construct(entry, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![]).unwrap();
    let (_s, sr) = r.construct(entry, Box::new(Addi), vec![cr[0], x], vec![TypeAttribute::class("int")], HashMap::new(), vec![], vec![]).unwrap();
    r.construct(entry, Box::new(Return), vec![sr[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let mut method = Method::new("f", vec!["x".to_string()], vec![TypeAttribute::class("int")], group(), r);
    infer(&mut method).unwrap();
    assert_eq!(method.return_type, Some(TypeAttribute::class("int")));
}

#[test]
fn inferring_the_same_method_twice_is_a_no_op_the_second_time() {
    let mut r = RegionData::new();
    let entry = r.append_block(vec![]);
    let (_c, cr) = r.construct(entry, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(9), vec![], vec![]).unwrap();
    r.construct(entry, Box::new(Return), vec![cr[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let mut method = Method::new("g", vec![], vec![], group(), r);
    infer(&mut method).unwrap();
    assert!(method.inferred);
    let first = method.return_type.clone();
    infer(&mut method).unwrap();
    assert_eq!(method.return_type, first);
}

#[test]
fn diamond_branches_returning_different_classes_widen_to_a_union() {
    let mut r = RegionData::new();
    let entry = r.append_block(vec![TypeAttribute::class("bool")]);
    let cond = r.block_arg(entry, 0).unwrap();
    let then_blk = r.append_block(vec![]);
    let else_blk = r.append_block(vec![]);
    r.construct(entry, Box::new(ConditionalBranch), vec![cond], vec![], HashMap::new(), vec![then_blk, else_blk], vec![]).unwrap();

    let (_c1, c1r) = r.construct(then_blk, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![]).unwrap();
    r.construct(then_blk, Box::new(Return), vec![c1r[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let (_c2, c2r) = r
        .construct(
            else_blk,
            Box::new(Constant),
            vec![],
            vec![TypeAttribute::class("str")],
            Constant::attrs_for(strata_ir::attribute::Literal::Str("x".to_string())),
            vec![],
            vec![],
        )
        .unwrap();
    r.construct(else_blk, Box::new(Return), vec![c2r[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let mut method = Method::new("h", vec!["c".to_string()], vec![TypeAttribute::class("bool")], group(), r);
    infer(&mut method).unwrap();
    match method.return_type {
        Some(TypeAttribute::Union(ref members)) => assert_eq!(members.len(), 2),
        other => panic!("expected a union of int/str, got {:?}", other),
    }
}

#[test]
fn unconditional_branch_carries_a_single_type_through() {
    let mut r = RegionData::new();
    let entry = r.append_block(vec![]);
    let target = r.append_block(vec![]);
    r.construct(entry, Box::new(Branch), vec![], vec![], HashMap::new(), vec![target], vec![]).unwrap();
    let (_c, cr) = r.construct(target, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(7), vec![], vec![]).unwrap();
    r.construct(target, Box::new(Return), vec![cr[0]], vec![], HashMap::new(), vec![], vec![]).unwrap();

    let mut method = Method::new("i", vec![], vec![], group(), r);
    infer(&mut method).unwrap();
    assert_eq!(method.return_type, Some(TypeAttribute::class("int")));
}
