use strata_ir::attribute::{Literal, TypeAttribute};
use strata_ir::dialect::DialectGroup;
use strata_ir::ir::RegionData;
use strata_ir::method::Method;

use strata_ir::analysis::interp::{arith_interp, Interpreter, Program};
use strata_ir::dialects::arith::{Addi, Constant};
use strata_ir::dialects::func::{Call, Return};
use strata_ir::dialects::{cf_dialect, func_dialect};

fn group() -> DialectGroup {
    DialectGroup::new(vec![arith_interp(), func_dialect(), cf_dialect()])
}

/// `double(x) = x + x`
fn double() -> Method {
    let mut r = RegionData::new();
    let entry = r.append_block(vec![TypeAttribute::class("int")]);
    let x = r.block_arg(entry, 0).unwrap();
    let (_s, sr) = r.construct(entry, Box::new(Addi), vec![x, x], vec![TypeAttribute::class("int")], Default::default(), vec![], vec![]).unwrap();
    r.construct(entry, Box::new(Return), vec![sr[0]], vec![], Default::default(), vec![], vec![]).unwrap();
    Method::new("double", vec!["x".to_string()], vec![TypeAttribute::class("int")], group(), r)
}

/// `caller(x) = double(x) + 1`
fn caller() -> Method {
    let mut r = RegionData::new();
    let entry = r.append_block(vec![TypeAttribute::class("int")]);
    let x = r.block_arg(entry, 0).unwrap();
    let (_call, callr) = r.construct(entry, Box::new(Call), vec![x], vec![TypeAttribute::class("int")], Call::attrs("double"), vec![], vec![]).unwrap();
    let (_c1, c1r) = r.construct(entry, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![]).unwrap();
    let (_s, sr) =
        r.construct(entry, Box::new(Addi), vec![callr[0], c1r[0]], vec![TypeAttribute::class("int")], Default::default(), vec![], vec![]).unwrap();
    r.construct(entry, Box::new(Return), vec![sr[0]], vec![], Default::default(), vec![], vec![]).unwrap();
    Method::new("caller", vec!["x".to_string()], vec![TypeAttribute::class("int")], group(), r)
}

#[test]
fn resolves_a_call_across_two_methods() {
    let mut program = Program::new();
    program.define(double());
    program.define(caller());
    let interp = Interpreter::new(&group());
    let result = interp.call(&program, program.get("caller").unwrap(), &[Literal::Int(5)]).unwrap();
    assert_eq!(result, Literal::Int(11));
}

#[test]
fn unknown_callee_is_reported() {
    let mut program = Program::new();
    program.define(caller());
    let interp = Interpreter::new(&group());
    let err = interp.call(&program, program.get("caller").unwrap(), &[Literal::Int(5)]).unwrap_err();
    assert!(format!("{}", err).to_lowercase().contains("double"));
}

#[test]
fn arity_mismatch_is_reported() {
    let program = Program::new();
    let interp = Interpreter::new(&group());
    let err = interp.call(&program, &double(), &[]).unwrap_err();
    assert!(format!("{}", err).to_lowercase().contains("arguments"));
}
