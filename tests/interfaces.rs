use strata_ir::attribute::TypeAttribute;
use strata_ir::ir::{RegionData, StatementView};
use strata_ir::dialects::func::Func;

#[test]
fn func_statement_kind_exposes_its_callable_and_symbol_interfaces() {
    let mut outer = RegionData::new();
    let entry = outer.append_block(vec![]);
    let mut body = RegionData::new();
    body.append_block(vec![TypeAttribute::class("int"), TypeAttribute::class("int")]);

    let (id, _) = outer
        .construct(entry, Box::new(Func::new(vec!["a".to_string(), "b".to_string()])), vec![], vec![], Func::attrs("add2"), vec![], vec![body])
        .unwrap();

    let stmt = outer.stmt(id).unwrap();
    let view = StatementView { id, kind: stmt.kind.as_ref(), data: stmt };

    let callable = stmt.kind.as_callable().expect("Func must expose CallableStmtInterface");
    assert_eq!(callable.arg_names(), &["a".to_string(), "b".to_string()]);
    assert_eq!(callable.callable_region_index(), 0);

    let symbol = stmt.kind.as_symbol().expect("Func must expose SymbolOpInterface");
    assert_eq!(symbol.sym_name(&view).unwrap(), "add2");
}

#[test]
fn non_callable_statement_kind_has_no_callable_interface() {
    use strata_ir::dialects::arith::Constant;
    let mut r = RegionData::new();
    let b = r.append_block(vec![]);
    let (id, _) = r.construct(b, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![]).unwrap();
    let stmt = r.stmt(id).unwrap();
    assert!(stmt.kind.as_callable().is_none());
    assert!(stmt.kind.as_symbol().is_none());
}
