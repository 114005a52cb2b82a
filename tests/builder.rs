use strata_ir::attribute::TypeAttribute;
use strata_ir::builder::{GlobalBinding, IrBuilder};
use strata_ir::dialects::arith::{Addi, Constant};

#[test]
fn builder_stack_discipline_produces_a_single_block_region() {
    let mut b = IrBuilder::new();
    b.push_frame(vec![], false);
    let (_id, results) = b.append_stmt(Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(7), vec![], vec![]).unwrap();
    assert_eq!(results.len(), 1);
    let region = b.pop_frame().unwrap();
    assert_eq!(region.block_order().len(), 1);
}

#[test]
fn builder_chains_two_statements_in_order() {
    let mut b = IrBuilder::new();
    b.push_frame(vec![], false);
    let (_c1, c1r) = b.append_stmt(Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![]).unwrap();
    let (_c2, c2r) = b.append_stmt(Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(2), vec![], vec![]).unwrap();
    let (_add, addr) =
        b.append_stmt(Box::new(Addi), vec![c1r[0], c2r[0]], vec![TypeAttribute::class("int")], Default::default(), vec![], vec![]).unwrap();
    assert_eq!(addr.len(), 1);
    let region = b.pop_frame().unwrap();
    let block = region.entry().unwrap();
    assert_eq!(region.statements_in(block).len(), 3);
}

#[test]
fn register_global_round_trips_through_lookup() {
    let mut b = IrBuilder::new();
    b.register_global("identity", GlobalBinding::Method("identity".to_string()));
    let found = match b.lookup_global("identity") {
        Some(GlobalBinding::Method(name)) => name == "identity",
        _ => false,
    };
    assert!(found);
    assert!(b.lookup_global("nonexistent").is_none());
}
