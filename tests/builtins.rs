use strata_ir::attribute::{Literal, TypeAttribute};
use strata_ir::lattice::Lattice;

#[test]
fn bool_is_subtype_of_int_under_builtin_hierarchy() {
    let b = TypeAttribute::class("bool");
    let i = TypeAttribute::class("int");
    assert!(b.leq_builtin(&i));
    assert!(!i.leq_builtin(&b));
}

#[test]
fn join_builtin_widens_along_the_numeric_tower() {
    let b = TypeAttribute::class("bool");
    let f = TypeAttribute::class("float");
    assert_eq!(b.join_builtin(&f), f);
}

#[test]
fn lattice_join_without_a_hierarchy_falls_back_to_a_union() {
    let i = TypeAttribute::class("int");
    let s = TypeAttribute::class("str");
    match i.join(&s) {
        TypeAttribute::Union(members) => assert_eq!(members.len(), 2),
        other => panic!("expected a union of unrelated classes, got {:?}", other),
    }
}

#[test]
fn literal_class_names_match_their_builtin_hierarchy_entries() {
    assert_eq!(Literal::Bool(true).class_name(), "bool");
    assert_eq!(Literal::Int(1).class_name(), "int");
    assert_eq!(Literal::Float(1.5f64.to_bits()).class_name(), "float");
}
