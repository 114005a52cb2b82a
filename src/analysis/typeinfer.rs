//! Type inference: a [`ForwardDriver`] instantiated over
//! [`TypeAttribute`], resolving a method's argument types into a return type
//! and per-value type hints.
//!
//! Grounded in abstraps's `TypeWidenLattice`/`EmptyWidenLattice`
//! terminology but without a widening operator of its own — `TypeAttribute`
//! already widens distinct classes to a `Union` on join, so
//! this module only has to register each demonstration statement's typing
//! rule and drive the generic worklist.

use crate::core::attribute::TypeAttribute;
use crate::core::dialect::{Dialect, DialectGroup, Signature};
use crate::core::ir::StatementView;
use crate::core::method::Method;

use crate::analysis::forward::{AbstractOutcome, BoxedAbstractFn, ForwardDriver};
use crate::analysis::interp::Program;
use crate::dialects::arith::{Addi, Cmpi, Constant, Muli, Subi};
use crate::dialects::cf::{Branch, ConditionalBranch};
use crate::dialects::func::{Call, Invoke, Return};

pub const TYPE_INFER_KEY: &str = "typeinfer";

fn widen_binary(args: &[TypeAttribute]) -> TypeAttribute {
    args[0].join_builtin(&args[1])
}

/// Register the demonstration dialects' typing rules. Every rule is a pure
/// function of its operands' `TypeAttribute`s; none of them consult the
/// statement's own `result_types` field (the whole point of inference is to
/// recompute that independently and let a caller compare/replace it).
pub fn type_infer_dialects() -> Vec<Dialect> {
    let constant: BoxedAbstractFn<TypeAttribute> = Box::new(|view: &StatementView, _args: &[TypeAttribute]| {
            let lit = Constant::value(view)?;
            Ok(AbstractOutcome::Values(vec![TypeAttribute::class(lit.class_name())]))
        });
    let addi: BoxedAbstractFn<TypeAttribute> = Box::new(|_v, args| Ok(AbstractOutcome::Values(vec![widen_binary(args)])));
    let subi: BoxedAbstractFn<TypeAttribute> = Box::new(|_v, args| Ok(AbstractOutcome::Values(vec![widen_binary(args)])));
    let muli: BoxedAbstractFn<TypeAttribute> = Box::new(|_v, args| Ok(AbstractOutcome::Values(vec![widen_binary(args)])));
    let cmpi: BoxedAbstractFn<TypeAttribute> = Box::new(|_v, _args| Ok(AbstractOutcome::Values(vec![TypeAttribute::class("bool")])));

    let branch: BoxedAbstractFn<TypeAttribute> =
    Box::new(|view: &StatementView, _args: &[TypeAttribute]| Ok(AbstractOutcome::Successor(view.data.successors[0], vec![])));
    // Types say nothing about which arm a `cond_br` takes, so both successors
    // are always visited (unlike `const_prop`, which can resolve a known
    // boolean to a single target).
    let cond_br: BoxedAbstractFn<TypeAttribute> = Box::new(|view: &StatementView, _args: &[TypeAttribute]| {
            let (then_blk, else_blk) = (view.data.successors[0], view.data.successors[1]);
            Ok(AbstractOutcome::Successors(vec![(then_blk, vec![]), (else_blk, vec![])]))
        });

    let ret: BoxedAbstractFn<TypeAttribute> =
    Box::new(|_v, args| Ok(AbstractOutcome::Return(args.first().cloned().unwrap_or(TypeAttribute::Bottom))));
    // `ForwardDriver::run_in_program` resolves `func.call`/`func.invoke`
    // itself, recursing into the callee's own region the same way
    // `analysis::const_prop` does, and never consults this table for them.
    // These two entries only back plain `ForwardDriver::run` (no `Program`
    // in scope, e.g. walking a caller's body in isolation in a test), where
    // a call's type conservatively widens to `Any`.
    let call: BoxedAbstractFn<TypeAttribute> = Box::new(|_v, _args| Ok(AbstractOutcome::Values(vec![TypeAttribute::Any])));
    let invoke: BoxedAbstractFn<TypeAttribute> = Box::new(|_v, _args| Ok(AbstractOutcome::Values(vec![TypeAttribute::Any])));

    let arith = crate::dialects::arith_dialect()
    .interp(TYPE_INFER_KEY, Signature::class_only::<Constant>(), constant)
    .interp(TYPE_INFER_KEY, Signature::class_only::<Addi>(), addi)
    .interp(TYPE_INFER_KEY, Signature::class_only::<Subi>(), subi)
    .interp(TYPE_INFER_KEY, Signature::class_only::<Muli>(), muli)
    .interp(TYPE_INFER_KEY, Signature::class_only::<Cmpi>(), cmpi);
    let cf = crate::dialects::cf_dialect()
    .interp(TYPE_INFER_KEY, Signature::class_only::<Branch>(), branch)
    .interp(TYPE_INFER_KEY, Signature::class_only::<ConditionalBranch>(), cond_br);
    let func = crate::dialects::func_dialect()
    .interp(TYPE_INFER_KEY, Signature::class_only::<Return>(), ret)
    .interp(TYPE_INFER_KEY, Signature::class_only::<Call>(), call)
    .interp(TYPE_INFER_KEY, Signature::class_only::<Invoke>(), invoke);

    vec![arith, cf, func]
}

/// Infer `method`'s return type from its declared argument types, setting
/// `method.inferred` before recursing into its own body so a self-recursive
/// call sees a `verified: false` but already-`inferred` method and does not
/// loop forever.
pub fn infer(method: &mut Method) -> anyhow::Result<()> {
    if method.inferred {
        return Ok(());
    }
    method.inferred = true;
    let driver: ForwardDriver<TypeAttribute> = ForwardDriver::new(&method.group, &[TYPE_INFER_KEY]);
    let result = driver.run(&method.region, method.arg_types.clone())?;
    method.return_type = Some(result.return_value);
    Ok(())
}

/// Infer `symbol`'s return type with calls/invokes resolved
/// interprocedurally against the rest of `program`: a `func.call`/
/// `func.invoke` recurses into the callee's own region rather than widening
/// to `Any`, bounded by the driver's `max_call_depth`. Unlike [`infer`],
/// this does not mutate any `Method` in `program` — callers that want the
/// result cached on the method itself should write `return_type` back
/// after the call.
pub fn infer_in_program(program: &Program, symbol: &str) -> anyhow::Result<TypeAttribute> {
    let method = program.get(symbol)?;
    let driver: ForwardDriver<TypeAttribute> = ForwardDriver::new(&method.group, &[TYPE_INFER_KEY]);
    let result = driver.run_in_program(program, &method.region, method.arg_types.clone())?;
    Ok(result.return_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dialect::DialectGroup;
    use crate::core::ir::RegionData;
    use std::collections::HashMap as Map;

    fn group() -> DialectGroup {
        DialectGroup::new(type_infer_dialects())
    }

    #[test]
    fn infers_int_return_for_straight_line_addition() {
        let mut r = RegionData::new();
        let entry = r.append_block(vec![TypeAttribute::class("int")]);
        let x = r.block_arg(entry, 0).unwrap();
        let (_c, cr) = r
        .construct(entry, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![])
        .unwrap();
        let (_s, sr) = r
        .construct(entry, Box::new(Addi), vec![cr[0], x], vec![TypeAttribute::class("int")], Map::new(), vec![], vec![])
        .unwrap();
        r.construct(entry, Box::new(Return), vec![sr[0]], vec![], Map::new(), vec![], vec![]).unwrap();

        let mut method = Method::new("f", vec!["x".to_string()], vec![TypeAttribute::class("int")], group(), r);
        infer(&mut method).unwrap();
        assert_eq!(method.return_type, Some(TypeAttribute::class("int")));
    }

    #[test]
    fn widens_diverging_branch_types_to_a_union() {
        let mut r = RegionData::new();
        let entry = r.append_block(vec![TypeAttribute::class("bool")]);
        let cond = r.block_arg(entry, 0).unwrap();
        let then_blk = r.append_block(vec![]);
        let else_blk = r.append_block(vec![]);
        r.construct(entry, Box::new(ConditionalBranch), vec![cond], vec![], Map::new(), vec![then_blk, else_blk], vec![])
        .unwrap();
        let (_c1, c1r) = r
        .construct(then_blk, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![])
        .unwrap();
        r.construct(then_blk, Box::new(Return), vec![c1r[0]], vec![], Map::new(), vec![], vec![]).unwrap();
        let (_c2, c2r) = r
        .construct(else_blk, Box::new(Constant), vec![], vec![TypeAttribute::class("float")], Constant::attrs_for(crate::core::attribute::Literal::float(2.0)), vec![], vec![])
        .unwrap();
        r.construct(else_blk, Box::new(Return), vec![c2r[0]], vec![], Map::new(), vec![], vec![]).unwrap();

        let mut method = Method::new("g", vec!["c".to_string()], vec![TypeAttribute::class("bool")], group(), r);
        infer(&mut method).unwrap();
        // The driver joins return values across paths via `Lattice::join`,
        // which threads an empty class hierarchy (see `TypeAttribute`'s
        // `Lattice` impl) — `int` and `float` are incomparable under it, so
        // they widen to a `Union` rather than collapsing via the builtin
        // numeric tower.
        match method.return_type {
            Some(TypeAttribute::Union(ref members)) => assert_eq!(members.len(), 2),
            other => panic!("expected a widened union, got {:?}", other),
        }
    }

    /// `foo(x: int) = x`; `main() = foo(1)`. Resolving `main` in isolation
    /// (no `Program`) types the call as `Any`; resolving it against a
    /// `Program` containing `foo` recovers the precise `int` return type.
    #[test]
    fn call_type_resolves_interprocedurally_under_infer_in_program() {
        let mut foo_region = RegionData::new();
        let foo_entry = foo_region.append_block(vec![TypeAttribute::class("int")]);
        let x = foo_region.block_arg(foo_entry, 0).unwrap();
        foo_region.construct(foo_entry, Box::new(Return), vec![x], vec![], Map::new(), vec![], vec![]).unwrap();
        let foo = Method::new("foo", vec!["x".to_string()], vec![TypeAttribute::class("int")], group(), foo_region);

        let mut main_region = RegionData::new();
        let main_entry = main_region.append_block(vec![]);
        let (_c, cr) = main_region
        .construct(main_entry, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![])
        .unwrap();
        let (_call, call_r) = main_region
        .construct(main_entry, Box::new(Call), vec![cr[0]], vec![TypeAttribute::class("int")], Call::attrs("foo"), vec![], vec![])
        .unwrap();
        main_region.construct(main_entry, Box::new(Return), vec![call_r[0]], vec![], Map::new(), vec![], vec![]).unwrap();
        let main = Method::new("main", vec![], vec![], group(), main_region);

        let isolated = {
            let driver: ForwardDriver<TypeAttribute> = ForwardDriver::new(&main.group, &[TYPE_INFER_KEY]);
            driver.run(&main.region, vec![]).unwrap().return_value
        };
        assert_eq!(isolated, TypeAttribute::Any);

        let mut program = Program::new();
        program.define(foo);
        program.define(main);
        let resolved = infer_in_program(&program, "main").unwrap();
        assert_eq!(resolved, TypeAttribute::class("int"));
    }
}
