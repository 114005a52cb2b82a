//! Constant propagation: a [`ForwardDriver`] instantiated over
//! a flat constant lattice, reusing the concrete interpreter's own arithmetic
//! (`analysis::interp::two_ints`, `eval_cmpi`) as the oracle for folding
//! `Pure`/`ConstantLike` statements whose operands are already fully known.
//!
//! Grounded in the rule that if a statement is `ConstantLike` or `Pure`
//! with all-`Value` arguments, constant propagation attempts concrete
//! evaluation and wraps the result, falling back to `Unknown` on any
//! interpreter error. The demonstration dialects never build tuples or
//! lambdas, so this kernel collapses everything short of a literal into a
//! single `Unknown` rather than speculatively modeling `PartialTuple`/
//! `PartialLambda` variants with no constructor to populate them — see
//! DESIGN.md.
//!
//! Cross-method calls: `func.call`/`func.invoke` are not registered with an
//! interprocedural rule here at all — `ForwardDriver::run_in_program`
//! resolves the callee in the supplied `Program` and recurses into its
//! region directly, bounded by `max_call_depth`, so a call's folded value
//! is exactly the callee's own folded return value. The `call`/`invoke`
//! entries registered below only matter to plain `ForwardDriver::run`,
//! which has no `Program` to resolve a callee against.

use crate::core::attribute::Literal;
use crate::core::dialect::{Dialect, DialectGroup, Signature};
use crate::core::ir::StatementView;
use crate::core::lattice::Lattice;

use crate::analysis::forward::{AbstractOutcome, BoxedAbstractFn};
use crate::analysis::interp::{eval_cmpi, two_ints, StmtOutcome};
use crate::dialects::arith::{Addi, Cmpi, Constant, Muli, Subi};
use crate::dialects::cf::{Branch, ConditionalBranch};
use crate::dialects::func::{Call, Invoke, Return};

pub const CONST_PROP_KEY: &str = "constprop";

/// The constant-propagation lattice: bottom (not yet reached), a single
/// known literal, or `Unknown` once two distinct values meet.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstLattice {
    Bottom,
    Value(Literal),
    Unknown,
}

impl Lattice for ConstLattice {
    fn top() -> Self {
        ConstLattice::Unknown
    }

    fn bottom() -> Self {
        ConstLattice::Bottom
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (ConstLattice::Bottom, x) | (x, ConstLattice::Bottom) => x.clone(),
            (ConstLattice::Value(a), ConstLattice::Value(b)) if a == b => ConstLattice::Value(a.clone()),
            _ => ConstLattice::Unknown,
        }
    }

    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (ConstLattice::Unknown, x) | (x, ConstLattice::Unknown) => x.clone(),
            (ConstLattice::Value(a), ConstLattice::Value(b)) if a == b => ConstLattice::Value(a.clone()),
            _ => ConstLattice::Bottom,
        }
    }
}

/// All known `Value`s, or `None` if any operand is still `Bottom`/`Unknown`.
fn all_values(args: &[ConstLattice]) -> Option<Vec<Literal>> {
    args.iter()
    .map(|a| match a {
            ConstLattice::Value(v) => Some(v.clone()),
            _ => None,
        })
    .collect()
}

fn binary_fold(args: &[ConstLattice], op: impl Fn(i64, i64) -> i64) -> anyhow::Result<AbstractOutcome<ConstLattice>> {
    match all_values(args) {
        Some(lits) => match two_ints(&lits) {
            Ok((a, b)) => Ok(AbstractOutcome::Values(vec![ConstLattice::Value(Literal::Int(op(a, b)))])),
            Err(_) => Ok(AbstractOutcome::Values(vec![ConstLattice::Unknown])),
        },
        None => {
            let out = if args.iter().any(|a| *a == ConstLattice::Bottom) {
                ConstLattice::Bottom
            } else {
                ConstLattice::Unknown
            };
            Ok(AbstractOutcome::Values(vec![out]))
        }
    }
}

/// Register the demonstration dialects' constant-propagation semantics. `cf`
/// is included here (rather than left to `analysis::cfg`) because only an
/// analysis instantiated over a concrete lattice can decide whether
/// `cf.cond_br`'s condition has folded to a known boolean.
pub fn const_prop_dialects() -> Vec<Dialect> {
    let constant: BoxedAbstractFn<ConstLattice> = Box::new(|view: &StatementView, _args: &[ConstLattice]| {
            let lit = Constant::value(view)?;
            Ok(AbstractOutcome::Values(vec![ConstLattice::Value(lit.clone())]))
        });
    let addi: BoxedAbstractFn<ConstLattice> = Box::new(|_v, args| binary_fold(args, |a, b| a + b));
    let subi: BoxedAbstractFn<ConstLattice> = Box::new(|_v, args| binary_fold(args, |a, b| a - b));
    let muli: BoxedAbstractFn<ConstLattice> = Box::new(|_v, args| binary_fold(args, |a, b| a * b));
    let cmpi: BoxedAbstractFn<ConstLattice> = Box::new(|view: &StatementView, args: &[ConstLattice]| {
            match all_values(args) {
                Some(lits) => match eval_cmpi(view, &lits)? {
                    StmtOutcome::Values(vs) => Ok(AbstractOutcome::Values(vec![ConstLattice::Value(vs.into_iter().next().unwrap())])),
                },
                None => {
                    let out = if args.iter().any(|a| *a == ConstLattice::Bottom) {
                        ConstLattice::Bottom
                    } else {
                        ConstLattice::Unknown
                    };
                    Ok(AbstractOutcome::Values(vec![out]))
                }
            }
        });

    let branch: BoxedAbstractFn<ConstLattice> = Box::new(|view: &StatementView, _args: &[ConstLattice]| {
            Ok(AbstractOutcome::Successor(view.data.successors[0], vec![]))
        });
    let cond_br: BoxedAbstractFn<ConstLattice> = Box::new(|view: &StatementView, args: &[ConstLattice]| {
            let (then_blk, else_blk) = (view.data.successors[0], view.data.successors[1]);
            match &args[0] {
                ConstLattice::Value(lit) if lit.truthy() => Ok(AbstractOutcome::Successor(then_blk, vec![])),
                ConstLattice::Value(_) => Ok(AbstractOutcome::Successor(else_blk, vec![])),
                _ => Ok(AbstractOutcome::Successors(vec![(then_blk, vec![]), (else_blk, vec![])])),
            }
        });

    let ret: BoxedAbstractFn<ConstLattice> = Box::new(|_v, args| Ok(AbstractOutcome::Return(args.first().cloned().unwrap_or(ConstLattice::Bottom))));
    // `ForwardDriver::run_in_program` resolves `func.call`/`func.invoke`
    // itself by recursing into the callee's region (see `analysis::forward`)
    // and never consults this table for them. These two entries only back
    // `ForwardDriver::run` (no `Program` in scope, e.g. analyzing a region
    // in isolation), where a call's result is conservatively `Unknown`.
    let call: BoxedAbstractFn<ConstLattice> = Box::new(|_v, _args| Ok(AbstractOutcome::Values(vec![ConstLattice::Unknown])));
    let invoke: BoxedAbstractFn<ConstLattice> = Box::new(|_v, _args| Ok(AbstractOutcome::Values(vec![ConstLattice::Unknown])));

    let arith = crate::dialects::arith_dialect()
    .interp(CONST_PROP_KEY, Signature::class_only::<Constant>(), constant)
    .interp(CONST_PROP_KEY, Signature::class_only::<Addi>(), addi)
    .interp(CONST_PROP_KEY, Signature::class_only::<Subi>(), subi)
    .interp(CONST_PROP_KEY, Signature::class_only::<Muli>(), muli)
    .interp(CONST_PROP_KEY, Signature::class_only::<Cmpi>(), cmpi);
    let cf = crate::dialects::cf_dialect()
    .interp(CONST_PROP_KEY, Signature::class_only::<Branch>(), branch)
    .interp(CONST_PROP_KEY, Signature::class_only::<ConditionalBranch>(), cond_br);
    let func = crate::dialects::func_dialect()
    .interp(CONST_PROP_KEY, Signature::class_only::<Return>(), ret)
    .interp(CONST_PROP_KEY, Signature::class_only::<Call>(), call)
    .interp(CONST_PROP_KEY, Signature::class_only::<Invoke>(), invoke);

    vec![arith, cf, func]
}
