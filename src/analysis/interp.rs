//! The concrete interpreter: frame-based execution of a
//! method's callable region, statement dispatch through the dialect
//! registry, fuel/depth limits, and single-instance reentrancy.
//!
//! Grounded in abstraps's `core::absint::Interpreter<L>` single-pass
//! driver shape (frame, dispatch, one step per statement), generalized
//! with a tagged-result-variant design: `func.return`,
//! `cf.br`/`cf.cond_br`, and `func.call`/`func.invoke` are handled directly
//! by the region driver (they need access to the call stack and the
//! program's symbol table, which a registered per-statement function does
//! not have); everything else dispatches through the `"main"` registry.

use std::cell::Cell;
use std::collections::HashMap;

use anyhow::bail;

use crate::core::attribute::Literal;
use crate::core::dialect::{DialectGroup, Registry};
use crate::core::diagnostics::KernelError;
use crate::core::ident::BlockId;
use crate::core::ir::{RegionData, StatementView};
use crate::core::method::Method;
use crate::core::value::SSAValue;
use crate::dialects::arith::{Addi, Cmpi, Constant, Muli, Subi};
use crate::dialects::cf::{Branch, ConditionalBranch};
use crate::dialects::func::{Call, Invoke, Return};

/// What evaluating one non-control-flow statement produces.
#[derive(Clone, Debug)]
pub enum StmtOutcome {
    Values(Vec<Literal>),
}

pub type ConcreteFn = dyn Fn(&[Literal]) -> anyhow::Result<StmtOutcome> + Send + Sync;

/// The shared, `Sized` handle every `"main"`-keyed registration is stored
/// and downcast as.
pub type BoxedConcreteFn = Box<ConcreteFn>;

/// A symbol table of callable methods, resolved by `func.call`/`func.invoke`.
#[derive(Default)]
pub struct Program {
    pub methods: HashMap<String, Method>,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    pub fn define(&mut self, method: Method) {
        self.methods.insert(method.symbol.clone(), method);
    }

    pub fn get(&self, symbol: &str) -> anyhow::Result<&Method> {
        self.methods.get(symbol).ok_or_else(|| KernelError::UnknownGlobal(symbol.to_string()).into())
    }
}

/// Register the `arith` dialect's concrete-evaluation table. `arith.constant`
/// carries its value directly (it is `ConstantLike`, not operand-driven) so
/// the region driver materializes it without consulting this table.
pub fn arith_interp() -> crate::core::dialect::Dialect {
    use crate::core::dialect::Signature;
    let addi: BoxedConcreteFn = Box::new(|args: &[Literal]| {
            let (a, b) = two_ints(args)?;
            Ok(StmtOutcome::Values(vec![Literal::Int(a + b)]))
        });
    let subi: BoxedConcreteFn = Box::new(|args: &[Literal]| {
            let (a, b) = two_ints(args)?;
            Ok(StmtOutcome::Values(vec![Literal::Int(a - b)]))
        });
    let muli: BoxedConcreteFn = Box::new(|args: &[Literal]| {
            let (a, b) = two_ints(args)?;
            Ok(StmtOutcome::Values(vec![Literal::Int(a * b)]))
        });
    crate::dialects::arith_dialect()
    .interp("main", Signature::class_only::<Addi>(), addi)
    .interp("main", Signature::class_only::<Subi>(), subi)
    .interp("main", Signature::class_only::<Muli>(), muli)
}

/// `arith.cmpi` dispatches on its own `predicate` attribute rather than the
/// operand values, so it is registered with access to the statement view.
pub fn eval_cmpi(view: &StatementView, args: &[Literal]) -> anyhow::Result<StmtOutcome> {
    let (a, b) = two_ints(args)?;
    let predicate = Cmpi::predicate(view)?;
    Ok(StmtOutcome::Values(vec![Literal::Bool(predicate.apply(a, b))]))
}

pub(crate) fn two_ints(args: &[Literal]) -> anyhow::Result<(i64, i64)> {
    if args.len() != 2 {
        bail!("expected exactly two operands, got {}", args.len());
    }
    let a = args[0].as_i64().ok_or_else(|| anyhow::anyhow!("operand 0 is not an int"))?;
    let b = args[1].as_i64().ok_or_else(|| anyhow::anyhow!("operand 1 is not an int"))?;
    Ok((a, b))
}

/// Per-call execution state.
pub struct Frame {
    pub values: HashMap<SSAValue, Literal>,
    pub current_block: BlockId,
}

impl Frame {
    fn get(&self, v: SSAValue) -> anyhow::Result<Literal> {
        self.values.get(&v).cloned().ok_or_else(|| anyhow::anyhow!("use of {} before definition", v))
    }
}

/// The concrete interpreter. One instance serializes its own
/// re-entry: a `call` already in progress on this instance rejects a nested
/// `call`.
pub struct Interpreter {
    registry: Registry<BoxedConcreteFn>,
    fuel: Option<u64>,
    max_depth: usize,
    in_progress: Cell<bool>,
}

impl Interpreter {
    pub fn new(group: &DialectGroup) -> Interpreter {
        Interpreter {
            registry: group.build_registry(&["main"]),
            fuel: None,
            max_depth: 1024,
            in_progress: Cell::new(false),
        }
    }

    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = Some(fuel);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// `Interpreter(group).call(method, args)`.
    pub fn call(&self, program: &Program, method: &Method, args: &[Literal]) -> anyhow::Result<Literal> {
        if self.in_progress.replace(true) {
            bail!(KernelError::Reentrant);
        }
        let mut steps = 0u64;
        let result = self.call_inner(program, method, args, 0, &mut steps);
        self.in_progress.set(false);
        result
    }

    fn call_inner(&self, program: &Program, method: &Method, args: &[Literal], depth: usize, steps: &mut u64) -> anyhow::Result<Literal> {
        if depth > self.max_depth {
            bail!(KernelError::DepthExceeded { depth, max: self.max_depth });
        }
        if args.len() != method.arity() {
            bail!(KernelError::ArityMismatch {
                    statement: method.symbol.clone(),
                    expected: method.arity(),
                    found: args.len(),
                });
        }
        self.run_region(program, &method.region, args.to_vec(), depth, steps)
    }

    fn charge(&self, steps: &mut u64) -> anyhow::Result<()> {
        *steps += 1;
        if let Some(fuel) = self.fuel {
            if *steps > fuel {
                bail!(KernelError::FuelExhausted { steps: *steps });
            }
        }
        Ok(())
    }

    fn run_region(&self, program: &Program, region: &RegionData, entry_args: Vec<Literal>, depth: usize, steps: &mut u64) -> anyhow::Result<Literal> {
        let entry = region.entry().ok_or_else(|| anyhow::anyhow!("region has no entry block"))?;
        let mut block = entry;
        let mut frame = Frame { values: HashMap::new(), current_block: entry };
        for (i, v) in entry_args.into_iter().enumerate() {
            frame.values.insert(SSAValue::BlockArgument { block: entry, index: i }, v);
        }

        loop {
            let stmt_ids = region.statements_in(block).to_vec();
            if stmt_ids.is_empty() {
                bail!(KernelError::NonTerminatedBlock { block: format!("{}", block) });
            }
            let mut jumped = None;
            let mut returned = None;
            for id in stmt_ids {
                self.charge(steps)?;
                let data = region.stmt(id).unwrap();
                let arg_values: Vec<Literal> = data.args.iter().map(|a| frame.get(*a)).collect::<anyhow::Result<_>>()?;
                let view = StatementView { id, kind: data.kind.as_ref(), data };

                if data.kind.downcast_ref::<Constant>().is_some() {
                    let lit = Constant::value(&view)?.clone();
                    frame.values.insert(SSAValue::Result { stmt: id, index: 0 }, lit);
                } else if data.kind.downcast_ref::<Cmpi>().is_some() {
                    match eval_cmpi(&view, &arg_values)? {
                        StmtOutcome::Values(vs) => {
                            frame.values.insert(SSAValue::Result { stmt: id, index: 0 }, vs.into_iter().next().unwrap());
                        }
                    }
                } else if data.kind.downcast_ref::<Return>().is_some() {
                    returned = Some(arg_values.into_iter().next().unwrap_or(Literal::None));
                    break;
                } else if data.kind.downcast_ref::<Branch>().is_some() {
                    let target = data.successors[0];
                    jumped = Some((target, Vec::new()));
                    break;
                } else if data.kind.downcast_ref::<ConditionalBranch>().is_some() {
                    let cond = arg_values[0].truthy();
                    let target = if cond { data.successors[0] } else { data.successors[1] };
                    jumped = Some((target, Vec::new()));
                    break;
                } else if data.kind.downcast_ref::<Call>().is_some() || data.kind.downcast_ref::<Invoke>().is_some() {
                    let callee_name = if data.kind.downcast_ref::<Call>().is_some() {
                        Call::callee(&view)?
                    } else {
                        Invoke::callee(&view)?
                    };
                    let callee = program.get(callee_name)?;
                    let result = self.call_inner(program, callee, &arg_values, depth + 1, steps)?;
                    if !data.result_types.is_empty() {
                        frame.values.insert(SSAValue::Result { stmt: id, index: 0 }, result);
                    }
                } else {
                    let type_id = data.kind.as_any().type_id();
                    let f = self
                    .registry
                    .resolve_class_only(type_id)
                    .ok_or_else(|| KernelError::Dispatch {
                            statement: format!("{}", data.kind),
                            signature: vec![format!("{}", data.kind)],
                        })?;
                    match f(&arg_values)? {
                        StmtOutcome::Values(vs) => {
                            for (index, v) in vs.into_iter().enumerate() {
                                frame.values.insert(SSAValue::Result { stmt: id, index }, v);
                            }
                        }
                    }
                }
            }

            if let Some(v) = returned {
                return Ok(v);
            }
            if let Some((target, incoming)) = jumped {
                frame.current_block = target;
                for (i, v) in incoming.into_iter().enumerate() {
                    frame.values.insert(SSAValue::BlockArgument { block: target, index: i }, v);
                }
                block = target;
                continue;
            }
            bail!(KernelError::MissingSuccessor { block: format!("{}", block) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::TypeAttribute;
    use crate::core::dialect::DialectGroup;
    use crate::core::ir::RegionData;
    use crate::dialects::{cf_dialect, func_dialect};

    fn group() -> DialectGroup {
        DialectGroup::new(vec![arith_interp(), func_dialect(), cf_dialect()])
    }

    /// `f(x) = (1 + 2) + x`
    fn add_one_two_and_x() -> Method {
        let mut r = RegionData::new();
        let entry = r.append_block(vec![TypeAttribute::class("int")]);
        let x = r.block_arg(entry, 0).unwrap();
        let (_c1, c1r) = r
        .construct(entry, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(1), vec![], vec![])
        .unwrap();
        let (_c2, c2r) = r
        .construct(entry, Box::new(Constant), vec![], vec![TypeAttribute::class("int")], Constant::attrs(2), vec![], vec![])
        .unwrap();
        let (_s, sr) = r
        .construct(entry, Box::new(Addi), vec![c1r[0], c2r[0]], vec![TypeAttribute::class("int")], Default::default(), vec![], vec![])
        .unwrap();
        let (_s2, s2r) = r
        .construct(entry, Box::new(Addi), vec![sr[0], x], vec![TypeAttribute::class("int")], Default::default(), vec![], vec![])
        .unwrap();
        r.construct(entry, Box::new(Return), vec![s2r[0]], vec![], Default::default(), vec![], vec![]).unwrap();
        Method::new("f", vec!["x".to_string()], vec![TypeAttribute::class("int")], group(), r)
    }

    #[test]
    fn evaluates_constant_folded_shape() {
        let method = add_one_two_and_x();
        let program = Program::new();
        let interp = Interpreter::new(&group());
        let result = interp.call(&program, &method, &[Literal::Int(4)]).unwrap();
        assert_eq!(result, Literal::Int(7));
    }

    #[test]
    fn fuel_exhaustion_is_reported() {
        let method = add_one_two_and_x();
        let program = Program::new();
        let interp = Interpreter::new(&group()).with_fuel(3);
        let err = interp.call(&program, &method, &[Literal::Int(4)]).unwrap_err();
        assert!(format!("{}", err).contains("fuel"));
    }

    #[test]
    fn reentrant_call_is_rejected() {
        let method = add_one_two_and_x();
        let program = Program::new();
        let interp = Interpreter::new(&group());
        interp.in_progress.set(true);
        let err = interp.call(&program, &method, &[Literal::Int(4)]).unwrap_err();
        assert!(format!("{}", err).contains("re-entrant"));
    }
}
