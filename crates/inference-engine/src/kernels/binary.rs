//! Elementwise functions of two inputs
//!
//! Both inputs and the output must hold the same number of elements;
//! broadcasting kinds (`BcAdd2` and friends) are catalog entries only.

use std::marker::PhantomData;

use common::error::Result;

use crate::function::{Arity, Bindings, Kernel, Port};
use crate::kernels::NoParams;
use crate::variable::VariableRef;

/// Formula of a two-operand elementwise function
pub trait BinaryOp: Send + Sync + 'static {
    /// Combines one element of each operand
    fn apply(a: f32, b: f32) -> f32;
}

/// Kernel for any [`BinaryOp`]
pub struct Binary<O>(PhantomData<O>);

/// Context of [`Binary`]
#[derive(Debug)]
pub struct BinaryContext {
    lhs: Port,
    rhs: Port,
    output: Port,
}

impl<O: BinaryOp> Kernel for Binary<O> {
    type Config = NoParams;
    type Context = BinaryContext;

    const INPUTS: Arity = Arity::Exactly(2);
    const OUTPUTS: Arity = Arity::Exactly(1);

    fn allocate(_config: &NoParams, bindings: &Bindings<'_>) -> Result<BinaryContext> {
        bindings.ensure_outputs_not_aliased()?;

        let lhs = bindings.input(0)?;
        let rhs = bindings.input(1)?;
        let output = bindings.output(0)?;

        let count = lhs.elem_count();
        bindings.ensure_elem_count("second operand", &rhs, count)?;
        bindings.ensure_elem_count("output", &output, count)?;

        Ok(BinaryContext { lhs, rhs, output })
    }

    fn touched(context: &BinaryContext) -> Vec<VariableRef> {
        vec![
            context.lhs.variable().clone(),
            context.rhs.variable().clone(),
            context.output.variable().clone(),
        ]
    }

    fn execute_float(_config: &NoParams, context: &BinaryContext) {
        let a = context.lhs.read();
        let b = context.rhs.read();
        let mut y = context.output.write();

        for ((out, &a), &b) in y.as_f32_mut().iter_mut().zip(a.as_f32()).zip(b.as_f32()) {
            *out = O::apply(a, b);
        }
    }

    fn execute_generic(_config: &NoParams, context: &BinaryContext) {
        let a = context.lhs.read();
        let b = context.rhs.read();
        let mut y = context.output.write();
        let (ac, bc, yc) = (context.lhs.codec(), context.rhs.codec(), context.output.codec());

        for i in 0..y.elem_count() {
            let value = O::apply(ac.decode(&a, i), bc.decode(&b, i));
            yc.encode(&mut y, i, value);
        }
    }
}

macro_rules! binary_ops {
    ($($name:ident => |$a:ident, $b:ident| $body:expr;)+) => {
        $(
            pub struct $name;

            impl BinaryOp for $name {
                #[inline]
                fn apply($a: f32, $b: f32) -> f32 {
                    $body
                }
            }
        )+
    };
}

binary_ops! {
    Add => |a, b| a + b;
    Sub => |a, b| a - b;
    Mul => |a, b| a * b;
    Div => |a, b| a / b;
    Pow => |a, b| a.powf(b);
    Minimum => |a, b| a.min(b);
    Maximum => |a, b| a.max(b);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::FunctionConfig;
    use crate::kernels::test_util::{float, run, run_both, typed, zeros};
    use crate::representation::DataRepresentation;
    use common::error::Error;
    use runtime_config::DispatchPolicy;

    fn operands() -> Vec<VariableRef> {
        vec![
            float(&[2, 2], &[1.0, -2.0, 3.0, 4.0]),
            float(&[4], &[2.0, 2.0, -1.0, 0.5]),
        ]
    }

    #[test]
    fn test_arithmetic() {
        let cases = [
            (FunctionConfig::Add2(NoParams {}), [3.0, 0.0, 2.0, 4.5]),
            (FunctionConfig::Sub2(NoParams {}), [-1.0, -4.0, 4.0, 3.5]),
            (FunctionConfig::Mul2(NoParams {}), [2.0, -4.0, -3.0, 2.0]),
            (FunctionConfig::Div2(NoParams {}), [0.5, -1.0, -3.0, 8.0]),
            (FunctionConfig::Pow2(NoParams {}), [1.0, 4.0, 1.0 / 3.0, 2.0]),
            (FunctionConfig::Minimum2(NoParams {}), [1.0, -2.0, -1.0, 0.5]),
            (FunctionConfig::Maximum2(NoParams {}), [2.0, 2.0, 3.0, 4.0]),
        ];
        for (config, expected) in cases {
            let (fast, generic) = run_both(config.clone(), operands(), &[2, 2]);
            assert_eq!(fast, generic, "{:?}", config);
            for (got, want) in fast.iter().zip(expected) {
                assert!((got - want).abs() < 1e-6, "{:?}: {} vs {}", config, got, want);
            }
        }
    }

    #[test]
    fn test_mixed_operands() {
        let inputs = vec![
            typed(DataRepresentation::Float16, 0, &[4], &[1.0, -2.0, 3.0, 4.0]),
            typed(DataRepresentation::Int16, 8, &[4], &[2.0, 2.0, -1.0, 0.5]),
        ];
        let values = run(
            FunctionConfig::Add2(NoParams {}),
            inputs,
            zeros(&[4]),
            DispatchPolicy::CachedAtAllocate,
        )
        .unwrap();
        assert_eq!(values, vec![3.0, 0.0, 2.0, 4.5]);
    }

    #[test]
    fn test_count_mismatch() {
        let err = run(
            FunctionConfig::Mul2(NoParams {}),
            vec![float(&[4], &[0.0; 4]), float(&[3], &[0.0; 3])],
            zeros(&[4]),
            DispatchPolicy::PerExecute,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }
}
