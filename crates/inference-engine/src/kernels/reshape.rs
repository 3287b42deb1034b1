//! Reshape: copies elements into an output of a different shape

use common::error::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::function::{Arity, Bindings, Kernel, Port};
use crate::variable::VariableRef;

/// Hyperparameters of `Reshape`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReshapeConfig {
    /// Target shape; must match the bound output
    pub shape: Vec<usize>,
}

/// Reshape kernel
pub struct Reshape;

/// Context of [`Reshape`]
#[derive(Debug)]
pub struct ReshapeContext {
    input: Port,
    output: Port,
}

impl Kernel for Reshape {
    type Config = ReshapeConfig;
    type Context = ReshapeContext;

    const INPUTS: Arity = Arity::Exactly(1);
    const OUTPUTS: Arity = Arity::Exactly(1);

    fn allocate(config: &ReshapeConfig, bindings: &Bindings<'_>) -> Result<ReshapeContext> {
        bindings.ensure_outputs_not_aliased()?;

        let input = bindings.input(0)?;
        let output = bindings.output(0)?;

        let target = output.variable().shape();
        if target.dims() != config.shape.as_slice() {
            return Err(Error::Shape(format!(
                "{}: output is {}, configured shape is {:?}",
                bindings.function(),
                target,
                config.shape
            )));
        }
        bindings.ensure_elem_count("output", &output, input.elem_count())?;

        Ok(ReshapeContext { input, output })
    }

    fn touched(context: &ReshapeContext) -> Vec<VariableRef> {
        vec![
            context.input.variable().clone(),
            context.output.variable().clone(),
        ]
    }

    fn execute_float(_config: &ReshapeConfig, context: &ReshapeContext) {
        let x = context.input.read();
        let mut y = context.output.write();
        y.as_f32_mut().copy_from_slice(x.as_f32());
    }

    fn execute_generic(_config: &ReshapeConfig, context: &ReshapeContext) {
        let x = context.input.read();
        let mut y = context.output.write();
        let (xc, yc) = (context.input.codec(), context.output.codec());
        for i in 0..x.elem_count() {
            yc.encode(&mut y, i, xc.decode(&x, i));
        }
    }
}
