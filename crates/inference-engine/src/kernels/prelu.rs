//! Parametric ReLU
//!
//! `y = x` for positive inputs and `slope * x` otherwise. The slope is either
//! a single shared value or one value per channel of the base axis.

use common::error::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::bounds::AxisSplit;
use crate::function::{Arity, Bindings, Kernel, Port};
use crate::kernels::default_base_axis;
use crate::variable::VariableRef;

/// Hyperparameters of `PReLU`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreluConfig {
    /// Channel axis for per-channel slopes
    #[serde(default = "default_base_axis")]
    pub base_axis: usize,
}

impl Default for PreluConfig {
    fn default() -> Self {
        Self {
            base_axis: default_base_axis(),
        }
    }
}

/// PReLU kernel: inputs `x, slope`
pub struct Prelu;

/// Context of [`Prelu`]
#[derive(Debug)]
pub struct PreluContext {
    input: Port,
    slope: Port,
    output: Port,
    split: AxisSplit,
    shared: bool,
}

impl PreluContext {
    fn slope_index(&self, channel: usize) -> usize {
        if self.shared {
            0
        } else {
            channel
        }
    }

    fn run(
        &self,
        read: impl Fn(usize) -> f32,
        slope: impl Fn(usize) -> f32,
        mut write: impl FnMut(usize, f32),
    ) {
        let split = self.split;
        for o in 0..split.outer {
            for a in 0..split.size {
                let w = slope(self.slope_index(a));
                for i in 0..split.inner {
                    let index = split.index(o, a, i);
                    let x = read(index);
                    write(index, if x > 0.0 { x } else { w * x });
                }
            }
        }
    }
}

impl Kernel for Prelu {
    type Config = PreluConfig;
    type Context = PreluContext;

    const INPUTS: Arity = Arity::Exactly(2);
    const OUTPUTS: Arity = Arity::Exactly(1);

    fn allocate(config: &PreluConfig, bindings: &Bindings<'_>) -> Result<PreluContext> {
        bindings.ensure_outputs_not_aliased()?;

        let input = bindings.input(0)?;
        let slope = bindings.input(1)?;
        let output = bindings.output(0)?;
        bindings.ensure_elem_count("output", &output, input.elem_count())?;

        let shape = input.variable().shape();
        let shared = slope.elem_count() == 1;
        // A shared slope ignores the base axis, which may then be the rank itself.
        let split = if shared {
            AxisSplit {
                outer: 1,
                size: 1,
                inner: shape.elem_count(),
            }
        } else {
            AxisSplit::at(&shape, config.base_axis)?
        };
        if !shared && slope.elem_count() != split.size {
            return Err(Error::Shape(format!(
                "{}: {} slopes for {} channels on axis {}",
                bindings.function(),
                slope.elem_count(),
                split.size,
                config.base_axis
            )));
        }

        Ok(PreluContext {
            input,
            slope,
            output,
            split,
            shared,
        })
    }

    fn touched(context: &PreluContext) -> Vec<VariableRef> {
        vec![
            context.input.variable().clone(),
            context.slope.variable().clone(),
            context.output.variable().clone(),
        ]
    }

    fn execute_float(_config: &PreluConfig, context: &PreluContext) {
        let x = context.input.read();
        let w = context.slope.read();
        let mut y = context.output.write();
        let (x, w, y) = (x.as_f32(), w.as_f32(), y.as_f32_mut());
        context.run(|i| x[i], |c| w[c], |i, v| y[i] = v);
    }

    fn execute_generic(_config: &PreluConfig, context: &PreluContext) {
        let x = context.input.read();
        let w = context.slope.read();
        let mut y = context.output.write();
        let (xc, wc, yc) = (
            context.input.codec(),
            context.slope.codec(),
            context.output.codec(),
        );
        context.run(
            |i| xc.decode(&x, i),
            |c| wc.decode(&w, c),
            |i, v| yc.encode(&mut y, i, v),
        );
    }
}
