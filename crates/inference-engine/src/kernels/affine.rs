//! Affine transforms
//!
//! `Y[k] = X[k] · W + B` for every row `k`, with `X` split at the base axis
//! into `outer × input_inner` and `W` laid out as `input_inner × output_inner`.
//! The output is zeroed, the weighted sums are accumulated with `+=`, and the
//! bias is added in a separate pass over each row. Both execution paths walk
//! rows, then input features, then output features in that order.
//!
//! The binarized variants share the same core and differ only in which input
//! supplies the weights and whether a per-output scale is applied before the
//! bias.

use common::error::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::bounds::LoopBounds;
use crate::function::{Arity, Bindings, Kernel, Port};
use crate::representation::DataRepresentation;
use crate::kernels::default_base_axis;
use crate::variable::VariableRef;

/// Hyperparameters of `Affine`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffineConfig {
    /// First axis of the feature vector
    #[serde(default = "default_base_axis")]
    pub base_axis: usize,
}

impl Default for AffineConfig {
    fn default() -> Self {
        Self {
            base_axis: default_base_axis(),
        }
    }
}

/// Hyperparameters of `BinaryConnectAffine`
pub type BinaryConnectAffineConfig = AffineConfig;

/// Hyperparameters of `BinaryWeightAffine`
pub type BinaryWeightAffineConfig = AffineConfig;

/// Positions of the optional and variant-specific inputs
#[derive(Debug, Clone, Copy)]
struct InputLayout {
    weight: usize,
    alpha: Option<usize>,
    bias: usize,
}

/// Context shared by all affine kinds
#[derive(Debug)]
pub struct AffineContext {
    input: Port,
    weight: Port,
    alpha: Option<Port>,
    bias: Option<Port>,
    output: Port,
    bounds: LoopBounds,
}

impl AffineContext {
    fn allocate(
        config: &AffineConfig,
        bindings: &Bindings<'_>,
        layout: InputLayout,
    ) -> Result<Self> {
        bindings.ensure_outputs_not_aliased()?;

        let input = bindings.input(0)?;
        let weight = bindings.input(layout.weight)?;
        let alpha = match layout.alpha {
            Some(index) => Some(bindings.input(index)?),
            None => None,
        };
        let bias = bindings.optional_input(layout.bias);
        let output = bindings.output(0)?;

        let bounds = LoopBounds::around_axis(
            &input.variable().shape(),
            &output.variable().shape(),
            config.base_axis,
        )?;

        bindings.ensure_elem_count("weight", &weight, bounds.input_inner * bounds.output_inner)?;
        if let Some(alpha) = &alpha {
            bindings.ensure_elem_count("alpha", alpha, bounds.output_inner)?;
        }
        if let Some(bias) = &bias {
            bindings.ensure_elem_count("bias", bias, bounds.output_inner)?;
        }
        if output.elem_count() != bounds.outer * bounds.output_inner {
            return Err(Error::Shape(format!(
                "{}: output {} does not hold {} rows of {}",
                bindings.function(),
                output.variable().shape(),
                bounds.outer,
                bounds.output_inner
            )));
        }

        Ok(Self {
            input,
            weight,
            alpha,
            bias,
            output,
            bounds,
        })
    }

    fn touched(&self) -> Vec<VariableRef> {
        let mut touched = vec![self.input.variable().clone(), self.weight.variable().clone()];
        touched.extend(self.alpha.iter().map(|port| port.variable().clone()));
        touched.extend(self.bias.iter().map(|port| port.variable().clone()));
        touched.push(self.output.variable().clone());
        touched
    }

    fn execute_float(&self) {
        let x = self.input.read();
        let w = self.weight.read();
        let alpha = self.alpha.as_ref().map(Port::read);
        let bias = self.bias.as_ref().map(Port::read);
        let mut y = self.output.write();

        let x = x.as_f32();
        let w = w.as_f32();
        let y = y.as_f32_mut();
        let LoopBounds {
            outer,
            input_inner,
            output_inner,
        } = self.bounds;

        y.fill(0.0);
        for k in 0..outer {
            let xo = self.bounds.input_offset(k);
            let yo = self.bounds.output_offset(k);
            let row = &mut y[yo..yo + output_inner];

            for j in 0..input_inner {
                let u = x[xo + j];
                let weights = &w[j * output_inner..(j + 1) * output_inner];
                for (out, &weight) in row.iter_mut().zip(weights) {
                    *out += u * weight;
                }
            }
            if let Some(alpha) = &alpha {
                for (out, &scale) in row.iter_mut().zip(alpha.as_f32()) {
                    *out *= scale;
                }
            }
            if let Some(bias) = &bias {
                for (out, &b) in row.iter_mut().zip(bias.as_f32()) {
                    *out += b;
                }
            }
        }
    }

    fn execute_generic(&self) {
        let x = self.input.read();
        let w = self.weight.read();
        let alpha = self.alpha.as_ref().map(|port| (port.codec(), port.read()));
        let bias = self.bias.as_ref().map(|port| (port.codec(), port.read()));
        let mut y = self.output.write();

        let (xc, wc, yc) = (self.input.codec(), self.weight.codec(), self.output.codec());
        let LoopBounds {
            outer,
            input_inner,
            output_inner,
        } = self.bounds;

        for i in 0..outer * output_inner {
            yc.encode(&mut y, i, 0.0);
        }
        for k in 0..outer {
            let xo = self.bounds.input_offset(k);
            let yo = self.bounds.output_offset(k);

            for j in 0..input_inner {
                let u = xc.decode(&x, xo + j);
                for i in 0..output_inner {
                    let acc = yc.decode(&y, yo + i) + u * wc.decode(&w, j * output_inner + i);
                    yc.encode(&mut y, yo + i, acc);
                }
            }
            if let Some((ac, alpha)) = &alpha {
                for i in 0..output_inner {
                    let scaled = yc.decode(&y, yo + i) * ac.decode(alpha, i);
                    yc.encode(&mut y, yo + i, scaled);
                }
            }
            if let Some((bc, bias)) = &bias {
                for i in 0..output_inner {
                    let biased = yc.decode(&y, yo + i) + bc.decode(bias, i);
                    yc.encode(&mut y, yo + i, biased);
                }
            }
        }
    }
}

/// `Affine`: inputs `x, weight[, bias]`
pub struct Affine;

impl Kernel for Affine {
    type Config = AffineConfig;
    type Context = AffineContext;

    const INPUTS: Arity = Arity::Between(2, 3);
    const OUTPUTS: Arity = Arity::Exactly(1);
    const OUTPUT_REPRESENTATIONS: &'static [DataRepresentation] = &DataRepresentation::NUMERIC;

    fn allocate(config: &AffineConfig, bindings: &Bindings<'_>) -> Result<AffineContext> {
        let layout = InputLayout {
            weight: 1,
            alpha: None,
            bias: 2,
        };
        AffineContext::allocate(config, bindings, layout)
    }

    fn touched(context: &AffineContext) -> Vec<VariableRef> {
        context.touched()
    }

    fn execute_float(_config: &AffineConfig, context: &AffineContext) {
        context.execute_float()
    }

    fn execute_generic(_config: &AffineConfig, context: &AffineContext) {
        context.execute_generic()
    }
}

/// `BinaryConnectAffine`: inputs `x, weight, binary_weight[, bias]`
///
/// Inference uses `binary_weight`; the real-valued `weight` is only kept so
/// graphs exported for training bind unchanged.
pub struct BinaryConnectAffine;

impl Kernel for BinaryConnectAffine {
    type Config = BinaryConnectAffineConfig;
    type Context = AffineContext;

    const INPUTS: Arity = Arity::Between(3, 4);
    const OUTPUTS: Arity = Arity::Exactly(1);
    const OUTPUT_REPRESENTATIONS: &'static [DataRepresentation] = &DataRepresentation::NUMERIC;

    fn allocate(config: &AffineConfig, bindings: &Bindings<'_>) -> Result<AffineContext> {
        let layout = InputLayout {
            weight: 2,
            alpha: None,
            bias: 3,
        };
        AffineContext::allocate(config, bindings, layout)
    }

    fn touched(context: &AffineContext) -> Vec<VariableRef> {
        context.touched()
    }

    fn execute_float(_config: &AffineConfig, context: &AffineContext) {
        context.execute_float()
    }

    fn execute_generic(_config: &AffineConfig, context: &AffineContext) {
        context.execute_generic()
    }
}

/// `BinaryWeightAffine`: inputs `x, weight, binary_weight, alpha[, bias]`
///
/// Each output feature of `x · binary_weight` is scaled by `alpha` before the
/// bias is added.
pub struct BinaryWeightAffine;

impl Kernel for BinaryWeightAffine {
    type Config = BinaryWeightAffineConfig;
    type Context = AffineContext;

    const INPUTS: Arity = Arity::Between(4, 5);
    const OUTPUTS: Arity = Arity::Exactly(1);
    const OUTPUT_REPRESENTATIONS: &'static [DataRepresentation] = &DataRepresentation::NUMERIC;

    fn allocate(config: &AffineConfig, bindings: &Bindings<'_>) -> Result<AffineContext> {
        let layout = InputLayout {
            weight: 2,
            alpha: Some(3),
            bias: 4,
        };
        AffineContext::allocate(config, bindings, layout)
    }

    fn touched(context: &AffineContext) -> Vec<VariableRef> {
        context.touched()
    }

    fn execute_float(_config: &AffineConfig, context: &AffineContext) {
        context.execute_float()
    }

    fn execute_generic(_config: &AffineConfig, context: &AffineContext) {
        context.execute_generic()
    }
}
