//! Batch normalization
//!
//! `y = (x - mean[c]) / sqrt(var[c] + eps) * gamma[c] + beta[c]` for channel
//! `c` on the normalized axis. With `batch_stat` unset the stored running
//! statistics are used; with it set, mean and variance are computed from the
//! current input and the stored statistics are left untouched.

use common::error::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::bounds::AxisSplit;
use crate::function::{Arity, Bindings, Kernel, Port};
use crate::representation::DataRepresentation;
use crate::variable::VariableRef;

fn default_axes() -> Vec<usize> {
    vec![1]
}

fn default_decay_rate() -> f32 {
    0.9
}

fn default_eps() -> f32 {
    1e-5
}

/// Hyperparameters of `BatchNormalization`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchNormalizationConfig {
    /// Channel axes; exactly one is supported
    #[serde(default = "default_axes")]
    pub axes: Vec<usize>,
    /// Running-statistics decay, carried for graphs exported from training
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f32,
    #[serde(default = "default_eps")]
    pub eps: f32,
    /// Normalize with statistics of the current input
    #[serde(default)]
    pub batch_stat: bool,
}

impl Default for BatchNormalizationConfig {
    fn default() -> Self {
        Self {
            axes: default_axes(),
            decay_rate: default_decay_rate(),
            eps: default_eps(),
            batch_stat: false,
        }
    }
}

/// Batch normalization kernel: inputs `x, beta, gamma, mean, variance`
pub struct BatchNormalization;

/// Context of [`BatchNormalization`]
#[derive(Debug)]
pub struct BatchNormalizationContext {
    input: Port,
    beta: Port,
    gamma: Port,
    mean: Port,
    variance: Port,
    output: Port,
    split: AxisSplit,
}

/// Per-channel accessors shared by both paths
struct Parameters<B, G, M, V> {
    beta: B,
    gamma: G,
    mean: M,
    variance: V,
}

impl BatchNormalizationContext {
    fn run<B, G, M, V>(
        &self,
        config: &BatchNormalizationConfig,
        read: impl Fn(usize) -> f32,
        params: Parameters<B, G, M, V>,
        mut write: impl FnMut(usize, f32),
    ) where
        B: Fn(usize) -> f32,
        G: Fn(usize) -> f32,
        M: Fn(usize) -> f32,
        V: Fn(usize) -> f32,
    {
        let split = self.split;
        let count = (split.outer * split.inner) as f32;

        for c in 0..split.size {
            let (mean, variance) = if config.batch_stat {
                let mut sum = 0.0f32;
                for o in 0..split.outer {
                    for i in 0..split.inner {
                        sum += read(split.index(o, c, i));
                    }
                }
                let mean = sum / count;
                let mut squares = 0.0f32;
                for o in 0..split.outer {
                    for i in 0..split.inner {
                        let d = read(split.index(o, c, i)) - mean;
                        squares += d * d;
                    }
                }
                (mean, squares / count)
            } else {
                ((params.mean)(c), (params.variance)(c))
            };

            let scale = (params.gamma)(c) / (variance + config.eps).sqrt();
            let shift = (params.beta)(c);
            for o in 0..split.outer {
                for i in 0..split.inner {
                    let index = split.index(o, c, i);
                    write(index, (read(index) - mean) * scale + shift);
                }
            }
        }
    }
}

impl Kernel for BatchNormalization {
    type Config = BatchNormalizationConfig;
    type Context = BatchNormalizationContext;

    const INPUTS: Arity = Arity::Exactly(5);
    const OUTPUTS: Arity = Arity::Exactly(1);
    const OUTPUT_REPRESENTATIONS: &'static [DataRepresentation] = &DataRepresentation::NUMERIC;

    fn allocate(
        config: &BatchNormalizationConfig,
        bindings: &Bindings<'_>,
    ) -> Result<BatchNormalizationContext> {
        let axis = match config.axes.as_slice() {
            [axis] => *axis,
            axes => {
                return Err(Error::Unimplemented(format!(
                    "{} over {} axes",
                    bindings.function(),
                    axes.len()
                )))
            }
        };
        bindings.ensure_outputs_not_aliased()?;

        let input = bindings.input(0)?;
        let output = bindings.output(0)?;
        bindings.ensure_elem_count("output", &output, input.elem_count())?;

        let split = AxisSplit::at(&input.variable().shape(), axis)?;
        let parameter = |index: usize, name: &str| -> Result<Port> {
            let port = bindings.input(index)?;
            bindings.ensure_elem_count(name, &port, split.size)?;
            Ok(port)
        };

        Ok(BatchNormalizationContext {
            beta: parameter(1, "beta")?,
            gamma: parameter(2, "gamma")?,
            mean: parameter(3, "mean")?,
            variance: parameter(4, "variance")?,
            input,
            output,
            split,
        })
    }

    fn touched(context: &BatchNormalizationContext) -> Vec<VariableRef> {
        [
            &context.input,
            &context.beta,
            &context.gamma,
            &context.mean,
            &context.variance,
            &context.output,
        ]
        .iter()
        .map(|port| port.variable().clone())
        .collect()
    }

    fn execute_float(config: &BatchNormalizationConfig, context: &BatchNormalizationContext) {
        let x = context.input.read();
        let beta = context.beta.read();
        let gamma = context.gamma.read();
        let mean = context.mean.read();
        let variance = context.variance.read();
        let mut y = context.output.write();

        let x = x.as_f32();
        let params = Parameters {
            beta: |c: usize| beta.as_f32()[c],
            gamma: |c: usize| gamma.as_f32()[c],
            mean: |c: usize| mean.as_f32()[c],
            variance: |c: usize| variance.as_f32()[c],
        };
        let y = y.as_f32_mut();
        context.run(config, |i| x[i], params, |i, v| y[i] = v);
    }

    fn execute_generic(config: &BatchNormalizationConfig, context: &BatchNormalizationContext) {
        let x = context.input.read();
        let beta = context.beta.read();
        let gamma = context.gamma.read();
        let mean = context.mean.read();
        let variance = context.variance.read();
        let mut y = context.output.write();

        let xc = context.input.codec();
        let yc = context.output.codec();
        let (bc, gc, mc, vc) = (
            context.beta.codec(),
            context.gamma.codec(),
            context.mean.codec(),
            context.variance.codec(),
        );
        let params = Parameters {
            beta: |c: usize| bc.decode(&beta, c),
            gamma: |c: usize| gc.decode(&gamma, c),
            mean: |c: usize| mc.decode(&mean, c),
            variance: |c: usize| vc.decode(&variance, c),
        };
        context.run(
            config,
            |i| xc.decode(&x, i),
            params,
            |i, v| yc.encode(&mut y, i, v),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::FunctionConfig;
    use crate::kernels::test_util::{assert_close, float, run, run_both, typed, zeros};
    use runtime_config::DispatchPolicy;

    fn parameters(
        beta: [f32; 2],
        gamma: [f32; 2],
        mean: [f32; 2],
        var: [f32; 2],
    ) -> Vec<VariableRef> {
        vec![
            float(&[1, 2, 1], &beta),
            float(&[1, 2, 1], &gamma),
            float(&[1, 2, 1], &mean),
            float(&[1, 2, 1], &var),
        ]
    }

    #[test]
    fn test_running_statistics() {
        let mut inputs = vec![float(&[1, 2, 2], &[1.0, 3.0, 10.0, 20.0])];
        inputs.extend(parameters([0.0, 1.0], [1.0, 2.0], [2.0, 10.0], [1.0, 4.0]));
        let config = FunctionConfig::BatchNormalization(BatchNormalizationConfig {
            eps: 0.0,
            ..BatchNormalizationConfig::default()
        });
        let (fast, generic) = run_both(config, inputs, &[1, 2, 2]);
        assert_eq!(fast, vec![-1.0, 1.0, 1.0, 11.0]);
        assert_eq!(generic, fast);
    }

    #[test]
    fn test_batch_statistics() {
        let mut inputs = vec![float(&[2, 2, 1], &[1.0, 10.0, 3.0, 30.0])];
        inputs.extend(parameters([0.0, 0.0], [1.0, 1.0], [0.0, 0.0], [1.0, 1.0]));
        let config = FunctionConfig::BatchNormalization(BatchNormalizationConfig {
            batch_stat: true,
            eps: 0.0,
            ..BatchNormalizationConfig::default()
        });
        let (fast, _) = run_both(config, inputs, &[2, 2, 1]);
        assert_close(&fast, &[-1.0, -1.0, 1.0, 1.0], 1e-6);
    }

    #[test]
    fn test_fixed_point_parameters() {
        let mut inputs = vec![float(&[1, 2, 1], &[4.0, 8.0])];
        inputs.push(typed(DataRepresentation::Int8, 4, &[2], &[0.5, -0.5]));
        inputs.push(typed(DataRepresentation::Int8, 4, &[2], &[1.0, 0.5]));
        inputs.push(typed(DataRepresentation::Int16, 8, &[2], &[4.0, 4.0]));
        inputs.push(typed(DataRepresentation::Int16, 8, &[2], &[1.0, 4.0]));
        let config = FunctionConfig::BatchNormalization(BatchNormalizationConfig {
            eps: 0.0,
            ..BatchNormalizationConfig::default()
        });
        let values = run(config, inputs, zeros(&[1, 2, 1]), DispatchPolicy::PerExecute).unwrap();
        assert_eq!(values, vec![0.5, 0.5]);
    }

    #[test]
    fn test_multiple_axes_unimplemented() {
        let mut inputs = vec![float(&[1, 2, 1], &[0.0; 2])];
        inputs.extend(parameters([0.0; 2], [1.0; 2], [0.0; 2], [1.0; 2]));
        let config = FunctionConfig::BatchNormalization(BatchNormalizationConfig {
            axes: vec![1, 2],
            ..BatchNormalizationConfig::default()
        });
        let err = run(config, inputs, zeros(&[1, 2, 1]), DispatchPolicy::PerExecute).unwrap_err();
        assert!(err.is_unimplemented());
    }

    #[test]
    fn test_sign_output_rejected() {
        let mut inputs = vec![float(&[1, 2, 1], &[0.0; 2])];
        inputs.extend(parameters([0.0; 2], [1.0; 2], [0.0; 2], [1.0; 2]));
        let err = run(
            FunctionConfig::BatchNormalization(BatchNormalizationConfig::default()),
            inputs,
            typed(DataRepresentation::Sign, 0, &[1, 2, 1], &[1.0; 2]),
            DispatchPolicy::PerExecute,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "BatchNormalization: unsupported representation sign"
        );
    }
}
