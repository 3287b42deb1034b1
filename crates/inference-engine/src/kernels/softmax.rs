//! Softmax along one axis

use common::error::Result;
use serde::{Deserialize, Serialize};

use crate::bounds::AxisSplit;
use crate::function::{Arity, Bindings, Kernel, Port};
use crate::representation::DataRepresentation;
use crate::variable::VariableRef;

/// Hyperparameters of `Softmax`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftmaxConfig {
    /// Normalized axis; the last axis when unset
    #[serde(default)]
    pub axis: Option<usize>,
}

/// Softmax kernel
pub struct Softmax;

/// Context of [`Softmax`]
#[derive(Debug)]
pub struct SoftmaxContext {
    input: Port,
    output: Port,
    split: AxisSplit,
}

/// Runs the three passes (max, sum, normalize) over every `(outer, inner)` lane
///
/// `exp` is evaluated twice per element so the output is written exactly once.
fn softmax_lanes(
    split: AxisSplit,
    read: impl Fn(usize) -> f32,
    mut write: impl FnMut(usize, f32),
) {
    for o in 0..split.outer {
        for i in 0..split.inner {
            let mut max = f32::NEG_INFINITY;
            for a in 0..split.size {
                max = max.max(read(split.index(o, a, i)));
            }
            let mut sum = 0.0f32;
            for a in 0..split.size {
                sum += (read(split.index(o, a, i)) - max).exp();
            }
            for a in 0..split.size {
                let index = split.index(o, a, i);
                write(index, (read(index) - max).exp() / sum);
            }
        }
    }
}

impl Kernel for Softmax {
    type Config = SoftmaxConfig;
    type Context = SoftmaxContext;

    const INPUTS: Arity = Arity::Exactly(1);
    const OUTPUTS: Arity = Arity::Exactly(1);
    const OUTPUT_REPRESENTATIONS: &'static [DataRepresentation] = &DataRepresentation::NUMERIC;

    fn allocate(config: &SoftmaxConfig, bindings: &Bindings<'_>) -> Result<SoftmaxContext> {
        bindings.ensure_outputs_not_aliased()?;

        let input = bindings.input(0)?;
        let output = bindings.output(0)?;
        bindings.ensure_elem_count("output", &output, input.elem_count())?;

        let shape = input.variable().shape();
        let split = match (shape.rank(), config.axis) {
            // A scalar is one lane of one element.
            (0, None | Some(0)) => AxisSplit {
                outer: 1,
                size: 1,
                inner: 1,
            },
            (rank, axis) => AxisSplit::at(&shape, axis.unwrap_or(rank - 1))?,
        };

        Ok(SoftmaxContext {
            input,
            output,
            split,
        })
    }

    fn touched(context: &SoftmaxContext) -> Vec<VariableRef> {
        vec![
            context.input.variable().clone(),
            context.output.variable().clone(),
        ]
    }

    fn execute_float(_config: &SoftmaxConfig, context: &SoftmaxContext) {
        let x = context.input.read();
        let mut y = context.output.write();
        let x = x.as_f32();
        let y = y.as_f32_mut();
        softmax_lanes(context.split, |i| x[i], |i, v| y[i] = v);
    }

    fn execute_generic(_config: &SoftmaxConfig, context: &SoftmaxContext) {
        let x = context.input.read();
        let mut y = context.output.write();
        let (xc, yc) = (context.input.codec(), context.output.codec());
        softmax_lanes(
            context.split,
            |i| xc.decode(&x, i),
            |i, v| yc.encode(&mut y, i, v),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::FunctionConfig;
    use crate::kernels::test_util::{assert_close, float, run, run_both, typed, zeros};
    use common::error::Error;
    use runtime_config::DispatchPolicy;

    #[test]
    fn test_last_axis() {
        let x = float(&[2, 3], &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        let config = FunctionConfig::Softmax(SoftmaxConfig::default());
        let (fast, generic) = run_both(config, vec![x], &[2, 3]);
        assert_eq!(fast, generic);
        assert_close(&fast[..3], &[0.090_031, 0.244_728, 0.665_241], 2e-6);
        assert_close(&fast[3..], &[1.0 / 3.0; 3], 1e-6);
    }

    #[test]
    fn test_leading_axis() {
        let x = float(&[2, 2], &[0.0, 5.0, 0.0, 5.0]);
        let config = FunctionConfig::Softmax(SoftmaxConfig { axis: Some(0) });
        let (fast, _) = run_both(config, vec![x], &[2, 2]);
        assert_close(&fast, &[0.5, 0.5, 0.5, 0.5], 1e-6);
    }

    #[test]
    fn test_large_inputs_are_stable() {
        let x = float(&[3], &[1000.0, 1000.0, 1000.0]);
        let config = FunctionConfig::Softmax(SoftmaxConfig::default());
        let (fast, _) = run_both(config, vec![x], &[3]);
        assert_close(&fast, &[1.0 / 3.0; 3], 1e-6);
    }

    #[test]
    fn test_fixed_point_input() {
        let x = typed(DataRepresentation::Int8, 5, &[3], &[1.0, 2.0, 3.0]);
        let values = run(
            FunctionConfig::Softmax(SoftmaxConfig::default()),
            vec![x],
            zeros(&[3]),
            DispatchPolicy::PerExecute,
        )
        .unwrap();
        assert_close(&values, &[0.090_031, 0.244_728, 0.665_241], 2e-6);
    }

    #[test]
    fn test_scalar_input() {
        let config = FunctionConfig::Softmax(SoftmaxConfig::default());
        let (fast, generic) = run_both(config, vec![float(&[], &[-3.5])], &[]);
        assert_eq!(fast, vec![1.0]);
        assert_eq!(generic, vec![1.0]);
    }

    #[test]
    fn test_sign_output_rejected() {
        let err = run(
            FunctionConfig::Softmax(SoftmaxConfig::default()),
            vec![float(&[2], &[0.0, 1.0])],
            typed(DataRepresentation::Sign, 0, &[2], &[1.0, 1.0]),
            DispatchPolicy::PerExecute,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedRepresentation { .. }));
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_axis_out_of_range() {
        let err = run(
            FunctionConfig::Softmax(SoftmaxConfig { axis: Some(2) }),
            vec![float(&[2, 2], &[0.0; 4])],
            zeros(&[2, 2]),
            DispatchPolicy::PerExecute,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }
}
