//! Elementwise functions of one input
//!
//! Activations, elementary math and the scalar-operand arithmetic kinds all
//! map each element independently, so they share one kernel, [`Unary`],
//! parameterized by a [`UnaryOp`] that supplies the formula.

use std::fmt;
use std::marker::PhantomData;

use common::error::Result;
use serde::{Deserialize, Serialize};

use crate::function::{Arity, Bindings, Kernel, Port};
use crate::kernels::NoParams;
use crate::variable::VariableRef;

/// Formula of an elementwise function
pub trait UnaryOp: Send + Sync + 'static {
    /// Hyperparameters the formula reads
    type Config: Clone + fmt::Debug + PartialEq + Send + Sync;

    /// Maps one element
    fn apply(config: &Self::Config, x: f32) -> f32;

    /// Whether the output may be bound to the input variable
    fn inplace(_config: &Self::Config) -> bool {
        false
    }
}

/// Kernel for any [`UnaryOp`]: exactly one input and one output of equal size
pub struct Unary<O>(PhantomData<O>);

/// Context of [`Unary`]
#[derive(Debug)]
pub struct UnaryContext {
    input: Port,
    output: Port,
    inplace: bool,
}

impl<O: UnaryOp> Kernel for Unary<O> {
    type Config = O::Config;
    type Context = UnaryContext;

    const INPUTS: Arity = Arity::Exactly(1);
    const OUTPUTS: Arity = Arity::Exactly(1);

    fn allocate(config: &O::Config, bindings: &Bindings<'_>) -> Result<UnaryContext> {
        let input = bindings.input(0)?;
        let output = bindings.output(0)?;

        let inplace = input.variable().ptr_eq(output.variable());
        if !(inplace && O::inplace(config)) {
            bindings.ensure_outputs_not_aliased()?;
        }
        bindings.ensure_elem_count("output", &output, input.elem_count())?;

        Ok(UnaryContext {
            input,
            output,
            inplace,
        })
    }

    fn touched(context: &UnaryContext) -> Vec<VariableRef> {
        vec![
            context.input.variable().clone(),
            context.output.variable().clone(),
        ]
    }

    fn execute_float(config: &O::Config, context: &UnaryContext) {
        if context.inplace {
            let mut y = context.output.write();
            for value in y.as_f32_mut() {
                *value = O::apply(config, *value);
            }
            return;
        }

        let x = context.input.read();
        let mut y = context.output.write();
        for (out, &value) in y.as_f32_mut().iter_mut().zip(x.as_f32()) {
            *out = O::apply(config, value);
        }
    }

    fn execute_generic(config: &O::Config, context: &UnaryContext) {
        let (xc, yc) = (context.input.codec(), context.output.codec());

        if context.inplace {
            let mut y = context.output.write();
            for i in 0..y.elem_count() {
                let value = yc.decode(&y, i);
                yc.encode(&mut y, i, O::apply(config, value));
            }
            return;
        }

        let x = context.input.read();
        let mut y = context.output.write();
        for i in 0..x.elem_count() {
            yc.encode(&mut y, i, O::apply(config, xc.decode(&x, i)));
        }
    }
}

fn default_leaky_alpha() -> f32 {
    0.1
}

fn default_one() -> f32 {
    1.0
}

fn default_selu_scale() -> f32 {
    1.050_701
}

fn default_selu_alpha() -> f32 {
    1.673_263_2
}

/// Hyperparameters of `ReLU`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReluConfig {
    /// Allow the output to share the input variable
    #[serde(default)]
    pub inplace: bool,
}

/// Hyperparameters of `LeakyReLU`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakyReluConfig {
    /// Slope for negative inputs
    #[serde(default = "default_leaky_alpha")]
    pub alpha: f32,
}

impl Default for LeakyReluConfig {
    fn default() -> Self {
        Self {
            alpha: default_leaky_alpha(),
        }
    }
}

/// Hyperparameters of `ELU`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EluConfig {
    /// Saturation value for negative inputs
    #[serde(default = "default_one")]
    pub alpha: f32,
}

impl Default for EluConfig {
    fn default() -> Self {
        Self {
            alpha: default_one(),
        }
    }
}

/// Hyperparameters of `SELU`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeluConfig {
    #[serde(default = "default_selu_scale")]
    pub scale: f32,
    #[serde(default = "default_selu_alpha")]
    pub alpha: f32,
}

impl Default for SeluConfig {
    fn default() -> Self {
        Self {
            scale: default_selu_scale(),
            alpha: default_selu_alpha(),
        }
    }
}

/// Hyperparameters of `Sign`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignConfig {
    /// Output for an input of exactly zero
    #[serde(default)]
    pub alpha: f32,
}

/// Scalar operand of the `*Scalar` kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarConfig {
    #[serde(default = "default_one")]
    pub val: f32,
}

impl Default for ScalarConfig {
    fn default() -> Self {
        Self { val: default_one() }
    }
}

/// `max(x, 0)`
pub struct Relu;

impl UnaryOp for Relu {
    type Config = ReluConfig;

    fn apply(_config: &ReluConfig, x: f32) -> f32 {
        x.max(0.0)
    }

    fn inplace(config: &ReluConfig) -> bool {
        config.inplace
    }
}

macro_rules! unary_ops {
    ($($(#[$doc:meta])* $name:ident($config:ty) => |$c:pat, $x:ident| $body:expr;)+) => {
        $(
            $(#[$doc])*
            pub struct $name;

            impl UnaryOp for $name {
                type Config = $config;

                #[inline]
                fn apply($c: &$config, $x: f32) -> f32 {
                    $body
                }
            }
        )+
    };
}

unary_ops! {
    /// `x` for positive inputs, `alpha * x` otherwise
    LeakyRelu(LeakyReluConfig) => |c, x| if x > 0.0 { x } else { c.alpha * x };
    /// `x` for non-negative inputs, `alpha * (e^x - 1)` otherwise
    Elu(EluConfig) => |c, x| if x >= 0.0 { x } else { c.alpha * (x.exp() - 1.0) };
    /// Scaled ELU
    Selu(SeluConfig) => |c, x| {
        if x > 0.0 {
            c.scale * x
        } else {
            c.scale * c.alpha * (x.exp() - 1.0)
        }
    };
    /// `x * sigmoid(x)`
    Swish(NoParams) => |_, x| x / (1.0 + (-x).exp());
    Sigmoid(NoParams) => |_, x| 1.0 / (1.0 + (-x).exp());
    Tanh(NoParams) => |_, x| x.tanh();
    /// 1 for positive inputs, 0 otherwise
    BinarySigmoid(NoParams) => |_, x| if x > 0.0 { 1.0 } else { 0.0 };
    /// 1 for positive inputs, -1 otherwise
    BinaryTanh(NoParams) => |_, x| if x > 0.0 { 1.0 } else { -1.0 };
    /// 1, -1, or `alpha` at zero
    Sign(SignConfig) => |c, x| {
        if x > 0.0 {
            1.0
        } else if x < 0.0 {
            -1.0
        } else {
            c.alpha
        }
    };
    Abs(NoParams) => |_, x| x.abs();
    Exp(NoParams) => |_, x| x.exp();
    /// Natural logarithm
    Log(NoParams) => |_, x| x.ln();
    Identity(NoParams) => |_, x| x;
    AddScalar(ScalarConfig) => |c, x| x + c.val;
    MulScalar(ScalarConfig) => |c, x| x * c.val;
    PowScalar(ScalarConfig) => |c, x| x.powf(c.val);
    /// `val - x`
    RSubScalar(ScalarConfig) => |c, x| c.val - x;
    /// `val / x`
    RDivScalar(ScalarConfig) => |c, x| c.val / x;
    /// `val ^ x`
    RPowScalar(ScalarConfig) => |c, x| c.val.powf(x);
    MinimumScalar(ScalarConfig) => |c, x| x.min(c.val);
    MaximumScalar(ScalarConfig) => |c, x| x.max(c.val);
}
