//! Functions: graph nodes with an allocate / execute / release lifecycle
//!
//! A [`Function`] owns its hyperparameters ([`FunctionConfig`]) for its whole
//! life. Allocation validates the bound inputs and outputs against the
//! kind's arity and derives an execution context (codecs, loop bounds); the
//! context is what release drops. Hyperparameters stay readable in every
//! state.
//!
//! ```text
//! Unallocated --allocate--> Ready --release--> Released
//!                             |
//!                          execute (any number of times)
//! ```

pub mod catalog;
pub mod dispatch;
pub mod kernel;

use std::fmt;

use common::error::{Error, Result};
use runtime_config::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::kernels::affine::{
    Affine, AffineConfig, BinaryConnectAffine, BinaryConnectAffineConfig, BinaryWeightAffine,
    BinaryWeightAffineConfig,
};
use crate::kernels::binary::{self, Binary};
use crate::kernels::normalization::{BatchNormalization, BatchNormalizationConfig};
use crate::kernels::prelu::{Prelu, PreluConfig};
use crate::kernels::reshape::{Reshape, ReshapeConfig};
use crate::kernels::softmax::{Softmax, SoftmaxConfig};
use crate::kernels::unary::{
    self, EluConfig, LeakyReluConfig, ReluConfig, ScalarConfig, SeluConfig, SignConfig, Unary,
};
use crate::kernels::NoParams;
use crate::variable::VariableRef;

pub use catalog::{FunctionCategory, FunctionType};
pub use dispatch::ExecutionPath;
pub use kernel::{Arity, Bindings, Kernel, Port};

use dispatch::Dispatcher;

macro_rules! function_table {
    ($($variant:ident($config:ty) => $kernel:ty),+ $(,)?) => {
        /// Hyperparameters of one function, tagged by kind
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", content = "params")]
        pub enum FunctionConfig {
            $(
                $variant($config),
            )+
            /// A catalog kind without a kernel; allocation fails
            Unimplemented(FunctionType),
        }

        enum FunctionContext {
            $($variant(<$kernel as Kernel>::Context),)+
        }

        impl FunctionConfig {
            /// Kind named by this configuration
            pub fn function_type(&self) -> FunctionType {
                match self {
                    $(FunctionConfig::$variant(_) => FunctionType::$variant,)+
                    FunctionConfig::Unimplemented(function) => *function,
                }
            }

            /// Accepted input and output counts, `None` for unimplemented kinds
            pub fn arity(&self) -> Option<(Arity, Arity)> {
                match self {
                    $(FunctionConfig::$variant(_) => {
                        Some((<$kernel as Kernel>::INPUTS, <$kernel as Kernel>::OUTPUTS))
                    })+
                    FunctionConfig::Unimplemented(_) => None,
                }
            }

            fn allocate_context(
                &self,
                bindings: &Bindings<'_>,
            ) -> Result<(FunctionContext, Vec<VariableRef>)> {
                match self {
                    $(FunctionConfig::$variant(config) => {
                        bindings.ensure_representations(
                            <$kernel as Kernel>::INPUT_REPRESENTATIONS,
                            <$kernel as Kernel>::OUTPUT_REPRESENTATIONS,
                        )?;
                        let context = <$kernel as Kernel>::allocate(config, bindings)?;
                        let touched = <$kernel as Kernel>::touched(&context);
                        Ok((FunctionContext::$variant(context), touched))
                    })+
                    FunctionConfig::Unimplemented(function) => {
                        Err(Error::Unimplemented(function.to_string()))
                    }
                }
            }

            fn execute_context(
                &self,
                context: &FunctionContext,
                path: ExecutionPath,
            ) -> Result<()> {
                match (self, context) {
                    $((FunctionConfig::$variant(config), FunctionContext::$variant(context)) => {
                        match path {
                            ExecutionPath::Float => {
                                <$kernel as Kernel>::execute_float(config, context)
                            }
                            ExecutionPath::Generic => {
                                <$kernel as Kernel>::execute_generic(config, context)
                            }
                        }
                        Ok(())
                    })+
                    _ => Err(Error::Internal(format!(
                        "{}: context does not belong to this configuration",
                        self.function_type()
                    ))),
                }
            }
        }

        impl FunctionType {
            /// Whether this kind has a kernel
            pub fn has_kernel(&self) -> bool {
                matches!(self, $(FunctionType::$variant)|+)
            }
        }
    };
}

function_table! {
    Affine(AffineConfig) => Affine,
    BinaryConnectAffine(BinaryConnectAffineConfig) => BinaryConnectAffine,
    BinaryWeightAffine(BinaryWeightAffineConfig) => BinaryWeightAffine,

    Relu(ReluConfig) => Unary<unary::Relu>,
    LeakyRelu(LeakyReluConfig) => Unary<unary::LeakyRelu>,
    Elu(EluConfig) => Unary<unary::Elu>,
    Selu(SeluConfig) => Unary<unary::Selu>,
    Swish(NoParams) => Unary<unary::Swish>,
    Sigmoid(NoParams) => Unary<unary::Sigmoid>,
    Tanh(NoParams) => Unary<unary::Tanh>,
    BinarySigmoid(NoParams) => Unary<unary::BinarySigmoid>,
    BinaryTanh(NoParams) => Unary<unary::BinaryTanh>,
    Sign(SignConfig) => Unary<unary::Sign>,
    Abs(NoParams) => Unary<unary::Abs>,
    Exp(NoParams) => Unary<unary::Exp>,
    Log(NoParams) => Unary<unary::Log>,
    Identity(NoParams) => Unary<unary::Identity>,

    AddScalar(ScalarConfig) => Unary<unary::AddScalar>,
    MulScalar(ScalarConfig) => Unary<unary::MulScalar>,
    PowScalar(ScalarConfig) => Unary<unary::PowScalar>,
    RSubScalar(ScalarConfig) => Unary<unary::RSubScalar>,
    RDivScalar(ScalarConfig) => Unary<unary::RDivScalar>,
    RPowScalar(ScalarConfig) => Unary<unary::RPowScalar>,
    MinimumScalar(ScalarConfig) => Unary<unary::MinimumScalar>,
    MaximumScalar(ScalarConfig) => Unary<unary::MaximumScalar>,

    Add2(NoParams) => Binary<binary::Add>,
    Sub2(NoParams) => Binary<binary::Sub>,
    Mul2(NoParams) => Binary<binary::Mul>,
    Div2(NoParams) => Binary<binary::Div>,
    Pow2(NoParams) => Binary<binary::Pow>,
    Minimum2(NoParams) => Binary<binary::Minimum>,
    Maximum2(NoParams) => Binary<binary::Maximum>,

    Prelu(PreluConfig) => Prelu,
    Softmax(SoftmaxConfig) => Softmax,
    BatchNormalization(BatchNormalizationConfig) => BatchNormalization,
    Reshape(ReshapeConfig) => Reshape,
}

/// Externally visible lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionState {
    /// Hyperparameters only
    Unallocated,
    /// Context derived; execute is allowed
    Ready,
    /// Context dropped; only hyperparameters remain
    Released,
}

impl fmt::Display for FunctionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionState::Unallocated => write!(f, "unallocated"),
            FunctionState::Ready => write!(f, "ready"),
            FunctionState::Released => write!(f, "released"),
        }
    }
}

struct Allocation {
    context: FunctionContext,
    dispatcher: Dispatcher,
}

enum Slot {
    Unallocated,
    Ready(Allocation),
    Released,
}

/// A function node bound to its inputs and outputs
pub struct Function {
    config: FunctionConfig,
    inputs: Vec<VariableRef>,
    outputs: Vec<VariableRef>,
    slot: Slot,
}

impl Function {
    /// Creates an unallocated function
    pub fn new(
        config: FunctionConfig,
        inputs: Vec<VariableRef>,
        outputs: Vec<VariableRef>,
    ) -> Self {
        Self {
            config,
            inputs,
            outputs,
            slot: Slot::Unallocated,
        }
    }

    /// Hyperparameters, readable in every state
    pub fn config(&self) -> &FunctionConfig {
        &self.config
    }

    /// Kind of this function
    pub fn function_type(&self) -> FunctionType {
        self.config.function_type()
    }

    /// Bound inputs
    pub fn inputs(&self) -> &[VariableRef] {
        &self.inputs
    }

    /// Bound outputs
    pub fn outputs(&self) -> &[VariableRef] {
        &self.outputs
    }

    /// Current lifecycle state
    pub fn state(&self) -> FunctionState {
        match self.slot {
            Slot::Unallocated => FunctionState::Unallocated,
            Slot::Ready(_) => FunctionState::Ready,
            Slot::Released => FunctionState::Released,
        }
    }

    /// Path the next execute would take, `None` unless ready
    pub fn execution_path(&self) -> Option<ExecutionPath> {
        match &self.slot {
            Slot::Ready(allocation) => Some(allocation.dispatcher.path()),
            _ => None,
        }
    }

    /// Validates bindings and derives the execution context
    ///
    /// On error the function stays unallocated.
    pub fn allocate(&mut self, engine: &EngineConfig) -> Result<()> {
        let function = self.function_type();
        trace!(
            "Allocating {} with {} inputs and {} outputs",
            function,
            self.inputs.len(),
            self.outputs.len()
        );

        if !matches!(self.slot, Slot::Unallocated) {
            return Err(self.lifecycle_error("allocate"));
        }

        let (inputs, outputs) = self
            .config
            .arity()
            .ok_or_else(|| Error::Unimplemented(function.to_string()))?;
        check_arity(function, "inputs", inputs, self.inputs.len())?;
        check_arity(function, "outputs", outputs, self.outputs.len())?;

        let bindings = Bindings::new(function, &self.inputs, &self.outputs);
        let (context, touched) = self.config.allocate_context(&bindings)?;
        let dispatcher = Dispatcher::new(engine.dispatch, touched);

        debug!(
            "Allocated {} (dispatch {}, current path {})",
            function,
            engine.dispatch,
            dispatcher.path()
        );
        self.slot = Slot::Ready(Allocation { context, dispatcher });
        Ok(())
    }

    /// Runs the kernel once
    ///
    /// Reads inputs and overwrites outputs. Only valid while ready.
    pub fn execute(&self) -> Result<()> {
        match &self.slot {
            Slot::Ready(allocation) => {
                let path = allocation.dispatcher.path();
                trace!("Executing {} on the {} path", self.function_type(), path);
                self.config.execute_context(&allocation.context, path)
            }
            _ => Err(self.lifecycle_error("execute")),
        }
    }

    /// Drops the derived context, keeping hyperparameters
    ///
    /// Releasing an unallocated or already released function is a no-op.
    pub fn release(&mut self) -> Result<()> {
        match self.slot {
            Slot::Ready(_) => {
                self.slot = Slot::Released;
                debug!("Released {}", self.function_type());
            }
            Slot::Unallocated | Slot::Released => {
                warn!(
                    "Release of {} while {} has nothing to free",
                    self.function_type(),
                    self.state()
                );
            }
        }
        Ok(())
    }

    fn lifecycle_error(&self, operation: &'static str) -> Error {
        Error::Lifecycle {
            function: self.function_type().to_string(),
            operation,
            state: self.state().to_string(),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("config", &self.config)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("state", &self.state())
            .finish()
    }
}

fn check_arity(function: FunctionType, port: &'static str, arity: Arity, got: usize) -> Result<()> {
    if arity.accepts(got) {
        Ok(())
    } else {
        Err(Error::Arity {
            function: function.to_string(),
            port,
            expected: arity.to_string(),
            got,
        })
    }
}
