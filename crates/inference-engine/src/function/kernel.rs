//! Kernel contract
//!
//! A kernel is the per-kind half of a function: it derives an execution
//! context from the hyperparameters and the bound variables, and provides the
//! same algorithm twice, once over raw `f32` slices and once through codecs.
//! Lifecycle bookkeeping and path selection are shared and live in
//! [`Function`](super::Function).

use std::fmt;

use common::error::{Error, Result};

use crate::codec::Codec;
use crate::function::catalog::FunctionType;
use crate::representation::DataRepresentation;
use crate::variable::{Variable, VariableRef};
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

/// Accepted number of inputs or outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many
    Exactly(usize),
    /// Any count in the inclusive range
    Between(usize, usize),
}

impl Arity {
    /// Whether `count` satisfies this arity
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Arity::Exactly(n) => write!(f, "exactly {}", n),
            Arity::Between(lo, hi) if hi == lo + 1 => write!(f, "{} or {}", lo, hi),
            Arity::Between(lo, hi) => write!(f, "{} to {}", lo, hi),
        }
    }
}

/// A bound variable together with its resolved codec
#[derive(Debug, Clone)]
pub struct Port {
    variable: VariableRef,
    codec: Codec,
}

impl Port {
    /// Binds `variable`, resolving its codec
    pub fn new(variable: VariableRef) -> Self {
        let codec = Codec::select(variable.representation());
        Self { variable, codec }
    }

    /// The bound variable
    pub fn variable(&self) -> &VariableRef {
        &self.variable
    }

    /// Codec resolved at bind time
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Element count of the bound variable
    pub fn elem_count(&self) -> usize {
        self.variable.read().elem_count()
    }

    /// Shared access to the variable
    pub fn read(&self) -> RwLockReadGuard<'_, Variable> {
        self.variable.read()
    }

    /// Exclusive access to the variable
    pub fn write(&self) -> RwLockWriteGuard<'_, Variable> {
        self.variable.write()
    }
}

/// Inputs and outputs handed to a kernel at allocate time
///
/// Arity has already been checked against the kernel's contract, so indexed
/// access within the declared bounds cannot fail.
pub struct Bindings<'a> {
    function: FunctionType,
    inputs: &'a [VariableRef],
    outputs: &'a [VariableRef],
}

impl<'a> Bindings<'a> {
    /// Creates bindings for `function`
    pub fn new(
        function: FunctionType,
        inputs: &'a [VariableRef],
        outputs: &'a [VariableRef],
    ) -> Self {
        Self {
            function,
            inputs,
            outputs,
        }
    }

    /// Kind being allocated
    pub fn function(&self) -> FunctionType {
        self.function
    }

    /// Required input `index`
    pub fn input(&self, index: usize) -> Result<Port> {
        self.optional_input(index).ok_or_else(|| {
            Error::Internal(format!("{}: input {} is not bound", self.function, index))
        })
    }

    /// Optional input `index`, `None` when not bound
    pub fn optional_input(&self, index: usize) -> Option<Port> {
        self.inputs.get(index).cloned().map(Port::new)
    }

    /// Required output `index`
    pub fn output(&self, index: usize) -> Result<Port> {
        self.outputs.get(index).cloned().map(Port::new).ok_or_else(|| {
            Error::Internal(format!("{}: output {} is not bound", self.function, index))
        })
    }

    /// Rejects outputs that are also bound as inputs
    pub fn ensure_outputs_not_aliased(&self) -> Result<()> {
        for (o, output) in self.outputs.iter().enumerate() {
            if let Some(i) = self.inputs.iter().position(|input| input.ptr_eq(output)) {
                return Err(Error::Binding(format!(
                    "{}: output {} is the same variable as input {}",
                    self.function, o, i
                )));
            }
        }
        Ok(())
    }

    /// Rejects a port stored in a representation outside `allowed`
    pub fn ensure_representation(
        &self,
        port: &Port,
        allowed: &[DataRepresentation],
    ) -> Result<()> {
        let representation = port.codec().representation();
        if !allowed.contains(&representation) {
            return Err(Error::UnsupportedRepresentation {
                function: self.function.to_string(),
                representation: representation.to_string(),
            });
        }
        Ok(())
    }

    /// Checks every bound input and output against the accepted representations
    pub fn ensure_representations(
        &self,
        inputs: &[DataRepresentation],
        outputs: &[DataRepresentation],
    ) -> Result<()> {
        for input in self.inputs {
            self.ensure_representation(&Port::new(input.clone()), inputs)?;
        }
        for output in self.outputs {
            self.ensure_representation(&Port::new(output.clone()), outputs)?;
        }
        Ok(())
    }

    /// Rejects a port whose element count differs from `expected`
    pub fn ensure_elem_count(&self, what: &str, port: &Port, expected: usize) -> Result<()> {
        let got = port.elem_count();
        if got != expected {
            return Err(Error::Shape(format!(
                "{}: {} has {} elements, expected {}",
                self.function, what, got, expected
            )));
        }
        Ok(())
    }
}

/// Per-kind implementation of a function
pub trait Kernel {
    /// Hyperparameter record supplied at graph-build time
    type Config: Clone + fmt::Debug + PartialEq + Send + Sync;

    /// State derived at allocate time; immutable until release
    type Context: Send + Sync;

    /// Accepted input count
    const INPUTS: Arity;

    /// Accepted output count
    const OUTPUTS: Arity;

    /// Representations accepted for every input
    const INPUT_REPRESENTATIONS: &'static [DataRepresentation] = &DataRepresentation::ALL;

    /// Representations accepted for every output
    const OUTPUT_REPRESENTATIONS: &'static [DataRepresentation] = &DataRepresentation::ALL;

    /// Builds the context from hyperparameters and bound variables
    fn allocate(config: &Self::Config, bindings: &Bindings<'_>) -> Result<Self::Context>;

    /// Every variable the kernel reads or writes, for the float-path test
    fn touched(context: &Self::Context) -> Vec<VariableRef>;

    /// Direct `f32` implementation; only called when every touched variable is `Float32`
    fn execute_float(config: &Self::Config, context: &Self::Context);

    /// Codec-mediated implementation, valid for any representation mix
    fn execute_generic(config: &Self::Config, context: &Self::Context);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    fn float(len: usize) -> VariableRef {
        VariableRef::new(Variable::new(
            DataRepresentation::Float32,
            Shape::new(vec![len]).unwrap(),
        ))
    }

    #[test]
    fn test_arity() {
        assert!(Arity::Between(2, 3).accepts(2));
        assert!(Arity::Between(2, 3).accepts(3));
        assert!(!Arity::Between(2, 3).accepts(1));
        assert!(!Arity::Between(2, 3).accepts(4));
        assert!(Arity::Exactly(1).accepts(1));
        assert_eq!(Arity::Between(2, 3).to_string(), "2 or 3");
        assert_eq!(Arity::Between(3, 5).to_string(), "3 to 5");
        assert_eq!(Arity::Exactly(1).to_string(), "exactly 1");
    }

    #[test]
    fn test_aliased_output_rejected() {
        let shared = float(4);
        let inputs = vec![shared.clone()];
        let outputs = vec![shared];
        let bindings = Bindings::new(FunctionType::Add2, &inputs, &outputs);
        assert!(matches!(bindings.ensure_outputs_not_aliased(), Err(Error::Binding(_))));

        let outputs = vec![float(4)];
        let bindings = Bindings::new(FunctionType::Add2, &inputs, &outputs);
        assert!(bindings.ensure_outputs_not_aliased().is_ok());
    }

    #[test]
    fn test_optional_input() {
        let inputs = vec![float(2), float(2)];
        let outputs = vec![float(2)];
        let bindings = Bindings::new(FunctionType::Affine, &inputs, &outputs);
        assert!(bindings.optional_input(1).is_some());
        assert!(bindings.optional_input(2).is_none());
        assert!(bindings.input(2).is_err());
        assert_eq!(bindings.input(0).unwrap().elem_count(), 2);
    }

    #[test]
    fn test_representation_check() {
        let inputs = vec![VariableRef::new(Variable::new(
            DataRepresentation::Sign,
            Shape::new(vec![8]).unwrap(),
        ))];
        let outputs = vec![float(8)];
        let bindings = Bindings::new(FunctionType::Softmax, &inputs, &outputs);
        let port = bindings.input(0).unwrap();
        assert!(matches!(
            bindings.ensure_representation(&port, &[DataRepresentation::Float32]),
            Err(Error::UnsupportedRepresentation { .. })
        ));

        assert!(bindings
            .ensure_representations(&DataRepresentation::ALL, &DataRepresentation::NUMERIC)
            .is_ok());
        let err = Bindings::new(FunctionType::Softmax, &outputs, &inputs)
            .ensure_representations(&DataRepresentation::ALL, &DataRepresentation::NUMERIC)
            .unwrap_err();
        assert_eq!(err.to_string(), "Softmax: unsupported representation sign");
    }
}
