//! Function execution for the NNRT inference runtime
//!
//! This crate provides the typed variables a compiled graph binds, the
//! storage codecs for each data representation, and the functions (graph
//! nodes) that run over them with a float fast path and a generic codec path.

pub mod bounds;
pub mod codec;
pub mod function;
pub mod kernels;
pub mod representation;
pub mod shape;
pub mod variable;

// Re-export commonly used types
pub use bounds::{AxisSplit, LoopBounds};
pub use codec::Codec;
pub use function::{
    Arity, ExecutionPath, Function, FunctionCategory, FunctionConfig, FunctionState, FunctionType,
};
pub use representation::DataRepresentation;
pub use shape::Shape;
pub use variable::{Variable, VariableRef};
