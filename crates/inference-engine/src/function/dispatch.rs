//! Float fast path versus generic codec path
//!
//! A function takes the float path only when every variable it touches is
//! stored as `Float32`. Both paths run the same loops in the same order, so
//! they agree bit for bit on all-float graphs.

use std::fmt;

use runtime_config::DispatchPolicy;

use crate::variable::VariableRef;

/// Implementation chosen for one execute call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    /// Direct arithmetic over `f32` slices
    Float,
    /// Every element access goes through the variable's codec
    Generic,
}

impl ExecutionPath {
    /// Float path if all `touched` variables are `Float32`, otherwise generic
    pub fn select(touched: &[VariableRef]) -> Self {
        if touched
            .iter()
            .all(|variable| variable.representation().is_float32())
        {
            ExecutionPath::Float
        } else {
            ExecutionPath::Generic
        }
    }
}

impl fmt::Display for ExecutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionPath::Float => write!(f, "float"),
            ExecutionPath::Generic => write!(f, "generic"),
        }
    }
}

/// Applies a [`DispatchPolicy`] to a function's touched variables
#[derive(Debug)]
pub(crate) struct Dispatcher {
    policy: DispatchPolicy,
    touched: Vec<VariableRef>,
    cached: ExecutionPath,
}

impl Dispatcher {
    pub(crate) fn new(policy: DispatchPolicy, touched: Vec<VariableRef>) -> Self {
        let cached = ExecutionPath::select(&touched);
        Self {
            policy,
            touched,
            cached,
        }
    }

    pub(crate) fn path(&self) -> ExecutionPath {
        match self.policy {
            DispatchPolicy::PerExecute => ExecutionPath::select(&self.touched),
            DispatchPolicy::CachedAtAllocate => self.cached,
            DispatchPolicy::GenericOnly => ExecutionPath::Generic,
        }
    }
}
