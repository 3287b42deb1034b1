//! Kernels for the implemented function kinds
//!
//! Every kernel follows the same shape: `allocate` checks bindings and builds
//! a context of [`Port`](crate::function::Port)s and loop bounds,
//! `execute_float` zeroes or overwrites the output through `f32` slices, and
//! `execute_generic` repeats the same loops through the ports' codecs.

pub mod affine;
pub mod binary;
pub mod normalization;
pub mod prelu;
pub mod reshape;
pub mod softmax;
pub mod unary;

use serde::{Deserialize, Serialize};

/// Hyperparameters of kinds that take none
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoParams {}

/// Default base axis of per-row transforms
pub(crate) fn default_base_axis() -> usize {
    1
}
