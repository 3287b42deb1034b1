//! Loop bounds derived from shapes
//!
//! Per-row transforms split a shape at a pivot (base) axis: dimensions before
//! the axis enumerate independent rows, dimensions from the axis on form the
//! feature vector each row consumes or produces. The counts are computed once
//! when a function is allocated and stay fixed in its context.

use common::error::{Error, Result};

use crate::shape::Shape;

/// Row/feature decomposition of an input and an output shape around a pivot axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopBounds {
    /// Number of independent rows, the product of `dims[..axis]` of the input
    pub outer: usize,
    /// Elements consumed per row, the product of `dims[axis..]` of the input
    pub input_inner: usize,
    /// Elements produced per row, the product of `dims[axis..]` of the output
    pub output_inner: usize,
}

impl LoopBounds {
    /// Splits `input` and `output` at `axis`
    pub fn around_axis(input: &Shape, output: &Shape, axis: usize) -> Result<Self> {
        check_axis(input, axis, "input")?;
        check_axis(output, axis, "output")?;

        Ok(Self {
            outer: input.product_of(0..axis),
            input_inner: input.product_of(axis..input.rank()),
            output_inner: output.product_of(axis..output.rank()),
        })
    }

    /// Flat offset of row `k` in the input buffer
    #[inline]
    pub fn input_offset(&self, k: usize) -> usize {
        k * self.input_inner
    }

    /// Flat offset of row `k` in the output buffer
    #[inline]
    pub fn output_offset(&self, k: usize) -> usize {
        k * self.output_inner
    }
}

/// Decomposition of one shape around a single reduced axis
///
/// Element `(o, a, i)` lives at `o * size * inner + a * inner + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSplit {
    /// Product of the dimensions before the axis
    pub outer: usize,
    /// Size of the axis itself
    pub size: usize,
    /// Product of the dimensions after the axis
    pub inner: usize,
}

impl AxisSplit {
    /// Splits `shape` at `axis`, which must name an existing dimension
    pub fn at(shape: &Shape, axis: usize) -> Result<Self> {
        if axis >= shape.rank() {
            return Err(Error::Shape(format!(
                "axis {} out of range for shape {}",
                axis, shape
            )));
        }
        Ok(Self {
            outer: shape.product_of(0..axis),
            size: shape.dims()[axis],
            inner: shape.product_of(axis + 1..shape.rank()),
        })
    }

    /// Flat index of `(o, a, i)`
    #[inline]
    pub fn index(&self, o: usize, a: usize, i: usize) -> usize {
        (o * self.size + a) * self.inner + i
    }
}

fn check_axis(shape: &Shape, axis: usize, which: &str) -> Result<()> {
    if axis > shape.rank() {
        return Err(Error::Shape(format!(
            "base axis {} exceeds rank of {} shape {}",
            axis, which, shape
        )));
    }
    Ok(())
}
