//! Shape descriptors
//!
//! A shape is an ordered list of dimension sizes. Every dimension holds at
//! least one element; the empty shape describes a scalar.

use std::fmt;

use common::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Dimension sizes of a variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Creates a shape, rejecting zero-sized dimensions
    pub fn new(dims: impl Into<Vec<usize>>) -> Result<Self> {
        let dims = dims.into();
        if let Some(axis) = dims.iter().position(|&d| d == 0) {
            return Err(Error::Shape(format!(
                "dimension {} of {:?} is zero",
                axis, dims
            )));
        }
        Ok(Shape(dims))
    }

    /// Scalar shape (no dimensions, one element)
    pub fn scalar() -> Self {
        Shape(Vec::new())
    }

    /// The dimension sizes
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Product of all dimensions; 1 for a scalar
    pub fn elem_count(&self) -> usize {
        self.0.iter().product()
    }

    /// Product of the dimensions in `range`
    ///
    /// Panics if the range exceeds the rank; callers validate axes first.
    pub fn product_of(&self, range: std::ops::Range<usize>) -> usize {
        self.0[range].iter().product()
    }
}

impl TryFrom<Vec<usize>> for Shape {
    type Error = Error;

    fn try_from(dims: Vec<usize>) -> Result<Self> {
        Shape::new(dims)
    }
}

impl From<Shape> for Vec<usize> {
    fn from(shape: Shape) -> Self {
        shape.0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}
