//! Variables (tensors)
//!
//! A variable is a shaped buffer in one [`DataRepresentation`]. Storage is
//! kept in 32-bit words so that typed views of any supported element width
//! are always correctly aligned.
//!
//! Functions bind to variables through [`VariableRef`], a shared handle the
//! graph instance hands out. Exclusive-writer discipline between functions is
//! the scheduler's job; the lock only keeps each individual access sound.

use std::sync::Arc;

use bytemuck::Pod;
use common::error::{Error, Result};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::codec::Codec;
use crate::representation::DataRepresentation;
use crate::shape::Shape;

/// A shaped, typed, contiguous buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    representation: DataRepresentation,
    shape: Shape,
    fixed_point_position: u8,
    words: Vec<u32>,
    byte_len: usize,
}

impl Variable {
    /// Largest fixed-point position; the scale must stay exact within 16 bits
    pub const MAX_FIXED_POINT_POSITION: u8 = 15;

    /// Creates a zero-filled variable
    pub fn new(representation: DataRepresentation, shape: Shape) -> Self {
        let byte_len = representation.storage_bytes(shape.elem_count());
        Self {
            representation,
            shape,
            fixed_point_position: 0,
            words: vec![0u32; (byte_len + 3) / 4],
            byte_len,
        }
    }

    /// Sets the fixed-point position (scale `2^position`) used by integer codecs
    pub fn with_fixed_point_position(mut self, position: u8) -> Result<Self> {
        if position > Self::MAX_FIXED_POINT_POSITION {
            return Err(Error::Shape(format!(
                "fixed-point position {} exceeds {}",
                position,
                Self::MAX_FIXED_POINT_POSITION
            )));
        }
        self.fixed_point_position = position;
        Ok(self)
    }

    /// Creates a `Float32` variable holding `values`
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self> {
        let mut variable = Self::new(DataRepresentation::Float32, shape);
        variable.check_len(values.len())?;
        variable.as_f32_mut().copy_from_slice(values);
        Ok(variable)
    }

    /// Creates a variable in any representation, encoding `values` through its codec
    pub fn from_values(
        representation: DataRepresentation,
        shape: Shape,
        fixed_point_position: u8,
        values: &[f32],
    ) -> Result<Self> {
        let mut variable =
            Self::new(representation, shape).with_fixed_point_position(fixed_point_position)?;
        variable.check_len(values.len())?;

        let codec = Codec::select(representation);
        for (i, &value) in values.iter().enumerate() {
            codec.encode(&mut variable, i, value);
        }
        Ok(variable)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.elem_count() {
            return Err(Error::Shape(format!(
                "shape {} requires {} elements, got {}",
                self.shape,
                self.elem_count(),
                len
            )));
        }
        Ok(())
    }

    /// Storage representation
    pub fn representation(&self) -> DataRepresentation {
        self.representation
    }

    /// Shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of elements
    pub fn elem_count(&self) -> usize {
        self.shape.elem_count()
    }

    /// Fixed-point position of integer representations
    pub fn fixed_point_position(&self) -> u8 {
        self.fixed_point_position
    }

    /// Multiplier between real values and stored integers
    pub fn fixed_point_scale(&self) -> f32 {
        (1u32 << self.fixed_point_position) as f32
    }

    /// Size of the element data in bytes
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Raw element bytes
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u32, u8>(&self.words)[..self.byte_len]
    }

    /// Raw element bytes, mutable
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.byte_len;
        &mut bytemuck::cast_slice_mut::<u32, u8>(&mut self.words)[..len]
    }

    /// Elements of a `Float32` variable
    ///
    /// Panics on any other representation.
    pub fn as_f32(&self) -> &[f32] {
        self.expect_representation(DataRepresentation::Float32);
        self.view()
    }

    /// Elements of a `Float32` variable, mutable
    ///
    /// Panics on any other representation.
    pub fn as_f32_mut(&mut self) -> &mut [f32] {
        self.expect_representation(DataRepresentation::Float32);
        self.view_mut()
    }

    /// Decodes every element to `f32`
    pub fn to_f32_vec(&self) -> Vec<f32> {
        let codec = Codec::select(self.representation);
        (0..self.elem_count()).map(|i| codec.decode(self, i)).collect()
    }

    pub(crate) fn expect_representation(&self, expected: DataRepresentation) {
        assert_eq!(
            self.representation, expected,
            "variable stored as {} accessed as {}",
            self.representation, expected
        );
    }

    /// Storage reinterpreted as `T`, truncated to the element data
    pub(crate) fn view<T: Pod>(&self) -> &[T] {
        let len = self.byte_len / std::mem::size_of::<T>();
        &bytemuck::cast_slice::<u32, T>(&self.words)[..len]
    }

    pub(crate) fn view_mut<T: Pod>(&mut self) -> &mut [T] {
        let len = self.byte_len / std::mem::size_of::<T>();
        &mut bytemuck::cast_slice_mut::<u32, T>(&mut self.words)[..len]
    }
}

/// Shared handle to a variable owned by a graph instance
#[derive(Debug, Clone)]
pub struct VariableRef(Arc<RwLock<Variable>>);

impl VariableRef {
    /// Wraps a variable
    pub fn new(variable: Variable) -> Self {
        Self(Arc::new(RwLock::new(variable)))
    }

    /// Shared access
    pub fn read(&self) -> RwLockReadGuard<'_, Variable> {
        self.0.read()
    }

    /// Exclusive access
    pub fn write(&self) -> RwLockWriteGuard<'_, Variable> {
        self.0.write()
    }

    /// Representation of the underlying variable
    pub fn representation(&self) -> DataRepresentation {
        self.0.read().representation()
    }

    /// Shape of the underlying variable
    pub fn shape(&self) -> Shape {
        self.0.read().shape().clone()
    }

    /// Whether both handles point at the same variable
    pub fn ptr_eq(&self, other: &VariableRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Variable> for VariableRef {
    fn from(variable: Variable) -> Self {
        VariableRef::new(variable)
    }
}
