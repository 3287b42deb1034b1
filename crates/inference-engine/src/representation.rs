//! Physical element representations
//!
//! A representation tags how a variable's elements are laid out in memory.
//! Kernels never interpret storage themselves on the generic path; they go
//! through the [`Codec`](crate::codec::Codec) selected for the representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage encoding of a variable's elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataRepresentation {
    /// IEEE 754 single precision, the canonical representation
    Float32,
    /// IEEE 754 half precision
    Float16,
    /// Signed 16-bit fixed point, scaled by `2^fixed_point_position`
    Int16,
    /// Signed 8-bit fixed point, scaled by `2^fixed_point_position`
    Int8,
    /// One bit per element: set is +1, clear is -1
    Sign,
}

impl DataRepresentation {
    /// Every supported representation
    pub const ALL: [DataRepresentation; 5] = [
        DataRepresentation::Float32,
        DataRepresentation::Float16,
        DataRepresentation::Int16,
        DataRepresentation::Int8,
        DataRepresentation::Sign,
    ];

    /// Representations that hold a magnitude, i.e. everything but `Sign`
    pub const NUMERIC: [DataRepresentation; 4] = [
        DataRepresentation::Float32,
        DataRepresentation::Float16,
        DataRepresentation::Int16,
        DataRepresentation::Int8,
    ];

    /// Width of one element in bits
    pub fn bits(&self) -> usize {
        match self {
            DataRepresentation::Float32 => 32,
            DataRepresentation::Float16 | DataRepresentation::Int16 => 16,
            DataRepresentation::Int8 => 8,
            DataRepresentation::Sign => 1,
        }
    }

    /// Bytes needed to store `count` elements
    pub fn storage_bytes(&self, count: usize) -> usize {
        (count * self.bits() + 7) / 8
    }

    /// Whether elements are scaled integers
    pub fn is_fixed_point(&self) -> bool {
        matches!(self, DataRepresentation::Int16 | DataRepresentation::Int8)
    }

    /// Whether this is the canonical float representation
    pub fn is_float32(&self) -> bool {
        matches!(self, DataRepresentation::Float32)
    }
}

impl fmt::Display for DataRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataRepresentation::Float32 => "float32",
            DataRepresentation::Float16 => "float16",
            DataRepresentation::Int16 => "int16",
            DataRepresentation::Int8 => "int8",
            DataRepresentation::Sign => "sign",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DataRepresentation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "float32" | "float" | "f32" => Ok(DataRepresentation::Float32),
            "float16" | "half" | "f16" => Ok(DataRepresentation::Float16),
            "int16" | "i16" => Ok(DataRepresentation::Int16),
            "int8" | "i8" => Ok(DataRepresentation::Int8),
            "sign" | "binary" => Ok(DataRepresentation::Sign),
            _ => Err(format!("Unknown data representation: {}", s)),
        }
    }
}
