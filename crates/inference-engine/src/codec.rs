//! Typed storage codecs
//!
//! A codec is the pair of functions that move one element between a
//! variable's storage and the canonical `f32` domain all kernels compute in.
//! The scale of fixed-point representations lives on the variable, so one
//! codec per representation serves every function.
//!
//! Functions resolve their codecs once at allocate time and keep them in the
//! context; the generic execution path then calls through the stored function
//! pointers without re-inspecting representation tags per element.

use std::fmt;

use half::f16;
use num_traits::clamp;

use crate::representation::DataRepresentation;
use crate::variable::Variable;

/// Reads element `index` as `f32`
pub type DecodeFn = fn(&Variable, usize) -> f32;

/// Writes `f32` into element `index`
pub type EncodeFn = fn(&mut Variable, usize, f32);

/// Decode/encode pair for one representation
#[derive(Clone, Copy)]
pub struct Codec {
    representation: DataRepresentation,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl Codec {
    /// Selects the codec for `representation`
    pub fn select(representation: DataRepresentation) -> Self {
        let (decode, encode): (DecodeFn, EncodeFn) = match representation {
            DataRepresentation::Float32 => (decode_float32, encode_float32),
            DataRepresentation::Float16 => (decode_float16, encode_float16),
            DataRepresentation::Int16 => (decode_int16, encode_int16),
            DataRepresentation::Int8 => (decode_int8, encode_int8),
            DataRepresentation::Sign => (decode_sign, encode_sign),
        };
        Self {
            representation,
            decode,
            encode,
        }
    }

    /// Representation this codec reads and writes
    pub fn representation(&self) -> DataRepresentation {
        self.representation
    }

    /// Reads element `index` of `variable`
    ///
    /// Panics if `variable` is not stored in this codec's representation.
    #[inline]
    pub fn decode(&self, variable: &Variable, index: usize) -> f32 {
        variable.expect_representation(self.representation);
        (self.decode)(variable, index)
    }

    /// Writes `value` into element `index` of `variable`
    ///
    /// Panics if `variable` is not stored in this codec's representation.
    #[inline]
    pub fn encode(&self, variable: &mut Variable, index: usize, value: f32) {
        variable.expect_representation(self.representation);
        (self.encode)(variable, index, value)
    }

    /// Largest decode error for values inside the representable range
    pub fn precision(&self, variable: &Variable) -> f32 {
        match self.representation {
            DataRepresentation::Float32 => 0.0,
            DataRepresentation::Float16 => f32::EPSILON.max(f16::EPSILON.to_f32()),
            DataRepresentation::Int16 | DataRepresentation::Int8 => {
                0.5 / variable.fixed_point_scale()
            }
            // Sign keeps only the sign; magnitude is not representable.
            DataRepresentation::Sign => f32::INFINITY,
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("representation", &self.representation)
            .finish()
    }
}

fn decode_float32(variable: &Variable, index: usize) -> f32 {
    variable.view::<f32>()[index]
}

fn encode_float32(variable: &mut Variable, index: usize, value: f32) {
    variable.view_mut::<f32>()[index] = value;
}

fn decode_float16(variable: &Variable, index: usize) -> f32 {
    f16::from_bits(variable.view::<u16>()[index]).to_f32()
}

fn encode_float16(variable: &mut Variable, index: usize, value: f32) {
    variable.view_mut::<u16>()[index] = f16::from_f32(value).to_bits();
}

fn decode_int16(variable: &Variable, index: usize) -> f32 {
    variable.view::<i16>()[index] as f32 / variable.fixed_point_scale()
}

fn encode_int16(variable: &mut Variable, index: usize, value: f32) {
    let scaled = clamp(
        (value * variable.fixed_point_scale()).round(),
        i16::MIN as f32,
        i16::MAX as f32,
    );
    variable.view_mut::<i16>()[index] = scaled as i16;
}

fn decode_int8(variable: &Variable, index: usize) -> f32 {
    variable.view::<i8>()[index] as f32 / variable.fixed_point_scale()
}

fn encode_int8(variable: &mut Variable, index: usize, value: f32) {
    let scaled = clamp(
        (value * variable.fixed_point_scale()).round(),
        i8::MIN as f32,
        i8::MAX as f32,
    );
    variable.view_mut::<i8>()[index] = scaled as i8;
}

fn decode_sign(variable: &Variable, index: usize) -> f32 {
    let byte = variable.as_bytes()[index / 8];
    if byte & (1 << (index % 8)) != 0 {
        1.0
    } else {
        -1.0
    }
}

fn encode_sign(variable: &mut Variable, index: usize, value: f32) {
    let mask = 1u8 << (index % 8);
    let byte = &mut variable.as_bytes_mut()[index / 8];
    if value >= 0.0 {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    fn variable(representation: DataRepresentation, len: usize, position: u8) -> Variable {
        Variable::new(representation, Shape::new(vec![len]).unwrap())
            .with_fixed_point_position(position)
            .unwrap()
    }

    #[test]
    fn test_float32_is_identity() {
        let codec = Codec::select(DataRepresentation::Float32);
        let mut v = variable(DataRepresentation::Float32, 2, 0);
        codec.encode(&mut v, 1, 0.1);
        assert_eq!(codec.decode(&v, 1), 0.1);
        assert_eq!(v.as_f32(), &[0.0, 0.1]);
    }

    #[test]
    fn test_round_trip_within_precision() {
        let values = [-3.9, -1.0, -0.3, 0.0, 0.2, 0.74, 1.5, 3.25];
        for (representation, position) in [
            (DataRepresentation::Float16, 0),
            (DataRepresentation::Int16, 10),
            (DataRepresentation::Int8, 5),
        ] {
            let codec = Codec::select(representation);
            let mut v = variable(representation, values.len(), position);
            let precision = codec.precision(&v);
            for (i, &x) in values.iter().enumerate() {
                codec.encode(&mut v, i, x);
            }
            for (i, &x) in values.iter().enumerate() {
                let y = codec.decode(&v, i);
                let tolerance = precision * x.abs().max(1.0);
                assert!(
                    (y - x).abs() <= tolerance,
                    "{}: {} decoded as {} (tolerance {})",
                    representation,
                    x,
                    y,
                    tolerance
                );
            }
        }
    }

    #[test]
    fn test_fixed_point_saturates() {
        let codec = Codec::select(DataRepresentation::Int8);
        let mut v = variable(DataRepresentation::Int8, 2, 4);
        codec.encode(&mut v, 0, 100.0);
        codec.encode(&mut v, 1, -100.0);
        assert_eq!(codec.decode(&v, 0), 127.0 / 16.0);
        assert_eq!(codec.decode(&v, 1), -128.0 / 16.0);
    }

    #[test]
    fn test_sign_bits() {
        let codec = Codec::select(DataRepresentation::Sign);
        let mut v = variable(DataRepresentation::Sign, 10, 0);
        for i in 0..10 {
            assert_eq!(codec.decode(&v, i), -1.0);
        }
        codec.encode(&mut v, 0, 0.0);
        codec.encode(&mut v, 9, 2.5);
        codec.encode(&mut v, 3, 7.0);
        codec.encode(&mut v, 3, -7.0);
        assert_eq!(v.as_bytes(), &[0b0000_0001, 0b0000_0010]);
        assert_eq!(codec.decode(&v, 0), 1.0);
        assert_eq!(codec.decode(&v, 3), -1.0);
        assert_eq!(codec.decode(&v, 9), 1.0);
    }

    #[test]
    #[should_panic]
    fn test_codec_rejects_other_representation() {
        let codec = Codec::select(DataRepresentation::Int16);
        let v = variable(DataRepresentation::Int8, 2, 0);
        codec.decode(&v, 0);
    }
}
