//! Attribute value decoding.

use std::ops::Deref;

use half::f16;

use crate::MAX_COMPONENTS;
use crate::error::{DecodeError, DecodeResult};
use crate::format::{ComponentFormat, ComponentType};

/// A decoded attribute value: up to four scalar components.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Components {
    values: [f64; MAX_COMPONENTS],
    len: u8,
}

impl Components {
    /// Build a value from at most [`MAX_COMPONENTS`] scalars. Extra scalars are dropped.
    #[must_use]
    pub fn from_slice(values: &[f64]) -> Self {
        let mut out = Self::default();
        for (slot, &v) in out.values.iter_mut().zip(values) {
            *slot = v;
            out.len += 1;
        }
        out
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..usize::from(self.len)]
    }

    /// Widen to a 4-vector, filling missing components with zero.
    #[must_use]
    pub fn to_dvec4(&self) -> glam::DVec4 {
        glam::DVec4::from_array(self.values)
    }
}

impl Deref for Components {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        self.as_slice()
    }
}

/// Decode one attribute value from the start of `buffer`.
///
/// Reads `format.byte_size()` bytes as `component_count` little-endian
/// scalars, then applies normalization and channel reordering.
///
/// SNorm values equal to the most negative representable integer are passed
/// through unnormalized; every other SNorm value is divided by
/// `-(min - 1)`.
pub fn decode_component(format: &ComponentFormat, buffer: &[u8]) -> DecodeResult<Components> {
    format.validate()?;

    let needed = format.byte_size();
    let bytes = buffer.get(..needed).ok_or(DecodeError::BufferTooShort {
        needed,
        available: buffer.len(),
    })?;

    let mut values = [0.0; MAX_COMPONENTS];
    let width = usize::from(format.component_byte_width);
    for (value, scalar) in values.iter_mut().zip(bytes.chunks_exact(width)) {
        *value = decode_scalar(format.component_type, scalar);
    }

    // BGRA: swap blue and red, leave green and alpha.
    if format.reversed_channel_order {
        values.swap(0, 2);
    }

    Ok(Components {
        values,
        len: format.component_count,
    })
}

#[allow(clippy::cast_precision_loss)]
fn decode_scalar(component_type: ComponentType, bytes: &[u8]) -> f64 {
    match component_type {
        ComponentType::Float => read_float(bytes),
        ComponentType::UnsignedInt | ComponentType::UScaled => read_unsigned(bytes) as f64,
        ComponentType::SignedInt | ComponentType::SScaled => read_signed(bytes) as f64,
        ComponentType::UNorm => {
            let divisor = 2f64.powi(bit_count(bytes)) - 1.0;
            read_unsigned(bytes) as f64 / divisor
        }
        ComponentType::SNorm => {
            let raw = read_signed(bytes);
            let min = i64::MIN >> (64 - bit_count(bytes));
            if raw == min {
                raw as f64
            } else {
                raw as f64 / -(min as f64 - 1.0)
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn bit_count(bytes: &[u8]) -> i32 {
    (bytes.len() * 8) as i32
}

fn read_unsigned(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

#[allow(clippy::cast_possible_wrap)]
fn read_signed(bytes: &[u8]) -> i64 {
    let shift = 64 - bit_count(bytes);
    ((read_unsigned(bytes) << shift) as i64) >> shift
}

fn read_float(bytes: &[u8]) -> f64 {
    match *bytes {
        [a, b] => f16::from_le_bytes([a, b]).to_f64(),
        [a, b, c, d] => f64::from(f32::from_le_bytes([a, b, c, d])),
        _ => f64::from_bits(read_unsigned(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_TYPES: [ComponentType; 7] = [
        ComponentType::UnsignedInt,
        ComponentType::SignedInt,
        ComponentType::Float,
        ComponentType::UNorm,
        ComponentType::SNorm,
        ComponentType::UScaled,
        ComponentType::SScaled,
    ];

    fn valid_int_format() -> impl Strategy<Value = ComponentFormat> {
        (
            1u8..=4,
            prop::sample::select(vec![1u8, 2, 4, 8]),
            prop::sample::select(vec![ComponentType::UnsignedInt, ComponentType::SignedInt]),
        )
            .prop_map(|(count, width, ty)| ComponentFormat::new(count, width, ty))
    }

    fn valid_float_format() -> impl Strategy<Value = ComponentFormat> {
        (1u8..=4, prop::sample::select(vec![2u8, 4, 8]))
            .prop_map(|(count, width)| ComponentFormat::new(count, width, ComponentType::Float))
    }

    proptest! {
        #[test]
        fn zero_bytes_decode_to_zeros(
            format in prop_oneof![valid_int_format(), valid_float_format()]
        ) {
            let buffer = vec![0u8; format.byte_size()];
            let value = decode_component(&format, &buffer).unwrap();
            prop_assert_eq!(value.len(), usize::from(format.component_count));
            prop_assert!(value.iter().all(|&v| v == 0.0));
        }

        #[test]
        fn packed_formats_always_fail(
            count in any::<u8>(),
            width in any::<u8>(),
            ty in prop::sample::select(ALL_TYPES.to_vec()),
            reversed in any::<bool>(),
            buffer in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let format = ComponentFormat {
                component_count: count,
                component_byte_width: width,
                component_type: ty,
                packed: true,
                reversed_channel_order: reversed,
            };
            prop_assert_eq!(
                decode_component(&format, &buffer),
                Err(DecodeError::UnsupportedFormat)
            );
        }
    }

    #[test]
    fn test_unorm_extremes() {
        for width in [1u8, 2, 4, 8] {
            let format = ComponentFormat::new(1, width, ComponentType::UNorm);
            let max = vec![0xffu8; usize::from(width)];
            let zero = vec![0u8; usize::from(width)];
            assert_eq!(decode_component(&format, &max).unwrap()[0], 1.0);
            assert_eq!(decode_component(&format, &zero).unwrap()[0], 0.0);
        }
    }

    #[test]
    fn test_snorm_most_negative_passes_through() {
        let format = ComponentFormat::new(1, 1, ComponentType::SNorm);
        assert_eq!(decode_component(&format, &[0x80]).unwrap()[0], -128.0);

        let format = ComponentFormat::new(1, 2, ComponentType::SNorm);
        assert_eq!(decode_component(&format, &[0x00, 0x80]).unwrap()[0], -32768.0);

        let format = ComponentFormat::new(1, 4, ComponentType::SNorm);
        assert_eq!(
            decode_component(&format, &[0, 0, 0, 0x80]).unwrap()[0],
            -2_147_483_648.0
        );

        let format = ComponentFormat::new(1, 8, ComponentType::SNorm);
        assert_eq!(
            decode_component(&format, &i64::MIN.to_le_bytes()).unwrap()[0],
            -9_223_372_036_854_775_808.0
        );
    }

    #[test]
    fn test_snorm_divisor() {
        // -(min - 1) for one byte is 129.
        let format = ComponentFormat::new(2, 1, ComponentType::SNorm);
        let value = decode_component(&format, &[0x7f, 0xff]).unwrap();
        assert_eq!(value[0], 127.0 / 129.0);
        assert_eq!(value[1], -1.0 / 129.0);

        // For eight bytes the divisor rounds to 2^63 in f64.
        let format = ComponentFormat::new(2, 8, ComponentType::SNorm);
        let bytes: Vec<u8> = [i64::MAX, -1]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let value = decode_component(&format, &bytes).unwrap();
        assert_eq!(value[0], 1.0);
        assert_eq!(value[1], -1.0 / 9_223_372_036_854_775_808.0);
        assert!(value[1] < 0.0);
    }

    #[test]
    fn test_scaled_keeps_magnitude() {
        let format = ComponentFormat::new(2, 2, ComponentType::UScaled);
        let value = decode_component(&format, &[0xe8, 0x03, 0xff, 0xff]).unwrap();
        assert_eq!(value.as_slice(), &[1000.0, 65535.0]);

        let format = ComponentFormat::new(2, 2, ComponentType::SScaled);
        let value = decode_component(&format, &[0xe8, 0x03, 0xff, 0xff]).unwrap();
        assert_eq!(value.as_slice(), &[1000.0, -1.0]);
    }

    #[test]
    fn test_floats() {
        let format = ComponentFormat::new(3, 4, ComponentType::Float);
        let mut bytes = Vec::new();
        for v in [1.5f32, -2.0, 0.25] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let value = decode_component(&format, &bytes).unwrap();
        assert_eq!(value.as_slice(), &[1.5, -2.0, 0.25]);

        // 0x3c00 is 1.0 in binary16, 0xc000 is -2.0.
        let format = ComponentFormat::new(2, 2, ComponentType::Float);
        let value = decode_component(&format, &[0x00, 0x3c, 0x00, 0xc0]).unwrap();
        assert_eq!(value.as_slice(), &[1.0, -2.0]);

        let format = ComponentFormat::new(1, 8, ComponentType::Float);
        let value = decode_component(&format, &std::f64::consts::PI.to_le_bytes()).unwrap();
        assert_eq!(value[0], std::f64::consts::PI);
    }

    #[test]
    fn test_bgra_reorder() {
        let format = ComponentFormat::new(4, 1, ComponentType::UnsignedInt).with_reversed_channel_order();
        let value = decode_component(&format, &[1, 2, 3, 4]).unwrap();
        assert_eq!(value.as_slice(), &[3.0, 2.0, 1.0, 4.0]);
    }

    #[test]
    fn test_reads_only_leading_bytes() {
        let format = ComponentFormat::new(2, 1, ComponentType::UnsignedInt);
        let value = decode_component(&format, &[7, 8, 9, 10]).unwrap();
        assert_eq!(value.as_slice(), &[7.0, 8.0]);
    }

    #[test]
    fn test_short_buffer() {
        let format = ComponentFormat::new(4, 4, ComponentType::Float);
        assert_eq!(
            decode_component(&format, &[0; 12]),
            Err(DecodeError::BufferTooShort {
                needed: 16,
                available: 12
            })
        );
    }

    #[test]
    fn test_invalid_float_width() {
        let format = ComponentFormat::new(2, 1, ComponentType::Float);
        assert!(matches!(
            decode_component(&format, &[0, 0]),
            Err(DecodeError::InvalidComponentWidth { width: 1, .. })
        ));
    }

    #[test]
    fn test_to_dvec4_pads_with_zero() {
        let value = Components::from_slice(&[1.0, 2.0]);
        assert_eq!(value.to_dvec4(), glam::DVec4::new(1.0, 2.0, 0.0, 0.0));
    }
}
