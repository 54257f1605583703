//! Index buffer decoding.

use crate::error::{DecodeError, DecodeResult};

/// How to rebuild the ordered index list of one draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexBufferDescriptor {
    /// Bytes per index: 1, 2 or 4.
    pub element_byte_width: u8,
    /// Byte offset of the index data within the buffer.
    pub byte_offset: usize,
    /// Number of indices to skip before decoding.
    pub index_offset: usize,
    /// Number of indices to produce.
    pub count: usize,
    /// Added to every index read from the buffer.
    pub base_vertex_bias: i64,
    /// Whether the draw has an index buffer at all.
    pub source_present: bool,
}

impl IndexBufferDescriptor {
    /// Descriptor for a non-indexed draw of `count` vertices.
    #[must_use]
    pub fn non_indexed(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }
}

/// Decode the index sequence described by `desc`.
///
/// Without an index buffer the result is `0..count` and the base vertex is
/// not applied. With one, `count` little-endian indices are read starting
/// at `byte_offset + index_offset * width` and biased by the base vertex.
/// Buffer order is preserved.
pub fn decode_index_sequence(
    desc: &IndexBufferDescriptor,
    buffer: Option<&[u8]>,
) -> DecodeResult<Vec<u64>> {
    if !desc.source_present {
        return Ok((0..desc.count as u64).collect());
    }

    let width = usize::from(desc.element_byte_width);
    if !matches!(width, 1 | 2 | 4) {
        return Err(DecodeError::InvalidIndexWidth(desc.element_byte_width));
    }

    let buffer = buffer.unwrap_or_default();
    let too_short = |needed| DecodeError::BufferTooShort {
        needed,
        available: buffer.len(),
    };
    // Ranges that overflow cannot fit in any buffer.
    let start = desc
        .index_offset
        .checked_mul(width)
        .and_then(|skip| desc.byte_offset.checked_add(skip))
        .ok_or(too_short(usize::MAX))?;
    let needed = desc
        .count
        .checked_mul(width)
        .and_then(|len| start.checked_add(len))
        .ok_or(too_short(usize::MAX))?;
    let bytes = buffer.get(start..needed).ok_or(too_short(needed))?;

    bytes
        .chunks_exact(width)
        .map(|chunk| {
            let raw = chunk
                .iter()
                .rev()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
            apply_bias(raw, desc.base_vertex_bias)
        })
        .collect()
}

fn apply_bias(raw: u64, bias: i64) -> DecodeResult<u64> {
    raw.checked_add_signed(bias)
        .ok_or(DecodeError::NegativeIndex { raw, bias })
}
