use thiserror::Error;

use crate::ComponentType;

/// Errors produced while decoding vertex or index data.
///
/// Every variant is permanent for the attribute or draw that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("packed component formats are not supported")]
    UnsupportedFormat,

    #[error("buffer too short: needed {needed} bytes, {available} available")]
    BufferTooShort { needed: usize, available: usize },

    #[error("{width}-byte components are not valid for {component_type:?}")]
    InvalidComponentWidth {
        component_type: ComponentType,
        width: u8,
    },

    #[error("component count must be between 1 and 4, got {0}")]
    InvalidComponentCount(u8),

    #[error("reversed channel order needs 4 components, got {0}")]
    ReversedChannelCount(u8),

    #[error("index elements must be 1, 2 or 4 bytes wide, got {0}")]
    InvalidIndexWidth(u8),

    #[error("index {raw} with base vertex {bias} is negative")]
    NegativeIndex { raw: u64, bias: i64 },

    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

pub type DecodeResult<T> = Result<T, DecodeError>;
