//! Error types for mesh export.

use thiserror::Error;
use vertex_stream_decode::DecodeError;

/// Boxed error returned by [`ReplaySource`](crate::ReplaySource) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting a draw.
#[derive(Debug, Error)]
pub enum Error {
    /// The replay source failed to provide data.
    #[error("replay source error: {0}")]
    Source(#[source] BoxError),

    /// Vertex or index data could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The draw's vertex shader has no outputs to export.
    #[error("event {event_id} has no vertex shader outputs")]
    NoOutputs { event_id: u32 },
}
