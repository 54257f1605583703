//! Replay source abstraction.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use vertex_stream_decode::{IndexBufferDescriptor, OutputAttribute};

use crate::error::BoxError;

/// Handle of a GPU resource inside a capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// The absent resource.
    pub const NULL: Self = Self(0);

    #[must_use]
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId::{}", self.0)
    }
}

/// One action in a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawEvent {
    pub event_id: u32,
    pub instance_count: u32,
    /// Marks the end of a render pass. Pass walks stop here.
    pub ends_pass: bool,
}

impl DrawEvent {
    #[must_use]
    pub fn new(event_id: u32, instance_count: u32) -> Self {
        Self {
            event_id,
            instance_count,
            ends_pass: false,
        }
    }

    #[must_use]
    pub fn end_of_pass(event_id: u32) -> Self {
        Self {
            event_id,
            instance_count: 0,
            ends_pass: true,
        }
    }
}

/// Location of the vertex shader outputs of one instance of a draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostVsData {
    pub vertex_resource: ResourceId,
    pub vertex_byte_offset: usize,
    pub vertex_byte_stride: usize,
    /// [`ResourceId::NULL`] for non-indexed draws.
    pub index_resource: ResourceId,
    pub index_byte_offset: usize,
    pub index_byte_stride: u8,
    pub index_count: usize,
    pub base_vertex: i64,
}

impl PostVsData {
    /// Index descriptor for decoding the whole index resource.
    #[must_use]
    pub fn index_descriptor(&self) -> IndexBufferDescriptor {
        IndexBufferDescriptor {
            element_byte_width: self.index_byte_stride,
            byte_offset: self.index_byte_offset,
            index_offset: 0,
            count: self.index_count,
            base_vertex_bias: self.base_vertex,
            source_present: !self.index_resource.is_null(),
        }
    }
}

/// Read access to a replayed capture.
///
/// The draw being inspected is always passed explicitly; implementations
/// are free to move their replay cursor as needed.
pub trait ReplaySource {
    /// Output signature of the vertex shader bound at `event`.
    fn output_signature(&self, event: &DrawEvent) -> Result<Vec<OutputAttribute>, BoxError>;

    /// Post-vertex-shader buffers for one instance of `event`.
    fn post_vs_data(&self, event: &DrawEvent, instance: u32) -> Result<PostVsData, BoxError>;

    /// Read `length` bytes of `resource` starting at `offset`.
    ///
    /// A `length` of zero reads to the end of the resource.
    fn read_bytes(
        &self,
        resource: ResourceId,
        offset: usize,
        length: usize,
    ) -> Result<Vec<u8>, BoxError>;
}

impl<S: ReplaySource + ?Sized> ReplaySource for &S {
    fn output_signature(&self, event: &DrawEvent) -> Result<Vec<OutputAttribute>, BoxError> {
        (**self).output_signature(event)
    }

    fn post_vs_data(&self, event: &DrawEvent, instance: u32) -> Result<PostVsData, BoxError> {
        (**self).post_vs_data(event, instance)
    }

    fn read_bytes(
        &self,
        resource: ResourceId,
        offset: usize,
        length: usize,
    ) -> Result<Vec<u8>, BoxError> {
        (**self).read_bytes(resource, offset, length)
    }
}

/// Errors reported by [`MemorySource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemorySourceError {
    #[error("no output signature for event {0}")]
    UnknownEvent(u32),
    #[error("no post-VS data for event {event_id} instance {instance}")]
    UnknownInstance { event_id: u32, instance: u32 },
    #[error("unknown resource {0}")]
    UnknownResource(ResourceId),
    #[error("offset {offset} is past the end of {resource} ({len} bytes)")]
    OffsetOutOfRange {
        resource: ResourceId,
        offset: usize,
        len: usize,
    },
}

/// In-memory replay source holding canned signatures and buffers.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    signatures: HashMap<u32, Vec<OutputAttribute>>,
    post_vs: HashMap<(u32, u32), PostVsData>,
    buffers: HashMap<ResourceId, Vec<u8>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output signature of `event_id`.
    #[must_use]
    pub fn with_signature(mut self, event_id: u32, signature: Vec<OutputAttribute>) -> Self {
        self.signatures.insert(event_id, signature);
        self
    }

    /// Set the post-VS data of one instance of `event_id`.
    #[must_use]
    pub fn with_post_vs(mut self, event_id: u32, instance: u32, data: PostVsData) -> Self {
        self.post_vs.insert((event_id, instance), data);
        self
    }

    /// Store the contents of `resource`.
    #[must_use]
    pub fn with_buffer(mut self, resource: ResourceId, bytes: Vec<u8>) -> Self {
        self.buffers.insert(resource, bytes);
        self
    }
}

impl ReplaySource for MemorySource {
    fn output_signature(&self, event: &DrawEvent) -> Result<Vec<OutputAttribute>, BoxError> {
        self.signatures
            .get(&event.event_id)
            .cloned()
            .ok_or_else(|| MemorySourceError::UnknownEvent(event.event_id).into())
    }

    fn post_vs_data(&self, event: &DrawEvent, instance: u32) -> Result<PostVsData, BoxError> {
        self.post_vs
            .get(&(event.event_id, instance))
            .copied()
            .ok_or_else(|| {
                MemorySourceError::UnknownInstance {
                    event_id: event.event_id,
                    instance,
                }
                .into()
            })
    }

    fn read_bytes(
        &self,
        resource: ResourceId,
        offset: usize,
        length: usize,
    ) -> Result<Vec<u8>, BoxError> {
        let bytes = self
            .buffers
            .get(&resource)
            .ok_or(MemorySourceError::UnknownResource(resource))?;
        if offset > bytes.len() {
            return Err(MemorySourceError::OffsetOutOfRange {
                resource,
                offset,
                len: bytes.len(),
            }
            .into());
        }
        // Reads past the end are clamped, like the replay tool does.
        let end = if length == 0 {
            bytes.len()
        } else {
            offset.saturating_add(length).min(bytes.len())
        };
        Ok(bytes[offset..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bytes_ranges() {
        let id = ResourceId(7);
        let source = MemorySource::new().with_buffer(id, vec![1, 2, 3, 4, 5]);

        assert_eq!(source.read_bytes(id, 0, 0).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(source.read_bytes(id, 1, 2).unwrap(), vec![2, 3]);
        assert_eq!(source.read_bytes(id, 3, 100).unwrap(), vec![4, 5]);
        assert_eq!(source.read_bytes(id, 5, 0).unwrap(), Vec::<u8>::new());
        assert!(source.read_bytes(id, 6, 0).is_err());
        assert!(source.read_bytes(ResourceId(8), 0, 0).is_err());
    }

    #[test]
    fn test_missing_entries() {
        let source = MemorySource::new();
        let event = DrawEvent::new(3, 1);
        let err = source.output_signature(&event).unwrap_err();
        assert_eq!(err.to_string(), "no output signature for event 3");
        let err = source.post_vs_data(&event, 0).unwrap_err();
        assert_eq!(err.to_string(), "no post-VS data for event 3 instance 0");
    }

    #[test]
    fn test_index_descriptor() {
        let data = PostVsData {
            index_resource: ResourceId(2),
            index_byte_offset: 6,
            index_byte_stride: 2,
            index_count: 9,
            base_vertex: -1,
            ..PostVsData::default()
        };
        let desc = data.index_descriptor();
        assert!(desc.source_present);
        assert_eq!(desc.byte_offset, 6);
        assert_eq!(desc.count, 9);
        assert_eq!(desc.base_vertex_bias, -1);

        let non_indexed = PostVsData::default().index_descriptor();
        assert!(!non_indexed.source_present);
    }
}
