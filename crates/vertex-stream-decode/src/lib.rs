//! Decode vertex attribute and index streams captured after the vertex shader.
//!
//! Frame debuggers expose post-vertex-shader data as raw byte buffers plus a
//! per-attribute format description. This crate turns those bytes back into
//! numbers. All functions are pure and synchronous: the caller owns the
//! buffers and decides how to parallelize across draws or attributes.
//!
//! # Key functions
//!
//! - [`decode_component`]: Decode one attribute value according to a [`ComponentFormat`]
//! - [`decode_index_sequence`]: Reconstruct the ordered, biased index list of a draw
//! - [`lay_out_outputs`]: Compute per-attribute offsets of vertex shader outputs

mod error;

pub mod component;
pub mod format;
pub mod indices;
pub mod layout;

pub use component::{Components, decode_component};
pub use error::{DecodeError, DecodeResult};
pub use format::{ComponentFormat, ComponentType, ShaderVarType};
pub use indices::{IndexBufferDescriptor, decode_index_sequence};
pub use layout::{
    AttributeLayout, OutputAttribute, OutputPacking, lay_out_outputs, lay_out_outputs_ordered,
};

/// Maximum number of scalar components in one attribute.
pub const MAX_COMPONENTS: usize = 4;
