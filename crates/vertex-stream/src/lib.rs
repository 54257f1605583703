//! Export post-vertex-shader mesh data from a frame replay source.
//!
//! The replay tool itself (selecting draws, fetching buffers) sits behind the
//! [`ReplaySource`] trait. [`Exporter`] asks it for each draw's output
//! signature and buffers, decodes them with `vertex-stream-decode`, and
//! produces one [`MeshTable`] per instance.
//!
//! # Example
//!
//! ```ignore
//! use vertex_stream::{DrawEvent, Exporter, MemorySource};
//!
//! fn dump(source: MemorySource, events: &[DrawEvent]) -> Result<(), Box<dyn std::error::Error>> {
//!     let exporter = Exporter::new(source);
//!     for table in exporter.export_pass(events)? {
//!         table.write_delimited(std::io::stdout().lock(), vertex_stream::DEFAULT_DELIMITER)?;
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod export;
mod source;
mod table;

pub use error::{BoxError, Error, Result};
pub use export::{ExportOptions, Exporter};
pub use source::{DrawEvent, MemorySource, MemorySourceError, PostVsData, ReplaySource, ResourceId};
pub use table::{Column, MeshRow, MeshTable};

pub use vertex_stream_decode as decode;

/// Separator used between values in delimited output.
pub const DEFAULT_DELIMITER: &str = ", ";
