//! Per-draw export of post-vertex-shader data.

use vertex_stream_decode::{
    AttributeLayout, OutputPacking, decode_component, decode_index_sequence,
    lay_out_outputs_ordered,
};

use crate::error::{Error, Result};
use crate::source::{DrawEvent, ReplaySource};
use crate::table::{Column, MeshRow, MeshTable};

/// Options controlling how draws are exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// How vertex shader outputs are packed in the post-VS buffer.
    pub packing: OutputPacking,
    /// Move the position output to the first column.
    pub position_first: bool,
    /// Export at most this many instances per draw.
    pub max_instances: Option<u32>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            packing: OutputPacking::default(),
            position_first: true,
            max_instances: None,
        }
    }
}

/// Decodes post-vertex-shader data fetched from a [`ReplaySource`].
#[derive(Debug, Clone)]
pub struct Exporter<S> {
    source: S,
    options: ExportOptions,
}

impl<S: ReplaySource> Exporter<S> {
    /// Create an exporter with default options.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_options(source, ExportOptions::default())
    }

    #[must_use]
    pub fn with_options(source: S, options: ExportOptions) -> Self {
        Self { source, options }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export one instance of a draw.
    ///
    /// Rows follow the index sequence of the draw: row `i` holds the vertex
    /// referenced by the `i`-th index, decoded for every output.
    pub fn export_instance(&self, event: &DrawEvent, instance: u32) -> Result<MeshTable> {
        let signature = self
            .source
            .output_signature(event)
            .map_err(Error::Source)?;
        let post_vs = self
            .source
            .post_vs_data(event, instance)
            .map_err(Error::Source)?;

        let layouts = lay_out_outputs_ordered(
            &signature,
            post_vs.vertex_byte_offset,
            self.options.packing,
            self.options.position_first,
        );
        if layouts.is_empty() {
            return Err(Error::NoOutputs {
                event_id: event.event_id,
            });
        }

        let index_buffer = if post_vs.index_resource.is_null() {
            None
        } else {
            Some(
                self.source
                    .read_bytes(post_vs.index_resource, 0, 0)
                    .map_err(Error::Source)?,
            )
        };
        let indices = decode_index_sequence(&post_vs.index_descriptor(), index_buffer.as_deref())?;

        let vertex_buffers = layouts
            .iter()
            .map(|layout| {
                tracing::debug!(
                    "event {} output '{}': {} at offset {}, stride {}",
                    event.event_id,
                    layout.name,
                    layout.format,
                    layout.byte_offset,
                    post_vs.vertex_byte_stride
                );
                self.source
                    .read_bytes(post_vs.vertex_resource, layout.byte_offset, 0)
                    .map_err(Error::Source)
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = indices
            .iter()
            .enumerate()
            .map(|(vertex, &index)| -> Result<MeshRow> {
                let offset = vertex_offset(index, post_vs.vertex_byte_stride);
                let values = layouts
                    .iter()
                    .zip(&vertex_buffers)
                    .map(|(layout, buffer)| {
                        let data = buffer.get(offset..).unwrap_or_default();
                        decode_component(&layout.format, data)
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(MeshRow {
                    vertex,
                    index,
                    values,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Exported event {} instance {}: {} outputs, {} vertices",
            event.event_id,
            instance,
            layouts.len(),
            rows.len()
        );

        Ok(MeshTable {
            event_id: event.event_id,
            instance,
            columns: layouts.into_iter().map(column_from_layout).collect(),
            rows,
        })
    }

    /// Export every instance of a draw, in instance order.
    pub fn export_draw(&self, event: &DrawEvent) -> Result<Vec<MeshTable>> {
        let count = match self.options.max_instances {
            Some(max) if max < event.instance_count => {
                tracing::warn!(
                    "event {} has {} instances, exporting the first {}",
                    event.event_id,
                    event.instance_count,
                    max
                );
                max
            }
            _ => event.instance_count,
        };

        (0..count)
            .map(|instance| self.export_instance(event, instance))
            .collect()
    }

    /// Export draws in order until the first event that ends the pass.
    ///
    /// The end-of-pass event itself is not exported.
    pub fn export_pass<'a, I>(&self, events: I) -> Result<Vec<MeshTable>>
    where
        I: IntoIterator<Item = &'a DrawEvent>,
    {
        let mut tables = Vec::new();
        for event in events.into_iter().take_while(|event| !event.ends_pass) {
            tables.extend(self.export_draw(event)?);
        }
        tracing::info!("Exported {} mesh tables", tables.len());
        Ok(tables)
    }
}

fn column_from_layout(layout: AttributeLayout) -> Column {
    Column {
        name: layout.name,
        format: layout.format,
    }
}

/// Byte offset of vertex `index`. Indices that do not fit in memory map
/// past the end of any buffer.
fn vertex_offset(index: u64, stride: usize) -> usize {
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_mul(stride))
        .unwrap_or(usize::MAX)
}
