//! Post-vertex-shader output layout.
//!
//! Replay tools store vertex shader outputs interleaved in a single buffer.
//! Given the shader's output signature, this computes where each output
//! lives within a vertex and how to decode it.

use crate::format::{ComponentFormat, ShaderVarType};

/// One entry of a vertex shader's output signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAttribute {
    /// Variable name in the shader source. May be empty.
    pub var_name: String,
    /// Semantic name with index, e.g. `TEXCOORD0`.
    pub semantic_name: String,
    pub var_type: ShaderVarType,
    pub component_count: u8,
    /// Whether this output is the position system value.
    pub is_position: bool,
}

impl OutputAttribute {
    /// Name used for this output: the variable name, else the semantic.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.var_name.is_empty() {
            &self.semantic_name
        } else {
            &self.var_name
        }
    }
}

/// How outputs are packed within one vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputPacking {
    /// Each component takes 4 bytes, or 8 if wider than 4 (Vulkan-style).
    #[default]
    Padded,
    /// Components are tightly packed.
    Tight,
}

impl OutputPacking {
    fn attribute_size(self, format: &ComponentFormat) -> usize {
        let count = usize::from(format.component_count);
        match self {
            Self::Padded if format.component_byte_width > 4 => 8 * count,
            Self::Padded => 4 * count,
            Self::Tight => format.byte_size(),
        }
    }
}

/// Where one output lives and how to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeLayout {
    pub name: String,
    pub format: ComponentFormat,
    /// Byte offset of the attribute within the vertex buffer.
    pub byte_offset: usize,
}

/// Lay out the outputs of a vertex shader.
///
/// The position output is moved to the front (if several outputs claim to be
/// the position, the last one wins). Offsets then accumulate from
/// `vertex_byte_offset` in the resulting order.
#[must_use]
pub fn lay_out_outputs(
    signature: &[OutputAttribute],
    vertex_byte_offset: usize,
    packing: OutputPacking,
) -> Vec<AttributeLayout> {
    lay_out_outputs_ordered(signature, vertex_byte_offset, packing, true)
}

/// Like [`lay_out_outputs`], but the position output only moves to the
/// front when `position_first` is set. Otherwise signature order is kept.
#[must_use]
pub fn lay_out_outputs_ordered(
    signature: &[OutputAttribute],
    vertex_byte_offset: usize,
    packing: OutputPacking,
    position_first: bool,
) -> Vec<AttributeLayout> {
    let mut layouts: Vec<AttributeLayout> = signature
        .iter()
        .map(|attr| AttributeLayout {
            name: attr.display_name().to_string(),
            format: ComponentFormat::for_shader_output(attr.var_type, attr.component_count),
            byte_offset: vertex_byte_offset,
        })
        .collect();

    if let Some(position) = signature
        .iter()
        .rposition(|attr| attr.is_position)
        .filter(|&p| position_first && p > 0)
    {
        let attr = layouts.remove(position);
        layouts.insert(0, attr);
    }

    let mut offset = 0;
    for layout in &mut layouts {
        layout.byte_offset += offset;
        offset += packing.attribute_size(&layout.format);
    }

    layouts
}
