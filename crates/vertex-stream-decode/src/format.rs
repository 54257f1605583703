//! Component format descriptions.
//!
//! A [`ComponentFormat`] describes how one vertex attribute is laid out in a
//! buffer: how many scalars, how wide each scalar is, and how the bits of a
//! scalar are interpreted.

use std::fmt;
use std::str::FromStr;

use crate::MAX_COMPONENTS;
use crate::error::{DecodeError, DecodeResult};

/// How the bits of a single scalar component are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    UnsignedInt,
    SignedInt,
    Float,
    /// Unsigned integer normalized to `[0, 1]`.
    UNorm,
    /// Signed integer normalized to `[-1, 1]`.
    SNorm,
    /// Unsigned integer converted to float without normalization.
    UScaled,
    /// Signed integer converted to float without normalization.
    SScaled,
}

impl ComponentType {
    /// Whether the raw bits are read as a two's-complement integer.
    #[must_use]
    pub fn is_signed(self) -> bool {
        matches!(self, Self::SignedInt | Self::SNorm | Self::SScaled)
    }

    /// Whether scalars of this type may be `width` bytes wide.
    #[must_use]
    pub fn supports_width(self, width: u8) -> bool {
        match self {
            Self::Float => matches!(width, 2 | 4 | 8),
            _ => matches!(width, 1 | 2 | 4 | 8),
        }
    }
}

/// Binary layout of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentFormat {
    /// Number of scalar components (1-4).
    pub component_count: u8,
    /// Bytes per scalar component. Meaningless for packed formats.
    pub component_byte_width: u8,
    pub component_type: ComponentType,
    /// Bit-field layouts such as 10:10:10:2. These cannot be decoded.
    pub packed: bool,
    /// BGRA-style layout: components 0 and 2 are swapped after decoding.
    pub reversed_channel_order: bool,
}

impl ComponentFormat {
    /// A regular (non-packed, RGBA-ordered) format.
    #[must_use]
    pub fn new(component_count: u8, component_byte_width: u8, component_type: ComponentType) -> Self {
        Self {
            component_count,
            component_byte_width,
            component_type,
            packed: false,
            reversed_channel_order: false,
        }
    }

    /// A bit-packed format with `component_count` channels.
    #[must_use]
    pub fn packed(component_count: u8, component_type: ComponentType) -> Self {
        Self {
            packed: true,
            ..Self::new(component_count, 0, component_type)
        }
    }

    /// The same format with BGRA channel order.
    #[must_use]
    pub fn with_reversed_channel_order(mut self) -> Self {
        self.reversed_channel_order = true;
        self
    }

    /// Format of a vertex shader output of `var_type` with `component_count` components.
    #[must_use]
    pub fn for_shader_output(var_type: ShaderVarType, component_count: u8) -> Self {
        Self::new(component_count, var_type.byte_size(), var_type.component_type())
    }

    /// Number of bytes one value of this format occupies.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        usize::from(self.component_count) * usize::from(self.component_byte_width)
    }

    /// Check that this format can be decoded.
    ///
    /// Packed formats are rejected before anything else is looked at.
    pub fn validate(&self) -> DecodeResult<()> {
        if self.packed {
            return Err(DecodeError::UnsupportedFormat);
        }
        if self.component_count == 0 || usize::from(self.component_count) > MAX_COMPONENTS {
            return Err(DecodeError::InvalidComponentCount(self.component_count));
        }
        if !self.component_type.supports_width(self.component_byte_width) {
            return Err(DecodeError::InvalidComponentWidth {
                component_type: self.component_type,
                width: self.component_byte_width,
            });
        }
        if self.reversed_channel_order && self.component_count != 4 {
            return Err(DecodeError::ReversedChannelCount(self.component_count));
        }
        Ok(())
    }
}

impl fmt::Display for ComponentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.packed {
            return write!(f, "packed {:?}x{}", self.component_type, self.component_count);
        }
        write!(
            f,
            "{:?}x{} @ {} bytes",
            self.component_type, self.component_count, self.component_byte_width
        )?;
        if self.reversed_channel_order {
            f.write_str(" (BGRA)")?;
        }
        Ok(())
    }
}

/// Parse a Vulkan-style format name such as `R8G8B8A8_UNORM`.
///
/// A leading `VK_FORMAT_` is accepted. Channels with mixed or non-byte bit
/// widths, and names ending in `_PACKnn`, produce a packed format.
impl FromStr for ComponentFormat {
    type Err = DecodeError;

    fn from_str(name: &str) -> DecodeResult<Self> {
        let unknown = || DecodeError::UnknownFormat(name.to_string());

        let stripped = name.strip_prefix("VK_FORMAT_").unwrap_or(name);
        let mut parts = stripped.split('_');
        let channel_part = parts.next().ok_or_else(unknown)?;
        let type_part = parts.next().ok_or_else(unknown)?;
        let pack_suffix = match parts.next() {
            None => false,
            Some(p) if p.starts_with("PACK") => true,
            Some(_) => return Err(unknown()),
        };
        if parts.next().is_some() {
            return Err(unknown());
        }

        let component_type = match type_part {
            "UINT" => ComponentType::UnsignedInt,
            "SINT" => ComponentType::SignedInt,
            "FLOAT" | "SFLOAT" | "UFLOAT" => ComponentType::Float,
            // Raw values only; no transfer function is applied.
            "UNORM" | "SRGB" => ComponentType::UNorm,
            "SNORM" => ComponentType::SNorm,
            "USCALED" => ComponentType::UScaled,
            "SSCALED" => ComponentType::SScaled,
            _ => return Err(unknown()),
        };

        let channels = parse_channels(channel_part).ok_or_else(unknown)?;
        #[allow(clippy::cast_possible_truncation)]
        let count = channels.len() as u8;

        let first_bits = channels[0].1;
        let uniform = channels.iter().all(|&(_, bits)| bits == first_bits);
        if pack_suffix || !uniform || first_bits % 8 != 0 || first_bits / 8 > 8 {
            return Ok(Self::packed(count, component_type));
        }

        #[allow(clippy::cast_possible_truncation)]
        let mut format = Self::new(count, (first_bits / 8) as u8, component_type);
        let letters: String = channels.iter().map(|&(c, _)| c).collect();
        if letters == "BGRA" {
            format.reversed_channel_order = true;
        }
        Ok(format)
    }
}

/// Split `R8G8B8A8` into `[('R', 8), ('G', 8), ...]`.
fn parse_channels(s: &str) -> Option<Vec<(char, u32)>> {
    let mut channels = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(letter) = chars.next() {
        if !matches!(letter, 'R' | 'G' | 'B' | 'A' | 'X') {
            return None;
        }
        let mut bits = 0u32;
        let mut digits = 0;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            bits = bits.checked_mul(10)?.checked_add(d)?;
            digits += 1;
            chars.next();
        }
        if digits == 0 || bits == 0 {
            return None;
        }
        channels.push((letter, bits));
    }

    if channels.is_empty() || channels.len() > MAX_COMPONENTS {
        return None;
    }
    Some(channels)
}

/// Scalar type of a shader variable, as reported by shader reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderVarType {
    Float,
    Double,
    Half,
    SInt,
    UInt,
    SShort,
    UShort,
    SLong,
    ULong,
    SByte,
    UByte,
    Bool,
}

impl ShaderVarType {
    /// Bytes per scalar of this type.
    #[must_use]
    pub fn byte_size(self) -> u8 {
        match self {
            Self::Double | Self::SLong | Self::ULong => 8,
            Self::Float | Self::SInt | Self::UInt | Self::Bool => 4,
            Self::Half | Self::SShort | Self::UShort => 2,
            Self::SByte | Self::UByte => 1,
        }
    }

    /// Component type used when decoding values of this type.
    #[must_use]
    pub fn component_type(self) -> ComponentType {
        match self {
            Self::Double | Self::Float | Self::Half => ComponentType::Float,
            Self::SInt | Self::SShort | Self::SLong | Self::SByte => ComponentType::SignedInt,
            Self::UInt | Self::UShort | Self::ULong | Self::UByte | Self::Bool => {
                ComponentType::UnsignedInt
            }
        }
    }
}
