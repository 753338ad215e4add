//! Attribute layout: where one interleaved attribute lives and how it is stored.

use super::{packed, CompType, Components, SpecialFormat};
use std::fmt;

/// Storage format of one attribute element.
///
/// For plain formats an element is `comp_count` components of
/// `comp_byte_width` bytes each. A non-`None` `special` overrides both the
/// byte size and the number of components the element expands to.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceFormat {
    pub comp_type: CompType,
    /// Declared component count (1..=4)
    pub comp_count: u8,
    /// Bytes per component (1, 2, 4 or 8)
    pub comp_byte_width: u8,
    pub special: SpecialFormat,
    /// Packed colour stored blue-first; swaps x and z after decoding.
    pub bgra_order: bool,
}

impl ResourceFormat {
    #[inline]
    pub const fn new(comp_type: CompType, comp_count: u8, comp_byte_width: u8) -> Self {
        Self {
            comp_type,
            comp_count,
            comp_byte_width,
            special: SpecialFormat::None,
            bgra_order: false,
        }
    }

    /// A packed encoding; the component type selects int vs normalized output
    /// where the encoding allows both.
    #[inline]
    pub const fn packed(special: SpecialFormat, comp_type: CompType) -> Self {
        Self {
            comp_type,
            comp_count: special.component_count(1) as u8,
            comp_byte_width: 1,
            special,
            bgra_order: false,
        }
    }

    #[inline]
    pub const fn with_bgra(mut self) -> Self {
        self.bgra_order = true;
        self
    }

    /// Number of table columns one element expands to.
    #[inline]
    pub const fn component_count(&self) -> u32 {
        self.special.component_count(self.comp_count as u32)
    }

    /// Bytes occupied by one element.
    #[inline]
    pub const fn byte_size(&self) -> usize {
        match self.special.packed_size() {
            Some(size) => size,
            None => self.comp_count as usize * self.comp_byte_width as usize,
        }
    }

    // === Common predefined formats ===

    pub const FLOAT: Self = Self::new(CompType::Float, 1, 4);
    pub const FLOAT2: Self = Self::new(CompType::Float, 2, 4);
    pub const FLOAT3: Self = Self::new(CompType::Float, 3, 4);
    pub const FLOAT4: Self = Self::new(CompType::Float, 4, 4);
    pub const HALF2: Self = Self::new(CompType::Float, 2, 2);
    pub const HALF4: Self = Self::new(CompType::Float, 4, 2);
    pub const DOUBLE: Self = Self::new(CompType::Double, 1, 8);
    pub const UINT: Self = Self::new(CompType::UInt, 1, 4);
    pub const INT: Self = Self::new(CompType::SInt, 1, 4);
    pub const UBYTE4: Self = Self::new(CompType::UInt, 4, 1);
    pub const UNORM_BYTE4: Self = Self::new(CompType::UNorm, 4, 1);
    pub const SNORM_SHORT2: Self = Self::new(CompType::SNorm, 2, 2);
}

impl Default for ResourceFormat {
    fn default() -> Self {
        Self::FLOAT4
    }
}

impl fmt::Debug for ResourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.special == SpecialFormat::None {
            write!(f, "{}{}x{}", self.comp_type, self.comp_byte_width * 8, self.comp_count)
        } else {
            write!(f, "{}({})", self.special, self.comp_type)
        }
    }
}

/// One interleaved vertex attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeLayout {
    pub name: String,
    /// Index into the owning table's buffer list
    pub buffer: usize,
    /// Byte offset inside one stride unit
    pub offset: u32,
    pub format: ResourceFormat,
    pub per_instance: bool,
    /// Instances per step for per-instance data
    pub instance_rate: u32,
    /// Show unsigned components in hexadecimal
    pub hex: bool,
}

impl AttributeLayout {
    pub fn new(name: impl Into<String>, format: ResourceFormat) -> Self {
        Self {
            name: name.into(),
            buffer: 0,
            offset: 0,
            format,
            per_instance: false,
            instance_rate: 1,
            hex: false,
        }
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Step once every `rate` instances instead of once per vertex.
    pub fn per_instance(mut self, rate: u32) -> Self {
        self.per_instance = true;
        self.instance_rate = rate;
        self
    }

    pub fn with_hex(mut self, hex: bool) -> Self {
        self.hex = hex;
        self
    }

    #[inline]
    pub fn component_count(&self) -> u32 {
        self.format.component_count()
    }

    #[inline]
    pub fn byte_size(&self) -> usize {
        self.format.byte_size()
    }

    /// Element index to read for per-instance stepping. A zero rate is
    /// malformed and pins the attribute to instance 0.
    #[inline]
    pub fn instance_index(&self, cur_instance: u32) -> u32 {
        if self.instance_rate > 0 {
            cur_instance / self.instance_rate
        } else {
            0
        }
    }

    /// Decode one element starting at `bytes[0]`. `bytes` extends to the end of
    /// the buffer; fewer bytes than the element needs yields no components.
    #[inline]
    pub fn decode(&self, bytes: &[u8]) -> Components {
        packed::decode(bytes, &self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_sizes() {
        assert_eq!(ResourceFormat::FLOAT3.byte_size(), 12);
        assert_eq!(ResourceFormat::HALF2.byte_size(), 4);
        assert_eq!(ResourceFormat::UNORM_BYTE4.byte_size(), 4);
        assert_eq!(ResourceFormat::DOUBLE.byte_size(), 8);
        let packed = ResourceFormat::packed(SpecialFormat::R5G6B5, CompType::UNorm);
        assert_eq!(packed.byte_size(), 2);
        assert_eq!(packed.component_count(), 3);
    }

    #[test]
    fn test_instance_index() {
        let a = AttributeLayout::new("inst", ResourceFormat::FLOAT4).per_instance(3);
        assert_eq!(a.instance_index(0), 0);
        assert_eq!(a.instance_index(5), 1);
        assert_eq!(a.instance_index(9), 3);

        let broken = AttributeLayout::new("inst", ResourceFormat::FLOAT4).per_instance(0);
        assert_eq!(broken.instance_index(7), 0);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", ResourceFormat::FLOAT3), "float32x3");
        let packed = ResourceFormat::packed(SpecialFormat::R10G10B10A2, CompType::UNorm);
        assert_eq!(format!("{:?}", packed), "r10g10b10a2(unorm)");
    }
}
