//! Special (packed or block-compressed) encodings.

use std::fmt;

/// Encoding that overrides the plain per-component layout of an attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpecialFormat {
    #[default]
    None,
    BC1,
    BC2,
    BC3,
    BC4,
    BC5,
    BC6,
    BC7,
    ETC2,
    EAC,
    ASTC,
    R10G10B10A2,
    R11G11B10,
    R5G6B5,
    R5G5B5A1,
    R4G4B4A4,
    R9G9B9E5,
    R4G4,
    D16S8,
    D24S8,
    D32S8,
    S8,
    YUV,
}

impl SpecialFormat {
    /// Number of components (table columns) an attribute with this encoding
    /// expands to. `nominal` is the attribute's declared component count and is
    /// only used by encodings without a fixed layout.
    pub const fn component_count(self, nominal: u32) -> u32 {
        match self {
            Self::BC6 | Self::ETC2 | Self::R11G11B10 | Self::R5G6B5 | Self::R9G9B9E5 => 3,
            Self::BC1
            | Self::BC7
            | Self::BC3
            | Self::BC2
            | Self::R10G10B10A2
            | Self::R5G5B5A1
            | Self::R4G4B4A4
            | Self::ASTC => 4,
            Self::BC5 | Self::R4G4 | Self::D16S8 | Self::D24S8 | Self::D32S8 => 2,
            Self::BC4 | Self::S8 => 1,
            Self::YUV | Self::EAC | Self::None => nominal,
        }
    }

    /// Size in bytes of one element for the bit-packed encodings that can be
    /// decoded per element. `None` for everything read component by component.
    pub const fn packed_size(self) -> Option<usize> {
        match self {
            Self::R10G10B10A2
            | Self::R11G11B10
            | Self::R9G9B9E5
            | Self::D16S8
            | Self::D24S8 => Some(4),
            Self::R5G6B5 | Self::R5G5B5A1 | Self::R4G4B4A4 => Some(2),
            Self::R4G4 | Self::S8 => Some(1),
            Self::D32S8 => Some(8),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BC1 => "bc1",
            Self::BC2 => "bc2",
            Self::BC3 => "bc3",
            Self::BC4 => "bc4",
            Self::BC5 => "bc5",
            Self::BC6 => "bc6",
            Self::BC7 => "bc7",
            Self::ETC2 => "etc2",
            Self::EAC => "eac",
            Self::ASTC => "astc",
            Self::R10G10B10A2 => "r10g10b10a2",
            Self::R11G11B10 => "r11g11b10",
            Self::R5G6B5 => "r5g6b5",
            Self::R5G5B5A1 => "r5g5b5a1",
            Self::R4G4B4A4 => "r4g4b4a4",
            Self::R9G9B9E5 => "r9g9b9e5",
            Self::R4G4 => "r4g4",
            Self::D16S8 => "d16s8",
            Self::D24S8 => "d24s8",
            Self::D32S8 => "d32s8",
            Self::S8 => "s8",
            Self::YUV => "yuv",
        }
    }

    /// Parse a packed encoding name (as used in format declarations).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }

    pub const ALL: [Self; 23] = [
        Self::None,
        Self::BC1,
        Self::BC2,
        Self::BC3,
        Self::BC4,
        Self::BC5,
        Self::BC6,
        Self::BC7,
        Self::ETC2,
        Self::EAC,
        Self::ASTC,
        Self::R10G10B10A2,
        Self::R11G11B10,
        Self::R5G6B5,
        Self::R5G5B5A1,
        Self::R4G4B4A4,
        Self::R9G9B9E5,
        Self::R4G4,
        Self::D16S8,
        Self::D24S8,
        Self::D32S8,
        Self::S8,
        Self::YUV,
    ];
}

impl fmt::Display for SpecialFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_counts_ignore_nominal() {
        for nominal in 1..=4 {
            assert_eq!(SpecialFormat::BC1.component_count(nominal), 4);
            assert_eq!(SpecialFormat::BC4.component_count(nominal), 1);
            assert_eq!(SpecialFormat::BC5.component_count(nominal), 2);
            assert_eq!(SpecialFormat::BC6.component_count(nominal), 3);
        }
    }

    #[test]
    fn test_nominal_passthrough() {
        for nominal in 1..=4 {
            assert_eq!(SpecialFormat::None.component_count(nominal), nominal);
            assert_eq!(SpecialFormat::YUV.component_count(nominal), nominal);
            assert_eq!(SpecialFormat::EAC.component_count(nominal), nominal);
        }
    }

    #[test]
    fn test_count_table() {
        use SpecialFormat::*;
        let three = [BC6, ETC2, R11G11B10, R5G6B5, R9G9B9E5];
        let four = [BC1, BC7, BC3, BC2, R10G10B10A2, R5G5B5A1, R4G4B4A4, ASTC];
        let two = [BC5, R4G4, D16S8, D24S8, D32S8];
        let one = [BC4, S8];
        assert!(three.iter().all(|s| s.component_count(1) == 3));
        assert!(four.iter().all(|s| s.component_count(1) == 4));
        assert!(two.iter().all(|s| s.component_count(4) == 2));
        assert!(one.iter().all(|s| s.component_count(4) == 1));
    }

    #[test]
    fn test_names_roundtrip() {
        for s in SpecialFormat::ALL {
            assert_eq!(SpecialFormat::from_name(s.name()), Some(s));
        }
    }
}
