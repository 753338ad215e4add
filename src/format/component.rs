//! Component types and decoded scalar values.

use std::fmt;

/// Interpretation of one component of a vertex attribute.
///
/// Together with a byte width this determines which [`ScalarValue`] variant
/// a component decodes to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CompType {
    /// IEEE float (16, 32 or 64 bit depending on width)
    #[default]
    Float = 0,
    /// Unsigned integer
    UInt = 1,
    /// Signed integer
    SInt = 2,
    /// Unsigned normalized to `[0, 1]`
    UNorm = 3,
    /// Signed normalized to `[-1, 1]`
    SNorm = 4,
    /// Unsigned integer converted to float
    UScaled = 5,
    /// Signed integer converted to float
    SScaled = 6,
    /// Depth value (float at 32 bit, normalized otherwise)
    Depth = 7,
    /// 64-bit float
    Double = 8,
}

impl CompType {
    /// Returns the name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::UInt => "uint",
            Self::SInt => "sint",
            Self::UNorm => "unorm",
            Self::SNorm => "snorm",
            Self::UScaled => "uscaled",
            Self::SScaled => "sscaled",
            Self::Depth => "depth",
            Self::Double => "double",
        }
    }

    /// Parse a component type from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "float" => Self::Float,
            "uint" => Self::UInt,
            "sint" => Self::SInt,
            "unorm" => Self::UNorm,
            "snorm" => Self::SNorm,
            "uscaled" => Self::UScaled,
            "sscaled" => Self::SScaled,
            "depth" => Self::Depth,
            "double" => Self::Double,
            _ => return None,
        })
    }
}

impl fmt::Display for CompType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One decoded component.
///
/// The variant records the storage the value came from, which drives the
/// cell formatting rules (sign padding for floats and signed ints, optional
/// hex for unsigned ints, plain conversion for 64-bit integers).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalarValue {
    F32(f32),
    F64(f64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
}

impl ScalarValue {
    /// Lossy conversion to `f64`, used for bounds and previews.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::F32(v) => v as f64,
            Self::F64(v) => v,
            Self::U8(v) => v as f64,
            Self::U16(v) => v as f64,
            Self::U32(v) => v as f64,
            Self::U64(v) => v as f64,
            Self::I8(v) => v as f64,
            Self::I16(v) => v as f64,
            Self::I32(v) => v as f64,
            Self::I64(v) => v as f64,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32(v) => write!(f, "{:?}", v),
            Self::F64(v) => write!(f, "{:?}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
        }
    }
}
