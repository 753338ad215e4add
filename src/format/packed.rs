//! Decoding of one attribute element into typed components.
//!
//! Bit-packed encodings are expanded field by field; everything else is read
//! component by component according to the nominal type and width. All reads
//! are little-endian and bounds-checked: a short slice yields no components.

use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use smallvec::SmallVec;

use super::{CompType, ResourceFormat, ScalarValue, SpecialFormat};

/// Decoded components of one element (at most four for every vertex format).
pub type Components = SmallVec<[ScalarValue; 4]>;

/// Decode the element at the start of `bytes`.
pub fn decode(bytes: &[u8], format: &ResourceFormat) -> Components {
    let needed = format.byte_size();
    if needed == 0 || bytes.len() < needed {
        return Components::new();
    }

    let mut out = match format.special {
        SpecialFormat::R10G10B10A2 => decode_r10g10b10a2(LittleEndian::read_u32(bytes), format.comp_type),
        SpecialFormat::R11G11B10 => decode_r11g11b10(LittleEndian::read_u32(bytes)),
        SpecialFormat::R9G9B9E5 => decode_r9g9b9e5(LittleEndian::read_u32(bytes)),
        SpecialFormat::R5G6B5 => {
            let p = LittleEndian::read_u16(bytes);
            smallvec::smallvec![
                unorm(p & 0x1f, 31),
                unorm((p >> 5) & 0x3f, 63),
                unorm((p >> 11) & 0x1f, 31),
            ]
        }
        SpecialFormat::R5G5B5A1 => {
            let p = LittleEndian::read_u16(bytes);
            smallvec::smallvec![
                unorm(p & 0x1f, 31),
                unorm((p >> 5) & 0x1f, 31),
                unorm((p >> 10) & 0x1f, 31),
                unorm(p >> 15, 1),
            ]
        }
        SpecialFormat::R4G4B4A4 => {
            let p = LittleEndian::read_u16(bytes);
            (0..4).map(|i| unorm((p >> (4 * i)) & 0xf, 15)).collect()
        }
        SpecialFormat::R4G4 => {
            let b = bytes[0] as u16;
            smallvec::smallvec![unorm(b & 0xf, 15), unorm(b >> 4, 15)]
        }
        SpecialFormat::D16S8 => {
            let depth = LittleEndian::read_u16(bytes);
            smallvec::smallvec![unorm(depth, u16::MAX), ScalarValue::U8(bytes[2])]
        }
        SpecialFormat::D24S8 => {
            let v = LittleEndian::read_u32(bytes);
            smallvec::smallvec![
                ScalarValue::F32((v & 0x00ff_ffff) as f32 / 16_777_215.0),
                ScalarValue::U8((v >> 24) as u8),
            ]
        }
        SpecialFormat::D32S8 => {
            let depth = LittleEndian::read_f32(bytes);
            smallvec::smallvec![ScalarValue::F32(depth), ScalarValue::U8(bytes[4])]
        }
        SpecialFormat::S8 => smallvec::smallvec![ScalarValue::U8(bytes[0])],
        // Block and planar encodings have no per-element layout; read them as
        // their nominal components so the user at least sees the raw words.
        _ => decode_components(bytes, format),
    };

    if format.bgra_order && out.len() >= 3 {
        out.swap(0, 2);
    }
    out
}

#[inline]
fn unorm(v: u16, max: u16) -> ScalarValue {
    ScalarValue::F32(v as f32 / max as f32)
}

/// Plain component-wise read. The caller has already checked the length.
fn decode_components(bytes: &[u8], format: &ResourceFormat) -> Components {
    let width = format.comp_byte_width as usize;
    let mut out = Components::new();

    for chunk in bytes.chunks_exact(width.max(1)).take(format.comp_count as usize) {
        match read_component(chunk, format.comp_type) {
            Some(v) => out.push(v),
            // Unsupported width for this type: nothing sensible to show.
            None => return Components::new(),
        }
    }
    out
}

fn read_component(b: &[u8], ty: CompType) -> Option<ScalarValue> {
    use ScalarValue::*;

    let v = match (ty, b.len()) {
        (CompType::Float, 2) => F32(f16::from_bits(LittleEndian::read_u16(b)).to_f32()),
        (CompType::Float, 4) => F32(LittleEndian::read_f32(b)),
        (CompType::Float | CompType::Double, 8) => F64(LittleEndian::read_f64(b)),
        (CompType::Double, 4) => F64(LittleEndian::read_f32(b) as f64),

        (CompType::UInt, 1) => U8(b[0]),
        (CompType::UInt, 2) => U16(LittleEndian::read_u16(b)),
        (CompType::UInt, 4) => U32(LittleEndian::read_u32(b)),
        (CompType::UInt, 8) => U64(LittleEndian::read_u64(b)),

        (CompType::SInt, 1) => I8(b[0] as i8),
        (CompType::SInt, 2) => I16(LittleEndian::read_i16(b)),
        (CompType::SInt, 4) => I32(LittleEndian::read_i32(b)),
        (CompType::SInt, 8) => I64(LittleEndian::read_i64(b)),

        (CompType::UNorm, 1) => F32(b[0] as f32 / u8::MAX as f32),
        (CompType::UNorm, 2) => F32(LittleEndian::read_u16(b) as f32 / u16::MAX as f32),
        (CompType::UNorm, 4) => F32((LittleEndian::read_u32(b) as f64 / u32::MAX as f64) as f32),

        (CompType::SNorm, 1) => F32((b[0] as i8 as f32 / i8::MAX as f32).max(-1.0)),
        (CompType::SNorm, 2) => F32((LittleEndian::read_i16(b) as f32 / i16::MAX as f32).max(-1.0)),
        (CompType::SNorm, 4) => {
            F32(((LittleEndian::read_i32(b) as f64 / i32::MAX as f64) as f32).max(-1.0))
        }

        (CompType::UScaled, 1) => F32(b[0] as f32),
        (CompType::UScaled, 2) => F32(LittleEndian::read_u16(b) as f32),
        (CompType::UScaled, 4) => F32(LittleEndian::read_u32(b) as f32),

        (CompType::SScaled, 1) => F32(b[0] as i8 as f32),
        (CompType::SScaled, 2) => F32(LittleEndian::read_i16(b) as f32),
        (CompType::SScaled, 4) => F32(LittleEndian::read_i32(b) as f32),

        (CompType::Depth, 1) => F32(b[0] as f32 / u8::MAX as f32),
        (CompType::Depth, 2) => F32(LittleEndian::read_u16(b) as f32 / u16::MAX as f32),
        (CompType::Depth, 3) => F32(LittleEndian::read_u24(b) as f32 / 16_777_215.0),
        (CompType::Depth, 4) => F32(LittleEndian::read_f32(b)),
        (CompType::Depth, 8) => F64(LittleEndian::read_f64(b)),

        _ => return None,
    };
    Some(v)
}

fn decode_r10g10b10a2(v: u32, ty: CompType) -> Components {
    let fields = [v & 0x3ff, (v >> 10) & 0x3ff, (v >> 20) & 0x3ff, v >> 30];

    match ty {
        CompType::UInt => fields.iter().map(|&f| ScalarValue::U32(f)).collect(),
        CompType::UScaled => fields.iter().map(|&f| ScalarValue::F32(f as f32)).collect(),
        CompType::SInt | CompType::SScaled | CompType::SNorm => {
            let signed = [
                sign_extend(fields[0], 10),
                sign_extend(fields[1], 10),
                sign_extend(fields[2], 10),
                sign_extend(fields[3], 2),
            ];
            match ty {
                CompType::SInt => signed.iter().map(|&s| ScalarValue::I32(s)).collect(),
                CompType::SScaled => signed.iter().map(|&s| ScalarValue::F32(s as f32)).collect(),
                _ => signed
                    .iter()
                    .enumerate()
                    .map(|(i, &s)| {
                        let max = if i == 3 { 1.0 } else { 511.0 };
                        ScalarValue::F32((s as f32 / max).max(-1.0))
                    })
                    .collect(),
            }
        }
        _ => smallvec::smallvec![
            ScalarValue::F32(fields[0] as f32 / 1023.0),
            ScalarValue::F32(fields[1] as f32 / 1023.0),
            ScalarValue::F32(fields[2] as f32 / 1023.0),
            ScalarValue::F32(fields[3] as f32 / 3.0),
        ],
    }
}

#[inline]
fn sign_extend(v: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((v << shift) as i32) >> shift
}

fn decode_r11g11b10(v: u32) -> Components {
    smallvec::smallvec![
        ScalarValue::F32(small_float(v & 0x7ff, 6)),
        ScalarValue::F32(small_float((v >> 11) & 0x7ff, 6)),
        ScalarValue::F32(small_float(v >> 22, 5)),
    ]
}

/// Unsigned float with a 5-bit exponent (bias 15) and `mantissa_bits` mantissa.
fn small_float(bits: u32, mantissa_bits: u32) -> f32 {
    let exponent = (bits >> mantissa_bits) as i32;
    let mantissa = (bits & ((1 << mantissa_bits) - 1)) as f32;
    let scale = (1u32 << mantissa_bits) as f32;

    match exponent {
        0 => (mantissa / scale) * 2f32.powi(-14),
        31 if mantissa == 0.0 => f32::INFINITY,
        31 => f32::NAN,
        e => (1.0 + mantissa / scale) * 2f32.powi(e - 15),
    }
}

fn decode_r9g9b9e5(v: u32) -> Components {
    let exponent = (v >> 27) as i32;
    let scale = 2f32.powi(exponent - 15 - 9);
    smallvec::smallvec![
        ScalarValue::F32((v & 0x1ff) as f32 * scale),
        ScalarValue::F32(((v >> 9) & 0x1ff) as f32 * scale),
        ScalarValue::F32(((v >> 18) & 0x1ff) as f32 * scale),
    ]
}
