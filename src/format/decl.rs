//! Compact attribute declaration syntax.
//!
//! ```text
//! float3 position; unormb4 colour
//! hex uint flags; r10g10b10a2 normal;
//! ```
//!
//! Entries are separated by `;` or newlines. Each is an optional `hex`
//! modifier, a type with an optional component count (1..=4) and a name.
//! Attributes are packed back to back in buffer 0.

use super::{AttributeLayout, CompType, FormatParser, ResourceFormat, SpecialFormat};

/// Parser for the declaration syntax above.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclParser;

/// Base type keyword → (component type, byte width, shown as hex)
fn base_type(name: &str) -> Option<(CompType, u8, bool)> {
    Some(match name {
        "float" => (CompType::Float, 4, false),
        "half" => (CompType::Float, 2, false),
        "double" => (CompType::Double, 8, false),
        "int" => (CompType::SInt, 4, false),
        "uint" => (CompType::UInt, 4, false),
        "xint" => (CompType::UInt, 4, true),
        "short" => (CompType::SInt, 2, false),
        "ushort" => (CompType::UInt, 2, false),
        "xshort" => (CompType::UInt, 2, true),
        "byte" => (CompType::SInt, 1, false),
        "ubyte" => (CompType::UInt, 1, false),
        "xbyte" => (CompType::UInt, 1, true),
        "unormb" => (CompType::UNorm, 1, false),
        "unormh" => (CompType::UNorm, 2, false),
        "snormb" => (CompType::SNorm, 1, false),
        "snormh" => (CompType::SNorm, 2, false),
        _ => return None,
    })
}

fn parse_type(token: &str) -> Result<(ResourceFormat, bool), String> {
    if let Some(special) = SpecialFormat::from_name(token).filter(|s| s.packed_size().is_some()) {
        let comp_type = match special {
            SpecialFormat::R11G11B10 | SpecialFormat::R9G9B9E5 => CompType::Float,
            SpecialFormat::S8 => CompType::UInt,
            _ => CompType::UNorm,
        };
        return Ok((ResourceFormat::packed(special, comp_type), false));
    }

    let split = token
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(token.len());
    let (base, digits) = token.split_at(split);

    let (comp_type, width, hex) =
        base_type(base).ok_or_else(|| format!("unknown type '{}'", token))?;

    let count = if digits.is_empty() {
        1
    } else {
        match digits.parse::<u8>() {
            Ok(n @ 1..=4) => n,
            _ => return Err(format!("invalid component count in '{}'", token)),
        }
    };

    Ok((ResourceFormat::new(comp_type, count, width), hex))
}

impl FormatParser for DeclParser {
    fn parse(&self, text: &str) -> (Vec<AttributeLayout>, Vec<String>) {
        let mut attrs = Vec::new();
        let mut errors = Vec::new();
        let mut offset = 0u32;

        for (line_no, line) in text.lines().enumerate() {
            for entry in line.split(';') {
                let mut tokens = entry.split_whitespace().peekable();
                if tokens.peek().is_none() {
                    continue;
                }

                let mut hex = false;
                if tokens.peek() == Some(&"hex") {
                    hex = true;
                    tokens.next();
                }

                let Some(type_token) = tokens.next() else {
                    errors.push(format!("line {}: missing type", line_no + 1));
                    continue;
                };
                let Some(name) = tokens.next() else {
                    errors.push(format!("line {}: missing name after '{}'", line_no + 1, type_token));
                    continue;
                };
                if let Some(extra) = tokens.next() {
                    errors.push(format!("line {}: unexpected '{}'", line_no + 1, extra));
                    continue;
                }

                match parse_type(&type_token.to_ascii_lowercase()) {
                    Ok((format, type_hex)) => {
                        let attr = AttributeLayout::new(name, format)
                            .with_offset(offset)
                            .with_hex(hex || type_hex);
                        offset += format.byte_size() as u32;
                        attrs.push(attr);
                    }
                    Err(e) => errors.push(format!("line {}: {}", line_no + 1, e)),
                }
            }
        }

        (attrs, errors)
    }
}
