//! Display formatting of decoded components.
//!
//! Floats and signed integers without a minus sign get one leading space so
//! columns of mixed-sign values line up. Positive and negative zero collapse
//! to the same text.

use serde::{Deserialize, Serialize};

use crate::format::ScalarValue;

/// How floating point numerals are written.
///
/// The default (`max_figures: None`) is the shortest text that round-trips to
/// the same value, e.g. `1.0`, `1.2345e-20`, `123456.79`. With
/// `max_figures` set, magnitudes inside the cut-offs are written in fixed
/// notation with that many decimals (trailing zeros trimmed), the rest in
/// scientific notation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub max_figures: Option<u8>,
    pub exponential_neg_cutoff: f64,
    pub exponential_pos_cutoff: f64,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            max_figures: None,
            exponential_neg_cutoff: 1e-5,
            exponential_pos_cutoff: 1e7,
        }
    }
}

impl NumberFormat {
    /// Fixed-figure formatting with the usual cut-offs.
    pub fn fixed(figures: u8) -> Self {
        Self {
            max_figures: Some(figures),
            ..Self::default()
        }
    }

    pub fn f32(&self, v: f32) -> String {
        match self.max_figures {
            None => format!("{:?}", v),
            Some(figs) => self.fixed_text(v as f64, figs as usize),
        }
    }

    pub fn f64(&self, v: f64) -> String {
        match self.max_figures {
            None => format!("{:?}", v),
            Some(figs) => self.fixed_text(v, figs as usize),
        }
    }

    fn fixed_text(&self, v: f64, figs: usize) -> String {
        let mag = v.abs();
        if !v.is_finite() {
            return format!("{:?}", v);
        }
        if mag != 0.0 && (mag < self.exponential_neg_cutoff || mag > self.exponential_pos_cutoff) {
            return format!("{:.*e}", figs, v);
        }

        let mut s = format!("{:.*}", figs.max(1), v);
        while s.ends_with('0') && !s.ends_with(".0") {
            s.pop();
        }
        s
    }
}

/// Converts decoded components into cell text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellFormatter {
    pub number: NumberFormat,
}

impl CellFormatter {
    pub fn new(number: NumberFormat) -> Self {
        Self { number }
    }

    /// Format one component. `hex` only affects unsigned integers.
    pub fn format(&self, value: ScalarValue, hex: bool) -> String {
        match value {
            ScalarValue::F32(f) => {
                if f < 0.0 {
                    self.number.f32(f)
                } else if f > 0.0 {
                    format!(" {}", self.number.f32(f))
                } else if f.is_nan() {
                    " NaN".to_string()
                } else {
                    format!(" {}", self.number.f64(0.0))
                }
            }
            ScalarValue::F64(d) => {
                if d < 0.0 {
                    self.number.f64(d)
                } else if d > 0.0 {
                    format!(" {}", self.number.f64(d))
                } else if d.is_nan() {
                    " NaN".to_string()
                } else {
                    format!(" {}", self.number.f64(0.0))
                }
            }
            ScalarValue::U8(v) => unsigned(v as u32, hex),
            ScalarValue::U16(v) => unsigned(v as u32, hex),
            ScalarValue::U32(v) => unsigned(v, hex),
            ScalarValue::I8(v) => signed(v as i32),
            ScalarValue::I16(v) => signed(v as i32),
            ScalarValue::I32(v) => signed(v),
            other => other.to_string(),
        }
    }
}

#[inline]
fn unsigned(v: u32, hex: bool) -> String {
    if hex {
        format!("{:08X}", v)
    } else {
        v.to_string()
    }
}

#[inline]
fn signed(v: i32) -> String {
    if v > 0 {
        format!(" {}", v)
    } else {
        v.to_string()
    }
}
