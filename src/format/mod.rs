//! Attribute layouts and element decoding.
//!
//! - [`AttributeLayout`] / [`ResourceFormat`] - where an attribute lives and how it is stored
//! - [`SpecialFormat`] - packed and block encodings, with their effective component counts
//! - [`decode`] - raw element bytes to typed [`ScalarValue`] components
//! - [`FormatParser`] / [`DeclParser`] - text declarations to layouts

mod component;
mod decl;
mod element;
pub mod packed;
mod special;

pub use component::*;
pub use decl::DeclParser;
pub use element::*;
pub use packed::{decode, Components};
pub use special::*;

/// Turns a textual buffer format into attribute layouts.
///
/// Parsing never fails outright: whatever could be understood is returned
/// alongside one message per rejected entry, so the user can fix the
/// declaration while still seeing partial data.
pub trait FormatParser {
    fn parse(&self, text: &str) -> (Vec<AttributeLayout>, Vec<String>);
}
