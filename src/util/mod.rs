//! Shared error type and math helpers.

mod error;
pub mod math;

pub use error::*;
pub use math::*;
