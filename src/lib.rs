//! # mesh-inspector
//!
//! Vertex buffer inspection for a graphics frame debugger: decodes captured
//! vertex and post-transform data into formatted tables, and drives a 3D
//! preview camera.
//!
//! ## Modules
//!
//! - [`util`] - Errors and math types
//! - [`format`] - Attribute layouts, packed formats and element decoding
//! - [`table`] - Buffer tables: (row, column) to formatted cell text
//! - [`camera`] - Arcball and fly preview cameras
//! - [`viewer`] - Controller tying stages, cameras, tables and replay fetches together
//!
//! ## Example
//!
//! ```ignore
//! use mesh_inspector::prelude::*;
//!
//! let mut table = BufferTable::new(false);
//! table.replace(fetch::raw_contents(bytes, DeclParser.parse("float3 pos; uint id").0));
//!
//! for row in 0..table.row_count() {
//!     let cells: Vec<_> = (0..table.column_count()).map(|c| table.cell(row, c)).collect();
//!     println!("{:?}", cells);
//! }
//! ```

pub mod util;
pub mod format;
pub mod table;
pub mod camera;
pub mod viewer;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, ViewportSize};
    pub use crate::format::{AttributeLayout, CompType, DeclParser, FormatParser, ResourceFormat, ScalarValue, SpecialFormat};
    pub use crate::table::{BufferTable, NumberFormat, RawBuffer, TableContents};
    pub use crate::camera::{Camera, CameraController, CameraKind, Key, Modifiers, MouseButtons, MouseEvent};
    pub use crate::viewer::{fetch, MeshDataStage, MeshDisplayConfig, MeshViewController, ReplaySource, RenderTarget, Settings};
}
