//! Vertex data tables: raw buffers in, formatted cells out.
//!
//! Cell resolution never fails. Missing buffers, short index buffers and
//! truncated elements all produce an empty cell instead of an error, since
//! the data being inspected is often from a broken frame.

mod buffer;
mod cell;
mod model;

pub use buffer::RawBuffer;
pub use cell::{CellFormatter, NumberFormat};
pub use model::{BufferTable, TableContents};
