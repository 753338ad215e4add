//! Table model over fetched vertex data.
//!
//! Rows are vertices (or elements of a raw buffer). Columns are the
//! components of every attribute, flattened: a `float4, float3, int` layout
//! gives
//!
//! ```text
//! attribute: 0 0 0 0 1 1 1 2
//! component: 0 1 2 3 0 1 2 0
//! ```
//!
//! In mesh view two reserved columns come first: the vertex number (`VTX`)
//! and the index read from the index buffer (`IDX`).

use crate::format::{AttributeLayout, ScalarValue};
use crate::util::{BBox3f, Vec3};

use super::{CellFormatter, NumberFormat, RawBuffer};

const COMPONENT_NAMES: [char; 4] = ['x', 'y', 'z', 'w'];

/// Everything a table displays, built off-thread and swapped in whole.
#[derive(Clone, Debug, Default)]
pub struct TableContents {
    pub row_count: u32,
    pub indices: Option<RawBuffer>,
    pub columns: Vec<AttributeLayout>,
    pub buffers: Vec<RawBuffer>,
}

/// Vertex data table for one pipeline stage (or one raw buffer).
#[derive(Debug)]
pub struct BufferTable {
    mesh_view: bool,
    cur_instance: u32,
    row_count: u32,
    indices: Option<RawBuffer>,
    columns: Vec<AttributeLayout>,
    buffers: Vec<RawBuffer>,
    formatter: CellFormatter,

    // (attribute index, component) per data column
    column_lookup: Vec<(usize, u32)>,
    column_count: usize,
    resetting: bool,
}

impl BufferTable {
    pub fn new(mesh_view: bool) -> Self {
        let mut table = Self {
            mesh_view,
            cur_instance: 0,
            row_count: 0,
            indices: None,
            columns: Vec::new(),
            buffers: Vec::new(),
            formatter: CellFormatter::default(),
            column_lookup: Vec::new(),
            column_count: 0,
            resetting: false,
        };
        table.cache_columns();
        table
    }

    // === Structural changes ===

    /// Start a structural change. Until [`end_reset`](Self::end_reset) the
    /// table reports no cells.
    pub fn begin_reset(&mut self) {
        self.resetting = true;
    }

    /// Finish a structural change and rebuild the column lookup.
    pub fn end_reset(&mut self) {
        self.resetting = false;
        self.cache_columns();
    }

    #[inline]
    pub fn is_resetting(&self) -> bool {
        self.resetting
    }

    /// Replace all contents in one bracketed step.
    pub fn replace(&mut self, contents: TableContents) {
        self.begin_reset();
        self.row_count = contents.row_count;
        self.indices = contents.indices;
        self.columns = contents.columns;
        self.buffers = contents.buffers;
        self.end_reset();
    }

    /// Drop all buffers and columns.
    pub fn clear(&mut self) {
        self.replace(TableContents::default());
    }

    pub fn set_columns(&mut self, columns: Vec<AttributeLayout>) {
        self.columns = columns;
        self.cache_columns();
    }

    pub fn set_buffers(&mut self, buffers: Vec<RawBuffer>) {
        self.buffers = buffers;
    }

    pub fn set_indices(&mut self, indices: Option<RawBuffer>) {
        self.indices = indices;
    }

    pub fn set_row_count(&mut self, rows: u32) {
        self.row_count = rows;
    }

    pub fn set_mesh_view(&mut self, mesh_view: bool) {
        self.mesh_view = mesh_view;
        self.cache_columns();
    }

    /// Instance used to index per-instance attributes.
    pub fn set_cur_instance(&mut self, instance: u32) {
        self.cur_instance = instance;
    }

    pub fn set_number_format(&mut self, number: NumberFormat) {
        self.formatter = CellFormatter::new(number);
    }

    pub fn number_format(&self) -> NumberFormat {
        self.formatter.number
    }

    fn cache_columns(&mut self) {
        self.column_lookup.clear();
        self.column_lookup.reserve(self.columns.len() * 4);

        for (i, attr) in self.columns.iter().enumerate() {
            for c in 0..attr.component_count() {
                self.column_lookup.push((i, c));
            }
        }

        self.column_count = self.column_lookup.len() + self.reserved_column_count();
    }

    // === Accessors ===

    #[inline]
    pub fn mesh_view(&self) -> bool {
        self.mesh_view
    }

    #[inline]
    pub fn cur_instance(&self) -> u32 {
        self.cur_instance
    }

    #[inline]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    #[inline]
    pub fn reserved_column_count(&self) -> usize {
        if self.mesh_view {
            2
        } else {
            0
        }
    }

    #[inline]
    pub fn columns(&self) -> &[AttributeLayout] {
        &self.columns
    }

    #[inline]
    pub fn buffers(&self) -> &[RawBuffer] {
        &self.buffers
    }

    #[inline]
    pub fn indices(&self) -> Option<&RawBuffer> {
        self.indices.as_ref()
    }

    /// Attribute and component shown in data column `col`.
    pub fn column_component(&self, col: usize) -> Option<(&AttributeLayout, u32)> {
        let data_col = col.checked_sub(self.reserved_column_count())?;
        let &(attr, comp) = self.column_lookup.get(data_col)?;
        Some((self.columns.get(attr)?, comp))
    }

    // === Cells ===

    /// Column header text.
    pub fn header(&self, col: usize) -> Option<String> {
        if col >= self.column_count || self.resetting {
            return None;
        }
        if self.mesh_view {
            match col {
                0 => return Some("VTX".to_string()),
                1 => return Some("IDX".to_string()),
                _ => {}
            }
        }

        let (attr, comp) = self.column_component(col)?;
        if attr.component_count() == 1 {
            Some(attr.name.clone())
        } else {
            Some(format!("{}.{}", attr.name, COMPONENT_NAMES[comp as usize % 4]))
        }
    }

    /// Vertex index for `row`: the index buffer entry, or the row itself
    /// when not indexed. `None` if the index buffer is too short.
    pub fn vertex_index(&self, row: u32) -> Option<u32> {
        match &self.indices {
            Some(indices) => indices.read_u32(row),
            None => Some(row),
        }
    }

    /// Decoded value at `(row, col)`. Reserved columns yield the vertex
    /// number and index as `U32`.
    pub fn value(&self, row: u32, col: usize) -> Option<ScalarValue> {
        if self.resetting || row >= self.row_count || col >= self.column_count {
            return None;
        }

        if self.mesh_view && col == 0 {
            return Some(ScalarValue::U32(row));
        }

        let idx = self.vertex_index(row)?;

        if self.mesh_view && col == 1 {
            return Some(ScalarValue::U32(idx));
        }

        let (attr, comp) = self.column_component(col)?;
        self.decode(attr, idx)?.get(comp as usize).copied()
    }

    /// Formatted cell text at `(row, col)`, `None` for "no value".
    pub fn cell(&self, row: u32, col: usize) -> Option<String> {
        let value = self.value(row, col)?;

        if col < self.reserved_column_count() {
            return Some(value.to_string());
        }

        let (attr, _) = self.column_component(col)?;
        Some(self.formatter.format(value, attr.hex))
    }

    fn decode(&self, attr: &AttributeLayout, vertex: u32) -> Option<crate::format::Components> {
        let buffer = self.buffers.get(attr.buffer)?;
        let element = if attr.per_instance {
            attr.instance_index(self.cur_instance)
        } else {
            vertex
        };
        let bytes = buffer.element(element, attr.offset)?;
        Some(attr.decode(bytes))
    }

    /// Bounds of the first three components of attribute `attr` over all rows.
    pub fn bounds(&self, attr: usize) -> BBox3f {
        let mut bbox = BBox3f::EMPTY;
        let Some(layout) = self.columns.get(attr) else {
            return bbox;
        };

        for row in 0..self.row_count {
            let Some(idx) = self.vertex_index(row) else {
                continue;
            };
            let Some(comps) = self.decode(layout, idx) else {
                continue;
            };
            if comps.is_empty() {
                continue;
            }
            let get = |i: usize| comps.get(i).map(|v| v.as_f64() as f32).unwrap_or(0.0);
            bbox.expand_by_point(Vec3::new(get(0), get(1), get(2)));
        }
        bbox
    }
}

impl Default for BufferTable {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{CompType, ResourceFormat, SpecialFormat};

    fn float_uint_table(mesh_view: bool) -> BufferTable {
        let mut data = Vec::new();
        for (f, u) in [([1.0f32, 1.2345e-20, 123456.789], 0x12345678u32), ([-1.0, 0.0, -0.0], 7)] {
            data.extend_from_slice(bytemuck::cast_slice(&f));
            data.extend_from_slice(&u.to_le_bytes());
        }

        let mut t = BufferTable::new(mesh_view);
        t.replace(TableContents {
            row_count: 2,
            indices: None,
            columns: vec![
                AttributeLayout::new("pos", ResourceFormat::FLOAT3),
                AttributeLayout::new("id", ResourceFormat::UINT).with_offset(12),
            ],
            buffers: vec![RawBuffer::new(data, 16)],
        });
        t
    }

    #[test]
    fn test_column_layout() {
        let t = float_uint_table(false);
        assert_eq!(t.column_count(), 4);
        assert_eq!(t.header(0).as_deref(), Some("pos.x"));
        assert_eq!(t.header(2).as_deref(), Some("pos.z"));
        assert_eq!(t.header(3).as_deref(), Some("id"));
        assert_eq!(t.header(4), None);

        let t = float_uint_table(true);
        assert_eq!(t.column_count(), 6);
        assert_eq!(t.header(0).as_deref(), Some("VTX"));
        assert_eq!(t.header(1).as_deref(), Some("IDX"));
        assert_eq!(t.header(2).as_deref(), Some("pos.x"));
    }

    #[test]
    fn test_cells() {
        let t = float_uint_table(false);
        assert_eq!(t.cell(0, 0).as_deref(), Some(" 1.0"));
        assert_eq!(t.cell(0, 1).as_deref(), Some(" 1.2345e-20"));
        assert_eq!(t.cell(0, 2).as_deref(), Some(" 123456.79"));
        assert_eq!(t.cell(0, 3).as_deref(), Some("305419896"));
        assert_eq!(t.cell(1, 0).as_deref(), Some("-1.0"));
        assert_eq!(t.cell(1, 1), t.cell(1, 2));
        assert_eq!(t.cell(2, 0), None);
    }

    #[test]
    fn test_cell_is_pure() {
        let t = float_uint_table(true);
        for row in 0..2 {
            for col in 0..t.column_count() {
                assert_eq!(t.cell(row, col), t.cell(row, col));
            }
        }
    }

    #[test]
    fn test_hex_column() {
        let mut t = float_uint_table(false);
        let mut cols = t.columns().to_vec();
        cols[1].hex = true;
        t.set_columns(cols);
        assert_eq!(t.cell(0, 3).as_deref(), Some("12345678"));
    }

    #[test]
    fn test_special_changes_column_count() {
        let mut t = float_uint_table(false);
        let mut cols = t.columns().to_vec();
        cols[1].format = ResourceFormat::packed(SpecialFormat::R10G10B10A2, CompType::UNorm);
        t.set_columns(cols);
        assert_eq!(t.column_count(), 7);
        assert_eq!(t.header(6).as_deref(), Some("id.w"));
    }

    #[test]
    fn test_index_indirection() {
        let mut t = float_uint_table(true);
        t.set_indices(Some(RawBuffer::from_indices(&[1, 0])));
        assert_eq!(t.cell(0, 0).as_deref(), Some("0"));
        assert_eq!(t.cell(0, 1).as_deref(), Some("1"));
        assert_eq!(t.cell(0, 2).as_deref(), Some("-1.0"));
        assert_eq!(t.cell(1, 2).as_deref(), Some(" 1.0"));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut t = float_uint_table(true);
        t.set_indices(Some(RawBuffer::from_indices(&[0, 1_000_000])));
        assert_eq!(t.cell(1, 0).as_deref(), Some("1"));
        assert_eq!(t.cell(1, 1).as_deref(), Some("1000000"));
        assert_eq!(t.cell(1, 2), None);

        // shorter index buffer than rows: no value, not a panic
        t.set_indices(Some(RawBuffer::from_indices(&[0])));
        assert_eq!(t.cell(1, 1), None);
        assert_eq!(t.cell(1, 0).as_deref(), Some("1"));
    }

    #[test]
    fn test_truncated_buffer() {
        let mut t = float_uint_table(false);
        let bytes = t.buffers()[0].as_bytes()[..26].to_vec();
        t.set_buffers(vec![RawBuffer::new(bytes, 16)]);
        // row 1 float3 needs bytes 16..28
        assert_eq!(t.cell(1, 0), None);
        assert_eq!(t.cell(1, 3), None);
        assert!(t.cell(0, 3).is_some());
    }

    #[test]
    fn test_missing_buffer() {
        let mut t = float_uint_table(false);
        let mut cols = t.columns().to_vec();
        cols[0].buffer = 5;
        t.set_columns(cols);
        assert_eq!(t.cell(0, 0), None);
        assert!(t.cell(0, 3).is_some());
    }

    #[test]
    fn test_per_instance() {
        let inst: Vec<u8> = bytemuck::cast_slice(&[10u32, 20, 30]).to_vec();
        let mut t = BufferTable::new(false);
        t.replace(TableContents {
            row_count: 4,
            indices: None,
            columns: vec![AttributeLayout::new("inst", ResourceFormat::UINT).per_instance(2)],
            buffers: vec![RawBuffer::new(inst, 4)],
        });

        assert_eq!(t.cell(3, 0).as_deref(), Some("10"));
        t.set_cur_instance(5);
        assert_eq!(t.cell(0, 0).as_deref(), Some("30"));
        assert_eq!(t.cell(3, 0).as_deref(), Some("30"));
        t.set_cur_instance(6);
        assert_eq!(t.cell(0, 0), None);
    }

    #[test]
    fn test_reset_bracket_hides_cells() {
        let mut t = float_uint_table(false);
        t.begin_reset();
        assert_eq!(t.cell(0, 0), None);
        assert_eq!(t.header(0), None);
        t.end_reset();
        assert!(t.cell(0, 0).is_some());
    }

    #[test]
    fn test_column_setters_during_reset_stay_consistent() {
        let mut t = BufferTable::new(false);
        t.set_columns(vec![
            AttributeLayout::new("a", ResourceFormat::FLOAT4),
            AttributeLayout::new("b", ResourceFormat::FLOAT4),
        ]);
        assert_eq!(t.column_count(), 8);

        t.begin_reset();
        t.set_columns(vec![AttributeLayout::new("a", ResourceFormat::FLOAT)]);
        assert_eq!(t.column_count(), 1);
        assert!(t.column_component(5).is_none());
        assert_eq!(t.column_component(0).map(|(a, c)| (a.name.as_str(), c)), Some(("a", 0)));

        t.set_mesh_view(true);
        assert_eq!(t.column_count(), 3);
        assert!(t.column_component(1).is_none());
        assert_eq!(t.column_component(2).map(|(a, _)| a.name.as_str()), Some("a"));
        t.end_reset();
        assert_eq!(t.header(2).as_deref(), Some("a"));
    }

    #[test]
    fn test_block_header_uses_expanded_count() {
        // declared as four components, BC4 expands to one
        let format = ResourceFormat {
            special: SpecialFormat::BC4,
            ..ResourceFormat::new(CompType::UNorm, 4, 1)
        };
        let mut t = BufferTable::new(false);
        t.set_columns(vec![AttributeLayout::new("alpha", format)]);
        assert_eq!(t.column_count(), 1);
        assert_eq!(t.header(0).as_deref(), Some("alpha"));
    }

    #[test]
    fn test_clear() {
        let mut t = float_uint_table(true);
        t.clear();
        assert_eq!(t.row_count(), 0);
        assert_eq!(t.column_count(), 2);
        assert!(t.buffers().is_empty());
    }

    #[test]
    fn test_bounds() {
        let t = float_uint_table(false);
        let b = t.bounds(0);
        assert_eq!(b.min.x, -1.0);
        assert_eq!(b.max.x, 1.0);
        assert!(t.bounds(9).is_empty());
    }
}
