//! Integration tests for decoding vertex data into table cells.

use bytemuck::{Pod, Zeroable};
use mesh_inspector::prelude::*;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Vertex {
    pos: [f32; 3],
    id: u32,
}

fn vertex_buffer() -> RawBuffer {
    let verts = [
        Vertex {
            pos: [1.0, 1.2345e-20, 123456.789],
            id: 0x12345678,
        },
        Vertex {
            pos: [-2.0, 0.0, -0.0],
            id: 0xffffffff,
        },
    ];
    RawBuffer::new(bytemuck::cast_slice(&verts).to_vec(), 16)
}

fn float3_uint_table(hex: bool) -> BufferTable {
    let mut table = BufferTable::new(false);
    table.replace(TableContents {
        row_count: 2,
        indices: None,
        columns: vec![
            AttributeLayout::new("pos", ResourceFormat::FLOAT3),
            AttributeLayout::new("id", ResourceFormat::UINT).with_offset(12).with_hex(hex),
        ],
        buffers: vec![vertex_buffer()],
    });
    table
}

#[test]
fn test_float3_uint_layout() {
    let table = float3_uint_table(false);
    assert_eq!(table.column_count(), 4);

    let headers: Vec<_> = (0..4).map(|c| table.header(c).unwrap()).collect();
    assert_eq!(headers, vec!["pos.x", "pos.y", "pos.z", "id"]);

    assert_eq!(table.cell(0, 0).as_deref(), Some(" 1.0"));
    assert_eq!(table.cell(0, 1).as_deref(), Some(" 1.2345e-20"));
    assert_eq!(table.cell(0, 2).as_deref(), Some(" 123456.79"));
    assert_eq!(table.cell(0, 3).as_deref(), Some("305419896"));

    assert_eq!(table.cell(1, 0).as_deref(), Some("-2.0"));
    assert_eq!(table.cell(1, 1), table.cell(1, 2));
    assert_eq!(table.cell(1, 3).as_deref(), Some("4294967295"));

    let hex = float3_uint_table(true);
    assert_eq!(hex.cell(0, 3).as_deref(), Some("12345678"));
    assert_eq!(hex.cell(1, 3).as_deref(), Some("FFFFFFFF"));
}

#[test]
fn test_cells_are_deterministic() {
    let table = float3_uint_table(false);
    for row in 0..3 {
        for col in 0..5 {
            assert_eq!(table.cell(row, col), table.cell(row, col));
        }
    }
    assert_eq!(table.cell(2, 0), None);
    assert_eq!(table.cell(0, 4), None);
}

#[test]
fn test_index_buffer_reserved_columns() {
    let indices = RawBuffer::from_indices(&[0, 1_000_000]);

    let mut mesh = BufferTable::new(true);
    mesh.replace(TableContents {
        row_count: 2,
        indices: Some(indices.clone()),
        columns: vec![AttributeLayout::new("pos", ResourceFormat::FLOAT3)],
        buffers: vec![vertex_buffer()],
    });

    assert_eq!(mesh.column_count(), 5);
    assert_eq!(mesh.header(0).as_deref(), Some("VTX"));
    assert_eq!(mesh.header(1).as_deref(), Some("IDX"));
    assert_eq!(mesh.cell(1, 0).as_deref(), Some("1"));
    assert_eq!(mesh.cell(1, 1).as_deref(), Some("1000000"));
    assert_eq!(mesh.cell(0, 2).as_deref(), Some(" 1.0"));
    // index 1000000 is far past the vertex data
    assert_eq!(mesh.cell(1, 2), None);

    // the same bytes read as a plain attribute, no reserved columns
    let mut raw = BufferTable::new(false);
    raw.replace(TableContents {
        row_count: 2,
        indices: None,
        columns: vec![AttributeLayout::new("index", ResourceFormat::UINT)],
        buffers: vec![RawBuffer::new(indices.as_bytes().to_vec(), 4)],
    });
    assert_eq!(raw.column_count(), 1);
    assert_eq!(raw.cell(1, 0).as_deref(), Some("1000000"));
}

#[test]
fn test_block_formats_override_component_count() {
    let mut table = BufferTable::new(false);
    table.replace(TableContents {
        row_count: 1,
        indices: None,
        columns: vec![
            AttributeLayout::new("bc1", ResourceFormat::packed(SpecialFormat::BC1, CompType::UNorm)),
            AttributeLayout::new("bc4", ResourceFormat::packed(SpecialFormat::BC4, CompType::UNorm)),
        ],
        buffers: vec![RawBuffer::new(vec![0u8; 16], 16)],
    });
    assert_eq!(table.column_count(), 5);
    assert_eq!(table.header(3).as_deref(), Some("bc1.w"));
    assert_eq!(table.header(4).as_deref(), Some("bc4"));
}

#[test]
fn test_truncated_buffer_is_bounds_safe() {
    let mut table = float3_uint_table(false);
    let bytes = vertex_buffer().as_bytes()[..20].to_vec();
    table.set_buffers(vec![RawBuffer::new(bytes, 16)]);

    assert_eq!(table.cell(0, 3).as_deref(), Some("305419896"));
    // second vertex has only 4 of its 16 bytes
    assert_eq!(table.cell(1, 0), None);
    assert_eq!(table.cell(1, 3), None);

    table.set_buffers(Vec::new());
    assert_eq!(table.cell(0, 0), None);
}

#[test]
fn test_per_instance_columns() {
    let instance_data: Vec<u8> = bytemuck::cast_slice(&[10u32, 20, 30]).to_vec();
    let mut table = BufferTable::new(true);
    table.replace(TableContents {
        row_count: 2,
        indices: None,
        columns: vec![
            AttributeLayout::new("id", ResourceFormat::UINT).with_offset(12),
            AttributeLayout::new("inst", ResourceFormat::UINT).with_buffer(1).per_instance(2),
        ],
        buffers: vec![vertex_buffer(), RawBuffer::new(instance_data, 4)],
    });

    table.set_cur_instance(5);
    // instance 5 at rate 2 reads element 2 on every row
    assert_eq!(table.cell(0, 3).as_deref(), Some("30"));
    assert_eq!(table.cell(1, 3).as_deref(), Some("30"));
    assert_eq!(table.cell(1, 2).as_deref(), Some("4294967295"));
}

#[test]
fn test_declaration_round_into_table() {
    let (columns, errors) = DeclParser.parse("float3 pos; xint id");
    assert!(errors.is_empty());

    let mut table = BufferTable::new(false);
    table.replace(fetch::raw_contents(vertex_buffer().as_bytes().to_vec(), columns));
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.cell(0, 3).as_deref(), Some("12345678"));
    assert_eq!(table.cell(1, 0).as_deref(), Some("-2.0"));
}
