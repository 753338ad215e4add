//! Fetching vertex data from the replay and laying it out as tables.
//!
//! Everything here runs on the fetch worker. Failures of individual reads are
//! logged and leave the affected buffer empty; only the raw view reports an
//! error, since it has nothing else to show.

use tracing::{debug, error, warn};

use crate::format::{AttributeLayout, CompType, ResourceFormat};
use crate::table::{RawBuffer, TableContents};
use crate::util::{Error, Result};

use super::config::MeshDataStage;
use super::replay::{MeshFormat, PipelineSnapshot, ReplaySource, ResourceId, SigParameter};

/// What a raw (non-mesh) view shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawSource {
    /// `size == u64::MAX` reads the whole buffer from `offset`.
    Buffer { id: ResourceId, offset: u64, size: u64 },
    Texture { id: ResourceId, array_idx: u32, mip: u32 },
}

/// One unit of work for the fetch worker.
#[derive(Clone, Debug)]
pub enum FetchRequest {
    Mesh {
        pipeline: PipelineSnapshot,
        cur_instance: u32,
    },
    Raw {
        source: RawSource,
        columns: Vec<AttributeLayout>,
    },
}

/// Tables for all three stages of one draw.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vs_in: TableContents,
    pub vs_out: TableContents,
    pub gs_out: TableContents,
    pub post_vs: MeshFormat,
    pub post_gs: MeshFormat,
    pub diagnostics: Vec<String>,
}

impl MeshData {
    pub fn stage(&self, stage: MeshDataStage) -> &TableContents {
        match stage {
            MeshDataStage::VSIn => &self.vs_in,
            MeshDataStage::VSOut => &self.vs_out,
            MeshDataStage::GSOut => &self.gs_out,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Fetched {
    Mesh(MeshData),
    Raw(TableContents),
}

/// Run one request against the replay.
pub fn execute(src: &mut dyn ReplaySource, request: FetchRequest) -> Result<Fetched> {
    match request {
        FetchRequest::Mesh { pipeline, cur_instance } => {
            Ok(Fetched::Mesh(fetch_mesh(src, &pipeline, cur_instance)))
        }
        FetchRequest::Raw { source, columns } => fetch_raw(src, source, columns).map(Fetched::Raw),
    }
}

// ============================================================================
// Columns
// ============================================================================

/// Columns of the input stage: one per vertex input read by the shader.
pub fn input_columns(pipeline: &PipelineSnapshot) -> Vec<AttributeLayout> {
    pipeline
        .vertex_inputs
        .iter()
        .filter(|a| a.used)
        .map(|a| {
            let mut layout = AttributeLayout::new(a.name.clone(), a.format)
                .with_buffer(a.vertex_buffer)
                .with_offset(a.byte_offset);
            if a.per_instance {
                layout = layout.per_instance(a.instance_rate);
            }
            layout
        })
        .collect()
}

/// Columns of a post-transform stage, laid out from its output signature.
///
/// With `aligned` set, 2-component outputs start on a 2-element boundary and
/// 3/4-component outputs on a 4-element boundary. The position output is
/// moved to the front, the others keep their order.
pub fn output_columns(signature: &[SigParameter], aligned: bool) -> Vec<AttributeLayout> {
    let mut columns = Vec::with_capacity(signature.len());
    let mut position = None;
    let mut offset = 0u32;

    for (i, sig) in signature.iter().enumerate() {
        let num_comps = sig.comp_count as u32;
        let elem_size = if sig.comp_type == CompType::Double { 8u32 } else { 4 };

        if aligned {
            if num_comps == 2 {
                offset = align_up(offset, 2 * elem_size);
            } else if num_comps > 2 {
                offset = align_up(offset, 4 * elem_size);
            }
        }

        let format = ResourceFormat::new(sig.comp_type, sig.comp_count, elem_size as u8);
        columns.push(AttributeLayout::new(sig.display_name(), format).with_offset(offset));

        if sig.is_position && position.is_none() {
            position = Some(i);
        }
        offset += num_comps * elem_size;
    }

    if let Some(pos) = position.filter(|&p| p > 0) {
        let col = columns.remove(pos);
        columns.insert(0, col);
    }
    columns
}

#[inline]
fn align_up(v: u32, align: u32) -> u32 {
    v.div_ceil(align) * align
}

/// Byte size of one raw-view row: the attributes packed back to back.
pub fn tight_stride(columns: &[AttributeLayout]) -> usize {
    columns.iter().map(|c| c.byte_size()).sum::<usize>().max(1)
}

/// Lay out raw bytes as rows of `columns`.
pub fn raw_contents(data: Vec<u8>, columns: Vec<AttributeLayout>) -> TableContents {
    let stride = tight_stride(&columns);
    let row_count = u32::try_from(data.len().div_ceil(stride)).unwrap_or(u32::MAX);

    TableContents {
        row_count,
        indices: None,
        columns,
        buffers: vec![RawBuffer::new(data, stride)],
    }
}

/// Where the renderer finds input-stage positions: the first vertex input.
pub fn input_mesh_format(pipeline: &PipelineSnapshot) -> MeshFormat {
    let mut mf = MeshFormat::default();

    if let Some(draw) = pipeline.draw {
        mf.num_verts = draw.num_indices;
        mf.topology = draw.topology;
        mf.index_buffer = pipeline.index_buffer.map(|ib| ib.id);
        mf.index_offset = pipeline.index_buffer.map(|ib| ib.byte_offset).unwrap_or(0);
        mf.index_byte_width = draw.index_byte_width;
        mf.base_vertex = draw.base_vertex;
    }

    if let Some(first) = pipeline.vertex_inputs.first() {
        if let Some(vb) = pipeline.vertex_buffers.get(first.vertex_buffer) {
            mf.buffer = Some(vb.id);
            mf.offset = vb.byte_offset;
            mf.stride = vb.byte_stride;
        }
        mf.format = first.format;
    }
    mf
}

// ============================================================================
// Indices
// ============================================================================

/// Widen 1/2/4-byte little-endian indices to `u32`, reading at most `count`.
///
/// Returns `None` for an unsupported width.
pub fn widen_indices(data: &[u8], byte_width: u32, count: u32) -> Option<Vec<u32>> {
    let count = count as usize;
    let out = match byte_width {
        1 => data.iter().take(count).map(|&b| b as u32).collect(),
        2 => data
            .chunks_exact(2)
            .take(count)
            .map(|c| u16::from_le_bytes([c[0], c[1]]) as u32)
            .collect(),
        4 => data
            .chunks_exact(4)
            .take(count)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        _ => return None,
    };
    Some(out)
}

fn read_or_empty(src: &mut dyn ReplaySource, id: ResourceId, offset: u64, len: u64) -> Vec<u8> {
    match src.buffer_data(id, offset, len) {
        Ok(data) => data,
        Err(e) => {
            warn!("Buffer {} read failed ({} bytes at {}): {}", id, len, offset, e);
            Vec::new()
        }
    }
}

/// Read the draw's index range from `ib`, widened. Empty reads give `None`.
fn fetch_indices(
    src: &mut dyn ReplaySource,
    pipeline: &PipelineSnapshot,
    ib: ResourceId,
) -> Option<Vec<u32>> {
    let draw = pipeline.draw?;
    if draw.index_byte_width == 0 {
        return None;
    }
    let width = draw.index_byte_width as u64;
    let base = pipeline.index_buffer.map(|ib| ib.byte_offset).unwrap_or(0);
    let offset = base + draw.index_offset as u64 * width;
    let len = draw.num_indices as u64 * width;
    if len == 0 {
        return None;
    }

    let data = read_or_empty(src, ib, offset, len);
    if data.is_empty() {
        return None;
    }

    let indices = widen_indices(&data, draw.index_byte_width, draw.num_indices);
    if indices.is_none() {
        warn!("Unsupported index width {}", draw.index_byte_width);
    }
    indices
}

// ============================================================================
// Mesh
// ============================================================================

/// Fetch all stages of the draw in `pipeline` for instance `cur_instance`.
pub fn fetch_mesh(src: &mut dyn ReplaySource, pipeline: &PipelineSnapshot, cur_instance: u32) -> MeshData {
    let _span = tracing::info_span!("fetch_mesh", event = pipeline.event_id(), instance = cur_instance).entered();

    let mut diagnostics = Vec::new();
    let vs_in = fetch_input_stage(src, pipeline, &mut diagnostics);

    let (vs_out, post_vs) = fetch_output_stage(
        src,
        pipeline,
        cur_instance,
        MeshDataStage::VSOut,
        &pipeline.vs_output_signature,
    );

    let (gs_out, post_gs) = if pipeline.gs_output_signature.is_empty() {
        (TableContents::default(), MeshFormat::default())
    } else {
        fetch_output_stage(
            src,
            pipeline,
            cur_instance,
            MeshDataStage::GSOut,
            &pipeline.gs_output_signature,
        )
    };

    debug!(
        "Fetched mesh: {} input rows, {} output rows, {} geometry rows",
        vs_in.row_count, vs_out.row_count, gs_out.row_count
    );

    MeshData {
        vs_in,
        vs_out,
        gs_out,
        post_vs,
        post_gs,
        diagnostics,
    }
}

fn fetch_input_stage(
    src: &mut dyn ReplaySource,
    pipeline: &PipelineSnapshot,
    diagnostics: &mut Vec<String>,
) -> TableContents {
    let columns = input_columns(pipeline);
    let draw = pipeline.draw;

    let indices = pipeline
        .index_buffer
        .and_then(|ib| fetch_indices(src, pipeline, ib.id));

    let mut max_index = draw.map(|d| d.num_indices.max(1) - 1).unwrap_or(0);
    if let Some(indices) = indices.as_ref().filter(|i| !i.is_empty()) {
        max_index = indices.iter().copied().max().unwrap_or(0);
    }

    let mut buffers = Vec::with_capacity(pipeline.vertex_buffers.len());
    for (slot, vb) in pipeline.vertex_buffers.iter().enumerate() {
        let mut used = false;
        let mut per_instance = false;
        let mut per_vertex = false;
        for col in columns.iter().filter(|c| c.buffer == slot) {
            used = true;
            if col.per_instance {
                per_instance = true;
            } else {
                per_vertex = true;
            }
        }

        if !used {
            buffers.push(RawBuffer::empty());
            continue;
        }

        let mut max_idx = 0u32;
        let mut offset = 0u32;
        if let Some(draw) = draw {
            if per_instance {
                max_idx = draw.num_instances.max(1) - 1;
                offset = draw.instance_offset;
            }
            if per_vertex {
                max_idx = max_index.max(max_idx);
                offset = draw.vertex_offset;
                if draw.base_vertex > 0 {
                    max_idx = max_idx.saturating_add(draw.base_vertex as u32);
                }
            }
            if per_instance && per_vertex {
                let err = Error::ConflictingUsage { slot };
                error!("{}", err);
                diagnostics.push(err.to_string());
            }
        }

        let stride = vb.byte_stride as u64;
        let data = read_or_empty(
            src,
            vb.id,
            vb.byte_offset + offset as u64 * stride,
            (max_idx as u64 + 1) * stride,
        );
        buffers.push(RawBuffer::new(data, vb.byte_stride as usize));
    }

    TableContents {
        row_count: draw.map(|d| d.num_indices).unwrap_or(0),
        indices: indices.map(|i| RawBuffer::from_indices(&i)),
        columns,
        buffers,
    }
}

fn fetch_output_stage(
    src: &mut dyn ReplaySource,
    pipeline: &PipelineSnapshot,
    cur_instance: u32,
    stage: MeshDataStage,
    signature: &[SigParameter],
) -> (TableContents, MeshFormat) {
    let format = match src.post_vs_data(cur_instance, stage) {
        Ok(f) => f,
        Err(e) => {
            warn!("{} data unavailable: {}", stage.name(), e);
            return (TableContents::default(), MeshFormat::default());
        }
    };

    let columns = if pipeline.draw.is_some() {
        output_columns(signature, pipeline.aligned_post_vs)
    } else {
        Vec::new()
    };

    let indices = format
        .index_buffer
        .and_then(|ib| fetch_indices(src, pipeline, ib))
        .map(|i| RawBuffer::from_indices(&i));

    let mut buffers = Vec::new();
    if let Some(buf) = format.buffer {
        let data = read_or_empty(src, buf, format.offset, 0);
        buffers.push(RawBuffer::new(data, format.stride as usize));
    }

    let contents = TableContents {
        row_count: format.num_verts,
        indices,
        columns,
        buffers,
    };
    (contents, format)
}

// ============================================================================
// Raw view
// ============================================================================

/// Fetch a buffer range or texture subresource and lay it out as `columns`.
pub fn fetch_raw(src: &mut dyn ReplaySource, source: RawSource, columns: Vec<AttributeLayout>) -> Result<TableContents> {
    let _span = tracing::info_span!("fetch_raw").entered();

    if columns.is_empty() {
        return Err(Error::invalid("no attributes to lay out"));
    }

    let data = match source {
        RawSource::Buffer { id, offset, size } => {
            let len = if size == u64::MAX { 0 } else { size };
            src.buffer_data(id, offset, len)?
        }
        RawSource::Texture { id, array_idx, mip } => {
            let data = src.texture_data(id, array_idx, mip)?;
            if data.is_empty() {
                return Err(Error::fetch(format!(
                    "texture {} slice {} mip {} has no data",
                    id, array_idx, mip
                )));
            }
            data
        }
    };

    debug!("Fetched {} raw bytes", data.len());
    Ok(raw_contents(data, columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::replay::{
        BoundIndexBuffer, BoundVertexBuffer, DrawCall, MemoryReplay, VertexInputAttribute,
    };

    /// Records every buffer read so tests can check the requested ranges.
    struct Recording {
        inner: MemoryReplay,
        reads: Vec<(ResourceId, u64, u64)>,
    }

    impl ReplaySource for Recording {
        fn buffer_data(&mut self, id: ResourceId, offset: u64, len: u64) -> Result<Vec<u8>> {
            self.reads.push((id, offset, len));
            self.inner.buffer_data(id, offset, len)
        }
        fn texture_data(&mut self, id: ResourceId, a: u32, m: u32) -> Result<Vec<u8>> {
            self.inner.texture_data(id, a, m)
        }
        fn post_vs_data(&mut self, instance: u32, stage: MeshDataStage) -> Result<MeshFormat> {
            self.inner.post_vs_data(instance, stage)
        }
        fn pick_vertex(&mut self, e: u32, x: u32, y: u32) -> Option<(u32, u32)> {
            self.inner.pick_vertex(e, x, y)
        }
    }

    fn f32_bytes(v: &[f32]) -> Vec<u8> {
        bytemuck::cast_slice(v).to_vec()
    }

    #[test]
    fn test_widen_indices() {
        assert_eq!(widen_indices(&[1, 2, 3], 1, 2), Some(vec![1, 2]));
        assert_eq!(widen_indices(&[1, 0, 0xff, 0xff, 7], 2, 10), Some(vec![1, 0xffff]));
        let data = bytemuck::cast_slice(&[5u32, 1_000_000]).to_vec();
        assert_eq!(widen_indices(&data, 4, 2), Some(vec![5, 1_000_000]));
        assert_eq!(widen_indices(&data, 3, 2), None);
    }

    #[test]
    fn test_output_columns_alignment() {
        let sig = vec![
            SigParameter::new("a", CompType::Float, 1),
            SigParameter::new("b", CompType::Float, 2),
            SigParameter::new("c", CompType::Float, 3),
            SigParameter::new("d", CompType::Double, 2),
        ];
        let offsets = |cols: Vec<AttributeLayout>| cols.iter().map(|c| c.offset).collect::<Vec<_>>();

        assert_eq!(offsets(output_columns(&sig, false)), vec![0, 4, 12, 24]);
        // b aligns to 8, c to 16, d (2 doubles) to 16
        assert_eq!(offsets(output_columns(&sig, true)), vec![0, 8, 16, 32]);

        let cols = output_columns(&sig, true);
        assert_eq!(cols[3].format.comp_byte_width, 8);
    }

    #[test]
    fn test_output_columns_position_first() {
        let sig = vec![
            SigParameter::new("uv", CompType::Float, 2),
            SigParameter::new("col", CompType::Float, 4),
            SigParameter::new("pos", CompType::Float, 4).position(),
            SigParameter::new("n", CompType::Float, 3),
        ];
        let cols = output_columns(&sig, false);
        let names: Vec<_> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["pos", "uv", "col", "n"]);
        // offsets are computed before reordering
        assert_eq!(cols[0].offset, 24);
        assert_eq!(cols[1].offset, 0);
    }

    #[test]
    fn test_raw_contents_rows() {
        let cols = vec![
            AttributeLayout::new("a", ResourceFormat::FLOAT3),
            AttributeLayout::new("b", ResourceFormat::UINT).with_offset(12),
        ];
        assert_eq!(tight_stride(&cols), 16);

        let contents = raw_contents(vec![0u8; 40], cols);
        assert_eq!(contents.row_count, 3);
        assert_eq!(contents.buffers[0].stride(), 16);
        assert!(contents.indices.is_none());

        assert_eq!(tight_stride(&[]), 1);
        assert_eq!(raw_contents(vec![1, 2, 3], Vec::new()).row_count, 3);
    }

    #[test]
    fn test_fetch_raw_whole_buffer() {
        let mut src = Recording {
            inner: MemoryReplay::new().with_buffer(1, vec![0u8; 64]),
            reads: Vec::new(),
        };
        let cols = vec![AttributeLayout::new("v", ResourceFormat::FLOAT4)];
        let raw = RawSource::Buffer { id: 1, offset: 16, size: u64::MAX };
        let contents = fetch_raw(&mut src, raw, cols).unwrap();
        assert_eq!(src.reads, vec![(1, 16, 0)]);
        assert_eq!(contents.row_count, 3);

        let missing = RawSource::Buffer { id: 9, offset: 0, size: 4 };
        let cols = vec![AttributeLayout::new("v", ResourceFormat::UINT)];
        assert!(matches!(fetch_raw(&mut src, missing, cols), Err(Error::BufferNotFound(9))));
    }

    #[test]
    fn test_fetch_raw_rejects_nothing_to_show() {
        let mut src = MemoryReplay::new()
            .with_buffer(1, vec![0u8; 16])
            .with_texture(2, 0, 1, Vec::new());

        let whole = RawSource::Buffer { id: 1, offset: 0, size: u64::MAX };
        assert!(matches!(fetch_raw(&mut src, whole, Vec::new()), Err(Error::InvalidFormat(_))));

        let empty_mip = RawSource::Texture { id: 2, array_idx: 0, mip: 1 };
        let cols = vec![AttributeLayout::new("texel", ResourceFormat::FLOAT4)];
        assert!(matches!(fetch_raw(&mut src, empty_mip, cols), Err(Error::FetchFailed(_))));
    }

    fn indexed_pipeline() -> PipelineSnapshot {
        PipelineSnapshot {
            vertex_inputs: vec![
                VertexInputAttribute::new("pos", 0, 0, ResourceFormat::FLOAT3),
                VertexInputAttribute::new("offs", 1, 0, ResourceFormat::FLOAT2).per_instance(1),
            ],
            vertex_buffers: vec![
                BoundVertexBuffer { id: 10, byte_offset: 0, byte_stride: 12 },
                BoundVertexBuffer { id: 11, byte_offset: 8, byte_stride: 8 },
                BoundVertexBuffer { id: 12, byte_offset: 0, byte_stride: 4 },
            ],
            index_buffer: Some(BoundIndexBuffer { id: 20, byte_offset: 2 }),
            draw: Some(DrawCall {
                num_indices: 3,
                num_instances: 2,
                index_offset: 1,
                index_byte_width: 2,
                instance_offset: 1,
                ..DrawCall::default()
            }),
            ..PipelineSnapshot::default()
        }
    }

    #[test]
    fn test_fetch_input_stage_ranges() {
        let pos = f32_bytes(&[0.0; 3 * 8]);
        // two bytes of padding, one skipped index, then 3 indices
        let idx: Vec<u8> = [0u8, 0, 9, 0, 0, 0, 4, 0, 2, 0].to_vec();
        let mut src = Recording {
            inner: MemoryReplay::new()
                .with_buffer(10, pos)
                .with_buffer(11, vec![0u8; 64])
                .with_buffer(20, idx),
            reads: Vec::new(),
        };

        let data = fetch_mesh(&mut src, &indexed_pipeline(), 0);

        assert_eq!(src.reads[0], (20, 4, 6));
        // per-vertex: max index 4 -> 5 elements
        assert_eq!(src.reads[1], (10, 0, 60));
        // per-instance: 2 instances starting at instance 1
        assert_eq!(src.reads[2], (11, 16, 16));
        // slot 2 is unused and never read
        assert_eq!(src.reads.len(), 3);

        let vs_in = &data.vs_in;
        assert_eq!(vs_in.row_count, 3);
        assert_eq!(vs_in.columns.len(), 2);
        assert_eq!(vs_in.buffers.len(), 3);
        assert!(vs_in.buffers[2].is_empty());
        let indices = vs_in.indices.as_ref().unwrap();
        assert_eq!(
            (0..3).map(|i| indices.read_u32(i).unwrap()).collect::<Vec<_>>(),
            vec![0, 4, 2]
        );
        assert!(data.diagnostics.is_empty());
    }

    #[test]
    fn test_fetch_non_indexed_with_base_vertex() {
        let mut pipeline = indexed_pipeline();
        pipeline.index_buffer = None;
        pipeline.vertex_inputs.truncate(1);
        if let Some(draw) = pipeline.draw.as_mut() {
            draw.index_byte_width = 0;
            draw.base_vertex = 2;
            draw.vertex_offset = 1;
        }
        let mut src = Recording {
            inner: MemoryReplay::new().with_buffer(10, vec![0u8; 120]),
            reads: Vec::new(),
        };

        let data = fetch_mesh(&mut src, &pipeline, 0);
        // max index 2, plus base vertex 2 -> 5 elements from vertex 1
        assert_eq!(src.reads, vec![(10, 12, 60)]);
        assert!(data.vs_in.indices.is_none());
        assert_eq!(data.vs_in.row_count, 3);
    }

    #[test]
    fn test_conflicting_usage_is_reported() {
        let mut pipeline = indexed_pipeline();
        pipeline.vertex_inputs[1].vertex_buffer = 0;
        let mut src = MemoryReplay::new().with_buffer(10, vec![0u8; 120]);

        let data = fetch_mesh(&mut src, &pipeline, 0);
        assert_eq!(data.diagnostics.len(), 1);
        assert!(data.diagnostics[0].contains("both instance and vertex"));
        // processing continued
        assert_eq!(data.vs_in.row_count, 3);
    }

    #[test]
    fn test_fetch_post_transform() {
        let mut pipeline = indexed_pipeline();
        pipeline.vs_output_signature = vec![
            SigParameter::new("uv", CompType::Float, 2),
            SigParameter::new("pos", CompType::Float, 4).position(),
        ];

        let post = MeshFormat {
            buffer: Some(30),
            offset: 0,
            stride: 24,
            num_verts: 3,
            near_plane: 0.5,
            far_plane: 50.0,
            ..MeshFormat::default()
        };
        let mut src = MemoryReplay::new()
            .with_buffer(30, f32_bytes(&[0.5; 18]))
            .with_post_transform(MeshDataStage::VSOut, 0, post.clone());

        let data = fetch_mesh(&mut src, &pipeline, 0);
        assert_eq!(data.post_vs, post);
        assert_eq!(data.vs_out.row_count, 3);
        assert_eq!(data.vs_out.columns[0].name, "pos");
        assert_eq!(data.vs_out.columns[0].offset, 8);
        assert_eq!(data.vs_out.buffers.len(), 1);
        assert_eq!(data.vs_out.buffers[0].len(), 72);
        assert!(data.vs_out.indices.is_none());

        // no geometry stage bound
        assert_eq!(data.gs_out.row_count, 0);
        assert!(data.gs_out.columns.is_empty());
    }

    #[test]
    fn test_input_mesh_format() {
        let mf = input_mesh_format(&indexed_pipeline());
        assert_eq!(mf.buffer, Some(10));
        assert_eq!(mf.stride, 12);
        assert_eq!(mf.num_verts, 3);
        assert_eq!(mf.index_buffer, Some(20));
        assert_eq!(mf.index_byte_width, 2);
        assert_eq!(mf.format, ResourceFormat::FLOAT3);

        let empty = input_mesh_format(&PipelineSnapshot::default());
        assert_eq!(empty.buffer, None);
        assert_eq!(empty.num_verts, 0);
    }
}
