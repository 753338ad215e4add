//! Collaborator interfaces: the replay backend, the preview surface and the
//! pipeline state snapshot they are driven from.

use std::collections::HashMap;

use crate::format::{CompType, ResourceFormat};
use crate::util::{Error, Result};

use super::config::{MeshDataStage, MeshDisplayConfig};

/// Opaque handle of a GPU resource in the replay.
pub type ResourceId = u64;

/// Primitive topology of a draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
    /// Patch list with N control points
    PatchList(u32),
}

/// Replay backend that owns the captured frame.
///
/// Lives on the fetch worker thread; every call may block.
pub trait ReplaySource: Send {
    /// `len == 0` reads to the end of the buffer.
    fn buffer_data(&mut self, id: ResourceId, offset: u64, len: u64) -> Result<Vec<u8>>;

    fn texture_data(&mut self, id: ResourceId, array_idx: u32, mip: u32) -> Result<Vec<u8>>;

    /// Transformed vertex data for one instance of the current draw.
    fn post_vs_data(&mut self, instance: u32, stage: MeshDataStage) -> Result<MeshFormat>;

    /// Vertex under pixel `(x, y)` in the preview for `event`, with its instance.
    fn pick_vertex(&mut self, event: u32, x: u32, y: u32) -> Option<(u32, u32)>;
}

/// Preview surface. Receives a fresh display configuration before every draw.
pub trait RenderTarget {
    fn set_mesh_display(&mut self, config: &MeshDisplayConfig);
    fn display(&mut self);
}

/// Where the position data of one stage lives, as the renderer reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshFormat {
    pub buffer: Option<ResourceId>,
    pub offset: u64,
    pub stride: u32,
    pub format: ResourceFormat,

    pub index_buffer: Option<ResourceId>,
    pub index_offset: u64,
    pub index_byte_width: u32,
    pub base_vertex: i32,

    pub num_verts: u32,
    pub topology: Topology,

    /// Estimated from the transformed positions; non-positive when unknown.
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for MeshFormat {
    fn default() -> Self {
        Self {
            buffer: None,
            offset: 0,
            stride: 0,
            format: ResourceFormat::FLOAT4,
            index_buffer: None,
            index_offset: 0,
            index_byte_width: 4,
            base_vertex: 0,
            num_verts: 0,
            topology: Topology::TriangleList,
            near_plane: 0.0,
            far_plane: 0.0,
        }
    }
}

/// One vertex input attribute of the bound input layout.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexInputAttribute {
    pub name: String,
    pub vertex_buffer: usize,
    pub byte_offset: u32,
    pub format: ResourceFormat,
    pub per_instance: bool,
    pub instance_rate: u32,
    /// Read by the vertex shader. Unused inputs get no columns.
    pub used: bool,
}

impl VertexInputAttribute {
    pub fn new(name: impl Into<String>, vertex_buffer: usize, byte_offset: u32, format: ResourceFormat) -> Self {
        Self {
            name: name.into(),
            vertex_buffer,
            byte_offset,
            format,
            per_instance: false,
            instance_rate: 1,
            used: true,
        }
    }

    pub fn per_instance(mut self, rate: u32) -> Self {
        self.per_instance = true;
        self.instance_rate = rate;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundVertexBuffer {
    pub id: ResourceId,
    pub byte_offset: u64,
    pub byte_stride: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundIndexBuffer {
    pub id: ResourceId,
    pub byte_offset: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Width over height, `None` for a degenerate viewport.
    pub fn aspect(&self) -> Option<f32> {
        (self.width > 0.0 && self.height > 0.0).then(|| self.width / self.height)
    }
}

/// Parameters of the selected draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub event_id: u32,
    pub num_indices: u32,
    pub num_instances: u32,
    pub index_offset: u32,
    /// 0 for non-indexed draws
    pub index_byte_width: u32,
    pub base_vertex: i32,
    pub vertex_offset: u32,
    pub instance_offset: u32,
    pub topology: Topology,
}

impl Default for DrawCall {
    fn default() -> Self {
        Self {
            event_id: 0,
            num_indices: 0,
            num_instances: 1,
            index_offset: 0,
            index_byte_width: 0,
            base_vertex: 0,
            vertex_offset: 0,
            instance_offset: 0,
            topology: Topology::TriangleList,
        }
    }
}

/// One output of a shader stage signature.
#[derive(Clone, Debug, PartialEq)]
pub struct SigParameter {
    /// Variable name; may be empty.
    pub var_name: String,
    /// Semantic with index, e.g. `TEXCOORD1`. Used when `var_name` is empty.
    pub semantic_name: String,
    pub comp_type: CompType,
    pub comp_count: u8,
    /// Carries the clip-space position.
    pub is_position: bool,
}

impl SigParameter {
    pub fn new(name: impl Into<String>, comp_type: CompType, comp_count: u8) -> Self {
        Self {
            var_name: name.into(),
            semantic_name: String::new(),
            comp_type,
            comp_count,
            is_position: false,
        }
    }

    pub fn position(mut self) -> Self {
        self.is_position = true;
        self
    }

    pub fn display_name(&self) -> &str {
        if self.var_name.is_empty() {
            &self.semantic_name
        } else {
            &self.var_name
        }
    }
}

/// Pipeline state at the selected event, captured by value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineSnapshot {
    pub vertex_inputs: Vec<VertexInputAttribute>,
    pub vertex_buffers: Vec<BoundVertexBuffer>,
    pub index_buffer: Option<BoundIndexBuffer>,
    pub viewport: Viewport,
    /// `None` when the event is not a draw.
    pub draw: Option<DrawCall>,
    pub vs_output_signature: Vec<SigParameter>,
    /// Geometry (or domain) stage outputs; empty when that stage is unbound.
    pub gs_output_signature: Vec<SigParameter>,
    /// Post-transform data is padded to 2/4-element boundaries.
    pub aligned_post_vs: bool,
    pub tessellation: bool,
}

impl PipelineSnapshot {
    pub fn event_id(&self) -> u32 {
        self.draw.map(|d| d.event_id).unwrap_or(0)
    }

    pub fn num_instances(&self) -> u32 {
        self.draw.map(|d| d.num_instances).unwrap_or(0)
    }
}

/// In-memory replay source, for offline inspection of dumped resources.
#[derive(Clone, Debug, Default)]
pub struct MemoryReplay {
    buffers: HashMap<ResourceId, Vec<u8>>,
    textures: HashMap<(ResourceId, u32, u32), Vec<u8>>,
    post_transform: HashMap<(MeshDataStage, u32), MeshFormat>,
    picks: HashMap<(u32, u32), (u32, u32)>,
}

impl MemoryReplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer(mut self, id: ResourceId, data: Vec<u8>) -> Self {
        self.buffers.insert(id, data);
        self
    }

    pub fn with_texture(mut self, id: ResourceId, array_idx: u32, mip: u32, data: Vec<u8>) -> Self {
        self.textures.insert((id, array_idx, mip), data);
        self
    }

    /// Post-transform data for `stage` at `instance`.
    pub fn with_post_transform(mut self, stage: MeshDataStage, instance: u32, format: MeshFormat) -> Self {
        self.post_transform.insert((stage, instance), format);
        self
    }

    /// Answer a pick at pixel `(x, y)` with `(vertex, instance)`.
    pub fn with_pick(mut self, x: u32, y: u32, vertex: u32, instance: u32) -> Self {
        self.picks.insert((x, y), (vertex, instance));
        self
    }
}

impl ReplaySource for MemoryReplay {
    fn buffer_data(&mut self, id: ResourceId, offset: u64, len: u64) -> Result<Vec<u8>> {
        let data = self.buffers.get(&id).ok_or(Error::BufferNotFound(id))?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let end = if len == 0 {
            data.len()
        } else {
            let len = usize::try_from(len).unwrap_or(usize::MAX);
            start.saturating_add(len).min(data.len())
        };
        Ok(data[start..end].to_vec())
    }

    fn texture_data(&mut self, id: ResourceId, array_idx: u32, mip: u32) -> Result<Vec<u8>> {
        self.textures
            .get(&(id, array_idx, mip))
            .cloned()
            .ok_or(Error::TextureNotFound(id))
    }

    fn post_vs_data(&mut self, instance: u32, stage: MeshDataStage) -> Result<MeshFormat> {
        Ok(self
            .post_transform
            .get(&(stage, instance))
            .cloned()
            .unwrap_or_default())
    }

    fn pick_vertex(&mut self, _event: u32, x: u32, y: u32) -> Option<(u32, u32)> {
        self.picks.get(&(x, y)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_buffer_ranges() {
        let mut src = MemoryReplay::new().with_buffer(7, (0u8..16).collect());
        assert_eq!(src.buffer_data(7, 4, 4).unwrap(), vec![4, 5, 6, 7]);
        assert_eq!(src.buffer_data(7, 12, 0).unwrap(), vec![12, 13, 14, 15]);
        assert_eq!(src.buffer_data(7, 14, 100).unwrap(), vec![14, 15]);
        assert!(src.buffer_data(7, 100, 4).unwrap().is_empty());
        assert!(matches!(src.buffer_data(8, 0, 0), Err(Error::BufferNotFound(8))));
    }

    #[test]
    fn test_memory_textures_and_picks() {
        let mut src = MemoryReplay::new()
            .with_texture(3, 1, 2, vec![1, 2])
            .with_pick(10, 20, 5, 1);
        assert_eq!(src.texture_data(3, 1, 2).unwrap(), vec![1, 2]);
        assert!(matches!(src.texture_data(3, 0, 0), Err(Error::TextureNotFound(3))));
        assert_eq!(src.pick_vertex(0, 10, 20), Some((5, 1)));
        assert_eq!(src.pick_vertex(0, 0, 0), None);
    }

    #[test]
    fn test_viewport_aspect() {
        let vp = Viewport { x: 0.0, y: 0.0, width: 200.0, height: 100.0 };
        assert_eq!(vp.aspect(), Some(2.0));
        assert_eq!(Viewport::default().aspect(), None);
    }

    #[test]
    fn test_sig_display_name() {
        let mut sig = SigParameter::new("", CompType::Float, 4);
        sig.semantic_name = "TEXCOORD0".into();
        assert_eq!(sig.display_name(), "TEXCOORD0");
        assert_eq!(SigParameter::new("pos", CompType::Float, 4).display_name(), "pos");
    }
}
