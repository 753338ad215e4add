//! Display configuration handed to the preview renderer.

use serde::{Deserialize, Serialize};

use crate::camera::{CameraBasis, CameraKind};
use crate::util::{Mat4, Vec3};

use super::replay::MeshFormat;

/// Pipeline point the vertex data is sampled at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshDataStage {
    #[default]
    VSIn,
    VSOut,
    GSOut,
}

impl MeshDataStage {
    pub const ALL: [Self; 3] = [Self::VSIn, Self::VSOut, Self::GSOut];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::VSIn => 0,
            Self::VSOut => 1,
            Self::GSOut => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::VSIn => "VS Input",
            Self::VSOut => "VS Output",
            Self::GSOut => "GS/DS Output",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolidShadeMode {
    #[default]
    None,
    Solid,
    Lit,
    /// Colour from the second attribute
    Secondary,
}

/// How much geometry around the selected draw is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DrawRange {
    #[default]
    OnlyThisDraw,
    PreviousInstances,
    AllInstances,
    WholePass,
}

impl DrawRange {
    pub fn show_prev_instances(self) -> bool {
        self >= Self::PreviousInstances
    }

    pub fn show_all_instances(self) -> bool {
        self >= Self::AllInstances
    }

    pub fn show_whole_pass(self) -> bool {
        self >= Self::WholePass
    }
}

/// User guesses for the projection that produced post-transform positions.
///
/// Unset overrides fall back to the viewport aspect and the near/far planes
/// estimated from the data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraGuess {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    pub ortho: bool,
}

impl Default for CameraGuess {
    fn default() -> Self {
        Self {
            fov: 90.0,
            aspect: None,
            near: None,
            far: None,
            ortho: false,
        }
    }
}

impl CameraGuess {
    /// Non-positive override values mean "not overridden".
    pub fn with_overrides(mut self, aspect: f32, near: f32, far: f32) -> Self {
        self.aspect = (aspect > 0.0).then_some(aspect);
        self.near = (near > 0.0).then_some(near);
        self.far = (far > 0.0).then_some(far);
        self
    }
}

/// Default planes when neither a guess nor an estimate is available.
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

/// Everything the renderer needs for one frame of the preview.
///
/// Built from controller state before every display, never patched.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshDisplayConfig {
    pub stage: MeshDataStage,
    pub camera_kind: CameraKind,
    pub camera: CameraBasis,
    pub view: Mat4,

    pub wireframe: bool,
    pub shade_mode: SolidShadeMode,
    pub show_prev_instances: bool,
    pub show_all_instances: bool,
    pub show_whole_pass: bool,
    /// Selected vertex, `u32::MAX` for none.
    pub highlight_vertex: u32,
    pub cur_instance: u32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub ortho: bool,

    pub position: MeshFormat,
}

impl MeshDisplayConfig {
    /// Projection that (approximately) produced the post-transform data.
    pub fn projection(&self) -> Mat4 {
        if self.ortho {
            let h = self.far.max(self.near) * 0.5;
            let w = h * self.aspect;
            Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
        } else {
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
        }
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position
    }
}
