//! Orbit camera around a look-at point, using a dolly rig.

use dolly::prelude::*;

use super::{CameraBasis, CameraController, MouseEvent, NavState, DRAG_SCALE};
use crate::util::math::{from_mint_point, to_mint_point, to_mint_quat};
use crate::util::{Quat, Vec2, Vec3, ViewportSize};

/// Smallest distance the camera may sit from its look-at point.
pub const MIN_DISTANCE: f32 = 1e-6;

/// Orbit camera: rotation about the look-at point plus an arm of `distance`.
pub struct ArcballCamera {
    rig: CameraRig,
    nav: NavState,
    look_at: Vec3,
    distance: f32,
    rotation: Quat,
    viewport: ViewportSize,
}

impl ArcballCamera {
    pub fn new(look_at: Vec3, distance: f32) -> Self {
        let rig = CameraRig::builder()
            .with(Position::new(to_mint_point(look_at)))
            .with(Rotation::new(to_mint_quat(Quat::IDENTITY)))
            .with(Arm::new(mint::Vector3 { x: 0.0, y: 0.0, z: distance }))
            .build();

        let mut cam = Self {
            rig,
            nav: NavState::default(),
            look_at,
            distance: 10.0,
            rotation: Quat::IDENTITY,
            viewport: ViewportSize::default(),
        };
        cam.set_distance(distance);
        cam
    }

    /// Back to an unrotated view of `look_at` from `distance`.
    pub fn reset(&mut self, look_at: Vec3, distance: f32) {
        self.rotation = Quat::IDENTITY;
        self.rig.driver_mut::<Rotation>().rotation = to_mint_quat(self.rotation);
        self.set_look_at(look_at);
        self.set_distance(distance);
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Set the orbit distance; the sign is dropped and tiny values clamped.
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.abs().max(MIN_DISTANCE);
        self.rig.driver_mut::<Arm>().offset.z = self.distance;
        self.sync();
    }

    #[inline]
    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn set_look_at(&mut self, look_at: Vec3) {
        self.look_at = look_at;
        self.rig.driver_mut::<Position>().position = to_mint_point(look_at);
        self.sync();
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Viewport recorded by the last update.
    #[inline]
    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    fn sync(&mut self) {
        self.rig.update(0.0);
    }

    /// Rotate by a cursor move from `from` to `to` (pixels).
    ///
    /// Not a literal arcball: the drag always starts at the centre of the
    /// sphere and only the relative motion, scaled by the smaller viewport
    /// dimension, is used. This keeps the feel consistent at extreme aspect
    /// ratios.
    pub fn rotate(&mut self, from: Vec2, to: Vec2) {
        if self.viewport.is_empty() {
            return;
        }
        let min_dim = self.viewport.min_dimension();

        let a = Vec2::ZERO;
        let b = Vec2::new(
            (to.x - from.x) / min_dim * 2.0,
            -((to.y - from.y) / min_dim * 2.0),
        );

        let pa = sphere_point(a);
        let pb = sphere_point(b);

        let axis = pa.cross(pb);
        if axis.length_squared() <= f32::EPSILON * f32::EPSILON {
            return;
        }
        let angle = pa.dot(pb).min(1.0).acos();
        let delta = Quat::from_axis_angle(axis.normalize(), angle);

        // Rotating the camera the opposite way makes the model follow the cursor.
        self.rotation = (self.rotation * delta.inverse()).normalize();
        self.rig.driver_mut::<Rotation>().rotation = to_mint_quat(self.rotation);
        self.sync();
    }

    /// Slide the look-at point in the view plane by a cursor delta (pixels).
    pub fn pan(&mut self, delta: Vec2) {
        let scale = self.distance.max(1.0) / DRAG_SCALE;
        let dx = delta.x * scale;
        let dy = delta.y * scale;

        let basis = self.basis();
        let look_at = self.look_at - basis.right * dx + basis.up * dy;
        self.set_look_at(look_at);
    }
}

/// Map a point in `[-1, 1]^2` onto the unit hemisphere facing the viewer.
/// Points outside the unit disc are pulled onto its rim.
fn sphere_point(p: Vec2) -> Vec3 {
    let len_sq = p.length_squared();
    if len_sq > 1.0 {
        let n = p / len_sq.sqrt();
        Vec3::new(n.x, n.y, 0.0)
    } else {
        Vec3::new(p.x, p.y, (1.0 - len_sq).sqrt())
    }
}

impl Default for ArcballCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 10.0)
    }
}

impl CameraController for ArcballCamera {
    fn nav(&self) -> &NavState {
        &self.nav
    }

    fn nav_mut(&mut self) -> &mut NavState {
        &mut self.nav
    }

    fn update(&mut self, viewport: ViewportSize) -> bool {
        self.viewport = viewport;
        false
    }

    fn mouse_wheel(&mut self, delta: f32) {
        let factor = 1.0 - delta / 2500.0;
        self.set_distance((self.distance * factor).max(MIN_DISTANCE));
    }

    fn mouse_move(&mut self, e: &MouseEvent) {
        if let Some(anchor) = self.nav.drag_anchor() {
            let panning = e.buttons.only_middle() || (e.buttons.only_left() && e.modifiers.alt);
            if panning {
                self.pan(e.pos - anchor);
            } else if e.buttons.only_left() {
                self.rotate(anchor, e.pos);
            }
        }

        self.nav.mouse_move(e);
    }

    fn basis(&self) -> CameraBasis {
        let t = &self.rig.final_transform;
        CameraBasis {
            position: from_mint_point(t.position),
            forward: t.forward(),
            right: t.right(),
            up: t.up(),
        }
    }
}
