//! Free-flying camera, using a dolly rig.

use dolly::prelude::*;

use super::{CameraBasis, CameraController, MouseEvent, NavState, DRAG_SCALE};
use crate::util::math::{from_mint_point, to_mint_point, to_mint_quat};
use crate::util::{EulerRot, Quat, Vec3, ViewportSize};

/// First-person camera. Rotation is stored as pitch (x), yaw (y) and roll (z)
/// in radians.
pub struct FlyCamera {
    rig: CameraRig,
    nav: NavState,
    position: Vec3,
    rotation: Vec3,
}

impl FlyCamera {
    pub fn new(position: Vec3) -> Self {
        let rig = CameraRig::builder()
            .with(Position::new(to_mint_point(position)))
            .with(Rotation::new(to_mint_quat(Quat::IDENTITY)))
            .build();

        Self {
            rig,
            nav: NavState::default(),
            position,
            rotation: Vec3::ZERO,
        }
    }

    /// Move to `position` facing down -Z.
    pub fn reset(&mut self, position: Vec3) {
        self.position = position;
        self.rotation = Vec3::ZERO;
        self.sync();
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.sync();
    }

    /// Pitch, yaw and roll in radians.
    #[inline]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.sync();
    }

    fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }

    fn sync(&mut self) {
        let orientation = self.orientation();
        self.rig.driver_mut::<Rotation>().rotation = to_mint_quat(orientation);
        self.rig.driver_mut::<Position>().position = to_mint_point(self.position);
        self.rig.update(0.0);
    }
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl CameraController for FlyCamera {
    fn nav(&self) -> &NavState {
        &self.nav
    }

    fn nav_mut(&mut self) -> &mut NavState {
        &mut self.nav
    }

    fn update(&mut self, _viewport: ViewportSize) -> bool {
        let (fwd, horiz, vert) = (self.nav.forward(), self.nav.horizontal(), self.nav.vertical());
        if fwd == 0 && horiz == 0 && vert == 0 {
            return false;
        }

        let speed = self.nav.speed();
        let basis = self.basis();

        let mut pos = self.position;
        pos += basis.right * speed * horiz as f32;
        // vertical motion is along world up, not the view's up
        pos.y += speed * vert as f32;
        pos += basis.forward * speed * fwd as f32;

        self.set_position(pos);
        true
    }

    /// The wheel does nothing for a fly camera.
    fn mouse_wheel(&mut self, _delta: f32) {}

    fn mouse_move(&mut self, e: &MouseEvent) {
        if let Some(anchor) = self.nav.drag_anchor() {
            if e.buttons.only_left() {
                let delta = e.pos - anchor;
                let mut rot = self.rotation;
                rot.y -= delta.x / DRAG_SCALE;
                rot.x -= delta.y / DRAG_SCALE;
                self.set_rotation(rot);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Key, Modifiers, MouseButtons};

    const VP: ViewportSize = ViewportSize::new(640.0, 480.0);

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_idle_update_reports_no_motion() {
        let mut cam = FlyCamera::default();
        assert!(!cam.update(VP));
        assert_eq!(cam.position(), Vec3::ZERO);
    }

    #[test]
    fn test_forward_motion() {
        let mut cam = FlyCamera::default();
        cam.key_down(Key::W, Modifiers::NONE);
        assert!(cam.update(VP));
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, -0.05)));

        cam.key_down(Key::W, Modifiers::SHIFT);
        assert!(cam.update(VP));
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, -0.2)));
    }

    #[test]
    fn test_key_down_then_up_is_no_motion() {
        for key in [Key::W, Key::A, Key::S, Key::D, Key::Q, Key::E] {
            let mut cam = FlyCamera::default();
            cam.key_down(key, Modifiers::NONE);
            cam.key_up(key, Modifiers::NONE);
            assert!(!cam.update(VP), "{:?}", key);
            assert_eq!(cam.position(), Vec3::ZERO);
        }
    }

    #[test]
    fn test_vertical_uses_world_up() {
        let mut cam = FlyCamera::default();
        cam.set_rotation(Vec3::new(-1.0, 0.3, 0.0));
        cam.key_down(Key::Q, Modifiers::NONE);
        cam.update(VP);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.05, 0.0)));
    }

    #[test]
    fn test_strafe_right() {
        let mut cam = FlyCamera::default();
        cam.key_down(Key::D, Modifiers::NONE);
        cam.update(VP);
        assert!(approx(cam.position(), Vec3::new(0.05, 0.0, 0.0)));
    }

    #[test]
    fn test_drag_turns() {
        let mut cam = FlyCamera::default();
        cam.mouse_click(&MouseEvent::new(100.0, 100.0, MouseButtons::LEFT));
        cam.mouse_move(&MouseEvent::new(130.0, 70.0, MouseButtons::LEFT));
        let rot = cam.rotation();
        assert!((rot.y - (-0.1)).abs() < 1e-6);
        assert!((rot.x - 0.1).abs() < 1e-6);

        // turning left 90 degrees faces -X
        cam.set_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        assert!(approx(cam.basis().forward, Vec3::NEG_X));
    }

    #[test]
    fn test_wheel_and_middle_drag_ignored() {
        let mut cam = FlyCamera::default();
        cam.mouse_wheel(500.0);
        cam.mouse_click(&MouseEvent::new(0.0, 0.0, MouseButtons::MIDDLE));
        cam.mouse_move(&MouseEvent::new(50.0, 50.0, MouseButtons::MIDDLE));
        assert_eq!(cam.rotation(), Vec3::ZERO);
        assert_eq!(cam.position(), Vec3::ZERO);
    }

    #[test]
    fn test_reset() {
        let mut cam = FlyCamera::default();
        cam.set_rotation(Vec3::new(0.5, 0.5, 0.0));
        cam.reset(Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(cam.rotation(), Vec3::ZERO);
        assert!(approx(cam.basis().position, Vec3::new(0.0, 0.0, -10.0)));
        assert!(approx(cam.basis().forward, Vec3::NEG_Z));
    }
}
