//! Preview cameras.
//!
//! Two navigation schemes share one input contract:
//!
//! - [`ArcballCamera`] orbits a look-at point. Left drag rotates, middle drag
//!   (or Alt + left drag) pans, the wheel zooms. Time alone never moves it.
//! - [`FlyCamera`] moves freely. W/S, A/D and Q/E move along forward, right
//!   and world up while held, left drag turns the view.
//!
//! [`Camera`] is the closed set of both, driven through [`CameraController`].

mod arcball;
mod fly;

pub use arcball::ArcballCamera;
pub use fly::FlyCamera;

use crate::util::{Mat4, Vec2, Vec3, ViewportSize};

/// Screen units per world unit for drag-based motion.
pub const DRAG_SCALE: f32 = 300.0;

/// Keys the cameras react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, alt: false, ctrl: false };
    pub const SHIFT: Self = Self { shift: true, alt: false, ctrl: false };
    pub const ALT: Self = Self { shift: false, alt: true, ctrl: false };
}

/// Mouse buttons held during an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseButtons {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

impl MouseButtons {
    pub const NONE: Self = Self { left: false, middle: false, right: false };
    pub const LEFT: Self = Self { left: true, middle: false, right: false };
    pub const MIDDLE: Self = Self { left: false, middle: true, right: false };
    pub const RIGHT: Self = Self { left: false, middle: false, right: true };

    #[inline]
    pub fn only_left(&self) -> bool {
        self.left && !self.middle && !self.right
    }

    #[inline]
    pub fn only_middle(&self) -> bool {
        self.middle && !self.left && !self.right
    }

    /// Buttons that start or continue a camera drag.
    #[inline]
    pub fn drags(&self) -> bool {
        self.left || self.middle
    }
}

/// Pointer event in viewport pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseEvent {
    pub pos: Vec2,
    pub buttons: MouseButtons,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(x: f32, y: f32, buttons: MouseButtons) -> Self {
        Self {
            pos: Vec2::new(x, y),
            buttons,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Camera position and orientation axes in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl CameraBasis {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Fwd = 0,
    Horiz = 1,
    Vert = 2,
}

/// Input state shared by both cameras: held movement keys, speed boost and
/// the drag anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct NavState {
    /// User speed scale applied on top of the Shift boost.
    pub speed_multiplier: f32,
    current_speed: f32,
    moves: [i32; 3],
    drag_anchor: Option<Vec2>,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            speed_multiplier: 0.05,
            current_speed: 1.0,
            moves: [0; 3],
            drag_anchor: None,
        }
    }
}

impl NavState {
    /// Distance moved per tick along a held axis.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.current_speed * self.speed_multiplier
    }

    /// 1.0, or 3.0 while Shift was held at the last key event.
    #[inline]
    pub fn speed_scale(&self) -> f32 {
        self.current_speed
    }

    #[inline]
    pub fn forward(&self) -> i32 {
        self.moves[Axis::Fwd as usize]
    }

    #[inline]
    pub fn horizontal(&self) -> i32 {
        self.moves[Axis::Horiz as usize]
    }

    #[inline]
    pub fn vertical(&self) -> i32 {
        self.moves[Axis::Vert as usize]
    }

    #[inline]
    pub fn drag_anchor(&self) -> Option<Vec2> {
        self.drag_anchor
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    fn set_move(&mut self, axis: Axis, value: i32) {
        self.moves[axis as usize] = value;
    }

    fn set_boost(&mut self, modifiers: Modifiers) {
        self.current_speed = if modifiers.shift { 3.0 } else { 1.0 };
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        match key {
            Key::W => self.set_move(Axis::Fwd, 1),
            Key::S => self.set_move(Axis::Fwd, -1),
            Key::Q => self.set_move(Axis::Vert, 1),
            Key::E => self.set_move(Axis::Vert, -1),
            Key::D => self.set_move(Axis::Horiz, 1),
            Key::A => self.set_move(Axis::Horiz, -1),
            Key::Other => {}
        }
        self.set_boost(modifiers);
    }

    pub fn key_up(&mut self, key: Key, modifiers: Modifiers) {
        match key {
            Key::A | Key::D => self.set_move(Axis::Horiz, 0),
            Key::Q | Key::E => self.set_move(Axis::Vert, 0),
            Key::W | Key::S => self.set_move(Axis::Fwd, 0),
            Key::Other => {}
        }
        self.set_boost(modifiers);
    }

    pub fn mouse_click(&mut self, e: &MouseEvent) {
        if e.buttons.drags() {
            self.drag_anchor = Some(e.pos);
        }
    }

    /// Track the anchor after a move has been applied: it follows the cursor
    /// while a drag button is held and is dropped on release.
    pub fn mouse_move(&mut self, e: &MouseEvent) {
        self.drag_anchor = if e.buttons.drags() { Some(e.pos) } else { None };
    }

    /// Forget held keys and drags, e.g. when focus leaves the preview.
    pub fn release_all(&mut self) {
        self.moves = [0; 3];
        self.drag_anchor = None;
        self.current_speed = 1.0;
    }
}

/// Input and update contract of a preview camera.
///
/// Key and click handling is common to both cameras and provided here;
/// implementors supply motion.
pub trait CameraController {
    fn nav(&self) -> &NavState;
    fn nav_mut(&mut self) -> &mut NavState;

    /// Per-tick integration. Returns true if the camera moved and the preview
    /// needs redrawing.
    fn update(&mut self, viewport: ViewportSize) -> bool;

    fn mouse_wheel(&mut self, delta: f32);

    fn mouse_move(&mut self, e: &MouseEvent);

    fn basis(&self) -> CameraBasis;

    fn mouse_click(&mut self, e: &MouseEvent) {
        self.nav_mut().mouse_click(e);
    }

    fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        self.nav_mut().key_down(key, modifiers);
    }

    fn key_up(&mut self, key: Key, modifiers: Modifiers) {
        self.nav_mut().key_up(key, modifiers);
    }

    fn view_matrix(&self) -> Mat4 {
        self.basis().view_matrix()
    }

    fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.nav_mut().speed_multiplier = multiplier;
    }
}

/// Which navigation scheme is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CameraKind {
    #[default]
    Arcball,
    Fly,
}

/// The preview camera: one of the two schemes.
pub enum Camera {
    Arcball(ArcballCamera),
    Fly(FlyCamera),
}

impl Camera {
    pub fn kind(&self) -> CameraKind {
        match self {
            Self::Arcball(_) => CameraKind::Arcball,
            Self::Fly(_) => CameraKind::Fly,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::Arcball(ArcballCamera::default())
    }
}

impl CameraController for Camera {
    fn nav(&self) -> &NavState {
        match self {
            Self::Arcball(c) => c.nav(),
            Self::Fly(c) => c.nav(),
        }
    }

    fn nav_mut(&mut self) -> &mut NavState {
        match self {
            Self::Arcball(c) => c.nav_mut(),
            Self::Fly(c) => c.nav_mut(),
        }
    }

    fn update(&mut self, viewport: ViewportSize) -> bool {
        match self {
            Self::Arcball(c) => c.update(viewport),
            Self::Fly(c) => c.update(viewport),
        }
    }

    fn mouse_wheel(&mut self, delta: f32) {
        match self {
            Self::Arcball(c) => c.mouse_wheel(delta),
            Self::Fly(c) => c.mouse_wheel(delta),
        }
    }

    fn mouse_move(&mut self, e: &MouseEvent) {
        match self {
            Self::Arcball(c) => c.mouse_move(e),
            Self::Fly(c) => c.mouse_move(e),
        }
    }

    fn basis(&self) -> CameraBasis {
        match self {
            Self::Arcball(c) => c.basis(),
            Self::Fly(c) => c.basis(),
        }
    }
}
