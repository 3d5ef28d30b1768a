use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3};
use winit::event::MouseButton;

use crate::camera::{Camera, Lens};

/// Lower bound for the polar angle; keeps the eye off the +Z pole.
pub const POLAR_EPSILON: f32 = 1e-5;

/// Errors raised while constructing an orbit camera.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CameraError {
    #[error("camera eye {0} has no direction; spherical coordinates are undefined")]
    Degenerate(Vec3),
    #[error("spherical coordinates must be finite: radius {radius}, polar {polar}, azimuth {azimuth}")]
    NonFinite { radius: f32, polar: f32, azimuth: f32 },
}

/// Tuning for drag and zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitConfig {
    /// Closest allowed distance to the target.
    pub radius_min: f32,
    /// Farthest allowed distance to the target.
    pub radius_max: f32,
    /// Mouse button that starts a drag.
    pub drag_button: MouseButton,
    /// Radians (or world units when zooming) per pixel of drag.
    pub speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            radius_min: 4.0,
            radius_max: 20.0,
            drag_button: MouseButton::Left,
            speed: 0.01,
        }
    }
}

/// Which button is being dragged and where the cursor was last seen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
    pub active_button: Option<MouseButton>,
    pub last_cursor: Option<Vec2>,
}

impl DragState {
    pub fn is_active(&self) -> bool {
        self.active_button.is_some()
    }
}

/// A camera on a sphere around the origin, steered by pointer drags.
///
/// The state is spherical: `radius`, `polar` (angle from +Z) and `azimuth`
/// (angle around Z from +X). The eye position is derived from them on every
/// call and never stored.
///
/// # Example
/// ```
/// use orbitlab::{Lens, MouseButton, OrbitCamera, OrbitConfig, Vec2, Vec3};
///
/// let mut orbit = OrbitCamera::initialize(
///     Vec3::new(0.0, 0.0, -5.0),
///     Lens::default(),
///     OrbitConfig::default(),
/// )
/// .unwrap();
///
/// orbit.on_press(MouseButton::Left, Vec2::new(100.0, 100.0));
/// orbit.on_drag(Vec2::new(90.0, 110.0), false);
/// orbit.on_release(MouseButton::Left);
///
/// let (proj, view) = orbit.projection_and_view();
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    radius: f32,
    polar: f32,
    azimuth: f32,
    /// Perspective parameters.
    pub lens: Lens,
    target: Vec3,
    /// Up vector handed to the look-at.
    pub up: Vec3,
    config: OrbitConfig,
    drag: DragState,
}

impl OrbitCamera {
    /// Derive the spherical state from a Cartesian eye position.
    ///
    /// `azimuth` is `atan(y / x)`, or `0` when the eye lies in the `x = 0`
    /// plane. The radius `|eye|` is clamped into
    /// `[config.radius_min, config.radius_max]`, so an eye closer or farther
    /// than that range is moved along its direction onto the boundary.
    /// Fails when the eye is at the origin.
    pub fn initialize(eye: Vec3, lens: Lens, config: OrbitConfig) -> Result<Self, CameraError> {
        let radius = eye.length();
        if radius == 0.0 || !radius.is_finite() {
            return Err(CameraError::Degenerate(eye));
        }

        let polar = (eye.z / radius).clamp(-1.0, 1.0).acos();
        let azimuth = if eye.x != 0.0 {
            (eye.y / eye.x).atan()
        } else {
            0.0
        };

        Self::from_spherical(radius, polar, azimuth, lens, config)
    }

    /// Build directly from spherical coordinates, clamping into range.
    /// Non-finite coordinates are rejected.
    pub fn from_spherical(
        radius: f32,
        polar: f32,
        azimuth: f32,
        lens: Lens,
        config: OrbitConfig,
    ) -> Result<Self, CameraError> {
        if !(radius.is_finite() && polar.is_finite() && azimuth.is_finite()) {
            return Err(CameraError::NonFinite {
                radius,
                polar,
                azimuth,
            });
        }
        Ok(Self {
            radius: radius.clamp(config.radius_min, config.radius_max),
            polar: polar.clamp(POLAR_EPSILON, PI),
            azimuth,
            lens,
            target: Vec3::ZERO,
            up: Vec3::Z,
            config,
            drag: DragState::default(),
        })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    /// Start tracking a drag if `button` is the configured drag button.
    pub fn on_press(&mut self, button: MouseButton, cursor: Vec2) {
        if button != self.config.drag_button {
            return;
        }
        self.drag = DragState {
            active_button: Some(button),
            last_cursor: Some(cursor),
        };
    }

    /// Stop tracking when the tracked button goes up.
    pub fn on_release(&mut self, button: MouseButton) {
        if self.drag.active_button == Some(button) {
            self.drag = DragState::default();
        }
    }

    /// Apply one pointer motion.
    ///
    /// The displacement is `last - cursor` (old minus new). With the modifier
    /// held, its `y` component zooms; otherwise `x` turns the azimuth and `y`
    /// the polar angle.
    pub fn on_drag(&mut self, cursor: Vec2, modifier_held: bool) {
        if !self.drag.is_active() {
            return;
        }
        let Some(last) = self.drag.last_cursor.replace(cursor) else {
            return;
        };

        let delta = last - cursor;
        let speed = self.config.speed;

        if modifier_held {
            self.radius = (self.radius + speed * delta.y)
                .clamp(self.config.radius_min, self.config.radius_max);
        } else {
            self.azimuth += speed * delta.x;
            self.polar = (self.polar + speed * delta.y).clamp(POLAR_EPSILON, PI);
        }
    }

    /// Eye position derived from the spherical state.
    pub fn current_eye(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.target
            + self.radius * Vec3::new(sin_polar * cos_azimuth, sin_polar * sin_azimuth, cos_polar)
    }

    /// Perspective projection and look-at view for the current state.
    pub fn projection_and_view(&self) -> (Mat4, Mat4) {
        let eye = self.current_eye();
        let view = Mat4::look_at_rh(eye, self.target, self.view_up(eye));
        (self.lens.projection(), view)
    }

    /// `up`, unless the view direction is parallel to it. Then the meridian
    /// tangent (the direction of decreasing polar angle) takes its place so
    /// the look-at stays finite at the poles.
    fn view_up(&self, eye: Vec3) -> Vec3 {
        let forward = (self.target - eye).normalize_or_zero();
        if forward.cross(self.up).length_squared() > 1e-8 {
            return self.up;
        }
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        let tangent = Vec3::new(-cos_polar * cos_azimuth, -cos_polar * sin_azimuth, sin_polar);
        tangent.try_normalize().unwrap_or_else(|| forward.any_orthonormal_vector())
    }
}

impl Camera for OrbitCamera {
    fn eye(&self) -> Vec3 {
        self.current_eye()
    }

    fn projection_and_view(&self) -> (Mat4, Mat4) {
        OrbitCamera::projection_and_view(self)
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.lens.set_viewport(width, height);
    }

    fn on_press(&mut self, button: MouseButton, cursor: Vec2) {
        OrbitCamera::on_press(self, button, cursor);
    }

    fn on_release(&mut self, button: MouseButton) {
        OrbitCamera::on_release(self, button);
    }

    fn on_drag(&mut self, cursor: Vec2, modifier_held: bool) {
        OrbitCamera::on_drag(self, cursor, modifier_held);
    }
}
