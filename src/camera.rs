use glam::{Mat4, Vec2, Vec3};
use winit::event::MouseButton;

/// Perspective projection parameters shared by every camera strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lens {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport width divided by height.
    pub aspect: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov: 45.0_f32.to_radians(),
            near: 0.1,
            far: 50.0,
            aspect: 800.0 / 600.0,
        }
    }
}

impl Lens {
    /// Build a lens from a field of view in degrees.
    pub fn new(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            fov: fov_degrees.to_radians(),
            near,
            far,
            ..Self::default()
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Recompute the aspect ratio. A zero-height viewport (minimized window)
    /// keeps the previous value.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// Which camera strategy the app is built with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraKind {
    /// Drag to orbit around the origin, Ctrl-drag to zoom.
    #[default]
    Orbit,
    /// Fixed viewpoint that ignores pointer input.
    Static,
}

/// A camera strategy: produces view/projection matrices and optionally
/// reacts to pointer input.
pub trait Camera {
    /// Current eye position in world space.
    fn eye(&self) -> Vec3;

    /// `(projection, view)` for the current frame.
    fn projection_and_view(&self) -> (Mat4, Mat4);

    fn set_viewport(&mut self, width: u32, height: u32);

    fn on_press(&mut self, _button: MouseButton, _cursor: Vec2) {}

    fn on_release(&mut self, _button: MouseButton) {}

    fn on_drag(&mut self, _cursor: Vec2, _modifier_held: bool) {}
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    fn eye(&self) -> Vec3 {
        (**self).eye()
    }

    fn projection_and_view(&self) -> (Mat4, Mat4) {
        (**self).projection_and_view()
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        (**self).set_viewport(width, height);
    }

    fn on_press(&mut self, button: MouseButton, cursor: Vec2) {
        (**self).on_press(button, cursor);
    }

    fn on_release(&mut self, button: MouseButton) {
        (**self).on_release(button);
    }

    fn on_drag(&mut self, cursor: Vec2, modifier_held: bool) {
        (**self).on_drag(cursor, modifier_held);
    }
}

/// A camera whose world is translated by a fixed offset, looking down -Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticCamera {
    pub lens: Lens,
    /// Translation applied to the world (the eye sits at `-offset`).
    pub offset: Vec3,
}

impl Default for StaticCamera {
    fn default() -> Self {
        Self {
            lens: Lens::default(),
            offset: Vec3::new(0.0, 0.0, -5.0),
        }
    }
}

impl StaticCamera {
    pub fn new(offset: Vec3, lens: Lens) -> Self {
        Self { lens, offset }
    }
}

impl Camera for StaticCamera {
    fn eye(&self) -> Vec3 {
        -self.offset
    }

    fn projection_and_view(&self) -> (Mat4, Mat4) {
        (self.lens.projection(), Mat4::from_translation(self.offset))
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.lens.set_viewport(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lens_keeps_aspect_on_zero_height() {
        let mut lens = Lens::default();
        lens.set_viewport(1024, 512);
        assert_eq!(lens.aspect, 2.0);
        lens.set_viewport(1024, 0);
        assert_eq!(lens.aspect, 2.0);
    }

    #[test]
    fn static_camera_ignores_pointer_input() {
        let mut camera = StaticCamera::default();
        let before = camera.projection_and_view();
        camera.on_press(MouseButton::Left, Vec2::new(10.0, 10.0));
        camera.on_drag(Vec2::new(200.0, 300.0), false);
        camera.on_release(MouseButton::Left);
        assert_eq!(camera.projection_and_view(), before);
        assert_eq!(camera.eye(), Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn static_view_moves_origin_in_front_of_eye() {
        let (_, view) = StaticCamera::default().projection_and_view();
        let origin = view.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(0.0, 0.0, -5.0));
    }
}
