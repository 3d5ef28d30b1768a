use crate::camera::Camera;
use crate::input::{Action, InputEvent, Keymap, route};

/// How the object is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Faces sampled from the texture.
    #[default]
    Textured,
    /// Faces filled with their flat color.
    Colored,
    /// Edges only.
    Wireframe,
}

impl RenderMode {
    pub fn next(self) -> Self {
        match self {
            RenderMode::Textured => RenderMode::Colored,
            RenderMode::Colored => RenderMode::Wireframe,
            RenderMode::Wireframe => RenderMode::Textured,
        }
    }

    /// Value of the `mode` uniform read by the fragment shader.
    pub(crate) fn shader_index(self) -> u32 {
        match self {
            RenderMode::Textured => 0,
            RenderMode::Colored => 1,
            RenderMode::Wireframe => 2,
        }
    }
}

/// Whether the object spins by itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationToggle(bool);

impl Default for RotationToggle {
    fn default() -> Self {
        Self(true)
    }
}

impl RotationToggle {
    pub fn new(enabled: bool) -> Self {
        Self(enabled)
    }

    pub fn toggle(&mut self) {
        self.0 = !self.0;
    }

    pub fn is_enabled(self) -> bool {
        self.0
    }
}

/// Whether the frame loop should keep going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything input can change, owned by the frame loop.
#[derive(Debug)]
pub struct SceneState<C> {
    pub camera: C,
    pub rotation: RotationToggle,
    pub mode: RenderMode,
    /// Window size in physical pixels.
    pub viewport: (u32, u32),
}

impl<C: Camera> SceneState<C> {
    pub fn new(mut camera: C, width: u32, height: u32) -> Self {
        camera.set_viewport(width, height);
        Self {
            camera,
            rotation: RotationToggle::default(),
            mode: RenderMode::default(),
            viewport: (width, height),
        }
    }

    /// Route an input event and apply the resulting action.
    pub fn handle(&mut self, event: &InputEvent, keymap: &Keymap, modifier_held: bool) -> Flow {
        self.apply(route(event, keymap, modifier_held))
    }

    pub fn apply(&mut self, action: Action) -> Flow {
        match action {
            Action::Quit => return Flow::Exit,
            Action::Resize { width, height } => {
                tracing::debug!(width, height, "viewport resized");
                self.viewport = (width, height);
                self.camera.set_viewport(width, height);
            }
            Action::Press { button, cursor } => self.camera.on_press(button, cursor),
            Action::Release(button) => self.camera.on_release(button),
            Action::Drag {
                cursor,
                modifier_held,
            } => self.camera.on_drag(cursor, modifier_held),
            Action::ToggleRotation => {
                self.rotation.toggle();
                tracing::debug!(enabled = self.rotation.is_enabled(), "rotation toggled");
            }
            Action::CycleRenderMode => {
                self.mode = self.mode.next();
                tracing::debug!(mode = ?self.mode, "render mode changed");
            }
            Action::Ignore => {}
        }
        Flow::Continue
    }
}
