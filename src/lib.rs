//! # Orbitlab
//!
//! **A textured cube you can orbit with the mouse.**
//!
//! One window shows a spinning polyhedron with an image mapped onto every
//! face. Dragging with the left button orbits the camera around the origin,
//! and dragging with left Ctrl held zooms in and out.
//!
//! ## Quick Start
//!
//! ```no_run
//! use orbitlab::*;
//!
//! fn main() -> Result<(), AppError> {
//!     run(AppConfig::new().title("Lab").texture_path("wall.jpg"))
//! }
//! ```
//!
//! ## Controls
//!
//! - **Left drag**: orbit around the target
//! - **Ctrl + left drag**: zoom
//! - **Space**: pause or resume the spin
//! - **M**: cycle textured, colored and wireframe drawing
//! - **Escape**: quit
//!
//! The pieces work without a window as well: [`OrbitCamera`] and
//! [`SceneState`] take plain input events, and [`TextureImage`] prepares
//! pixels without a GPU.

mod app;
mod camera;
mod composer;
mod frame;
mod geometry;
mod gpu;
mod input;
mod mesh;
mod orbit_camera;
mod state;
mod texture;

pub use app::{AppConfig, AppError, run};
pub use camera::{Camera, CameraKind, Lens, StaticCamera};
pub use composer::{FrameUniforms, ModelSpin, RenderComposer, SPIN_AXIS, SPIN_STEP_DEGREES};
pub use frame::{FpsCounter, FrameLimiter};
pub use geometry::{GeometryError, Polyhedron};
pub use gpu::{GpuContext, GpuError};
pub use input::{Action, EventTranslator, InputEvent, Keymap, route};
pub use mesh::{Mesh, MeshData, Vertex3d};
pub use orbit_camera::{CameraError, DragState, OrbitCamera, OrbitConfig, POLAR_EPSILON};
pub use state::{Flow, RenderMode, RotationToggle, SceneState};
pub use texture::{Texture, TextureError, TextureImage, TextureOptions, WrapMode, next_pow2};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
