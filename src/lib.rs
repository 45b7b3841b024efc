//! Interactive ray-marching viewer.
//!
//! A fly-through camera, a point light and a handful of per-frame values are
//! packed into a uniform block and fed to a full-screen fragment shader. The
//! camera, input and uniform code is independent of the window and GPU so it
//! can be driven from tests; [`render`] holds the wgpu side.

pub mod app;
pub mod camera;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod light;
pub mod overlay;
pub mod render;
pub mod shader;
pub mod uniforms;

pub use app::{EventResponse, ViewerState, Viewport};
pub use camera::{Camera, Movement, OrientationBasis, ProjectionMode};
pub use clock::{FrameClock, FrameStats};
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use input::{InputEvent, InputState, KeyBindings, KeyCode, MouseButton, NamedKey, PointerTracker};
pub use light::LightState;
pub use render::Renderer;
pub use shader::ShaderSource;
pub use uniforms::{bind_frame_uniforms, FrameInfo, FrameUniforms, UniformSink, UniformValue};
