mod overlay;
mod quad;
mod renderer;

pub use overlay::{OverlayFrame, OverlayPainter};
pub use renderer::Renderer;
