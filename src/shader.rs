use std::fs;
use std::path::Path;

use log::info;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::config::ShaderConfig;
use crate::error::{Result, ViewerError};

/// Uniform block, vertex output and full-screen quad vertex stage shared by
/// every fragment shader. Must stay in sync with
/// [`FrameUniforms`](crate::uniforms::FrameUniforms).
pub const PRELUDE: &str = r#"
struct FrameUniforms {
    camera_pos: vec3<f32>,
    width: f32,
    camera_dir: vec3<f32>,
    height: f32,
    camera_up: vec3<f32>,
    focal_length: f32,
    light_pos: vec3<f32>,
    time: f32,
    light_color: vec4<f32>,
    projection: f32,
}

@group(0) @binding(0)
var<uniform> globals: FrameUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(position, 1.0);
    out.ndc = position.xy;
    return out;
}
"#;

const BUILTIN_FRAGMENT: &str = include_str!("../shaders/raymarch.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// A fragment shader plus the name used in logs and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    name: String,
    fragment: String,
}

impl ShaderSource {
    /// The raymarcher shipped with the viewer.
    pub fn builtin() -> Self {
        Self::from_fragment("builtin:raymarch", BUILTIN_FRAGMENT)
    }

    pub fn from_fragment(name: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fragment: fragment.into(),
        }
    }

    /// Reads a fragment shader file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let fragment = fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_fragment(path.display().to_string(), fragment))
    }

    pub fn from_config(config: &ShaderConfig) -> Result<Self> {
        let source = match &config.path {
            Some(path) => Self::from_path(path)?,
            None => Self::builtin(),
        };
        info!("using fragment shader {}", source.name);
        Ok(source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full WGSL module: prelude followed by the fragment source.
    pub fn composed(&self) -> String {
        format!("{PRELUDE}\n{}", self.fragment)
    }

    /// Parses and validates the composed module without touching the GPU.
    pub fn validate(&self) -> Result<()> {
        let source = self.composed();
        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|err| self.error(err.emit_to_string(&source)))?;

        for (entry, stage) in [
            (VERTEX_ENTRY, naga::ShaderStage::Vertex),
            (FRAGMENT_ENTRY, naga::ShaderStage::Fragment),
        ] {
            let found = module
                .entry_points
                .iter()
                .any(|point| point.name == entry && point.stage == stage);
            if !found {
                return Err(self.error(format!("missing {stage:?} entry point `{entry}`")));
            }
        }

        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .map_err(|err| self.error(err.emit_to_string(&source)))?;
        Ok(())
    }

    fn error(&self, message: String) -> ViewerError {
        ViewerError::Shader {
            name: self.name.clone(),
            message,
        }
    }
}
