//! Viewer configuration loaded from TOML.
//!
//! Every field is optional; missing values fall back to the defaults below,
//! which reproduce the classic 800x600 window with the camera looking down
//! -Z.

use std::fs;
use std::path::{Path, PathBuf};

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::camera::{ProjectionMode, DEFAULT_YAW, MAX_PITCH_LIMIT};
use crate::error::{Result, ViewerError};
use crate::input::KeyBindings;
use crate::light::LightState;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub light: LightConfig,
    pub shader: ShaderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Raymarch Viewer".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub world_up: Vec3,
    pub projection: ProjectionMode,
    pub focal_length: f32,
    pub pitch_limit: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: DEFAULT_YAW,
            pitch: 0.0,
            world_up: Vec3::Y,
            projection: ProjectionMode::Perspective,
            focal_length: 1.0,
            pitch_limit: crate::camera::DEFAULT_PITCH_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsConfig {
    /// World units per second while a movement key is held.
    pub move_speed: f32,
    /// Degrees per pixel of cursor motion.
    pub mouse_sensitivity: f32,
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            mouse_sensitivity: 0.1,
            forward: "W".to_string(),
            backward: "S".to_string(),
            left: "A".to_string(),
            right: "D".to_string(),
            up: "Q".to_string(),
            down: "E".to_string(),
        }
    }
}

impl ControlsConfig {
    pub fn key_bindings(&self) -> Result<KeyBindings> {
        KeyBindings::from_names([
            self.forward.as_str(),
            self.backward.as_str(),
            self.left.as_str(),
            self.right.as_str(),
            self.up.as_str(),
            self.down.as_str(),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig {
    pub position: Vec3,
    pub color: Vec4,
}

impl Default for LightConfig {
    fn default() -> Self {
        let light = LightState::default();
        Self {
            position: light.position,
            color: light.color(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShaderConfig {
    /// Fragment shader file; the built-in raymarcher is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl ViewerConfig {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, &path.display().to_string())
    }

    /// Parses TOML text; `origin` names the source in error messages.
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|source| ViewerError::ConfigParse {
            origin: origin.to_string(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the viewer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        let camera = &self.camera;
        if !(camera.focal_length.is_finite() && camera.focal_length > 0.0) {
            return Err(invalid(format!(
                "camera.focal_length must be positive, got {}",
                camera.focal_length
            )));
        }
        if !(camera.pitch_limit > 0.0 && camera.pitch_limit <= MAX_PITCH_LIMIT) {
            return Err(invalid(format!(
                "camera.pitch_limit must be inside (0, {MAX_PITCH_LIMIT}], got {}",
                camera.pitch_limit
            )));
        }
        if !(camera.yaw.is_finite() && camera.pitch.is_finite()) {
            return Err(invalid("camera.yaw and camera.pitch must be finite".to_string()));
        }
        if !camera.position.is_finite() {
            return Err(invalid("camera.position must be finite".to_string()));
        }
        if !camera.world_up.is_finite() || camera.world_up.length_squared() <= f32::EPSILON {
            return Err(invalid(format!(
                "camera.world_up must be a non-zero vector, got {}",
                camera.world_up
            )));
        }

        let controls = &self.controls;
        if !(controls.move_speed.is_finite() && controls.move_speed >= 0.0) {
            return Err(invalid(format!(
                "controls.move_speed must be finite and non-negative, got {}",
                controls.move_speed
            )));
        }
        if !controls.mouse_sensitivity.is_finite() {
            return Err(invalid("controls.mouse_sensitivity must be finite".to_string()));
        }
        controls.key_bindings()?;

        if !self.light.position.is_finite() {
            return Err(invalid("light.position must be finite".to_string()));
        }
        let color = self.light.color;
        if !color.is_finite() || color.min_element() < 0.0 || color.max_element() > 1.0 {
            return Err(invalid(format!(
                "light.color channels must be within [0, 1], got {color}"
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ViewerError {
    ViewerError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ViewerConfig::from_toml_str("", "test").expect("parse");
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.camera.yaw, -90.0);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = ViewerConfig::from_toml_str(
            r#"
[camera]
position = [1.0, 2.0, 3.0]
projection = "orthographic"

[controls]
mouse_sensitivity = 0.25
forward = "Up"
"#,
            "test",
        )
        .expect("parse");
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.camera.projection, ProjectionMode::Orthographic);
        assert_eq!(config.camera.focal_length, 1.0);
        assert_eq!(config.controls.mouse_sensitivity, 0.25);
        assert_eq!(config.controls.backward, "S");
        config.validate().expect("valid");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ViewerConfig::from_toml_str("[window]\nfullscreen = true\n", "inline")
            .unwrap_err();
        assert!(matches!(err, ViewerError::ConfigParse { ref origin, .. } if origin == "inline"));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = ViewerConfig::default();
        config.camera.pitch_limit = 90.0;
        assert!(matches!(config.validate(), Err(ViewerError::InvalidConfig(_))));

        let mut config = ViewerConfig::default();
        config.window.height = 0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.light.color = Vec4::new(1.5, 0.0, 0.0, 1.0);
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.camera.world_up = Vec3::ZERO;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.controls.move_speed = -1.0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.controls.left = "Meta".to_string();
        assert!(matches!(config.validate(), Err(ViewerError::UnknownKey(_))));

        let mut config = ViewerConfig::default();
        config.controls.backward = "W".to_string();
        assert!(matches!(
            config.validate(),
            Err(ViewerError::DuplicateBinding { .. })
        ));
    }

    #[test]
    fn pitch_limit_range_matches_camera() {
        let mut config = ViewerConfig::default();
        config.camera.pitch_limit = MAX_PITCH_LIMIT;
        config.validate().expect("the camera accepts its own maximum");

        config.camera.pitch_limit = 89.95;
        assert!(matches!(config.validate(), Err(ViewerError::InvalidConfig(_))));

        config.camera.pitch_limit = f32::NAN;
        assert!(matches!(config.validate(), Err(ViewerError::InvalidConfig(_))));
    }

    #[test]
    fn out_of_range_initial_pitch_is_allowed() {
        let mut config = ViewerConfig::default();
        config.camera.pitch = 120.0;
        config.validate().expect("pitch is clamped later, not rejected");
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = ViewerConfig::default();
        config.shader.path = Some(PathBuf::from("shaders/custom.wgsl"));
        config.light.color = Vec4::new(1.0, 0.5, 0.25, 1.0);
        let text = config.to_toml_string().expect("serialize");
        let parsed = ViewerConfig::from_toml_str(&text, "roundtrip").expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[window]\ntitle = \"Test\"\nwidth = 320").expect("write");
        let config = ViewerConfig::load(file.path()).expect("load");
        assert_eq!(config.window.title, "Test");
        assert_eq!(config.window.width, 320);
        assert_eq!(config.window.height, 600);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ViewerConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
