//! Per-frame uniform upload.
//!
//! The frame loop never talks to the GPU block directly: it pushes named
//! values through [`UniformSink`], the same names the fragment shader reads
//! from its `FrameUniforms` struct.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use log::debug;

use crate::camera::Camera;
use crate::light::LightState;

/// A value assignable to a shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
}

/// Destination for named uniforms, usually the active shader program.
pub trait UniformSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue);
}

/// Frame-global values that do not come from the camera or the light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub focal_length: f32,
    /// Seconds since the viewer started.
    pub time: f32,
}

/// Pushes the camera pose, light and frame metadata into `sink`.
///
/// `camera_dir` is the point one unit in front of the camera, not a
/// direction; the shader subtracts `camera_pos` itself.
pub fn bind_frame_uniforms<S>(sink: &mut S, camera: &Camera, light: &LightState, frame: &FrameInfo)
where
    S: UniformSink + ?Sized,
{
    use UniformValue::{Float, Vec3 as V3, Vec4 as V4};

    sink.set_uniform("width", Float(frame.width as f32));
    sink.set_uniform("height", Float(frame.height as f32));
    sink.set_uniform("focal_length", Float(frame.focal_length));
    sink.set_uniform("time", Float(frame.time));

    let position = camera.position();
    let basis = camera.basis();
    sink.set_uniform("camera_pos", V3(position));
    sink.set_uniform("camera_dir", V3(position + basis.forward));
    sink.set_uniform("camera_up", V3(basis.up));
    sink.set_uniform("projection", Float(camera.projection().as_uniform()));

    sink.set_uniform("light_pos", V3(light.position));
    sink.set_uniform("light_color", V4(light.color()));
}

/// GPU copy of the WGSL `FrameUniforms` struct.
///
/// Every `vec3` is followed by a scalar so the layout matches WGSL uniform
/// alignment without explicit padding in between.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub camera_pos: [f32; 3],
    pub width: f32,
    pub camera_dir: [f32; 3],
    pub height: f32,
    pub camera_up: [f32; 3],
    pub focal_length: f32,
    pub light_pos: [f32; 3],
    pub time: f32,
    pub light_color: [f32; 4],
    pub projection: f32,
    _padding: [f32; 3],
}

impl FrameUniforms {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Collects one frame's uniforms.
    pub fn capture(camera: &Camera, light: &LightState, frame: &FrameInfo) -> Self {
        let mut uniforms = Self::default();
        bind_frame_uniforms(&mut uniforms, camera, light, frame);
        uniforms
    }
}

impl UniformSink for FrameUniforms {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        match (name, value) {
            ("width", UniformValue::Float(v)) => self.width = v,
            ("height", UniformValue::Float(v)) => self.height = v,
            ("focal_length", UniformValue::Float(v)) => self.focal_length = v,
            ("time", UniformValue::Float(v)) => self.time = v,
            ("projection", UniformValue::Float(v)) => self.projection = v,
            ("camera_pos", UniformValue::Vec3(v)) => self.camera_pos = v.to_array(),
            ("camera_dir", UniformValue::Vec3(v)) => self.camera_dir = v.to_array(),
            ("camera_up", UniformValue::Vec3(v)) => self.camera_up = v.to_array(),
            ("light_pos", UniformValue::Vec3(v)) => self.light_pos = v.to_array(),
            ("light_color", UniformValue::Vec4(v)) => self.light_color = v.to_array(),
            _ => debug!("ignoring uniform {name} = {value:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::camera::ProjectionMode;

    #[derive(Default)]
    struct Recorder(HashMap<String, UniformValue>);

    impl UniformSink for Recorder {
        fn set_uniform(&mut self, name: &str, value: UniformValue) {
            self.0.insert(name.to_string(), value);
        }
    }

    fn frame() -> FrameInfo {
        FrameInfo {
            width: 800,
            height: 600,
            focal_length: 1.0,
            time: 2.5,
        }
    }

    #[test]
    fn pushes_every_named_uniform() {
        let camera = Camera::default();
        let light = LightState::default();
        let mut recorder = Recorder::default();
        bind_frame_uniforms(&mut recorder, &camera, &light, &frame());

        let mut names: Vec<_> = recorder.0.keys().cloned().collect();
        names.sort();
        assert_eq!(
            names,
            [
                "camera_dir",
                "camera_pos",
                "camera_up",
                "focal_length",
                "height",
                "light_color",
                "light_pos",
                "projection",
                "time",
                "width",
            ]
        );
        assert_eq!(recorder.0["width"], UniformValue::Float(800.0));
        assert_eq!(recorder.0["time"], UniformValue::Float(2.5));
        assert_eq!(recorder.0["light_color"], UniformValue::Vec4(Vec4::ONE));
    }

    #[test]
    fn camera_dir_is_a_look_at_point() {
        let camera = Camera::new(Vec3::new(4.0, 1.0, -2.0), Vec3::Y, ProjectionMode::Perspective);
        let uniforms = FrameUniforms::capture(&camera, &LightState::default(), &frame());
        let pos = Vec3::from_array(uniforms.camera_pos);
        let dir = Vec3::from_array(uniforms.camera_dir);
        assert_eq!(pos, Vec3::new(4.0, 1.0, -2.0));
        assert!((dir - pos).abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
        assert!(Vec3::from_array(uniforms.camera_up).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn block_matches_wgsl_layout() {
        assert_eq!(FrameUniforms::SIZE, 96);
        let uniforms = FrameUniforms {
            projection: 1.0,
            ..Default::default()
        };
        let floats: [f32; 24] = bytemuck::cast(uniforms);
        assert_eq!(floats[20], 1.0);
    }

    #[test]
    fn orthographic_projection_is_forwarded() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Y, ProjectionMode::Orthographic);
        let uniforms = FrameUniforms::capture(&camera, &LightState::default(), &frame());
        assert_eq!(uniforms.projection, 1.0);
        assert_eq!(uniforms.height, 600.0);
    }

    #[test]
    fn mismatched_uniforms_are_ignored() {
        let mut uniforms = FrameUniforms::default();
        uniforms.set_uniform("exposure", UniformValue::Float(3.0));
        uniforms.set_uniform("width", UniformValue::Vec3(Vec3::ONE));
        assert_eq!(uniforms, FrameUniforms::default());
    }
}
