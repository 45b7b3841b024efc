use log::{debug, info};

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::input::{InputEvent, InputState, KeyBindings, MouseButton, PointerTracker};
use crate::light::LightState;
use crate::uniforms::{FrameInfo, FrameUniforms};

/// Longest frame, in seconds, that movement is applied for. Longer gaps
/// (window drags, debugger pauses) are shortened to this.
pub const MAX_FRAME_STEP: f32 = 0.1;

/// What the frame loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Continue,
    Exit,
}

/// Drawable size in physical pixels, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn update(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }
}

/// Everything the frame loop mutates between frames.
///
/// Window callbacks translate their events into [`InputEvent`]s and hand
/// them to [`handle_event`](Self::handle_event); the loop then calls
/// [`advance`](Self::advance) and reads [`uniforms`](Self::uniforms) once per
/// frame.
#[derive(Debug, Clone)]
pub struct ViewerState {
    camera: Camera,
    light: LightState,
    input: InputState,
    bindings: KeyBindings,
    pointer: PointerTracker,
    mouse_look: bool,
    viewport: Viewport,
    move_speed: f32,
    mouse_sensitivity: f32,
    focal_length: f32,
}

impl ViewerState {
    /// Builds the state from `config`, rejecting it if it fails
    /// [`ViewerConfig::validate`].
    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        config.validate()?;
        let camera_config = &config.camera;
        let camera = Camera::new(
            camera_config.position,
            camera_config.world_up,
            camera_config.projection,
        )
        .with_pitch_limit(camera_config.pitch_limit)
        .with_orientation(camera_config.yaw, camera_config.pitch);

        Ok(Self {
            camera,
            light: LightState::new(config.light.position, config.light.color),
            input: InputState::new(),
            bindings: config.controls.key_bindings()?,
            pointer: PointerTracker::default(),
            mouse_look: false,
            viewport: Viewport::new(config.window.width, config.window.height),
            move_speed: config.controls.move_speed,
            mouse_sensitivity: config.controls.mouse_sensitivity,
            focal_length: camera_config.focal_length,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn light(&self) -> &LightState {
        &self.light
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn mouse_look_active(&self) -> bool {
        self.mouse_look
    }

    /// Split borrow used by the overlay: the light is editable, the camera is
    /// read-only.
    pub fn overlay_parts(&mut self) -> (&mut LightState, &Camera) {
        (&mut self.light, &self.camera)
    }

    pub fn handle_event(&mut self, event: InputEvent) -> EventResponse {
        match event {
            InputEvent::Resized { width, height } => {
                self.viewport.update(width, height);
                debug!("viewport is now {}x{}", self.viewport.width, self.viewport.height);
            }
            InputEvent::CursorMoved { position } => {
                self.input.set_mouse_position(position);
                if self.mouse_look {
                    let delta = self.pointer.delta(position);
                    self.camera
                        .process_mouse_input(delta.x, delta.y, self.mouse_sensitivity);
                }
            }
            InputEvent::CursorLeft => self.pointer.reset(),
            InputEvent::Key { key, pressed } => {
                if pressed {
                    self.input.set_key_down(key);
                } else {
                    self.input.set_key_up(key);
                }
            }
            InputEvent::MouseButton { button, pressed } => {
                if pressed {
                    self.input.set_mouse_button_down(button);
                } else {
                    self.input.set_mouse_button_up(button);
                }
                if button == MouseButton::RIGHT {
                    self.set_mouse_look(pressed);
                }
            }
            InputEvent::Modifiers { ctrl } => {
                if ctrl {
                    info!("ctrl pressed, closing the viewer");
                    return EventResponse::Exit;
                }
            }
            InputEvent::FocusLost => {
                self.input.release_all();
                self.set_mouse_look(false);
            }
        }
        EventResponse::Continue
    }

    fn set_mouse_look(&mut self, active: bool) {
        if self.mouse_look != active {
            self.pointer.reset();
        }
        self.mouse_look = active;
    }

    /// Applies held movement keys for a frame that lasted `dt` seconds,
    /// capped at [`MAX_FRAME_STEP`].
    pub fn advance(&mut self, dt: f32) {
        let step = self.move_speed * dt.clamp(0.0, MAX_FRAME_STEP);
        let held = self.bindings.held(&self.input);
        self.camera.process_keyboard_input(&held, step);
    }

    pub fn frame_info(&self, time: f32) -> FrameInfo {
        FrameInfo {
            width: self.viewport.width,
            height: self.viewport.height,
            focal_length: self.focal_length,
            time,
        }
    }

    /// Uniforms for the frame rendered at `time` seconds.
    pub fn uniforms(&self, time: f32) -> FrameUniforms {
        FrameUniforms::capture(&self.camera, &self.light, &self.frame_info(time))
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::input::KeyCode;

    fn state() -> ViewerState {
        let mut config = ViewerConfig::default();
        config.camera.position = Vec3::ZERO;
        config.controls.mouse_sensitivity = 1.0;
        ViewerState::from_config(&config).expect("default config")
    }

    fn key(name: &str, pressed: bool) -> InputEvent {
        InputEvent::Key {
            key: name.parse::<KeyCode>().expect("known key"),
            pressed,
        }
    }

    fn look(state: &mut ViewerState, active: bool) {
        state.handle_event(InputEvent::MouseButton {
            button: MouseButton::RIGHT,
            pressed: active,
        });
    }

    fn cursor(state: &mut ViewerState, x: f32, y: f32) {
        state.handle_event(InputEvent::CursorMoved {
            position: Vec2::new(x, y),
        });
    }

    #[test]
    fn first_cursor_sample_after_activation_does_not_rotate() {
        let mut state = state();
        look(&mut state, true);
        cursor(&mut state, 900.0, 700.0);
        assert_eq!(state.camera().yaw(), -90.0);
        assert_eq!(state.camera().pitch(), 0.0);

        cursor(&mut state, 990.0, 700.0);
        assert!((state.camera().yaw() - 0.0).abs() < 1e-5);

        look(&mut state, false);
        cursor(&mut state, 0.0, 0.0);
        look(&mut state, true);
        cursor(&mut state, 5000.0, -5000.0);
        assert!((state.camera().yaw() - 0.0).abs() < 1e-5);
        assert_eq!(state.camera().pitch(), 0.0);
    }

    #[test]
    fn cursor_is_ignored_without_mouse_look() {
        let mut state = state();
        cursor(&mut state, 10.0, 10.0);
        cursor(&mut state, 200.0, 300.0);
        assert_eq!(state.camera().yaw(), -90.0);
        assert!(!state.mouse_look_active());
    }

    #[test]
    fn leaving_the_window_reseeds_the_pointer() {
        let mut state = state();
        look(&mut state, true);
        cursor(&mut state, 100.0, 100.0);
        state.handle_event(InputEvent::CursorLeft);
        cursor(&mut state, 600.0, 100.0);
        assert_eq!(state.camera().yaw(), -90.0);
    }

    #[test]
    fn held_keys_move_by_speed_times_dt() {
        let mut state = state();
        state.handle_event(key("W", true));
        for _ in 0..10 {
            state.advance(0.1);
        }
        let expected = Vec3::new(0.0, 0.0, -6.0);
        assert!(state.camera().position().abs_diff_eq(expected, 1e-4));

        state.handle_event(key("W", false));
        state.advance(1.0);
        assert!(state.camera().position().abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn long_frames_are_capped() {
        let mut state = state();
        state.handle_event(key("W", true));
        state.advance(3.0);
        let capped = Vec3::new(0.0, 0.0, -6.0 * MAX_FRAME_STEP);
        assert!(state.camera().position().abs_diff_eq(capped, 1e-4));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ViewerConfig::from_toml_str("[camera]\npitch_limit = nan\n", "test")
            .expect("parses");
        assert!(matches!(
            ViewerState::from_config(&config),
            Err(crate::error::ViewerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn focus_loss_releases_keys_and_mouse_look() {
        let mut state = state();
        state.handle_event(key("D", true));
        look(&mut state, true);
        state.handle_event(InputEvent::FocusLost);
        assert!(!state.mouse_look_active());
        state.advance(1.0);
        assert_eq!(state.camera().position(), Vec3::ZERO);
    }

    #[test]
    fn ctrl_requests_exit() {
        let mut state = state();
        assert_eq!(
            state.handle_event(InputEvent::Modifiers { ctrl: false }),
            EventResponse::Continue
        );
        assert_eq!(
            state.handle_event(InputEvent::Modifiers { ctrl: true }),
            EventResponse::Exit
        );
    }

    #[test]
    fn resize_feeds_frame_dimensions() {
        let mut state = state();
        state.handle_event(InputEvent::Resized {
            width: 1920,
            height: 0,
        });
        assert_eq!(state.viewport(), Viewport::new(1920, 1));
        let uniforms = state.uniforms(1.5);
        assert_eq!(uniforms.width, 1920.0);
        assert_eq!(uniforms.height, 1.0);
        assert_eq!(uniforms.time, 1.5);
        assert_eq!(uniforms.focal_length, 1.0);
    }

    #[test]
    fn overlay_edits_reach_the_uniforms() {
        let mut state = state();
        let (light, _) = state.overlay_parts();
        light.position = Vec3::new(-1.0, 7.0, 2.0);
        let uniforms = state.uniforms(0.0);
        assert_eq!(uniforms.light_pos, [-1.0, 7.0, 2.0]);
    }
}
