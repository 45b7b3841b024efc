use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use raymarch_viewer::overlay;
use raymarch_viewer::{
    EventResponse, FrameClock, InputEvent, KeyCode, MouseButton, NamedKey, Renderer,
    ShaderSource, ViewerConfig, ViewerState,
};

const USAGE: &str =
    "Usage: raymarch-viewer [--config <file.toml>] [--shader <file.wgsl>] [--print-config] [--check-shader]";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;

    let mut config = match &options.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(shader) = options.shader {
        config.shader.path = Some(shader);
    }
    config.validate()?;

    if options.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let shader = ShaderSource::from_config(&config.shader)?;
    shader.validate()?;
    if options.check_shader {
        println!("shader {} OK", shader.name());
        return Ok(());
    }

    run_interactive(config, shader)
}

fn run_interactive(config: ViewerConfig, shader: ShaderSource) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp {
        state: ViewerState::from_config(&config)?,
        config,
        shader,
        clock: FrameClock::new(),
        renderer: None,
        last_error: None,
    };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    if let Some(err) = app.last_error {
        return Err(err);
    }
    Ok(())
}

struct ViewerApp {
    config: ViewerConfig,
    shader: ShaderSource,
    state: ViewerState,
    clock: FrameClock,
    renderer: Option<Renderer>,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.create_renderer(event_loop) {
            self.last_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if window_id != renderer.window_id() {
            return;
        }

        let consumed = renderer.handle_window_event(&event);
        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => renderer.resize(*size),
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.last_error = Some(err);
                    event_loop.exit();
                }
                return;
            }
            _ => {}
        }

        let Some(input) = translate_event(&event) else {
            return;
        };
        if consumed && starts_interaction(&input) {
            return;
        }
        let was_looking = self.state.mouse_look_active();
        if self.state.handle_event(input) == EventResponse::Exit {
            event_loop.exit();
            return;
        }
        let looking = self.state.mouse_look_active();
        if looking != was_looking {
            renderer.window().set_cursor_visible(!looking);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &self.renderer {
            renderer.window().request_redraw();
        }
    }
}

impl ViewerApp {
    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(
                window_config.width as f64,
                window_config.height as f64,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );

        let renderer = block_on(Renderer::new(window, &self.shader))?;
        self.clock.restart();
        let size = renderer.size();
        self.state.handle_event(InputEvent::Resized {
            width: size.width,
            height: size.height,
        });
        info!(
            "viewer started at {}x{} with shader {}",
            size.width,
            size.height,
            self.shader.name()
        );
        self.renderer = Some(renderer);
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let dt = self.clock.tick();
        self.state.advance(dt);
        let uniforms = self.state.uniforms(self.clock.elapsed().as_secs_f32());
        let stats = self.clock.stats();
        let (light, camera) = self.state.overlay_parts();

        match renderer.render(&uniforms, |ctx| overlay::show(ctx, &stats, light, camera)) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.window().inner_size();
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("GPU is out of memory"));
            }
            Err(wgpu::SurfaceError::Timeout) => {
                info!("Surface timeout; retrying next frame");
            }
            Err(err) => warn!("dropping frame: {err}"),
        }
        Ok(())
    }
}

/// Presses that egui already claimed must not reach the camera; releases and
/// cursor motion always do so held state cannot get stuck.
fn starts_interaction(input: &InputEvent) -> bool {
    matches!(
        input,
        InputEvent::Key { pressed: true, .. } | InputEvent::MouseButton { pressed: true, .. }
    )
}

fn translate_event(event: &WindowEvent) -> Option<InputEvent> {
    Some(match event {
        WindowEvent::Resized(size) => InputEvent::Resized {
            width: size.width,
            height: size.height,
        },
        WindowEvent::CursorMoved { position, .. } => InputEvent::CursorMoved {
            position: Vec2::new(position.x as f32, position.y as f32),
        },
        WindowEvent::CursorLeft { .. } => InputEvent::CursorLeft,
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state,
                    ..
                },
            ..
        } => InputEvent::Key {
            key: map_keycode(*code)?,
            pressed: *state == ElementState::Pressed,
        },
        WindowEvent::MouseInput { state, button, .. } => InputEvent::MouseButton {
            button: map_mouse_button(*button)?,
            pressed: *state == ElementState::Pressed,
        },
        WindowEvent::ModifiersChanged(modifiers) => InputEvent::Modifiers {
            ctrl: modifiers.state().control_key(),
        },
        WindowEvent::Focused(false) => InputEvent::FocusLost,
        _ => return None,
    })
}

fn map_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Back => 3,
        WinitMouseButton::Forward => 4,
        WinitMouseButton::Other(value) => u8::try_from(value).ok()?,
    };
    Some(MouseButton::new(index))
}

fn map_keycode(code: winit::keyboard::KeyCode) -> Option<KeyCode> {
    use winit::keyboard::KeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Enter => KeyCode::Named(NamedKey::Enter),
        Key::Tab => KeyCode::Named(NamedKey::Tab),
        Key::ArrowLeft => KeyCode::Named(NamedKey::Left),
        Key::ArrowRight => KeyCode::Named(NamedKey::Right),
        Key::ArrowUp => KeyCode::Named(NamedKey::Up),
        Key::ArrowDown => KeyCode::Named(NamedKey::Down),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Backspace => KeyCode::Named(NamedKey::Backspace),
        Key::Home => KeyCode::Named(NamedKey::Home),
        Key::End => KeyCode::Named(NamedKey::End),
        Key::PageUp => KeyCode::Named(NamedKey::PageUp),
        Key::PageDown => KeyCode::Named(NamedKey::PageDown),
        Key::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        Key::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        Key::ControlLeft => KeyCode::Named(NamedKey::LeftCtrl),
        Key::ControlRight => KeyCode::Named(NamedKey::RightCtrl),
        Key::AltLeft => KeyCode::Named(NamedKey::LeftAlt),
        Key::AltRight => KeyCode::Named(NamedKey::RightAlt),
        Key::Digit0 => KeyCode::Digit(0),
        Key::Digit1 => KeyCode::Digit(1),
        Key::Digit2 => KeyCode::Digit(2),
        Key::Digit3 => KeyCode::Digit(3),
        Key::Digit4 => KeyCode::Digit(4),
        Key::Digit5 => KeyCode::Digit(5),
        Key::Digit6 => KeyCode::Digit(6),
        Key::Digit7 => KeyCode::Digit(7),
        Key::Digit8 => KeyCode::Digit(8),
        Key::Digit9 => KeyCode::Digit(9),
        Key::KeyA => KeyCode::Character('A'),
        Key::KeyB => KeyCode::Character('B'),
        Key::KeyC => KeyCode::Character('C'),
        Key::KeyD => KeyCode::Character('D'),
        Key::KeyE => KeyCode::Character('E'),
        Key::KeyF => KeyCode::Character('F'),
        Key::KeyG => KeyCode::Character('G'),
        Key::KeyH => KeyCode::Character('H'),
        Key::KeyI => KeyCode::Character('I'),
        Key::KeyJ => KeyCode::Character('J'),
        Key::KeyK => KeyCode::Character('K'),
        Key::KeyL => KeyCode::Character('L'),
        Key::KeyM => KeyCode::Character('M'),
        Key::KeyN => KeyCode::Character('N'),
        Key::KeyO => KeyCode::Character('O'),
        Key::KeyP => KeyCode::Character('P'),
        Key::KeyQ => KeyCode::Character('Q'),
        Key::KeyR => KeyCode::Character('R'),
        Key::KeyS => KeyCode::Character('S'),
        Key::KeyT => KeyCode::Character('T'),
        Key::KeyU => KeyCode::Character('U'),
        Key::KeyV => KeyCode::Character('V'),
        Key::KeyW => KeyCode::Character('W'),
        Key::KeyX => KeyCode::Character('X'),
        Key::KeyY => KeyCode::Character('Y'),
        Key::KeyZ => KeyCode::Character('Z'),
        Key::F1 => KeyCode::Function(1),
        Key::F2 => KeyCode::Function(2),
        Key::F3 => KeyCode::Function(3),
        Key::F4 => KeyCode::Function(4),
        Key::F5 => KeyCode::Function(5),
        Key::F6 => KeyCode::Function(6),
        Key::F7 => KeyCode::Function(7),
        Key::F8 => KeyCode::Function(8),
        Key::F9 => KeyCode::Function(9),
        Key::F10 => KeyCode::Function(10),
        Key::F11 => KeyCode::Function(11),
        Key::F12 => KeyCode::Function(12),
        _ => return None,
    })
}

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    shader: Option<PathBuf>,
    print_config: bool,
    check_shader: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => options.config = Some(option_value(&mut args, "--config")?),
                "--shader" => options.shader = Some(option_value(&mut args, "--shader")?),
                "--print-config" => options.print_config = true,
                "--check-shader" => options.check_shader = true,
                "-h" | "--help" => return Err(anyhow!("{USAGE}")),
                other => return Err(anyhow!("Unknown argument: {other}\n{USAGE}")),
            }
        }
        Ok(options)
    }
}

fn option_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<PathBuf> {
    args.next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{flag} expects a value\n{USAGE}"))
}
