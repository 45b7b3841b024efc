use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::camera::{KeyStateSource, Movement};
use crate::error::{Result, ViewerError};

/// Physical key the viewer can bind.
///
/// Parses from config names such as `"W"`, `"space"`, `"7"` or `"F12"`
/// (named keys ignore case) and displays back in the canonical spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
}

const MAX_FUNCTION_KEY: u8 = 24;

impl FromStr for KeyCode {
    type Err = ViewerError;

    fn from_str(name: &str) -> Result<Self> {
        let name = name.trim();
        if let Ok(key) = name.parse::<NamedKey>() {
            return Ok(Self::Named(key));
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_alphabetic() => {
                return Ok(Self::Character(ch.to_ascii_uppercase()))
            }
            (Some(ch), None) if ch.is_ascii_digit() => return Ok(Self::Digit(ch as u8 - b'0')),
            _ => {}
        }
        name.strip_prefix(|ch: char| ch == 'F' || ch == 'f')
            .filter(|index| index.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|index| index.parse::<u8>().ok())
            .filter(|index| (1..=MAX_FUNCTION_KEY).contains(index))
            .map(Self::Function)
            .ok_or_else(|| ViewerError::UnknownKey(name.to_string()))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(key) => f.write_str(key.name()),
            Self::Character(ch) => write!(f, "{ch}"),
            Self::Digit(digit) => write!(f, "{digit}"),
            Self::Function(index) => write!(f, "F{index}"),
        }
    }
}

/// Keys without a printable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    Home,
    End,
    PageUp,
    PageDown,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
}

/// Alternative spellings accepted in config files.
const NAMED_KEY_ALIASES: &[(&str, NamedKey)] = &[
    ("Return", NamedKey::Enter),
    ("Esc", NamedKey::Escape),
    ("LShift", NamedKey::LeftShift),
    ("RShift", NamedKey::RightShift),
    ("LControl", NamedKey::LeftCtrl),
    ("RControl", NamedKey::RightCtrl),
    ("LAlt", NamedKey::LeftAlt),
    ("RAlt", NamedKey::RightAlt),
];

impl NamedKey {
    pub const ALL: [NamedKey; 19] = [
        Self::Space,
        Self::Enter,
        Self::Tab,
        Self::Left,
        Self::Right,
        Self::Up,
        Self::Down,
        Self::Escape,
        Self::Backspace,
        Self::Home,
        Self::End,
        Self::PageUp,
        Self::PageDown,
        Self::LeftShift,
        Self::RightShift,
        Self::LeftCtrl,
        Self::RightCtrl,
        Self::LeftAlt,
        Self::RightAlt,
    ];

    /// Canonical config spelling.
    pub fn name(self) -> &'static str {
        match self {
            Self::Space => "Space",
            Self::Enter => "Enter",
            Self::Tab => "Tab",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Escape => "Escape",
            Self::Backspace => "Backspace",
            Self::Home => "Home",
            Self::End => "End",
            Self::PageUp => "PageUp",
            Self::PageDown => "PageDown",
            Self::LeftShift => "LeftShift",
            Self::RightShift => "RightShift",
            Self::LeftCtrl => "LeftCtrl",
            Self::RightCtrl => "RightCtrl",
            Self::LeftAlt => "LeftAlt",
            Self::RightAlt => "RightAlt",
        }
    }
}

impl FromStr for NamedKey {
    type Err = ViewerError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name))
            .or_else(|| {
                NAMED_KEY_ALIASES
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                    .map(|(_, key)| *key)
            })
            .ok_or_else(|| ViewerError::UnknownKey(name.to_string()))
    }
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Window input already translated out of the windowing library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Resized { width: u32, height: u32 },
    CursorMoved { position: Vec2 },
    CursorLeft,
    Key { key: KeyCode, pressed: bool },
    MouseButton { button: MouseButton, pressed: bool },
    Modifiers { ctrl: bool },
    FocusLost,
}

/// Held keys and buttons for the current frame.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    mouse_position: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn set_mouse_button_down(&mut self, button: MouseButton) {
        self.mouse_buttons.insert(button);
    }

    pub fn set_mouse_button_up(&mut self, button: MouseButton) {
        self.mouse_buttons.remove(&button);
    }

    pub fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Forgets every held key and button, e.g. when the window loses focus
    /// and release events will never arrive.
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.mouse_buttons.clear();
    }
}

/// Turns absolute cursor positions into deltas.
///
/// The first sample after creation or [`reset`](Self::reset) only seeds the
/// tracker, so the camera never jumps from an arbitrary origin.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum PointerTracker {
    #[default]
    Uninitialized,
    Tracking {
        last: Vec2,
    },
}

impl PointerTracker {
    pub fn delta(&mut self, position: Vec2) -> Vec2 {
        let delta = match *self {
            Self::Uninitialized => Vec2::ZERO,
            Self::Tracking { last } => position - last,
        };
        *self = Self::Tracking { last: position };
        delta
    }

    pub fn reset(&mut self) {
        *self = Self::Uninitialized;
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self, Self::Tracking { .. })
    }
}

/// Key assigned to each camera movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::Character('W'),
            backward: KeyCode::Character('S'),
            left: KeyCode::Character('A'),
            right: KeyCode::Character('D'),
            up: KeyCode::Character('Q'),
            down: KeyCode::Character('E'),
        }
    }
}

impl KeyBindings {
    /// Builds bindings from key names, in forward/backward/left/right/up/down
    /// order. Every movement needs its own key.
    pub fn from_names(names: [&str; 6]) -> Result<Self> {
        let [forward, backward, left, right, up, down] = names;
        let bindings = Self {
            forward: forward.parse()?,
            backward: backward.parse()?,
            left: left.parse()?,
            right: right.parse()?,
            up: up.parse()?,
            down: down.parse()?,
        };
        bindings.ensure_distinct()?;
        Ok(bindings)
    }

    fn ensure_distinct(&self) -> Result<()> {
        for (index, &first) in Movement::ALL.iter().enumerate() {
            for &second in &Movement::ALL[index + 1..] {
                let key = self.key_for(first);
                if key == self.key_for(second) {
                    return Err(ViewerError::DuplicateBinding {
                        key: key.to_string(),
                        first,
                        second,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn key_for(&self, movement: Movement) -> KeyCode {
        match movement {
            Movement::Forward => self.forward,
            Movement::Backward => self.backward,
            Movement::Left => self.left,
            Movement::Right => self.right,
            Movement::Up => self.up,
            Movement::Down => self.down,
        }
    }

    /// Movement view over the keys currently held in `input`.
    pub fn held<'a>(&'a self, input: &'a InputState) -> HeldMovement<'a> {
        HeldMovement {
            bindings: self,
            input,
        }
    }
}

/// [`KeyStateSource`] backed by an [`InputState`] and its bindings.
#[derive(Debug, Clone, Copy)]
pub struct HeldMovement<'a> {
    bindings: &'a KeyBindings,
    input: &'a InputState,
}

impl KeyStateSource for HeldMovement<'_> {
    fn is_held(&self, movement: Movement) -> bool {
        self.input.is_key_down(self.bindings.key_for(movement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> Option<KeyCode> {
        name.parse().ok()
    }

    #[test]
    fn parses_named_and_character_keys() {
        assert_eq!(key("Space"), Some(KeyCode::Named(NamedKey::Space)));
        assert_eq!(key("pageup"), Some(KeyCode::Named(NamedKey::PageUp)));
        assert_eq!(key("Esc"), Some(KeyCode::Named(NamedKey::Escape)));
        assert_eq!(key("a"), Some(KeyCode::Character('A')));
        assert_eq!(key(" q "), Some(KeyCode::Character('Q')));
        assert_eq!(key("7"), Some(KeyCode::Digit(7)));
        assert_eq!(key("F12"), Some(KeyCode::Function(12)));
        assert_eq!(key("f3"), Some(KeyCode::Function(3)));
        assert_eq!(key("F"), Some(KeyCode::Character('F')));
        assert_eq!(key("F99"), None);
        assert_eq!(key("F+1"), None);
        assert_eq!(key("Hyper"), None);
        assert_eq!(key(""), None);
    }

    #[test]
    fn unknown_names_report_the_name() {
        let err = "Meta".parse::<KeyCode>().unwrap_err();
        assert!(matches!(err, ViewerError::UnknownKey(name) if name == "Meta"));
    }

    #[test]
    fn display_uses_canonical_names() {
        for named in NamedKey::ALL {
            let code = KeyCode::Named(named);
            assert_eq!(key(&code.to_string()), Some(code));
        }
        assert_eq!(KeyCode::Named(NamedKey::LeftCtrl).to_string(), "LeftCtrl");
        assert_eq!(KeyCode::Character('W').to_string(), "W");
        assert_eq!(KeyCode::Digit(0).to_string(), "0");
        assert_eq!(KeyCode::Function(11).to_string(), "F11");
    }

    #[test]
    fn input_state_tracks_keys() {
        let mut state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Space));
        assert!(state.is_key_down(KeyCode::Named(NamedKey::Space)));
        state.set_key_up(KeyCode::Named(NamedKey::Space));
        assert!(!state.is_key_down(KeyCode::Named(NamedKey::Space)));
    }

    #[test]
    fn release_all_clears_keys_and_buttons() {
        let mut state = InputState::new();
        state.set_key_down(KeyCode::Character('W'));
        state.set_mouse_button_down(MouseButton::RIGHT);
        state.release_all();
        assert!(!state.is_key_down(KeyCode::Character('W')));
        assert!(!state.is_mouse_button_down(MouseButton::RIGHT));
    }

    #[test]
    fn first_pointer_sample_yields_zero_delta() {
        let mut tracker = PointerTracker::default();
        assert!(!tracker.is_tracking());
        assert_eq!(tracker.delta(Vec2::new(640.0, 480.0)), Vec2::ZERO);
        assert!(tracker.is_tracking());
        assert_eq!(tracker.delta(Vec2::new(650.0, 470.0)), Vec2::new(10.0, -10.0));

        tracker.reset();
        assert_eq!(tracker.delta(Vec2::new(-3000.0, 9000.0)), Vec2::ZERO);
    }

    #[test]
    fn default_bindings_drive_movement() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.set_key_down(KeyCode::Character('W'));
        input.set_key_down(KeyCode::Character('E'));
        let held = bindings.held(&input);
        assert!(held.is_held(Movement::Forward));
        assert!(held.is_held(Movement::Down));
        assert!(!held.is_held(Movement::Left));
    }

    #[test]
    fn bindings_from_names_reject_unknown_keys() {
        let bindings =
            KeyBindings::from_names(["Up", "Down", "Left", "Right", "PageUp", "PageDown"])
                .expect("valid names");
        assert_eq!(bindings.forward, KeyCode::Named(NamedKey::Up));
        assert_eq!(bindings.down, KeyCode::Named(NamedKey::PageDown));

        let err = KeyBindings::from_names(["W", "S", "A", "D", "Q", "Nope"]).unwrap_err();
        assert!(matches!(err, ViewerError::UnknownKey(name) if name == "Nope"));
    }

    #[test]
    fn bindings_reject_a_key_used_twice() {
        let err = KeyBindings::from_names(["W", "w", "A", "D", "Q", "E"]).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::DuplicateBinding {
                ref key,
                first: Movement::Forward,
                second: Movement::Backward,
            } if key == "W"
        ));

        let err = KeyBindings::from_names(["W", "S", "A", "D", "space", "Space"]).unwrap_err();
        assert!(err.to_string().contains("Space"));
    }
}
