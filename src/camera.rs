use glam::Vec3;
use log::warn;
use serde::{Deserialize, Serialize};

/// Yaw that looks down -Z with a +Y world up.
pub const DEFAULT_YAW: f32 = -90.0;
/// Default bound for `|pitch|`, in degrees.
pub const DEFAULT_PITCH_LIMIT: f32 = 89.0;
/// Largest accepted pitch bound; the basis degenerates at 90 degrees.
pub const MAX_PITCH_LIMIT: f32 = 89.9;

/// How the fragment shader should build primary rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionMode {
    /// Value pushed to the `projection` uniform.
    pub fn as_uniform(self) -> f32 {
        match self {
            Self::Perspective => 0.0,
            Self::Orthographic => 1.0,
        }
    }
}

/// Orthonormal camera frame derived from yaw and pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl OrientationBasis {
    /// Builds the basis for `yaw`/`pitch` given in degrees.
    ///
    /// Pitch must stay away from +-90 degrees; [`Camera`] guarantees this by
    /// clamping every update.
    pub fn from_angles(yaw: f32, pitch: f32, world_up: Vec3) -> Self {
        let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
        let forward = Vec3::new(
            pitch.cos() * yaw.cos(),
            pitch.sin(),
            pitch.cos() * yaw.sin(),
        )
        .normalize();
        let right = forward
            .cross(world_up)
            .try_normalize()
            .unwrap_or_else(|| forward.any_orthonormal_vector());
        let up = right.cross(forward);
        Self { forward, right, up }
    }
}

/// Directions the keyboard can move the camera in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Movement {
    pub const ALL: [Movement; 6] = [
        Movement::Forward,
        Movement::Backward,
        Movement::Left,
        Movement::Right,
        Movement::Up,
        Movement::Down,
    ];

    fn axis(self, basis: &OrientationBasis, world_up: Vec3) -> Vec3 {
        match self {
            Self::Forward => basis.forward,
            Self::Backward => -basis.forward,
            Self::Left => -basis.right,
            Self::Right => basis.right,
            Self::Up => world_up,
            Self::Down => -world_up,
        }
    }
}

/// Anything that can report which movement keys are held this frame.
pub trait KeyStateSource {
    fn is_held(&self, movement: Movement) -> bool;
}

impl<const N: usize> KeyStateSource for [Movement; N] {
    fn is_held(&self, movement: Movement) -> bool {
        self.contains(&movement)
    }
}

impl KeyStateSource for [Movement] {
    fn is_held(&self, movement: Movement) -> bool {
        self.contains(&movement)
    }
}

/// First-person camera: a position plus yaw/pitch around a fixed world up.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    world_up: Vec3,
    projection: ProjectionMode,
    pitch_limit: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, ProjectionMode::Perspective)
    }
}

impl Camera {
    /// Creates a camera looking down -Z (yaw -90, pitch 0).
    pub fn new(position: Vec3, world_up: Vec3, projection: ProjectionMode) -> Self {
        Self {
            position,
            yaw: DEFAULT_YAW,
            pitch: 0.0,
            world_up: world_up.try_normalize().unwrap_or(Vec3::Y),
            projection,
            pitch_limit: DEFAULT_PITCH_LIMIT,
        }
    }

    /// Sets the orientation, clamping pitch into the allowed range.
    ///
    /// Non-finite angles are ignored and the current orientation is kept.
    pub fn with_orientation(mut self, yaw: f32, pitch: f32) -> Self {
        if !(yaw.is_finite() && pitch.is_finite()) {
            warn!("ignoring non-finite orientation yaw {yaw}, pitch {pitch}");
            return self;
        }
        let clamped = pitch.clamp(-self.pitch_limit, self.pitch_limit);
        if clamped != pitch {
            warn!(
                "initial pitch {pitch} exceeds +-{} degrees, clamped to {clamped}",
                self.pitch_limit
            );
        }
        self.yaw = wrap_yaw(yaw);
        self.pitch = clamped;
        self
    }

    /// Sets the pitch bound (degrees), kept inside (0, 89.9]. A non-finite
    /// bound falls back to [`DEFAULT_PITCH_LIMIT`].
    pub fn with_pitch_limit(mut self, limit: f32) -> Self {
        let limit = if limit.is_finite() {
            limit.abs()
        } else {
            warn!("ignoring non-finite pitch limit {limit}");
            DEFAULT_PITCH_LIMIT
        };
        self.pitch_limit = limit.clamp(f32::EPSILON, MAX_PITCH_LIMIT);
        self.pitch = self.pitch.clamp(-self.pitch_limit, self.pitch_limit);
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn pitch_limit(&self) -> f32 {
        self.pitch_limit
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    /// Recomputes the orientation basis from the current angles.
    pub fn basis(&self) -> OrientationBasis {
        OrientationBasis::from_angles(self.yaw, self.pitch, self.world_up)
    }

    pub fn forward(&self) -> Vec3 {
        self.basis().forward
    }

    pub fn right(&self) -> Vec3 {
        self.basis().right
    }

    pub fn up(&self) -> Vec3 {
        self.basis().up
    }

    /// Point one unit in front of the camera, what the shader receives as
    /// `camera_dir`.
    pub fn look_target(&self) -> Vec3 {
        self.position + self.forward()
    }

    /// Moves the camera by `step` along every held direction.
    ///
    /// Held directions add up without normalization, so diagonal movement is
    /// faster than straight movement and opposite keys cancel out.
    pub fn process_keyboard_input<K>(&mut self, keys: &K, step: f32)
    where
        K: KeyStateSource + ?Sized,
    {
        if !step.is_finite() {
            warn!("ignoring non-finite movement step {step}");
            return;
        }
        let basis = self.basis();
        let offset = Movement::ALL
            .into_iter()
            .filter(|movement| keys.is_held(*movement))
            .fold(Vec3::ZERO, |offset, movement| {
                offset + movement.axis(&basis, self.world_up)
            });
        self.position += offset * step;
    }

    /// Applies a cursor delta in screen space (Y grows downward).
    pub fn process_mouse_input(&mut self, delta_x: f32, delta_y: f32, sensitivity: f32) {
        if !(delta_x.is_finite() && delta_y.is_finite() && sensitivity.is_finite()) {
            warn!("ignoring non-finite mouse input ({delta_x}, {delta_y}) x {sensitivity}");
            return;
        }
        let (turn, tilt) = (delta_x * sensitivity, delta_y * sensitivity);
        if !(turn.is_finite() && tilt.is_finite()) {
            warn!("ignoring mouse input that overflows ({delta_x}, {delta_y}) x {sensitivity}");
            return;
        }
        self.yaw = wrap_yaw(self.yaw + turn);
        self.pitch = (self.pitch - tilt).clamp(-self.pitch_limit, self.pitch_limit);
    }
}

/// Folds a yaw angle into [-180, 180) degrees.
fn wrap_yaw(yaw: f32) -> f32 {
    (yaw + 180.0).rem_euclid(360.0) - 180.0
}
