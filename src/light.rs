use glam::{Vec3, Vec4};

/// Point light edited from the overlay and read once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub position: Vec3,
    color: Vec4,
}

impl Default for LightState {
    fn default() -> Self {
        Self::new(Vec3::new(2.0, 4.0, 3.0), Vec4::ONE)
    }
}

impl LightState {
    pub fn new(position: Vec3, color: Vec4) -> Self {
        let mut light = Self {
            position,
            color: Vec4::ONE,
        };
        light.set_color(color);
        light
    }

    /// RGBA color, every channel within `[0, 1]`.
    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color = color.clamp(Vec4::ZERO, Vec4::ONE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_channels_are_clamped() {
        let mut light = LightState::new(Vec3::ZERO, Vec4::new(2.0, -1.0, 0.5, 1.5));
        assert_eq!(light.color(), Vec4::new(1.0, 0.0, 0.5, 1.0));
        light.set_color(Vec4::new(0.25, 0.5, 0.75, -0.5));
        assert_eq!(light.color(), Vec4::new(0.25, 0.5, 0.75, 0.0));
    }

    #[test]
    fn position_is_free_form() {
        let mut light = LightState::default();
        light.position = Vec3::new(-100.0, 1e4, 0.0);
        assert_eq!(light.position, Vec3::new(-100.0, 1e4, 0.0));
        assert_eq!(light.color(), Vec4::ONE);
    }
}
