//! Accumulated steering and zoom input.

use glam::Vec3;

/// A key bound to one direction of the input axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisKey {
    Up,
    Down,
    Left,
    Right,
    ZoomIn,
    ZoomOut,
}

impl AxisKey {
    pub const ALL: [AxisKey; 6] = [
        AxisKey::Up,
        AxisKey::Down,
        AxisKey::Left,
        AxisKey::Right,
        AxisKey::ZoomIn,
        AxisKey::ZoomOut,
    ];

    /// Axis change applied while the key is held.
    ///
    /// `x` steers right, `y` steers up, `z` moves the camera away.
    pub fn delta(self) -> Vec3 {
        match self {
            AxisKey::Up => Vec3::Y,
            AxisKey::Down => Vec3::NEG_Y,
            AxisKey::Left => Vec3::NEG_X,
            AxisKey::Right => Vec3::X,
            AxisKey::ZoomIn => Vec3::NEG_Z,
            AxisKey::ZoomOut => Vec3::Z,
        }
    }

    /// Default keyboard binding: `w`/`s` up and down, `a`/`d` left and right,
    /// `e`/`q` zoom in and out.
    pub fn from_char(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(AxisKey::Up),
            's' => Some(AxisKey::Down),
            'a' => Some(AxisKey::Left),
            'd' => Some(AxisKey::Right),
            'e' => Some(AxisKey::ZoomIn),
            'q' => Some(AxisKey::ZoomOut),
            _ => None,
        }
    }
}

/// Three-component input axis with every component kept in `[-1, 1]`.
///
/// Presses add the key's delta and releases subtract it, so opposing keys held
/// together cancel out.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputAxis {
    value: Vec3,
}

impl InputAxis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Vec3 {
        self.value
    }

    /// Add `delta`, then clamp each component to `[-1, 1]`.
    pub fn add_delta(&mut self, delta: Vec3) {
        self.value = (self.value + delta).clamp(Vec3::NEG_ONE, Vec3::ONE);
    }

    pub fn press(&mut self, key: AxisKey) {
        self.add_delta(key.delta());
    }

    pub fn release(&mut self, key: AxisKey) {
        self.add_delta(-key.delta());
    }

    pub fn reset(&mut self) {
        self.value = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release_cancel() {
        let mut axis = InputAxis::new();
        axis.press(AxisKey::Up);
        assert_eq!(axis.value(), Vec3::Y);
        axis.release(AxisKey::Up);
        assert_eq!(axis.value(), Vec3::ZERO, "release should undo the press");
    }

    #[test]
    fn test_components_clamp() {
        let mut axis = InputAxis::new();
        axis.add_delta(Vec3::new(3.0, -5.0, 0.5));
        assert_eq!(axis.value(), Vec3::new(1.0, -1.0, 0.5));
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut axis = InputAxis::new();
        axis.press(AxisKey::Left);
        axis.press(AxisKey::Right);
        assert_eq!(axis.value().x, 0.0);
    }

    #[test]
    fn test_repeated_press_saturates() {
        let mut axis = InputAxis::new();
        axis.press(AxisKey::ZoomOut);
        axis.press(AxisKey::ZoomOut);
        assert_eq!(axis.value().z, 1.0);
        // The clamp swallowed the second press, so one release returns to zero.
        axis.release(AxisKey::ZoomOut);
        assert_eq!(axis.value().z, 0.0);
    }

    #[test]
    fn test_default_bindings() {
        assert_eq!(AxisKey::from_char('W'), Some(AxisKey::Up));
        assert_eq!(AxisKey::from_char('q'), Some(AxisKey::ZoomOut));
        assert_eq!(AxisKey::from_char('x'), None);
        for key in AxisKey::ALL {
            assert_eq!(key.delta().length(), 1.0, "{key:?} should move one axis");
        }
    }
}
