use glam::Vec3;

/// Eye position and clip planes driving the camera-dependent transforms.
///
/// Target and up are fixed at the origin and +Y by the scenes, but kept as
/// fields so the look-at inputs are explicit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
}

impl CameraState {
    pub const INITIAL_EYE: Vec3 = Vec3::new(0.2, 0.25, 0.25);

    /// Returns a copy with the eye moved along X.
    pub fn with_eye_x(self, x: f32) -> Self {
        Self {
            eye: Vec3::new(x, self.eye.y, self.eye.z),
            ..self
        }
    }

    /// Returns a copy with a different far plane.
    pub fn with_far(self, far: f32) -> Self {
        Self { far, ..self }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            eye: Self::INITIAL_EYE,
            target: Vec3::ZERO,
            up: Vec3::Y,
            near: -1.0,
            far: 1.0,
        }
    }
}
