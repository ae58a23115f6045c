use crate::transform::CameraState;

use super::Key;

/// Eye X movement per arrow press.
pub const EYE_STEP: f32 = 0.1;
/// Far plane movement per arrow press.
pub const FAR_STEP: f32 = 0.1;

/// Returns the camera after `key`, or `None` if the key does not move it.
///
/// Left/right move the eye along X; up pulls the far plane in, down pushes it
/// out. A `None` result means no re-render is needed.
pub fn apply_key(camera: CameraState, key: Key) -> Option<CameraState> {
    let next = match key {
        Key::ArrowLeft => camera.with_eye_x(camera.eye.x - EYE_STEP),
        Key::ArrowRight => camera.with_eye_x(camera.eye.x + EYE_STEP),
        Key::ArrowUp => camera.with_far(camera.far - FAR_STEP),
        Key::ArrowDown => camera.with_far(camera.far + FAR_STEP),
        Key::Escape | Key::Other(_) => return None,
    };
    log::debug!(
        "camera eye.x {:.2} far {:.2}",
        next.eye.x,
        next.far
    );
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn left_then_right_restores_eye_x() {
        let start = CameraState::default();
        let left = apply_key(start, Key::ArrowLeft).unwrap();
        assert!((left.eye.x - (start.eye.x - 0.1)).abs() < EPS);

        let back = apply_key(left, Key::ArrowRight).unwrap();
        assert!((back.eye.x - start.eye.x).abs() < EPS);
        assert_eq!(back.eye.y, start.eye.y);
        assert_eq!(back.far, start.far);
    }

    #[test]
    fn up_and_down_move_far_plane() {
        let start = CameraState::default();
        let up = apply_key(start, Key::ArrowUp).unwrap();
        assert!((up.far - 0.9).abs() < EPS);
        assert_eq!(up.eye, start.eye);

        let down = apply_key(up, Key::ArrowDown).unwrap();
        assert!((down.far - start.far).abs() < EPS);
        assert_eq!(down.near, start.near);
    }

    #[test]
    fn other_keys_leave_camera_alone() {
        let start = CameraState::default();
        assert_eq!(apply_key(start, Key::Other(65)), None);
        assert_eq!(apply_key(start, Key::Escape), None);
    }

    #[test]
    fn legacy_key_codes_map_to_arrows() {
        assert_eq!(Key::from_key_code(37), Key::ArrowLeft);
        assert_eq!(Key::from_key_code(38), Key::ArrowUp);
        assert_eq!(Key::from_key_code(39), Key::ArrowRight);
        assert_eq!(Key::from_key_code(40), Key::ArrowDown);
        assert_eq!(Key::from_key_code(13), Key::Other(13));
    }

    #[test]
    fn many_presses_accumulate_steps() {
        let mut camera = CameraState::default();
        for _ in 0..5 {
            camera = apply_key(camera, Key::ArrowLeft).unwrap();
        }
        assert!((camera.eye.x - (0.2 - 0.5)).abs() < 1e-5);
    }
}
