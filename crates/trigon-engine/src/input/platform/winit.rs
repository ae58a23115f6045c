use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::Key;

/// Translates a key press. Auto-repeat presses count, so holding an arrow
/// keeps moving the camera; releases yield `None`.
pub(crate) fn translate_key_event(event: &KeyEvent) -> Option<Key> {
    translate(event.state, event.physical_key)
}

fn translate(state: ElementState, key: PhysicalKey) -> Option<Key> {
    match state {
        ElementState::Pressed => Some(map_key(key)),
        ElementState::Released => None,
    }
}

fn map_key(key: PhysicalKey) -> Key {
    match key {
        PhysicalKey::Code(code) => match code {
            KeyCode::ArrowLeft => Key::ArrowLeft,
            KeyCode::ArrowRight => Key::ArrowRight,
            KeyCode::ArrowUp => Key::ArrowUp,
            KeyCode::ArrowDown => Key::ArrowDown,
            KeyCode::Escape => Key::Escape,
            other => Key::Other(other as u32),
        },
        PhysicalKey::Unidentified(_) => Key::Other(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::input::{apply_key, EYE_STEP};
    use crate::transform::CameraState;

    #[test]
    fn presses_translate_and_releases_do_not() {
        let left = PhysicalKey::Code(KeyCode::ArrowLeft);
        assert_eq!(translate(ElementState::Pressed, left), Some(Key::ArrowLeft));
        assert_eq!(translate(ElementState::Released, left), None);
    }

    #[test]
    fn held_arrow_keeps_stepping_the_camera() {
        // A held key arrives as one press followed by repeat presses, each
        // translating the same way.
        let camera = (0..5)
            .filter_map(|_| translate(ElementState::Pressed, PhysicalKey::Code(KeyCode::ArrowRight)))
            .fold(CameraState::default(), |c, key| apply_key(c, key).unwrap_or(c));
        let expected = CameraState::default().eye.x + 5.0 * EYE_STEP;
        assert!((camera.eye.x - expected).abs() < 1e-5);
    }

    #[test]
    fn arrows_map_by_physical_code() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowLeft)), Key::ArrowLeft);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowDown)), Key::ArrowDown);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::KeyA)), Key::Other(_)));
    }
}
