/// Keys the camera binding reacts to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    /// Any other key, carried with a stable platform code.
    Other(u32),
}

impl Key {
    /// Maps legacy DOM `keyCode` values (37..=40 are the arrows, 27 escape).
    pub fn from_key_code(code: u32) -> Self {
        match code {
            27 => Key::Escape,
            37 => Key::ArrowLeft,
            38 => Key::ArrowUp,
            39 => Key::ArrowRight,
            40 => Key::ArrowDown,
            other => Key::Other(other),
        }
    }
}
