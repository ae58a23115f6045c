//! Keyboard input driving the camera.
//!
//! Platform events are translated into [`Key`]s by the runtime; the binding
//! turns keys into new camera values. Nothing here exposes winit types.

mod binding;
pub(crate) mod platform;
mod types;

pub use binding::{apply_key, EYE_STEP, FAR_STEP};
pub use types::Key;
