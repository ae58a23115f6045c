//! Window and event loop.
//!
//! Owns the `winit` event loop and the single scene window, and wires key
//! presses to the camera and the camera to re-renders.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
