//! Trigon engine.
//!
//! A small GPU rendering pipeline: shader programs compiled from WGSL,
//! validated vertex geometry, camera-driven transforms and an offscreen
//! surface presented by copy. [`scene`] composes them into the demo scenes,
//! [`window`] runs one scene in a winit window.

pub mod device;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod scene;
pub mod shader;
pub mod surface;
pub mod texture;
pub mod transform;
pub mod window;

pub use error::{PipelineError, RenderError, ShaderStage};
