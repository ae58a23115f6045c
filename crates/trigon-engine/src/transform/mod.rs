//! Model/view/projection transforms.
//!
//! Matrices follow the GL clip convention (right-handed look-at, depth in
//! `[-1, 1]`). Vertex shaders remap depth to wgpu's `[0, 1]` range themselves.
//!
//! All transforms are pure functions of a [`CameraState`] passed by value and
//! the variant's static model parameters. Nothing is cached between renders.

mod camera;
mod pipeline;

pub use camera::CameraState;
pub use pipeline::{MatrixBinding, Matrices, Transform};
