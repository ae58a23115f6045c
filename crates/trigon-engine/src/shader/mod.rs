//! Shader programs.
//!
//! A program is a vertex stage and a fragment stage written as separate WGSL
//! modules. Both stages are parsed and validated with `naga` before any GPU
//! object exists, so compile and link errors surface without a device.
//!
//! Attribute and uniform locations are reflected from the validated modules
//! and are only reachable through an [`ActiveProgram`].

mod program;
mod reflect;

pub use program::{ActiveProgram, ShaderProgram, UniformWrite, UniformWrites};
pub use reflect::{AttributeLocation, UniformKind, UniformLocation};
