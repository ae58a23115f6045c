//! Vertex geometry.
//!
//! [`Geometry`] is the validated CPU-side description: interleaved `f32`
//! vertex data, its attribute layout, optional indices and the primitive
//! topology. [`GeometryBuffer`] is the immutable GPU copy created from it.
//!
//! Invariants checked at construction:
//! - attribute offsets and component counts fit inside the stride
//! - vertex data is an exact number of strides
//! - every index addresses an existing vertex

mod buffer;
mod layout;

pub use buffer::{Geometry, GeometryBuffer, IndexData, Topology};
pub use layout::{VertexAttribute, VertexLayout, FLOAT_BYTES};
