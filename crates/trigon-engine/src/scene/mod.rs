//! Scenes: one program, one geometry, one transform and a draw.
//!
//! [`SceneKind`] names the variants. Its [`blueprint`](SceneKind::blueprint)
//! is the GPU-free half of a scene; [`Scene`] adds the GPU objects and the
//! texture slot. [`RenderScheduler`] decides when a render may run while a
//! texture is still loading.

mod blueprint;
mod gpu;
mod kind;
mod instance;
mod schedule;

pub use blueprint::{FramePlan, SceneBlueprint};
pub use gpu::GpuScene;
pub use kind::SceneKind;
pub use instance::Scene;
pub use schedule::{RenderDecision, RenderScheduler};
