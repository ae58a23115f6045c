//! Offscreen rendering and presentation.
//!
//! A frame is first planned as an ordered list of [`SurfaceStep`]s, checked by
//! [`PassRecipe::from_steps`], and only then executed by [`RenderSurface`].
//! Planning needs no GPU.

mod color;
mod plan;
mod target;

pub use color::ClearColor;
pub use plan::{
    plan_frame, DrawCall, PassDesc, PassRecipe, SurfaceStep, TargetSize, Viewport, CLEAR_DEPTH,
};
pub use target::{RenderSurface, DEPTH_FORMAT};
