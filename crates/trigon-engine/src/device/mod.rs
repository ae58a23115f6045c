//! GPU device and window surface.
//!
//! Owns the device, queue and the configured window surface. Scenes never
//! draw into the surface directly: they render offscreen and the surface only
//! receives a copy, so it is configured as a copy destination as well as a
//! render attachment.

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
