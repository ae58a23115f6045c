//! The single texture a scene may sample.
//!
//! Fetching is asynchronous and may fail; [`TextureSlot`] tracks where a
//! scene is in that process and [`GpuTexture`] is the uploaded result.

mod gpu;
mod http;
mod loader;
mod slot;

pub use gpu::GpuTexture;
pub use http::HttpImageLoader;
pub use loader::{FetchErrorKind, FsImageLoader, ImageLoader, TextureFetchError, UriImageLoader};
pub use slot::{LoadPhase, TextureSlot};
