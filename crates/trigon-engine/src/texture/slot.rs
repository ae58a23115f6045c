use image::RgbaImage;

use super::loader::{ImageLoader, TextureFetchError};

/// Load state of a texture slot. The render scheduler reads it, never copies it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadPhase {
    Idle,
    FetchingTexture,
    Ready,
}

/// Holds the one image a textured scene samples.
///
/// The image is stored bottom row first, matching texture coordinates whose
/// `v = 0` is the bottom of the quad.
#[derive(Debug)]
pub struct TextureSlot {
    phase: LoadPhase,
    image: Option<RgbaImage>,
    source_uri: Option<String>,
}

impl Default for TextureSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureSlot {
    pub fn new() -> Self {
        Self {
            phase: LoadPhase::Idle,
            image: None,
            source_uri: None,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }

    /// Fetches and stores the image.
    ///
    /// On failure the slot returns to `Idle`, drops any previous image and
    /// hands the error back; nothing is drawn with a stale or missing texture.
    pub async fn fetch<L: ImageLoader>(
        &mut self,
        loader: &L,
        uri: &str,
    ) -> Result<&RgbaImage, TextureFetchError> {
        self.begin_fetch(uri);
        let loaded = loader.load(uri).await;
        self.complete_fetch(loaded)
    }

    /// Enters `FetchingTexture` for `uri`, dropping any previous image.
    ///
    /// For callers that drive the load themselves; pair with
    /// [`TextureSlot::complete_fetch`].
    pub fn begin_fetch(&mut self, uri: &str) {
        self.phase = LoadPhase::FetchingTexture;
        self.image = None;
        self.source_uri = Some(uri.to_string());
    }

    /// Stores the outcome of the load started by [`TextureSlot::begin_fetch`].
    pub fn complete_fetch(
        &mut self,
        loaded: Result<RgbaImage, TextureFetchError>,
    ) -> Result<&RgbaImage, TextureFetchError> {
        match loaded {
            Ok(mut image) => {
                image::imageops::flip_vertical_in_place(&mut image);
                self.phase = LoadPhase::Ready;
                Ok(self.image.insert(image))
            }
            Err(err) => {
                log::warn!("{err}");
                self.phase = LoadPhase::Idle;
                Err(err)
            }
        }
    }
}
