use std::fmt;
use std::path::PathBuf;

use image::RgbaImage;

use super::http::HttpImageLoader;

/// Why a texture fetch failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchErrorKind {
    /// The source could not be read.
    Io(String),
    /// The request never produced a response (connect, timeout, body read).
    Transport(String),
    /// The server answered with a non-success status.
    Status(u16),
    /// The bytes were read but are not a decodable image.
    Decode(String),
    /// The URI scheme has no loader.
    Unsupported,
}

/// Failure to obtain the image backing a texture.
///
/// Kept apart from shader and geometry errors: a fetch failure leaves the
/// scene alive but undrawable until a later fetch succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureFetchError {
    pub source_uri: String,
    pub kind: FetchErrorKind,
}

impl TextureFetchError {
    pub fn new(source_uri: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            source_uri: source_uri.into(),
            kind,
        }
    }
}

impl fmt::Display for TextureFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let uri = &self.source_uri;
        match &self.kind {
            FetchErrorKind::Io(msg) => write!(f, "failed to read texture `{uri}`: {msg}"),
            FetchErrorKind::Transport(msg) => write!(f, "failed to fetch texture `{uri}`: {msg}"),
            FetchErrorKind::Status(code) => {
                write!(f, "failed to fetch texture `{uri}`: HTTP status {code}")
            }
            FetchErrorKind::Decode(msg) => write!(f, "failed to decode texture `{uri}`: {msg}"),
            FetchErrorKind::Unsupported => write!(f, "no loader for texture `{uri}`"),
        }
    }
}

impl std::error::Error for TextureFetchError {}

/// Source of decoded RGBA images.
///
/// Loading is the one asynchronous step of a render; callers drive it with
/// `pollster::block_on`.
#[allow(async_fn_in_trait)]
pub trait ImageLoader {
    async fn load(&self, uri: &str) -> Result<RgbaImage, TextureFetchError>;
}

/// Loads images from the local filesystem.
///
/// Accepts plain paths and `file://` URLs. Any other scheme is `Unsupported`.
#[derive(Debug, Default, Clone)]
pub struct FsImageLoader {
    base_dir: Option<PathBuf>,
}

impl FsImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative paths are resolved against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, uri: &str) -> Option<PathBuf> {
        let path = match uri.strip_prefix("file://") {
            Some(rest) => rest,
            None if uri.contains("://") => return None,
            None => uri,
        };

        let path = PathBuf::from(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path),
        }
    }
}

impl ImageLoader for FsImageLoader {
    async fn load(&self, uri: &str) -> Result<RgbaImage, TextureFetchError> {
        let fail = |kind| TextureFetchError::new(uri, kind);

        let path = self.resolve(uri).ok_or_else(|| fail(FetchErrorKind::Unsupported))?;
        log::debug!("loading texture from {}", path.display());

        let bytes = std::fs::read(&path).map_err(|e| fail(FetchErrorKind::Io(e.to_string())))?;
        decode(uri, &bytes)
    }
}

/// Decodes fetched bytes into RGBA8, whatever the source format.
pub(crate) fn decode(uri: &str, bytes: &[u8]) -> Result<RgbaImage, TextureFetchError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| TextureFetchError::new(uri, FetchErrorKind::Decode(e.to_string())))?;

    let rgba = decoded.to_rgba8();
    log::info!("texture `{uri}` loaded ({}x{})", rgba.width(), rgba.height());
    Ok(rgba)
}

/// Routes `http://` and `https://` URIs to the network and everything else
/// to the filesystem.
#[derive(Debug, Clone)]
pub struct UriImageLoader {
    fs: FsImageLoader,
    http: HttpImageLoader,
}

impl UriImageLoader {
    pub fn new(fs: FsImageLoader, http: HttpImageLoader) -> Self {
        Self { fs, http }
    }
}

impl ImageLoader for UriImageLoader {
    async fn load(&self, uri: &str) -> Result<RgbaImage, TextureFetchError> {
        if HttpImageLoader::handles(uri) {
            self.http.load(uri).await
        } else {
            self.fs.load(uri).await
        }
    }
}
