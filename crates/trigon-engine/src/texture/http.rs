use std::time::Duration;

use anyhow::{Context, Result};
use image::RgbaImage;

use super::loader::{decode, FetchErrorKind, ImageLoader, TextureFetchError};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Fetches images over `http://` and `https://`.
///
/// Uses the blocking client: the runtime drives loads with
/// `pollster::block_on`, which has no reactor for an async client.
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: reqwest::blocking::Client,
}

impl HttpImageLoader {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub fn handles(uri: &str) -> bool {
        uri.starts_with("http://") || uri.starts_with("https://")
    }
}

impl ImageLoader for HttpImageLoader {
    async fn load(&self, uri: &str) -> Result<RgbaImage, TextureFetchError> {
        let fail = |kind| TextureFetchError::new(uri, kind);

        if !Self::handles(uri) {
            return Err(fail(FetchErrorKind::Unsupported));
        }
        log::debug!("fetching texture from {uri}");

        let response = self.client.get(uri).send().map_err(|e| {
            let reason = if e.is_connect() {
                format!("connection failed: {e}")
            } else if e.is_timeout() {
                "request timed out".to_string()
            } else {
                format!("request failed: {e}")
            };
            fail(FetchErrorKind::Transport(reason))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(FetchErrorKind::Status(status.as_u16())));
        }

        let bytes = response
            .bytes()
            .map_err(|e| fail(FetchErrorKind::Transport(format!("body read failed: {e}"))))?;
        decode(uri, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serves one canned response on loopback and returns its base URL.
    fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
        });

        format!("http://{addr}")
    }

    fn png_bytes() -> Vec<u8> {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 1, image::Rgba([200, 100, 50, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    // ── responses ─────────────────────────────────────────────────────────

    #[test]
    fn success_body_is_decoded() {
        let base = serve_once("200 OK", png_bytes());
        let loader = HttpImageLoader::new().unwrap();

        let image = pollster::block_on(loader.load(&format!("{base}/sky.png"))).unwrap();
        assert_eq!(image.dimensions(), (1, 2));
        assert_eq!(image.get_pixel(0, 1).0, [200, 100, 50, 255]);
    }

    #[test]
    fn error_status_is_reported() {
        let base = serve_once("404 Not Found", b"missing".to_vec());
        let uri = format!("{base}/sky.png");

        let err = pollster::block_on(HttpImageLoader::new().unwrap().load(&uri)).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Status(404));
        assert_eq!(err.source_uri, uri);
    }

    #[test]
    fn non_image_body_is_decode_error() {
        let base = serve_once("200 OK", b"<html>not a png</html>".to_vec());
        let err = pollster::block_on(HttpImageLoader::new().unwrap().load(&format!("{base}/x")))
            .unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::Decode(_)));
    }

    // ── transport ─────────────────────────────────────────────────────────

    #[test]
    fn unreachable_host_is_transport_error() {
        let err = pollster::block_on(HttpImageLoader::new().unwrap().load("http://127.0.0.1:1/x.png"))
            .unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::Transport(_)));
        assert!(err.to_string().contains("127.0.0.1:1"));
    }

    #[test]
    fn only_http_schemes_are_handled() {
        assert!(HttpImageLoader::handles("https://example.com/a.png"));
        assert!(HttpImageLoader::handles("http://example.com/a.png"));
        assert!(!HttpImageLoader::handles("file:///tmp/a.png"));
        assert!(!HttpImageLoader::handles("sky.png"));

        let err = pollster::block_on(HttpImageLoader::new().unwrap().load("sky.png")).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Unsupported);
    }
}
