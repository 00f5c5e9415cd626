// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image normalizer — fetch catalog photos and bring them under a size budget.
//
// Opaque images are downscaled (Lanczos3) so neither side exceeds the
// configured maximum and re-encoded as JPEG. PNGs with any transparent pixel
// keep their original bytes so the transparency survives. Every failure
// degrades to "no image" or "original bytes"; nothing here fails a report.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use pliego_core::error::{PliegoError, Result};
use pliego_core::{ImageConfig, ImageFormat};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, info, instrument, warn};

/// Image bytes ready for embedding plus what was detected about them.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    pub payload: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    /// False when `payload` is the source bytes untouched.
    pub recompressed: bool,
}

/// Fetches and normalizes image references (`http(s)` URLs or `data:` URIs).
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    client: reqwest::Client,
    config: ImageConfig,
}

impl ImageNormalizer {
    pub fn new(config: ImageConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.clone());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|err| PliegoError::MissingAsset(format!("cannot build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Normalize one reference. `None` means the row renders without image.
    #[instrument(skip(self, reference), fields(reference = %preview(reference)))]
    pub async fn normalize(&self, reference: &str) -> Option<NormalizedImage> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        if reference.starts_with("data:") {
            return match decode_data_uri(reference) {
                Ok((bytes, format)) => Some(passthrough(bytes, format)),
                Err(err) => {
                    warn!(error = %err, "Unreadable data URI, image omitted");
                    None
                }
            };
        }

        if !(reference.starts_with("http://") || reference.starts_with("https://")) {
            warn!("Unsupported image reference scheme, image omitted");
            return None;
        }

        let (bytes, declared) = match self.fetch(reference).await {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(error = %err, "Image unavailable, image omitted");
                return None;
            }
        };

        let config = self.config.clone();
        match tokio::task::spawn_blocking(move || recompress(bytes, declared, &config)).await {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(error = %err, "Image recompression task failed, image omitted");
                None
            }
        }
    }

    /// Normalize every reference concurrently. The result keeps input order
    /// and has one entry per reference.
    #[instrument(skip_all)]
    pub async fn normalize_all<I>(&self, references: I) -> Vec<Option<NormalizedImage>>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let handles: Vec<_> = references
            .into_iter()
            .map(|reference| {
                let normalizer = self.clone();
                let reference: String = reference.into();
                tokio::spawn(async move { normalizer.normalize(&reference).await })
            })
            .collect();

        let total = handles.len();
        let mut results = Vec::with_capacity(total);
        for handle in handles {
            results.push(handle.await.unwrap_or_else(|err| {
                warn!(error = %err, "Image task panicked, image omitted");
                None
            }));
        }
        let loaded = results.iter().filter(|r| r.is_some()).count();
        info!(total, loaded, "Images normalized");
        results
    }

    async fn fetch(&self, url: &str) -> Result<(Vec<u8>, ImageFormat)> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "image/*")
            .send()
            .await
            .map_err(|err| PliegoError::MissingAsset(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PliegoError::MissingAsset(format!("HTTP {status}")));
        }

        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ImageFormat::from_content_type)
            .unwrap_or(ImageFormat::Jpeg);

        let body = response
            .bytes()
            .await
            .map_err(|err| PliegoError::MissingAsset(format!("body read failed: {err}")))?;
        if body.is_empty() {
            return Err(PliegoError::MissingAsset("empty response body".into()));
        }
        debug!(bytes = body.len(), format = ?declared, "Image fetched");
        Ok((body.to_vec(), declared))
    }
}

/// Decode `data:<mime>;base64,<payload>`.
pub fn decode_data_uri(uri: &str) -> Result<(Vec<u8>, ImageFormat)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| PliegoError::MissingAsset("not a data URI".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| PliegoError::MissingAsset("data URI has no payload".into()))?;
    if !meta.ends_with(";base64") {
        return Err(PliegoError::MissingAsset(
            "only base64 data URIs are supported".into(),
        ));
    }
    let format = ImageFormat::from_content_type(meta);
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|err| PliegoError::MissingAsset(format!("bad base64 payload: {err}")))?;
    if bytes.is_empty() {
        return Err(PliegoError::MissingAsset("empty data URI payload".into()));
    }
    Ok((bytes, format))
}

/// Bring fetched bytes under the size budget. Never fails: undecodable or
/// unencodable input comes back as the original bytes.
pub fn recompress(bytes: Vec<u8>, declared: ImageFormat, config: &ImageConfig) -> NormalizedImage {
    let decoded = match image::load_from_memory(&bytes) {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!(error = %err, format = ?declared, "Image decode failed, keeping original bytes");
            return NormalizedImage {
                payload: bytes,
                format: declared,
                width: 0,
                height: 0,
                has_alpha: false,
                recompressed: false,
            };
        }
    };

    let (width, height) = (decoded.width(), decoded.height());
    if declared == ImageFormat::Png && has_transparency(&decoded) {
        debug!(width, height, "Transparent PNG kept as is");
        return NormalizedImage {
            payload: bytes,
            format: ImageFormat::Png,
            width,
            height,
            has_alpha: true,
            recompressed: false,
        };
    }

    let max = config.max_dimension.max(1);
    let resized = if width > max || height > max {
        debug!(from_w = width, from_h = height, max, "Downscaling image");
        decoded.resize(max, max, image::imageops::FilterType::Lanczos3)
    } else {
        decoded
    };

    match to_jpeg(&resized, config.jpeg_quality) {
        Ok(payload) => {
            debug!(
                before = bytes.len(),
                after = payload.len(),
                "Image recompressed to JPEG"
            );
            NormalizedImage {
                payload,
                format: ImageFormat::Jpeg,
                width: resized.width(),
                height: resized.height(),
                has_alpha: false,
                recompressed: true,
            }
        }
        Err(err) => {
            warn!(error = %err, "JPEG encoding failed, keeping original bytes");
            NormalizedImage {
                payload: bytes,
                format: declared,
                width,
                height,
                has_alpha: false,
                recompressed: false,
            }
        }
    }
}

/// Source bytes as they are, with dimensions when they can be read.
fn passthrough(bytes: Vec<u8>, format: ImageFormat) -> NormalizedImage {
    let (width, height, has_alpha) = match image::load_from_memory(&bytes) {
        Ok(decoded) => (decoded.width(), decoded.height(), has_transparency(&decoded)),
        Err(_) => (0, 0, false),
    };
    NormalizedImage {
        payload: bytes,
        format,
        width,
        height,
        has_alpha,
        recompressed: false,
    }
}

/// True when the image has an alpha channel with at least one pixel below
/// full opacity.
fn has_transparency(image: &DynamicImage) -> bool {
    image.color().has_alpha() && image.to_rgba8().pixels().any(|pixel| pixel.0[3] < 255)
}

fn to_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let rgb = image.to_rgb8();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|err| PliegoError::RenderFailure(format!("JPEG encoding failed: {err}")))?;
    Ok(buffer.into_inner())
}

/// Log-safe prefix of a reference; data URIs can be megabytes long.
fn preview(reference: &str) -> String {
    reference.chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn png(image: DynamicImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn opaque_png(width: u32, height: u32) -> Vec<u8> {
        png(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 30, 30, 255]),
        )))
    }

    fn transparent_png() -> Vec<u8> {
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([10, 10, 10, 255]));
        image.put_pixel(3, 3, Rgba([10, 10, 10, 0]));
        png(DynamicImage::ImageRgba8(image))
    }

    fn test_config() -> ImageConfig {
        ImageConfig {
            fetch_timeout_ms: 300,
            use_system_proxy: false,
            ..ImageConfig::default()
        }
    }

    /// Serve every connection with the same canned response after `delay`.
    async fn serve(status: &'static str, content_type: &'static str, body: Vec<u8>, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let body = body.clone();
                tokio::spawn(async move {
                    let mut request = [0u8; 2048];
                    let _ = socket.read(&mut request).await;
                    tokio::time::sleep(delay).await;
                    let head = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(&body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}/producto.png")
    }

    #[test]
    fn opaque_png_becomes_jpeg() {
        let result = recompress(opaque_png(16, 16), ImageFormat::Png, &ImageConfig::default());
        assert_eq!(result.format, ImageFormat::Jpeg);
        assert!(result.recompressed);
        assert!(!result.has_alpha);
        assert_eq!(&result.payload[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn transparent_png_keeps_original_bytes() {
        let original = transparent_png();
        let result = recompress(original.clone(), ImageFormat::Png, &ImageConfig::default());
        assert_eq!(result.format, ImageFormat::Png);
        assert!(result.has_alpha);
        assert!(!result.recompressed);
        assert_eq!(result.payload, original);
    }

    #[test]
    fn large_images_are_downscaled_with_aspect() {
        let big = DynamicImage::ImageRgb8(RgbImage::from_pixel(2400, 1200, Rgb([1, 2, 3])));
        let result = recompress(png(big), ImageFormat::Jpeg, &ImageConfig::default());
        assert_eq!((result.width, result.height), (1200, 600));
        assert_eq!(result.format, ImageFormat::Jpeg);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let result = recompress(opaque_png(40, 20), ImageFormat::Png, &ImageConfig::default());
        assert_eq!((result.width, result.height), (40, 20));
    }

    #[test]
    fn undecodable_bytes_pass_through() {
        let garbage = b"definitely not an image".to_vec();
        let result = recompress(garbage.clone(), ImageFormat::Webp, &ImageConfig::default());
        assert_eq!(result.payload, garbage);
        assert_eq!(result.format, ImageFormat::Webp);
        assert!(!result.recompressed);
    }

    #[test]
    fn data_uri_is_decoded() {
        let bytes = transparent_png();
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
        let (decoded, format) = decode_data_uri(&uri).unwrap();
        assert_eq!(decoded, bytes);
        assert_eq!(format, ImageFormat::Png);
        assert!(decode_data_uri("data:image/png,raw").is_err());
        assert!(decode_data_uri("data:image/png;base64,").is_err());
    }

    #[tokio::test]
    async fn data_uri_passes_through_unrecompressed() {
        let bytes = opaque_png(4, 4);
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
        let normalizer = ImageNormalizer::new(test_config()).unwrap();
        let result = normalizer.normalize(&uri).await.unwrap();
        assert_eq!(result.payload, bytes);
        assert!(!result.recompressed);
        assert_eq!((result.width, result.height), (4, 4));
    }

    #[tokio::test]
    async fn fetched_png_is_recompressed() {
        let url = serve("200 OK", "image/png", opaque_png(32, 32), Duration::ZERO).await;
        let normalizer = ImageNormalizer::new(test_config()).unwrap();
        let result = normalizer.normalize(&url).await.unwrap();
        assert_eq!(result.format, ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn slow_host_times_out() {
        let url = serve("200 OK", "image/png", opaque_png(4, 4), Duration::from_secs(3)).await;
        let normalizer = ImageNormalizer::new(test_config()).unwrap();
        assert!(normalizer.normalize(&url).await.is_none());
    }

    #[tokio::test]
    async fn error_status_and_empty_body_yield_none() {
        let missing = serve("404 Not Found", "text/plain", b"no".to_vec(), Duration::ZERO).await;
        let empty = serve("200 OK", "image/jpeg", Vec::new(), Duration::ZERO).await;
        let normalizer = ImageNormalizer::new(test_config()).unwrap();
        assert!(normalizer.normalize(&missing).await.is_none());
        assert!(normalizer.normalize(&empty).await.is_none());
    }

    #[tokio::test]
    async fn unsupported_references_yield_none() {
        let normalizer = ImageNormalizer::new(test_config()).unwrap();
        assert!(normalizer.normalize("").await.is_none());
        assert!(normalizer.normalize("ftp://host/foto.png").await.is_none());
        assert!(normalizer.normalize("/local/foto.png").await.is_none());
    }

    #[tokio::test]
    async fn batch_keeps_input_order() {
        let ok = serve("200 OK", "image/png", opaque_png(8, 8), Duration::ZERO).await;
        let missing = serve("404 Not Found", "text/plain", b"no".to_vec(), Duration::ZERO).await;
        let normalizer = ImageNormalizer::new(test_config()).unwrap();
        let results = normalizer
            .normalize_all(vec![missing.clone(), ok.clone(), String::new(), ok])
            .await;
        assert_eq!(results.len(), 4);
        assert!(results[0].is_none());
        assert!(results[1].is_some());
        assert!(results[2].is_none());
        assert!(results[3].is_some());
    }
}
