//! Image loading for the image embedder.
//!
//! Resolves every [`ImageInput`] variant to PNG-encoded 8-bit RGB bytes:
//! files are read from disk, URLs fetched over HTTP (no retry), encoded
//! bytes decoded, and raw pixel buffers wrapped. Grayscale, alpha and
//! palette images are converted to 3-channel RGB before encoding.

use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, LumaA, Rgb, Rgba};

use ufdr_core::embedding::ImageResolver;
use ufdr_types::error::EmbeddingError;
use ufdr_types::image::{ImageInput, PixelLayout, RawPixels};

/// Resolves image inputs from disk, HTTP(S) URLs, bytes or pixels.
#[derive(Clone)]
pub struct HttpImageResolver {
    client: reqwest::Client,
}

impl HttpImageResolver {
    /// Create a resolver whose URL fetches give up after `fetch_timeout`.
    pub fn new(fetch_timeout: Duration) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| EmbeddingError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, EmbeddingError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EmbeddingError::Network(format!("failed to fetch {url}: {e}")))?
            .error_for_status()
            .map_err(|e| EmbeddingError::Network(format!("failed to fetch {url}: {e}")))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EmbeddingError::Network(format!("failed to read body of {url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

impl ImageResolver for HttpImageResolver {
    async fn resolve(&self, input: &ImageInput) -> Result<Vec<u8>, EmbeddingError> {
        let source = match input {
            ImageInput::Path(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    EmbeddingError::Encode(format!("failed to read {}: {e}", path.display()))
                })?;
                Source::Encoded(bytes)
            }
            ImageInput::Url(url) => Source::Encoded(self.fetch(url).await?),
            ImageInput::Encoded(bytes) => Source::Encoded(bytes.clone()),
            ImageInput::Pixels(pixels) => Source::Pixels(pixels.clone()),
        };

        // Decoding and PNG encoding are CPU-bound.
        tokio::task::spawn_blocking(move || source.into_rgb_png())
            .await
            .map_err(|e| EmbeddingError::Encode(format!("image conversion task failed: {e}")))?
    }
}

/// Image data once any I/O is done.
enum Source {
    Encoded(Vec<u8>),
    Pixels(RawPixels),
}

impl Source {
    fn into_rgb_png(self) -> Result<Vec<u8>, EmbeddingError> {
        let image = match self {
            Source::Encoded(bytes) => decode(&bytes)?,
            Source::Pixels(pixels) => pixels_to_image(pixels)?,
        };
        encode_rgb_png(&image)
    }
}

/// Wrap an in-memory decoded image as an [`ImageInput`].
pub fn from_dynamic(image: &DynamicImage) -> ImageInput {
    let rgb = image.to_rgb8();
    ImageInput::Pixels(RawPixels {
        width: rgb.width(),
        height: rgb.height(),
        layout: PixelLayout::Rgb,
        data: rgb.into_raw(),
    })
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, EmbeddingError> {
    image::load_from_memory(bytes)
        .map_err(|e| EmbeddingError::Encode(format!("failed to decode image: {e}")))
}

fn pixels_to_image(pixels: RawPixels) -> Result<DynamicImage, EmbeddingError> {
    if pixels.width == 0 || pixels.height == 0 {
        return Err(EmbeddingError::Encode(format!(
            "image has no pixels ({}x{})",
            pixels.width, pixels.height
        )));
    }
    if pixels.data.len() != pixels.expected_len() {
        return Err(EmbeddingError::Encode(format!(
            "pixel buffer holds {} bytes, expected {} for {}x{} {:?}",
            pixels.data.len(),
            pixels.expected_len(),
            pixels.width,
            pixels.height,
            pixels.layout
        )));
    }

    let (w, h, data) = (pixels.width, pixels.height, pixels.data);
    let image = match pixels.layout {
        PixelLayout::Luma => ImageBuffer::<Luma<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
        PixelLayout::LumaAlpha => {
            ImageBuffer::<LumaA<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageLumaA8)
        }
        PixelLayout::Rgb => ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
        PixelLayout::Rgba => ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
    };
    image.ok_or_else(|| EmbeddingError::Encode("pixel buffer does not match its shape".to_string()))
}

fn encode_rgb_png(image: &DynamicImage) -> Result<Vec<u8>, EmbeddingError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EmbeddingError::Encode("image has no pixels".to_string()));
    }
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut out = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| EmbeddingError::Encode(format!("failed to encode image: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn resolver() -> HttpImageResolver {
        HttpImageResolver::new(Duration::from_secs(5)).unwrap()
    }

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut out = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn decoded(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory(bytes).unwrap()
    }

    #[tokio::test]
    async fn grayscale_alpha_is_converted_to_rgb() {
        let gray = DynamicImage::ImageLumaA8(ImageBuffer::from_pixel(4, 3, LumaA([120u8, 255])));
        let out = resolver()
            .resolve(&ImageInput::Encoded(png_bytes(gray)))
            .await
            .unwrap();

        let image = decoded(&out);
        assert_eq!(image.color(), image::ColorType::Rgb8);
        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(image.to_rgb8().get_pixel(0, 0), &Rgb([120, 120, 120]));
    }

    #[tokio::test]
    async fn reads_from_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        let rgba = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(2, 2, Rgba([1u8, 2, 3, 4])));
        std::fs::write(&path, png_bytes(rgba)).unwrap();

        let out = resolver().resolve(&ImageInput::Path(path)).await.unwrap();
        assert_eq!(decoded(&out).to_rgb8().get_pixel(1, 1), &Rgb([1, 2, 3]));
    }

    #[tokio::test]
    async fn missing_file_is_encode_error() {
        let err = resolver()
            .resolve(&ImageInput::Path("/definitely/not/here.png".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Encode(_)));
    }

    #[tokio::test]
    async fn raw_pixels_are_wrapped() {
        let pixels = RawPixels {
            width: 2,
            height: 1,
            layout: PixelLayout::Luma,
            data: vec![0, 255],
        };
        let out = resolver().resolve(&ImageInput::Pixels(pixels)).await.unwrap();
        let rgb = decoded(&out).to_rgb8();
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }

    #[tokio::test]
    async fn pixel_buffer_length_mismatch_is_encode_error() {
        let pixels = RawPixels {
            width: 2,
            height: 2,
            layout: PixelLayout::Rgb,
            data: vec![0; 5],
        };
        let err = resolver().resolve(&ImageInput::Pixels(pixels)).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Encode(_)));
    }

    #[tokio::test]
    async fn undecodable_bytes_are_encode_error() {
        let err = resolver()
            .resolve(&ImageInput::Encoded(b"definitely not an image".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Encode(_)));
    }

    #[tokio::test]
    async fn fetches_url() {
        let mut server = mockito::Server::new_async().await;
        let body = png_bytes(DynamicImage::ImageRgb8(ImageBuffer::from_pixel(3, 3, Rgb([9u8, 8, 7]))));
        let _mock = server
            .mock("GET", "/cat.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(body)
            .create_async()
            .await;

        let url = format!("{}/cat.png", server.url());
        let out = resolver().resolve(&ImageInput::Url(url)).await.unwrap();
        assert_eq!(decoded(&out).to_rgb8().get_pixel(2, 2), &Rgb([9, 8, 7]));
    }

    #[tokio::test]
    async fn url_error_status_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.jpg")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/missing.jpg", server.url());
        let err = resolver().resolve(&ImageInput::Url(url)).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Network(_)));
    }

    #[tokio::test]
    async fn unreachable_url_is_network_error() {
        let err = resolver()
            .resolve(&ImageInput::Url("http://127.0.0.1:1/a.png".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Network(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn conversion_does_not_block_the_runtime() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = Arc::clone(&ticks);
            async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            }
        });

        let big = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(1024, 1024, Rgba([5u8, 6, 7, 255])));
        let out = resolver()
            .resolve(&ImageInput::Encoded(png_bytes(big)))
            .await
            .unwrap();
        ticker.abort();

        assert_eq!(decoded(&out).color(), image::ColorType::Rgb8);
        assert!(ticks.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn from_dynamic_produces_rgb_pixels() {
        let image = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(3, 2, Luma([7u8])));
        match from_dynamic(&image) {
            ImageInput::Pixels(p) => {
                assert_eq!(p.layout, PixelLayout::Rgb);
                assert_eq!(p.data.len(), 3 * 2 * 3);
            }
            other => panic!("unexpected input {other:?}"),
        }
    }
}
