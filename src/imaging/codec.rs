//! Image codec: decode, resample and JPEG encode.
//!
//! Everything the server writes is JPEG. Inputs may be any format the
//! `image` crate was built with (JPEG, PNG, GIF); transparency is flattened
//! onto white on decode since JPEG has no alpha channel.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, Rgb, RgbImage, Rgba, RgbaImage};

use crate::error::CodecError;

/// Default JPEG quality for rendered thumbnails.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// JPEG quality used when normalizing uploaded sources.
pub const SOURCE_JPEG_QUALITY: u8 = 100;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Background used for letterboxing and transparency.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

// =============================================================================
// Codec trait
// =============================================================================

/// Pixel operations the renderer depends on.
pub trait Codec: Send + Sync {
    /// Decode any supported format into an RGB buffer.
    fn decode(&self, source: &[u8]) -> Result<RgbImage, CodecError>;

    /// Encode an RGB buffer at the given quality.
    fn encode(&self, image: &RgbImage, quality: u8) -> Result<Bytes, CodecError>;

    /// Scale a buffer to exactly `width` x `height`.
    fn resample(&self, image: &RgbImage, width: u32, height: u32) -> RgbImage;
}

// =============================================================================
// JPEG codec
// =============================================================================

/// `image`-crate codec producing JPEG output and Lanczos3 resampling.
#[derive(Debug, Clone, Default)]
pub struct JpegCodec;

impl JpegCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JpegCodec {
    fn decode(&self, source: &[u8]) -> Result<RgbImage, CodecError> {
        let reader = ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode {
                message: e.to_string(),
            })?;

        let decoded = reader.decode().map_err(|e| CodecError::Decode {
            message: e.to_string(),
        })?;

        Ok(flatten_onto_white(decoded))
    }

    fn encode(&self, image: &RgbImage, quality: u8) -> Result<Bytes, CodecError> {
        let quality = quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);

        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
        encoder
            .encode_image(image)
            .map_err(|e| CodecError::Encode {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }

    fn resample(&self, image: &RgbImage, width: u32, height: u32) -> RgbImage {
        imageops::resize(image, width, height, FilterType::Lanczos3)
    }
}

/// Composite any alpha channel over the background.
fn flatten_onto_white(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let top = image.into_rgba8();
    let [r, g, b] = BACKGROUND.0;
    let mut canvas = RgbaImage::from_pixel(top.width(), top.height(), Rgba([r, g, b, 255]));
    imageops::overlay(&mut canvas, &top, 0, 0);
    DynamicImage::ImageRgba8(canvas).into_rgb8()
}
