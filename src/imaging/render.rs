//! Thumbnail rendering: decode, plan, resample, compose, encode.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use image::imageops;
use image::RgbImage;
use tracing::debug;

use super::codec::{Codec, BACKGROUND, SOURCE_JPEG_QUALITY};
use super::subject::SubjectLocator;
use crate::error::CodecError;
use crate::geometry::{plan, GeometryPlan, GeometryRequest, Size};

/// Source image after normalization, ready to be stored.
#[derive(Debug, Clone)]
pub struct NormalizedSource {
    pub data: Bytes,
    pub size: Size,
}

/// Turns source bytes into encoded thumbnails.
///
/// Rendering is CPU-bound; async callers run it on the blocking pool.
#[derive(Clone)]
pub struct Renderer {
    codec: Arc<dyn Codec>,
    locator: Arc<dyn SubjectLocator>,
}

impl Renderer {
    pub fn new(codec: Arc<dyn Codec>, locator: Arc<dyn SubjectLocator>) -> Self {
        Self { codec, locator }
    }

    /// Renders `source` at the requested size and encodes it.
    ///
    /// The subject locator only runs when the plan crops after scaling.
    pub fn render(&self, source: &[u8], requested: Size, quality: u8) -> Result<Bytes, CodecError> {
        let original = self.codec.decode(source)?;
        let mut request = GeometryRequest::new(Size::new(original.width(), original.height()), requested);
        if request.crops_after_scaling() {
            request = request.with_subject(self.locator.locate(&original));
        }

        let plan = plan(&request);
        debug!(
            "Planned {:?}: {}x{} -> scaled {}x{}, canvas {}x{}",
            plan.kind,
            request.original.width,
            request.original.height,
            plan.scaled.width,
            plan.scaled.height,
            plan.canvas.width,
            plan.canvas.height
        );

        let output = self.compose(&original, &plan);
        self.codec.encode(&output, quality)
    }

    /// Applies a plan to decoded pixels.
    pub fn compose(&self, original: &RgbImage, plan: &GeometryPlan) -> RgbImage {
        let scaled = if plan.scaled == Size::new(original.width(), original.height()) {
            Cow::Borrowed(original)
        } else {
            Cow::Owned(
                self.codec
                    .resample(original, plan.scaled.width, plan.scaled.height),
            )
        };

        if plan.is_plain_resample() {
            return scaled.into_owned();
        }

        let crop = plan.crop;
        let visible = imageops::crop_imm(
            &*scaled,
            crop.min_x,
            crop.min_y,
            crop.width(),
            crop.height(),
        )
        .to_image();

        let mut canvas = RgbImage::from_pixel(plan.canvas.width, plan.canvas.height, BACKGROUND);
        imageops::replace(
            &mut canvas,
            &visible,
            i64::from(plan.offset.x),
            i64::from(plan.offset.y),
        );
        canvas
    }

    /// Decodes an upload, flattens it onto white and re-encodes it as the
    /// canonical stored source.
    pub fn normalize(&self, upload: &[u8]) -> Result<NormalizedSource, CodecError> {
        let image = self.codec.decode(upload)?;
        let data = self.codec.encode(&image, SOURCE_JPEG_QUALITY)?;
        Ok(NormalizedSource {
            data,
            size: Size::new(image.width(), image.height()),
        })
    }
}
