//! Imaging Module
//!
//! Pixel-level collaborators: the codec, the subject locator and the
//! renderer that applies a geometry plan.

mod codec;
mod render;
mod subject;

pub use codec::{
    Codec, JpegCodec, BACKGROUND, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
    SOURCE_JPEG_QUALITY,
};
pub use render::{NormalizedSource, Renderer};
pub use subject::{CenterSubject, Detector, ExclusiveLocator, SubjectLocator};
