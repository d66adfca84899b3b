//! Subject location for crop biasing.
//!
//! A [`SubjectLocator`] returns the region a crop should try to keep, or
//! `None` to fall back to the image center. Detectors that wrap
//! non-reentrant native resources implement [`Detector`] and are shared
//! through [`ExclusiveLocator`], which owns the lock that serializes them.

use std::sync::Mutex;

use image::RgbImage;
use tracing::{debug, warn};

use crate::geometry::Rect;

/// Finds the region of interest in a decoded image.
pub trait SubjectLocator: Send + Sync {
    fn locate(&self, image: &RgbImage) -> Option<Rect>;
}

/// Locator that never finds a subject, so crops stay centered.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterSubject;

impl SubjectLocator for CenterSubject {
    fn locate(&self, _image: &RgbImage) -> Option<Rect> {
        None
    }
}

/// A detector that may only be driven by one caller at a time.
pub trait Detector: Send {
    /// Returns every region detected, in image coordinates.
    fn detect(&mut self, image: &RgbImage) -> Vec<Rect>;
}

/// Serializes a [`Detector`] and merges its detections into one box.
#[derive(Debug)]
pub struct ExclusiveLocator<D> {
    detector: Mutex<D>,
}

impl<D: Detector> ExclusiveLocator<D> {
    pub fn new(detector: D) -> Self {
        Self {
            detector: Mutex::new(detector),
        }
    }
}

impl<D: Detector> SubjectLocator for ExclusiveLocator<D> {
    fn locate(&self, image: &RgbImage) -> Option<Rect> {
        let mut detector = match self.detector.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Subject detector lock poisoned; reusing detector");
                poisoned.into_inner()
            }
        };

        let found = detector.detect(image);
        debug!("Subject detector returned {} regions", found.len());
        found.into_iter().reduce(|a, b| a.union(&b))
    }
}
