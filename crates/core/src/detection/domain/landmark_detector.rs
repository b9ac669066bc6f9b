use crate::detection::domain::landmark_set::LandmarkSet;
use crate::shared::frame::Frame;

/// Domain interface for facial landmark detection.
///
/// `Ok(None)` means no usable face was found; callers skip the image
/// rather than treat it as a failure. Implementations may hold inference
/// sessions that need `&mut self`.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, Box<dyn std::error::Error>>;
}
