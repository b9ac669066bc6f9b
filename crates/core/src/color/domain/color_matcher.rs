use crate::shared::frame::Frame;

/// Domain interface for matching a frame's tones to a reference image.
///
/// Implementations are pure: the same inputs always give the same output
/// and the reference is never modified.
pub trait ColorMatcher: Send {
    fn match_to(&self, frame: &Frame, reference: &Frame)
        -> Result<Frame, Box<dyn std::error::Error>>;
}
