use crate::alignment::domain::similarity_transform::SimilarityTransform;
use crate::shared::frame::Frame;

/// Domain interface for the pixel-level geometry operations alignment needs.
///
/// Implementations must use cubic-or-better filtering and treat pixels
/// outside the source as background rather than wrapping or clamping.
pub trait FrameResampler: Send {
    /// Warps `frame` through `transform` onto a `width` x `height` canvas.
    fn warp(
        &self,
        frame: &Frame,
        transform: &SimilarityTransform,
        width: u32,
        height: u32,
    ) -> Result<Frame, Box<dyn std::error::Error>>;

    /// Scales `frame` to exactly `width` x `height`.
    fn resize(
        &self,
        frame: &Frame,
        width: u32,
        height: u32,
    ) -> Result<Frame, Box<dyn std::error::Error>>;
}
