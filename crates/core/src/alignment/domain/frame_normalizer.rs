use crate::alignment::domain::alignment_error::AlignmentError;
use crate::alignment::domain::frame_resampler::FrameResampler;
use crate::alignment::domain::placement_policy::{OutputShaping, PlacementPolicy};
use crate::alignment::domain::similarity_transform::{CanonicalLayout, SimilarityTransform};
use crate::detection::domain::landmark_set::{EyeCenters, LandmarkSet};
use crate::shared::frame::Frame;

/// Turns a photo plus its landmarks into a canonical frame.
///
/// One instance serves a whole run, so every frame it produces shares the
/// same policy, size, and eye layout.
pub struct FrameNormalizer {
    resampler: Box<dyn FrameResampler>,
    policy: PlacementPolicy,
    size: u32,
    margin: f64,
    layout: CanonicalLayout,
}

impl FrameNormalizer {
    pub fn new(
        resampler: Box<dyn FrameResampler>,
        policy: PlacementPolicy,
        size: u32,
        margin: f64,
    ) -> Self {
        Self {
            resampler,
            policy,
            size,
            margin,
            layout: CanonicalLayout::default(),
        }
    }

    /// Transform for a `source_width` x `source_height` photo with `eyes`.
    pub fn transform_for(
        &self,
        eyes: &EyeCenters,
        source_width: u32,
        source_height: u32,
    ) -> Result<SimilarityTransform, AlignmentError> {
        match self.policy {
            PlacementPolicy::DirectCanvas => {
                let edge = self.size as f64;
                let transform = SimilarityTransform::estimate(eyes, &self.layout, edge)?;
                Ok(transform.anchored_at(self.layout.eye_midpoint(edge)))
            }
            PlacementPolicy::FullFrame { .. } => {
                // The margin-inflated square is centered on the native canvas.
                let edge = self.inflated_edge();
                let transform = SimilarityTransform::estimate(eyes, &self.layout, edge)?;
                let (_, layout_y) = self.layout.eye_midpoint(edge);
                let target = (
                    source_width as f64 / 2.0,
                    source_height as f64 / 2.0 + (layout_y - edge / 2.0),
                );
                Ok(transform.anchored_at(target))
            }
        }
    }

    pub fn normalize(&self, frame: &Frame, landmarks: &LandmarkSet) -> Result<Frame, AlignmentError> {
        let eyes = landmarks.eye_centers().ok_or(AlignmentError::MissingEyes)?;
        let (w, h) = (frame.width(), frame.height());
        let transform = self.transform_for(&eyes, w, h)?;

        match self.policy {
            PlacementPolicy::DirectCanvas => self.warp(frame, &transform, self.size, self.size),
            PlacementPolicy::FullFrame {
                shaping: OutputShaping::CenterCrop,
            } => {
                if w < self.size || h < self.size {
                    return Err(AlignmentError::InsufficientFrameSize {
                        width: w,
                        height: h,
                        size: self.size,
                    });
                }
                let aligned = self.warp(frame, &transform, w, h)?;
                Ok(center_crop(&aligned, self.size))
            }
            PlacementPolicy::FullFrame {
                shaping: OutputShaping::ResizeToWidth,
            } => {
                let aligned = self.warp(frame, &transform, w, h)?;
                let height = height_for_width(w, h, self.size);
                self.resampler
                    .resize(&aligned, self.size, height)
                    .map_err(|e| AlignmentError::Resample(e.to_string()))
            }
        }
    }

    fn inflated_edge(&self) -> f64 {
        self.size as f64 * (1.0 + self.margin)
    }

    fn warp(
        &self,
        frame: &Frame,
        transform: &SimilarityTransform,
        width: u32,
        height: u32,
    ) -> Result<Frame, AlignmentError> {
        self.resampler
            .warp(frame, transform, width, height)
            .map_err(|e| AlignmentError::Resample(e.to_string()))
    }
}

/// Cuts the central `size × size` square, dropping equal margins per side.
fn center_crop(frame: &Frame, size: u32) -> Frame {
    let x = (frame.width() - size) / 2;
    let y = (frame.height() - size) / 2;
    frame.crop(x, y, size, size)
}

/// Height that keeps the `width:height` aspect ratio at `target_width`.
fn height_for_width(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = target_width as f64 * height as f64 / width.max(1) as f64;
    (scaled.round() as u32).max(1)
}
