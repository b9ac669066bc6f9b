use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use crate::alignment::domain::frame_resampler::FrameResampler;
use crate::alignment::domain::similarity_transform::SimilarityTransform;
use crate::shared::frame::Frame;

/// Pixels with no source behind them after warping.
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Bicubic warping via `imageproc`, Lanczos3 resizing via `image`.
pub struct ImageprocResampler;

impl ImageprocResampler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageprocResampler {
    fn default() -> Self {
        Self::new()
    }
}

fn to_image(frame: &Frame) -> Result<RgbImage, Box<dyn std::error::Error>> {
    frame
        .to_rgb_image()
        .ok_or_else(|| format!("expected an RGB frame, got {} channels", frame.channels()).into())
}

impl FrameResampler for ImageprocResampler {
    fn warp(
        &self,
        frame: &Frame,
        transform: &SimilarityTransform,
        width: u32,
        height: u32,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let source = to_image(frame)?;
        let projection = Projection::from_matrix(transform.homogeneous())
            .ok_or("alignment transform is not invertible")?;

        let mut out = RgbImage::from_pixel(width, height, BACKGROUND);
        warp_into(
            &source,
            &projection,
            Interpolation::Bicubic,
            BACKGROUND,
            &mut out,
        );
        Ok(Frame::from_rgb_image(out))
    }

    fn resize(
        &self,
        frame: &Frame,
        width: u32,
        height: u32,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let source = to_image(frame)?;
        let resized = image::imageops::resize(&source, width, height, FilterType::Lanczos3);
        Ok(Frame::from_rgb_image(resized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::domain::similarity_transform::CanonicalLayout;
    use crate::detection::domain::landmark_set::EyeCenters;

    /// Black frame with two white 3x3 "eyes" centered on the given pixels.
    fn frame_with_eyes(width: u32, height: u32, left: (u32, u32), right: (u32, u32)) -> Frame {
        let mut img = RgbImage::new(width, height);
        for (cx, cy) in [left, right] {
            for y in cy - 1..=cy + 1 {
                for x in cx - 1..=cx + 1 {
                    img.put_pixel(x, y, Rgb([255, 255, 255]));
                }
            }
        }
        Frame::from_rgb_image(img)
    }

    fn brightest_in(frame: &Frame, x0: u32, x1: u32, y0: u32, y1: u32) -> (u32, u32) {
        let arr = frame.as_ndarray();
        let mut best = (x0, y0, 0u8);
        for y in y0..y1 {
            for x in x0..x1 {
                let v = arr[[y as usize, x as usize, 0]];
                if v > best.2 {
                    best = (x, y, v);
                }
            }
        }
        (best.0, best.1)
    }

    #[test]
    fn test_warp_output_has_requested_size() {
        let frame = Frame::blank(80, 60);
        let eyes = EyeCenters {
            left: (20.0, 30.0),
            right: (60.0, 30.0),
        };
        let t = SimilarityTransform::estimate(&eyes, &CanonicalLayout::default(), 64.0).unwrap();
        let out = ImageprocResampler::new().warp(&frame, &t, 64, 48).unwrap();
        assert_eq!((out.width(), out.height()), (64, 48));
    }

    #[test]
    fn test_warp_moves_eyes_to_layout() {
        let frame = frame_with_eyes(200, 150, (60, 90), (120, 70));
        let eyes = EyeCenters {
            left: (60.0, 90.0),
            right: (120.0, 70.0),
        };
        let layout = CanonicalLayout::default();
        let t = SimilarityTransform::estimate(&eyes, &layout, 100.0)
            .unwrap()
            .anchored_at(layout.eye_midpoint(100.0));

        let out = ImageprocResampler::new().warp(&frame, &t, 100, 100).unwrap();

        let (lx, ly) = brightest_in(&out, 0, 50, 0, 100);
        let (rx, ry) = brightest_in(&out, 50, 100, 0, 100);
        assert!((lx as i32 - 35).abs() <= 2, "left eye x = {lx}");
        assert!((rx as i32 - 65).abs() <= 2, "right eye x = {rx}");
        assert!((ly as i32 - 35).abs() <= 2, "left eye y = {ly}");
        assert!((ry as i32 - 35).abs() <= 2, "right eye y = {ry}");
    }

    #[test]
    fn test_warp_fills_outside_with_background() {
        let img = RgbImage::from_pixel(20, 20, Rgb([200, 200, 200]));
        let frame = Frame::from_rgb_image(img);
        // Scale down hard so most of the canvas has no source behind it
        let eyes = EyeCenters {
            left: (0.0, 10.0),
            right: (20.0, 10.0),
        };
        let layout = CanonicalLayout::default();
        let t = SimilarityTransform::estimate(&eyes, &layout, 20.0)
            .unwrap()
            .anchored_at((50.0, 50.0));

        let out = ImageprocResampler::new().warp(&frame, &t, 100, 100).unwrap();
        let arr = out.as_ndarray();
        assert_eq!(arr[[0, 0, 0]], 0);
        assert_eq!(arr[[99, 99, 2]], 0);
        assert!(arr[[50, 50, 0]] > 150);
    }

    #[test]
    fn test_resize_to_exact_dimensions() {
        let out = ImageprocResampler::new()
            .resize(&Frame::blank(400, 300), 256, 192)
            .unwrap();
        assert_eq!((out.width(), out.height()), (256, 192));
    }

    #[test]
    fn test_non_rgb_frames_are_rejected() {
        let gray = Frame::new(vec![0; 16], 4, 4, 1);
        assert!(ImageprocResampler::new().resize(&gray, 2, 2).is_err());
    }
}
