//! Eye-driven similarity transform (rotation + uniform scale + translation).
//!
//! The transform rotates and scales the source image about the midpoint of
//! the eyes so the eye line becomes horizontal and the eyes sit the layout's
//! desired distance apart, then moves that midpoint onto a target position.

use crate::alignment::domain::alignment_error::AlignmentError;
use crate::detection::domain::landmark_set::{EyeCenters, Point};
use crate::shared::constants::{EYE_LINE_Y, LEFT_EYE_X, RIGHT_EYE_X};

/// Eye separations below this many pixels are treated as coincident.
const MIN_EYE_DISTANCE: f64 = 1e-6;

/// Desired eye positions as fractions of a square canvas edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanonicalLayout {
    pub left_eye_x: f64,
    pub right_eye_x: f64,
    pub eye_line_y: f64,
}

impl Default for CanonicalLayout {
    fn default() -> Self {
        Self {
            left_eye_x: LEFT_EYE_X,
            right_eye_x: RIGHT_EYE_X,
            eye_line_y: EYE_LINE_Y,
        }
    }
}

impl CanonicalLayout {
    pub fn desired_eye_distance(&self, edge: f64) -> f64 {
        (self.right_eye_x - self.left_eye_x).abs() * edge
    }

    /// Where the eye midpoint lands on an `edge × edge` canvas.
    pub fn eye_midpoint(&self, edge: f64) -> Point {
        (
            (self.left_eye_x + self.right_eye_x) / 2.0 * edge,
            self.eye_line_y * edge,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityTransform {
    /// Tilt of the observed eye line in radians; the transform undoes it.
    angle: f64,
    scale: f64,
    pivot: Point,
    target: Point,
}

impl SimilarityTransform {
    /// Estimates the transform that maps `eyes` onto `layout` scaled to `edge`.
    ///
    /// The eye midpoint stays where it is; use [`Self::anchored_at`] to move it.
    pub fn estimate(
        eyes: &EyeCenters,
        layout: &CanonicalLayout,
        edge: f64,
    ) -> Result<Self, AlignmentError> {
        let pivot = eyes.midpoint();
        let observed = eyes.distance();
        if !observed.is_finite() || observed < MIN_EYE_DISTANCE {
            return Err(AlignmentError::DegenerateGeometry {
                x: pivot.0,
                y: pivot.1,
            });
        }

        let scale = layout.desired_eye_distance(edge) / observed;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AlignmentError::DegenerateGeometry {
                x: pivot.0,
                y: pivot.1,
            });
        }

        Ok(Self {
            angle: eyes.angle(),
            scale,
            pivot,
            target: pivot,
        })
    }

    /// Same rotation and scale, with the eye midpoint sent to `target`.
    pub fn anchored_at(self, target: Point) -> Self {
        Self { target, ..self }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pivot(&self) -> Point {
        self.pivot
    }

    pub fn target(&self) -> Point {
        self.target
    }

    /// Maps a source-image point into the aligned image.
    pub fn apply(&self, (x, y): Point) -> Point {
        let [a, b, tx, c, d, ty] = self.matrix();
        (a * x + b * y + tx, c * x + d * y + ty)
    }

    /// Row-major 2x3 affine matrix `[a, b, tx, c, d, ty]`, source → aligned.
    pub fn matrix(&self) -> [f64; 6] {
        let (sin, cos) = self.angle.sin_cos();
        let a = self.scale * cos;
        let b = self.scale * sin;
        let c = -b;
        let d = a;
        let (px, py) = self.pivot;
        let (qx, qy) = self.target;
        [a, b, qx - (a * px + b * py), c, d, qy - (c * px + d * py)]
    }

    /// Row-major 3x3 homogeneous form, as image warpers expect.
    pub fn homogeneous(&self) -> [f32; 9] {
        let [a, b, tx, c, d, ty] = self.matrix();
        [
            a as f32, b as f32, tx as f32, c as f32, d as f32, ty as f32, 0.0, 0.0, 1.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn eyes(left: Point, right: Point) -> EyeCenters {
        EyeCenters { left, right }
    }

    #[rstest]
    #[case::level((100.0, 120.0), (160.0, 120.0), 256.0)]
    #[case::tilted_down((80.0, 100.0), (150.0, 140.0), 256.0)]
    #[case::tilted_up((300.0, 420.0), (390.0, 350.0), 512.0)]
    #[case::upside_down((200.0, 50.0), (100.0, 55.0), 128.0)]
    #[case::tiny_face((10.0, 10.0), (12.0, 10.5), 281.6)]
    fn test_maps_eyes_onto_layout(#[case] left: Point, #[case] right: Point, #[case] edge: f64) {
        let layout = CanonicalLayout::default();
        let target = layout.eye_midpoint(edge);
        let t = SimilarityTransform::estimate(&eyes(left, right), &layout, edge)
            .unwrap()
            .anchored_at(target);

        let mid = t.apply(eyes(left, right).midpoint());
        assert_relative_eq!(mid.0, target.0, epsilon = 1e-9);
        assert_relative_eq!(mid.1, target.1, epsilon = 1e-9);

        let l = t.apply(left);
        let r = t.apply(right);
        let (dx, dy) = (r.0 - l.0, r.1 - l.1);
        assert_relative_eq!(dx.hypot(dy), layout.desired_eye_distance(edge), epsilon = 1e-9);
        // Eye line is level and left stays left
        assert_relative_eq!(dy, 0.0, epsilon = 1e-9);
        assert!(dx > 0.0);
    }

    #[test]
    fn test_aligned_eyes_hit_layout_positions() {
        let layout = CanonicalLayout::default();
        let edge = 256.0;
        let t = SimilarityTransform::estimate(&eyes((40.0, 90.0), (95.0, 70.0)), &layout, edge)
            .unwrap()
            .anchored_at(layout.eye_midpoint(edge));

        let l = t.apply((40.0, 90.0));
        let r = t.apply((95.0, 70.0));
        assert_relative_eq!(l.0, 0.35 * edge, epsilon = 1e-9);
        assert_relative_eq!(r.0, 0.65 * edge, epsilon = 1e-9);
        assert_relative_eq!(l.1, 0.35 * edge, epsilon = 1e-9);
        assert_relative_eq!(r.1, 0.35 * edge, epsilon = 1e-9);
    }

    #[test]
    fn test_unanchored_transform_keeps_midpoint() {
        let e = eyes((10.0, 20.0), (30.0, 20.0));
        let t = SimilarityTransform::estimate(&e, &CanonicalLayout::default(), 100.0).unwrap();
        let mid = t.apply(e.midpoint());
        assert_relative_eq!(mid.0, 20.0, epsilon = 1e-9);
        assert_relative_eq!(mid.1, 20.0, epsilon = 1e-9);
        assert_eq!(t.pivot(), t.target());
    }

    #[test]
    fn test_scale_and_angle() {
        // Eyes 20px apart, layout wants 0.3 * 100 = 30px
        let e = eyes((0.0, 0.0), (0.0, 20.0));
        let t = SimilarityTransform::estimate(&e, &CanonicalLayout::default(), 100.0).unwrap();
        assert_relative_eq!(t.scale(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(t.angle(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_coincident_eyes_are_degenerate() {
        let e = eyes((50.0, 60.0), (50.0, 60.0));
        let err = SimilarityTransform::estimate(&e, &CanonicalLayout::default(), 256.0);
        assert_eq!(
            err,
            Err(AlignmentError::DegenerateGeometry { x: 50.0, y: 60.0 })
        );
    }

    #[test]
    fn test_non_finite_eyes_are_degenerate() {
        let e = eyes((f64::NAN, 0.0), (10.0, 0.0));
        assert!(matches!(
            SimilarityTransform::estimate(&e, &CanonicalLayout::default(), 256.0),
            Err(AlignmentError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_zero_edge_is_degenerate() {
        let e = eyes((0.0, 0.0), (10.0, 0.0));
        assert!(SimilarityTransform::estimate(&e, &CanonicalLayout::default(), 0.0).is_err());
    }

    #[test]
    fn test_homogeneous_matches_affine() {
        let e = eyes((12.0, 40.0), (70.0, 31.0));
        let t = SimilarityTransform::estimate(&e, &CanonicalLayout::default(), 256.0)
            .unwrap()
            .anchored_at((128.0, 90.0));
        let m = t.matrix();
        let h = t.homogeneous();
        for i in 0..6 {
            assert_relative_eq!(h[i] as f64, m[i], epsilon = 1e-3);
        }
        assert_eq!(&h[6..], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_layout_geometry() {
        let layout = CanonicalLayout::default();
        assert_relative_eq!(layout.desired_eye_distance(200.0), 60.0, epsilon = 1e-12);
        let (x, y) = layout.eye_midpoint(200.0);
        assert_relative_eq!(x, 100.0, epsilon = 1e-12);
        assert_relative_eq!(y, 70.0, epsilon = 1e-12);
    }
}
