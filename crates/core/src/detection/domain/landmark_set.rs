//! Named facial landmark groups and the eye centers derived from them.

use std::collections::BTreeMap;

/// A 2D point in source-image pixel coordinates.
pub type Point = (f64, f64);

/// Anatomical region a group of landmarks belongs to.
///
/// "Left" and "right" are as seen in the image: the left eye has the
/// smaller x coordinate in an upright frontal photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FacialRegion {
    LeftEye,
    RightEye,
    Nose,
    LeftMouth,
    RightMouth,
}

impl FacialRegion {
    /// Every region, in the order the pose model emits keypoints.
    pub const ALL: [FacialRegion; 5] = [
        FacialRegion::LeftEye,
        FacialRegion::RightEye,
        FacialRegion::Nose,
        FacialRegion::LeftMouth,
        FacialRegion::RightMouth,
    ];
}

/// Landmarks of one detected face, grouped by region.
///
/// Never empty: a frame without a face is `None` at the detector boundary,
/// and every region present holds at least one point.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    regions: BTreeMap<FacialRegion, Vec<Point>>,
}

impl LandmarkSet {
    /// Builds a set from region groups, dropping empty groups.
    ///
    /// Returns `None` when no group has any points.
    pub fn from_regions<I>(groups: I) -> Option<Self>
    where
        I: IntoIterator<Item = (FacialRegion, Vec<Point>)>,
    {
        let regions: BTreeMap<_, _> = groups
            .into_iter()
            .filter(|(_, points)| !points.is_empty())
            .collect();
        if regions.is_empty() {
            None
        } else {
            Some(Self { regions })
        }
    }

    pub fn points(&self, region: FacialRegion) -> Option<&[Point]> {
        self.regions.get(&region).map(|v| v.as_slice())
    }

    pub fn regions(&self) -> impl Iterator<Item = FacialRegion> + '_ {
        self.regions.keys().copied()
    }

    /// Centroids of both eye groups, or `None` if either eye is missing.
    pub fn eye_centers(&self) -> Option<EyeCenters> {
        let left = centroid(self.points(FacialRegion::LeftEye)?)?;
        let right = centroid(self.points(FacialRegion::RightEye)?)?;
        Some(EyeCenters { left, right })
    }
}

/// Centroids of the left and right eye groups of one face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeCenters {
    pub left: Point,
    pub right: Point,
}

impl EyeCenters {
    pub fn midpoint(&self) -> Point {
        (
            (self.left.0 + self.right.0) / 2.0,
            (self.left.1 + self.right.1) / 2.0,
        )
    }

    pub fn distance(&self) -> f64 {
        let (dx, dy) = self.delta();
        dx.hypot(dy)
    }

    /// Tilt of the eye line in radians, `atan2(dy, dx)` from left to right eye.
    pub fn angle(&self) -> f64 {
        let (dx, dy) = self.delta();
        dy.atan2(dx)
    }

    fn delta(&self) -> (f64, f64) {
        (self.right.0 - self.left.0, self.right.1 - self.left.1)
    }
}

fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    Some((sx / n, sy / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    fn eyes(left: Vec<Point>, right: Vec<Point>) -> LandmarkSet {
        LandmarkSet::from_regions([
            (FacialRegion::LeftEye, left),
            (FacialRegion::RightEye, right),
        ])
        .unwrap()
    }

    // ── construction ────────────────────────────────────────────────

    #[test]
    fn test_all_empty_groups_is_no_landmarks() {
        let set = LandmarkSet::from_regions([
            (FacialRegion::LeftEye, vec![]),
            (FacialRegion::RightEye, vec![]),
        ]);
        assert!(set.is_none());
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let set = LandmarkSet::from_regions([
            (FacialRegion::LeftEye, vec![(1.0, 2.0)]),
            (FacialRegion::Nose, vec![]),
        ])
        .unwrap();
        assert!(set.points(FacialRegion::Nose).is_none());
        assert_eq!(set.regions().collect::<Vec<_>>(), vec![FacialRegion::LeftEye]);
    }

    // ── eye centers ─────────────────────────────────────────────────

    #[test]
    fn test_eye_centers_are_centroids() {
        let set = eyes(
            vec![(10.0, 10.0), (20.0, 10.0), (15.0, 16.0)],
            vec![(50.0, 12.0), (60.0, 14.0)],
        );
        let centers = set.eye_centers().unwrap();
        assert_relative_eq!(centers.left.0, 15.0);
        assert_relative_eq!(centers.left.1, 12.0);
        assert_relative_eq!(centers.right.0, 55.0);
        assert_relative_eq!(centers.right.1, 13.0);
    }

    #[test]
    fn test_eye_centers_missing_eye() {
        let set =
            LandmarkSet::from_regions([(FacialRegion::LeftEye, vec![(1.0, 1.0)])]).unwrap();
        assert!(set.eye_centers().is_none());
    }

    #[test]
    fn test_midpoint_distance_angle() {
        let centers = EyeCenters {
            left: (0.0, 0.0),
            right: (10.0, 10.0),
        };
        assert_relative_eq!(centers.midpoint().0, 5.0);
        assert_relative_eq!(centers.midpoint().1, 5.0);
        assert_relative_eq!(centers.distance(), 200f64.sqrt());
        assert_relative_eq!(centers.angle(), FRAC_PI_4);
    }

    #[test]
    fn test_level_eyes_have_zero_angle() {
        let centers = EyeCenters {
            left: (100.0, 50.0),
            right: (160.0, 50.0),
        };
        assert_relative_eq!(centers.angle(), 0.0);
        assert_relative_eq!(centers.distance(), 60.0);
    }
}
