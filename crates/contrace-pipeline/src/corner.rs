//! Corner detection along traced contours.
//!
//! A window of `width` consecutive contour points slides along the
//! sequence. For each window the first, middle and last points form a
//! triangle, and the included angle at the middle point is recovered
//! with the law of cosines:
//!
//! ```text
//! theta = acos((b^2 + c^2 - a^2) / (2bc))
//! ```
//!
//! where `a` is the first-to-last distance and `b`, `c` are the distances
//! from the middle point to the first and last points. A straight run
//! gives 180°; anything at or below the threshold is a corner.
//!
//! After a hit the window jumps ahead by half its width so the same bend
//! is not reported again from the neighboring windows. As a consequence
//! two bends closer together than half a window are reported once.

use crate::types::{Contour, CornerMark, Coordinate, PipelineError, TraceConfig};

/// Parameters of the sliding window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerDetector {
    width: usize,
    max_angle: f64,
}

impl CornerDetector {
    /// Create a detector with window `width` (odd, at least 3) and a
    /// corner threshold of `max_angle` radians.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `width` is even or
    /// below 3, or if `max_angle` is NaN.
    pub fn new(width: usize, max_angle: f64) -> Result<Self, PipelineError> {
        if width < 3 || width % 2 == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "corner window must be odd and at least 3, got {width}"
            )));
        }
        if max_angle.is_nan() {
            return Err(PipelineError::InvalidConfig(
                "corner angle must be a number".to_string(),
            ));
        }
        Ok(Self { width, max_angle })
    }

    /// Build a detector from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] under the same conditions
    /// as [`new`](Self::new).
    pub fn from_config(config: &TraceConfig) -> Result<Self, PipelineError> {
        Self::new(config.corner_window, config.corner_angle_rad())
    }

    /// Window width in points.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Threshold angle in radians.
    #[must_use]
    pub const fn max_angle(&self) -> f64 {
        self.max_angle
    }

    /// Find corners in `points`.
    ///
    /// Returned marks have `contour` set to `contour_index`. Windows
    /// start at `0..len - width` (exclusive), so sequences no longer than
    /// the window yield nothing.
    #[must_use]
    pub fn detect_points(&self, points: &[Coordinate], contour_index: usize) -> Vec<CornerMark> {
        let half = self.width / 2;
        let window_count = points.len().saturating_sub(self.width);
        let mut corners = Vec::new();

        let mut j = 0;
        while j < window_count {
            let p1 = points[j];
            let p2 = points[j + half];
            let p3 = points[j + self.width - 1];

            if let Some(angle) = included_angle(p1, p2, p3) {
                tracing::trace!(
                    contour = contour_index,
                    position = j + half,
                    angle,
                    "corner window"
                );
                if angle <= self.max_angle {
                    corners.push(CornerMark {
                        at: p2,
                        contour: contour_index,
                        position: j + half,
                        angle,
                    });
                    j += half;
                }
            }
            j += 1;
        }

        corners
    }

    /// Find corners along one contour.
    #[must_use]
    pub fn detect(&self, contour: &Contour, contour_index: usize) -> Vec<CornerMark> {
        self.detect_points(contour.points(), contour_index)
    }

    /// Find corners along every contour, in contour order.
    #[must_use]
    pub fn detect_all<'a, I>(&self, contours: I) -> Vec<CornerMark>
    where
        I: IntoIterator<Item = &'a Contour>,
    {
        contours
            .into_iter()
            .enumerate()
            .flat_map(|(index, contour)| self.detect(contour, index))
            .collect()
    }
}

impl Default for CornerDetector {
    fn default() -> Self {
        Self {
            width: TraceConfig::DEFAULT_CORNER_WINDOW,
            max_angle: TraceConfig::DEFAULT_CORNER_ANGLE_DEG.to_radians(),
        }
    }
}

/// Angle at `p2` in the triangle `p1 p2 p3`, in radians.
///
/// Returns `None` when `p2` coincides with `p1` or `p3`; the angle is
/// undefined there.
#[must_use]
pub fn included_angle(p1: Coordinate, p2: Coordinate, p3: Coordinate) -> Option<f64> {
    if p1 == p2 || p2 == p3 {
        return None;
    }
    let a = p1.distance(p3);
    let b = p1.distance(p2);
    let c = p2.distance(p3);
    let cosine = (a.mul_add(-a, b.mul_add(b, c * c)) / (2.0 * b * c)).clamp(-1.0, 1.0);
    Some(cosine.acos())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::types::{Closure, Color};

    fn coords(points: &[(i64, i64)]) -> Vec<Coordinate> {
        points.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    #[test]
    fn right_angle_is_pi_over_two() {
        let angle = included_angle(
            Coordinate::new(0, 0),
            Coordinate::new(3, 0),
            Coordinate::new(3, 3),
        );
        assert!(angle.is_some_and(|a| (a - FRAC_PI_2).abs() < 1e-12));
    }

    #[test]
    fn straight_angle_is_pi() {
        let angle = included_angle(
            Coordinate::new(0, 0),
            Coordinate::new(3, 0),
            Coordinate::new(6, 0),
        );
        assert!(angle.is_some_and(|a| (a - PI).abs() < 1e-12));
    }

    #[test]
    fn coincident_points_are_undefined() {
        let p = Coordinate::new(2, 2);
        assert_eq!(included_angle(p, p, Coordinate::new(4, 4)), None);
        assert_eq!(included_angle(Coordinate::new(0, 0), p, p), None);
    }

    #[test]
    fn right_angle_vertex_is_flagged() {
        // Vertex at index 3, reachable by the single window j = 0.
        let points = coords(&[
            (0, 0),
            (1, 0),
            (2, 0),
            (3, 0),
            (3, 1),
            (3, 2),
            (3, 3),
            (3, 4),
        ]);
        let corners = CornerDetector::default().detect_points(&points, 0);
        assert_eq!(corners.len(), 1);
        assert_eq!(corners[0].at, Coordinate::new(3, 0));
        assert_eq!(corners[0].position, 3);
        assert!((corners[0].angle - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn straight_line_has_no_corners() {
        let points: Vec<Coordinate> = (0..30).map(|x| Coordinate::new(x, 5)).collect();
        assert!(CornerDetector::default().detect_points(&points, 0).is_empty());
        let diagonal: Vec<Coordinate> = (0..30).map(|i| Coordinate::new(i, i)).collect();
        assert!(CornerDetector::default().detect_points(&diagonal, 0).is_empty());
    }

    #[test]
    fn sequences_not_longer_than_window_yield_nothing() {
        let points = coords(&[(0, 0), (1, 0), (2, 0), (3, 0), (3, 1), (3, 2), (3, 3)]);
        assert!(CornerDetector::default().detect_points(&points, 0).is_empty());
        assert!(CornerDetector::default().detect_points(&[], 0).is_empty());
    }

    #[test]
    fn window_skips_ahead_after_a_hit() {
        // A long L: the bend is seen by several windows but the skip
        // keeps consecutive marks at least half a window + 1 apart.
        let mut points: Vec<Coordinate> = (0..10).map(|x| Coordinate::new(x, 0)).collect();
        points.extend((1..10).map(|y| Coordinate::new(9, y)));
        let corners = CornerDetector::default().detect_points(&points, 4);
        assert!(!corners.is_empty());
        assert!(corners.iter().all(|c| c.contour == 4));
        for pair in corners.windows(2) {
            assert!(pair[1].position - pair[0].position >= 4);
        }
        // The first hit lands within a couple of points of the vertex.
        assert!(corners[0].position.abs_diff(9) <= 2);
    }

    #[test]
    fn degenerate_window_is_skipped() {
        // Repeated coordinate at the middle of the first window.
        let points = coords(&[
            (0, 0),
            (1, 0),
            (2, 0),
            (2, 0),
            (2, 0),
            (2, 0),
            (2, 0),
            (2, 0),
        ]);
        assert!(CornerDetector::default().detect_points(&points, 0).is_empty());
    }

    #[test]
    fn detect_all_tags_contour_index() {
        let bend = coords(&[
            (0, 0),
            (1, 0),
            (2, 0),
            (3, 0),
            (3, 1),
            (3, 2),
            (3, 3),
            (3, 4),
        ]);
        let straight: Vec<Coordinate> = (0..12).map(|x| Coordinate::new(x, 0)).collect();
        let contours = [
            Contour::new(Color::BLACK, straight, Closure::Open),
            Contour::new(Color::BLACK, bend, Closure::Open),
        ];
        let corners = CornerDetector::default().detect_all(&contours);
        assert_eq!(corners.len(), 1);
        assert_eq!(corners[0].contour, 1);
    }

    #[test]
    fn threshold_is_inclusive() {
        // A straight run is exactly 180 degrees.
        let points: Vec<Coordinate> = (0..8).map(|x| Coordinate::new(x, 0)).collect();
        let at_pi = CornerDetector::new(7, PI).unwrap();
        assert_eq!(at_pi.detect_points(&points, 0).len(), 1);
        let below_pi = CornerDetector::new(7, PI - 1e-6).unwrap();
        assert!(below_pi.detect_points(&points, 0).is_empty());
    }

    #[test]
    fn unusable_window_is_rejected() {
        for width in [0, 1, 2, 4] {
            assert!(
                matches!(
                    CornerDetector::new(width, PI),
                    Err(PipelineError::InvalidConfig(_))
                ),
                "width {width} accepted"
            );
        }
        assert!(CornerDetector::new(7, f64::NAN).is_err());

        let narrowest = CornerDetector::new(3, FRAC_PI_2).unwrap();
        assert_eq!(narrowest.width(), 3);
        assert!(narrowest.detect_points(&[], 0).is_empty());
    }

    #[test]
    fn default_matches_default_config() {
        let from_config = CornerDetector::from_config(&TraceConfig::default()).unwrap();
        assert_eq!(CornerDetector::default(), from_config);
    }
}
