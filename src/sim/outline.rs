//! Polygon outlines and overlap testing
//!
//! An outline is a closed polygon in entity-local space. Each frame it is
//! rotated and translated into field space, and field-space polygons are
//! tested against each other. Concave outlines (the ship, lumpy asteroids)
//! are supported; the test is edge crossing plus containment rather than
//! separating axes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::error::OutlineError;

/// A validated, closed polygon in entity-local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    points: Vec<Vec2>,
}

impl Outline {
    /// Build an outline, rejecting polygons that cannot be collision-tested
    pub fn new(points: Vec<Vec2>) -> Result<Self, OutlineError> {
        if points.len() < 3 {
            return Err(OutlineError::TooFewPoints(points.len()));
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(OutlineError::NonFinite { index });
        }
        if signed_area(&points).abs() < 1e-6 {
            return Err(OutlineError::Degenerate);
        }

        let n = points.len();
        for i in 0..n {
            for j in (i + 1)..n {
                // Adjacent edges share a vertex; skip them (edge n-1 touches edge 0)
                if j == i + 1 || (i == 0 && j == n - 1) {
                    continue;
                }
                let (a1, a2) = (points[i], points[(i + 1) % n]);
                let (b1, b2) = (points[j], points[(j + 1) % n]);
                if segments_intersect(a1, a2, b1, b2) {
                    return Err(OutlineError::SelfIntersecting { first: i, second: j });
                }
            }
        }

        Ok(Self { points })
    }

    /// Axis-aligned square centered on the origin
    pub fn square(half_width: f32) -> Result<Self, OutlineError> {
        let h = half_width;
        Self::new(vec![
            Vec2::new(h, h),
            Vec2::new(h, -h),
            Vec2::new(-h, -h),
            Vec2::new(-h, h),
        ])
    }

    /// Star-shaped polygon with one vertex per radius, evenly spaced in angle
    ///
    /// Strictly increasing angles around the origin keep the polygon simple
    /// for any positive radii.
    pub fn radial(radii: &[f32], scale: f32) -> Result<Self, OutlineError> {
        let step = std::f32::consts::TAU / radii.len().max(1) as f32;
        let points = radii
            .iter()
            .enumerate()
            .map(|(i, r)| crate::polar_to_cartesian(r * scale, i as f32 * step))
            .collect();
        Self::new(points)
    }

    /// Local-space vertices
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Rotate by `rotation` then translate by `position`
    pub fn to_field(&self, position: Vec2, rotation: f32) -> Vec<Vec2> {
        let rot = Vec2::from_angle(rotation);
        self.points.iter().map(|p| rot.rotate(*p) + position).collect()
    }
}

/// Signed shoelace area (positive when counter-clockwise)
fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum::<f32>()
        / 2.0
}

/// Orientation of `p` relative to the directed line `a -> b`
#[inline]
fn orient(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// `p` lies within the bounding box of segment `a-b` (used for collinear cases)
#[inline]
fn within_box(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed segment intersection, touching and collinear overlap included
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_box(q1, q2, p1))
        || (d2 == 0.0 && within_box(q1, q2, p2))
        || (d3 == 0.0 && within_box(p1, p2, q1))
        || (d4 == 0.0 && within_box(p1, p2, q2))
}

/// Even-odd ray cast
pub fn contains_point(polygon: &[Vec2], p: Vec2) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Bounding box as (min, max)
fn bounds(polygon: &[Vec2]) -> (Vec2, Vec2) {
    polygon.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    )
}

#[inline]
fn boxes_touch(a: (Vec2, Vec2), b: (Vec2, Vec2)) -> bool {
    a.0.x <= b.1.x && b.0.x <= a.1.x && a.0.y <= b.1.y && b.0.y <= a.1.y
}

/// Whether two field-space polygons overlap
///
/// Symmetric: the same orientation values are computed whichever polygon
/// comes first, and containment is checked both ways.
pub fn polygons_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if !boxes_touch(bounds(a), bounds(b)) {
        return false;
    }

    let (na, nb) = (a.len(), b.len());
    for i in 0..na {
        let (a1, a2) = (a[i], a[(i + 1) % na]);
        for j in 0..nb {
            if segments_intersect(a1, a2, b[j], b[(j + 1) % nb]) {
                return true;
            }
        }
    }

    // No edges cross: either disjoint or one fully inside the other
    contains_point(b, a[0]) || contains_point(a, b[0])
}

/// Overlap on the torus: also tests copies shifted by one field length
///
/// Each shift is applied to `a` and to `b` in turn so swapping the
/// arguments evaluates exactly the same set of translated pairs.
pub fn overlap_on_torus(a: &[Vec2], b: &[Vec2], field_size: f32) -> bool {
    if polygons_overlap(a, b) {
        return true;
    }

    const SHIFTS: [f32; 3] = [-1.0, 0.0, 1.0];
    for sx in SHIFTS {
        for sy in SHIFTS {
            if sx == 0.0 && sy == 0.0 {
                continue;
            }
            let shift = Vec2::new(sx, sy) * field_size;
            let shifted_b: Vec<Vec2> = b.iter().map(|p| *p + shift).collect();
            if polygons_overlap(a, &shifted_b) {
                return true;
            }
            let shifted_a: Vec<Vec2> = a.iter().map(|p| *p + shift).collect();
            if polygons_overlap(&shifted_a, b) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    fn square_at(center: Vec2, half: f32) -> Vec<Vec2> {
        Outline::square(half).unwrap().to_field(center, 0.0)
    }

    #[test]
    fn test_outline_rejects_too_few_points() {
        let err = Outline::new(vec![Vec2::ZERO, Vec2::X]).unwrap_err();
        assert_eq!(err, OutlineError::TooFewPoints(2));
    }

    #[test]
    fn test_outline_rejects_non_finite() {
        let err = Outline::new(vec![Vec2::ZERO, Vec2::new(f32::NAN, 1.0), Vec2::Y]).unwrap_err();
        assert_eq!(err, OutlineError::NonFinite { index: 1 });
    }

    #[test]
    fn test_outline_rejects_collinear() {
        let err = Outline::new(vec![Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)]).unwrap_err();
        assert_eq!(err, OutlineError::Degenerate);
    }

    #[test]
    fn test_outline_rejects_bow_tie() {
        let bow_tie = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 2.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(0.0, 3.0),
        ];
        assert!(matches!(
            Outline::new(bow_tie),
            Err(OutlineError::SelfIntersecting { .. })
        ));
    }

    #[test]
    fn test_outline_accepts_concave_ship() {
        let ship = vec![
            Vec2::new(21.0, 0.0),
            Vec2::new(-21.0, 12.0),
            Vec2::new(-14.0, 8.0),
            Vec2::new(-14.0, -8.0),
            Vec2::new(-21.0, -12.0),
        ];
        assert!(Outline::new(ship).is_ok());
    }

    #[test]
    fn test_to_field_rotates_then_translates() {
        let outline = Outline::new(vec![
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, -1.0),
        ])
        .unwrap();
        let field = outline.to_field(Vec2::new(100.0, 100.0), PI / 2.0);
        assert!((field[0] - Vec2::new(100.0, 110.0)).length() < 1e-4);
    }

    #[test]
    fn test_overlap_and_miss() {
        let a = square_at(Vec2::new(100.0, 100.0), 2.0);
        let b = square_at(Vec2::new(103.0, 100.0), 2.0);
        let c = square_at(Vec2::new(110.0, 100.0), 2.0);
        assert!(polygons_overlap(&a, &b));
        assert!(!polygons_overlap(&a, &c));
    }

    #[test]
    fn test_containment_without_edge_crossing() {
        let big = square_at(Vec2::new(50.0, 50.0), 20.0);
        let small = square_at(Vec2::new(50.0, 50.0), 1.0);
        assert!(polygons_overlap(&big, &small));
        assert!(polygons_overlap(&small, &big));
    }

    #[test]
    fn test_overlap_across_field_edge() {
        let a = square_at(Vec2::new(499.0, 250.0), 2.0);
        let b = square_at(Vec2::new(1.0, 250.0), 2.0);
        assert!(!polygons_overlap(&a, &b));
        assert!(overlap_on_torus(&a, &b, 500.0));
        assert!(overlap_on_torus(&b, &a, 500.0));
    }

    #[test]
    fn test_radial_outline_is_valid() {
        let outline = Outline::radial(&[30.0, 22.0, 28.0, 18.0, 30.0, 25.0, 20.0, 27.0], 1.0);
        assert!(outline.is_ok());
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            ax in 0.0f32..60.0, ay in 0.0f32..60.0, ar in -PI..PI,
            bx in 0.0f32..60.0, by in 0.0f32..60.0, br in -PI..PI,
            ha in 0.5f32..15.0, hb in 0.5f32..15.0,
        ) {
            let a = Outline::square(ha).unwrap().to_field(Vec2::new(ax, ay), ar);
            let b = Outline::radial(&[10.0, 6.0, 9.0, 5.0, 8.0], hb / 10.0)
                .unwrap()
                .to_field(Vec2::new(bx, by), br);
            prop_assert_eq!(polygons_overlap(&a, &b), polygons_overlap(&b, &a));
            prop_assert_eq!(overlap_on_torus(&a, &b, 64.0), overlap_on_torus(&b, &a, 64.0));
        }
    }
}
