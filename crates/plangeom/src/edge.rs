//! Plan edges and the segment intersection classifier.
//!
//! Purpose
//! - `PlanEdge` is the arena record: two point handles, the owning polygon and
//!   the factory tag. Traversal runs source → target.
//! - `Segment` is the detached geometric value used by every predicate. Test
//!   rays in containment are segments too, never arena edges.
//!
//! Classifier
//! - `intersects` sorts a segment pair into one of seven `LineIntersection`
//!   outcomes using only integer orientation tests. Containment, polygon
//!   containment and the split/combine checks all consume this table, so the
//!   boundary tie-breaks are kept exactly as the editor has always had them.

use std::fmt;

use nalgebra::Vector2;

use crate::point::{orientation, widen, Coord, PointId};
use crate::plan::PolygonId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Opaque edge kind produced by the polygon's edge factory.
///
/// Higher layers map tags to wall, door or passage semantics; the kernel only
/// distinguishes `PLAIN` from everything else when combining edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EdgeTag(pub u32);

impl EdgeTag {
    pub const PLAIN: EdgeTag = EdgeTag(0);

    #[inline]
    pub fn is_plain(self) -> bool {
        self == Self::PLAIN
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanEdge {
    pub(crate) source: PointId,
    pub(crate) target: PointId,
    pub(crate) polygon: PolygonId,
    pub(crate) tag: EdgeTag,
}

impl PlanEdge {
    #[inline]
    pub fn source(&self) -> PointId {
        self.source
    }
    #[inline]
    pub fn target(&self) -> PointId {
        self.target
    }
    #[inline]
    pub fn polygon(&self) -> PolygonId {
        self.polygon
    }
    #[inline]
    pub fn tag(&self) -> EdgeTag {
        self.tag
    }

    /// Endpoint by identity, if `p` is one.
    #[inline]
    pub fn has_point(&self, p: PointId) -> bool {
        self.source == p || self.target == p
    }
}

/// Outcome of `intersects`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineIntersection {
    /// Both endpoints coincide, in any order.
    Superposed,
    /// On a common line, not superposed.
    Colinear,
    /// Exactly one shared endpoint.
    Connected,
    /// Proper transversal crossing.
    Intersects,
    /// An endpoint of one lies in the open interior of the other.
    IntersectsBorder,
    /// Both segments touch with endpoints on each other's line only.
    IntersectsPoint,
    NotIntersects,
}

/// A detached segment in widened coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub a: Vector2<i64>,
    pub b: Vector2<i64>,
}

impl Segment {
    #[inline]
    pub fn new(a: Vector2<i64>, b: Vector2<i64>) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn from_coords(a: Coord, b: Coord) -> Self {
        Self::new(widen(a), widen(b))
    }

    /// Minimum x.
    #[inline]
    pub fn bound_left(&self) -> i64 {
        self.a.x.min(self.b.x)
    }
    /// Maximum x.
    #[inline]
    pub fn bound_right(&self) -> i64 {
        self.a.x.max(self.b.x)
    }
    /// Minimum y.
    #[inline]
    pub fn bound_upper(&self) -> i64 {
        self.a.y.min(self.b.y)
    }
    /// Maximum y.
    #[inline]
    pub fn bound_lower(&self) -> i64 {
        self.a.y.max(self.b.y)
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.a.y == self.b.y
    }
    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.a.x == self.b.x
    }
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }

    /// Euclidean length rounded to the nearest millimeter.
    pub fn length(&self) -> i64 {
        let d = (self.b - self.a).cast::<f64>();
        d.norm().round() as i64
    }

    /// `dy / dx`; infinite for vertical segments.
    pub fn slope(&self) -> f64 {
        let d = self.b - self.a;
        d.y as f64 / d.x as f64
    }

    #[inline]
    pub fn fits(&self, p: Vector2<i64>) -> bool {
        self.a == p || self.b == p
    }

    /// Any endpoint of `other` coincides with an endpoint of `self`.
    #[inline]
    pub fn fits_edge(&self, other: &Segment) -> bool {
        self.fits(other.a) || self.fits(other.b)
    }

    /// Both endpoints of `other` coincide with endpoints of `self`.
    #[inline]
    pub fn fits_together(&self, other: &Segment) -> bool {
        self.fits(other.a) && self.fits(other.b)
    }

    /// Same endpoints regardless of direction.
    #[inline]
    pub fn same_endpoints(&self, other: &Segment) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }

    /// `other` lies inside the bounding box of `self`.
    pub fn bbox_contains(&self, other: &Segment) -> bool {
        other.bound_left() >= self.bound_left()
            && other.bound_right() <= self.bound_right()
            && other.bound_upper() >= self.bound_upper()
            && other.bound_lower() <= self.bound_lower()
    }

    /// `p` is strictly between the endpoints in x or in y.
    pub fn spans(&self, p: Vector2<i64>) -> bool {
        (self.bound_left() < p.x && p.x < self.bound_right())
            || (self.bound_upper() < p.y && p.y < self.bound_lower())
    }

    /// Midpoint, rounded half up per axis.
    pub fn midpoint(&self) -> Vector2<i64> {
        let s = (self.a + self.b).cast::<f64>() * 0.5;
        Vector2::new((s.x + 0.5).floor() as i64, (s.y + 0.5).floor() as i64)
    }

    /// Orthogonal projection of `p` onto the supporting line, rounded.
    ///
    /// Returns `None` for a degenerate segment.
    pub fn point_on(&self, p: Vector2<i64>) -> Option<Vector2<i64>> {
        let d = (self.b - self.a).cast::<f64>();
        let len2 = d.norm_squared();
        if len2 == 0.0 {
            return None;
        }
        let t = (p - self.a).cast::<f64>().dot(&d) / len2;
        let q = self.a.cast::<f64>() + d * t;
        Some(Vector2::new(q.x.round() as i64, q.y.round() as i64))
    }

    /// Distance from `p` to the closed segment.
    pub fn distance_to(&self, p: Vector2<i64>) -> f64 {
        let d = (self.b - self.a).cast::<f64>();
        let w = (p - self.a).cast::<f64>();
        let len2 = d.norm_squared();
        if len2 == 0.0 {
            return w.norm();
        }
        let t = (w.dot(&d) / len2).clamp(0.0, 1.0);
        (w - d * t).norm()
    }

    /// Intersection of the two supporting lines, rounded to millimeters.
    ///
    /// Returns `None` for parallel lines.
    pub fn line_intersection(&self, other: &Segment) -> Option<Vector2<i64>> {
        let (p, r) = (self.a.cast::<f64>(), (self.b - self.a).cast::<f64>());
        let (q, s) = (other.a.cast::<f64>(), (other.b - other.a).cast::<f64>());
        let denom = r.x * s.y - r.y * s.x;
        if denom.abs() <= 1e-8 {
            return None;
        }
        let qp = q - p;
        let t = (qp.x * s.y - qp.y * s.x) / denom;
        let x = p + r * t;
        Some(Vector2::new(x.x.round() as i64, x.y.round() as i64))
    }

    /// The endpoint of one segment lying on the open interior of the other.
    ///
    /// Meaningful when `intersects` reported `IntersectsBorder`.
    pub fn border_point(&self, other: &Segment) -> Option<Vector2<i64>> {
        let on = |s: &Segment, p: Vector2<i64>| {
            orientation(s.a, s.b, p) == 0 && s.spans(p) && !s.fits(p)
        };
        [other.a, other.b]
            .into_iter()
            .find(|&p| on(self, p))
            .or_else(|| [self.a, self.b].into_iter().find(|&p| on(other, p)))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[({},{}),({},{})]", self.a.x, self.a.y, self.b.x, self.b.y)
    }
}

/// Classify a segment pair.
///
/// Order: bounding-box rejection on x then y, endpoint fits, collinearity on
/// both segments, then the sign products of the orientation tests.
pub fn intersects(e1: &Segment, e2: &Segment) -> LineIntersection {
    if e1.bound_left() > e2.bound_right() || e2.bound_left() > e1.bound_right() {
        return LineIntersection::NotIntersects;
    }
    if e1.bound_upper() > e2.bound_lower() || e2.bound_upper() > e1.bound_lower() {
        return LineIntersection::NotIntersects;
    }

    if e1.fits_edge(e2) {
        return if e1.fits_together(e2) {
            LineIntersection::Superposed
        } else {
            LineIntersection::Connected
        };
    }

    let t1 = orientation(e1.a, e1.b, e2.a);
    let t2 = orientation(e1.a, e1.b, e2.b);
    if t1 == 0 && t2 == 0 {
        return LineIntersection::Colinear;
    }
    let r1 = t1 * t2;

    let t1 = orientation(e2.a, e2.b, e1.a);
    let t2 = orientation(e2.a, e2.b, e1.b);
    if t1 == 0 && t2 == 0 {
        return LineIntersection::Colinear;
    }
    let r2 = t1 * t2;

    match (r1, r2) {
        (r1, r2) if r1 < 0 && r2 < 0 => LineIntersection::Intersects,
        (0, 0) => LineIntersection::IntersectsPoint,
        (0, -1) | (-1, 0) => LineIntersection::IntersectsBorder,
        _ => LineIntersection::NotIntersects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn seg(ax: i64, ay: i64, bx: i64, by: i64) -> Segment {
        Segment::new(vector![ax, ay], vector![bx, by])
    }

    fn both(e1: &Segment, e2: &Segment) -> LineIntersection {
        let a = intersects(e1, e2);
        assert_eq!(a, intersects(e2, e1), "asymmetric for {e1} / {e2}");
        a
    }

    #[test]
    fn known_regression_pairs() {
        let e1 = seg(6400, 4800, 4000, 4800);
        let e2 = seg(6400, 5600, 8000, 4800);
        let e3 = seg(7200, 5200, 9000, 5200);
        assert_eq!(both(&e1, &e2), LineIntersection::NotIntersects);
        assert_eq!(both(&e2, &e3), LineIntersection::IntersectsBorder);
    }

    #[test]
    fn all_outcomes() {
        let base = seg(0, 0, 800, 0);
        assert_eq!(both(&base, &seg(800, 0, 0, 0)), LineIntersection::Superposed);
        assert_eq!(both(&base, &seg(800, 0, 800, 400)), LineIntersection::Connected);
        assert_eq!(both(&base, &seg(400, 0, 1200, 0)), LineIntersection::Colinear);
        assert_eq!(both(&base, &seg(400, -400, 400, 400)), LineIntersection::Intersects);
        assert_eq!(both(&base, &seg(400, 0, 400, 400)), LineIntersection::IntersectsBorder);
        assert_eq!(both(&base, &seg(0, 400, 800, 400)), LineIntersection::NotIntersects);
        assert_eq!(both(&base, &seg(2000, 0, 2400, 0)), LineIntersection::NotIntersects);
    }

    #[test]
    fn degenerate_and_touching_pairs() {
        let base = seg(0, 0, 800, 800);
        let dot = seg(400, 400, 400, 400);
        assert_eq!(both(&base, &dot), LineIntersection::Colinear);
        let a = seg(0, 0, 400, 400);
        let b = seg(400, 400, 800, 0);
        assert_eq!(both(&a, &b), LineIntersection::Connected);
    }

    #[test]
    fn segment_helpers() {
        let s = seg(0, 0, 300, 400);
        assert_eq!(s.length(), 500);
        assert!(!s.is_horizontal() && !s.is_vertical());
        assert_eq!(s.bound_left(), 0);
        assert_eq!(s.bound_lower(), 400);
        assert!((s.slope() - 4.0 / 3.0).abs() < 1e-12);
        assert!(s.same_endpoints(&seg(300, 400, 0, 0)));
        assert!(s.spans(vector![100, 1000]));
        assert!(!s.spans(vector![0, 0]));
        assert_eq!(seg(0, 0, 0, 800).point_on(vector![300, 400]), Some(vector![0, 400]));
        assert_eq!(seg(5, 5, 5, 5).point_on(vector![0, 0]), None);
        assert!((seg(0, 0, 800, 0).distance_to(vector![400, 300]) - 300.0).abs() < 1e-12);
    }

    #[test]
    fn line_intersection_and_border_point() {
        let a = seg(0, 0, 800, 800);
        let b = seg(0, 800, 800, 0);
        assert_eq!(a.line_intersection(&b), Some(vector![400, 400]));
        assert_eq!(a.line_intersection(&seg(0, 100, 800, 900)), None);

        let base = seg(0, 0, 800, 0);
        let t = seg(400, 0, 400, 400);
        assert_eq!(both(&base, &t), LineIntersection::IntersectsBorder);
        assert_eq!(base.border_point(&t), Some(vector![400, 0]));
        assert_eq!(t.border_point(&base), Some(vector![400, 0]));
    }
}
