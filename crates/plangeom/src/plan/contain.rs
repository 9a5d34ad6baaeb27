//! Point-in-polygon and polygon-in-polygon tests.
//!
//! Ray casting with a horizontal test ray reaching past the bounding box.
//! Boundary cases are decided by the `LineIntersection` table:
//! - `Colinear`: the point sits on a horizontal edge if its x is strictly
//!   inside the edge span.
//! - `IntersectsBorder`: a second ray in the opposite direction tells a point
//!   lying on an edge from a ray passing through a vertex. Vertex passes count
//!   only for the edge whose lower end (max y) is not on the ray.

use nalgebra::Vector2;

use super::{Plan, PolygonId};
use crate::cfg::{from_meter, to_meter};
use crate::edge::{intersects, EdgeId, LineIntersection, Segment};
use crate::error::PlanResult;
use crate::point::{orientation, widen, Coord};

/// Distance of the side probes from an edge midpoint, in millimeters.
const SIDE_PROBE_MM: f64 = 200.0;

/// Side of an edge, seen along source → target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelativePosition {
    Left,
    Right,
}

impl Plan {
    /// `p` is inside or on the boundary.
    pub fn contains(&self, poly: PolygonId, p: Coord) -> PlanResult<bool> {
        self.polygon(poly)?;
        Ok(self.ray_cast(poly, p, false))
    }

    /// `p` is strictly inside.
    pub fn contains_strict(&self, poly: PolygonId, p: Coord) -> PlanResult<bool> {
        self.polygon(poly)?;
        Ok(self.ray_cast(poly, p, true))
    }

    fn ray_cast(&self, poly: PolygonId, p: Coord, strict: bool) -> bool {
        let bounds = self[poly].bounds;
        if !bounds.contains(p) {
            return false;
        }
        let on_boundary = !strict;
        let wp = widen(p);
        let reach = Vector2::new(2 * bounds.width as i64, 0);
        let ray = Segment::new(wp, wp + reach);
        let inverse = Segment::new(wp, wp - reach);

        let mut inside = false;
        for e in self.edge_iter(poly) {
            let edge = self.seg_of(e);
            if edge.fits(wp) {
                return on_boundary;
            }
            match intersects(&ray, &edge) {
                LineIntersection::Colinear => {
                    if edge.bound_left() < wp.x && wp.x < edge.bound_right() {
                        return on_boundary;
                    }
                }
                LineIntersection::Intersects => inside = !inside,
                LineIntersection::IntersectsBorder => {
                    if intersects(&inverse, &edge) == LineIntersection::IntersectsBorder {
                        return on_boundary;
                    }
                    if edge.bound_lower() != wp.y {
                        inside = !inside;
                    }
                }
                LineIntersection::IntersectsPoint if !strict => {
                    if edge.fits(wp) {
                        return true;
                    }
                }
                _ => {}
            }
        }
        inside
    }

    /// Every point of `other` lies inside or on `poly`, and no edge of `other`
    /// leaves `poly` between two boundary contacts.
    pub fn contains_polygon(&self, poly: PolygonId, other: PolygonId) -> PlanResult<bool> {
        self.polygon(poly)?;
        self.polygon(other)?;
        if self.point_iter(other).any(|p| !self.ray_cast(poly, self.pos(p), false)) {
            return Ok(false);
        }
        for c in self.edge_iter(other) {
            let current = self.seg_of(c);
            let mut problems: Vec<Vector2<i64>> = Vec::new();
            let mut note = |p: Vector2<i64>| {
                if !problems.contains(&p) {
                    problems.push(p);
                }
            };
            for e in self.edge_iter(poly) {
                let edge = self.seg_of(e);
                match intersects(&edge, &current) {
                    LineIntersection::Intersects => return Ok(false),
                    LineIntersection::Colinear => {
                        if !edge.bbox_contains(&current) {
                            for p in [current.a, current.b] {
                                if edge.spans(p) {
                                    note(p);
                                }
                            }
                            for p in [edge.a, edge.b] {
                                if current.spans(p) {
                                    note(p);
                                }
                            }
                        }
                    }
                    LineIntersection::IntersectsBorder => {
                        if let Some(p) = edge
                            .border_point(&current)
                            .or_else(|| edge.line_intersection(&current))
                        {
                            note(p);
                        }
                    }
                    LineIntersection::Connected => {
                        if current.fits(edge.a) {
                            note(edge.a);
                        } else if current.fits(edge.b) {
                            note(edge.b);
                        }
                    }
                    LineIntersection::Superposed => {
                        note(edge.a);
                        note(edge.b);
                    }
                    LineIntersection::IntersectsPoint | LineIntersection::NotIntersects => {}
                }
            }
            for w in problems.windows(2) {
                if !self.ray_cast(poly, meter_midpoint(w[0], w[1]), false) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Some vertex of one polygon is inside or on the other.
    pub fn intersects(&self, a: PolygonId, b: PolygonId) -> PlanResult<bool> {
        Ok(self.intersection(a, b)?.is_some())
    }

    /// Some vertex of one polygon is strictly inside the other.
    pub fn intersects_strict(&self, a: PolygonId, b: PolygonId) -> PlanResult<bool> {
        Ok(self.vertex_inside(a, b, true)?.is_some())
    }

    /// The first vertex found inside the other polygon: vertices of `a` are
    /// tried before vertices of `b`.
    pub fn intersection(&self, a: PolygonId, b: PolygonId) -> PlanResult<Option<Coord>> {
        self.vertex_inside(a, b, false)
    }

    fn vertex_inside(&self, a: PolygonId, b: PolygonId, strict: bool) -> PlanResult<Option<Coord>> {
        self.polygon(a)?;
        self.polygon(b)?;
        let hit = |from: PolygonId, into: PolygonId| {
            self.point_iter(from)
                .map(|p| self.pos(p))
                .find(|&p| self.ray_cast(into, p, strict))
        };
        Ok(hit(a, b).or_else(|| hit(b, a)))
    }

    /// The polygon lies on the given side of edge `e`.
    ///
    /// Probes two points `SIDE_PROBE_MM` off the edge midpoint along the
    /// normal and tests the one on the requested side.
    pub fn relative_position(
        &self,
        poly: PolygonId,
        e: EdgeId,
        side: RelativePosition,
    ) -> PlanResult<bool> {
        self.polygon(poly)?;
        let (s, t) = {
            let edge = self.edge(e)?;
            (self.pos(edge.source), self.pos(edge.target))
        };
        let seg = Segment::from_coords(s, t);
        let middle = Vector2::new(((t.x + s.x) / 2) as f64, ((t.y + s.y) / 2) as f64);
        let normal = if seg.is_horizontal() {
            Vector2::new(0.0, 1.0)
        } else if seg.is_vertical() {
            Vector2::new(1.0, 0.0)
        } else {
            let inverse = -1.0 / seg.slope();
            Vector2::new(1.0, inverse) / (1.0 + inverse * inverse).sqrt()
        };
        let probe = |sign: f64| {
            let q = middle + normal * (sign * SIDE_PROBE_MM);
            Vector2::new(q.x.round() as i32, q.y.round() as i32)
        };
        let wanted = match side {
            RelativePosition::Left => 1,
            RelativePosition::Right => -1,
        };
        for q in [probe(1.0), probe(-1.0)] {
            if orientation(widen(t), widen(s), widen(q)) == wanted {
                return Ok(self.ray_cast(poly, q, false));
            }
        }
        Ok(false)
    }
}

/// Midpoint computed on meter-rounded coordinates, back in millimeters.
fn meter_midpoint(a: Vector2<i64>, b: Vector2<i64>) -> Coord {
    let mid = |u: i64, v: i64| from_meter((to_meter(u as i32) + to_meter(v as i32)) * 0.5);
    Vector2::new(mid(a.x, b.x), mid(a.y, b.y))
}
