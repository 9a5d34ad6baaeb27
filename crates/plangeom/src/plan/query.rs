//! Read-only views of a polygon chain.

use super::{Bounds, Plan, PolygonId};
use crate::cfg::to_meter;
use crate::edge::EdgeId;
use crate::error::{PlanResult, StructuralError};
use crate::point::{widen, Coord, PointId};

/// Edges in chain order, starting at the first edge.
pub struct EdgeIter<'a> {
    plan: &'a Plan,
    next: Option<EdgeId>,
    remaining: usize,
}

impl Iterator for EdgeIter<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        if self.remaining == 0 {
            return None;
        }
        let e = self.next?;
        self.remaining -= 1;
        self.next = self.plan[self.plan[e].target].next_edge;
        Some(e)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Vertices in chain order. A closed chain does not repeat its start.
pub struct PointIter<'a> {
    plan: &'a Plan,
    cur: Option<PointId>,
    remaining: usize,
}

impl Iterator for PointIter<'_> {
    type Item = PointId;

    fn next(&mut self) -> Option<PointId> {
        if self.remaining == 0 {
            return None;
        }
        let p = self.cur?;
        self.remaining -= 1;
        self.cur = self.plan[p].next_edge.map(|e| self.plan[e].target);
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl Plan {
    /// Live iterator over the edges. Yields nothing for an unknown polygon.
    pub fn edge_iter(&self, poly: PolygonId) -> EdgeIter<'_> {
        let (next, remaining) = match self.polygon(poly) {
            Ok(state) => (state.start.and_then(|p| self[p].next_edge), state.size),
            Err(_) => (None, 0),
        };
        EdgeIter {
            plan: self,
            next,
            remaining,
        }
    }

    /// Live iterator over the vertices. Yields nothing for an unknown polygon.
    pub fn point_iter(&self, poly: PolygonId) -> PointIter<'_> {
        let (cur, remaining) = match self.polygon(poly) {
            Ok(state) => (state.start, state.point_count()),
            Err(_) => (None, 0),
        };
        PointIter {
            plan: self,
            cur,
            remaining,
        }
    }

    /// Snapshot of the edges in chain order.
    pub fn edges(&self, poly: PolygonId) -> PlanResult<Vec<EdgeId>> {
        self.polygon(poly)?;
        Ok(self.edge_iter(poly).collect())
    }

    /// Snapshot of the vertices in chain order.
    pub fn plan_points(&self, poly: PolygonId) -> PlanResult<Vec<PointId>> {
        self.polygon(poly)?;
        Ok(self.point_iter(poly).collect())
    }

    /// Snapshot of the vertex coordinates in chain order.
    pub fn coords_of(&self, poly: PolygonId) -> PlanResult<Vec<Coord>> {
        self.polygon(poly)?;
        Ok(self.point_iter(poly).map(|p| self.pos(p)).collect())
    }

    pub fn bounds(&self, poly: PolygonId) -> PlanResult<Bounds> {
        Ok(self.polygon(poly)?.bounds)
    }
    pub fn is_closed(&self, poly: PolygonId) -> PlanResult<bool> {
        Ok(self.polygon(poly)?.closed)
    }
    pub fn edge_count(&self, poly: PolygonId) -> PlanResult<usize> {
        Ok(self.polygon(poly)?.size)
    }
    pub fn point_count(&self, poly: PolygonId) -> PlanResult<usize> {
        Ok(self.polygon(poly)?.point_count())
    }
    pub fn start(&self, poly: PolygonId) -> PlanResult<Option<PointId>> {
        Ok(self.polygon(poly)?.start)
    }
    pub fn end(&self, poly: PolygonId) -> PlanResult<Option<PointId>> {
        Ok(self.polygon(poly)?.end)
    }

    pub fn first_edge(&self, poly: PolygonId) -> PlanResult<Option<EdgeId>> {
        Ok(self.polygon(poly)?.start.and_then(|p| self[p].next_edge))
    }

    pub fn last_edge(&self, poly: PolygonId) -> PlanResult<Option<EdgeId>> {
        Ok(self.polygon(poly)?.end.and_then(|p| self[p].prev_edge))
    }

    /// Enclosed area in mm², truncated.
    ///
    /// Shoelace over the vertex sequence; an open chain is treated as if it
    /// were closed by a straight edge.
    pub fn area(&self, poly: PolygonId) -> PlanResult<i64> {
        let pts = self.coords_of(poly)?;
        let n = pts.len();
        let doubled: i64 = (0..n)
            .map(|i| {
                let (p, q) = (widen(pts[i]), widen(pts[(i + 1) % n]));
                (p.y + q.y) * (p.x - q.x)
            })
            .sum();
        Ok(doubled.abs() / 2)
    }

    /// Enclosed area in m², from meter-rounded coordinates.
    pub fn area_meter(&self, poly: PolygonId) -> PlanResult<f64> {
        let pts = self.coords_of(poly)?;
        let n = pts.len();
        let doubled: f64 = (0..n)
            .map(|i| {
                let (p, q) = (pts[i], pts[(i + 1) % n]);
                (to_meter(p.y) + to_meter(q.y)) * (to_meter(p.x) - to_meter(q.x))
            })
            .sum();
        Ok(doubled.abs() * 0.5)
    }

    /// The edge joining two coordinates, in either direction.
    pub fn get_edge(&self, poly: PolygonId, a: Coord, b: Coord) -> PlanResult<EdgeId> {
        self.polygon(poly)?;
        if a == b {
            return Err(StructuralError::EqualPoints.into());
        }
        let (a, b) = (widen(a), widen(b));
        self.edge_iter(poly)
            .find(|&e| {
                let s = self.seg_of(e);
                s.fits(a) && s.fits(b)
            })
            .ok_or_else(|| StructuralError::EdgeNotFound.into())
    }

    /// Some edge of the polygon joins `a` and `b`.
    pub fn is_contained(&self, poly: PolygonId, a: Coord, b: Coord) -> bool {
        self.get_edge(poly, a, b).is_ok()
    }

    /// The first edge on which `p` lies.
    pub fn edge_at(&self, poly: PolygonId, p: Coord) -> Option<EdgeId> {
        let p = widen(p);
        self.edge_iter(poly)
            .find(|&e| self.seg_of(e).distance_to(p) < 0.01)
    }

    /// Walk two vertices away from `p`, leaving through the edge that is not
    /// `e`. Requires a closed polygon.
    pub fn point_after_the_next(&self, e: EdgeId, p: PointId) -> PlanResult<PointId> {
        let edge = self.edge(e)?;
        if !edge.has_point(p) {
            return Err(StructuralError::NotIncident(e).into());
        }
        if !self[edge.polygon].closed {
            return Err(StructuralError::RequiresClosed(edge.polygon).into());
        }
        let e2 = self.other_edge(p, e)?.ok_or(StructuralError::NotIncident(e))?;
        let p2 = self.get_other(e2, p)?;
        let e3 = self.other_edge(p2, e2)?.ok_or(StructuralError::NotIncident(e2))?;
        self.get_other(e3, p2)
    }

    /// `c` matches the start or the end of the chain.
    pub fn fits_end_point(&self, poly: PolygonId, c: Coord) -> PlanResult<bool> {
        let state = self.polygon(poly)?;
        Ok([state.start, state.end]
            .into_iter()
            .flatten()
            .any(|p| self[p].matches(c)))
    }

    /// An edge `a`–`b` would close the open chain.
    pub fn will_close(&self, poly: PolygonId, a: Coord, b: Coord) -> PlanResult<bool> {
        let state = self.polygon(poly)?;
        let (Some(s), Some(e)) = (state.start, state.end) else {
            return Ok(false);
        };
        let (sp, ep) = (self.pos(s), self.pos(e));
        Ok(!state.closed && ((a == sp && b == ep) || (a == ep && b == sp)))
    }

    /// Same vertex coordinates in the same cyclic order, either direction.
    ///
    /// Open chains must agree from their first vertex (or reversed from the
    /// last); closed chains may start anywhere.
    pub fn same_shape(&self, a: PolygonId, b: PolygonId) -> PlanResult<bool> {
        let (sa, sb) = (self.polygon(a)?, self.polygon(b)?);
        if sa.size != sb.size || sa.closed != sb.closed {
            return Ok(false);
        }
        let pa = self.coords_of(a)?;
        let mut pb = self.coords_of(b)?;
        if pa.is_empty() {
            return Ok(true);
        }
        if !sa.closed {
            let same = pa == pb;
            pb.reverse();
            return Ok(same || pa == pb);
        }
        let rotated_eq = |pb: &[Coord]| {
            (0..pb.len()).any(|k| pa.iter().zip(pb.iter().cycle().skip(k)).all(|(x, y)| x == y))
        };
        if rotated_eq(&pb) {
            return Ok(true);
        }
        pb.reverse();
        Ok(rotated_eq(&pb))
    }

    /// `[(x,y),(x,y)] - [(x,y),(x,y)] - ...` over the edges.
    pub fn coordinate_string(&self, poly: PolygonId) -> String {
        self.edge_iter(poly)
            .map(|e| self.seg_of(e).to_string())
            .collect::<Vec<_>>()
            .join(" - ")
    }
}
