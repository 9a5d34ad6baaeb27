//! Growing a chain: edge insertion at either end, bulk construction, closing.

use tracing::debug;

use super::{Bounds, Plan, PolygonId};
use crate::edge::{EdgeId, EdgeTag, PlanEdge, Segment};
use crate::error::{PlanError, PlanResult, StructuralError};
use crate::point::{widen, Coord, PointId};

/// Where an inserted edge goes.
enum Insert {
    Empty,
    Close,
    Prepend { far: Coord },
    Append { far: Coord },
}

impl Plan {
    /// Ask the polygon's factory for the tag of a new edge.
    pub(crate) fn make_tag(&self, poly: PolygonId, source: Coord, target: Coord) -> PlanResult<EdgeTag> {
        self.polygon(poly)?
            .factory
            .make_edge(source, target)
            .ok_or_else(|| {
                PlanError::Internal(format!(
                    "edge factory of {poly:?} failed for ({},{})-({},{})",
                    source.x, source.y, target.x, target.y
                ))
            })
    }

    /// Create an edge through the polygon's factory and attach it.
    ///
    /// - Empty polygon: the edge becomes the whole chain.
    /// - Open polygon: closes when the edge fits both start and end, otherwise
    ///   prepends at `start` or appends at `end`.
    /// - Closed polygon: `AddToClosedPolygon`.
    ///
    /// Endpoint points are always freshly allocated (or the existing chain
    /// ends), never shared with the caller.
    pub fn add_edge(&mut self, poly: PolygonId, source: Coord, target: Coord) -> PlanResult<EdgeId> {
        self.classify_insert(poly, source, target)?;
        let tag = self.make_tag(poly, source, target)?;
        self.attach(poly, source, target, tag)
    }

    fn classify_insert(&self, poly: PolygonId, source: Coord, target: Coord) -> PlanResult<Insert> {
        let state = self.polygon(poly)?;
        if state.closed {
            return Err(StructuralError::AddToClosedPolygon(poly).into());
        }
        let (Some(start), Some(end)) = (state.start, state.end) else {
            return Ok(Insert::Empty);
        };
        let seg = Segment::from_coords(source, target);
        let (sp, ep) = (self.pos(start), self.pos(end));
        let (fits_start, fits_end) = (seg.fits(widen(sp)), seg.fits(widen(ep)));
        let far_from = |p: Coord| if source == p { target } else { source };
        Ok(if fits_start && fits_end {
            Insert::Close
        } else if fits_start {
            Insert::Prepend { far: far_from(sp) }
        } else if fits_end {
            Insert::Append { far: far_from(ep) }
        } else {
            return Err(StructuralError::CoordinateMismatch {
                sx: source.x,
                sy: source.y,
                tx: target.x,
                ty: target.y,
            }
            .into());
        })
    }

    /// Insert an edge with a known tag. Validates before writing.
    pub(crate) fn attach(
        &mut self,
        poly: PolygonId,
        source: Coord,
        target: Coord,
        tag: EdgeTag,
    ) -> PlanResult<EdgeId> {
        let insert = self.classify_insert(poly, source, target)?;
        let state = &self[poly];
        let (start, end) = (state.start, state.end);
        let e = match (insert, start, end) {
            (Insert::Close, Some(start), Some(end)) => {
                let e = self.link_new(poly, end, start, tag);
                let state = &mut self[poly];
                state.closed = true;
                state.end = Some(start);
                e
            }
            (Insert::Prepend { far }, Some(start), _) => {
                let p = self.alloc_point(far);
                let e = self.link_new(poly, p, start, tag);
                let state = &mut self[poly];
                state.start = Some(p);
                state.bounds.include(far);
                e
            }
            (Insert::Append { far }, _, Some(end)) => {
                let p = self.alloc_point(far);
                let e = self.link_new(poly, end, p, tag);
                let state = &mut self[poly];
                state.end = Some(p);
                state.bounds.include(far);
                e
            }
            _ => {
                let s = self.alloc_point(source);
                let t = self.alloc_point(target);
                let e = self.link_new(poly, s, t, tag);
                let state = &mut self[poly];
                state.start = Some(s);
                state.end = Some(t);
                let mut bounds = Bounds::around(source);
                bounds.include(target);
                state.bounds = bounds;
                e
            }
        };
        self[poly].size += 1;
        Ok(e)
    }

    pub(crate) fn link_new(
        &mut self,
        poly: PolygonId,
        source: PointId,
        target: PointId,
        tag: EdgeTag,
    ) -> EdgeId {
        let e = self.alloc_edge(PlanEdge {
            source,
            target,
            polygon: poly,
            tag,
        });
        self[source].next_edge = Some(e);
        self[target].prev_edge = Some(e);
        e
    }

    /// Build the chain of an empty polygon from a point list and close it.
    ///
    /// Consecutive matching points are skipped; a last point matching the
    /// first is taken as the explicit close. Returns the number of edges
    /// created, closing edge included.
    pub fn define_by_points(&mut self, poly: PolygonId, points: &[Coord]) -> PlanResult<usize> {
        if !self.polygon(poly)?.is_empty() {
            return Err(StructuralError::PolygonNotEmpty(poly).into());
        }
        let outline = outline(points)?;
        self.build_outline(poly, &outline)
    }

    /// Clear the polygon and rebuild it from `points`.
    ///
    /// The point list is validated before the old chain is dropped.
    pub fn replace(&mut self, poly: PolygonId, points: &[Coord]) -> PlanResult<usize> {
        self.polygon(poly)?;
        let outline = outline(points)?;
        let tags = self.outline_tags(poly, &outline)?;
        self.clear(poly);
        self.link_outline(poly, &outline, &tags)
    }

    fn build_outline(&mut self, poly: PolygonId, outline: &[Coord]) -> PlanResult<usize> {
        let tags = self.outline_tags(poly, outline)?;
        self.link_outline(poly, outline, &tags)
    }

    fn outline_tags(&self, poly: PolygonId, outline: &[Coord]) -> PlanResult<Vec<EdgeTag>> {
        let n = outline.len();
        (0..n)
            .map(|i| self.make_tag(poly, outline[i], outline[(i + 1) % n]))
            .collect()
    }

    fn link_outline(&mut self, poly: PolygonId, outline: &[Coord], tags: &[EdgeTag]) -> PlanResult<usize> {
        let n = outline.len();
        for (i, &tag) in tags.iter().enumerate() {
            self.attach(poly, outline[i], outline[(i + 1) % n], tag)?;
        }
        debug!(polygon = poly.0, edges = n, "outline built");
        Ok(n)
    }

    /// Drop every edge and point of the polygon; it becomes Empty.
    pub fn clear(&mut self, poly: PolygonId) {
        let edges: Vec<EdgeId> = self.edge_iter(poly).collect();
        for e in edges {
            let (s, t) = (self[e].source, self[e].target);
            self.free_edge(e);
            self.free_point(s);
            self.free_point(t);
        }
        if let Ok(state) = self.polygon(poly) {
            let ends = [state.start, state.end];
            for p in ends.into_iter().flatten() {
                self.free_point(p);
            }
            self[poly].reset();
        }
    }

    /// Delete a polygon and everything it owns. The handle becomes unknown.
    pub fn remove_polygon(&mut self, poly: PolygonId) -> PlanResult<()> {
        self.polygon(poly)?;
        self.clear(poly);
        self.polygons[poly.0] = None;
        Ok(())
    }

    /// Append points at the end of an open chain, optionally closing it.
    ///
    /// On an empty polygon the first point starts the chain. Points matching
    /// the current end are skipped. Returns the number of edges created.
    pub fn add(&mut self, poly: PolygonId, points: &[Coord], close: bool) -> PlanResult<usize> {
        let state = self.polygon(poly)?;
        if state.closed {
            return Err(StructuralError::AddToClosedPolygon(poly).into());
        }
        let (mut cursor, start, mut rest) = match (state.start, state.end) {
            (Some(s), Some(e)) => (self.pos(e), self.pos(s), points),
            _ => match points.split_first() {
                Some((&first, rest)) => (first, first, rest),
                None => return Ok(0),
            },
        };
        let mut plan = Vec::with_capacity(rest.len() + 1);
        while let Some((&p, tail)) = rest.split_first() {
            rest = tail;
            if p == cursor {
                continue;
            }
            if p == start && !tail.is_empty() {
                return Err(StructuralError::PrematureClose {
                    index: points.len() - tail.len() - 1,
                }
                .into());
            }
            plan.push((cursor, p));
            cursor = p;
        }
        if close && cursor != start {
            plan.push((cursor, start));
        }
        if self[poly].is_empty() && plan.is_empty() {
            return Err(StructuralError::NotEnoughPoints {
                expected: 2,
                actual: points.len(),
            }
            .into());
        }
        let tags = plan
            .iter()
            .map(|&(a, b)| self.make_tag(poly, a, b))
            .collect::<PlanResult<Vec<_>>>()?;
        for (&(a, b), tag) in plan.iter().zip(tags) {
            self.attach(poly, a, b, tag)?;
        }
        Ok(plan.len())
    }

    /// Prepend an edge from `p` to the current start.
    pub fn add_point_first(&mut self, poly: PolygonId, p: Coord) -> PlanResult<EdgeId> {
        let start = self.chain_ends(poly)?.0;
        if self[start].matches(p) {
            return Err(StructuralError::SameAsStart.into());
        }
        let start_pos = self.pos(start);
        self.add_edge(poly, p, start_pos)
    }

    /// Append an edge from the current end to `p`.
    pub fn add_point_last(&mut self, poly: PolygonId, p: Coord) -> PlanResult<EdgeId> {
        let end = self.chain_ends(poly)?.1;
        if self[end].matches(p) {
            return Err(StructuralError::SameAsEnd.into());
        }
        let end_pos = self.pos(end);
        self.add_edge(poly, end_pos, p)
    }

    /// Close an open chain with an edge from end back to start.
    pub fn close(&mut self, poly: PolygonId) -> PlanResult<EdgeId> {
        let (start, end) = self.chain_ends(poly)?;
        let (sp, ep) = (self.pos(start), self.pos(end));
        self.add_edge(poly, ep, sp)
    }

    /// Start and end of a non-empty, open polygon.
    fn chain_ends(&self, poly: PolygonId) -> PlanResult<(PointId, PointId)> {
        let state = self.polygon(poly)?;
        if state.closed {
            return Err(StructuralError::AddToClosedPolygon(poly).into());
        }
        match (state.start, state.end) {
            (Some(s), Some(e)) => Ok((s, e)),
            _ => Err(StructuralError::EmptyPolygon(poly).into()),
        }
    }
}

/// Normalize a point list into a closed outline without the repeated first
/// point. Fails if the list has fewer than two distinct points or revisits
/// the first point before its end.
fn outline(points: &[Coord]) -> PlanResult<Vec<Coord>> {
    if points.len() < 2 {
        return Err(StructuralError::NotEnoughPoints {
            expected: 2,
            actual: points.len(),
        }
        .into());
    }
    let mut pts: Vec<(usize, Coord)> = Vec::with_capacity(points.len());
    for (i, &p) in points.iter().enumerate() {
        if pts.last().map(|&(_, q)| q) != Some(p) {
            pts.push((i, p));
        }
    }
    if pts.len() >= 3 && pts.last().map(|&(_, q)| q) == Some(pts[0].1) {
        pts.pop();
    }
    if pts.len() < 2 {
        return Err(StructuralError::NotEnoughPoints {
            expected: 2,
            actual: pts.len(),
        }
        .into());
    }
    if let Some(&(index, _)) = pts.iter().skip(1).find(|&&(_, p)| p == pts[0].1) {
        return Err(StructuralError::PrematureClose { index }.into());
    }
    Ok(pts.into_iter().map(|(_, p)| p).collect())
}
