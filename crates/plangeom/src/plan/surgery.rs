//! Structural edits that rewrite the middle of a chain: combine, replace and
//! split. Every operation checks all of its preconditions before the first
//! write, so a failed call leaves the arena untouched.

use tracing::debug;

use super::{Plan, PolygonId};
use crate::edge::EdgeId;
use crate::error::{PlanError, PlanResult, StructuralError};
use crate::point::{Coord, PointId};

/// Minimum edge count `keep_min_size` protects.
const MIN_EDGES: usize = 3;

impl Plan {
    /// Merge two consecutive edges into one.
    ///
    /// The edge with the less specialized tag is dropped (`e1` on a tie) and
    /// the survivor is stretched over the shared point. If both far endpoints
    /// have the same coordinates the pair is a spike: both edges disappear and
    /// `None` is returned.
    pub fn combine_edges(
        &mut self,
        poly: PolygonId,
        e1: EdgeId,
        e2: EdgeId,
        keep_min_size: bool,
    ) -> PlanResult<Option<EdgeId>> {
        let ed1 = self.owned_edge(poly, e1)?.clone();
        let ed2 = self.owned_edge(poly, e2)?.clone();
        let common = match self.common_point(e1, e2)? {
            Some(c) if e1 != e2 => c,
            _ => return Err(StructuralError::NoConsecutiveEdges(e1, e2).into()),
        };
        let far = |s: PointId, t: PointId| if s == common { t } else { s };
        let (o1, o2) = (far(ed1.source, ed1.target), far(ed2.source, ed2.target));
        let spike = self[o1].matches(self.pos(o2));

        let size = self[poly].size;
        let remaining = if spike { size.saturating_sub(2) } else { size - 1 };
        if keep_min_size && remaining < MIN_EDGES {
            return Err(StructuralError::NotEnoughEdges {
                remaining,
                min: MIN_EDGES,
            }
            .into());
        }

        if spike {
            self.remove_spike(poly, (e1, o1), (e2, o2), common)?;
            self.recompute_bounds(poly);
            return Ok(None);
        }

        let drop_first = ed1.tag == ed2.tag || ed1.tag.is_plain();
        let (keep, drop, far) = if drop_first { (e2, e1, o1) } else { (e1, e2, o2) };
        self.set_point(keep, common, far, true)?;
        let state = &mut self[poly];
        if state.start == Some(common) {
            state.start = Some(far);
        }
        if state.end == Some(common) {
            state.end = Some(far);
        }
        state.size -= 1;
        self.free_edge(drop);
        self.free_point(common);
        self.recompute_bounds(poly);
        debug!(polygon = poly.0, kept = keep.0, dropped = drop.0, "combine");
        Ok(Some(keep))
    }

    /// Drop both edges of a spike `o1 - common - o2` where `o1` and `o2`
    /// coincide. The outer neighbour of one side is rewired onto the other
    /// side's far point.
    fn remove_spike(
        &mut self,
        poly: PolygonId,
        (e1, o1): (EdgeId, PointId),
        (e2, o2): (EdgeId, PointId),
        common: PointId,
    ) -> PlanResult<()> {
        if self[poly].size <= 2 {
            self.unlink_edge(e1)?;
            if self.edge(e2).is_ok() {
                self.unlink_edge(e2)?;
            }
            return Ok(());
        }
        let n1 = self.other_edge(o1, e1)?;
        let n2 = self.other_edge(o2, e2)?;
        let (gone, survivor) = match (n1, n2) {
            (Some(n1), _) => {
                self.set_point(n1, o1, o2, true)?;
                (o1, o2)
            }
            (None, Some(n2)) => {
                self.set_point(n2, o2, o1, true)?;
                (o2, o1)
            }
            (None, None) => {
                return Err(PlanError::Internal(format!(
                    "spike at {common:?} has no outer neighbour"
                )))
            }
        };
        self.free_edge(e1);
        self.free_edge(e2);
        self.free_point(common);
        self.free_point(gone);
        let state = &mut self[poly];
        for end in [&mut state.start, &mut state.end] {
            if *end == Some(common) || *end == Some(gone) {
                *end = Some(survivor);
            }
        }
        state.size -= 2;
        debug!(polygon = poly.0, e1 = e1.0, e2 = e2.0, "spike removed");
        Ok(())
    }

    /// Merge the two edges meeting at `p2`, looked up by coordinates.
    pub fn combine_points(
        &mut self,
        poly: PolygonId,
        p1: Coord,
        p2: Coord,
        p3: Coord,
        keep_min_size: bool,
    ) -> PlanResult<Option<EdgeId>> {
        let e1 = self.get_edge(poly, p1, p2)?;
        let e2 = self.get_edge(poly, p2, p3)?;
        self.combine_edges(poly, e1, e2, keep_min_size)
    }

    /// Merge the chain running through `points` into a single edge.
    pub fn combine_chain(
        &mut self,
        poly: PolygonId,
        points: &[Coord],
        keep_min_size: bool,
    ) -> PlanResult<EdgeId> {
        if points.len() < 3 {
            return Err(StructuralError::NotEnoughPoints {
                expected: 3,
                actual: points.len(),
            }
            .into());
        }
        let edges = points
            .windows(2)
            .map(|w| self.get_edge(poly, w[0], w[1]))
            .collect::<PlanResult<Vec<_>>>()?;
        for (i, w) in edges.windows(2).enumerate() {
            if w[0] == w[1] || self.common_point(w[0], w[1])?.is_none() {
                return Err(StructuralError::NoConsecutiveEdges(w[0], w[1]).into());
            }
            // a spike inside the chain would leave nothing to merge into
            if points[i] == points[i + 2] {
                return Err(StructuralError::SubsequentPointsEqual { index: i }.into());
            }
        }
        let merges = edges.len() - 1;
        let remaining = self[poly].size.saturating_sub(merges);
        if keep_min_size && remaining < MIN_EDGES {
            return Err(StructuralError::NotEnoughEdges {
                remaining,
                min: MIN_EDGES,
            }
            .into());
        }

        let mut current = edges[0];
        for &next in &edges[1..] {
            current = self
                .combine_edges(poly, current, next, false)?
                .ok_or_else(|| PlanError::Internal("chain merge collapsed a spike".into()))?;
        }
        Ok(current)
    }

    /// Replace edge `e` of a closed polygon by the chain `points`.
    ///
    /// The first and last point must match the endpoints of `e`, in either
    /// order. The endpoint points of `e` stay; the new edges carry the tag of
    /// `e` and are returned in the order of `points`.
    pub fn replace_edge(
        &mut self,
        poly: PolygonId,
        e: EdgeId,
        points: &[Coord],
    ) -> PlanResult<Vec<EdgeId>> {
        if points.len() < 3 {
            return Err(StructuralError::NotEnoughPoints {
                expected: 3,
                actual: points.len(),
            }
            .into());
        }
        if !self.polygon(poly)?.closed {
            return Err(StructuralError::RequiresClosed(poly).into());
        }
        let edge = self.owned_edge(poly, e)?.clone();
        let (sp, tp) = self.coords(e);
        let (first, last) = (points[0], points[points.len() - 1]);
        let forward = first == sp && last == tp;
        let backward = first == tp && last == sp;
        if sp == tp || !(forward || backward) {
            return Err(StructuralError::ReplacementEndpointsMismatch.into());
        }
        if let Some(index) = points.windows(2).position(|w| w[0] == w[1]) {
            return Err(StructuralError::SubsequentPointsEqual { index }.into());
        }

        let (s, t) = (edge.source, edge.target);
        let anchor = self[poly].start.unwrap_or(t);
        self.unlink_edge(e)?;
        // now open from t to s; the new run closes it again
        let interior: Vec<Coord> = if forward {
            points[1..points.len() - 1].to_vec()
        } else {
            points[1..points.len() - 1].iter().rev().copied().collect()
        };
        let mut created = Vec::with_capacity(points.len() - 1);
        let mut prev = s;
        for c in interior {
            let p = self.alloc_point(c);
            created.push(self.link_new(poly, prev, p, edge.tag));
            prev = p;
        }
        created.push(self.link_new(poly, prev, t, edge.tag));

        let state = &mut self[poly];
        state.size += created.len();
        state.closed = true;
        state.start = Some(anchor);
        state.end = Some(anchor);
        self.recompute_bounds(poly);
        debug!(polygon = poly.0, edge = e.0, edges = created.len(), "edge replaced");

        if backward {
            created.reverse();
        }
        Ok(created)
    }

    /// Cut a closed polygon along the chords `e1.source → e2.target` and
    /// `e2.source → e1.target`.
    ///
    /// `e1` and `e2` are removed. The run from `e1.target` to `e2.source`
    /// moves into a new polygon built by the same factory; both results are
    /// closed and their edge counts sum to the original count.
    pub fn split_closed_polygon(
        &mut self,
        poly: PolygonId,
        e1: EdgeId,
        e2: EdgeId,
    ) -> PlanResult<PolygonId> {
        if !self.polygon(poly)?.closed {
            return Err(StructuralError::RequiresClosed(poly).into());
        }
        let ed1 = self.owned_edge(poly, e1)?.clone();
        let ed2 = self.owned_edge(poly, e2)?.clone();
        if e1 == e2 || self.is_neighbour(e1, e2)? {
            return Err(StructuralError::AdjacentEdges(e1, e2).into());
        }
        let (e1s, e1t) = (ed1.source, ed1.target);
        let (e2s, e2t) = (ed2.source, ed2.target);
        let old_bridge = self.make_tag(poly, self.pos(e1s), self.pos(e2t))?;
        let new_bridge = self.make_tag(poly, self.pos(e2s), self.pos(e1t))?;
        let factory = self[poly].factory.clone();

        self.cut_edge(e1);
        let sibling = self.new_polygon_with(factory);
        let moved = self.rehome_run(e1t, e2s, sibling)?;
        self.cut_edge(e2);
        {
            let state = &mut self[poly];
            state.size -= moved;
            state.start = Some(e2t);
            state.end = Some(e1s);
            state.closed = false;
        }
        {
            let state = &mut self[sibling];
            state.size = moved;
            state.start = Some(e1t);
            state.end = Some(e2s);
        }

        self.link_new(poly, e1s, e2t, old_bridge);
        self.link_new(sibling, e2s, e1t, new_bridge);
        for (p, start) in [(poly, e2t), (sibling, e1t)] {
            let state = &mut self[p];
            state.size += 1;
            state.closed = true;
            state.end = Some(start);
        }
        self.recompute_bounds(poly);
        self.recompute_bounds(sibling);
        debug!(
            polygon = poly.0,
            sibling = sibling.0,
            left = self[poly].size,
            right = self[sibling].size,
            "closed polygon split"
        );
        Ok(sibling)
    }

    /// Split an open chain at `e`: the edges before `e` move into a new
    /// polygon, `e` is removed, the rest stays.
    pub fn split_unclosed_polygon(&mut self, poly: PolygonId, e: EdgeId) -> PlanResult<PolygonId> {
        if self.polygon(poly)?.closed {
            return Err(StructuralError::RequiresOpen(poly).into());
        }
        let edge = self.owned_edge(poly, e)?.clone();
        let (s, t) = (edge.source, edge.target);
        let start = self[poly]
            .start
            .ok_or(StructuralError::EmptyPolygon(poly))?;
        let factory = self[poly].factory.clone();

        let sibling = self.new_polygon_with(factory);
        let moved = self.rehome_run(start, s, sibling)?;
        if moved > 0 {
            let state = &mut self[sibling];
            state.size = moved;
            state.start = Some(start);
            state.end = Some(s);
        }
        self.cut_edge(e);
        let state = &mut self[poly];
        state.size -= moved;
        if state.size == 0 {
            state.start = None;
            state.end = None;
        } else {
            state.start = Some(t);
        }
        // an endpoint with no edge left belongs to neither polygon
        for p in [s, t] {
            if self[p].is_detached() {
                self.free_point(p);
            }
        }
        self.recompute_bounds(poly);
        self.recompute_bounds(sibling);
        debug!(polygon = poly.0, sibling = sibling.0, moved, "open polygon split");
        Ok(sibling)
    }

    /// Reassign the edges from `from` up to `to` (walking `next_edge`) to
    /// `owner`. Returns the number of edges moved.
    fn rehome_run(&mut self, from: PointId, to: PointId, owner: PolygonId) -> PlanResult<usize> {
        let mut moved = 0;
        let mut cur = from;
        while cur != to {
            let Some(e) = self[cur].next_edge else {
                return Err(PlanError::Internal(format!(
                    "chain broken at {cur:?} while moving edges"
                )));
            };
            self[e].polygon = owner;
            cur = self[e].target;
            moved += 1;
        }
        Ok(moved)
    }

    /// Detach and free an edge without touching the chain ends.
    fn cut_edge(&mut self, e: EdgeId) {
        let (s, t, poly) = {
            let edge = &self[e];
            (edge.source, edge.target, edge.polygon)
        };
        if self[s].next_edge == Some(e) {
            self[s].next_edge = None;
        }
        if self[t].prev_edge == Some(e) {
            self[t].prev_edge = None;
        }
        self[poly].size -= 1;
        self.free_edge(e);
    }
}
