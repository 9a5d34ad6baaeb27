//! Point/edge wiring and edge deletion.
//!
//! The rewiring primitives keep the point back-links consistent with the edge
//! endpoints. They do not touch polygon start/end; callers that use them
//! directly are responsible for the chain invariants.

use tracing::trace;

use super::{Plan, PolygonId};
use crate::edge::{EdgeId, Segment};
use crate::error::{PlanResult, StructuralError};
use crate::point::{widen, Coord, PointId};

/// How `remove_edge` re-derives the chain ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Removal {
    /// Sole edge: back to the Empty state.
    Empty,
    /// Closed polygon broken open at the edge.
    Open,
    /// Zero-length edge spliced out; `next` takes over its source point.
    Splice { next: EdgeId },
    First,
    Last,
}

impl Plan {
    /// Point handles of an edge in traversal order.
    pub fn endpoints(&self, e: EdgeId) -> PlanResult<(PointId, PointId)> {
        let edge = self.edge(e)?;
        Ok((edge.source, edge.target))
    }

    /// Rewire the source of `e` to `p`.
    ///
    /// Fails with `PointsAlreadyConnected` if `p` already has an outgoing edge,
    /// unless `overwrite` is set. The old source loses its outgoing link.
    pub fn set_source(&mut self, e: EdgeId, p: PointId, overwrite: bool) -> PlanResult<()> {
        let old = self.edge(e)?.source;
        let next = self.point(p)?.next_edge;
        if old == p {
            self[p].next_edge = Some(e);
            return Ok(());
        }
        if !overwrite && next.is_some() {
            return Err(StructuralError::PointsAlreadyConnected(p).into());
        }
        if self[old].next_edge == Some(e) {
            self[old].next_edge = None;
        }
        self[e].source = p;
        self[p].next_edge = Some(e);
        trace!(edge = e.0, point = p.0, "set_source");
        Ok(())
    }

    /// Rewire the target of `e` to `p`. Mirror of `set_source`.
    pub fn set_target(&mut self, e: EdgeId, p: PointId, overwrite: bool) -> PlanResult<()> {
        let old = self.edge(e)?.target;
        let prev = self.point(p)?.prev_edge;
        if old == p {
            self[p].prev_edge = Some(e);
            return Ok(());
        }
        if !overwrite && prev.is_some() {
            return Err(StructuralError::PointsAlreadyConnected(p).into());
        }
        if self[old].prev_edge == Some(e) {
            self[old].prev_edge = None;
        }
        self[e].target = p;
        self[p].prev_edge = Some(e);
        trace!(edge = e.0, point = p.0, "set_target");
        Ok(())
    }

    /// Rewire both endpoints. Both checks run before either link changes.
    pub fn set_points(
        &mut self,
        e: EdgeId,
        source: PointId,
        target: PointId,
        overwrite: bool,
    ) -> PlanResult<()> {
        let edge = self.edge(e)?;
        if !overwrite {
            let (old_s, old_t) = (edge.source, edge.target);
            if old_s != source && self.point(source)?.next_edge.is_some() {
                return Err(StructuralError::PointsAlreadyConnected(source).into());
            }
            if old_t != target && self.point(target)?.prev_edge.is_some() {
                return Err(StructuralError::PointsAlreadyConnected(target).into());
            }
        }
        self.set_source(e, source, true)?;
        self.set_target(e, target, true)
    }

    /// Replace endpoint `old` of `e` by `new`, on whichever side `old` sits.
    pub fn set_point(
        &mut self,
        e: EdgeId,
        old: PointId,
        new: PointId,
        overwrite: bool,
    ) -> PlanResult<()> {
        let edge = self.edge(e)?;
        if edge.source == old {
            self.set_source(e, new, overwrite)
        } else if edge.target == old {
            self.set_target(e, new, overwrite)
        } else {
            Err(StructuralError::NotIncident(e).into())
        }
    }

    /// The edge at `p` that is not `e`.
    pub fn other_edge(&self, p: PointId, e: EdgeId) -> PlanResult<Option<EdgeId>> {
        Ok(self.point(p)?.other_edge(e)?)
    }

    /// The opposite endpoint of `e`. Accepts the point by identity or by
    /// coordinates.
    pub fn get_other(&self, e: EdgeId, p: PointId) -> PlanResult<PointId> {
        let edge = self.edge(e)?;
        let pos = self.point(p)?.pos;
        if edge.source == p || self[edge.source].matches(pos) {
            Ok(edge.target)
        } else if edge.target == p || self[edge.target].matches(pos) {
            Ok(edge.source)
        } else {
            Err(StructuralError::NotIncident(e).into())
        }
    }

    /// The neighbour of `e` on the side away from `n`.
    pub fn other_neighbour(&self, e: EdgeId, n: EdgeId) -> PlanResult<Option<EdgeId>> {
        let edge = self.edge(e)?;
        let (s, t) = (&self[edge.source], &self[edge.target]);
        if s.prev_edge == Some(n) {
            Ok(t.next_edge)
        } else if t.next_edge == Some(n) {
            Ok(s.prev_edge)
        } else {
            Err(StructuralError::NotIncident(e).into())
        }
    }

    /// Chain neighbours, by identity.
    pub fn is_neighbour(&self, a: EdgeId, b: EdgeId) -> PlanResult<bool> {
        let edge = self.edge(a)?;
        self.edge(b)?;
        Ok(self[edge.source].prev_edge == Some(b) || self[edge.target].next_edge == Some(b))
    }

    /// Shared endpoint by identity.
    pub fn common_point(&self, a: EdgeId, b: EdgeId) -> PlanResult<Option<PointId>> {
        let (ea, eb) = (self.edge(a)?, self.edge(b)?);
        Ok([ea.source, ea.target]
            .into_iter()
            .find(|&p| eb.has_point(p)))
    }

    /// Endpoint pairs match in either direction.
    pub fn edges_equal(&self, a: EdgeId, b: EdgeId) -> PlanResult<bool> {
        Ok(self.segment(a)?.same_endpoints(&self.segment(b)?))
    }

    /// `c` matches an endpoint of `e`.
    pub fn fits_point(&self, e: EdgeId, c: Coord) -> PlanResult<bool> {
        Ok(self.segment(e)?.fits(widen(c)))
    }

    /// Move a point. Returns `false` when the coordinates already match.
    ///
    /// The owning polygon's bounds are recomputed after a move.
    pub fn set_location(&mut self, p: PointId, pos: Coord) -> PlanResult<bool> {
        let pt = self.point(p)?;
        if pt.matches(pos) {
            return Ok(false);
        }
        let owner = pt
            .next_edge
            .or(pt.prev_edge)
            .map(|e| self[e].polygon);
        self[p].pos = pos;
        if let Some(poly) = owner {
            self.recompute_bounds(poly);
        }
        Ok(true)
    }

    /// Delete an edge: detach it from its polygon, clear both points'
    /// back-links, release orphaned points and recompute the bounds.
    ///
    /// Only the first or last edge of an open polygon, any edge of a closed
    /// one, or a zero-length edge can be deleted; mid-chain edits go through
    /// `combine_edges` and `replace_edge`.
    pub fn delete_edge(&mut self, e: EdgeId) -> PlanResult<()> {
        let poly = self.edge(e)?.polygon;
        self.unlink_edge(e)?;
        self.recompute_bounds(poly);
        Ok(())
    }

    /// `delete_edge` without the bounds pass, for compound edits.
    pub(crate) fn unlink_edge(&mut self, e: EdgeId) -> PlanResult<()> {
        let edge = self.edge(e)?.clone();
        let poly = edge.polygon;
        let removal = self.plan_removal(poly, e)?;
        let (s, t) = (edge.source, edge.target);

        match removal {
            Removal::Splice { next } => {
                self[next].source = s;
                self[s].next_edge = Some(next);
                self[t].next_edge = None;
                if self[t].prev_edge == Some(e) {
                    self[t].prev_edge = None;
                }
                let state = &mut self[poly];
                if state.start == Some(t) {
                    state.start = Some(s);
                }
                if state.end == Some(t) {
                    state.end = Some(s);
                }
            }
            _ => {
                if self[s].next_edge == Some(e) {
                    self[s].next_edge = None;
                }
                if self[t].prev_edge == Some(e) {
                    self[t].prev_edge = None;
                }
                let state = &mut self[poly];
                match removal {
                    Removal::Empty => {
                        state.start = None;
                        state.end = None;
                        state.closed = false;
                    }
                    Removal::Open => {
                        state.start = Some(t);
                        state.end = Some(s);
                        state.closed = false;
                    }
                    Removal::First => state.start = Some(t),
                    Removal::Last => state.end = Some(s),
                    Removal::Splice { .. } => {}
                }
            }
        }

        self[poly].size -= 1;
        self.free_edge(e);
        self.release_if_orphan(poly, s);
        self.release_if_orphan(poly, t);
        trace!(edge = e.0, polygon = poly.0, ?removal, "remove_edge");
        Ok(())
    }

    /// Decide how removing `e` re-derives the chain ends. Read-only.
    fn plan_removal(&self, poly: PolygonId, e: EdgeId) -> PlanResult<Removal> {
        let edge = &self[e];
        let state = &self[poly];
        let (s, t) = (edge.source, edge.target);
        let prev = self[s].prev_edge.filter(|&x| x != e);
        let next = self[t].next_edge.filter(|&x| x != e);
        let zero_length = self[s].pos == self[t].pos;

        if state.size == 1 {
            return Ok(Removal::Empty);
        }
        if let (true, Some(_), Some(next)) = (zero_length, prev, next) {
            return Ok(Removal::Splice { next });
        }
        if state.closed {
            return Ok(Removal::Open);
        }
        let first = state.start.and_then(|p| self[p].next_edge);
        let last = state.end.and_then(|p| self[p].prev_edge);
        if first == Some(e) {
            Ok(Removal::First)
        } else if last == Some(e) {
            Ok(Removal::Last)
        } else {
            Err(StructuralError::EdgeNotFirstOrLast(e).into())
        }
    }

    /// Coordinates of both endpoints of `e`.
    pub(crate) fn coords(&self, e: EdgeId) -> (Coord, Coord) {
        let edge = &self[e];
        (self.pos(edge.source), self.pos(edge.target))
    }

    /// Detached segment of an edge by handle, panicking on stale handles.
    pub(crate) fn seg_of(&self, e: EdgeId) -> Segment {
        self.seg(&self[e])
    }
}
