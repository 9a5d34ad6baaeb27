//! The plan arena: points, edges and polygons addressed by handles.
//!
//! Purpose
//! - Keep the doubly linked point/edge chain of every polygon in flat slot
//!   vectors. Topology links are handle fields; identity is handle equality.
//! - All mutation goes through `Plan` methods taking a `PolygonId`, so a single
//!   `&mut Plan` covers every polygon a split or combine may touch.
//!
//! Layout
//! - `topology`: point/edge wiring and edge deletion.
//! - `build`: growing a chain (add_edge, define_by_points, close, ...).
//! - `surgery`: combine, replace and split.
//! - `query`: iteration, area, lookups.
//! - `contain`: point and polygon containment.
//!
//! Slots are never reused, so a stale handle is always reported as unknown.

mod build;
mod contain;
mod query;
mod surgery;
mod topology;

use std::ops::{Index, IndexMut};

use crate::edge::{EdgeId, PlanEdge, Segment};
use crate::error::{PlanResult, StructuralError};
use crate::factory::{self, SharedEdgeFactory};
use crate::point::{Coord, PlanPoint, PointId};

pub use contain::RelativePosition;
pub use query::{EdgeIter, PointIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonId(pub usize);

/// Axis-aligned bounding box with inclusive edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    #[inline]
    pub fn around(p: Coord) -> Self {
        Self {
            x_offset: p.x,
            y_offset: p.y,
            width: 0,
            height: 0,
        }
    }

    pub fn include(&mut self, p: Coord) {
        let (min_x, max_x) = (self.x_offset.min(p.x), self.max_x().max(p.x));
        let (min_y, max_y) = (self.y_offset.min(p.y), self.max_y().max(p.y));
        *self = Self {
            x_offset: min_x,
            y_offset: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        };
    }

    #[inline]
    pub fn max_x(&self) -> i32 {
        self.x_offset + self.width
    }
    #[inline]
    pub fn max_y(&self) -> i32 {
        self.y_offset + self.height
    }

    #[inline]
    pub fn contains(&self, p: Coord) -> bool {
        p.x >= self.x_offset && p.y >= self.y_offset && p.x <= self.max_x() && p.y <= self.max_y()
    }
}

/// Per-polygon chain state.
#[derive(Clone, Debug)]
pub struct PlanPolygon {
    pub(crate) start: Option<PointId>,
    pub(crate) end: Option<PointId>,
    pub(crate) closed: bool,
    pub(crate) size: usize,
    pub(crate) bounds: Bounds,
    pub(crate) factory: SharedEdgeFactory,
}

impl PlanPolygon {
    fn new(factory: SharedEdgeFactory) -> Self {
        Self {
            start: None,
            end: None,
            closed: false,
            size: 0,
            bounds: Bounds::default(),
            factory,
        }
    }

    #[inline]
    pub fn start(&self) -> Option<PointId> {
        self.start
    }
    #[inline]
    pub fn end(&self) -> Option<PointId> {
        self.end
    }
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.size
    }
    /// Distinct vertices: `size` when closed, `size + 1` when open.
    #[inline]
    pub fn point_count(&self) -> usize {
        match (self.size, self.closed) {
            (0, _) => 0,
            (n, true) => n,
            (n, false) => n + 1,
        }
    }
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
    #[inline]
    pub fn factory(&self) -> &SharedEdgeFactory {
        &self.factory
    }

    fn reset(&mut self) {
        self.start = None;
        self.end = None;
        self.closed = false;
        self.size = 0;
        self.bounds = Bounds::default();
    }
}

#[derive(Debug, Default)]
pub struct Plan {
    points: Vec<Option<PlanPoint>>,
    edges: Vec<Option<PlanEdge>>,
    polygons: Vec<Option<PlanPolygon>>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// New empty polygon producing plain edges.
    pub fn new_polygon(&mut self) -> PolygonId {
        self.new_polygon_with(factory::plain())
    }

    pub fn new_polygon_with(&mut self, factory: SharedEdgeFactory) -> PolygonId {
        self.polygons.push(Some(PlanPolygon::new(factory)));
        PolygonId(self.polygons.len() - 1)
    }

    pub fn point(&self, id: PointId) -> PlanResult<&PlanPoint> {
        match self.points.get(id.0) {
            Some(Some(p)) => Ok(p),
            _ => Err(StructuralError::UnknownPoint(id).into()),
        }
    }

    pub fn edge(&self, id: EdgeId) -> PlanResult<&PlanEdge> {
        match self.edges.get(id.0) {
            Some(Some(e)) => Ok(e),
            _ => Err(StructuralError::UnknownEdge(id).into()),
        }
    }

    pub fn polygon(&self, id: PolygonId) -> PlanResult<&PlanPolygon> {
        match self.polygons.get(id.0) {
            Some(Some(p)) => Ok(p),
            _ => Err(StructuralError::UnknownPolygon(id).into()),
        }
    }

    /// Handles of all live polygons.
    pub fn polygon_ids(&self) -> impl Iterator<Item = PolygonId> + '_ {
        self.polygons
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|_| PolygonId(i)))
    }

    /// Number of live points across all polygons.
    pub fn live_points(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }

    /// Number of live edges across all polygons.
    pub fn live_edges(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// The edge, checked to belong to `poly`.
    pub(crate) fn owned_edge(&self, poly: PolygonId, e: EdgeId) -> PlanResult<&PlanEdge> {
        let edge = self.edge(e)?;
        if edge.polygon != poly {
            return Err(StructuralError::EdgeNotContained {
                edge: e,
                polygon: poly,
            }
            .into());
        }
        Ok(edge)
    }

    /// Geometry of an edge.
    pub fn segment(&self, e: EdgeId) -> PlanResult<Segment> {
        let edge = self.edge(e)?;
        Ok(self.seg(edge))
    }

    #[inline]
    pub(crate) fn seg(&self, edge: &PlanEdge) -> Segment {
        Segment::from_coords(self[edge.source].pos, self[edge.target].pos)
    }

    #[inline]
    pub(crate) fn pos(&self, p: PointId) -> Coord {
        self[p].pos
    }

    pub(crate) fn alloc_point(&mut self, pos: Coord) -> PointId {
        self.points.push(Some(PlanPoint::new(pos)));
        PointId(self.points.len() - 1)
    }

    pub(crate) fn alloc_edge(&mut self, edge: PlanEdge) -> EdgeId {
        self.edges.push(Some(edge));
        EdgeId(self.edges.len() - 1)
    }

    pub(crate) fn free_edge(&mut self, e: EdgeId) {
        if let Some(slot) = self.edges.get_mut(e.0) {
            *slot = None;
        }
    }

    pub(crate) fn free_point(&mut self, p: PointId) {
        if let Some(slot) = self.points.get_mut(p.0) {
            *slot = None;
        }
    }

    /// Free `p` if no edge references it and it is not a chain end of `poly`.
    pub(crate) fn release_if_orphan(&mut self, poly: PolygonId, p: PointId) {
        let detached = matches!(self.points.get(p.0), Some(Some(pt)) if pt.is_detached());
        let state = &self[poly];
        if detached && state.start != Some(p) && state.end != Some(p) {
            self.free_point(p);
        }
    }

    /// Full single-pass bounding-box recomputation.
    pub(crate) fn recompute_bounds(&mut self, poly: PolygonId) {
        let mut pts = self.point_iter(poly).map(|p| self.pos(p));
        let bounds = match pts.next() {
            None => Bounds::default(),
            Some(first) => pts.fold(Bounds::around(first), |mut b, p| {
                b.include(p);
                b
            }),
        };
        debug_assert!(bounds.width >= 0 && bounds.height >= 0);
        self[poly].bounds = bounds;
    }
}

/// # Panics
/// On a stale handle. Public fallible access goes through `Plan::point`.
impl Index<PointId> for Plan {
    type Output = PlanPoint;
    fn index(&self, id: PointId) -> &PlanPoint {
        match self.points.get(id.0) {
            Some(Some(p)) => p,
            _ => panic!("stale point handle {id:?}"),
        }
    }
}

impl IndexMut<PointId> for Plan {
    fn index_mut(&mut self, id: PointId) -> &mut PlanPoint {
        match self.points.get_mut(id.0) {
            Some(Some(p)) => p,
            _ => panic!("stale point handle {id:?}"),
        }
    }
}

impl Index<EdgeId> for Plan {
    type Output = PlanEdge;
    fn index(&self, id: EdgeId) -> &PlanEdge {
        match self.edges.get(id.0) {
            Some(Some(e)) => e,
            _ => panic!("stale edge handle {id:?}"),
        }
    }
}

impl IndexMut<EdgeId> for Plan {
    fn index_mut(&mut self, id: EdgeId) -> &mut PlanEdge {
        match self.edges.get_mut(id.0) {
            Some(Some(e)) => e,
            _ => panic!("stale edge handle {id:?}"),
        }
    }
}

impl Index<PolygonId> for Plan {
    type Output = PlanPolygon;
    fn index(&self, id: PolygonId) -> &PlanPolygon {
        match self.polygons.get(id.0) {
            Some(Some(p)) => p,
            _ => panic!("stale polygon handle {id:?}"),
        }
    }
}

impl IndexMut<PolygonId> for Plan {
    fn index_mut(&mut self, id: PolygonId) -> &mut PlanPolygon {
        match self.polygons.get_mut(id.0) {
            Some(Some(p)) => p,
            _ => panic!("stale polygon handle {id:?}"),
        }
    }
}
