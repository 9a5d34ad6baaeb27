//! Edge factories.
//!
//! Every polygon carries a shared factory that decides the `EdgeTag` of each
//! edge it creates (walls, doors, passages in the layers above). Split copies
//! share the factory of the polygon they came from.

use std::fmt;
use std::sync::Arc;

use crate::edge::EdgeTag;
use crate::point::Coord;

pub trait EdgeFactory: fmt::Debug + Send + Sync {
    /// Tag for a new edge `source → target`, or `None` if this factory cannot
    /// build one.
    fn make_edge(&self, source: Coord, target: Coord) -> Option<EdgeTag>;
}

pub type SharedEdgeFactory = Arc<dyn EdgeFactory>;

/// Produces plain edges only.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainEdges;

impl EdgeFactory for PlainEdges {
    #[inline]
    fn make_edge(&self, _source: Coord, _target: Coord) -> Option<EdgeTag> {
        Some(EdgeTag::PLAIN)
    }
}

/// Produces edges with one fixed tag.
#[derive(Clone, Copy, Debug)]
pub struct TaggedEdges(pub EdgeTag);

impl EdgeFactory for TaggedEdges {
    #[inline]
    fn make_edge(&self, _source: Coord, _target: Coord) -> Option<EdgeTag> {
        Some(self.0)
    }
}

#[inline]
pub fn plain() -> SharedEdgeFactory {
    Arc::new(PlainEdges)
}
