//! Plan points: integer millimeter vertices with chain back-links.
//!
//! A point knows at most one outgoing (`next_edge`) and one incoming
//! (`prev_edge`) edge. Identity is the `PointId`; `matches` compares
//! coordinates only. Two different points of the same chain may match without
//! being the same vertex.

use std::fmt;

use nalgebra::Vector2;

use crate::cfg::to_meter;
use crate::edge::EdgeId;
use crate::error::StructuralError;

/// Plan coordinate in millimeters.
pub type Coord = Vector2<i32>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanPoint {
    pub(crate) pos: Coord,
    pub(crate) next_edge: Option<EdgeId>,
    pub(crate) prev_edge: Option<EdgeId>,
}

impl PlanPoint {
    #[inline]
    pub fn new(pos: Coord) -> Self {
        Self {
            pos,
            next_edge: None,
            prev_edge: None,
        }
    }

    #[inline]
    pub fn pos(&self) -> Coord {
        self.pos
    }
    #[inline]
    pub fn x(&self) -> i32 {
        self.pos.x
    }
    #[inline]
    pub fn y(&self) -> i32 {
        self.pos.y
    }
    #[inline]
    pub fn x_meter(&self) -> f64 {
        to_meter(self.pos.x)
    }
    #[inline]
    pub fn y_meter(&self) -> f64 {
        to_meter(self.pos.y)
    }

    #[inline]
    pub fn next_edge(&self) -> Option<EdgeId> {
        self.next_edge
    }
    #[inline]
    pub fn prev_edge(&self) -> Option<EdgeId> {
        self.prev_edge
    }

    /// True if the point has no incident edge.
    #[inline]
    pub fn is_detached(&self) -> bool {
        self.next_edge.is_none() && self.prev_edge.is_none()
    }

    /// Coordinate equality.
    #[inline]
    pub fn matches(&self, other: Coord) -> bool {
        self.pos == other
    }

    /// The incident edge that is not `e`.
    ///
    /// Returns `Ok(None)` when `e` is incident but the other slot is empty.
    pub fn other_edge(&self, e: EdgeId) -> Result<Option<EdgeId>, StructuralError> {
        if self.next_edge == Some(e) {
            Ok(self.prev_edge)
        } else if self.prev_edge == Some(e) {
            Ok(self.next_edge)
        } else {
            Err(StructuralError::NotIncident(e))
        }
    }
}

impl fmt::Display for PlanPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.pos.x, self.pos.y)
    }
}

/// Widen a plan coordinate for predicate arithmetic.
#[inline]
pub fn widen(c: Coord) -> Vector2<i64> {
    c.cast::<i64>()
}

/// Sign of the turn `p → q → r` measured at `q`: `sign((r−q) × (p−q))`.
///
/// Exact for any `i64` input that came from `i32` coordinates.
#[inline]
pub fn orientation(p: Vector2<i64>, q: Vector2<i64>, r: Vector2<i64>) -> i32 {
    let u = p - q;
    let v = r - q;
    let det = v.x as i128 * u.y as i128 - v.y as i128 * u.x as i128;
    det.signum() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn orientation_signs() {
        let q = vector![0i64, 0];
        // p on +x, r on +y: counterclockwise seen from q.
        assert_eq!(orientation(vector![1, 0], q, vector![0, 1]), -1);
        assert_eq!(orientation(vector![0, 1], q, vector![1, 0]), 1);
        assert_eq!(orientation(vector![2, 2], q, vector![-3, -3]), 0);
    }

    #[test]
    fn orientation_extreme_coordinates() {
        let big = i32::MAX as i64;
        let small = i32::MIN as i64;
        let p = vector![big, big];
        let q = vector![small, small];
        let r = vector![big, small];
        assert_ne!(orientation(p, q, r), 0);
        assert_eq!(orientation(p, q, vector![0, 0]), orientation(p, q, vector![-1, -1]));
    }

    #[test]
    fn other_edge_follows_slots() {
        let mut p = PlanPoint::new(vector![400, 800]);
        p.next_edge = Some(EdgeId(1));
        p.prev_edge = Some(EdgeId(0));
        assert_eq!(p.other_edge(EdgeId(1)), Ok(Some(EdgeId(0))));
        assert_eq!(p.other_edge(EdgeId(0)), Ok(Some(EdgeId(1))));
        assert_eq!(
            p.other_edge(EdgeId(7)),
            Err(StructuralError::NotIncident(EdgeId(7)))
        );
        p.prev_edge = None;
        assert_eq!(p.other_edge(EdgeId(1)), Ok(None));
    }

    #[test]
    fn meters_and_display() {
        let p = PlanPoint::new(vector![1250, -400]);
        assert_eq!(p.x_meter(), 1.25);
        assert_eq!(p.y_meter(), -0.4);
        assert_eq!(p.to_string(), "(1250,-400)");
        assert!(p.matches(vector![1250, -400]));
        assert!(p.is_detached());
    }
}
