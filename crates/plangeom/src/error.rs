//! Error types for chain edits and validation.
//!
//! - `StructuralError`: an edit that would break the chain topology. Always
//!   detected before the first write, so the plan is unchanged afterwards.
//! - `ValidationError`: produced only by `check` / `check_rasterized`, meant for
//!   the editing layer to report to the user.
//! - `PlanError::Internal`: the edge factory refused to build an edge. Signals a
//!   wiring defect, not a user mistake.

use thiserror::Error;

use crate::edge::EdgeId;
use crate::plan::PolygonId;
use crate::point::PointId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("polygon {0:?} is closed, no edge can be added")]
    AddToClosedPolygon(PolygonId),

    #[error("edge ({sx},{sy})-({tx},{ty}) fits neither start nor end of the polygon")]
    CoordinateMismatch { sx: i32, sy: i32, tx: i32, ty: i32 },

    #[error("unknown point handle {0:?}")]
    UnknownPoint(PointId),

    #[error("unknown edge handle {0:?}")]
    UnknownEdge(EdgeId),

    #[error("unknown polygon handle {0:?}")]
    UnknownPolygon(PolygonId),

    #[error("edge {edge:?} does not belong to polygon {polygon:?}")]
    EdgeNotContained { edge: EdgeId, polygon: PolygonId },

    #[error("combining would leave {remaining} edges, at least {min} are required")]
    NotEnoughEdges { remaining: usize, min: usize },

    #[error("insufficient points: expected at least {expected}, got {actual}")]
    NotEnoughPoints { expected: usize, actual: usize },

    #[error("edges {0:?} and {1:?} do not share a point")]
    NoConsecutiveEdges(EdgeId, EdgeId),

    #[error("operation requires a closed polygon")]
    RequiresClosed(PolygonId),

    #[error("operation requires an open polygon")]
    RequiresOpen(PolygonId),

    #[error("edges {0:?} and {1:?} are adjacent or identical")]
    AdjacentEdges(EdgeId, EdgeId),

    #[error("polygon {0:?} already has edges")]
    PolygonNotEmpty(PolygonId),

    #[error("polygon {0:?} has no edges")]
    EmptyPolygon(PolygonId),

    #[error("point {index} closes the polygon before the list ends")]
    PrematureClose { index: usize },

    #[error("replacement points do not start and end at the endpoints of the replaced edge")]
    ReplacementEndpointsMismatch,

    #[error("subsequent points at index {index} are equal")]
    SubsequentPointsEqual { index: usize },

    #[error("point {0:?} is already connected to another edge")]
    PointsAlreadyConnected(PointId),

    #[error("edge {0:?} is not incident to the given point or edge")]
    NotIncident(EdgeId),

    #[error("new point equals the start point of the polygon")]
    SameAsStart,

    #[error("new point equals the end point of the polygon")]
    SameAsEnd,

    #[error("edge {0:?} is neither the first nor the last edge of an open polygon")]
    EdgeNotFirstOrLast(EdgeId),

    #[error("both points are equal")]
    EqualPoints,

    #[error("no edge connects the given points")]
    EdgeNotFound,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("polygon {polygon:?} is not closed: {outline}")]
    PolygonNotClosed { polygon: PolygonId, outline: String },

    #[error("polygon {polygon:?} is not rasterized at edge {edge}: {reason}")]
    PolygonNotRasterized {
        polygon: PolygonId,
        edge: String,
        reason: RasterViolation,
    },
}

/// Why an edge failed the raster check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterViolation {
    PointNotOnRaster,
    Diagonal,
}

impl std::fmt::Display for RasterViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterViolation::PointNotOnRaster => f.write_str("point not on raster"),
            RasterViolation::Diagonal => f.write_str("edge is neither horizontal nor vertical"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type PlanResult<T> = Result<T, PlanError>;

impl PlanError {
    /// The structural cause, if any. Handy in tests and callers that only
    /// recover from topology mistakes.
    pub fn as_structural(&self) -> Option<&StructuralError> {
        match self {
            PlanError::Structural(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_polygon() {
        let e: PlanError = ValidationError::PolygonNotClosed {
            polygon: PolygonId(3),
            outline: "[(0,0),(400,0)]".into(),
        }
        .into();
        let msg = e.to_string();
        assert!(msg.contains("PolygonId(3)"), "{msg}");
        assert!(msg.contains("[(0,0),(400,0)]"), "{msg}");
    }

    #[test]
    fn structural_helper() {
        let e: PlanError = StructuralError::EqualPoints.into();
        assert_eq!(e.as_structural(), Some(&StructuralError::EqualPoints));
        assert_eq!(PlanError::Internal("x".into()).as_structural(), None);
    }

    #[test]
    fn subsequent_points_message() {
        let e = StructuralError::SubsequentPointsEqual { index: 2 };
        assert_eq!(e.to_string(), "subsequent points at index 2 are equal");
    }
}
