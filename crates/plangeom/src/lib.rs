//! Polygon kernel of a building-plan editor.
//!
//! Every room and area boundary is an editable chain of integer-millimeter
//! segments stored in a `Plan` arena. The crate provides the chain topology
//! under incremental edits, exact segment predicates, point and polygon
//! containment, structural surgery (combine, split, replace) and grid
//! rasterization.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.
//! - Handles (`PointId`, `EdgeId`, `PolygonId`) are plain indices; they stay
//!   unique for the lifetime of a `Plan`.

pub mod cfg;
pub mod edge;
pub mod error;
pub mod factory;
pub mod plan;
pub mod point;
pub mod raster;
pub mod sample;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::RasterCfg;
pub use error::{PlanError, PlanResult, StructuralError, ValidationError};
pub use plan::{Plan, PolygonId};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::{from_meter, to_meter, RasterCfg};
    pub use crate::edge::{intersects, EdgeId, EdgeTag, LineIntersection, Segment};
    pub use crate::error::{PlanError, PlanResult, RasterViolation, StructuralError, ValidationError};
    pub use crate::factory::{EdgeFactory, PlainEdges, SharedEdgeFactory, TaggedEdges};
    pub use crate::plan::{Bounds, Plan, PolygonId, RelativePosition};
    pub use crate::point::{orientation, Coord, PointId};
    pub use crate::raster::{staircase, Transformation};
    pub use crate::sample::{draw_room, ReplayToken, RoomCfg};
    pub use nalgebra::Vector2 as Vec2;
}
