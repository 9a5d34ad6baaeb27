//! Grid rasterization of closed polygons.
//!
//! Purpose
//! - Move every vertex onto the raster and turn each diagonal edge into an
//!   axis-aligned staircase, so that downstream cellular models can map the
//!   polygon onto grid cells.
//!
//! Model
//! - A diagonal edge is walked from its lower-y endpoint. A signed permutation
//!   (`Transformation`) maps it into the first octant (`0 < dy <= dx`), where
//!   the staircase is built by stepping x one raster cell at a time. The
//!   transposed matrix maps the points back.
//! - At each step the exact crossing with the next raster column is snapped to
//!   the nearest raster line. When y changes, a corner is inserted either
//!   below-right or above-left of the diagonal, whichever the exact line stays
//!   closer to.
//! - Collinear middle points are dropped with a three-point window before the
//!   run replaces the edge.

use nalgebra::{Matrix2, Vector2};
use tracing::{debug, trace};

use crate::cfg::{round_half_up, RasterCfg};
use crate::edge::Segment;
use crate::error::{PlanResult, RasterViolation, StructuralError, ValidationError};
use crate::plan::{Plan, PolygonId};
use crate::point::Coord;

/// Elementary frame changes. All are symmetric signed permutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transformation {
    FlipXAxis,
    FlipYAxis,
    FlipMainDiagonal,
    Identity,
}

impl Transformation {
    pub fn matrix(self) -> Matrix2<i32> {
        match self {
            Transformation::FlipXAxis => Matrix2::new(1, 0, 0, -1),
            Transformation::FlipYAxis => Matrix2::new(-1, 0, 0, 1),
            Transformation::FlipMainDiagonal => Matrix2::new(0, 1, 1, 0),
            Transformation::Identity => Matrix2::identity(),
        }
    }
}

/// Forward matrix mapping the direction `p1 → p2` into the first octant.
///
/// `p1` and `p2` must differ in x.
pub fn transform_matrix(p1: Coord, p2: Coord) -> Matrix2<i32> {
    use Transformation::*;
    let (dx, dy) = (p2.x as i64 - p1.x as i64, p2.y as i64 - p1.y as i64);
    let rising = if dx > 0 { dy >= 0 } else { dy <= 0 };
    let steep = dy.abs() >= dx.abs();
    let (d, x, y) = (
        FlipMainDiagonal.matrix(),
        FlipXAxis.matrix(),
        FlipYAxis.matrix(),
    );
    match (dx > 0, rising, steep) {
        (true, true, true) => d,
        (true, true, false) => Identity.matrix(),
        (true, false, true) => d * x,
        (true, false, false) => x,
        (false, true, true) => d * x * y,
        (false, true, false) => y * x,
        (false, false, true) => d * y,
        (false, false, false) => y,
    }
}

/// Axis-aligned run from `p1` to `p2` approximating the diagonal between
/// them. Both endpoints must lie on the raster and differ in x and y.
///
/// The result starts with `p1`, ends with `p2`, alternates between
/// horizontal and vertical steps and has no collinear middle points.
pub fn staircase(p1: Coord, p2: Coord, cfg: RasterCfg) -> Vec<Coord> {
    let flip = p1.y >= p2.y;
    let (a, b) = if flip { (p2, p1) } else { (p1, p2) };
    let fwd = transform_matrix(a, b);
    let back = fwd.transpose();
    let (w1, w2) = (fwd * a, fwd * b);
    let m = (w2.y - w1.y) as f64 / (w2.x - w1.x) as f64;
    let raster = cfg.raster;
    let y_at = |x: i32| round_half_up(w1.y as f64 + (x - w1.x) as f64 * m);

    let mut work: Vec<Coord> = vec![w1];
    let mut x = w1.x + raster;
    while x <= w2.x + raster / 4 {
        let y = y_at(x);
        let next = Vector2::new(x, cfg.snap_nearest(y) as i32);
        let pred = work[work.len() - 1];
        if pred.y != next.y {
            let y_pred = y_at(x - raster);
            let jump = (next.y - pred.y).abs() > raster;
            let below = y_pred - pred.y as i64 + (y - y_pred) / 2 < cfg.half() as i64;
            let corner = if jump || below {
                Vector2::new(x, pred.y)
            } else {
                Vector2::new(x - raster, pred.y + raster)
            };
            work.push(corner);
        }
        work.push(next);
        x += raster;
    }
    debug_assert_eq!(work.last(), Some(&w2));

    let mut run: Vec<Coord> = work.into_iter().map(|w| back * w).collect();
    if flip {
        run.reverse();
    }
    drop_collinear(run)
}

/// Remove the middle of every axis-collinear triple, left to right.
fn drop_collinear(points: Vec<Coord>) -> Vec<Coord> {
    let mut out: Vec<Coord> = Vec::with_capacity(points.len());
    for p in points {
        if let [.., second_last, last] = out[..] {
            if (p.x == last.x && last.x == second_last.x) || (p.y == last.y && last.y == second_last.y) {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

impl Plan {
    /// Snap every vertex to the raster and replace each diagonal edge by a
    /// staircase. Returns the number of replaced edges.
    pub fn rasterize(&mut self, poly: PolygonId, cfg: RasterCfg) -> PlanResult<usize> {
        if !self.polygon(poly)?.is_closed() {
            return Err(StructuralError::RequiresClosed(poly).into());
        }
        let mut replaced = 0;
        for e in self.edges(poly)? {
            let (s, t) = self.endpoints(e)?;
            for p in [s, t] {
                let c = self.pos(p);
                self[p].pos = Vector2::new(cfg.snap_down(c.x), cfg.snap_down(c.y));
            }
            let (a, b) = self.coords(e);
            if a.x == b.x || a.y == b.y {
                continue;
            }
            let run = staircase(a, b, cfg);
            trace!(edge = e.0, ?run, "staircase");
            let created = self.replace_edge(poly, e, &run)?;
            debug!(
                polygon = poly.0,
                edge = %Segment::from_coords(a, b),
                edges = created.len(),
                "diagonal edge rasterized"
            );
            replaced += 1;
        }
        self.recompute_bounds(poly);
        Ok(replaced)
    }

    /// Every edge is horizontal or vertical and every endpoint lies on the
    /// raster.
    pub fn check_rasterized(&self, poly: PolygonId, cfg: RasterCfg) -> PlanResult<()> {
        self.polygon(poly)?;
        for e in self.edge_iter(poly) {
            let (a, b) = self.coords(e);
            let on_raster = [a.x, a.y, b.x, b.y].into_iter().all(|v| cfg.on_raster(v));
            let reason = if !on_raster {
                RasterViolation::PointNotOnRaster
            } else if a.x != b.x && a.y != b.y {
                RasterViolation::Diagonal
            } else {
                continue;
            };
            return Err(ValidationError::PolygonNotRasterized {
                polygon: poly,
                edge: Segment::from_coords(a, b).to_string(),
                reason,
            }
            .into());
        }
        Ok(())
    }

    /// The polygon is closed and, if `rasterized` is set, passes
    /// `check_rasterized`.
    pub fn check(&self, poly: PolygonId, rasterized: bool, cfg: RasterCfg) -> PlanResult<()> {
        if !self.polygon(poly)?.is_closed() {
            return Err(ValidationError::PolygonNotClosed {
                polygon: poly,
                outline: self.coordinate_string(poly),
            }
            .into());
        }
        if rasterized {
            self.check_rasterized(poly, cfg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn axis_aligned(run: &[Coord]) -> bool {
        run.windows(2).all(|w| w[0].x == w[1].x || w[0].y == w[1].y)
    }

    #[test]
    fn matrices_map_into_first_octant() {
        let o = vector![0, 0];
        for p in [
            vector![1200, 400],
            vector![400, 1200],
            vector![-1200, 400],
            vector![-400, 1200],
            vector![1200, -400],
            vector![400, -1200],
            vector![-1200, -400],
            vector![-400, -1200],
        ] {
            let m = transform_matrix(o, p);
            let w = m * p;
            assert!(w.x > 0 && w.y >= 0 && w.y <= w.x, "{p:?} -> {w:?}");
            assert_eq!(m.transpose() * w, p);
        }
    }

    #[test]
    fn unit_diagonal_turns_once() {
        let run = staircase(vector![0, 0], vector![400, 400], RasterCfg::default());
        assert_eq!(run, vec![vector![0, 0], vector![400, 0], vector![400, 400]]);
    }

    #[test]
    fn staircase_keeps_endpoints_in_call_order() {
        let cfg = RasterCfg::default();
        for (a, b) in [
            (vector![0, 0], vector![2000, 800]),
            (vector![2000, 800], vector![0, 0]),
            (vector![0, 0], vector![-800, 2400]),
            (vector![400, -400], vector![-1600, 1200]),
        ] {
            let run = staircase(a, b, cfg);
            assert_eq!(run.first(), Some(&a));
            assert_eq!(run.last(), Some(&b));
            assert!(run.len() >= 3);
            assert!(axis_aligned(&run), "{run:?}");
            assert!(run.iter().all(|p| cfg.on_raster(p.x) && cfg.on_raster(p.y)));
        }
    }

    #[test]
    fn shallow_edge_follows_the_line() {
        let run = staircase(vector![0, 0], vector![2000, 800], RasterCfg::default());
        assert_eq!(
            run,
            vec![
                vector![0, 0],
                vector![400, 0],
                vector![400, 400],
                vector![1600, 400],
                vector![1600, 800],
                vector![2000, 800],
            ]
        );
    }

    #[test]
    fn collinear_points_are_dropped() {
        let pts = vec![vector![0, 0], vector![400, 0], vector![800, 0], vector![800, 400]];
        assert_eq!(drop_collinear(pts), vec![vector![0, 0], vector![800, 0], vector![800, 400]]);
    }
}
