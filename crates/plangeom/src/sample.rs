//! Random room outlines (rectangles with cut corners + replay tokens).
//!
//! Purpose
//! - Deterministic polygon inputs for property tests, benches and the CLI
//!   demo. Outlines are simple and ready for `Plan::define_by_points`.
//!
//! Model
//! - Draw a rectangle of whole raster cells at a random cell offset.
//! - Each corner is cut by a diagonal with probability `chamfer_prob`; the cut
//!   spans `kx` cells along x and `ky` cells along y, both at most half the
//!   side minus one cell, so cuts on one side never meet.
//! - Optional jitter pushes every vertex up to `jitter` mm off the raster.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cfg::RasterCfg;
use crate::point::Coord;

/// Room sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct RoomCfg {
    /// Side lengths in raster cells, inclusive range. Clamped to at least 1.
    pub min_cells: i32,
    pub max_cells: i32,
    /// Probability that a corner is replaced by a diagonal cut.
    pub chamfer_prob: f64,
    /// Maximum vertex offset off the raster in mm; 0 keeps every vertex on it.
    pub jitter: i32,
    pub raster: RasterCfg,
}

impl Default for RoomCfg {
    fn default() -> Self {
        Self {
            min_cells: 3,
            max_cells: 20,
            chamfer_prob: 0.5,
            jitter: 0,
            raster: RasterCfg::default(),
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw one room outline. The first point is not repeated at the end.
pub fn draw_room(cfg: RoomCfg, tok: ReplayToken) -> Vec<Coord> {
    let mut rng = tok.to_std_rng();
    let r = cfg.raster.raster;
    let lo = cfg.min_cells.max(1);
    let hi = cfg.max_cells.max(lo);
    let (w, h) = (rng.gen_range(lo..=hi), rng.gen_range(lo..=hi));
    let origin = Vector2::new(rng.gen_range(0..=10) * r, rng.gen_range(0..=10) * r);

    // corner cuts in cells, (0, 0) when the corner stays square
    let (max_kx, max_ky) = ((w - 1) / 2, (h - 1) / 2);
    let p = cfg.chamfer_prob.clamp(0.0, 1.0);
    let cuts: Vec<(i32, i32)> = (0..4)
        .map(|_| {
            if max_kx > 0 && max_ky > 0 && rng.gen_bool(p) {
                (rng.gen_range(1..=max_kx), rng.gen_range(1..=max_ky))
            } else {
                (0, 0)
            }
        })
        .collect();

    let (wm, hm) = (w * r, h * r);
    let corners = [
        (Vector2::new(0, 0), Vector2::new(1, 1)),
        (Vector2::new(wm, 0), Vector2::new(-1, 1)),
        (Vector2::new(wm, hm), Vector2::new(-1, -1)),
        (Vector2::new(0, hm), Vector2::new(1, -1)),
    ];
    let mut pts: Vec<Coord> = Vec::with_capacity(8);
    for (i, (corner, inward)) in corners.into_iter().enumerate() {
        let (kx, ky) = cuts[i];
        if kx == 0 {
            pts.push(corner);
            continue;
        }
        let along_x = corner + Vector2::new(inward.x * kx * r, 0);
        let along_y = corner + Vector2::new(0, inward.y * ky * r);
        // walk order: (0,0)→(W,0) runs along x, so the y-side comes first at
        // corners 0 and 2
        if i % 2 == 0 {
            pts.push(along_y);
            pts.push(along_x);
        } else {
            pts.push(along_x);
            pts.push(along_y);
        }
    }

    let j = cfg.jitter.max(0);
    pts.into_iter()
        .map(|q| {
            let off = if j > 0 {
                Vector2::new(rng.gen_range(-j..=j), rng.gen_range(-j..=j))
            } else {
                Vector2::zeros()
            };
            q + origin + off
        })
        .collect()
}
