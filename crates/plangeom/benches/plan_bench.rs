//! Criterion benchmarks for the plan kernel on sampled rooms.
//! Focus sizes: room sides in {4, 16, 64} raster cells.
//! Results: by default under target/criterion.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::Vector2;
use plangeom::prelude::*;

fn room_cfg(cells: i32, jitter: i32) -> RoomCfg {
    RoomCfg {
        min_cells: cells,
        max_cells: cells,
        chamfer_prob: 1.0,
        jitter,
        ..RoomCfg::default()
    }
}

fn build(points: &[Coord]) -> (Plan, PolygonId) {
    let mut plan = Plan::new();
    let poly = plan.new_polygon();
    plan.define_by_points(poly, points).unwrap();
    (plan, poly)
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    for &cells in &[4i32, 16, 64] {
        let tok = ReplayToken { seed: 42, index: cells as u64 };
        let outline = draw_room(room_cfg(cells, 0), tok);

        group.bench_with_input(BenchmarkId::new("define_by_points", cells), &outline, |b, pts| {
            b.iter(|| black_box(build(pts)))
        });

        group.bench_with_input(BenchmarkId::new("contains", cells), &outline, |b, pts| {
            let (plan, poly) = build(pts);
            let bounds = plan.bounds(poly).unwrap();
            let probe = Vector2::new(
                bounds.x_offset + bounds.width / 2 + 7,
                bounds.y_offset + bounds.height / 2 + 3,
            );
            b.iter(|| black_box(plan.contains(poly, probe).unwrap()))
        });

        let jittered = draw_room(room_cfg(cells, 150), tok);
        group.bench_with_input(BenchmarkId::new("rasterize", cells), &jittered, |b, pts| {
            b.iter_batched(
                || build(pts),
                |(mut plan, poly)| {
                    let _ = black_box(plan.rasterize(poly, RasterCfg::default()));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
