//! Rasterize a few sampled rooms and print the outlines before and after.
//!
//! Usage:
//!   cargo run -p plangeom --example rasterize_room -- [count] [seed]

use plangeom::prelude::*;

fn main() {
    let mut args = std::env::args().skip(1);
    let count: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(2025);
    let cfg = RoomCfg {
        jitter: 120,
        ..RoomCfg::default()
    };

    let mut plan = Plan::new();
    for index in 0..count {
        let poly = plan.new_polygon();
        let outline = draw_room(cfg, ReplayToken { seed, index });
        if let Err(e) = plan.define_by_points(poly, &outline) {
            eprintln!("room {index}: {e}");
            continue;
        }
        println!("room {index} before: {}", plan.coordinate_string(poly));
        match plan.rasterize(poly, cfg.raster) {
            Ok(n) => println!(
                "room {index} after ({n} diagonals, {} edges): {}",
                plan.edge_count(poly).unwrap_or(0),
                plan.coordinate_string(poly)
            ),
            Err(e) => eprintln!("room {index}: {e}"),
        }
    }
}
