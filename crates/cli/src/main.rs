use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

use plangeom::prelude::*;

mod outline;
mod provenance;

use outline::OutlineDoc;
use provenance::{write_sidecar, Sidecar};

#[derive(Parser)]
#[command(name = "plangeom")]
#[command(about = "Inspect, test and rasterize building-plan outlines")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print bounds, area, counts and validation status as JSON
    Inspect {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = RasterCfg::default().raster)]
        raster: i32,
    },
    /// Rasterize the outline and write it with a provenance sidecar
    Rasterize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = RasterCfg::default().raster)]
        raster: i32,
    },
    /// Print whether the outline contains a point
    Contains {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, allow_hyphen_values = true)]
        y: i32,
        /// Points on the boundary count as outside
        #[arg(long)]
        strict: bool,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Inspect { input, raster } => {
            let report = inspect(&input, raster_cfg(raster)?)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Action::Rasterize { input, out, raster } => {
            rasterize(&input, &out, raster_cfg(raster)?)?;
        }
        Action::Contains { input, x, y, strict } => {
            println!("{}", contains(&input, Vec2::new(x, y), strict)?);
        }
        Action::Report => report()?,
    }
    Ok(())
}

fn raster_cfg(raster: i32) -> Result<RasterCfg> {
    ensure!(raster > 0, "raster must be positive, got {raster}");
    Ok(RasterCfg::with_raster(raster))
}

#[derive(Debug, Serialize)]
struct InspectReport {
    bounds: [i32; 4],
    area: i64,
    area_m2: f64,
    points: usize,
    edges: usize,
    closed: bool,
    /// `None` when the outline passes `check`, else the error message.
    invalid: Option<String>,
    not_rasterized: Option<String>,
}

fn inspect(input: &Path, cfg: RasterCfg) -> Result<InspectReport> {
    let (plan, poly) = OutlineDoc::read(input)?.build()?;
    let b = plan.bounds(poly)?;
    let report = InspectReport {
        bounds: [b.x_offset, b.y_offset, b.width, b.height],
        area: plan.area(poly)?,
        area_m2: plan.area_meter(poly)?,
        points: plan.point_count(poly)?,
        edges: plan.edge_count(poly)?,
        closed: plan.is_closed(poly)?,
        invalid: plan.check(poly, false, cfg).err().map(|e| e.to_string()),
        not_rasterized: plan.check_rasterized(poly, cfg).err().map(|e| e.to_string()),
    };
    tracing::info!(input = %input.display(), points = report.points, "inspect");
    Ok(report)
}

fn rasterize(input: &Path, out: &Path, cfg: RasterCfg) -> Result<PathBuf> {
    let (mut plan, poly) = OutlineDoc::read(input)?.build()?;
    let replaced = plan
        .rasterize(poly, cfg)
        .with_context(|| format!("rasterizing {}", input.display()))?;
    plan.check(poly, true, cfg).context("rasterized outline failed its check")?;
    OutlineDoc::from_coords(&plan.coords_of(poly)?).write(out)?;
    tracing::info!(
        input = %input.display(),
        out = %out.display(),
        replaced,
        edges = plan.edge_count(poly)?,
        "rasterize"
    );

    let sidecar = Sidecar::new(json!({ "raster": cfg.raster, "replaced": replaced })).with_input(input);
    write_sidecar(out, sidecar)
}

fn contains(input: &Path, p: Coord, strict: bool) -> Result<bool> {
    let (plan, poly) = OutlineDoc::read(input)?.build()?;
    let inside = if strict {
        plan.contains_strict(poly, p)?
    } else {
        plan.contains(poly, p)?
    };
    Ok(inside)
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "version": plangeom::VERSION,
        "raster": RasterCfg::default().raster,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
