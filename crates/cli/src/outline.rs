use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use plangeom::prelude::*;

/// Outline document: `{"points": [[x, y], ...]}` in millimeters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineDoc {
    pub points: Vec<[i32; 2]>,
}

impl OutlineDoc {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let doc: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing outline {}", path.display()))?;
        ensure!(!doc.points.is_empty(), "{} has no points", path.display());
        Ok(doc)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))
    }

    pub fn coords(&self) -> Vec<Coord> {
        self.points.iter().map(|&[x, y]| Vec2::new(x, y)).collect()
    }

    pub fn from_coords(points: &[Coord]) -> Self {
        Self {
            points: points.iter().map(|p| [p.x, p.y]).collect(),
        }
    }

    /// Build a one-polygon plan from the outline.
    pub fn build(&self) -> Result<(Plan, PolygonId)> {
        let mut plan = Plan::new();
        let poly = plan.new_polygon();
        plan.define_by_points(poly, &self.coords())
            .context("building polygon from outline")?;
        Ok((plan, poly))
    }
}
