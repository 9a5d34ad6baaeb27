//! Raster configuration and unit conversions.
//!
//! Plan coordinates are integer millimeters. Meter values are derived on demand
//! and rounded to three decimals, so they carry no more precision than the
//! stored millimeters.

/// Millimeters per meter.
pub const MM_PER_METER: i32 = 1000;

/// Raster configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterCfg {
    /// Grid spacing in millimeters.
    pub raster: i32,
}

impl Default for RasterCfg {
    fn default() -> Self {
        Self { raster: 400 }
    }
}

impl RasterCfg {
    #[inline]
    pub fn with_raster(raster: i32) -> Self {
        Self { raster }
    }

    /// Half a grid cell: the corner-route threshold of the rasterizer.
    #[inline]
    pub fn half(&self) -> i32 {
        self.raster / 2
    }

    /// Grid spacing in meters.
    #[inline]
    pub fn raster_meter(&self) -> f64 {
        to_meter(self.raster)
    }

    /// Snap toward zero onto the raster.
    #[inline]
    pub fn snap_down(&self, v: i32) -> i32 {
        (v / self.raster) * self.raster
    }

    /// Snap to the nearest raster line, halves rounding up.
    #[inline]
    pub fn snap_nearest(&self, v: i64) -> i64 {
        let r = self.raster as f64;
        round_half_up(v as f64 / r) * self.raster as i64
    }

    #[inline]
    pub fn on_raster(&self, v: i32) -> bool {
        v % self.raster == 0
    }
}

/// Round to the nearest integer with halves going toward positive infinity.
#[inline]
pub fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// Round to three decimals.
#[inline]
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[inline]
pub fn to_meter(mm: i32) -> f64 {
    round3(mm as f64 / MM_PER_METER as f64)
}

#[inline]
pub fn from_meter(m: f64) -> i32 {
    round_half_up(m * MM_PER_METER as f64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping() {
        let cfg = RasterCfg::default();
        assert_eq!(cfg.snap_down(799), 400);
        assert_eq!(cfg.snap_down(-799), -400);
        assert_eq!(cfg.snap_nearest(599), 400);
        assert_eq!(cfg.snap_nearest(600), 800);
        assert_eq!(cfg.snap_nearest(-600), -400);
        assert!(cfg.on_raster(-1200));
        assert!(!cfg.on_raster(1201));
        assert_eq!(cfg.half(), 200);
    }

    #[test]
    fn meter_conversion() {
        assert_eq!(to_meter(1234), 1.234);
        assert_eq!(to_meter(-400), -0.4);
        assert_eq!(from_meter(0.4), 400);
        assert_eq!(from_meter(-1.2), -1200);
        assert!((RasterCfg::default().raster_meter() - 0.4).abs() < 1e-12);
    }
}
