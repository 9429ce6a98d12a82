//! Rectangular geographic extent.

use crate::{RegionError, Result};
use serde::{Deserialize, Serialize};

/// A rectangular geographic extent: `xmin/xmax/ymin/ymax`.
///
/// Regions are immutable value types; every derived region
/// (buffered, extended, intersected) is a new instance. The horizontal
/// reference (EPSG code) is carried separately in the run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// West bound.
    pub xmin: f64,
    /// East bound.
    pub xmax: f64,
    /// South bound.
    pub ymin: f64,
    /// North bound.
    pub ymax: f64,
}

impl Region {
    /// Create a region, validating that the bounds are finite and non-degenerate.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        let finite =
            xmin.is_finite() && xmax.is_finite() && ymin.is_finite() && ymax.is_finite();
        if !finite || xmin >= xmax || ymin >= ymax {
            return Err(RegionError::InvalidRegion {
                xmin,
                xmax,
                ymin,
                ymax,
            });
        }
        Ok(Region {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Parse a GMT-style region string: `xmin/xmax/ymin/ymax`.
    pub fn parse(spec: &str) -> Result<Self> {
        let parts: Vec<&str> = spec.trim().split('/').collect();
        if parts.len() != 4 {
            return Err(RegionError::UnparsableRegion(spec.to_string()));
        }
        let mut vals = [0f64; 4];
        for (i, p) in parts.iter().enumerate() {
            vals[i] = p
                .trim()
                .parse()
                .map_err(|_| RegionError::UnparsableRegion(spec.to_string()))?;
        }
        Region::new(vals[0], vals[1], vals[2], vals[3])
    }

    /// Grow each side of the region by a raw value.
    ///
    /// Negative values shrink the region; the result is not re-validated,
    /// callers shrinking a region are expected to keep it non-degenerate.
    pub fn buffer(&self, value: f64) -> Region {
        Region {
            xmin: self.xmin - value,
            xmax: self.xmax + value,
            ymin: self.ymin - value,
            ymax: self.ymax + value,
        }
    }

    /// Grow each side of the region by `cells * inc`.
    pub fn extend(&self, cells: u32, inc: f64) -> Region {
        self.buffer(f64::from(cells) * inc)
    }

    /// Grow the x sides by `x_cells * inc_x` and the y sides by `y_cells * inc_y`.
    pub fn extend_xy(&self, x_cells: u32, y_cells: u32, inc_x: f64, inc_y: f64) -> Region {
        Region {
            xmin: self.xmin - f64::from(x_cells) * inc_x,
            xmax: self.xmax + f64::from(x_cells) * inc_x,
            ymin: self.ymin - f64::from(y_cells) * inc_y,
            ymax: self.ymax + f64::from(y_cells) * inc_y,
        }
    }

    /// Rectangle overlap test with inclusive edges.
    pub fn intersects(&self, other: &Region) -> bool {
        self.xmin <= other.xmax
            && self.xmax >= other.xmin
            && self.ymin <= other.ymax
            && self.ymax >= other.ymin
    }

    /// Inclusive point-in-region test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Intersection of two regions, if any.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        let xmin = self.xmin.max(other.xmin);
        let xmax = self.xmax.min(other.xmax);
        let ymin = self.ymin.max(other.ymin);
        let ymax = self.ymax.min(other.ymax);
        Region::new(xmin, xmax, ymin, ymax).ok()
    }

    /// Smallest region covering both inputs.
    pub fn union(&self, other: &Region) -> Region {
        Region {
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// Cell counts `(cols, rows)` for the given increments.
    pub fn dimensions(&self, inc_x: f64, inc_y: f64) -> (usize, usize) {
        let cols = ((self.xmax - self.xmin) / inc_x + 0.5).floor() as usize;
        let rows = ((self.ymax - self.ymin) / inc_y + 0.5).floor() as usize;
        (cols.max(1), rows.max(1))
    }

    /// GDAL-order geotransform for this region at the given increments:
    /// `[xmin, inc_x, 0, ymax, 0, -inc_y]`.
    pub fn geo_transform(&self, inc_x: f64, inc_y: f64) -> [f64; 6] {
        [self.xmin, inc_x, 0.0, self.ymax, 0.0, -inc_y]
    }

    /// Format the region GMT-style: `-Rxmin/xmax/ymin/ymax`.
    pub fn format_gmt(&self) -> String {
        format!(
            "-R{:.10}/{:.10}/{:.10}/{:.10}",
            self.xmin, self.xmax, self.ymin, self.ymax
        )
    }

    /// A filename-safe fragment naming the northwest corner, e.g. `n30x00w090x00`.
    pub fn name_fragment(&self) -> String {
        let ns = if self.ymax >= 0.0 { 'n' } else { 's' };
        let ew = if self.xmin >= 0.0 { 'e' } else { 'w' };
        let lat = self.ymax.abs();
        let lon = self.xmin.abs();
        format!(
            "{}{:02}x{:02}{}{:03}x{:02}",
            ns,
            lat.trunc() as u32,
            (lat.fract() * 100.0).round() as u32,
            ew,
            lon.trunc() as u32,
            (lon.fract() * 100.0).round() as u32
        )
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.xmin, self.xmax, self.ymin, self.ymax
        )
    }
}
