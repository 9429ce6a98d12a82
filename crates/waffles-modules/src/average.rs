//! Moving-average gridding.

use crate::common::{empty_tile, gather_points, PointIndex};
use crate::{GriddingModule, ModuleOptions, Result};
use waffles_datalist::ResolvedSource;
use waffles_grid::RasterTile;
use waffles_region::Region;

/// Weighted average of all samples within a search radius of each
/// cell center.
pub struct AverageModule;

const OPTION_KEYS: &[&str] = &["radius", "min_points"];

impl GriddingModule for AverageModule {
    fn name(&self) -> &'static str {
        "average"
    }

    fn describe(&self) -> &'static str {
        "moving-average gridding [radius=<dist>:min_points=<n>]"
    }

    fn validate(&self, opts: &ModuleOptions) -> Result<()> {
        opts.check_keys(self.name(), OPTION_KEYS)?;
        opts.get_f64(self.name(), "radius")?;
        opts.get_usize(self.name(), "min_points")?;
        Ok(())
    }

    fn generate(
        &self,
        sources: &[ResolvedSource],
        region: &Region,
        inc_x: f64,
        inc_y: f64,
        opts: &ModuleOptions,
    ) -> Result<RasterTile> {
        let radius = opts
            .get_f64(self.name(), "radius")?
            .unwrap_or_else(|| 2.0 * inc_x.max(inc_y));
        let min_points = opts.get_usize(self.name(), "min_points")?.unwrap_or(1);

        let points = gather_points(sources, region)?;
        let mut tile = empty_tile(region, inc_x, inc_y);
        if points.is_empty() {
            return Ok(tile);
        }

        let index = PointIndex::build(&points, region, inc_x, inc_y);
        for row in 0..tile.rows() {
            for col in 0..tile.cols() {
                let (x, y) = tile.cell_center(row, col);
                let mut zw = 0f64;
                let mut w = 0f64;
                let mut n = 0usize;
                index.for_each_within(x, y, radius, |p, _| {
                    zw += p.z * p.w;
                    w += p.w;
                    n += 1;
                });
                if n >= min_points && w > 0.0 {
                    tile.set(row, col, (zw / w) as f32);
                }
            }
        }
        Ok(tile)
    }
}
