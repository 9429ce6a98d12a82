//! Nearest-neighbor gridding.

use crate::common::{empty_tile, gather_points, PointIndex};
use crate::{GriddingModule, ModuleOptions, Result};
use tracing::info;
use waffles_datalist::ResolvedSource;
use waffles_grid::RasterTile;
use waffles_region::Region;

/// Assign each cell the elevation of the closest sample within a
/// search radius. Cells with no sample in range stay no-data.
pub struct NearestModule;

const OPTION_KEYS: &[&str] = &["radius"];

impl GriddingModule for NearestModule {
    fn name(&self) -> &'static str {
        "nearest"
    }

    fn describe(&self) -> &'static str {
        "nearest-neighbor gridding [radius=<dist>]"
    }

    fn validate(&self, opts: &ModuleOptions) -> Result<()> {
        opts.check_keys(self.name(), OPTION_KEYS)?;
        opts.get_f64(self.name(), "radius")?;
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
        let points = gather_points(sources, region)?;
        let mut tile = empty_tile(region, inc_x, inc_y);
        if points.is_empty() {
            info!("no points in region, emitting empty grid");
            return Ok(tile);
        }

        let index = PointIndex::build(&points, region, inc_x, inc_y);
        for row in 0..tile.rows() {
            for col in 0..tile.cols() {
                let (x, y) = tile.cell_center(row, col);
                let mut best: Option<(f64, f64)> = None;
                // Ties go to the later-listed source.
                index.for_each_within(x, y, radius, |p, d| {
                    if best.map_or(true, |(bd, _)| d <= bd) {
                        best = Some((d, p.z));
                    }
                });
                if let Some((_, z)) = best {
                    tile.set(row, col, z as f32);
                }
            }
        }
        Ok(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::parse_module_spec;
    use approx::assert_relative_eq;
    use waffles_datalist::SourceFormat;

    fn xyz_source(dir: &std::path::Path, name: &str, body: &str, weight: f64) -> ResolvedSource {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        ResolvedSource {
            path,
            format: SourceFormat::Xyz,
            weight,
            region: None,
            metadata: Vec::new(),
        }
    }

    #[test]
    fn test_single_point_fills_one_cell() {
        let dir = tempfile::tempdir().unwrap();
        let src = xyz_source(dir.path(), "one.xyz", "0.55 0.55 -42.0\n", 1.0);
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let (_, opts) = parse_module_spec("nearest:radius=0.01").unwrap();
        let tile = NearestModule
            .generate(&[src], &region, 0.1, 0.1, &opts)
            .expect("generate");
        let (row, col) = tile.cell_at(0.55, 0.55).unwrap();
        assert_relative_eq!(tile.get(row, col), -42.0);
        let filled = tile.data().iter().filter(|&&v| !tile.is_nodata(v)).count();
        assert_eq!(filled, 1);
    }

    #[test]
    fn test_default_radius_spreads_to_neighbors() {
        let dir = tempfile::tempdir().unwrap();
        let src = xyz_source(dir.path(), "one.xyz", "0.55 0.55 -42.0\n", 1.0);
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let tile = NearestModule
            .generate(&[src], &region, 0.1, 0.1, &ModuleOptions::default())
            .expect("generate");
        let filled = tile.data().iter().filter(|&&v| !tile.is_nodata(v)).count();
        assert!(filled > 1);
    }

    #[test]
    fn test_empty_sources_empty_grid() {
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let tile = NearestModule
            .generate(&[], &region, 0.1, 0.1, &ModuleOptions::default())
            .expect("generate");
        assert!(tile.is_all_nodata());
    }

    #[test]
    fn test_rejects_unknown_option() {
        let (_, opts) = parse_module_spec("nearest:power=2").unwrap();
        assert!(NearestModule.validate(&opts).is_err());
    }
}
