//! Inverse-distance weighted gridding.

use crate::common::{empty_tile, gather_points, PointIndex};
use crate::{GriddingModule, ModuleOptions, Result};
use waffles_datalist::ResolvedSource;
use waffles_grid::RasterTile;
use waffles_region::Region;

/// Inverse-distance weighting over a search radius.
///
/// A sample sitting exactly on a cell center (within the smoothing
/// offset) contributes its value directly.
pub struct InvDstModule;

const OPTION_KEYS: &[&str] = &["power", "radius", "min_points", "smoothing"];

impl GriddingModule for InvDstModule {
    fn name(&self) -> &'static str {
        "invdst"
    }

    fn describe(&self) -> &'static str {
        "inverse-distance gridding [power=<p>:radius=<dist>:min_points=<n>:smoothing=<s>]"
    }

    fn validate(&self, opts: &ModuleOptions) -> Result<()> {
        opts.check_keys(self.name(), OPTION_KEYS)?;
        opts.get_f64(self.name(), "power")?;
        opts.get_f64(self.name(), "radius")?;
        opts.get_usize(self.name(), "min_points")?;
        opts.get_f64(self.name(), "smoothing")?;
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
        let power = opts.get_f64(self.name(), "power")?.unwrap_or(2.0);
        let radius = opts
            .get_f64(self.name(), "radius")?
            .unwrap_or_else(|| 2.0 * inc_x.max(inc_y));
        let min_points = opts.get_usize(self.name(), "min_points")?.unwrap_or(1);
        let smoothing = opts.get_f64(self.name(), "smoothing")?.unwrap_or(0.0);

        let points = gather_points(sources, region)?;
        let mut tile = empty_tile(region, inc_x, inc_y);
        if points.is_empty() {
            return Ok(tile);
        }

        let index = PointIndex::build(&points, region, inc_x, inc_y);
        for row in 0..tile.rows() {
            for col in 0..tile.cols() {
                let (x, y) = tile.cell_center(row, col);
                let mut num = 0f64;
                let mut den = 0f64;
                let mut n = 0usize;
                let mut exact: Option<f64> = None;
                index.for_each_within(x, y, radius, |p, d| {
                    let d = d + smoothing;
                    if d <= f64::EPSILON {
                        exact = Some(p.z);
                        return;
                    }
                    let w = p.w / d.powf(power);
                    num += w * p.z;
                    den += w;
                    n += 1;
                });
                if let Some(z) = exact {
                    tile.set(row, col, z as f32);
                } else if n >= min_points && den > 0.0 {
                    tile.set(row, col, (num / den) as f32);
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

    fn source(dir: &std::path::Path, body: &str) -> ResolvedSource {
        let path = dir.join("pts.xyz");
        std::fs::write(&path, body).unwrap();
        ResolvedSource {
            path,
            format: SourceFormat::Xyz,
            weight: 1.0,
            region: None,
            metadata: Vec::new(),
        }
    }

    #[test]
    fn test_exact_point_on_cell_center() {
        let dir = tempfile::tempdir().unwrap();
        // 0.55/0.55 is a cell center on a 0.1 lattice over the unit square.
        let src = source(dir.path(), "0.55 0.55 -7.0\n");
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let tile = InvDstModule
            .generate(&[src], &region, 0.1, 0.1, &ModuleOptions::default())
            .expect("generate");
        let (row, col) = tile.cell_at(0.55, 0.55).unwrap();
        assert_relative_eq!(tile.get(row, col), -7.0);
    }

    #[test]
    fn test_interpolated_value_between_samples() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path(), "0.50 0.55 -10.0\n0.60 0.55 -20.0\n");
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let (_, opts) = parse_module_spec("invdst:radius=0.08").unwrap();
        let tile = InvDstModule
            .generate(&[src], &region, 0.1, 0.1, &opts)
            .expect("generate");
        // Cell center 0.55/0.55 is equidistant to both samples.
        let (row, col) = tile.cell_at(0.55, 0.55).unwrap();
        assert_relative_eq!(tile.get(row, col), -15.0, epsilon = 1e-4);
    }

    #[test]
    fn test_min_points_holds_back_sparse_cells() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path(), "0.51 0.55 -10.0\n");
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let (_, opts) = parse_module_spec("invdst:min_points=2:radius=0.05").unwrap();
        let tile = InvDstModule
            .generate(&[src], &region, 0.1, 0.1, &opts)
            .expect("generate");
        assert!(tile.is_all_nodata());
    }

    #[test]
    fn test_empty_sources() {
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let tile = InvDstModule
            .generate(&[], &region, 0.1, 0.1, &ModuleOptions::default())
            .expect("generate");
        assert!(tile.is_all_nodata());
    }
}
