//! Uninterpolated cell statistics ("num" gridding).

use crate::common::{empty_tile, gather_points};
use crate::{GriddingModule, ModuleError, ModuleOptions, Result};
use waffles_datalist::ResolvedSource;
use waffles_grid::RasterTile;
use waffles_region::Region;

/// Per-cell statistic, no interpolation between cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statistic {
    /// Count of samples per cell.
    Count,
    /// Weighted mean of samples per cell.
    Mean,
    /// Data mask: 1 where any sample fell, no-data elsewhere.
    Mask,
}

/// Block each cell to a statistic of the samples that fall in it.
///
/// Cells receiving no samples stay no-data. The mean is weighted by
/// the effective source weights.
pub struct NumModule;

const OPTION_KEYS: &[&str] = &["mode"];

fn parse_mode(opts: &ModuleOptions) -> Result<Statistic> {
    match opts.get("mode").unwrap_or("n") {
        "n" => Ok(Statistic::Count),
        "m" => Ok(Statistic::Mean),
        "k" => Ok(Statistic::Mask),
        other => Err(ModuleError::InvalidOption {
            module: "num".to_string(),
            reason: format!("mode: expected n, m or k, got {other:?}"),
        }),
    }
}

impl GriddingModule for NumModule {
    fn name(&self) -> &'static str {
        "num"
    }

    fn describe(&self) -> &'static str {
        "uninterpolated cell statistics [mode=n|m|k]"
    }

    fn validate(&self, opts: &ModuleOptions) -> Result<()> {
        opts.check_keys(self.name(), OPTION_KEYS)?;
        parse_mode(opts)?;
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
        let mode = parse_mode(opts)?;
        let points = gather_points(sources, region)?;
        let mut tile = empty_tile(region, inc_x, inc_y);

        let cells = tile.rows() * tile.cols();
        let mut count = vec![0u32; cells];
        let mut zw_sum = vec![0f64; cells];
        let mut w_sum = vec![0f64; cells];
        for p in &points {
            if let Some((row, col)) = tile.cell_at(p.x, p.y) {
                let idx = row * tile.cols() + col;
                count[idx] += 1;
                zw_sum[idx] += p.z * p.w;
                w_sum[idx] += p.w;
            }
        }

        for idx in 0..cells {
            if count[idx] == 0 {
                continue;
            }
            let value = match mode {
                Statistic::Count => count[idx] as f32,
                Statistic::Mean => (zw_sum[idx] / w_sum[idx]) as f32,
                Statistic::Mask => 1.0,
            };
            tile.data_mut()[idx] = value;
        }
        Ok(tile)
    }
}
