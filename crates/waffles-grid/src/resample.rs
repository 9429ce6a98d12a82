//! Regrid a tile to a new cell size.

use crate::RasterTile;
use tracing::debug;

/// Bilinear resample of `tile` to the target increments.
///
/// The output covers the same region. Missing neighbors are dropped from
/// the interpolation and the remaining weights renormalized; a sample
/// with no valid neighbors is no-data.
pub fn resample(tile: &RasterTile, inc_x: f64, inc_y: f64) -> RasterTile {
    let mut out = RasterTile::new_nodata(*tile.region(), inc_x, inc_y, tile.nodata());
    let src_region = tile.region();

    for row in 0..out.rows() {
        for col in 0..out.cols() {
            let (x, y) = out.cell_center(row, col);
            // Fractional source cell coordinates of the sample point.
            let fx = (x - src_region.xmin) / tile.inc_x() - 0.5;
            let fy = (src_region.ymax - y) / tile.inc_y() - 0.5;
            let c0 = fx.floor();
            let r0 = fy.floor();
            let tx = fx - c0;
            let ty = fy - r0;

            let mut acc = 0f64;
            let mut weight = 0f64;
            for (dr, dc, w) in [
                (0.0, 0.0, (1.0 - tx) * (1.0 - ty)),
                (0.0, 1.0, tx * (1.0 - ty)),
                (1.0, 0.0, (1.0 - tx) * ty),
                (1.0, 1.0, tx * ty),
            ] {
                let sr = r0 + dr;
                let sc = c0 + dc;
                if sr < 0.0 || sc < 0.0 {
                    continue;
                }
                let (sr, sc) = (sr as usize, sc as usize);
                if sr >= tile.rows() || sc >= tile.cols() {
                    continue;
                }
                let v = tile.get(sr, sc);
                if tile.is_nodata(v) {
                    continue;
                }
                acc += f64::from(v) * w;
                weight += w;
            }
            if weight > 0.0 {
                out.set(row, col, (acc / weight) as f32);
            }
        }
    }
    debug!(
        from_cols = tile.cols(),
        to_cols = out.cols(),
        "resampled tile"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_NODATA;
    use approx::assert_relative_eq;
    use waffles_region::Region;

    #[test]
    fn test_constant_field_is_preserved() {
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let mut tile = RasterTile::new_nodata(region, 0.1, 0.1, DEFAULT_NODATA);
        tile.data_mut().fill(7.0);
        let out = resample(&tile, 0.05, 0.05);
        assert_eq!(out.cols(), 20);
        assert_eq!(out.rows(), 20);
        for &v in out.data() {
            assert_relative_eq!(v, 7.0);
        }
    }

    #[test]
    fn test_gradient_interpolates() {
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let mut tile = RasterTile::new_nodata(region, 0.1, 0.1, DEFAULT_NODATA);
        for row in 0..tile.rows() {
            for col in 0..tile.cols() {
                let (x, _) = tile.cell_center(row, col);
                tile.set(row, col, x as f32);
            }
        }
        let out = resample(&tile, 0.02, 0.02);
        // Away from the rim the resampled values track the gradient.
        let (row, col) = out.cell_at(0.5, 0.5).unwrap();
        assert_relative_eq!(out.get(row, col), 0.5, epsilon = 0.02);
    }

    #[test]
    fn test_all_nodata_stays_nodata() {
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let tile = RasterTile::new_nodata(region, 0.1, 0.1, DEFAULT_NODATA);
        let out = resample(&tile, 0.25, 0.25);
        assert!(out.is_all_nodata());
    }
}
