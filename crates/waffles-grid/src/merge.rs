//! Mosaic per-chunk tiles into one region-covering raster.

use crate::RasterTile;
use tracing::debug;
use waffles_region::{Chunk, Region};

/// Merge chunk tiles into a single raster covering `region`.
///
/// Each tile is trimmed back to its chunk's non-overlap interior before
/// merging, so chunk margins contribute only to algorithm input and
/// never double-write the output. Cells untouched by any tile stay at
/// the no-data value, so an all-nodata input set yields an all-nodata
/// mosaic of the exact target shape.
pub fn merge(
    tiles: &[(Chunk, RasterTile)],
    region: &Region,
    inc_x: f64,
    inc_y: f64,
    nodata: f32,
) -> RasterTile {
    let mut out = RasterTile::new_nodata(*region, inc_x, inc_y, nodata);
    for (chunk, tile) in tiles {
        let interior = &chunk.interior;
        for row in 0..tile.rows() {
            for col in 0..tile.cols() {
                let value = tile.get(row, col);
                if tile.is_nodata(value) {
                    continue;
                }
                let (x, y) = tile.cell_center(row, col);
                // Half-open interior test keeps shared chunk edges from
                // writing twice.
                if x < interior.xmin || x >= interior.xmax || y < interior.ymin
                    || y >= interior.ymax
                {
                    continue;
                }
                if let Some((or, oc)) = out.cell_at(x, y) {
                    out.set(or, oc, value);
                }
            }
        }
    }
    debug!(
        tiles = tiles.len(),
        cols = out.cols(),
        rows = out.rows(),
        "merged chunk tiles"
    );
    out
}
