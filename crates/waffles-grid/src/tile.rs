//! In-memory raster tile.

use crate::{GridError, Result};
use waffles_region::Region;

/// Default no-data value used throughout the pipeline.
pub const DEFAULT_NODATA: f32 = -9999.0;

/// A single raster tile: a cell grid with its geographic extent.
///
/// Data is row-major, row 0 at the northern edge (GDAL convention).
/// A tile is produced by one gridding-module invocation and later
/// mutated in place by the compositor (filter/clip) before writing.
#[derive(Debug, Clone)]
pub struct RasterTile {
    region: Region,
    inc_x: f64,
    inc_y: f64,
    nodata: f32,
    cols: usize,
    rows: usize,
    data: Vec<f32>,
}

impl RasterTile {
    /// Create a tile covering `region` filled with the no-data value.
    pub fn new_nodata(region: Region, inc_x: f64, inc_y: f64, nodata: f32) -> Self {
        let (cols, rows) = region.dimensions(inc_x, inc_y);
        RasterTile {
            region,
            inc_x,
            inc_y,
            nodata,
            cols,
            rows,
            data: vec![nodata; cols * rows],
        }
    }

    /// Create a tile from existing row-major data.
    pub fn from_data(
        region: Region,
        inc_x: f64,
        inc_y: f64,
        nodata: f32,
        cols: usize,
        rows: usize,
        data: Vec<f32>,
    ) -> Result<Self> {
        if data.len() != cols * rows {
            return Err(GridError::Geometry(format!(
                "data length {} does not match {}x{} grid",
                data.len(),
                cols,
                rows
            )));
        }
        Ok(RasterTile {
            region,
            inc_x,
            inc_y,
            nodata,
            cols,
            rows,
            data,
        })
    }

    /// Geographic extent of the tile.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Cell size in x.
    pub fn inc_x(&self) -> f64 {
        self.inc_x
    }

    /// Cell size in y.
    pub fn inc_y(&self) -> f64 {
        self.inc_y
    }

    /// No-data value.
    pub fn nodata(&self) -> f32 {
        self.nodata
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Raw row-major samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw samples.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Whether a sample counts as missing.
    pub fn is_nodata(&self, value: f32) -> bool {
        !value.is_finite() || value == self.nodata
    }

    /// Sample at (row, col); out-of-range returns the no-data value.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col]
        } else {
            self.nodata
        }
    }

    /// Set the sample at (row, col); out-of-range writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
        }
    }

    /// Geographic center of the cell at (row, col).
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.region.xmin + (col as f64 + 0.5) * self.inc_x,
            self.region.ymax - (row as f64 + 0.5) * self.inc_y,
        )
    }

    /// Cell index containing the geographic point, if inside the tile.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if x < self.region.xmin || y > self.region.ymax {
            return None;
        }
        let col = ((x - self.region.xmin) / self.inc_x).floor() as usize;
        let row = ((self.region.ymax - y) / self.inc_y).floor() as usize;
        if row < self.rows && col < self.cols {
            Some((row, col))
        } else {
            None
        }
    }

    /// True when every sample is the no-data value.
    pub fn is_all_nodata(&self) -> bool {
        self.data.iter().all(|&v| self.is_nodata(v))
    }

    /// Minimum and maximum of the valid samples, if any exist.
    pub fn z_range(&self) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for &v in &self.data {
            if self.is_nodata(v) {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        range
    }

    /// Crop the tile to `region`, returning a new tile.
    ///
    /// The crop is aligned to this tile's cell lattice; cells outside the
    /// source extent come out as no-data.
    pub fn crop(&self, region: &Region) -> Result<Self> {
        if !self.region.intersects(region) {
            return Err(GridError::Geometry(format!(
                "crop region {region} does not intersect tile {}",
                self.region
            )));
        }
        let mut out = RasterTile::new_nodata(*region, self.inc_x, self.inc_y, self.nodata);
        for row in 0..out.rows {
            for col in 0..out.cols {
                let (x, y) = out.cell_center(row, col);
                if let Some((sr, sc)) = self.cell_at(x, y) {
                    out.data[row * out.cols + col] = self.get(sr, sc);
                }
            }
        }
        Ok(out)
    }
}
