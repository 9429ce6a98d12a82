//! Shared scaffolding for the native gridding modules.

use crate::Result;
use tracing::debug;
use waffles_datalist::{read_points, Point, ResolvedSource};
use waffles_grid::{RasterTile, DEFAULT_NODATA};
use waffles_region::Region;

/// Pull every point of every source inside `region` into one list.
pub fn gather_points(sources: &[ResolvedSource], region: &Region) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    for source in sources {
        points.extend(read_points(source, region)?);
    }
    debug!(
        sources = sources.len(),
        points = points.len(),
        "gathered points"
    );
    Ok(points)
}

/// An empty output tile for the target lattice.
pub fn empty_tile(region: &Region, inc_x: f64, inc_y: f64) -> RasterTile {
    RasterTile::new_nodata(*region, inc_x, inc_y, DEFAULT_NODATA)
}

/// Points bucketed by output cell, for radius queries.
///
/// Buckets share the output lattice so a radius query only walks the
/// cell neighborhood covering the search circle.
pub struct PointIndex<'a> {
    region: Region,
    inc_x: f64,
    inc_y: f64,
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<&'a Point>>,
}

impl<'a> PointIndex<'a> {
    /// Bucket `points` over the `region` lattice. Points outside the
    /// region are dropped.
    pub fn build(points: &'a [Point], region: &Region, inc_x: f64, inc_y: f64) -> Self {
        let (cols, rows) = region.dimensions(inc_x, inc_y);
        let mut buckets = vec![Vec::new(); cols * rows];
        for p in points {
            if p.x < region.xmin || p.y > region.ymax {
                continue;
            }
            let col = ((p.x - region.xmin) / inc_x).floor() as usize;
            let row = ((region.ymax - p.y) / inc_y).floor() as usize;
            if row < rows && col < cols {
                buckets[row * cols + col].push(p);
            }
        }
        PointIndex {
            region: *region,
            inc_x,
            inc_y,
            cols,
            rows,
            buckets,
        }
    }

    /// Points bucketed into the cell at (row, col).
    pub fn cell(&self, row: usize, col: usize) -> &[&'a Point] {
        &self.buckets[row * self.cols + col]
    }

    /// Visit every point within `radius` of `(x, y)`, with its distance.
    pub fn for_each_within<F: FnMut(&Point, f64)>(
        &self,
        x: f64,
        y: f64,
        radius: f64,
        mut visit: F,
    ) {
        let span_x = (radius / self.inc_x).ceil() as i64 + 1;
        let span_y = (radius / self.inc_y).ceil() as i64 + 1;
        let center_col = ((x - self.region.xmin) / self.inc_x).floor() as i64;
        let center_row = ((self.region.ymax - y) / self.inc_y).floor() as i64;
        for row in center_row - span_y..=center_row + span_y {
            if row < 0 || row >= self.rows as i64 {
                continue;
            }
            for col in center_col - span_x..=center_col + span_x {
                if col < 0 || col >= self.cols as i64 {
                    continue;
                }
                for &p in self.cell(row as usize, col as usize) {
                    let d = ((p.x - x).powi(2) + (p.y - y).powi(2)).sqrt();
                    if d <= radius {
                        visit(p, d);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts() -> Vec<Point> {
        vec![
            Point { x: 0.05, y: 0.05, z: -1.0, w: 1.0 },
            Point { x: 0.06, y: 0.05, z: -2.0, w: 1.0 },
            Point { x: 0.95, y: 0.95, z: -3.0, w: 2.0 },
            Point { x: 5.00, y: 5.00, z: 99.0, w: 1.0 },
        ]
    }

    #[test]
    fn test_bucketing_drops_outside_points() {
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let points = pts();
        let index = PointIndex::build(&points, &region, 0.1, 0.1);
        // Bottom-left cell is row 9 (row 0 is north).
        assert_eq!(index.cell(9, 0).len(), 2);
        let total: usize = (0..10)
            .flat_map(|r| (0..10).map(move |c| (r, c)))
            .map(|(r, c)| index.cell(r, c).len())
            .sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_radius_query() {
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let points = pts();
        let index = PointIndex::build(&points, &region, 0.1, 0.1);
        let mut seen = Vec::new();
        index.for_each_within(0.05, 0.05, 0.02, |p, d| seen.push((p.z, d)));
        assert_eq!(seen.len(), 2);
        assert_relative_eq!(seen[0].1.min(seen[1].1), 0.0);
    }
}
