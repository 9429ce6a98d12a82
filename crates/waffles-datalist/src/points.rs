//! Point access: stream weighted elevation points out of leaf sources.

use crate::entry::{ResolvedSource, SourceFormat};
use crate::{DatalistError, Result};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};
use waffles_region::Region;

/// One weighted elevation sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Easting / longitude.
    pub x: f64,
    /// Northing / latitude.
    pub y: f64,
    /// Elevation.
    pub z: f64,
    /// Effective source weight.
    pub w: f64,
}

/// Parse one XYZ text line; space, comma, semicolon and tab delimited
/// records are accepted. Returns `None` for records that do not hold at
/// least three numeric fields.
pub fn parse_xyz_line(line: &str) -> Option<(f64, f64, f64)> {
    let mut vals = line
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .map(str::parse::<f64>);
    let x = vals.next()?.ok()?;
    let y = vals.next()?.ok()?;
    let z = vals.next()?.ok()?;
    Some((x, y, z))
}

/// Read the points of a resolved source falling inside `region`.
///
/// Every point carries the source's effective weight. Unparsable XYZ
/// records are skipped (counted and logged), matching the tolerant
/// behavior expected of survey data dumps.
pub fn read_points(source: &ResolvedSource, region: &Region) -> Result<Vec<Point>> {
    match source.format {
        SourceFormat::Xyz => read_xyz_points(&source.path, region, source.weight),
        SourceFormat::Raster => read_raster_points(&source.path, region, source.weight),
        SourceFormat::Datalist => {
            // The resolver never yields datalist leaves; treat as empty.
            warn!(path = %source.path.display(), "datalist entry reached point reader");
            Ok(Vec::new())
        }
    }
}

fn read_xyz_points(path: &Path, region: &Region, weight: f64) -> Result<Vec<Point>> {
    let file = std::fs::File::open(path).map_err(|e| DatalistError::io(path, e))?;
    let mut points = Vec::new();
    let mut skipped = 0usize;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| DatalistError::io(path, e))?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        match parse_xyz_line(&line) {
            Some((x, y, z)) => {
                if region.contains(x, y) {
                    points.push(Point { x, y, z, w: weight });
                }
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped unparsable xyz records");
    }
    debug!(path = %path.display(), count = points.len(), "read xyz points");
    Ok(points)
}

fn read_raster_points(path: &Path, region: &Region, weight: f64) -> Result<Vec<Point>> {
    let tile = waffles_grid::geotiff::read(path)?;
    let mut points = Vec::new();
    for row in 0..tile.rows() {
        for col in 0..tile.cols() {
            let v = tile.get(row, col);
            if tile.is_nodata(v) {
                continue;
            }
            let (x, y) = tile.cell_center(row, col);
            if region.contains(x, y) {
                points.push(Point {
                    x,
                    y,
                    z: f64::from(v),
                    w: weight,
                });
            }
        }
    }
    debug!(path = %path.display(), count = points.len(), "read raster points");
    Ok(points)
}
