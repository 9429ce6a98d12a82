//! Polygon clip: mask cells outside (or inside) a clip polygon.

use crate::{GridError, RasterTile, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use waffles_region::Polygon;

/// Parsed `-C` clip spec: `path[:invert=<bool>]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSpec {
    /// GeoJSON polygon file.
    pub path: PathBuf,
    /// Mask inside the polygon instead of outside.
    pub invert: bool,
}

impl ClipSpec {
    /// Parse a clip spec string, e.g. `coast.geojson:invert=True`.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut parts = spec.split(':');
        let path = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| GridError::InvalidClipSpec(spec.to_string()))?;
        let mut invert = false;
        for part in parts {
            match part.split_once('=') {
                Some(("invert", value)) => {
                    invert = match value.trim() {
                        "True" | "true" => true,
                        "False" | "false" => false,
                        _ => return Err(GridError::InvalidClipSpec(spec.to_string())),
                    };
                }
                _ => return Err(GridError::InvalidClipSpec(spec.to_string())),
            }
        }
        Ok(ClipSpec {
            path: PathBuf::from(path),
            invert,
        })
    }

    /// Load the polygons and clip `tile` in place.
    pub fn apply(&self, tile: &mut RasterTile) -> Result<()> {
        let polygons = waffles_region::geojson::read_polygons(Path::new(&self.path))?;
        clip(tile, &polygons, self.invert);
        Ok(())
    }
}

/// Mask cells of `tile` against `polygons`.
///
/// Cell centers outside every polygon are set to no-data; with `invert`
/// the cells inside are masked instead. Even-odd ray casting over all
/// rings, so interior rings act as holes.
pub fn clip(tile: &mut RasterTile, polygons: &[Polygon], invert: bool) {
    let nodata = tile.nodata();
    let mut masked = 0usize;
    for row in 0..tile.rows() {
        for col in 0..tile.cols() {
            let (x, y) = tile.cell_center(row, col);
            let inside = polygons.iter().any(|p| point_in_polygon(x, y, p));
            if inside == invert {
                if !tile.is_nodata(tile.get(row, col)) {
                    masked += 1;
                }
                tile.set(row, col, nodata);
            }
        }
    }
    debug!(masked, invert, "clipped tile");
}

/// Even-odd point-in-polygon test across all rings.
fn point_in_polygon(x: f64, y: f64, polygon: &Polygon) -> bool {
    let mut inside = false;
    for ring in polygon {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if ((yi > y) != (yj > y))
                && (x < (xj - xi) * (y - yi) / (yj - yi) + xi)
            {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}
