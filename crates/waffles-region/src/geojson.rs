//! Minimal GeoJSON extraction: per-feature regions and clip polygons.
//!
//! Only what the pipeline needs from vector input: the bounding region
//! of each polygon feature (multi-region runs) and raw polygon rings
//! (clip masks). Anything else in the file is ignored.

use crate::{Region, RegionError, Result};
use serde_json::Value;
use std::path::Path;

/// A polygon as a list of rings; the first ring is the outer boundary.
///
/// Rings are closed coordinate sequences in `(x, y)` order. Cell-in-polygon
/// tests use even-odd ray casting across all rings, so interior rings act
/// as holes.
pub type Polygon = Vec<Vec<(f64, f64)>>;

/// Read one region per polygon feature from a GeoJSON file.
pub fn read_regions(path: &Path) -> Result<Vec<Region>> {
    let polygons = read_polygons(path)?;
    let mut regions = Vec::with_capacity(polygons.len());
    for poly in &polygons {
        if let Some(region) = polygon_bounds(poly) {
            regions.push(region);
        }
    }
    if regions.is_empty() {
        return Err(RegionError::InvalidVectorFile {
            path: path.display().to_string(),
            reason: "no polygon features with valid extents".to_string(),
        });
    }
    Ok(regions)
}

/// Read every polygon (rings included) from a GeoJSON file.
pub fn read_polygons(path: &Path) -> Result<Vec<Polygon>> {
    let text = std::fs::read_to_string(path)?;
    let root: Value = serde_json::from_str(&text)?;
    let mut polygons = Vec::new();
    collect_polygons(&root, &mut polygons);
    if polygons.is_empty() {
        return Err(RegionError::InvalidVectorFile {
            path: path.display().to_string(),
            reason: "no Polygon or MultiPolygon geometries found".to_string(),
        });
    }
    Ok(polygons)
}

/// Bounding region of a polygon's outer ring.
pub fn polygon_bounds(poly: &Polygon) -> Option<Region> {
    let outer = poly.first()?;
    let mut xmin = f64::INFINITY;
    let mut xmax = f64::NEG_INFINITY;
    let mut ymin = f64::INFINITY;
    let mut ymax = f64::NEG_INFINITY;
    for &(x, y) in outer {
        xmin = xmin.min(x);
        xmax = xmax.max(x);
        ymin = ymin.min(y);
        ymax = ymax.max(y);
    }
    Region::new(xmin, xmax, ymin, ymax).ok()
}

fn collect_polygons(value: &Value, out: &mut Vec<Polygon>) {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            if let Some(features) = value.get("features").and_then(Value::as_array) {
                for feature in features {
                    collect_polygons(feature, out);
                }
            }
        }
        Some("Feature") => {
            if let Some(geometry) = value.get("geometry") {
                collect_polygons(geometry, out);
            }
        }
        Some("Polygon") => {
            if let Some(poly) = parse_rings(value.get("coordinates")) {
                out.push(poly);
            }
        }
        Some("MultiPolygon") => {
            if let Some(coords) = value.get("coordinates").and_then(Value::as_array) {
                for member in coords {
                    if let Some(poly) = parse_rings(Some(member)) {
                        out.push(poly);
                    }
                }
            }
        }
        _ => {}
    }
}

fn parse_rings(coords: Option<&Value>) -> Option<Polygon> {
    let rings = coords?.as_array()?;
    let mut poly = Vec::with_capacity(rings.len());
    for ring in rings {
        let pts = ring.as_array()?;
        let mut parsed = Vec::with_capacity(pts.len());
        for pt in pts {
            let pair = pt.as_array()?;
            let x = pair.first()?.as_f64()?;
            let y = pair.get(1)?.as_f64()?;
            parsed.push((x, y));
        }
        poly.push(parsed);
    }
    if poly.is_empty() || poly[0].len() < 4 {
        return None;
    }
    Some(poly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_geojson(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("regions.geojson");
        let mut f = std::fs::File::create(&path).expect("create geojson");
        f.write_all(body.as_bytes()).expect("write geojson");
        path
    }

    #[test]
    fn test_read_regions_one_per_feature() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_geojson(
            &dir,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":{"type":"Polygon",
                 "coordinates":[[[0,0],[2,0],[2,1],[0,1],[0,0]]]}},
                {"type":"Feature","properties":{},"geometry":{"type":"Polygon",
                 "coordinates":[[[10,10],[11,10],[11,12],[10,12],[10,10]]]}}
            ]}"#,
        );
        let regions = read_regions(&path).expect("read regions");
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0], Region::new(0.0, 2.0, 0.0, 1.0).unwrap());
        assert_eq!(regions[1], Region::new(10.0, 11.0, 10.0, 12.0).unwrap());
    }

    #[test]
    fn test_read_polygons_multipolygon() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_geojson(
            &dir,
            r#"{"type":"Feature","geometry":{"type":"MultiPolygon",
                "coordinates":[[[[0,0],[1,0],[1,1],[0,1],[0,0]]],
                               [[[5,5],[6,5],[6,6],[5,6],[5,5]]]]}}"#,
        );
        let polys = read_polygons(&path).expect("read polygons");
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[0][0].len(), 5);
    }

    #[test]
    fn test_no_polygons_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_geojson(
            &dir,
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]}}"#,
        );
        assert!(matches!(
            read_regions(&path),
            Err(RegionError::InvalidVectorFile { .. })
        ));
    }
}
