//! Write-only side channels of resolution: archived datalists and
//! spatial-metadata polygons.

use crate::entry::ResolvedSource;
use crate::{points, DatalistError, Result};
use chrono::Utc;
use serde_json::{json, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use waffles_region::Region;

/// Spatial-metadata attribute fields, in the order free-form entry
/// metadata maps onto them.
const METADATA_FIELDS: [&str; 8] = [
    "Name",
    "Agency",
    "Date",
    "Type",
    "Resolution",
    "HDatum",
    "VDatum",
    "URL",
];

/// Archive the resolved sources, restricted to `region`, under `dir`.
///
/// Each source's in-region points are copied to `<dir>/<name>/data/` as
/// XYZ, and a master datalist referencing the copies is written at
/// `<dir>/<name>.datalist`. Returns the master datalist path; rerunning
/// waffles against it reproduces the grid without the original sources.
pub fn archive(
    sources: &[ResolvedSource],
    region: &Region,
    dir: &Path,
    name: &str,
) -> Result<PathBuf> {
    let data_dir = dir.join(name).join("data");
    std::fs::create_dir_all(&data_dir).map_err(|e| DatalistError::io(&data_dir, e))?;

    let master_path = dir.join(format!("{name}.datalist"));
    let mut master = std::fs::File::create(&master_path)
        .map_err(|e| DatalistError::io(&master_path, e))?;
    writeln!(master, "# archived {} region {}", Utc::now().format("%Y%m%d"), region)
        .map_err(|e| DatalistError::io(&master_path, e))?;

    for (index, source) in sources.iter().enumerate() {
        let pts = points::read_points(source, region)?;
        if pts.is_empty() {
            continue;
        }
        let stem = source
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(sanitize)
            .unwrap_or_else(|| format!("source_{index}"));
        let xyz_name = format!("{stem}_{index}.xyz");
        let xyz_path = data_dir.join(&xyz_name);
        let mut xyz = std::fs::File::create(&xyz_path)
            .map_err(|e| DatalistError::io(&xyz_path, e))?;
        for p in &pts {
            writeln!(xyz, "{} {} {}", p.x, p.y, p.z)
                .map_err(|e| DatalistError::io(&xyz_path, e))?;
        }
        writeln!(
            master,
            "{}/data/{} 168 {}",
            name, xyz_name, source.weight
        )
        .map_err(|e| DatalistError::io(&master_path, e))?;
    }
    info!(path = %master_path.display(), "archived datalist");
    Ok(master_path)
}

/// Build the spatial-metadata polygon layer as GeoJSON.
///
/// One feature per contributing source: the source's bounding region
/// clipped to the query region, attributed with the entry's metadata
/// fields (`Name,Agency,Date,Type,Resolution,HDatum,VDatum,URL`).
pub fn spatial_metadata(sources: &[ResolvedSource], region: &Region) -> Value {
    let features: Vec<Value> = sources
        .iter()
        .filter_map(|source| {
            let bounds = source.region?.intersection(region)?;
            let mut properties = serde_json::Map::new();
            for (i, field) in METADATA_FIELDS.iter().enumerate() {
                let value = if i == 0 {
                    source
                        .metadata
                        .first()
                        .cloned()
                        .filter(|v| !v.is_empty())
                        .unwrap_or_else(|| {
                            source
                                .path
                                .file_stem()
                                .and_then(|s| s.to_str())
                                .unwrap_or("unknown")
                                .to_string()
                        })
                } else {
                    source
                        .metadata
                        .get(i)
                        .cloned()
                        .filter(|v| !v.is_empty())
                        .unwrap_or_else(|| "Unknown".to_string())
                };
                properties.insert((*field).to_string(), Value::String(value));
            }
            properties.insert("Weight".to_string(), json!(source.weight));
            Some(json!({
                "type": "Feature",
                "properties": Value::Object(properties),
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [bounds.xmin, bounds.ymin],
                        [bounds.xmax, bounds.ymin],
                        [bounds.xmax, bounds.ymax],
                        [bounds.xmin, bounds.ymax],
                        [bounds.xmin, bounds.ymin]
                    ]]
                }
            }))
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// Serialize the spatial-metadata layer to a GeoJSON file.
pub fn write_spatial_metadata(
    sources: &[ResolvedSource],
    region: &Region,
    path: &Path,
) -> Result<()> {
    let layer = spatial_metadata(sources, region);
    let file = std::fs::File::create(path).map_err(|e| DatalistError::io(path, e))?;
    serde_json::to_writer_pretty(file, &layer)?;
    info!(path = %path.display(), "wrote spatial metadata");
    Ok(())
}

fn sanitize(stem: &str) -> String {
    stem.chars().filter(|c| c.is_alphanumeric()).collect()
}
