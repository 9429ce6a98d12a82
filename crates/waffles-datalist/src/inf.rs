//! `.inf` sidecar files: cached bounding boxes for data files.
//!
//! Scanning a large XYZ file to learn its extent is expensive, so the
//! extent is cached next to the file (`foo.xyz` -> `foo.xyz.inf`) after
//! the first scan, the same trick MB-System datalists use.

use crate::entry::{DatalistEntry, SourceFormat};
use crate::{DatalistError, Result};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use waffles_region::Region;

/// Parsed sidecar contents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inf {
    /// Bounding region of the data.
    pub region: Region,
    /// Number of data points scanned.
    pub points: u64,
}

/// Sidecar path for a data file: the filename with `.inf` appended.
pub fn inf_path(data_path: &Path) -> PathBuf {
    let mut name = data_path.as_os_str().to_os_string();
    name.push(".inf");
    PathBuf::from(name)
}

/// Read a sidecar, if present and well-formed.
pub fn read_inf(data_path: &Path) -> Option<Inf> {
    let path = inf_path(data_path);
    let file = std::fs::File::open(&path).ok()?;
    let mut region = None;
    let mut points = 0u64;
    for line in BufReader::new(file).lines() {
        let line = line.ok()?;
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("minmax") => {
                let vals: Vec<f64> = fields.filter_map(|f| f.parse().ok()).collect();
                if vals.len() >= 4 {
                    region = Region::new(vals[0], vals[1], vals[2], vals[3]).ok();
                }
            }
            Some("points") => {
                points = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
            }
            _ => {}
        }
    }
    region.map(|region| Inf { region, points })
}

/// Write a sidecar next to the data file.
pub fn write_inf(data_path: &Path, inf: &Inf) -> Result<()> {
    let path = inf_path(data_path);
    let mut file =
        std::fs::File::create(&path).map_err(|e| DatalistError::io(&path, e))?;
    writeln!(
        file,
        "minmax {} {} {} {}",
        inf.region.xmin, inf.region.xmax, inf.region.ymin, inf.region.ymax
    )
    .and_then(|()| writeln!(file, "points {}", inf.points))
    .map_err(|e| DatalistError::io(&path, e))?;
    Ok(())
}

/// Scan an XYZ file for its bounding region and point count.
pub fn scan_xyz(path: &Path) -> Result<Option<Inf>> {
    let file = std::fs::File::open(path).map_err(|e| DatalistError::io(path, e))?;
    let mut xmin = f64::INFINITY;
    let mut xmax = f64::NEG_INFINITY;
    let mut ymin = f64::INFINITY;
    let mut ymax = f64::NEG_INFINITY;
    let mut points = 0u64;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| DatalistError::io(path, e))?;
        if let Some((x, y, _)) = crate::points::parse_xyz_line(&line) {
            xmin = xmin.min(x);
            xmax = xmax.max(x);
            ymin = ymin.min(y);
            ymax = ymax.max(y);
            points += 1;
        }
    }
    if points == 0 {
        return Ok(None);
    }
    // Degenerate extents (single point, colinear data) get a hair of pad
    // so the region stays valid.
    let pad = 1e-9;
    let region = Region::new(
        xmin,
        if xmax > xmin { xmax } else { xmax + pad },
        ymin,
        if ymax > ymin { ymax } else { ymax + pad },
    )?;
    Ok(Some(Inf { region, points }))
}

/// Bounding region of a datalist entry from cheap metadata.
///
/// XYZ entries use the `.inf` sidecar, generating it on a miss; raster
/// entries read the GeoTIFF header; nested datalists use a sidecar when
/// one exists and otherwise return `None` (visited conservatively).
pub fn entry_region(entry: &DatalistEntry) -> Result<Option<Region>> {
    match entry.format {
        SourceFormat::Xyz => {
            if let Some(inf) = read_inf(&entry.path) {
                return Ok(Some(inf.region));
            }
            match scan_xyz(&entry.path)? {
                Some(inf) => {
                    if let Err(err) = write_inf(&entry.path, &inf) {
                        warn!(path = %entry.path.display(), %err, "could not cache .inf sidecar");
                    } else {
                        debug!(path = %entry.path.display(), "generated .inf sidecar");
                    }
                    Ok(Some(inf.region))
                }
                None => Ok(None),
            }
        }
        SourceFormat::Raster => {
            let header = waffles_grid::geotiff::read_header(&entry.path)?;
            Ok(Some(header.region))
        }
        SourceFormat::Datalist => Ok(read_inf(&entry.path).map(|inf| inf.region)),
    }
}
