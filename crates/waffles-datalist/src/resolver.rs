//! Recursive datalist resolution.

use crate::entry::{DatalistEntry, ResolvedSource, SourceFormat};
use crate::{inf, DatalistError, Result};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use waffles_region::Region;

/// Expand a datalist into the flat, weight-annotated list of leaf
/// sources intersecting `region`.
///
/// Depth-first, in declaration order; that order is preserved in the
/// output and downstream modules use it as a precedence hint
/// (last-listed wins on overlap for some gridding strategies). Weights
/// multiply down the tree. Nested datalists with a cached bounding
/// region that misses the query region are pruned; entries with no
/// known bounds are visited conservatively. Inclusion cycles fail with
/// [`DatalistError::CyclicDatalist`] instead of recursing forever.
pub fn resolve(datalist: &Path, region: &Region) -> Result<Vec<ResolvedSource>> {
    let mut sources = Vec::new();
    let mut stack = Vec::new();
    resolve_datalist(datalist, region, 1.0, &mut stack, &mut sources)?;
    debug!(
        datalist = %datalist.display(),
        sources = sources.len(),
        "resolved datalist"
    );
    Ok(sources)
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn resolve_datalist(
    path: &Path,
    region: &Region,
    weight: f64,
    stack: &mut Vec<PathBuf>,
    out: &mut Vec<ResolvedSource>,
) -> Result<()> {
    let canon = canonical(path);
    if stack.contains(&canon) {
        return Err(DatalistError::CyclicDatalist {
            path: path.to_path_buf(),
        });
    }
    stack.push(canon);

    let file = std::fs::File::open(path).map_err(|e| DatalistError::io(path, e))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| DatalistError::io(path, e))?;
        let Some(entry) = DatalistEntry::parse_line(&line, base_dir, path)? else {
            continue;
        };
        resolve_entry(&entry, region, weight, stack, out)?;
    }

    stack.pop();
    Ok(())
}

fn resolve_entry(
    entry: &DatalistEntry,
    region: &Region,
    parent_weight: f64,
    stack: &mut Vec<PathBuf>,
    out: &mut Vec<ResolvedSource>,
) -> Result<()> {
    let weight = parent_weight * entry.weight;
    match entry.format {
        SourceFormat::Datalist => {
            // Prune on cached bounds only; unknown bounds are visited.
            if let Some(bounds) = inf::read_inf(&entry.path).map(|i| i.region) {
                if !bounds.intersects(region) {
                    debug!(path = %entry.path.display(), "pruned nested datalist outside region");
                    return Ok(());
                }
            }
            resolve_datalist(&entry.path, region, weight, stack, out)
        }
        SourceFormat::Xyz | SourceFormat::Raster => {
            if !entry.path.exists() {
                warn!(path = %entry.path.display(), "skipping missing datalist entry");
                return Ok(());
            }
            let bounds = inf::entry_region(entry)?;
            if let Some(bounds) = bounds {
                if !bounds.intersects(region) {
                    return Ok(());
                }
            }
            out.push(ResolvedSource {
                path: entry.path.clone(),
                format: entry.format,
                weight,
                region: bounds,
                metadata: entry.metadata.clone(),
            });
            Ok(())
        }
    }
}
