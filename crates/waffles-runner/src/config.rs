//! Run configuration, shared between the CLI and saved-config files.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

fn default_fmt() -> String {
    "GTiff".to_string()
}

fn default_epsg() -> u32 {
    4326
}

fn default_extend_proc() -> u32 {
    20
}

fn default_name() -> String {
    "waffles_dem".to_string()
}

/// Everything a DEM generation run needs.
///
/// Serializes to JSON so a run can be saved and replayed verbatim.
/// Optional knobs carry serde defaults, so configs written by older
/// versions keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaffleConfig {
    /// Master datalist (or a single data file) to grid.
    pub datalist: PathBuf,
    /// Region spec: `xmin/xmax/ymin/ymax` bounds or a vector file path.
    pub region: String,
    /// Cell size in target units.
    pub inc: f64,
    /// Final cell size when the output is resampled after gridding.
    #[serde(default)]
    pub sample_inc: Option<f64>,
    /// Gridding module spec, e.g. `surface:tension=0.35`.
    pub module: String,
    /// Output base name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Derive the output name from region, resolution and year instead.
    #[serde(default)]
    pub prefix: bool,
    /// Output raster driver name; only `GTiff` is accepted.
    #[serde(default = "default_fmt")]
    pub fmt: String,
    /// Horizontal reference EPSG code recorded in run metadata.
    #[serde(default = "default_epsg")]
    pub epsg: u32,
    /// Cells to extend the distribution region by.
    #[serde(default)]
    pub extend: u32,
    /// Extra cells gridded beyond the distribution region and cut away
    /// at the end, hiding edge effects.
    #[serde(default = "default_extend_proc")]
    pub extend_proc: u32,
    /// Honor source weights during gridding.
    #[serde(default)]
    pub weights: bool,
    /// Post-gridding filter spec, e.g. `10:split_value=0`.
    #[serde(default)]
    pub fltr: Option<String>,
    /// Clip spec, e.g. `coast.geojson:invert=True`.
    #[serde(default)]
    pub clip: Option<String>,
    /// Chunk level; 0 grids the whole region in one piece.
    #[serde(default)]
    pub chunk: u32,
    /// Archive the resolved sources next to the output.
    #[serde(default)]
    pub archive: bool,
    /// Write a spatial-metadata layer next to the output.
    #[serde(default)]
    pub spat_meta: bool,
    /// Write a data-mask raster next to the output.
    #[serde(default)]
    pub mask: bool,
    /// Substitute empty tiles for failed chunks instead of aborting.
    #[serde(default)]
    pub keep_going: bool,
    /// Worker thread count; defaults to the machine's parallelism.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl WaffleConfig {
    /// Load a saved run configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Save the configuration for later replay.
    ///
    /// The master datalist is snapshotted next to the config, so the
    /// saved run still replays after the catalog moves.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        if self.datalist.is_file() {
            std::fs::copy(&self.datalist, path.with_extension("datalist"))?;
        }
        info!(path = %path.display(), "saved run config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WaffleConfig {
        WaffleConfig {
            datalist: PathBuf::from("gulf.datalist"),
            region: "-90/-89/29/30".to_string(),
            inc: 0.00083333,
            sample_inc: None,
            module: "surface:tension=0.35".to_string(),
            name: "gulf".to_string(),
            prefix: false,
            fmt: "GTiff".to_string(),
            epsg: 4326,
            extend: 0,
            extend_proc: 20,
            weights: true,
            fltr: Some("10:split_value=0".to_string()),
            clip: None,
            chunk: 0,
            archive: false,
            spat_meta: false,
            mask: false,
            keep_going: false,
            threads: None,
        }
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let original = config();
        original.save(&path).expect("save");
        let loaded = WaffleConfig::load(&path).expect("load");
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_save_snapshots_master_datalist() {
        let dir = tempfile::tempdir().unwrap();
        let datalist = dir.path().join("gulf.datalist");
        std::fs::write(&datalist, "pts.xyz 168 1\n").unwrap();
        let mut config = config();
        config.datalist = datalist;
        let path = dir.path().join("run.json");
        config.save(&path).expect("save");
        let snapshot = dir.path().join("run.datalist");
        assert_eq!(
            std::fs::read_to_string(snapshot).unwrap(),
            "pts.xyz 168 1\n"
        );
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let json = r#"{
            "datalist": "gulf.datalist",
            "region": "-90/-89/29/30",
            "inc": 0.001,
            "module": "nearest"
        }"#;
        let config: WaffleConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.name, "waffles_dem");
        assert_eq!(config.epsg, 4326);
        assert_eq!(config.extend_proc, 20);
        assert_eq!(config.chunk, 0);
        assert!(!config.mask);
        assert!(!config.keep_going);
    }
}
