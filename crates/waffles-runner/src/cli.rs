//! Command-line interface of the `waffles` binary.

use crate::{Result, WaffleConfig, WafflesError};
use clap::Parser;
use std::path::PathBuf;

/// Generate Digital Elevation Models from scattered elevation sources.
#[derive(Debug, Parser)]
#[command(name = "waffles", version, about)]
pub struct Cli {
    /// Master datalist (or a single data file) to grid
    pub datalist: Option<PathBuf>,

    /// Region: xmin/xmax/ymin/ymax bounds or a vector file path
    #[arg(short = 'R', long, allow_hyphen_values = true)]
    pub region: Option<String>,

    /// Cell size, optionally with a resample size: inc[:sample_inc]
    #[arg(short = 'E', long)]
    pub increment: Option<String>,

    /// Gridding module spec, e.g. surface:tension=0.35
    #[arg(short = 'M', long)]
    pub module: Option<String>,

    /// Output base name
    #[arg(short = 'O', long)]
    pub name: Option<String>,

    /// Output format name; only GTiff is supported
    #[arg(short = 'F', long)]
    pub format: Option<String>,

    /// Horizontal reference EPSG code
    #[arg(short = 'P', long)]
    pub epsg: Option<u32>,

    /// Extend cells, optionally with processing cells: extend[:proc]
    #[arg(short = 'X', long)]
    pub extend: Option<String>,

    /// Post-gridding filter spec, e.g. 10:split_value=0
    #[arg(short = 'T', long)]
    pub filter: Option<String>,

    /// Clip spec, e.g. coast.geojson:invert=True
    #[arg(short = 'C', long)]
    pub clip: Option<String>,

    /// Chunk level; 0 grids the region in one piece
    #[arg(short = 'K', long)]
    pub chunk: Option<u32>,

    /// Honor source weights during gridding
    #[arg(short = 'w', long)]
    pub weights: bool,

    /// Derive output names from region, resolution and year
    #[arg(long)]
    pub prefix: bool,

    /// Archive the resolved sources next to the output
    #[arg(long)]
    pub archive: bool,

    /// Write a spatial-metadata layer next to the output
    #[arg(long)]
    pub spat_meta: bool,

    /// Write a data-mask raster next to the output
    #[arg(short = 'm', long)]
    pub mask: bool,

    /// Substitute empty tiles for failed chunks instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Worker thread count
    #[arg(long)]
    pub threads: Option<usize>,

    /// Load a saved run configuration instead of building one from flags
    #[arg(short = 'W', long)]
    pub config: Option<PathBuf>,

    /// Save the run configuration to a file before running
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// List the available gridding modules and exit
    #[arg(long)]
    pub modules: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn usage(msg: &str) -> WafflesError {
    WafflesError::Usage(msg.to_string())
}

impl Cli {
    /// Build the run configuration, either from a saved config file or
    /// from the command-line flags.
    pub fn to_config(&self) -> Result<WaffleConfig> {
        if let Some(path) = &self.config {
            return WaffleConfig::load(path);
        }

        let datalist = self
            .datalist
            .clone()
            .ok_or_else(|| usage("a datalist argument is required"))?;
        let region = self
            .region
            .clone()
            .ok_or_else(|| usage("-R/--region is required"))?;
        let module = self
            .module
            .clone()
            .ok_or_else(|| usage("-M/--module is required"))?;
        let inc_spec = self
            .increment
            .as_deref()
            .ok_or_else(|| usage("-E/--increment is required"))?;

        let (inc, sample_inc) = match inc_spec.split_once(':') {
            Some((inc, sample)) => (
                parse_float(inc, "-E increment")?,
                Some(parse_float(sample, "-E sample increment")?),
            ),
            None => (parse_float(inc_spec, "-E increment")?, None),
        };
        let (extend, extend_proc) = match self.extend.as_deref() {
            Some(spec) => match spec.split_once(':') {
                Some((e, p)) => (
                    parse_int(e, "-X extend")?,
                    parse_int(p, "-X processing extend")?,
                ),
                None => (parse_int(spec, "-X extend")?, 20),
            },
            None => (0, 20),
        };

        Ok(WaffleConfig {
            datalist,
            region,
            inc,
            sample_inc,
            module,
            name: self.name.clone().unwrap_or_else(|| "waffles_dem".to_string()),
            prefix: self.prefix,
            fmt: self.format.clone().unwrap_or_else(|| "GTiff".to_string()),
            epsg: self.epsg.unwrap_or(4326),
            extend,
            extend_proc,
            weights: self.weights,
            fltr: self.filter.clone(),
            clip: self.clip.clone(),
            chunk: self.chunk.unwrap_or(0),
            archive: self.archive,
            spat_meta: self.spat_meta,
            mask: self.mask,
            keep_going: self.keep_going,
            threads: self.threads,
        })
    }
}

fn parse_float(value: &str, what: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| usage(&format!("{what}: expected a number, got {value:?}")))
}

fn parse_int(value: &str, what: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| usage(&format!("{what}: expected an integer, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("waffles").chain(args.iter().copied()))
            .expect("cli parse")
    }

    #[test]
    fn test_full_command_line() {
        let cli = parse(&[
            "gulf.datalist",
            "-R",
            "-90/-89/29/30",
            "-E",
            "0.00083333:0.0002",
            "-M",
            "surface:tension=0.35",
            "-O",
            "gulf",
            "-X",
            "2:10",
            "-K",
            "3",
            "-w",
            "--keep-going",
        ]);
        let config = cli.to_config().expect("config");
        assert_eq!(config.datalist, PathBuf::from("gulf.datalist"));
        assert_relative_eq!(config.inc, 0.00083333);
        assert_relative_eq!(config.sample_inc.unwrap(), 0.0002);
        assert_eq!(config.extend, 2);
        assert_eq!(config.extend_proc, 10);
        assert_eq!(config.chunk, 3);
        assert!(config.weights);
        assert!(config.keep_going);
    }

    #[test]
    fn test_missing_required_flags() {
        let cli = parse(&["gulf.datalist", "-R", "-90/-89/29/30"]);
        assert!(matches!(
            cli.to_config(),
            Err(WafflesError::Usage(_))
        ));
    }

    #[test]
    fn test_extend_defaults() {
        let cli = parse(&[
            "gulf.datalist",
            "-R",
            "-90/-89/29/30",
            "-E",
            "0.001",
            "-M",
            "nearest",
        ]);
        let config = cli.to_config().expect("config");
        assert_eq!(config.extend, 0);
        assert_eq!(config.extend_proc, 20);
        assert_eq!(config.sample_inc, None);
    }

    #[test]
    fn test_negative_region_bounds_parse() {
        let cli = parse(&[
            "gulf.datalist",
            "-R",
            "-90/-89/29/30",
            "-E",
            "0.001",
            "-M",
            "nearest",
        ]);
        let config = cli.to_config().expect("config");
        assert_eq!(config.region, "-90/-89/29/30");
    }

    #[test]
    fn test_config_short_flag_loads_saved_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{
                "datalist": "gulf.datalist",
                "region": "-90/-89/29/30",
                "inc": 0.001,
                "module": "nearest"
            }"#,
        )
        .unwrap();
        let cli = parse(&["-W", path.to_str().unwrap()]);
        let config = cli.to_config().expect("config");
        assert_eq!(config.datalist, PathBuf::from("gulf.datalist"));
        assert_eq!(config.module, "nearest");
    }
}
