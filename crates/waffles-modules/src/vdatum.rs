//! Vertical datum conversion grids via the NOAA VDatum jar.

use crate::common::empty_tile;
use crate::external::{run_capture, write_points_xyz};
use crate::gmt::surface_grid;
use crate::{GriddingModule, ModuleError, ModuleOptions, Result};
use std::process::Command;
use tracing::info;
use waffles_datalist::{parse_xyz_line, Point, ResolvedSource};
use waffles_grid::RasterTile;
use waffles_region::Region;

/// Grid the separation between two vertical datums.
///
/// Cell centers are dumped as zero-elevation points, pushed through
/// the VDatum point-conversion jar, and the transformed elevations
/// (the datum separation at each cell) are gridded back with zero
/// tension. No elevation sources are consumed.
pub struct VDatumModule;

const OPTION_KEYS: &[&str] = &["jar", "ihorz", "ivert", "ohorz", "overt", "region"];

impl GriddingModule for VDatumModule {
    fn name(&self) -> &'static str {
        "vdatum"
    }

    fn describe(&self) -> &'static str {
        "vertical datum separation grid [jar=<path>:ivert=<d>:overt=<d>:region=<code>]"
    }

    fn validate(&self, opts: &ModuleOptions) -> Result<()> {
        opts.check_keys(self.name(), OPTION_KEYS)?;
        let jar = opts.get("jar").ok_or_else(|| ModuleError::InvalidOption {
            module: self.name().to_string(),
            reason: "jar: path to vdatum.jar is required".to_string(),
        })?;
        if !std::path::Path::new(jar).is_file() {
            return Err(ModuleError::ToolMissing {
                tool: format!("vdatum ({jar})"),
            });
        }
        Ok(())
    }

    fn generate(
        &self,
        _sources: &[ResolvedSource],
        region: &Region,
        inc_x: f64,
        inc_y: f64,
        opts: &ModuleOptions,
    ) -> Result<RasterTile> {
        self.validate(opts)?;
        let jar = opts.get("jar").unwrap_or_default().to_string();
        let ihorz = opts.get("ihorz").unwrap_or("NAD83_2011");
        let ivert = opts.get("ivert").unwrap_or("navd88:m:height");
        let ohorz = opts.get("ohorz").unwrap_or("NAD83_2011");
        let overt = opts.get("overt").unwrap_or("mhw:m:height");
        let region_code = opts.get("region").unwrap_or("3");

        let template = empty_tile(region, inc_x, inc_y);
        let mut zeros = Vec::with_capacity(template.rows() * template.cols());
        for row in 0..template.rows() {
            for col in 0..template.cols() {
                let (x, y) = template.cell_center(row, col);
                zeros.push(Point { x, y, z: 0.0, w: 1.0 });
            }
        }

        let dir = tempfile::tempdir()?;
        let src = dir.path().join("empty.xyz");
        write_points_xyz(&zeros, &src, false)?;

        let mut cmd = Command::new("java");
        cmd.current_dir(dir.path())
            .arg("-Djava.awt.headless=true")
            .arg("-jar")
            .arg(&jar)
            .arg(format!("ihorz:{ihorz}"))
            .arg(format!("ivert:{ivert}"))
            .arg(format!("ohorz:{ohorz}"))
            .arg(format!("overt:{overt}"))
            .arg("-nodata")
            .arg(format!(
                "-file:txt:space,0,1,2,skip0:{}:result",
                src.display()
            ))
            .arg(format!("region:{region_code}"));
        run_capture("java", &mut cmd)?;

        let result = dir.path().join("result").join("empty.xyz");
        let body = std::fs::read_to_string(&result)?;
        let mut separations = Vec::new();
        for line in body.lines() {
            if let Some((x, y, z)) = parse_xyz_line(line) {
                // VDatum marks unconvertible points with its own nodata.
                if z > -999998.0 {
                    separations.push(Point { x, y, z, w: 1.0 });
                }
            }
        }
        if separations.is_empty() {
            info!("vdatum produced no convertible points, emitting empty grid");
            return Ok(template);
        }
        surface_grid(&separations, region, inc_x, inc_y, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::parse_module_spec;

    #[test]
    fn test_jar_option_required() {
        let err = VDatumModule.validate(&ModuleOptions::default()).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidOption { .. }));
    }

    #[test]
    fn test_missing_jar_file_is_tool_missing() {
        let (_, opts) = parse_module_spec("vdatum:jar=/nonexistent/vdatum.jar").unwrap();
        assert!(matches!(
            VDatumModule.validate(&opts),
            Err(ModuleError::ToolMissing { .. })
        ));
    }
}
