//! MB-System `mbgrid` gridding.

use crate::common::empty_tile;
use crate::external::run_capture;
use crate::gmt::gmt_available;
use crate::{GriddingModule, ModuleError, ModuleOptions, Result};
use std::process::Command;
use tracing::info;
use waffles_datalist::ResolvedSource;
use waffles_grid::RasterTile;
use waffles_region::Region;

const MBGRID: &str = "mbgrid";

/// Weighted spline gridding through MB-System's `mbgrid`.
///
/// Sources are snapshotted into a private datalist so mbgrid sees one
/// flat catalog with the effective weights already applied. The
/// native `.grd` output converts to GTiff via `gmt grdconvert`.
pub struct MbGridModule;

const OPTION_KEYS: &[&str] = &["dist", "tension"];

impl GriddingModule for MbGridModule {
    fn name(&self) -> &'static str {
        "mbgrid"
    }

    fn describe(&self) -> &'static str {
        "MB-System weighted spline gridding [dist=<clip/clip>:tension=<t>]"
    }

    fn validate(&self, opts: &ModuleOptions) -> Result<()> {
        opts.check_keys(self.name(), OPTION_KEYS)?;
        if let Some(dist) = opts.get("dist") {
            let ok = dist
                .split('/')
                .all(|part| part.parse::<f64>().is_ok());
            if !ok || dist.is_empty() {
                return Err(ModuleError::InvalidOption {
                    module: self.name().to_string(),
                    reason: format!("dist: expected <n> or <n>/<n>, got {dist:?}"),
                });
            }
        }
        opts.get_f64(self.name(), "tension")?;
        Ok(())
    }

    fn generate(
        &self,
        sources: &[ResolvedSource],
        region: &Region,
        inc_x: f64,
        inc_y: f64,
        opts: &ModuleOptions,
    ) -> Result<RasterTile> {
        let dist = opts.get("dist").unwrap_or("10/3").to_string();
        let tension = opts.get_f64(self.name(), "tension")?.unwrap_or(35.0);

        if sources.is_empty() {
            info!("no sources in region, emitting empty grid");
            return Ok(empty_tile(region, inc_x, inc_y));
        }

        let dir = tempfile::tempdir()?;
        let datalist = waffles_datalist::archive(sources, region, dir.path(), "mbgrid_stack")?;

        let out_stem = dir.path().join("dem");
        let mut cmd = Command::new(MBGRID);
        cmd.arg(format!("-I{}", datalist.display()))
            .arg(region.format_gmt())
            .arg(format!("-E{inc_x:.10}/{inc_y:.10}/degrees!"))
            .arg(format!("-O{}", out_stem.display()))
            .arg("-A2")
            .arg("-G100")
            .arg("-F1")
            .arg("-N")
            .arg(format!("-C{dist}"))
            .arg(format!("-T{tension}"));
        run_capture(MBGRID, &mut cmd)?;

        let grd = out_stem.with_extension("grd");
        let tif = out_stem.with_extension("tif");
        let mut convert = Command::new("gmt");
        convert
            .arg("grdconvert")
            .arg(&grd)
            .arg(format!("{}=gd+n-9999:GTiff", tif.display()));
        run_capture("gmt", &mut convert)?;
        Ok(waffles_grid::geotiff::read(&tif)?)
    }
}

/// Whether the MB-System gridder and its GMT converter are installed.
pub fn mbgrid_available() -> bool {
    crate::external::tool_available(MBGRID) && gmt_available()
}
