//! GMT-backed gridding: blockmean preprocessing feeding surface or
//! triangulate, plus the grdfilter smoothing hook.

use crate::common::{empty_tile, gather_points};
use crate::external::{run_capture, tool_available, write_points_xyz};
use crate::{GriddingModule, ModuleOptions, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;
use waffles_datalist::{Point, ResolvedSource};
use waffles_grid::RasterTile;
use waffles_region::Region;

const GMT: &str = "gmt";

/// GDAL-backed GTiff output spec understood by GMT's `-G`.
fn gtiff_out(path: &Path) -> String {
    format!("{}=gd+n-9999:GTiff", path.display())
}

/// Block the points to the target lattice with `gmt blockmean`,
/// writing the blocked XYZ records to `blocked`.
fn blockmean(
    points: &[Point],
    region: &Region,
    inc_x: f64,
    inc_y: f64,
    dir: &Path,
    blocked: &Path,
) -> Result<()> {
    let raw = dir.join("raw.xyz");
    let weighted = points.iter().any(|p| (p.w - 1.0).abs() > f64::EPSILON);
    write_points_xyz(points, &raw, weighted)?;

    let mut cmd = Command::new(GMT);
    cmd.arg("blockmean")
        .arg(region.format_gmt())
        .arg(format!("-I{inc_x:.10}/{inc_y:.10}"))
        .arg("-r")
        .arg("-V");
    if weighted {
        cmd.arg("-Wi");
    }
    cmd.stdin(Stdio::from(std::fs::File::open(&raw)?));
    let output = run_capture(GMT, &mut cmd)?;
    std::fs::write(blocked, &output.stdout)?;
    Ok(())
}

/// Grid blocked points with `gmt surface` and read back the GTiff.
fn surface_from_points(
    points: &[Point],
    region: &Region,
    inc_x: f64,
    inc_y: f64,
    tension: f64,
    relaxation: f64,
    lower_limit: Option<f64>,
    upper_limit: Option<f64>,
) -> Result<RasterTile> {
    let dir = tempfile::tempdir()?;
    let blocked = dir.path().join("blocked.xyz");
    blockmean(points, region, inc_x, inc_y, dir.path(), &blocked)?;

    let out = dir.path().join("dem.tif");
    let mut cmd = Command::new(GMT);
    cmd.arg("surface")
        .arg(region.format_gmt())
        .arg(format!("-I{inc_x:.10}/{inc_y:.10}"))
        .arg(format!("-G{}", gtiff_out(&out)))
        .arg(format!("-T{tension}"))
        .arg(format!("-Z{relaxation}"))
        .arg("-r")
        .arg("-V");
    if let Some(lower) = lower_limit {
        cmd.arg(format!("-Ll{lower}"));
    }
    if let Some(upper) = upper_limit {
        cmd.arg(format!("-Lu{upper}"));
    }
    cmd.stdin(Stdio::from(std::fs::File::open(&blocked)?));
    run_capture(GMT, &mut cmd)?;
    Ok(waffles_grid::geotiff::read(&out)?)
}

/// Re-export for the vertical-datum module, which grids its separation
/// surface the same way with zero tension.
pub(crate) fn surface_grid(
    points: &[Point],
    region: &Region,
    inc_x: f64,
    inc_y: f64,
    tension: f64,
) -> Result<RasterTile> {
    surface_from_points(points, region, inc_x, inc_y, tension, 1.2, None, None)
}

/// Continuous-curvature spline gridding via `gmt surface`.
pub struct SurfaceModule;

const SURFACE_KEYS: &[&str] = &["tension", "relaxation", "lower_limit", "upper_limit"];

impl GriddingModule for SurfaceModule {
    fn name(&self) -> &'static str {
        "surface"
    }

    fn describe(&self) -> &'static str {
        "GMT continuous-curvature splines [tension=<t>:relaxation=<z>:lower_limit=<l>:upper_limit=<u>]"
    }

    fn validate(&self, opts: &ModuleOptions) -> Result<()> {
        opts.check_keys(self.name(), SURFACE_KEYS)?;
        opts.get_f64(self.name(), "tension")?;
        opts.get_f64(self.name(), "relaxation")?;
        opts.get_f64(self.name(), "lower_limit")?;
        opts.get_f64(self.name(), "upper_limit")?;
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
        let tension = opts.get_f64(self.name(), "tension")?.unwrap_or(0.35);
        let relaxation = opts.get_f64(self.name(), "relaxation")?.unwrap_or(1.2);
        let lower = opts.get_f64(self.name(), "lower_limit")?;
        let upper = opts.get_f64(self.name(), "upper_limit")?;

        let points = gather_points(sources, region)?;
        if points.is_empty() {
            info!("no points in region, emitting empty grid");
            return Ok(empty_tile(region, inc_x, inc_y));
        }
        surface_from_points(&points, region, inc_x, inc_y, tension, relaxation, lower, upper)
    }
}

/// Delaunay triangulation gridding via `gmt triangulate`.
pub struct TriangulateModule;

impl GriddingModule for TriangulateModule {
    fn name(&self) -> &'static str {
        "triangulate"
    }

    fn describe(&self) -> &'static str {
        "GMT Delaunay triangulation gridding"
    }

    fn validate(&self, opts: &ModuleOptions) -> Result<()> {
        opts.check_keys(self.name(), &[])
    }

    fn generate(
        &self,
        sources: &[ResolvedSource],
        region: &Region,
        inc_x: f64,
        inc_y: f64,
        _opts: &ModuleOptions,
    ) -> Result<RasterTile> {
        let points = gather_points(sources, region)?;
        if points.is_empty() {
            info!("no points in region, emitting empty grid");
            return Ok(empty_tile(region, inc_x, inc_y));
        }

        let dir = tempfile::tempdir()?;
        let blocked = dir.path().join("blocked.xyz");
        blockmean(&points, region, inc_x, inc_y, dir.path(), &blocked)?;

        let out = dir.path().join("dem.tif");
        let mut cmd = Command::new(GMT);
        cmd.arg("triangulate")
            .arg(region.format_gmt())
            .arg(format!("-I{inc_x:.10}/{inc_y:.10}"))
            .arg(format!("-G{}", gtiff_out(&out)))
            .arg("-r")
            .arg("-V");
        cmd.stdin(Stdio::from(std::fs::File::open(&blocked)?));
        run_capture(GMT, &mut cmd)?;
        Ok(waffles_grid::geotiff::read(&out)?)
    }
}

/// Smooth a finished tile with the GMT cosine-arch filter at `dist`.
///
/// The caller decides between this and the native Gaussian filter
/// based on tool availability and the filter spec.
pub fn gmt_grdfilter(tile: &RasterTile, dist: f64) -> Result<RasterTile> {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("in.tif");
    let out = dir.path().join("out.tif");
    waffles_grid::geotiff::write(tile, &src)?;

    let mut cmd = Command::new(GMT);
    cmd.arg("grdfilter")
        .arg(&src)
        .arg(format!("-G{}", gtiff_out(&out)))
        .arg(format!("-Fc{dist}"))
        .arg("-D1")
        .arg("-V");
    run_capture(GMT, &mut cmd)?;
    Ok(waffles_grid::geotiff::read(&out)?)
}

/// Whether the GMT toolchain is installed.
pub fn gmt_available() -> bool {
    tool_available(GMT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::parse_module_spec;

    #[test]
    fn test_surface_empty_sources_skip_tool() {
        // No points means no process spawn, so this passes without GMT.
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let tile = SurfaceModule
            .generate(&[], &region, 0.1, 0.1, &ModuleOptions::default())
            .expect("generate");
        assert!(tile.is_all_nodata());
    }

    #[test]
    fn test_surface_option_validation() {
        let (_, opts) = parse_module_spec("surface:tension=0.5:upper_limit=0").unwrap();
        assert!(SurfaceModule.validate(&opts).is_ok());
        let (_, opts) = parse_module_spec("surface:tension=high").unwrap();
        assert!(SurfaceModule.validate(&opts).is_err());
        let (_, opts) = parse_module_spec("surface:mystery=1").unwrap();
        assert!(SurfaceModule.validate(&opts).is_err());
    }

    #[test]
    fn test_triangulate_takes_no_options() {
        let (_, opts) = parse_module_spec("triangulate:tension=0.5").unwrap();
        assert!(TriangulateModule.validate(&opts).is_err());
        assert!(TriangulateModule.validate(&ModuleOptions::default()).is_ok());
    }
}
