//! External tool invocation helpers.
//!
//! The surface, triangulate, mbgrid and vdatum modules shell out to
//! GMT, MB-System and the NOAA VDatum jar. Everything that spawns a
//! process funnels through here so missing tools and non-zero exits
//! surface as the same two error variants.

use crate::{ModuleError, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;
use waffles_datalist::Point;

/// Whether `tool` resolves to an executable on `PATH`.
pub fn tool_available(tool: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| {
        let candidate = dir.join(tool);
        candidate.is_file()
    })
}

/// Run a prepared command, mapping spawn failure to [`ModuleError::ToolMissing`]
/// and a non-zero exit to [`ModuleError::ExternalTool`].
pub fn run_capture(tool: &str, cmd: &mut Command) -> Result<Output> {
    debug!(tool, ?cmd, "running external tool");
    let output = cmd.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ModuleError::ToolMissing {
                tool: tool.to_string(),
            }
        } else {
            ModuleError::Io(e)
        }
    })?;
    if !output.status.success() {
        return Err(ModuleError::ExternalTool {
            tool: tool.to_string(),
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output)
}

/// Dump points as whitespace-delimited XYZ text, one record per line.
/// With `with_weights`, a fourth weight column is written.
pub fn write_points_xyz(points: &[Point], path: &Path, with_weights: bool) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut out = std::io::BufWriter::new(file);
    for p in points {
        if with_weights {
            writeln!(out, "{} {} {} {}", p.x, p.y, p.z, p.w)?;
        } else {
            writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_detected() {
        assert!(!tool_available("no-such-tool-waffles-test"));
        let err = run_capture(
            "no-such-tool-waffles-test",
            &mut Command::new("no-such-tool-waffles-test"),
        )
        .unwrap_err();
        assert!(matches!(err, ModuleError::ToolMissing { .. }));
    }

    #[test]
    fn test_nonzero_exit_captured() {
        let err = run_capture("false", &mut Command::new("false")).unwrap_err();
        match err {
            ModuleError::ExternalTool { tool, status, .. } => {
                assert_eq!(tool, "false");
                assert_eq!(status, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_points_xyz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pts.xyz");
        let points = vec![Point { x: 1.0, y: 2.0, z: -3.5, w: 2.0 }];
        write_points_xyz(&points, &path, true).expect("write");
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body, "1 2 -3.5 2\n");
    }
}
