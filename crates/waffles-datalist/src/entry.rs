//! Datalist entries: one line of an MB-System style catalog.

use crate::{DatalistError, Result};
use std::path::{Path, PathBuf};
use waffles_region::Region;

/// Kind of data a datalist entry references.
///
/// The numeric codes follow the MB-System datalist convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// A nested datalist (format code -1).
    Datalist,
    /// Plain-text XYZ points (format code 168).
    Xyz,
    /// A georeferenced raster grid (format code 200).
    Raster,
}

impl SourceFormat {
    /// Map an MB-System format code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(SourceFormat::Datalist),
            168 => Some(SourceFormat::Xyz),
            200 => Some(SourceFormat::Raster),
            _ => None,
        }
    }

    /// The MB-System format code.
    pub fn code(&self) -> i32 {
        match self {
            SourceFormat::Datalist => -1,
            SourceFormat::Xyz => 168,
            SourceFormat::Raster => 200,
        }
    }

    /// Infer a format from a file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "datalist" | "mb-1" => Some(SourceFormat::Datalist),
            "xyz" | "csv" | "dat" | "ascii" => Some(SourceFormat::Xyz),
            "tif" | "tiff" => Some(SourceFormat::Raster),
            _ => None,
        }
    }
}

/// One parsed datalist line: `path [format] [weight] [metadata...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DatalistEntry {
    /// Path of the referenced file, resolved against the datalist's directory.
    pub path: PathBuf,
    /// Data kind.
    pub format: SourceFormat,
    /// Declared weight (defaults to 1.0).
    pub weight: f64,
    /// Free-form comma-separated metadata fields.
    pub metadata: Vec<String>,
}

impl DatalistEntry {
    /// Parse one datalist line. Returns `None` for blank lines and comments.
    ///
    /// Relative entry paths resolve against `base_dir`, the directory of the
    /// datalist being read (matching the MB-System convention).
    pub fn parse_line(line: &str, base_dir: &Path, datalist: &Path) -> Result<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        let mut fields = trimmed.split_whitespace();
        let raw_path = fields.next().ok_or_else(|| DatalistError::ParseEntry {
            line: line.to_string(),
            path: datalist.to_path_buf(),
        })?;
        let path = {
            let p = PathBuf::from(raw_path);
            if p.is_absolute() {
                p
            } else {
                base_dir.join(p)
            }
        };

        let format = match fields.next() {
            Some(code_str) => {
                let code: i32 =
                    code_str
                        .parse()
                        .map_err(|_| DatalistError::ParseEntry {
                            line: line.to_string(),
                            path: datalist.to_path_buf(),
                        })?;
                SourceFormat::from_code(code).ok_or(DatalistError::UnknownFormat {
                    code,
                    path: datalist.to_path_buf(),
                })?
            }
            None => SourceFormat::from_extension(&path)
                .ok_or_else(|| DatalistError::UnknownExtension { path: path.clone() })?,
        };

        let weight = match fields.next() {
            Some(w) => w.parse().map_err(|_| DatalistError::ParseEntry {
                line: line.to_string(),
                path: datalist.to_path_buf(),
            })?,
            None => 1.0,
        };

        let rest: Vec<String> = fields.map(str::to_string).collect();
        let metadata = if rest.is_empty() {
            Vec::new()
        } else {
            rest.join(" ")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect()
        };

        Ok(Some(DatalistEntry {
            path,
            format,
            weight,
            metadata,
        }))
    }
}

/// A leaf entry bound to its effective weight and known bounds.
///
/// Produced only by the resolver; the effective weight is the product of
/// all ancestor datalist weights with the entry's own.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    /// Data file path.
    pub path: PathBuf,
    /// Data kind (never [`SourceFormat::Datalist`]).
    pub format: SourceFormat,
    /// Effective weight.
    pub weight: f64,
    /// Bounding region, when cheap metadata could establish one.
    pub region: Option<Region>,
    /// Metadata fields carried from the entry line.
    pub metadata: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(line: &str) -> Result<Option<DatalistEntry>> {
        DatalistEntry::parse_line(line, Path::new("/data"), Path::new("/data/test.datalist"))
    }

    #[test]
    fn test_full_entry() {
        let e = parse("soundings.xyz 168 0.5 NOAA,2019").unwrap().unwrap();
        assert_eq!(e.path, PathBuf::from("/data/soundings.xyz"));
        assert_eq!(e.format, SourceFormat::Xyz);
        assert_relative_eq!(e.weight, 0.5);
        assert_eq!(e.metadata, vec!["NOAA".to_string(), "2019".to_string()]);
    }

    #[test]
    fn test_defaults_from_extension() {
        let e = parse("sub.datalist").unwrap().unwrap();
        assert_eq!(e.format, SourceFormat::Datalist);
        assert_relative_eq!(e.weight, 1.0);

        let e = parse("grid.tif").unwrap().unwrap();
        assert_eq!(e.format, SourceFormat::Raster);
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        assert!(parse("# a comment").unwrap().is_none());
        assert!(parse("   ").unwrap().is_none());
    }

    #[test]
    fn test_absolute_path_kept() {
        let e = parse("/elsewhere/pts.xyz 168 1").unwrap().unwrap();
        assert_eq!(e.path, PathBuf::from("/elsewhere/pts.xyz"));
    }

    #[test]
    fn test_bad_weight_is_parse_error() {
        assert!(matches!(
            parse("pts.xyz 168 heavy"),
            Err(DatalistError::ParseEntry { .. })
        ));
    }

    #[test]
    fn test_unknown_format_code() {
        assert!(matches!(
            parse("pts.xyz 300 1"),
            Err(DatalistError::UnknownFormat { code: 300, .. })
        ));
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            parse("mystery.bin"),
            Err(DatalistError::UnknownExtension { .. })
        ));
    }
}
