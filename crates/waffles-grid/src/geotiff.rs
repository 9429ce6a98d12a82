//! GeoTIFF read/write for raster tiles.
//!
//! Reads the grid, geotransform (ModelTiepoint + ModelPixelScale tags) and
//! GDAL_NODATA value; writes float32 grids with the same tags so external
//! tools and downstream GIS software pick up the georeferencing.

use crate::{GridError, RasterTile, Result, DEFAULT_NODATA};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tracing::debug;
use waffles_region::Region;

/// Georeferencing header of a GeoTIFF, readable without decoding samples.
#[derive(Debug, Clone, Copy)]
pub struct GeoTiffHeader {
    /// Geographic extent.
    pub region: Region,
    /// Cell size in x.
    pub inc_x: f64,
    /// Cell size in y.
    pub inc_y: f64,
    /// Grid shape as (cols, rows).
    pub shape: (usize, usize),
    /// No-data value, if tagged.
    pub nodata: Option<f32>,
}

fn open_decoder(path: &Path) -> Result<Decoder<std::fs::File>> {
    let file = std::fs::File::open(path)?;
    let decoder = Decoder::new(file)?;

    // Allow large grids; a 1/3 arc-second degree tile is ~466 MB of f32.
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    Ok(decoder.with_limits(limits))
}

fn read_geotransform(
    decoder: &mut Decoder<std::fs::File>,
    path: &Path,
) -> Result<(Region, f64, f64)> {
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag);
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag);
    if let (Ok(tiepoint), Ok(scale)) = (tiepoint, scale) {
        if tiepoint.len() >= 6 && scale.len() >= 2 {
            // Tiepoint is [i, j, k, x, y, z]: pixel (i,j) maps to geo (x,y).
            let tie_x = tiepoint[3];
            let tie_y = tiepoint[4];
            let inc_x = scale[0];
            let inc_y = scale[1];
            let (width, height) = decoder.dimensions()?;
            let region = Region::new(
                tie_x,
                tie_x + f64::from(width) * inc_x,
                tie_y - f64::from(height) * inc_y,
                tie_y,
            )
            .map_err(|_| {
                GridError::InvalidGeoTiff(format!(
                    "degenerate geotransform in {}",
                    path.display()
                ))
            })?;
            return Ok((region, inc_x, inc_y));
        }
    }
    Err(GridError::InvalidGeoTiff(format!(
        "missing ModelTiepoint/ModelPixelScale tags in {}",
        path.display()
    )))
}

fn read_nodata(decoder: &mut Decoder<std::fs::File>) -> Option<f32> {
    decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Read only the georeferencing header of a GeoTIFF.
///
/// Cheap enough to run during datalist resolution; the sample data is
/// never decoded.
pub fn read_header(path: &Path) -> Result<GeoTiffHeader> {
    let mut decoder = open_decoder(path)?;
    let (width, height) = decoder.dimensions()?;
    let (region, inc_x, inc_y) = read_geotransform(&mut decoder, path)?;
    let nodata = read_nodata(&mut decoder);
    Ok(GeoTiffHeader {
        region,
        inc_x,
        inc_y,
        shape: (width as usize, height as usize),
        nodata,
    })
}

/// Read a full GeoTIFF into a raster tile.
pub fn read(path: &Path) -> Result<RasterTile> {
    let mut decoder = open_decoder(path)?;
    let (width, height) = decoder.dimensions()?;
    let (region, inc_x, inc_y) = read_geotransform(&mut decoder, path)?;
    let nodata = read_nodata(&mut decoder).unwrap_or(DEFAULT_NODATA);

    let data = match decoder.read_image()? {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f32::from).collect(),
        _ => {
            return Err(GridError::UnsupportedDataType(format!(
                "unsupported sample format in {}",
                path.display()
            )));
        }
    };

    debug!(
        path = %path.display(),
        cols = width,
        rows = height,
        "read GeoTIFF"
    );
    RasterTile::from_data(
        region,
        inc_x,
        inc_y,
        nodata,
        width as usize,
        height as usize,
        data,
    )
}

/// Write a raster tile as a float32 GeoTIFF.
pub fn write(tile: &RasterTile, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(tile.cols() as u32, tile.rows() as u32)?;

    let region = tile.region();
    let scale = [tile.inc_x(), tile.inc_y(), 0.0];
    let tiepoint = [0.0, 0.0, 0.0, region.xmin, region.ymax, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])?;
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
    let nodata_str = format!("{}", tile.nodata());
    image
        .encoder()
        .write_tag(Tag::GdalNodata, nodata_str.as_str())?;

    image.write_data(tile.data())?;
    debug!(path = %path.display(), "wrote GeoTIFF");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.tif");
        let region = Region::new(-90.0, -89.0, 29.0, 30.0).unwrap();
        let mut tile = RasterTile::new_nodata(region, 0.01, 0.01, DEFAULT_NODATA);
        tile.set(10, 20, 42.5);
        write(&tile, &path).expect("write");

        let back = read(&path).expect("read");
        assert_eq!(back.cols(), tile.cols());
        assert_eq!(back.rows(), tile.rows());
        assert_relative_eq!(back.region().xmin, region.xmin, epsilon = 1e-9);
        assert_relative_eq!(back.region().ymax, region.ymax, epsilon = 1e-9);
        assert_relative_eq!(back.get(10, 20), 42.5);
        assert_relative_eq!(back.nodata(), DEFAULT_NODATA);
        assert!(back.is_nodata(back.get(0, 0)));
    }

    #[test]
    fn test_read_header_matches_tile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hdr.tif");
        let region = Region::new(0.0, 1.0, 0.0, 2.0).unwrap();
        let tile = RasterTile::new_nodata(region, 0.1, 0.1, DEFAULT_NODATA);
        write(&tile, &path).expect("write");

        let header = read_header(&path).expect("header");
        assert_eq!(header.shape, (10, 20));
        assert_relative_eq!(header.inc_x, 0.1, epsilon = 1e-12);
        assert_relative_eq!(header.region.ymax, 2.0, epsilon = 1e-9);
        assert_eq!(header.nodata, Some(DEFAULT_NODATA));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let err = read(Path::new("/nonexistent/grid.tif")).unwrap_err();
        assert!(matches!(err, GridError::Io(_)));
    }
}
