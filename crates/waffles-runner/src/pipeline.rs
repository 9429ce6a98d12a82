//! The DEM generation pipeline: resolve, chunk, grid, composite, write.

use crate::{Result, WaffleConfig, WafflesError};
use chrono::Datelike;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use waffles_datalist::ResolvedSource;
use waffles_grid::{gaussian_filter, merge, ClipSpec, FilterSpec, RasterTile, DEFAULT_NODATA};
use waffles_modules::{gmt_available, gmt_grdfilter, GriddingModule, ModuleOptions, ModuleRegistry};
use waffles_region::{chunk, parse_region_spec, Chunk, Region};

/// Arc-second style resolution fragment for derived output names.
///
/// The common third and ninth arc-second cell sizes map to the
/// conventional `13` and `19` markers; everything else rounds to whole
/// seconds.
fn inc_to_str(inc: f64) -> String {
    let seconds = inc * 3600.0;
    if (seconds - 1.0 / 3.0).abs() < 1e-6 {
        "13".to_string()
    } else if (seconds - 1.0 / 9.0).abs() < 1e-6 {
        "19".to_string()
    } else {
        format!("{}", seconds.round() as i64)
    }
}

/// Output stem for one region of a run.
fn output_stem(config: &WaffleConfig, region: &Region, multi_region: bool) -> String {
    if config.prefix {
        format!(
            "{}{}_{}_{}v1",
            config.name,
            inc_to_str(config.inc),
            region.name_fragment(),
            chrono::Utc::now().year()
        )
    } else if multi_region {
        format!("{}_{}", config.name, region.name_fragment())
    } else {
        config.name.clone()
    }
}

/// Run the full pipeline for every region of the config.
///
/// Module, filter and clip specs are validated up front, so a bad run
/// configuration fails before any data is resolved or any output file
/// is touched. Returns the paths of the written grids in region order.
pub fn run(config: &WaffleConfig) -> Result<Vec<PathBuf>> {
    if config.fmt != "GTiff" {
        return Err(WafflesError::Usage(format!(
            "unsupported output format {:?}, only GTiff is supported",
            config.fmt
        )));
    }
    let registry = ModuleRegistry::builtin();
    let (module_name, opts) = waffles_modules::parse_module_spec(&config.module)?;
    let module = registry.get(&module_name)?;
    module.validate(&opts)?;
    let filter = config
        .fltr
        .as_deref()
        .map(FilterSpec::parse)
        .transpose()?;
    let clip = config.clip.as_deref().map(ClipSpec::parse).transpose()?;

    let regions = parse_region_spec(&config.region)?;
    info!(
        module = module_name,
        regions = regions.len(),
        inc = config.inc,
        "starting waffles run"
    );

    let mut outputs = Vec::new();
    for region in &regions {
        let path = run_region(
            config,
            module,
            &opts,
            filter.as_ref(),
            clip.as_ref(),
            region,
            regions.len() > 1,
        )?;
        outputs.push(path);
    }
    Ok(outputs)
}

#[allow(clippy::too_many_arguments)]
fn run_region(
    config: &WaffleConfig,
    module: &dyn GriddingModule,
    opts: &ModuleOptions,
    filter: Option<&FilterSpec>,
    clip: Option<&ClipSpec>,
    region: &Region,
    multi_region: bool,
) -> Result<PathBuf> {
    let inc = config.inc;
    // The distribution region is what ships; the processing region adds
    // a rim that soaks up edge effects and is cut away at the end.
    let dist_region = region.extend(config.extend, inc);
    let proc_region = region.extend(config.extend + config.extend_proc, inc);
    let stem = output_stem(config, region, multi_region);
    info!(%region, %proc_region, stem, "processing region");

    let mut sources = waffles_datalist::resolve(&config.datalist, &proc_region)?;
    if !config.weights {
        for source in &mut sources {
            source.weight = 1.0;
        }
    }
    info!(sources = sources.len(), "resolved sources");

    if config.archive {
        let archive_dir = std::env::current_dir()?;
        let master =
            waffles_datalist::archive(&sources, &proc_region, &archive_dir, &stem)?;
        info!(path = %master.display(), "archived sources");
    }
    if config.spat_meta {
        let path = PathBuf::from(format!("{stem}_sm.geojson"));
        waffles_datalist::write_spatial_metadata(&sources, &dist_region, &path)?;
    }

    let chunks = chunk(&proc_region, inc, inc, config.chunk);
    let tiles = grid_chunks(config, module, opts, &sources, &chunks, inc)?;
    let mut dem = merge(&tiles, &proc_region, inc, inc, DEFAULT_NODATA);

    if let Some(clip) = clip {
        clip.apply(&mut dem)?;
    }
    if let Some(filter) = filter {
        dem = apply_filter(dem, filter)?;
    }
    if let Some(sample_inc) = config.sample_inc {
        dem = waffles_grid::resample(&dem, sample_inc, sample_inc);
    }
    dem = dem.crop(&dist_region)?;

    if config.mask {
        write_mask(config, &sources, &proc_region, &dist_region, clip, &stem)?;
    }

    // Write through a .part file so a crashed run never leaves a
    // truncated grid under the final name.
    let out = PathBuf::from(format!("{stem}.tif"));
    let part = PathBuf::from(format!("{stem}.tif.part"));
    waffles_grid::geotiff::write(&dem, &part)?;
    std::fs::rename(&part, &out)?;
    info!(path = %out.display(), "wrote DEM");
    Ok(out)
}

/// Apply the post-gridding smoothing pass.
///
/// Cells at or above the split value never enter the filter input and
/// come back bit-for-bit, whichever backend runs.
fn apply_filter(dem: RasterTile, filter: &FilterSpec) -> Result<RasterTile> {
    if filter.use_gmt && gmt_available() {
        filter_below_split(dem, filter.split_value, |low| {
            gmt_grdfilter(low, filter.dist).map_err(WafflesError::from)
        })
    } else {
        Ok(gaussian_filter(&dem, filter.dist, filter.split_value))
    }
}

/// Run `backend` on the part of `dem` below the split and recombine.
fn filter_below_split(
    dem: RasterTile,
    split_value: Option<f64>,
    backend: impl FnOnce(&RasterTile) -> Result<RasterTile>,
) -> Result<RasterTile> {
    let Some(split) = split_value else {
        return backend(&dem);
    };
    let nodata = dem.nodata();
    let mut low = dem.clone();
    for v in low.data_mut() {
        if !dem.is_nodata(*v) && f64::from(*v) >= split {
            *v = nodata;
        }
    }
    let mut out = backend(&low)?;
    for (idx, &original) in dem.data().iter().enumerate() {
        if !dem.is_nodata(original) && f64::from(original) >= split {
            out.data_mut()[idx] = original;
        }
    }
    Ok(out)
}

/// Data-mask raster: 1 where any source sample fell, no-data elsewhere.
///
/// Built on the processing region and run through the same clip,
/// resample and cut steps as the DEM, so the two rasters stay
/// cell-aligned. Lands at `{stem}_msk.tif`.
fn write_mask(
    config: &WaffleConfig,
    sources: &[ResolvedSource],
    proc_region: &Region,
    dist_region: &Region,
    clip: Option<&ClipSpec>,
    stem: &str,
) -> Result<()> {
    let registry = ModuleRegistry::builtin();
    let (name, opts) = waffles_modules::parse_module_spec("num:mode=k")?;
    let module = registry.get(&name)?;
    let mut mask = module.generate(sources, proc_region, config.inc, config.inc, &opts)?;
    if let Some(clip) = clip {
        clip.apply(&mut mask)?;
    }
    if let Some(sample_inc) = config.sample_inc {
        mask = waffles_grid::resample(&mask, sample_inc, sample_inc);
    }
    let mask = mask.crop(dist_region)?;
    let path = PathBuf::from(format!("{stem}_msk.tif"));
    waffles_grid::geotiff::write(&mask, &path)?;
    info!(path = %path.display(), "wrote data mask");
    Ok(())
}

/// Grid every chunk on a worker pool, deterministic row-major output.
fn grid_chunks(
    config: &WaffleConfig,
    module: &dyn GriddingModule,
    opts: &ModuleOptions,
    sources: &[ResolvedSource],
    chunks: &[Chunk],
    inc: f64,
) -> Result<Vec<(Chunk, RasterTile)>> {
    let workers = config
        .threads
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
        .max(1)
        .min(chunks.len().max(1));

    let (tx, rx) = crossbeam_channel::unbounded::<Chunk>();
    for c in chunks {
        // An unbounded channel never blocks here.
        let _ = tx.send(*c);
    }
    drop(tx);

    let results: Mutex<Vec<(Chunk, RasterTile)>> = Mutex::new(Vec::with_capacity(chunks.len()));
    let failure: Mutex<Option<WafflesError>> = Mutex::new(None);
    let stop = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let rx = rx.clone();
            let results = &results;
            let failure = &failure;
            let stop = &stop;
            scope.spawn(move || {
                while let Ok(chunk) = rx.recv() {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    match module.generate(sources, &chunk.region, inc, inc, opts) {
                        Ok(tile) => results.lock().push((chunk, tile)),
                        Err(e) if config.keep_going => {
                            warn!(
                                row = chunk.row,
                                col = chunk.col,
                                error = %e,
                                "chunk failed, substituting empty tile"
                            );
                            let tile =
                                RasterTile::new_nodata(chunk.region, inc, inc, DEFAULT_NODATA);
                            results.lock().push((chunk, tile));
                        }
                        Err(e) => {
                            stop.store(true, Ordering::Relaxed);
                            let mut slot = failure.lock();
                            if slot.is_none() {
                                *slot = Some(WafflesError::Chunk {
                                    row: chunk.row,
                                    col: chunk.col,
                                    region: chunk.region,
                                    source: e,
                                });
                            }
                            break;
                        }
                    }
                }
            });
        }
    });

    if let Some(err) = failure.into_inner() {
        return Err(err);
    }
    let mut tiles = results.into_inner();
    tiles.sort_by_key(|(c, _)| (c.row, c.col));
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_split_filter_shields_upper_cells_from_backend() {
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let mut dem = RasterTile::new_nodata(region, 0.1, 0.1, DEFAULT_NODATA);
        dem.data_mut().fill(-4.0);
        dem.set(2, 3, 5.0);

        let out = filter_below_split(dem.clone(), Some(0.0), |low| {
            // The land cell must not reach the backend at all.
            assert!(low.is_nodata(low.get(2, 3)));
            let mut t = low.clone();
            for v in t.data_mut() {
                *v = 0.0;
            }
            Ok(t)
        })
        .expect("filter");

        // Land comes back bit-for-bit; bathy takes the backend's output.
        assert_eq!(out.get(2, 3).to_bits(), 5.0f32.to_bits());
        assert_relative_eq!(out.get(0, 0), 0.0);
    }

    #[test]
    fn test_no_split_passes_whole_grid_to_backend() {
        let region = Region::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let mut dem = RasterTile::new_nodata(region, 0.1, 0.1, DEFAULT_NODATA);
        dem.set(2, 3, 5.0);
        let out = filter_below_split(dem, None, |low| {
            assert_relative_eq!(low.get(2, 3), 5.0);
            Ok(low.clone())
        })
        .expect("filter");
        assert_relative_eq!(out.get(2, 3), 5.0);
    }

    #[test]
    fn test_inc_to_str() {
        assert_eq!(inc_to_str(1.0 / 3600.0), "1");
        assert_eq!(inc_to_str(1.0 / 3.0 / 3600.0), "13");
        assert_eq!(inc_to_str(1.0 / 9.0 / 3600.0), "19");
        assert_eq!(inc_to_str(3.0 / 3600.0), "3");
    }

    #[test]
    fn test_output_stem_prefix_naming() {
        let config = WaffleConfig {
            datalist: "d.datalist".into(),
            region: String::new(),
            inc: 1.0 / 9.0 / 3600.0,
            sample_inc: None,
            module: "nearest".to_string(),
            name: "ncei".to_string(),
            prefix: true,
            fmt: "GTiff".to_string(),
            epsg: 4326,
            extend: 0,
            extend_proc: 20,
            weights: false,
            fltr: None,
            clip: None,
            chunk: 0,
            archive: false,
            spat_meta: false,
            mask: false,
            keep_going: false,
            threads: None,
        };
        let region = Region::new(-90.0, -89.0, 29.0, 30.0).unwrap();
        let year = chrono::Utc::now().year();
        assert_eq!(
            output_stem(&config, &region, false),
            format!("ncei19_n30x00w090x00_{year}v1")
        );
    }
}
