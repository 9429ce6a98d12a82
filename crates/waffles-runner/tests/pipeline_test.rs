//! End-to-end pipeline runs against fixture datalists.

use approx::assert_relative_eq;
use std::path::Path;
use waffles_runner::{run, WaffleConfig, WafflesError};

fn base_config(dir: &Path) -> WaffleConfig {
    WaffleConfig {
        datalist: dir.join("root.datalist"),
        region: "-90/-89/29/30".to_string(),
        inc: 0.00083333,
        sample_inc: None,
        module: "nearest".to_string(),
        name: dir.join("out").to_str().unwrap().to_string(),
        prefix: false,
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
        threads: Some(2),
    }
}

fn write_fixture(dir: &Path, xyz: &str) {
    std::fs::write(dir.join("pts.xyz"), xyz).unwrap();
    std::fs::write(dir.join("root.datalist"), "pts.xyz 168 1\n").unwrap();
}

#[test]
fn test_single_point_nearest_run() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "-89.5 29.5 -10.0\n");
    let config = base_config(dir.path());

    let outputs = run(&config).expect("run");
    assert_eq!(outputs.len(), 1);
    assert!(outputs[0].exists());
    assert!(!dir.path().join("out.tif.part").exists());

    let dem = waffles_grid::geotiff::read(&outputs[0]).expect("read output");
    assert_eq!(dem.cols(), 1200);
    assert_eq!(dem.rows(), 1200);
    let (row, col) = dem.cell_at(-89.5, 29.5).expect("cell");
    assert_relative_eq!(dem.get(row, col), -10.0);
    // The point fills only its neighborhood; the far corners stay empty.
    assert!(dem.is_nodata(dem.get(0, 0)));
    assert!(dem.is_nodata(dem.get(1199, 1199)));
}

#[test]
fn test_unknown_module_fails_before_output() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "-89.5 29.5 -10.0\n");
    let mut config = base_config(dir.path());
    config.module = "kriging:power=2".to_string();

    let err = run(&config).unwrap_err();
    assert!(matches!(err, WafflesError::Module(_)));
    assert!(err.to_string().contains("kriging"));
    assert!(!dir.path().join("out.tif").exists());
    assert!(!dir.path().join("out.tif.part").exists());
}

#[test]
fn test_bad_option_fails_before_output() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "-89.5 29.5 -10.0\n");
    let mut config = base_config(dir.path());
    config.module = "nearest:tension=0.35".to_string();

    assert!(run(&config).is_err());
    assert!(!dir.path().join("out.tif").exists());
}

#[test]
fn test_chunked_run_matches_unchunked() {
    let dir = tempfile::tempdir().unwrap();
    let mut xyz = String::new();
    for i in 0..40 {
        let x = -89.95 + f64::from(i) * 0.023;
        let y = 29.05 + f64::from(i % 7) * 0.13;
        xyz.push_str(&format!("{x} {y} {}\n", -5.0 - f64::from(i) * 0.1));
    }
    write_fixture(dir.path(), &xyz);

    let mut whole = base_config(dir.path());
    whole.inc = 0.01;
    whole.name = dir.path().join("whole").to_str().unwrap().to_string();
    let mut chunked = whole.clone();
    chunked.chunk = 3;
    chunked.name = dir.path().join("chunked").to_str().unwrap().to_string();

    let a = run(&whole).expect("whole run");
    let b = run(&chunked).expect("chunked run");
    let dem_a = waffles_grid::geotiff::read(&a[0]).expect("read");
    let dem_b = waffles_grid::geotiff::read(&b[0]).expect("read");
    assert_eq!(dem_a.cols(), dem_b.cols());
    assert_eq!(dem_a.rows(), dem_b.rows());
    for idx in 0..dem_a.data().len() {
        assert_eq!(
            dem_a.data()[idx].to_bits(),
            dem_b.data()[idx].to_bits(),
            "cell {idx} differs between chunked and unchunked runs"
        );
    }
}

#[test]
fn test_empty_region_yields_all_nodata_grid() {
    let dir = tempfile::tempdir().unwrap();
    // Points far outside the requested region.
    write_fixture(dir.path(), "10.0 10.0 -10.0\n");
    let mut config = base_config(dir.path());
    config.inc = 0.01;

    let outputs = run(&config).expect("run");
    let dem = waffles_grid::geotiff::read(&outputs[0]).expect("read");
    assert!(dem.is_all_nodata());
    assert_eq!(dem.cols(), 100);
}

#[test]
fn test_side_channels_written() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "-89.5 29.5 -10.0\n");
    let mut config = base_config(dir.path());
    config.inc = 0.01;
    config.spat_meta = true;

    run(&config).expect("run");
    // Spatial metadata lands next to the output stem.
    let sm = format!("{}_sm.geojson", config.name);
    assert!(Path::new(&sm).exists());
    let body = std::fs::read_to_string(&sm).unwrap();
    assert!(body.contains("FeatureCollection"));
}

#[test]
fn test_mask_raster_flags_data_cells() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "-89.5 29.5 -10.0\n");
    let mut config = base_config(dir.path());
    config.inc = 0.01;
    config.mask = true;

    let outputs = run(&config).expect("run");
    let msk_path = format!("{}_msk.tif", config.name);
    let mask = waffles_grid::geotiff::read(Path::new(&msk_path)).expect("read mask");
    let dem = waffles_grid::geotiff::read(&outputs[0]).expect("read dem");
    assert_eq!(mask.cols(), dem.cols());
    assert_eq!(mask.rows(), dem.rows());

    // The sampled cell is flagged, untouched corners are not.
    let (row, col) = mask.cell_at(-89.5, 29.5).expect("cell");
    assert_relative_eq!(mask.get(row, col), 1.0);
    assert!(mask.is_nodata(mask.get(0, 0)));
}

#[test]
fn test_non_gtiff_format_fails_before_output() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "-89.5 29.5 -10.0\n");
    let mut config = base_config(dir.path());
    config.fmt = "netCDF".to_string();

    let err = run(&config).unwrap_err();
    assert!(matches!(err, WafflesError::Usage(_)));
    assert!(err.to_string().contains("netCDF"));
    assert!(!dir.path().join("out.tif").exists());
}

#[test]
fn test_weighting_flag_controls_weights() {
    let dir = tempfile::tempdir().unwrap();
    // Two sources in the same cell with different weights; the num
    // module's weighted mean moves toward the heavier source only when
    // weights are honored.
    std::fs::write(dir.path().join("a.xyz"), "-89.505 29.505 0.0\n").unwrap();
    std::fs::write(dir.path().join("b.xyz"), "-89.506 29.506 -10.0\n").unwrap();
    std::fs::write(
        dir.path().join("root.datalist"),
        "a.xyz 168 3\nb.xyz 168 1\n",
    )
    .unwrap();

    let mut config = base_config(dir.path());
    config.inc = 0.01;
    config.module = "num:mode=m".to_string();
    config.weights = true;
    config.name = dir.path().join("weighted").to_str().unwrap().to_string();
    let weighted = run(&config).expect("run");
    let dem = waffles_grid::geotiff::read(&weighted[0]).expect("read");
    let (row, col) = dem.cell_at(-89.505, 29.505).expect("cell");
    assert_relative_eq!(dem.get(row, col), -2.5);

    config.weights = false;
    config.name = dir.path().join("flat").to_str().unwrap().to_string();
    let flat = run(&config).expect("run");
    let dem = waffles_grid::geotiff::read(&flat[0]).expect("read");
    let (row, col) = dem.cell_at(-89.505, 29.505).expect("cell");
    assert_relative_eq!(dem.get(row, col), -5.0);
}
