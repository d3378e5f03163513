//! Config-to-NDJSON runs of the loader pipeline.

use bil_common::Encoding;
use bil_loader::{run_sweep, BatchWriter, TileDocument};
use bil_reader::testdata::write_bil;
use bil_reader::{LayerConfig, NoDataPolicy, SweepConfig};
use test_utils::{create_masked_grid, create_sequence, scratch_dir};

fn config_for(dir: &tempfile::TempDir) -> SweepConfig {
    // 10 x 10 tiles, right half is sea.
    let alt = write_bil(
        dir.path(),
        "alt.bil",
        Encoding::SignedShort,
        &create_masked_grid(10, 10, -9999, |col, _| col >= 5),
    );
    let prec = write_bil(
        dir.path(),
        "prec.bil",
        Encoding::UnsignedShortBE,
        &create_sequence(0, 100),
    );

    let mut prec_layer =
        LayerConfig::new("prec", prec.display().to_string()).with_encoding(Encoding::UnsignedShortBE);
    prec_layer.no_data = 65535;

    SweepConfig {
        grid: bil_common::GridSpec::new(360, (0, 1), (1, 1)).unwrap(),
        buffer_tiles: 16,
        skip: 0,
        no_data_policy: NoDataPolicy::ShortCircuitOnFirst,
        layers: vec![
            LayerConfig::new("alt", alt.display().to_string()),
            prec_layer,
        ],
    }
}

fn documents(bytes: Vec<u8>) -> Vec<serde_json::Value> {
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_sweep_writes_land_tiles() {
    let dir = scratch_dir();
    let config = config_for(&dir);

    let mut out = Vec::new();
    let stats = run_sweep(
        config.build_filter().unwrap(),
        None,
        BatchWriter::new(&mut out, 7),
    )
    .unwrap();
    assert_eq!(stats.documents, 50);
    assert_eq!(stats.batches, 8);

    let docs = documents(out);
    assert_eq!(docs.len(), 50);
    let first = &docs[0];
    assert_eq!(first["_id"], 1);
    assert_eq!(first["pt"]["type"], "Point");
    assert_eq!(first["alt"], 0);
    assert_eq!(first["prec"], 0);
    assert_eq!(docs[5]["_id"], 11);
    assert_eq!(docs[5]["tile"], serde_json::json!([0, 1]));
}

#[test]
fn test_resume_from_reported_key() {
    let dir = scratch_dir();
    let mut config = config_for(&dir);

    let mut head = Vec::new();
    let stats = run_sweep(
        config.build_filter().unwrap(),
        Some(12),
        BatchWriter::new(&mut head, 5),
    )
    .unwrap();
    assert_eq!(stats.last_key, Some(22));

    config.skip = stats.last_key.unwrap();
    let mut tail = Vec::new();
    run_sweep(
        config.build_filter().unwrap(),
        None,
        BatchWriter::new(&mut tail, 5),
    )
    .unwrap();

    let mut resumed = documents(head);
    resumed.extend(documents(tail));

    let mut full = Vec::new();
    config.skip = 0;
    run_sweep(
        config.build_filter().unwrap(),
        None,
        BatchWriter::new(&mut full, 100),
    )
    .unwrap();
    assert_eq!(resumed, documents(full));
}

#[test]
fn test_point_lookup_matches_sweep_document() {
    let dir = scratch_dir();
    let config = config_for(&dir);

    let mut sampler = config.build_sampler().unwrap();
    let record = sampler.sample(0.25, 0.55).unwrap().unwrap();
    let doc = serde_json::to_value(TileDocument::from(&record)).unwrap();

    assert_eq!(doc["_id"], 43);
    assert_eq!(doc["tile"], serde_json::json!([2, 4]));
    assert_eq!(doc["alt"], 42);
    assert_eq!(doc["prec"], 42);

    // Sea tile: masked by the first layer.
    assert!(sampler.sample(0.75, 0.55).unwrap().is_none());
}
