//! Drives a sweep into a [`BatchWriter`].

use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use bil_reader::ValidTileFilter;

use crate::document::TileDocument;
use crate::writer::{BatchWriter, LoadStats};

/// Write every accepted tile, stopping after `limit` documents if given.
pub fn run_sweep<W: Write>(
    filter: ValidTileFilter,
    limit: Option<u64>,
    mut writer: BatchWriter<W>,
) -> Result<LoadStats> {
    let grid = *filter.inner().grid();
    info!(
        columns = grid.columns(),
        rows = grid.rows(),
        skip = filter.inner().position().skip,
        layers = filter.inner().layers().count(),
        "Starting sweep"
    );

    let limit = limit.map_or(usize::MAX, |limit| limit as usize);
    for record in filter.take(limit) {
        let record = record.context("Sweep failed")?;
        writer.push(record.key, &TileDocument::from(&record))?;
    }

    let stats = writer.finish()?;
    info!(
        documents = stats.documents,
        batches = stats.batches,
        last_key = ?stats.last_key,
        "Sweep complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bil_common::{Encoding, GridSpec};
    use bil_reader::testdata::register_bil;
    use bil_reader::{IteratorOptions, MultiFileTileIterator, NoDataPolicy};

    fn filter(dir: &tempfile::TempDir, skip: u64) -> ValidTileFilter {
        let grid = GridSpec::new(3600, (0, 2), (5, 2)).unwrap();
        let mut iter = MultiFileTileIterator::new(
            grid,
            IteratorOptions {
                buffer_tiles: 4,
                skip,
                policy: NoDataPolicy::ShortCircuitOnFirst,
            },
        )
        .unwrap();
        iter.set_layer(register_bil(
            dir.path(),
            "alt",
            Encoding::SignedShort,
            1,
            -9999,
            &[1, 2, -9999, 4, 5, 6, 7, 8, 9, 10],
        ))
        .unwrap();
        ValidTileFilter::new(iter)
    }

    #[test]
    fn test_limit_and_resume() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = Vec::new();
        let stats = run_sweep(filter(&dir, 0), Some(4), BatchWriter::new(&mut first, 3)).unwrap();
        assert_eq!(stats.documents, 4);
        assert_eq!(stats.last_key, Some(5));

        let mut rest = Vec::new();
        let resumed = filter(&dir, stats.last_key.unwrap());
        let stats = run_sweep(resumed, None, BatchWriter::new(&mut rest, 3)).unwrap();
        assert_eq!(stats.documents, 5);

        let text = String::from_utf8(first).unwrap() + &String::from_utf8(rest).unwrap();
        let ids: Vec<u64> = text
            .lines()
            .map(|line| {
                let doc: serde_json::Value = serde_json::from_str(line).unwrap();
                doc["_id"].as_u64().unwrap()
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 4, 5, 6, 7, 8, 9, 10]);
    }
}
