//! Batched newline-delimited JSON output.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// Totals reported when a writer finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub documents: u64,
    pub batches: u64,
    /// Key of the last document written; a sweep resumed with this value as
    /// `skip` continues right after it.
    pub last_key: Option<u64>,
}

/// Buffers serialized documents and writes them in batches.
pub struct BatchWriter<W: Write> {
    out: W,
    batch_size: usize,
    pending: Vec<u8>,
    pending_docs: usize,
    pending_last_key: Option<u64>,
    stats: LoadStats,
}

impl<W: Write> BatchWriter<W> {
    pub fn new(out: W, batch_size: usize) -> Self {
        Self {
            out,
            batch_size: batch_size.max(1),
            pending: Vec::new(),
            pending_docs: 0,
            pending_last_key: None,
            stats: LoadStats::default(),
        }
    }

    /// Queue one document, flushing when the batch is full.
    pub fn push<T: Serialize>(&mut self, key: u64, document: &T) -> Result<()> {
        serde_json::to_writer(&mut self.pending, document)
            .with_context(|| format!("Failed to serialize document {}", key))?;
        self.pending.push(b'\n');
        self.pending_docs += 1;
        self.pending_last_key = Some(key);

        if self.pending_docs >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Write out the pending batch, if any.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending_docs == 0 {
            return Ok(());
        }
        self.out
            .write_all(&self.pending)
            .and_then(|_| self.out.flush())
            .context("Failed to write batch")?;

        self.stats.documents += self.pending_docs as u64;
        self.stats.batches += 1;
        self.stats.last_key = self.pending_last_key;
        info!(
            batch = self.stats.batches,
            documents = self.pending_docs,
            total = self.stats.documents,
            last_key = ?self.stats.last_key,
            "Flushed batch"
        );

        self.pending.clear();
        self.pending_docs = 0;
        Ok(())
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Flush the remainder and return the totals.
    pub fn finish(mut self) -> Result<LoadStats> {
        self.flush()?;
        Ok(self.stats)
    }
}
