/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Dataset tailer (C2a)
//!
//! One long-lived loop per external dataset. The cursor is persisted
//! only after the fetched items were handed to the dedup writer, so a
//! crash replays the boundary and idempotent ingest absorbs the
//! duplicates.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use mp_database_postgres::IngestStateRepository;

use crate::collector::DatasetStream;
use crate::dedup::{DedupWriter, IngestOutcome};
use crate::error::IngestResult;
use crate::normalizer::Normalizer;

/// Items fetched per tick
const FETCH_LIMIT: usize = 500;

pub struct DatasetTailer {
  stream: Arc<dyn DatasetStream>,
  state: Arc<dyn IngestStateRepository>,
  writer: Arc<DedupWriter>,
  normalizer: Normalizer,
  tail_interval: Duration,
}

impl DatasetTailer {
  pub fn new(
    stream: Arc<dyn DatasetStream>,
    state: Arc<dyn IngestStateRepository>,
    writer: Arc<DedupWriter>,
    normalizer: Normalizer,
    tail_interval: Duration,
  ) -> Self {
    Self { stream, state, writer, normalizer, tail_interval }
  }

  /// Long-lived tail loop; exits when the shutdown flag flips
  pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
    let key = self.stream.dataset_key().to_string();
    info!("tailer for {} starting", key);

    loop {
      if *shutdown.borrow() {
        break;
      }

      match self.tick().await {
        Ok(0) => {}
        Ok(n) => debug!("tailer {} handed off {} items", key, n),
        Err(e) => warn!("tailer {} tick failed: {}", key, e),
      }

      tokio::select! {
        _ = tokio::time::sleep(self.tail_interval) => {}
        _ = shutdown.changed() => {}
      }
    }

    info!("tailer for {} stopped", key);
  }

  /// One fetch-normalize-ingest pass. The cursor advances to the last
  /// item that was fully handed off; an ingest failure mid-batch
  /// persists the progress made so far and surfaces the error.
  pub async fn tick(&self) -> IngestResult<usize> {
    let key = self.stream.dataset_key();
    let cursor = self.state.cursor(key).await?.unwrap_or(0);

    let items = self.stream.fetch_after(cursor, FETCH_LIMIT).await?;
    if items.is_empty() {
      return Ok(0);
    }

    let descriptor = self.stream.descriptor();
    let mut handed_off = 0usize;
    let mut last_acked = cursor;

    for (index, raw) in items {
      let collected_at = chrono::Utc::now();
      match self.normalizer.normalize(&raw, descriptor, collected_at) {
        Ok(mention) => {
          if let Err(e) = self.writer.ingest(&mention).await {
            // persist what we acked, then let the next tick replay from here
            self.state.store_cursor(key, last_acked).await?;
            return Err(e);
          }
          handed_off += 1;
        }
        Err(reason) => {
          debug!("tailer {} rejected item {}: {}", key, index, reason);
          self.writer.stats().record(IngestOutcome::Rejected);
        }
      }
      // rejected items are terminally handled, so the cursor moves past them
      last_acked = index;
    }

    if last_acked > cursor {
      self.state.store_cursor(key, last_acked).await?;
    }

    Ok(handed_off)
  }
}
