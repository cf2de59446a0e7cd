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

//! The claim dispatcher (C4's scheduling loop)
//!
//! One cooperative loop claims batches under skip-locked row locks and
//! feeds a bounded worker pool. Claim state lives in the rows, so a
//! crashed process leaks nothing: the janitor returns its claims to
//! `pending`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tracing::{error, info, warn};

use mp_database_postgres::{MentionRepository, TopicRepository};

use crate::error::AnalysisResult;
use crate::worker::{AnalysisConfig, Worker};

/// Running analysis counters, logged per period
#[derive(Debug, Default)]
pub struct AnalysisStats {
  analyzed: AtomicU64,
  failed: AtomicU64,
}

impl AnalysisStats {
  pub fn record_analyzed(&self) {
    self.analyzed.fetch_add(1, Ordering::Relaxed);
  }

  pub fn record_failed(&self) {
    self.failed.fetch_add(1, Ordering::Relaxed);
  }

  /// (analyzed, failed) since startup
  pub fn snapshot(&self) -> (u64, u64) {
    (self.analyzed.load(Ordering::Relaxed), self.failed.load(Ordering::Relaxed))
  }
}

pub struct Dispatcher {
  mentions: Arc<dyn MentionRepository>,
  topics: Arc<dyn TopicRepository>,
  worker: Arc<Worker>,
  config: Arc<AnalysisConfig>,
  semaphore: Arc<Semaphore>,
  stats: Arc<AnalysisStats>,
}

impl Dispatcher {
  pub fn new(
    mentions: Arc<dyn MentionRepository>,
    topics: Arc<dyn TopicRepository>,
    worker: Arc<Worker>,
    config: Arc<AnalysisConfig>,
  ) -> Self {
    let semaphore = Arc::new(Semaphore::new(config.max_workers));
    Self {
      mentions,
      topics,
      worker,
      config,
      semaphore,
      stats: Arc::new(AnalysisStats::default()),
    }
  }

  pub fn stats(&self) -> Arc<AnalysisStats> {
    Arc::clone(&self.stats)
  }

  /// Polling loop; exits when the shutdown flag flips. In-flight
  /// workers finish (or mark their mention failed) on their own.
  pub async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
    info!(
      "analysis dispatcher starting: batch_size={} max_workers={}",
      self.config.batch_size, self.config.max_workers
    );

    let mut shutdown_rx = shutdown.clone();
    loop {
      if *shutdown_rx.borrow() {
        break;
      }

      match self.tick(&shutdown).await {
        Ok(0) => {}
        Ok(claimed) => {
          let (analyzed, failed) = self.stats.snapshot();
          info!("claimed {} mentions (analyzed {}, failed {} total)", claimed, analyzed, failed);
        }
        Err(e) => warn!("dispatcher tick failed: {}", e),
      }

      tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)) => {}
        _ = shutdown_rx.changed() => {}
      }
    }

    info!("analysis dispatcher stopped");
  }

  /// Claim one batch and hand every row to a worker task. Dispatching a
  /// row waits only for pool capacity, never for results.
  pub async fn tick(&self, shutdown: &watch::Receiver<bool>) -> AnalysisResult<usize> {
    if self.semaphore.available_permits() == 0 {
      return Ok(0);
    }

    let claimed = self.mentions.claim_batch(self.config.batch_size).await?;
    if claimed.is_empty() {
      return Ok(0);
    }

    let topics = Arc::new(self.topics.active_topics().await?);
    let total = claimed.len();

    for mention in claimed {
      let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => break,
      };

      let worker = Arc::clone(&self.worker);
      let mentions = Arc::clone(&self.mentions);
      let stats = Arc::clone(&self.stats);
      let topics = Arc::clone(&topics);
      let shutdown = shutdown.clone();

      tokio::spawn(async move {
        let _permit = permit;
        let entry_id = mention.entry_id;

        match worker.analyze(&mention, &topics, &shutdown).await {
          Ok(commit) => match mentions.commit_analysis(entry_id, &commit).await {
            Ok(()) => stats.record_analyzed(),
            Err(e) => {
              error!("commit failed for mention {}: {}", entry_id, e);
              if let Err(e) = mentions.mark_failed(entry_id, "commit:database_error").await {
                error!("could not mark mention {} failed: {}", entry_id, e);
              }
              stats.record_failed();
            }
          },
          Err(err) => {
            warn!("analysis failed for mention {}: {}", entry_id, err);
            if let Err(e) = mentions.mark_failed(entry_id, &err.failure_reason()).await {
              error!("could not mark mention {} failed: {}", entry_id, e);
            }
            stats.record_failed();
          }
        }
      });
    }

    Ok(total)
  }

  /// Wait for every in-flight worker to finish (used on shutdown)
  pub async fn drain(&self) {
    if let Ok(permits) = self.semaphore.acquire_many(self.config.max_workers as u32).await {
      drop(permits);
    }
  }
}
