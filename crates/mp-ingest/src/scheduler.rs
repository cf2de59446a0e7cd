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

//! Interval scheduler (C2b)
//!
//! Drives every enabled pull collector on its own cadence. Collectors
//! run concurrently up to `max_collector_workers`; a stuck collector is
//! cancelled at `collector_timeout` and never blocks the others.
//! Collector failures are absorbed here: the schedule always continues.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, info, warn};

use mp_database_postgres::IngestStateRepository;

use crate::collector::{degraded_window, incremental_window, Collector};
use crate::dedup::{DedupWriter, IngestOutcome};
use crate::error::{IngestError, IngestResult};
use crate::normalizer::Normalizer;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
  pub max_collector_workers: usize,
  pub collector_timeout_secs: u64,
  pub consecutive_failure_limit: i32,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self { max_collector_workers: 4, collector_timeout_secs: 300, consecutive_failure_limit: 5 }
  }
}

impl SchedulerConfig {
  pub fn from_settings(settings: &mp_core::Settings) -> Self {
    Self {
      max_collector_workers: settings.usize_or("ingestion.max_collector_workers", 4),
      collector_timeout_secs: settings.u64_or("processing.timeouts.collector_seconds", 300),
      consecutive_failure_limit: settings.i64_or("ingestion.consecutive_failure_limit", 5) as i32,
    }
  }
}

pub struct IntervalScheduler {
  collectors: Vec<Arc<dyn Collector>>,
  state: Arc<dyn IngestStateRepository>,
  writer: Arc<DedupWriter>,
  normalizer: Normalizer,
  config: SchedulerConfig,
  semaphore: Arc<Semaphore>,
  in_flight: Arc<Mutex<HashSet<String>>>,
}

impl IntervalScheduler {
  pub fn new(
    collectors: Vec<Arc<dyn Collector>>,
    state: Arc<dyn IngestStateRepository>,
    writer: Arc<DedupWriter>,
    normalizer: Normalizer,
    config: SchedulerConfig,
  ) -> Self {
    let semaphore = Arc::new(Semaphore::new(config.max_collector_workers));
    Self {
      collectors,
      state,
      writer,
      normalizer,
      config,
      semaphore,
      in_flight: Arc::new(Mutex::new(HashSet::new())),
    }
  }

  /// Scheduling loop; exits when the shutdown flag flips. Each due
  /// collector runs as its own task gated by the worker semaphore.
  pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
    info!("interval scheduler starting with {} collectors", self.collectors.len());
    let mut next_due: HashMap<String, Instant> = HashMap::new();

    loop {
      if *shutdown.borrow() {
        break;
      }

      let now = Instant::now();
      for collector in &self.collectors {
        let descriptor = collector.descriptor();
        let key = descriptor.source_key();

        let due = next_due.get(&key).map(|at| *at <= now).unwrap_or(true);
        if !due {
          continue;
        }
        if self.in_flight.lock().map(|running| running.contains(&key)).unwrap_or(false) {
          continue;
        }

        next_due.insert(key.clone(), now + Duration::from_secs(descriptor.interval_secs));
        if let Ok(mut running) = self.in_flight.lock() {
          running.insert(key.clone());
        }

        let scheduler = Arc::clone(&self);
        let collector = Arc::clone(collector);
        tokio::spawn(async move {
          let key = collector.descriptor().source_key();
          let _permit = match scheduler.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => return,
          };

          if let Err(e) = scheduler.invoke_collector(collector.as_ref()).await {
            warn!("collector {} failed: {}", key, e);
          }

          if let Ok(mut running) = scheduler.in_flight.lock() {
            running.remove(&key);
          }
        });
      }

      tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(1)) => {}
        _ = shutdown.changed() => {}
      }
    }

    info!("interval scheduler stopped");
  }

  /// One collector invocation: build the incremental window, run under
  /// the hard timeout, hand results to the dedup writer, and update the
  /// run bookkeeping. Partial results from a timed-out run are
  /// discarded with the cancelled future.
  pub(crate) async fn invoke_collector(&self, collector: &dyn Collector) -> IngestResult<usize> {
    let descriptor = collector.descriptor();
    let key = descriptor.source_key();
    let now = Utc::now();

    let run = self.state.collector_run(&key).await?;
    let degraded = run.as_ref().map(|r| r.degraded).unwrap_or(false);
    let last_success = run.and_then(|r| r.last_success_at);

    let window = if degraded {
      debug!("collector {} is degraded, using fixed window", key);
      degraded_window(descriptor, now)
    } else {
      incremental_window(descriptor, last_success, now)
    };

    let timeout = Duration::from_secs(self.config.collector_timeout_secs);
    let records = match tokio::time::timeout(
      timeout,
      collector.collect(&descriptor.queries, window, descriptor.item_cap),
    )
    .await
    {
      Ok(Ok(records)) => records,
      Ok(Err(e)) => {
        let now_degraded =
          self.state.record_failure(&key, self.config.consecutive_failure_limit).await?;
        if now_degraded {
          warn!("collector {} marked degraded", key);
        }
        return Err(e);
      }
      Err(_) => {
        let now_degraded =
          self.state.record_failure(&key, self.config.consecutive_failure_limit).await?;
        if now_degraded {
          warn!("collector {} marked degraded", key);
        }
        return Err(IngestError::CollectorTimeout {
          source_key: key,
          timeout_secs: self.config.collector_timeout_secs,
        });
      }
    };

    let mut handed_off = 0usize;
    for raw in records {
      let collected_at = Utc::now();
      match self.normalizer.normalize(&raw, descriptor, collected_at) {
        Ok(mention) => match self.writer.ingest(&mention).await {
          Ok(_) => handed_off += 1,
          Err(e) => warn!("ingest failed for {} record: {}", key, e),
        },
        Err(reason) => {
          self.writer.stats().record(IngestOutcome::Rejected);
          debug!("collector {} record rejected: {}", key, reason);
        }
      }
    }

    self.state.record_success(&key, now).await?;
    debug!("collector {} handed off {} records", key, handed_off);
    Ok(handed_off)
  }
}
