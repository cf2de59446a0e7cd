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

//! Base traits for pull collectors and dataset streams
//!
//! Per-platform adapters live outside the core; the scheduler and tailer
//! only see these interfaces. Adapters own their transport, credentials,
//! and paging, and must tolerate being cancelled at any await point.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mp_models::{RawRecord, SourceDescriptor, TimeWindow};

use crate::error::IngestResult;

/// Interval-scheduled pull collector
#[async_trait]
pub trait Collector: Send + Sync {
  /// Static description of this source (window policy, queries, cadence)
  fn descriptor(&self) -> &SourceDescriptor;

  /// Fetch raw records for the given queries inside the time window,
  /// up to `item_cap` items. Items slightly past `window.end` are
  /// tolerated; normalization bounds them.
  async fn collect(
    &self,
    queries: &[String],
    window: TimeWindow,
    item_cap: usize,
  ) -> IngestResult<Vec<RawRecord>>;
}

/// Long-lived external dataset a tailer streams from. The cursor is an
/// opaque monotonic index into the dataset.
#[async_trait]
pub trait DatasetStream: Send + Sync {
  /// Stable key the cursor is persisted under
  fn dataset_key(&self) -> &str;

  fn descriptor(&self) -> &SourceDescriptor;

  /// Items strictly after `cursor`, paired with their dataset index,
  /// in ascending index order
  async fn fetch_after(
    &self,
    cursor: i64,
    limit: usize,
  ) -> IngestResult<Vec<(i64, RawRecord)>>;
}

/// Per-source incremental window policy: `[last_success - overlap, now]`
/// clipped so a source that has never run (or has been down for long)
/// bounds its first window by `max_lookback_days`.
pub fn incremental_window(
  descriptor: &SourceDescriptor,
  last_success: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> TimeWindow {
  let floor = now - chrono::Duration::days(descriptor.max_lookback_days);
  let start = match last_success {
    Some(at) => at - chrono::Duration::hours(descriptor.overlap_hours),
    None => now - chrono::Duration::days(descriptor.lookback_days),
  };
  TimeWindow::new(start.max(floor), now)
}

/// Window for a degraded source: fixed interval only, no catch-up
pub fn degraded_window(descriptor: &SourceDescriptor, now: DateTime<Utc>) -> TimeWindow {
  let span = chrono::Duration::seconds(descriptor.interval_secs as i64)
    + chrono::Duration::hours(descriptor.overlap_hours);
  TimeWindow::new(now - span, now)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use mp_models::SourceType;

  fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
      platform: "news".to_string(),
      source_name: "press-wire".to_string(),
      source_type: SourceType::Journalist,
      queries: vec!["economy".to_string()],
      lookback_days: 7,
      max_lookback_days: 30,
      overlap_hours: 6,
      interval_secs: 3600,
      item_cap: 200,
    }
  }

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
  }

  #[test]
  fn test_window_never_run_uses_default_lookback() {
    let window = incremental_window(&descriptor(), None, now());
    assert_eq!(window.start, now() - chrono::Duration::days(7));
    assert_eq!(window.end, now());
  }

  #[test]
  fn test_window_applies_overlap() {
    let last = now() - chrono::Duration::hours(1);
    let window = incremental_window(&descriptor(), Some(last), now());
    assert_eq!(window.start, last - chrono::Duration::hours(6));
  }

  #[test]
  fn test_window_clips_to_max_lookback() {
    let last = now() - chrono::Duration::days(90);
    let window = incremental_window(&descriptor(), Some(last), now());
    assert_eq!(window.start, now() - chrono::Duration::days(30));
  }

  #[test]
  fn test_degraded_window_ignores_last_success() {
    let window = degraded_window(&descriptor(), now());
    assert_eq!(
      window.start,
      now() - chrono::Duration::seconds(3600) - chrono::Duration::hours(6)
    );
    assert_eq!(window.end, now());
  }
}
