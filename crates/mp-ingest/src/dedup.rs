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

//! Deduplication + writer (C3)
//!
//! Single entry point for every normalized record, safe under
//! concurrency. Identity resolution order: `(platform, source_id)`,
//! then url, then fingerprint, then a bounded near-duplicate scan.
//! Matches merge engagement (last reported wins) and never touch
//! analysis fields; misses insert a fresh `pending` row.

use chrono::{Duration, Utc};
use similar::TextDiff;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use mp_database_postgres::MentionRepository;
use mp_models::CanonicalMention;

use crate::error::{IngestError, IngestResult};
use crate::normalizer::{fingerprint, normalize_text};

/// Texts shorter than this require exact equality instead of a ratio
const SHORT_TEXT_LEN: usize = 10;

const MAX_INSERT_RETRIES: u32 = 3;

/// What happened to one ingested record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
  Inserted,
  Updated,
  Rejected,
}

/// Configuration for the dedup writer
#[derive(Debug, Clone)]
pub struct DedupConfig {
  /// Ratcliff/Obershelp ratio at or above which two texts are the same
  pub similarity_threshold: f64,

  /// How far back the near-duplicate scan reaches, in hours
  pub window_hours: i64,
}

impl Default for DedupConfig {
  fn default() -> Self {
    Self { similarity_threshold: 0.85, window_hours: 24 }
  }
}

impl DedupConfig {
  pub fn from_settings(settings: &mp_core::Settings) -> Self {
    Self {
      similarity_threshold: settings.f64_or("deduplication.similarity_threshold", 0.85),
      window_hours: settings.i64_or("deduplication.window_hours", 24),
    }
  }
}

/// Running ingest counters, logged per period by the owning loop
#[derive(Debug, Default)]
pub struct IngestStats {
  inserted: AtomicU64,
  updated: AtomicU64,
  rejected: AtomicU64,
}

impl IngestStats {
  pub fn record(&self, outcome: IngestOutcome) {
    match outcome {
      IngestOutcome::Inserted => self.inserted.fetch_add(1, Ordering::Relaxed),
      IngestOutcome::Updated => self.updated.fetch_add(1, Ordering::Relaxed),
      IngestOutcome::Rejected => self.rejected.fetch_add(1, Ordering::Relaxed),
    };
  }

  /// (inserted, updated, rejected) since startup
  pub fn snapshot(&self) -> (u64, u64, u64) {
    (
      self.inserted.load(Ordering::Relaxed),
      self.updated.load(Ordering::Relaxed),
      self.rejected.load(Ordering::Relaxed),
    )
  }
}

/// The dedup writer (C3)
pub struct DedupWriter {
  mentions: Arc<dyn MentionRepository>,
  config: DedupConfig,
  stats: Arc<IngestStats>,
}

impl DedupWriter {
  pub fn new(mentions: Arc<dyn MentionRepository>, config: DedupConfig) -> Self {
    Self { mentions, config, stats: Arc::new(IngestStats::default()) }
  }

  pub fn stats(&self) -> Arc<IngestStats> {
    Arc::clone(&self.stats)
  }

  /// Insert-or-merge one canonical mention.
  ///
  /// Concurrent callers racing on the same identity are resolved by the
  /// unique index: a losing insert retries as an update. The
  /// near-duplicate scan is advisory; a race there can produce two rows,
  /// which a later pass may reconcile.
  pub async fn ingest(&self, mention: &CanonicalMention) -> IngestResult<IngestOutcome> {
    let fp = fingerprint(mention);

    if let Some(entry_id) = self
      .mentions
      .find_existing(
        &mention.platform,
        mention.source_id.as_deref(),
        mention.url.as_deref(),
        &fp,
      )
      .await?
    {
      self.mentions.update_engagement(entry_id, &mention.engagement).await?;
      self.stats.record(IngestOutcome::Updated);
      return Ok(IngestOutcome::Updated);
    }

    if let Some(entry_id) = self.find_near_duplicate(mention).await? {
      debug!("near-duplicate of mention {} on {}", entry_id, mention.platform);
      self.mentions.update_engagement(entry_id, &mention.engagement).await?;
      self.stats.record(IngestOutcome::Updated);
      return Ok(IngestOutcome::Updated);
    }

    self.insert_with_retry(mention, fp).await
  }

  /// Bounded scan for a same-platform row whose normalized text is the
  /// same message in different clothes
  async fn find_near_duplicate(&self, mention: &CanonicalMention) -> IngestResult<Option<i64>> {
    let normalized = normalize_text(&mention.text);
    if normalized.is_empty() {
      return Ok(None);
    }

    let since = Utc::now() - Duration::hours(self.config.window_hours);
    let candidates = self.mentions.recent_texts(&mention.platform, since).await?;

    for (entry_id, candidate_text) in candidates {
      let candidate_normalized = normalize_text(&candidate_text);
      if is_duplicate_text(&normalized, &candidate_normalized, self.config.similarity_threshold) {
        return Ok(Some(entry_id));
      }
    }
    Ok(None)
  }

  /// Insert, falling back to update when a concurrent writer wins the
  /// unique-index race. At most three attempts, then the record fails.
  async fn insert_with_retry(
    &self,
    mention: &CanonicalMention,
    fp: [u8; 32],
  ) -> IngestResult<IngestOutcome> {
    for attempt in 1..=MAX_INSERT_RETRIES {
      match self.mentions.insert_mention(mention, fp.to_vec()).await {
        Ok(_) => {
          self.stats.record(IngestOutcome::Inserted);
          return Ok(IngestOutcome::Inserted);
        }
        Err(err) if err.is_unique_violation() => {
          warn!("insert conflict on attempt {}, retrying as update", attempt);
          if let Some(entry_id) = self
            .mentions
            .find_existing(
              &mention.platform,
              mention.source_id.as_deref(),
              mention.url.as_deref(),
              &fp,
            )
            .await?
          {
            self.mentions.update_engagement(entry_id, &mention.engagement).await?;
            self.stats.record(IngestOutcome::Updated);
            return Ok(IngestOutcome::Updated);
          }
          // conflicting row not visible yet; loop and try again
        }
        Err(err) => return Err(err.into()),
      }
    }
    Err(IngestError::WriteConflict { attempts: MAX_INSERT_RETRIES })
  }
}

/// Normalized-text equality test: exact match for short texts, the
/// Ratcliff/Obershelp ratio otherwise
pub fn is_duplicate_text(a: &str, b: &str, threshold: f64) -> bool {
  if a.chars().count() < SHORT_TEXT_LEN || b.chars().count() < SHORT_TEXT_LEN {
    return a == b;
  }
  TextDiff::from_chars(a, b).ratio() as f64 >= threshold
}
