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

//! In-memory repository doubles for ingestion tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use mp_database_postgres::models::{AnalysisCommit, ClaimedMention};
use mp_database_postgres::repository::{RepositoryError, RepositoryResult};
use mp_database_postgres::{IngestStateRepository, MentionRepository};
use mp_models::{CanonicalMention, Engagement};

#[derive(Debug, Clone)]
struct FakeRow {
  entry_id: i64,
  platform: String,
  source_id: Option<String>,
  url: Option<String>,
  fingerprint: Vec<u8>,
  content: String,
  engagement: Engagement,
  status: String,
  collected_at: DateTime<Utc>,
}

/// Mention repository double backed by a Vec
pub struct InMemoryMentions {
  rows: Mutex<Vec<FakeRow>>,
  next_id: AtomicI64,
  conflict_armed: AtomicBool,
  conflict_source_id: Mutex<Option<String>>,
}

impl InMemoryMentions {
  pub fn new() -> Self {
    Self {
      rows: Mutex::new(Vec::new()),
      next_id: AtomicI64::new(1),
      conflict_armed: AtomicBool::new(false),
      conflict_source_id: Mutex::new(None),
    }
  }

  pub fn row_count(&self) -> usize {
    self.rows.lock().unwrap().len()
  }

  pub fn likes_of(&self, entry_id: i64) -> Option<i64> {
    self
      .rows
      .lock()
      .unwrap()
      .iter()
      .find(|r| r.entry_id == entry_id)
      .map(|r| r.engagement.likes)
  }

  /// Arm a simulated unique-index race: the next insert writes the row
  /// as if a concurrent ingester beat us to it, then fails with a
  /// constraint violation.
  pub fn fail_next_insert_with_conflict(&self, source_id: Option<&str>) {
    self.conflict_armed.store(true, Ordering::SeqCst);
    *self.conflict_source_id.lock().unwrap() = source_id.map(String::from);
  }

  fn push_row(&self, mention: &CanonicalMention, fingerprint: Vec<u8>) -> i64 {
    let entry_id = self.next_id.fetch_add(1, Ordering::SeqCst);
    self.rows.lock().unwrap().push(FakeRow {
      entry_id,
      platform: mention.platform.clone(),
      source_id: mention.source_id.clone(),
      url: mention.url.clone(),
      fingerprint,
      content: mention.text.clone(),
      engagement: mention.engagement,
      status: "pending".to_string(),
      collected_at: mention.collected_at,
    });
    entry_id
  }
}

impl Default for InMemoryMentions {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl MentionRepository for InMemoryMentions {
  async fn find_existing(
    &self,
    platform: &str,
    source_id: Option<&str>,
    url: Option<&str>,
    fingerprint: &[u8],
  ) -> RepositoryResult<Option<i64>> {
    let rows = self.rows.lock().unwrap();
    if let Some(source_id) = source_id {
      return Ok(
        rows
          .iter()
          .find(|r| r.platform == platform && r.source_id.as_deref() == Some(source_id))
          .map(|r| r.entry_id),
      );
    }
    if let Some(url) = url {
      return Ok(
        rows
          .iter()
          .find(|r| r.platform == platform && r.url.as_deref() == Some(url))
          .map(|r| r.entry_id),
      );
    }
    Ok(rows.iter().find(|r| r.fingerprint == fingerprint).map(|r| r.entry_id))
  }

  async fn recent_texts(
    &self,
    platform: &str,
    since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<(i64, String)>> {
    Ok(
      self
        .rows
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.platform == platform && r.collected_at >= since)
        .map(|r| (r.entry_id, r.content.clone()))
        .collect(),
    )
  }

  async fn update_engagement(
    &self,
    entry_id: i64,
    engagement: &Engagement,
  ) -> RepositoryResult<()> {
    let mut rows = self.rows.lock().unwrap();
    match rows.iter_mut().find(|r| r.entry_id == entry_id) {
      Some(row) => {
        row.engagement = *engagement;
        Ok(())
      }
      None => Err(RepositoryError::NotFound(format!("mention {}", entry_id))),
    }
  }

  async fn insert_mention(
    &self,
    mention: &CanonicalMention,
    fingerprint: Vec<u8>,
  ) -> RepositoryResult<i64> {
    if self.conflict_armed.swap(false, Ordering::SeqCst) {
      let mut racer = mention.clone();
      racer.source_id = self.conflict_source_id.lock().unwrap().clone();
      self.push_row(&racer, fingerprint);
      return Err(RepositoryError::ConstraintViolation("duplicate key".to_string()));
    }

    if let Some(source_id) = &mention.source_id {
      let exists = self
        .rows
        .lock()
        .unwrap()
        .iter()
        .any(|r| r.platform == mention.platform && r.source_id.as_deref() == Some(source_id));
      if exists {
        return Err(RepositoryError::ConstraintViolation("duplicate key".to_string()));
      }
    }

    Ok(self.push_row(mention, fingerprint))
  }

  async fn claim_batch(&self, batch_size: i64) -> RepositoryResult<Vec<ClaimedMention>> {
    let mut rows = self.rows.lock().unwrap();
    let mut claimed = Vec::new();
    for row in rows.iter_mut() {
      if claimed.len() as i64 >= batch_size {
        break;
      }
      if row.status == "pending" {
        row.status = "processing".to_string();
        claimed.push(ClaimedMention {
          entry_id: row.entry_id,
          content: row.content.clone(),
          title: None,
          platform: row.platform.clone(),
          source_type: "citizen".to_string(),
          author_verified: false,
          direct_reach: 0,
          cumulative_reach: 0,
          published_at: row.collected_at,
        });
      }
    }
    Ok(claimed)
  }

  async fn commit_analysis(
    &self,
    entry_id: i64,
    _commit: &AnalysisCommit,
  ) -> RepositoryResult<()> {
    let mut rows = self.rows.lock().unwrap();
    match rows.iter_mut().find(|r| r.entry_id == entry_id) {
      Some(row) => {
        row.status = "completed".to_string();
        Ok(())
      }
      None => Err(RepositoryError::NotFound(format!("mention {}", entry_id))),
    }
  }

  async fn mark_failed(&self, entry_id: i64, _reason: &str) -> RepositoryResult<()> {
    let mut rows = self.rows.lock().unwrap();
    match rows.iter_mut().find(|r| r.entry_id == entry_id) {
      Some(row) => {
        row.status = "failed".to_string();
        Ok(())
      }
      None => Err(RepositoryError::NotFound(format!("mention {}", entry_id))),
    }
  }

  async fn reset_stale_claims(&self, _older_than_secs: i64) -> RepositoryResult<usize> {
    let mut rows = self.rows.lock().unwrap();
    let mut reset = 0;
    for row in rows.iter_mut() {
      if row.status == "processing" {
        row.status = "pending".to_string();
        reset += 1;
      }
    }
    Ok(reset)
  }

  async fn count_by_status(&self, status: &str) -> RepositoryResult<i64> {
    Ok(self.rows.lock().unwrap().iter().filter(|r| r.status == status).count() as i64)
  }
}

/// Ingest-state repository double
pub struct InMemoryIngestState {
  cursors: Mutex<HashMap<String, i64>>,
  runs: Mutex<HashMap<String, mp_database_postgres::models::CollectorRun>>,
  overrides: Mutex<HashMap<String, String>>,
}

impl InMemoryIngestState {
  pub fn new() -> Self {
    Self {
      cursors: Mutex::new(HashMap::new()),
      runs: Mutex::new(HashMap::new()),
      overrides: Mutex::new(HashMap::new()),
    }
  }

  pub fn stored_cursor(&self, key: &str) -> Option<i64> {
    self.cursors.lock().unwrap().get(key).copied()
  }

  pub async fn set_cursor(&self, key: &str, value: i64) {
    self.cursors.lock().unwrap().insert(key.to_string(), value);
  }
}

impl Default for InMemoryIngestState {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl IngestStateRepository for InMemoryIngestState {
  async fn cursor(&self, dataset_key: &str) -> RepositoryResult<Option<i64>> {
    Ok(self.cursors.lock().unwrap().get(dataset_key).copied())
  }

  async fn store_cursor(&self, dataset_key: &str, value: i64) -> RepositoryResult<()> {
    self.cursors.lock().unwrap().insert(dataset_key.to_string(), value);
    Ok(())
  }

  async fn collector_run(
    &self,
    source_key: &str,
  ) -> RepositoryResult<Option<mp_database_postgres::models::CollectorRun>> {
    Ok(self.runs.lock().unwrap().get(source_key).cloned())
  }

  async fn record_success(&self, source_key: &str, at: DateTime<Utc>) -> RepositoryResult<()> {
    self.runs.lock().unwrap().insert(
      source_key.to_string(),
      mp_database_postgres::models::CollectorRun {
        source_key: source_key.to_string(),
        last_success_at: Some(at),
        consecutive_failures: 0,
        degraded: false,
        updated_at: Utc::now(),
      },
    );
    Ok(())
  }

  async fn record_failure(&self, source_key: &str, failure_limit: i32) -> RepositoryResult<bool> {
    let mut runs = self.runs.lock().unwrap();
    let failures = runs.get(source_key).map(|r| r.consecutive_failures).unwrap_or(0) + 1;
    let degraded = failures >= failure_limit;
    let last_success_at = runs.get(source_key).and_then(|r| r.last_success_at);
    runs.insert(
      source_key.to_string(),
      mp_database_postgres::models::CollectorRun {
        source_key: source_key.to_string(),
        last_success_at,
        consecutive_failures: failures,
        degraded,
        updated_at: Utc::now(),
      },
    );
    Ok(degraded)
  }

  async fn load_config_overrides(&self) -> RepositoryResult<HashMap<String, String>> {
    Ok(self.overrides.lock().unwrap().clone())
  }
}
