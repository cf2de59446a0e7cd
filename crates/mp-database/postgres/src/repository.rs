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

//! Database repository abstraction layer
//!
//! Provides a clean abstraction over database operations for the
//! ingestion, analysis, and engine crates. Each consumer takes a trait
//! object so its logic can run against test doubles; the implementations
//! here are thin wrappers over the model-level queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::result::Error as DieselError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

use mp_core::SettingsSource;
use mp_models::{CanonicalMention, Engagement, TopicDefinition};

use crate::connection::{establish_pool, DbPool};
use crate::models::{
  aggregate, AnalysisCommit, CandidateMention, ClaimedMention, CollectorRun, IngestCursor, Issue,
  Mention, NewIssue, NewMention, SentimentInput, TopicRow,
};

/// Database repository errors
#[derive(Error, Debug)]
pub enum RepositoryError {
  #[error("Connection pool error: {0}")]
  PoolError(String),

  #[error("Database query error: {0}")]
  QueryError(String),

  #[error("Insert error: {0}")]
  InsertError(String),

  #[error("Serialization error: {0}")]
  SerializationError(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("Transaction error: {0}")]
  TransactionError(String),
}

impl RepositoryError {
  /// Whether a failed insert can be retried as an update (another
  /// writer got there first)
  pub fn is_unique_violation(&self) -> bool {
    matches!(self, RepositoryError::ConstraintViolation(_))
  }
}

impl From<DieselError> for RepositoryError {
  fn from(err: DieselError) -> Self {
    match err {
      DieselError::NotFound => RepositoryError::NotFound("Record not found".to_string()),
      DieselError::DatabaseError(kind, info) => match kind {
        diesel::result::DatabaseErrorKind::UniqueViolation => {
          RepositoryError::ConstraintViolation(info.message().to_string())
        }
        diesel::result::DatabaseErrorKind::ForeignKeyViolation => {
          RepositoryError::ConstraintViolation(info.message().to_string())
        }
        _ => RepositoryError::QueryError(info.message().to_string()),
      },
      _ => RepositoryError::QueryError(err.to_string()),
    }
  }
}

impl From<serde_json::Error> for RepositoryError {
  fn from(err: serde_json::Error) -> Self {
    RepositoryError::SerializationError(err.to_string())
  }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Database context that provides access to repositories and the
/// connection pool
#[derive(Clone)]
pub struct DatabaseContext {
  pool: Arc<DbPool>,
}

macro_rules! get_conn {
  ($pool:expr) => {
    $pool.get().await.map_err(|e| RepositoryError::PoolError(e.to_string()))?
  };
}

impl DatabaseContext {
  /// Create a new database context with connection pooling.
  ///
  /// Fails fast if the database is unavailable by testing the connection
  /// at startup.
  pub async fn new(database_url: &str) -> RepositoryResult<Self> {
    let pool = establish_pool(database_url).await.map_err(RepositoryError::PoolError)?;
    Ok(Self { pool: Arc::new(pool) })
  }

  pub fn from_pool(pool: DbPool) -> Self {
    Self { pool: Arc::new(pool) }
  }

  /// Get the underlying pool
  pub fn pool(&self) -> &DbPool {
    &self.pool
  }

  /// Create a mention repository instance
  pub fn mention_repository(&self) -> Arc<dyn MentionRepository> {
    Arc::new(MentionRepositoryImpl { pool: Arc::clone(&self.pool) })
  }

  /// Create a topic repository instance
  pub fn topic_repository(&self) -> Arc<dyn TopicRepository> {
    Arc::new(TopicRepositoryImpl { pool: Arc::clone(&self.pool) })
  }

  /// Create an issue repository instance
  pub fn issue_repository(&self) -> Arc<dyn IssueRepository> {
    Arc::new(IssueRepositoryImpl { pool: Arc::clone(&self.pool) })
  }

  /// Create an aggregate repository instance
  pub fn aggregate_repository(&self) -> Arc<dyn AggregateRepository> {
    Arc::new(AggregateRepositoryImpl { pool: Arc::clone(&self.pool) })
  }

  /// Create an ingest-state repository instance
  pub fn ingest_state_repository(&self) -> Arc<dyn IngestStateRepository> {
    Arc::new(IngestStateRepositoryImpl { pool: Arc::clone(&self.pool) })
  }
}

/// Repository for mention rows: dedup-side lookups and merges plus the
/// analysis claim/commit cycle
#[async_trait]
pub trait MentionRepository: Send + Sync {
  /// Probe for an existing row, in the dedup key order: `(platform,
  /// source_id)`, then url, then fingerprint
  async fn find_existing(
    &self,
    platform: &str,
    source_id: Option<&str>,
    url: Option<&str>,
    fingerprint: &[u8],
  ) -> RepositoryResult<Option<i64>>;

  /// Same-platform texts collected since `since`, for the near-duplicate
  /// scan
  async fn recent_texts(
    &self,
    platform: &str,
    since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<(i64, String)>>;

  /// Merge reported engagement into an existing row (last reported wins)
  async fn update_engagement(&self, entry_id: i64, engagement: &Engagement)
    -> RepositoryResult<()>;

  /// Insert a new pending row; a unique violation surfaces as
  /// `ConstraintViolation` so the caller can retry as an update
  async fn insert_mention(
    &self,
    mention: &CanonicalMention,
    fingerprint: Vec<u8>,
  ) -> RepositoryResult<i64>;

  /// Claim up to `batch_size` pending rows under skip-locked row locks
  async fn claim_batch(&self, batch_size: i64) -> RepositoryResult<Vec<ClaimedMention>>;

  /// Atomically commit one mention's analysis
  async fn commit_analysis(&self, entry_id: i64, commit: &AnalysisCommit) -> RepositoryResult<()>;

  async fn mark_failed(&self, entry_id: i64, reason: &str) -> RepositoryResult<()>;

  /// Janitor: rewrite stale `processing` claims back to `pending`
  async fn reset_stale_claims(&self, older_than_secs: i64) -> RepositoryResult<usize>;

  async fn count_by_status(&self, status: &str) -> RepositoryResult<i64>;
}

struct MentionRepositoryImpl {
  pool: Arc<DbPool>,
}

#[async_trait]
impl MentionRepository for MentionRepositoryImpl {
  async fn find_existing(
    &self,
    platform: &str,
    source_id: Option<&str>,
    url: Option<&str>,
    fingerprint: &[u8],
  ) -> RepositoryResult<Option<i64>> {
    let mut conn = get_conn!(self.pool);

    if let Some(source_id) = source_id {
      return Ok(Mention::find_id_by_platform_source_id(&mut conn, platform, source_id).await?);
    }
    if let Some(url) = url {
      return Ok(Mention::find_id_by_url(&mut conn, platform, url).await?);
    }
    Ok(Mention::find_id_by_fingerprint(&mut conn, fingerprint).await?)
  }

  async fn recent_texts(
    &self,
    platform: &str,
    since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<(i64, String)>> {
    let mut conn = get_conn!(self.pool);
    Ok(Mention::recent_texts_for_platform(&mut conn, platform, since).await?)
  }

  async fn update_engagement(
    &self,
    entry_id: i64,
    engagement: &Engagement,
  ) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    Mention::update_engagement(&mut conn, entry_id, engagement).await?;
    Ok(())
  }

  async fn insert_mention(
    &self,
    mention: &CanonicalMention,
    fingerprint: Vec<u8>,
  ) -> RepositoryResult<i64> {
    let mut conn = get_conn!(self.pool);
    let new_mention = NewMention::from_canonical(mention, fingerprint);
    Ok(Mention::insert(&mut conn, &new_mention).await?)
  }

  async fn claim_batch(&self, batch_size: i64) -> RepositoryResult<Vec<ClaimedMention>> {
    let mut conn = get_conn!(self.pool);
    Ok(Mention::claim_batch(&mut conn, batch_size).await?)
  }

  async fn commit_analysis(&self, entry_id: i64, commit: &AnalysisCommit) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    Mention::commit_analysis(&mut conn, entry_id, commit)
      .await
      .map_err(|e| RepositoryError::TransactionError(e.to_string()))
  }

  async fn mark_failed(&self, entry_id: i64, reason: &str) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    Mention::mark_failed(&mut conn, entry_id, reason).await?;
    Ok(())
  }

  async fn reset_stale_claims(&self, older_than_secs: i64) -> RepositoryResult<usize> {
    let mut conn = get_conn!(self.pool);
    Ok(Mention::reset_stale_claims(&mut conn, older_than_secs).await?)
  }

  async fn count_by_status(&self, status: &str) -> RepositoryResult<i64> {
    let mut conn = get_conn!(self.pool);
    Ok(Mention::count_by_status(&mut conn, status).await?)
  }
}

/// Repository for the read-only topic taxonomy
#[async_trait]
pub trait TopicRepository: Send + Sync {
  async fn active_topics(&self) -> RepositoryResult<Vec<TopicDefinition>>;

  async fn active_topic_keys(&self) -> RepositoryResult<Vec<String>>;
}

struct TopicRepositoryImpl {
  pool: Arc<DbPool>,
}

#[async_trait]
impl TopicRepository for TopicRepositoryImpl {
  async fn active_topics(&self) -> RepositoryResult<Vec<TopicDefinition>> {
    let mut conn = get_conn!(self.pool);
    let rows = TopicRow::load_active(&mut conn).await?;
    Ok(rows.iter().map(TopicRow::to_definition).collect())
  }

  async fn active_topic_keys(&self) -> RepositoryResult<Vec<String>> {
    let mut conn = get_conn!(self.pool);
    Ok(TopicRow::active_keys(&mut conn).await?)
  }
}

/// Repository for issues, their memberships, and the transition audit
#[async_trait]
pub trait IssueRepository: Send + Sync {
  async fn unissued_candidates(
    &self,
    topic_key: &str,
    since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<CandidateMention>>;

  async fn matchable_issues(&self, topic_key: &str) -> RepositoryResult<Vec<Issue>>;

  async fn non_archived_issues(&self) -> RepositoryResult<Vec<Issue>>;

  async fn create_issue(&self, new_issue: NewIssue) -> RepositoryResult<Uuid>;

  /// Attach members and refresh mention_count; returns the new count
  async fn attach_mentions(
    &self,
    issue_id: Uuid,
    members: &[(i64, f64)],
    detected_at: DateTime<Utc>,
  ) -> RepositoryResult<i32>;

  async fn update_centroid(&self, issue_id: Uuid, centroid: &[f32]) -> RepositoryResult<()>;

  async fn record_transition(
    &self,
    issue_id: Uuid,
    from_state: &str,
    to_state: &str,
    reason: &str,
  ) -> RepositoryResult<()>;

  async fn update_priority(&self, issue_id: Uuid, score: f64, band: &str) -> RepositoryResult<()>;

  async fn mention_count_between(
    &self,
    issue_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
  ) -> RepositoryResult<i64>;

  async fn last_mention_detected_at(
    &self,
    issue_id: Uuid,
  ) -> RepositoryResult<Option<DateTime<Utc>>>;
}

struct IssueRepositoryImpl {
  pool: Arc<DbPool>,
}

#[async_trait]
impl IssueRepository for IssueRepositoryImpl {
  async fn unissued_candidates(
    &self,
    topic_key: &str,
    since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<CandidateMention>> {
    let mut conn = get_conn!(self.pool);
    Ok(Issue::unissued_candidates(&mut conn, topic_key, since).await?)
  }

  async fn matchable_issues(&self, topic_key: &str) -> RepositoryResult<Vec<Issue>> {
    let mut conn = get_conn!(self.pool);
    Ok(Issue::matchable_by_topic(&mut conn, topic_key).await?)
  }

  async fn non_archived_issues(&self) -> RepositoryResult<Vec<Issue>> {
    let mut conn = get_conn!(self.pool);
    Ok(Issue::load_non_archived(&mut conn).await?)
  }

  async fn create_issue(&self, new_issue: NewIssue) -> RepositoryResult<Uuid> {
    let mut conn = get_conn!(self.pool);
    Ok(Issue::create(&mut conn, &new_issue).await?)
  }

  async fn attach_mentions(
    &self,
    issue_id: Uuid,
    members: &[(i64, f64)],
    detected_at: DateTime<Utc>,
  ) -> RepositoryResult<i32> {
    let mut conn = get_conn!(self.pool);
    Issue::attach_mentions(&mut conn, issue_id, members, detected_at)
      .await
      .map_err(|e| RepositoryError::TransactionError(e.to_string()))
  }

  async fn update_centroid(&self, issue_id: Uuid, centroid: &[f32]) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    Issue::update_centroid(&mut conn, issue_id, centroid).await?;
    Ok(())
  }

  async fn record_transition(
    &self,
    issue_id: Uuid,
    from_state: &str,
    to_state: &str,
    reason: &str,
  ) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    Issue::record_transition(&mut conn, issue_id, from_state, to_state, reason)
      .await
      .map_err(|e| RepositoryError::TransactionError(e.to_string()))
  }

  async fn update_priority(&self, issue_id: Uuid, score: f64, band: &str) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    Issue::update_priority(&mut conn, issue_id, score, band).await?;
    Ok(())
  }

  async fn mention_count_between(
    &self,
    issue_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
  ) -> RepositoryResult<i64> {
    let mut conn = get_conn!(self.pool);
    Ok(Issue::mention_count_between(&mut conn, issue_id, from, to).await?)
  }

  async fn last_mention_detected_at(
    &self,
    issue_id: Uuid,
  ) -> RepositoryResult<Option<DateTime<Utc>>> {
    let mut conn = get_conn!(self.pool);
    Ok(Issue::last_mention_detected_at(&mut conn, issue_id).await?)
  }
}

/// Repository for windowed aggregations, trends, and baselines
#[async_trait]
pub trait AggregateRepository: Send + Sync {
  async fn topic_inputs(
    &self,
    topic_key: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
  ) -> RepositoryResult<Vec<SentimentInput>>;

  async fn issue_inputs(
    &self,
    issue_id: Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
  ) -> RepositoryResult<Vec<SentimentInput>>;

  async fn upsert_aggregation(&self, row: &aggregate::AggregationUpsert) -> RepositoryResult<()>;

  async fn find_sentiment_index(
    &self,
    subject_kind: &str,
    subject_key: &str,
    window_size: &str,
    window_start: DateTime<Utc>,
  ) -> RepositoryResult<Option<i32>>;

  async fn upsert_trend(&self, row: &aggregate::TrendUpsert) -> RepositoryResult<()>;

  async fn daily_indices_since(
    &self,
    topic_key: &str,
    since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<i32>>;

  async fn upsert_baseline(
    &self,
    topic_key: &str,
    baseline_index: f64,
    current_deviation: f64,
    sample_windows: i32,
  ) -> RepositoryResult<()>;
}

struct AggregateRepositoryImpl {
  pool: Arc<DbPool>,
}

#[async_trait]
impl AggregateRepository for AggregateRepositoryImpl {
  async fn topic_inputs(
    &self,
    topic_key: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
  ) -> RepositoryResult<Vec<SentimentInput>> {
    let mut conn = get_conn!(self.pool);
    Ok(aggregate::topic_sentiment_inputs(&mut conn, topic_key, window_start, window_end).await?)
  }

  async fn issue_inputs(
    &self,
    issue_id: Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
  ) -> RepositoryResult<Vec<SentimentInput>> {
    let mut conn = get_conn!(self.pool);
    Ok(aggregate::issue_sentiment_inputs(&mut conn, issue_id, window_start, window_end).await?)
  }

  async fn upsert_aggregation(&self, row: &aggregate::AggregationUpsert) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    row.upsert(&mut conn).await?;
    Ok(())
  }

  async fn find_sentiment_index(
    &self,
    subject_kind: &str,
    subject_key: &str,
    window_size: &str,
    window_start: DateTime<Utc>,
  ) -> RepositoryResult<Option<i32>> {
    let mut conn = get_conn!(self.pool);
    Ok(
      aggregate::find_sentiment_index(&mut conn, subject_kind, subject_key, window_size, window_start)
        .await?,
    )
  }

  async fn upsert_trend(&self, row: &aggregate::TrendUpsert) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    row.upsert(&mut conn).await?;
    Ok(())
  }

  async fn daily_indices_since(
    &self,
    topic_key: &str,
    since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<i32>> {
    let mut conn = get_conn!(self.pool);
    Ok(aggregate::daily_indices_since(&mut conn, topic_key, since).await?)
  }

  async fn upsert_baseline(
    &self,
    topic_key: &str,
    baseline_index: f64,
    current_deviation: f64,
    sample_windows: i32,
  ) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    aggregate::upsert_baseline(&mut conn, topic_key, baseline_index, current_deviation, sample_windows)
      .await?;
    Ok(())
  }
}

/// Repository for ingestion bookkeeping: cursors, collector runs, and
/// config overrides
#[async_trait]
pub trait IngestStateRepository: Send + Sync {
  async fn cursor(&self, dataset_key: &str) -> RepositoryResult<Option<i64>>;

  async fn store_cursor(&self, dataset_key: &str, value: i64) -> RepositoryResult<()>;

  async fn collector_run(&self, source_key: &str) -> RepositoryResult<Option<CollectorRun>>;

  async fn record_success(&self, source_key: &str, at: DateTime<Utc>) -> RepositoryResult<()>;

  /// Returns the new degraded flag
  async fn record_failure(&self, source_key: &str, failure_limit: i32) -> RepositoryResult<bool>;

  async fn load_config_overrides(&self) -> RepositoryResult<HashMap<String, String>>;
}

struct IngestStateRepositoryImpl {
  pool: Arc<DbPool>,
}

#[async_trait]
impl IngestStateRepository for IngestStateRepositoryImpl {
  async fn cursor(&self, dataset_key: &str) -> RepositoryResult<Option<i64>> {
    let mut conn = get_conn!(self.pool);
    Ok(IngestCursor::get(&mut conn, dataset_key).await?)
  }

  async fn store_cursor(&self, dataset_key: &str, value: i64) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    IngestCursor::store(&mut conn, dataset_key, value).await?;
    Ok(())
  }

  async fn collector_run(&self, source_key: &str) -> RepositoryResult<Option<CollectorRun>> {
    let mut conn = get_conn!(self.pool);
    Ok(CollectorRun::get(&mut conn, source_key).await?)
  }

  async fn record_success(&self, source_key: &str, at: DateTime<Utc>) -> RepositoryResult<()> {
    let mut conn = get_conn!(self.pool);
    CollectorRun::record_success(&mut conn, source_key, at).await?;
    Ok(())
  }

  async fn record_failure(&self, source_key: &str, failure_limit: i32) -> RepositoryResult<bool> {
    let mut conn = get_conn!(self.pool);
    Ok(CollectorRun::record_failure(&mut conn, source_key, failure_limit).await?)
  }

  async fn load_config_overrides(&self) -> RepositoryResult<HashMap<String, String>> {
    let mut conn = get_conn!(self.pool);
    Ok(crate::models::state::load_config_overrides(&mut conn).await?)
  }
}

/// Store-backed settings layer
///
/// [`mp_core::SettingsSource::get`] is synchronous, so this source serves
/// lookups from an in-memory snapshot that a background task refreshes
/// from `config_overrides`. Runtime tuning lands within one refresh
/// interval, no restart needed.
pub struct StoreSettingsSource {
  cache: RwLock<HashMap<String, String>>,
}

impl StoreSettingsSource {
  pub fn new() -> Self {
    Self { cache: RwLock::new(HashMap::new()) }
  }

  /// Replace the snapshot with the current table contents
  pub async fn refresh(&self, repo: &dyn IngestStateRepository) -> RepositoryResult<()> {
    let overrides = repo.load_config_overrides().await?;
    if let Ok(mut cache) = self.cache.write() {
      *cache = overrides;
    }
    Ok(())
  }
}

impl Default for StoreSettingsSource {
  fn default() -> Self {
    Self::new()
  }
}

impl SettingsSource for StoreSettingsSource {
  fn get(&self, key: &str) -> Option<String> {
    self.cache.read().ok()?.get(key).cloned()
  }

  fn name(&self) -> &'static str {
    "store"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_unique_violation_mapping() {
    let err = RepositoryError::ConstraintViolation("duplicate key".to_string());
    assert!(err.is_unique_violation());
    let err = RepositoryError::QueryError("syntax".to_string());
    assert!(!err.is_unique_violation());
  }

  #[test]
  fn test_diesel_not_found_maps_to_not_found() {
    let err = RepositoryError::from(DieselError::NotFound);
    assert!(matches!(err, RepositoryError::NotFound(_)));
  }

  #[test]
  fn test_store_settings_source_empty_by_default() {
    let source = StoreSettingsSource::new();
    assert_eq!(source.get("processing.parallel.batch_size"), None);
    assert_eq!(source.name(), "store");
  }
}
