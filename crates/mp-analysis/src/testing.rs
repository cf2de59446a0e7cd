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

//! Repository doubles for analysis tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use mp_database_postgres::models::{
  AnalysisCommit, CandidateMention, ClaimedMention, Issue, NewIssue,
};
use mp_database_postgres::repository::{RepositoryError, RepositoryResult};
use mp_database_postgres::{IssueRepository, MentionRepository, TopicRepository};
use mp_models::{CanonicalMention, Engagement, TopicDefinition};

pub fn claimed_mention(entry_id: i64, content: &str) -> ClaimedMention {
  ClaimedMention {
    entry_id,
    content: content.to_string(),
    title: None,
    platform: "twitter".to_string(),
    source_type: "citizen".to_string(),
    author_verified: false,
    direct_reach: 0,
    cumulative_reach: 0,
    published_at: Utc::now(),
  }
}

#[derive(Debug, Clone)]
struct FakeMentionRow {
  entry_id: i64,
  content: String,
  status: String,
  failure_reason: Option<String>,
}

/// Mention repository double covering the claim/commit cycle
pub struct FakeMentions {
  rows: Mutex<Vec<FakeMentionRow>>,
}

impl FakeMentions {
  pub fn with_pending(items: &[(i64, &str)]) -> Self {
    Self {
      rows: Mutex::new(
        items
          .iter()
          .map(|(entry_id, content)| FakeMentionRow {
            entry_id: *entry_id,
            content: content.to_string(),
            status: "pending".to_string(),
            failure_reason: None,
          })
          .collect(),
      ),
    }
  }

  pub fn status_count(&self, status: &str) -> usize {
    self.rows.lock().unwrap().iter().filter(|r| r.status == status).count()
  }

  pub fn failure_reason_of(&self, entry_id: i64) -> Option<String> {
    self
      .rows
      .lock()
      .unwrap()
      .iter()
      .find(|r| r.entry_id == entry_id)
      .and_then(|r| r.failure_reason.clone())
  }
}

#[async_trait]
impl MentionRepository for FakeMentions {
  async fn find_existing(
    &self,
    _platform: &str,
    _source_id: Option<&str>,
    _url: Option<&str>,
    _fingerprint: &[u8],
  ) -> RepositoryResult<Option<i64>> {
    Ok(None)
  }

  async fn recent_texts(
    &self,
    _platform: &str,
    _since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<(i64, String)>> {
    Ok(Vec::new())
  }

  async fn update_engagement(
    &self,
    _entry_id: i64,
    _engagement: &Engagement,
  ) -> RepositoryResult<()> {
    Ok(())
  }

  async fn insert_mention(
    &self,
    _mention: &CanonicalMention,
    _fingerprint: Vec<u8>,
  ) -> RepositoryResult<i64> {
    Err(RepositoryError::QueryError("not supported by FakeMentions".to_string()))
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
        claimed.push(claimed_mention(row.entry_id, &row.content));
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

  async fn mark_failed(&self, entry_id: i64, reason: &str) -> RepositoryResult<()> {
    let mut rows = self.rows.lock().unwrap();
    match rows.iter_mut().find(|r| r.entry_id == entry_id) {
      Some(row) => {
        row.status = "failed".to_string();
        row.failure_reason = Some(reason.to_string());
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
    Ok(self.status_count(status) as i64)
  }
}

/// Topic repository double serving a fixed taxonomy
pub struct FakeTopics {
  topics: Vec<TopicDefinition>,
}

impl FakeTopics {
  pub fn new(topics: Vec<TopicDefinition>) -> Self {
    Self { topics }
  }
}

#[async_trait]
impl TopicRepository for FakeTopics {
  async fn active_topics(&self) -> RepositoryResult<Vec<TopicDefinition>> {
    Ok(self.topics.clone())
  }

  async fn active_topic_keys(&self) -> RepositoryResult<Vec<String>> {
    Ok(self.topics.iter().map(|t| t.topic_key.clone()).collect())
  }
}

/// Issue repository double: serves fixed matchable issues, records
/// nothing
pub struct FakeIssues {
  issues: Vec<Issue>,
}

impl FakeIssues {
  pub fn new(issues: Vec<Issue>) -> Self {
    Self { issues }
  }

  pub fn issue(
    issue_id: Uuid,
    topic_key: &str,
    slug: &str,
    label: &str,
    state: &str,
    centroid: Vec<f32>,
  ) -> Issue {
    Issue {
      issue_id,
      topic_key: topic_key.to_string(),
      issue_slug: slug.to_string(),
      issue_label: label.to_string(),
      state: state.to_string(),
      priority_score: 0.0,
      priority_band: "low".to_string(),
      mention_count: 3,
      centroid,
      started_at: Utc::now(),
      last_activity_at: Utc::now(),
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }
}

#[async_trait]
impl IssueRepository for FakeIssues {
  async fn unissued_candidates(
    &self,
    _topic_key: &str,
    _since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<CandidateMention>> {
    Ok(Vec::new())
  }

  async fn matchable_issues(&self, topic_key: &str) -> RepositoryResult<Vec<Issue>> {
    Ok(self.issues.iter().filter(|i| i.topic_key == topic_key).cloned().collect())
  }

  async fn non_archived_issues(&self) -> RepositoryResult<Vec<Issue>> {
    Ok(self.issues.clone())
  }

  async fn create_issue(&self, _new_issue: NewIssue) -> RepositoryResult<Uuid> {
    Err(RepositoryError::QueryError("not supported by FakeIssues".to_string()))
  }

  async fn attach_mentions(
    &self,
    _issue_id: Uuid,
    members: &[(i64, f64)],
    _detected_at: DateTime<Utc>,
  ) -> RepositoryResult<i32> {
    Ok(members.len() as i32)
  }

  async fn update_centroid(&self, _issue_id: Uuid, _centroid: &[f32]) -> RepositoryResult<()> {
    Ok(())
  }

  async fn record_transition(
    &self,
    _issue_id: Uuid,
    _from_state: &str,
    _to_state: &str,
    _reason: &str,
  ) -> RepositoryResult<()> {
    Ok(())
  }

  async fn update_priority(
    &self,
    _issue_id: Uuid,
    _score: f64,
    _band: &str,
  ) -> RepositoryResult<()> {
    Ok(())
  }

  async fn mention_count_between(
    &self,
    _issue_id: Uuid,
    _from: DateTime<Utc>,
    _to: DateTime<Utc>,
  ) -> RepositoryResult<i64> {
    Ok(0)
  }

  async fn last_mention_detected_at(
    &self,
    _issue_id: Uuid,
  ) -> RepositoryResult<Option<DateTime<Utc>>> {
    Ok(None)
  }
}
