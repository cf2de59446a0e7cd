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

//! Recording repository doubles for engine tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use mp_database_postgres::models::{
  AggregationUpsert, CandidateMention, Issue, NewIssue, SentimentInput, TrendUpsert,
};
use mp_database_postgres::repository::RepositoryResult;
use mp_database_postgres::{AggregateRepository, IssueRepository, TopicRepository};
use mp_models::TopicDefinition;

use crate::issues::ClusterLabeler;

pub fn candidate(entry_id: i64, vector: Vec<f32>, content: &str) -> CandidateMention {
  CandidateMention {
    entry_id,
    vector,
    content: content.to_string(),
    published_at: Utc::now(),
  }
}

pub fn seeded_issue(
  issue_id: Uuid,
  topic_key: &str,
  slug: &str,
  state: &str,
  centroid: Vec<f32>,
  started_at: DateTime<Utc>,
) -> Issue {
  Issue {
    issue_id,
    topic_key: topic_key.to_string(),
    issue_slug: slug.to_string(),
    issue_label: slug.to_string(),
    state: state.to_string(),
    priority_score: 0.0,
    priority_band: "low".to_string(),
    mention_count: 0,
    centroid,
    started_at,
    last_activity_at: started_at,
    created_at: started_at,
    updated_at: started_at,
  }
}

/// Labeler double with a fixed answer
pub struct FixedLabeler(pub Option<String>);

#[async_trait]
impl ClusterLabeler for FixedLabeler {
  async fn label(&self, _samples: &[String]) -> Option<String> {
    self.0.clone()
  }
}

/// Topic repository double over a fixed key list
pub struct FakeTopicKeys(pub Vec<String>);

#[async_trait]
impl TopicRepository for FakeTopicKeys {
  async fn active_topics(&self) -> RepositoryResult<Vec<TopicDefinition>> {
    Ok(Vec::new())
  }

  async fn active_topic_keys(&self) -> RepositoryResult<Vec<String>> {
    Ok(self.0.clone())
  }
}

#[derive(Debug, Clone)]
struct MemberRow {
  issue_id: Uuid,
  mention_id: i64,
  detected_at: DateTime<Utc>,
}

/// Issue repository double that actually records creations, members,
/// centroids, priorities, and transitions
pub struct RecordingIssues {
  issues: Mutex<Vec<Issue>>,
  members: Mutex<Vec<MemberRow>>,
  transitions: Mutex<Vec<(Uuid, String, String, String)>>,
  candidates: Mutex<HashMap<String, Vec<CandidateMention>>>,
}

impl RecordingIssues {
  pub fn new() -> Self {
    Self {
      issues: Mutex::new(Vec::new()),
      members: Mutex::new(Vec::new()),
      transitions: Mutex::new(Vec::new()),
      candidates: Mutex::new(HashMap::new()),
    }
  }

  pub fn seed_candidates(&self, topic_key: &str, candidates: Vec<CandidateMention>) {
    self.candidates.lock().unwrap().insert(topic_key.to_string(), candidates);
  }

  pub fn seed_issue(&self, issue: Issue) {
    self.issues.lock().unwrap().push(issue);
  }

  pub fn seed_member(&self, issue_id: Uuid, mention_id: i64, detected_at: DateTime<Utc>) {
    self.members.lock().unwrap().push(MemberRow { issue_id, mention_id, detected_at });
  }

  pub fn issues(&self) -> Vec<Issue> {
    self.issues.lock().unwrap().clone()
  }

  pub fn transitions(&self) -> Vec<(Uuid, String, String, String)> {
    self.transitions.lock().unwrap().clone()
  }

  pub fn member_count(&self, issue_id: Uuid) -> usize {
    self.members.lock().unwrap().iter().filter(|m| m.issue_id == issue_id).count()
  }
}

impl Default for RecordingIssues {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl IssueRepository for RecordingIssues {
  async fn unissued_candidates(
    &self,
    topic_key: &str,
    _since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<CandidateMention>> {
    let issue_ids: Vec<Uuid> = self
      .issues
      .lock()
      .unwrap()
      .iter()
      .filter(|i| i.topic_key == topic_key)
      .map(|i| i.issue_id)
      .collect();
    let attached: Vec<i64> = self
      .members
      .lock()
      .unwrap()
      .iter()
      .filter(|m| issue_ids.contains(&m.issue_id))
      .map(|m| m.mention_id)
      .collect();

    Ok(
      self
        .candidates
        .lock()
        .unwrap()
        .get(topic_key)
        .map(|list| {
          list.iter().filter(|c| !attached.contains(&c.entry_id)).cloned().collect()
        })
        .unwrap_or_default(),
    )
  }

  async fn matchable_issues(&self, topic_key: &str) -> RepositoryResult<Vec<Issue>> {
    Ok(
      self
        .issues
        .lock()
        .unwrap()
        .iter()
        .filter(|i| i.topic_key == topic_key && i.state != "archived")
        .cloned()
        .collect(),
    )
  }

  async fn non_archived_issues(&self) -> RepositoryResult<Vec<Issue>> {
    Ok(self.issues.lock().unwrap().iter().filter(|i| i.state != "archived").cloned().collect())
  }

  async fn create_issue(&self, new_issue: NewIssue) -> RepositoryResult<Uuid> {
    let issue = Issue {
      issue_id: new_issue.issue_id,
      topic_key: new_issue.topic_key,
      issue_slug: new_issue.issue_slug,
      issue_label: new_issue.issue_label,
      state: new_issue.state,
      priority_score: new_issue.priority_score,
      priority_band: new_issue.priority_band,
      mention_count: new_issue.mention_count,
      centroid: new_issue.centroid,
      started_at: new_issue.started_at,
      last_activity_at: new_issue.last_activity_at,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };
    let issue_id = issue.issue_id;
    self.issues.lock().unwrap().push(issue);
    Ok(issue_id)
  }

  async fn attach_mentions(
    &self,
    issue_id: Uuid,
    members: &[(i64, f64)],
    detected_at: DateTime<Utc>,
  ) -> RepositoryResult<i32> {
    {
      let mut rows = self.members.lock().unwrap();
      for (mention_id, _) in members {
        let already = rows.iter().any(|m| m.issue_id == issue_id && m.mention_id == *mention_id);
        if !already {
          rows.push(MemberRow { issue_id, mention_id: *mention_id, detected_at });
        }
      }
    }
    let count = self.member_count(issue_id) as i32;
    let mut issues = self.issues.lock().unwrap();
    if let Some(issue) = issues.iter_mut().find(|i| i.issue_id == issue_id) {
      issue.mention_count = count;
      issue.last_activity_at = detected_at;
    }
    Ok(count)
  }

  async fn update_centroid(&self, issue_id: Uuid, centroid: &[f32]) -> RepositoryResult<()> {
    let mut issues = self.issues.lock().unwrap();
    if let Some(issue) = issues.iter_mut().find(|i| i.issue_id == issue_id) {
      issue.centroid = centroid.to_vec();
    }
    Ok(())
  }

  async fn record_transition(
    &self,
    issue_id: Uuid,
    from_state: &str,
    to_state: &str,
    reason: &str,
  ) -> RepositoryResult<()> {
    {
      let mut issues = self.issues.lock().unwrap();
      if let Some(issue) = issues.iter_mut().find(|i| i.issue_id == issue_id) {
        issue.state = to_state.to_string();
      }
    }
    self.transitions.lock().unwrap().push((
      issue_id,
      from_state.to_string(),
      to_state.to_string(),
      reason.to_string(),
    ));
    Ok(())
  }

  async fn update_priority(&self, issue_id: Uuid, score: f64, band: &str) -> RepositoryResult<()> {
    let mut issues = self.issues.lock().unwrap();
    if let Some(issue) = issues.iter_mut().find(|i| i.issue_id == issue_id) {
      issue.priority_score = score;
      issue.priority_band = band.to_string();
    }
    Ok(())
  }

  async fn mention_count_between(
    &self,
    issue_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
  ) -> RepositoryResult<i64> {
    Ok(
      self
        .members
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m.issue_id == issue_id && m.detected_at >= from && m.detected_at < to)
        .count() as i64,
    )
  }

  async fn last_mention_detected_at(
    &self,
    issue_id: Uuid,
  ) -> RepositoryResult<Option<DateTime<Utc>>> {
    Ok(
      self
        .members
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m.issue_id == issue_id)
        .map(|m| m.detected_at)
        .max(),
    )
  }
}

type AggregationKey = (String, String, String, DateTime<Utc>);

/// Aggregate repository double: seeded inputs, recorded upserts
pub struct RecordingAggregates {
  topic_inputs: Mutex<HashMap<String, Vec<(DateTime<Utc>, SentimentInput)>>>,
  issue_inputs: Mutex<HashMap<Uuid, Vec<(DateTime<Utc>, SentimentInput)>>>,
  aggregations: Mutex<HashMap<AggregationKey, AggregationUpsert>>,
  trends: Mutex<HashMap<AggregationKey, TrendUpsert>>,
  baselines: Mutex<HashMap<String, (f64, f64, i32)>>,
}

impl RecordingAggregates {
  pub fn new() -> Self {
    Self {
      topic_inputs: Mutex::new(HashMap::new()),
      issue_inputs: Mutex::new(HashMap::new()),
      aggregations: Mutex::new(HashMap::new()),
      trends: Mutex::new(HashMap::new()),
      baselines: Mutex::new(HashMap::new()),
    }
  }

  pub fn seed_topic_input(&self, topic_key: &str, published_at: DateTime<Utc>, input: SentimentInput) {
    self
      .topic_inputs
      .lock()
      .unwrap()
      .entry(topic_key.to_string())
      .or_default()
      .push((published_at, input));
  }

  pub fn seed_issue_input(&self, issue_id: Uuid, published_at: DateTime<Utc>, input: SentimentInput) {
    self.issue_inputs.lock().unwrap().entry(issue_id).or_default().push((published_at, input));
  }

  pub fn seed_aggregation_index(
    &self,
    subject_kind: &str,
    subject_key: &str,
    window_size: &str,
    window_start: DateTime<Utc>,
    sentiment_index: i32,
  ) {
    let key =
      (subject_kind.to_string(), subject_key.to_string(), window_size.to_string(), window_start);
    self.aggregations.lock().unwrap().insert(
      key,
      AggregationUpsert {
        subject_kind: subject_kind.to_string(),
        subject_key: subject_key.to_string(),
        window_size: window_size.to_string(),
        window_start,
        window_end: window_start,
        weighted_sentiment_score: 0.0,
        sentiment_index,
        sentiment_distribution: serde_json::json!({}),
        emotion_distribution: serde_json::json!({}),
        emotion_adjusted_severity: 0.0,
        mention_count: 0,
        total_influence_weight: 0.0,
        computed_at: window_start,
      },
    );
  }

  pub fn aggregation(
    &self,
    subject_kind: &str,
    subject_key: &str,
    window_size: &str,
    window_start: DateTime<Utc>,
  ) -> Option<AggregationUpsert> {
    self
      .aggregations
      .lock()
      .unwrap()
      .get(&(
        subject_kind.to_string(),
        subject_key.to_string(),
        window_size.to_string(),
        window_start,
      ))
      .cloned()
  }

  pub fn aggregation_count(&self) -> usize {
    self.aggregations.lock().unwrap().len()
  }

  pub fn trend(
    &self,
    subject_kind: &str,
    subject_key: &str,
    window_size: &str,
    window_start: DateTime<Utc>,
  ) -> Option<TrendUpsert> {
    self
      .trends
      .lock()
      .unwrap()
      .get(&(
        subject_kind.to_string(),
        subject_key.to_string(),
        window_size.to_string(),
        window_start,
      ))
      .cloned()
  }

  pub fn baseline(&self, topic_key: &str) -> Option<(f64, f64, i32)> {
    self.baselines.lock().unwrap().get(topic_key).copied()
  }
}

impl Default for RecordingAggregates {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl AggregateRepository for RecordingAggregates {
  async fn topic_inputs(
    &self,
    topic_key: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
  ) -> RepositoryResult<Vec<SentimentInput>> {
    Ok(
      self
        .topic_inputs
        .lock()
        .unwrap()
        .get(topic_key)
        .map(|list| {
          list
            .iter()
            .filter(|(at, _)| *at >= window_start && *at < window_end)
            .map(|(_, input)| input.clone())
            .collect()
        })
        .unwrap_or_default(),
    )
  }

  async fn issue_inputs(
    &self,
    issue_id: Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
  ) -> RepositoryResult<Vec<SentimentInput>> {
    Ok(
      self
        .issue_inputs
        .lock()
        .unwrap()
        .get(&issue_id)
        .map(|list| {
          list
            .iter()
            .filter(|(at, _)| *at >= window_start && *at < window_end)
            .map(|(_, input)| input.clone())
            .collect()
        })
        .unwrap_or_default(),
    )
  }

  async fn upsert_aggregation(&self, row: &AggregationUpsert) -> RepositoryResult<()> {
    let key = (
      row.subject_kind.clone(),
      row.subject_key.clone(),
      row.window_size.clone(),
      row.window_start,
    );
    self.aggregations.lock().unwrap().insert(key, row.clone());
    Ok(())
  }

  async fn find_sentiment_index(
    &self,
    subject_kind: &str,
    subject_key: &str,
    window_size: &str,
    window_start: DateTime<Utc>,
  ) -> RepositoryResult<Option<i32>> {
    Ok(
      self
        .aggregations
        .lock()
        .unwrap()
        .get(&(
          subject_kind.to_string(),
          subject_key.to_string(),
          window_size.to_string(),
          window_start,
        ))
        .map(|row| row.sentiment_index),
    )
  }

  async fn upsert_trend(&self, row: &TrendUpsert) -> RepositoryResult<()> {
    let key = (
      row.subject_kind.clone(),
      row.subject_key.clone(),
      row.window_size.clone(),
      row.window_start,
    );
    self.trends.lock().unwrap().insert(key, row.clone());
    Ok(())
  }

  async fn daily_indices_since(
    &self,
    topic_key: &str,
    since: DateTime<Utc>,
  ) -> RepositoryResult<Vec<i32>> {
    Ok(
      self
        .aggregations
        .lock()
        .unwrap()
        .iter()
        .filter(|((kind, key, size, start), _)| {
          kind == "topic" && key == topic_key && size == "24h" && *start >= since
        })
        .map(|(_, row)| row.sentiment_index)
        .collect(),
    )
  }

  async fn upsert_baseline(
    &self,
    topic_key: &str,
    baseline_index: f64,
    current_deviation: f64,
    sample_windows: i32,
  ) -> RepositoryResult<()> {
    self
      .baselines
      .lock()
      .unwrap()
      .insert(topic_key.to_string(), (baseline_index, current_deviation, sample_windows));
    Ok(())
  }
}
