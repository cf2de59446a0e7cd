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

//! Issue detection: cluster recent unissued mentions, merge into
//! existing issues by centroid similarity, create the rest
//!
//! The centroid is the issue's real identity; slugs are cosmetic and
//! only exist for human eyes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use mp_client::ClassifierClient;
use mp_database_postgres::models::NewIssue;
use mp_database_postgres::IssueRepository;
use mp_models::embedding::{cosine_similarity, weighted_centroid};
use mp_models::text::normalize_text;
use mp_models::IssueState;

use crate::clustering::{cluster_candidates, Cluster};
use crate::error::EngineResult;

const SLUG_SUFFIX_LEN: usize = 6;
const LABEL_SAMPLE_COUNT: usize = 5;

/// `{topic}-{YYYYMMDD}-{random6}`, lowercase alphanumeric suffix
pub fn generate_slug(topic_key: &str, date: chrono::NaiveDate) -> String {
  const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
  let mut rng = rand::rng();
  let suffix: String = (0..SLUG_SUFFIX_LEN)
    .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
    .collect();
  format!("{}-{}-{}", topic_key, date.format("%Y%m%d"), suffix)
}

/// Most frequent non-trivial word across the cluster's texts; the
/// labelling fallback when the classifier cannot be reached
pub fn fallback_label(texts: &[String]) -> String {
  let mut counts: HashMap<String, usize> = HashMap::new();
  for text in texts {
    for word in normalize_text(text).split_whitespace() {
      if word.len() >= 4 {
        *counts.entry(word.to_string()).or_insert(0) += 1;
      }
    }
  }
  counts
    .into_iter()
    .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
    .map(|(word, _)| word)
    .unwrap_or_else(|| "untitled".to_string())
}

/// Produces a short human label for a new cluster
#[async_trait]
pub trait ClusterLabeler: Send + Sync {
  /// `None` means "could not label"; the caller falls back to keywords
  async fn label(&self, samples: &[String]) -> Option<String>;
}

/// Labeler backed by the classifier's issue-summary template
pub struct ClassifierLabeler {
  client: Arc<ClassifierClient>,
}

impl ClassifierLabeler {
  pub fn new(client: Arc<ClassifierClient>) -> Self {
    Self { client }
  }
}

#[async_trait]
impl ClusterLabeler for ClassifierLabeler {
  async fn label(&self, samples: &[String]) -> Option<String> {
    match self.client.issue_summary(samples).await {
      Ok(response) if !response.label.trim().is_empty() => Some(response.label),
      Ok(_) => None,
      Err(e) => {
        debug!("cluster labelling failed, falling back to keywords: {}", e);
        None
      }
    }
  }
}

/// What one detection pass did for one topic
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectionSummary {
  pub clusters: usize,
  pub merged: usize,
  pub created: usize,
}

/// Detection tunables
#[derive(Debug, Clone)]
pub struct DetectionConfig {
  pub cluster_similarity: f64,
  pub min_cluster_size: usize,
  pub time_window_hours: i64,
  pub match_threshold: f64,
}

impl Default for DetectionConfig {
  fn default() -> Self {
    Self {
      cluster_similarity: 0.75,
      min_cluster_size: 3,
      time_window_hours: 24,
      match_threshold: 0.75,
    }
  }
}

pub struct IssueDetector {
  issues: Arc<dyn IssueRepository>,
  labeler: Arc<dyn ClusterLabeler>,
  config: DetectionConfig,
}

impl IssueDetector {
  pub fn new(
    issues: Arc<dyn IssueRepository>,
    labeler: Arc<dyn ClusterLabeler>,
    config: DetectionConfig,
  ) -> Self {
    Self { issues, labeler, config }
  }

  /// One detection pass for one topic: cluster the recent unissued
  /// mentions, merge clusters into matching issues, create issues for
  /// the rest
  pub async fn detect_for_topic(
    &self,
    topic_key: &str,
    now: DateTime<Utc>,
  ) -> EngineResult<DetectionSummary> {
    let since = now - chrono::Duration::hours(self.config.time_window_hours);
    let candidates = self.issues.unissued_candidates(topic_key, since).await?;
    if candidates.is_empty() {
      return Ok(DetectionSummary::default());
    }

    let clusters = cluster_candidates(
      candidates,
      self.config.cluster_similarity,
      self.config.min_cluster_size,
    );
    let mut summary = DetectionSummary { clusters: clusters.len(), ..Default::default() };

    for cluster in clusters {
      let existing = self.issues.matchable_issues(topic_key).await?;
      let mut best: Option<(&mp_database_postgres::models::Issue, f64)> = None;
      for issue in &existing {
        let similarity = cosine_similarity(&cluster.centroid, &issue.centroid);
        if similarity >= self.config.match_threshold {
          match best {
            Some((_, best_similarity)) if best_similarity >= similarity => {}
            _ => best = Some((issue, similarity)),
          }
        }
      }

      match best {
        Some((issue, similarity)) => {
          self.merge_into(issue, &cluster, similarity, now).await?;
          summary.merged += 1;
        }
        None => {
          self.create_from(topic_key, &cluster, now).await?;
          summary.created += 1;
        }
      }
    }

    if summary.clusters > 0 {
      info!(
        "topic {}: {} clusters, {} merged, {} created",
        topic_key, summary.clusters, summary.merged, summary.created
      );
    }
    Ok(summary)
  }

  async fn merge_into(
    &self,
    issue: &mp_database_postgres::models::Issue,
    cluster: &Cluster,
    similarity: f64,
    now: DateTime<Utc>,
  ) -> EngineResult<()> {
    debug!(
      "merging {}-member cluster into issue {} (similarity {:.3})",
      cluster.size(),
      issue.issue_slug,
      similarity
    );

    let members: Vec<(i64, f64)> = cluster
      .members
      .iter()
      .zip(cluster.member_similarities.iter())
      .map(|(m, s)| (m.entry_id, *s))
      .collect();
    self.issues.attach_mentions(issue.issue_id, &members, now).await?;

    let merged_centroid = weighted_centroid(
      &issue.centroid,
      issue.mention_count.max(0) as f64,
      &cluster.centroid,
      cluster.size() as f64,
    );
    self.issues.update_centroid(issue.issue_id, &merged_centroid).await?;

    if issue.state == IssueState::Resolved.as_str() {
      self
        .issues
        .record_transition(
          issue.issue_id,
          IssueState::Resolved.as_str(),
          IssueState::Active.as_str(),
          "reactivated: new cluster matched centroid",
        )
        .await?;
    }
    Ok(())
  }

  async fn create_from(
    &self,
    topic_key: &str,
    cluster: &Cluster,
    now: DateTime<Utc>,
  ) -> EngineResult<()> {
    let samples: Vec<String> =
      cluster.members.iter().take(LABEL_SAMPLE_COUNT).map(|m| m.content.clone()).collect();
    let label = match self.labeler.label(&samples).await {
      Some(label) => label,
      None => fallback_label(&samples),
    };

    let slug = generate_slug(topic_key, now.date_naive());
    let issue_id = Uuid::new_v4();
    let new_issue = NewIssue {
      issue_id,
      topic_key: topic_key.to_string(),
      issue_slug: slug.clone(),
      issue_label: label,
      state: IssueState::Emerging.as_str().to_string(),
      priority_score: 0.0,
      priority_band: "low".to_string(),
      mention_count: 0,
      centroid: cluster.centroid.clone(),
      started_at: now,
      last_activity_at: now,
    };

    if let Err(e) = self.issues.create_issue(new_issue).await {
      // a concurrent engine may have created the same slug; not fatal
      warn!("issue creation failed for topic {}: {}", topic_key, e);
      return Ok(());
    }

    let members: Vec<(i64, f64)> = cluster
      .members
      .iter()
      .zip(cluster.member_similarities.iter())
      .map(|(m, s)| (m.entry_id, *s))
      .collect();
    self.issues.attach_mentions(issue_id, &members, now).await?;
    info!("created issue {} with {} mentions", slug, cluster.size());
    Ok(())
  }
}
