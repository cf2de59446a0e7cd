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

//! The issue/aggregation engine loop (C5)
//!
//! One single-threaded tick on a slow cadence: detect issues per topic,
//! evaluate every issue's lifecycle and priority, recompute windowed
//! aggregations and trends, refresh topic baselines. Each step is
//! best-effort; a failure is logged and the tick moves on.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use mp_database_postgres::models::{AggregationUpsert, TrendUpsert};
use mp_database_postgres::{AggregateRepository, IssueRepository, TopicRepository};
use mp_models::{IssueState, SubjectKind, TrendDirection, WindowSize};

use crate::aggregation::aggregate;
use crate::baseline::{baseline_index, deviation};
use crate::error::EngineResult;
use crate::issues::{DetectionConfig, IssueDetector};
use crate::lifecycle::{evaluate, LifecycleConfig, LifecycleMetrics};
use crate::priority::{priority_band, priority_score, PriorityInputs, PriorityWeights};

const BASELINE_HISTORY_DAYS: i64 = 30;

/// Engine-wide configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
  pub detection: DetectionConfig,
  pub lifecycle: LifecycleConfig,
  pub priority_weights: PriorityWeights,
  pub volume_saturation: f64,
  pub windows: Vec<WindowSize>,
  pub tick_secs: u64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      detection: DetectionConfig::default(),
      lifecycle: LifecycleConfig::default(),
      priority_weights: PriorityWeights::default(),
      volume_saturation: 200.0,
      windows: WindowSize::all().to_vec(),
      tick_secs: 300,
    }
  }
}

impl EngineConfig {
  pub fn from_settings(settings: &mp_core::Settings) -> Self {
    let windows: Vec<WindowSize> = settings
      .list("processing.aggregation.windows")
      .iter()
      .filter_map(|w| w.parse().ok())
      .collect();
    Self {
      detection: DetectionConfig {
        cluster_similarity: settings.f64_or("processing.issues.cluster_similarity", 0.75),
        min_cluster_size: settings.usize_or("processing.issues.min_cluster_size", 3),
        time_window_hours: settings.i64_or("processing.issues.time_window_hours", 24),
        match_threshold: settings.f64_or("processing.issues.match_threshold", 0.75),
      },
      lifecycle: LifecycleConfig::default(),
      priority_weights: PriorityWeights::from_settings(settings),
      volume_saturation: settings.f64_or("processing.issues.volume_saturation", 200.0),
      windows: if windows.is_empty() { WindowSize::all().to_vec() } else { windows },
      tick_secs: settings.u64_or("processing.aggregation.tick_seconds", 300),
    }
  }
}

pub struct Engine {
  topics: Arc<dyn TopicRepository>,
  issues: Arc<dyn IssueRepository>,
  aggregates: Arc<dyn AggregateRepository>,
  detector: IssueDetector,
  config: EngineConfig,
}

impl Engine {
  pub fn new(
    topics: Arc<dyn TopicRepository>,
    issues: Arc<dyn IssueRepository>,
    aggregates: Arc<dyn AggregateRepository>,
    detector: IssueDetector,
    config: EngineConfig,
  ) -> Self {
    Self { topics, issues, aggregates, detector, config }
  }

  /// Engine loop; exits when the shutdown flag flips
  pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
    info!("engine starting, tick every {}s", self.config.tick_secs);

    loop {
      if *shutdown.borrow() {
        break;
      }

      let now = Utc::now();
      if let Err(e) = self.tick(now).await {
        warn!("engine tick failed: {}", e);
      }

      tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(self.config.tick_secs)) => {}
        _ = shutdown.changed() => {}
      }
    }

    info!("engine stopped");
  }

  /// One full engine pass. Steps are sequential and best-effort.
  pub async fn tick(&self, now: DateTime<Utc>) -> EngineResult<()> {
    let topic_keys = self.topics.active_topic_keys().await?;

    for topic_key in &topic_keys {
      if let Err(e) = self.detector.detect_for_topic(topic_key, now).await {
        warn!("issue detection failed for topic {}: {}", topic_key, e);
      }
    }

    if let Err(e) = self.lifecycle_pass(now).await {
      warn!("lifecycle pass failed: {}", e);
    }

    if let Err(e) = self.aggregation_pass(&topic_keys, now).await {
      warn!("aggregation pass failed: {}", e);
    }

    if let Err(e) = self.baseline_pass(&topic_keys, now).await {
      warn!("baseline pass failed: {}", e);
    }

    Ok(())
  }

  /// Evaluate priority and at most one lifecycle transition per issue
  async fn lifecycle_pass(&self, now: DateTime<Utc>) -> EngineResult<()> {
    let issues = self.issues.non_archived_issues().await?;

    for issue in issues {
      let state: IssueState = match issue.state.parse() {
        Ok(state) => state,
        Err(e) => {
          warn!("issue {} has unreadable state: {}", issue.issue_id, e);
          continue;
        }
      };

      let last_member = self.issues.last_mention_detected_at(issue.issue_id).await?;
      let members_last_hour = self
        .issues
        .mention_count_between(issue.issue_id, now - ChronoDuration::hours(1), now)
        .await?;
      let recent = self
        .issues
        .mention_count_between(issue.issue_id, now - ChronoDuration::hours(6), now)
        .await?;
      let prior = self
        .issues
        .mention_count_between(
          issue.issue_id,
          now - ChronoDuration::hours(12),
          now - ChronoDuration::hours(6),
        )
        .await?;

      let sentiment_inputs = self
        .aggregates
        .issue_inputs(issue.issue_id, now - ChronoDuration::hours(24), now)
        .await?;
      let weighted_sentiment =
        aggregate(&sentiment_inputs).map(|o| o.weighted_sentiment_score).unwrap_or(0.0);

      let hours_since_last_activity =
        (now - issue.last_activity_at).num_seconds() as f64 / 3600.0;
      let score = priority_score(
        &PriorityInputs {
          weighted_sentiment_score: weighted_sentiment,
          mention_count: issue.mention_count as i64,
          hours_since_last_activity,
        },
        &self.config.priority_weights,
        self.config.volume_saturation,
      );
      let band = priority_band(score);
      self.issues.update_priority(issue.issue_id, score, band.as_str()).await?;

      let metrics = LifecycleMetrics {
        mention_count: issue.mention_count as i64,
        age_hours: (now - issue.started_at).num_seconds() as f64 / 3600.0,
        hours_since_last_member: (now - last_member.unwrap_or(issue.started_at)).num_seconds()
          as f64
          / 3600.0,
        members_last_hour,
        velocity_recent: recent as f64 / 6.0,
        velocity_prior: prior as f64 / 6.0,
        weighted_sentiment_score: weighted_sentiment,
        priority_score: score,
      };

      if let Some((next, reason)) = evaluate(state, &metrics, &self.config.lifecycle) {
        if state.can_transition_to(next) {
          self
            .issues
            .record_transition(issue.issue_id, state.as_str(), next.as_str(), &reason)
            .await?;
          info!("issue {} {} -> {}: {}", issue.issue_slug, state, next, reason);
        } else {
          warn!("suppressed illegal transition {} -> {} for {}", state, next, issue.issue_slug);
        }
      }
    }

    Ok(())
  }

  /// Recompute the current window of every size for every topic and
  /// every non-archived issue, plus the period-over-period trend row
  async fn aggregation_pass(
    &self,
    topic_keys: &[String],
    now: DateTime<Utc>,
  ) -> EngineResult<()> {
    let issues = self.issues.non_archived_issues().await?;

    for window_size in &self.config.windows {
      let window = window_size.window_containing(now);

      for topic_key in topic_keys {
        let inputs = self.aggregates.topic_inputs(topic_key, window.start, window.end).await?;
        self
          .write_aggregation(SubjectKind::Topic, topic_key, *window_size, window.start, window.end, &inputs, now)
          .await?;
      }

      for issue in &issues {
        let subject_key = issue.issue_id.to_string();
        let inputs =
          self.aggregates.issue_inputs(issue.issue_id, window.start, window.end).await?;
        self
          .write_aggregation(SubjectKind::Issue, &subject_key, *window_size, window.start, window.end, &inputs, now)
          .await?;
      }
    }

    Ok(())
  }

  #[allow(clippy::too_many_arguments)]
  async fn write_aggregation(
    &self,
    subject_kind: SubjectKind,
    subject_key: &str,
    window_size: WindowSize,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    inputs: &[mp_database_postgres::models::SentimentInput],
    now: DateTime<Utc>,
  ) -> EngineResult<()> {
    let Some(outcome) = aggregate(inputs) else {
      return Ok(());
    };

    self
      .aggregates
      .upsert_aggregation(&AggregationUpsert {
        subject_kind: subject_kind.as_str().to_string(),
        subject_key: subject_key.to_string(),
        window_size: window_size.as_str().to_string(),
        window_start,
        window_end,
        weighted_sentiment_score: outcome.weighted_sentiment_score,
        sentiment_index: outcome.sentiment_index,
        sentiment_distribution: outcome.sentiment_distribution.clone(),
        emotion_distribution: outcome.emotion_distribution.clone(),
        emotion_adjusted_severity: outcome.emotion_adjusted_severity,
        mention_count: outcome.mention_count,
        total_influence_weight: outcome.total_influence_weight,
        computed_at: now,
      })
      .await?;

    // period-over-period trend against the immediately preceding window
    let previous_start = window_start - window_size.duration();
    let previous_index = self
      .aggregates
      .find_sentiment_index(subject_kind.as_str(), subject_key, window_size.as_str(), previous_start)
      .await?;

    let (direction, magnitude) = match previous_index {
      Some(previous) => {
        let delta = (outcome.sentiment_index - previous) as f64;
        (TrendDirection::from_delta(delta), delta.abs())
      }
      None => (TrendDirection::Stable, 0.0),
    };

    self
      .aggregates
      .upsert_trend(&TrendUpsert {
        subject_kind: subject_kind.as_str().to_string(),
        subject_key: subject_key.to_string(),
        window_size: window_size.as_str().to_string(),
        window_start,
        current_index: outcome.sentiment_index,
        previous_index,
        direction: direction.as_str().to_string(),
        magnitude,
        computed_at: now,
      })
      .await?;

    Ok(())
  }

  /// Refresh every topic's baseline: median 24 h index over the last
  /// 30 days, plus the current window's deviation from it
  async fn baseline_pass(&self, topic_keys: &[String], now: DateTime<Utc>) -> EngineResult<()> {
    let since = now - ChronoDuration::days(BASELINE_HISTORY_DAYS);

    for topic_key in topic_keys {
      let indices = self.aggregates.daily_indices_since(topic_key, since).await?;
      let samples = indices.len() as i32;
      let Some(baseline) = baseline_index(indices) else {
        continue;
      };

      let current_start = WindowSize::Hours24.window_start(now);
      let current = self
        .aggregates
        .find_sentiment_index(SubjectKind::Topic.as_str(), topic_key, "24h", current_start)
        .await?;
      let current_deviation = current.map(|idx| deviation(idx, baseline)).unwrap_or(0.0);

      self.aggregates.upsert_baseline(topic_key, baseline, current_deviation, samples).await?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{
    candidate, FakeTopicKeys, FixedLabeler, RecordingAggregates, RecordingIssues,
  };
  use chrono::TimeZone;
  use mp_database_postgres::models::SentimentInput;
  use uuid::Uuid;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 7, 0).unwrap()
  }

  fn input(score: f64, label: &str) -> SentimentInput {
    SentimentInput {
      sentiment_score: score,
      influence_weight: 1.0,
      confidence_weight: 1.0,
      sentiment_label: label.to_string(),
      emotion_distribution: None,
    }
  }

  fn engine(
    topics: Vec<&str>,
    issues: Arc<RecordingIssues>,
    aggregates: Arc<RecordingAggregates>,
    config: EngineConfig,
  ) -> Engine {
    let detector = IssueDetector::new(
      Arc::clone(&issues) as _,
      Arc::new(FixedLabeler(Some("Fuel crisis".to_string()))),
      config.detection.clone(),
    );
    Engine::new(
      Arc::new(FakeTopicKeys(topics.iter().map(|s| s.to_string()).collect())),
      issues,
      aggregates,
      detector,
      config,
    )
  }

  fn similar_vectors(n: usize) -> Vec<Vec<f32>> {
    (0..n).map(|i| vec![1.0, 0.01 * i as f32]).collect()
  }

  #[tokio::test]
  async fn test_issue_emergence_from_similar_mentions() {
    let issues = Arc::new(RecordingIssues::new());
    let aggregates = Arc::new(RecordingAggregates::new());
    let vectors = similar_vectors(5);
    issues.seed_candidates(
      "fuel",
      vectors
        .into_iter()
        .enumerate()
        .map(|(i, v)| candidate(i as i64 + 1, v, "no fuel at the stations"))
        .collect(),
    );

    let engine = engine(vec!["fuel"], Arc::clone(&issues), aggregates, EngineConfig::default());
    engine.tick(now()).await.unwrap();

    let created = issues.issues();
    assert_eq!(created.len(), 1);
    let issue = &created[0];
    assert!(issue.issue_slug.starts_with("fuel-20250615-"));
    assert_eq!(issue.state, "emerging");
    assert_eq!(issue.mention_count, 5);
    assert_eq!(issue.issue_label, "Fuel crisis");
    assert!(issue.priority_score > 0.0);
    assert_eq!(issues.member_count(issue.issue_id), 5);
  }

  #[tokio::test]
  async fn test_cluster_merges_into_matching_issue() {
    let issues = Arc::new(RecordingIssues::new());
    let aggregates = Arc::new(RecordingAggregates::new());
    let issue_id = Uuid::new_v4();
    issues.seed_issue(crate::testing::seeded_issue(
      issue_id,
      "fuel",
      "fuel-20250601-aaaaaa",
      "active",
      vec![1.0, 0.0],
      now() - ChronoDuration::days(2),
    ));
    issues.seed_candidates(
      "fuel",
      similar_vectors(3)
        .into_iter()
        .enumerate()
        .map(|(i, v)| candidate(i as i64 + 10, v, "fuel queues again"))
        .collect(),
    );

    let engine = engine(vec!["fuel"], Arc::clone(&issues), aggregates, EngineConfig::default());
    engine.tick(now()).await.unwrap();

    let all = issues.issues();
    assert_eq!(all.len(), 1, "cluster must merge, not create");
    assert_eq!(all[0].mention_count, 3);
    assert_eq!(issues.member_count(issue_id), 3);
  }

  #[tokio::test]
  async fn test_matching_cluster_reactivates_resolved_issue() {
    let issues = Arc::new(RecordingIssues::new());
    let aggregates = Arc::new(RecordingAggregates::new());
    let issue_id = Uuid::new_v4();
    issues.seed_issue(crate::testing::seeded_issue(
      issue_id,
      "fuel",
      "fuel-20250501-bbbbbb",
      "resolved",
      vec![1.0, 0.0],
      now() - ChronoDuration::days(30),
    ));
    issues.seed_candidates(
      "fuel",
      similar_vectors(3)
        .into_iter()
        .enumerate()
        .map(|(i, v)| candidate(i as i64 + 20, v, "fuel shortage is back"))
        .collect(),
    );

    let engine = engine(vec!["fuel"], Arc::clone(&issues), aggregates, EngineConfig::default());
    engine.tick(now()).await.unwrap();

    let transitions = issues.transitions();
    assert!(transitions
      .iter()
      .any(|(id, from, to, reason)| *id == issue_id
        && from == "resolved"
        && to == "active"
        && reason.contains("reactivated")));
  }

  #[tokio::test]
  async fn test_stabilizing_issue_resolves_after_seven_idle_days() {
    let issues = Arc::new(RecordingIssues::new());
    let aggregates = Arc::new(RecordingAggregates::new());
    let issue_id = Uuid::new_v4();
    issues.seed_issue(crate::testing::seeded_issue(
      issue_id,
      "fuel",
      "fuel-20250520-cccccc",
      "stabilizing",
      vec![1.0, 0.0],
      now() - ChronoDuration::days(20),
    ));
    issues.seed_member(issue_id, 1, now() - ChronoDuration::days(8));

    let engine = engine(vec!["fuel"], Arc::clone(&issues), aggregates, EngineConfig::default());
    engine.tick(now()).await.unwrap();

    let transitions = issues.transitions();
    assert!(transitions
      .iter()
      .any(|(id, from, to, reason)| *id == issue_id
        && from == "stabilizing"
        && to == "resolved"
        && reason.contains("7-day")));
  }

  #[tokio::test]
  async fn test_aggregation_writes_snapped_window_and_trend() {
    let issues = Arc::new(RecordingIssues::new());
    let aggregates = Arc::new(RecordingAggregates::new());
    let window_start = WindowSize::Hour1.window_start(now());
    // mentions published inside the current 1h window, net score 0 -> index 50
    aggregates.seed_topic_input("fuel", now() - ChronoDuration::minutes(5), input(0.0, "neutral"));
    // previous window stored at index 40 -> delta +10, improving
    aggregates.seed_aggregation_index(
      "topic",
      "fuel",
      "1h",
      window_start - ChronoDuration::hours(1),
      40,
    );

    let config = EngineConfig { windows: vec![WindowSize::Hour1], ..EngineConfig::default() };
    let engine = engine(vec!["fuel"], issues, Arc::clone(&aggregates), config);
    engine.tick(now()).await.unwrap();

    let row = aggregates.aggregation("topic", "fuel", "1h", window_start).unwrap();
    assert_eq!(row.sentiment_index, 50);
    assert_eq!(row.mention_count, 1);

    let trend = aggregates.trend("topic", "fuel", "1h", window_start).unwrap();
    assert_eq!(trend.direction, "improving");
    assert_eq!(trend.previous_index, Some(40));
    assert_eq!(trend.magnitude, 10.0);
  }

  #[tokio::test]
  async fn test_tick_twice_without_new_mentions_is_stable() {
    let issues = Arc::new(RecordingIssues::new());
    let aggregates = Arc::new(RecordingAggregates::new());
    aggregates.seed_topic_input("fuel", now() - ChronoDuration::minutes(5), input(-0.4, "negative"));

    let config = EngineConfig { windows: vec![WindowSize::Hour1], ..EngineConfig::default() };
    let engine = engine(vec!["fuel"], issues, Arc::clone(&aggregates), config);

    engine.tick(now()).await.unwrap();
    let first_count = aggregates.aggregation_count();
    let window_start = WindowSize::Hour1.window_start(now());
    let first = aggregates.aggregation("topic", "fuel", "1h", window_start).unwrap();

    engine.tick(now()).await.unwrap();
    let second = aggregates.aggregation("topic", "fuel", "1h", window_start).unwrap();

    assert_eq!(aggregates.aggregation_count(), first_count);
    assert_eq!(first.sentiment_index, second.sentiment_index);
    assert_eq!(first.mention_count, second.mention_count);
    assert_eq!(first.weighted_sentiment_score, second.weighted_sentiment_score);
  }

  #[tokio::test]
  async fn test_baseline_is_median_of_daily_indices() {
    let issues = Arc::new(RecordingIssues::new());
    let aggregates = Arc::new(RecordingAggregates::new());
    let today_start = WindowSize::Hours24.window_start(now());
    for (days_back, index) in [(3, 40), (2, 60), (1, 20)] {
      aggregates.seed_aggregation_index(
        "topic",
        "fuel",
        "24h",
        today_start - ChronoDuration::days(days_back),
        index,
      );
    }
    // current 24h window aggregates to index 50
    aggregates.seed_topic_input("fuel", now() - ChronoDuration::hours(2), input(0.0, "neutral"));

    let config = EngineConfig { windows: vec![WindowSize::Hours24], ..EngineConfig::default() };
    let engine = engine(vec!["fuel"], issues, Arc::clone(&aggregates), config);
    engine.tick(now()).await.unwrap();

    // history 40, 60, 20 plus the fresh 50: median 45, deviation +5
    let (baseline, deviation, samples) = aggregates.baseline("fuel").unwrap();
    assert_eq!(baseline, 45.0);
    assert_eq!(deviation, 5.0);
    assert_eq!(samples, 4);
  }
}
