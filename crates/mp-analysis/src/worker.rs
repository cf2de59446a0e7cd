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

//! The per-mention analysis pipeline
//!
//! One worker runs one claimed mention through the phases in strict
//! order S -> E -> T -> I -> (L, C) and produces the atomic commit. The
//! worker holds no state between mentions; everything it writes goes
//! through the single [`AnalysisCommit`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use mp_client::{ClassifierClient, ClientError, ClientResult};
use mp_database_postgres::models::{AnalysisCommit, ClaimedMention, IssueLinkRow, TopicScoreRow};
use mp_database_postgres::IssueRepository;
use mp_models::embedding::cosine_similarity;
use mp_models::text::normalize_text;
use mp_models::{IssueState, SentimentLabel, SourceType, TopicDefinition};

use crate::error::{AnalysisError, AnalysisResult};
use crate::phases::emotion::dominant_emotion;
use crate::phases::location::LocationClassifier;
use crate::phases::topics::{retain_topics, score_topics, TopicThresholds};
use crate::phases::weights::{confidence_weight, influence_weight, ReachQuantiles};

/// Worker-pool configuration, shared by the dispatcher and workers
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
  pub max_workers: usize,
  pub batch_size: i64,
  pub poll_interval_secs: u64,
  pub positive_threshold: f64,
  pub negative_threshold: f64,
  pub topic_thresholds: TopicThresholds,
  pub issue_match_threshold: f64,
  pub stale_claim_secs: i64,
  pub reach_quantiles: ReachQuantiles,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      max_workers: 10,
      batch_size: 50,
      poll_interval_secs: 2,
      positive_threshold: 0.2,
      negative_threshold: 0.2,
      topic_thresholds: TopicThresholds::default(),
      issue_match_threshold: 0.75,
      stale_claim_secs: 300,
      reach_quantiles: ReachQuantiles::default(),
    }
  }
}

impl AnalysisConfig {
  pub fn from_settings(settings: &mp_core::Settings) -> Self {
    Self {
      max_workers: settings.usize_or("processing.parallel.max_workers", 10),
      batch_size: settings.i64_or("processing.parallel.batch_size", 50),
      poll_interval_secs: settings.u64_or("processing.poll_interval_seconds", 2),
      positive_threshold: settings.f64_or("processing.sentiment.positive_threshold", 0.2),
      negative_threshold: settings.f64_or("processing.sentiment.negative_threshold", 0.2),
      topic_thresholds: TopicThresholds::from_settings(settings),
      issue_match_threshold: settings.f64_or("processing.issues.match_threshold", 0.75),
      stale_claim_secs: settings.i64_or("processing.timeouts.stale_claim_seconds", 300),
      reach_quantiles: ReachQuantiles::default(),
    }
  }
}

/// One analysis worker. Stateless between mentions.
pub struct Worker {
  client: Arc<ClassifierClient>,
  issues: Arc<dyn IssueRepository>,
  location: Arc<LocationClassifier>,
  config: Arc<AnalysisConfig>,
  embedding_model: String,
}

impl Worker {
  pub fn new(
    client: Arc<ClassifierClient>,
    issues: Arc<dyn IssueRepository>,
    location: Arc<LocationClassifier>,
    config: Arc<AnalysisConfig>,
    embedding_model: String,
  ) -> Self {
    Self { client, issues, location, config, embedding_model }
  }

  /// Run all phases for one claimed mention. The shutdown flag is
  /// honored between phases, never mid-phase.
  pub async fn analyze(
    &self,
    claimed: &ClaimedMention,
    topics: &[TopicDefinition],
    shutdown: &watch::Receiver<bool>,
  ) -> AnalysisResult<AnalysisCommit> {
    let normalized = normalize_text(&claimed.content);

    // Phase S: sentiment + embedding
    self.check_shutdown(shutdown)?;
    let sentiment = self
      .call_classifier("sentiment", shutdown, || self.client.sentiment(&normalized))
      .await?;
    // the score wins over the classifier's claimed label
    let label = SentimentLabel::from_score(
      sentiment.score,
      self.config.positive_threshold,
      self.config.negative_threshold,
    );

    // Phase E: emotion distribution
    self.check_shutdown(shutdown)?;
    let emotion = self
      .call_classifier("emotion", shutdown, || self.client.emotion(&normalized))
      .await?;
    let (emotion_label, emotion_score, distribution) = dominant_emotion(&emotion.distribution);

    // Phase T: topic scoring over every active topic
    self.check_shutdown(shutdown)?;
    let scores = score_topics(topics, &normalized, &sentiment.embedding);
    let retained = retain_topics(scores, &self.config.topic_thresholds);
    let ministry_hint = retained.first().map(|s| s.topic_key.clone());

    // Phase I: join existing issues under the retained topics
    self.check_shutdown(shutdown)?;
    let mut issue_links: Vec<IssueLinkRow> = Vec::new();
    let mut primary_link: Option<(String, String, f64)> = None;
    for (position, topic_score) in retained.iter().enumerate() {
      let candidates = self.issues.matchable_issues(&topic_score.topic_key).await?;
      let mut best: Option<(&mp_database_postgres::models::Issue, f64)> = None;
      for issue in &candidates {
        let state: IssueState = match issue.state.parse() {
          Ok(state) => state,
          Err(_) => continue,
        };
        // joining resolved issues is the engine's reactivation call, not ours
        if !state.accepts_matches() || state == IssueState::Resolved {
          continue;
        }
        let similarity = cosine_similarity(&sentiment.embedding, &issue.centroid);
        if similarity >= self.config.issue_match_threshold {
          match best {
            Some((_, best_sim)) if best_sim >= similarity => {}
            _ => best = Some((issue, similarity)),
          }
        }
      }
      if let Some((issue, similarity)) = best {
        issue_links.push(IssueLinkRow { issue_id: issue.issue_id, similarity_score: similarity });
        if position == 0 {
          primary_link = Some((issue.issue_slug.clone(), issue.issue_label.clone(), similarity));
        }
      }
    }

    // Phase L: deterministic location keywords
    self.check_shutdown(shutdown)?;
    let location = self.location.classify(&normalized);

    // Phase C: influence and confidence weights
    let source_type: SourceType =
      claimed.source_type.parse().unwrap_or(SourceType::Citizen);
    let reach = claimed.direct_reach.max(claimed.cumulative_reach);
    let influence = influence_weight(
      source_type,
      claimed.author_verified,
      reach,
      &self.config.reach_quantiles,
    );
    let confidence = confidence_weight(sentiment.score, emotion_score);

    let (issue_slug, issue_label, issue_confidence) = match primary_link {
      Some((slug, label, similarity)) => (Some(slug), Some(label), Some(similarity)),
      None => (None, None, None),
    };

    debug!(
      "mention {} analyzed: {} / {} / {:?}",
      claimed.entry_id, label, emotion_label, ministry_hint
    );

    Ok(AnalysisCommit {
      sentiment_label: label.as_str().to_string(),
      sentiment_score: sentiment.score.clamp(-1.0, 1.0),
      sentiment_justification: sentiment.justification,
      emotion_label: emotion_label.as_str().to_string(),
      emotion_score,
      emotion_distribution: serde_json::to_value(distribution)
        .map_err(|e| AnalysisError::InvalidResponse { phase: "emotion", message: e.to_string() })?,
      influence_weight: influence,
      confidence_weight: confidence,
      location_label: location.as_ref().map(|(country, _)| country.clone()),
      location_confidence: location.as_ref().map(|(_, confidence)| *confidence),
      ministry_hint,
      issue_slug,
      issue_label,
      issue_confidence,
      embedding: sentiment.embedding,
      embedding_model: self.embedding_model.clone(),
      topics: retained
        .into_iter()
        .map(|s| TopicScoreRow {
          topic_key: s.topic_key,
          keyword_score: s.keyword_score,
          embedding_score: s.embedding_score,
          topic_confidence: s.confidence,
        })
        .collect(),
      issue_links,
    })
  }

  fn check_shutdown(&self, shutdown: &watch::Receiver<bool>) -> AnalysisResult<()> {
    if *shutdown.borrow() {
      return Err(AnalysisError::Shutdown);
    }
    Ok(())
  }

  /// Classifier call with the worker error policy: rate limiting
  /// sleeps and retries for as long as it takes (workers are not
  /// urgent), transport errors were already retried by the transport,
  /// and invalid responses fail the phase.
  async fn call_classifier<T, F, Fut>(
    &self,
    phase: &'static str,
    shutdown: &watch::Receiver<bool>,
    call: F,
  ) -> AnalysisResult<T>
  where
    F: Fn() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
  {
    loop {
      if *shutdown.borrow() {
        return Err(AnalysisError::Shutdown);
      }
      match call().await {
        Ok(response) => return Ok(response),
        Err(ClientError::RateLimited { retry_after }) => {
          let wait = retry_after.max(1);
          debug!("{} phase rate limited, sleeping {}s", phase, wait);
          tokio::time::sleep(Duration::from_secs(wait)).await;
        }
        Err(ClientError::InvalidResponse(message)) => {
          return Err(AnalysisError::InvalidResponse { phase, message });
        }
        Err(err) => {
          return Err(AnalysisError::Classifier { phase, message: err.to_string() });
        }
      }
    }
  }
}
