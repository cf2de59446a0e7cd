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

//! Phase T: topic scoring
//!
//! Keyword evidence and embedding evidence combine into a confidence
//! per topic. Keyword matching is word-boundary, case-insensitive,
//! against the normalized text; group scores are binary and the topic
//! keyword score is the mean over groups.

use regex::Regex;

use mp_models::embedding::cosine_unit_interval;
use mp_models::{GroupOperator, TopicDefinition};

/// Thresholds controlling which topics a mention retains
#[derive(Debug, Clone)]
pub struct TopicThresholds {
  /// Confidence at or above which a topic is always retained
  pub confidence_threshold: f64,

  /// Keyword-score arm of the either/or retention rule
  pub keyword_score_threshold: f64,

  /// Embedding-score arm of the either/or retention rule
  pub embedding_score_threshold: f64,

  /// Floor for the single-best-topic fallback
  pub min_score_threshold: f64,
}

impl Default for TopicThresholds {
  fn default() -> Self {
    Self {
      confidence_threshold: 0.85,
      keyword_score_threshold: 0.3,
      embedding_score_threshold: 0.5,
      min_score_threshold: 0.2,
    }
  }
}

impl TopicThresholds {
  pub fn from_settings(settings: &mp_core::Settings) -> Self {
    Self {
      confidence_threshold: settings.f64_or("processing.topic.confidence_threshold", 0.85),
      keyword_score_threshold: settings.f64_or("processing.topic.keyword_score_threshold", 0.3),
      embedding_score_threshold: settings.f64_or("processing.topic.embedding_score_threshold", 0.5),
      min_score_threshold: settings.f64_or("processing.topic.min_score_threshold", 0.2),
    }
  }
}

/// One topic's evidence for one mention
#[derive(Debug, Clone, PartialEq)]
pub struct TopicScore {
  pub topic_key: String,
  pub keyword_score: f64,
  pub embedding_score: f64,
  pub confidence: f64,
}

/// Word-boundary, case-insensitive containment test. The haystack is
/// already lower-cased by normalization.
fn contains_keyword(normalized_text: &str, keyword: &str) -> bool {
  let pattern = format!(r"\b{}\b", regex::escape(keyword.to_lowercase().trim()));
  match Regex::new(&pattern) {
    Ok(re) => re.is_match(normalized_text),
    Err(_) => false,
  }
}

/// Fraction of the topic's keyword groups satisfied, in [0, 1]
pub fn keyword_score(topic: &TopicDefinition, normalized_text: &str) -> f64 {
  let groups = topic.scoring_groups();
  if groups.is_empty() {
    return 0.0;
  }

  let satisfied = groups
    .iter()
    .filter(|group| {
      if group.keywords.is_empty() {
        return false;
      }
      match group.operator {
        GroupOperator::And => {
          group.keywords.iter().all(|kw| contains_keyword(normalized_text, kw))
        }
        GroupOperator::Or => group.keywords.iter().any(|kw| contains_keyword(normalized_text, kw)),
      }
    })
    .count();

  satisfied as f64 / groups.len() as f64
}

/// Score every topic: keyword evidence, embedding evidence, and the
/// 0.4/0.6 blend
pub fn score_topics(
  topics: &[TopicDefinition],
  normalized_text: &str,
  embedding: &[f32],
) -> Vec<TopicScore> {
  topics
    .iter()
    .map(|topic| {
      let kw = keyword_score(topic, normalized_text);
      let emb = match &topic.centroid {
        Some(centroid) if !centroid.is_empty() => cosine_unit_interval(embedding, centroid),
        _ => 0.0,
      };
      TopicScore {
        topic_key: topic.topic_key.clone(),
        keyword_score: kw,
        embedding_score: emb,
        confidence: 0.4 * kw + 0.6 * emb,
      }
    })
    .collect()
}

/// Retention rule: keep topics passing the confidence bar OR both
/// sub-thresholds; with no qualifier, fall back to the single best
/// topic if it clears the floor. Result is sorted by confidence,
/// best first.
pub fn retain_topics(mut scores: Vec<TopicScore>, thresholds: &TopicThresholds) -> Vec<TopicScore> {
  scores.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));

  let retained: Vec<TopicScore> = scores
    .iter()
    .filter(|s| {
      s.confidence >= thresholds.confidence_threshold
        || (s.keyword_score >= thresholds.keyword_score_threshold
          && s.embedding_score >= thresholds.embedding_score_threshold)
    })
    .cloned()
    .collect();

  if !retained.is_empty() {
    return retained;
  }

  match scores.into_iter().next() {
    Some(best) if best.confidence >= thresholds.min_score_threshold => vec![best],
    _ => Vec::new(),
  }
}
