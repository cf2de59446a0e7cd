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

//! Windowed sentiment aggregation
//!
//! A pure function of the mentions whose `published_at` falls in the
//! window, independent of arrival order, so recomputation by any
//! process lands on the same value.

use mp_database_postgres::models::SentimentInput;
use mp_models::EmotionDistribution;
use serde_json::json;

/// The computed measures for one (subject, window) pair
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome {
  pub weighted_sentiment_score: f64,
  pub sentiment_index: i32,
  pub sentiment_distribution: serde_json::Value,
  pub emotion_distribution: serde_json::Value,
  pub emotion_adjusted_severity: f64,
  pub mention_count: i32,
  pub total_influence_weight: f64,
}

/// Aggregate one window's inputs. `None` when the window is empty.
pub fn aggregate(inputs: &[SentimentInput]) -> Option<AggregationOutcome> {
  if inputs.is_empty() {
    return None;
  }

  let mut weighted_sum = 0.0;
  let mut weight_sum = 0.0;
  let mut total_influence = 0.0;
  let mut positive = 0u32;
  let mut negative = 0u32;
  let mut neutral = 0u32;
  let mut emotion_sum = EmotionDistribution::zero();
  let mut emotion_count = 0u32;

  for input in inputs {
    let weight = input.influence_weight * input.confidence_weight;
    weighted_sum += input.sentiment_score * weight;
    weight_sum += weight;
    total_influence += input.influence_weight;

    match input.sentiment_label.as_str() {
      "positive" => positive += 1,
      "negative" => negative += 1,
      _ => neutral += 1,
    }

    if let Some(value) = &input.emotion_distribution {
      if let Ok(dist) = serde_json::from_value::<EmotionDistribution>(value.clone()) {
        emotion_sum.anger += dist.anger;
        emotion_sum.fear += dist.fear;
        emotion_sum.trust += dist.trust;
        emotion_sum.sadness += dist.sadness;
        emotion_sum.joy += dist.joy;
        emotion_sum.disgust += dist.disgust;
        emotion_count += 1;
      }
    }
  }

  let weighted_sentiment_score =
    if weight_sum > 0.0 { weighted_sum / weight_sum } else { 0.0 };
  let sentiment_index =
    ((50.0 * (weighted_sentiment_score + 1.0)).round() as i32).clamp(0, 100);

  let total = inputs.len() as f64;
  let sentiment_distribution = json!({
    "positive": positive as f64 / total,
    "negative": negative as f64 / total,
    "neutral": neutral as f64 / total,
  });

  let mean_emotions = if emotion_count > 0 {
    let n = emotion_count as f64;
    EmotionDistribution {
      anger: emotion_sum.anger / n,
      fear: emotion_sum.fear / n,
      trust: emotion_sum.trust / n,
      sadness: emotion_sum.sadness / n,
      joy: emotion_sum.joy / n,
      disgust: emotion_sum.disgust / n,
    }
  } else {
    EmotionDistribution::zero()
  };

  // severity: worst negative emotion, weighted by how negative the
  // window actually is
  let negative_peak = mean_emotions
    .anger
    .max(mean_emotions.fear)
    .max(mean_emotions.disgust)
    .max(mean_emotions.sadness);
  let emotion_adjusted_severity =
    (negative_peak * (-weighted_sentiment_score).max(0.0)).clamp(0.0, 1.0);

  Some(AggregationOutcome {
    weighted_sentiment_score,
    sentiment_index,
    sentiment_distribution,
    emotion_distribution: serde_json::to_value(mean_emotions).unwrap_or_else(|_| json!({})),
    emotion_adjusted_severity,
    mention_count: inputs.len() as i32,
    total_influence_weight: total_influence,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input(
    score: f64,
    influence: f64,
    confidence: f64,
    label: &str,
    emotions: Option<serde_json::Value>,
  ) -> SentimentInput {
    SentimentInput {
      sentiment_score: score,
      influence_weight: influence,
      confidence_weight: confidence,
      sentiment_label: label.to_string(),
      emotion_distribution: emotions,
    }
  }

  #[test]
  fn test_empty_window_is_none() {
    assert!(aggregate(&[]).is_none());
  }

  #[test]
  fn test_weighted_mean() {
    let inputs = vec![
      input(1.0, 2.0, 1.0, "positive", None),
      input(-1.0, 1.0, 1.0, "negative", None),
    ];
    let outcome = aggregate(&inputs).unwrap();
    // (1*2 - 1*1) / 3
    assert!((outcome.weighted_sentiment_score - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(outcome.total_influence_weight, 3.0);
    assert_eq!(outcome.mention_count, 2);
  }

  #[test]
  fn test_sentiment_index_mapping() {
    let neutral = aggregate(&[input(0.0, 1.0, 1.0, "neutral", None)]).unwrap();
    assert_eq!(neutral.sentiment_index, 50);

    let best = aggregate(&[input(1.0, 1.0, 1.0, "positive", None)]).unwrap();
    assert_eq!(best.sentiment_index, 100);

    let worst = aggregate(&[input(-1.0, 1.0, 1.0, "negative", None)]).unwrap();
    assert_eq!(worst.sentiment_index, 0);
  }

  #[test]
  fn test_label_distribution() {
    let inputs = vec![
      input(0.5, 1.0, 1.0, "positive", None),
      input(0.5, 1.0, 1.0, "positive", None),
      input(-0.5, 1.0, 1.0, "negative", None),
      input(0.0, 1.0, 1.0, "neutral", None),
    ];
    let outcome = aggregate(&inputs).unwrap();
    assert_eq!(outcome.sentiment_distribution["positive"], 0.5);
    assert_eq!(outcome.sentiment_distribution["negative"], 0.25);
    assert_eq!(outcome.sentiment_distribution["neutral"], 0.25);
  }

  #[test]
  fn test_order_independence() {
    let a = input(0.9, 3.0, 0.8, "positive", None);
    let b = input(-0.7, 1.0, 0.5, "negative", None);
    let c = input(0.1, 2.0, 0.9, "neutral", None);
    let forward = aggregate(&[a.clone(), b.clone(), c.clone()]).unwrap();
    let backward = aggregate(&[c, b, a]).unwrap();
    assert_eq!(forward, backward);
  }

  #[test]
  fn test_emotion_mean_and_severity() {
    let angry = serde_json::json!({
      "anger": 0.8, "fear": 0.1, "trust": 0.0, "sadness": 0.1, "joy": 0.0, "disgust": 0.0
    });
    let calm = serde_json::json!({
      "anger": 0.0, "fear": 0.0, "trust": 0.8, "sadness": 0.0, "joy": 0.2, "disgust": 0.0
    });
    let inputs = vec![
      input(-1.0, 1.0, 1.0, "negative", Some(angry)),
      input(-1.0, 1.0, 1.0, "negative", Some(calm)),
    ];
    let outcome = aggregate(&inputs).unwrap();
    assert!((outcome.emotion_distribution["anger"].as_f64().unwrap() - 0.4).abs() < 1e-9);
    // peak negative emotion 0.4 times full negativity 1.0
    assert!((outcome.emotion_adjusted_severity - 0.4).abs() < 1e-9);
  }

  #[test]
  fn test_severity_zero_for_positive_windows() {
    let angry = serde_json::json!({
      "anger": 0.9, "fear": 0.0, "trust": 0.0, "sadness": 0.1, "joy": 0.0, "disgust": 0.0
    });
    let outcome = aggregate(&[input(0.8, 1.0, 1.0, "positive", Some(angry))]).unwrap();
    assert_eq!(outcome.emotion_adjusted_severity, 0.0);
  }

  #[test]
  fn test_zero_weights_fall_back_to_zero_score() {
    let outcome = aggregate(&[input(0.9, 1.0, 0.0, "positive", None)]).unwrap();
    assert_eq!(outcome.weighted_sentiment_score, 0.0);
    assert_eq!(outcome.sentiment_index, 50);
  }
}
