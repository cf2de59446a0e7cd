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

//! Issue priority scoring
//!
//! Three components in [0, 100] blended by configurable weights:
//! sentiment severity, mention volume, and recency decay.

use mp_models::PriorityBand;

/// Blend weights for the priority components. Surfaced through the
/// settings reader rather than inlined, so operators can retune without
/// a deploy.
#[derive(Debug, Clone)]
pub struct PriorityWeights {
  pub sentiment: f64,
  pub volume: f64,
  pub time: f64,
}

impl Default for PriorityWeights {
  fn default() -> Self {
    Self { sentiment: 0.4, volume: 0.35, time: 0.25 }
  }
}

impl PriorityWeights {
  pub fn from_settings(settings: &mp_core::Settings) -> Self {
    Self {
      sentiment: settings.f64_or("processing.issues.priority_weights.sentiment", 0.4),
      volume: settings.f64_or("processing.issues.priority_weights.volume", 0.35),
      time: settings.f64_or("processing.issues.priority_weights.time", 0.25),
    }
  }
}

/// The inputs the score is computed from
#[derive(Debug, Clone, Copy)]
pub struct PriorityInputs {
  /// Weighted sentiment over the issue's recent mentions, in [-1, 1]
  pub weighted_sentiment_score: f64,
  pub mention_count: i64,
  pub hours_since_last_activity: f64,
}

/// Weighted blend of the three components; result in [0, 100].
/// Sentiment counts only when negative, volume saturates, recency
/// decays with a 24 h half-life constant.
pub fn priority_score(
  inputs: &PriorityInputs,
  weights: &PriorityWeights,
  volume_saturation: f64,
) -> f64 {
  let sentiment_component = 100.0 * (-inputs.weighted_sentiment_score).clamp(0.0, 1.0);
  let volume_component =
    100.0 * (inputs.mention_count as f64 / volume_saturation.max(1.0)).min(1.0);
  let time_component = 100.0 * (-inputs.hours_since_last_activity.max(0.0) / 24.0).exp();

  let score = weights.sentiment * sentiment_component
    + weights.volume * volume_component
    + weights.time * time_component;
  score.clamp(0.0, 100.0)
}

pub fn priority_band(score: f64) -> PriorityBand {
  PriorityBand::from_score(score)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn inputs(sentiment: f64, count: i64, hours: f64) -> PriorityInputs {
    PriorityInputs {
      weighted_sentiment_score: sentiment,
      mention_count: count,
      hours_since_last_activity: hours,
    }
  }

  #[test]
  fn test_worst_case_scores_100() {
    let score = priority_score(&inputs(-1.0, 500, 0.0), &PriorityWeights::default(), 200.0);
    assert!((score - 100.0).abs() < 1e-9);
  }

  #[test]
  fn test_quiet_positive_issue_scores_low() {
    let score = priority_score(&inputs(0.8, 1, 240.0), &PriorityWeights::default(), 200.0);
    assert!(score < 5.0);
  }

  #[test]
  fn test_positive_sentiment_contributes_zero() {
    let positive = priority_score(&inputs(0.5, 0, 1e9), &PriorityWeights::default(), 200.0);
    let neutral = priority_score(&inputs(0.0, 0, 1e9), &PriorityWeights::default(), 200.0);
    assert!((positive - neutral).abs() < 1e-9);
  }

  #[test]
  fn test_volume_saturates() {
    let at_saturation = priority_score(&inputs(0.0, 200, 1e9), &PriorityWeights::default(), 200.0);
    let beyond = priority_score(&inputs(0.0, 2_000, 1e9), &PriorityWeights::default(), 200.0);
    assert!((at_saturation - beyond).abs() < 1e-9);
    assert!((at_saturation - 35.0).abs() < 1e-9);
  }

  #[test]
  fn test_time_component_decays() {
    let fresh = priority_score(&inputs(0.0, 0, 0.0), &PriorityWeights::default(), 200.0);
    let day_old = priority_score(&inputs(0.0, 0, 24.0), &PriorityWeights::default(), 200.0);
    assert!((fresh - 25.0).abs() < 1e-9);
    assert!((day_old - 25.0 * (-1.0f64).exp()).abs() < 1e-9);
  }

  #[test]
  fn test_band_mapping() {
    assert_eq!(priority_band(85.0), PriorityBand::Critical);
    assert_eq!(priority_band(65.0), PriorityBand::High);
    assert_eq!(priority_band(45.0), PriorityBand::Medium);
    assert_eq!(priority_band(10.0), PriorityBand::Low);
  }
}
