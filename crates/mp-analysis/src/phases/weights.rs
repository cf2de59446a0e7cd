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

//! Phase C: influence and confidence weights

use mp_models::SourceType;

/// Reach thresholds splitting mentions into low/medium/high quantiles
#[derive(Debug, Clone)]
pub struct ReachQuantiles {
  pub medium: i64,
  pub high: i64,
}

impl Default for ReachQuantiles {
  fn default() -> Self {
    Self { medium: 1_000, high: 10_000 }
  }
}

const VERIFIED_MULTIPLIER: f64 = 1.5;

fn reach_multiplier(reach: i64, quantiles: &ReachQuantiles) -> f64 {
  if reach >= quantiles.high {
    1.3
  } else if reach >= quantiles.medium {
    1.15
  } else {
    1.0
  }
}

/// Influence weight in [1, 5]: source-type base, verified boost, reach
/// multiplier
pub fn influence_weight(
  source_type: SourceType,
  verified: bool,
  reach: i64,
  quantiles: &ReachQuantiles,
) -> f64 {
  let verified_multiplier = if verified { VERIFIED_MULTIPLIER } else { 1.0 };
  let weight = source_type.base_weight() * verified_multiplier * reach_multiplier(reach, quantiles);
  weight.clamp(1.0, 5.0)
}

/// Confidence weight in [0, 1]: mean of sentiment magnitude and emotion
/// peak probability
pub fn confidence_weight(sentiment_score: f64, emotion_score: f64) -> f64 {
  ((sentiment_score.abs() + emotion_score) / 2.0).clamp(0.0, 1.0)
}
