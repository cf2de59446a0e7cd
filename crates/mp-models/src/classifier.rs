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

//! Classifier service response shapes
//!
//! The classifier is a remote request/response facility with declared
//! response shapes per prompt template. These structs are the wire
//! contract; validation beyond serde (score ranges, distribution mass)
//! happens here so every consumer sees the same rules.

use serde::{Deserialize, Serialize};

/// Tolerance for an emotion distribution's total probability mass
pub const DISTRIBUTION_EPSILON: f64 = 1e-3;

/// Sentiment phase response: label, score, justification, and the text embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResponse {
  pub label: String,

  /// Polarity in [-1, 1]
  pub score: f64,

  pub justification: String,

  /// Unit-length text embedding reused by the topic and issue phases
  pub embedding: Vec<f32>,
}

/// Probability distribution over the six tracked emotions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionDistribution {
  pub anger: f64,
  pub fear: f64,
  pub trust: f64,
  pub sadness: f64,
  pub joy: f64,
  pub disgust: f64,
}

impl EmotionDistribution {
  pub fn sum(&self) -> f64 {
    self.anger + self.fear + self.trust + self.sadness + self.joy + self.disgust
  }

  /// Rescale to unit mass when the reported mass drifts past the
  /// tolerance. A zero-mass distribution is left untouched.
  pub fn normalized(&self) -> Self {
    let total = self.sum();
    if total <= 0.0 || (total - 1.0).abs() <= DISTRIBUTION_EPSILON {
      return *self;
    }
    Self {
      anger: self.anger / total,
      fear: self.fear / total,
      trust: self.trust / total,
      sadness: self.sadness / total,
      joy: self.joy / total,
      disgust: self.disgust / total,
    }
  }

  /// Dominant emotion and its probability
  pub fn argmax(&self) -> (&'static str, f64) {
    let entries = self.entries();
    let mut best = entries[0];
    for entry in entries.iter().skip(1) {
      if entry.1 > best.1 {
        best = *entry;
      }
    }
    best
  }

  pub fn entries(&self) -> [(&'static str, f64); 6] {
    [
      ("anger", self.anger),
      ("fear", self.fear),
      ("trust", self.trust),
      ("sadness", self.sadness),
      ("joy", self.joy),
      ("disgust", self.disgust),
    ]
  }

  pub fn zero() -> Self {
    Self { anger: 0.0, fear: 0.0, trust: 0.0, sadness: 0.0, joy: 0.0, disgust: 0.0 }
  }
}

/// Emotion phase response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResponse {
  pub distribution: EmotionDistribution,
}

/// Issue summary response used when labelling a new cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummaryResponse {
  pub label: String,
}
