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

//! The canonical mention shape produced by normalization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::raw::SourceType;

/// Why a raw record was dropped during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
  #[error("missing required field")]
  MissingRequiredField,

  #[error("unsupported language")]
  UnsupportedLanguage,

  #[error("malformed timestamp")]
  MalformedTimestamp,
}

/// Mutable engagement counters reported by the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
  pub likes: i64,
  pub shares: i64,
  pub comments: i64,
  pub direct_reach: i64,
  pub cumulative_reach: i64,
}

/// A normalized mention, ready for the dedup writer.
/// Analysis fields live on the database row, not here; this shape only
/// carries what ingestion knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalMention {
  /// Platform-native identifier, when the source exposes one
  pub source_id: Option<String>,
  pub url: Option<String>,

  pub platform: String,
  pub source_type: SourceType,
  pub source_name: String,
  /// The query that surfaced this item
  pub query: Option<String>,

  pub collected_at: DateTime<Utc>,
  pub published_at: DateTime<Utc>,
  pub language: Option<String>,
  pub country: Option<String>,

  pub title: Option<String>,
  pub text: String,

  pub author_handle: Option<String>,
  pub author_name: Option<String>,
  pub author_avatar: Option<String>,
  pub author_location: Option<String>,
  pub author_verified: bool,

  pub engagement: Engagement,
}

/// Sentiment polarity assigned by analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
  Positive,
  Negative,
  Neutral,
}

impl SentimentLabel {
  pub fn as_str(&self) -> &'static str {
    match self {
      SentimentLabel::Positive => "positive",
      SentimentLabel::Negative => "negative",
      SentimentLabel::Neutral => "neutral",
    }
  }

  /// Score-derived label. The score always wins over whatever label the
  /// classifier claimed.
  pub fn from_score(score: f64, pos_threshold: f64, neg_threshold: f64) -> Self {
    if score >= pos_threshold {
      SentimentLabel::Positive
    } else if score <= -neg_threshold {
      SentimentLabel::Negative
    } else {
      SentimentLabel::Neutral
    }
  }
}

impl std::str::FromStr for SentimentLabel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "positive" => Ok(SentimentLabel::Positive),
      "negative" => Ok(SentimentLabel::Negative),
      "neutral" => Ok(SentimentLabel::Neutral),
      other => Err(format!("unknown sentiment label: {}", other)),
    }
  }
}

impl std::fmt::Display for SentimentLabel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Dominant emotion assigned by analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
  Anger,
  Fear,
  Trust,
  Sadness,
  Joy,
  Disgust,
  Neutral,
}

impl EmotionLabel {
  pub fn as_str(&self) -> &'static str {
    match self {
      EmotionLabel::Anger => "anger",
      EmotionLabel::Fear => "fear",
      EmotionLabel::Trust => "trust",
      EmotionLabel::Sadness => "sadness",
      EmotionLabel::Joy => "joy",
      EmotionLabel::Disgust => "disgust",
      EmotionLabel::Neutral => "neutral",
    }
  }
}

impl std::str::FromStr for EmotionLabel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "anger" => Ok(EmotionLabel::Anger),
      "fear" => Ok(EmotionLabel::Fear),
      "trust" => Ok(EmotionLabel::Trust),
      "sadness" => Ok(EmotionLabel::Sadness),
      "joy" => Ok(EmotionLabel::Joy),
      "disgust" => Ok(EmotionLabel::Disgust),
      "neutral" => Ok(EmotionLabel::Neutral),
      other => Err(format!("unknown emotion label: {}", other)),
    }
  }
}

impl std::fmt::Display for EmotionLabel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Analysis claim state of a mention row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
  Pending,
  Processing,
  Completed,
  Failed,
}

impl ProcessingStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProcessingStatus::Pending => "pending",
      ProcessingStatus::Processing => "processing",
      ProcessingStatus::Completed => "completed",
      ProcessingStatus::Failed => "failed",
    }
  }
}

impl std::str::FromStr for ProcessingStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "pending" => Ok(ProcessingStatus::Pending),
      "processing" => Ok(ProcessingStatus::Processing),
      "completed" => Ok(ProcessingStatus::Completed),
      "failed" => Ok(ProcessingStatus::Failed),
      other => Err(format!("unknown processing status: {}", other)),
    }
  }
}

impl std::fmt::Display for ProcessingStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sentiment_label_from_score_thresholds() {
    assert_eq!(SentimentLabel::from_score(0.2, 0.2, 0.2), SentimentLabel::Positive);
    assert_eq!(SentimentLabel::from_score(0.19, 0.2, 0.2), SentimentLabel::Neutral);
    assert_eq!(SentimentLabel::from_score(-0.2, 0.2, 0.2), SentimentLabel::Negative);
    assert_eq!(SentimentLabel::from_score(-0.19, 0.2, 0.2), SentimentLabel::Neutral);
    assert_eq!(SentimentLabel::from_score(0.0, 0.2, 0.2), SentimentLabel::Neutral);
  }

  #[test]
  fn test_sentiment_label_roundtrip() {
    for label in [SentimentLabel::Positive, SentimentLabel::Negative, SentimentLabel::Neutral] {
      assert_eq!(label.as_str().parse::<SentimentLabel>().unwrap(), label);
    }
  }

  #[test]
  fn test_emotion_label_roundtrip() {
    for label in [
      EmotionLabel::Anger,
      EmotionLabel::Fear,
      EmotionLabel::Trust,
      EmotionLabel::Sadness,
      EmotionLabel::Joy,
      EmotionLabel::Disgust,
      EmotionLabel::Neutral,
    ] {
      assert_eq!(label.as_str().parse::<EmotionLabel>().unwrap(), label);
    }
  }

  #[test]
  fn test_processing_status_roundtrip() {
    for status in [
      ProcessingStatus::Pending,
      ProcessingStatus::Processing,
      ProcessingStatus::Completed,
      ProcessingStatus::Failed,
    ] {
      assert_eq!(status.as_str().parse::<ProcessingStatus>().unwrap(), status);
    }
  }

  #[test]
  fn test_reject_reason_display() {
    assert_eq!(RejectReason::MissingRequiredField.to_string(), "missing required field");
    assert_eq!(RejectReason::MalformedTimestamp.to_string(), "malformed timestamp");
    assert_eq!(RejectReason::UnsupportedLanguage.to_string(), "unsupported language");
  }

  #[test]
  fn test_engagement_default_is_zero() {
    let engagement = Engagement::default();
    assert_eq!(engagement.likes, 0);
    assert_eq!(engagement.cumulative_reach, 0);
  }
}
