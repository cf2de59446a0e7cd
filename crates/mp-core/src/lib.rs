/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-dot-]browne[-at-]dwightjbrowne[-dot-]com
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

//! # mp-core
//!
//! Core types, configuration, and error handling for the mediapulse pipeline.
//!
//! This crate provides the foundational components shared across all mediapulse crates:
//!
//! - [`Config`] - process configuration (database, classifier endpoint, budgets)
//! - [`Settings`] - layered dot-notation runtime settings
//! - [`Error`] and [`Result`] - unified error handling
//! - [`PromptKind`] - type-safe classifier prompt template identifiers

pub mod config;
pub mod error;
pub mod settings;
pub use config::Config;
pub use error::{Error, Result};
pub use settings::{Settings, SettingsSource};

/// Prompt templates the classifier service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
  /// Sentiment label, score, justification, and the text embedding
  SentimentAnalysis,

  /// Probability distribution over the six tracked emotions
  EmotionAnalysis,

  /// Short label summarizing a cluster of related mentions
  IssueSummary,
}

impl std::fmt::Display for PromptKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PromptKind::SentimentAnalysis => write!(f, "SENTIMENT_ANALYSIS"),
      PromptKind::EmotionAnalysis => write!(f, "EMOTION_ANALYSIS"),
      PromptKind::IssueSummary => write!(f, "ISSUE_SUMMARY"),
    }
  }
}

/// Default classifier model identifier
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4o-mini";

/// Default embedding model identifier
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Dimensionality of mention embeddings
pub const EMBEDDING_DIMENSIONS: usize = 1536;

/// Default per-model token budget (tokens per minute)
pub const DEFAULT_TOKENS_PER_MINUTE: u32 = 200_000;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_prompt_kind_sentiment() {
    assert_eq!(PromptKind::SentimentAnalysis.to_string(), "SENTIMENT_ANALYSIS");
  }

  #[test]
  fn test_prompt_kind_emotion() {
    assert_eq!(PromptKind::EmotionAnalysis.to_string(), "EMOTION_ANALYSIS");
  }

  #[test]
  fn test_prompt_kind_issue_summary() {
    assert_eq!(PromptKind::IssueSummary.to_string(), "ISSUE_SUMMARY");
  }

  #[test]
  fn test_prompt_kind_is_hashable() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(PromptKind::SentimentAnalysis);
    set.insert(PromptKind::SentimentAnalysis);
    assert_eq!(set.len(), 1);
  }

  #[test]
  fn test_embedding_dimensions() {
    assert_eq!(EMBEDDING_DIMENSIONS, 1536);
  }
}
