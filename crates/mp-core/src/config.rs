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

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;

/// Process-level configuration for the mediapulse pipeline
///
/// Carries everything that must be known before the settings layer is
/// reachable: the database, the classifier endpoint, and its budgets.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// PostgreSQL connection URL
  pub database_url: String,

  /// Classifier service base URL
  pub classifier_url: String,

  /// Classifier service API key
  pub classifier_api_key: String,

  /// Default classifier model identifier
  pub classifier_model: String,

  /// Embedding model identifier recorded with each embedding row
  pub embedding_model: String,

  /// Per-model token budget (tokens per minute)
  pub tokens_per_minute: u32,

  /// Classifier request timeout in seconds
  pub classifier_timeout_secs: u64,

  /// Maximum retries for transport failures
  pub max_retries: u32,

  /// Optional TOML settings file consumed by the layered settings reader
  pub settings_file: Option<String>,
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let database_url =
      env::var("DATABASE_URL").map_err(|_| Error::Config("DATABASE_URL not set".to_string()))?;

    let classifier_url = env::var("MP_CLASSIFIER_URL")
      .map_err(|_| Error::Config("MP_CLASSIFIER_URL not set".to_string()))?;

    let classifier_api_key = env::var("MP_CLASSIFIER_API_KEY")
      .map_err(|_| Error::Config("MP_CLASSIFIER_API_KEY not set".to_string()))?;

    let classifier_model =
      env::var("MP_CLASSIFIER_MODEL").unwrap_or_else(|_| crate::DEFAULT_CLASSIFIER_MODEL.to_string());

    let embedding_model =
      env::var("MP_EMBEDDING_MODEL").unwrap_or_else(|_| crate::DEFAULT_EMBEDDING_MODEL.to_string());

    let tokens_per_minute = env::var("MP_TOKENS_PER_MINUTE")
      .unwrap_or_else(|_| crate::DEFAULT_TOKENS_PER_MINUTE.to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid MP_TOKENS_PER_MINUTE".to_string()))?;

    let classifier_timeout_secs = env::var("MP_CLASSIFIER_TIMEOUT_SECS")
      .unwrap_or_else(|_| "120".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid MP_CLASSIFIER_TIMEOUT_SECS".to_string()))?;

    let max_retries = env::var("MP_MAX_RETRIES")
      .unwrap_or_else(|_| "3".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid MP_MAX_RETRIES".to_string()))?;

    let settings_file = env::var("MP_SETTINGS_FILE").ok();

    Ok(Config {
      database_url,
      classifier_url,
      classifier_api_key,
      classifier_model,
      embedding_model,
      tokens_per_minute,
      classifier_timeout_secs,
      max_retries,
      settings_file,
    })
  }

  /// Create a config with default values (for testing)
  pub fn default_with_urls(database_url: String, classifier_url: String) -> Self {
    Config {
      database_url,
      classifier_url,
      classifier_api_key: "test_key".to_string(),
      classifier_model: crate::DEFAULT_CLASSIFIER_MODEL.to_string(),
      embedding_model: crate::DEFAULT_EMBEDDING_MODEL.to_string(),
      tokens_per_minute: crate::DEFAULT_TOKENS_PER_MINUTE,
      classifier_timeout_secs: 120,
      max_retries: 3,
      settings_file: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_with_urls() {
    let config = Config::default_with_urls(
      "postgresql://localhost/mp".to_string(),
      "http://localhost:9000".to_string(),
    );
    assert_eq!(config.classifier_model, crate::DEFAULT_CLASSIFIER_MODEL);
    assert_eq!(config.tokens_per_minute, crate::DEFAULT_TOKENS_PER_MINUTE);
    assert_eq!(config.max_retries, 3);
    assert!(config.settings_file.is_none());
  }
}
