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

//! HTTP transport for classifier requests
//!
//! Handles the low-level communication with the classifier service:
//! request construction, response parsing, error-kind mapping, and
//! transport-level retries. Rate limiting is NOT handled here; callers
//! reserve against the token bank first.

use crate::error::{ClientError, ClientResult};
use crate::prompts::ClassifyRequest;
use mp_core::Config;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const CLASSIFY_PATH: &str = "/v1/classify";

/// Low-level classifier transport
pub struct Transport {
  client: Client,
  api_key: String,
  base_url: String,
  timeout_secs: u64,
  max_retries: u32,
}

impl Transport {
  pub fn new(config: &Config) -> ClientResult<Self> {
    let timeout = Duration::from_secs(config.classifier_timeout_secs);

    let client = Client::builder()
      .timeout(timeout)
      .user_agent("mp-client/1.0")
      .build()
      .map_err(|e| ClientError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self {
      client,
      api_key: config.classifier_api_key.clone(),
      base_url: config.classifier_url.trim_end_matches('/').to_string(),
      timeout_secs: config.classifier_timeout_secs,
      max_retries: config.max_retries,
    })
  }

  /// Execute one classify request and parse the declared response shape.
  ///
  /// Transport failures retry with exponential backoff (1 s, 2 s, 4 s) up
  /// to `max_retries`. Rate limiting and invalid responses are returned
  /// to the caller immediately; only the caller knows whether the phase
  /// can be retried.
  #[instrument(skip(self, request), fields(template = %request.template))]
  pub async fn classify<T>(&self, request: &ClassifyRequest) -> ClientResult<T>
  where
    T: DeserializeOwned,
  {
    let url = format!("{}{}", self.base_url, CLASSIFY_PATH);
    let mut last_error = None;

    for attempt in 1..=self.max_retries {
      match self.execute_request(&url, request).await {
        Ok(body) => {
          debug!("classifier response received on attempt {}", attempt);
          return serde_json::from_str::<T>(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("response shape mismatch: {}", e)));
        }
        Err(err @ (ClientError::RateLimited { .. } | ClientError::InvalidResponse(_))) => {
          return Err(err);
        }
        Err(err) => {
          warn!("classifier attempt {} failed: {}", attempt, err);
          last_error = Some(err);

          if attempt < self.max_retries {
            let delay = Duration::from_millis(1000 * (2_u64.pow(attempt - 1)));
            tokio::time::sleep(delay).await;
          }
        }
      }
    }

    Err(last_error.unwrap_or_else(|| ClientError::Transport("max retries exceeded".to_string())))
  }

  async fn execute_request(&self, url: &str, request: &ClassifyRequest) -> ClientResult<String> {
    let response = self
      .client
      .post(url)
      .bearer_auth(&self.api_key)
      .json(request)
      .send()
      .await
      .map_err(|e| {
        if e.is_timeout() {
          ClientError::Timeout(self.timeout_secs)
        } else {
          ClientError::Transport(e.to_string())
        }
      })?;

    match response.status() {
      StatusCode::OK => {
        response.text().await.map_err(|e| ClientError::Transport(e.to_string()))
      }
      StatusCode::TOO_MANY_REQUESTS => {
        let retry_after = response
          .headers()
          .get(reqwest::header::RETRY_AFTER)
          .and_then(|v| v.to_str().ok())
          .and_then(|v| v.parse::<u64>().ok())
          .unwrap_or(1);
        Err(ClientError::RateLimited { retry_after })
      }
      status if status.is_client_error() => {
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::InvalidResponse(format!("{}: {}", status, body)))
      }
      status => Err(ClientError::Transport(format!("unexpected status {}", status))),
    }
  }
}

impl std::fmt::Debug for Transport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Transport")
      .field("base_url", &self.base_url)
      .field("timeout_secs", &self.timeout_secs)
      .field("max_retries", &self.max_retries)
      .finish()
  }
}
