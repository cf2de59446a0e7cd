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

//! High-level classifier client
//!
//! One method per prompt template. Every call reserves its estimated
//! token cost against the per-model bank before touching the transport,
//! so concurrent analysis workers share the model's TPM budget fairly.

use crate::error::ClientResult;
use crate::limiter::{TokenBank, estimate_tokens};
use crate::prompts::ClassifyRequest;
use crate::transport::Transport;
use mp_core::{Config, PromptKind};
use mp_models::{EmotionResponse, IssueSummaryResponse, SentimentResponse};
use serde_json::json;
use std::sync::Arc;

/// Classifier service client shared by all analysis workers
pub struct ClassifierClient {
  transport: Arc<Transport>,
  token_bank: Arc<TokenBank>,
  model: String,
}

impl ClassifierClient {
  pub fn new(config: &Config) -> ClientResult<Self> {
    let transport = Arc::new(Transport::new(config)?);
    let token_bank = Arc::new(TokenBank::new(config.tokens_per_minute));
    Ok(Self { transport, token_bank, model: config.classifier_model.clone() })
  }

  /// Create a client with a shared token bank (multiple clients against
  /// one model budget)
  pub fn with_token_bank(config: &Config, token_bank: Arc<TokenBank>) -> ClientResult<Self> {
    Ok(Self {
      transport: Arc::new(Transport::new(config)?),
      token_bank,
      model: config.classifier_model.clone(),
    })
  }

  pub fn model(&self) -> &str {
    &self.model
  }

  /// Sentiment label, score, justification, and the text embedding
  pub async fn sentiment(&self, text: &str) -> ClientResult<SentimentResponse> {
    self.token_bank.reserve(&self.model, estimate_tokens(text)).await;
    let request = ClassifyRequest::new(PromptKind::SentimentAnalysis, &self.model, text);
    self.transport.classify(&request).await
  }

  /// Probability distribution over the six tracked emotions
  pub async fn emotion(&self, text: &str) -> ClientResult<EmotionResponse> {
    self.token_bank.reserve(&self.model, estimate_tokens(text)).await;
    let request = ClassifyRequest::new(PromptKind::EmotionAnalysis, &self.model, text);
    self.transport.classify(&request).await
  }

  /// Short label summarizing a cluster of related mention texts
  pub async fn issue_summary(&self, samples: &[String]) -> ClientResult<IssueSummaryResponse> {
    let joined = samples.join("\n---\n");
    self.token_bank.reserve(&self.model, estimate_tokens(&joined)).await;
    let request = ClassifyRequest::new(PromptKind::IssueSummary, &self.model, &joined)
      .with_variables(json!({ "sample_count": samples.len() }));
    self.transport.classify(&request).await
  }
}

impl std::fmt::Debug for ClassifierClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ClassifierClient")
      .field("model", &self.model)
      .field("token_bank", &self.token_bank)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use wiremock::matchers::{body_partial_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn test_config(base_url: &str) -> Config {
    Config::default_with_urls("postgresql://unused".to_string(), base_url.to_string())
  }

  #[tokio::test]
  async fn test_sentiment_call_uses_sentiment_template() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/classify"))
      .and(body_partial_json(json!({"template": "SENTIMENT_ANALYSIS"})))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "label": "negative",
        "score": -0.6,
        "justification": "shortage complaints",
        "embedding": [1.0, 0.0]
      })))
      .mount(&server)
      .await;

    let client = ClassifierClient::new(&test_config(&server.uri())).unwrap();
    let response = client.sentiment("no fuel anywhere").await.unwrap();
    assert_eq!(response.score, -0.6);
  }

  #[tokio::test]
  async fn test_emotion_call_parses_distribution() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/classify"))
      .and(body_partial_json(json!({"template": "EMOTION_ANALYSIS"})))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "distribution": {
          "anger": 0.7, "fear": 0.1, "trust": 0.05,
          "sadness": 0.1, "joy": 0.0, "disgust": 0.05
        }
      })))
      .mount(&server)
      .await;

    let client = ClassifierClient::new(&test_config(&server.uri())).unwrap();
    let response = client.emotion("furious about the queues").await.unwrap();
    assert_eq!(response.distribution.argmax().0, "anger");
  }

  #[tokio::test]
  async fn test_issue_summary_sends_sample_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/classify"))
      .and(body_partial_json(json!({
        "template": "ISSUE_SUMMARY",
        "variables": {"sample_count": 2}
      })))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({"label": "Fuel queue complaints"})),
      )
      .mount(&server)
      .await;

    let client = ClassifierClient::new(&test_config(&server.uri())).unwrap();
    let response = client
      .issue_summary(&["no petrol in town".to_string(), "queues since dawn".to_string()])
      .await
      .unwrap();
    assert_eq!(response.label, "Fuel queue complaints");
  }
}
