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

use thiserror::Error;

/// Classifier call failures, matching the service's declared error kinds
#[derive(Error, Debug, Clone)]
pub enum ClientError {
  #[error("Rate limited, retry after {retry_after} seconds")]
  RateLimited { retry_after: u64 },

  #[error("Invalid classifier response: {0}")]
  InvalidResponse(String),

  #[error("Transport error: {0}")]
  Transport(String),

  #[error("Classifier call timed out after {0} seconds")]
  Timeout(u64),

  #[error("Configuration error: {0}")]
  Configuration(String),
}

impl From<serde_json::Error> for ClientError {
  fn from(err: serde_json::Error) -> Self {
    ClientError::InvalidResponse(err.to_string())
  }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rate_limited_display() {
    let err = ClientError::RateLimited { retry_after: 3 };
    assert_eq!(err.to_string(), "Rate limited, retry after 3 seconds");
  }

  #[test]
  fn test_invalid_response_display() {
    let err = ClientError::InvalidResponse("missing label".to_string());
    assert_eq!(err.to_string(), "Invalid classifier response: missing label");
  }

  #[test]
  fn test_transport_display() {
    let err = ClientError::Transport("connection reset".to_string());
    assert_eq!(err.to_string(), "Transport error: connection reset");
  }

  #[test]
  fn test_timeout_display() {
    let err = ClientError::Timeout(120);
    assert_eq!(err.to_string(), "Classifier call timed out after 120 seconds");
  }

  #[test]
  fn test_from_serde_json() {
    let json_err = serde_json::from_str::<String>("not json").unwrap_err();
    let err = ClientError::from(json_err);
    assert!(matches!(err, ClientError::InvalidResponse(_)));
  }
}
