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

/// Failure of one mention's analysis, annotated with the phase that
/// broke. The phase name lands in the mention's `failure_reason` so the
/// operator can see where records die.
#[derive(Error, Debug)]
pub enum AnalysisError {
  #[error("{phase} phase classifier error: {message}")]
  Classifier { phase: &'static str, message: String },

  #[error("{phase} phase returned an invalid response: {message}")]
  InvalidResponse { phase: &'static str, message: String },

  #[error("Database error: {0}")]
  Database(String),

  #[error("shutdown requested")]
  Shutdown,
}

impl AnalysisError {
  /// Compact annotation stored on the failed row
  pub fn failure_reason(&self) -> String {
    match self {
      AnalysisError::Classifier { phase, .. } => format!("{}:classifier_error", phase),
      AnalysisError::InvalidResponse { phase, .. } => format!("{}:invalid_response", phase),
      AnalysisError::Database(_) => "commit:database_error".to_string(),
      AnalysisError::Shutdown => "shutdown".to_string(),
    }
  }
}

impl From<mp_database_postgres::RepositoryError> for AnalysisError {
  fn from(err: mp_database_postgres::RepositoryError) -> Self {
    AnalysisError::Database(err.to_string())
  }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_classifier_error_display() {
    let err = AnalysisError::Classifier { phase: "sentiment", message: "timeout".to_string() };
    assert_eq!(err.to_string(), "sentiment phase classifier error: timeout");
    assert_eq!(err.failure_reason(), "sentiment:classifier_error");
  }

  #[test]
  fn test_invalid_response_reason() {
    let err =
      AnalysisError::InvalidResponse { phase: "emotion", message: "bad shape".to_string() };
    assert_eq!(err.failure_reason(), "emotion:invalid_response");
  }

  #[test]
  fn test_shutdown_reason() {
    assert_eq!(AnalysisError::Shutdown.failure_reason(), "shutdown");
  }
}
