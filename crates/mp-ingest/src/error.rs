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

#[derive(Error, Debug)]
pub enum IngestError {
  #[error("Collector error: {0}")]
  Collector(String),

  #[error("Collector timed out after {timeout_secs} seconds: {source_key}")]
  CollectorTimeout { source_key: String, timeout_secs: u64 },

  #[error("Database error: {0}")]
  Database(String),

  #[error("Write conflict persisted after {attempts} attempts")]
  WriteConflict { attempts: u32 },

  #[error("Serialization error: {0}")]
  Serialization(String),

  #[error("Configuration error: {0}")]
  Configuration(String),
}

impl From<mp_database_postgres::RepositoryError> for IngestError {
  fn from(err: mp_database_postgres::RepositoryError) -> Self {
    IngestError::Database(err.to_string())
  }
}

impl From<serde_json::Error> for IngestError {
  fn from(err: serde_json::Error) -> Self {
    IngestError::Serialization(err.to_string())
  }
}

pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_collector_error_display() {
    let err = IngestError::Collector("http 502".to_string());
    assert_eq!(err.to_string(), "Collector error: http 502");
  }

  #[test]
  fn test_collector_timeout_display() {
    let err = IngestError::CollectorTimeout {
      source_key: "twitter:fuel-watch".to_string(),
      timeout_secs: 300,
    };
    assert_eq!(
      err.to_string(),
      "Collector timed out after 300 seconds: twitter:fuel-watch"
    );
  }

  #[test]
  fn test_write_conflict_display() {
    let err = IngestError::WriteConflict { attempts: 3 };
    assert_eq!(err.to_string(), "Write conflict persisted after 3 attempts");
  }

  #[test]
  fn test_from_repository_error() {
    let repo_err = mp_database_postgres::RepositoryError::QueryError("boom".to_string());
    let err = IngestError::from(repo_err);
    assert!(matches!(err, IngestError::Database(_)));
  }
}
