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

//! Raw collector output and source descriptors
//!
//! Every collector yields loosely-shaped JSON maps; the normalizer turns
//! them into canonical mentions. Field names vary per platform, so the
//! accessors here take alias lists and return the first usable value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One untyped item as a collector produced it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord(pub serde_json::Map<String, Value>);

impl RawRecord {
  pub fn new() -> Self {
    Self(serde_json::Map::new())
  }

  pub fn from_value(value: Value) -> Option<Self> {
    match value {
      Value::Object(map) => Some(Self(map)),
      _ => None,
    }
  }

  pub fn set(&mut self, key: &str, value: Value) {
    self.0.insert(key.to_string(), value);
  }

  /// First non-empty string value among the given field aliases
  pub fn str_field(&self, aliases: &[&str]) -> Option<&str> {
    for key in aliases {
      if let Some(Value::String(s)) = self.0.get(*key) {
        if !s.trim().is_empty() {
          return Some(s.as_str());
        }
      }
    }
    None
  }

  /// First numeric value among the given field aliases.
  /// Numbers arriving as strings ("1523") are accepted.
  pub fn i64_field(&self, aliases: &[&str]) -> Option<i64> {
    for key in aliases {
      match self.0.get(*key) {
        Some(Value::Number(n)) => {
          if let Some(v) = n.as_i64() {
            return Some(v);
          }
          if let Some(v) = n.as_f64() {
            return Some(v as i64);
          }
        }
        Some(Value::String(s)) => {
          if let Ok(v) = s.trim().parse::<i64>() {
            return Some(v);
          }
        }
        _ => {}
      }
    }
    None
  }

  pub fn bool_field(&self, aliases: &[&str]) -> Option<bool> {
    for key in aliases {
      match self.0.get(*key) {
        Some(Value::Bool(b)) => return Some(*b),
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
          "true" | "1" | "yes" => return Some(true),
          "false" | "0" | "no" => return Some(false),
          _ => {}
        },
        _ => {}
      }
    }
    None
  }
}

/// How much a source's voice counts toward aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
  Citizen,
  Journalist,
  Official,
  Minister,
  Presidency,
}

impl SourceType {
  /// Base influence weight before verification and reach multipliers
  pub fn base_weight(&self) -> f64 {
    match self {
      SourceType::Citizen => 1.0,
      SourceType::Journalist => 2.0,
      SourceType::Official => 3.0,
      SourceType::Minister => 4.0,
      SourceType::Presidency => 5.0,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      SourceType::Citizen => "citizen",
      SourceType::Journalist => "journalist",
      SourceType::Official => "official",
      SourceType::Minister => "minister",
      SourceType::Presidency => "presidency",
    }
  }
}

impl std::str::FromStr for SourceType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "citizen" => Ok(SourceType::Citizen),
      "journalist" => Ok(SourceType::Journalist),
      "official" => Ok(SourceType::Official),
      "minister" => Ok(SourceType::Minister),
      "presidency" => Ok(SourceType::Presidency),
      other => Err(format!("unknown source type: {}", other)),
    }
  }
}

/// Static description of one configured source feeding the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
  /// Platform identifier, e.g. "twitter", "news", "facebook"
  pub platform: String,

  /// Human-readable source name
  pub source_name: String,

  pub source_type: SourceType,

  /// Queries this source is collected under
  pub queries: Vec<String>,

  /// Default lookback for a source that has never run, in days
  pub lookback_days: i64,

  /// Hard ceiling on how far back a catch-up window may reach, in days
  pub max_lookback_days: i64,

  /// Overlap subtracted from last success when building the next window, in hours
  pub overlap_hours: i64,

  /// Scheduling interval in seconds
  pub interval_secs: u64,

  /// Per-invocation item cap
  pub item_cap: usize,
}

impl SourceDescriptor {
  /// Stable key used for cursor and run bookkeeping
  pub fn source_key(&self) -> String {
    format!("{}:{}", self.platform, self.source_name)
  }
}
