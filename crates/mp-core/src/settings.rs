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

//! Layered runtime settings with dot-notation keys
//!
//! Resolution order: environment > store-backed overrides > TOML file >
//! built-in defaults. Every lookup walks the chain at call time, so a
//! store-backed override takes effect without a restart. The store layer
//! is injected as a [`SettingsSource`] trait object to keep this crate
//! free of database dependencies.

use std::collections::HashMap;
use std::sync::Arc;

/// One layer in the settings override chain
pub trait SettingsSource: Send + Sync {
  /// Raw string value for a dot-notation key, if this layer has one
  fn get(&self, key: &str) -> Option<String>;

  /// Layer name for diagnostics
  fn name(&self) -> &'static str;
}

/// Environment layer: `processing.parallel.max_workers` reads
/// `MP_PROCESSING_PARALLEL_MAX_WORKERS`
pub struct EnvSource {
  prefix: &'static str,
}

impl EnvSource {
  pub fn new() -> Self {
    Self { prefix: "MP" }
  }

  fn env_key(&self, key: &str) -> String {
    let mut out = String::with_capacity(self.prefix.len() + key.len() + 1);
    out.push_str(self.prefix);
    for part in key.split(['.', '-']) {
      out.push('_');
      out.push_str(&part.to_ascii_uppercase());
    }
    out
  }
}

impl Default for EnvSource {
  fn default() -> Self {
    Self::new()
  }
}

impl SettingsSource for EnvSource {
  fn get(&self, key: &str) -> Option<String> {
    std::env::var(self.env_key(key)).ok()
  }

  fn name(&self) -> &'static str {
    "env"
  }
}

/// TOML file layer: dot-notation keys traverse nested tables
pub struct FileSource {
  root: toml::Value,
}

impl FileSource {
  pub fn from_str(contents: &str) -> Result<Self, toml::de::Error> {
    Ok(Self { root: contents.parse::<toml::Value>()? })
  }

  pub fn from_path(path: &str) -> std::io::Result<Self> {
    let contents = std::fs::read_to_string(path)?;
    Self::from_str(&contents)
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
  }
}

impl SettingsSource for FileSource {
  fn get(&self, key: &str) -> Option<String> {
    let mut node = &self.root;
    for part in key.split('.') {
      node = node.get(part)?;
    }
    match node {
      toml::Value::String(s) => Some(s.clone()),
      toml::Value::Integer(i) => Some(i.to_string()),
      toml::Value::Float(f) => Some(f.to_string()),
      toml::Value::Boolean(b) => Some(b.to_string()),
      toml::Value::Array(items) => {
        let parts: Vec<String> = items
          .iter()
          .map(|v| match v {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
          })
          .collect();
        Some(parts.join(","))
      }
      _ => None,
    }
  }

  fn name(&self) -> &'static str {
    "file"
  }
}

/// Built-in defaults, always the last layer in the chain
pub struct DefaultsSource {
  map: HashMap<&'static str, &'static str>,
}

impl DefaultsSource {
  pub fn new() -> Self {
    let mut map = HashMap::new();
    map.insert("processing.parallel.max_workers", "10");
    map.insert("processing.parallel.batch_size", "50");
    map.insert("processing.poll_interval_seconds", "2");
    map.insert("processing.sentiment.positive_threshold", "0.2");
    map.insert("processing.sentiment.negative_threshold", "0.2");
    map.insert("processing.topic.min_score_threshold", "0.2");
    map.insert("processing.topic.confidence_threshold", "0.85");
    map.insert("processing.topic.keyword_score_threshold", "0.3");
    map.insert("processing.topic.embedding_score_threshold", "0.5");
    map.insert("processing.timeouts.collector_seconds", "300");
    map.insert("processing.timeouts.classifier_seconds", "120");
    map.insert("processing.timeouts.stale_claim_seconds", "300");
    map.insert("processing.timeouts.shutdown_grace_seconds", "30");
    map.insert("processing.issues.cluster_similarity", "0.75");
    map.insert("processing.issues.min_cluster_size", "3");
    map.insert("processing.issues.time_window_hours", "24");
    map.insert("processing.issues.match_threshold", "0.75");
    map.insert("processing.issues.volume_saturation", "200");
    map.insert("processing.issues.priority_weights.sentiment", "0.4");
    map.insert("processing.issues.priority_weights.volume", "0.35");
    map.insert("processing.issues.priority_weights.time", "0.25");
    map.insert("processing.aggregation.windows", "15m,1h,24h,7d,30d");
    map.insert("processing.aggregation.tick_seconds", "300");
    map.insert("deduplication.similarity_threshold", "0.85");
    map.insert("deduplication.window_hours", "24");
    map.insert("ingestion.max_collector_workers", "4");
    map.insert("ingestion.consecutive_failure_limit", "5");
    map.insert("ingestion.tail_interval_seconds", "30");
    map.insert("ingestion.allowed_languages", "");
    Self { map }
  }
}

impl Default for DefaultsSource {
  fn default() -> Self {
    Self::new()
  }
}

impl SettingsSource for DefaultsSource {
  fn get(&self, key: &str) -> Option<String> {
    self.map.get(key).map(|v| v.to_string())
  }

  fn name(&self) -> &'static str {
    "defaults"
  }
}

/// The resolved settings chain handed to every component
#[derive(Clone)]
pub struct Settings {
  sources: Vec<Arc<dyn SettingsSource>>,
}

impl Settings {
  /// Build the full chain: env > store > file > defaults.
  /// `store` and `file` layers are optional.
  pub fn new(store: Option<Arc<dyn SettingsSource>>, file: Option<FileSource>) -> Self {
    let mut sources: Vec<Arc<dyn SettingsSource>> = vec![Arc::new(EnvSource::new())];
    if let Some(store) = store {
      sources.push(store);
    }
    if let Some(file) = file {
      sources.push(Arc::new(file));
    }
    sources.push(Arc::new(DefaultsSource::new()));
    Self { sources }
  }

  /// Defaults-only chain (for tests and tools)
  pub fn defaults_only() -> Self {
    Self { sources: vec![Arc::new(DefaultsSource::new())] }
  }

  /// First raw value along the chain
  pub fn get_raw(&self, key: &str) -> Option<String> {
    self.sources.iter().find_map(|s| s.get(key))
  }

  pub fn str_or(&self, key: &str, default: &str) -> String {
    self.get_raw(key).unwrap_or_else(|| default.to_string())
  }

  /// Typed lookup: a layer whose value fails to parse is skipped so a
  /// malformed override cannot mask the layers beneath it.
  fn parse_or<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
    for source in &self.sources {
      if let Some(raw) = source.get(key) {
        if let Ok(parsed) = raw.trim().parse::<T>() {
          return parsed;
        }
      }
    }
    default
  }

  pub fn u64_or(&self, key: &str, default: u64) -> u64 {
    self.parse_or(key, default)
  }

  pub fn usize_or(&self, key: &str, default: usize) -> usize {
    self.parse_or(key, default)
  }

  pub fn i64_or(&self, key: &str, default: i64) -> i64 {
    self.parse_or(key, default)
  }

  pub fn f64_or(&self, key: &str, default: f64) -> f64 {
    self.parse_or(key, default)
  }

  pub fn f32_or(&self, key: &str, default: f32) -> f32 {
    self.parse_or(key, default)
  }

  pub fn bool_or(&self, key: &str, default: bool) -> bool {
    self.parse_or(key, default)
  }

  /// Comma-separated list; empty string yields an empty list
  pub fn list(&self, key: &str) -> Vec<String> {
    match self.get_raw(key) {
      Some(raw) => {
        raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
      }
      None => Vec::new(),
    }
  }
}

impl std::fmt::Debug for Settings {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
    f.debug_struct("Settings").field("sources", &names).finish()
  }
}
