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

//! Time windows and aggregation subjects

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

impl TimeWindow {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    Self { start, end }
  }

  /// Membership test, half-open on the left: start inclusive, end exclusive
  pub fn contains(&self, t: DateTime<Utc>) -> bool {
    t >= self.start && t < self.end
  }
}

/// Supported aggregation window sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowSize {
  Minutes15,
  Hour1,
  Hours24,
  Days7,
  Days30,
}

impl WindowSize {
  pub fn as_str(&self) -> &'static str {
    match self {
      WindowSize::Minutes15 => "15m",
      WindowSize::Hour1 => "1h",
      WindowSize::Hours24 => "24h",
      WindowSize::Days7 => "7d",
      WindowSize::Days30 => "30d",
    }
  }

  pub fn duration(&self) -> Duration {
    match self {
      WindowSize::Minutes15 => Duration::minutes(15),
      WindowSize::Hour1 => Duration::hours(1),
      WindowSize::Hours24 => Duration::hours(24),
      WindowSize::Days7 => Duration::days(7),
      WindowSize::Days30 => Duration::days(30),
    }
  }

  /// Snap a timestamp to the start of the window containing it.
  /// Windows are anchored at integer multiples of the size from the Unix epoch.
  pub fn window_start(&self, t: DateTime<Utc>) -> DateTime<Utc> {
    let size = self.duration().num_seconds();
    let secs = t.timestamp();
    let snapped = secs.div_euclid(size) * size;
    Utc.timestamp_opt(snapped, 0).single().unwrap_or(t)
  }

  /// The full window containing `t`
  pub fn window_containing(&self, t: DateTime<Utc>) -> TimeWindow {
    let start = self.window_start(t);
    TimeWindow::new(start, start + self.duration())
  }

  pub fn all() -> [WindowSize; 5] {
    [
      WindowSize::Minutes15,
      WindowSize::Hour1,
      WindowSize::Hours24,
      WindowSize::Days7,
      WindowSize::Days30,
    ]
  }
}

impl std::str::FromStr for WindowSize {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "15m" => Ok(WindowSize::Minutes15),
      "1h" => Ok(WindowSize::Hour1),
      "24h" => Ok(WindowSize::Hours24),
      "7d" => Ok(WindowSize::Days7),
      "30d" => Ok(WindowSize::Days30),
      other => Err(format!("unknown window size: {}", other)),
    }
  }
}

impl std::fmt::Display for WindowSize {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// What an aggregation row is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
  Topic,
  Issue,
  Entity,
}

impl SubjectKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      SubjectKind::Topic => "topic",
      SubjectKind::Issue => "issue",
      SubjectKind::Entity => "entity",
    }
  }
}

impl std::str::FromStr for SubjectKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "topic" => Ok(SubjectKind::Topic),
      "issue" => Ok(SubjectKind::Issue),
      "entity" => Ok(SubjectKind::Entity),
      other => Err(format!("unknown subject kind: {}", other)),
    }
  }
}

impl std::fmt::Display for SubjectKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
