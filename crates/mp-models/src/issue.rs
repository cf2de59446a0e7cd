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

//! Issue lifecycle and trend vocabulary

use serde::{Deserialize, Serialize};

/// Lifecycle state of an emergent issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
  Emerging,
  Active,
  Escalated,
  Stabilizing,
  Resolved,
  Archived,
}

impl IssueState {
  pub fn as_str(&self) -> &'static str {
    match self {
      IssueState::Emerging => "emerging",
      IssueState::Active => "active",
      IssueState::Escalated => "escalated",
      IssueState::Stabilizing => "stabilizing",
      IssueState::Resolved => "resolved",
      IssueState::Archived => "archived",
    }
  }

  /// Whether a cluster centroid may still be matched against this issue
  pub fn accepts_matches(&self) -> bool {
    matches!(
      self,
      IssueState::Emerging
        | IssueState::Active
        | IssueState::Escalated
        | IssueState::Stabilizing
        | IssueState::Resolved
    )
  }

  /// Legal lifecycle edges. Archival is administrative and allowed from
  /// anywhere; everything else follows the happy path with the
  /// active/stabilizing oscillation and resolved reactivation.
  pub fn can_transition_to(&self, next: IssueState) -> bool {
    if next == IssueState::Archived {
      return *self != IssueState::Archived;
    }
    matches!(
      (*self, next),
      (IssueState::Emerging, IssueState::Active)
        | (IssueState::Active, IssueState::Escalated)
        | (IssueState::Active, IssueState::Stabilizing)
        | (IssueState::Stabilizing, IssueState::Active)
        | (IssueState::Stabilizing, IssueState::Resolved)
        | (IssueState::Escalated, IssueState::Active)
        | (IssueState::Resolved, IssueState::Active)
    )
  }
}

impl std::str::FromStr for IssueState {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "emerging" => Ok(IssueState::Emerging),
      "active" => Ok(IssueState::Active),
      "escalated" => Ok(IssueState::Escalated),
      "stabilizing" => Ok(IssueState::Stabilizing),
      "resolved" => Ok(IssueState::Resolved),
      "archived" => Ok(IssueState::Archived),
      other => Err(format!("unknown issue state: {}", other)),
    }
  }
}

impl std::fmt::Display for IssueState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Priority band derived from the priority score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityBand {
  Low,
  Medium,
  High,
  Critical,
}

impl PriorityBand {
  pub fn as_str(&self) -> &'static str {
    match self {
      PriorityBand::Low => "low",
      PriorityBand::Medium => "medium",
      PriorityBand::High => "high",
      PriorityBand::Critical => "critical",
    }
  }

  pub fn from_score(score: f64) -> Self {
    if score >= 80.0 {
      PriorityBand::Critical
    } else if score >= 60.0 {
      PriorityBand::High
    } else if score >= 40.0 {
      PriorityBand::Medium
    } else {
      PriorityBand::Low
    }
  }
}

impl std::str::FromStr for PriorityBand {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "low" => Ok(PriorityBand::Low),
      "medium" => Ok(PriorityBand::Medium),
      "high" => Ok(PriorityBand::High),
      "critical" => Ok(PriorityBand::Critical),
      other => Err(format!("unknown priority band: {}", other)),
    }
  }
}

impl std::fmt::Display for PriorityBand {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Period-over-period direction of a sentiment index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
  Improving,
  Deteriorating,
  Stable,
}

impl TrendDirection {
  pub fn as_str(&self) -> &'static str {
    match self {
      TrendDirection::Improving => "improving",
      TrendDirection::Deteriorating => "deteriorating",
      TrendDirection::Stable => "stable",
    }
  }

  /// Direction from an index delta, with a ±5 point hysteresis band
  pub fn from_delta(delta: f64) -> Self {
    if delta >= 5.0 {
      TrendDirection::Improving
    } else if delta <= -5.0 {
      TrendDirection::Deteriorating
    } else {
      TrendDirection::Stable
    }
  }
}

impl std::str::FromStr for TrendDirection {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "improving" => Ok(TrendDirection::Improving),
      "deteriorating" => Ok(TrendDirection::Deteriorating),
      "stable" => Ok(TrendDirection::Stable),
      other => Err(format!("unknown trend direction: {}", other)),
    }
  }
}

impl std::fmt::Display for TrendDirection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
