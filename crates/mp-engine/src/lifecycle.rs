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

//! The issue lifecycle state machine
//!
//! Pure decision function: given an issue's current state and the
//! metrics gathered this tick, produce at most one transition with the
//! reason that will be written to the audit trail. Archival is not
//! decided here; it is administrative only.

use mp_models::IssueState;

/// Metrics gathered per issue per tick
#[derive(Debug, Clone, Copy)]
pub struct LifecycleMetrics {
  pub mention_count: i64,
  pub age_hours: f64,
  pub hours_since_last_member: f64,
  /// members detected in the last hour
  pub members_last_hour: i64,
  /// mentions/hour over the most recent 6 h window
  pub velocity_recent: f64,
  /// mentions/hour over the 6 h window before that
  pub velocity_prior: f64,
  /// weighted sentiment over the issue's recent mentions, in [-1, 1]
  pub weighted_sentiment_score: f64,
  pub priority_score: f64,
}

/// Tunables for the transition rules
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
  pub emerging_min_mentions: i64,
  pub emerging_min_age_hours: f64,
  pub escalate_priority: f64,
  pub escalate_sentiment: f64,
  pub escalate_members_last_hour: i64,
  pub deescalate_priority: f64,
  pub resolved_inactivity_hours: f64,
}

impl Default for LifecycleConfig {
  fn default() -> Self {
    Self {
      emerging_min_mentions: 3,
      emerging_min_age_hours: 24.0,
      escalate_priority: 80.0,
      escalate_sentiment: -0.5,
      escalate_members_last_hour: 5,
      deescalate_priority: 60.0,
      resolved_inactivity_hours: 7.0 * 24.0,
    }
  }
}

/// Evaluate one issue for this tick. Returns the transition and its
/// recorded reason, or `None` to stay put.
pub fn evaluate(
  state: IssueState,
  metrics: &LifecycleMetrics,
  config: &LifecycleConfig,
) -> Option<(IssueState, String)> {
  match state {
    IssueState::Emerging => {
      if metrics.mention_count >= config.emerging_min_mentions
        && metrics.age_hours >= config.emerging_min_age_hours
      {
        return Some((
          IssueState::Active,
          format!(
            "promoted: {} mentions over {:.0}h",
            metrics.mention_count, metrics.age_hours
          ),
        ));
      }
      None
    }
    IssueState::Active => {
      if metrics.priority_score >= config.escalate_priority {
        return Some((
          IssueState::Escalated,
          format!("priority {:.0} at or above {:.0}", metrics.priority_score, config.escalate_priority),
        ));
      }
      if metrics.weighted_sentiment_score <= config.escalate_sentiment
        && metrics.members_last_hour >= config.escalate_members_last_hour
      {
        return Some((
          IssueState::Escalated,
          format!(
            "sentiment {:.2} with {} mentions in the last hour",
            metrics.weighted_sentiment_score, metrics.members_last_hour
          ),
        ));
      }
      if metrics.velocity_recent < metrics.velocity_prior / 2.0 {
        return Some((
          IssueState::Stabilizing,
          format!(
            "velocity fell to {:.2}/h from {:.2}/h",
            metrics.velocity_recent, metrics.velocity_prior
          ),
        ));
      }
      None
    }
    IssueState::Stabilizing => {
      if metrics.hours_since_last_member >= config.resolved_inactivity_hours {
        return Some((
          IssueState::Resolved,
          format!(
            "no new mentions for {:.0}h (7-day inactivity rule)",
            metrics.hours_since_last_member
          ),
        ));
      }
      if metrics.velocity_recent > metrics.velocity_prior {
        return Some((
          IssueState::Active,
          format!(
            "velocity rebounded to {:.2}/h above {:.2}/h",
            metrics.velocity_recent, metrics.velocity_prior
          ),
        ));
      }
      None
    }
    IssueState::Escalated => {
      if metrics.priority_score < config.deescalate_priority {
        return Some((
          IssueState::Active,
          format!("priority {:.0} dropped below {:.0}", metrics.priority_score, config.deescalate_priority),
        ));
      }
      None
    }
    // resolved issues reactivate only through a centroid match;
    // archived is terminal
    IssueState::Resolved | IssueState::Archived => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn metrics() -> LifecycleMetrics {
    LifecycleMetrics {
      mention_count: 0,
      age_hours: 0.0,
      hours_since_last_member: 0.0,
      members_last_hour: 0,
      velocity_recent: 1.0,
      velocity_prior: 1.0,
      weighted_sentiment_score: 0.0,
      priority_score: 0.0,
    }
  }

  #[test]
  fn test_emerging_promotes_after_count_and_age() {
    let mut m = metrics();
    m.mention_count = 3;
    m.age_hours = 24.0;
    let (next, reason) = evaluate(IssueState::Emerging, &m, &LifecycleConfig::default()).unwrap();
    assert_eq!(next, IssueState::Active);
    assert!(reason.contains("promoted"));
  }

  #[test]
  fn test_emerging_needs_both_conditions() {
    let mut m = metrics();
    m.mention_count = 10;
    m.age_hours = 23.9;
    assert!(evaluate(IssueState::Emerging, &m, &LifecycleConfig::default()).is_none());
    m.mention_count = 2;
    m.age_hours = 48.0;
    assert!(evaluate(IssueState::Emerging, &m, &LifecycleConfig::default()).is_none());
  }

  #[test]
  fn test_active_escalates_on_priority() {
    let mut m = metrics();
    m.priority_score = 80.0;
    let (next, _) = evaluate(IssueState::Active, &m, &LifecycleConfig::default()).unwrap();
    assert_eq!(next, IssueState::Escalated);
  }

  #[test]
  fn test_active_escalates_on_negative_burst() {
    let mut m = metrics();
    m.weighted_sentiment_score = -0.5;
    m.members_last_hour = 5;
    let (next, reason) = evaluate(IssueState::Active, &m, &LifecycleConfig::default()).unwrap();
    assert_eq!(next, IssueState::Escalated);
    assert!(reason.contains("last hour"));
  }

  #[test]
  fn test_active_stabilizes_on_velocity_drop() {
    let mut m = metrics();
    m.velocity_recent = 0.9;
    m.velocity_prior = 2.0;
    let (next, _) = evaluate(IssueState::Active, &m, &LifecycleConfig::default()).unwrap();
    assert_eq!(next, IssueState::Stabilizing);
  }

  #[test]
  fn test_active_holds_at_half_velocity_boundary() {
    let mut m = metrics();
    m.velocity_recent = 1.0;
    m.velocity_prior = 2.0;
    // exactly half is not "below half"
    assert!(evaluate(IssueState::Active, &m, &LifecycleConfig::default()).is_none());
  }

  #[test]
  fn test_stabilizing_resolves_after_seven_days() {
    let mut m = metrics();
    m.velocity_recent = 0.0;
    m.velocity_prior = 0.0;
    m.hours_since_last_member = 8.0 * 24.0;
    let (next, reason) =
      evaluate(IssueState::Stabilizing, &m, &LifecycleConfig::default()).unwrap();
    assert_eq!(next, IssueState::Resolved);
    assert!(reason.contains("7-day inactivity"));
  }

  #[test]
  fn test_stabilizing_rebounds_to_active() {
    let mut m = metrics();
    m.velocity_recent = 3.0;
    m.velocity_prior = 1.0;
    let (next, _) = evaluate(IssueState::Stabilizing, &m, &LifecycleConfig::default()).unwrap();
    assert_eq!(next, IssueState::Active);
  }

  #[test]
  fn test_escalated_deescalates_below_60() {
    let mut m = metrics();
    m.priority_score = 59.9;
    let (next, _) = evaluate(IssueState::Escalated, &m, &LifecycleConfig::default()).unwrap();
    assert_eq!(next, IssueState::Active);

    m.priority_score = 60.0;
    assert!(evaluate(IssueState::Escalated, &m, &LifecycleConfig::default()).is_none());
  }

  #[test]
  fn test_terminal_states_do_nothing() {
    let m = metrics();
    assert!(evaluate(IssueState::Resolved, &m, &LifecycleConfig::default()).is_none());
    assert!(evaluate(IssueState::Archived, &m, &LifecycleConfig::default()).is_none());
  }

  #[test]
  fn test_every_emitted_transition_is_legal() {
    let config = LifecycleConfig::default();
    let mut samples = Vec::new();
    for state in [
      IssueState::Emerging,
      IssueState::Active,
      IssueState::Stabilizing,
      IssueState::Escalated,
      IssueState::Resolved,
      IssueState::Archived,
    ] {
      for (count, age, idle, last_hour, recent, prior, sentiment, priority) in [
        (3, 25.0, 0.0, 0, 1.0, 1.0, 0.0, 0.0),
        (0, 0.0, 200.0, 0, 0.0, 0.0, 0.0, 0.0),
        (10, 100.0, 0.5, 10, 0.1, 5.0, -0.9, 95.0),
        (10, 100.0, 0.5, 10, 9.0, 1.0, -0.9, 10.0),
      ] {
        let m = LifecycleMetrics {
          mention_count: count,
          age_hours: age,
          hours_since_last_member: idle,
          members_last_hour: last_hour,
          velocity_recent: recent,
          velocity_prior: prior,
          weighted_sentiment_score: sentiment,
          priority_score: priority,
        };
        if let Some((next, _)) = evaluate(state, &m, &config) {
          samples.push((state, next));
        }
      }
    }
    for (from, to) in samples {
      assert!(from.can_transition_to(to), "illegal edge {:?} -> {:?}", from, to);
    }
  }
}
