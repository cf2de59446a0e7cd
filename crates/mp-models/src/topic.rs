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

//! Topic taxonomy shapes shared by the database and analysis layers

use serde::{Deserialize, Serialize};

/// How a keyword group's members combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
  /// All keywords must be present
  And,
  /// Any keyword suffices
  Or,
}

/// A group of keywords with AND/OR semantics.
/// Group score is binary; the topic keyword score is the mean over groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGroup {
  pub operator: GroupOperator,
  pub keywords: Vec<String>,
}

/// One taxonomy entry. Mutated only by administrative action; the
/// pipeline treats these as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicDefinition {
  /// Stable identifier, e.g. "fuel", "health"
  pub topic_key: String,

  pub display_name: String,

  pub category: Option<String>,

  /// Flat keyword list (legacy sources without groups)
  pub keywords: Vec<String>,

  /// Grouped keywords with AND/OR semantics
  pub keyword_groups: Vec<KeywordGroup>,

  /// Precomputed centroid embedding for this topic
  pub centroid: Option<Vec<f32>>,

  pub is_active: bool,
}

impl TopicDefinition {
  /// Groups used for scoring. A topic configured with only a flat
  /// keyword list behaves as a single OR group.
  pub fn scoring_groups(&self) -> Vec<KeywordGroup> {
    if !self.keyword_groups.is_empty() {
      return self.keyword_groups.clone();
    }
    if self.keywords.is_empty() {
      return Vec::new();
    }
    vec![KeywordGroup { operator: GroupOperator::Or, keywords: self.keywords.clone() }]
  }
}
