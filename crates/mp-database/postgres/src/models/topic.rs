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

//! Topic taxonomy rows
//!
//! Topics are administered outside the pipeline; the analysis and issue
//! layers only read them. Keyword lists and groups live in JSONB columns
//! and deserialize into the shared [`TopicDefinition`] shape.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;

use mp_models::{KeywordGroup, TopicDefinition};

use crate::schema::topics;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = topics)]
#[diesel(primary_key(topic_key))]
pub struct TopicRow {
  pub topic_key: String,
  pub display_name: String,
  pub category: Option<String>,
  pub keywords: serde_json::Value,
  pub keyword_groups: serde_json::Value,
  pub centroid: Option<Vec<f32>>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TopicRow {
  pub async fn load_active(
    conn: &mut AsyncPgConnection,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    topics::table.filter(topics::is_active.eq(true)).order(topics::topic_key.asc()).load(conn).await
  }

  pub async fn active_keys(
    conn: &mut AsyncPgConnection,
  ) -> Result<Vec<String>, diesel::result::Error> {
    topics::table
      .filter(topics::is_active.eq(true))
      .select(topics::topic_key)
      .order(topics::topic_key.asc())
      .load(conn)
      .await
  }

  /// Decode the JSONB columns into the shared taxonomy shape. Malformed
  /// JSON in either column yields an empty list rather than a hard
  /// failure; a topic with no usable keywords simply scores zero.
  pub fn to_definition(&self) -> TopicDefinition {
    let keywords: Vec<String> = serde_json::from_value(self.keywords.clone()).unwrap_or_default();
    let keyword_groups: Vec<KeywordGroup> =
      serde_json::from_value(self.keyword_groups.clone()).unwrap_or_default();

    TopicDefinition {
      topic_key: self.topic_key.clone(),
      display_name: self.display_name.clone(),
      category: self.category.clone(),
      keywords,
      keyword_groups,
      centroid: self.centroid.clone(),
      is_active: self.is_active,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn row(keywords: serde_json::Value, groups: serde_json::Value) -> TopicRow {
    TopicRow {
      topic_key: "fuel".to_string(),
      display_name: "Fuel".to_string(),
      category: Some("energy".to_string()),
      keywords,
      keyword_groups: groups,
      centroid: None,
      is_active: true,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn test_to_definition_parses_groups() {
    let row = row(
      json!(["petrol", "diesel"]),
      json!([{"operator": "and", "keywords": ["fuel", "shortage"]}]),
    );
    let definition = row.to_definition();
    assert_eq!(definition.keywords.len(), 2);
    assert_eq!(definition.keyword_groups.len(), 1);
    assert_eq!(definition.keyword_groups[0].keywords[1], "shortage");
  }

  #[test]
  fn test_to_definition_tolerates_malformed_json() {
    let row = row(json!("not-a-list"), json!(42));
    let definition = row.to_definition();
    assert!(definition.keywords.is_empty());
    assert!(definition.keyword_groups.is_empty());
  }
}
