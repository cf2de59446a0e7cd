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

//! Aggregation, trend, and baseline rows
//!
//! All writes are upserts keyed by the window coordinates, so two
//! processes recomputing the same window land on the same row with the
//! same value.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Float8, Jsonb, Nullable, Timestamptz, Varchar};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::schema::{aggregations, topic_baselines, trends};

/// Per-mention inputs to one windowed aggregation
#[derive(QueryableByName, Debug, Clone)]
pub struct SentimentInput {
  #[diesel(sql_type = Float8)]
  pub sentiment_score: f64,
  #[diesel(sql_type = Float8)]
  pub influence_weight: f64,
  #[diesel(sql_type = Float8)]
  pub confidence_weight: f64,
  #[diesel(sql_type = Varchar)]
  pub sentiment_label: String,
  #[diesel(sql_type = Nullable<Jsonb>)]
  pub emotion_distribution: Option<serde_json::Value>,
}

const SENTIMENT_INPUT_COLUMNS: &str =
  "m.sentiment_score, m.influence_weight, m.confidence_weight,
   m.sentiment_label, m.emotion_distribution";

/// Analyzed mentions for a topic whose `published_at` falls in
/// `[window_start, window_end)`
pub async fn topic_sentiment_inputs(
  conn: &mut AsyncPgConnection,
  topic_key: &str,
  window_start: DateTime<Utc>,
  window_end: DateTime<Utc>,
) -> Result<Vec<SentimentInput>, diesel::result::Error> {
  diesel::sql_query(format!(
    "SELECT {SENTIMENT_INPUT_COLUMNS}
     FROM mentions m
     JOIN mention_topics mt ON mt.mention_id = m.entry_id
     WHERE mt.topic_key = $1
       AND m.sentiment_score IS NOT NULL
       AND m.published_at >= $2 AND m.published_at < $3",
  ))
  .bind::<Varchar, _>(topic_key)
  .bind::<Timestamptz, _>(window_start)
  .bind::<Timestamptz, _>(window_end)
  .load(conn)
  .await
}

/// Analyzed member mentions of an issue within the window
pub async fn issue_sentiment_inputs(
  conn: &mut AsyncPgConnection,
  issue_id: uuid::Uuid,
  window_start: DateTime<Utc>,
  window_end: DateTime<Utc>,
) -> Result<Vec<SentimentInput>, diesel::result::Error> {
  diesel::sql_query(format!(
    "SELECT {SENTIMENT_INPUT_COLUMNS}
     FROM mentions m
     JOIN issue_mentions im ON im.mention_id = m.entry_id
     WHERE im.issue_id = $1
       AND m.sentiment_score IS NOT NULL
       AND m.published_at >= $2 AND m.published_at < $3",
  ))
  .bind::<diesel::sql_types::Uuid, _>(issue_id)
  .bind::<Timestamptz, _>(window_start)
  .bind::<Timestamptz, _>(window_end)
  .load(conn)
  .await
}

/// One computed aggregation row, ready to upsert
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = aggregations)]
pub struct AggregationUpsert {
  pub subject_kind: String,
  pub subject_key: String,
  pub window_size: String,
  pub window_start: DateTime<Utc>,
  pub window_end: DateTime<Utc>,
  pub weighted_sentiment_score: f64,
  pub sentiment_index: i32,
  pub sentiment_distribution: serde_json::Value,
  pub emotion_distribution: serde_json::Value,
  pub emotion_adjusted_severity: f64,
  pub mention_count: i32,
  pub total_influence_weight: f64,
  pub computed_at: DateTime<Utc>,
}

impl AggregationUpsert {
  pub async fn upsert(&self, conn: &mut AsyncPgConnection) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(aggregations::table)
      .values(self)
      .on_conflict((
        aggregations::subject_kind,
        aggregations::subject_key,
        aggregations::window_size,
        aggregations::window_start,
      ))
      .do_update()
      .set((
        aggregations::window_end.eq(self.window_end),
        aggregations::weighted_sentiment_score.eq(self.weighted_sentiment_score),
        aggregations::sentiment_index.eq(self.sentiment_index),
        aggregations::sentiment_distribution.eq(&self.sentiment_distribution),
        aggregations::emotion_distribution.eq(&self.emotion_distribution),
        aggregations::emotion_adjusted_severity.eq(self.emotion_adjusted_severity),
        aggregations::mention_count.eq(self.mention_count),
        aggregations::total_influence_weight.eq(self.total_influence_weight),
        aggregations::computed_at.eq(self.computed_at),
      ))
      .execute(conn)
      .await
  }
}

/// Sentiment index of a specific stored window, if it was ever computed
pub async fn find_sentiment_index(
  conn: &mut AsyncPgConnection,
  subject_kind: &str,
  subject_key: &str,
  window_size: &str,
  window_start: DateTime<Utc>,
) -> Result<Option<i32>, diesel::result::Error> {
  aggregations::table
    .filter(aggregations::subject_kind.eq(subject_kind))
    .filter(aggregations::subject_key.eq(subject_key))
    .filter(aggregations::window_size.eq(window_size))
    .filter(aggregations::window_start.eq(window_start))
    .select(aggregations::sentiment_index)
    .first(conn)
    .await
    .optional()
}

/// One computed trend row, ready to upsert
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = trends)]
pub struct TrendUpsert {
  pub subject_kind: String,
  pub subject_key: String,
  pub window_size: String,
  pub window_start: DateTime<Utc>,
  pub current_index: i32,
  pub previous_index: Option<i32>,
  pub direction: String,
  pub magnitude: f64,
  pub computed_at: DateTime<Utc>,
}

impl TrendUpsert {
  pub async fn upsert(&self, conn: &mut AsyncPgConnection) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(trends::table)
      .values(self)
      .on_conflict((
        trends::subject_kind,
        trends::subject_key,
        trends::window_size,
        trends::window_start,
      ))
      .do_update()
      .set((
        trends::current_index.eq(self.current_index),
        trends::previous_index.eq(self.previous_index),
        trends::direction.eq(&self.direction),
        trends::magnitude.eq(self.magnitude),
        trends::computed_at.eq(self.computed_at),
      ))
      .execute(conn)
      .await
  }
}

/// All stored 24 h sentiment indices for a topic since `since`,
/// feeding the baseline median
pub async fn daily_indices_since(
  conn: &mut AsyncPgConnection,
  topic_key: &str,
  since: DateTime<Utc>,
) -> Result<Vec<i32>, diesel::result::Error> {
  aggregations::table
    .filter(aggregations::subject_kind.eq("topic"))
    .filter(aggregations::subject_key.eq(topic_key))
    .filter(aggregations::window_size.eq("24h"))
    .filter(aggregations::window_start.ge(since))
    .select(aggregations::sentiment_index)
    .order(aggregations::window_start.asc())
    .load(conn)
    .await
}

pub async fn upsert_baseline(
  conn: &mut AsyncPgConnection,
  topic_key_val: &str,
  baseline_index: f64,
  current_deviation: f64,
  sample_windows: i32,
) -> Result<usize, diesel::result::Error> {
  diesel::insert_into(topic_baselines::table)
    .values((
      topic_baselines::topic_key.eq(topic_key_val),
      topic_baselines::baseline_index.eq(baseline_index),
      topic_baselines::current_deviation.eq(current_deviation),
      topic_baselines::sample_windows.eq(sample_windows),
      topic_baselines::computed_at.eq(diesel::dsl::now),
    ))
    .on_conflict(topic_baselines::topic_key)
    .do_update()
    .set((
      topic_baselines::baseline_index.eq(baseline_index),
      topic_baselines::current_deviation.eq(current_deviation),
      topic_baselines::sample_windows.eq(sample_windows),
      topic_baselines::computed_at.eq(diesel::dsl::now),
    ))
    .execute(conn)
    .await
}
