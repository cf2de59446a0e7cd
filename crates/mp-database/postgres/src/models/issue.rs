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

//! Issue rows, memberships, and the transition audit trail
//!
//! The issue's stable identity is `issue_id` plus its centroid
//! embedding; slugs are cosmetic. Issue statistics are recomputed from
//! `issue_mentions` so the junction table stays the single source of
//! truth for membership.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Array, Float4, Int8, Text, Timestamptz, Varchar};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{issue_mentions, issue_transitions, topic_issues};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = topic_issues)]
#[diesel(primary_key(issue_id))]
pub struct Issue {
  pub issue_id: Uuid,
  pub topic_key: String,
  pub issue_slug: String,
  pub issue_label: String,
  pub state: String,
  pub priority_score: f64,
  pub priority_band: String,
  pub mention_count: i32,
  pub centroid: Vec<f32>,
  pub started_at: DateTime<Utc>,
  pub last_activity_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = topic_issues)]
pub struct NewIssue {
  pub issue_id: Uuid,
  pub topic_key: String,
  pub issue_slug: String,
  pub issue_label: String,
  pub state: String,
  pub priority_score: f64,
  pub priority_band: String,
  pub mention_count: i32,
  pub centroid: Vec<f32>,
  pub started_at: DateTime<Utc>,
  pub last_activity_at: DateTime<Utc>,
}

/// Analyzed mention not yet attached to an issue under a topic, with
/// the embedding the clustering pass works on
#[derive(QueryableByName, Debug, Clone)]
pub struct CandidateMention {
  #[diesel(sql_type = Int8)]
  pub entry_id: i64,
  #[diesel(sql_type = Array<Float4>)]
  pub vector: Vec<f32>,
  #[diesel(sql_type = Text)]
  pub content: String,
  #[diesel(sql_type = Timestamptz)]
  pub published_at: DateTime<Utc>,
}

impl Issue {
  /// Mentions analyzed within the window and not yet linked to any
  /// issue of this topic. These are the clustering inputs.
  pub async fn unissued_candidates(
    conn: &mut AsyncPgConnection,
    topic_key_val: &str,
    since: DateTime<Utc>,
  ) -> Result<Vec<CandidateMention>, diesel::result::Error> {
    diesel::sql_query(
      "SELECT m.entry_id, e.vector, m.content, m.published_at
       FROM mentions m
       JOIN mention_topics mt ON mt.mention_id = m.entry_id
       JOIN mention_embeddings e ON e.entry_id = m.entry_id
       WHERE mt.topic_key = $1
         AND m.processing_status = 'completed'
         AND m.published_at >= $2
         AND NOT EXISTS (
           SELECT 1 FROM issue_mentions im
           JOIN topic_issues ti ON ti.issue_id = im.issue_id
           WHERE im.mention_id = m.entry_id AND ti.topic_key = $1
         )
       ORDER BY m.published_at ASC",
    )
    .bind::<Varchar, _>(topic_key_val)
    .bind::<Timestamptz, _>(since)
    .load(conn)
    .await
  }

  /// Issues whose centroid may still absorb new clusters (everything
  /// but archived)
  pub async fn matchable_by_topic(
    conn: &mut AsyncPgConnection,
    topic_key_val: &str,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    topic_issues::table
      .filter(topic_issues::topic_key.eq(topic_key_val))
      .filter(topic_issues::state.ne("archived"))
      .load(conn)
      .await
  }

  pub async fn load_non_archived(
    conn: &mut AsyncPgConnection,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    topic_issues::table.filter(topic_issues::state.ne("archived")).load(conn).await
  }

  pub async fn create(
    conn: &mut AsyncPgConnection,
    new_issue: &NewIssue,
  ) -> Result<Uuid, diesel::result::Error> {
    diesel::insert_into(topic_issues::table)
      .values(new_issue)
      .returning(topic_issues::issue_id)
      .get_result(conn)
      .await
  }

  /// Attach cluster members and refresh the issue's mention count from
  /// the junction table in one transaction. Returns the refreshed count.
  pub async fn attach_mentions(
    conn: &mut AsyncPgConnection,
    issue_id_val: Uuid,
    members: &[(i64, f64)],
    detected_at_val: DateTime<Utc>,
  ) -> Result<i32, diesel::result::Error> {
    let members = members.to_vec();
    conn
      .transaction::<_, diesel::result::Error, _>(|conn| {
        async move {
          for (mention_id_val, similarity) in &members {
            diesel::insert_into(issue_mentions::table)
              .values((
                issue_mentions::issue_id.eq(issue_id_val),
                issue_mentions::mention_id.eq(mention_id_val),
                issue_mentions::similarity_score.eq(similarity),
                issue_mentions::detected_at.eq(detected_at_val),
              ))
              .on_conflict((issue_mentions::issue_id, issue_mentions::mention_id))
              .do_nothing()
              .execute(conn)
              .await?;
          }

          let count: i64 = issue_mentions::table
            .filter(issue_mentions::issue_id.eq(issue_id_val))
            .count()
            .get_result(conn)
            .await?;

          diesel::update(topic_issues::table.filter(topic_issues::issue_id.eq(issue_id_val)))
            .set((
              topic_issues::mention_count.eq(count as i32),
              topic_issues::last_activity_at.eq(detected_at_val),
              topic_issues::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await?;

          Ok(count as i32)
        }
        .scope_boxed()
      })
      .await
  }

  pub async fn update_centroid(
    conn: &mut AsyncPgConnection,
    issue_id_val: Uuid,
    centroid_val: &[f32],
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(topic_issues::table.filter(topic_issues::issue_id.eq(issue_id_val)))
      .set((
        topic_issues::centroid.eq(centroid_val),
        topic_issues::updated_at.eq(diesel::dsl::now),
      ))
      .execute(conn)
      .await
  }

  /// Apply a lifecycle transition and append it to the audit trail
  /// atomically. Legality is the engine's responsibility; this only
  /// records what was decided.
  pub async fn record_transition(
    conn: &mut AsyncPgConnection,
    issue_id_val: Uuid,
    from_state: &str,
    to_state: &str,
    reason: &str,
  ) -> Result<(), diesel::result::Error> {
    let from_state = from_state.to_string();
    let to_state = to_state.to_string();
    let reason = reason.to_string();
    conn
      .transaction::<_, diesel::result::Error, _>(|conn| {
        async move {
          diesel::update(topic_issues::table.filter(topic_issues::issue_id.eq(issue_id_val)))
            .set((
              topic_issues::state.eq(&to_state),
              topic_issues::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await?;

          diesel::insert_into(issue_transitions::table)
            .values((
              issue_transitions::issue_id.eq(issue_id_val),
              issue_transitions::from_state.eq(&from_state),
              issue_transitions::to_state.eq(&to_state),
              issue_transitions::reason.eq(&reason),
            ))
            .execute(conn)
            .await?;

          Ok(())
        }
        .scope_boxed()
      })
      .await
  }

  pub async fn update_priority(
    conn: &mut AsyncPgConnection,
    issue_id_val: Uuid,
    score: f64,
    band: &str,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(topic_issues::table.filter(topic_issues::issue_id.eq(issue_id_val)))
      .set((
        topic_issues::priority_score.eq(score),
        topic_issues::priority_band.eq(band),
        topic_issues::updated_at.eq(diesel::dsl::now),
      ))
      .execute(conn)
      .await
  }

  /// Members detected inside `[from, to)`, used for velocity windows
  pub async fn mention_count_between(
    conn: &mut AsyncPgConnection,
    issue_id_val: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
  ) -> Result<i64, diesel::result::Error> {
    issue_mentions::table
      .filter(issue_mentions::issue_id.eq(issue_id_val))
      .filter(issue_mentions::detected_at.ge(from))
      .filter(issue_mentions::detected_at.lt(to))
      .count()
      .get_result(conn)
      .await
  }

  pub async fn last_mention_detected_at(
    conn: &mut AsyncPgConnection,
    issue_id_val: Uuid,
  ) -> Result<Option<DateTime<Utc>>, diesel::result::Error> {
    issue_mentions::table
      .filter(issue_mentions::issue_id.eq(issue_id_val))
      .select(diesel::dsl::max(issue_mentions::detected_at))
      .first(conn)
      .await
  }
}
