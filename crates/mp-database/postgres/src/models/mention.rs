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

//! Mention row model: the central entity of the pipeline
//!
//! Rows move through `pending -> processing -> completed | failed`.
//! The claim query takes row-level locks with skip-locked semantics so
//! competing dispatchers never hand the same row to two workers.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Int8, Nullable, Text, Timestamptz, Varchar};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::Serialize;

use mp_models::{CanonicalMention, Engagement};

use crate::schema::{issue_mentions, mention_embeddings, mention_topics, mentions};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = mentions)]
#[diesel(primary_key(entry_id))]
pub struct Mention {
  pub entry_id: i64,
  pub source_id: Option<String>,
  pub url: Option<String>,
  pub platform: String,
  pub source_type: String,
  pub source_name: String,
  pub search_query: Option<String>,
  pub collected_at: DateTime<Utc>,
  pub published_at: DateTime<Utc>,
  pub language: Option<String>,
  pub country: Option<String>,
  pub title: Option<String>,
  pub content: String,
  pub author_handle: Option<String>,
  pub author_name: Option<String>,
  pub author_avatar: Option<String>,
  pub author_location: Option<String>,
  pub author_verified: bool,
  pub likes: i64,
  pub shares: i64,
  pub comments: i64,
  pub direct_reach: i64,
  pub cumulative_reach: i64,
  pub fingerprint: Vec<u8>,
  pub sentiment_label: Option<String>,
  pub sentiment_score: Option<f64>,
  pub sentiment_justification: Option<String>,
  pub emotion_label: Option<String>,
  pub emotion_score: Option<f64>,
  pub emotion_distribution: Option<serde_json::Value>,
  pub influence_weight: Option<f64>,
  pub confidence_weight: Option<f64>,
  pub location_label: Option<String>,
  pub location_confidence: Option<f64>,
  pub ministry_hint: Option<String>,
  pub issue_slug: Option<String>,
  pub issue_label: Option<String>,
  pub issue_confidence: Option<f64>,
  pub processing_status: String,
  pub failure_reason: Option<String>,
  pub processing_started_at: Option<DateTime<Utc>>,
  pub processing_completed_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = mentions)]
pub struct NewMention {
  pub source_id: Option<String>,
  pub url: Option<String>,
  pub platform: String,
  pub source_type: String,
  pub source_name: String,
  pub search_query: Option<String>,
  pub collected_at: DateTime<Utc>,
  pub published_at: DateTime<Utc>,
  pub language: Option<String>,
  pub country: Option<String>,
  pub title: Option<String>,
  pub content: String,
  pub author_handle: Option<String>,
  pub author_name: Option<String>,
  pub author_avatar: Option<String>,
  pub author_location: Option<String>,
  pub author_verified: bool,
  pub likes: i64,
  pub shares: i64,
  pub comments: i64,
  pub direct_reach: i64,
  pub cumulative_reach: i64,
  pub fingerprint: Vec<u8>,
  pub processing_status: String,
}

impl NewMention {
  /// Build an insertable row from a canonical mention. Analysis fields
  /// start NULL; the row is born `pending`.
  pub fn from_canonical(mention: &CanonicalMention, fingerprint: Vec<u8>) -> Self {
    Self {
      source_id: mention.source_id.clone(),
      url: mention.url.clone(),
      platform: mention.platform.clone(),
      source_type: mention.source_type.as_str().to_string(),
      source_name: mention.source_name.clone(),
      search_query: mention.query.clone(),
      collected_at: mention.collected_at,
      published_at: mention.published_at,
      language: mention.language.clone(),
      country: mention.country.clone(),
      title: mention.title.clone(),
      content: mention.text.clone(),
      author_handle: mention.author_handle.clone(),
      author_name: mention.author_name.clone(),
      author_avatar: mention.author_avatar.clone(),
      author_location: mention.author_location.clone(),
      author_verified: mention.author_verified,
      likes: mention.engagement.likes,
      shares: mention.engagement.shares,
      comments: mention.engagement.comments,
      direct_reach: mention.engagement.direct_reach,
      cumulative_reach: mention.engagement.cumulative_reach,
      fingerprint,
      processing_status: "pending".to_string(),
    }
  }
}

/// The slice of a mention an analysis worker needs, returned by the
/// skip-locked claim query
#[derive(QueryableByName, Debug, Clone)]
pub struct ClaimedMention {
  #[diesel(sql_type = Int8)]
  pub entry_id: i64,
  #[diesel(sql_type = Text)]
  pub content: String,
  #[diesel(sql_type = Nullable<Text>)]
  pub title: Option<String>,
  #[diesel(sql_type = Varchar)]
  pub platform: String,
  #[diesel(sql_type = Varchar)]
  pub source_type: String,
  #[diesel(sql_type = Bool)]
  pub author_verified: bool,
  #[diesel(sql_type = Int8)]
  pub direct_reach: i64,
  #[diesel(sql_type = Int8)]
  pub cumulative_reach: i64,
  #[diesel(sql_type = Timestamptz)]
  pub published_at: DateTime<Utc>,
}

/// Per-topic scores written alongside an analysis commit
#[derive(Debug, Clone)]
pub struct TopicScoreRow {
  pub topic_key: String,
  pub keyword_score: f64,
  pub embedding_score: f64,
  pub topic_confidence: f64,
}

/// Issue linkage written alongside an analysis commit
#[derive(Debug, Clone)]
pub struct IssueLinkRow {
  pub issue_id: uuid::Uuid,
  pub similarity_score: f64,
}

/// Everything one worker writes for one mention, committed atomically
#[derive(Debug, Clone)]
pub struct AnalysisCommit {
  pub sentiment_label: String,
  pub sentiment_score: f64,
  pub sentiment_justification: String,
  pub emotion_label: String,
  pub emotion_score: f64,
  pub emotion_distribution: serde_json::Value,
  pub influence_weight: f64,
  pub confidence_weight: f64,
  pub location_label: Option<String>,
  pub location_confidence: Option<f64>,
  pub ministry_hint: Option<String>,
  pub issue_slug: Option<String>,
  pub issue_label: Option<String>,
  pub issue_confidence: Option<f64>,
  pub embedding: Vec<f32>,
  pub embedding_model: String,
  pub topics: Vec<TopicScoreRow>,
  pub issue_links: Vec<IssueLinkRow>,
}

impl Mention {
  pub async fn find_id_by_platform_source_id(
    conn: &mut AsyncPgConnection,
    platform_val: &str,
    source_id_val: &str,
  ) -> Result<Option<i64>, diesel::result::Error> {
    mentions::table
      .filter(mentions::platform.eq(platform_val))
      .filter(mentions::source_id.eq(source_id_val))
      .select(mentions::entry_id)
      .first(conn)
      .await
      .optional()
  }

  pub async fn find_id_by_url(
    conn: &mut AsyncPgConnection,
    platform_val: &str,
    url_val: &str,
  ) -> Result<Option<i64>, diesel::result::Error> {
    mentions::table
      .filter(mentions::platform.eq(platform_val))
      .filter(mentions::url.eq(url_val))
      .select(mentions::entry_id)
      .first(conn)
      .await
      .optional()
  }

  pub async fn find_id_by_fingerprint(
    conn: &mut AsyncPgConnection,
    fingerprint_val: &[u8],
  ) -> Result<Option<i64>, diesel::result::Error> {
    mentions::table
      .filter(mentions::fingerprint.eq(fingerprint_val))
      .select(mentions::entry_id)
      .first(conn)
      .await
      .optional()
  }

  /// Candidate rows for the near-duplicate scan: same platform,
  /// collected within the dedup window
  pub async fn recent_texts_for_platform(
    conn: &mut AsyncPgConnection,
    platform_val: &str,
    since: DateTime<Utc>,
  ) -> Result<Vec<(i64, String)>, diesel::result::Error> {
    mentions::table
      .filter(mentions::platform.eq(platform_val))
      .filter(mentions::collected_at.ge(since))
      .select((mentions::entry_id, mentions::content))
      .load(conn)
      .await
  }

  /// Merge freshly-reported engagement into an existing row. The source
  /// is trusted: last reported value wins, even when lower.
  pub async fn update_engagement(
    conn: &mut AsyncPgConnection,
    entry_id_val: i64,
    engagement: &Engagement,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(mentions::table.filter(mentions::entry_id.eq(entry_id_val)))
      .set((
        mentions::likes.eq(engagement.likes),
        mentions::shares.eq(engagement.shares),
        mentions::comments.eq(engagement.comments),
        mentions::direct_reach.eq(engagement.direct_reach),
        mentions::cumulative_reach.eq(engagement.cumulative_reach),
        mentions::updated_at.eq(diesel::dsl::now),
      ))
      .execute(conn)
      .await
  }

  pub async fn insert(
    conn: &mut AsyncPgConnection,
    new_mention: &NewMention,
  ) -> Result<i64, diesel::result::Error> {
    diesel::insert_into(mentions::table)
      .values(new_mention)
      .returning(mentions::entry_id)
      .get_result(conn)
      .await
  }

  /// Claim up to `batch_size` unanalyzed rows for this dispatcher.
  ///
  /// The inner select takes row locks with SKIP LOCKED so concurrent
  /// dispatchers partition the backlog instead of colliding; the flip to
  /// `processing` and the lock release commit together.
  pub async fn claim_batch(
    conn: &mut AsyncPgConnection,
    batch_size: i64,
  ) -> Result<Vec<ClaimedMention>, diesel::result::Error> {
    diesel::sql_query(
      "UPDATE mentions SET
         processing_status = 'processing',
         processing_started_at = NOW(),
         updated_at = NOW()
       WHERE entry_id IN (
         SELECT entry_id FROM mentions
         WHERE sentiment_label IS NULL
           AND processing_status = 'pending'
         ORDER BY entry_id
         LIMIT $1
         FOR UPDATE SKIP LOCKED
       )
       RETURNING entry_id, content, title, platform, source_type,
                 author_verified, direct_reach, cumulative_reach, published_at",
    )
    .bind::<BigInt, _>(batch_size)
    .load(conn)
    .await
  }

  /// Commit one mention's full analysis in a single transaction:
  /// mention fields, embedding row, topic associations, issue links,
  /// and the flip to `completed`.
  pub async fn commit_analysis(
    conn: &mut AsyncPgConnection,
    entry_id_val: i64,
    commit: &AnalysisCommit,
  ) -> Result<(), diesel::result::Error> {
    let commit = commit.clone();
    conn
      .transaction::<_, diesel::result::Error, _>(|conn| {
        async move {
          diesel::update(mentions::table.filter(mentions::entry_id.eq(entry_id_val)))
            .set((
              mentions::sentiment_label.eq(&commit.sentiment_label),
              mentions::sentiment_score.eq(commit.sentiment_score),
              mentions::sentiment_justification.eq(&commit.sentiment_justification),
              mentions::emotion_label.eq(&commit.emotion_label),
              mentions::emotion_score.eq(commit.emotion_score),
              mentions::emotion_distribution.eq(&commit.emotion_distribution),
              mentions::influence_weight.eq(commit.influence_weight),
              mentions::confidence_weight.eq(commit.confidence_weight),
              mentions::location_label.eq(commit.location_label.as_deref()),
              mentions::location_confidence.eq(commit.location_confidence),
              mentions::ministry_hint.eq(commit.ministry_hint.as_deref()),
              mentions::issue_slug.eq(commit.issue_slug.as_deref()),
              mentions::issue_label.eq(commit.issue_label.as_deref()),
              mentions::issue_confidence.eq(commit.issue_confidence),
              mentions::processing_status.eq("completed"),
              mentions::failure_reason.eq(None::<String>),
              mentions::processing_completed_at.eq(diesel::dsl::now),
              mentions::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await?;

          diesel::insert_into(mention_embeddings::table)
            .values((
              mention_embeddings::entry_id.eq(entry_id_val),
              mention_embeddings::vector.eq(&commit.embedding),
              mention_embeddings::model.eq(&commit.embedding_model),
            ))
            .on_conflict(mention_embeddings::entry_id)
            .do_update()
            .set((
              mention_embeddings::vector.eq(&commit.embedding),
              mention_embeddings::model.eq(&commit.embedding_model),
            ))
            .execute(conn)
            .await?;

          for topic in &commit.topics {
            diesel::insert_into(mention_topics::table)
              .values((
                mention_topics::mention_id.eq(entry_id_val),
                mention_topics::topic_key.eq(&topic.topic_key),
                mention_topics::keyword_score.eq(topic.keyword_score),
                mention_topics::embedding_score.eq(topic.embedding_score),
                mention_topics::topic_confidence.eq(topic.topic_confidence),
              ))
              .on_conflict((mention_topics::mention_id, mention_topics::topic_key))
              .do_update()
              .set((
                mention_topics::keyword_score.eq(topic.keyword_score),
                mention_topics::embedding_score.eq(topic.embedding_score),
                mention_topics::topic_confidence.eq(topic.topic_confidence),
              ))
              .execute(conn)
              .await?;
          }

          for link in &commit.issue_links {
            diesel::insert_into(issue_mentions::table)
              .values((
                issue_mentions::issue_id.eq(link.issue_id),
                issue_mentions::mention_id.eq(entry_id_val),
                issue_mentions::similarity_score.eq(link.similarity_score),
                issue_mentions::detected_at.eq(diesel::dsl::now),
              ))
              .on_conflict((issue_mentions::issue_id, issue_mentions::mention_id))
              .do_nothing()
              .execute(conn)
              .await?;
          }

          Ok(())
        }
        .scope_boxed()
      })
      .await
  }

  /// Mark a mention failed with the phase that broke. Analysis fields
  /// stay NULL so a later reset can retry from scratch.
  pub async fn mark_failed(
    conn: &mut AsyncPgConnection,
    entry_id_val: i64,
    reason: &str,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(mentions::table.filter(mentions::entry_id.eq(entry_id_val)))
      .set((
        mentions::processing_status.eq("failed"),
        mentions::failure_reason.eq(reason),
        mentions::processing_completed_at.eq(diesel::dsl::now),
        mentions::updated_at.eq(diesel::dsl::now),
      ))
      .execute(conn)
      .await
  }

  /// Janitor sweep: rows stuck in `processing` past the stale-claim
  /// timeout go back to `pending` for re-claim.
  pub async fn reset_stale_claims(
    conn: &mut AsyncPgConnection,
    older_than_secs: i64,
  ) -> Result<usize, diesel::result::Error> {
    diesel::sql_query(
      "UPDATE mentions SET
         processing_status = 'pending',
         processing_started_at = NULL,
         updated_at = NOW()
       WHERE processing_status = 'processing'
         AND processing_started_at < NOW() - ($1 * INTERVAL '1 second')",
    )
    .bind::<BigInt, _>(older_than_secs)
    .execute(conn)
    .await
  }

  pub async fn count_by_status(
    conn: &mut AsyncPgConnection,
    status: &str,
  ) -> Result<i64, diesel::result::Error> {
    mentions::table
      .filter(mentions::processing_status.eq(status))
      .count()
      .get_result(conn)
      .await
  }
}
