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

//! Ingestion bookkeeping rows: tailer cursors, collector run state, and
//! store-backed config overrides

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;

use crate::schema::{collector_runs, config_overrides, ingest_cursors};

/// Persisted per-dataset tailer cursor. Updated only after successful
/// downstream hand-off, so a crash replays the boundary and the dedup
/// writer absorbs the duplicates.
pub struct IngestCursor;

impl IngestCursor {
  pub async fn get(
    conn: &mut AsyncPgConnection,
    dataset_key_val: &str,
  ) -> Result<Option<i64>, diesel::result::Error> {
    ingest_cursors::table
      .filter(ingest_cursors::dataset_key.eq(dataset_key_val))
      .select(ingest_cursors::cursor_value)
      .first(conn)
      .await
      .optional()
  }

  pub async fn store(
    conn: &mut AsyncPgConnection,
    dataset_key_val: &str,
    cursor_value_val: i64,
  ) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(ingest_cursors::table)
      .values((
        ingest_cursors::dataset_key.eq(dataset_key_val),
        ingest_cursors::cursor_value.eq(cursor_value_val),
        ingest_cursors::updated_at.eq(diesel::dsl::now),
      ))
      .on_conflict(ingest_cursors::dataset_key)
      .do_update()
      .set((
        ingest_cursors::cursor_value.eq(cursor_value_val),
        ingest_cursors::updated_at.eq(diesel::dsl::now),
      ))
      .execute(conn)
      .await
  }
}

/// Per-collector run bookkeeping backing the incremental window policy
/// and the degraded flag
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = collector_runs)]
pub struct CollectorRun {
  pub source_key: String,
  pub last_success_at: Option<DateTime<Utc>>,
  pub consecutive_failures: i32,
  pub degraded: bool,
  pub updated_at: DateTime<Utc>,
}

impl CollectorRun {
  pub async fn get(
    conn: &mut AsyncPgConnection,
    source_key_val: &str,
  ) -> Result<Option<Self>, diesel::result::Error> {
    collector_runs::table
      .filter(collector_runs::source_key.eq(source_key_val))
      .first(conn)
      .await
      .optional()
  }

  /// A successful run clears the failure streak and the degraded flag
  pub async fn record_success(
    conn: &mut AsyncPgConnection,
    source_key_val: &str,
    at: DateTime<Utc>,
  ) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(collector_runs::table)
      .values((
        collector_runs::source_key.eq(source_key_val),
        collector_runs::last_success_at.eq(at),
        collector_runs::consecutive_failures.eq(0),
        collector_runs::degraded.eq(false),
        collector_runs::updated_at.eq(diesel::dsl::now),
      ))
      .on_conflict(collector_runs::source_key)
      .do_update()
      .set((
        collector_runs::last_success_at.eq(at),
        collector_runs::consecutive_failures.eq(0),
        collector_runs::degraded.eq(false),
        collector_runs::updated_at.eq(diesel::dsl::now),
      ))
      .execute(conn)
      .await
  }

  /// Increment the failure streak; the source turns degraded once the
  /// streak reaches `failure_limit`. Returns the new degraded flag.
  pub async fn record_failure(
    conn: &mut AsyncPgConnection,
    source_key_val: &str,
    failure_limit: i32,
  ) -> Result<bool, diesel::result::Error> {
    let current = Self::get(conn, source_key_val).await?;
    let failures = current.map(|r| r.consecutive_failures).unwrap_or(0) + 1;
    let degraded = failures >= failure_limit;

    diesel::insert_into(collector_runs::table)
      .values((
        collector_runs::source_key.eq(source_key_val),
        collector_runs::consecutive_failures.eq(failures),
        collector_runs::degraded.eq(degraded),
        collector_runs::updated_at.eq(diesel::dsl::now),
      ))
      .on_conflict(collector_runs::source_key)
      .do_update()
      .set((
        collector_runs::consecutive_failures.eq(failures),
        collector_runs::degraded.eq(degraded),
        collector_runs::updated_at.eq(diesel::dsl::now),
      ))
      .execute(conn)
      .await?;

    Ok(degraded)
  }
}

/// Store-backed settings layer: the whole table, ready for the cached
/// settings source
pub async fn load_config_overrides(
  conn: &mut AsyncPgConnection,
) -> Result<HashMap<String, String>, diesel::result::Error> {
  let rows: Vec<(String, String)> = config_overrides::table
    .select((config_overrides::config_key, config_overrides::config_value))
    .load(conn)
    .await?;
  Ok(rows.into_iter().collect())
}
