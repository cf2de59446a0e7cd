/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-dot-]browne[-at-]dwightjbrowne[-dot-]com
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

//! # mp-database-postgres
//!
//! PostgreSQL persistence for the mediapulse pipeline using diesel-async.
//!
//! The database is the only coordination surface between the ingestion,
//! analysis, and aggregation loops: claims are row-level locks, dedup is
//! a unique index, and aggregation writes are upserts, so any number of
//! processes converge on the same state.

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::{establish_pool, establish_pool_with_size, DbPool};
pub use repository::{
  AggregateRepository, DatabaseContext, IngestStateRepository, IssueRepository, MentionRepository,
  RepositoryError, RepositoryResult, StoreSettingsSource, TopicRepository,
};
