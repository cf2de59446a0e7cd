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

//! # mp-models
//!
//! Canonical data shapes for the mediapulse pipeline.
//!
//! This crate provides the strongly-typed structures shared across the
//! ingestion, analysis, and aggregation crates:
//!
//! - Raw collector output ([`raw::RawRecord`]) and source descriptors
//! - The canonical mention shape ([`mention::CanonicalMention`])
//! - Classifier response contracts ([`classifier`])
//! - Topic taxonomy entries ([`topic`])
//! - Issue lifecycle and trend vocabulary ([`issue`])
//! - Time windows and aggregation subjects ([`common`])

#![warn(clippy::all)]

pub mod classifier;
pub mod common;
pub mod embedding;
pub mod issue;
pub mod mention;
pub mod raw;
pub mod text;
pub mod topic;

// Re-export common types for convenience
pub use classifier::{EmotionDistribution, EmotionResponse, IssueSummaryResponse, SentimentResponse};
pub use common::{SubjectKind, TimeWindow, WindowSize};
pub use issue::{IssueState, PriorityBand, TrendDirection};
pub use mention::{
  CanonicalMention, Engagement, EmotionLabel, ProcessingStatus, RejectReason, SentimentLabel,
};
pub use raw::{RawRecord, SourceDescriptor, SourceType};
pub use topic::{GroupOperator, KeywordGroup, TopicDefinition};
