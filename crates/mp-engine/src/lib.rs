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

//! # mp-engine
//!
//! The issue detection and aggregation engine for the mediapulse
//! pipeline.
//!
//! On a slow cadence the engine clusters recently analyzed mentions
//! into emergent issues, walks every issue's lifecycle state machine
//! and priority, recomputes windowed sentiment aggregations with
//! period-over-period trends, and refreshes topic baselines.

pub mod aggregation;
pub mod baseline;
pub mod clustering;
pub mod engine;
pub mod error;
pub mod issues;
pub mod lifecycle;
pub mod priority;

pub use aggregation::{aggregate, AggregationOutcome};
pub use clustering::{cluster_candidates, Cluster};
pub use engine::{Engine, EngineConfig};
pub use error::{EngineError, EngineResult};
pub use issues::{
  fallback_label, generate_slug, ClassifierLabeler, ClusterLabeler, DetectionConfig,
  DetectionSummary, IssueDetector,
};
pub use lifecycle::{evaluate, LifecycleConfig, LifecycleMetrics};
pub use priority::{priority_band, priority_score, PriorityInputs, PriorityWeights};

#[cfg(test)]
pub(crate) mod testing;
