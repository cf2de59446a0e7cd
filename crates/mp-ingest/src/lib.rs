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

//! # mp-ingest
//!
//! Ingestion layer for the mediapulse pipeline.
//!
//! This crate owns the path from raw collector output to deduplicated
//! mention rows:
//! - Record normalization and content fingerprinting
//! - The dataset tailer that streams long-lived external datasets
//! - The interval scheduler driving pull collectors
//! - The dedup writer deciding insert vs merge
//!
//! Per-platform collector adapters live outside the core; they plug in
//! through the [`Collector`] and [`DatasetStream`] traits.

pub mod collector;
pub mod dedup;
pub mod error;
pub mod normalizer;
pub mod scheduler;
pub mod tailer;

pub use collector::{degraded_window, incremental_window, Collector, DatasetStream};
pub use dedup::{is_duplicate_text, DedupConfig, DedupWriter, IngestOutcome, IngestStats};
pub use error::{IngestError, IngestResult};
pub use normalizer::{fingerprint, normalize_text, parse_timestamp, Normalizer, NormalizerConfig};
pub use scheduler::{IntervalScheduler, SchedulerConfig};
pub use tailer::DatasetTailer;

#[cfg(test)]
pub(crate) mod testing;
