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

//! # mp-analysis
//!
//! The analysis worker pool for the mediapulse pipeline.
//!
//! One cooperative dispatcher claims unanalyzed mention rows under
//! skip-locked row locks and feeds a bounded pool of workers. Each
//! worker runs the classification phases for one mention and commits
//! the result atomically. A janitor returns stale claims to
//! eligibility, which makes the whole subsystem self-healing across
//! crashes.

pub mod dispatcher;
pub mod error;
pub mod janitor;
pub mod phases;
pub mod worker;

pub use dispatcher::{AnalysisStats, Dispatcher};
pub use error::{AnalysisError, AnalysisResult};
pub use janitor::Janitor;
pub use phases::location::{LocationClassifier, LocationRule};
pub use phases::topics::{TopicScore, TopicThresholds};
pub use phases::weights::ReachQuantiles;
pub use worker::{AnalysisConfig, Worker};

#[cfg(test)]
pub(crate) mod testing;
