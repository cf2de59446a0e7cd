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

//! The stale-claim janitor
//!
//! Claim state lives in the rows, so a worker that died mid-analysis
//! leaves its mentions stuck in `processing`. The janitor sweeps those
//! back to `pending` once they outlive the stale-claim timeout, which
//! is the whole self-healing story: crash, restart, sweep, reprocess.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use mp_database_postgres::MentionRepository;

use crate::error::AnalysisResult;

pub struct Janitor {
  mentions: Arc<dyn MentionRepository>,
  stale_claim_secs: i64,
}

impl Janitor {
  pub fn new(mentions: Arc<dyn MentionRepository>, stale_claim_secs: i64) -> Self {
    Self { mentions, stale_claim_secs }
  }

  /// Sweep loop at half the stale timeout, so a stale claim waits at
  /// most 1.5 timeouts before re-eligibility
  pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
    let interval = Duration::from_secs((self.stale_claim_secs as u64 / 2).max(1));
    info!("janitor starting, sweep every {:?}", interval);

    loop {
      if *shutdown.borrow() {
        break;
      }

      match self.sweep().await {
        Ok(0) => {}
        Ok(reset) => info!("janitor reset {} stale claims", reset),
        Err(e) => warn!("janitor sweep failed: {}", e),
      }

      tokio::select! {
        _ = tokio::time::sleep(interval) => {}
        _ = shutdown.changed() => {}
      }
    }

    info!("janitor stopped");
  }

  /// One sweep: every `processing` row older than the timeout goes back
  /// to `pending`
  pub async fn sweep(&self) -> AnalysisResult<usize> {
    Ok(self.mentions.reset_stale_claims(self.stale_claim_secs).await?)
  }
}
