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

//! Per-model token budgets
//!
//! The classifier enforces tokens-per-minute limits per model. Every call
//! reserves its estimated token cost against a keyed bucket before going
//! on the wire; an empty bucket makes the caller sleep in one-second
//! steps until capacity frees up. Buckets are advisory in-process state,
//! not durable.

use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Bank of token buckets keyed by model identifier
pub struct TokenBank {
  limiter: KeyedLimiter,
  tokens_per_minute: u32,
}

impl TokenBank {
  pub fn new(tokens_per_minute: u32) -> Self {
    let per_minute = NonZeroU32::new(tokens_per_minute.max(1))
      .unwrap_or(NonZeroU32::MIN);
    let quota = Quota::per_minute(per_minute).allow_burst(per_minute);
    Self { limiter: RateLimiter::keyed(quota), tokens_per_minute }
  }

  /// Reserve `estimated_tokens` against the model's bucket, sleeping in
  /// 1 s increments while the bucket is empty. A request larger than the
  /// whole budget is clamped so it can still be admitted.
  pub async fn reserve(&self, model: &str, estimated_tokens: u32) {
    let clamped = estimated_tokens.clamp(1, self.tokens_per_minute.max(1));
    let n = NonZeroU32::new(clamped).unwrap_or(NonZeroU32::MIN);

    loop {
      match self.limiter.check_key_n(&model.to_string(), n) {
        Ok(Ok(())) => return,
        Ok(Err(_not_yet)) => {
          debug!("token budget for {} exhausted, sleeping 1s", model);
          tokio::time::sleep(Duration::from_secs(1)).await;
        }
        // unreachable after clamping, but never busy-spin on it
        Err(_) => {
          tokio::time::sleep(Duration::from_secs(1)).await;
        }
      }
    }
  }

  pub fn tokens_per_minute(&self) -> u32 {
    self.tokens_per_minute
  }
}

impl std::fmt::Debug for TokenBank {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenBank").field("tokens_per_minute", &self.tokens_per_minute).finish()
  }
}

/// Rough token estimate for a classifier call: prompt overhead plus
/// about one token per four characters of text.
pub fn estimate_tokens(text: &str) -> u32 {
  256 + (text.len() / 4) as u32
}
