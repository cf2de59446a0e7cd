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

//! Canonical text normalization
//!
//! One normal form feeds the content fingerprint, the near-duplicate
//! comparison, and keyword matching, so all three agree on what "the
//! same text" means.

use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("static regex"));
static DISALLOWED_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[^\w\s.,?!-]").expect("static regex"));
static WHITESPACE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Lower-case, URLs stripped, characters outside `[\w\s.,?!-]` removed,
/// whitespace collapsed, trimmed.
pub fn normalize_text(s: &str) -> String {
  let lowered = s.to_lowercase();
  let no_urls = URL_RE.replace_all(&lowered, " ");
  let cleaned = DISALLOWED_RE.replace_all(&no_urls, "");
  let collapsed = WHITESPACE_RE.replace_all(&cleaned, " ");
  collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_lowercases() {
    assert_eq!(normalize_text("FUEL Crisis"), "fuel crisis");
  }

  #[test]
  fn test_strips_urls() {
    assert_eq!(normalize_text("see https://a.example/x now"), "see now");
    assert_eq!(normalize_text("see www.example.com now"), "see now");
  }

  #[test]
  fn test_removes_disallowed_characters() {
    assert_eq!(normalize_text("fuel @queue #now $5"), "fuel queue now 5");
  }

  #[test]
  fn test_keeps_allowed_punctuation() {
    assert_eq!(normalize_text("What? No fuel, again... just-so!"), "what? no fuel, again... just-so!");
  }

  #[test]
  fn test_collapses_and_trims() {
    assert_eq!(normalize_text("  a\t\tb\n\nc  "), "a b c");
  }

  #[test]
  fn test_idempotent() {
    let once = normalize_text("Fuel!!   https://x.co @q");
    assert_eq!(normalize_text(&once), once);
  }
}
