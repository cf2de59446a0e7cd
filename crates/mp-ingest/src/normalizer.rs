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

//! Record normalization: raw collector output to canonical mentions
//!
//! Pure functions, no I/O. Field names differ per platform, so lookups
//! go through alias lists. The same text normalization feeds both the
//! content fingerprint and the near-duplicate comparison, which is what
//! makes the dedup layer deterministic.

use chrono::{DateTime, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};

pub use mp_models::text::normalize_text;
use mp_models::{CanonicalMention, Engagement, RawRecord, RejectReason, SourceDescriptor};

const TEXT_ALIASES: &[&str] = &["text", "content", "body", "message", "summary", "description"];
const TITLE_ALIASES: &[&str] = &["title", "headline"];
const URL_ALIASES: &[&str] = &["url", "link", "permalink"];
const SOURCE_ID_ALIASES: &[&str] = &["source_id", "id", "tweet_id", "post_id", "article_id"];
const TIMESTAMP_ALIASES: &[&str] = &["published_at", "created_at", "date", "timestamp", "time"];

/// Parse the timestamp formats the sources actually emit, in order of
/// how often they show up. Returns `None` when nothing matches; callers
/// fall back to `collected_at`.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();
  if s.is_empty() {
    return None;
  }

  // Twitter's RFC 1123 variant: "Wed Oct 10 20:19:24 +0000 2018"
  if let Ok(dt) = DateTime::parse_from_str(s, "%a %b %d %H:%M:%S %z %Y") {
    return Some(dt.with_timezone(&Utc));
  }

  // ISO-8601 / RFC 3339, with optional fractional seconds and Z suffix
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }

  // Space-separated with explicit 4-or-5-digit timezone
  for fmt in ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S %z"] {
    if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
      return Some(dt.with_timezone(&Utc));
    }
  }

  // Naive variants, taken as UTC
  for fmt in [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%H:%M %d %b %Y",
    "%d %b %Y %H:%M",
  ] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
      return Some(naive.and_utc());
    }
  }

  None
}

/// Deterministic 256-bit dedup probe key: platform plus the strongest
/// identity the record carries (native id, else url, else normalized
/// text).
pub fn fingerprint(mention: &CanonicalMention) -> [u8; 32] {
  let mut hasher = Sha256::new();
  hasher.update(mention.platform.as_bytes());
  hasher.update([0u8]);
  if let Some(source_id) = &mention.source_id {
    hasher.update(b"id:");
    hasher.update(source_id.as_bytes());
  } else if let Some(url) = &mention.url {
    hasher.update(b"url:");
    hasher.update(url.as_bytes());
  } else {
    hasher.update(b"text:");
    hasher.update(normalize_text(&mention.text).as_bytes());
  }
  hasher.finalize().into()
}

/// Normalizer configuration; an empty allow-list admits every language
#[derive(Debug, Clone, Default)]
pub struct NormalizerConfig {
  pub allowed_languages: Vec<String>,
}

impl NormalizerConfig {
  pub fn from_settings(settings: &mp_core::Settings) -> Self {
    Self { allowed_languages: settings.list("ingestion.allowed_languages") }
  }
}

/// Record normalizer (C1). Stateless apart from configuration.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
  config: NormalizerConfig,
}

impl Normalizer {
  pub fn new(config: NormalizerConfig) -> Self {
    Self { config }
  }

  /// Convert one raw record into the canonical mention shape.
  ///
  /// `collected_at` is stamped by the caller (the ingest loop observed
  /// the record, not this function) and doubles as the `published_at`
  /// fallback when the record carries no parseable timestamp field.
  pub fn normalize(
    &self,
    raw: &RawRecord,
    source: &SourceDescriptor,
    collected_at: DateTime<Utc>,
  ) -> Result<CanonicalMention, RejectReason> {
    let text = raw.str_field(TEXT_ALIASES).map(|s| s.to_string());
    let url = raw.str_field(URL_ALIASES).map(|s| s.to_string());

    if text.as_deref().map(str::trim).unwrap_or("").is_empty() && url.is_none() {
      return Err(RejectReason::MissingRequiredField);
    }

    let language = raw.str_field(&["language", "lang"]).map(|s| s.to_lowercase());
    if !self.config.allowed_languages.is_empty() {
      if let Some(lang) = &language {
        if !self.config.allowed_languages.iter().any(|allowed| allowed.eq_ignore_ascii_case(lang))
        {
          return Err(RejectReason::UnsupportedLanguage);
        }
      }
    }

    let published_at = match self.published_at(raw) {
      Ok(Some(ts)) => ts,
      Ok(None) => collected_at,
      Err(reason) => return Err(reason),
    };

    let title = raw.str_field(TITLE_ALIASES).map(|s| s.to_string());
    let text = text.or_else(|| title.clone()).unwrap_or_default();

    Ok(CanonicalMention {
      source_id: raw.str_field(SOURCE_ID_ALIASES).map(|s| s.to_string()),
      url,
      platform: source.platform.clone(),
      source_type: source.source_type,
      source_name: source.source_name.clone(),
      query: raw.str_field(&["query", "search_query"]).map(|s| s.to_string()),
      collected_at,
      published_at,
      language,
      country: raw.str_field(&["country"]).map(|s| s.to_string()),
      title,
      text,
      author_handle: raw.str_field(&["author_handle", "screen_name", "username"]).map(String::from),
      author_name: raw.str_field(&["author_name", "author", "user_name"]).map(String::from),
      author_avatar: raw.str_field(&["author_avatar", "profile_image_url"]).map(String::from),
      author_location: raw.str_field(&["author_location", "user_location"]).map(String::from),
      author_verified: raw.bool_field(&["author_verified", "verified"]).unwrap_or(false),
      engagement: Engagement {
        likes: raw.i64_field(&["likes", "favorite_count", "reactions"]).unwrap_or(0),
        shares: raw.i64_field(&["shares", "retweet_count", "reposts"]).unwrap_or(0),
        comments: raw.i64_field(&["comments", "reply_count"]).unwrap_or(0),
        direct_reach: raw.i64_field(&["direct_reach", "views", "impressions"]).unwrap_or(0),
        cumulative_reach: raw.i64_field(&["cumulative_reach", "reach"]).unwrap_or(0),
      },
    })
  }

  /// First parseable timestamp among the aliases. A record that carries
  /// timestamp fields none of which parse is rejected; a record with no
  /// timestamp field at all falls back to `collected_at`.
  fn published_at(&self, raw: &RawRecord) -> Result<Option<DateTime<Utc>>, RejectReason> {
    let mut saw_value = false;
    for alias in TIMESTAMP_ALIASES {
      if let Some(value) = raw.str_field(&[alias]) {
        saw_value = true;
        if let Some(ts) = parse_timestamp(value) {
          return Ok(Some(ts));
        }
      }
    }
    if saw_value {
      Err(RejectReason::MalformedTimestamp)
    } else {
      Ok(None)
    }
  }
}
