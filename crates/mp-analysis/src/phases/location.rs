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

//! Phase L: deterministic location classification
//!
//! No model call. A config-supplied rule per country lists the country
//! name (weight 5.0), its cities (weight 2.0), and generic location
//! keywords with explicit weights. The best-scoring country wins;
//! confidence is the matched weight over the rule's total weight.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One country's evidence rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRule {
  pub country: String,
  #[serde(default)]
  pub cities: Vec<String>,
  /// (keyword, weight) pairs, weights typically 1.0 - 3.0
  #[serde(default)]
  pub keywords: Vec<(String, f64)>,
}

const COUNTRY_WEIGHT: f64 = 5.0;
const CITY_WEIGHT: f64 = 2.0;

impl LocationRule {
  fn total_weight(&self) -> f64 {
    COUNTRY_WEIGHT
      + self.cities.len() as f64 * CITY_WEIGHT
      + self.keywords.iter().map(|(_, w)| w).sum::<f64>()
  }

  fn matched_weight(&self, normalized_text: &str) -> f64 {
    let mut score = 0.0;
    if contains_term(normalized_text, &self.country) {
      score += COUNTRY_WEIGHT;
    }
    for city in &self.cities {
      if contains_term(normalized_text, city) {
        score += CITY_WEIGHT;
      }
    }
    for (keyword, weight) in &self.keywords {
      if contains_term(normalized_text, keyword) {
        score += weight;
      }
    }
    score
  }
}

fn contains_term(normalized_text: &str, term: &str) -> bool {
  let pattern = format!(r"\b{}\b", regex::escape(term.to_lowercase().trim()));
  Regex::new(&pattern).map(|re| re.is_match(normalized_text)).unwrap_or(false)
}

/// Keyword-based location classifier
#[derive(Debug, Clone, Default)]
pub struct LocationClassifier {
  rules: Vec<LocationRule>,
}

impl LocationClassifier {
  pub fn new(rules: Vec<LocationRule>) -> Self {
    Self { rules }
  }

  /// Load the rule list from a JSON document: `[{"country": ...,
  /// "cities": [...], "keywords": [["kw", 2.0], ...]}, ...]`
  pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
    Ok(Self::new(serde_json::from_str(contents)?))
  }

  /// Best country and its confidence in [0, 1]; `None` when nothing
  /// matched
  pub fn classify(&self, normalized_text: &str) -> Option<(String, f64)> {
    let mut best: Option<(&LocationRule, f64)> = None;
    for rule in &self.rules {
      let score = rule.matched_weight(normalized_text);
      if score <= 0.0 {
        continue;
      }
      match &best {
        Some((_, best_score)) if *best_score >= score => {}
        _ => best = Some((rule, score)),
      }
    }

    best.map(|(rule, score)| {
      let total = rule.total_weight();
      let confidence = if total > 0.0 { (score / total).clamp(0.0, 1.0) } else { 0.0 };
      (rule.country.clone(), confidence)
    })
  }
}
