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

//! Topic baselines
//!
//! A topic's baseline is the median of its stored 24 h sentiment
//! indices over the trailing 30 days. Subtracting it from a current
//! index lets topics living at different sentiment altitudes be
//! compared.

/// Median of the stored indices; `None` for an empty history
pub fn baseline_index(mut indices: Vec<i32>) -> Option<f64> {
  if indices.is_empty() {
    return None;
  }
  indices.sort_unstable();
  let n = indices.len();
  if n % 2 == 1 {
    Some(indices[n / 2] as f64)
  } else {
    Some((indices[n / 2 - 1] as f64 + indices[n / 2] as f64) / 2.0)
  }
}

/// Deviation of the current index from the baseline
pub fn deviation(current_index: i32, baseline: f64) -> f64 {
  current_index as f64 - baseline
}
