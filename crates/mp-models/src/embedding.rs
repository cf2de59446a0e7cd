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

//! Embedding vector math shared by topic scoring and issue clustering

/// Cosine similarity in [-1, 1]. Zero when either vector is empty,
/// zero-length, or the dimensions disagree.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
  if a.is_empty() || a.len() != b.len() {
    return 0.0;
  }
  let mut dot = 0.0f64;
  let mut norm_a = 0.0f64;
  let mut norm_b = 0.0f64;
  for (x, y) in a.iter().zip(b.iter()) {
    dot += (*x as f64) * (*y as f64);
    norm_a += (*x as f64) * (*x as f64);
    norm_b += (*y as f64) * (*y as f64);
  }
  if norm_a == 0.0 || norm_b == 0.0 {
    return 0.0;
  }
  dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Cosine similarity mapped from [-1, 1] to [0, 1]
pub fn cosine_unit_interval(a: &[f32], b: &[f32]) -> f64 {
  (cosine_similarity(a, b) + 1.0) / 2.0
}

/// Scale a vector to unit length; a zero vector is returned unchanged
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
  let norm: f64 = v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
  if norm == 0.0 {
    return v.to_vec();
  }
  v.iter().map(|x| (*x as f64 / norm) as f32).collect()
}

/// Normalized mean of a set of vectors (the cluster centroid). Empty
/// input or mismatched dimensions yield an empty vector.
pub fn centroid(vectors: &[&[f32]]) -> Vec<f32> {
  let Some(first) = vectors.first() else {
    return Vec::new();
  };
  let dims = first.len();
  if vectors.iter().any(|v| v.len() != dims) {
    return Vec::new();
  }

  let mut sums = vec![0.0f64; dims];
  for v in vectors {
    for (i, x) in v.iter().enumerate() {
      sums[i] += *x as f64;
    }
  }
  let n = vectors.len() as f64;
  let mean: Vec<f32> = sums.iter().map(|s| (s / n) as f32).collect();
  l2_normalize(&mean)
}

/// Weighted mean of two centroids (existing members vs new members),
/// re-normalized. Used when a cluster merges into an existing issue.
pub fn weighted_centroid(a: &[f32], weight_a: f64, b: &[f32], weight_b: f64) -> Vec<f32> {
  if a.len() != b.len() || a.is_empty() {
    return a.to_vec();
  }
  let total = weight_a + weight_b;
  if total <= 0.0 {
    return a.to_vec();
  }
  let merged: Vec<f32> = a
    .iter()
    .zip(b.iter())
    .map(|(x, y)| (((*x as f64) * weight_a + (*y as f64) * weight_b) / total) as f32)
    .collect();
  l2_normalize(&merged)
}
