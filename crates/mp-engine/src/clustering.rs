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

//! Single-linkage agglomerative clustering over mention embeddings
//!
//! Two mentions connect when their cosine similarity clears the
//! threshold; clusters are the connected components. Populations per
//! topic per tick are small, so the O(n^2) pass is fine.

use mp_database_postgres::models::CandidateMention;
use mp_models::embedding::{centroid, cosine_similarity};

/// One accepted cluster with its normalized centroid and the pairwise
/// similarity each member joined at
#[derive(Debug, Clone)]
pub struct Cluster {
  pub members: Vec<CandidateMention>,
  pub centroid: Vec<f32>,
  /// similarity of each member to the cluster centroid, index-aligned
  /// with `members`
  pub member_similarities: Vec<f64>,
}

impl Cluster {
  pub fn size(&self) -> usize {
    self.members.len()
  }
}

/// Single-linkage clustering: connected components of the
/// similarity-above-threshold graph. Components smaller than
/// `min_cluster_size` are discarded.
pub fn cluster_candidates(
  candidates: Vec<CandidateMention>,
  similarity_threshold: f64,
  min_cluster_size: usize,
) -> Vec<Cluster> {
  let n = candidates.len();
  if n == 0 {
    return Vec::new();
  }

  // union-find over the similarity graph
  let mut parent: Vec<usize> = (0..n).collect();

  fn find(parent: &mut Vec<usize>, i: usize) -> usize {
    let mut root = i;
    while parent[root] != root {
      root = parent[root];
    }
    let mut walk = i;
    while parent[walk] != root {
      let next = parent[walk];
      parent[walk] = root;
      walk = next;
    }
    root
  }

  for i in 0..n {
    for j in (i + 1)..n {
      let similarity = cosine_similarity(&candidates[i].vector, &candidates[j].vector);
      if similarity >= similarity_threshold {
        let root_i = find(&mut parent, i);
        let root_j = find(&mut parent, j);
        if root_i != root_j {
          parent[root_i] = root_j;
        }
      }
    }
  }

  let mut groups: std::collections::HashMap<usize, Vec<usize>> = std::collections::HashMap::new();
  for i in 0..n {
    let root = find(&mut parent, i);
    groups.entry(root).or_default().push(i);
  }

  let mut clusters: Vec<Cluster> = Vec::new();
  for (_, indices) in groups {
    if indices.len() < min_cluster_size {
      continue;
    }
    let members: Vec<CandidateMention> =
      indices.iter().map(|&i| candidates[i].clone()).collect();
    let vectors: Vec<&[f32]> = members.iter().map(|m| m.vector.as_slice()).collect();
    let center = centroid(&vectors);
    let member_similarities =
      members.iter().map(|m| cosine_similarity(&m.vector, &center)).collect();
    clusters.push(Cluster { members, centroid: center, member_similarities });
  }

  // deterministic output order: largest first, then by first member id
  clusters.sort_by(|a, b| {
    b.size()
      .cmp(&a.size())
      .then_with(|| a.members[0].entry_id.cmp(&b.members[0].entry_id))
  });
  clusters
}
