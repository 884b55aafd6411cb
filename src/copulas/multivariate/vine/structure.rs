use std::collections::HashMap;

use ndarray::Array2;

use crate::copulas::bivariate::RotatedCopula;

/// One edge of the vine with 0-based variable labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VineEdge {
  pub tree: usize,
  /// `(first, second)` copula arguments.
  pub conditioned: (usize, usize),
  /// Sorted conditioning set.
  pub conditioning: Vec<usize>,
  /// `(row, col)` of the edge in the vine matrix.
  pub position: (usize, usize),
}

impl VineEdge {
  /// Conditioned set plus conditioning set, sorted.
  pub fn complete_union(&self) -> Vec<usize> {
    let mut u = self.conditioning.clone();
    u.push(self.conditioned.0);
    u.push(self.conditioned.1);
    u.sort_unstable();
    u
  }

  pub fn key(&self) -> EdgeKey {
    EdgeKey::new(self.conditioned.0, self.conditioned.1, &self.conditioning)
  }
}

/// Orientation-free lookup key of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
  pair: (usize, usize),
  conditioning: Vec<usize>,
}

impl EdgeKey {
  pub fn new(a: usize, b: usize, conditioning: &[usize]) -> Self {
    let mut conditioning = conditioning.to_vec();
    conditioning.sort_unstable();
    Self {
      pair: (a.min(b), a.max(b)),
      conditioning,
    }
  }
}

/// Reads the edges of a lower-triangular vine matrix with 1-based labels,
/// grouped by tree. Assumes entries on and below the diagonal are non-zero.
pub fn edges_from_matrix(matrix: &Array2<usize>) -> Vec<Vec<VineEdge>> {
  let d = matrix.nrows();
  let mut trees = vec![Vec::new(); d.saturating_sub(1)];

  for i in 0..d.saturating_sub(1) {
    for k in (i + 1)..d {
      let mut conditioning: Vec<usize> = ((k + 1)..d).map(|r| matrix[[r, i]] - 1).collect();
      conditioning.sort_unstable();
      let tree = d - 1 - k;
      trees[tree].push(VineEdge {
        tree,
        conditioned: (matrix[[i, i]] - 1, matrix[[k, i]] - 1),
        conditioning,
        position: (k, i),
      });
    }
  }

  trees
}

/// Edge of a prepared vine: orientation plus resolved copula.
#[derive(Debug)]
pub struct CanonicalEdge {
  pub first: usize,
  pub second: usize,
  pub tree: usize,
  pub copula: RotatedCopula,
}

/// Sampling-ready vine produced by [`super::RVineValidator`].
///
/// `columns[j]` describes the `j`-th variable to be simulated: the variable and
/// its partners from the first tree upwards.
#[derive(Debug)]
pub struct CanonicalVine {
  pub dim: usize,
  pub columns: Vec<SamplingColumn>,
  pub edges: HashMap<EdgeKey, CanonicalEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingColumn {
  pub variable: usize,
  pub partners: Vec<usize>,
}

impl CanonicalVine {
  pub fn edge(&self, a: usize, b: usize, conditioning: &[usize]) -> Option<&CanonicalEdge> {
    self.edges.get(&EdgeKey::new(a, b, conditioning))
  }

  /// Sampling order, earliest first.
  pub fn order(&self) -> Vec<usize> {
    self.columns.iter().map(|c| c.variable).collect()
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;

  #[test]
  fn reads_edges_tree_by_tree() {
    // C-vine rooted at 1 in tree one
    let m = array![[4, 0, 0, 0], [3, 3, 0, 0], [2, 2, 2, 0], [1, 1, 1, 1]];
    let trees = edges_from_matrix(&m);
    assert_eq!(trees.len(), 3);
    assert_eq!(trees[0].len(), 3);
    assert_eq!(trees[2].len(), 1);

    let first: Vec<_> = trees[0].iter().map(|e| e.conditioned).collect();
    assert_eq!(first, vec![(3, 0), (2, 0), (1, 0)]);

    let top = &trees[2][0];
    assert_eq!(top.conditioned, (3, 2));
    assert_eq!(top.conditioning, vec![0, 1]);
    assert_eq!(top.complete_union(), vec![0, 1, 2, 3]);
    assert_eq!(top.position, (1, 0));
  }

  #[test]
  fn edge_key_ignores_orientation_and_order() {
    assert_eq!(EdgeKey::new(3, 1, &[4, 2]), EdgeKey::new(1, 3, &[2, 4]));
    assert_ne!(EdgeKey::new(3, 1, &[2]), EdgeKey::new(3, 2, &[1]));
  }
}
