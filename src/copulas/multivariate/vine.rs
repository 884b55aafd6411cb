//! # Vine
//!
//! $$
//! c(u)=\prod_{t=1}^{d-1}\prod_{e\in E_t} c_{a_e,b_e;D_e}\big(F(u_{a_e}\mid u_{D_e}),F(u_{b_e}\mid u_{D_e})\big)
//! $$
//!
use ndarray::Array2;

use crate::copulas::bivariate::PairCopula;
use crate::traits::VineModelDescriptor;

pub mod sampler;
pub mod structure;
pub mod validator;

pub use sampler::RVineSampler;
pub use structure::CanonicalVine;
pub use validator::RVineValidator;

/// Regular vine model in lower-triangular matrix form.
///
/// Variables are labelled `1..=d`. For column `i` and row `k > i` the edge joins
/// `matrix[[i, i]]` (first copula argument) and `matrix[[k, i]]` (second
/// argument) given `matrix[[k + 1.., i]]`; row `d - 1` holds the first tree.
/// `pair_copulas[[k, i]]` is the copula of that edge; entries on and above the
/// diagonal are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct RVineModel {
  pub matrix: Array2<usize>,
  pub pair_copulas: Array2<Option<PairCopula>>,
  pub names: Option<Vec<String>>,
}

impl RVineModel {
  pub fn new(matrix: Array2<usize>, pair_copulas: Array2<Option<PairCopula>>) -> Self {
    Self {
      matrix,
      pair_copulas,
      names: None,
    }
  }

  pub fn with_names(mut self, names: Vec<String>) -> Self {
    self.names = Some(names);
    self
  }

  /// D-vine on `1..=d` in natural order with every edge independent.
  pub fn independence(d: usize) -> Self {
    let matrix = dvine_matrix(d);
    let pair_copulas = Array2::from_shape_fn((d, d), |(k, i)| {
      (k > i).then(PairCopula::independence)
    });
    Self::new(matrix, pair_copulas)
  }

  /// D-vine on `1..=d` whose edges are given tree by tree: `trees[t][e]` is the
  /// copula joining variables `e + 1` and `e + t + 2` given the ones in between.
  pub fn dvine(d: usize, trees: &[Vec<PairCopula>]) -> Self {
    let matrix = dvine_matrix(d);
    let mut pair_copulas = Array2::from_elem((d, d), None);
    for i in 0..d.saturating_sub(1) {
      for k in (i + 1)..d {
        let tree = d - 1 - k;
        // column i holds variable d - i, paired with d - i - tree - 1
        let edge = d - i - tree - 2;
        let pc = trees
          .get(tree)
          .and_then(|t| t.get(edge))
          .cloned()
          .unwrap_or_else(PairCopula::independence);
        pair_copulas[[k, i]] = Some(pc);
      }
    }
    Self::new(matrix, pair_copulas)
  }

  /// Pair copula of edge `(row, col)`.
  pub fn pair_copula(&self, row: usize, col: usize) -> Option<&PairCopula> {
    self.pair_copulas.get((row, col)).and_then(Option::as_ref)
  }
}

/// D-vine structure on `1..=d`: diagonal `d, d-1, ..., 1`, below the diagonal
/// column `i` lists `1, 2, ..., d - i - 1` so the last row is the first tree.
fn dvine_matrix(d: usize) -> Array2<usize> {
  Array2::from_shape_fn((d, d), |(k, i)| match k.cmp(&i) {
    std::cmp::Ordering::Equal => d - i,
    std::cmp::Ordering::Greater => k - i,
    std::cmp::Ordering::Less => 0,
  })
}

impl VineModelDescriptor for RVineModel {
  fn dim(&self) -> usize {
    self.matrix.nrows()
  }

  fn names(&self) -> Option<&[String]> {
    self.names.as_deref()
  }
}
