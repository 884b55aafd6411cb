//! Structural and parametric checks for [`RVineModel`], and its preparation
//! into a [`CanonicalVine`].
use std::collections::HashMap;
use std::collections::HashSet;

use tracing::debug;

use super::structure::edges_from_matrix;
use super::structure::CanonicalEdge;
use super::structure::CanonicalVine;
use super::structure::SamplingColumn;
use super::structure::VineEdge;
use super::RVineModel;
use crate::error::VineCdfError;
use crate::traits::VineModelDescriptor;
use crate::traits::VineModelValidator;

#[derive(Debug, Clone, Copy, Default)]
pub struct RVineValidator;

impl RVineValidator {
  pub fn new() -> Self {
    Self
  }

  fn check_matrix(&self, model: &RVineModel) -> Result<(), String> {
    let m = &model.matrix;
    let d = m.nrows();

    if d < 2 {
      return Err(format!("Need at least 2 dimensions, got {d}"));
    }
    if m.ncols() != d {
      return Err(format!("Vine matrix must be square, got {}x{}", d, m.ncols()));
    }
    if model.pair_copulas.dim() != (d, d) {
      let (r, c) = model.pair_copulas.dim();
      return Err(format!("Pair-copula matrix must be {d}x{d}, got {r}x{c}"));
    }
    if let Some(names) = &model.names {
      if names.len() != d {
        return Err(format!("Expected {d} variable names, got {}", names.len()));
      }
    }

    for ((k, i), &v) in m.indexed_iter() {
      if k < i && v != 0 {
        return Err(format!("Vine matrix must be lower triangular, found {v} at ({k}, {i})"));
      }
      if k >= i && !(1..=d).contains(&v) {
        return Err(format!("Vine matrix entries must be in 1..={d}, found {v} at ({k}, {i})"));
      }
    }

    let diagonal: HashSet<usize> = (0..d).map(|i| m[[i, i]]).collect();
    if diagonal.len() != d {
      return Err("Vine matrix diagonal must be a permutation of the variables".into());
    }

    for i in 0..d {
      let allowed: HashSet<usize> = (i..d).map(|j| m[[j, j]]).collect();
      let column: HashSet<usize> = (i..d).map(|k| m[[k, i]]).collect();
      if column.len() != d - i || column != allowed {
        return Err(format!(
          "Column {i} must contain each of the variables {:?} exactly once",
          sorted(&allowed)
        ));
      }
    }

    Ok(())
  }

  /// Tree one is a spanning tree once `check_matrix` passes; higher trees may
  /// still violate the proximity condition.
  fn check_trees(&self, trees: &[Vec<VineEdge>]) -> Result<(), String> {
    for t in 1..trees.len() {
      let previous = &trees[t - 1];
      for e in &trees[t] {
        let (a, b) = e.conditioned;
        for x in [a, b] {
          let mut union = e.conditioning.clone();
          union.push(x);
          union.sort_unstable();
          let joined = previous.iter().any(|p| {
            (p.conditioned.0 == x || p.conditioned.1 == x) && p.complete_union() == union
          });
          if !joined {
            return Err(format!(
              "Edge {} in tree {} violates the proximity condition",
              label(e),
              t + 1
            ));
          }
        }
      }
    }

    Ok(())
  }

  fn check_pair_copulas(&self, model: &RVineModel, trees: &[Vec<VineEdge>]) -> Result<(), String> {
    for e in trees.iter().flatten() {
      let (k, i) = e.position;
      let pc = model
        .pair_copula(k, i)
        .ok_or_else(|| format!("Missing pair copula for edge {}", label(e)))?;
      pc.check()
        .map_err(|msg| format!("Edge {}: {msg}", label(e)))?;
    }
    Ok(())
  }
}

fn sorted(set: &HashSet<usize>) -> Vec<usize> {
  let mut v: Vec<usize> = set.iter().copied().collect();
  v.sort_unstable();
  v
}

/// Human-readable edge label with 1-based variables, e.g. `4,3|1,2`.
fn label(e: &VineEdge) -> String {
  let (a, b) = e.conditioned;
  if e.conditioning.is_empty() {
    format!("{},{}", a + 1, b + 1)
  } else {
    let d: Vec<String> = e.conditioning.iter().map(|v| (v + 1).to_string()).collect();
    format!("{},{}|{}", a + 1, b + 1, d.join(","))
  }
}

impl VineModelValidator for RVineValidator {
  type Model = RVineModel;
  type Canonical = CanonicalVine;

  fn check(&self, model: &RVineModel) -> Result<(), VineCdfError> {
    self.check_matrix(model).map_err(VineCdfError::Consistency)?;
    let trees = edges_from_matrix(&model.matrix);
    self.check_trees(&trees).map_err(VineCdfError::Consistency)?;
    self
      .check_pair_copulas(model, &trees)
      .map_err(VineCdfError::Consistency)?;
    debug!(dim = model.dim(), "vine model is consistent");
    Ok(())
  }

  fn prepare(&self, model: &RVineModel) -> Result<CanonicalVine, VineCdfError> {
    let m = &model.matrix;
    let d = m.nrows();
    if d == 0 || m.ncols() != d || model.pair_copulas.dim() != (d, d) {
      return Err(VineCdfError::Preparation(format!(
        "malformed vine matrices of shape {:?} and {:?}",
        m.dim(),
        model.pair_copulas.dim()
      )));
    }
    if m.indexed_iter().any(|((k, i), &v)| k >= i && !(1..=d).contains(&v)) {
      return Err(VineCdfError::Preparation(
        "vine matrix entries must be in 1..=d".into(),
      ));
    }

    let mut edges = HashMap::new();
    for e in edges_from_matrix(m).into_iter().flatten() {
      let (k, i) = e.position;
      let pc = model.pair_copula(k, i).ok_or_else(|| {
        VineCdfError::Preparation(format!("missing pair copula for edge {}", label(&e)))
      })?;
      let copula = pc
        .resolve()
        .map_err(|msg| VineCdfError::Preparation(format!("edge {}: {msg}", label(&e))))?;
      edges.insert(
        e.key(),
        CanonicalEdge {
          first: e.conditioned.0,
          second: e.conditioned.1,
          tree: e.tree,
          copula,
        },
      );
    }

    // the last diagonal entry is simulated first
    let columns = (0..d)
      .rev()
      .map(|i| SamplingColumn {
        variable: m[[i, i]] - 1,
        partners: ((i + 1)..d).rev().map(|k| m[[k, i]] - 1).collect(),
      })
      .collect();

    debug!(dim = d, edges = edges.len(), "vine model prepared");
    Ok(CanonicalVine {
      dim: d,
      columns,
      edges,
    })
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;
  use ndarray::Array2;

  use super::*;
  use crate::copulas::bivariate::CopulaType;
  use crate::copulas::bivariate::PairCopula;
  use crate::copulas::bivariate::Rotation;

  fn cvine4() -> RVineModel {
    let m = array![[4, 0, 0, 0], [3, 3, 0, 0], [2, 2, 2, 0], [1, 1, 1, 1]];
    let pcs = Array2::from_shape_fn((4, 4), |(k, i)| {
      (k > i).then(|| PairCopula::gaussian(0.1 * (k + i) as f64))
    });
    RVineModel::new(m, pcs)
  }

  fn consistency_message(model: &RVineModel) -> String {
    match RVineValidator::new().check(model) {
      Err(VineCdfError::Consistency(msg)) => msg,
      other => panic!("expected a consistency error, got {other:?}"),
    }
  }

  #[test]
  fn accepts_cvine_and_dvine() {
    let v = RVineValidator::new();
    assert!(v.check(&cvine4()).is_ok());
    assert!(v.check(&RVineModel::independence(5)).is_ok());
  }

  #[test]
  fn accepts_general_rvine() {
    // neither a C- nor a D-vine
    let m = array![
      [5, 0, 0, 0, 0],
      [2, 2, 0, 0, 0],
      [3, 3, 3, 0, 0],
      [1, 4, 4, 4, 0],
      [4, 1, 1, 1, 1]
    ];
    let pcs = Array2::from_shape_fn((5, 5), |(k, i)| {
      (k > i).then(|| PairCopula::from_tau(CopulaType::Frank, 0.2))
    });
    assert!(RVineValidator::new().check(&RVineModel::new(m, pcs)).is_ok());
  }

  #[test]
  fn accepted_matrix_has_a_connected_first_tree() {
    let m = array![
      [5, 0, 0, 0, 0],
      [2, 2, 0, 0, 0],
      [3, 3, 3, 0, 0],
      [1, 4, 4, 4, 0],
      [4, 1, 1, 1, 1]
    ];
    let pcs = Array2::from_shape_fn((5, 5), |(k, i)| (k > i).then(PairCopula::independence));
    let model = RVineModel::new(m, pcs);
    assert!(RVineValidator::new().check_matrix(&model).is_ok());

    let first = &edges_from_matrix(&model.matrix)[0];
    assert_eq!(first.len(), 4);
    let mut reached = HashSet::from([first[0].conditioned.0]);
    for _ in 0..first.len() {
      for e in first {
        let (a, b) = e.conditioned;
        if reached.contains(&a) || reached.contains(&b) {
          reached.insert(a);
          reached.insert(b);
        }
      }
    }
    assert_eq!(reached.len(), 5);
  }

  #[test]
  fn rejects_upper_triangle_entries() {
    let mut model = cvine4();
    model.matrix[[0, 2]] = 1;
    assert!(consistency_message(&model).contains("lower triangular"));
  }

  #[test]
  fn rejects_repeated_diagonal() {
    let mut model = cvine4();
    model.matrix[[1, 1]] = 4;
    assert!(consistency_message(&model).contains("permutation"));
  }

  #[test]
  fn rejects_proximity_violation() {
    // tree one is the path 4-3-1-2; tree two joins 4 and 2 given 3 although
    // 3-2 is not an edge of tree one
    let m = array![[4, 0, 0, 0], [1, 3, 0, 0], [2, 2, 2, 0], [3, 1, 1, 1]];
    let pcs = Array2::from_shape_fn((4, 4), |(k, i)| (k > i).then(PairCopula::independence));
    let msg = consistency_message(&RVineModel::new(m, pcs));
    assert!(msg.contains("Edge 4,2|3 in tree 2 violates the proximity condition"), "{msg}");
  }

  #[test]
  fn rejects_out_of_bounds_parameter() {
    let mut model = cvine4();
    model.pair_copulas[[3, 0]] = Some(PairCopula::gumbel(0.5));
    let msg = consistency_message(&model);
    assert!(msg.contains("Edge 4,1"), "{msg}");
  }

  #[test]
  fn rejects_missing_pair_copula_and_names() {
    let mut model = cvine4();
    model.pair_copulas[[2, 1]] = None;
    assert!(consistency_message(&model).contains("Missing pair copula"));

    let model = cvine4().with_names(vec!["a".into(), "b".into()]);
    assert!(consistency_message(&model).contains("names"));
  }

  #[test]
  fn prepare_orders_columns_and_resolves_tau() {
    let mut model = cvine4();
    model.pair_copulas[[3, 0]] = Some(PairCopula::from_tau(CopulaType::Gumbel, -0.5));
    let vine = RVineValidator::new().prepare(&model).unwrap();

    assert_eq!(vine.order(), vec![0, 1, 2, 3]);
    assert_eq!(vine.columns[3].partners, vec![0, 1, 2]);
    assert_eq!(vine.edges.len(), 6);

    let e = vine.edge(0, 3, &[]).unwrap();
    assert_eq!((e.first, e.second), (3, 0));
    assert_eq!(e.copula.rotation, Rotation::R90);
    assert!((e.copula.copula.theta() - 2.0).abs() < 1e-12);
  }

  #[test]
  fn prepare_failure_is_distinct_from_consistency() {
    let mut model = cvine4();
    model.pair_copulas[[3, 0]] = Some(PairCopula::from_tau(CopulaType::Clayton, 1.5));
    assert!(matches!(
      RVineValidator::new().prepare(&model),
      Err(VineCdfError::Preparation(_))
    ));
  }
}
