//! Simulation from a prepared vine by the inverse Rosenblatt transform.
use std::collections::HashMap;

use ndarray::Array1;
use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Uniform;
use tracing::trace;

use super::structure::CanonicalVine;
use crate::copulas::bivariate::clamp_unit;
use crate::error::VineCdfError;
use crate::traits::VineSampler;

#[derive(Debug, Clone, Copy, Default)]
pub struct RVineSampler;

impl RVineSampler {
  pub fn new() -> Self {
    Self
  }
}

/// Conditional distributions `F(x | D)` of one sample batch, keyed by
/// `(x, sorted D)`.
struct Conditionals<'a> {
  vine: &'a CanonicalVine,
  values: HashMap<(usize, Vec<usize>), Array1<f64>>,
}

impl<'a> Conditionals<'a> {
  fn new(vine: &'a CanonicalVine) -> Self {
    Self {
      vine,
      values: HashMap::new(),
    }
  }

  fn insert(&mut self, x: usize, conditioning: &[usize], value: Array1<f64>) {
    let mut key = conditioning.to_vec();
    key.sort_unstable();
    self.values.insert((x, key), value);
  }

  /// `F(x | conditioning)` from already simulated variables, built through the
  /// edge `(x, y | conditioning \ y)` of the previous tree.
  fn get(&mut self, x: usize, conditioning: &[usize]) -> Result<Array1<f64>, VineCdfError> {
    let mut key = conditioning.to_vec();
    key.sort_unstable();
    if let Some(v) = self.values.get(&(x, key.clone())) {
      return Ok(v.clone());
    }
    if key.is_empty() {
      return Err(VineCdfError::Sampler(format!(
        "variable {} requested before it was simulated",
        x + 1
      )));
    }

    let vine = self.vine;
    for (pos, &y) in key.iter().enumerate() {
      let mut rest = key.clone();
      rest.remove(pos);
      let Some(edge) = vine.edge(x, y, &rest) else {
        continue;
      };
      let fx = self.get(x, &rest)?;
      let fy = self.get(y, &rest)?;
      let value = if edge.first == x {
        edge.copula.hfunc2(fx.view(), fy.view())
      } else {
        edge.copula.hfunc1(fy.view(), fx.view())
      };
      self.values.insert((x, key.clone()), value.clone());
      return Ok(value);
    }

    Err(VineCdfError::Sampler(format!(
      "no edge conditions variable {} on {:?}",
      x + 1,
      key.iter().map(|v| v + 1).collect::<Vec<_>>()
    )))
  }
}

impl VineSampler<CanonicalVine> for RVineSampler {
  fn sample<R: Rng + ?Sized>(
    &self,
    n: usize,
    model: &CanonicalVine,
    rng: &mut R,
  ) -> Result<Array2<f64>, VineCdfError> {
    let d = model.dim;
    let mut w = Array2::<f64>::random_using((n, d), Uniform::new(0.0, 1.0), rng);
    w.mapv_inplace(clamp_unit);

    let mut cond = Conditionals::new(model);
    let mut out = Array2::<f64>::zeros((n, d));

    for (j, column) in model.columns.iter().enumerate() {
      let a = column.variable;
      let partners = &column.partners;
      // F(a | all partners) is the independent uniform of this column
      let mut v = w.column(j).to_owned();
      cond.insert(a, partners, v.clone());

      for t in (0..partners.len()).rev() {
        let b = partners[t];
        let given = &partners[..t];
        let edge = model.edge(a, b, given).ok_or_else(|| {
          VineCdfError::Sampler(format!("missing edge for variable {} in tree {}", a + 1, t + 1))
        })?;
        let fb = cond.get(b, given)?;
        v = if edge.first == a {
          edge.copula.hinv2(v.view(), fb.view())
        } else {
          edge.copula.hinv1(v.view(), fb.view())
        };
        cond.insert(a, given, v.clone());
      }

      out.column_mut(a).assign(&v);
    }

    trace!(n, d, "vine sample drawn");
    Ok(out)
  }
}
