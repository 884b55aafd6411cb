//! # Estimator
//!
//! $$
//! \hat F_n(u)=\frac{1}{n}\sum_{i=1}^n \prod_{j=1}^d \mathbf 1\{U^{(i)}_j\le u_j\}
//! $$
//!
use ndarray::ArrayView1;
use rand::Rng;
use tracing::trace;

use crate::copulas::empirical::empirical_cdf;
use crate::error::VineCdfError;
use crate::traits::VineSampler;

/// Draws a fresh `n x d` sample and returns the fraction of rows lying
/// componentwise at or below `point`.
pub fn estimate_point<C, S, R>(
  point: ArrayView1<f64>,
  n: usize,
  model: &C,
  sampler: &S,
  rng: &mut R,
) -> Result<f64, VineCdfError>
where
  S: VineSampler<C> + ?Sized,
  R: Rng + ?Sized,
{
  let d = point.len();
  let samples = sampler.sample(n, model, rng)?;
  if samples.dim() != (n, d) {
    let (rows, cols) = samples.dim();
    return Err(VineCdfError::Sampler(format!(
      "expected a {n}x{d} sample, got {rows}x{cols}"
    )));
  }

  let p = empirical_cdf(&samples, point);
  trace!(n, estimate = p, "point estimated");
  Ok(p)
}

/// Standard error `sqrt(p (1 - p) / n)` of an estimate `p` from `n` samples.
pub fn standard_error(p: f64, n: usize) -> f64 {
  (p * (1.0 - p) / n as f64).sqrt()
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use ndarray::Array2;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;

  /// Replays a fixed sample regardless of `n`.
  struct Fixed(Array2<f64>);

  impl VineSampler<()> for Fixed {
    fn sample<R: Rng + ?Sized>(
      &self,
      _n: usize,
      _model: &(),
      _rng: &mut R,
    ) -> Result<Array2<f64>, VineCdfError> {
      Ok(self.0.clone())
    }
  }

  struct Failing;

  impl VineSampler<()> for Failing {
    fn sample<R: Rng + ?Sized>(
      &self,
      _n: usize,
      _model: &(),
      _rng: &mut R,
    ) -> Result<Array2<f64>, VineCdfError> {
      Err(VineCdfError::Sampler("exhausted".into()))
    }
  }

  #[test]
  fn mean_of_indicators_with_ties() {
    let sampler = Fixed(array![[0.2, 0.3], [0.4, 0.4], [0.6, 0.1], [0.1, 0.9]]);
    let mut rng = StdRng::seed_from_u64(0);
    let p = estimate_point(array![0.4, 0.4].view(), 4, &(), &sampler, &mut rng).unwrap();
    assert_abs_diff_eq!(p, 0.5);
  }

  #[test]
  fn wrong_sample_shape_is_rejected() {
    let sampler = Fixed(Array2::from_elem((3, 2), 0.5));
    let mut rng = StdRng::seed_from_u64(0);
    let err = estimate_point(array![0.4, 0.4].view(), 4, &(), &sampler, &mut rng).unwrap_err();
    assert_eq!(
      err,
      VineCdfError::Sampler("expected a 4x2 sample, got 3x2".into())
    );
  }

  #[test]
  fn sampler_errors_pass_through_unchanged() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = estimate_point(array![0.4].view(), 10, &(), &Failing, &mut rng).unwrap_err();
    assert_eq!(err, VineCdfError::Sampler("exhausted".into()));
  }

  #[test]
  fn standard_error_vanishes_at_the_boundary() {
    assert_abs_diff_eq!(standard_error(0.0, 100), 0.0);
    assert_abs_diff_eq!(standard_error(1.0, 100), 0.0);
    assert_abs_diff_eq!(standard_error(0.5, 100), 0.05);
  }
}
