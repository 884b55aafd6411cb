//! # Empirical
//!
//! $$
//! \hat F_n(u)=\frac{1}{n}\sum_{i=1}^n \mathbf 1\{U_{i1}\le u_1,\dots,U_{id}\le u_d\}
//! $$
//!
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::Axis;

/// Fraction of the rows of `samples` lying componentwise at or below `point`.
///
/// Ties count as hits. Returns `NaN` for an empty sample set.
pub fn empirical_cdf(samples: &Array2<f64>, point: ArrayView1<f64>) -> f64 {
  let n = samples.nrows();
  if n == 0 {
    return f64::NAN;
  }

  let hits = samples
    .axis_iter(Axis(0))
    .filter(|row| row.iter().zip(point.iter()).all(|(s, u)| s <= u))
    .count();

  hits as f64 / n as f64
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn counts_componentwise_hits_with_ties() {
    let s = array![[0.1, 0.2], [0.5, 0.5], [0.9, 0.1], [0.3, 0.7]];
    assert_abs_diff_eq!(empirical_cdf(&s, array![0.5, 0.5].view()), 0.5);
    assert_abs_diff_eq!(empirical_cdf(&s, array![1.0, 1.0].view()), 1.0);
    assert_abs_diff_eq!(empirical_cdf(&s, array![0.0, 1.0].view()), 0.0);
  }

  #[test]
  fn empty_sample_set_is_nan() {
    let s = Array2::<f64>::zeros((0, 3));
    assert!(empirical_cdf(&s, array![0.5, 0.5, 0.5].view()).is_nan());
  }
}
