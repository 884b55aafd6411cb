//! # Correlation
//!
//! $$
//! \tau_b=\frac{n_c-n_d}{\sqrt{(n_0-n_1)(n_0-n_2)}}
//! $$
//!
use std::cmp::Ordering;

use ndarray::Array2;

/// Pairwise Kendall's tau-b of the columns of `data`. Pairs whose tau is
/// undefined (fewer than two rows, constant column) are `NaN`.
pub fn kendall_tau(data: &Array2<f64>) -> Array2<f64> {
  let cols = data.ncols();
  let columns: Vec<Vec<f64>> = data.columns().into_iter().map(|c| c.to_vec()).collect();
  let mut tau = Array2::<f64>::eye(cols);

  for i in 0..cols {
    for j in (i + 1)..cols {
      let t = kendalls::tau_b_with_comparator(&columns[i], &columns[j], |a: &f64, b: &f64| {
        a.partial_cmp(b).unwrap_or(Ordering::Greater)
      })
      .map(|(t, _)| t)
      .unwrap_or(f64::NAN);
      tau[[i, j]] = t;
      tau[[j, i]] = t;
    }
  }

  tau
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn concordant_and_discordant_columns() {
    let data = array![[0.1, 0.9, 0.3], [0.2, 0.8, 0.1], [0.3, 0.7, 0.2], [0.4, 0.6, 0.4]];
    let tau = kendall_tau(&data);

    assert_abs_diff_eq!(tau[[0, 0]], 1.0);
    assert_abs_diff_eq!(tau[[0, 1]], -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(tau[[1, 0]], -1.0, epsilon = 1e-12);
    // 4 concordant and 2 discordant pairs
    assert_abs_diff_eq!(tau[[0, 2]], 1.0 / 3.0, epsilon = 1e-12);
  }

  #[test]
  fn ties_use_the_tau_b_denominator() {
    let data = array![[1.0, 1.0], [2.0, 2.0], [2.0, 3.0], [3.0, 4.0]];
    let tau = kendall_tau(&data);
    // 5 concordant pairs, one pair tied in the first column
    assert_abs_diff_eq!(tau[[0, 1]], 5.0 / 30f64.sqrt(), epsilon = 1e-12);
  }

  #[test]
  fn single_row_is_undefined() {
    let tau = kendall_tau(&array![[0.5, 0.5]]);
    assert!(tau[[0, 1]].is_nan());
  }
}
