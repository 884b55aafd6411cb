use impl_new_derive::ImplNew;

use super::BivariateExt;
use super::CopulaType;

/// Clayton copula, lower tail dependent:
/// C(u,v) = (u^-θ + v^-θ - 1)^(-1/θ), θ > 0
#[derive(ImplNew, Debug, Clone)]
pub struct Clayton {
  pub theta: f64,
}

pub(crate) fn tau_to_theta(tau: f64) -> f64 {
  2.0 * tau / (1.0 - tau)
}

impl BivariateExt for Clayton {
  fn r#type(&self) -> CopulaType {
    CopulaType::Clayton
  }

  fn theta(&self) -> f64 {
    self.theta
  }

  fn theta_bounds(&self) -> (f64, f64) {
    (0.0, f64::INFINITY)
  }

  fn invalid_thetas(&self) -> Vec<f64> {
    vec![0.0]
  }

  fn tau(&self) -> f64 {
    self.theta / (self.theta + 2.0)
  }

  fn hfunc(&self, u: f64, v: f64) -> f64 {
    let theta = self.theta;
    let a = v.powf(-theta - 1.0);

    if a.is_infinite() {
      return 0.0;
    }

    let b = u.powf(-theta) + v.powf(-theta) - 1.0;
    a * b.powf((-1.0 - theta) / theta)
  }

  fn hinv(&self, y: f64, v: f64) -> f64 {
    let theta = self.theta;
    let a = y.powf(theta / (-1.0 - theta));
    let b = v.powf(theta);

    if b == 0.0 {
      return 1.0;
    }

    ((a + b - 1.0) / b).powf(-1.0 / theta)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn tau_round_trip() {
    let c = Clayton::new(tau_to_theta(0.4));
    assert_abs_diff_eq!(c.tau(), 0.4, epsilon = 1e-12);
  }

  #[test]
  fn hfunc_matches_finite_difference_of_cdf() {
    let c = Clayton::new(3.0);
    let cdf = |u: f64, v: f64| (u.powf(-3.0) + v.powf(-3.0) - 1.0).powf(-1.0 / 3.0);
    let (u, v, dv) = (0.4, 0.6, 1e-6);
    let fd = (cdf(u, v + dv) - cdf(u, v - dv)) / (2.0 * dv);
    assert_abs_diff_eq!(c.hfunc(u, v), fd, epsilon = 1e-6);
  }
}
