use impl_new_derive::ImplNew;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use super::BivariateExt;
use super::CopulaType;

/// Gaussian copula with correlation ρ ∈ (-1, 1):
/// h(u|v) = Φ((Φ⁻¹(u) - ρΦ⁻¹(v)) / √(1-ρ²))
#[derive(ImplNew, Debug, Clone)]
pub struct Gaussian {
  pub rho: f64,
}

/// Greiner's relation, shared by the elliptical families.
pub(crate) fn tau_to_rho(tau: f64) -> f64 {
  (std::f64::consts::PI * 0.5 * tau).sin()
}

pub(crate) fn rho_to_tau(rho: f64) -> f64 {
  2.0 / std::f64::consts::PI * rho.asin()
}

fn std_normal() -> Normal {
  Normal::new(0.0, 1.0).expect("standard normal parameters are valid")
}

impl BivariateExt for Gaussian {
  fn r#type(&self) -> CopulaType {
    CopulaType::Gaussian
  }

  fn theta(&self) -> f64 {
    self.rho
  }

  fn theta_bounds(&self) -> (f64, f64) {
    (-1.0, 1.0)
  }

  fn invalid_thetas(&self) -> Vec<f64> {
    vec![-1.0, 1.0]
  }

  fn tau(&self) -> f64 {
    rho_to_tau(self.rho)
  }

  fn hfunc(&self, u: f64, v: f64) -> f64 {
    let n = std_normal();
    let x = n.inverse_cdf(u);
    let y = n.inverse_cdf(v);
    n.cdf((x - self.rho * y) / (1.0 - self.rho * self.rho).sqrt())
  }

  fn hinv(&self, y: f64, v: f64) -> f64 {
    let n = std_normal();
    let z = n.inverse_cdf(y);
    let w = n.inverse_cdf(v);
    n.cdf(z * (1.0 - self.rho * self.rho).sqrt() + self.rho * w)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn zero_correlation_is_independence() {
    let g = Gaussian::new(0.0);
    assert_abs_diff_eq!(g.hfunc(0.3, 0.9), 0.3, epsilon = 1e-12);
  }

  #[test]
  fn greiner_relation_round_trips() {
    assert_abs_diff_eq!(rho_to_tau(tau_to_rho(0.37)), 0.37, epsilon = 1e-12);
    assert_abs_diff_eq!(Gaussian::new(0.5).tau(), 1.0 / 3.0, epsilon = 1e-12);
  }
}
