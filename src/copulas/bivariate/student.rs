use impl_new_derive::ImplNew;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::StudentsT;

use super::gaussian::rho_to_tau;
use super::BivariateExt;
use super::CopulaType;

/// Student-t copula with correlation ρ ∈ (-1, 1) and ν > 2 degrees of freedom.
#[derive(ImplNew, Debug, Clone)]
pub struct StudentT {
  pub rho: f64,
  pub nu: f64,
}

impl StudentT {
  fn dist(nu: f64) -> Option<StudentsT> {
    StudentsT::new(0.0, 1.0, nu).ok()
  }

  fn scale(&self, y: f64) -> f64 {
    ((self.nu + y * y) * (1.0 - self.rho * self.rho) / (self.nu + 1.0)).sqrt()
  }
}

impl BivariateExt for StudentT {
  fn r#type(&self) -> CopulaType {
    CopulaType::StudentT
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

  fn check_theta(&self) -> Result<(), String> {
    if !(self.rho.is_finite() && self.rho > -1.0 && self.rho < 1.0) {
      return Err(format!("StudentT rho must be in (-1, 1), got {}", self.rho));
    }
    if !(self.nu.is_finite() && self.nu > 2.0) {
      return Err(format!("StudentT degrees of freedom must exceed 2, got {}", self.nu));
    }
    Ok(())
  }

  fn tau(&self) -> f64 {
    rho_to_tau(self.rho)
  }

  fn hfunc(&self, u: f64, v: f64) -> f64 {
    let (Some(t), Some(t1)) = (Self::dist(self.nu), Self::dist(self.nu + 1.0)) else {
      return f64::NAN;
    };
    let x = t.inverse_cdf(u);
    let y = t.inverse_cdf(v);
    t1.cdf((x - self.rho * y) / self.scale(y))
  }

  fn hinv(&self, y: f64, v: f64) -> f64 {
    let (Some(t), Some(t1)) = (Self::dist(self.nu), Self::dist(self.nu + 1.0)) else {
      return f64::NAN;
    };
    let w = t.inverse_cdf(v);
    let z = t1.inverse_cdf(y);
    t.cdf(z * self.scale(w) + self.rho * w)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn hinv_solves_hfunc() {
    let t = StudentT::new(-0.35, 5.0);
    let y = t.hfunc(0.2, 0.65);
    assert_abs_diff_eq!(t.hinv(y, 0.65), 0.2, epsilon = 1e-6);
  }

  #[test]
  fn check_rejects_low_degrees_of_freedom() {
    assert!(StudentT::new(0.2, 2.0).check_theta().is_err());
    assert!(StudentT::new(0.2, 3.0).check_theta().is_ok());
  }
}
