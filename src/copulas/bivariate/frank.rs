use gauss_quad::GaussLegendre;
use impl_new_derive::ImplNew;
use roots::find_root_brent;
use roots::SimpleConvergency;

use super::BivariateExt;
use super::CopulaType;

/// Frank copula, radially symmetric, θ ≠ 0:
/// C(u,v) = -1/θ ln(1 + (e^-θu - 1)(e^-θv - 1) / (e^-θ - 1))
#[derive(ImplNew, Debug, Clone)]
pub struct Frank {
  pub theta: f64,
}

/// First Debye function D1(x) = 1/x ∫_0^x t / (e^t - 1) dt for x > 0.
fn debye1(x: f64) -> Result<f64, String> {
  let quad = GaussLegendre::new(32).map_err(|e| format!("{e:?}"))?;
  let integral = quad.integrate(0.0, x, |t: f64| {
    if t == 0.0 {
      1.0
    } else {
      t / t.exp_m1()
    }
  });
  Ok(integral / x)
}

pub(crate) fn theta_to_tau(theta: f64) -> Result<f64, String> {
  if theta == 0.0 {
    return Ok(0.0);
  }
  let a = theta.abs();
  let tau = 1.0 - 4.0 / a * (1.0 - debye1(a)?);
  Ok(tau.copysign(theta))
}

pub(crate) fn tau_to_theta(tau: f64) -> Result<f64, String> {
  if tau.abs() < 1e-10 {
    return Ok(0.0);
  }

  let target = tau.abs();
  let mut upper = 10.0;
  while theta_to_tau(upper)? < target {
    upper *= 2.0;
    if upper > 1e6 {
      return Err(format!("Frank theta for tau {tau} is out of numerical range"));
    }
  }

  let f = |theta: f64| theta_to_tau(theta).unwrap_or(f64::NAN) - target;
  let mut convergency = SimpleConvergency {
    eps: 1e-12,
    max_iter: 200,
  };
  let theta = find_root_brent(1e-8, upper, f, &mut convergency)
    .map_err(|e| format!("Frank tau inversion failed: {e:?}"))?;
  Ok(theta.copysign(tau))
}

impl BivariateExt for Frank {
  fn r#type(&self) -> CopulaType {
    CopulaType::Frank
  }

  fn theta(&self) -> f64 {
    self.theta
  }

  fn theta_bounds(&self) -> (f64, f64) {
    (f64::NEG_INFINITY, f64::INFINITY)
  }

  fn invalid_thetas(&self) -> Vec<f64> {
    vec![0.0]
  }

  fn tau(&self) -> f64 {
    theta_to_tau(self.theta).unwrap_or(f64::NAN)
  }

  fn hfunc(&self, u: f64, v: f64) -> f64 {
    let theta = self.theta;
    let a = (-theta * u).exp_m1();
    let b = (-theta * v).exp_m1();
    let c = (-theta).exp_m1();
    (b + 1.0) * a / (c + a * b)
  }

  fn hinv(&self, y: f64, v: f64) -> f64 {
    let theta = self.theta;
    let b = (-theta * v).exp_m1();
    let c = (-theta).exp_m1();
    -(y * c / (1.0 + b * (1.0 - y))).ln_1p() / theta
  }
}
