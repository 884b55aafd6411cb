use impl_new_derive::ImplNew;
use roots::find_root_brent;
use roots::SimpleConvergency;

use super::BivariateExt;
use super::CopulaType;
use super::EPS;

/// Gumbel copula, upper tail dependent:
/// C(u,v) = exp(-((-ln u)^θ + (-ln v)^θ)^(1/θ)), θ >= 1
#[derive(ImplNew, Debug, Clone)]
pub struct Gumbel {
  pub theta: f64,
}

pub(crate) fn tau_to_theta(tau: f64) -> f64 {
  1.0 / (1.0 - tau)
}

impl Gumbel {
  fn cdf(&self, u: f64, v: f64) -> f64 {
    let h = (-u.ln()).powf(self.theta) + (-v.ln()).powf(self.theta);
    (-h.powf(1.0 / self.theta)).exp()
  }
}

impl BivariateExt for Gumbel {
  fn r#type(&self) -> CopulaType {
    CopulaType::Gumbel
  }

  fn theta(&self) -> f64 {
    self.theta
  }

  fn theta_bounds(&self) -> (f64, f64) {
    (1.0, f64::INFINITY)
  }

  fn tau(&self) -> f64 {
    1.0 - 1.0 / self.theta
  }

  fn hfunc(&self, u: f64, v: f64) -> f64 {
    let theta = self.theta;

    if theta == 1.0 {
      return u;
    }

    let t1 = (-u.ln()).powf(theta);
    let t2 = (-v.ln()).powf(theta);
    let p1 = self.cdf(u, v);
    let p2 = (t1 + t2).powf(-1.0 + 1.0 / theta);
    let p3 = (-v.ln()).powf(theta - 1.0);
    p1 * p2 * p3 / v
  }

  fn hinv(&self, y: f64, v: f64) -> f64 {
    if self.theta == 1.0 {
      return y;
    }

    let f = |u: f64| self.hfunc(u, v) - y;
    let (lo, hi) = (EPS, 1.0 - EPS);
    if f(lo) >= 0.0 {
      return lo;
    }
    if f(hi) <= 0.0 {
      return hi;
    }

    let mut convergency = SimpleConvergency {
      eps: 1e-14,
      max_iter: 100,
    };
    find_root_brent(lo, hi, f, &mut convergency).unwrap_or(y)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn hinv_solves_hfunc() {
    let g = Gumbel::new(2.2);
    for &(u, v) in &[(0.1, 0.8), (0.5, 0.5), (0.93, 0.07)] {
      let y = g.hfunc(u, v);
      assert_abs_diff_eq!(g.hinv(y, v), u, epsilon = 1e-8);
    }
  }

  #[test]
  fn tau_round_trip() {
    let g = Gumbel::new(tau_to_theta(0.25));
    assert_abs_diff_eq!(g.tau(), 0.25, epsilon = 1e-12);
  }
}
