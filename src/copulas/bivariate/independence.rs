use super::BivariateExt;
use super::CopulaType;

/// Product copula C(u,v) = uv.
#[derive(Debug, Clone, Default)]
pub struct Independence;

impl BivariateExt for Independence {
  fn r#type(&self) -> CopulaType {
    CopulaType::Independence
  }

  fn theta(&self) -> f64 {
    0.0
  }

  fn theta_bounds(&self) -> (f64, f64) {
    (0.0, 0.0)
  }

  fn tau(&self) -> f64 {
    0.0
  }

  fn hfunc(&self, u: f64, _v: f64) -> f64 {
    u
  }

  fn hinv(&self, y: f64, _v: f64) -> f64 {
    y
  }
}
