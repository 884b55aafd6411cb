//! # Bivariate
//!
//! $$
//! h(u\mid v)=\frac{\partial C(u,v)}{\partial v}=\mathbb P(U\le u\mid V=v)
//! $$
//!
use std::fmt::Debug;

use ndarray::Array1;
use ndarray::ArrayView1;
use ndarray::Zip;

pub mod clayton;
pub mod frank;
pub mod gaussian;
pub mod gumbel;
pub mod independence;
pub mod student;

use clayton::Clayton;
use frank::Frank;
use gaussian::Gaussian;
use gumbel::Gumbel;
use independence::Independence;
use student::StudentT;

/// Uniforms are kept inside `[EPS, 1 - EPS]` before any quantile transform.
pub const EPS: f64 = 1e-12;

pub(crate) fn clamp_unit(x: f64) -> f64 {
  x.clamp(EPS, 1.0 - EPS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopulaType {
  Independence,
  Gaussian,
  StudentT,
  Clayton,
  Gumbel,
  Frank,
}

impl CopulaType {
  /// Families whose copula is invariant under the 180 degree rotation.
  pub fn is_radially_symmetric(&self) -> bool {
    matches!(
      self,
      CopulaType::Independence | CopulaType::Gaussian | CopulaType::StudentT | CopulaType::Frank
    )
  }
}

/// Counter-clockwise rotation of a copula density. `R180` is the survival copula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
  #[default]
  R0,
  R90,
  R180,
  R270,
}

impl Rotation {
  /// Whether the first/second margin is reflected (`u -> 1 - u`).
  fn flips(&self) -> (bool, bool) {
    match self {
      Rotation::R0 => (false, false),
      Rotation::R90 => (true, false),
      Rotation::R180 => (true, true),
      Rotation::R270 => (false, true),
    }
  }

  /// Sign the rotation imposes on Kendall's tau.
  pub fn tau_sign(&self) -> f64 {
    match self {
      Rotation::R0 | Rotation::R180 => 1.0,
      Rotation::R90 | Rotation::R270 => -1.0,
    }
  }

  /// The rotation with the same tail orientation but opposite dependence sign.
  fn counterpart(&self) -> Self {
    match self {
      Rotation::R0 => Rotation::R90,
      Rotation::R90 => Rotation::R0,
      Rotation::R180 => Rotation::R270,
      Rotation::R270 => Rotation::R180,
    }
  }
}

/// Pair-copula family with a resolved parameter.
///
/// `hfunc` conditions the first argument on the second. All implemented
/// families are exchangeable, so conditioning the other way is `hfunc(v, u)`.
pub trait BivariateExt: Debug + Send + Sync {
  fn r#type(&self) -> CopulaType;

  fn theta(&self) -> f64;

  fn theta_bounds(&self) -> (f64, f64);

  fn invalid_thetas(&self) -> Vec<f64> {
    vec![]
  }

  fn check_theta(&self) -> Result<(), String> {
    let (lower, upper) = self.theta_bounds();
    let theta = self.theta();
    let invalid = self.invalid_thetas();

    if !theta.is_finite() || !(lower <= theta && theta <= upper) || invalid.contains(&theta) {
      return Err(format!(
        "{:?} theta must be finite, in the interval [{}, {}] and not in {:?}, got {}",
        self.r#type(),
        lower,
        upper,
        invalid,
        theta
      ));
    }

    Ok(())
  }

  /// Kendall's tau implied by the parameter.
  fn tau(&self) -> f64;

  fn hfunc(&self, u: f64, v: f64) -> f64;

  /// Inverse of `hfunc` in its first argument.
  fn hinv(&self, y: f64, v: f64) -> f64;
}

/// User-facing pair-copula specification attached to one vine edge.
///
/// Either `theta` or `tau` must be given (except for the independence copula);
/// `theta` takes precedence. `nu` is required by the Student-t family.
#[derive(Debug, Clone, PartialEq)]
pub struct PairCopula {
  pub r#type: CopulaType,
  pub rotation: Rotation,
  pub theta: Option<f64>,
  pub tau: Option<f64>,
  pub nu: Option<f64>,
}

impl PairCopula {
  fn with_theta(r#type: CopulaType, theta: f64) -> Self {
    Self {
      r#type,
      rotation: Rotation::R0,
      theta: Some(theta),
      tau: None,
      nu: None,
    }
  }

  pub fn independence() -> Self {
    Self {
      r#type: CopulaType::Independence,
      rotation: Rotation::R0,
      theta: None,
      tau: None,
      nu: None,
    }
  }

  pub fn gaussian(rho: f64) -> Self {
    Self::with_theta(CopulaType::Gaussian, rho)
  }

  pub fn student_t(rho: f64, nu: f64) -> Self {
    Self {
      nu: Some(nu),
      ..Self::with_theta(CopulaType::StudentT, rho)
    }
  }

  pub fn clayton(theta: f64) -> Self {
    Self::with_theta(CopulaType::Clayton, theta)
  }

  pub fn gumbel(theta: f64) -> Self {
    Self::with_theta(CopulaType::Gumbel, theta)
  }

  pub fn frank(theta: f64) -> Self {
    Self::with_theta(CopulaType::Frank, theta)
  }

  /// Parameterize by Kendall's tau; the sign of `tau` may select a rotation
  /// during preparation.
  pub fn from_tau(r#type: CopulaType, tau: f64) -> Self {
    Self {
      r#type,
      rotation: Rotation::R0,
      theta: None,
      tau: Some(tau),
      nu: None,
    }
  }

  pub fn rotated(mut self, rotation: Rotation) -> Self {
    self.rotation = rotation;
    self
  }

  pub fn with_nu(mut self, nu: f64) -> Self {
    self.nu = Some(nu);
    self
  }

  /// Parameter consistency as stated, without resolving tau.
  pub fn check(&self) -> Result<(), String> {
    if self.r#type == CopulaType::StudentT {
      match self.nu {
        Some(nu) if nu.is_finite() && nu > 2.0 => {}
        Some(nu) => return Err(format!("StudentT degrees of freedom must exceed 2, got {nu}")),
        None => return Err("StudentT copula requires degrees of freedom".into()),
      }
    }

    if self.r#type == CopulaType::Independence {
      return Ok(());
    }

    match (self.theta, self.tau) {
      (Some(theta), _) => build(self.r#type, theta, self.nu)?.check_theta(),
      (None, Some(tau)) if tau.is_finite() && tau > -1.0 && tau < 1.0 => Ok(()),
      (None, Some(tau)) => Err(format!("Tau must be in the interval (-1, 1), got {tau}")),
      (None, None) => Err(format!("{:?} copula requires theta or tau", self.r#type)),
    }
  }

  /// Resolves tau, folds rotations of radially symmetric families into the
  /// parameter sign and degenerates zero-dependence members to independence.
  pub fn resolve(&self) -> Result<RotatedCopula, String> {
    if self.r#type == CopulaType::Independence {
      return Ok(RotatedCopula::new(Box::new(Independence), Rotation::R0));
    }

    let mut rotation = self.rotation;
    let theta = match (self.theta, self.tau) {
      (Some(theta), _) => theta,
      (None, Some(tau)) => {
        let mut base_tau = tau * rotation.tau_sign();
        if !self.r#type.is_radially_symmetric() && base_tau < 0.0 {
          rotation = rotation.counterpart();
          base_tau = -base_tau;
        }
        tau_to_theta(self.r#type, base_tau)?
      }
      (None, None) => return Err(format!("{:?} copula requires theta or tau", self.r#type)),
    };

    let (theta, rotation) = if self.r#type.is_radially_symmetric() {
      (theta * rotation.tau_sign(), Rotation::R0)
    } else {
      (theta, rotation)
    };

    let degenerate = match self.r#type {
      CopulaType::Clayton | CopulaType::Frank => theta == 0.0,
      CopulaType::Gaussian => theta == 0.0,
      CopulaType::Gumbel => theta == 1.0,
      _ => false,
    };
    if degenerate {
      return Ok(RotatedCopula::new(Box::new(Independence), Rotation::R0));
    }

    let copula = build(self.r#type, theta, self.nu)?;
    copula.check_theta()?;
    Ok(RotatedCopula::new(copula, rotation))
  }
}

fn build(r#type: CopulaType, theta: f64, nu: Option<f64>) -> Result<Box<dyn BivariateExt>, String> {
  let copula: Box<dyn BivariateExt> = match r#type {
    CopulaType::Independence => Box::new(Independence),
    CopulaType::Gaussian => Box::new(Gaussian::new(theta)),
    CopulaType::StudentT => {
      let nu = nu.ok_or("StudentT copula requires degrees of freedom")?;
      Box::new(StudentT::new(theta, nu))
    }
    CopulaType::Clayton => Box::new(Clayton::new(theta)),
    CopulaType::Gumbel => Box::new(Gumbel::new(theta)),
    CopulaType::Frank => Box::new(Frank::new(theta)),
  };
  Ok(copula)
}

/// Copula parameter matching Kendall's tau for the unrotated family.
pub fn tau_to_theta(r#type: CopulaType, tau: f64) -> Result<f64, String> {
  if !(tau.is_finite() && tau > -1.0 && tau < 1.0) {
    return Err(format!("Tau must be in the interval (-1, 1), got {tau}"));
  }

  match r#type {
    CopulaType::Independence => Ok(0.0),
    CopulaType::Gaussian | CopulaType::StudentT => Ok(gaussian::tau_to_rho(tau)),
    CopulaType::Clayton => Ok(clayton::tau_to_theta(tau)),
    CopulaType::Gumbel => Ok(gumbel::tau_to_theta(tau)),
    CopulaType::Frank => frank::tau_to_theta(tau),
  }
}

/// A resolved family together with its rotation. Arguments follow the edge
/// orientation: `u1` belongs to the first conditioned variable.
#[derive(Debug)]
pub struct RotatedCopula {
  pub copula: Box<dyn BivariateExt>,
  pub rotation: Rotation,
}

impl RotatedCopula {
  pub fn new(copula: Box<dyn BivariateExt>, rotation: Rotation) -> Self {
    Self { copula, rotation }
  }

  pub fn r#type(&self) -> CopulaType {
    self.copula.r#type()
  }

  pub fn tau(&self) -> f64 {
    self.rotation.tau_sign() * self.copula.tau()
  }

  /// `P(U1 <= u1 | U2 = u2)`.
  pub fn hfunc2(&self, u1: ArrayView1<f64>, u2: ArrayView1<f64>) -> Array1<f64> {
    let (f1, f2) = self.rotation.flips();
    Zip::from(&u1).and(&u2).map_collect(|&a, &b| {
      let a = reflect(clamp_unit(a), f1);
      let b = reflect(clamp_unit(b), f2);
      clamp_unit(reflect(self.copula.hfunc(a, b), f1))
    })
  }

  /// `P(U2 <= u2 | U1 = u1)`.
  pub fn hfunc1(&self, u1: ArrayView1<f64>, u2: ArrayView1<f64>) -> Array1<f64> {
    let (f1, f2) = self.rotation.flips();
    Zip::from(&u1).and(&u2).map_collect(|&a, &b| {
      let a = reflect(clamp_unit(a), f1);
      let b = reflect(clamp_unit(b), f2);
      clamp_unit(reflect(self.copula.hfunc(b, a), f2))
    })
  }

  /// Solves `hfunc2(u1, u2) = y` for `u1`.
  pub fn hinv2(&self, y: ArrayView1<f64>, u2: ArrayView1<f64>) -> Array1<f64> {
    let (f1, f2) = self.rotation.flips();
    Zip::from(&y).and(&u2).map_collect(|&y, &b| {
      let y = reflect(clamp_unit(y), f1);
      let b = reflect(clamp_unit(b), f2);
      clamp_unit(reflect(self.copula.hinv(y, b), f1))
    })
  }

  /// Solves `hfunc1(u1, u2) = y` for `u2`.
  pub fn hinv1(&self, y: ArrayView1<f64>, u1: ArrayView1<f64>) -> Array1<f64> {
    let (f1, f2) = self.rotation.flips();
    Zip::from(&y).and(&u1).map_collect(|&y, &a| {
      let y = reflect(clamp_unit(y), f2);
      let a = reflect(clamp_unit(a), f1);
      clamp_unit(reflect(self.copula.hinv(y, a), f2))
    })
  }
}

fn reflect(x: f64, flip: bool) -> f64 {
  if flip {
    1.0 - x
  } else {
    x
  }
}
