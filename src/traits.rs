//! # Traits
//!
//! $$
//! \text{Collaborator contracts: }\mathcal{V}:\text{model}\to\text{canonical},\quad
//! \mathcal{S}:(n,\text{canonical})\to[0,1]^{n\times d}
//! $$
//!
use ndarray::Array2;
use rand::Rng;

use crate::error::VineCdfError;

/// Read-only view of a vine model owned by the caller.
pub trait VineModelDescriptor {
  fn dim(&self) -> usize;

  fn names(&self) -> Option<&[String]> {
    None
  }
}

/// Structural/parametric consistency checks and canonicalization of a model.
pub trait VineModelValidator {
  type Model: VineModelDescriptor;
  type Canonical;

  /// Fails with [`VineCdfError::Consistency`] when the model is not a valid vine.
  fn check(&self, model: &Self::Model) -> Result<(), VineCdfError>;

  /// Produces the representation the sampler consumes. Failures are reported as
  /// [`VineCdfError::Preparation`].
  fn prepare(&self, model: &Self::Model) -> Result<Self::Canonical, VineCdfError>;
}

/// Joint sample generator for a canonical model.
pub trait VineSampler<C> {
  /// Draws an `n x d` matrix; each row an independent joint draw with
  /// `Uniform(0,1)` marginals.
  fn sample<R: Rng + ?Sized>(
    &self,
    n: usize,
    model: &C,
    rng: &mut R,
  ) -> Result<Array2<f64>, VineCdfError>;
}
