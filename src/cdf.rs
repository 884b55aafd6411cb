//! # CDF
//!
//! $$
//! \hat F_n(u)=\frac{1}{n}\sum_{i=1}^n \mathbf 1\{U^{(i)}\le u\},\qquad
//! \operatorname{Var}\hat F_n(u)=\frac{F(u)(1-F(u))}{n}
//! $$
//!
//! Monte Carlo evaluation of a vine copula CDF. [`VineCdf::evaluate`] runs the
//! validation pipeline once per call, then fans the validated rows out to the
//! single-point estimator.
//!
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use rand::Rng;
use tracing::info;

use crate::copulas::vine::RVineModel;
use crate::copulas::vine::RVineSampler;
use crate::copulas::vine::RVineValidator;
use crate::error::VineCdfError;
use crate::traits::VineModelValidator;
use crate::traits::VineSampler;

pub mod dispatch;
pub mod estimator;
pub mod validation;

use dispatch::dispatch;
use dispatch::dispatch_par;
use validation::Pipeline;
use validation::Validated;

pub const DEFAULT_SAMPLES: usize = 10_000;

/// Raw query as handed in by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
  /// A single point of length `d`.
  Point(Array1<f64>),
  /// An `N x d` batch.
  Table(Array2<f64>),
  /// A batch given as row lists, not yet known to be rectangular.
  Rows(Vec<Vec<f64>>),
}

impl From<Array1<f64>> for Query {
  fn from(point: Array1<f64>) -> Self {
    Query::Point(point)
  }
}

impl From<ArrayView1<'_, f64>> for Query {
  fn from(point: ArrayView1<'_, f64>) -> Self {
    Query::Point(point.to_owned())
  }
}

impl From<Vec<f64>> for Query {
  fn from(point: Vec<f64>) -> Self {
    Query::Point(Array1::from_vec(point))
  }
}

impl From<&[f64]> for Query {
  fn from(point: &[f64]) -> Self {
    Query::Point(Array1::from_vec(point.to_vec()))
  }
}

impl<const D: usize> From<[f64; D]> for Query {
  fn from(point: [f64; D]) -> Self {
    Query::Point(Array1::from_vec(point.to_vec()))
  }
}

impl From<Array2<f64>> for Query {
  fn from(table: Array2<f64>) -> Self {
    Query::Table(table)
  }
}

impl From<ArrayView2<'_, f64>> for Query {
  fn from(table: ArrayView2<'_, f64>) -> Self {
    Query::Table(table.to_owned())
  }
}

impl From<Vec<Vec<f64>>> for Query {
  fn from(rows: Vec<Vec<f64>>) -> Self {
    Query::Rows(rows)
  }
}

/// Estimated CDF value(s), shaped like the query.
#[derive(Debug, Clone, PartialEq)]
pub enum CdfEstimate {
  Point(f64),
  Batch(Array1<f64>),
}

impl CdfEstimate {
  pub fn as_point(&self) -> Option<f64> {
    match self {
      CdfEstimate::Point(p) => Some(*p),
      CdfEstimate::Batch(_) => None,
    }
  }

  pub fn as_batch(&self) -> Option<&Array1<f64>> {
    match self {
      CdfEstimate::Point(_) => None,
      CdfEstimate::Batch(b) => Some(b),
    }
  }

  /// All estimates as one array; a point becomes a length-one array.
  pub fn into_array(self) -> Array1<f64> {
    match self {
      CdfEstimate::Point(p) => Array1::from_elem(1, p),
      CdfEstimate::Batch(b) => b,
    }
  }
}

/// Treatment of `NaN` entries in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
  /// Fail with [`VineCdfError::MissingValue`].
  #[default]
  Reject,
  /// Skip the affected rows and report `NaN` for them.
  Propagate,
}

/// Monte Carlo estimator of a vine copula CDF.
///
/// ```ignore
/// let cdf = VineCdf::new().n(50_000);
/// let p = cdf.evaluate([0.1, 0.2, 0.3], &model, &mut rng)?;
/// ```
#[derive(Debug, Clone)]
pub struct VineCdf<V = RVineValidator, S = RVineSampler> {
  n: usize,
  check_params: bool,
  missing: MissingPolicy,
  validator: V,
  sampler: S,
}

impl VineCdf {
  /// Reference collaborators, `n = 10_000`, parameter checks on, missing
  /// values rejected.
  pub fn new() -> Self {
    Self::with_collaborators(RVineValidator::new(), RVineSampler::new())
  }
}

impl Default for VineCdf {
  fn default() -> Self {
    Self::new()
  }
}

impl<V, S> VineCdf<V, S> {
  pub fn with_collaborators(validator: V, sampler: S) -> Self {
    Self {
      n: DEFAULT_SAMPLES,
      check_params: true,
      missing: MissingPolicy::default(),
      validator,
      sampler,
    }
  }

  /// Number of joint samples drawn per query point.
  pub fn n(mut self, n: usize) -> Self {
    self.n = n;
    self
  }

  /// Whether the model consistency check runs before sampling.
  pub fn check_params(mut self, check_params: bool) -> Self {
    self.check_params = check_params;
    self
  }

  pub fn missing_policy(mut self, missing: MissingPolicy) -> Self {
    self.missing = missing;
    self
  }

  pub fn samples(&self) -> usize {
    self.n
  }

  pub fn validator(&self) -> &V {
    &self.validator
  }

  pub fn sampler(&self) -> &S {
    &self.sampler
  }
}

impl<V, S> VineCdf<V, S>
where
  V: VineModelValidator,
  S: VineSampler<V::Canonical>,
{
  /// Validates `query` against `model` and estimates the CDF at every query
  /// row, drawing all randomness from `rng` in row order.
  pub fn evaluate<Q, R>(
    &self,
    query: Q,
    model: &V::Model,
    rng: &mut R,
  ) -> Result<CdfEstimate, VineCdfError>
  where
    Q: Into<Query>,
    R: Rng + ?Sized,
  {
    let validated = self.validate(query.into(), model)?;
    info!(
      rows = validated.table.nrows(),
      n = self.n,
      point = validated.is_point,
      "evaluating vine cdf"
    );
    dispatch(&validated, self.n, &self.sampler, rng)
  }

  fn validate(&self, query: Query, model: &V::Model) -> Result<Validated<V::Canonical>, VineCdfError> {
    if self.n == 0 {
      return Err(VineCdfError::SampleSize(self.n));
    }
    Pipeline::new(&self.validator, self.missing, self.check_params).run(query, model)
  }
}

impl<V, S> VineCdf<V, S>
where
  V: VineModelValidator,
  V::Canonical: Sync,
  S: VineSampler<V::Canonical> + Sync,
{
  /// Parallel counterpart of [`VineCdf::evaluate`]. Row `i` draws from its own
  /// generator derived from `(seed, i)`, so the result depends on the seed only.
  pub fn evaluate_par<Q>(
    &self,
    query: Q,
    model: &V::Model,
    seed: u64,
  ) -> Result<CdfEstimate, VineCdfError>
  where
    Q: Into<Query>,
  {
    let validated = self.validate(query.into(), model)?;
    info!(
      rows = validated.table.nrows(),
      n = self.n,
      seed,
      "evaluating vine cdf in parallel"
    );
    dispatch_par(&validated, self.n, &self.sampler, seed)
  }
}

/// Estimates the CDF of an [`RVineModel`] with `n` samples per point, using
/// the thread-local generator.
pub fn rvine_cdf<Q>(query: Q, model: &RVineModel, n: usize) -> Result<CdfEstimate, VineCdfError>
where
  Q: Into<Query>,
{
  VineCdf::new()
    .n(n)
    .evaluate(query, model, &mut rand::thread_rng())
}
