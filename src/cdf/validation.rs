//! Ordered validation of a CDF call. Each stage inspects or transforms the
//! [`Context`] and the first failing stage aborts the call before anything is
//! sampled.
use ndarray::Array2;
use ndarray::Axis;
use tracing::debug;
use tracing::warn;

use super::MissingPolicy;
use super::Query;
use crate::error::VineCdfError;
use crate::traits::VineModelDescriptor;
use crate::traits::VineModelValidator;

/// State threaded through the stages of one call.
#[derive(Debug)]
pub struct Context<C> {
  /// Raw input, moved out by [`ShapeCheck`].
  pub query: Option<Query>,
  /// Canonical `N x d` table, filled by [`ShapeCheck`].
  pub table: Array2<f64>,
  pub is_point: bool,
  /// Rows excluded from sampling because of missing entries.
  pub missing: Vec<bool>,
  /// Filled by [`ModelPreparation`].
  pub canonical: Option<C>,
}

impl<C> Context<C> {
  pub fn new(query: Query) -> Self {
    Self {
      query: Some(query),
      table: Array2::zeros((0, 0)),
      is_point: false,
      missing: Vec::new(),
      canonical: None,
    }
  }
}

/// Output of a successful pipeline run.
#[derive(Debug)]
pub struct Validated<C> {
  pub table: Array2<f64>,
  pub is_point: bool,
  pub missing: Vec<bool>,
  pub canonical: C,
}

pub trait ValidationStage<V: VineModelValidator> {
  fn name(&self) -> &'static str;

  fn run(&self, ctx: &mut Context<V::Canonical>, model: &V::Model) -> Result<(), VineCdfError>;
}

/// Query must be a length-`d` point or a rectangular table with `d` columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeCheck;

impl ShapeCheck {
  fn table(query: Query, d: usize) -> Result<(Array2<f64>, bool), VineCdfError> {
    let mismatch = |found, row| VineCdfError::Shape {
      expected: d,
      found,
      row,
    };

    match query {
      Query::Point(point) => {
        if point.len() != d {
          return Err(mismatch(point.len(), None));
        }
        Ok((point.insert_axis(Axis(0)), true))
      }
      Query::Table(table) => {
        if table.ncols() != d {
          return Err(mismatch(table.ncols(), None));
        }
        Ok((table, false))
      }
      Query::Rows(rows) => {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != d) {
          return Err(mismatch(row.len(), Some(i)));
        }
        Ok((Array2::from_shape_fn((rows.len(), d), |(i, j)| rows[i][j]), false))
      }
    }
  }
}

impl<V: VineModelValidator> ValidationStage<V> for ShapeCheck {
  fn name(&self) -> &'static str {
    "shape"
  }

  fn run(&self, ctx: &mut Context<V::Canonical>, model: &V::Model) -> Result<(), VineCdfError> {
    // a second run finds the table already in place
    let Some(query) = ctx.query.take() else {
      return Ok(());
    };
    let (table, is_point) = Self::table(query, model.dim())?;
    ctx.missing = vec![false; table.nrows()];
    ctx.table = table;
    ctx.is_point = is_point;
    Ok(())
  }
}

/// Resolves `NaN` entries according to the configured [`MissingPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingValues {
  pub policy: MissingPolicy,
}

impl MissingValues {
  pub fn new(policy: MissingPolicy) -> Self {
    Self { policy }
  }
}

impl<V: VineModelValidator> ValidationStage<V> for MissingValues {
  fn name(&self) -> &'static str {
    "missing"
  }

  fn run(&self, ctx: &mut Context<V::Canonical>, _model: &V::Model) -> Result<(), VineCdfError> {
    match self.policy {
      MissingPolicy::Reject => {
        if let Some(((row, col), _)) = ctx.table.indexed_iter().find(|(_, v)| v.is_nan()) {
          return Err(VineCdfError::MissingValue { row, col });
        }
      }
      MissingPolicy::Propagate => {
        for (flag, row) in ctx.missing.iter_mut().zip(ctx.table.axis_iter(Axis(0))) {
          *flag = row.iter().any(|v| v.is_nan());
        }
        let marked = ctx.missing.iter().filter(|&&m| m).count();
        if marked > 0 {
          warn!(rows = marked, "query rows with missing values evaluate to NaN");
        }
      }
    }
    Ok(())
  }
}

/// Every present value must lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainCheck;

impl<V: VineModelValidator> ValidationStage<V> for DomainCheck {
  fn name(&self) -> &'static str {
    "domain"
  }

  fn run(&self, ctx: &mut Context<V::Canonical>, _model: &V::Model) -> Result<(), VineCdfError> {
    let outside = ctx
      .table
      .indexed_iter()
      .find(|(_, v)| !v.is_nan() && !(0.0..=1.0).contains(*v));

    match outside {
      Some(((row, col), &value)) => Err(VineCdfError::Domain { row, col, value }),
      None => Ok(()),
    }
  }
}

pub struct ModelConsistency<'v, V> {
  validator: &'v V,
}

impl<'v, V> ModelConsistency<'v, V> {
  pub fn new(validator: &'v V) -> Self {
    Self { validator }
  }
}

impl<V: VineModelValidator> ValidationStage<V> for ModelConsistency<'_, V> {
  fn name(&self) -> &'static str {
    "consistency"
  }

  fn run(&self, _ctx: &mut Context<V::Canonical>, model: &V::Model) -> Result<(), VineCdfError> {
    self.validator.check(model)
  }
}

pub struct ModelPreparation<'v, V> {
  validator: &'v V,
}

impl<'v, V> ModelPreparation<'v, V> {
  pub fn new(validator: &'v V) -> Self {
    Self { validator }
  }
}

impl<V: VineModelValidator> ValidationStage<V> for ModelPreparation<'_, V> {
  fn name(&self) -> &'static str {
    "preparation"
  }

  fn run(&self, ctx: &mut Context<V::Canonical>, model: &V::Model) -> Result<(), VineCdfError> {
    ctx.canonical = Some(self.validator.prepare(model)?);
    Ok(())
  }
}

/// Fixed sequence of stages; consistency is only present when parameter
/// checks are enabled.
pub struct Pipeline<'v, V: VineModelValidator> {
  stages: Vec<Box<dyn ValidationStage<V> + 'v>>,
}

impl<'v, V: VineModelValidator> Pipeline<'v, V> {
  pub fn new(validator: &'v V, missing: MissingPolicy, check_params: bool) -> Self {
    let mut stages: Vec<Box<dyn ValidationStage<V> + 'v>> = vec![
      Box::new(ShapeCheck),
      Box::new(MissingValues::new(missing)),
      Box::new(DomainCheck),
    ];
    if check_params {
      stages.push(Box::new(ModelConsistency::new(validator)));
    }
    stages.push(Box::new(ModelPreparation::new(validator)));

    Self { stages }
  }

  pub fn stage_names(&self) -> Vec<&'static str> {
    self.stages.iter().map(|s| s.name()).collect()
  }

  pub fn run(&self, query: Query, model: &V::Model) -> Result<Validated<V::Canonical>, VineCdfError> {
    let mut ctx = Context::new(query);

    for stage in &self.stages {
      if let Err(err) = stage.run(&mut ctx, model) {
        debug!(stage = stage.name(), %err, "validation failed");
        return Err(err);
      }
      debug!(stage = stage.name(), "validation stage passed");
    }

    let canonical = ctx.canonical.ok_or_else(|| {
      VineCdfError::Preparation("pipeline finished without a prepared model".into())
    })?;

    Ok(Validated {
      table: ctx.table,
      is_point: ctx.is_point,
      missing: ctx.missing,
      canonical,
    })
  }
}
