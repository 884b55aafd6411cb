//! Fans validated query rows out to [`estimate_point`], keeping input order.
//! Nothing here re-runs validation.
use ndarray::Array1;
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use super::estimator::estimate_point;
use super::validation::Validated;
use super::CdfEstimate;
use crate::error::VineCdfError;
use crate::traits::VineSampler;

/// Sequential path: rows consume `rng` in order, so a batch gives the same
/// values as the equivalent sequence of single-point calls.
pub fn dispatch<C, S, R>(
  validated: &Validated<C>,
  n: usize,
  sampler: &S,
  rng: &mut R,
) -> Result<CdfEstimate, VineCdfError>
where
  S: VineSampler<C> + ?Sized,
  R: Rng + ?Sized,
{
  let mut values = Vec::with_capacity(validated.table.nrows());
  for (row, &missing) in validated.table.axis_iter(Axis(0)).zip(&validated.missing) {
    let p = if missing {
      f64::NAN
    } else {
      estimate_point(row, n, &validated.canonical, sampler, rng)?
    };
    values.push(p);
  }

  Ok(collect(validated, values))
}

/// Parallel path: row `i` draws from its own generator seeded with
/// [`row_seed`]`(seed, i)`.
pub fn dispatch_par<C, S>(
  validated: &Validated<C>,
  n: usize,
  sampler: &S,
  seed: u64,
) -> Result<CdfEstimate, VineCdfError>
where
  C: Sync,
  S: VineSampler<C> + Sync + ?Sized,
{
  let values = (0..validated.table.nrows())
    .into_par_iter()
    .map(|i| {
      if validated.missing[i] {
        return Ok(f64::NAN);
      }
      let mut rng = StdRng::seed_from_u64(row_seed(seed, i));
      estimate_point(
        validated.table.row(i),
        n,
        &validated.canonical,
        sampler,
        &mut rng,
      )
    })
    .collect::<Result<Vec<f64>, VineCdfError>>()?;

  Ok(collect(validated, values))
}

/// Seed of the generator for row `row`; distinct rows get distinct streams.
pub fn row_seed(seed: u64, row: usize) -> u64 {
  seed
    .wrapping_mul(0x9E37_79B9_7F4A_7C15)
    .wrapping_add(row as u64)
}

fn collect<C>(validated: &Validated<C>, values: Vec<f64>) -> CdfEstimate {
  debug!(rows = values.len(), "query rows estimated");
  if validated.is_point {
    CdfEstimate::Point(values.first().copied().unwrap_or(f64::NAN))
  } else {
    CdfEstimate::Batch(Array1::from_vec(values))
  }
}
