//! # Errors
//!
//! $$
//! \text{validate}(\text{query},\text{model})\to \text{ctx}\ \lor\ \text{error}
//! $$
//!
use thiserror::Error;

/// Every way a CDF evaluation can fail. Validation variants are raised before
/// any sampling happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VineCdfError {
  #[error("query has {found} columns but the model has dimension {expected}{}", row_suffix(.row))]
  Shape {
    expected: usize,
    found: usize,
    row: Option<usize>,
  },
  #[error("query value {value} at row {row}, column {col} is outside [0, 1]")]
  Domain { row: usize, col: usize, value: f64 },
  #[error("query value at row {row}, column {col} is missing")]
  MissingValue { row: usize, col: usize },
  #[error("inconsistent vine model: {0}")]
  Consistency(String),
  #[error("vine model could not be prepared for sampling: {0}")]
  Preparation(String),
  #[error("sampler failed: {0}")]
  Sampler(String),
  #[error("sample count must be positive, got {0}")]
  SampleSize(usize),
}

fn row_suffix(row: &Option<usize>) -> String {
  match row {
    Some(r) => format!(" (row {r})"),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shape_message_names_row_when_known() {
    let err = VineCdfError::Shape {
      expected: 3,
      found: 2,
      row: Some(4),
    };
    assert_eq!(
      err.to_string(),
      "query has 2 columns but the model has dimension 3 (row 4)"
    );

    let err = VineCdfError::Shape {
      expected: 3,
      found: 4,
      row: None,
    };
    assert_eq!(
      err.to_string(),
      "query has 4 columns but the model has dimension 3"
    );
  }
}
