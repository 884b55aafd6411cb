//! # vine-cdf
//!
//! $$
//! F(u_1,\dots,u_d)=P(U_1\le u_1,\dots,U_d\le u_d)\approx\frac{1}{n}\sum_{i=1}^n\mathbf 1\{U^{(i)}\le u\}
//! $$
//!
//! Monte Carlo evaluation of regular vine copula CDFs.
//!
pub mod cdf;
pub mod copulas;
pub mod error;
pub mod traits;

pub use cdf::rvine_cdf;
pub use cdf::CdfEstimate;
pub use cdf::MissingPolicy;
pub use cdf::Query;
pub use cdf::VineCdf;
pub use error::VineCdfError;
