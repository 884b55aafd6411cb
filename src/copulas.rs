//! # Copulas
//!
//! $$
//! C(u_1,\dots,u_d)=P(U_1\le u_1,\dots,U_d\le u_d),\quad U_j\sim\mathcal U(0,1)
//! $$
//!
pub mod bivariate;
pub mod correlation;
pub mod empirical;
pub mod multivariate;

pub use multivariate::vine;
