pub mod gauss_moments;
pub mod legendre;
pub mod quadrature;
pub mod radau;

pub use gauss_moments::{GaussMomentsError, gauss_moments_from_legendre};
pub use legendre::{legendre_and_derivative_long, legendre_values, legendre_values_long};
pub use quadrature::{GaussLegendreRule, LongGaussLegendreRule};
pub use radau::{RadauError, RadauQuadratureApi, RadauRule, SloanRadauQuadrature};

/// Double-double scalar carried through the moment recursions.
pub type LongFloat = twofloat::TwoFloat;

pub fn long(value: f64) -> LongFloat {
    LongFloat::from(value)
}
