pub mod bivariate;
pub mod coupled;
pub mod elastic_traits;
pub mod interpolation;
pub mod reaction;
pub mod tabular;

pub use bivariate::{
    AngularGridAndPdf, AngularGridFn, AngularTables, BivariateError, Correlated, Direct,
    angular_grid_and_pdf, resolve_angular_grid_fn, truncate_at_cutoff,
};
pub use coupled::{CoupledElasticDistribution, CoupledElasticInput, CoupledElasticPdf, CoupledError};
pub use elastic_traits::ElasticElectronTraits;
pub use interpolation::{LinLinLin, LinLinLog, LogNudgedLogCosLog, TwoDInterpolation};
pub use reaction::{ElasticCrossSectionReaction, ReactionError};
pub use tabular::{LinLin, LogLog, OneDInterpolation, TabularDistribution, TabularError};
