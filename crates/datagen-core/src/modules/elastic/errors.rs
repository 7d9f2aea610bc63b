use super::moments::MomentsError;
use crate::distribution::{BivariateError, CoupledError, ReactionError, TabularError};
use crate::domain::{DataGenError, MissingEnergyKey};
use crate::numerics::special::RadauError;

/// Caller supplied settings that cannot be honoured.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("the max energy ({max_energy}) must be greater than the min energy ({min_energy})")]
    EnergyOrdering { min_energy: f64, max_energy: f64 },
    #[error("the cutoff angle cosine ({value}) must be in (-1, 1]")]
    CutoffAngleCosine { value: f64 },
    #[error("the tabular evaluation tolerance ({value}) must be in (0, 1)")]
    TabularTolerance { value: f64 },
    #[error("the desired {kind} '{value}' is currently not supported")]
    UnsupportedPolicy { kind: &'static str, value: String },
    #[error(
        "the angular energy grid [{front}, {back}] does not enclose the energy range [{min_energy}, {max_energy}]"
    )]
    AngularGridBounds {
        front: f64,
        back: f64,
        min_energy: f64,
        max_energy: f64,
    },
    #[error("the min energy ({value}) must be in [{grid_front}, {max_energy})")]
    MinEnergyOutOfRange {
        value: f64,
        grid_front: f64,
        max_energy: f64,
    },
    #[error("the max energy ({value}) must be in ({min_energy}, {grid_back}]")]
    MaxEnergyOutOfRange {
        value: f64,
        min_energy: f64,
        grid_back: f64,
    },
}

/// Broken internal invariants. These indicate a defect in the caller or in the
/// evaluator rather than bad settings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractViolation {
    #[error("{what} has {actual} values, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{what} is empty")]
    EmptyCrossSection { what: &'static str },
    #[error("angular energy grid must run from {min_energy} to {max_energy}, got [{front}, {back}]")]
    GridEndpointMismatch {
        front: f64,
        back: f64,
        min_energy: f64,
        max_energy: f64,
    },
    #[error(transparent)]
    MissingEnergyKey(#[from] MissingEnergyKey),
    #[error("{nodes} radau nodes require at least {required} legendre moments, got {actual}")]
    InsufficientMoments {
        nodes: usize,
        required: usize,
        actual: usize,
    },
    #[error("discrete angle index {index} is out of range for {len} quadrature nodes")]
    DiscreteIndex { index: usize, len: usize },
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    #[error(transparent)]
    Tabular(#[from] TabularError),
}

/// Numerical failures while evaluating a well-formed problem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputationError {
    #[error("angular distribution at {energy} MeV: {source}")]
    AngularDistribution {
        energy: f64,
        #[source]
        source: BivariateError,
    },
    #[error(transparent)]
    Moments(#[from] MomentsError),
    #[error("radau quadrature at {energy} MeV: {source}")]
    Radau {
        energy: f64,
        #[source]
        source: RadauError,
    },
    #[error("discrete weights at {energy} MeV leave no probability once the forward node is removed")]
    DegenerateDiscreteWeights { energy: f64 },
}

impl From<CoupledError> for ComputationError {
    fn from(error: CoupledError) -> Self {
        Self::Moments(MomentsError::Coupled(error))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluatorError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl From<MissingEnergyKey> for EvaluatorError {
    fn from(error: MissingEnergyKey) -> Self {
        Self::Contract(error.into())
    }
}

impl From<MomentsError> for EvaluatorError {
    fn from(error: MomentsError) -> Self {
        Self::Computation(error.into())
    }
}

/// Precondition check, compiled to a no-op without the `contract-checks` feature.
pub(super) fn require(
    condition: bool,
    violation: impl FnOnce() -> ContractViolation,
) -> Result<(), ContractViolation> {
    if cfg!(feature = "contract-checks") && !condition {
        return Err(violation());
    }
    Ok(())
}

impl From<EvaluatorError> for DataGenError {
    fn from(error: EvaluatorError) -> Self {
        match &error {
            EvaluatorError::Configuration(_) => {
                DataGenError::input_validation("INPUT.ELASTIC_CONFIGURATION", error.to_string())
            }
            EvaluatorError::Contract(_) => {
                DataGenError::internal("INTERNAL.ELASTIC_CONTRACT", error.to_string())
            }
            EvaluatorError::Computation(_) => {
                DataGenError::computation("RUN.ELASTIC_COMPUTATION", error.to_string())
            }
        }
    }
}
