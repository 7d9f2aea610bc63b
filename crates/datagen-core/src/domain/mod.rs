pub mod errors;
pub mod table;

pub use errors::{DataGenError, DataGenErrorCategory, DataGenResult};
pub use table::{EnergyTable, MissingEnergyKey};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the desired {kind} '{value}' is currently not supported")]
pub struct PolicyParseError {
    pub kind: &'static str,
    pub value: String,
}

/// How angular distributions tabulated at neighbouring energies are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BivariateGridPolicy {
    #[serde(rename = "Direct")]
    Direct,
    #[serde(rename = "Unit-base")]
    UnitBase,
    #[serde(rename = "Correlated")]
    Correlated,
    #[serde(rename = "Unit-base Correlated")]
    UnitBaseCorrelated,
}

impl BivariateGridPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::UnitBase => "Unit-base",
            Self::Correlated => "Correlated",
            Self::UnitBaseCorrelated => "Unit-base Correlated",
        }
    }

    /// Angular distributions span the same `[-1, mu_peak]` domain at every energy,
    /// so the unit-base variants evaluate like their plain counterparts.
    pub const fn is_correlated(self) -> bool {
        matches!(self, Self::Correlated | Self::UnitBaseCorrelated)
    }
}

impl Display for BivariateGridPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for BivariateGridPolicy {
    type Err = PolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Direct" => Ok(Self::Direct),
            "Unit-base" => Ok(Self::UnitBase),
            "Correlated" => Ok(Self::Correlated),
            "Unit-base Correlated" => Ok(Self::UnitBaseCorrelated),
            other => Err(PolicyParseError {
                kind: "2D grid policy",
                value: other.to_string(),
            }),
        }
    }
}

/// Interpolation applied in (energy, angle, pdf) between tabulated distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TwoDInterpolationPolicy {
    #[serde(rename = "Log-Log-Log")]
    LogLogLog,
    #[serde(rename = "Lin-Lin-Lin")]
    LinLinLin,
    #[serde(rename = "Lin-Lin-Log")]
    LinLinLog,
}

impl TwoDInterpolationPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LogLogLog => "Log-Log-Log",
            Self::LinLinLin => "Lin-Lin-Lin",
            Self::LinLinLog => "Lin-Lin-Log",
        }
    }
}

impl Display for TwoDInterpolationPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for TwoDInterpolationPolicy {
    type Err = PolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Log-Log-Log" => Ok(Self::LogLogLog),
            "Lin-Lin-Lin" => Ok(Self::LinLinLin),
            "Lin-Lin-Log" => Ok(Self::LinLinLog),
            other => Err(PolicyParseError {
                kind: "2D interpolation policy",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoupledElasticSamplingMethod {
    #[serde(rename = "One D Union")]
    OneDUnion,
    #[serde(rename = "Two D Union")]
    TwoDUnion,
    #[default]
    #[serde(rename = "Modified Two D Union")]
    ModifiedTwoDUnion,
}

impl CoupledElasticSamplingMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDUnion => "One D Union",
            Self::TwoDUnion => "Two D Union",
            Self::ModifiedTwoDUnion => "Modified Two D Union",
        }
    }
}

impl Display for CoupledElasticSamplingMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for CoupledElasticSamplingMethod {
    type Err = PolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "One D Union" => Ok(Self::OneDUnion),
            "Two D Union" => Ok(Self::TwoDUnion),
            "Modified Two D Union" => Ok(Self::ModifiedTwoDUnion),
            other => Err(PolicyParseError {
                kind: "coupled elastic sampling method",
                value: other.to_string(),
            }),
        }
    }
}
