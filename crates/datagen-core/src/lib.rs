//! Electron elastic scattering data generation: cutoff angular distributions,
//! screened Rutherford cross sections and moment preserving discrete angles.

pub mod common;
pub mod data;
pub mod distribution;
pub mod domain;
pub mod modules;
pub mod numerics;

pub use common::{EvaluatorConfig, load_evaluator_config};
pub use domain::{DataGenError, DataGenErrorCategory, DataGenResult, EnergyTable};
pub use modules::elastic::{ElasticSecondaryDistribution, ElectronElasticDataEvaluator};
