//! Electron elastic data evaluator.
//!
//! Turns ENDL or native elastic tables into the angular distributions,
//! cross sections and moment preserving discrete angles used for transport.

mod analog;
mod cross_section;
mod discrete;
mod errors;
pub mod moments;

pub use analog::AngularDistribution;
pub use cross_section::RutherfordCrossSection;
pub use discrete::{DiscreteAngles, MomentPreservingData};
pub use errors::{ComputationError, ConfigurationError, ContractViolation, EvaluatorError};
pub use moments::{
    CoupledElasticMomentsEvaluator, ElasticMomentsEvaluator, MomentsError, RutherfordMomentsMethod,
    screened_rutherford_moments_by_integration, screened_rutherford_moments_by_recursion,
};

use crate::common::{EvaluatorConfig, MAX_MOMENT_PRESERVING_CUTOFF_ANGLE_COSINE};
use crate::data::{EndlElasticDataSource, NativeElasticDataSource};
use crate::distribution::{AngularGridFn, resolve_angular_grid_fn};
use crate::domain::{
    BivariateGridPolicy, CoupledElasticSamplingMethod, EnergyTable, PolicyParseError,
    TwoDInterpolationPolicy,
};
use errors::require;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Requested energy bound moved onto the energy grid at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Advisory {
    MinEnergyClamped { requested: f64, applied: f64 },
    MaxEnergyClamped { requested: f64, applied: f64 },
}

/// Why the moment preserving data was skipped or came out short.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Notice {
    CutoffAboveMomentPreservingLimit { cutoff_angle_cosine: f64 },
    NoDiscreteAngles,
    DiscreteAnglesTruncated {
        energy: f64,
        requested: usize,
        supported: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticSecondaryDistribution {
    pub angular_energy_grid: Vec<f64>,
    pub elastic_angle: EnergyTable,
    pub elastic_pdf: EnergyTable,
    pub moment_preserving_cross_section_reduction: Vec<f64>,
    pub moment_preserving_angles: EnergyTable,
    pub moment_preserving_weights: EnergyTable,
    #[serde(default)]
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub struct ElectronElasticDataEvaluator {
    atomic_number: u32,
    energy_grid: Arc<[f64]>,
    cutoff_cross_section: Arc<[f64]>,
    cutoff_threshold_index: usize,
    total_cross_section: Arc<[f64]>,
    total_threshold_index: usize,
    angular_energy_grid: Arc<[f64]>,
    elastic_angle: Arc<EnergyTable>,
    elastic_pdf: Arc<EnergyTable>,
    min_energy: f64,
    max_energy: f64,
    cutoff_angle_cosine: f64,
    number_of_moment_preserving_angles: usize,
    tabular_evaluation_tol: f64,
    two_d_grid: BivariateGridPolicy,
    two_d_interp: TwoDInterpolationPolicy,
    sampling_method: CoupledElasticSamplingMethod,
    generate_new_distribution_at_min_and_max_energy: bool,
    angular_grid_fn: AngularGridFn,
    advisories: Vec<Advisory>,
}

/// Cross section and angular tables before the configuration is applied.
struct ElasticTables {
    atomic_number: u32,
    energy_grid: Arc<[f64]>,
    cutoff_cross_section: Arc<[f64]>,
    cutoff_threshold_index: usize,
    total_cross_section: Arc<[f64]>,
    total_threshold_index: usize,
    angular_energy_grid: Arc<[f64]>,
    elastic_angle: Arc<EnergyTable>,
    elastic_pdf: Arc<EnergyTable>,
}

impl ElectronElasticDataEvaluator {
    /// Build from raw ENDL tables. ENDL has no threshold concept, and its
    /// delta angle cosine distributions are flipped into angle cosines.
    pub fn from_endl<S>(source: &S, config: EvaluatorConfig) -> Result<Self, EvaluatorError>
    where
        S: EndlElasticDataSource + ?Sized,
    {
        let angular_energy_grid = source.cutoff_elastic_angular_energy_grid();
        let mut elastic_angle = EnergyTable::new();
        let mut elastic_pdf = EnergyTable::new();
        for &energy in angular_energy_grid {
            let raw_angle = source.cutoff_elastic_angles_at_energy(energy)?;
            let raw_pdf = source.cutoff_elastic_pdf_at_energy(energy)?;
            require(raw_angle.len() == raw_pdf.len(), || {
                ContractViolation::LengthMismatch {
                    what: "cutoff elastic pdf",
                    expected: raw_angle.len(),
                    actual: raw_pdf.len(),
                }
            })?;
            let (angle, pdf) = Self::calculate_elastic_angle_cosine(raw_angle, raw_pdf);
            elastic_angle.insert(energy, angle);
            elastic_pdf.insert(energy, pdf);
        }

        let tables = ElasticTables {
            atomic_number: source.atomic_number(),
            energy_grid: source.elastic_energy_grid().into(),
            cutoff_cross_section: source.cutoff_elastic_cross_section().into(),
            cutoff_threshold_index: 0,
            total_cross_section: source.total_elastic_cross_section().into(),
            total_threshold_index: 0,
            angular_energy_grid: angular_energy_grid.into(),
            elastic_angle: Arc::new(elastic_angle),
            elastic_pdf: Arc::new(elastic_pdf),
        };
        Self::build(tables, &config)
    }

    /// Build from pre-processed native tables with explicit settings.
    pub fn from_native<S>(source: &S, config: EvaluatorConfig) -> Result<Self, EvaluatorError>
    where
        S: NativeElasticDataSource + ?Sized,
    {
        let evaluator = Self::build(Self::native_tables(source), &config)?;
        evaluator.check_angular_grid_bounds()?;
        Ok(evaluator)
    }

    /// Build from native tables using the settings stored alongside them.
    pub fn from_native_basic<S>(
        source: &S,
        generate_new_distribution_at_min_and_max_energy: bool,
    ) -> Result<Self, EvaluatorError>
    where
        S: NativeElasticDataSource + ?Sized,
    {
        let two_d_grid = match source
            .electron_two_d_grid_policy()
            .parse::<BivariateGridPolicy>()
            .map_err(unsupported_policy)?
        {
            BivariateGridPolicy::Direct | BivariateGridPolicy::UnitBase => {
                BivariateGridPolicy::Direct
            }
            BivariateGridPolicy::Correlated | BivariateGridPolicy::UnitBaseCorrelated => {
                BivariateGridPolicy::Correlated
            }
        };
        let two_d_interp = source
            .electron_two_d_interp_policy()
            .parse::<TwoDInterpolationPolicy>()
            .map_err(unsupported_policy)?;

        let config = EvaluatorConfig {
            min_energy: source.min_electron_energy(),
            max_energy: source.max_electron_energy(),
            cutoff_angle_cosine: source.cutoff_angle_cosine(),
            number_of_moment_preserving_angles: source.number_of_moment_preserving_angles(),
            tabular_evaluation_tol: source.electron_tabular_evaluation_tolerance(),
            two_d_grid,
            two_d_interp,
            sampling_method: CoupledElasticSamplingMethod::default(),
            generate_new_distribution_at_min_and_max_energy,
        };
        Self::build(Self::native_tables(source), &config)
    }

    /// A new evaluator over the same shared tables with different settings.
    pub fn reconfigured(&self, config: EvaluatorConfig) -> Result<Self, EvaluatorError> {
        let tables = ElasticTables {
            atomic_number: self.atomic_number,
            energy_grid: Arc::clone(&self.energy_grid),
            cutoff_cross_section: Arc::clone(&self.cutoff_cross_section),
            cutoff_threshold_index: self.cutoff_threshold_index,
            total_cross_section: Arc::clone(&self.total_cross_section),
            total_threshold_index: self.total_threshold_index,
            angular_energy_grid: Arc::clone(&self.angular_energy_grid),
            elastic_angle: Arc::clone(&self.elastic_angle),
            elastic_pdf: Arc::clone(&self.elastic_pdf),
        };
        Self::build(tables, &config)
    }

    fn native_tables<S>(source: &S) -> ElasticTables
    where
        S: NativeElasticDataSource + ?Sized,
    {
        ElasticTables {
            atomic_number: source.atomic_number(),
            energy_grid: source.electron_energy_grid().into(),
            cutoff_cross_section: source.cutoff_elastic_cross_section().into(),
            cutoff_threshold_index: source.cutoff_elastic_cross_section_threshold_energy_index(),
            total_cross_section: source.total_elastic_cross_section().into(),
            total_threshold_index: source.total_elastic_cross_section_threshold_energy_index(),
            angular_energy_grid: source.elastic_angular_energy_grid().into(),
            elastic_angle: Arc::new(source.cutoff_elastic_angles().clone()),
            elastic_pdf: Arc::new(source.cutoff_elastic_pdf().clone()),
        }
    }

    fn build(tables: ElasticTables, config: &EvaluatorConfig) -> Result<Self, EvaluatorError> {
        check_tables(&tables)?;

        let mut evaluator = Self {
            atomic_number: tables.atomic_number,
            energy_grid: tables.energy_grid,
            cutoff_cross_section: tables.cutoff_cross_section,
            cutoff_threshold_index: tables.cutoff_threshold_index,
            total_cross_section: tables.total_cross_section,
            total_threshold_index: tables.total_threshold_index,
            angular_energy_grid: tables.angular_energy_grid,
            elastic_angle: tables.elastic_angle,
            elastic_pdf: tables.elastic_pdf,
            min_energy: config.min_energy,
            max_energy: config.max_energy,
            cutoff_angle_cosine: config.cutoff_angle_cosine,
            number_of_moment_preserving_angles: config.number_of_moment_preserving_angles,
            tabular_evaluation_tol: config.tabular_evaluation_tol,
            two_d_grid: config.two_d_grid,
            two_d_interp: config.two_d_interp,
            sampling_method: config.sampling_method,
            generate_new_distribution_at_min_and_max_energy: config
                .generate_new_distribution_at_min_and_max_energy,
            angular_grid_fn: resolve_angular_grid_fn(config.two_d_grid, config.two_d_interp),
            advisories: Vec::new(),
        };
        evaluator.apply_energy_bounds(config.min_energy, config.max_energy)?;
        validate_cutoff_angle_cosine(config.cutoff_angle_cosine)?;
        validate_tabular_evaluation_tol(config.tabular_evaluation_tol)?;
        Ok(evaluator)
    }

    fn grid_bounds(&self) -> (f64, f64) {
        (
            self.energy_grid.first().copied().unwrap_or(f64::NAN),
            self.energy_grid.last().copied().unwrap_or(f64::NAN),
        )
    }

    /// Clamp the requested bounds onto the energy grid, recording an advisory
    /// for each bound that moved.
    fn apply_energy_bounds(&mut self, min_energy: f64, max_energy: f64) -> Result<(), EvaluatorError> {
        let (grid_front, grid_back) = self.grid_bounds();

        self.min_energy = min_energy;
        if min_energy < grid_front {
            tracing::warn!(
                requested = min_energy,
                applied = grid_front,
                "min energy is below the energy grid; using the first grid point"
            );
            self.min_energy = grid_front;
            self.advisories.push(Advisory::MinEnergyClamped {
                requested: min_energy,
                applied: grid_front,
            });
        }

        if max_energy <= self.min_energy {
            return Err(ConfigurationError::EnergyOrdering {
                min_energy: self.min_energy,
                max_energy,
            }
            .into());
        }

        self.max_energy = max_energy;
        if max_energy > grid_back {
            tracing::warn!(
                requested = max_energy,
                applied = grid_back,
                "max energy is above the energy grid; using the last grid point"
            );
            self.max_energy = grid_back;
            self.advisories.push(Advisory::MaxEnergyClamped {
                requested: max_energy,
                applied: grid_back,
            });
        }
        Ok(())
    }

    fn check_angular_grid_bounds(&self) -> Result<(), ConfigurationError> {
        let front = self.angular_energy_grid.first().copied().unwrap_or(f64::NAN);
        let back = self.angular_energy_grid.last().copied().unwrap_or(f64::NAN);
        if front <= self.min_energy && back >= self.max_energy {
            return Ok(());
        }
        Err(ConfigurationError::AngularGridBounds {
            front,
            back,
            min_energy: self.min_energy,
            max_energy: self.max_energy,
        })
    }

    /// Angular distributions, plus the moment preserving discrete angles unless
    /// the cutoff or angle count rules them out.
    ///
    /// With fewer than two points in `angular_energy_grid` the grid is derived
    /// from the tabulated data; otherwise the given grid is evaluated as is.
    pub fn evaluate_elastic_secondary_distribution(
        &self,
        angular_energy_grid: &[f64],
    ) -> Result<ElasticSecondaryDistribution, EvaluatorError> {
        let angular = if angular_energy_grid.len() < 2 {
            self.evaluate_analog_elastic_secondary_distribution()?
        } else {
            self.evaluate_analog_elastic_secondary_distribution_in_place(angular_energy_grid)?
        };

        let mut notices = self.moment_preserving_notices();
        for notice in &notices {
            match notice {
                Notice::CutoffAboveMomentPreservingLimit {
                    cutoff_angle_cosine,
                } => tracing::info!(
                    cutoff_angle_cosine,
                    limit = MAX_MOMENT_PRESERVING_CUTOFF_ANGLE_COSINE,
                    "cutoff angle cosine is above the moment preserving limit; no moment preserving data generated"
                ),
                Notice::NoDiscreteAngles => tracing::info!(
                    "number of moment preserving angles is below one; no moment preserving data generated"
                ),
                // Logged where the rule is built.
                Notice::DiscreteAnglesTruncated { .. } => {}
            }
        }

        let mut moment_preserving = if notices.is_empty() {
            self.evaluate_moment_preserving_elastic_data(&angular)?
        } else {
            MomentPreservingData::default()
        };
        notices.append(&mut moment_preserving.notices);

        Ok(ElasticSecondaryDistribution {
            angular_energy_grid: angular.angular_energy_grid,
            elastic_angle: angular.elastic_angle,
            elastic_pdf: angular.elastic_pdf,
            moment_preserving_cross_section_reduction: moment_preserving.cross_section_reduction,
            moment_preserving_angles: moment_preserving.angles,
            moment_preserving_weights: moment_preserving.weights,
            notices,
        })
    }

    fn moment_preserving_notices(&self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if self.cutoff_angle_cosine > MAX_MOMENT_PRESERVING_CUTOFF_ANGLE_COSINE {
            notices.push(Notice::CutoffAboveMomentPreservingLimit {
                cutoff_angle_cosine: self.cutoff_angle_cosine,
            });
        }
        if self.number_of_moment_preserving_angles < 1 {
            notices.push(Notice::NoDiscreteAngles);
        }
        notices
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    pub fn energy_grid(&self) -> &[f64] {
        &self.energy_grid
    }

    pub fn cutoff_cross_section(&self) -> &[f64] {
        &self.cutoff_cross_section
    }

    pub fn cutoff_cross_section_threshold_index(&self) -> usize {
        self.cutoff_threshold_index
    }

    pub fn total_cross_section(&self) -> &[f64] {
        &self.total_cross_section
    }

    pub fn total_cross_section_threshold_index(&self) -> usize {
        self.total_threshold_index
    }

    pub fn angular_energy_grid(&self) -> &[f64] {
        &self.angular_energy_grid
    }

    pub fn elastic_angle(&self) -> &EnergyTable {
        &self.elastic_angle
    }

    pub fn elastic_pdf(&self) -> &EnergyTable {
        &self.elastic_pdf
    }

    /// Bound clamps applied at construction.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            min_energy: self.min_energy,
            max_energy: self.max_energy,
            cutoff_angle_cosine: self.cutoff_angle_cosine,
            number_of_moment_preserving_angles: self.number_of_moment_preserving_angles,
            tabular_evaluation_tol: self.tabular_evaluation_tol,
            two_d_grid: self.two_d_grid,
            two_d_interp: self.two_d_interp,
            sampling_method: self.sampling_method,
            generate_new_distribution_at_min_and_max_energy: self
                .generate_new_distribution_at_min_and_max_energy,
        }
    }

    pub fn min_energy(&self) -> f64 {
        self.min_energy
    }

    /// Must satisfy `grid_front <= energy < max_energy`.
    pub fn set_min_energy(&mut self, energy: f64) -> Result<(), ConfigurationError> {
        let (grid_front, _) = self.grid_bounds();
        if !(energy >= grid_front && energy < self.max_energy) {
            return Err(ConfigurationError::MinEnergyOutOfRange {
                value: energy,
                grid_front,
                max_energy: self.max_energy,
            });
        }
        self.min_energy = energy;
        Ok(())
    }

    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }

    /// Must satisfy `min_energy < energy <= grid_back`.
    pub fn set_max_energy(&mut self, energy: f64) -> Result<(), ConfigurationError> {
        let (_, grid_back) = self.grid_bounds();
        if !(energy > self.min_energy && energy <= grid_back) {
            return Err(ConfigurationError::MaxEnergyOutOfRange {
                value: energy,
                min_energy: self.min_energy,
                grid_back,
            });
        }
        self.max_energy = energy;
        Ok(())
    }

    pub fn cutoff_angle_cosine(&self) -> f64 {
        self.cutoff_angle_cosine
    }

    pub fn set_cutoff_angle_cosine(&mut self, value: f64) -> Result<(), ConfigurationError> {
        validate_cutoff_angle_cosine(value)?;
        self.cutoff_angle_cosine = value;
        Ok(())
    }

    pub fn number_of_moment_preserving_angles(&self) -> usize {
        self.number_of_moment_preserving_angles
    }

    pub fn set_number_of_moment_preserving_angles(&mut self, number: usize) {
        self.number_of_moment_preserving_angles = number;
    }

    pub fn tabular_evaluation_tol(&self) -> f64 {
        self.tabular_evaluation_tol
    }

    pub fn set_tabular_evaluation_tol(&mut self, value: f64) -> Result<(), ConfigurationError> {
        validate_tabular_evaluation_tol(value)?;
        self.tabular_evaluation_tol = value;
        Ok(())
    }

    pub fn two_d_grid_policy(&self) -> BivariateGridPolicy {
        self.two_d_grid
    }

    pub fn set_two_d_grid_policy(&mut self, policy: BivariateGridPolicy) {
        self.two_d_grid = policy;
        self.angular_grid_fn = resolve_angular_grid_fn(self.two_d_grid, self.two_d_interp);
    }

    pub fn two_d_interp_policy(&self) -> TwoDInterpolationPolicy {
        self.two_d_interp
    }

    pub fn set_two_d_interp_policy(&mut self, policy: TwoDInterpolationPolicy) {
        self.two_d_interp = policy;
        self.angular_grid_fn = resolve_angular_grid_fn(self.two_d_grid, self.two_d_interp);
    }

    pub fn coupled_elastic_sampling_method(&self) -> CoupledElasticSamplingMethod {
        self.sampling_method
    }

    pub fn set_coupled_elastic_sampling_method(&mut self, method: CoupledElasticSamplingMethod) {
        self.sampling_method = method;
    }

    pub fn generate_new_distribution_at_min_and_max_energy(&self) -> bool {
        self.generate_new_distribution_at_min_and_max_energy
    }

    pub fn set_generate_new_distribution_at_min_and_max_energy(&mut self, generate: bool) {
        self.generate_new_distribution_at_min_and_max_energy = generate;
    }
}

fn unsupported_policy(error: PolicyParseError) -> ConfigurationError {
    ConfigurationError::UnsupportedPolicy {
        kind: error.kind,
        value: error.value,
    }
}

fn validate_cutoff_angle_cosine(value: f64) -> Result<(), ConfigurationError> {
    if value > -1.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigurationError::CutoffAngleCosine { value })
    }
}

fn validate_tabular_evaluation_tol(value: f64) -> Result<(), ConfigurationError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigurationError::TabularTolerance { value })
    }
}

fn check_tables(tables: &ElasticTables) -> Result<(), ContractViolation> {
    let grid_len = tables.energy_grid.len();
    require(grid_len > 0, || ContractViolation::EmptyCrossSection {
        what: "elastic energy grid",
    })?;

    for (what, values, threshold_index) in [
        (
            "cutoff elastic cross section",
            &tables.cutoff_cross_section,
            tables.cutoff_threshold_index,
        ),
        (
            "total elastic cross section",
            &tables.total_cross_section,
            tables.total_threshold_index,
        ),
    ] {
        require(!values.is_empty(), || ContractViolation::EmptyCrossSection { what })?;
        let expected = grid_len.saturating_sub(threshold_index);
        require(values.len() == expected, || ContractViolation::LengthMismatch {
            what,
            expected,
            actual: values.len(),
        })?;
    }

    require(tables.elastic_angle.same_keys(&tables.elastic_pdf), || {
        ContractViolation::LengthMismatch {
            what: "cutoff elastic pdf table",
            expected: tables.elastic_angle.len(),
            actual: tables.elastic_pdf.len(),
        }
    })?;
    for &energy in tables.angular_energy_grid.iter() {
        let angle = tables.elastic_angle.at(energy)?;
        let pdf = tables.elastic_pdf.at(energy)?;
        require(angle.len() == pdf.len(), || ContractViolation::LengthMismatch {
            what: "cutoff elastic pdf",
            expected: angle.len(),
            actual: pdf.len(),
        })?;
    }
    Ok(())
}
