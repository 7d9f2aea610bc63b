pub mod config;
pub mod constants;

pub use config::{ConfigLoadError, EvaluatorConfig, load_evaluator_config};
pub use constants::{
    ANGLE_COSINE_NUDGE, DEFAULT_RUTHERFORD_EVALUATION_TOLERANCE, ELECTRON_REST_MASS_ENERGY,
    FINE_STRUCTURE_CONSTANT, MAX_MOMENT_PRESERVING_CUTOFF_ANGLE_COSINE,
    MOMENT_PRESERVING_PRECISION, MOMENTS_GRID_SEARCHER_BINS, THOMAS_FERMI_FACTOR,
};
