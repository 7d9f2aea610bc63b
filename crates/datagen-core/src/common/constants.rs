//! Physical and numerical constants shared by the elastic data pipeline.

/// Fine structure constant (CODATA 2018).
pub const FINE_STRUCTURE_CONSTANT: f64 = 7.297_352_569_3e-3;

/// Electron rest mass energy in MeV (CODATA 2018).
pub const ELECTRON_REST_MASS_ENERGY: f64 = 0.510_998_950_00;

/// Thomas-Fermi screening radius factor used by the Moliere screening parameter.
pub const THOMAS_FERMI_FACTOR: f64 = 0.885;

/// Largest cutoff angle cosine for which moment preserving data is generated.
pub const MAX_MOMENT_PRESERVING_CUTOFF_ANGLE_COSINE: f64 = 0.999_999;

/// Absolute precision requested from the moments evaluator.
pub const MOMENT_PRESERVING_PRECISION: f64 = 1e-13;

/// Relative floor below which a screened Rutherford cross section is roundoff.
pub const DEFAULT_RUTHERFORD_EVALUATION_TOLERANCE: f64 = 1e-15;

/// Offset keeping `ln(1 - mu)` finite at the forward peak.
pub const ANGLE_COSINE_NUDGE: f64 = 1e-10;

/// Hash bins used by the moments evaluator grid searcher.
pub const MOMENTS_GRID_SEARCHER_BINS: usize = 100;
