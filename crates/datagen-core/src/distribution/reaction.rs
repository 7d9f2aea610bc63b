use super::tabular::{LogLog, OneDInterpolation};
use crate::numerics::HashBasedGridSearcher;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReactionError {
    #[error("threshold index {threshold_index} lies beyond the {grid_len}-point energy grid")]
    ThresholdOutOfRange {
        threshold_index: usize,
        grid_len: usize,
    },
    #[error(
        "cross section has {cross_section_len} values but the grid has {expected} points above the threshold"
    )]
    LengthMismatch {
        cross_section_len: usize,
        expected: usize,
    },
}

/// Elastic cross section on a shared energy grid, starting at a threshold
/// index, with Log-Log interpolation between grid points.
#[derive(Debug, Clone)]
pub struct ElasticCrossSectionReaction {
    energy_grid: Arc<[f64]>,
    cross_section: Arc<[f64]>,
    threshold_index: usize,
    grid_searcher: Arc<HashBasedGridSearcher>,
}

impl ElasticCrossSectionReaction {
    /// `cross_section[i]` belongs to `energy_grid[threshold_index + i]`.
    pub fn new(
        energy_grid: Arc<[f64]>,
        cross_section: Arc<[f64]>,
        threshold_index: usize,
        grid_searcher: Arc<HashBasedGridSearcher>,
    ) -> Result<Self, ReactionError> {
        if threshold_index >= energy_grid.len() {
            return Err(ReactionError::ThresholdOutOfRange {
                threshold_index,
                grid_len: energy_grid.len(),
            });
        }
        let expected = energy_grid.len() - threshold_index;
        if cross_section.len() != expected {
            return Err(ReactionError::LengthMismatch {
                cross_section_len: cross_section.len(),
                expected,
            });
        }

        Ok(Self {
            energy_grid,
            cross_section,
            threshold_index,
            grid_searcher,
        })
    }

    pub fn threshold_index(&self) -> usize {
        self.threshold_index
    }

    pub fn threshold_energy(&self) -> f64 {
        self.energy_grid[self.threshold_index]
    }

    pub fn energy_grid(&self) -> &[f64] {
        &self.energy_grid
    }

    pub fn cross_section_values(&self) -> &[f64] {
        &self.cross_section
    }

    pub fn grid_searcher(&self) -> &HashBasedGridSearcher {
        &self.grid_searcher
    }

    /// Zero below the threshold energy and the last tabulated value above the grid.
    pub fn cross_section(&self, energy: f64) -> f64 {
        if energy < self.threshold_energy() {
            return 0.0;
        }
        let last = self.energy_grid.len() - 1;
        if energy >= self.energy_grid[last] || self.cross_section.len() == 1 {
            return self.cross_section[self.cross_section.len() - 1];
        }

        let index = self
            .grid_searcher
            .find_lower_bin_index(energy)
            .max(self.threshold_index);
        let local = index - self.threshold_index;
        LogLog::interpolate(
            self.energy_grid[index],
            self.energy_grid[index + 1],
            energy,
            self.cross_section[local],
            self.cross_section[local + 1],
        )
    }
}
