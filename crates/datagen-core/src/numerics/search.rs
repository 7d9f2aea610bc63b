//! Energy bin lookup over a shared, strictly increasing grid.
//!
//! The grid range is split into bins of equal width in `ln(E)`. Each bin
//! boundary stores the index of the grid interval that contains it, so a
//! lookup hashes to a bin and then bisects only the few grid points inside it.

use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HashBasedGridSearcher {
    grid: Arc<[f64]>,
    log_front: f64,
    log_bin_width: f64,
    boundary_indices: Vec<usize>,
}

impl HashBasedGridSearcher {
    pub fn new(grid: Arc<[f64]>, hash_bins: usize) -> Self {
        let hash_bins = hash_bins.max(1);
        let hashable = grid.len() >= 2 && grid[0] > 0.0;
        if !hashable {
            return Self {
                grid,
                log_front: 0.0,
                log_bin_width: 0.0,
                boundary_indices: Vec::new(),
            };
        }

        let log_front = grid[0].ln();
        let log_back = grid[grid.len() - 1].ln();
        let log_bin_width = (log_back - log_front) / hash_bins as f64;
        let boundary_indices = (0..=hash_bins)
            .map(|bin| {
                let boundary = (log_front + bin as f64 * log_bin_width).exp();
                interval_containing(&grid, boundary, 0, grid.len() - 1)
            })
            .collect();

        Self {
            grid,
            log_front,
            log_bin_width,
            boundary_indices,
        }
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    pub fn number_of_hash_bins(&self) -> usize {
        self.boundary_indices.len().saturating_sub(1)
    }

    pub fn is_value_in_range(&self, energy: f64) -> bool {
        match (self.grid.first(), self.grid.last()) {
            (Some(front), Some(back)) => *front <= energy && energy <= *back,
            _ => false,
        }
    }

    /// Index `i` with `grid[i] <= energy < grid[i + 1]`. Energies outside the
    /// grid map to the first or last interval; the grid back maps to the last
    /// interval.
    pub fn find_lower_bin_index(&self, energy: f64) -> usize {
        let len = self.grid.len();
        if len < 2 {
            return 0;
        }

        if self.boundary_indices.is_empty() || self.log_bin_width <= 0.0 || energy <= self.grid[0] {
            return interval_containing(&self.grid, energy, 0, len - 1);
        }

        let bins = self.number_of_hash_bins();
        let bin = (((energy.ln() - self.log_front) / self.log_bin_width) as usize).min(bins - 1);
        let mut lower = self.boundary_indices[bin];
        let mut upper = (self.boundary_indices[bin + 1] + 1).min(len - 1);
        // Roundoff in ln() can push an energy sitting on a bin edge into the
        // neighbouring bin.
        if energy < self.grid[lower] {
            lower = 0;
        }
        if energy > self.grid[upper] {
            upper = len - 1;
        }

        interval_containing(&self.grid, energy, lower, upper)
    }
}

/// Bisect `grid[lower..=upper]` for the interval holding `value`, clamped to
/// the valid interval range `0..len - 1`.
fn interval_containing(grid: &[f64], value: f64, lower: usize, upper: usize) -> usize {
    let last_interval = grid.len().saturating_sub(2);
    if value <= grid[lower] {
        return lower.min(last_interval);
    }
    if value >= grid[upper] {
        return upper.min(last_interval);
    }

    let mut low = lower;
    let mut high = upper;
    while high - low > 1 {
        let mid = (low + high) >> 1;
        if grid[mid] <= value {
            low = mid;
        } else {
            high = mid;
        }
    }
    low.min(last_interval)
}

#[cfg(test)]
mod tests {
    use super::HashBasedGridSearcher;
    use std::sync::Arc;

    fn log_grid(points: usize) -> Arc<[f64]> {
        (0..points)
            .map(|i| 1e-5 * 10f64.powf(10.0 * i as f64 / (points - 1) as f64))
            .collect()
    }

    #[test]
    fn hashed_lookup_matches_plain_bisection() {
        let grid = log_grid(57);
        let searcher = HashBasedGridSearcher::new(grid.clone(), grid.len() / 10 + 1);
        assert_eq!(searcher.number_of_hash_bins(), 6);

        for k in 0..500 {
            let energy = 1e-5 * 10f64.powf(10.0 * k as f64 / 499.0);
            let expected = grid
                .partition_point(|value| *value <= energy)
                .saturating_sub(1)
                .min(grid.len() - 2);
            assert_eq!(searcher.find_lower_bin_index(energy), expected, "energy {energy}");
        }
    }

    #[test]
    fn grid_points_land_on_their_own_interval() {
        let grid: Arc<[f64]> = vec![1e-5, 1e-3, 1e-1, 1.0, 10.0, 1e5].into();
        let searcher = HashBasedGridSearcher::new(grid.clone(), 100);

        for (index, energy) in grid.iter().enumerate().take(grid.len() - 1) {
            assert_eq!(searcher.find_lower_bin_index(*energy), index);
        }
        assert_eq!(searcher.find_lower_bin_index(1e5), 4);
        assert_eq!(searcher.find_lower_bin_index(1e-9), 0);
        assert!(!searcher.is_value_in_range(2e5));
    }

    #[test]
    fn non_positive_grids_fall_back_to_bisection() {
        let grid: Arc<[f64]> = vec![-1.0, 0.0, 0.5, 1.0].into();
        let searcher = HashBasedGridSearcher::new(grid, 10);
        assert_eq!(searcher.number_of_hash_bins(), 0);
        assert_eq!(searcher.find_lower_bin_index(0.25), 1);
        assert_eq!(searcher.find_lower_bin_index(0.75), 2);
    }
}
