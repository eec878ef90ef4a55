use crate::grid::ElevationGrid;

/// Lowest height in the grid.
pub fn min_of(grid: &ElevationGrid) -> f64 {
    assert!(!grid.data.is_empty(), "min_of on an empty grid");
    grid.data.iter().cloned().fold(f64::INFINITY, f64::min)
}

/// Highest height in the grid.
pub fn max_of(grid: &ElevationGrid) -> f64 {
    assert!(!grid.data.is_empty(), "max_of on an empty grid");
    grid.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}

/// Observed `(min, max)` in a single pass.
pub fn height_range(grid: &ElevationGrid) -> (f64, f64) {
    assert!(!grid.data.is_empty(), "height_range on an empty grid");
    grid.data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
