use crate::config::{Displacement, GenerationParameters};
use crate::error::Result;
use crate::grid::ElevationGrid;
use crate::rng::{RandomSource, Rng};

/// Generate a diamond-square heightmap with a splitmix RNG seeded from `seed`.
pub fn generate_seeded(params: &GenerationParameters, seed: u64) -> Result<ElevationGrid> {
    generate(params, &mut Rng::new(seed))
}

/// Run midpoint displacement over a `2^iterations + 1` square grid.
///
/// Corners are seeded from `[0, range)`. A bootstrap pass then raises the
/// center cell to `peak_scale * range` plus a random offset and runs one
/// square step at full stride, so the coarsest level is already filled when
/// the main loop starts. Each following level runs a diamond step, then a
/// square step, then decays `range` by `smoothness`.
///
/// Averages only count in-bounds neighbors, so edge cells blend 2 or 3
/// values instead of 4. Corners are never written after seeding.
pub fn generate<R: RandomSource>(params: &GenerationParameters, rng: &mut R) -> Result<ElevationGrid> {
    params.validate()?;

    let n = params.iterations;
    let size = params.size();
    let last = size - 1;
    let mut grid = ElevationGrid::square(size);

    let mut range = params.range();

    // Corner seeds, drawn in a fixed order.
    for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
        grid.set(x, y, rng.range_f64(0.0, range));
    }

    // Bootstrap: artificial central peak, diffused to the edge midpoints.
    let stride = 1usize << n;
    let offset = stride / 2;
    let peak = params.peak_scale * range + rng.range_f64(0.0, range);
    grid.set(offset, offset, peak);
    square_step(&mut grid, stride, offset, jitter(params.displacement, Step::Square, range), rng);
    log::trace!("bootstrap: stride={stride} peak={peak:.3}");

    range *= params.smoothness;

    for i in 1..n {
        let stride = 1usize << (n - i);
        let offset = stride / 2;

        diamond_step(&mut grid, stride, offset, jitter(params.displacement, Step::Diamond, range), rng);
        square_step(&mut grid, stride, offset, jitter(params.displacement, Step::Square, range), rng);

        range *= params.smoothness;
        log::trace!("pass {i}: stride={stride} range={range:.3}");
    }

    log::debug!(
        "diamond-square: {size}x{size} grid, {n} iterations, smoothness {}",
        params.smoothness
    );
    Ok(grid)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Step {
    Diamond,
    Square,
}

/// Jitter amplitude for a step, 0 when displacement is disabled for it.
fn jitter(mode: Displacement, step: Step, range: f64) -> f64 {
    match (mode, step) {
        (Displacement::Off, _) => 0.0,
        (Displacement::Square, Step::Diamond) => 0.0,
        (Displacement::Square, Step::Square) | (Displacement::Both, _) => range,
    }
}

#[inline]
fn displace<R: RandomSource>(amplitude: f64, rng: &mut R) -> f64 {
    if amplitude > 0.0 {
        rng.range_f64(-amplitude / 2.0, amplitude / 2.0)
    } else {
        0.0
    }
}

/// Fill the center of every `stride` square with the mean of its four corners.
fn diamond_step<R: RandomSource>(grid: &mut ElevationGrid, stride: usize, offset: usize, amplitude: f64, rng: &mut R) {
    let size = grid.size();
    for y in (offset..size).step_by(stride) {
        for x in (offset..size).step_by(stride) {
            let v = mean(grid, grid.diagonal_neighbors(x, y, offset));
            grid.set(x, y, v + displace(amplitude, rng));
        }
    }
}

/// Fill the diamond midpoints: every `offset` row, alternating the starting
/// column so the filled cells form a checkerboard with the existing lattice.
fn square_step<R: RandomSource>(grid: &mut ElevationGrid, stride: usize, offset: usize, amplitude: f64, rng: &mut R) {
    let size = grid.size();
    for (row, y) in (0..size).step_by(offset).enumerate() {
        let x0 = if row % 2 == 0 { offset } else { 0 };
        for x in (x0..size).step_by(stride) {
            let v = mean(grid, grid.axis_neighbors(x, y, offset));
            grid.set(x, y, v + displace(amplitude, rng));
        }
    }
}

#[inline]
fn mean(grid: &ElevationGrid, cells: impl Iterator<Item = (usize, usize)>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (x, y) in cells {
        sum += grid.get(x, y);
        count += 1;
    }
    debug_assert!(count > 0);
    sum / count as f64
}
