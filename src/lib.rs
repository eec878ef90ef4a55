pub mod config;
pub mod diamond_square;
pub mod error;
pub mod grid;
pub mod render;
pub mod rng;
pub mod stats;
pub mod terrain;

use std::time::Instant;

use config::GenerationParameters;
use error::Result;
use grid::{ElevationGrid, Grid};
use terrain::BandTable;

pub struct Map {
    pub size: usize,
    pub height: ElevationGrid,
    pub min: f64,
    pub max: f64,
    /// Band index per cell.
    pub terrain: Grid<u8>,
    pub rgba: Vec<u8>,
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

pub fn generate(seed: u64, params: &GenerationParameters, bands: &BandTable) -> Result<(Map, Vec<Timing>)> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Heightmap
    let t = Instant::now();
    let height = diamond_square::generate_seeded(params, seed)?;
    timings.push(Timing {
        name: "diamond_square",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Observed range
    let t = Instant::now();
    let (min, max) = stats::height_range(&height);
    timings.push(Timing {
        name: "stats",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 3. Terrain bands. A flat grid has no range to band; it all sits in the lowest band.
    let t = Instant::now();
    let terrain = if max > min {
        terrain::classify_grid(&height, bands)?
    } else {
        log::warn!("flat heightmap at {min}, assigning every cell to {}", bands.bands()[0].label);
        Grid::new(height.w, height.h)
    };
    timings.push(Timing {
        name: "classify",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 4. Render
    let t = Instant::now();
    let rgba = render::render_map(&terrain, &height, bands);
    timings.push(Timing {
        name: "render",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });
    log::debug!("generated {0}x{0} map in {total_ms:.1} ms, heights [{min:.3}, {max:.3}]", height.w);

    let map = Map {
        size: height.size(),
        height,
        min,
        max,
        terrain,
        rgba,
    };

    Ok((map, timings))
}
