use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

/// Largest accepted iteration count. A 2^14 + 1 grid is already ~2 GB of f64.
pub const MAX_ITERATIONS: u32 = 14;

/// Random displacement added on top of neighbor averaging.
///
/// `Off` reproduces the reference terrain: only the corner seeds and the
/// bootstrap center are random, every other cell is a pure average.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Displacement {
    #[default]
    Off,
    /// Jitter square-step cells only.
    Square,
    /// Jitter both diamond and square steps.
    Both,
}

/// Generation parameters. Exposed as CLI args and server request fields.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParameters {
    /// Grid side is `2^iterations + 1`.
    pub iterations: u32,
    pub min_value: f64,
    pub max_value: f64,
    /// Persistence: displacement range is multiplied by this after every pass.
    pub smoothness: f64,
    /// Central peak bias, in multiples of the value range. 0 disables the peak.
    pub peak_scale: f64,
    pub displacement: Displacement,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            iterations: 8,
            min_value: 0.0,
            max_value: 1000.0,
            smoothness: 0.5,
            peak_scale: 1.0,
            displacement: Displacement::Off,
        }
    }
}

impl GenerationParameters {
    pub fn new(iterations: u32, min_value: f64, max_value: f64, smoothness: f64) -> Self {
        Self {
            iterations,
            min_value,
            max_value,
            smoothness,
            ..Self::default()
        }
    }

    pub fn with_peak_scale(mut self, peak_scale: f64) -> Self {
        self.peak_scale = peak_scale;
        self
    }

    pub fn with_displacement(mut self, displacement: Displacement) -> Self {
        self.displacement = displacement;
        self
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.max_value - self.min_value
    }

    /// Grid side length for these parameters. Only meaningful once validated.
    #[inline]
    pub fn size(&self) -> usize {
        (1usize << self.iterations) + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 || self.iterations > MAX_ITERATIONS {
            return Err(TerrainError::InvalidParameter(format!(
                "iterations must be in 1..={MAX_ITERATIONS}, got {}",
                self.iterations
            )));
        }
        if !self.min_value.is_finite() || !self.max_value.is_finite() {
            return Err(TerrainError::InvalidParameter(format!(
                "value bounds must be finite, got [{}, {}]",
                self.min_value, self.max_value
            )));
        }
        if self.max_value <= self.min_value {
            return Err(TerrainError::InvalidParameter(format!(
                "max_value ({}) must exceed min_value ({})",
                self.max_value, self.min_value
            )));
        }
        if !(self.smoothness > 0.0 && self.smoothness <= 1.0) {
            return Err(TerrainError::InvalidParameter(format!(
                "smoothness must be in (0, 1], got {}",
                self.smoothness
            )));
        }
        if !(self.peak_scale >= 0.0 && self.peak_scale.is_finite()) {
            return Err(TerrainError::InvalidParameter(format!(
                "peak_scale must be finite and non-negative, got {}",
                self.peak_scale
            )));
        }
        Ok(())
    }
}
