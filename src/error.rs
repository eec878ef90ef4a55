use thiserror::Error;

/// Errors produced by terrain generation and classification.
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("index ({x}, {y}) out of range for {w}x{h} grid")]
    IndexOutOfRange { x: usize, y: usize, w: usize, h: usize },
    #[error("degenerate elevation range: min ({min}) >= max ({max})")]
    DegenerateRange { min: f64, max: f64 },
    #[error("invalid band table: {0}")]
    InvalidBandTable(String),
    #[error("band table JSON error: {0}")]
    BandTableJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
