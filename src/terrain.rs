use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};
use crate::grid::{ElevationGrid, Grid};
use crate::stats::height_range;

/// A weighted slice of the normalized elevation domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainBand {
    pub label: String,
    /// RGBA display color.
    pub color: [u8; 4],
    pub weight: u32,
}

impl TerrainBand {
    pub fn new(label: impl Into<String>, color: [u8; 4], weight: u32) -> Self {
        Self {
            label: label.into(),
            color,
            weight,
        }
    }
}

/// Ordered, validated band list. Bands are tested front to back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TerrainBand>", into = "Vec<TerrainBand>")]
pub struct BandTable {
    bands: Vec<TerrainBand>,
    total_weight: u32,
}

const DEEP_OCEAN: [u8; 4] = [18, 36, 70, 255];
const OCEAN: [u8; 4] = [38, 78, 120, 255];
const BEACH: [u8; 4] = [210, 200, 160, 255];
const GRASS: [u8; 4] = [70, 130, 62, 255];
const FOREST: [u8; 4] = [34, 90, 40, 255];
const MOUNTAIN: [u8; 4] = [140, 120, 100, 255];
const GLACIER: [u8; 4] = [245, 248, 250, 255];

impl Default for BandTable {
    /// Weight sum 21.
    fn default() -> Self {
        let bands = vec![
            TerrainBand::new("DEEP_OCEAN", DEEP_OCEAN, 3),
            TerrainBand::new("OCEAN", OCEAN, 1),
            TerrainBand::new("BEACH", BEACH, 2),
            TerrainBand::new("GRASS", GRASS, 5),
            TerrainBand::new("FOREST", FOREST, 7),
            TerrainBand::new("MOUNTAIN", MOUNTAIN, 2),
            TerrainBand::new("GLACIER", GLACIER, 1),
        ];
        let total_weight = bands.iter().map(|b| b.weight).sum();
        Self { bands, total_weight }
    }
}

impl BandTable {
    /// Band indices are stored as `u8` in classified grids.
    pub const MAX_BANDS: usize = 256;

    pub fn new(bands: Vec<TerrainBand>) -> Result<Self> {
        if bands.is_empty() {
            return Err(TerrainError::InvalidBandTable("no bands".into()));
        }
        if bands.len() > Self::MAX_BANDS {
            return Err(TerrainError::InvalidBandTable(format!(
                "{} bands, at most {} supported",
                bands.len(),
                Self::MAX_BANDS
            )));
        }
        if let Some(b) = bands.iter().find(|b| b.weight == 0) {
            return Err(TerrainError::InvalidBandTable(format!(
                "band {:?} has zero weight",
                b.label
            )));
        }
        let total_weight = bands
            .iter()
            .try_fold(0u32, |acc, b| acc.checked_add(b.weight))
            .ok_or_else(|| TerrainError::InvalidBandTable("total weight overflows u32".into()))?;
        Ok(Self { bands, total_weight })
    }

    /// Parse a JSON array of `{label, color, weight}` records.
    pub fn from_json(json: &str) -> Result<Self> {
        let bands: Vec<TerrainBand> = serde_json::from_str(json)?;
        Self::new(bands)
    }

    pub fn bands(&self) -> &[TerrainBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    pub fn get(&self, index: usize) -> Option<&TerrainBand> {
        self.bands.get(index)
    }
}

impl TryFrom<Vec<TerrainBand>> for BandTable {
    type Error = TerrainError;

    fn try_from(bands: Vec<TerrainBand>) -> Result<Self> {
        Self::new(bands)
    }
}

impl From<BandTable> for Vec<TerrainBand> {
    fn from(table: BandTable) -> Self {
        table.bands
    }
}

/// Index of the band `value` falls into, given the observed `[min, max]`.
///
/// Heights are shifted by `min(min, 0)`, not `min`: a range that is entirely
/// positive is measured from zero. The first band whose cumulative weight
/// reaches the scaled value wins; overshoot lands in the last band.
pub fn classify_index(value: f64, min: f64, max: f64, bands: &BandTable) -> Result<usize> {
    let e_range = max - min;
    if !(e_range > 0.0) {
        return Err(TerrainError::DegenerateRange { min, max });
    }
    let scaled = (value - min.min(0.0)) * bands.total_weight() as f64 / e_range;

    let mut cumulative = 0u32;
    for (i, band) in bands.bands().iter().enumerate() {
        cumulative += band.weight;
        if cumulative as f64 >= scaled {
            return Ok(i);
        }
    }
    Ok(bands.len() - 1)
}

pub fn classify(value: f64, min: f64, max: f64, bands: &BandTable) -> Result<&TerrainBand> {
    let i = classify_index(value, min, max, bands)?;
    Ok(&bands.bands()[i])
}

/// Classify every cell against the grid's own observed range.
pub fn classify_grid(grid: &ElevationGrid, bands: &BandTable) -> Result<Grid<u8>> {
    let (min, max) = height_range(grid);
    let mut out = Grid::<u8>::new(grid.w, grid.h);
    for (dst, &v) in out.data.iter_mut().zip(&grid.data) {
        *dst = classify_index(v, min, max, bands)? as u8;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(table: &BandTable) -> Vec<&str> {
        table.bands().iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn test_default_table() {
        let t = BandTable::default();
        assert_eq!(t.total_weight(), 21);
        assert_eq!(
            labels(&t),
            ["DEEP_OCEAN", "OCEAN", "BEACH", "GRASS", "FOREST", "MOUNTAIN", "GLACIER"]
        );
    }

    #[test]
    fn test_band_edges() {
        let t = BandTable::default();
        // Range [0, 21] makes scaled == value.
        let label = |v: f64| classify(v, 0.0, 21.0, &t).unwrap().label.as_str();
        assert_eq!(label(0.0), "DEEP_OCEAN");
        assert_eq!(label(3.0), "DEEP_OCEAN");
        assert_eq!(label(3.5), "OCEAN");
        assert_eq!(label(4.0), "OCEAN");
        assert_eq!(label(5.0), "BEACH");
        assert_eq!(label(11.0), "GRASS");
        assert_eq!(label(18.0), "FOREST");
        assert_eq!(label(20.0), "MOUNTAIN");
        assert_eq!(label(20.5), "GLACIER");
        assert_eq!(label(21.0), "GLACIER");
    }

    #[test]
    fn test_min_and_max_hit_first_and_last() {
        let t = BandTable::default();
        for (min, max) in [(0.0, 1.0), (-10.0, 10.0), (-300.0, -20.0), (-1.0, 1234.5)] {
            assert_eq!(classify_index(min, min, max, &t).unwrap(), 0);
            assert_eq!(classify_index(max, min, max, &t).unwrap(), t.len() - 1);
        }
    }

    #[test]
    fn test_positive_range_is_measured_from_zero() {
        let t = BandTable::default();
        // min = 10 is not shifted to 0: (10 - 0) * 21 / 40 = 5.25 -> BEACH.
        assert_eq!(classify(10.0, 10.0, 50.0, &t).unwrap().label, "BEACH");
        // Overshoot past the total weight falls back to the last band.
        assert_eq!(classify(50.0, 10.0, 50.0, &t).unwrap().label, "GLACIER");
    }

    #[test]
    fn test_monotonic() {
        let t = BandTable::default();
        let (min, max) = (-37.0, 112.0);
        let mut prev = 0;
        for step in 0..=1000 {
            let v = min + (max - min) * step as f64 / 1000.0;
            let i = classify_index(v, min, max, &t).unwrap();
            assert!(i >= prev, "band went from {prev} to {i} at {v}");
            prev = i;
        }
    }

    #[test]
    fn test_degenerate_range() {
        let t = BandTable::default();
        assert!(matches!(
            classify(1.0, 1.0, 1.0, &t),
            Err(TerrainError::DegenerateRange { .. })
        ));
        assert!(classify(1.0, 2.0, 1.0, &t).is_err());
    }

    #[test]
    fn test_invalid_tables() {
        assert!(BandTable::new(vec![]).is_err());
        let zero = vec![TerrainBand::new("A", [0; 4], 1), TerrainBand::new("B", [0; 4], 0)];
        assert!(matches!(BandTable::new(zero), Err(TerrainError::InvalidBandTable(_))));
    }

    #[test]
    fn test_from_json() {
        let t = BandTable::from_json(
            r#"[{"label":"WATER","color":[0,0,255,255],"weight":1},
                {"label":"LAND","color":[0,255,0,255],"weight":3}]"#,
        )
        .unwrap();
        assert_eq!(t.total_weight(), 4);
        assert_eq!(classify(0.2, 0.0, 1.0, &t).unwrap().label, "WATER");
        assert_eq!(classify(0.3, 0.0, 1.0, &t).unwrap().label, "LAND");

        assert!(matches!(BandTable::from_json("{"), Err(TerrainError::BandTableJson(_))));
        assert!(matches!(BandTable::from_json("[]"), Err(TerrainError::InvalidBandTable(_))));
    }

    #[test]
    fn test_serde_validates() {
        let bad = r#"[{"label":"X","color":[0,0,0,255],"weight":0}]"#;
        assert!(serde_json::from_str::<BandTable>(bad).is_err());
        let t = BandTable::default();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(serde_json::from_str::<BandTable>(&json).unwrap(), t);
    }

    #[test]
    fn test_classify_grid() {
        let mut g = ElevationGrid::square(3);
        g.set(2, 2, 21.0);
        g.set(1, 1, 11.0);
        let t = BandTable::default();
        let c = classify_grid(&g, &t).unwrap();
        assert_eq!(c.get(0, 0), 0);
        assert_eq!(c.get(1, 1), 3);
        assert_eq!(c.get(2, 2), 6);
    }

    #[test]
    fn test_classify_flat_grid_fails() {
        let g = ElevationGrid::square(3);
        assert!(classify_grid(&g, &BandTable::default()).is_err());
    }
}
