use std::fmt::Write;

use rayon::prelude::*;

use crate::grid::{ElevationGrid, Grid};
use crate::terrain::BandTable;

const SHADOW: [u8; 4] = [0, 0, 0, 255];
const HIGHLIGHT: [u8; 4] = [255, 255, 255, 255];

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Flat band colors.
pub fn render_terrain(terrain: &Grid<u8>, bands: &BandTable) -> Vec<u8> {
    let w = terrain.w;
    let h = terrain.h;
    let mut rgba = vec![0u8; w * h * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let color = band_color(bands, terrain.get(x, y));
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });

    rgba
}

/// Band colors with a light NW hillshade from the height gradient.
pub fn render_map(terrain: &Grid<u8>, height: &ElevationGrid, bands: &BandTable) -> Vec<u8> {
    let w = terrain.w;
    let h = terrain.h;
    let (min_h, max_h) = crate::stats::height_range(height);
    // Gradient is measured in grid cells, normalized by the total relief.
    let relief = ((max_h - min_h) / w.max(1) as f64).max(f64::EPSILON);
    let mut rgba = vec![0u8; w * h * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let base = band_color(bands, terrain.get(x, y));
            let xl = x.saturating_sub(1);
            let xr = (x + 1).min(w - 1);
            let yu = y.saturating_sub(1);
            let yd = (y + 1).min(h - 1);
            let dx = height.get(xr, y) - height.get(xl, y);
            let dy = height.get(x, yd) - height.get(x, yu);
            // Light from the north-west: slopes facing it brighten.
            let shade = (-(dx + dy) / relief * 0.05) as f32;
            let color = if shade >= 0.0 {
                lerp_color(base, HIGHLIGHT, shade.min(0.35))
            } else {
                lerp_color(base, SHADOW, (-shade).min(0.35))
            };
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });

    rgba
}

#[inline]
fn band_color(bands: &BandTable, index: u8) -> [u8; 4] {
    bands
        .get(index as usize)
        .map(|b| b.color)
        .unwrap_or([255, 0, 255, 255])
}

/// Diagnostic: grayscale heightmap.
pub fn render_heightmap(height: &ElevationGrid) -> Vec<u8> {
    let (min_h, max_h) = crate::stats::height_range(height);
    let range = (max_h - min_h).max(f64::EPSILON);
    let w = height.w;
    let h = height.h;
    let mut rgba = vec![0u8; w * h * 4];
    for i in 0..w * h {
        let t = (height.data[i] - min_h) / range;
        let v = (t * 255.0).clamp(0.0, 255.0) as u8;
        rgba[i * 4..i * 4 + 4].copy_from_slice(&[v, v, v, 255]);
    }
    rgba
}

/// Plain-text dump: one row per line, space separated.
pub fn heights_to_text(height: &ElevationGrid) -> String {
    let mut out = String::with_capacity(height.data.len() * 10);
    for row in height.data.chunks(height.w) {
        for (x, v) in row.iter().enumerate() {
            if x > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{v:.3}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heightmap_spans_black_to_white() {
        let mut g = ElevationGrid::square(3);
        g.set(0, 0, -2.0);
        g.set(2, 2, 6.0);
        let rgba = render_heightmap(&g);
        assert_eq!(rgba.len(), 9 * 4);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[8 * 4..9 * 4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_flat_heightmap_does_not_divide_by_zero() {
        let rgba = render_heightmap(&ElevationGrid::square(3));
        assert!(rgba.chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn test_terrain_uses_band_colors() {
        let bands = BandTable::default();
        let mut t = Grid::<u8>::new(2, 1);
        t.set(1, 0, 6);
        let rgba = render_terrain(&t, &bands);
        assert_eq!(&rgba[0..4], &bands.bands()[0].color);
        assert_eq!(&rgba[4..8], &bands.bands()[6].color);
    }

    #[test]
    fn test_flat_map_is_unshaded() {
        let bands = BandTable::default();
        let t = Grid::<u8>::new(3, 3);
        let rgba = render_map(&t, &ElevationGrid::square(3), &bands);
        assert!(rgba.chunks(4).all(|px| px == bands.bands()[0].color));
    }

    #[test]
    fn test_text_dump_layout() {
        let mut g = ElevationGrid::square(3);
        g.set(1, 0, 1.5);
        let text = heights_to_text(&g);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0.000 1.500 0.000");
    }
}
