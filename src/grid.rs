use crate::error::{Result, TerrainError};

/// Row-major flat grid. No per-cell objects, addressed `x + y * w`.
/// Edges are hard boundaries: nothing wraps.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

/// Square heightmap produced by the diamond-square generator.
pub type ElevationGrid = Grid<f64>;

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            data: vec![T::default(); w * h],
            w,
            h,
        }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Side length of a square grid.
    #[inline]
    pub fn size(&self) -> usize {
        debug_assert_eq!(self.w, self.h);
        self.w
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.w && y < self.h,
            "index ({x}, {y}) out of range for {}x{} grid",
            self.w,
            self.h
        );
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    pub fn try_get(&self, x: usize, y: usize) -> Result<T> {
        self.check(x, y)?;
        Ok(self.get(x, y))
    }

    pub fn try_set(&mut self, x: usize, y: usize, v: T) -> Result<()> {
        self.check(x, y)?;
        self.set(x, y, v);
        Ok(())
    }

    fn check(&self, x: usize, y: usize) -> Result<()> {
        if x < self.w && y < self.h {
            Ok(())
        } else {
            Err(TerrainError::IndexOutOfRange {
                x,
                y,
                w: self.w,
                h: self.h,
            })
        }
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h
    }

    /// Axis-aligned neighbors at distance `dist` that lie inside the grid.
    /// Order: left, right, up, down.
    pub fn axis_neighbors(&self, x: usize, y: usize, dist: usize) -> impl Iterator<Item = (usize, usize)> {
        let d = dist as i64;
        self.neighbors_at(x, y, [(-d, 0), (d, 0), (0, -d), (0, d)])
    }

    /// Diagonal neighbors at distance `dist` that lie inside the grid.
    /// Order: top-left, top-right, bottom-left, bottom-right.
    pub fn diagonal_neighbors(&self, x: usize, y: usize, dist: usize) -> impl Iterator<Item = (usize, usize)> {
        let d = dist as i64;
        self.neighbors_at(x, y, [(-d, -d), (d, -d), (-d, d), (d, d)])
    }

    fn neighbors_at(&self, x: usize, y: usize, offsets: [(i64, i64); 4]) -> impl Iterator<Item = (usize, usize)> {
        let mut out = [(0usize, 0usize); 4];
        let mut n = 0;
        for (dx, dy) in offsets {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if self.in_bounds(nx, ny) {
                out[n] = (nx as usize, ny as usize);
                n += 1;
            }
        }
        out.into_iter().take(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let g = ElevationGrid::square(5);
        assert_eq!(g.size(), 5);
        assert_eq!(g.data.len(), 25);
        assert!(g.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_row_major_layout() {
        let mut g = Grid::<u8>::new(4, 3);
        g.set(3, 1, 9);
        assert_eq!(g.data[7], 9);
        assert_eq!(g.get(3, 1), 9);
    }

    #[test]
    fn test_try_get_out_of_range() {
        let g = ElevationGrid::square(3);
        assert!(g.try_get(2, 2).is_ok());
        match g.try_get(3, 0) {
            Err(TerrainError::IndexOutOfRange { x: 3, y: 0, w: 3, h: 3 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_try_set_out_of_range_leaves_grid_untouched() {
        let mut g = ElevationGrid::square(3);
        assert!(g.try_set(0, 3, 1.0).is_err());
        assert!(g.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        let g = ElevationGrid::square(3);
        g.get(0, 3);
    }

    #[test]
    fn test_axis_neighbors_clip_at_edges() {
        let g = ElevationGrid::square(5);
        let corner: Vec<_> = g.axis_neighbors(0, 0, 2).collect();
        assert_eq!(corner, vec![(2, 0), (0, 2)]);
        let edge: Vec<_> = g.axis_neighbors(2, 0, 2).collect();
        assert_eq!(edge, vec![(0, 0), (4, 0), (2, 2)]);
        let interior: Vec<_> = g.axis_neighbors(2, 2, 1).collect();
        assert_eq!(interior, vec![(1, 2), (3, 2), (2, 1), (2, 3)]);
    }

    #[test]
    fn test_diagonal_neighbors() {
        let g = ElevationGrid::square(5);
        let all: Vec<_> = g.diagonal_neighbors(1, 1, 1).collect();
        assert_eq!(all, vec![(0, 0), (2, 0), (0, 2), (2, 2)]);
        let clipped: Vec<_> = g.diagonal_neighbors(0, 0, 1).collect();
        assert_eq!(clipped, vec![(1, 1)]);
    }
}
