use super::Direction;
use steiner_common::db::capacity::CapacityMatrix;

/// Horizontal and vertical capacity/usage maps with lazily rebuilt
/// overflow prefix sums.
///
/// Usage changes only mark the grid dirty; the next overflow query rebuilds
/// both prefix-sum tables in O(width * height) and later queries are O(1)
/// until usage changes again. Apply a whole tree's usage before querying.
#[derive(Clone, Debug)]
pub struct CongestionGrid {
    width: usize,
    height: usize,
    h_capacity: Vec<i32>,
    v_capacity: Vec<i32>,
    h_usage: Vec<i32>,
    v_usage: Vec<i32>,
    // Row-wise, `height * (width + 1)`, leading zero per row.
    h_overflow_sum: Vec<u32>,
    // Column-wise, `(height + 1) * width`, leading zero row.
    v_overflow_sum: Vec<u32>,
    dirty: bool,
}

impl CongestionGrid {
    /// Grid covering the union of both matrices' extents; cells a matrix does
    /// not declare get capacity zero.
    pub fn new(h_capacity: &CapacityMatrix, v_capacity: &CapacityMatrix) -> Self {
        let width = h_capacity.cols().max(v_capacity.cols());
        let height = h_capacity.rows().max(v_capacity.rows());

        let pad = |m: &CapacityMatrix| {
            let mut out = vec![0; width * height];
            for y in 0..m.rows() {
                for x in 0..m.cols() {
                    out[y * width + x] = m.get(y, x);
                }
            }
            out
        };

        if width * height > 50_000_000 {
            log::warn!(
                "Allocating large CongestionGrid: {}x{} cells.",
                width,
                height
            );
        }

        Self {
            width,
            height,
            h_capacity: pad(h_capacity),
            v_capacity: pad(v_capacity),
            h_usage: vec![0; width * height],
            v_usage: vec![0; width * height],
            h_overflow_sum: vec![0; height * (width + 1)],
            v_overflow_sum: vec![0; (height + 1) * width],
            dirty: true,
        }
    }

    /// Uniform capacity in both directions.
    pub fn uniform(width: usize, height: usize, capacity: i32) -> Self {
        let m = CapacityMatrix::filled(height, width, capacity);
        Self::new(&m, &m)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn capacity(&self, dir: Direction, x: usize, y: usize) -> i32 {
        let idx = self.index(x, y);
        match dir {
            Direction::Horizontal => self.h_capacity[idx],
            Direction::Vertical => self.v_capacity[idx],
        }
    }

    pub fn usage(&self, dir: Direction, x: usize, y: usize) -> i32 {
        let idx = self.index(x, y);
        match dir {
            Direction::Horizontal => self.h_usage[idx],
            Direction::Vertical => self.v_usage[idx],
        }
    }

    pub fn is_overflowed(&self, dir: Direction, x: usize, y: usize) -> bool {
        self.usage(dir, x, y) > self.capacity(dir, x, y)
    }

    /// Adds `delta` to horizontal usage of row `y`, columns `[x_low, x_high)`.
    pub fn change_h_usage(&mut self, y: usize, x_low: usize, x_high: usize, delta: i32) {
        let row = y * self.width;
        for u in &mut self.h_usage[row + x_low..row + x_high] {
            *u += delta;
        }
        self.dirty = true;
    }

    /// Adds `delta` to vertical usage of column `x`, rows `[y_low, y_high)`.
    pub fn change_v_usage(&mut self, x: usize, y_low: usize, y_high: usize, delta: i32) {
        for y in y_low..y_high {
            let idx = self.index(x, y);
            self.v_usage[idx] += delta;
        }
        self.dirty = true;
    }

    /// Overflowed horizontal cells in row `y`, columns `[x_low, x_high)`.
    pub fn count_h_overflow(&mut self, y: usize, x_low: usize, x_high: usize) -> u32 {
        self.refresh();
        let row = y * (self.width + 1);
        self.h_overflow_sum[row + x_high] - self.h_overflow_sum[row + x_low]
    }

    /// Overflowed vertical cells in column `x`, rows `[y_low, y_high)`.
    pub fn count_v_overflow(&mut self, x: usize, y_low: usize, y_high: usize) -> u32 {
        self.refresh();
        self.v_overflow_sum[y_high * self.width + x] - self.v_overflow_sum[y_low * self.width + x]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuilds the prefix sums if any usage changed since the last rebuild.
    pub fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        log::trace!("CongestionGrid: updating overflow sums");
        let w = self.width;

        for y in 0..self.height {
            let row = y * (w + 1);
            self.h_overflow_sum[row] = 0;
            for x in 0..w {
                let idx = y * w + x;
                let over = (self.h_usage[idx] > self.h_capacity[idx]) as u32;
                self.h_overflow_sum[row + x + 1] = self.h_overflow_sum[row + x] + over;
            }
        }

        for x in 0..w {
            self.v_overflow_sum[x] = 0;
        }
        for y in 0..self.height {
            for x in 0..w {
                let idx = y * w + x;
                let over = (self.v_usage[idx] > self.v_capacity[idx]) as u32;
                self.v_overflow_sum[(y + 1) * w + x] = self.v_overflow_sum[y * w + x] + over;
            }
        }

        self.dirty = false;
    }

    /// Overflowed cells over the whole grid, both directions.
    pub fn total_overflow(&mut self) -> u64 {
        let mut total = 0u64;
        for y in 0..self.height {
            total += self.count_h_overflow(y, 0, self.width) as u64;
        }
        for x in 0..self.width {
            total += self.count_v_overflow(x, 0, self.height) as u64;
        }
        total
    }

    pub fn max_usage(&self) -> i32 {
        self.h_usage
            .iter()
            .chain(self.v_usage.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Usage maps as `(horizontal, vertical)`, row-major.
    pub fn usage_maps(&self) -> (&[i32], &[i32]) {
        (&self.h_usage, &self.v_usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_h(grid: &CongestionGrid, y: usize, lo: usize, hi: usize) -> u32 {
        (lo..hi)
            .filter(|&x| grid.is_overflowed(Direction::Horizontal, x, y))
            .count() as u32
    }

    fn brute_v(grid: &CongestionGrid, x: usize, lo: usize, hi: usize) -> u32 {
        (lo..hi)
            .filter(|&y| grid.is_overflowed(Direction::Vertical, x, y))
            .count() as u32
    }

    #[test]
    fn pads_to_union_of_extents() {
        let h = CapacityMatrix::filled(2, 5, 3);
        let v = CapacityMatrix::filled(4, 1, 7);
        let grid = CongestionGrid::new(&h, &v);
        assert_eq!((grid.width(), grid.height()), (5, 4));
        assert_eq!(grid.capacity(Direction::Horizontal, 4, 1), 3);
        assert_eq!(grid.capacity(Direction::Horizontal, 4, 3), 0);
        assert_eq!(grid.capacity(Direction::Vertical, 0, 3), 7);
        assert_eq!(grid.capacity(Direction::Vertical, 1, 0), 0);
    }

    #[test]
    fn usage_change_is_reversible() {
        let mut grid = CongestionGrid::uniform(8, 6, 1);
        grid.change_h_usage(2, 1, 6, 3);
        grid.change_v_usage(4, 0, 5, 2);
        let (h_before, v_before) = (grid.h_usage.clone(), grid.v_usage.clone());

        grid.change_h_usage(2, 3, 7, 5);
        grid.change_v_usage(4, 2, 6, 4);
        grid.change_h_usage(2, 3, 7, -5);
        grid.change_v_usage(4, 2, 6, -4);
        assert_eq!(grid.h_usage, h_before);
        assert_eq!(grid.v_usage, v_before);
    }

    #[test]
    fn half_open_ranges() {
        let mut grid = CongestionGrid::uniform(10, 10, 0);
        grid.change_h_usage(3, 2, 5, 1);
        assert_eq!(grid.usage(Direction::Horizontal, 1, 3), 0);
        assert_eq!(grid.usage(Direction::Horizontal, 2, 3), 1);
        assert_eq!(grid.usage(Direction::Horizontal, 4, 3), 1);
        assert_eq!(grid.usage(Direction::Horizontal, 5, 3), 0);
        assert_eq!(grid.count_h_overflow(3, 0, 10), 3);
        assert_eq!(grid.count_h_overflow(3, 3, 4), 1);
        assert_eq!(grid.count_h_overflow(3, 5, 5), 0);
        assert_eq!(grid.count_h_overflow(2, 0, 10), 0);
    }

    #[test]
    fn dirty_flag_tracks_mutation() {
        let mut grid = CongestionGrid::uniform(4, 4, 1);
        assert!(grid.is_dirty());
        assert_eq!(grid.count_v_overflow(0, 0, 4), 0);
        assert!(!grid.is_dirty());
        grid.change_v_usage(0, 0, 2, 2);
        assert!(grid.is_dirty());
        assert_eq!(grid.count_v_overflow(0, 0, 4), 2);
        assert!(!grid.is_dirty());
    }

    #[test]
    fn overflow_counts_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let (w, h) = (17, 11);
        let mut hcap = CapacityMatrix::new(h, w);
        let mut vcap = CapacityMatrix::new(h, w);
        for y in 0..h {
            for x in 0..w {
                hcap.set(y, x, rng.gen_range(0..3));
                vcap.set(y, x, rng.gen_range(0..3));
            }
        }
        let mut grid = CongestionGrid::new(&hcap, &vcap);

        for round in 0..20 {
            for _ in 0..10 {
                let y = rng.gen_range(0..h);
                let a = rng.gen_range(0..=w);
                let b = rng.gen_range(a..=w);
                grid.change_h_usage(y, a, b, rng.gen_range(1..3));
                let x = rng.gen_range(0..w);
                let a = rng.gen_range(0..=h);
                let b = rng.gen_range(a..=h);
                grid.change_v_usage(x, a, b, rng.gen_range(1..3));
            }
            for _ in 0..25 {
                let y = rng.gen_range(0..h);
                let a = rng.gen_range(0..=w);
                let b = rng.gen_range(a..=w);
                let expected = brute_h(&grid, y, a, b);
                assert_eq!(grid.count_h_overflow(y, a, b), expected, "round {}", round);

                let x = rng.gen_range(0..w);
                let a = rng.gen_range(0..=h);
                let b = rng.gen_range(a..=h);
                let expected = brute_v(&grid, x, a, b);
                assert_eq!(grid.count_v_overflow(x, a, b), expected, "round {}", round);
            }
        }

        let mut total = 0u64;
        for y in 0..h {
            total += brute_h(&grid, y, 0, w) as u64;
        }
        for x in 0..w {
            total += brute_v(&grid, x, 0, h) as u64;
        }
        assert_eq!(grid.total_overflow(), total);
    }
}
