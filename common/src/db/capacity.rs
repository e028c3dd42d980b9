/// Row-major integer matrix holding per-gcell routing capacity.
///
/// Rows are indexed by `y`, columns by `x`, matching the layout of the
/// `HCAP`/`VCAP` sections in the input file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapacityMatrix {
    rows: usize,
    cols: usize,
    values: Vec<i32>,
}

impl CapacityMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0; rows * cols],
        }
    }

    pub fn filled(rows: usize, cols: usize, value: i32) -> Self {
        Self {
            rows,
            cols,
            values: vec![value; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize) -> i32 {
        self.values[y * self.cols + x]
    }

    #[inline]
    pub fn set(&mut self, y: usize, x: usize, value: i32) {
        self.values[y * self.cols + x] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_is_row_major() {
        let mut m = CapacityMatrix::filled(2, 3, 1);
        m.set(1, 0, 4);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.get(1, 0), 4);
        assert_eq!(m.get(0, 1), 1);
        assert_eq!(CapacityMatrix::new(2, 2).get(1, 1), 0);
    }
}
