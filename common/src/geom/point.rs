#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl Point<i32> {
    /// Rectilinear distance, widened so long nets cannot overflow.
    #[inline]
    pub fn manhattan(&self, other: &Point<i32>) -> i64 {
        (self.x as i64 - other.x as i64).abs() + (self.y as i64 - other.y as i64).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_is_symmetric() {
        let a = Point::new(3, -4);
        let b = Point::new(-2, 6);
        assert_eq!(a.manhattan(&b), 15);
        assert_eq!(b.manhattan(&a), 15);
        assert_eq!(a.manhattan(&a), 0);
    }
}
