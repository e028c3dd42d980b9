use steiner_common::geom::point::Point;

/// Sparse per-node reconnection candidates.
///
/// Points are swept in `(y, x)` order. Each point keeps four x-bounds, one
/// per rough quadrant, and a pair of points is recorded only when the newer
/// point narrows one of them. The result is a small, deterministic set of
/// "visible" neighbours per node instead of all `N^2` pairs. The relation is
/// not symmetric.
#[derive(Clone, Debug, Default)]
pub struct CandidateGenerator {
    candidates: Vec<Vec<usize>>,
}

impl CandidateGenerator {
    pub fn new(points: &[Point<i32>]) -> Self {
        let n = points.len();
        let mut candidates: Vec<Vec<usize>> = vec![Vec::new(); n];

        // Upper/lower bounds on x already claimed above (ur, ul) and below
        // (lr, ll) each point.
        let mut ur = vec![i64::MAX; n];
        let mut lr = vec![i64::MAX; n];
        let mut ul = vec![i64::MIN; n];
        let mut ll = vec![i64::MIN; n];

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| (points[i].y, points[i].x));

        for (k, &pt) in order.iter().enumerate() {
            let pt_x = points[pt].x as i64;

            for &below in &order[..k] {
                let below_x = points[below].x as i64;
                if below_x <= pt_x && pt_x < ur[below] {
                    candidates[below].push(pt);
                    ur[below] = pt_x;
                } else if ul[below] < pt_x && pt_x < below_x {
                    candidates[below].push(pt);
                    ul[below] = pt_x;
                }
            }

            for &below in order[..k].iter().rev() {
                let below_x = points[below].x as i64;
                if pt_x <= below_x && below_x < lr[pt] {
                    candidates[pt].push(below);
                    lr[pt] = below_x;
                } else if ll[pt] < below_x && below_x < pt_x {
                    candidates[pt].push(below);
                    ll[pt] = below_x;
                }
            }
        }

        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self, node: usize) -> &[usize] {
        &self.candidates[node]
    }

    pub fn total(&self) -> usize {
        self.candidates.iter().map(|c| c.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn pts(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn square_corners() {
        let g = CandidateGenerator::new(&pts(&[(0, 0), (0, 10), (10, 0), (10, 10)]));
        assert_eq!(g.candidates(0), &[2, 1]);
        assert_eq!(g.candidates(1), &[2, 0, 3]);
        assert_eq!(g.candidates(2), &[0, 1, 3]);
        assert_eq!(g.candidates(3), &[1, 2]);
    }

    #[test]
    fn blocked_point_is_not_visible() {
        // Three points in a vertical line: the middle one hides the ends from
        // each other.
        let g = CandidateGenerator::new(&pts(&[(0, 0), (0, 5), (0, 10)]));
        assert_eq!(g.candidates(0), &[1]);
        assert_eq!(g.candidates(1), &[0, 2]);
        assert_eq!(g.candidates(2), &[1]);
    }

    #[test]
    fn sparse_and_never_self() {
        let mut rng = StdRng::seed_from_u64(11);
        let points: Vec<Point<i32>> = (0..200)
            .map(|_| Point::new(rng.gen_range(0..1000), rng.gen_range(0..1000)))
            .collect();
        let g = CandidateGenerator::new(&points);
        assert_eq!(g.len(), 200);
        assert!(g.total() < 200 * 199 / 4);
        for i in 0..g.len() {
            assert!(!g.candidates(i).contains(&i));
            let mut seen = g.candidates(i).to_vec();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), g.candidates(i).len());
        }
    }

    #[test]
    fn empty_and_single() {
        assert!(CandidateGenerator::new(&[]).is_empty());
        let g = CandidateGenerator::new(&pts(&[(4, 4)]));
        assert!(g.candidates(0).is_empty());
    }
}
