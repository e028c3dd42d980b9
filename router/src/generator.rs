use steiner_common::geom::point::Point;

/// Produces an initial spanning topology for a net, in the flat
/// `[v0, h0, v1, h1, ...]` encoding (`2 * (points - 1)` indices).
pub trait TopologyGenerator {
    fn generate(&self, points: &[Point<i32>]) -> Vec<usize>;

    fn generate_all(&self, nets: &[Vec<Point<i32>>]) -> Vec<Vec<usize>> {
        nets.iter().map(|points| self.generate(points)).collect()
    }
}

/// Rectilinear minimum spanning tree (Prim from pin 0), or a greedy
/// nearest-neighbour chain when `fast_two_pin` is set. Each edge hangs the
/// newly attached pin's vertical segment on its parent's horizontal one.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpanningTreeGenerator {
    pub fast_two_pin: bool,
}

impl SpanningTreeGenerator {
    pub fn new(fast_two_pin: bool) -> Self {
        Self { fast_two_pin }
    }

    fn prim(points: &[Point<i32>]) -> Vec<usize> {
        let n = points.len();
        let mut flat = Vec::with_capacity(2 * n.saturating_sub(1));
        if n < 2 {
            return flat;
        }

        let mut in_tree = vec![false; n];
        let mut dist = vec![i64::MAX; n];
        let mut parent = vec![0usize; n];
        in_tree[0] = true;
        for i in 1..n {
            dist[i] = points[0].manhattan(&points[i]);
        }

        for _ in 1..n {
            // Ties resolve to the lowest index.
            let mut next = usize::MAX;
            for i in 0..n {
                if !in_tree[i] && (next == usize::MAX || dist[i] < dist[next]) {
                    next = i;
                }
            }
            in_tree[next] = true;
            flat.push(next);
            flat.push(parent[next]);

            for i in 0..n {
                if in_tree[i] {
                    continue;
                }
                let d = points[next].manhattan(&points[i]);
                if d < dist[i] {
                    dist[i] = d;
                    parent[i] = next;
                }
            }
        }
        flat
    }

    fn chain(points: &[Point<i32>]) -> Vec<usize> {
        let n = points.len();
        let mut flat = Vec::with_capacity(2 * n.saturating_sub(1));
        if n < 2 {
            return flat;
        }

        let mut visited = vec![false; n];
        visited[0] = true;
        let mut current = 0;
        for _ in 1..n {
            let mut next = usize::MAX;
            let mut best = i64::MAX;
            for i in 0..n {
                if visited[i] {
                    continue;
                }
                let d = points[current].manhattan(&points[i]);
                if d < best {
                    best = d;
                    next = i;
                }
            }
            visited[next] = true;
            flat.push(next);
            flat.push(current);
            current = next;
        }
        flat
    }
}

impl TopologyGenerator for SpanningTreeGenerator {
    fn generate(&self, points: &[Point<i32>]) -> Vec<usize> {
        if self.fast_two_pin {
            Self::chain(points)
        } else {
            Self::prim(points)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::RoutingTopology;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn pts(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn length(points: &[Point<i32>], flat: &[usize]) -> i64 {
        flat.chunks_exact(2)
            .map(|c| points[c[0]].manhattan(&points[c[1]]))
            .sum()
    }

    #[test]
    fn prim_on_square() {
        let p = pts(&[(0, 0), (0, 10), (10, 0), (10, 10)]);
        let flat = SpanningTreeGenerator::new(false).generate(&p);
        assert_eq!(flat, vec![1, 0, 2, 0, 3, 1]);
    }

    #[test]
    fn chain_follows_nearest() {
        let p = pts(&[(0, 0), (9, 0), (1, 0), (5, 0)]);
        let flat = SpanningTreeGenerator::new(true).generate(&p);
        assert_eq!(flat, vec![2, 0, 3, 2, 1, 3]);
    }

    #[test]
    fn degenerate_nets() {
        let g = SpanningTreeGenerator::default();
        assert!(g.generate(&[]).is_empty());
        assert!(g.generate(&pts(&[(2, 2)])).is_empty());
        assert_eq!(g.generate(&pts(&[(2, 2), (2, 2)])), vec![1, 0]);
    }

    #[test]
    fn always_spanning_and_mst_is_shortest() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let n = rng.gen_range(2..20);
            let p: Vec<Point<i32>> = (0..n)
                .map(|_| Point::new(rng.gen_range(0..50), rng.gen_range(0..50)))
                .collect();
            let mst = SpanningTreeGenerator::new(false).generate(&p);
            let fast = SpanningTreeGenerator::new(true).generate(&p);
            for flat in [&mst, &fast] {
                assert_eq!(flat.len(), 2 * (n - 1));
                let topo = RoutingTopology::from_flat(flat).unwrap();
                assert!(topo.is_spanning_tree(n));
            }
            assert!(length(&p, &mst) <= length(&p, &fast));
        }
    }
}
