use crate::algo::neighbors::CandidateGenerator;
use crate::algo::union_find::UnionFind;
use crate::error::TopologyError;
use crate::eval::Evaluator;
use crate::grid::CongestionGrid;
use crate::topology::Edge;
use crate::tree::RoutingTree;

/// Steepest-descent edge swapping for a single net.
///
/// Each round tries every "remove one edge, reconnect the two halves through
/// a candidate pair" move and applies only the best strictly improving one.
/// Rounds continue until no move improves the cost.
pub struct TopologyOptimizer<'a> {
    evaluator: &'a Evaluator,
}

#[derive(Clone, Copy, Debug)]
struct Swap {
    remove: usize,
    add: Edge,
}

impl<'a> TopologyOptimizer<'a> {
    pub fn new(evaluator: &'a Evaluator) -> Self {
        Self { evaluator }
    }

    /// Returns the best tree found and its cost. The cost is never above the
    /// input tree's cost under the same grid.
    pub fn optimize(
        &self,
        tree: &RoutingTree,
        grid: &mut CongestionGrid,
    ) -> Result<(RoutingTree, f64), TopologyError> {
        let n = tree.n_pins();
        let candidates = CandidateGenerator::new(&tree.positions());
        let mut topology = tree.topology().clone();
        let mut best_cost = self.evaluator.evaluate(tree, grid, None);
        let mut rounds = 0usize;

        loop {
            let round_start = best_cost;
            let mut best_swap: Option<Swap> = None;

            for remove in 0..topology.len() {
                let reduced = topology.without(remove);
                let mut components = UnionFind::new(n);
                for e in &reduced {
                    components.union(e.v, e.h);
                }

                for a in 0..n {
                    for &b in candidates.candidates(a) {
                        if components.connected(a, b) {
                            continue;
                        }
                        let mut trial = reduced.clone();
                        let add = Edge::new(a, b);
                        trial.push(add);
                        let trial_tree = tree.with_topology(trial)?;
                        let cost = self.evaluator.evaluate(&trial_tree, grid, None);
                        if cost < best_cost {
                            best_cost = cost;
                            best_swap = Some(Swap { remove, add });
                        }
                    }
                }
            }

            match best_swap {
                Some(swap) if best_cost < round_start => {
                    topology.remove(swap.remove);
                    topology.push(swap.add);
                    rounds += 1;
                }
                _ => break,
            }
        }

        log::trace!(
            "net {}: {} improving rounds, cost {:.3}",
            tree.net_id(),
            rounds,
            best_cost
        );
        Ok((tree.with_topology(topology)?, best_cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::tests::grid_with;
    use crate::eval::{DetourEvaluator, LengthEvaluator, OverflowEvaluator};
    use crate::topology::RoutingTopology;
    use crate::tree::tests::{chain, make_pins, star};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use steiner_common::util::config::{DetourConfig, WeightsConfig};

    #[test]
    fn removes_chain_detour() {
        let t = chain();
        let mut grid = CongestionGrid::uniform(11, 11, 4);
        let eval = Evaluator::Detour(DetourEvaluator::default());
        let (best, cost) = TopologyOptimizer::new(&eval).optimize(&t, &mut grid).unwrap();
        assert_eq!(cost, 0.0);
        assert!(best.topology().is_spanning_tree(4));
        assert_eq!(eval.evaluate(&best, &mut grid, None), 0.0);
    }

    #[test]
    fn avoids_blocked_column() {
        let t = star();
        let mut grid = grid_with(&t);
        let eval = Evaluator::Overflow(OverflowEvaluator);
        assert_eq!(eval.evaluate(&t, &mut grid, None), 10.0);

        let (best, cost) = TopologyOptimizer::new(&eval).optimize(&t, &mut grid).unwrap();
        assert_eq!(cost, 0.0);
        // Pin 3 must now be reached horizontally.
        assert_eq!(best.y_low(3), best.y_high(3));
        assert_eq!(best.x(3), 10);
    }

    #[test]
    fn optimal_tree_is_left_alone() {
        let pins = make_pins(&[(0, 0), (5, 0)], 0, &[]);
        let t = RoutingTree::new(0, pins, RoutingTopology::from_pairs(&[(1, 0)])).unwrap();
        let mut grid = CongestionGrid::uniform(6, 1, 1);
        let eval = Evaluator::Length(LengthEvaluator);
        let (best, cost) = TopologyOptimizer::new(&eval).optimize(&t, &mut grid).unwrap();
        assert_eq!(cost, 5.0);
        assert_eq!(best.topology(), t.topology());
    }

    #[test]
    fn never_worse_than_input() {
        let mut rng = StdRng::seed_from_u64(7);
        let eval = Evaluator::from_config(&WeightsConfig::default(), &DetourConfig::default());
        for _ in 0..20 {
            let n = rng.gen_range(2..8);
            let coords: Vec<(i32, i32)> = (0..n)
                .map(|_| (rng.gen_range(0..12), rng.gen_range(0..12)))
                .collect();
            let slacks: Vec<f64> = (0..n).map(|_| rng.gen_range(-2e-11..2e-11)).collect();
            let pins = make_pins(&coords, 0, &slacks);
            let mut topo = RoutingTopology::new();
            for i in 1..n {
                topo.push(Edge::new(i, rng.gen_range(0..i)));
            }
            let t = RoutingTree::new(0, pins, topo).unwrap();
            let mut grid = CongestionGrid::uniform(12, 12, 1);

            let before = eval.evaluate(&t, &mut grid, None);
            let (best, cost) = TopologyOptimizer::new(&eval).optimize(&t, &mut grid).unwrap();
            assert!(cost <= before);
            assert!(best.topology().is_spanning_tree(n));
            assert_eq!(eval.evaluate(&best, &mut grid, None), cost);
        }
    }
}
