use super::topology::TopologyOptimizer;
use crate::error::TopologyError;
use crate::eval::{CostBreakdown, Evaluator};
use crate::grid::{CongestionGrid, Direction};
use crate::tree::RoutingTree;
use std::path::{Path, PathBuf};
use steiner_common::geom::point::Point;
use steiner_common::util::visualization::{self, NetDrawing};

const RENDER_SIZE: u32 = 800;

/// Adds `delta` to the grid usage under every span of `tree`.
pub fn apply_usage(grid: &mut CongestionGrid, tree: &RoutingTree, delta: i32) {
    for i in 0..tree.n_pins() {
        grid.change_h_usage(
            tree.y(i) as usize,
            tree.x_low(i) as usize,
            tree.x_high(i) as usize,
            delta,
        );
        grid.change_v_usage(
            tree.x(i) as usize,
            tree.y_low(i) as usize,
            tree.y_high(i) as usize,
            delta,
        );
    }
}

/// Net-by-net refinement of a whole design over one shared congestion grid.
///
/// The grid always holds the usage of exactly the trees currently stored;
/// it changes only when a tree is replaced. Nets are visited in input
/// order, so results depend on that order.
pub struct ForestOptimizer {
    trees: Vec<RoutingTree>,
    costs: Vec<f64>,
    grid: CongestionGrid,
    evaluator: Evaluator,
    render_dir: Option<PathBuf>,
    replaced: usize,
}

impl ForestOptimizer {
    /// Takes ownership of the trees and grid, applies all usage and records
    /// each tree's baseline cost.
    pub fn new(trees: Vec<RoutingTree>, grid: CongestionGrid, evaluator: Evaluator) -> Self {
        let mut forest = Self {
            costs: vec![0.0; trees.len()],
            trees,
            grid,
            evaluator,
            render_dir: None,
            replaced: 0,
        };
        forest.initialize();
        forest
    }

    /// Writes before/after PNGs of every improved net into `dir`.
    pub fn with_render_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.render_dir = Some(dir.into());
        self
    }

    fn initialize(&mut self) {
        for tree in &self.trees {
            apply_usage(&mut self.grid, tree, 1);
        }
        for (i, tree) in self.trees.iter().enumerate() {
            self.costs[i] = self.evaluator.evaluate(tree, &mut self.grid, None);
        }
        log::info!(
            "Initialized forest: {} nets, {} cost {:.3}, overflow {}, max usage {}",
            self.trees.len(),
            self.evaluator.name(),
            self.total_cost(),
            self.grid.total_overflow(),
            self.grid.max_usage()
        );
    }

    pub fn optimize(&mut self) -> Result<(), TopologyError> {
        let total = self.trees.len();
        let optimizer = TopologyOptimizer::new(&self.evaluator);

        for i in 0..total {
            if i % 100 == 0 {
                log::info!("Optimizing net {} / {}", i, total);
            }
            let (candidate, cost) = optimizer.optimize(&self.trees[i], &mut self.grid)?;
            if cost >= self.costs[i] {
                continue;
            }

            log::debug!(
                "net {}: cost {:.3} -> {:.3}, length {} -> {}",
                candidate.net_id(),
                self.costs[i],
                cost,
                self.trees[i].length(),
                candidate.length()
            );
            if let Some(dir) = &self.render_dir {
                let net_id = candidate.net_id();
                render_tree(
                    &self.trees[i],
                    &self.grid,
                    &dir.join(format!("tree_{}_a.png", net_id)),
                );
                render_tree(
                    &candidate,
                    &self.grid,
                    &dir.join(format!("tree_{}_b.png", net_id)),
                );
            }

            apply_usage(&mut self.grid, &self.trees[i], -1);
            apply_usage(&mut self.grid, &candidate, 1);
            self.trees[i] = candidate;
            self.costs[i] = cost;
            self.replaced += 1;
        }

        log::info!(
            "Optimized forest: total cost {:.3}, overflow {}, {} of {} nets replaced",
            self.total_cost(),
            self.grid.total_overflow(),
            self.replaced,
            total
        );
        Ok(())
    }

    pub fn trees(&self) -> &[RoutingTree] {
        &self.trees
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn total_cost(&self) -> f64 {
        self.costs.iter().sum()
    }

    pub fn replaced(&self) -> usize {
        self.replaced
    }

    pub fn grid(&self) -> &CongestionGrid {
        &self.grid
    }

    /// Re-evaluates every tree against the current grid and sums each
    /// breakdown entry by name, in first-seen order.
    pub fn cost_summary(&mut self) -> CostBreakdown {
        let mut names: Vec<String> = Vec::new();
        let mut sums: Vec<f64> = Vec::new();

        for tree in &self.trees {
            let mut b = CostBreakdown::new();
            self.evaluator.evaluate(tree, &mut self.grid, Some(&mut b));
            for entry in b.entries() {
                match names.iter().position(|n| *n == entry.name) {
                    Some(k) => sums[k] += entry.cost,
                    None => {
                        names.push(entry.name.clone());
                        sums.push(entry.cost);
                    }
                }
            }
        }

        let mut summary = CostBreakdown::new();
        for (name, cost) in names.into_iter().zip(sums) {
            summary.record(name, cost, "");
        }
        summary
    }
}

fn render_tree(tree: &RoutingTree, grid: &CongestionGrid, path: &Path) {
    let positions = tree.positions();
    let min_x = positions.iter().map(|p| p.x).min().unwrap_or(0).max(0);
    let max_x = positions.iter().map(|p| p.x).max().unwrap_or(0);
    let min_y = positions.iter().map(|p| p.y).min().unwrap_or(0).max(0);
    let max_y = positions.iter().map(|p| p.y).max().unwrap_or(0);

    let mut overflow_cells = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if !grid.contains(x, y) {
                continue;
            }
            let (ux, uy) = (x as usize, y as usize);
            if grid.is_overflowed(Direction::Horizontal, ux, uy)
                || grid.is_overflowed(Direction::Vertical, ux, uy)
            {
                overflow_cells.push(Point::new(x, y));
            }
        }
    }

    let drawing = NetDrawing {
        grid_width: grid.width(),
        grid_height: grid.height(),
        segments: tree.segments(),
        pins: tree
            .pins()
            .iter()
            .map(|p| (p.position, p.is_driver))
            .collect(),
        overflow_cells,
        caption: format!("net {} length {}", tree.net_id(), tree.length()),
    };
    if let Err(e) = visualization::draw_net(&drawing, path, RENDER_SIZE, RENDER_SIZE) {
        log::warn!("Failed to render {:?}: {}", path, e);
    }
}
