pub mod algo;
pub mod check;
pub mod error;
pub mod eval;
pub mod generator;
pub mod grid;
pub mod optimizer;
pub mod resume;
pub mod steiner;
pub mod topology;
pub mod tree;

pub use error::TopologyError;
pub use eval::{CostBreakdown, Evaluator};
pub use grid::CongestionGrid;
pub use optimizer::{ForestOptimizer, TopologyOptimizer};
pub use steiner::SteinerTreeBuilder;
pub use topology::{Edge, RoutingTopology};
pub use tree::RoutingTree;

use anyhow::{Context, anyhow};
use generator::TopologyGenerator;
use resume::NetShape;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use steiner_common::db::core::NetlistDB;
use steiner_common::db::indices::NetId;
use steiner_common::util::config::Config;
use steiner_common::util::profiler::ScopedTimer;

/// Net ids and pin counts in netlist order.
pub fn net_shapes(db: &NetlistDB) -> Vec<NetShape> {
    db.nets
        .iter()
        .map(|net| NetShape {
            net_id: net.id,
            pins: net.pins.len(),
        })
        .collect()
}

/// Runs `generator` over every net.
pub fn generate_topologies(
    db: &NetlistDB,
    generator: &dyn TopologyGenerator,
) -> Result<Vec<RoutingTopology>, TopologyError> {
    let _timer = ScopedTimer::new("Initial topology generation");
    let points: Vec<_> = (0..db.num_nets())
        .map(|i| db.net_points(NetId::new(i)))
        .collect();
    generator
        .generate_all(&points)
        .iter()
        .map(|flat| RoutingTopology::from_flat(flat))
        .collect()
}

pub fn build_grid(db: &NetlistDB) -> anyhow::Result<CongestionGrid> {
    let h = db
        .h_capacity
        .as_ref()
        .ok_or_else(|| anyhow!("Netlist has no HCAP section"))?;
    let v = db
        .v_capacity
        .as_ref()
        .ok_or_else(|| anyhow!("Netlist has no VCAP section"))?;
    let grid = CongestionGrid::new(h, v);
    log::info!("Congestion grid: {} x {}", grid.width(), grid.height());
    Ok(grid)
}

/// One tree per net, checked to span its net and to lie on the grid.
pub fn build_trees(
    db: &NetlistDB,
    topologies: Vec<RoutingTopology>,
    grid: &CongestionGrid,
) -> Result<Vec<RoutingTree>, TopologyError> {
    if topologies.len() != db.num_nets() {
        return Err(TopologyError::MissingNet {
            expected: db.num_nets(),
            found: topologies.len(),
        });
    }

    let mut trees = Vec::with_capacity(topologies.len());
    for (i, topology) in topologies.into_iter().enumerate() {
        let net = &db.nets[i];
        let pins = db.net_pins(NetId::new(i));

        for (k, pin) in pins.iter().enumerate() {
            if !grid.contains(pin.x(), pin.y()) {
                return Err(TopologyError::PinOutsideGrid {
                    pin: k,
                    x: pin.x(),
                    y: pin.y(),
                    width: grid.width(),
                    height: grid.height(),
                });
            }
        }
        if !topology.is_spanning_tree(pins.len()) {
            topology.validate(pins.len())?;
            return Err(TopologyError::NotSpanning { nodes: pins.len() });
        }
        trees.push(RoutingTree::new(net.id, pins, topology)?);
    }
    Ok(trees)
}

/// Grid, trees and evaluator wired into a ready-to-run forest optimizer.
pub fn build_forest(
    db: &NetlistDB,
    topologies: Vec<RoutingTopology>,
    config: &Config,
) -> anyhow::Result<ForestOptimizer> {
    let _timer = ScopedTimer::new("Forest initialization");
    let grid = build_grid(db)?;
    let trees = build_trees(db, topologies, &grid).context("Invalid initial topology")?;
    let evaluator = Evaluator::from_config(&config.weights, &config.detour);

    let forest = ForestOptimizer::new(trees, grid, evaluator);
    Ok(if config.output.render {
        forest.with_render_dir(&config.output.directory)
    } else {
        forest
    })
}

/// Builds the forest, optimizes every net and verifies the result.
pub fn refine(
    db: &NetlistDB,
    topologies: Vec<RoutingTopology>,
    config: &Config,
) -> anyhow::Result<ForestOptimizer> {
    let mut forest = build_forest(db, topologies, config)?;
    optimize_forest(&mut forest)?;
    Ok(forest)
}

/// Optimizes every net of `forest` and verifies the result.
pub fn optimize_forest(forest: &mut ForestOptimizer) -> anyhow::Result<()> {
    {
        let _timer = ScopedTimer::new("Forest optimization");
        forest.optimize()?;
    }
    check::run(forest.trees(), forest.grid()).map_err(|e| anyhow!("Verification failed: {}", e))
}

pub fn write_steiner_trees<W: Write>(out: &mut W, trees: &[RoutingTree]) -> std::io::Result<()> {
    for tree in trees {
        SteinerTreeBuilder::new(tree)
            .build_tree()
            .write_to(tree.net_id(), out)?;
    }
    Ok(())
}

pub fn save_steiner_trees(path: &Path, trees: &[RoutingTree]) -> anyhow::Result<()> {
    let _timer = ScopedTimer::new("Steiner output");
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut out = BufWriter::new(file);
    write_steiner_trees(&mut out, trees)?;
    out.flush()?;
    log::info!("Wrote {} Steiner trees to {:?}", trees.len(), path);
    Ok(())
}
