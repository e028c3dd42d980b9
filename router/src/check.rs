use crate::grid::CongestionGrid;
use crate::optimizer::forest::apply_usage;
use crate::steiner::SteinerTreeBuilder;
use crate::tree::RoutingTree;
use rayon::prelude::*;

/// Verifies a refined forest: every topology spans its net, every Steiner
/// tree is degree-reduced and no longer than its two-pin tree, the Steiner
/// topology exports to a valid routing tree, and the grid usage matches the
/// stored trees exactly.
pub fn run(trees: &[RoutingTree], grid: &CongestionGrid) -> Result<(), String> {
    log::info!("Starting forest verification ({} nets)", trees.len());

    let (tree_result, usage_result) =
        rayon::join(|| check_trees(trees), || check_usage(trees, grid));

    let mut msgs = Vec::new();
    match tree_result {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Invalid Steiner trees");
            log::error!("{}", e);
            msgs.push(e);
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: All nets form valid Steiner trees."),
    }
    match usage_result {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Grid usage out of sync");
            log::error!("{}", e);
            msgs.push(e);
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: Grid usage matches the forest."),
    }

    if msgs.is_empty() {
        Ok(())
    } else {
        Err(msgs.join("; "))
    }
}

fn check_tree(tree: &RoutingTree) -> Option<String> {
    let n = tree.n_pins();
    if !tree.topology().is_spanning_tree(n) {
        return Some(format!("net {}: topology is not a spanning tree", tree.net_id()));
    }

    let mut graph = SteinerTreeBuilder::new(tree).build_graph();
    graph.split_high_degree_nodes();
    if !graph.is_tree() {
        return Some(format!("net {}: Steiner graph is not a tree", tree.net_id()));
    }
    if graph.max_degree() > 3 {
        return Some(format!(
            "net {}: Steiner node degree {} exceeds 3",
            tree.net_id(),
            graph.max_degree()
        ));
    }
    if graph.length() > tree.length() {
        return Some(format!(
            "net {}: Steiner length {} exceeds two-pin length {}",
            tree.net_id(),
            graph.length(),
            tree.length()
        ));
    }

    let exported = match SteinerTreeBuilder::new(tree).build_topology() {
        Ok(t) => t,
        Err(e) => return Some(format!("net {}: Steiner export failed: {}", tree.net_id(), e)),
    };
    if !exported.topology().is_spanning_tree(exported.n_pins()) {
        return Some(format!(
            "net {}: exported Steiner topology is not a spanning tree",
            tree.net_id()
        ));
    }
    if exported.length() > tree.length() {
        return Some(format!(
            "net {}: exported Steiner length {} exceeds two-pin length {}",
            tree.net_id(),
            exported.length(),
            tree.length()
        ));
    }
    None
}

fn check_trees(trees: &[RoutingTree]) -> Result<(), String> {
    let failures: Vec<String> = trees.par_iter().filter_map(check_tree).collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "{} invalid nets, first: {}",
            failures.len(),
            failures[0]
        ))
    }
}

fn check_usage(trees: &[RoutingTree], grid: &CongestionGrid) -> Result<(), String> {
    let mut fresh = CongestionGrid::uniform(grid.width(), grid.height(), 0);
    for tree in trees {
        apply_usage(&mut fresh, tree, 1);
    }

    let (h_expected, v_expected) = fresh.usage_maps();
    let (h_actual, v_actual) = grid.usage_maps();
    let h_diff = h_expected.iter().zip(h_actual).filter(|(a, b)| a != b).count();
    let v_diff = v_expected.iter().zip(v_actual).filter(|(a, b)| a != b).count();

    if h_diff == 0 && v_diff == 0 {
        Ok(())
    } else {
        Err(format!(
            "{} horizontal and {} vertical cells differ from recomputed usage",
            h_diff, v_diff
        ))
    }
}
