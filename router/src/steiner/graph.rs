use std::collections::VecDeque;
use std::io::Write;
use steiner_common::geom::point::Point;

#[derive(Clone, Debug)]
pub struct SteinerNode {
    pub index: usize,
    pub position: Point<i32>,
    pub is_pin: bool,
    pub neighbors: Vec<usize>,
}

impl SteinerNode {
    pub fn new(index: usize, position: Point<i32>, is_pin: bool) -> Self {
        Self {
            index,
            position,
            is_pin,
            neighbors: Vec::new(),
        }
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }
}

/// Undirected rectilinear tree over pins and Steiner points.
///
/// Nodes `0..n_pins` are the net's pins in net order; Steiner points follow.
#[derive(Clone, Debug, Default)]
pub struct SteinerGraph {
    nodes: Vec<SteinerNode>,
}

impl SteinerGraph {
    pub fn new(nodes: Vec<SteinerNode>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &SteinerNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[SteinerNode] {
        &self.nodes
    }

    pub fn add_node(&mut self, position: Point<i32>, is_pin: bool) -> usize {
        let index = self.nodes.len();
        self.nodes.push(SteinerNode::new(index, position, is_pin));
        index
    }

    pub fn connect(&mut self, a: usize, b: usize) {
        self.nodes[a].neighbors.push(b);
        self.nodes[b].neighbors.push(a);
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.degree()).sum::<usize>() / 2
    }

    pub fn max_degree(&self) -> usize {
        self.nodes.iter().map(|n| n.degree()).max().unwrap_or(0)
    }

    /// Total Manhattan length, each edge counted once.
    pub fn length(&self) -> i64 {
        let mut total = 0;
        for node in &self.nodes {
            for &nb in &node.neighbors {
                if nb > node.index {
                    total += node.position.manhattan(&self.nodes[nb].position);
                }
            }
        }
        total
    }

    /// Connected and acyclic.
    pub fn is_tree(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }
        if self.edge_count() + 1 != self.nodes.len() {
            return false;
        }
        self.path_lengths_from(0).iter().all(|p| p.is_some())
    }

    /// Splits every node with more than three neighbours, returning how many
    /// zero-length nodes were added.
    ///
    /// The split node keeps its first two neighbours; the rest move to a new
    /// node at the same position, which is connected back and re-checked.
    pub fn split_high_degree_nodes(&mut self) -> usize {
        let mut queue: VecDeque<usize> = (0..self.nodes.len()).collect();
        let mut added = 0;

        while let Some(idx) = queue.pop_front() {
            if self.nodes[idx].degree() <= 3 {
                continue;
            }
            let position = self.nodes[idx].position;
            let new_idx = self.add_node(position, false);
            added += 1;

            let moved = self.nodes[idx].neighbors.split_off(2);
            for nb in moved {
                let back = &mut self.nodes[nb].neighbors;
                if let Some(pos) = back.iter().position(|&n| n == idx) {
                    back.remove(pos);
                }
                back.push(new_idx);
                self.nodes[new_idx].neighbors.push(nb);
            }
            self.connect(idx, new_idx);
            queue.push_back(new_idx);
        }
        added
    }

    /// Tree path length from `root` to every node; `None` if unreachable.
    pub fn path_lengths_from(&self, root: usize) -> Vec<Option<i64>> {
        let mut dist: Vec<Option<i64>> = vec![None; self.nodes.len()];
        let mut stack = vec![root];
        dist[root] = Some(0);

        while let Some(idx) = stack.pop() {
            let here = dist[idx].unwrap_or_default();
            let pos = self.nodes[idx].position;
            for &nb in &self.nodes[idx].neighbors {
                if dist[nb].is_some() {
                    continue;
                }
                dist[nb] = Some(here + pos.manhattan(&self.nodes[nb].position));
                stack.push(nb);
            }
        }
        dist
    }

    /// Parent of every node in the tree rooted at `root` (the root is its own
    /// parent) and the length of all traversed edges.
    pub fn parents_from(&self, root: usize) -> (Vec<Option<usize>>, i64) {
        let mut parent: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut stack = vec![root];
        let mut length = 0;
        parent[root] = Some(root);

        while let Some(idx) = stack.pop() {
            let pos = self.nodes[idx].position;
            for &nb in &self.nodes[idx].neighbors {
                if parent[nb].is_some() {
                    continue;
                }
                parent[nb] = Some(idx);
                length += pos.manhattan(&self.nodes[nb].position);
                stack.push(nb);
            }
        }
        (parent, length)
    }

    /// Branch list rooted at `root`. `degree` is the net's pin count.
    ///
    /// # Panics
    ///
    /// If some node is not reachable from `root`, which cannot happen for a
    /// graph built from a spanning topology.
    pub fn to_steiner_tree(&self, root: usize, degree: usize) -> SteinerTree {
        let (parent, length) = self.parents_from(root);
        let branches = self
            .nodes
            .iter()
            .map(|node| {
                let parent = parent[node.index].unwrap_or_else(|| {
                    panic!(
                        "Steiner node {} unreachable from driver {}",
                        node.index, root
                    )
                });
                SteinerBranch {
                    x: node.position.x,
                    y: node.position.y,
                    parent,
                }
            })
            .collect();
        SteinerTree {
            degree,
            length,
            branches,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SteinerBranch {
    pub x: i32,
    pub y: i32,
    pub parent: usize,
}

/// Final per-net result: pin count, wirelength and `(x, y, parent)` branches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SteinerTree {
    pub degree: usize,
    pub length: i64,
    pub branches: Vec<SteinerBranch>,
}

impl SteinerTree {
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn write_to<W: Write>(&self, net_id: i64, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "NET {}", net_id)?;
        writeln!(out, "DEGREE {}", self.degree)?;
        writeln!(out, "LENGTH {}", self.length)?;
        writeln!(out, "BRANCH {}", self.branch_count())?;
        for b in &self.branches {
            writeln!(out, "{} {} {}", b.x, b.y, b.parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plus_graph() -> SteinerGraph {
        // Centre node 0 with four arms of length 5.
        let mut g = SteinerGraph::default();
        g.add_node(Point::new(5, 5), true);
        g.add_node(Point::new(10, 5), true);
        g.add_node(Point::new(0, 5), true);
        g.add_node(Point::new(5, 10), true);
        g.add_node(Point::new(5, 0), true);
        for i in 1..5 {
            g.connect(0, i);
        }
        g
    }

    #[test]
    fn split_preserves_length_and_connectivity() {
        let mut g = plus_graph();
        assert_eq!(g.max_degree(), 4);
        let before = g.length();

        let added = g.split_high_degree_nodes();
        assert_eq!(added, 1);
        assert!(g.max_degree() <= 3);
        assert_eq!(g.length(), before);
        assert_eq!(g.edge_count(), g.len() - 1);
        assert!(g.is_tree());
        assert_eq!(g.node(5).position, Point::new(5, 5));
        assert!(!g.node(5).is_pin);
    }

    #[test]
    fn split_cascades_for_very_high_degree() {
        let mut g = SteinerGraph::default();
        g.add_node(Point::new(0, 0), true);
        for i in 1..=7 {
            g.add_node(Point::new(i, i), true);
            g.connect(0, i as usize);
        }
        let before = g.length();
        let added = g.split_high_degree_nodes();
        assert!(added >= 3);
        assert!(g.max_degree() <= 3);
        assert_eq!(g.length(), before);
        assert_eq!(g.edge_count(), 8 + added - 1);
        assert!(g.is_tree());
    }

    #[test]
    fn branches_and_path_lengths() {
        let mut g = plus_graph();
        g.split_high_degree_nodes();
        let tree = g.to_steiner_tree(1, 5);
        assert_eq!(tree.degree, 5);
        assert_eq!(tree.length, 20);
        assert_eq!(tree.branch_count(), 6);
        assert_eq!(tree.branches[1].parent, 1);
        assert_eq!(tree.branches[0].parent, 1);

        let dist = g.path_lengths_from(1);
        assert_eq!(dist[2], Some(10));
        assert_eq!(dist[3], Some(10));
        assert_eq!(dist[5], Some(5));
    }

    #[test]
    fn output_format() {
        let mut g = SteinerGraph::default();
        g.add_node(Point::new(1, 2), true);
        g.add_node(Point::new(4, 2), true);
        g.connect(0, 1);
        let tree = g.to_steiner_tree(0, 2);
        let mut out = Vec::new();
        tree.write_to(9, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "NET 9\nDEGREE 2\nLENGTH 3\nBRANCH 2\n1 2 0\n4 2 0\n"
        );
    }

    #[test]
    #[should_panic(expected = "unreachable")]
    fn disconnected_graph_is_an_internal_error() {
        let mut g = SteinerGraph::default();
        g.add_node(Point::new(0, 0), true);
        g.add_node(Point::new(1, 1), true);
        g.to_steiner_tree(0, 2);
    }
}
