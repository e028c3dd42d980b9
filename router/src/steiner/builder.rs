use super::graph::{SteinerGraph, SteinerNode, SteinerTree};
use crate::error::TopologyError;
use crate::topology::{Edge, RoutingTopology};
use crate::tree::RoutingTree;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use steiner_common::db::core::Pin;
use steiner_common::geom::point::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Right,
    Left,
    Up,
    Down,
}

impl Side {
    fn is_vertical(self) -> bool {
        matches!(self, Side::Up | Side::Down)
    }
}

/// Working node of the conversion. Horizontal neighbours (nodes whose
/// vertical segment meets this node's horizontal one) are kept in `right`
/// (ascending x) and `left` (descending x); vertical neighbours in `up`
/// (ascending y) and `down` (descending y). The farthest neighbour of a side
/// is always last.
#[derive(Clone, Debug)]
struct ConverterNode {
    position: Point<i32>,
    is_pin: bool,
    right: Vec<usize>,
    left: Vec<usize>,
    up: Vec<usize>,
    down: Vec<usize>,
}

impl ConverterNode {
    fn new(position: Point<i32>, is_pin: bool) -> Self {
        Self {
            position,
            is_pin,
            right: Vec::new(),
            left: Vec::new(),
            up: Vec::new(),
            down: Vec::new(),
        }
    }

    fn side(&self, side: Side) -> &Vec<usize> {
        match side {
            Side::Right => &self.right,
            Side::Left => &self.left,
            Side::Up => &self.up,
            Side::Down => &self.down,
        }
    }

    fn remove_neighbor(&mut self, neighbor: usize) {
        for list in [
            &mut self.right,
            &mut self.left,
            &mut self.up,
            &mut self.down,
        ] {
            if let Some(pos) = list.iter().position(|&n| n == neighbor) {
                list.remove(pos);
            }
        }
    }
}

/// Best merge available at a node: the two farthest neighbours on `side`
/// meet at `target` instead of running side by side back to the node.
#[derive(Clone, Copy, Debug, Default)]
struct SteinerCandidate {
    gain: i64,
    target: Point<i32>,
    op1: usize,
    op2: usize,
    side: Option<Side>,
}

/// Greedy conversion of a two-pin topology into a rectilinear Steiner tree.
///
/// Every node repeatedly offers the merge of its two farthest neighbours on
/// one side; the globally best offer is applied through a max-gain queue
/// until no offer shortens the tree.
pub struct SteinerTreeBuilder<'a> {
    tree: &'a RoutingTree,
    nodes: Vec<ConverterNode>,
    merges: usize,
}

impl<'a> SteinerTreeBuilder<'a> {
    pub fn new(tree: &'a RoutingTree) -> Self {
        let n = tree.n_pins();
        let mut nodes: Vec<ConverterNode> = (0..n)
            .map(|i| ConverterNode::new(tree.position(i), true))
            .collect();

        let mut horizontal: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut vertical: Vec<Vec<usize>> = vec![Vec::new(); n];
        for e in tree.topology() {
            horizontal[e.h].push(e.v);
            vertical[e.v].push(e.h);
        }

        for i in 0..n {
            let Point { x, y } = nodes[i].position;
            let mut right = Vec::new();
            let mut left = Vec::new();
            for &nb in &horizontal[i] {
                if nodes[nb].position.x >= x {
                    right.push(nb);
                } else {
                    left.push(nb);
                }
            }
            let mut up = Vec::new();
            let mut down = Vec::new();
            for &nb in &vertical[i] {
                if nodes[nb].position.y >= y {
                    up.push(nb);
                } else {
                    down.push(nb);
                }
            }
            right.sort_by_key(|&nb| nodes[nb].position.x);
            left.sort_by_key(|&nb| Reverse(nodes[nb].position.x));
            up.sort_by_key(|&nb| nodes[nb].position.y);
            down.sort_by_key(|&nb| Reverse(nodes[nb].position.y));

            let node = &mut nodes[i];
            node.right = right;
            node.left = left;
            node.up = up;
            node.down = down;
        }

        Self {
            tree,
            nodes,
            merges: 0,
        }
    }

    /// Number of merges applied so far.
    pub fn merges(&self) -> usize {
        self.merges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn x(&self, i: usize) -> i32 {
        self.nodes[i].position.x
    }

    fn y(&self, i: usize) -> i32 {
        self.nodes[i].position.y
    }

    fn add_right(&mut self, node: usize, nb: usize) {
        let x = self.x(nb);
        debug_assert!(x >= self.x(node));
        debug_assert!(!self.nodes[node].right.contains(&nb));
        let pos = self.nodes[node]
            .right
            .iter()
            .rposition(|&n| self.nodes[n].position.x <= x)
            .map_or(0, |p| p + 1);
        self.nodes[node].right.insert(pos, nb);
    }

    fn add_left(&mut self, node: usize, nb: usize) {
        let x = self.x(nb);
        debug_assert!(x <= self.x(node));
        debug_assert!(!self.nodes[node].left.contains(&nb));
        let pos = self.nodes[node]
            .left
            .iter()
            .rposition(|&n| self.nodes[n].position.x >= x)
            .map_or(0, |p| p + 1);
        self.nodes[node].left.insert(pos, nb);
    }

    fn add_up(&mut self, node: usize, nb: usize) {
        let y = self.y(nb);
        debug_assert!(y >= self.y(node));
        debug_assert!(!self.nodes[node].up.contains(&nb));
        let pos = self.nodes[node]
            .up
            .iter()
            .rposition(|&n| self.nodes[n].position.y <= y)
            .map_or(0, |p| p + 1);
        self.nodes[node].up.insert(pos, nb);
    }

    fn add_down(&mut self, node: usize, nb: usize) {
        let y = self.y(nb);
        debug_assert!(y <= self.y(node));
        debug_assert!(!self.nodes[node].down.contains(&nb));
        let pos = self.nodes[node]
            .down
            .iter()
            .rposition(|&n| self.nodes[n].position.y >= y)
            .map_or(0, |p| p + 1);
        self.nodes[node].down.insert(pos, nb);
    }

    fn add_horizontal(&mut self, node: usize, nb: usize) {
        if self.x(nb) > self.x(node) {
            self.add_right(node, nb);
        } else {
            self.add_left(node, nb);
        }
    }

    fn add_vertical(&mut self, node: usize, nb: usize) {
        if self.y(nb) > self.y(node) {
            self.add_up(node, nb);
        } else {
            self.add_down(node, nb);
        }
    }

    fn best_candidate(&self, idx: usize) -> SteinerCandidate {
        let node = &self.nodes[idx];
        let mut best = SteinerCandidate::default();

        for side in [Side::Right, Side::Left, Side::Up, Side::Down] {
            let list = node.side(side);
            if list.len() < 2 {
                continue;
            }
            let op1 = list[list.len() - 1];
            let op2 = list[list.len() - 2];
            let p2 = self.nodes[op2].position;
            let (gain, target) = match side {
                Side::Right => (p2.x - node.position.x, Point::new(p2.x, node.position.y)),
                Side::Left => (node.position.x - p2.x, Point::new(p2.x, node.position.y)),
                Side::Up => (p2.y - node.position.y, Point::new(node.position.x, p2.y)),
                Side::Down => (node.position.y - p2.y, Point::new(node.position.x, p2.y)),
            };
            let gain = gain as i64;
            if gain > best.gain {
                best = SteinerCandidate {
                    gain,
                    target,
                    op1,
                    op2,
                    side: Some(side),
                };
            }
        }
        best
    }

    /// Runs the greedy merge loop to completion.
    pub fn steinerize(&mut self) {
        // Equal gains pop in the order they were (re)queued.
        let mut queue: PriorityQueue<usize, (i64, Reverse<u64>)> = PriorityQueue::new();
        let mut best: Vec<SteinerCandidate> = Vec::with_capacity(self.nodes.len() * 2);
        let mut seq: u64 = 0;

        let mut requeue = |builder: &Self,
                           best: &mut Vec<SteinerCandidate>,
                           queue: &mut PriorityQueue<usize, (i64, Reverse<u64>)>,
                           idx: usize| {
            let cand = builder.best_candidate(idx);
            if idx >= best.len() {
                best.resize(idx + 1, SteinerCandidate::default());
            }
            best[idx] = cand;
            queue.push(idx, (cand.gain, Reverse(seq)));
            seq += 1;
        };

        for idx in 0..self.nodes.len() {
            requeue(&*self, &mut best, &mut queue, idx);
        }

        while let Some((node, _)) = queue.pop() {
            let cand = best[node];
            let Some(side) = cand.side else { break };
            if cand.gain <= 0 {
                break;
            }
            let (op1, op2) = (cand.op1, cand.op2);

            let (steiner, created) = if self.nodes[op1].position == cand.target {
                (op1, false)
            } else if self.nodes[op2].position == cand.target {
                (op2, false)
            } else {
                self.nodes.push(ConverterNode::new(cand.target, false));
                (self.nodes.len() - 1, true)
            };

            for op in [op1, op2] {
                if op == steiner {
                    continue;
                }
                self.nodes[op].remove_neighbor(node);
                if side.is_vertical() {
                    self.add_horizontal(op, steiner);
                    self.add_vertical(steiner, op);
                } else {
                    self.add_vertical(op, steiner);
                    self.add_horizontal(steiner, op);
                }
                self.nodes[node].remove_neighbor(op);
            }

            if created {
                if side.is_vertical() {
                    self.add_vertical(node, steiner);
                    self.add_horizontal(steiner, node);
                } else {
                    self.add_horizontal(node, steiner);
                    self.add_vertical(steiner, node);
                }
                requeue(&*self, &mut best, &mut queue, steiner);
            }

            requeue(&*self, &mut best, &mut queue, node);
            requeue(&*self, &mut best, &mut queue, op1);
            requeue(&*self, &mut best, &mut queue, op2);
            self.merges += 1;
        }

        log::trace!(
            "net {}: {} Steiner merges, {} nodes",
            self.tree.net_id(),
            self.merges,
            self.nodes.len()
        );
    }

    fn to_graph(&self) -> SteinerGraph {
        let mut nodes: Vec<SteinerNode> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| SteinerNode::new(i, n.position, n.is_pin))
            .collect();
        for (i, n) in self.nodes.iter().enumerate() {
            let nbs = &mut nodes[i].neighbors;
            nbs.extend_from_slice(&n.up);
            nbs.extend_from_slice(&n.down);
            nbs.extend_from_slice(&n.left);
            nbs.extend_from_slice(&n.right);
        }
        SteinerGraph::new(nodes)
    }

    /// Steinerized graph, degree not yet reduced.
    pub fn build_graph(mut self) -> SteinerGraph {
        self.steinerize();
        self.to_graph()
    }

    /// Steinerized, degree-reduced tree rooted at the driver.
    pub fn build_tree(mut self) -> SteinerTree {
        self.steinerize();
        let mut graph = self.to_graph();
        graph.split_high_degree_nodes();
        graph.to_steiner_tree(self.tree.driver_index(), self.tree.n_pins())
    }

    /// Steinerized tree expressed as a new routing tree; Steiner points become
    /// placeholder pins appended after the net's pins.
    pub fn build_topology(mut self) -> Result<RoutingTree, TopologyError> {
        self.steinerize();
        let net_id = self.tree.net_id();
        let mut pins: Vec<Pin> = Vec::with_capacity(self.nodes.len());
        let mut topology = RoutingTopology::new();

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_pin {
                pins.push(self.tree.pins()[i].clone());
            } else {
                pins.push(Pin::steiner(i, node.position, net_id));
            }
            for &nb in node.up.iter().chain(node.down.iter()) {
                topology.push(Edge::new(i, nb));
            }
        }
        RoutingTree::new(net_id, pins, topology)
    }
}
