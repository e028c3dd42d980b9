use crate::algo::union_find::UnionFind;
use crate::error::TopologyError;
use std::fmt;

/// One topology edge: node `v`'s vertical segment meets node `h`'s
/// horizontal segment at `(x[v], y[h])`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub v: usize,
    pub h: usize,
}

impl Edge {
    pub fn new(v: usize, h: usize) -> Self {
        Self { v, h }
    }
}

impl From<(usize, usize)> for Edge {
    fn from((v, h): (usize, usize)) -> Self {
        Self { v, h }
    }
}

/// Ordered edge list describing a spanning tree over node indices.
///
/// The list itself does not know its node count; use [`validate`] or
/// build a `RoutingTree` to check it against a pin list.
///
/// [`validate`]: RoutingTopology::validate
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingTopology {
    edges: Vec<Edge>,
}

impl RoutingTopology {
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    pub fn from_edges(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    pub fn from_pairs(pairs: &[(usize, usize)]) -> Self {
        Self {
            edges: pairs.iter().map(|&p| Edge::from(p)).collect(),
        }
    }

    /// Decodes `[v0, h0, v1, h1, ...]`.
    pub fn from_flat(flat: &[usize]) -> Result<Self, TopologyError> {
        if flat.len() % 2 != 0 {
            return Err(TopologyError::OddEncodingLength(flat.len()));
        }
        Ok(Self {
            edges: flat.chunks_exact(2).map(|c| Edge::new(c[0], c[1])).collect(),
        })
    }

    pub fn to_flat(&self) -> Vec<usize> {
        self.edges.iter().flat_map(|e| [e.v, e.h]).collect()
    }

    pub fn to_pairs(&self) -> Vec<(usize, usize)> {
        self.edges.iter().map(|e| (e.v, e.h)).collect()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    pub fn get(&self, index: usize) -> Option<Edge> {
        self.edges.get(index).copied()
    }

    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn insert(&mut self, index: usize, edge: Edge) {
        self.edges.insert(index, edge);
    }

    pub fn remove(&mut self, index: usize) -> Edge {
        self.edges.remove(index)
    }

    /// Removes the first edge equal to `edge`.
    pub fn remove_edge(&mut self, edge: Edge) -> bool {
        match self.edges.iter().position(|&e| e == edge) {
            Some(pos) => {
                self.edges.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Copy of this topology with the edge at `index` left out.
    pub fn without(&self, index: usize) -> Self {
        let mut edges = Vec::with_capacity(self.edges.len());
        edges.extend_from_slice(&self.edges[..index]);
        edges.extend_from_slice(&self.edges[index + 1..]);
        Self { edges }
    }

    /// Checks edge count and index range against `nodes`.
    pub fn validate(&self, nodes: usize) -> Result<(), TopologyError> {
        if self.edges.len() + 1 != nodes {
            return Err(TopologyError::EdgeCountMismatch {
                nodes,
                edges: self.edges.len(),
            });
        }
        for e in &self.edges {
            for index in [e.v, e.h] {
                if index >= nodes {
                    return Err(TopologyError::NodeOutOfRange { index, nodes });
                }
            }
        }
        Ok(())
    }

    /// True when the edges connect all `nodes` without a cycle.
    pub fn is_spanning_tree(&self, nodes: usize) -> bool {
        if self.validate(nodes).is_err() {
            return false;
        }
        let mut uf = UnionFind::new(nodes);
        self.edges.iter().all(|e| uf.union(e.v, e.h))
    }
}

impl<'a> IntoIterator for &'a RoutingTopology {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

impl fmt::Display for RoutingTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flat: Vec<String> = self.to_flat().iter().map(|i| i.to_string()).collect();
        write!(f, "{}", flat.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_encoding_round_trips() {
        let flat = vec![1, 0, 2, 0, 3, 2];
        let topo = RoutingTopology::from_flat(&flat).unwrap();
        assert_eq!(topo.len(), 3);
        assert_eq!(topo.get(2), Some(Edge::new(3, 2)));
        assert_eq!(topo.to_flat(), flat);
        assert_eq!(RoutingTopology::from_pairs(&topo.to_pairs()), topo);
    }

    #[test]
    fn odd_flat_encoding_is_rejected() {
        assert_eq!(
            RoutingTopology::from_flat(&[0, 1, 2]),
            Err(TopologyError::OddEncodingLength(3))
        );
    }

    #[test]
    fn edit_operations() {
        let mut topo = RoutingTopology::from_pairs(&[(0, 1), (1, 2)]);
        topo.insert(0, Edge::new(3, 0));
        assert_eq!(topo.to_pairs(), vec![(3, 0), (0, 1), (1, 2)]);
        assert!(topo.remove_edge(Edge::new(0, 1)));
        assert!(!topo.remove_edge(Edge::new(0, 1)));
        assert_eq!(topo.remove(0), Edge::new(3, 0));
        assert_eq!(topo.to_pairs(), vec![(1, 2)]);
        topo.push(Edge::new(2, 0));
        assert_eq!(topo.without(0).to_pairs(), vec![(2, 0)]);
    }

    #[test]
    fn spanning_tree_detection() {
        let tree = RoutingTopology::from_pairs(&[(1, 0), (2, 0), (3, 2)]);
        assert!(tree.is_spanning_tree(4));

        let cycle = RoutingTopology::from_pairs(&[(1, 0), (0, 1), (3, 2)]);
        assert!(!cycle.is_spanning_tree(4));

        assert!(!tree.is_spanning_tree(5));
        assert_eq!(
            tree.validate(3),
            Err(TopologyError::EdgeCountMismatch { nodes: 3, edges: 3 })
        );
        assert!(RoutingTopology::new().is_spanning_tree(1));
    }

    #[test]
    fn out_of_range_index() {
        let topo = RoutingTopology::from_pairs(&[(0, 7)]);
        assert_eq!(
            topo.validate(2),
            Err(TopologyError::NodeOutOfRange { index: 7, nodes: 2 })
        );
    }

    #[test]
    fn display_is_flat() {
        let topo = RoutingTopology::from_pairs(&[(1, 0), (2, 1)]);
        assert_eq!(topo.to_string(), "1 0 2 1");
    }
}
