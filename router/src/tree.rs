use crate::error::TopologyError;
use crate::topology::RoutingTopology;
use std::sync::Arc;
use steiner_common::db::core::Pin;
use steiner_common::geom::point::Point;

/// A net's topology together with its pin geometry.
///
/// Per-node segment spans and the total length are derived once in
/// [`RoutingTree::new`]; a different topology means a new tree. The pin list
/// is shared, so trial trees built during optimization only copy edges.
#[derive(Clone, Debug)]
pub struct RoutingTree {
    net_id: i64,
    pins: Arc<[Pin]>,
    topology: RoutingTopology,
    driver: usize,
    x_low: Vec<i32>,
    x_high: Vec<i32>,
    y_low: Vec<i32>,
    y_high: Vec<i32>,
    length: i64,
}

impl RoutingTree {
    pub fn new(
        net_id: i64,
        pins: impl Into<Arc<[Pin]>>,
        topology: RoutingTopology,
    ) -> Result<Self, TopologyError> {
        let pins: Arc<[Pin]> = pins.into();
        let n = pins.len();
        topology.validate(n)?;

        let mut driver = None;
        for (i, pin) in pins.iter().enumerate() {
            if pin.index_in_net != i {
                return Err(TopologyError::PinIndexMismatch {
                    position: i,
                    declared: pin.index_in_net,
                });
            }
            if pin.is_driver {
                if let Some(first) = driver {
                    return Err(TopologyError::MultipleDrivers { first, second: i });
                }
                driver = Some(i);
            }
        }
        let driver = driver.ok_or(TopologyError::NoDriver)?;

        let mut x_low: Vec<i32> = pins.iter().map(|p| p.x()).collect();
        let mut y_low: Vec<i32> = pins.iter().map(|p| p.y()).collect();
        let mut x_high = x_low.clone();
        let mut y_high = y_low.clone();

        for e in &topology {
            let xv = pins[e.v].x();
            let yh = pins[e.h].y();
            x_low[e.h] = x_low[e.h].min(xv);
            x_high[e.h] = x_high[e.h].max(xv);
            y_low[e.v] = y_low[e.v].min(yh);
            y_high[e.v] = y_high[e.v].max(yh);
        }

        let length = (0..n)
            .map(|i| (x_high[i] - x_low[i]) as i64 + (y_high[i] - y_low[i]) as i64)
            .sum();

        Ok(Self {
            net_id,
            pins,
            topology,
            driver,
            x_low,
            x_high,
            y_low,
            y_high,
            length,
        })
    }

    /// Same pins, different topology.
    pub fn with_topology(&self, topology: RoutingTopology) -> Result<Self, TopologyError> {
        Self::new(self.net_id, self.pins.clone(), topology)
    }

    pub fn net_id(&self) -> i64 {
        self.net_id
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn n_pins(&self) -> usize {
        self.pins.len()
    }

    pub fn topology(&self) -> &RoutingTopology {
        &self.topology
    }

    pub fn driver_index(&self) -> usize {
        self.driver
    }

    #[inline]
    pub fn x(&self, i: usize) -> i32 {
        self.pins[i].x()
    }

    #[inline]
    pub fn y(&self, i: usize) -> i32 {
        self.pins[i].y()
    }

    pub fn position(&self, i: usize) -> Point<i32> {
        self.pins[i].position
    }

    pub fn positions(&self) -> Vec<Point<i32>> {
        self.pins.iter().map(|p| p.position).collect()
    }

    #[inline]
    pub fn x_low(&self, i: usize) -> i32 {
        self.x_low[i]
    }

    #[inline]
    pub fn x_high(&self, i: usize) -> i32 {
        self.x_high[i]
    }

    #[inline]
    pub fn y_low(&self, i: usize) -> i32 {
        self.y_low[i]
    }

    #[inline]
    pub fn y_high(&self, i: usize) -> i32 {
        self.y_high[i]
    }

    /// Sum over nodes of horizontal plus vertical span.
    pub fn length(&self) -> i64 {
        self.length
    }

    /// Non-degenerate wire segments, horizontal ones first per node.
    pub fn segments(&self) -> Vec<(Point<i32>, Point<i32>)> {
        let mut segs = Vec::with_capacity(2 * self.n_pins());
        for i in 0..self.n_pins() {
            let (x, y) = (self.x(i), self.y(i));
            if self.x_low[i] < self.x_high[i] {
                segs.push((Point::new(self.x_low[i], y), Point::new(self.x_high[i], y)));
            }
            if self.y_low[i] < self.y_high[i] {
                segs.push((Point::new(x, self.y_low[i]), Point::new(x, self.y_high[i])));
            }
        }
        segs
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_pins(coords: &[(i32, i32)], driver: usize, slacks: &[f64]) -> Vec<Pin> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Pin {
                id: 100 + i as i64,
                index_in_net: i,
                position: Point::new(x, y),
                arrival_time: 0.0,
                slack: slacks.get(i).copied().unwrap_or(0.0),
                is_driver: i == driver,
                net_id: 0,
                cell_id: i as i64,
                cell_name: format!("c{}", i),
                pin_name: format!("p{}", i),
            })
            .collect()
    }

    pub(crate) fn square_pins() -> Vec<Pin> {
        make_pins(&[(0, 0), (0, 10), (10, 0), (10, 10)], 0, &[])
    }

    pub(crate) fn star() -> RoutingTree {
        let topo = RoutingTopology::from_pairs(&[(1, 0), (2, 0), (3, 0)]);
        RoutingTree::new(0, square_pins(), topo).unwrap()
    }

    pub(crate) fn chain() -> RoutingTree {
        let topo = RoutingTopology::from_pairs(&[(1, 0), (3, 1), (2, 3)]);
        RoutingTree::new(0, square_pins(), topo).unwrap()
    }

    #[test]
    fn star_spans_and_length() {
        let t = star();
        assert_eq!(t.driver_index(), 0);
        assert_eq!((t.x_low(0), t.x_high(0)), (0, 10));
        assert_eq!((t.y_low(1), t.y_high(1)), (0, 10));
        assert_eq!((t.y_low(2), t.y_high(2)), (0, 0));
        assert_eq!((t.y_low(3), t.y_high(3)), (0, 10));
        assert_eq!(t.length(), 30);
        assert_eq!(t.segments().len(), 3);
    }

    #[test]
    fn chain_length() {
        let t = chain();
        assert_eq!((t.x_low(1), t.x_high(1)), (0, 10));
        assert_eq!((t.y_low(2), t.y_high(2)), (0, 10));
        assert_eq!(t.length(), 30);
    }

    #[test]
    fn edge_count_must_match() {
        let topo = RoutingTopology::from_pairs(&[(1, 0), (2, 0)]);
        assert_eq!(
            RoutingTree::new(0, square_pins(), topo).unwrap_err(),
            TopologyError::EdgeCountMismatch { nodes: 4, edges: 2 }
        );
    }

    #[test]
    fn exactly_one_driver() {
        let topo = RoutingTopology::from_pairs(&[(1, 0)]);
        let mut pins = make_pins(&[(0, 0), (1, 1)], 0, &[]);
        pins[0].is_driver = false;
        assert_eq!(
            RoutingTree::new(0, pins.clone(), topo.clone()).unwrap_err(),
            TopologyError::NoDriver
        );

        pins[0].is_driver = true;
        pins[1].is_driver = true;
        assert_eq!(
            RoutingTree::new(0, pins, topo).unwrap_err(),
            TopologyError::MultipleDrivers { first: 0, second: 1 }
        );
    }

    #[test]
    fn pin_order_must_match_index_in_net() {
        let mut pins = make_pins(&[(0, 0), (1, 1)], 0, &[]);
        pins.swap(0, 1);
        let err = RoutingTree::new(0, pins, RoutingTopology::from_pairs(&[(1, 0)])).unwrap_err();
        assert_eq!(
            err,
            TopologyError::PinIndexMismatch {
                position: 0,
                declared: 1
            }
        );
    }

    #[test]
    fn single_pin_net() {
        let pins = make_pins(&[(3, 4)], 0, &[]);
        let t = RoutingTree::new(0, pins, RoutingTopology::new()).unwrap();
        assert_eq!(t.length(), 0);
        assert!(t.segments().is_empty());
    }
}
