use super::CostBreakdown;
use crate::grid::CongestionGrid;
use crate::tree::RoutingTree;

/// Overflowed unit cells under every node's horizontal and vertical span.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverflowEvaluator;

impl OverflowEvaluator {
    pub const NAME: &'static str = "Overflow";

    pub fn evaluate(
        &self,
        tree: &RoutingTree,
        grid: &mut CongestionGrid,
        breakdown: Option<&mut CostBreakdown>,
    ) -> f64 {
        let mut overflow: u64 = 0;
        for i in 0..tree.n_pins() {
            overflow += grid.count_h_overflow(
                tree.y(i) as usize,
                tree.x_low(i) as usize,
                tree.x_high(i) as usize,
            ) as u64;
            overflow += grid.count_v_overflow(
                tree.x(i) as usize,
                tree.y_low(i) as usize,
                tree.y_high(i) as usize,
            ) as u64;
        }
        let cost = overflow as f64;
        if let Some(b) = breakdown {
            b.record(Self::NAME, cost, "");
        }
        cost
    }
}
