use super::{CostBreakdown, Evaluator};
use crate::grid::CongestionGrid;
use crate::tree::RoutingTree;

/// Sum of an ordered list of evaluators.
#[derive(Clone, Debug, Default)]
pub struct CompositeEvaluator {
    parts: Vec<Evaluator>,
}

impl CompositeEvaluator {
    pub const NAME: &'static str = "Composite";

    pub fn new(parts: Vec<Evaluator>) -> Self {
        Self { parts }
    }

    pub fn evaluate(
        &self,
        tree: &RoutingTree,
        grid: &mut CongestionGrid,
        mut breakdown: Option<&mut CostBreakdown>,
    ) -> f64 {
        let mut total = 0.0;
        for part in &self.parts {
            total += part.evaluate(tree, grid, breakdown.as_deref_mut());
        }
        if let Some(b) = breakdown {
            b.record(Self::NAME, total, "");
        }
        total
    }
}
