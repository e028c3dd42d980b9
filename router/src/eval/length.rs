use super::CostBreakdown;
use crate::tree::RoutingTree;

/// Total two-pin wirelength.
#[derive(Clone, Copy, Debug, Default)]
pub struct LengthEvaluator;

impl LengthEvaluator {
    pub const NAME: &'static str = "Length";

    pub fn evaluate(&self, tree: &RoutingTree, breakdown: Option<&mut CostBreakdown>) -> f64 {
        let cost = tree.length() as f64;
        if let Some(b) = breakdown {
            b.record(Self::NAME, cost, "");
        }
        cost
    }
}
