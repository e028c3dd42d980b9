use super::{CostBreakdown, Evaluator};
use crate::grid::CongestionGrid;
use crate::tree::RoutingTree;

/// Scales an inner evaluator's cost by a fixed weight.
#[derive(Clone, Debug)]
pub struct WeightedEvaluator {
    inner: Box<Evaluator>,
    weight: f64,
}

impl WeightedEvaluator {
    pub fn new(inner: Evaluator, weight: f64) -> Self {
        Self {
            inner: Box::new(inner),
            weight,
        }
    }

    pub fn name(&self) -> String {
        format!("Weighted({})", self.weight)
    }

    pub fn evaluate(
        &self,
        tree: &RoutingTree,
        grid: &mut CongestionGrid,
        breakdown: Option<&mut CostBreakdown>,
    ) -> f64 {
        let Some(sink) = breakdown else {
            return self.weight * self.inner.evaluate(tree, grid, None);
        };

        // The inner entries only show up inside this entry's description.
        let mut child = CostBreakdown::new();
        let cost = self.weight * self.inner.evaluate(tree, grid, Some(&mut child));
        let description = format!(
            "({})",
            child
                .entries()
                .iter()
                .map(|e| {
                    if e.description.is_empty() {
                        format!("{}: {:.3}", e.name, e.cost)
                    } else {
                        format!("{}: {:.3} {}", e.name, e.cost, e.description)
                    }
                })
                .collect::<Vec<_>>()
                .join(" + ")
        );

        sink.record(self.name(), cost, description);
        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::LengthEvaluator;
    use crate::tree::tests::star;

    #[test]
    fn scales_and_describes_child() {
        let t = star();
        let mut grid = CongestionGrid::uniform(11, 11, 1);
        let eval = WeightedEvaluator::new(Evaluator::Length(LengthEvaluator), 0.5);

        assert_eq!(eval.evaluate(&t, &mut grid, None), 15.0);

        let mut b = CostBreakdown::new();
        assert_eq!(eval.evaluate(&t, &mut grid, Some(&mut b)), 15.0);
        assert_eq!(b.entries().len(), 1);
        assert_eq!(b.entries()[0].name, "Weighted(0.5)");
        assert_eq!(b.entries()[0].description, "(Length: 30.000)");
        assert_eq!(b.cost_of("Length"), None);
    }

    #[test]
    fn nested_weights_report_only_the_outer_entry() {
        let t = star();
        let mut grid = CongestionGrid::uniform(11, 11, 1);
        let eval = Evaluator::Length(LengthEvaluator).weighted(0.5).weighted(2.0);

        let mut b = CostBreakdown::new();
        assert_eq!(eval.evaluate(&t, &mut grid, Some(&mut b)), 30.0);
        assert_eq!(b.entries().len(), 1);
        assert_eq!(b.entries()[0].name, "Weighted(2)");
        assert_eq!(
            b.entries()[0].description,
            "(Weighted(0.5): 15.000 (Length: 30.000))"
        );
    }
}
