//! Tree cost functions.
//!
//! The evaluator set is closed: three leaf costs (wirelength, detour,
//! overflow) and two combinators. Every evaluator reads the shared
//! [`CongestionGrid`]; only overflow actually consults it, but queries may
//! rebuild the grid's prefix sums, hence `&mut`.

pub mod composite;
pub mod detour;
pub mod length;
pub mod overflow;
pub mod weighted;

pub use composite::CompositeEvaluator;
pub use detour::{DetourEvaluator, DetourWeight};
pub use length::LengthEvaluator;
pub use overflow::OverflowEvaluator;
pub use weighted::WeightedEvaluator;

use crate::grid::CongestionGrid;
use crate::tree::RoutingTree;
use std::fmt;
use steiner_common::util::config::{DetourConfig, WeightsConfig};

#[derive(Clone, Debug, PartialEq)]
pub struct BreakdownEntry {
    pub name: String,
    pub cost: f64,
    pub description: String,
}

/// Per-evaluator costs reported during one evaluation, in report order.
#[derive(Clone, Debug, Default)]
pub struct CostBreakdown {
    entries: Vec<BreakdownEntry>,
}

impl CostBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, cost: f64, description: impl Into<String>) {
        self.entries.push(BreakdownEntry {
            name: name.into(),
            cost,
            description: description.into(),
        });
    }

    pub fn entries(&self) -> &[BreakdownEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cost of the first entry called `name`.
    pub fn cost_of(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.cost)
    }
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<width$}: {:.3}", entry.name, entry.cost)?;
            if !entry.description.is_empty() {
                write!(f, " {}", entry.description)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub enum Evaluator {
    Length(LengthEvaluator),
    Detour(DetourEvaluator),
    Overflow(OverflowEvaluator),
    Weighted(WeightedEvaluator),
    Composite(CompositeEvaluator),
}

impl Evaluator {
    /// Cost of `tree`. When `breakdown` is given, each evaluator involved
    /// records its own entry after computing its cost.
    pub fn evaluate(
        &self,
        tree: &RoutingTree,
        grid: &mut CongestionGrid,
        breakdown: Option<&mut CostBreakdown>,
    ) -> f64 {
        match self {
            Evaluator::Length(e) => e.evaluate(tree, breakdown),
            Evaluator::Detour(e) => e.evaluate(tree, breakdown),
            Evaluator::Overflow(e) => e.evaluate(tree, grid, breakdown),
            Evaluator::Weighted(e) => e.evaluate(tree, grid, breakdown),
            Evaluator::Composite(e) => e.evaluate(tree, grid, breakdown),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Evaluator::Length(_) => LengthEvaluator::NAME.to_string(),
            Evaluator::Detour(_) => DetourEvaluator::NAME.to_string(),
            Evaluator::Overflow(_) => OverflowEvaluator::NAME.to_string(),
            Evaluator::Weighted(e) => e.name(),
            Evaluator::Composite(_) => CompositeEvaluator::NAME.to_string(),
        }
    }

    pub fn weighted(self, weight: f64) -> Self {
        Evaluator::Weighted(WeightedEvaluator::new(self, weight))
    }

    /// `wirelength * Length + detour * Detour + overflow * Overflow`.
    pub fn from_config(weights: &WeightsConfig, detour: &DetourConfig) -> Self {
        Evaluator::Composite(CompositeEvaluator::new(vec![
            Evaluator::Length(LengthEvaluator).weighted(weights.wirelength),
            Evaluator::Detour(DetourEvaluator::new(DetourWeight::from_config(detour)))
                .weighted(weights.detour),
            Evaluator::Overflow(OverflowEvaluator).weighted(weights.overflow),
        ]))
    }
}

impl From<LengthEvaluator> for Evaluator {
    fn from(e: LengthEvaluator) -> Self {
        Evaluator::Length(e)
    }
}

impl From<DetourEvaluator> for Evaluator {
    fn from(e: DetourEvaluator) -> Self {
        Evaluator::Detour(e)
    }
}

impl From<OverflowEvaluator> for Evaluator {
    fn from(e: OverflowEvaluator) -> Self {
        Evaluator::Overflow(e)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tree::tests::{chain, star};

    /// 11x11 grid, capacity 1 everywhere except zero vertical capacity in
    /// column 10, with `tree`'s own usage applied.
    pub(crate) fn grid_with(tree: &RoutingTree) -> CongestionGrid {
        use steiner_common::db::capacity::CapacityMatrix;
        let h = CapacityMatrix::filled(11, 11, 1);
        let mut v = CapacityMatrix::filled(11, 11, 1);
        for y in 0..11 {
            v.set(y, 10, 0);
        }
        let mut grid = CongestionGrid::new(&h, &v);
        for i in 0..tree.n_pins() {
            grid.change_h_usage(
                tree.y(i) as usize,
                tree.x_low(i) as usize,
                tree.x_high(i) as usize,
                1,
            );
            grid.change_v_usage(
                tree.x(i) as usize,
                tree.y_low(i) as usize,
                tree.y_high(i) as usize,
                1,
            );
        }
        grid
    }

    #[test]
    fn composite_sums_weighted_parts() {
        let t = star();
        let mut grid = grid_with(&t);
        let eval = Evaluator::from_config(&WeightsConfig::default(), &DetourConfig::default());

        let mut breakdown = CostBreakdown::new();
        let cost = eval.evaluate(&t, &mut grid, Some(&mut breakdown));
        // length 30, detour 0, overflow 10
        assert!((cost - (0.1 * 30.0 + 0.5 * 10.0)).abs() < 1e-9);

        let names: Vec<&str> = breakdown.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Weighted(0.1)", "Weighted(0.9)", "Weighted(0.5)", "Composite"]
        );
        assert_eq!(breakdown.cost_of("Overflow"), None);
        assert_eq!(breakdown.cost_of("Weighted(0.5)"), Some(5.0));
        assert_eq!(breakdown.entries()[2].description, "(Overflow: 10.000)");
        let parts: f64 = breakdown.entries()[..3].iter().map(|e| e.cost).sum();
        assert!((parts - cost).abs() < 1e-9);
        assert_eq!(breakdown.cost_of("Composite"), Some(cost));
    }

    #[test]
    fn names_follow_the_evaluator_shape() {
        let eval = Evaluator::from_config(&WeightsConfig::default(), &DetourConfig::default());
        assert_eq!(eval.name(), "Composite");
        let weighted = Evaluator::Overflow(OverflowEvaluator).weighted(0.5);
        assert_eq!(weighted.name(), "Weighted(0.5)");
    }

    #[test]
    fn evaluation_without_sink_matches() {
        let t = chain();
        let mut grid = grid_with(&t);
        let eval = Evaluator::from_config(&WeightsConfig::default(), &DetourConfig::default());
        let quiet = eval.evaluate(&t, &mut grid, None);
        let mut breakdown = CostBreakdown::new();
        let loud = eval.evaluate(&t, &mut grid, Some(&mut breakdown));
        assert_eq!(quiet, loud);
    }

    #[test]
    fn breakdown_table_is_aligned() {
        let mut b = CostBreakdown::new();
        b.record("Length", 30.0, "");
        b.record("Composite", 8.25, "");
        let text = b.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Length   : 30.000");
        assert_eq!(lines[1], "Composite: 8.250");
    }
}
