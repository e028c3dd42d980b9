use super::CostBreakdown;
use crate::steiner::SteinerTreeBuilder;
use crate::tree::RoutingTree;
use steiner_common::db::core::Pin;
use steiner_common::util::config::{DetourConfig, DetourFunction};

/// Per-pin weight applied to a sink's detour. The driver always weighs 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DetourWeight {
    /// `exp(-slack * scale)`: failing pins dominate, relaxed pins vanish.
    Exp { scale: f64 },
    /// `max(0, 1 - slack * scale)`: linear in slack, clipped at zero.
    PartialLinear { scale: f64 },
}

impl DetourWeight {
    pub fn from_config(cfg: &DetourConfig) -> Self {
        match cfg.function {
            DetourFunction::Exp => DetourWeight::Exp {
                scale: cfg.slack_scale,
            },
            DetourFunction::PartialLinear => DetourWeight::PartialLinear {
                scale: cfg.slack_scale,
            },
        }
    }

    pub fn weight(&self, pin: &Pin) -> f64 {
        if pin.is_driver {
            return 0.0;
        }
        match *self {
            DetourWeight::Exp { scale } => (-pin.slack * scale).exp(),
            DetourWeight::PartialLinear { scale } => (1.0 - pin.slack * scale).max(0.0),
        }
    }
}

impl Default for DetourWeight {
    fn default() -> Self {
        DetourWeight::from_config(&DetourConfig::default())
    }
}

/// Slack-weighted excess of each sink's driver path over its Manhattan
/// distance, measured on the Steinerized tree.
#[derive(Clone, Debug, Default)]
pub struct DetourEvaluator {
    weight: DetourWeight,
}

impl DetourEvaluator {
    pub const NAME: &'static str = "Detour";

    pub fn new(weight: DetourWeight) -> Self {
        Self { weight }
    }

    /// # Panics
    ///
    /// If a pin is unreachable from the driver in the Steiner graph, which a
    /// valid `RoutingTree` rules out.
    pub fn evaluate(&self, tree: &RoutingTree, breakdown: Option<&mut CostBreakdown>) -> f64 {
        let graph = SteinerTreeBuilder::new(tree).build_graph();
        let driver = tree.driver_index();
        let path = graph.path_lengths_from(driver);
        let origin = tree.position(driver);

        let mut cost = 0.0;
        for (i, pin) in tree.pins().iter().enumerate() {
            let Some(along_tree) = path[i] else {
                panic!(
                    "net {}: pin {} unreachable from driver {}",
                    tree.net_id(),
                    i,
                    driver
                );
            };
            let detour = along_tree - origin.manhattan(&pin.position);
            cost += self.weight.weight(pin) * detour as f64;
        }

        if let Some(b) = breakdown {
            b.record(Self::NAME, cost, "");
        }
        cost
    }
}
