pub mod forest;
pub mod topology;

pub use forest::ForestOptimizer;
pub use topology::TopologyOptimizer;
