pub mod builder;
pub mod graph;

pub use builder::SteinerTreeBuilder;
pub use graph::{SteinerBranch, SteinerGraph, SteinerNode, SteinerTree};
