pub mod congestion;

pub use congestion::CongestionGrid;

/// Routing direction of a grid resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}
