use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("topology over {nodes} nodes has {edges} edges, expected one fewer than nodes")]
    EdgeCountMismatch { nodes: usize, edges: usize },
    #[error("flat edge encoding has odd length {0}")]
    OddEncodingLength(usize),
    #[error("edge refers to node {index}, but the tree has {nodes} nodes")]
    NodeOutOfRange { index: usize, nodes: usize },
    #[error("tree has no driver pin")]
    NoDriver,
    #[error("tree has more than one driver pin ({first} and {second})")]
    MultipleDrivers { first: usize, second: usize },
    #[error("pin at position {position} declares index {declared}")]
    PinIndexMismatch { position: usize, declared: usize },
    #[error("edges do not form a spanning tree over {nodes} nodes")]
    NotSpanning { nodes: usize },
    #[error("pin {pin} at ({x}, {y}) lies outside the {width}x{height} grid")]
    PinOutsideGrid {
        pin: usize,
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
    #[error("resume file line {line}: net id {found} does not match netlist net {expected}")]
    NetIdMismatch { line: usize, expected: i64, found: i64 },
    #[error("resume file line {line}: net {net} needs {expected} indices, found {found}")]
    ResumeLengthMismatch {
        line: usize,
        net: i64,
        expected: usize,
        found: usize,
    },
    #[error("resume file has {found} nets, netlist has {expected}")]
    MissingNet { expected: usize, found: usize },
    #[error("resume file line {line}: {reason}")]
    MalformedResumeLine { line: usize, reason: String },
}
