pub mod capacity;
pub mod core;
pub mod indices;
pub mod parser;
