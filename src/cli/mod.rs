// Command implementations for the `catalog` admin binary

pub mod data;
pub mod stats;
