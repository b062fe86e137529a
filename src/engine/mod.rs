//! Batch execution: runs the decision engine over a dealer's inventory.

pub mod runner;
