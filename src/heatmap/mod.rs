pub mod aggregator;
pub mod density;
pub mod diff;
pub mod grid;
pub mod projector;
