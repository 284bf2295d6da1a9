#[allow(clippy::module_inception)]
mod collector;
pub mod passes;

pub use collector::{Collector, RunReport};
pub use passes::PassReport;
