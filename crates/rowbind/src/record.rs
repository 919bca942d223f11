//! Columnar row-to-object mapping: one level, by column name, planned
//! from the first row a command produces.

mod plan;
pub use plan::RecordPlan;

mod planner;
pub(crate) use planner::build;
