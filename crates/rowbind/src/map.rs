//! Structural object-to-object mapping: plan model, planner, and the
//! interpreter that replays a plan against live entities.

mod config;
pub use config::{MapConfig, OverrideFn};

mod exec;
pub(crate) use exec::{exec, PlanResolver};

mod plan;
pub use plan::MapPlan;
pub(crate) use plan::FieldMapping;

mod planner;
pub(crate) use planner::build;

/// Bounded traversal depth when flattening a source type.
pub(crate) const MAX_LEVEL: usize = 5;
