//! rowbind converts between in-memory object graphs, directional command
//! parameters, and tabular rows. Callers declare what maps to what (by
//! name, by role flags, or by explicit override) and the engine resolves
//! the correspondence once per type pair, caching an immutable plan that
//! every later conversion replays without further descriptor searches.

pub mod batch;
pub use batch::Batch;

mod engine;
pub use engine::{Engine, MAX_RESULT_SETS};

pub mod map;
pub use map::MapConfig;

mod params;
pub use params::ParamSet;

pub mod record;

mod session;
pub use session::{RowContext, Script, Session};

pub use rowbind_core::{
    driver, entity, schema, Driver, Entity, Error, Result, ScalarType, Value,
};
