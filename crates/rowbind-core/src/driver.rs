mod command;
pub use command::{Command, CommandId, CommandKind, CommandSpec, ParamBinding};

mod response;
pub use response::ExecOutcome;

mod row;
pub use row::{Row, RowSet};

use crate::{value::Value, Result};
use std::fmt::Debug;

/// The execution collaborator the engine binds values for.
///
/// Everything below this trait (connections, pooling, retries, vendor
/// wire protocols) belongs to the driver. The engine hands over a fully
/// projected [`CommandSpec`] and interprets what comes back.
pub trait Driver: Debug + Send + Sync + 'static {
    /// Executes for the number of affected rows, returning any populated
    /// output parameter values alongside.
    fn execute(&self, spec: &CommandSpec) -> Result<ExecOutcome>;

    /// Executes for the first column of the first row. Extra columns and
    /// rows are ignored.
    fn execute_scalar(&self, spec: &CommandSpec) -> Result<Value>;

    /// Executes for a sequence of rows, possibly spanning multiple result
    /// sets.
    fn execute_rows<'a>(&'a self, spec: &CommandSpec) -> Result<Box<dyn RowSet + 'a>>;
}
