//! The execution surface: a driver plus a shared [`Engine`], with the
//! command lifecycle (project, execute, redistribute outputs) in one
//! place. Failures raised mid-execution are recorded on a per-invocation
//! context and surfaced after cleanup, never mid-stream.

use crate::batch::Batch;
use crate::engine::Engine;
use rowbind_core::driver::{Command, CommandId, CommandKind, CommandSpec, ParamBinding, Row};
use rowbind_core::schema::{ParamDirection, ParamSpec, TypeInfo};
use rowbind_core::{Driver, Entity, Error, Result, ScalarType, Value};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Qualified execution name of a declared command.
pub(crate) fn qualified_name(namespace: &str, name: &str) -> String {
    format!("[{namespace}].[{name}]")
}

/// A driver bound to an engine.
///
/// Sessions default to free-text execution; in procedure mode declared
/// commands execute by qualified name instead, while scripts always stay
/// text.
#[derive(Debug)]
pub struct Session<D> {
    driver: D,
    engine: Arc<Engine>,
    mode: CommandKind,
    timeout: Duration,
}

impl<D: Driver> Session<D> {
    pub fn new(driver: D) -> Self {
        Self::with_engine(driver, Arc::new(Engine::new()))
    }

    pub fn with_engine(driver: D, engine: Arc<Engine>) -> Self {
        Self {
            driver,
            engine,
            mode: CommandKind::Text,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn execution_mode(mut self, mode: CommandKind) -> Self {
        self.mode = mode;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Starts an empty batch over this session's engine.
    pub fn batch(&self) -> Batch<'_> {
        Batch::new(&self.engine)
    }

    /// Executes for the number of affected rows, then copies any driver
    /// output values back onto the command.
    pub fn execute(&self, command: &mut dyn Command) -> Result<u64> {
        let spec = self.spec(command)?;
        tracing::debug!(command = %spec.name, "executing");

        let mut ctx = ExecutionContext::new(&spec.name);
        let mut rows = 0;
        match self.driver.execute(&spec) {
            Ok(outcome) => {
                rows = outcome.rows_affected;
                if let Err(err) = self.engine.apply_outputs(command, &outcome.outputs) {
                    ctx.record(err);
                }
            }
            Err(err) => ctx.record(err),
        }
        ctx.finish()?;
        Ok(rows)
    }

    /// Executes for the first column of the first row.
    pub fn execute_scalar(&self, command: &dyn Command) -> Result<Value> {
        let spec = self.spec(command)?;
        tracing::debug!(command = %spec.name, "executing for a scalar");

        let mut ctx = ExecutionContext::new(&spec.name);
        let mut value = Value::Null;
        match self.driver.execute_scalar(&spec) {
            Ok(v) => value = v,
            Err(err) => ctx.record(err),
        }
        ctx.finish()?;
        Ok(value)
    }

    /// Maps `model` onto a fresh command, executes it, and reflects the
    /// command (outputs included) back onto the model.
    pub fn map_execute<C: Command + Default>(&self, model: &mut dyn Entity) -> Result<u64> {
        let mut command = C::default();
        self.engine.map_dyn(&*model, &mut command)?;
        let rows = self.execute(&mut command)?;
        self.engine.map_dyn(&command, model)?;
        Ok(rows)
    }

    /// Executes for rows and materializes every row of every result set
    /// into `T` under the command's frozen columnar plans.
    pub fn query<T: Entity + Default>(&self, command: &dyn Command) -> Result<Vec<T>> {
        self.query_with(command, |ctx| ctx.materialize().map(Some))
    }

    /// Materializes the first row of the first result set, if any.
    pub fn query_first<T: Entity + Default>(&self, command: &dyn Command) -> Result<Option<T>> {
        Ok(self.query(command)?.into_iter().next())
    }

    /// Executes for rows, handing each row to `read` with access to the
    /// engine, the current row, and the result-set position. Returning
    /// `Ok(None)` skips the row; different result sets may produce
    /// different shapes through [`RowContext::materialize`].
    pub fn query_with<T>(
        &self,
        command: &dyn Command,
        mut read: impl FnMut(&RowContext<'_>) -> Result<Option<T>>,
    ) -> Result<Vec<T>> {
        let spec = self.spec(command)?;
        let id = command.identity();
        tracing::debug!(command = %spec.name, "executing for rows");

        let mut ctx = ExecutionContext::new(&spec.name);
        let mut out = Vec::new();
        match self.driver.execute_rows(&spec) {
            Ok(mut rows) => {
                let mut result_index = 0;
                'results: loop {
                    loop {
                        match rows.next_row() {
                            Ok(true) => {
                                let row_ctx = RowContext {
                                    engine: &self.engine,
                                    id,
                                    row: rows.row(),
                                    result_index,
                                };
                                match read(&row_ctx) {
                                    Ok(Some(item)) => out.push(item),
                                    Ok(None) => {}
                                    Err(err) => {
                                        ctx.record(err);
                                        break 'results;
                                    }
                                }
                            }
                            Ok(false) => break,
                            Err(err) => {
                                ctx.record(err);
                                break 'results;
                            }
                        }
                    }
                    match rows.next_result() {
                        Ok(true) => result_index += 1,
                        Ok(false) => break,
                        Err(err) => {
                            ctx.record(err);
                            break;
                        }
                    }
                }
            }
            Err(err) => ctx.record(err),
        }
        ctx.finish()?;
        Ok(out)
    }

    /// Composes and executes a batch in one round trip, then redistributes
    /// the captured output triples onto the batch's commands and models.
    pub fn execute_batch(&self, batch: &mut Batch<'_>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let spec = CommandSpec {
            name: "Batch".to_string(),
            text: batch.compose()?,
            kind: CommandKind::Text,
            timeout: self.timeout,
            params: Vec::new(),
        };
        tracing::debug!(items = batch.len(), "executing batch");

        let mut ctx = ExecutionContext::new(&spec.name);
        let mut captures = Vec::new();
        match self.driver.execute_rows(&spec) {
            Ok(mut rows) => loop {
                match rows.next_row() {
                    Ok(true) => match capture(rows.row()) {
                        Ok(triple) => captures.push(triple),
                        Err(err) => {
                            ctx.record(err);
                            break;
                        }
                    },
                    Ok(false) => break,
                    Err(err) => {
                        ctx.record(err);
                        break;
                    }
                }
            },
            Err(err) => ctx.record(err),
        }
        ctx.finish()?;
        batch.distribute(&captures)
    }

    fn spec(&self, command: &dyn Command) -> Result<CommandSpec> {
        let info = command.info();
        let mut params = self.engine.project(command)?;
        params.extend(command.extra_params());

        let (kind, text) = if self.mode == CommandKind::Procedure && !command.text_only() {
            (CommandKind::Procedure, qualified_name(command.namespace(), info.name))
        } else {
            (CommandKind::Text, command.script())
        };

        Ok(CommandSpec {
            name: info.name.to_string(),
            text,
            kind,
            timeout: self.timeout,
            params,
        })
    }
}

/// One captured `(item index, parameter name, value)` triple.
fn capture(row: &dyn Row) -> Result<(usize, String, Value)> {
    if row.len() < 3 {
        return Err(Error::invalid_result(
            "capture row must carry item index, parameter name, and value",
        ));
    }
    let index = row.value(0).to_i64()?;
    let index = usize::try_from(index)
        .map_err(|_| Error::invalid_result(format!("negative capture item index {index}")))?;
    let name = row.value(1).to_string()?;
    Ok((index, name, row.value(2)))
}

/// Per-row view handed to a [`Session::query_with`] callback.
pub struct RowContext<'a> {
    engine: &'a Engine,
    id: CommandId,
    row: &'a dyn Row,
    result_index: usize,
}

impl RowContext<'_> {
    pub fn row(&self) -> &dyn Row {
        self.row
    }

    /// Zero-based position of the current result set.
    pub fn result_index(&self) -> usize {
        self.result_index
    }

    /// Materializes the current row under the frozen plan for this
    /// command and result-set position.
    pub fn materialize<T: Entity + Default>(&self) -> Result<T> {
        self.engine.materialize(self.id, self.result_index, self.row)
    }
}

/// Tracks the first failure of one invocation so cleanup can finish
/// before the error surfaces.
struct ExecutionContext<'a> {
    command: &'a str,
    error: Option<Error>,
}

impl<'a> ExecutionContext<'a> {
    fn new(command: &'a str) -> Self {
        Self {
            command,
            error: None,
        }
    }

    fn record(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn finish(self) -> Result<()> {
        match self.error {
            Some(err) => {
                tracing::error!(command = self.command, error = %err, "execution failed");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

static SCRIPT_INFO: TypeInfo = TypeInfo {
    name: "Script",
    fields: &[],
};

/// A free-text command with ad-hoc input parameters.
///
/// Scripts execute as text even in procedure mode, and their
/// materialization plans are keyed by a hash of the text, so an edited
/// script re-plans on first use.
#[derive(Debug, Clone)]
pub struct Script {
    text: String,
    params: Vec<(String, Value)>,
}

impl Script {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    /// Appends one named input parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

impl Entity for Script {
    fn type_info() -> &'static TypeInfo {
        &SCRIPT_INFO
    }

    fn info(&self) -> &'static TypeInfo {
        &SCRIPT_INFO
    }

    fn get(&self, _: usize) -> Value {
        Value::Null
    }

    fn set(&mut self, _: usize, _: Value) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Command for Script {
    fn script(&self) -> String {
        self.text.clone()
    }

    fn identity(&self) -> CommandId {
        CommandId::of_script(&self.text)
    }

    fn text_only(&self) -> bool {
        true
    }

    fn extra_params(&self) -> Vec<ParamBinding> {
        self.params
            .iter()
            .map(|(name, value)| ParamBinding {
                spec: ParamSpec {
                    name: name.clone(),
                    ty: value.scalar_ty().unwrap_or(ScalarType::String),
                    direction: ParamDirection::In,
                    size: -1,
                    precision: 0,
                    scale: 0,
                    nullable: true,
                    vendor_ty: None,
                    // ad-hoc bindings have no backing field
                    field: 0,
                },
                value: value.clone(),
            })
            .collect()
    }
}
