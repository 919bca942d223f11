use crate::value::Value;

/// What the driver reports back from a non-query execution.
#[derive(Debug, Default)]
pub struct ExecOutcome {
    /// Number of rows impacted by the operation.
    pub rows_affected: u64,

    /// Populated output/input-output parameter values, by parameter name.
    pub outputs: Vec<(String, Value)>,
}

impl ExecOutcome {
    pub fn count(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            outputs: Vec::new(),
        }
    }

    pub fn with_output(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.push((name.into(), value.into()));
        self
    }
}
