use rowbind_core::driver::Row;
use rowbind_core::{Entity, Result, ScalarType, TypeInfo, Value};

/// An immutable columnar plan for one (command, result-set) position.
///
/// Frozen from the first row observed at that position; later rows replay
/// the same steps without looking at column names again.
pub struct RecordPlan {
    pub(crate) target: &'static TypeInfo,
    pub(crate) steps: Vec<ColumnStep>,
}

/// One column-to-field assignment.
pub(crate) struct ColumnStep {
    pub(crate) column: usize,
    pub(crate) field: usize,
    pub(crate) convert: Option<ScalarType>,
    /// Whether a null value is representable on the field: assign the
    /// absent value instead of skipping. Set for nullable and string-like
    /// fields.
    pub(crate) null_check: bool,
}

impl RecordPlan {
    pub fn target(&self) -> &'static TypeInfo {
        self.target
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Applies the plan to one row. Unmatched columns were dropped at plan
    /// time; unmatched fields keep their defaults.
    pub fn materialize_into(&self, row: &dyn Row, target: &mut dyn Entity) -> Result<()> {
        for step in &self.steps {
            if row.is_null(step.column) {
                if step.null_check {
                    target.set(step.field, Value::Null);
                }
                continue;
            }
            let value = row.value(step.column);
            let value = match step.convert {
                Some(ty) if value.scalar_ty() != Some(ty) => value.convert(ty)?,
                _ => value,
            };
            target.set(step.field, value);
        }
        Ok(())
    }
}

impl core::fmt::Debug for RecordPlan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordPlan")
            .field("target", &self.target.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}
