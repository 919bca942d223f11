use crate::{value::ScalarType, value::Value, Result};

/// One tabular row as the driver exposes it: positional access to names,
/// runtime column types, null indicators, and values.
pub trait Row {
    /// Number of columns.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column name at `index`.
    fn name(&self, index: usize) -> &str;

    /// Runtime scalar type of the column at `index`. Vendor types the
    /// driver cannot classify report [`ScalarType::Opaque`] and are fetched
    /// through the generic value accessor.
    fn column_ty(&self, index: usize) -> ScalarType;

    /// Null indicator for the value at `index`.
    fn is_null(&self, index: usize) -> bool;

    /// The value at `index`; `Value::Null` when the null indicator is set.
    fn value(&self, index: usize) -> Value;
}

/// A forward-only cursor over the rows and result sets of one execution.
pub trait RowSet {
    /// Advances to the next row of the current result set. Returns `false`
    /// when the result set is exhausted.
    fn next_row(&mut self) -> Result<bool>;

    /// The current row. Valid only after `next_row` returned `true`.
    fn row(&self) -> &dyn Row;

    /// Advances to the next result set, reporting whether one exists.
    fn next_result(&mut self) -> Result<bool>;
}
