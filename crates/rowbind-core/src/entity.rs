use crate::{schema::TypeInfo, value::Value};
use std::any::Any;

/// Field access for a mappable object, by descriptor index.
///
/// This is the execution-side counterpart of [`TypeInfo`]: the descriptor
/// table says what fields exist, the `Entity` impl moves values in and out
/// of them. One impl per declared type, written against the same field
/// order as the descriptor table.
///
/// Contract notes:
/// - `get` returns `Value::Null` for absent optional scalars and absent
///   scalar lists; `set` with `Value::Null` clears an optional field and is
///   a no-op for a field that cannot be absent.
/// - `set` receives values already converted to the field's declared
///   scalar type; a mismatched variant is ignored rather than panicking.
/// - Nested accessors allocate only through `ensure_*`, and only when the
///   slot is empty, so re-mapping preserves sub-object identity.
/// - For struct-list fields, `set` with `Value::Null` clears the list;
///   `create_elements` replaces it with `len` absent elements.
pub trait Entity: Any + Send {
    /// The descriptor table for this type.
    fn type_info() -> &'static TypeInfo
    where
        Self: Sized;

    /// The descriptor table, reachable through a trait object.
    fn info(&self) -> &'static TypeInfo;

    /// Reads a scalar or scalar-list field.
    fn get(&self, field: usize) -> Value;

    /// Writes a scalar or scalar-list field.
    fn set(&mut self, field: usize, value: Value);

    /// Borrows a nested sub-object, `None` when absent or not a struct
    /// field.
    fn nested(&self, field: usize) -> Option<&dyn Entity> {
        let _ = field;
        None
    }

    /// Borrows a nested sub-object mutably, allocating a default when the
    /// slot is empty. `None` for non-struct fields.
    fn ensure_nested(&mut self, field: usize) -> Option<&mut dyn Entity> {
        let _ = field;
        None
    }

    /// Number of elements in a struct-list field, `None` when the list is
    /// absent.
    fn element_count(&self, field: usize) -> Option<usize> {
        let _ = field;
        None
    }

    /// Borrows one struct-list element, `None` when the element is null.
    fn element(&self, field: usize, at: usize) -> Option<&dyn Entity> {
        let _ = (field, at);
        None
    }

    /// Replaces a struct-list field with `len` absent elements.
    fn create_elements(&mut self, field: usize, len: usize) {
        let _ = (field, len);
    }

    /// Borrows one struct-list element mutably, allocating a default in
    /// its slot when null.
    fn ensure_element(&mut self, field: usize, at: usize) -> Option<&mut dyn Entity> {
        let _ = (field, at);
        None
    }

    /// Upcast used for typed override expressions.
    fn as_any(&self) -> &dyn Any;
}
