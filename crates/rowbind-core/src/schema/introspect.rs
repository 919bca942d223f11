//! Role-aware views over a descriptor table.
//!
//! Pure functions of the `TypeInfo`; callers cache the results (or what
//! they derive from them) keyed by the table's identity.

use super::{FieldInfo, TypeInfo};
use crate::{Error, Result};

/// Ordered fields eligible to act as structural mapping sources: readable,
/// not ignored, and not restricted to input use.
pub fn source_fields(
    info: &'static TypeInfo,
) -> impl Iterator<Item = (usize, &'static FieldInfo)> {
    info.fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.readable && !field.ignore && !field.input)
}

/// Ordered fields eligible to act as mapping targets: writable, not
/// ignored, and not restricted to output use.
pub fn target_fields(
    info: &'static TypeInfo,
) -> impl Iterator<Item = (usize, &'static FieldInfo)> {
    info.fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.writable && !field.ignore && !field.output)
}

/// Checks the declared roles against the backing accessors.
///
/// Fatal for the type, not per call: the first resolution that touches the
/// type reports the failure, and later resolutions re-attempt (failures are
/// never cached).
pub fn validate(info: &'static TypeInfo) -> Result<()> {
    for field in info.fields {
        if field.input && !field.readable {
            return Err(Error::definition(format!(
                "input field `{}` of type `{}` is not readable",
                field.name, info.name
            )));
        }
        if field.output && !field.writable {
            return Err(Error::definition(format!(
                "output field `{}` of type `{}` is not writable",
                field.name, info.name
            )));
        }
    }
    Ok(())
}
