//! Columnar plan construction from an observed row.
//!
//! Single level, by column name. Unknown columns are dropped, fields with
//! no column keep their defaults, and each field is assigned by at most
//! one column (the first, when a projection repeats a name).

use super::plan::{ColumnStep, RecordPlan};
use rowbind_core::driver::Row;
use rowbind_core::schema::{self, FieldKind, TypeInfo};
use rowbind_core::value::can_map_to;
use rowbind_core::Result;

pub(crate) fn build(row: &dyn Row, target: &'static TypeInfo) -> Result<RecordPlan> {
    schema::validate(target)?;

    let mut taken = vec![false; target.fields.len()];
    let mut steps = Vec::new();

    for column in 0..row.len() {
        let Some((field, meta)) = target.field(row.name(column)) else {
            continue;
        };
        if taken[field] || !meta.writable || meta.ignore || meta.output {
            continue;
        }
        let FieldKind::Scalar(field_ty) = meta.kind else {
            continue;
        };

        let column_ty = row.column_ty(column);
        // vendor types the driver cannot classify come through the generic
        // value accessor and land only in opaque fields
        if !can_map_to(column_ty, field_ty) {
            continue;
        }

        taken[field] = true;
        steps.push(ColumnStep {
            column,
            field,
            convert: (column_ty != field_ty).then_some(field_ty),
            null_check: meta.nullable || field_ty.is_string_like(),
        });
    }

    Ok(RecordPlan { target, steps })
}
