//! Plan interpretation: a read-only walk over the entry list against a
//! concrete source/target pair. Sub-object plans resolve lazily through
//! the caller's cache, which is what lets mutually recursive types
//! terminate.

use super::plan::{FieldMapping, MapPlan};
use rowbind_core::{Entity, Result, ScalarType, TypeInfo, Value};
use std::sync::Arc;

/// Resolves the plan for a (source, target) pair out of the shared cache.
pub(crate) type PlanResolver<'a> =
    &'a dyn Fn(&'static TypeInfo, &'static TypeInfo) -> Result<Arc<MapPlan>>;

pub(crate) fn exec(
    plan: &MapPlan,
    source: &dyn Entity,
    target: &mut dyn Entity,
    resolve: PlanResolver<'_>,
) -> Result<()> {
    apply(&plan.entries, source, source, target, resolve)
}

fn apply(
    entries: &[FieldMapping],
    root: &dyn Entity,
    source: &dyn Entity,
    target: &mut dyn Entity,
    resolve: PlanResolver<'_>,
) -> Result<()> {
    for entry in entries {
        match entry {
            FieldMapping::Direct {
                source: from,
                target: to,
                convert,
                skip_null,
            } => {
                assign(target, *to, source.get(*from), *convert, *skip_null)?;
            }

            // override expressions always see the root source, never an
            // intermediate of nested traversal
            FieldMapping::Override {
                target: to,
                expr,
                convert,
            } => {
                assign(target, *to, expr(root), *convert, false)?;
            }

            FieldMapping::Nested {
                source: from,
                children,
            } => {
                if let Some(sub) = source.nested(*from) {
                    apply(children, root, sub, target, resolve)?;
                }
            }

            FieldMapping::NestedStruct {
                source: from,
                target: to,
            } => {
                let Some(sub_source) = source.nested(*from) else {
                    // absent source side: no allocation, slot untouched
                    continue;
                };
                let info = sub_source.info();
                let sub_plan = resolve(info, info)?;
                if let Some(sub_target) = target.ensure_nested(*to) {
                    apply(&sub_plan.entries, sub_source, sub_source, sub_target, resolve)?;
                }
            }

            FieldMapping::ScalarList {
                source: from,
                target: to,
                convert,
            } => {
                let value = source.get(*from);
                let Value::List(elements) = value else {
                    target.set(*to, Value::Null);
                    continue;
                };
                let converted = match convert {
                    Some(ty) => elements
                        .into_iter()
                        .map(|element| convert_element(element, *ty))
                        .collect::<Result<_>>()?,
                    None => elements,
                };
                target.set(*to, Value::List(converted));
            }

            FieldMapping::StructList {
                source: from,
                target: to,
            } => {
                let Some(count) = source.element_count(*from) else {
                    target.set(*to, Value::Null);
                    continue;
                };
                target.create_elements(*to, count);
                let mut sub_plan: Option<Arc<MapPlan>> = None;
                for at in 0..count {
                    let Some(element) = source.element(*from, at) else {
                        continue;
                    };
                    let plan = match &sub_plan {
                        Some(plan) => Arc::clone(plan),
                        None => {
                            let info = element.info();
                            let plan = resolve(info, info)?;
                            sub_plan = Some(Arc::clone(&plan));
                            plan
                        }
                    };
                    if let Some(sub_target) = target.ensure_element(*to, at) {
                        apply(&plan.entries, element, element, sub_target, resolve)?;
                    }
                }
            }
        }
    }

    Ok(())
}

fn assign(
    target: &mut dyn Entity,
    field: usize,
    value: Value,
    convert: Option<ScalarType>,
    skip_null: bool,
) -> Result<()> {
    if value.is_null() {
        if !skip_null {
            target.set(field, Value::Null);
        }
        return Ok(());
    }
    let value = match convert {
        Some(ty) if value.scalar_ty() != Some(ty) => value.convert(ty)?,
        _ => value,
    };
    target.set(field, value);
    Ok(())
}

fn convert_element(element: Value, ty: ScalarType) -> Result<Value> {
    if element.is_null() || element.scalar_ty() == Some(ty) {
        return Ok(element);
    }
    element.convert(ty)
}
