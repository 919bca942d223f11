//! Structural plan construction.
//!
//! Targets resolve against sources by name: explicit bindings and ignores
//! withdraw their field first, then each traversal level matches what it
//! can and queues struct-shaped source fields for the next level, down to
//! [`MAX_LEVEL`]. Unmatched targets stay out of the plan and keep their
//! defaults.

use super::config::MapConfig;
use super::plan::{FieldMapping, MapPlan};
use super::MAX_LEVEL;
use indexmap::IndexMap;
use rowbind_core::schema::{self, FieldInfo, FieldKind, TypeInfo};
use rowbind_core::value::can_map_to;
use rowbind_core::{Error, Result};

type Remaining = IndexMap<&'static str, (usize, &'static FieldInfo)>;

pub(crate) fn build(
    source: &'static TypeInfo,
    target: &'static TypeInfo,
    config: Option<&MapConfig>,
) -> Result<MapPlan> {
    schema::validate(source)?;
    schema::validate(target)?;

    let mut remaining: Remaining = schema::target_fields(target)
        .map(|(index, field)| (field.name, (index, field)))
        .collect();

    let mut entries = Vec::new();

    if let Some(config) = config {
        for (name, binding) in &config.bindings {
            let (index, field) = remaining.shift_remove(name.as_str()).ok_or_else(|| {
                Error::definition(format!(
                    "bound field `{}` is not a writable field of `{}`",
                    name, target.name
                ))
            })?;
            let Some(expr) = binding else {
                // ignore: withdrawn, left at default
                continue;
            };
            let Some(ty) = field.scalar_ty() else {
                return Err(Error::definition(format!(
                    "bound field `{}` of `{}` is not a scalar field",
                    name, target.name
                )));
            };
            entries.push(FieldMapping::Override {
                target: index,
                expr: expr.clone(),
                convert: Some(ty),
            });
        }
    }

    entries.extend(resolve(source, &mut remaining, 0));

    Ok(MapPlan {
        source,
        target,
        entries,
    })
}

/// Matches one traversal level, then descends into unmatched struct-shaped
/// source fields while targets remain.
fn resolve(source: &'static TypeInfo, remaining: &mut Remaining, level: usize) -> Vec<FieldMapping> {
    let mut entries = Vec::new();
    if remaining.is_empty() {
        return entries;
    }

    let mut queued: Vec<(usize, &'static TypeInfo)> = Vec::new();

    for (index, field) in schema::source_fields(source) {
        let matched = remaining
            .get(field.name)
            .and_then(|&(tindex, tfield)| correspondence(index, field, tindex, tfield));

        match matched {
            Some(entry) => {
                remaining.shift_remove(field.name);
                entries.push(entry);
                if remaining.is_empty() {
                    return entries;
                }
            }
            None => {
                if let FieldKind::Struct(info) = field.kind {
                    queued.push((index, info()));
                }
            }
        }
    }

    if level < MAX_LEVEL {
        for (index, info) in queued {
            let children = resolve(info, remaining, level + 1);
            if !children.is_empty() {
                entries.push(FieldMapping::Nested {
                    source: index,
                    children,
                });
            }
            if remaining.is_empty() {
                break;
            }
        }
    }

    entries
}

/// Whether a same-named pair is directly compatible, and under what entry.
fn correspondence(
    source: usize,
    sfield: &'static FieldInfo,
    target: usize,
    tfield: &'static FieldInfo,
) -> Option<FieldMapping> {
    match (sfield.kind, tfield.kind) {
        (FieldKind::Scalar(from), FieldKind::Scalar(to)) => {
            can_map_to(from, to).then(|| FieldMapping::Direct {
                source,
                target,
                convert: (from != to).then_some(to),
                skip_null: !tfield.nullable,
            })
        }
        (FieldKind::Struct(a), FieldKind::Struct(b)) => {
            TypeInfo::same(a(), b()).then(|| FieldMapping::NestedStruct { source, target })
        }
        (FieldKind::ScalarList(from), FieldKind::ScalarList(to)) => {
            can_map_to(from, to).then(|| FieldMapping::ScalarList {
                source,
                target,
                convert: (from != to).then_some(to),
            })
        }
        (FieldKind::StructList(a), FieldKind::StructList(b)) => {
            TypeInfo::same(a(), b()).then(|| FieldMapping::StructList { source, target })
        }
        _ => None,
    }
}
