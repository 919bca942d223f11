//! Script rendering for a composed batch.
//!
//! Layout per item: variable declarations for its output parameters, one
//! `EXEC` statement, then one capture insert per output. When any item
//! declares outputs the whole script is wrapped in the capture table
//! header and the footer select that returns the captured triples.

use super::BatchItem;
use crate::params::truncate;
use crate::session::qualified_name;
use rowbind_core::schema::{ParamDirection, ParamSpec};
use rowbind_core::{Error, Result, Value};
use std::fmt::Write;

const HEADER: &str =
    "declare @output table(commandIndex int, parameterName varchar(100), parameterValue sql_variant)\n";
const FOOTER: &str = "select commandIndex, parameterName, parameterValue from @output";

pub(super) fn compose(items: &[BatchItem<'_>]) -> Result<String> {
    let mut body = String::new();
    let mut has_output = false;
    for (index, item) in items.iter().enumerate() {
        if script_item(&mut body, items, index, item)? {
            has_output = true;
        }
    }
    if has_output {
        Ok(format!("{HEADER}{body}\n{FOOTER}"))
    } else {
        Ok(body)
    }
}

fn script_item(
    out: &mut String,
    items: &[BatchItem<'_>],
    index: usize,
    item: &BatchItem<'_>,
) -> Result<bool> {
    let mut declarations = String::new();
    let mut args = String::new();
    let mut captures = String::new();

    for (param, spec) in item.set.specs().iter().enumerate() {
        if !args.is_empty() {
            args.push_str(", ");
        }
        if spec.direction == ParamDirection::In {
            args.push_str(&argument(items, item, param, spec)?);
        } else {
            let var = var_name(index, spec);
            let _ = writeln!(declarations, "\ndeclare {var} {}", sql_type(spec));
            if spec.direction == ParamDirection::InOut {
                let _ = writeln!(
                    declarations,
                    "set {var} = {}",
                    argument(items, item, param, spec)?
                );
            }
            args.push_str(&var);
            args.push_str(" OUTPUT");
            let _ = writeln!(
                captures,
                "insert into @output values({index}, '{}', {var})",
                spec.name
            );
        }
    }

    out.push_str(&declarations);
    let _ = writeln!(
        out,
        "EXEC {} {args};",
        qualified_name(item.command.namespace(), item.command.info().name)
    );
    out.push_str(&captures);
    Ok(!captures.is_empty())
}

/// The inline form of one parameter: the producing item's variable name
/// when linked, a formatted literal otherwise.
fn argument(
    items: &[BatchItem<'_>],
    item: &BatchItem<'_>,
    param: usize,
    spec: &ParamSpec,
) -> Result<String> {
    if let Some((src_item, src_param)) = item.links[param] {
        let src_spec = &items[src_item].set.specs()[src_param];
        return Ok(var_name(src_item, src_spec));
    }
    let value = truncate(item.command.get(spec.field), spec.size);
    literal(spec, &value).ok_or_else(|| Error::composition(spec.name.clone()))
}

fn var_name(item: usize, spec: &ParamSpec) -> String {
    format!("@{}{}", spec.name, item)
}

/// Renders one scalar as a script literal. `None` only for an absent value
/// on a non-nullable parameter.
fn literal(spec: &ParamSpec, value: &Value) -> Option<String> {
    Some(match value {
        Value::Null => {
            if !spec.nullable {
                return None;
            }
            "null".to_string()
        }
        Value::Bool(v) => if *v { "1" } else { "0" }.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::String(v) => quoted(v),
        Value::Uuid(v) => quoted(&v.to_string()),
        Value::DateTime(v) => format!("'{}'", v.format("%Y%m%d %H:%M")),
        Value::Bytes(v) | Value::Opaque(v) => hex(v),
        // parameter descriptors never carry lists
        Value::List(_) => return None,
    })
}

fn quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// The declared script type for an output variable.
fn sql_type(spec: &ParamSpec) -> String {
    use rowbind_core::ScalarType::*;

    if let Some(vendor) = spec.vendor_ty {
        return vendor.to_string();
    }
    match spec.ty {
        Bool => "bit".to_string(),
        I8 | U8 => "tinyint".to_string(),
        I16 | U16 => "smallint".to_string(),
        I32 | U32 => "int".to_string(),
        I64 | U64 => "bigint".to_string(),
        F32 => "real".to_string(),
        F64 if spec.precision > 0 => format!("decimal({}, {})", spec.precision, spec.scale),
        F64 => "float".to_string(),
        String => sized("nvarchar", spec.size),
        Bytes | Opaque => sized("varbinary", spec.size),
        DateTime => "datetime".to_string(),
        Uuid => "uniqueidentifier".to_string(),
    }
}

fn sized(base: &str, size: i32) -> String {
    if size < 0 {
        format!("{base}(max)")
    } else {
        format!("{base}({size})")
    }
}
