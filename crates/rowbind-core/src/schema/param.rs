use super::{FieldKind, TypeInfo};
use crate::{value::ScalarType, Error, Result};

/// Direction a parameter value travels relative to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    In,
    Out,
    InOut,
}

impl ParamDirection {
    pub fn is_input(self) -> bool {
        matches!(self, Self::In | Self::InOut)
    }

    pub fn is_output(self) -> bool {
        matches!(self, Self::Out | Self::InOut)
    }
}

/// Metadata for one directional, sized, typed value exchanged with the
/// driver. Built once per command type and cached alongside its plans.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ScalarType,
    pub direction: ParamDirection,
    /// Maximum size for string/binary values; -1 = unbounded.
    pub size: i32,
    pub precision: u8,
    pub scale: u8,
    pub nullable: bool,
    pub vendor_ty: Option<&'static str>,
    /// Index of the backing field in the command type.
    pub field: usize,
}

/// Derives the ordered parameter descriptors for a command-shaped type.
///
/// Scalar fields only; the `input`/`output` role flags combine into the
/// direction (neither flag means plain input). Role/accessor mismatches
/// surface here as definition errors.
pub fn param_specs(info: &'static TypeInfo) -> Result<Vec<ParamSpec>> {
    let mut specs = Vec::new();
    for (index, field) in info.fields.iter().enumerate() {
        if field.ignore {
            continue;
        }
        let FieldKind::Scalar(ty) = field.kind else {
            continue;
        };
        let direction = match (field.input, field.output) {
            (true, true) => ParamDirection::InOut,
            (false, true) => ParamDirection::Out,
            _ => ParamDirection::In,
        };
        if direction.is_input() && !field.readable {
            return Err(Error::definition(format!(
                "input field `{}` of type `{}` is not readable",
                field.name, info.name
            )));
        }
        if direction.is_output() && !field.writable {
            return Err(Error::definition(format!(
                "output field `{}` of type `{}` is not writable",
                field.name, info.name
            )));
        }
        specs.push(ParamSpec {
            name: field.name.to_string(),
            ty,
            direction,
            size: field.size,
            precision: field.precision,
            scale: field.scale,
            // binary values are implicitly nullable; everything else,
            // strings included, must opt in
            nullable: field.nullable || matches!(ty, ScalarType::Bytes),
            vendor_ty: field.vendor_ty,
            field: index,
        });
    }
    Ok(specs)
}
