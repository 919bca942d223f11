//! Parameter projection: a command-shaped object in, an ordered list of
//! directional driver bindings out, and the inverse step that copies
//! driver-populated outputs back onto the object.

use rowbind_core::driver::ParamBinding;
use rowbind_core::schema::{param_specs, ParamSpec, TypeInfo};
use rowbind_core::{Entity, Result, Value};

/// The cached parameter descriptors of one command type.
///
/// Built once per type, immutable afterwards.
#[derive(Debug)]
pub struct ParamSet {
    target: &'static TypeInfo,
    specs: Vec<ParamSpec>,
}

impl ParamSet {
    pub(crate) fn build(info: &'static TypeInfo) -> Result<Self> {
        Ok(Self {
            target: info,
            specs: param_specs(info)?,
        })
    }

    pub fn type_info(&self) -> &'static TypeInfo {
        self.target
    }

    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Projects the object into driver bindings, in descriptor order.
    ///
    /// Input and input-output values are read from the object, with
    /// over-length string and binary values silently truncated to the
    /// declared size. Output-only parameters bind an unvalued placeholder.
    pub fn project(&self, source: &dyn Entity) -> Vec<ParamBinding> {
        self.specs
            .iter()
            .map(|spec| {
                let value = if spec.direction.is_input() {
                    truncate(source.get(spec.field), spec.size)
                } else {
                    Value::Null
                };
                ParamBinding {
                    spec: spec.clone(),
                    value,
                }
            })
            .collect()
    }

    /// Copies captured output values back onto the object, locating each by
    /// parameter name and inverse-coercing to the declared type. Names
    /// without an output-role descriptor are dropped.
    pub fn apply_outputs(&self, target: &mut dyn Entity, outputs: &[(String, Value)]) -> Result<()> {
        for (name, value) in outputs {
            let Some(spec) = self
                .specs
                .iter()
                .find(|spec| spec.direction.is_output() && spec.name == *name)
            else {
                continue;
            };
            let value = match value {
                Value::Null => Value::Null,
                value if value.scalar_ty() == Some(spec.ty) => value.clone(),
                value => value.clone().convert(spec.ty)?,
            };
            target.set(spec.field, value);
        }
        Ok(())
    }
}

/// Truncates string and binary values to `size` (counted in characters for
/// strings, bytes otherwise); -1 leaves the value untouched.
pub(crate) fn truncate(value: Value, size: i32) -> Value {
    if size < 0 {
        return value;
    }
    let max = size as usize;
    match value {
        Value::String(s) => match s.char_indices().nth(max) {
            Some((at, _)) => Value::String(s[..at].into()),
            None => Value::String(s),
        },
        Value::Bytes(mut b) => {
            b.truncate(max);
            Value::Bytes(b)
        }
        Value::Opaque(mut b) => {
            b.truncate(max);
            Value::Opaque(b)
        }
        other => other,
    }
}
