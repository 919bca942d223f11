use super::{ScalarType, Value};
use crate::{Error, Result};

/// True when `from` can be assigned to `to` without caller intervention:
/// identical types or one of the fixed widening pairs.
///
/// Used at plan time; the narrowing direction is reserved for explicit
/// inverse coercion (output parameters), which goes through
/// [`Value::convert`] directly.
pub fn can_map_to(from: ScalarType, to: ScalarType) -> bool {
    from == to || widens_to(from, to)
}

fn widens_to(from: ScalarType, to: ScalarType) -> bool {
    use ScalarType::*;

    match to {
        F64 => matches!(from, I8 | I16 | I32 | I64 | U8 | U16 | U32 | U64 | F32),
        F32 => matches!(from, I8 | I16 | I32 | I64 | U8 | U16 | U32 | U64),
        U64 => matches!(from, U8 | U16 | U32),
        I64 => matches!(from, I8 | I16 | I32 | U8 | U16 | U32),
        U32 => matches!(from, U8 | U16),
        I32 => matches!(from, I8 | I16 | U8 | U16),
        U16 => matches!(from, U8),
        I16 => matches!(from, I8 | U8),
        _ => false,
    }
}

impl Value {
    /// Converts this value to the given scalar type.
    ///
    /// Null passes through untouched. Numeric values convert in either
    /// direction (the narrowing direction exists for inverse coercion of
    /// driver-populated outputs); everything else requires an identical
    /// type.
    pub fn convert(self, to: ScalarType) -> Result<Self> {
        if self.is_null() {
            return Ok(Self::Null);
        }
        if self.scalar_ty() == Some(to) {
            return Ok(self);
        }

        if let Some(int) = self.as_int() {
            return match Self::from_int(int, to) {
                Some(v) => Ok(v),
                None => Err(Error::type_conversion(self, to.name())),
            };
        }
        if let Some(float) = self.as_float() {
            return match to {
                ScalarType::F32 => Ok(Self::F32(float as f32)),
                ScalarType::F64 => Ok(Self::F64(float)),
                _ => match Self::from_int(float as i128, to) {
                    Some(v) => Ok(v),
                    None => Err(Error::type_conversion(self, to.name())),
                },
            };
        }

        Err(Error::type_conversion(self, to.name()))
    }

    fn as_int(&self) -> Option<i128> {
        Some(match *self {
            Self::I8(v) => v as i128,
            Self::I16(v) => v as i128,
            Self::I32(v) => v as i128,
            Self::I64(v) => v as i128,
            Self::U8(v) => v as i128,
            Self::U16(v) => v as i128,
            Self::U32(v) => v as i128,
            Self::U64(v) => v as i128,
            _ => return None,
        })
    }

    fn as_float(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v as f64),
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    fn from_int(int: i128, to: ScalarType) -> Option<Self> {
        Some(match to {
            ScalarType::I8 => Self::I8(int as i8),
            ScalarType::I16 => Self::I16(int as i16),
            ScalarType::I32 => Self::I32(int as i32),
            ScalarType::I64 => Self::I64(int as i64),
            ScalarType::U8 => Self::U8(int as u8),
            ScalarType::U16 => Self::U16(int as u16),
            ScalarType::U32 => Self::U32(int as u32),
            ScalarType::U64 => Self::U64(int as u64),
            ScalarType::F32 => Self::F32(int as f32),
            ScalarType::F64 => Self::F64(int as f64),
            _ => return None,
        })
    }
}
