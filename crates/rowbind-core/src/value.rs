mod coerce;
pub use coerce::can_map_to;

use crate::Result;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// A semantic scalar value exchanged between objects, parameters, and rows.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 8-bit integer
    I8(i8),

    /// Signed 16-bit integer
    I16(i16),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Unsigned 8-bit integer
    U8(u8),

    /// Unsigned 16-bit integer
    U16(u16),

    /// Unsigned 32-bit integer
    U32(u32),

    /// Unsigned 64-bit integer
    U64(u64),

    /// 32-bit floating point
    F32(f32),

    /// 64-bit floating point
    F64(f64),

    /// String value
    String(String),

    /// Binary value
    Bytes(Vec<u8>),

    /// Date and time without a timezone
    DateTime(NaiveDateTime),

    /// Globally unique identifier
    Uuid(Uuid),

    /// An opaque vendor value, carried but never interpreted
    Opaque(Vec<u8>),

    /// A list of values of the same scalar type
    List(Vec<Value>),

    /// Null value
    #[default]
    Null,
}

/// The semantic scalar type of a field, parameter, or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
    DateTime,
    Uuid,
    Opaque,
}

impl ScalarType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::I8 => "I8",
            Self::I16 => "I16",
            Self::I32 => "I32",
            Self::I64 => "I64",
            Self::U8 => "U8",
            Self::U16 => "U16",
            Self::U32 => "U32",
            Self::U64 => "U64",
            Self::F32 => "F32",
            Self::F64 => "F64",
            Self::String => "String",
            Self::Bytes => "Bytes",
            Self::DateTime => "DateTime",
            Self::Uuid => "Uuid",
            Self::Opaque => "Opaque",
        }
    }

    /// True for types whose "absent" representation is a null rather than a
    /// default scalar, requiring a null-indicator branch when materializing.
    pub const fn is_string_like(self) -> bool {
        matches!(self, Self::String | Self::Bytes | Self::Opaque)
    }
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The scalar type of this value, or `None` for `Null` and `List`.
    pub fn scalar_ty(&self) -> Option<ScalarType> {
        Some(match self {
            Self::Bool(_) => ScalarType::Bool,
            Self::I8(_) => ScalarType::I8,
            Self::I16(_) => ScalarType::I16,
            Self::I32(_) => ScalarType::I32,
            Self::I64(_) => ScalarType::I64,
            Self::U8(_) => ScalarType::U8,
            Self::U16(_) => ScalarType::U16,
            Self::U32(_) => ScalarType::U32,
            Self::U64(_) => ScalarType::U64,
            Self::F32(_) => ScalarType::F32,
            Self::F64(_) => ScalarType::F64,
            Self::String(_) => ScalarType::String,
            Self::Bytes(_) => ScalarType::Bytes,
            Self::DateTime(_) => ScalarType::DateTime,
            Self::Uuid(_) => ScalarType::Uuid,
            Self::Opaque(_) => ScalarType::Opaque,
            Self::List(_) | Self::Null => return None,
        })
    }

    /// The variant name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self.scalar_ty() {
            Some(ty) => ty.name(),
            None if self.is_null() => "Null",
            None => "List",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_bool(self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(v),
            value => Err(crate::Error::type_conversion(value, "bool")),
        }
    }

    pub fn to_i64(self) -> Result<i64> {
        match self.convert(ScalarType::I64)? {
            Self::I64(v) => Ok(v),
            value => Err(crate::Error::type_conversion(value, "i64")),
        }
    }

    pub fn to_string(self) -> Result<String> {
        match self {
            Self::String(v) => Ok(v),
            value => Err(crate::Error::type_conversion(value, "String")),
        }
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl AsRef<Self> for Value {
    fn as_ref(&self) -> &Self {
        self
    }
}

macro_rules! impl_from {
    ( $( $variant:ident => $ty:ty ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(src: $ty) -> Self {
                    Self::$variant(src)
                }
            }
        )*
    };
}

impl_from! {
    Bool => bool,
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    F32 => f32,
    F64 => f64,
    String => String,
    Bytes => Vec<u8>,
    DateTime => NaiveDateTime,
    Uuid => Uuid,
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Self {
        Self::String(src.clone())
    }
}

impl<T> From<Option<T>> for Value
where
    Self: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::from(value),
            None => Self::Null,
        }
    }
}
