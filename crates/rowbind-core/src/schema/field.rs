use super::TypeInfo;
use crate::value::ScalarType;

/// What a field holds: a scalar, a nested sub-object, or a sequence of
/// either. Nested shapes reference their descriptor table through a
/// function pointer so that mutually recursive types can be declared.
#[derive(Clone, Copy)]
pub enum FieldKind {
    Scalar(ScalarType),
    Struct(fn() -> &'static TypeInfo),
    ScalarList(ScalarType),
    StructList(fn() -> &'static TypeInfo),
}

impl FieldKind {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }
}

impl core::fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Scalar(ty) => write!(f, "Scalar({})", ty.name()),
            Self::Struct(info) => write!(f, "Struct({})", info().name),
            Self::ScalarList(ty) => write!(f, "ScalarList({})", ty.name()),
            Self::StructList(info) => write!(f, "StructList({})", info().name),
        }
    }
}

/// One field of a [`TypeInfo`]: name, shape, role flags, and parameter
/// metadata.
///
/// Roles: `input` restricts the field to parameter-input use (it never acts
/// as a structural mapping source), `output` restricts it to output use (it
/// never acts as a mapping target), `ignore` removes it from automatic
/// resolution entirely. `readable`/`writable` describe the backing
/// accessors; a role that contradicts them is a definition error at first
/// use.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    pub name: &'static str,
    pub kind: FieldKind,
    pub input: bool,
    pub output: bool,
    pub ignore: bool,
    pub readable: bool,
    pub writable: bool,
    pub nullable: bool,
    /// Maximum size for string/binary parameters; -1 = unbounded.
    pub size: i32,
    pub precision: u8,
    pub scale: u8,
    /// Vendor type name for opaque/UDT parameters.
    pub vendor_ty: Option<&'static str>,
}

impl FieldInfo {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            input: false,
            output: false,
            ignore: false,
            readable: true,
            writable: true,
            nullable: false,
            size: -1,
            precision: 0,
            scale: 0,
            vendor_ty: None,
        }
    }

    pub const fn scalar(name: &'static str, ty: ScalarType) -> Self {
        Self::new(name, FieldKind::Scalar(ty))
    }

    pub const fn nested(name: &'static str, info: fn() -> &'static TypeInfo) -> Self {
        Self::new(name, FieldKind::Struct(info))
    }

    pub const fn scalar_list(name: &'static str, ty: ScalarType) -> Self {
        Self::new(name, FieldKind::ScalarList(ty))
    }

    pub const fn struct_list(name: &'static str, info: fn() -> &'static TypeInfo) -> Self {
        Self::new(name, FieldKind::StructList(info))
    }

    /// Marks the field as participating only when the type acts as a
    /// parameter target (command input).
    pub const fn input(mut self) -> Self {
        self.input = true;
        self
    }

    /// Marks the field as populated by execution (command output); it never
    /// acts as a mapping target.
    pub const fn output(mut self) -> Self {
        self.output = true;
        self
    }

    /// Excludes the field from automatic resolution.
    pub const fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Declares a maximum size for string/binary values; longer input
    /// values are silently truncated when projected.
    pub const fn sized(mut self, size: i32) -> Self {
        self.size = size;
        self
    }

    pub const fn numeric(mut self, precision: u8, scale: u8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub const fn vendor(mut self, name: &'static str) -> Self {
        self.vendor_ty = Some(name);
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub const fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    /// The scalar type, when the field holds one.
    pub fn scalar_ty(&self) -> Option<ScalarType> {
        match self.kind {
            FieldKind::Scalar(ty) => Some(ty),
            _ => None,
        }
    }
}
