mod field;
pub use field::{FieldInfo, FieldKind};

mod introspect;
pub use introspect::{source_fields, target_fields, validate};

mod param;
pub use param::{param_specs, ParamDirection, ParamSpec};

/// The declared shape of a mappable type: an ordered field descriptor table.
///
/// Descriptors are declared explicitly as static data, once per type; field
/// roles and metadata live on the descriptors rather than on language-level
/// annotations. A `TypeInfo` is identified by its address, which is what the
/// plan caches key on.
#[derive(Debug)]
pub struct TypeInfo {
    /// The type name, used for diagnostics and command naming.
    pub name: &'static str,

    /// Ordered field descriptors. Field indices used throughout the engine
    /// are indices into this slice.
    pub fields: &'static [FieldInfo],
}

/// Identity of a `TypeInfo`, by address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey(usize);

impl TypeInfo {
    /// Looks a field up by name.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldInfo)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    pub fn key(&'static self) -> TypeKey {
        TypeKey(self as *const TypeInfo as usize)
    }

    /// True when both descriptors are the same static table.
    pub fn same(a: &'static TypeInfo, b: &'static TypeInfo) -> bool {
        std::ptr::eq(a, b)
    }
}

impl TypeKey {
    pub(crate) fn as_u64(self) -> u64 {
        self.0 as u64
    }
}
