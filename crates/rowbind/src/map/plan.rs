use super::config::OverrideFn;
use rowbind_core::{schema::TypeInfo, ScalarType};
use std::sync::Arc;

/// An immutable structural mapping plan for one (source, target) pair.
///
/// Built once, published through the plan cache, and never mutated
/// afterwards; execution is a read-only walk.
pub struct MapPlan {
    pub(crate) source: &'static TypeInfo,
    pub(crate) target: &'static TypeInfo,
    pub(crate) entries: Vec<FieldMapping>,
}

/// One correspondence instruction.
///
/// `source` indices refer to the entity the entry executes against (the
/// root source, or the sub-object of the enclosing `Nested` group);
/// `target` indices always refer to the root target.
pub(crate) enum FieldMapping {
    /// Scalar copy, converting when the declared types differ. A null
    /// source value is skipped when the target cannot hold one.
    Direct {
        source: usize,
        target: usize,
        convert: Option<ScalarType>,
        skip_null: bool,
    },

    /// Caller-supplied expression of the root source, bound to one target
    /// field.
    Override {
        target: usize,
        expr: Arc<OverrideFn>,
        convert: Option<ScalarType>,
    },

    /// Structural descent: children execute against the sub-object when it
    /// is present (unconditionally for fields that cannot be absent).
    Nested {
        source: usize,
        children: Vec<FieldMapping>,
    },

    /// Same-type sub-object copy. The target sub-object is allocated only
    /// when the source side is present and the slot is empty; the
    /// sub-plan resolves lazily through the cache, which also makes
    /// cyclic types terminate.
    NestedStruct { source: usize, target: usize },

    /// Elementwise scalar sequence copy. A null source list yields a null
    /// target list.
    ScalarList {
        source: usize,
        target: usize,
        convert: Option<ScalarType>,
    },

    /// Elementwise structural sequence copy; null elements stay null.
    StructList { source: usize, target: usize },
}

impl MapPlan {
    pub fn source(&self) -> &'static TypeInfo {
        self.source
    }

    pub fn target(&self) -> &'static TypeInfo {
        self.target
    }

    /// Target field indices addressed by the plan, in execution order.
    /// Each index appears at most once.
    pub fn addressed_targets(&self) -> Vec<usize> {
        fn walk(entries: &[FieldMapping], out: &mut Vec<usize>) {
            for entry in entries {
                match entry {
                    FieldMapping::Direct { target, .. }
                    | FieldMapping::Override { target, .. }
                    | FieldMapping::NestedStruct { target, .. }
                    | FieldMapping::ScalarList { target, .. }
                    | FieldMapping::StructList { target, .. } => out.push(*target),
                    FieldMapping::Nested { children, .. } => walk(children, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.entries, &mut out);
        out
    }
}

impl core::fmt::Debug for MapPlan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MapPlan")
            .field("source", &self.source.name)
            .field("target", &self.target.name)
            .field("entries", &self.entries.len())
            .finish()
    }
}
