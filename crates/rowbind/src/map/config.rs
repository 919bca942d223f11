use indexmap::IndexMap;
use rowbind_core::{Entity, Value};
use std::sync::Arc;

/// A caller-supplied expression computing one target field from the whole
/// source object.
pub type OverrideFn = dyn Fn(&dyn Entity) -> Value + Send + Sync;

/// Explicit per-type-pair mapping configuration: computed bindings and
/// ignores, owned by the caller and handed to the engine before the pair's
/// plan is resolved.
///
/// A bound field is withdrawn from automatic name matching and always
/// receives the expression's value; an ignored field is withdrawn and left
/// at its default. Entries apply in insertion order.
#[derive(Default, Clone)]
pub struct MapConfig {
    pub(crate) bindings: IndexMap<String, Option<Arc<OverrideFn>>>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `target` to an expression of the typed source object.
    ///
    /// The expression sees the root source instance, never an intermediate
    /// of nested traversal.
    pub fn bind<S: Entity>(
        self,
        target: impl Into<String>,
        expr: impl Fn(&S) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.bind_with(target, move |source: &dyn Entity| {
            match source.as_any().downcast_ref::<S>() {
                Some(source) => expr(source),
                // config applied to a pair with a different source type
                None => Value::Null,
            }
        })
    }

    /// Binds `target` to an untyped expression of the source.
    pub fn bind_with(
        mut self,
        target: impl Into<String>,
        expr: impl Fn(&dyn Entity) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.bindings.insert(target.into(), Some(Arc::new(expr)));
        self
    }

    /// Excludes `target` from automatic resolution; it keeps its default.
    /// Replaces any earlier binding for the same field.
    pub fn ignore(mut self, target: impl Into<String>) -> Self {
        self.bindings.insert(target.into(), None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl core::fmt::Debug for MapConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (name, binding) in &self.bindings {
            map.entry(name, &binding.as_ref().map(|_| "bind").unwrap_or("ignore"));
        }
        map.finish()
    }
}
