//! The shared plan cache and the public mapping entry points.
//!
//! Every cache below is lazily populated, keyed by descriptor identity,
//! and never evicted: the key space is bounded by the distinct types and
//! commands in the program. Plans are built into a local value and
//! published whole; racing first users may build twice and discard the
//! loser, but all callers observe a single plan afterwards. Construction
//! failures are returned, never cached, so the next call re-attempts.

use crate::map::{self, MapConfig, MapPlan};
use crate::params::ParamSet;
use crate::record::{self, RecordPlan};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rowbind_core::driver::{CommandId, ParamBinding, Row};
use rowbind_core::schema::{TypeInfo, TypeKey};
use rowbind_core::{Entity, Error, Result};
use std::sync::Arc;

/// Upper bound on result-set positions tracked per command.
pub const MAX_RESULT_SETS: usize = 10;

type PairKey = (TypeKey, TypeKey);

/// The mapping engine: resolves, caches, and executes plans.
///
/// Cheap to share behind an [`Arc`]; all methods take `&self` and are safe
/// to call concurrently.
#[derive(Debug, Default)]
pub struct Engine {
    map_plans: DashMap<PairKey, Arc<MapPlan>>,
    configs: DashMap<PairKey, MapConfig>,
    params: DashMap<TypeKey, Arc<ParamSet>>,
    records: DashMap<(CommandId, usize), Arc<RecordPlan>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers explicit bindings and ignores for one (source, target)
    /// pair and drops any plan already resolved for it.
    pub fn configure(
        &self,
        source: &'static TypeInfo,
        target: &'static TypeInfo,
        config: MapConfig,
    ) {
        let key = (source.key(), target.key());
        self.configs.insert(key, config);
        self.map_plans.remove(&key);
    }

    /// Drops the resolved plan for a pair, keeping its configuration. The
    /// next map call re-plans.
    pub fn invalidate(&self, source: &'static TypeInfo, target: &'static TypeInfo) {
        self.map_plans.remove(&(source.key(), target.key()));
    }

    /// Drops both the configuration and the resolved plan for a pair.
    pub fn reset(&self, source: &'static TypeInfo, target: &'static TypeInfo) {
        let key = (source.key(), target.key());
        self.configs.remove(&key);
        self.map_plans.remove(&key);
    }

    /// Applies the structural plan for the pair, populating `target` from
    /// `source`.
    pub fn map<S: Entity, T: Entity>(&self, source: &S, target: &mut T) -> Result<()> {
        self.map_dyn(source, target)
    }

    /// [`Engine::map`] through trait objects.
    pub fn map_dyn(&self, source: &dyn Entity, target: &mut dyn Entity) -> Result<()> {
        let plan = self.map_plan(source.info(), target.info())?;
        map::exec(&plan, source, target, &|s, t| self.map_plan(s, t))
    }

    /// Maps into a freshly defaulted target.
    pub fn map_new<T: Entity + Default>(&self, source: &dyn Entity) -> Result<T> {
        let mut target = T::default();
        self.map_dyn(source, &mut target)?;
        Ok(target)
    }

    /// Resolves (or reuses) the structural plan for a pair.
    pub fn map_plan(
        &self,
        source: &'static TypeInfo,
        target: &'static TypeInfo,
    ) -> Result<Arc<MapPlan>> {
        let key = (source.key(), target.key());
        if let Some(plan) = self.map_plans.get(&key) {
            return Ok(Arc::clone(&plan));
        }

        let config = self.configs.get(&key);
        let plan = map::build(source, target, config.as_deref())?;
        drop(config);

        tracing::debug!(
            source = source.name,
            target = target.name,
            entries = plan.addressed_targets().len(),
            "resolved structural plan"
        );

        let plan = self
            .map_plans
            .entry(key)
            .or_insert_with(|| Arc::new(plan));
        Ok(Arc::clone(&plan))
    }

    /// Resolves (or reuses) the parameter descriptors for a command type.
    pub fn param_set(&self, info: &'static TypeInfo) -> Result<Arc<ParamSet>> {
        if let Some(set) = self.params.get(&info.key()) {
            return Ok(Arc::clone(&set));
        }
        let set = ParamSet::build(info)?;
        tracing::debug!(command = info.name, params = set.len(), "built parameter set");
        let set = self
            .params
            .entry(info.key())
            .or_insert_with(|| Arc::new(set));
        Ok(Arc::clone(&set))
    }

    /// Projects a command-shaped object into ordered driver bindings.
    pub fn project(&self, source: &dyn Entity) -> Result<Vec<ParamBinding>> {
        Ok(self.param_set(source.info())?.project(source))
    }

    /// Copies captured output values back onto a command-shaped object.
    pub fn apply_outputs(
        &self,
        target: &mut dyn Entity,
        outputs: &[(String, rowbind_core::Value)],
    ) -> Result<()> {
        self.param_set(target.info())?.apply_outputs(target, outputs)
    }

    /// Resolves the columnar plan for one (command, result-set) position,
    /// freezing it from `row` when the position is new.
    ///
    /// Construction is serialized per key so racing first rows cannot
    /// publish divergent plans; later rows take the read path.
    pub fn record_plan(
        &self,
        id: CommandId,
        result_index: usize,
        row: &dyn Row,
        target: &'static TypeInfo,
    ) -> Result<Arc<RecordPlan>> {
        if result_index >= MAX_RESULT_SETS {
            return Err(Error::invalid_result(format!(
                "result set {result_index} exceeds the supported maximum of {MAX_RESULT_SETS}"
            )));
        }
        match self.records.entry((id, result_index)) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let plan = record::build(row, target)?;
                tracing::debug!(
                    target_ty = target.name,
                    result_index,
                    columns = plan.len(),
                    "froze columnar plan"
                );
                Ok(Arc::clone(&entry.insert(Arc::new(plan))))
            }
        }
    }

    /// Materializes one row into `target` under the frozen plan for the
    /// (command, result-set) position.
    pub fn materialize_into(
        &self,
        id: CommandId,
        result_index: usize,
        row: &dyn Row,
        target: &mut dyn Entity,
    ) -> Result<()> {
        let plan = self.record_plan(id, result_index, row, target.info())?;
        plan.materialize_into(row, target)
    }

    /// Materializes one row into a freshly defaulted target.
    pub fn materialize<T: Entity + Default>(
        &self,
        id: CommandId,
        result_index: usize,
        row: &dyn Row,
    ) -> Result<T> {
        let mut target = T::default();
        self.materialize_into(id, result_index, row, &mut target)?;
        Ok(target)
    }
}
