//! Multi-command composition: N projected invocations merged into one
//! executable script with output capture and cross-item parameter links.

mod script;

use crate::engine::Engine;
use crate::params::ParamSet;
use rowbind_core::driver::Command;
use rowbind_core::schema::ParamSpec;
use rowbind_core::{Entity, Error, Result, Value};
use std::sync::Arc;

/// An ordered set of command invocations composed into one script.
///
/// Items execute in add order within a single driver round trip. Output
/// parameter values are captured per (item index, parameter name) and
/// redistributed after execution: first onto each item's command, then,
/// for items bound to a backing model, onto the model through the
/// structural mapper.
pub struct Batch<'a> {
    engine: &'a Engine,
    items: Vec<BatchItem<'a>>,
}

struct BatchItem<'a> {
    command: Box<dyn Command>,
    model: Option<&'a mut dyn Entity>,
    set: Arc<ParamSet>,
    /// Per parameter: the (item, parameter) whose declared variable stands
    /// in for this parameter's literal value.
    links: Vec<Option<(usize, usize)>>,
}

impl<'a> Batch<'a> {
    pub fn new(engine: &'a Engine) -> Self {
        Self {
            engine,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a command invocation, returning its item index.
    pub fn add<C: Command>(&mut self, command: C) -> Result<usize> {
        self.push(Box::new(command), None)
    }

    /// Appends a command invocation backed by a model. The model's fields
    /// are mapped onto the command now; captured outputs flow back onto
    /// the model after execution.
    pub fn add_with_model<C: Command>(
        &mut self,
        mut command: C,
        model: &'a mut dyn Entity,
    ) -> Result<usize> {
        self.engine.map_dyn(&*model, &mut command)?;
        self.push(Box::new(command), Some(model))
    }

    fn push(&mut self, command: Box<dyn Command>, model: Option<&'a mut dyn Entity>) -> Result<usize> {
        let set = self.engine.param_set(command.info())?;
        let links = vec![None; set.len()];
        let index = self.items.len();
        self.items.push(BatchItem {
            command,
            model,
            set,
            links,
        });
        Ok(index)
    }

    /// Sources `target_param` of item `target` from the declared output
    /// variable of `source_param` of item `source`, instead of a literal.
    ///
    /// The producer must precede the consumer: its assignment has to be in
    /// effect when the consumer's statement runs.
    pub fn link(
        &mut self,
        source: usize,
        source_param: &str,
        target: usize,
        target_param: &str,
    ) -> Result<()> {
        if source >= target {
            return Err(Error::definition(format!(
                "linked item {source} must precede its consumer {target}"
            )));
        }
        let source_param = self.output_param(source, source_param)?;
        let item = self
            .items
            .get(target)
            .ok_or_else(|| Error::definition(format!("batch has no item {target}")))?;
        let (index, spec) = find_param(&item.set, target_param)
            .ok_or_else(|| param_error(target, target_param))?;
        if !spec.direction.is_input() {
            return Err(Error::definition(format!(
                "parameter `{target_param}` of item {target} is not an input parameter"
            )));
        }
        self.items[target].links[index] = Some((source, source_param));
        Ok(())
    }

    fn output_param(&self, item: usize, name: &str) -> Result<usize> {
        let set = &self
            .items
            .get(item)
            .ok_or_else(|| Error::definition(format!("batch has no item {item}")))?
            .set;
        let (index, spec) = find_param(set, name).ok_or_else(|| param_error(item, name))?;
        if !spec.direction.is_output() {
            return Err(Error::definition(format!(
                "parameter `{name}` of item {item} is not an output parameter"
            )));
        }
        Ok(index)
    }

    /// Renders the whole batch as one script: declarations and an EXEC
    /// statement per item, plus the capture header and footer when any
    /// item declares outputs.
    pub fn compose(&self) -> Result<String> {
        script::compose(&self.items)
    }

    /// Applies captured `(item index, parameter name, value)` triples back
    /// onto the originating commands, then reflects each backed item's
    /// command onto its model.
    pub fn distribute(&mut self, captures: &[(usize, String, Value)]) -> Result<()> {
        for (item_index, name, value) in captures {
            let item = self.items.get_mut(*item_index).ok_or_else(|| {
                Error::invalid_result(format!("capture row names unknown batch item {item_index}"))
            })?;
            let Some((_, spec)) = find_param(&item.set, name).filter(|(_, spec)| spec.direction.is_output())
            else {
                return Err(Error::invalid_result(format!(
                    "capture row names unknown output parameter `{name}` of item {item_index}"
                )));
            };
            let value = match value {
                Value::Null => Value::Null,
                value if value.scalar_ty() == Some(spec.ty) => value.clone(),
                value => value.clone().convert(spec.ty)?,
            };
            item.command.set(spec.field, value);
        }

        for item in &mut self.items {
            if let Some(model) = &mut item.model {
                self.engine.map_dyn(&*item.command, &mut **model)?;
            }
        }
        Ok(())
    }
}

fn find_param<'s>(set: &'s ParamSet, name: &str) -> Option<(usize, &'s ParamSpec)> {
    set.specs()
        .iter()
        .enumerate()
        .find(|(_, spec)| spec.name == name)
}

fn param_error(item: usize, name: &str) -> Error {
    Error::definition(format!("item {item} has no parameter `{name}`"))
}

impl core::fmt::Debug for Batch<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Batch")
            .field("items", &self.items.len())
            .finish()
    }
}
