use crate::{entity::Entity, schema::ParamSpec, value::Value};
use std::{
    hash::{Hash, Hasher},
    time::Duration,
};

/// How the driver should interpret the command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Free-form text executed as-is.
    Text,

    /// The name of a stored procedure.
    Procedure,
}

/// Identity of a command for plan caching.
///
/// Named commands are identified by their descriptor table; free-text
/// scripts by a hash of their text, so an edited script re-plans
/// automatically. Row-materialization plans are keyed by this identity
/// plus the result-set position, because the column layout of a script is
/// only knowable from its first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(u64);

impl CommandId {
    pub fn of_type(info: &'static crate::schema::TypeInfo) -> Self {
        Self(info.key().as_u64())
    }

    pub fn of_script(text: &str) -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// One projected parameter, ready for driver binding.
#[derive(Debug, Clone)]
pub struct ParamBinding {
    pub spec: ParamSpec,
    /// The bound value; `Value::Null` for output-only placeholders.
    pub value: Value,
}

/// A fully projected execution unit handed to the driver.
#[derive(Debug)]
pub struct CommandSpec {
    /// Display name, for diagnostics.
    pub name: String,
    pub text: String,
    pub kind: CommandKind,
    pub timeout: Duration,
    pub params: Vec<ParamBinding>,
}

/// A command-shaped type: an [`Entity`] whose scalar fields are the
/// command's parameters and which knows its own body.
pub trait Command: Entity {
    /// The command body: the script to run as text, or the procedure body
    /// used by deployment tooling when executing by name.
    fn script(&self) -> String;

    /// Identity used for materialization plan caching.
    fn identity(&self) -> CommandId {
        CommandId::of_type(self.info())
    }

    /// Schema namespace the command is deployed under, used when executing
    /// by qualified name.
    fn namespace(&self) -> &str {
        "dbo"
    }

    /// Whether the command must execute as free text regardless of the
    /// session's execution mode.
    fn text_only(&self) -> bool {
        false
    }

    /// Ad-hoc input bindings appended after the projected descriptors.
    /// Declared commands have none; free-text scripts carry their
    /// parameters here.
    fn extra_params(&self) -> Vec<ParamBinding> {
        Vec::new()
    }
}
