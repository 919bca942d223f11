#![allow(dead_code)]

use rowbind::driver::{Command, CommandKind, CommandSpec, ExecOutcome, ParamBinding, Row, RowSet};
use rowbind::schema::{FieldInfo, TypeInfo};
use rowbind::{Driver, Entity, Result, ScalarType, Value};
use std::any::Any;
use std::sync::Mutex;

// ---- object model -------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub city: String,
    pub zip: String,
}

static ADDRESS: TypeInfo = TypeInfo {
    name: "Address",
    fields: &[
        FieldInfo::scalar("City", ScalarType::String),
        FieldInfo::scalar("Zip", ScalarType::String),
    ],
};

fn address_info() -> &'static TypeInfo {
    &ADDRESS
}

impl Entity for Address {
    fn type_info() -> &'static TypeInfo {
        &ADDRESS
    }

    fn info(&self) -> &'static TypeInfo {
        &ADDRESS
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.city.clone().into(),
            1 => self.zip.clone().into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::String(v)) => self.city = v,
            (1, Value::String(v)) => self.zip = v,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Customer {
    pub name: String,
    pub address: Option<Box<Address>>,
}

static CUSTOMER: TypeInfo = TypeInfo {
    name: "Customer",
    fields: &[
        FieldInfo::scalar("Name", ScalarType::String),
        FieldInfo::nested("Address", address_info),
    ],
};

impl Entity for Customer {
    fn type_info() -> &'static TypeInfo {
        &CUSTOMER
    }

    fn info(&self) -> &'static TypeInfo {
        &CUSTOMER
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.name.clone().into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::String(v)) => self.name = v,
            (1, Value::Null) => self.address = None,
            _ => {}
        }
    }

    fn nested(&self, field: usize) -> Option<&dyn Entity> {
        match field {
            1 => self.address.as_deref().map(|a| a as &dyn Entity),
            _ => None,
        }
    }

    fn ensure_nested(&mut self, field: usize) -> Option<&mut dyn Entity> {
        match field {
            1 => Some(self.address.get_or_insert_with(Default::default).as_mut()),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CustomerDto {
    pub name: String,
    pub city: String,
    pub zip: String,
}

static CUSTOMER_DTO: TypeInfo = TypeInfo {
    name: "CustomerDto",
    fields: &[
        FieldInfo::scalar("Name", ScalarType::String),
        FieldInfo::scalar("City", ScalarType::String),
        FieldInfo::scalar("Zip", ScalarType::String),
    ],
};

impl Entity for CustomerDto {
    fn type_info() -> &'static TypeInfo {
        &CUSTOMER_DTO
    }

    fn info(&self) -> &'static TypeInfo {
        &CUSTOMER_DTO
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.name.clone().into(),
            1 => self.city.clone().into(),
            2 => self.zip.clone().into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::String(v)) => self.name = v,
            (1, Value::String(v)) => self.city = v,
            (2, Value::String(v)) => self.zip = v,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Order {
    pub id: i32,
    pub total: f64,
    pub qty: i16,
}

static ORDER: TypeInfo = TypeInfo {
    name: "Order",
    fields: &[
        FieldInfo::scalar("Id", ScalarType::I32),
        FieldInfo::scalar("Total", ScalarType::F64),
        FieldInfo::scalar("Qty", ScalarType::I16),
    ],
};

impl Entity for Order {
    fn type_info() -> &'static TypeInfo {
        &ORDER
    }

    fn info(&self) -> &'static TypeInfo {
        &ORDER
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.id.into(),
            1 => self.total.into(),
            2 => self.qty.into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::I32(v)) => self.id = v,
            (1, Value::F64(v)) => self.total = v,
            (2, Value::I16(v)) => self.qty = v,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OrderDto {
    pub id: i32,
    pub total: f64,
    pub qty: i64,
}

static ORDER_DTO: TypeInfo = TypeInfo {
    name: "OrderDto",
    fields: &[
        FieldInfo::scalar("Id", ScalarType::I32),
        FieldInfo::scalar("Total", ScalarType::F64),
        FieldInfo::scalar("Qty", ScalarType::I64),
    ],
};

impl Entity for OrderDto {
    fn type_info() -> &'static TypeInfo {
        &ORDER_DTO
    }

    fn info(&self) -> &'static TypeInfo {
        &ORDER_DTO
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.id.into(),
            1 => self.total.into(),
            2 => self.qty.into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::I32(v)) => self.id = v,
            (1, Value::F64(v)) => self.total = v,
            (2, Value::I64(v)) => self.qty = v,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Member {
    pub name: String,
}

static MEMBER: TypeInfo = TypeInfo {
    name: "Member",
    fields: &[FieldInfo::scalar("Name", ScalarType::String)],
};

fn member_info() -> &'static TypeInfo {
    &MEMBER
}

impl Entity for Member {
    fn type_info() -> &'static TypeInfo {
        &MEMBER
    }

    fn info(&self) -> &'static TypeInfo {
        &MEMBER
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.name.clone().into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        if let (0, Value::String(v)) = (field, value) {
            self.name = v;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Team {
    pub name: String,
    pub tags: Option<Vec<i32>>,
    pub members: Option<Vec<Option<Member>>>,
}

static TEAM: TypeInfo = TypeInfo {
    name: "Team",
    fields: &[
        FieldInfo::scalar("Name", ScalarType::String),
        FieldInfo::scalar_list("Tags", ScalarType::I32),
        FieldInfo::struct_list("Members", member_info),
    ],
};

impl Entity for Team {
    fn type_info() -> &'static TypeInfo {
        &TEAM
    }

    fn info(&self) -> &'static TypeInfo {
        &TEAM
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.name.clone().into(),
            1 => match &self.tags {
                Some(tags) => Value::List(tags.iter().map(|v| Value::from(*v)).collect()),
                None => Value::Null,
            },
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::String(v)) => self.name = v,
            (1, Value::List(values)) => {
                self.tags = Some(
                    values
                        .into_iter()
                        .filter_map(|v| match v {
                            Value::I32(v) => Some(v),
                            _ => None,
                        })
                        .collect(),
                );
            }
            (1, Value::Null) => self.tags = None,
            (2, Value::Null) => self.members = None,
            _ => {}
        }
    }

    fn element_count(&self, field: usize) -> Option<usize> {
        match field {
            2 => self.members.as_ref().map(Vec::len),
            _ => None,
        }
    }

    fn element(&self, field: usize, at: usize) -> Option<&dyn Entity> {
        match field {
            2 => self
                .members
                .as_ref()?
                .get(at)?
                .as_ref()
                .map(|m| m as &dyn Entity),
            _ => None,
        }
    }

    fn create_elements(&mut self, field: usize, len: usize) {
        if field == 2 {
            self.members = Some(vec![None; len]);
        }
    }

    fn ensure_element(&mut self, field: usize, at: usize) -> Option<&mut dyn Entity> {
        match field {
            2 => {
                let slot = self.members.as_mut()?.get_mut(at)?;
                Some(slot.get_or_insert_with(Default::default) as &mut dyn Entity)
            }
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TeamDto {
    pub name: String,
    pub tags: Option<Vec<i64>>,
    pub members: Option<Vec<Option<Member>>>,
}

static TEAM_DTO: TypeInfo = TypeInfo {
    name: "TeamDto",
    fields: &[
        FieldInfo::scalar("Name", ScalarType::String),
        FieldInfo::scalar_list("Tags", ScalarType::I64),
        FieldInfo::struct_list("Members", member_info),
    ],
};

impl Entity for TeamDto {
    fn type_info() -> &'static TypeInfo {
        &TEAM_DTO
    }

    fn info(&self) -> &'static TypeInfo {
        &TEAM_DTO
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.name.clone().into(),
            1 => match &self.tags {
                Some(tags) => Value::List(tags.iter().map(|v| Value::from(*v)).collect()),
                None => Value::Null,
            },
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::String(v)) => self.name = v,
            (1, Value::List(values)) => {
                self.tags = Some(
                    values
                        .into_iter()
                        .filter_map(|v| match v {
                            Value::I64(v) => Some(v),
                            _ => None,
                        })
                        .collect(),
                );
            }
            (1, Value::Null) => self.tags = None,
            (2, Value::Null) => self.members = None,
            _ => {}
        }
    }

    fn element_count(&self, field: usize) -> Option<usize> {
        match field {
            2 => self.members.as_ref().map(Vec::len),
            _ => None,
        }
    }

    fn element(&self, field: usize, at: usize) -> Option<&dyn Entity> {
        match field {
            2 => self
                .members
                .as_ref()?
                .get(at)?
                .as_ref()
                .map(|m| m as &dyn Entity),
            _ => None,
        }
    }

    fn create_elements(&mut self, field: usize, len: usize) {
        if field == 2 {
            self.members = Some(vec![None; len]);
        }
    }

    fn ensure_element(&mut self, field: usize, at: usize) -> Option<&mut dyn Entity> {
        match field {
            2 => {
                let slot = self.members.as_mut()?.get_mut(at)?;
                Some(slot.get_or_insert_with(Default::default) as &mut dyn Entity)
            }
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: Option<i32>,
}

static PERSON: TypeInfo = TypeInfo {
    name: "Person",
    fields: &[
        FieldInfo::scalar("Name", ScalarType::String),
        FieldInfo::scalar("Age", ScalarType::I32).nullable(),
    ],
};

impl Entity for Person {
    fn type_info() -> &'static TypeInfo {
        &PERSON
    }

    fn info(&self) -> &'static TypeInfo {
        &PERSON
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.name.clone().into(),
            1 => self.age.into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::String(v)) => self.name = v,
            (1, Value::I32(v)) => self.age = Some(v),
            (1, Value::Null) => self.age = None,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---- commands -----------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SaveOrder {
    pub id: i32,
    pub total: f64,
    pub note: String,
}

static SAVE_ORDER: TypeInfo = TypeInfo {
    name: "SaveOrder",
    fields: &[
        FieldInfo::scalar("Id", ScalarType::I32).output(),
        FieldInfo::scalar("Total", ScalarType::F64),
        FieldInfo::scalar("Note", ScalarType::String).sized(5).nullable(),
    ],
};

impl Entity for SaveOrder {
    fn type_info() -> &'static TypeInfo {
        &SAVE_ORDER
    }

    fn info(&self) -> &'static TypeInfo {
        &SAVE_ORDER
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.id.into(),
            1 => self.total.into(),
            2 => self.note.clone().into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::I32(v)) => self.id = v,
            (1, Value::F64(v)) => self.total = v,
            (2, Value::String(v)) => self.note = v,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Command for SaveOrder {
    fn script(&self) -> String {
        "insert into orders(total, note) values(@Total, @Note); set @Id = scope_identity()"
            .to_string()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InsertNode {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub label: String,
}

static INSERT_NODE: TypeInfo = TypeInfo {
    name: "InsertNode",
    fields: &[
        FieldInfo::scalar("Id", ScalarType::I32).output(),
        FieldInfo::scalar("ParentId", ScalarType::I32).nullable(),
        FieldInfo::scalar("Label", ScalarType::String),
    ],
};

impl Entity for InsertNode {
    fn type_info() -> &'static TypeInfo {
        &INSERT_NODE
    }

    fn info(&self) -> &'static TypeInfo {
        &INSERT_NODE
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.id.into(),
            1 => self.parent_id.into(),
            2 => self.label.clone().into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::I32(v)) => self.id = v,
            (1, Value::I32(v)) => self.parent_id = Some(v),
            (1, Value::Null) => self.parent_id = None,
            (2, Value::String(v)) => self.label = v,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Command for InsertNode {
    fn script(&self) -> String {
        "insert into nodes(parent_id, label) values(@ParentId, @Label); set @Id = scope_identity()"
            .to_string()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Node {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub label: String,
}

static NODE: TypeInfo = TypeInfo {
    name: "Node",
    fields: &[
        FieldInfo::scalar("Id", ScalarType::I32),
        FieldInfo::scalar("ParentId", ScalarType::I32).nullable(),
        FieldInfo::scalar("Label", ScalarType::String),
    ],
};

impl Entity for Node {
    fn type_info() -> &'static TypeInfo {
        &NODE
    }

    fn info(&self) -> &'static TypeInfo {
        &NODE
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.id.into(),
            1 => self.parent_id.into(),
            2 => self.label.clone().into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        match (field, value) {
            (0, Value::I32(v)) => self.id = v,
            (1, Value::I32(v)) => self.parent_id = Some(v),
            (1, Value::Null) => self.parent_id = None,
            (2, Value::String(v)) => self.label = v,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A command whose only parameter is non-nullable but may hold no value,
/// for exercising composition failures.
#[derive(Debug, Default, Clone)]
pub struct NullTotal {
    pub total: Value,
}

static NULL_TOTAL: TypeInfo = TypeInfo {
    name: "NullTotal",
    fields: &[FieldInfo::scalar("Total", ScalarType::F64)],
};

impl Entity for NullTotal {
    fn type_info() -> &'static TypeInfo {
        &NULL_TOTAL
    }

    fn info(&self) -> &'static TypeInfo {
        &NULL_TOTAL
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.total.clone(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        if field == 0 {
            self.total = value;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Command for NullTotal {
    fn script(&self) -> String {
        "update totals set total = @Total".to_string()
    }
}

/// Same shape as [`NullTotal`] with a string parameter, which must not be
/// implicitly nullable.
#[derive(Debug, Default, Clone)]
pub struct NullNote {
    pub note: Value,
}

static NULL_NOTE: TypeInfo = TypeInfo {
    name: "NullNote",
    fields: &[FieldInfo::scalar("Note", ScalarType::String).sized(40)],
};

impl Entity for NullNote {
    fn type_info() -> &'static TypeInfo {
        &NULL_NOTE
    }

    fn info(&self) -> &'static TypeInfo {
        &NULL_NOTE
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.note.clone(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        if field == 0 {
            self.note = value;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Command for NullNote {
    fn script(&self) -> String {
        "update notes set note = @Note".to_string()
    }
}

/// A command deployed outside the default schema.
#[derive(Debug, Default, Clone)]
pub struct PurgeOld {
    pub days: i32,
}

static PURGE_OLD: TypeInfo = TypeInfo {
    name: "PurgeOld",
    fields: &[FieldInfo::scalar("Days", ScalarType::I32)],
};

impl Entity for PurgeOld {
    fn type_info() -> &'static TypeInfo {
        &PURGE_OLD
    }

    fn info(&self) -> &'static TypeInfo {
        &PURGE_OLD
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => Value::I32(self.days),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) {
        if field == 0 {
            if let Ok(days) = value.to_i64() {
                self.days = days as i32;
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Command for PurgeOld {
    fn script(&self) -> String {
        "delete from audit.log where created < dateadd(day, -@Days, getdate())".to_string()
    }

    fn namespace(&self) -> &str {
        "audit"
    }
}

// ---- fake driver --------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ExecutedSpec {
    pub name: String,
    pub text: String,
    pub kind: CommandKind,
    pub params: Vec<ParamBinding>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeRow {
    columns: Vec<(String, ScalarType, Value)>,
}

impl FakeRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn col(mut self, name: &str, ty: ScalarType, value: impl Into<Value>) -> Self {
        self.columns.push((name.to_string(), ty, value.into()));
        self
    }
}

impl Row for FakeRow {
    fn len(&self) -> usize {
        self.columns.len()
    }

    fn name(&self, index: usize) -> &str {
        &self.columns[index].0
    }

    fn column_ty(&self, index: usize) -> ScalarType {
        self.columns[index].1
    }

    fn is_null(&self, index: usize) -> bool {
        self.columns[index].2.is_null()
    }

    fn value(&self, index: usize) -> Value {
        self.columns[index].2.clone()
    }
}

/// An in-memory driver: canned results, recorded executions.
#[derive(Debug, Default)]
pub struct FakeDriver {
    pub outcome: Mutex<Option<ExecOutcome>>,
    pub result_sets: Mutex<Vec<Vec<FakeRow>>>,
    pub executed: Mutex<Vec<ExecutedSpec>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(outcome: ExecOutcome) -> Self {
        let driver = Self::default();
        *driver.outcome.lock().unwrap() = Some(outcome);
        driver
    }

    pub fn with_rows(result_sets: Vec<Vec<FakeRow>>) -> Self {
        let driver = Self::default();
        *driver.result_sets.lock().unwrap() = result_sets;
        driver
    }

    pub fn last_executed(&self) -> ExecutedSpec {
        self.executed.lock().unwrap().last().cloned().expect("nothing executed")
    }

    fn record(&self, spec: &CommandSpec) {
        self.executed.lock().unwrap().push(ExecutedSpec {
            name: spec.name.clone(),
            text: spec.text.clone(),
            kind: spec.kind,
            params: spec.params.clone(),
        });
    }
}

impl Driver for FakeDriver {
    fn execute(&self, spec: &CommandSpec) -> Result<ExecOutcome> {
        self.record(spec);
        Ok(self.outcome.lock().unwrap().take().unwrap_or_default())
    }

    fn execute_scalar(&self, spec: &CommandSpec) -> Result<Value> {
        self.record(spec);
        let sets = self.result_sets.lock().unwrap();
        Ok(sets
            .first()
            .and_then(|rows| rows.first())
            .map(|row| row.value(0))
            .unwrap_or(Value::Null))
    }

    fn execute_rows<'a>(&'a self, spec: &CommandSpec) -> Result<Box<dyn RowSet + 'a>> {
        self.record(spec);
        let sets = self.result_sets.lock().unwrap().clone();
        Ok(Box::new(FakeRowSet {
            sets,
            set: 0,
            row: None,
        }))
    }
}

struct FakeRowSet {
    sets: Vec<Vec<FakeRow>>,
    set: usize,
    row: Option<usize>,
}

impl RowSet for FakeRowSet {
    fn next_row(&mut self) -> Result<bool> {
        let next = self.row.map_or(0, |row| row + 1);
        let len = self.sets.get(self.set).map_or(0, Vec::len);
        if next < len {
            self.row = Some(next);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn row(&self) -> &dyn Row {
        &self.sets[self.set][self.row.expect("next_row not called")]
    }

    fn next_result(&mut self) -> Result<bool> {
        if self.set + 1 < self.sets.len() {
            self.set += 1;
            self.row = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
