//! Dynamic row type

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::Value;
use crate::error::FieldError;

/// Read access to the named columns of a row.
///
/// The in-memory endpoint sorts and filters any row type implementing this
/// trait. A missing field behaves like [`Value::Null`].
pub trait Fields {
    /// Returns the value stored under `name`, if the row has that column.
    fn field(&self, name: &str) -> Option<Value>;
}

/// A dynamic row: an ordered map from column name to [`Value`].
///
/// Serializes as a flat JSON object, so pages of records travel over the wire
/// as `[{"id": 55, "name": "User0055"}]`.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Record;
///
/// let row = Record::new()
///     .set("id", 55)
///     .set("name", "User0055");
///
/// assert_eq!(row.get_string("name").unwrap(), Some("User0055"));
/// assert_eq!(row.get_int("id").unwrap(), Some(55));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    // Missing field is an error, an explicit null is `Ok(None)`.

    /// Gets a string field value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::Missing(field.to_string())),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(wrong_kind(field, "string", other)),
        }
    }

    /// Gets an integer field value.
    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::Missing(field.to_string())),
            Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(wrong_kind(field, "int", other)),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::Missing(field.to_string())),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(wrong_kind(field, "bool", other)),
        }
    }
}

fn wrong_kind(field: &str, expected: &'static str, actual: &Value) -> FieldError {
    FieldError::WrongKind {
        field: field.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

impl Fields for Record {
    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}
