use std::sync::Arc;

use crate::types::{DataType, Value};

/// Column of scalar values with a declared type.
///
/// Values are shared behind an `Arc`, so renaming or re-attaching the column never copies them.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueColumn {
    name: String,
    values: Arc<[Value]>,
    data_type: DataType,
    default_value: Option<Value>,
}

impl ValueColumn {
    /// Assemble a column without validating `values` against `data_type`.
    ///
    /// Callers go through [`crate::column::Column::create_value_column`] unless the type has
    /// already been checked.
    pub(crate) fn from_parts(
        name: impl Into<String>,
        values: Arc<[Value]>,
        data_type: DataType,
        default_value: Option<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            values,
            data_type,
            default_value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value at `index`, falling back to the default value (or `Null`) when out of range.
    pub fn get_or_default(&self, index: usize) -> Value {
        match self.values.get(index) {
            Some(v) => v.clone(),
            None => self.default_value.clone().unwrap_or(Value::Null),
        }
    }

    /// Derived from the values on every call.
    pub fn has_nulls(&self) -> bool {
        self.values.iter().any(Value::is_null)
    }

    pub fn rename(&self, new_name: impl Into<String>) -> Self {
        Self {
            name: new_name.into(),
            values: Arc::clone(&self.values),
            data_type: self.data_type,
            default_value: self.default_value.clone(),
        }
    }

    pub(crate) fn with_values(&self, values: Vec<Value>) -> Self {
        // Selecting rows can drop every null, but never introduces one.
        Self {
            name: self.name.clone(),
            values: values.into(),
            data_type: self.data_type,
            default_value: self.default_value.clone(),
        }
    }

    pub(crate) fn shares_values_with(&self, other: &ValueColumn) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}
