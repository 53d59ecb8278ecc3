//! Core value and type descriptors.
//!
//! Every cell of a [`crate::frame::DataFrame`] is a [`Value`]. Columns carry a declared
//! [`DataType`]: a [`BaseType`] tag from a small closed set plus a nullability flag. The column
//! kind ([`ColumnKind`]) is derived structurally from the base type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::DataFrame;

/// The three column kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Scalar values.
    Value,
    /// One nested record per row, backed by an embedded table.
    Group,
    /// One independent embedded table per row.
    Frame,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnKind::Value => "value",
            ColumnKind::Group => "group",
            ColumnKind::Frame => "frame",
        };
        f.write_str(s)
    }
}

/// Non-null type tag of a column or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    /// Bottom type: no non-null element has been observed.
    Nothing,
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Common supertype of all numeric tags.
    Number,
    /// UTF-8 string.
    Utf8,
    /// Nested record (one row of a column group).
    Row,
    /// Nested table (one cell of a frame column).
    Frame,
    /// Top type.
    Any,
}

impl BaseType {
    /// Column kind implied by this tag.
    pub fn kind(self) -> ColumnKind {
        match self {
            BaseType::Row => ColumnKind::Group,
            BaseType::Frame => ColumnKind::Frame,
            _ => ColumnKind::Value,
        }
    }

    /// Returns `true` for `Int32`, `Int64`, `Float64` and `Number`.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            BaseType::Int32 | BaseType::Int64 | BaseType::Float64 | BaseType::Number
        )
    }

    /// Returns `true` if every value tagged `other` is also a value of `self`.
    ///
    /// `Nothing` is a subtype of everything, `Any` a supertype of everything, `Int32` widens to
    /// `Int64`, and every numeric tag widens to `Number`.
    pub fn is_supertype_of(self, other: BaseType) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (_, BaseType::Nothing) => true,
            (BaseType::Any, _) => true,
            (BaseType::Int64, BaseType::Int32) => true,
            (BaseType::Number, o) => o.is_numeric(),
            _ => false,
        }
    }

    /// Narrowest common supertype of two tags.
    pub fn common_supertype(self, other: BaseType) -> BaseType {
        if self.is_supertype_of(other) {
            self
        } else if other.is_supertype_of(self) {
            other
        } else if self.is_numeric() && other.is_numeric() {
            BaseType::Number
        } else {
            BaseType::Any
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Declared type of a column: base tag plus nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    /// Base (non-null) tag.
    pub base: BaseType,
    /// Whether `Value::Null` is a legal element.
    pub nullable: bool,
}

impl DataType {
    /// Create a type descriptor.
    pub const fn new(base: BaseType, nullable: bool) -> Self {
        Self { base, nullable }
    }

    /// Non-nullable type of `base`.
    pub const fn of(base: BaseType) -> Self {
        Self::new(base, false)
    }

    /// Nullable type of `base`.
    pub const fn nullable(base: BaseType) -> Self {
        Self::new(base, true)
    }

    /// Same base, different nullability.
    pub const fn with_nullable(self, nullable: bool) -> Self {
        Self::new(self.base, nullable)
    }

    /// Column kind discriminant of this type.
    pub fn kind(self) -> ColumnKind {
        self.base.kind()
    }

    /// Closest type a value column can carry: `Row` and `Frame` widen to `Any`.
    pub fn to_value_type(self) -> DataType {
        match self.kind() {
            ColumnKind::Value => self,
            ColumnKind::Group | ColumnKind::Frame => DataType::new(BaseType::Any, self.nullable),
        }
    }

    /// Returns `true` if `value` is a legal element of a column of this type.
    pub fn accepts(self, value: &Value) -> bool {
        match value.base_type() {
            None => self.nullable,
            Some(tag) => self.base.is_supertype_of(tag),
        }
    }

    /// Widen two types to one that accepts the elements of both.
    pub fn union(self, other: DataType) -> DataType {
        DataType::new(
            self.base.common_supertype(other.base),
            self.nullable || other.nullable,
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.base)
        } else {
            write!(f, "{}", self.base)
        }
    }
}

/// A single cell value.
///
/// `Row` holds a single-row table (a record of a column group); `Frame` holds a full embedded
/// table (a cell of a frame column).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// Boolean.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Nested record, stored as a single-row table.
    Row(DataFrame),
    /// Nested table.
    Frame(DataFrame),
}

impl Value {
    /// Runtime tag of this value, or `None` for `Null`.
    pub fn base_type(&self) -> Option<BaseType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(BaseType::Bool),
            Value::Int32(_) => Some(BaseType::Int32),
            Value::Int64(_) => Some(BaseType::Int64),
            Value::Float64(_) => Some(BaseType::Float64),
            Value::Utf8(_) => Some(BaseType::Utf8),
            Value::Row(_) => Some(BaseType::Row),
            Value::Frame(_) => Some(BaseType::Frame),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view of `Int32`/`Int64` values.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating point view of any numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(v) => Some(f64::from(*v)),
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The single-row table of a `Row` value.
    pub fn as_row(&self) -> Option<&DataFrame> {
        match self {
            Value::Row(df) => Some(df),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&DataFrame> {
        match self {
            Value::Frame(df) => Some(df),
            _ => None,
        }
    }

    pub(crate) fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Bool(v) => ValueKey::Bool(*v),
            Value::Int32(v) => ValueKey::Int32(*v),
            Value::Int64(v) => ValueKey::Int64(*v),
            Value::Float64(v) => ValueKey::Float64(v.to_bits()),
            Value::Utf8(s) => ValueKey::Utf8(s.clone()),
            Value::Row(df) | Value::Frame(df) => ValueKey::Nested(format!("{df:?}")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
            Value::Row(df) => write!(f, "{{row: {} columns}}", df.column_count()),
            Value::Frame(df) => write!(
                f,
                "[frame: {} x {}]",
                df.row_count(),
                df.column_count()
            ),
        }
    }
}

/// Hashable identity of a value, used for grouping and `distinct`.
///
/// Floats compare by bit pattern; nested tables by their debug rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(u64),
    Utf8(String),
    Nested(String),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<DataFrame> for Value {
    fn from(v: DataFrame) -> Self {
        Value::Frame(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::{BaseType, ColumnKind, DataType, Value};

    #[test]
    fn numeric_tags_widen_through_number() {
        assert_eq!(
            BaseType::Int32.common_supertype(BaseType::Int64),
            BaseType::Int64
        );
        assert_eq!(
            BaseType::Int64.common_supertype(BaseType::Float64),
            BaseType::Number
        );
        assert_eq!(
            BaseType::Float64.common_supertype(BaseType::Int32),
            BaseType::Number
        );
        assert_eq!(
            BaseType::Utf8.common_supertype(BaseType::Int32),
            BaseType::Any
        );
        assert_eq!(
            BaseType::Nothing.common_supertype(BaseType::Utf8),
            BaseType::Utf8
        );
    }

    #[test]
    fn kind_is_derived_from_the_base_tag() {
        assert_eq!(DataType::of(BaseType::Row).kind(), ColumnKind::Group);
        assert_eq!(DataType::of(BaseType::Frame).kind(), ColumnKind::Frame);
        assert_eq!(DataType::nullable(BaseType::Any).kind(), ColumnKind::Value);
    }

    #[test]
    fn accepts_respects_nullability_and_widening() {
        let int64 = DataType::of(BaseType::Int64);
        assert!(int64.accepts(&Value::Int32(1)));
        assert!(int64.accepts(&Value::Int64(1)));
        assert!(!int64.accepts(&Value::Null));
        assert!(!int64.accepts(&Value::Float64(1.0)));
        assert!(int64.with_nullable(true).accepts(&Value::Null));
    }

    #[test]
    fn display_marks_nullable_types() {
        assert_eq!(DataType::nullable(BaseType::Int32).to_string(), "Int32?");
        assert_eq!(DataType::of(BaseType::Utf8).to_string(), "Utf8");
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::Int64(3));
    }
}
