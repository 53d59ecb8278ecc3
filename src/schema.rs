//! Type-only mirror of a table's column tree.
//!
//! A [`DataFrameSchema`] carries `(name, kind, declared type)` for every column, recursing into
//! groups and frame columns, but no row data. It is used to compare tables structurally without
//! touching their values.

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::frame::DataFrame;
use crate::path::ColumnPath;
use crate::types::{BaseType, ColumnKind, DataType};

/// Schema of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ColumnSchema {
    /// Scalar column with its declared type.
    Value { data_type: DataType },
    /// Nested record column.
    Group { schema: DataFrameSchema },
    /// Frame column with the aggregate schema of its embedded tables.
    Frame {
        schema: DataFrameSchema,
        nullable: bool,
    },
}

impl ColumnSchema {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnSchema::Value { .. } => ColumnKind::Value,
            ColumnSchema::Group { .. } => ColumnKind::Group,
            ColumnSchema::Frame { .. } => ColumnKind::Frame,
        }
    }

    /// Nested schema of a group or frame column.
    pub fn nested(&self) -> Option<&DataFrameSchema> {
        match self {
            ColumnSchema::Value { .. } => None,
            ColumnSchema::Group { schema } | ColumnSchema::Frame { schema, .. } => Some(schema),
        }
    }

    fn is_compatible_with(&self, other: &ColumnSchema, at: &ColumnPath) -> FrameResult<()> {
        match (self, other) {
            (ColumnSchema::Value { data_type: a }, ColumnSchema::Value { data_type: b }) => {
                if a.base.is_supertype_of(b.base) || b.base.is_supertype_of(a.base) {
                    Ok(())
                } else {
                    Err(FrameError::SchemaIncompatible {
                        message: format!("column '{at}' has types {a} and {b}"),
                    })
                }
            }
            (ColumnSchema::Group { schema: a }, ColumnSchema::Group { schema: b })
            | (ColumnSchema::Frame { schema: a, .. }, ColumnSchema::Frame { schema: b, .. }) => {
                a.check_compatible_at(b, at)
            }
            _ => Err(FrameError::SchemaIncompatible {
                message: format!(
                    "column '{at}' is a {} column on one side and a {} column on the other",
                    self.kind(),
                    other.kind()
                ),
            }),
        }
    }

    /// Unify the schemas of one column across several tables.
    ///
    /// `missing` means at least one table lacks the column, which makes it nullable.
    fn union(parts: &[&ColumnSchema], missing: bool) -> ColumnSchema {
        let kind = parts.first().map_or(ColumnKind::Value, |p| p.kind());
        if !parts.iter().all(|p| p.kind() == kind) {
            return ColumnSchema::Value {
                data_type: DataType::nullable(BaseType::Any),
            };
        }
        match kind {
            ColumnKind::Value => {
                let data_type = parts
                    .iter()
                    .filter_map(|p| match p {
                        ColumnSchema::Value { data_type } => Some(*data_type),
                        _ => None,
                    })
                    .reduce(DataType::union)
                    .unwrap_or(DataType::of(BaseType::Nothing));
                ColumnSchema::Value {
                    data_type: data_type.with_nullable(data_type.nullable || missing),
                }
            }
            ColumnKind::Group => {
                let schema = DataFrameSchema::union(parts.iter().filter_map(|p| p.nested()).cloned());
                ColumnSchema::Group {
                    schema: if missing { schema.into_nullable() } else { schema },
                }
            }
            ColumnKind::Frame => {
                let nullable = missing
                    || parts
                        .iter()
                        .any(|p| matches!(p, ColumnSchema::Frame { nullable: true, .. }));
                let schema = DataFrameSchema::union(parts.iter().filter_map(|p| p.nested()).cloned());
                ColumnSchema::Frame { schema, nullable }
            }
        }
    }

    fn into_nullable(self) -> ColumnSchema {
        match self {
            ColumnSchema::Value { data_type } => ColumnSchema::Value {
                data_type: data_type.with_nullable(true),
            },
            ColumnSchema::Group { schema } => ColumnSchema::Group {
                schema: schema.into_nullable(),
            },
            ColumnSchema::Frame { schema, .. } => ColumnSchema::Frame {
                schema,
                nullable: true,
            },
        }
    }
}

/// One named entry of a [`DataFrameSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub schema: ColumnSchema,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, schema: ColumnSchema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Ordered list of column schemas, mirroring a table or group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataFrameSchema {
    pub fields: Vec<SchemaField>,
}

impl DataFrameSchema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&ColumnSchema> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.schema)
    }

    /// Schema entry at `path`, descending through groups only.
    pub fn get(&self, path: &ColumnPath) -> Option<&ColumnSchema> {
        let (first, rest) = path.segments().split_first()?;
        let mut schema = self.field(first)?;
        for segment in rest {
            match schema {
                ColumnSchema::Group { schema: nested } => schema = nested.field(segment)?,
                _ => return None,
            }
        }
        Some(schema)
    }

    /// Every path addressable from the table root, depth-first in column order.
    ///
    /// Columns inside frame columns are not listed: they belong to the embedded tables, not
    /// to this one.
    pub fn column_paths(&self) -> Vec<(ColumnPath, ColumnKind)> {
        let mut out = Vec::new();
        self.collect_paths(&ColumnPath::root(), &mut out);
        out
    }

    fn collect_paths(&self, prefix: &ColumnPath, out: &mut Vec<(ColumnPath, ColumnKind)>) {
        for field in &self.fields {
            let path = prefix.child(field.name.as_str());
            out.push((path.clone(), field.schema.kind()));
            if let ColumnSchema::Group { schema } = &field.schema {
                schema.collect_paths(&path, out);
            }
        }
    }

    /// Returns `true` if the two schemas are structurally compatible.
    pub fn is_compatible_with(&self, other: &DataFrameSchema) -> bool {
        self.check_compatible(other).is_ok()
    }

    /// Check structural compatibility: the same column names (order-insensitive), the same
    /// kinds, and value types where one side widens to the other, recursively. Nullability is
    /// not compared.
    pub fn check_compatible(&self, other: &DataFrameSchema) -> FrameResult<()> {
        self.check_compatible_at(other, &ColumnPath::root())
    }

    fn check_compatible_at(&self, other: &DataFrameSchema, at: &ColumnPath) -> FrameResult<()> {
        for field in &self.fields {
            let path = at.child(field.name.as_str());
            let Some(theirs) = other.field(&field.name) else {
                return Err(FrameError::SchemaIncompatible {
                    message: format!("column '{path}' is missing on the right side"),
                });
            };
            field.schema.is_compatible_with(theirs, &path)?;
        }
        if let Some(extra) = other.fields.iter().find(|f| self.field(&f.name).is_none()) {
            return Err(FrameError::SchemaIncompatible {
                message: format!(
                    "column '{}' is missing on the left side",
                    at.child(extra.name.as_str())
                ),
            });
        }
        Ok(())
    }

    /// Best-effort union of several schemas.
    ///
    /// Columns appear in first-seen order. A column's value type is widened across every
    /// schema that carries it and becomes nullable if any schema lacks it. Columns whose kind
    /// differs between schemas collapse to a nullable `Any` value column.
    pub fn union<I>(schemas: I) -> DataFrameSchema
    where
        I: IntoIterator<Item = DataFrameSchema>,
    {
        let schemas: Vec<DataFrameSchema> = schemas.into_iter().collect();
        let mut names: Vec<&str> = Vec::new();
        for s in &schemas {
            for name in s.field_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }

        let fields = names
            .into_iter()
            .map(|name| {
                let parts: Vec<&ColumnSchema> =
                    schemas.iter().filter_map(|s| s.field(name)).collect();
                let missing = parts.len() < schemas.len();
                SchemaField::new(name, ColumnSchema::union(&parts, missing))
            })
            .collect();
        DataFrameSchema { fields }
    }

    fn into_nullable(self) -> DataFrameSchema {
        DataFrameSchema {
            fields: self
                .fields
                .into_iter()
                .map(|f| SchemaField::new(f.name, f.schema.into_nullable()))
                .collect(),
        }
    }
}

impl Column {
    /// Schema of this column. Frame columns report their (lazily computed) aggregate schema.
    pub fn schema(&self) -> ColumnSchema {
        match self {
            Column::Value(c) => ColumnSchema::Value {
                data_type: c.data_type(),
            },
            Column::Group(c) => ColumnSchema::Group {
                schema: c.frame().schema(),
            },
            Column::Frame(c) => ColumnSchema::Frame {
                schema: c.schema().clone(),
                nullable: false,
            },
        }
    }
}

impl DataFrame {
    /// Type-only mirror of this table.
    pub fn schema(&self) -> DataFrameSchema {
        DataFrameSchema {
            fields: self
                .columns()
                .iter()
                .map(|c| SchemaField::new(c.name(), c.schema()))
                .collect(),
        }
    }

    /// Fail with [`FrameError::SchemaIncompatible`] unless both tables have compatible schemas.
    pub fn check_compatible(&self, other: &DataFrame) -> FrameResult<()> {
        self.schema().check_compatible(&other.schema())
    }
}
